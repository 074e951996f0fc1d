//! URL-safe Base64 (RFC 4648 Section 5) without padding.
//!
//! Encoding always uses `-` and `_` and drops the trailing `=`. Decoding is
//! as forgiving as a browser's `atob` after the URL-safe substitution: the
//! standard `+` and `/` are accepted too, and padding may be present or not.

use deflurl_core::error::{DeflurlError, Result};

const ALPHABET: &[u8; 64] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789-_";

/// Value of a Base64 digit, accepting both the URL-safe and standard forms.
fn digit_value(c: char) -> Option<u32> {
    let value = match c {
        'A'..='Z' => c as u32 - 'A' as u32,
        'a'..='z' => c as u32 - 'a' as u32 + 26,
        '0'..='9' => c as u32 - '0' as u32 + 52,
        '-' | '+' => 62,
        '_' | '/' => 63,
        _ => return None,
    };
    Some(value)
}

/// Encode bytes as unpadded URL-safe Base64.
pub fn encode(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len().div_ceil(3) * 4);

    for chunk in bytes.chunks(3) {
        let b = [
            chunk[0],
            chunk.get(1).copied().unwrap_or(0),
            chunk.get(2).copied().unwrap_or(0),
        ];
        let group = u32::from(b[0]) << 16 | u32::from(b[1]) << 8 | u32::from(b[2]);

        // n bytes produce n + 1 digits
        for i in 0..=chunk.len() {
            let index = (group >> (18 - 6 * i)) & 0x3F;
            out.push(ALPHABET[index as usize] as char);
        }
    }

    out
}

/// Decode URL-safe (or standard) Base64, with or without padding.
///
/// The input is padded to a multiple of four with `=` and then up to two
/// trailing `=` are dropped. What remains must consist of Base64 digits
/// only, and its length must not be one more than a multiple of four.
pub fn decode(encoded: &str) -> Result<Vec<u8>> {
    let chars: Vec<char> = encoded.chars().collect();

    let added = (4 - chars.len() % 4) % 4;
    let trailing = chars.iter().rev().take_while(|&&c| c == '=').count();
    let strip = if added >= 2 {
        0
    } else {
        (2 - added).min(trailing)
    };
    let digits = &chars[..chars.len() - strip];

    let mut out = Vec::with_capacity(digits.len() * 3 / 4);
    let mut buffer = 0u32;
    let mut bits = 0u32;

    for (position, &c) in digits.iter().enumerate() {
        let value = digit_value(c).ok_or_else(|| DeflurlError::invalid_base64(position, c))?;
        buffer = (buffer << 6) | value;
        bits += 6;
        if bits >= 8 {
            bits -= 8;
            out.push((buffer >> bits) as u8);
            buffer &= (1 << bits) - 1;
        }
    }

    if digits.len() % 4 == 1 {
        return Err(DeflurlError::InvalidBase64Length {
            length: digits.len(),
        });
    }

    Ok(out)
}
