//! Static tables for DEFLATE (RFC 1951).
//!
//! Fixed Huffman code lengths, the base/extra-bit tables that map length
//! and distance values onto symbols, and the permutation used to transmit
//! code-length code lengths.

/// Number of symbols in the fixed literal/length alphabet (286 + 2 unused).
pub const FIXED_LITLEN_SYMBOLS: usize = 288;

/// Number of symbols in the fixed distance alphabet (30 + 2 unused).
pub const FIXED_DISTANCE_SYMBOLS: usize = 32;

/// Fixed literal/length code lengths (RFC 1951 Section 3.2.6).
///
/// - Symbols 0-143: 8 bits
/// - Symbols 144-255: 9 bits
/// - Symbols 256-279: 7 bits
/// - Symbols 280-287: 8 bits
pub fn fixed_litlen_lengths() -> [u8; FIXED_LITLEN_SYMBOLS] {
    let mut lengths = [0u8; FIXED_LITLEN_SYMBOLS];
    lengths[..144].fill(8);
    lengths[144..256].fill(9);
    lengths[256..280].fill(7);
    lengths[280..].fill(8);
    lengths
}

/// Fixed distance code lengths (RFC 1951 Section 3.2.6).
///
/// All 32 distance codes use 5 bits. Codes 30 and 31 take part in the code
/// but never occur in valid data.
pub fn fixed_distance_lengths() -> [u8; FIXED_DISTANCE_SYMBOLS] {
    [5u8; FIXED_DISTANCE_SYMBOLS]
}

/// Length code base values (RFC 1951 Section 3.2.5).
///
/// For length codes 257-285, this gives the base length value.
/// Extra bits are added to get the final length.
pub const LENGTH_BASE: [u16; 29] = [
    3, 4, 5, 6, 7, 8, 9, 10, // 257-264: 0 extra bits
    11, 13, 15, 17, // 265-268: 1 extra bit
    19, 23, 27, 31, // 269-272: 2 extra bits
    35, 43, 51, 59, // 273-276: 3 extra bits
    67, 83, 99, 115, // 277-280: 4 extra bits
    131, 163, 195, 227, // 281-284: 5 extra bits
    258, // 285: 0 extra bits (special case)
];

/// Number of extra bits for length codes 257-285.
pub const LENGTH_EXTRA_BITS: [u8; 29] = [
    0, 0, 0, 0, 0, 0, 0, 0, // 257-264
    1, 1, 1, 1, // 265-268
    2, 2, 2, 2, // 269-272
    3, 3, 3, 3, // 273-276
    4, 4, 4, 4, // 277-280
    5, 5, 5, 5, // 281-284
    0, // 285
];

/// Distance code base values (RFC 1951 Section 3.2.5).
pub const DISTANCE_BASE: [u16; 30] = [
    1, 2, 3, 4, // 0-3: 0 extra bits
    5, 7, // 4-5: 1 extra bit
    9, 13, // 6-7: 2 extra bits
    17, 25, // 8-9: 3 extra bits
    33, 49, // 10-11: 4 extra bits
    65, 97, // 12-13: 5 extra bits
    129, 193, // 14-15: 6 extra bits
    257, 385, // 16-17: 7 extra bits
    513, 769, // 18-19: 8 extra bits
    1025, 1537, // 20-21: 9 extra bits
    2049, 3073, // 22-23: 10 extra bits
    4097, 6145, // 24-25: 11 extra bits
    8193, 12289, // 26-27: 12 extra bits
    16385, 24577, // 28-29: 13 extra bits
];

/// Number of extra bits for distance codes 0-29.
pub const DISTANCE_EXTRA_BITS: [u8; 30] = [
    0, 0, 0, 0, // 0-3
    1, 1, // 4-5
    2, 2, // 6-7
    3, 3, // 8-9
    4, 4, // 10-11
    5, 5, // 12-13
    6, 6, // 14-15
    7, 7, // 16-17
    8, 8, // 18-19
    9, 9, // 20-21
    10, 10, // 22-23
    11, 11, // 24-25
    12, 12, // 26-27
    13, 13, // 28-29
];

/// Order of code length codes in dynamic block header.
///
/// Code length codes are transmitted in this order (RFC 1951 Section 3.2.7).
pub const CODE_LENGTH_ORDER: [usize; 19] = [
    16, 17, 18, 0, 8, 7, 9, 6, 10, 5, 11, 4, 12, 3, 13, 2, 14, 1, 15,
];

/// A length or distance mapped onto its DEFLATE symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SymbolCode {
    /// Alphabet symbol (257-285 for lengths, 0-29 for distances).
    pub symbol: u16,
    /// Number of extra bits following the symbol.
    pub extra_bits: u8,
    /// Value carried in the extra bits.
    pub extra_value: u16,
}

/// Convert a length value (3-258) to a length code (257-285).
pub fn length_to_code(length: u16) -> SymbolCode {
    debug_assert!(
        (3..=258).contains(&length),
        "Length out of range: {}",
        length
    );

    let length = length as usize;
    let symbol = match length {
        3..=10 => length - 3 + 257,
        11..=18 => (length - 11) / 2 + 265,
        19..=34 => (length - 19) / 4 + 269,
        35..=66 => (length - 35) / 8 + 273,
        67..=130 => (length - 67) / 16 + 277,
        131..=257 => (length - 131) / 32 + 281,
        _ => 285,
    };

    let index = symbol - 257;
    SymbolCode {
        symbol: symbol as u16,
        extra_bits: LENGTH_EXTRA_BITS[index],
        extra_value: (length - LENGTH_BASE[index] as usize) as u16,
    }
}

/// Convert a distance value (1-32768) to a distance code (0-29).
pub fn distance_to_code(distance: u16) -> SymbolCode {
    debug_assert!(distance >= 1, "Distance out of range: {}", distance);

    // Codes come in pairs per power of two: for d-1 = 2^k + r, the code is
    // 2k plus one when r falls in the upper half.
    let symbol = if distance <= 4 {
        distance as usize - 1
    } else {
        let d = distance as u32 - 1;
        let k = 31 - d.leading_zeros();
        (2 * k + ((d >> (k - 1)) & 1)) as usize
    };

    SymbolCode {
        symbol: symbol as u16,
        extra_bits: DISTANCE_EXTRA_BITS[symbol],
        extra_value: distance - DISTANCE_BASE[symbol],
    }
}

/// Decode a length from a length code and extra bits.
pub fn decode_length(code: u16, extra: u16) -> u16 {
    debug_assert!((257..=285).contains(&code), "Invalid length code: {}", code);
    LENGTH_BASE[(code - 257) as usize] + extra
}

/// Decode a distance from a distance code and extra bits.
pub fn decode_distance(code: u16, extra: u16) -> u16 {
    debug_assert!(code < 30, "Invalid distance code: {}", code);
    DISTANCE_BASE[code as usize] + extra
}
