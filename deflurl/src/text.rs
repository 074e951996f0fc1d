//! Text in, URL-safe string out, and back.

use crate::base64url;
use deflurl_core::error::Result;
use deflurl_deflate::{
    BlockInfo, DeflateOptions, InflateOptions, Inflater, compress_with, decompress_with,
};
use tracing::debug;

/// Compress UTF-8 text into a URL-safe string with default options.
pub fn compress_text(text: &str) -> String {
    compress_text_with(text, &DeflateOptions::default())
}

/// Compress UTF-8 text into a URL-safe string.
pub fn compress_text_with(text: &str, options: &DeflateOptions) -> String {
    let compressed = compress_with(text.as_bytes(), options);
    let encoded = base64url::encode(&compressed);
    debug!(
        text_bytes = text.len(),
        compressed_bytes = compressed.len(),
        encoded_chars = encoded.len(),
        "packed text"
    );
    encoded
}

/// Recover the text from a URL-safe string.
pub fn decompress_text(encoded: &str) -> Result<String> {
    decompress_text_with(encoded, &InflateOptions::default())
}

/// Recover the text from a URL-safe string, honoring the output limit in `options`.
pub fn decompress_text_with(encoded: &str, options: &InflateOptions) -> Result<String> {
    let compressed = base64url::decode(encoded)?;
    let bytes = decompress_with(&compressed, options)?;
    Ok(String::from_utf8(bytes)?)
}

/// Breakdown of a packed string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Inspection {
    /// The unpacked text.
    pub text: String,
    /// Characters in the packed string.
    pub encoded_len: usize,
    /// Bytes of DEFLATE data.
    pub compressed_len: usize,
    /// Blocks in the DEFLATE stream.
    pub blocks: Vec<BlockInfo>,
}

impl Inspection {
    /// Packed characters per original byte (lower is better).
    pub fn ratio(&self) -> f64 {
        if self.text.is_empty() {
            0.0
        } else {
            self.encoded_len as f64 / self.text.len() as f64
        }
    }
}

/// Unpack `encoded` and report how it was packed.
pub fn inspect(encoded: &str, options: &InflateOptions) -> Result<Inspection> {
    let compressed = base64url::decode(encoded)?;
    let mut inflater = Inflater::with_options(*options);
    let bytes = inflater.inflate(&compressed)?;

    Ok(Inspection {
        text: String::from_utf8(bytes)?,
        encoded_len: encoded.chars().count(),
        compressed_len: compressed.len(),
        blocks: inflater.blocks().to_vec(),
    })
}
