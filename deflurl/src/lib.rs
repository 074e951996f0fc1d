//! # deflurl
//!
//! Pack UTF-8 text into a compact URL-safe string and unpack it again.
//!
//! The text is compressed with the pure Rust DEFLATE codec from
//! [`deflurl_deflate`] and the compressed bytes are written as unpadded
//! URL-safe Base64, ready to sit in a query string or fragment.
//!
//! ## Example
//!
//! ```rust
//! use deflurl::{compress_text, decompress_text};
//!
//! let packed = compress_text("hello hello hello");
//! assert!(!packed.contains(['+', '/', '=']));
//! assert_eq!(decompress_text(&packed).unwrap(), "hello hello hello");
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod base64url;
pub mod text;

pub use deflurl_core::{CompressionLevel, DeflurlError, Result};
pub use deflurl_deflate::{BlockStrategy, DeflateOptions, InflateOptions};
pub use text::{
    Inspection, compress_text, compress_text_with, decompress_text, decompress_text_with, inspect,
};
