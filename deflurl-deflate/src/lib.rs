//! # deflurl Deflate
//!
//! Pure Rust implementation of the DEFLATE compression algorithm (RFC 1951).
//!
//! This crate is the codec behind deflurl: it turns text bytes into a raw
//! DEFLATE stream small enough to travel in a URL, and back. It relies on no
//! platform compression library.
//!
//! ## Features
//!
//! - **Decompression**: Full support for all DEFLATE block types
//!   - Stored (uncompressed) blocks
//!   - Fixed Huffman codes
//!   - Dynamic Huffman codes
//! - **Compression**: LZ77 + Huffman encoding
//!   - Multiple compression levels (0-9)
//!   - Per-block choice of the smallest block kind
//!   - Length-limited (package-merge) Huffman codes
//!
//! ## Example
//!
//! ```rust
//! use deflurl_deflate::{compress, decompress};
//!
//! // Compress data
//! let original = b"Hello, World! Hello, World!";
//! let compressed = compress(original);
//!
//! // Decompress data
//! let decompressed = decompress(&compressed).unwrap();
//! assert_eq!(&decompressed, original);
//! ```
//!
//! ## Compression Levels
//!
//! - Level 0: No compression (stored blocks)
//! - Level 1-3: Fast, greedy matching
//! - Level 4-6: Lazy matching (default is 6)
//! - Level 7-9: Deep hash chains (slower)

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod block;
pub mod deflate;
pub mod huffman;
pub mod inflate;
pub mod lz77;
pub mod tables;

// Re-exports
pub use block::{BlockInfo, BlockKind};
pub use deflate::{BlockStrategy, DeflateOptions, Deflater, compress, compress_with};
pub use huffman::{CodeTable, HuffmanBuilder, HuffmanTree};
pub use inflate::{InflateOptions, Inflater, decompress, decompress_with};
pub use lz77::{Lz77Encoder, Lz77Token, Match, MatchFinder};
