//! # deflurl Core
//!
//! Core components for the deflurl text packer.
//!
//! This crate provides the building blocks shared by the codec crates:
//!
//! - [`bitstream`]: Bit-level I/O for Huffman-coded streams
//! - [`window`]: Output buffer doubling as the LZ77 sliding window
//! - [`level`]: Compression level
//! - [`error`]: Error types
//!
//! ## Architecture
//!
//! deflurl is layered like a small protocol stack:
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │ L4: CLI                                                 │
//! │     deflurl encode / decode / info                      │
//! ├─────────────────────────────────────────────────────────┤
//! │ L3: Text                                                │
//! │     UTF-8 <-> bytes, URL-safe Base64                    │
//! ├─────────────────────────────────────────────────────────┤
//! │ L2: Codec                                               │
//! │     DEFLATE (LZ77 + Huffman, RFC 1951)                  │
//! ├─────────────────────────────────────────────────────────┤
//! │ L1: BitStream (this crate)                              │
//! │     BitReader/BitWriter, OutputWindow, errors           │
//! └─────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Example
//!
//! ```rust
//! use deflurl_core::bitstream::BitReader;
//!
//! let data = [0xAB, 0xCD];
//! let mut reader = BitReader::new(&data);
//! assert_eq!(reader.read_bits(12).unwrap(), 0xDAB);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod bitstream;
pub mod error;
pub mod level;
pub mod window;

// Re-exports for convenience
pub use bitstream::{BitReader, BitWriter};
pub use error::{DeflurlError, Result};
pub use level::CompressionLevel;
pub use window::{OutputWindow, WINDOW_SIZE};
