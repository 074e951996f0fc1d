//! Block types shared by the encoder and the decoder.

use deflurl_core::error::{DeflurlError, Result};
use std::fmt;

/// The three DEFLATE block encodings (RFC 1951 Section 3.2.3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlockKind {
    /// Uncompressed bytes with LEN/NLEN header (BTYPE 00).
    Stored,
    /// Fixed Huffman codes (BTYPE 01).
    Fixed,
    /// Dynamic Huffman codes transmitted in the block header (BTYPE 10).
    Dynamic,
}

impl BlockKind {
    /// The 2-bit BTYPE value.
    pub fn btype(self) -> u8 {
        match self {
            BlockKind::Stored => 0b00,
            BlockKind::Fixed => 0b01,
            BlockKind::Dynamic => 0b10,
        }
    }

    /// Parse a BTYPE value. Type 3 is reserved and rejected.
    pub fn from_btype(btype: u8) -> Result<Self> {
        match btype {
            0b00 => Ok(BlockKind::Stored),
            0b01 => Ok(BlockKind::Fixed),
            0b10 => Ok(BlockKind::Dynamic),
            other => Err(DeflurlError::InvalidBlockType(other)),
        }
    }

    /// Lowercase name.
    pub fn name(self) -> &'static str {
        match self {
            BlockKind::Stored => "stored",
            BlockKind::Fixed => "fixed",
            BlockKind::Dynamic => "dynamic",
        }
    }
}

impl fmt::Display for BlockKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// What the decoder saw for one block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockInfo {
    /// Block encoding.
    pub kind: BlockKind,
    /// Whether BFINAL was set.
    pub is_final: bool,
    /// Bit offset of the block header in the compressed stream.
    pub bit_offset: u64,
    /// Number of compressed bits the block occupied, header included.
    pub compressed_bits: u64,
    /// Number of bytes the block produced.
    pub decoded_len: usize,
}
