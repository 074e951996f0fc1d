//! Error types for deflurl operations.
//!
//! Every decode-path failure is detected at the point where the malformed
//! input is read and surfaces as one typed variant. Compression itself has
//! no failure modes.

use std::string::FromUtf8Error;
use thiserror::Error;

/// The main error type for deflurl operations.
#[derive(Debug, Error)]
pub enum DeflurlError {
    /// Code lengths do not describe a usable canonical prefix code.
    #[error("Invalid code lengths: {message}")]
    InvalidCodeLengths {
        /// Description of the problem.
        message: String,
    },

    /// Invalid Huffman code encountered during decompression.
    #[error("Invalid Huffman code at bit position {bit_position}")]
    InvalidHuffmanCode {
        /// Bit position where the invalid code was found.
        bit_position: u64,
    },

    /// The bit stream ended in the middle of a value.
    #[error("Unexpected end of stream at bit position {bit_position}: needed {needed} more bits")]
    UnexpectedEndOfStream {
        /// Bit position where reading stopped.
        bit_position: u64,
        /// Number of bits that were requested but not available.
        needed: u32,
    },

    /// Stored block LEN does not match the one's complement in NLEN.
    #[error("Stored block length mismatch: LEN={len:#06x}, NLEN={nlen:#06x}")]
    StoredLengthMismatch {
        /// LEN field.
        len: u16,
        /// NLEN field.
        nlen: u16,
    },

    /// Input ran out at a block boundary before the final block was seen.
    #[error("Truncated stream: no final block before end of input (bit position {bit_position})")]
    TruncatedStream {
        /// Bit position where input ran out.
        bit_position: u64,
    },

    /// Reserved block type in a block header.
    #[error("Invalid block type: {0}")]
    InvalidBlockType(u8),

    /// A decoded symbol lies outside the meaningful part of its alphabet.
    #[error("Invalid {alphabet} symbol: {symbol}")]
    InvalidSymbol {
        /// The decoded symbol.
        symbol: u16,
        /// Alphabet name ("literal/length" or "distance").
        alphabet: &'static str,
    },

    /// Invalid distance in a back-reference.
    #[error("Invalid back-reference distance: {distance} exceeds available history {available}")]
    InvalidDistance {
        /// The invalid distance value.
        distance: usize,
        /// History available at that point.
        available: usize,
    },

    /// Decompressed output grew past the configured limit.
    #[error("Decompressed output exceeds limit of {limit} bytes")]
    OutputLimitExceeded {
        /// Configured maximum output size.
        limit: usize,
    },

    /// A character outside the Base64 alphabet.
    #[error("Invalid Base64 character {character:?} at position {position}")]
    InvalidBase64 {
        /// Character index in the input string.
        position: usize,
        /// The offending character.
        character: char,
    },

    /// Base64 text whose length cannot come from any byte sequence.
    #[error("Invalid Base64 length: {length} characters")]
    InvalidBase64Length {
        /// Number of significant characters.
        length: usize,
    },

    /// Decompressed bytes are not valid UTF-8.
    #[error("UTF-8 decode error: {0}")]
    Utf8Decode(#[from] FromUtf8Error),
}

/// Result type alias for deflurl operations.
pub type Result<T> = std::result::Result<T, DeflurlError>;

impl DeflurlError {
    /// Create an invalid code lengths error.
    pub fn invalid_code_lengths(message: impl Into<String>) -> Self {
        Self::InvalidCodeLengths {
            message: message.into(),
        }
    }

    /// Create an invalid Huffman code error.
    pub fn invalid_huffman(bit_position: u64) -> Self {
        Self::InvalidHuffmanCode { bit_position }
    }

    /// Create an unexpected end of stream error.
    pub fn unexpected_end(bit_position: u64, needed: u32) -> Self {
        Self::UnexpectedEndOfStream {
            bit_position,
            needed,
        }
    }

    /// Create a stored length mismatch error.
    pub fn stored_length_mismatch(len: u16, nlen: u16) -> Self {
        Self::StoredLengthMismatch { len, nlen }
    }

    /// Create a truncated stream error.
    pub fn truncated(bit_position: u64) -> Self {
        Self::TruncatedStream { bit_position }
    }

    /// Create an invalid symbol error.
    pub fn invalid_symbol(symbol: u16, alphabet: &'static str) -> Self {
        Self::InvalidSymbol { symbol, alphabet }
    }

    /// Create an invalid distance error.
    pub fn invalid_distance(distance: usize, available: usize) -> Self {
        Self::InvalidDistance {
            distance,
            available,
        }
    }

    /// Create an output limit error.
    pub fn output_limit(limit: usize) -> Self {
        Self::OutputLimitExceeded { limit }
    }

    /// Create an invalid Base64 character error.
    pub fn invalid_base64(position: usize, character: char) -> Self {
        Self::InvalidBase64 {
            position,
            character,
        }
    }

    /// Whether this error means the input simply ended too early.
    ///
    /// Useful for telling a cut-off URL apart from a corrupted one.
    pub fn is_truncation(&self) -> bool {
        matches!(
            self,
            Self::UnexpectedEndOfStream { .. } | Self::TruncatedStream { .. }
        )
    }
}
