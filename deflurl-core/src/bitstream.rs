//! Bit-level I/O over in-memory buffers.
//!
//! This module provides `BitReader` and `BitWriter` for reading and writing
//! data at the bit level, as required by the Huffman-coded parts of DEFLATE.
//!
//! # Bit Ordering
//!
//! DEFLATE uses LSB-first (Least Significant Bit first) ordering within
//! bytes. Multi-bit values are packed starting from the least significant
//! bit of each byte, and a value that does not fit in the current byte
//! continues in the low bits of the next one.
//!
//! # Example
//!
//! ```
//! use deflurl_core::bitstream::{BitReader, BitWriter};
//!
//! let mut writer = BitWriter::new();
//! writer.write_bits(0b101, 3);
//! writer.write_bits(0b1100, 4);
//! let output = writer.finish();
//!
//! let mut reader = BitReader::new(&output);
//! assert_eq!(reader.read_bits(3).unwrap(), 0b101);
//! assert_eq!(reader.read_bits(4).unwrap(), 0b1100);
//! ```

use crate::error::{DeflurlError, Result};

/// A bit-level reader over a borrowed byte slice.
///
/// Whole bytes are pulled into a 64-bit buffer on demand, so a read never
/// touches the slice more than once per byte.
#[derive(Debug, Clone)]
pub struct BitReader<'a> {
    /// Input bytes.
    data: &'a [u8],
    /// Index of the next byte to load into the buffer.
    pos: usize,
    /// Bit buffer (LSB-first).
    buffer: u64,
    /// Number of valid bits in buffer.
    bits_in_buffer: u8,
    /// Total bits consumed (for error reporting).
    total_bits_read: u64,
}

impl<'a> BitReader<'a> {
    /// Create a new `BitReader` over the given bytes.
    pub fn new(data: &'a [u8]) -> Self {
        Self {
            data,
            pos: 0,
            buffer: 0,
            bits_in_buffer: 0,
            total_bits_read: 0,
        }
    }

    /// Get the current bit position (for error reporting).
    pub fn bit_position(&self) -> u64 {
        self.total_bits_read
    }

    /// Number of unread bits left in the input.
    pub fn remaining_bits(&self) -> u64 {
        self.bits_in_buffer as u64 + (self.data.len() - self.pos) as u64 * 8
    }

    /// Number of whole unread bytes left in the input.
    pub fn remaining_bytes(&self) -> usize {
        (self.remaining_bits() / 8) as usize
    }

    /// Whether every bit of the input has been consumed.
    pub fn is_exhausted(&self) -> bool {
        self.remaining_bits() == 0
    }

    /// Load bytes until at least `count` bits are buffered or input runs out.
    #[inline]
    fn fill_buffer(&mut self, count: u8) {
        debug_assert!(count <= 56, "Cannot fill more than 56 bits at once");

        while self.bits_in_buffer < count && self.pos < self.data.len() {
            self.buffer |= (self.data[self.pos] as u64) << self.bits_in_buffer;
            self.bits_in_buffer += 8;
            self.pos += 1;
        }
    }

    /// Drop `count` bits that are known to be buffered.
    #[inline]
    fn consume(&mut self, count: u8) {
        self.buffer >>= count;
        self.bits_in_buffer -= count;
        self.total_bits_read += count as u64;
    }

    /// Read up to 32 bits from the stream.
    ///
    /// The first bit read lands in the LSB of the result. Fails with
    /// `UnexpectedEndOfStream` when fewer than `count` bits remain, in which
    /// case nothing is consumed.
    #[inline]
    pub fn read_bits(&mut self, count: u8) -> Result<u32> {
        debug_assert!(count <= 32, "Cannot read more than 32 bits at once");

        if count == 0 {
            return Ok(0);
        }

        self.fill_buffer(count);
        if self.bits_in_buffer < count {
            return Err(DeflurlError::unexpected_end(
                self.total_bits_read,
                (count - self.bits_in_buffer) as u32,
            ));
        }

        let mask = (1u64 << count) - 1;
        let result = (self.buffer & mask) as u32;
        self.consume(count);

        Ok(result)
    }

    /// Read a single bit.
    pub fn read_bit(&mut self) -> Result<bool> {
        Ok(self.read_bits(1)? != 0)
    }

    /// Peek at up to 32 bits without consuming them.
    ///
    /// Bits past the end of the input read as zero. Returns the value and
    /// the number of those bits that are real input.
    #[inline]
    pub fn peek_bits(&mut self, count: u8) -> (u32, u8) {
        debug_assert!(count <= 32, "Cannot peek more than 32 bits at once");

        self.fill_buffer(count);
        let mask = (1u64 << count) - 1;
        (
            (self.buffer & mask) as u32,
            self.bits_in_buffer.min(count),
        )
    }

    /// Skip a number of bits.
    pub fn skip_bits(&mut self, count: u8) -> Result<()> {
        self.read_bits(count).map(|_| ())
    }

    /// Align to the next byte boundary by discarding partial bits.
    pub fn align_to_byte(&mut self) {
        let remainder = self.bits_in_buffer % 8;
        if remainder > 0 {
            self.consume(remainder);
        }
    }

    /// Read `len` raw bytes.
    ///
    /// The reader must be byte-aligned. Fails with `UnexpectedEndOfStream`
    /// when fewer than `len` bytes remain.
    pub fn read_bytes(&mut self, len: usize) -> Result<&'a [u8]> {
        debug_assert!(
            self.bits_in_buffer % 8 == 0,
            "read_bytes requires a byte-aligned reader"
        );

        // Hand buffered whole bytes back to the slice, they are still there.
        self.pos -= (self.bits_in_buffer / 8) as usize;
        self.buffer = 0;
        self.bits_in_buffer = 0;

        let available = self.data.len() - self.pos;
        if available < len {
            return Err(DeflurlError::unexpected_end(
                self.total_bits_read,
                ((len - available) * 8) as u32,
            ));
        }

        let bytes = &self.data[self.pos..self.pos + len];
        self.pos += len;
        self.total_bits_read += len as u64 * 8;
        Ok(bytes)
    }
}

/// A bit-level writer that accumulates into a growable byte buffer.
///
/// Complete bytes are moved to the output as soon as they are filled.
/// Call `finish()` to pad the last partial byte and take the output.
#[derive(Debug, Clone, Default)]
pub struct BitWriter {
    /// Completed output bytes.
    output: Vec<u8>,
    /// Bit buffer (LSB-first).
    buffer: u64,
    /// Number of bits in buffer.
    bits_in_buffer: u8,
    /// Total bits written.
    total_bits_written: u64,
}

impl BitWriter {
    /// Create a new, empty `BitWriter`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a `BitWriter` with room for `capacity` output bytes.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            output: Vec::with_capacity(capacity),
            ..Self::default()
        }
    }

    /// Get the total number of bits written so far.
    pub fn bits_written(&self) -> u64 {
        self.total_bits_written
    }

    /// Whether the next bit starts a new byte.
    pub fn is_aligned(&self) -> bool {
        self.bits_in_buffer == 0
    }

    #[inline]
    fn flush_bytes(&mut self) {
        while self.bits_in_buffer >= 8 {
            self.output.push(self.buffer as u8);
            self.buffer >>= 8;
            self.bits_in_buffer -= 8;
        }
    }

    /// Write up to 32 bits to the stream.
    ///
    /// The low `count` bits of `value` are appended, LSB first.
    #[inline]
    pub fn write_bits(&mut self, value: u32, count: u8) {
        debug_assert!(count <= 32, "Cannot write more than 32 bits at once");

        if count == 0 {
            return;
        }

        let mask = (1u64 << count) - 1;
        self.buffer |= (value as u64 & mask) << self.bits_in_buffer;
        self.bits_in_buffer += count;
        self.total_bits_written += count as u64;

        self.flush_bytes();
    }

    /// Write a single bit.
    #[inline(always)]
    pub fn write_bit(&mut self, bit: bool) {
        self.write_bits(bit as u32, 1);
    }

    /// Pad to byte boundary with zeros.
    pub fn align_to_byte(&mut self) {
        if self.bits_in_buffer > 0 {
            let padding = 8 - self.bits_in_buffer;
            self.write_bits(0, padding);
        }
    }

    /// Write bytes directly to the stream.
    ///
    /// Takes the fast path when aligned; otherwise each byte is shifted in.
    pub fn write_bytes(&mut self, buf: &[u8]) {
        if self.bits_in_buffer == 0 {
            self.output.extend_from_slice(buf);
            self.total_bits_written += buf.len() as u64 * 8;
        } else {
            for &byte in buf {
                self.write_bits(byte as u32, 8);
            }
        }
    }

    /// Pad the final partial byte and return the output.
    pub fn finish(mut self) -> Vec<u8> {
        self.align_to_byte();
        self.output
    }
}
