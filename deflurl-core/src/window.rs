//! Sliding window for LZ77 decompression.
//!
//! DEFLATE back-references may reach at most 32 KB into the already
//! decoded output. Since a one-shot decoder has to return the whole output
//! anyway, the window is the tail of an append-only output buffer: a
//! back-reference is resolved by indexing `len - distance` into that buffer,
//! and no separate history copy is kept.

use crate::error::{DeflurlError, Result};

/// Window size for DEFLATE (32 KB).
pub const WINDOW_SIZE: usize = 32768;

/// An append-only output buffer whose last `window_size` bytes serve as the
/// back-reference history.
#[derive(Debug, Clone)]
pub struct OutputWindow {
    /// Accumulated output.
    output: Vec<u8>,
    /// Maximum back-reference distance.
    window_size: usize,
    /// Optional cap on the total output length.
    limit: Option<usize>,
}

impl OutputWindow {
    /// Create a new output window with the given history size.
    pub fn new(window_size: usize) -> Self {
        Self {
            output: Vec::new(),
            window_size,
            limit: None,
        }
    }

    /// Create a DEFLATE-sized (32 KB) output window.
    pub fn deflate() -> Self {
        Self::new(WINDOW_SIZE)
    }

    /// Cap the output at `limit` bytes.
    ///
    /// Writes that would grow the output past the limit fail with
    /// `OutputLimitExceeded`.
    pub fn with_limit(mut self, limit: Option<usize>) -> Self {
        self.limit = limit;
        self
    }

    /// Bytes of history a back-reference may currently reach.
    pub fn history_len(&self) -> usize {
        self.output.len().min(self.window_size)
    }

    /// Get the total output length.
    pub fn len(&self) -> usize {
        self.output.len()
    }

    /// Check if nothing has been written yet.
    pub fn is_empty(&self) -> bool {
        self.output.is_empty()
    }

    #[inline]
    fn reserve_checked(&mut self, additional: usize) -> Result<()> {
        if let Some(limit) = self.limit {
            if self.output.len() + additional > limit {
                return Err(DeflurlError::output_limit(limit));
            }
        }
        self.output.reserve(additional);
        Ok(())
    }

    /// Write a literal byte.
    #[inline]
    pub fn write_literal(&mut self, byte: u8) -> Result<()> {
        self.reserve_checked(1)?;
        self.output.push(byte);
        Ok(())
    }

    /// Write multiple literal bytes.
    pub fn write_literals(&mut self, bytes: &[u8]) -> Result<()> {
        self.reserve_checked(bytes.len())?;
        self.output.extend_from_slice(bytes);
        Ok(())
    }

    /// Copy `length` bytes starting `distance` bytes back.
    ///
    /// Source and destination overlap whenever `distance < length`; the copy
    /// runs one byte at a time so freshly written bytes are read back,
    /// producing the repeating pattern LZ77 relies on.
    pub fn copy_match(&mut self, distance: usize, length: usize) -> Result<()> {
        if distance == 0 || distance > self.history_len() {
            return Err(DeflurlError::invalid_distance(distance, self.history_len()));
        }

        self.reserve_checked(length)?;

        let mut src = self.output.len() - distance;
        for _ in 0..length {
            let byte = self.output[src];
            self.output.push(byte);
            src += 1;
        }

        Ok(())
    }

    /// Get the output data.
    pub fn output(&self) -> &[u8] {
        &self.output
    }

    /// Consume and return the output data.
    pub fn into_output(self) -> Vec<u8> {
        self.output
    }
}
