//! Huffman coding for DEFLATE.
//!
//! DEFLATE uses canonical Huffman codes: the code for every symbol follows
//! from the per-symbol code lengths alone, with codes of the same length
//! assigned consecutive values in symbol order (RFC 1951 Section 3.2.2).
//!
//! # Alphabets
//!
//! DEFLATE uses three Huffman alphabets:
//! - **Literal/Length**: 0-285 (0-255 literals, 256 EOB, 257-285 lengths)
//! - **Distance**: 0-29 (back-reference distances)
//! - **Code Length**: 0-18 (for encoding dynamic Huffman trees)
//!
//! # Pieces
//!
//! - [`CodeTable`]: canonical code assignment and symbol encoding
//! - [`HuffmanTree`]: table-driven symbol decoding
//! - [`HuffmanBuilder`]: length-limited code lengths from frequencies

use crate::tables::{fixed_distance_lengths, fixed_litlen_lengths};
use deflurl_core::bitstream::{BitReader, BitWriter};
use deflurl_core::error::{DeflurlError, Result};

/// Maximum code length in DEFLATE (15 bits).
pub const MAX_CODE_LENGTH: usize = 15;

/// Maximum code length for the code length alphabet (7 bits).
pub const MAX_CODELEN_LENGTH: usize = 7;

/// Size of the literal/length alphabet (0-285).
pub const LITLEN_ALPHABET_SIZE: usize = 286;

/// Size of the distance alphabet (0-29).
pub const DISTANCE_ALPHABET_SIZE: usize = 30;

/// Size of the code length alphabet (0-18).
pub const CODELEN_ALPHABET_SIZE: usize = 19;

/// End of block symbol.
pub const END_OF_BLOCK: u16 = 256;

/// A single canonical code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Code {
    /// Code value, most significant bit first as in RFC 1951.
    pub code: u16,
    /// Code length in bits (0 means the symbol is unused).
    pub length: u8,
}

/// Reverse the low `length` bits of a code.
#[inline]
fn reverse_bits(code: u16, length: u8) -> u16 {
    if length == 0 {
        0
    } else {
        code.reverse_bits() >> (16 - length)
    }
}

/// Count codes per length and validate them against the Kraft inequality.
///
/// Over-subscribed sets are always rejected. Incomplete sets are rejected
/// except for the two cases RFC 1951 allows: no codes at all, and a single
/// code of length one.
fn count_lengths(code_lengths: &[u8]) -> Result<[u16; MAX_CODE_LENGTH + 1]> {
    let mut bl_count = [0u16; MAX_CODE_LENGTH + 1];

    for &len in code_lengths {
        if len as usize > MAX_CODE_LENGTH {
            return Err(DeflurlError::invalid_code_lengths(format!(
                "code length {} exceeds maximum {}",
                len, MAX_CODE_LENGTH
            )));
        }
        bl_count[len as usize] += 1;
    }
    bl_count[0] = 0;

    // Unused code space, in units of the current length
    let mut left: i32 = 1;
    for &count in &bl_count[1..] {
        left = (left << 1) - count as i32;
        if left < 0 {
            return Err(DeflurlError::invalid_code_lengths(
                "over-subscribed Huffman code",
            ));
        }
    }

    let total: u16 = bl_count.iter().sum();
    if left > 0 && total > 0 && !(total == 1 && bl_count[1] == 1) {
        return Err(DeflurlError::invalid_code_lengths(
            "incomplete Huffman code",
        ));
    }

    Ok(bl_count)
}

/// Assign canonical codes to already validated lengths (RFC 1951 algorithm).
fn assign_codes(code_lengths: &[u8], bl_count: &[u16; MAX_CODE_LENGTH + 1]) -> Vec<Code> {
    let mut next_code = [0u16; MAX_CODE_LENGTH + 1];
    let mut code = 0u16;
    for bits in 1..=MAX_CODE_LENGTH {
        code = (code + bl_count[bits - 1]) << 1;
        next_code[bits] = code;
    }

    code_lengths
        .iter()
        .map(|&len| {
            if len == 0 {
                Code::default()
            } else {
                let code = next_code[len as usize];
                next_code[len as usize] += 1;
                Code { code, length: len }
            }
        })
        .collect()
}

/// Canonical Huffman codes for one alphabet, used for encoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeTable {
    /// Code per symbol.
    codes: Vec<Code>,
    /// Codes bit-reversed for the LSB-first bit writer.
    lsb_codes: Vec<u16>,
}

impl CodeTable {
    /// Build a canonical code table from code lengths.
    ///
    /// `code_lengths[i]` is the bit length for symbol `i`; zero marks an
    /// unused symbol. Fails with `InvalidCodeLengths` when the lengths do
    /// not form a valid prefix code.
    pub fn from_code_lengths(code_lengths: &[u8]) -> Result<Self> {
        let bl_count = count_lengths(code_lengths)?;
        Ok(Self::from_validated(code_lengths, &bl_count))
    }

    fn from_validated(code_lengths: &[u8], bl_count: &[u16; MAX_CODE_LENGTH + 1]) -> Self {
        let codes = assign_codes(code_lengths, bl_count);
        let lsb_codes = codes
            .iter()
            .map(|c| reverse_bits(c.code, c.length))
            .collect();
        Self { codes, lsb_codes }
    }

    /// Build a table from lengths known to form a valid code, such as the
    /// fixed tables or the output of [`HuffmanBuilder`].
    pub(crate) fn from_trusted_lengths(code_lengths: &[u8]) -> Self {
        debug_assert!(count_lengths(code_lengths).is_ok());
        let mut bl_count = [0u16; MAX_CODE_LENGTH + 1];
        for &len in code_lengths {
            bl_count[len as usize] += 1;
        }
        bl_count[0] = 0;
        Self::from_validated(code_lengths, &bl_count)
    }

    /// The fixed literal/length code (RFC 1951 Section 3.2.6).
    pub fn fixed_litlen() -> Self {
        Self::from_trusted_lengths(&fixed_litlen_lengths())
    }

    /// The fixed distance code (RFC 1951 Section 3.2.6).
    pub fn fixed_distance() -> Self {
        Self::from_trusted_lengths(&fixed_distance_lengths())
    }

    /// Number of symbols in the alphabet.
    pub fn len(&self) -> usize {
        self.codes.len()
    }

    /// Whether the alphabet has no symbols.
    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }

    /// Code assigned to `symbol`.
    pub fn code(&self, symbol: u16) -> Code {
        self.codes[symbol as usize]
    }

    /// Code length of `symbol` (0 when unused).
    pub fn code_length(&self, symbol: u16) -> u8 {
        self.codes[symbol as usize].length
    }

    /// Iterate over the codes in symbol order.
    pub fn codes(&self) -> &[Code] {
        &self.codes
    }

    /// Write the code for `symbol`.
    #[inline]
    pub fn encode(&self, writer: &mut BitWriter, symbol: u16) {
        let length = self.codes[symbol as usize].length;
        debug_assert!(length > 0, "Symbol {} has no code", symbol);
        writer.write_bits(self.lsb_codes[symbol as usize] as u32, length);
    }
}

/// A Huffman tree for decoding.
///
/// Codes up to `FAST_BITS` long are resolved with a single table lookup on
/// the next bits of input. Longer codes fall back to a canonical walk that
/// reads one bit at a time.
#[derive(Debug, Clone)]
pub struct HuffmanTree {
    /// Direct lookup table indexed by the next `fast_bits` input bits.
    /// Entry format: `symbol << 4 | code_length`, zero when no code matches.
    fast_table: Vec<u16>,
    /// Number of bits for fast lookup.
    fast_bits: u8,
    /// Maximum code length in this tree.
    max_code_length: u8,
    /// Number of codes of each length.
    counts: [u16; MAX_CODE_LENGTH + 1],
    /// Symbols ordered by (code length, symbol).
    symbols: Vec<u16>,
}

impl HuffmanTree {
    /// Number of bits for fast lookup table.
    const FAST_BITS: u8 = 9;

    /// Build a Huffman tree from code lengths.
    ///
    /// # Arguments
    ///
    /// * `code_lengths` - Array where `code_lengths[i]` is the bit length for symbol `i`.
    ///   A length of 0 means the symbol is not used.
    pub fn from_code_lengths(code_lengths: &[u8]) -> Result<Self> {
        Ok(Self::from_table(&CodeTable::from_code_lengths(code_lengths)?))
    }

    /// Build the decoder for an existing code table.
    pub fn from_table(table: &CodeTable) -> Self {
        let mut counts = [0u16; MAX_CODE_LENGTH + 1];
        let mut max_code_length = 0u8;
        for code in table.codes() {
            if code.length > 0 {
                counts[code.length as usize] += 1;
                max_code_length = max_code_length.max(code.length);
            }
        }

        let mut symbols = Vec::with_capacity(counts.iter().map(|&c| c as usize).sum());
        for len in 1..=max_code_length {
            for (symbol, code) in table.codes().iter().enumerate() {
                if code.length == len {
                    symbols.push(symbol as u16);
                }
            }
        }

        let fast_bits = Self::FAST_BITS.min(max_code_length);
        let mut fast_table = vec![0u16; 1 << fast_bits];
        for (symbol, code) in table.codes().iter().enumerate() {
            if code.length == 0 || code.length > fast_bits {
                continue;
            }
            let reversed = reverse_bits(code.code, code.length) as usize;
            let entry = (symbol as u16) << 4 | code.length as u16;
            // Fill all entries that share this prefix
            for i in 0..1usize << (fast_bits - code.length) {
                fast_table[reversed | (i << code.length)] = entry;
            }
        }

        Self {
            fast_table,
            fast_bits,
            max_code_length,
            counts,
            symbols,
        }
    }

    /// Decoder for the fixed literal/length code.
    pub fn fixed_litlen() -> Self {
        Self::from_table(&CodeTable::fixed_litlen())
    }

    /// Decoder for the fixed distance code.
    pub fn fixed_distance() -> Self {
        Self::from_table(&CodeTable::fixed_distance())
    }

    /// Maximum code length in this tree (0 for an empty tree).
    pub fn max_code_length(&self) -> u8 {
        self.max_code_length
    }

    /// Decode a symbol from the bit stream.
    #[inline]
    pub fn decode(&self, reader: &mut BitReader<'_>) -> Result<u16> {
        if self.max_code_length == 0 {
            return Err(DeflurlError::invalid_huffman(reader.bit_position()));
        }

        let (bits, available) = reader.peek_bits(self.fast_bits);
        let entry = self.fast_table[bits as usize];
        if entry != 0 {
            let len = (entry & 0xF) as u8;
            if len > available {
                return Err(DeflurlError::unexpected_end(
                    reader.bit_position(),
                    (len - available) as u32,
                ));
            }
            reader.skip_bits(len)?;
            return Ok(entry >> 4);
        }

        self.decode_slow(reader)
    }

    /// Canonical decoding, one bit at a time.
    fn decode_slow(&self, reader: &mut BitReader<'_>) -> Result<u16> {
        let start = reader.bit_position();
        let mut code: i32 = 0;
        let mut first: i32 = 0;
        let mut index: i32 = 0;

        for len in 1..=self.max_code_length as usize {
            code |= reader.read_bits(1)? as i32;
            let count = self.counts[len] as i32;
            if code - first < count {
                return Ok(self.symbols[(index + code - first) as usize]);
            }
            index += count;
            first = (first + count) << 1;
            code <<= 1;
        }

        Err(DeflurlError::invalid_huffman(start))
    }
}

/// Builder for creating Huffman code lengths from frequencies.
#[derive(Debug)]
pub struct HuffmanBuilder {
    frequencies: Vec<u32>,
    max_length: u8,
}

impl HuffmanBuilder {
    /// Create a new Huffman builder.
    pub fn new(alphabet_size: usize, max_length: u8) -> Self {
        Self {
            frequencies: vec![0; alphabet_size],
            max_length,
        }
    }

    /// Create a builder from an existing frequency table.
    pub fn from_frequencies(frequencies: &[u32], max_length: u8) -> Self {
        Self {
            frequencies: frequencies.to_vec(),
            max_length,
        }
    }

    /// Add a symbol occurrence.
    pub fn add(&mut self, symbol: u16) {
        self.add_count(symbol, 1);
    }

    /// Add multiple occurrences of a symbol.
    pub fn add_count(&mut self, symbol: u16, count: u32) {
        if let Some(freq) = self.frequencies.get_mut(symbol as usize) {
            *freq += count;
        }
    }

    /// Build code lengths from frequencies.
    ///
    /// Returns an array where `result[i]` is the code length for symbol `i`.
    /// No length exceeds the builder's maximum, and whenever any symbol is
    /// used the lengths form a complete prefix code.
    pub fn build_lengths(&self) -> Vec<u8> {
        let n = self.frequencies.len();
        let mut lengths = vec![0u8; n];

        let mut symbols: Vec<(u32, usize)> = self
            .frequencies
            .iter()
            .enumerate()
            .filter(|&(_, f)| *f > 0)
            .map(|(i, f)| (*f, i))
            .collect();

        match symbols.len() {
            0 => return lengths,
            1 => {
                // A lone symbol still needs a partner for a complete code
                let symbol = symbols[0].1;
                lengths[symbol] = 1;
                if n > 1 {
                    lengths[if symbol == 0 { 1 } else { 0 }] = 1;
                }
                return lengths;
            }
            _ => {}
        }

        symbols.sort_unstable();

        let weights: Vec<u64> = symbols.iter().map(|&(f, _)| f as u64).collect();
        let code_lengths = package_merge(&weights, self.max_length as usize);

        for (&(_, symbol), &len) in symbols.iter().zip(&code_lengths) {
            lengths[symbol] = len;
        }

        lengths
    }
}

/// Length-limited code lengths by the package-merge algorithm.
///
/// `weights` must be sorted ascending and hold at least two entries.
/// Returns one length per weight, in the same order.
fn package_merge(weights: &[u64], max_length: usize) -> Vec<u8> {
    let n = weights.len();
    debug_assert!(n >= 2 && n <= 1 << max_length);

    // Each list holds (weight, is_leaf) sorted by weight. List 0 is the bare
    // leaves; list k merges the leaves with pairs packaged from list k - 1.
    let mut lists: Vec<Vec<(u64, bool)>> = Vec::with_capacity(max_length);
    lists.push(weights.iter().map(|&w| (w, true)).collect());

    for _ in 1..max_length {
        let prev = &lists[lists.len() - 1];
        let packages: Vec<u64> = prev.chunks_exact(2).map(|p| p[0].0 + p[1].0).collect();

        let mut merged = Vec::with_capacity(n + packages.len());
        let (mut i, mut j) = (0, 0);
        while i < n || j < packages.len() {
            if j >= packages.len() || (i < n && weights[i] <= packages[j]) {
                merged.push((weights[i], true));
                i += 1;
            } else {
                merged.push((packages[j], false));
                j += 1;
            }
        }
        lists.push(merged);
    }

    // Select the 2n - 2 cheapest items of the last list and walk down: the
    // leaves taken from each list are a prefix of the sorted leaves, and the
    // packages taken expand into twice as many items of the list below.
    let mut lengths = vec![0u8; n];
    let mut take = 2 * n - 2;
    for list in lists.iter().rev() {
        if take == 0 {
            break;
        }
        let selected = &list[..take.min(list.len())];
        let leaves = selected.iter().filter(|&&(_, leaf)| leaf).count();
        for len in &mut lengths[..leaves] {
            *len += 1;
        }
        take = 2 * (selected.len() - leaves);
    }

    lengths
}
