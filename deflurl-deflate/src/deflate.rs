//! DEFLATE compression.
//!
//! This module implements DEFLATE compression as specified in RFC 1951.
//! It supports:
//! - Stored blocks (no compression)
//! - Fixed Huffman codes
//! - Dynamic Huffman codes
//!
//! The input is tokenized once by the LZ77 encoder and the tokens are cut
//! into blocks of at most [`MAX_BLOCK_TOKENS`]. For every block the exact
//! encoded size is computed for all three block kinds; under
//! [`BlockStrategy::Auto`] the smallest one is written.

use crate::block::BlockKind;
use crate::huffman::{
    CodeTable, DISTANCE_ALPHABET_SIZE, END_OF_BLOCK, HuffmanBuilder, LITLEN_ALPHABET_SIZE,
    MAX_CODE_LENGTH, MAX_CODELEN_LENGTH,
};
use crate::lz77::{Lz77Encoder, Lz77Token};
use crate::tables::{
    CODE_LENGTH_ORDER, DISTANCE_EXTRA_BITS, LENGTH_EXTRA_BITS, distance_to_code,
    fixed_distance_lengths, fixed_litlen_lengths, length_to_code,
};
use deflurl_core::bitstream::BitWriter;
use deflurl_core::level::CompressionLevel;
use tracing::{debug, trace};

/// Maximum number of LZ77 tokens per block.
pub const MAX_BLOCK_TOKENS: usize = 16384;

/// Maximum payload of one stored block.
pub const MAX_STORED_BLOCK: usize = 65535;

/// How the encoder picks the kind of each block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum BlockStrategy {
    /// Smallest of stored, fixed and dynamic for every block.
    #[default]
    Auto,
    /// Stored blocks only.
    Stored,
    /// Fixed Huffman blocks only.
    Fixed,
    /// Dynamic Huffman blocks only.
    Dynamic,
}

/// Compression settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DeflateOptions {
    /// Compression level (match finder effort).
    pub level: CompressionLevel,
    /// Block kind selection.
    pub strategy: BlockStrategy,
}

impl DeflateOptions {
    /// Default options: level 6, automatic block selection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Options that store the input without compression.
    pub fn stored() -> Self {
        Self {
            level: CompressionLevel::NONE,
            strategy: BlockStrategy::Stored,
        }
    }

    /// Set the compression level.
    pub fn with_level(mut self, level: impl Into<CompressionLevel>) -> Self {
        self.level = level.into();
        self
    }

    /// Set the block strategy.
    pub fn with_strategy(mut self, strategy: BlockStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    fn stores_only(&self) -> bool {
        self.level.is_store() || self.strategy == BlockStrategy::Stored
    }
}

/// Symbol counts for one block, end-of-block included.
#[derive(Debug, Clone)]
struct SymbolFrequencies {
    litlen: [u32; LITLEN_ALPHABET_SIZE],
    dist: [u32; DISTANCE_ALPHABET_SIZE],
}

impl SymbolFrequencies {
    fn count(tokens: &[Lz77Token]) -> Self {
        let mut litlen = [0u32; LITLEN_ALPHABET_SIZE];
        let mut dist = [0u32; DISTANCE_ALPHABET_SIZE];

        for token in tokens {
            match *token {
                Lz77Token::Literal(byte) => litlen[byte as usize] += 1,
                Lz77Token::Match { length, distance } => {
                    litlen[length_to_code(length).symbol as usize] += 1;
                    dist[distance_to_code(distance).symbol as usize] += 1;
                }
            }
        }
        litlen[END_OF_BLOCK as usize] += 1;

        Self { litlen, dist }
    }

    /// Bits needed for the block body under the given code lengths.
    fn cost(&self, litlen_lengths: &[u8], dist_lengths: &[u8]) -> u64 {
        let litlen: u64 = self
            .litlen
            .iter()
            .zip(litlen_lengths)
            .enumerate()
            .map(|(symbol, (&freq, &len))| {
                let extra = if symbol > END_OF_BLOCK as usize {
                    LENGTH_EXTRA_BITS[symbol - 257]
                } else {
                    0
                };
                freq as u64 * (len as u64 + extra as u64)
            })
            .sum();

        let dist: u64 = self
            .dist
            .iter()
            .zip(dist_lengths)
            .zip(DISTANCE_EXTRA_BITS)
            .map(|((&freq, &len), extra)| freq as u64 * (len as u64 + extra as u64))
            .sum();

        litlen + dist
    }
}

/// One symbol of the run-length coded code length sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct CodeLengthSymbol {
    symbol: u8,
    extra_bits: u8,
    extra_value: u8,
}

impl CodeLengthSymbol {
    fn plain(length: u8) -> Self {
        Self {
            symbol: length,
            extra_bits: 0,
            extra_value: 0,
        }
    }

    fn repeat(symbol: u8, extra_bits: u8, extra_value: usize) -> Self {
        Self {
            symbol,
            extra_bits,
            extra_value: extra_value as u8,
        }
    }
}

/// Run-length code a sequence of code lengths with symbols 16, 17 and 18.
fn rle_encode_lengths(lengths: &[u8]) -> Vec<CodeLengthSymbol> {
    let mut symbols = Vec::new();
    let mut i = 0;

    while i < lengths.len() {
        let len = lengths[i];
        let run = lengths[i..].iter().take_while(|&&l| l == len).count();
        let mut left = run;

        if len == 0 {
            while left >= 11 {
                let n = left.min(138);
                symbols.push(CodeLengthSymbol::repeat(18, 7, n - 11));
                left -= n;
            }
            if left >= 3 {
                symbols.push(CodeLengthSymbol::repeat(17, 3, left - 3));
                left = 0;
            }
        } else {
            symbols.push(CodeLengthSymbol::plain(len));
            left -= 1;
            while left >= 3 {
                let n = left.min(6);
                symbols.push(CodeLengthSymbol::repeat(16, 2, n - 3));
                left -= n;
            }
        }
        symbols.extend(std::iter::repeat_n(CodeLengthSymbol::plain(len), left));

        i += run;
    }

    symbols
}

/// Number of leading entries to transmit: up to the last non-zero length.
fn used_count(lengths: &[u8], min: usize) -> usize {
    lengths
        .iter()
        .rposition(|&l| l != 0)
        .map_or(0, |i| i + 1)
        .max(min)
}

/// The code length tables of a dynamic block header.
#[derive(Debug, Clone)]
struct DynamicHeader {
    hlit: usize,
    hdist: usize,
    hclen: usize,
    codelen_lengths: Vec<u8>,
    symbols: Vec<CodeLengthSymbol>,
}

impl DynamicHeader {
    fn new(litlen_lengths: &[u8], dist_lengths: &[u8]) -> Self {
        let hlit = used_count(litlen_lengths, 257);
        let hdist = used_count(dist_lengths, 1);

        // Runs may cross from the literal/length into the distance lengths
        let mut combined = Vec::with_capacity(hlit + hdist);
        combined.extend_from_slice(&litlen_lengths[..hlit]);
        combined.extend_from_slice(&dist_lengths[..hdist]);
        let symbols = rle_encode_lengths(&combined);

        let mut builder = HuffmanBuilder::new(CODE_LENGTH_ORDER.len(), MAX_CODELEN_LENGTH as u8);
        for s in &symbols {
            builder.add(s.symbol as u16);
        }
        let codelen_lengths = builder.build_lengths();

        let hclen = CODE_LENGTH_ORDER
            .iter()
            .rposition(|&sym| codelen_lengths[sym] != 0)
            .map_or(0, |i| i + 1)
            .max(4);

        Self {
            hlit,
            hdist,
            hclen,
            codelen_lengths,
            symbols,
        }
    }

    /// Header size in bits, excluding the 3-bit block header.
    fn bits(&self) -> u64 {
        let tables: u64 = self
            .symbols
            .iter()
            .map(|s| self.codelen_lengths[s.symbol as usize] as u64 + s.extra_bits as u64)
            .sum();
        5 + 5 + 4 + 3 * self.hclen as u64 + tables
    }

    fn write(&self, writer: &mut BitWriter) {
        writer.write_bits((self.hlit - 257) as u32, 5);
        writer.write_bits((self.hdist - 1) as u32, 5);
        writer.write_bits((self.hclen - 4) as u32, 4);

        for &sym in &CODE_LENGTH_ORDER[..self.hclen] {
            writer.write_bits(self.codelen_lengths[sym] as u32, 3);
        }

        let table = CodeTable::from_trusted_lengths(&self.codelen_lengths);
        for s in &self.symbols {
            table.encode(writer, s.symbol as u16);
            writer.write_bits(s.extra_value as u32, s.extra_bits);
        }
    }
}

fn write_block_header(writer: &mut BitWriter, is_final: bool, kind: BlockKind) {
    writer.write_bit(is_final);
    writer.write_bits(kind.btype() as u32, 2);
}

/// Size in bits of `len` bytes written as stored blocks from `bit_position`.
fn stored_size(bit_position: u64, len: usize) -> u64 {
    let blocks = len.div_ceil(MAX_STORED_BLOCK).max(1) as u64;
    let first_padding = (8 - (bit_position + 3) % 8) % 8;
    // Later blocks start aligned: 3 header bits plus 5 padding bits
    3 + first_padding + 32 + (blocks - 1) * (8 + 32) + 8 * len as u64
}

/// Write stored (uncompressed) blocks.
fn write_stored_blocks(writer: &mut BitWriter, data: &[u8], is_final: bool) {
    let blocks = data.len().div_ceil(MAX_STORED_BLOCK).max(1);

    for index in 0..blocks {
        let start = index * MAX_STORED_BLOCK;
        let chunk = &data[start..(start + MAX_STORED_BLOCK).min(data.len())];

        write_block_header(writer, is_final && index + 1 == blocks, BlockKind::Stored);
        writer.align_to_byte();

        let len = chunk.len() as u16;
        writer.write_bits(len as u32, 16);
        writer.write_bits(!len as u32, 16);
        writer.write_bytes(chunk);
    }
}

/// Write the token stream of a Huffman block, end-of-block included.
fn write_tokens(
    writer: &mut BitWriter,
    tokens: &[Lz77Token],
    litlen: &CodeTable,
    dist: &CodeTable,
) {
    for token in tokens {
        match *token {
            Lz77Token::Literal(byte) => litlen.encode(writer, byte as u16),
            Lz77Token::Match { length, distance } => {
                let len_code = length_to_code(length);
                litlen.encode(writer, len_code.symbol);
                writer.write_bits(len_code.extra_value as u32, len_code.extra_bits);

                let dist_code = distance_to_code(distance);
                dist.encode(writer, dist_code.symbol);
                writer.write_bits(dist_code.extra_value as u32, dist_code.extra_bits);
            }
        }
    }

    litlen.encode(writer, END_OF_BLOCK);
}

/// DEFLATE compressor.
#[derive(Debug)]
pub struct Deflater {
    options: DeflateOptions,
    /// LZ77 encoder.
    lz77: Lz77Encoder,
    fixed_litlen: CodeTable,
    fixed_distance: CodeTable,
}

impl Deflater {
    /// Create a compressor with the given options.
    pub fn new(options: DeflateOptions) -> Self {
        Self {
            lz77: Lz77Encoder::with_level(options.level),
            options,
            fixed_litlen: CodeTable::fixed_litlen(),
            fixed_distance: CodeTable::fixed_distance(),
        }
    }

    /// Create a compressor with the specified level (0-9) and automatic
    /// block selection.
    pub fn with_level(level: impl Into<CompressionLevel>) -> Self {
        Self::new(DeflateOptions::new().with_level(level))
    }

    /// The options this compressor was created with.
    pub fn options(&self) -> &DeflateOptions {
        &self.options
    }

    /// Compress `data` into a complete DEFLATE stream.
    pub fn compress(&mut self, data: &[u8]) -> Vec<u8> {
        let mut writer = BitWriter::with_capacity(data.len() / 2 + 64);

        if self.options.stores_only() {
            debug!(bytes = data.len(), "writing stored blocks");
            write_stored_blocks(&mut writer, data, true);
            return writer.finish();
        }

        let tokens = self.lz77.tokenize(data);
        let block_count = tokens.len().div_ceil(MAX_BLOCK_TOKENS).max(1);

        let mut offset = 0;
        for index in 0..block_count {
            let start = index * MAX_BLOCK_TOKENS;
            let block = &tokens[start..(start + MAX_BLOCK_TOKENS).min(tokens.len())];
            let raw_len: usize = block.iter().map(Lz77Token::decoded_len).sum();

            self.write_block(
                &mut writer,
                block,
                &data[offset..offset + raw_len],
                index,
                index + 1 == block_count,
            );
            offset += raw_len;
        }

        writer.finish()
    }

    /// Encode one block of tokens; `raw` holds the bytes they expand to.
    fn write_block(
        &self,
        writer: &mut BitWriter,
        tokens: &[Lz77Token],
        raw: &[u8],
        index: usize,
        is_final: bool,
    ) {
        let freqs = SymbolFrequencies::count(tokens);

        let litlen_lengths =
            HuffmanBuilder::from_frequencies(&freqs.litlen, MAX_CODE_LENGTH as u8).build_lengths();
        let mut dist_lengths =
            HuffmanBuilder::from_frequencies(&freqs.dist, MAX_CODE_LENGTH as u8).build_lengths();
        if dist_lengths.iter().all(|&l| l == 0) {
            // Some decoders reject an empty distance code; send two unused codes
            dist_lengths[0] = 1;
            dist_lengths[1] = 1;
        }
        let header = DynamicHeader::new(&litlen_lengths, &dist_lengths);

        let stored_bits = stored_size(writer.bits_written(), raw.len());
        let fixed_bits = 3 + freqs.cost(&fixed_litlen_lengths(), &fixed_distance_lengths());
        let dynamic_bits = 3 + header.bits() + freqs.cost(&litlen_lengths, &dist_lengths);

        let kind = match self.options.strategy {
            BlockStrategy::Stored => BlockKind::Stored,
            BlockStrategy::Fixed => BlockKind::Fixed,
            BlockStrategy::Dynamic => BlockKind::Dynamic,
            BlockStrategy::Auto => {
                let mut best = (BlockKind::Fixed, fixed_bits);
                if dynamic_bits < best.1 {
                    best = (BlockKind::Dynamic, dynamic_bits);
                }
                if stored_bits < best.1 {
                    best = (BlockKind::Stored, stored_bits);
                }
                best.0
            }
        };

        debug!(
            block = index,
            %kind,
            tokens = tokens.len(),
            bytes = raw.len(),
            stored_bits,
            fixed_bits,
            dynamic_bits,
            is_final,
            "encoding block"
        );

        match kind {
            BlockKind::Stored => write_stored_blocks(writer, raw, is_final),
            BlockKind::Fixed => {
                write_block_header(writer, is_final, BlockKind::Fixed);
                write_tokens(writer, tokens, &self.fixed_litlen, &self.fixed_distance);
            }
            BlockKind::Dynamic => {
                trace!(
                    hlit = header.hlit,
                    hdist = header.hdist,
                    hclen = header.hclen,
                    "dynamic header"
                );
                write_block_header(writer, is_final, BlockKind::Dynamic);
                header.write(writer);
                write_tokens(
                    writer,
                    tokens,
                    &CodeTable::from_trusted_lengths(&litlen_lengths),
                    &CodeTable::from_trusted_lengths(&dist_lengths),
                );
            }
        }
    }
}

impl Default for Deflater {
    fn default() -> Self {
        Self::new(DeflateOptions::default())
    }
}

/// Compress data at the default level with automatic block selection.
pub fn compress(data: &[u8]) -> Vec<u8> {
    compress_with(data, &DeflateOptions::default())
}

/// Compress data with explicit options.
pub fn compress_with(data: &[u8], options: &DeflateOptions) -> Vec<u8> {
    Deflater::new(*options).compress(data)
}
