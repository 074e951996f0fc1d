//! DEFLATE decompression (inflate).
//!
//! This module implements the DEFLATE decompression algorithm as specified
//! in RFC 1951. It supports all three block types:
//! - Type 0: Stored (uncompressed)
//! - Type 1: Fixed Huffman codes
//! - Type 2: Dynamic Huffman codes
//!
//! Decoding stops after the block marked final; any bytes after it are
//! ignored. Input that ends before a final block fails, and no partial
//! output is ever returned.

use crate::block::{BlockInfo, BlockKind};
use crate::huffman::{
    CODELEN_ALPHABET_SIZE, DISTANCE_ALPHABET_SIZE, END_OF_BLOCK, HuffmanTree, LITLEN_ALPHABET_SIZE,
};
use crate::tables::{
    CODE_LENGTH_ORDER, DISTANCE_EXTRA_BITS, LENGTH_EXTRA_BITS, decode_distance, decode_length,
};
use deflurl_core::bitstream::BitReader;
use deflurl_core::error::{DeflurlError, Result};
use deflurl_core::window::OutputWindow;
use tracing::{debug, trace};

/// Decompression settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct InflateOptions {
    /// Upper bound on the decompressed size; `None` means unlimited.
    pub max_output: Option<usize>,
}

impl InflateOptions {
    /// Default options: no output limit.
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail with `OutputLimitExceeded` once the output would exceed `limit` bytes.
    pub fn with_max_output(mut self, limit: usize) -> Self {
        self.max_output = Some(limit);
        self
    }
}

/// DEFLATE decompressor.
#[derive(Debug)]
pub struct Inflater {
    options: InflateOptions,
    /// Blocks seen by the last call to [`Inflater::inflate`].
    blocks: Vec<BlockInfo>,
    fixed_litlen: HuffmanTree,
    fixed_distance: HuffmanTree,
}

impl Inflater {
    /// Create a new DEFLATE decompressor.
    pub fn new() -> Self {
        Self::with_options(InflateOptions::default())
    }

    /// Create a decompressor with the given options.
    pub fn with_options(options: InflateOptions) -> Self {
        Self {
            options,
            blocks: Vec::new(),
            fixed_litlen: HuffmanTree::fixed_litlen(),
            fixed_distance: HuffmanTree::fixed_distance(),
        }
    }

    /// The options this decompressor was created with.
    pub fn options(&self) -> &InflateOptions {
        &self.options
    }

    /// Blocks decoded by the last call to [`Inflater::inflate`].
    ///
    /// After a failed call this lists the blocks completed before the error.
    pub fn blocks(&self) -> &[BlockInfo] {
        &self.blocks
    }

    /// Decompress a complete DEFLATE stream.
    pub fn inflate(&mut self, data: &[u8]) -> Result<Vec<u8>> {
        self.blocks.clear();

        let mut reader = BitReader::new(data);
        let mut window = OutputWindow::deflate().with_limit(self.options.max_output);

        loop {
            // No complete block fits in what is left of the last byte
            if reader.remaining_bits() < 8 {
                return Err(DeflurlError::truncated(reader.bit_position()));
            }

            let info = self.inflate_block(&mut reader, &mut window)?;
            self.blocks.push(info);

            if info.is_final {
                break;
            }
        }

        debug!(
            blocks = self.blocks.len(),
            consumed_bytes = reader.bit_position().div_ceil(8),
            trailing_bytes = reader.remaining_bytes(),
            output = window.len(),
            "inflate finished"
        );

        Ok(window.into_output())
    }

    /// Decompress a single block.
    fn inflate_block(
        &self,
        reader: &mut BitReader<'_>,
        window: &mut OutputWindow,
    ) -> Result<BlockInfo> {
        let bit_offset = reader.bit_position();
        let start_len = window.len();

        let is_final = reader.read_bit()?;
        let kind = BlockKind::from_btype(reader.read_bits(2)? as u8)?;
        debug!(%kind, is_final, bit_offset, "block header");

        match kind {
            BlockKind::Stored => inflate_stored(reader, window)?,
            BlockKind::Fixed => {
                inflate_huffman(reader, window, &self.fixed_litlen, &self.fixed_distance)?
            }
            BlockKind::Dynamic => {
                let (litlen, distance) = read_dynamic_trees(reader)?;
                inflate_huffman(reader, window, &litlen, &distance)?
            }
        }

        Ok(BlockInfo {
            kind,
            is_final,
            bit_offset,
            compressed_bits: reader.bit_position() - bit_offset,
            decoded_len: window.len() - start_len,
        })
    }
}

impl Default for Inflater {
    fn default() -> Self {
        Self::new()
    }
}

/// Decompress a stored (uncompressed) block.
fn inflate_stored(reader: &mut BitReader<'_>, window: &mut OutputWindow) -> Result<()> {
    reader.align_to_byte();

    let len = reader.read_bits(16)? as u16;
    let nlen = reader.read_bits(16)? as u16;
    if len != !nlen {
        return Err(DeflurlError::stored_length_mismatch(len, nlen));
    }

    window.write_literals(reader.read_bytes(len as usize)?)
}

/// Read the code length tables of a dynamic block and build its trees.
fn read_dynamic_trees(reader: &mut BitReader<'_>) -> Result<(HuffmanTree, HuffmanTree)> {
    let hlit = reader.read_bits(5)? as usize + 257;
    let hdist = reader.read_bits(5)? as usize + 1;
    let hclen = reader.read_bits(4)? as usize + 4;
    trace!(hlit, hdist, hclen, "dynamic header");

    if hlit > LITLEN_ALPHABET_SIZE || hdist > DISTANCE_ALPHABET_SIZE {
        return Err(DeflurlError::invalid_code_lengths(format!(
            "too many codes: HLIT={}, HDIST={}",
            hlit, hdist
        )));
    }

    let mut codelen_lengths = [0u8; CODELEN_ALPHABET_SIZE];
    for &sym in &CODE_LENGTH_ORDER[..hclen] {
        codelen_lengths[sym] = reader.read_bits(3)? as u8;
    }
    let codelen_tree = HuffmanTree::from_code_lengths(&codelen_lengths)?;

    let mut lengths = vec![0u8; hlit + hdist];
    let mut i = 0;
    while i < lengths.len() {
        let symbol = codelen_tree.decode(reader)?;
        let (value, repeat) = match symbol {
            0..=15 => (symbol as u8, 1),
            16 => {
                if i == 0 {
                    return Err(DeflurlError::invalid_code_lengths(
                        "repeat code with no previous length",
                    ));
                }
                (lengths[i - 1], reader.read_bits(2)? as usize + 3)
            }
            17 => (0, reader.read_bits(3)? as usize + 3),
            _ => (0, reader.read_bits(7)? as usize + 11),
        };

        if i + repeat > lengths.len() {
            return Err(DeflurlError::invalid_code_lengths(format!(
                "code length repeat overruns {} lengths",
                lengths.len()
            )));
        }
        lengths[i..i + repeat].fill(value);
        i += repeat;
    }

    let (litlen_lengths, dist_lengths) = lengths.split_at(hlit);
    if litlen_lengths[END_OF_BLOCK as usize] == 0 {
        return Err(DeflurlError::invalid_code_lengths(
            "missing end-of-block code",
        ));
    }

    Ok((
        HuffmanTree::from_code_lengths(litlen_lengths)?,
        HuffmanTree::from_code_lengths(dist_lengths)?,
    ))
}

/// Decode literal/length and distance symbols until end of block.
fn inflate_huffman(
    reader: &mut BitReader<'_>,
    window: &mut OutputWindow,
    litlen_tree: &HuffmanTree,
    dist_tree: &HuffmanTree,
) -> Result<()> {
    loop {
        let symbol = litlen_tree.decode(reader)?;

        match symbol {
            0..=255 => window.write_literal(symbol as u8)?,
            END_OF_BLOCK => return Ok(()),
            257..=285 => {
                let extra_bits = LENGTH_EXTRA_BITS[(symbol - 257) as usize];
                let length = decode_length(symbol, reader.read_bits(extra_bits)? as u16);

                let dist_symbol = dist_tree.decode(reader)?;
                if dist_symbol as usize >= DISTANCE_ALPHABET_SIZE {
                    return Err(DeflurlError::invalid_symbol(dist_symbol, "distance"));
                }
                let extra_bits = DISTANCE_EXTRA_BITS[dist_symbol as usize];
                let distance = decode_distance(dist_symbol, reader.read_bits(extra_bits)? as u16);

                window.copy_match(distance as usize, length as usize)?;
            }
            _ => return Err(DeflurlError::invalid_symbol(symbol, "literal/length")),
        }
    }
}

/// Decompress DEFLATE data.
pub fn decompress(data: &[u8]) -> Result<Vec<u8>> {
    Inflater::new().inflate(data)
}

/// Decompress DEFLATE data with explicit options.
pub fn decompress_with(data: &[u8], options: &InflateOptions) -> Result<Vec<u8>> {
    Inflater::with_options(*options).inflate(data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::deflate::{BlockStrategy, DeflateOptions, compress_with};
    use deflurl_core::bitstream::BitWriter;

    #[test]
    fn test_inflate_stored() {
        // Stored block: BFINAL=1, BTYPE=00, then aligned LEN=5, NLEN=!5, "Hello"
        let compressed = vec![
            0x01, // BFINAL=1, BTYPE=00, padding
            0x05, 0x00, // LEN=5
            0xFA, 0xFF, // NLEN=65530
            b'H', b'e', b'l', b'l', b'o',
        ];

        let result = decompress(&compressed).unwrap();
        assert_eq!(result, b"Hello");
    }

    #[test]
    fn test_inflate_empty() {
        let compressed = vec![
            0x01, // BFINAL=1, BTYPE=00
            0x00, 0x00, // LEN=0
            0xFF, 0xFF, // NLEN
        ];
        assert!(decompress(&compressed).unwrap().is_empty());

        // Fixed block with only the end-of-block code
        assert!(decompress(&[0x03, 0x00]).unwrap().is_empty());
    }

    #[test]
    fn test_fixed_block_by_hand() {
        // 'a' then a length-3 distance-1 match then EOB, with fixed codes
        let mut writer = BitWriter::new();
        writer.write_bit(true);
        writer.write_bits(0b01, 2);
        let table = crate::huffman::CodeTable::fixed_litlen();
        table.encode(&mut writer, b'a' as u16);
        table.encode(&mut writer, 257);
        crate::huffman::CodeTable::fixed_distance().encode(&mut writer, 0);
        table.encode(&mut writer, END_OF_BLOCK);

        assert_eq!(decompress(&writer.finish()).unwrap(), b"aaaa");
    }

    #[test]
    fn test_nlen_mismatch() {
        let compressed = [0x01, 0x05, 0x00, 0xFB, 0xFF, b'H', b'e', b'l', b'l', b'o'];
        assert!(matches!(
            decompress(&compressed),
            Err(DeflurlError::StoredLengthMismatch {
                len: 5,
                nlen: 0xFFFB
            })
        ));
    }

    #[test]
    fn test_reserved_block_type() {
        // BFINAL=1, BTYPE=11
        assert!(matches!(
            decompress(&[0x07, 0x00]),
            Err(DeflurlError::InvalidBlockType(3))
        ));
    }

    #[test]
    fn test_truncated_inputs() {
        assert!(matches!(
            decompress(&[]),
            Err(DeflurlError::TruncatedStream { .. })
        ));

        // A complete non-final stored block and nothing after it
        let compressed = [0x00, 0x01, 0x00, 0xFE, 0xFF, b'x'];
        assert!(matches!(
            decompress(&compressed),
            Err(DeflurlError::TruncatedStream { bit_position: 48 })
        ));

        // Cut inside the stored payload
        let compressed = [0x01, 0x05, 0x00, 0xFA, 0xFF, b'H', b'e'];
        assert!(matches!(
            decompress(&compressed),
            Err(DeflurlError::UnexpectedEndOfStream { .. })
        ));
    }

    #[test]
    fn test_every_prefix_fails() {
        let data = b"abracadabra abracadabra, said the magician to the rabbit";
        for strategy in [BlockStrategy::Fixed, BlockStrategy::Dynamic] {
            let stream = compress_with(data, &DeflateOptions::new().with_strategy(strategy));
            for cut in 0..stream.len() {
                let err = decompress(&stream[..cut]).unwrap_err();
                assert!(err.is_truncation(), "cut {} gave {:?}", cut, err);
            }
        }
    }

    #[test]
    fn test_distance_too_far() {
        // Fixed block starting with a match: nothing to copy from yet
        let mut writer = BitWriter::new();
        writer.write_bit(true);
        writer.write_bits(0b01, 2);
        crate::huffman::CodeTable::fixed_litlen().encode(&mut writer, 257);
        crate::huffman::CodeTable::fixed_distance().encode(&mut writer, 0);

        assert!(matches!(
            decompress(&writer.finish()),
            Err(DeflurlError::InvalidDistance {
                distance: 1,
                available: 0
            })
        ));
    }

    #[test]
    fn test_invalid_symbols() {
        let litlen = crate::huffman::CodeTable::fixed_litlen();

        let mut writer = BitWriter::new();
        writer.write_bit(true);
        writer.write_bits(0b01, 2);
        litlen.encode(&mut writer, 286);
        assert!(matches!(
            decompress(&writer.finish()),
            Err(DeflurlError::InvalidSymbol { symbol: 286, .. })
        ));

        let mut writer = BitWriter::new();
        writer.write_bit(true);
        writer.write_bits(0b01, 2);
        litlen.encode(&mut writer, b'z' as u16);
        litlen.encode(&mut writer, 257);
        crate::huffman::CodeTable::fixed_distance().encode(&mut writer, 31);
        assert!(matches!(
            decompress(&writer.finish()),
            Err(DeflurlError::InvalidSymbol { symbol: 31, .. })
        ));
    }

    #[test]
    fn test_dynamic_repeat_without_previous() {
        // HLIT=0, HDIST=0, HCLEN=0: lengths for symbols 16, 17, 18, 0
        let mut writer = BitWriter::new();
        writer.write_bit(true);
        writer.write_bits(0b10, 2);
        writer.write_bits(0, 5);
        writer.write_bits(0, 5);
        writer.write_bits(0, 4);
        // 16 -> 1 bit, 17 -> 0, 18 -> 0, 0 -> 1 bit
        for len in [1, 0, 0, 1] {
            writer.write_bits(len, 3);
        }
        // Canonical codes: symbol 0 = "0", symbol 16 = "1"
        writer.write_bits(1, 1);
        writer.write_bits(0, 2);

        assert!(matches!(
            decompress(&writer.finish()),
            Err(DeflurlError::InvalidCodeLengths { .. })
        ));
    }

    /// Start a final dynamic block with HLIT=257, HDIST=1 and a code length
    /// code giving symbols 0, 1, 17 and 18 two bits each.
    fn dynamic_header(writer: &mut BitWriter) -> crate::huffman::CodeTable {
        writer.write_bit(true);
        writer.write_bits(0b10, 2);
        writer.write_bits(0, 5);
        writer.write_bits(0, 5);
        // Symbol 1 sits last but one in the permutation: HCLEN = 18 - 4
        writer.write_bits(14, 4);

        let mut lengths = [0u8; CODELEN_ALPHABET_SIZE];
        for sym in [0, 1, 17, 18] {
            lengths[sym] = 2;
        }
        for &sym in &CODE_LENGTH_ORDER[..18] {
            writer.write_bits(lengths[sym] as u32, 3);
        }
        crate::huffman::CodeTable::from_code_lengths(&lengths).unwrap()
    }

    #[test]
    fn test_dynamic_repeat_overrun() {
        let mut writer = BitWriter::new();
        let codelen = dynamic_header(&mut writer);
        // 138 + 138 zeros against 257 + 1 lengths
        for _ in 0..2 {
            codelen.encode(&mut writer, 18);
            writer.write_bits(127, 7);
        }

        match decompress(&writer.finish()) {
            Err(DeflurlError::InvalidCodeLengths { message }) => {
                assert!(message.contains("overruns 258"), "{}", message)
            }
            other => panic!("expected InvalidCodeLengths, got {:?}", other),
        }
    }

    #[test]
    fn test_dynamic_missing_end_of_block() {
        let mut writer = BitWriter::new();
        let codelen = dynamic_header(&mut writer);
        // 138 + 120 zeros fill all 258 lengths, symbol 256 included
        codelen.encode(&mut writer, 18);
        writer.write_bits(127, 7);
        codelen.encode(&mut writer, 18);
        writer.write_bits(109, 7);

        match decompress(&writer.finish()) {
            Err(DeflurlError::InvalidCodeLengths { message }) => {
                assert!(message.contains("end-of-block"), "{}", message)
            }
            other => panic!("expected InvalidCodeLengths, got {:?}", other),
        }
    }

    #[test]
    fn test_output_limit() {
        let data = vec![b'z'; 10_000];
        let stream = compress_with(&data, &DeflateOptions::new());

        let options = InflateOptions::new().with_max_output(10_000);
        assert_eq!(decompress_with(&stream, &options).unwrap(), data);

        let options = InflateOptions::new().with_max_output(9_999);
        assert!(matches!(
            decompress_with(&stream, &options),
            Err(DeflurlError::OutputLimitExceeded { limit: 9_999 })
        ));
    }

    #[test]
    fn test_trailing_bytes_ignored() {
        let mut stream = compress_with(b"payload", &DeflateOptions::new());
        stream.extend_from_slice(b"garbage after the final block");
        assert_eq!(decompress(&stream).unwrap(), b"payload");
    }

    #[test]
    fn test_block_info() {
        let data: Vec<u8> = (0..200_000u32).map(|i| (i % 251) as u8).collect();
        let stream = compress_with(&data, &DeflateOptions::stored());

        let mut inflater = Inflater::new();
        assert_eq!(inflater.inflate(&stream).unwrap(), data);

        let blocks = inflater.blocks();
        assert_eq!(blocks.len(), 4);
        assert!(blocks.iter().all(|b| b.kind == BlockKind::Stored));
        assert!(blocks[3].is_final && !blocks[2].is_final);
        assert_eq!(blocks.iter().map(|b| b.decoded_len).sum::<usize>(), data.len());
        assert_eq!(blocks[0].compressed_bits, (5 + 65535) * 8);
        assert_eq!(blocks[1].bit_offset, (5 + 65535) * 8);
    }
}
