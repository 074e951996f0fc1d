//! Info command implementation.

use crate::utils::{inflate_options, read_encoded};
use deflurl::{Inspection, inspect};
use serde::Serialize;

/// Machine-readable form of an [`Inspection`].
#[derive(Debug, Serialize)]
struct InfoReport {
    encoded_chars: usize,
    compressed_bytes: usize,
    original_bytes: usize,
    ratio: f64,
    blocks: Vec<BlockReport>,
}

#[derive(Debug, Serialize)]
struct BlockReport {
    kind: &'static str,
    is_final: bool,
    bit_offset: u64,
    compressed_bits: u64,
    decoded_bytes: usize,
}

impl From<&Inspection> for InfoReport {
    fn from(inspection: &Inspection) -> Self {
        Self {
            encoded_chars: inspection.encoded_len,
            compressed_bytes: inspection.compressed_len,
            original_bytes: inspection.text.len(),
            ratio: inspection.ratio(),
            blocks: inspection
                .blocks
                .iter()
                .map(|b| BlockReport {
                    kind: b.kind.name(),
                    is_final: b.is_final,
                    bit_offset: b.bit_offset,
                    compressed_bits: b.compressed_bits,
                    decoded_bytes: b.decoded_len,
                })
                .collect(),
        }
    }
}

pub fn cmd_info(
    encoded: Option<String>,
    json: bool,
    max_output: Option<usize>,
) -> Result<(), Box<dyn std::error::Error>> {
    let encoded = read_encoded(encoded)?;
    let inspection = inspect(&encoded, &inflate_options(max_output))?;
    let report = InfoReport::from(&inspection);

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("Packed String Information");
    println!("=========================");
    println!("Encoded length: {} chars", report.encoded_chars);
    println!("Compressed size: {} bytes", report.compressed_bytes);
    println!("Original size: {} bytes", report.original_bytes);
    if report.original_bytes > 0 {
        println!("Packed/original: {:.1}%", report.ratio * 100.0);
    }

    println!();
    println!("Blocks:");
    for (index, block) in report.blocks.iter().enumerate() {
        println!(
            "  #{:<3} {:<8} {:>8} bits -> {:>8} bytes{}",
            index,
            block.kind,
            block.compressed_bits,
            block.decoded_bytes,
            if block.is_final { "  (final)" } else { "" }
        );
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use deflurl::compress_text;

    #[test]
    fn test_report_from_inspection() {
        let encoded = compress_text("hello hello hello");
        let inspection = inspect(&encoded, &inflate_options(None)).unwrap();
        let report = InfoReport::from(&inspection);

        assert_eq!(report.original_bytes, 17);
        assert_eq!(report.encoded_chars, encoded.len());
        assert_eq!(report.blocks.len(), 1);
        assert!(report.blocks[0].is_final);

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["original_bytes"], 17);
        assert_eq!(json["blocks"][0]["bit_offset"], 0);
    }

    #[test]
    fn test_limit_applies_to_inspection() {
        let encoded = compress_text(&"bomb".repeat(5_000));
        assert!(inspect(&encoded, &inflate_options(Some(20_000))).is_ok());
        assert!(matches!(
            inspect(&encoded, &inflate_options(Some(1_000))),
            Err(deflurl::DeflurlError::OutputLimitExceeded { limit: 1_000 })
        ));
        assert!(cmd_info(Some(encoded), true, Some(1_000)).is_err());
    }
}
