//! Interoperability with an independent DEFLATE implementation.
//!
//! `flate2` is used purely as a reference decoder and encoder here; the
//! codec itself never links against it.

use deflurl_deflate::{BlockStrategy, DeflateOptions, compress_with, decompress};
use flate2::Compression;
use flate2::read::DeflateDecoder;
use flate2::write::DeflateEncoder;
use std::io::{Read, Write};

fn reference_inflate(data: &[u8]) -> Vec<u8> {
    let mut decoder = DeflateDecoder::new(data);
    let mut out = Vec::new();
    decoder.read_to_end(&mut out).unwrap();
    out
}

fn reference_deflate(data: &[u8], level: u32) -> Vec<u8> {
    let mut encoder = DeflateEncoder::new(Vec::new(), Compression::new(level));
    encoder.write_all(data).unwrap();
    encoder.finish().unwrap()
}

fn samples() -> Vec<(&'static str, Vec<u8>)> {
    let mut text = Vec::new();
    while text.len() < 200_000 {
        text.extend_from_slice(
            b"Lorem ipsum dolor sit amet, consectetur adipiscing elit, sed do eiusmod. ",
        );
        text.extend_from_slice(format!("{} ", text.len() % 977).as_bytes());
    }

    let mut state = 0x9E37_79B9u32;
    let noise: Vec<u8> = (0..50_000)
        .map(|_| {
            state = state.wrapping_mul(1_103_515_245).wrapping_add(12345);
            (state >> 16) as u8
        })
        .collect();

    vec![
        ("empty", Vec::new()),
        ("single", b"x".to_vec()),
        ("hello", b"hello hello hello".to_vec()),
        ("zeros", vec![0u8; 100_000]),
        ("text", text),
        ("noise", noise),
        ("no-matches", (0..=255u8).collect()),
        ("json", br#"{"title":"note","body":"remember the milk","tags":["a","b","a","b"]}"#.to_vec()),
    ]
}

#[test]
fn test_reference_decodes_our_output() {
    for (name, data) in samples() {
        for strategy in [
            BlockStrategy::Auto,
            BlockStrategy::Stored,
            BlockStrategy::Fixed,
            BlockStrategy::Dynamic,
        ] {
            for level in [1u8, 6, 9] {
                let options = DeflateOptions::new()
                    .with_level(level)
                    .with_strategy(strategy);
                let compressed = compress_with(&data, &options);
                assert_eq!(
                    reference_inflate(&compressed),
                    data,
                    "{} with {:?} at level {}",
                    name,
                    strategy,
                    level
                );
            }
        }
    }
}

#[test]
fn test_we_decode_reference_output() {
    for (name, data) in samples() {
        for level in [0u32, 1, 6, 9] {
            let compressed = reference_deflate(&data, level);
            assert_eq!(
                decompress(&compressed).unwrap(),
                data,
                "{} at reference level {}",
                name,
                level
            );
        }
    }
}

#[test]
fn test_ratio_close_to_reference() {
    let (_, text) = samples().swap_remove(4);
    let ours = compress_with(&text, &DeflateOptions::new().with_level(9));
    let theirs = reference_deflate(&text, 9);
    // Same algorithm family; allow some slack for parsing differences
    assert!(
        ours.len() <= theirs.len() * 3 / 2,
        "ours {} vs reference {}",
        ours.len(),
        theirs.len()
    );
}
