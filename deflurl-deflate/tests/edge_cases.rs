//! Edge case tests for DEFLATE compression.

use deflurl_deflate::{BlockStrategy, DeflateOptions, compress, compress_with, decompress};

const STRATEGIES: [BlockStrategy; 4] = [
    BlockStrategy::Auto,
    BlockStrategy::Stored,
    BlockStrategy::Fixed,
    BlockStrategy::Dynamic,
];

fn roundtrip_everywhere(input: &[u8]) {
    for strategy in STRATEGIES {
        for level in [0u8, 1, 4, 6, 9] {
            let options = DeflateOptions::new()
                .with_level(level)
                .with_strategy(strategy);
            let compressed = compress_with(input, &options);
            let decompressed = decompress(&compressed).unwrap();
            assert_eq!(
                decompressed, input,
                "strategy {:?}, level {} failed",
                strategy, level
            );
        }
    }
}

#[test]
fn test_empty_input() {
    roundtrip_everywhere(b"");
}

#[test]
fn test_single_byte() {
    roundtrip_everywhere(b"A");
    roundtrip_everywhere(&[0xFF]);
}

#[test]
fn test_all_zeros() {
    let input = vec![0u8; 1000];
    let compressed = compress(&input);
    let decompressed = decompress(&compressed).unwrap();
    assert_eq!(decompressed, input);
    // All zeros should compress very well
    assert!(compressed.len() < input.len() / 10);
}

#[test]
fn test_all_same_byte() {
    let input = vec![255u8; 5000];
    let compressed = compress(&input);
    let decompressed = decompress(&compressed).unwrap();
    assert_eq!(decompressed, input);
    // Repeated byte should compress extremely well
    assert!(compressed.len() < input.len() / 20);
}

#[test]
fn test_max_match_length() {
    // Runs of exactly 258 identical bytes, separated by a marker
    let mut input = Vec::new();
    for i in 0..10u8 {
        input.extend(std::iter::repeat_n(42u8, 258));
        input.push(i);
    }
    roundtrip_everywhere(&input);
}

#[test]
fn test_alternating_pattern() {
    let input: Vec<u8> = (0..1000)
        .map(|i| if i % 2 == 0 { b'A' } else { b'B' })
        .collect();
    roundtrip_everywhere(&input);
}

#[test]
fn test_large_input() {
    // 1MB of text spans many token blocks
    let mut input = Vec::with_capacity(1024 * 1024);
    let pattern = b"The quick brown fox jumps over the lazy dog. ";
    while input.len() < 1024 * 1024 {
        input.extend_from_slice(pattern);
    }
    input.truncate(1024 * 1024);

    let compressed = compress_with(&input, &DeflateOptions::new().with_level(5));
    let decompressed = decompress(&compressed).unwrap();
    assert_eq!(decompressed.len(), 1024 * 1024);
    assert_eq!(decompressed, input);
}

#[test]
fn test_incremental_pattern() {
    let mut input = Vec::new();
    for i in 0..256 {
        for _ in 0..10 {
            input.push(i as u8);
        }
    }
    roundtrip_everywhere(&input);
}

#[test]
fn test_binary_data() {
    // Binary data with all byte values
    let input: Vec<u8> = (0..=255).cycle().take(5000).collect();
    roundtrip_everywhere(&input);
}

#[test]
fn test_long_distance_match() {
    // A match at exactly the maximum distance (32KB)
    let mut input = vec![0u8; 32768 + 16];
    let pattern = b"PATTERN_TO_MATCH";
    input[..pattern.len()].copy_from_slice(pattern);
    input[32768..].copy_from_slice(pattern);

    for level in [1u8, 9] {
        let compressed = compress_with(&input, &DeflateOptions::new().with_level(level));
        assert_eq!(decompress(&compressed).unwrap(), input);
    }
}

#[test]
fn test_beyond_window_distance() {
    // The repeat lies just outside the window and must be re-sent
    let mut input = vec![b'.'; 40000];
    let pattern = b"0123456789abcdef";
    input[..pattern.len()].copy_from_slice(pattern);
    input[40000 - pattern.len()..].copy_from_slice(pattern);

    let compressed = compress_with(&input, &DeflateOptions::new().with_level(9));
    assert_eq!(decompress(&compressed).unwrap(), input);
}

#[test]
fn test_utf8_text() {
    let text = "Grüße aus Köln! 日本語のテキスト。 Ελληνικά κείμενα. 🦀🦀🦀 ".repeat(40);
    roundtrip_everywhere(text.as_bytes());
}

#[test]
fn test_many_distinct_lengths() {
    // Back-references of every length 3-258 exercise all length codes
    let mut input = Vec::new();
    for len in 3..=258usize {
        let chunk: Vec<u8> = (0..len).map(|i| (i * 7 + len) as u8).collect();
        input.extend_from_slice(&chunk);
        input.push(0xEE);
        input.extend_from_slice(&chunk);
        input.push(0xDD);
    }
    roundtrip_everywhere(&input);
}
