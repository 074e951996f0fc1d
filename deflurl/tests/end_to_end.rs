//! Text-level round trips through the public API.

use deflurl::base64url;
use deflurl::{
    BlockStrategy, DeflateOptions, DeflurlError, InflateOptions, compress_text,
    compress_text_with, decompress_text, decompress_text_with,
};
use proptest::prelude::*;

fn is_url_safe(s: &str) -> bool {
    s.bytes()
        .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_')
}

#[test]
fn test_repeated_words() {
    let encoded = compress_text("hello hello hello");
    assert!(is_url_safe(&encoded));
    assert_eq!(decompress_text(&encoded).unwrap(), "hello hello hello");
}

#[test]
fn test_long_text_shrinks() {
    let text = "Lorem ipsum dolor sit amet, consectetur adipiscing elit. ".repeat(200);
    let encoded = compress_text(&text);
    assert!(encoded.len() < text.len() / 10);
    assert_eq!(decompress_text(&encoded).unwrap(), text);
}

#[test]
fn test_multibyte_text() {
    let text = "naïve café, 日本語のテキスト, emoji 🦀🦀🦀 and more 🦀";
    for level in 0..=9u8 {
        let encoded = compress_text_with(text, &DeflateOptions::new().with_level(level));
        assert!(is_url_safe(&encoded));
        assert_eq!(decompress_text(&encoded).unwrap(), text);
    }
}

#[test]
fn test_standard_alphabet_accepted() {
    // Same bytes spelled with '+' and '/' and explicit padding.
    let encoded = compress_text_with("hi", &DeflateOptions::stored());
    let standard = encoded.replace('-', "+").replace('_', "/") + "==";
    assert_eq!(decompress_text(&standard).unwrap(), "hi");
}

#[test]
fn test_invalid_utf8_rejected() {
    let compressed = deflurl_deflate::compress(&[0xFF, 0xFE, 0xFD]);
    let encoded = base64url::encode(&compressed);
    assert!(matches!(
        decompress_text(&encoded),
        Err(DeflurlError::Utf8Decode(_))
    ));
}

#[test]
fn test_bad_base64_rejected() {
    assert!(matches!(
        decompress_text("abc!"),
        Err(DeflurlError::InvalidBase64 { .. })
    ));
    assert!(matches!(
        decompress_text("A"),
        Err(DeflurlError::InvalidBase64Length { length: 1 })
    ));
}

#[test]
fn test_bad_deflate_rejected() {
    // 0x07: BFINAL=1, BTYPE=11 (reserved)
    let encoded = base64url::encode(&[0x07, 0x00]);
    assert!(matches!(
        decompress_text(&encoded),
        Err(DeflurlError::InvalidBlockType(3))
    ));
    assert!(matches!(
        decompress_text(""),
        Err(DeflurlError::TruncatedStream { .. })
    ));
}

#[test]
fn test_output_limit() {
    let text = "a".repeat(10_000);
    let encoded = compress_text(&text);
    let options = InflateOptions::new().with_max_output(1_000);
    assert!(matches!(
        decompress_text_with(&encoded, &options),
        Err(DeflurlError::OutputLimitExceeded { .. })
    ));
    let options = InflateOptions::new().with_max_output(10_000);
    assert_eq!(decompress_text_with(&encoded, &options).unwrap(), text);
}

proptest! {
    #[test]
    fn prop_any_string_roundtrips(text in any::<String>()) {
        let encoded = compress_text(&text);
        prop_assert!(is_url_safe(&encoded));
        prop_assert_eq!(decompress_text(&encoded).unwrap(), text);
    }

    #[test]
    fn prop_strategies_agree(text in "[a-c ]{0,300}") {
        for strategy in [
            BlockStrategy::Auto,
            BlockStrategy::Stored,
            BlockStrategy::Fixed,
            BlockStrategy::Dynamic,
        ] {
            let options = DeflateOptions::new().with_strategy(strategy);
            let encoded = compress_text_with(&text, &options);
            prop_assert_eq!(decompress_text(&encoded).unwrap(), text.clone());
        }
    }
}
