//! Match finder throughput and token counts per level.
//!
//! Run with `cargo bench --bench lz77_bench`; prints one line per level.

use deflurl_deflate::lz77::{Lz77Encoder, Lz77Token};

fn main() {
    let cases = [
        ("short_note", note_text(300)),
        ("long_note", note_text(16 * 1024)),
        ("markdown", markdown(64 * 1024)),
        ("noise", noise(64 * 1024)),
    ];

    println!("LZ77 match finder");
    println!("=================\n");

    for (name, data) in &cases {
        println!("{} ({} bytes)", name, data.len());

        for level in [1u8, 4, 6, 9] {
            let start = std::time::Instant::now();
            let tokens = Lz77Encoder::compress_all(data, level);
            let elapsed = start.elapsed();

            let matches = tokens
                .iter()
                .filter(|t| matches!(t, Lz77Token::Match { .. }))
                .count();
            let covered: usize = tokens.iter().map(Lz77Token::decoded_len).sum();
            assert_eq!(covered, data.len());

            println!(
                "  level {}: {:8.2} MB/s, {:6} tokens ({:5} matches), {:8} µs",
                level,
                data.len() as f64 / elapsed.as_secs_f64() / 1024.0 / 1024.0,
                tokens.len(),
                matches,
                elapsed.as_micros()
            );
        }
        println!();
    }
}

/// Chat-style text: short sentences drawn from a small vocabulary.
fn note_text(size: usize) -> Vec<u8> {
    let words: &[&[u8]] = &[
        b"meeting", b"tomorrow", b"at", b"noon", b"bring", b"the", b"slides", b"and", b"coffee",
        b"please", b"remember", b"to", b"call", b"back", b"thanks", b"see", b"you", b"soon",
    ];
    let mut data = Vec::with_capacity(size);
    let mut seed = 7u32;
    while data.len() < size {
        seed = seed.wrapping_mul(1_103_515_245).wrapping_add(12345);
        data.extend_from_slice(words[(seed >> 8) as usize % words.len()]);
        data.push(if seed % 9 == 0 { b'\n' } else { b' ' });
    }
    data.truncate(size);
    data
}

fn markdown(size: usize) -> Vec<u8> {
    let mut data = Vec::with_capacity(size);
    let mut i = 0;
    while data.len() < size {
        data.extend_from_slice(format!("## Section {}\n\n- item {}\n- item {}\n\n", i, i * 3, i * 7).as_bytes());
        i += 1;
    }
    data.truncate(size);
    data
}

fn noise(size: usize) -> Vec<u8> {
    let mut seed = 0x1234_5678u32;
    (0..size)
        .map(|_| {
            seed ^= seed << 13;
            seed ^= seed >> 17;
            seed ^= seed << 5;
            seed as u8
        })
        .collect()
}
