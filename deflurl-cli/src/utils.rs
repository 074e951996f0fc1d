//! Input helpers for the CLI.

use deflurl::InflateOptions;
use std::io::{self, Read};
use std::path::Path;

/// Text from the argument, a file, or stdin, in that order.
pub fn read_text(text: Option<String>, input: Option<&Path>) -> io::Result<String> {
    if let Some(text) = text {
        return Ok(text);
    }
    if let Some(path) = input {
        return std::fs::read_to_string(path);
    }
    let mut buf = String::new();
    io::stdin().read_to_string(&mut buf)?;
    Ok(buf)
}

/// Packed string from the argument or stdin, with surrounding whitespace removed.
pub fn read_encoded(encoded: Option<String>) -> io::Result<String> {
    let raw = match encoded {
        Some(s) => s,
        None => {
            let mut buf = String::new();
            io::stdin().read_to_string(&mut buf)?;
            buf
        }
    };
    Ok(raw.trim().to_string())
}

/// Decoder options for an optional `--max-output` limit.
pub fn inflate_options(max_output: Option<usize>) -> InflateOptions {
    match max_output {
        Some(limit) => InflateOptions::new().with_max_output(limit),
        None => InflateOptions::new(),
    }
}
