//! Decode command implementation.

use crate::utils::{inflate_options, read_encoded};
use deflurl::decompress_text_with;
use std::io::Write;
use std::path::Path;

pub fn cmd_decode(
    encoded: Option<String>,
    output: Option<&Path>,
    max_output: Option<usize>,
) -> Result<(), Box<dyn std::error::Error>> {
    let encoded = read_encoded(encoded)?;
    let text = decompress_text_with(&encoded, &inflate_options(max_output))?;

    match output {
        Some(path) => {
            std::fs::write(path, &text)?;
            eprintln!("Wrote {} bytes to {}", text.len(), path.display());
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(text.as_bytes())?;
            stdout.flush()?;
        }
    }

    Ok(())
}
