//! Encode command implementation.

use crate::utils::read_text;
use deflurl::{BlockStrategy, DeflateOptions, compress_text_with};
use std::path::Path;
use tracing::debug;

pub fn cmd_encode(
    text: Option<String>,
    input: Option<&Path>,
    level: u8,
    strategy: BlockStrategy,
) -> Result<(), Box<dyn std::error::Error>> {
    let text = read_text(text, input)?;
    let options = DeflateOptions::new()
        .with_level(level)
        .with_strategy(strategy);
    debug!(?options, bytes = text.len(), "encoding");

    println!("{}", compress_text_with(&text, &options));
    Ok(())
}
