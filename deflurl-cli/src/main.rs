//! deflurl CLI - pack text into URL-safe strings
//!
//! Compresses UTF-8 text with a pure Rust DEFLATE codec and writes the result
//! as unpadded URL-safe Base64.

mod commands;
mod utils;

use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::Shell;
use commands::{cmd_completions, cmd_decode, cmd_encode, cmd_info};
use deflurl::BlockStrategy;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "deflurl")]
#[command(
    author,
    version,
    about = "Pack text into compact URL-safe strings"
)]
#[command(long_about = "
deflurl compresses UTF-8 text with DEFLATE (RFC 1951) and encodes the result
as URL-safe Base64 without padding, so it can travel in a URL.

Examples:
  deflurl encode 'hello hello hello'
  deflurl encode -i notes.md -l 9
  deflurl decode AQIA_f9oaQ
  deflurl info AQIA_f9oaQ --json
  deflurl completions bash
")]
struct Cli {
    /// Log codec activity to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compress text into a URL-safe string
    #[command(alias = "e")]
    Encode {
        /// Text to compress (read from --input or stdin if omitted)
        text: Option<String>,

        /// Read the text from a file
        #[arg(short, long, conflicts_with = "text")]
        input: Option<PathBuf>,

        /// Compression level (0 = store, 9 = best)
        #[arg(short, long, default_value_t = 6, value_parser = clap::value_parser!(u8).range(0..=9))]
        level: u8,

        /// Block encoding
        #[arg(short, long, value_enum, default_value = "auto")]
        strategy: Strategy,
    },

    /// Recover text from a URL-safe string
    #[command(alias = "d")]
    Decode {
        /// Packed string (read from stdin if omitted)
        encoded: Option<String>,

        /// Write the text to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Refuse to produce more than this many bytes
        #[arg(long)]
        max_output: Option<usize>,
    },

    /// Show how a packed string was compressed
    #[command(alias = "i")]
    Info {
        /// Packed string (read from stdin if omitted)
        encoded: Option<String>,

        /// Output as JSON (machine-readable)
        #[arg(short, long)]
        json: bool,

        /// Refuse to produce more than this many bytes
        #[arg(long)]
        max_output: Option<usize>,
    },

    /// Generate shell completions
    Completions {
        /// Target shell
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Block encoding selected on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Default)]
enum Strategy {
    /// Smallest of stored, fixed and dynamic per block
    #[default]
    Auto,
    /// Uncompressed blocks
    Stored,
    /// Fixed Huffman codes
    Fixed,
    /// Dynamic Huffman codes
    Dynamic,
}

impl From<Strategy> for BlockStrategy {
    fn from(strategy: Strategy) -> Self {
        match strategy {
            Strategy::Auto => BlockStrategy::Auto,
            Strategy::Stored => BlockStrategy::Stored,
            Strategy::Fixed => BlockStrategy::Fixed,
            Strategy::Dynamic => BlockStrategy::Dynamic,
        }
    }
}

fn init_logging(verbose: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(if verbose { "debug" } else { "warn" }));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Encode {
            text,
            input,
            level,
            strategy,
        } => cmd_encode(text, input.as_deref(), level, strategy.into()),
        Commands::Decode {
            encoded,
            output,
            max_output,
        } => cmd_decode(encoded, output.as_deref(), max_output),
        Commands::Info {
            encoded,
            json,
            max_output,
        } => cmd_info(encoded, json, max_output),
        Commands::Completions { shell } => cmd_completions(shell, &mut Cli::command()),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
