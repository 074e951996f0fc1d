//! Shell completion generation.

use clap::Command;
use clap_complete::{Shell, generate};

pub fn cmd_completions(
    shell: Shell,
    command: &mut Command,
) -> Result<(), Box<dyn std::error::Error>> {
    let name = command.get_name().to_string();
    generate(shell, command, name, &mut std::io::stdout());
    Ok(())
}
