// vitasafe/src/commands/codes.rs
//! The `codes` command: prints the diagnostic code registry.

use anyhow::Result;
use std::io;

use crate::cli::CodesCommand;
use crate::commands::Outcome;
use crate::ui::output_format;
use crate::utils::config_path::load_config;

pub fn run_codes(cmd: &CodesCommand) -> Result<Outcome> {
    let config = load_config(cmd.config.as_deref())?;
    let policy = config.downgrade_policy()?;
    output_format::print_codes_table(&mut io::stdout().lock(), &policy)?;
    Ok(Outcome::Success)
}
