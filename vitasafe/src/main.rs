// vitasafe/src/main.rs
//! `vitasafe` entry point.

use anyhow::{Context, Result};
use clap::Parser;
use std::process::ExitCode;

use vitasafe::cli::{Cli, Commands};
use vitasafe::commands::{codes, sanitize, validate};
use vitasafe::logger;
use vitasafe::ui::theme::build_theme_map;
use vitasafe::Outcome;

fn run(cli: Cli) -> Result<Outcome> {
    let theme = build_theme_map(cli.theme.as_ref()).context("Theme error")?;
    match &cli.command {
        Commands::Validate(cmd) => validate::run_validate(cmd, &theme, cli.quiet),
        Commands::Sanitize(cmd) => sanitize::run_sanitize(cmd, &theme),
        Commands::Codes(cmd) => codes::run_codes(cmd),
    }
}

fn main() -> ExitCode {
    // A missing .env file is normal.
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();
    logger::init_logger(logger::level_for_flags(cli.quiet, cli.debug));

    match run(cli) {
        Ok(outcome) => ExitCode::from(outcome.exit_code() as u8),
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}
