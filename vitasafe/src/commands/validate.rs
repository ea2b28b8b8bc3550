// vitasafe/src/commands/validate.rs
//! The `validate` command: reads a JSON document, validates it and reports.

use anyhow::{Context, Result};
use is_terminal::IsTerminal;
use log::{debug, info};
use serde_json::Value;
use std::fs;
use std::io::{self, Write};

use vitasafe_core::{ValidationLevel, Validator, ValidatorConfig};

use crate::cli::ValidateCommand;
use crate::commands::Outcome;
use crate::ui::output_format;
use crate::ui::theme::ThemeMap;
use crate::utils::config_path::load_config;
use crate::utils::input::read_input;

/// Applies command-line overrides on top of the loaded config.
pub fn effective_config(cmd: &ValidateCommand) -> Result<ValidatorConfig> {
    let mut config = load_config(cmd.config.as_deref())?;
    if let Some(document) = cmd.document {
        config.document = document.into();
    }
    if let Some(level) = cmd.level {
        config.level = ValidationLevel::from(level);
    }
    Ok(config)
}

pub fn run_validate(cmd: &ValidateCommand, theme: &ThemeMap, quiet: bool) -> Result<Outcome> {
    let config = effective_config(cmd)?;
    let validator = Validator::new(&config).context("Failed to build validator")?;

    let text = read_input(cmd.input_file.as_deref())?;
    let document: Value = serde_json::from_str(&text).context("Failed to parse input document as JSON")?;
    info!("Validating document at level {}.", validator.level());

    let result = match validator.validate(&document) {
        Ok(result) => result,
        Err(violation) => {
            let stderr_supports_color = io::stderr().is_terminal();
            output_format::print_security_violation(&mut io::stderr(), &violation, theme, stderr_supports_color)?;
            return Ok(Outcome::SecurityRejected);
        }
    };

    if cmd.json {
        let stdout = io::stdout();
        let mut writer = stdout.lock();
        serde_json::to_writer_pretty(&mut writer, &result).context("Failed to write JSON result")?;
        writeln!(writer)?;
    } else if !quiet {
        let stdout = io::stdout();
        let supports_color = stdout.is_terminal();
        output_format::print_validation_report(&mut stdout.lock(), &result, theme, supports_color)?;
    }

    if let Some(path) = &cmd.output {
        if result.is_valid {
            let body = serde_json::to_string_pretty(&result.normalized_data)?;
            fs::write(path, body + "\n")
                .with_context(|| format!("Failed to write normalized document to {}", path.display()))?;
            debug!("Normalized document written to {}.", path.display());
            if !quiet {
                let stderr_supports_color = io::stderr().is_terminal();
                output_format::print_info_message(
                    &mut io::stderr(),
                    &format!("Normalized document written to {}", path.display()),
                    theme,
                    stderr_supports_color,
                )?;
            }
        } else if !quiet {
            let stderr_supports_color = io::stderr().is_terminal();
            output_format::print_warn_message(
                &mut io::stderr(),
                "Document is invalid; no normalized output written.",
                theme,
                stderr_supports_color,
            )?;
        }
    }

    Ok(if result.is_valid { Outcome::Success } else { Outcome::Invalid })
}
