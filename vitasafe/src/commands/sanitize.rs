// vitasafe/src/commands/sanitize.rs
//! The `sanitize` command: escapes raw text for LaTeX.

use anyhow::Result;
use is_terminal::IsTerminal;
use log::debug;
use std::io::{self, Write};

use vitasafe_core::headless_sanitize;

use crate::cli::SanitizeCommand;
use crate::commands::Outcome;
use crate::ui::output_format;
use crate::ui::theme::ThemeMap;
use crate::utils::input::read_input;

pub fn run_sanitize(cmd: &SanitizeCommand, theme: &ThemeMap) -> Result<Outcome> {
    let text = read_input(cmd.input_file.as_deref())?;
    // A trailing newline from the shell or editor is not part of the content.
    let text = text.strip_suffix('\n').unwrap_or(&text);
    let text = text.strip_suffix('\r').unwrap_or(text);

    match headless_sanitize(text, !cmd.no_formatting) {
        Ok(clean) => {
            debug!("Sanitized {} bytes into {} bytes.", text.len(), clean.len());
            let stdout = io::stdout();
            let mut writer = stdout.lock();
            writeln!(writer, "{}", clean)?;
            Ok(Outcome::Success)
        }
        Err(violation) => {
            let stderr_supports_color = io::stderr().is_terminal();
            output_format::print_security_violation(&mut io::stderr(), &violation, theme, stderr_supports_color)?;
            Ok(Outcome::SecurityRejected)
        }
    }
}
