// vitasafe/src/ui/output_format.rs
//! Human-readable rendering of messages, validation reports and the code registry.
//!
//! Every function takes a writer and a `supports_color` flag so callers decide where
//! output goes and whether ANSI colors are emitted.

use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use owo_colors::OwoColorize;
use std::io::{self, Write};

use vitasafe_core::{DowngradePolicy, ErrorCode, SecurityViolation, ValidationError, ValidationResult};

use crate::ui::theme::{color_for, ThemeEntry, ThemeMap};

fn paint(text: &str, theme: &ThemeMap, entry: ThemeEntry, supports_color: bool) -> String {
    if supports_color {
        text.color(color_for(theme, entry)).to_string()
    } else {
        text.to_string()
    }
}

fn print_tagged<W: Write>(
    writer: &mut W,
    tag: &str,
    msg: &str,
    theme: &ThemeMap,
    entry: ThemeEntry,
    supports_color: bool,
) -> io::Result<()> {
    writeln!(writer, "{} {}", paint(tag, theme, entry, supports_color), msg)
}

pub fn print_info_message<W: Write>(writer: &mut W, msg: &str, theme: &ThemeMap, supports_color: bool) -> io::Result<()> {
    print_tagged(writer, "[INFO]", msg, theme, ThemeEntry::Info, supports_color)
}

pub fn print_warn_message<W: Write>(writer: &mut W, msg: &str, theme: &ThemeMap, supports_color: bool) -> io::Result<()> {
    print_tagged(writer, "[WARN]", msg, theme, ThemeEntry::Warn, supports_color)
}

pub fn print_error_message<W: Write>(writer: &mut W, msg: &str, theme: &ThemeMap, supports_color: bool) -> io::Result<()> {
    print_tagged(writer, "[ERROR]", msg, theme, ThemeEntry::Error, supports_color)
}

pub fn print_success_message<W: Write>(writer: &mut W, msg: &str, theme: &ThemeMap, supports_color: bool) -> io::Result<()> {
    print_tagged(writer, "[OK]", msg, theme, ThemeEntry::Success, supports_color)
}

fn print_diagnostic<W: Write>(
    writer: &mut W,
    diagnostic: &ValidationError,
    theme: &ThemeMap,
    supports_color: bool,
) -> io::Result<()> {
    let entry = ThemeEntry::for_severity(diagnostic.severity());
    writeln!(
        writer,
        "  {} {} {}: {}",
        paint(&format!("{:<7}", diagnostic.severity().to_string()), theme, entry, supports_color),
        paint(diagnostic.code().as_str(), theme, ThemeEntry::Code, supports_color),
        paint(diagnostic.field_path(), theme, ThemeEntry::FieldPath, supports_color),
        diagnostic.message()
    )?;
    if let Some(fix) = diagnostic.suggested_fix() {
        writeln!(writer, "          {}", paint(&format!("fix: {}", fix), theme, ThemeEntry::Hint, supports_color))?;
    }
    Ok(())
}

/// Prints a validation report: a header line, then errors, warnings and info.
pub fn print_validation_report<W: Write>(
    writer: &mut W,
    result: &ValidationResult,
    theme: &ThemeMap,
    supports_color: bool,
) -> io::Result<()> {
    let counts = result.metadata.counts;
    let summary = format!(
        "Document is {} at level {} ({} error(s), {} warning(s), {} info).",
        if result.is_valid { "VALID" } else { "INVALID" },
        result.metadata.level,
        counts.errors,
        counts.warnings,
        counts.info
    );
    if result.is_valid {
        print_success_message(writer, &summary, theme, supports_color)?;
    } else {
        print_error_message(writer, &summary, theme, supports_color)?;
    }

    for diagnostic in result.diagnostics() {
        print_diagnostic(writer, diagnostic, theme, supports_color)?;
    }
    Ok(())
}

/// Prints a security rejection.
pub fn print_security_violation<W: Write>(
    writer: &mut W,
    violation: &SecurityViolation,
    theme: &ThemeMap,
    supports_color: bool,
) -> io::Result<()> {
    let location = if violation.field_path.is_empty() {
        String::new()
    } else {
        format!(" in '{}'", violation.field_path)
    };
    writeln!(
        writer,
        "{} {}{}: {} (rule '{}')",
        paint("[SECURITY]", theme, ThemeEntry::Security, supports_color),
        violation.code,
        location,
        violation.message,
        violation.pattern
    )
}

/// Renders the diagnostic code registry as a table. The `Permissive` column shows
/// which errors `policy` lets the permissive level downgrade.
pub fn codes_table(policy: &DowngradePolicy) -> Table {
    let downgradable = policy.eligible_codes();
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec!["Code", "Category", "Severity", "Permissive", "Name"]);
    for code in ErrorCode::ALL {
        let severity = if code.is_security() {
            "fatal".to_string()
        } else {
            code.default_severity().to_string()
        };
        table.add_row(vec![
            code.as_str().to_string(),
            format!("{:?}", code.category()).to_lowercase(),
            severity,
            if downgradable.contains(&code) { "downgrade" } else { "-" }.to_string(),
            format!("{:?}", code),
        ]);
    }
    table
}

pub fn print_codes_table<W: Write>(writer: &mut W, policy: &DowngradePolicy) -> io::Result<()> {
    writeln!(writer, "{}", codes_table(policy))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::theme::ThemeStyle;
    use serde_json::json;
    use vitasafe_core::{Validator, ValidatorConfig};

    fn render(result: &ValidationResult) -> String {
        let mut out = Vec::new();
        print_validation_report(&mut out, result, &ThemeStyle::default_theme_map(), false).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn report_lists_diagnostics_with_fixes() {
        let validator = Validator::new(&ValidatorConfig::default()).unwrap();
        let result = validator.validate(&json!({})).unwrap();
        let text = render(&result);
        assert!(text.starts_with("[ERROR] Document is INVALID at level lenient"));
        assert!(text.contains("VAL001 personalInfo:"));
        assert!(text.contains("fix: "));
    }

    #[test]
    fn plain_output_has_no_escape_codes() {
        let mut out = Vec::new();
        print_warn_message(&mut out, "careful", &ThemeStyle::default_theme_map(), false).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "[WARN] careful\n");
    }

    #[test]
    fn table_lists_every_code() {
        let rendered = codes_table(&DowngradePolicy::default()).to_string();
        for code in ErrorCode::ALL {
            assert!(rendered.contains(code.as_str()), "{}", code);
        }
    }

    #[test]
    fn table_marks_downgradable_codes() {
        let row = |rendered: &str, code: &str| -> String {
            rendered.lines().find(|l| l.contains(code)).unwrap_or_default().to_string()
        };
        let rendered = codes_table(&DowngradePolicy::default()).to_string();
        assert!(row(&rendered, "VAL041").contains("downgrade"));
        assert!(row(&rendered, "VAL012").contains("downgrade"));
        assert!(!row(&rendered, "VAL040").contains("downgrade"));
        assert!(!row(&rendered, "SEC001").contains("downgrade"));

        let none = codes_table(&DowngradePolicy::none()).to_string();
        assert!(!row(&none, "VAL041").contains("downgrade"));
    }
}
