// vitasafe/tests/cli_integration_tests.rs
//! Integration tests for the `vitasafe` binary.
//!
//! Each test runs the real executable with `assert_cmd`, feeding input through stdin
//! or temporary files. `VITASAFE_CONFIG` is cleared and `XDG_CONFIG_HOME` points at an
//! empty directory so a developer's own config never leaks into a run.

use anyhow::Result;
use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;
use std::fs;
use std::io::Write;
use tempfile::{tempdir, NamedTempFile, TempDir};

fn vitasafe(config_home: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("vitasafe").unwrap();
    cmd.env_remove("VITASAFE_CONFIG");
    cmd.env("XDG_CONFIG_HOME", config_home.path());
    cmd.env("HOME", config_home.path());
    cmd.env("RUST_LOG", "debug");
    cmd
}

fn strip_ansi(bytes: &[u8]) -> String {
    String::from_utf8_lossy(&strip_ansi_escapes::strip(bytes)).to_string()
}

const VALID: &str = r#"{"personalInfo": {"name": "Jane", "email": "JANE@EXAMPLE.COM", "phone": "555.123.4567"}}"#;

#[test]
fn validate_valid_document_exits_zero() -> Result<()> {
    let home = tempdir()?;
    let output = vitasafe(&home).args(["validate"]).write_stdin(VALID).output()?;
    assert_eq!(output.status.code(), Some(0));
    let stdout = strip_ansi(&output.stdout);
    assert!(stdout.contains("Document is VALID at level lenient"), "{}", stdout);
    assert!(stdout.contains("VAL104 personalInfo.email"), "{}", stdout);
    Ok(())
}

#[test]
fn validate_invalid_document_exits_one() -> Result<()> {
    let home = tempdir()?;
    vitasafe(&home)
        .args(["validate", "--level", "strict"])
        .write_stdin("{}")
        .assert()
        .code(1)
        .stdout(predicate::str::contains("VAL001 personalInfo"));
    Ok(())
}

#[test]
fn validate_security_violation_exits_two() -> Result<()> {
    let home = tempdir()?;
    let doc = r#"{"personalInfo": {"name": "\\write18{id}", "email": "a@b.co"}}"#;
    vitasafe(&home)
        .args(["validate", "--level", "permissive"])
        .write_stdin(doc)
        .assert()
        .code(2)
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("SEC002 in 'personalInfo.name'"));
    Ok(())
}

#[test]
fn validate_json_output_is_machine_readable() -> Result<()> {
    let home = tempdir()?;
    let output = vitasafe(&home).args(["validate", "--json"]).write_stdin(VALID).output()?;
    assert_eq!(output.status.code(), Some(0));
    let result: Value = serde_json::from_slice(&output.stdout)?;
    assert_eq!(result["is_valid"], true);
    assert_eq!(result["normalized_data"]["personalInfo"]["phone"], "555-123-4567");
    assert_eq!(result["metadata"]["counts"]["info"], 2);
    assert_eq!(result["metadata"]["input_digest"].as_str().map(str::len), Some(64));
    Ok(())
}

#[test]
fn validate_writes_normalized_output_file() -> Result<()> {
    let home = tempdir()?;
    let mut input = NamedTempFile::new()?;
    input.write_all(VALID.as_bytes())?;
    let out_dir = tempdir()?;
    let out_path = out_dir.path().join("normalized.json");

    vitasafe(&home)
        .args(["validate", "-q", "-i"])
        .arg(input.path())
        .arg("-o")
        .arg(&out_path)
        .assert()
        .success();

    let written: Value = serde_json::from_str(&fs::read_to_string(&out_path)?)?;
    assert_eq!(written["personalInfo"]["email"], "jane@example.com");
    Ok(())
}

#[test]
fn validate_uses_config_from_environment() -> Result<()> {
    let home = tempdir()?;
    let mut config = NamedTempFile::new()?;
    config.write_all(b"document: cover_letter\n")?;

    vitasafe(&home)
        .env("VITASAFE_CONFIG", config.path())
        .args(["validate"])
        .write_stdin(VALID)
        .assert()
        .code(1)
        .stdout(predicate::str::contains("VAL001 recipient"))
        .stdout(predicate::str::contains("VAL001 body"));
    Ok(())
}

#[test]
fn validate_discovers_user_config_file() -> Result<()> {
    let home = tempdir()?;
    let config_dir = home.path().join("vitasafe");
    fs::create_dir_all(&config_dir)?;
    fs::write(config_dir.join("config.yaml"), "level: strict\n")?;

    // A bad phone number is only a warning, which fails validation under strict.
    let doc = r#"{"personalInfo": {"name": "Jane", "email": "jane@example.com", "phone": "12"}}"#;
    let output = vitasafe(&home).args(["validate"]).write_stdin(doc).output()?;
    if cfg!(target_os = "linux") {
        assert_eq!(output.status.code(), Some(1));
        assert!(strip_ansi(&output.stdout).contains("at level strict"));
    }
    Ok(())
}

#[test]
fn validate_rejects_malformed_json() -> Result<()> {
    let home = tempdir()?;
    vitasafe(&home)
        .args(["validate"])
        .write_stdin("{not json")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to parse input document as JSON"));
    Ok(())
}

#[test]
fn sanitize_escapes_text() -> Result<()> {
    let home = tempdir()?;
    vitasafe(&home)
        .args(["sanitize"])
        .write_stdin("Profit & loss: 50% of $10 \\textbf{now}\n")
        .assert()
        .success()
        .stdout(r"Profit \& loss: 50\% of \$10 \textbf{now}".to_string() + "\n");
    Ok(())
}

#[test]
fn sanitize_without_formatting_escapes_wrappers() -> Result<()> {
    let home = tempdir()?;
    vitasafe(&home)
        .args(["sanitize", "--no-formatting"])
        .write_stdin("\\emph{x}")
        .assert()
        .success()
        .stdout(predicate::str::contains(r"\textbackslash{}emph\{x\}"));
    Ok(())
}

#[test]
fn sanitize_rejects_dangerous_input() -> Result<()> {
    let home = tempdir()?;
    vitasafe(&home)
        .args(["sanitize"])
        .write_stdin("\\def\\pwn{1}")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("SEC003"));
    Ok(())
}

#[test]
fn codes_lists_the_registry() -> Result<()> {
    let home = tempdir()?;
    vitasafe(&home)
        .args(["codes"])
        .assert()
        .success()
        .stdout(predicate::str::contains("VAL001"))
        .stdout(predicate::str::contains("SEC005"))
        .stdout(predicate::str::contains("fatal"));
    Ok(())
}

#[test]
fn codes_reflects_the_configured_downgrade_table() -> Result<()> {
    let home = tempdir()?;
    let mut config = NamedTempFile::new()?;
    config.write_all(b"downgrade:\n  VAL041: false\n  VAL040: true\n")?;

    let output = vitasafe(&home).args(["codes", "--config"]).arg(config.path()).output()?;
    assert_eq!(output.status.code(), Some(0));
    let stdout = strip_ansi(&output.stdout);
    let row = |code: &str| stdout.lines().find(|l| l.contains(code)).unwrap_or_default().to_string();
    assert!(row("VAL040").contains("downgrade"), "{}", stdout);
    assert!(!row("VAL041").contains("downgrade"), "{}", stdout);
    assert!(row("VAL012").contains("downgrade"), "{}", stdout);
    Ok(())
}
