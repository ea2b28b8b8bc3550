// vitasafe-core/src/headless.rs
//! Convenience wrappers for one-shot, non-interactive use of the pipeline.
//!
//! License: MIT OR APACHE 2.0

use anyhow::{Context, Result};
use serde_json::Value;

use crate::config::ValidatorConfig;
use crate::diagnostics::ValidationResult;
use crate::errors::{SecurityViolation, VitasafeError};
use crate::level::ValidationLevel;
use crate::sanitizer::Sanitizer;
use crate::validator::Validator;

/// Parses `input_json` and validates it with a validator built from `config`.
///
/// # Arguments
///
/// * `config` - The merged `ValidatorConfig` (defaults + optional user overrides).
/// * `input_json` - The document as a JSON string.
/// * `level_override` - Level to use instead of `config.level`, if any.
///
/// A security rejection is returned as an error whose root cause downcasts to
/// [`SecurityViolation`].
pub fn headless_validate(
    config: &ValidatorConfig,
    input_json: &str,
    level_override: Option<ValidationLevel>,
) -> Result<ValidationResult> {
    let validator = Validator::new(config).context("Failed to build validator")?;
    let document: Value = serde_json::from_str(input_json)
        .map_err(VitasafeError::from)
        .context("Failed to parse input document as JSON")?;
    let level = level_override.unwrap_or(config.level);
    let result = validator.validate_with_level(&document, level)?;
    Ok(result)
}

/// Runs the sanitizer alone on `text`, with the built-in blacklist only.
pub fn headless_sanitize(text: &str, allow_basic_formatting: bool) -> Result<String, SecurityViolation> {
    Sanitizer::new().sanitize(text, allow_basic_formatting)
}
