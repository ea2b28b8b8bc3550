//! errors.rs - Custom error types for the vitasafe-core library.
//!
//! Two kinds of failure exist in this crate. `VitasafeError` covers setup problems
//! (configuration files, message templates, extra blacklist patterns) that happen
//! before any document is looked at. `SecurityViolation` is the only failure a
//! validation run itself can produce: every other problem in a document is
//! reported as a diagnostic inside the `ValidationResult`.
//!
//! License: MIT OR APACHE 2.0

use thiserror::Error;

use crate::diagnostics::ErrorCode;

/// This enum represents all setup-time error types in the `vitasafe-core` library.
///
/// `#[non_exhaustive]` lets new variants land without breaking downstream matches.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum VitasafeError {
    #[error("Failed to compile blacklist pattern '{0}': {1}")]
    PatternCompilationError(String, regex::Error),

    #[error("Pattern '{0}': length ({1}) exceeds maximum allowed ({2})")]
    PatternLengthExceeded(String, usize, usize),

    #[error("Invalid message template for {0}: {1}")]
    TemplateError(String, String),

    #[error("Unknown error code '{0}'")]
    UnknownCode(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Failed to parse document: {0}")]
    DocumentParse(#[from] serde_json::Error),
}

/// A dangerous construct was found in a string destined for the renderer.
///
/// Raised by the sanitizer and propagated unchanged by the validator. When this is
/// returned no sanitized data exists for the caller: the run is rejected as a whole.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{code}: {message} (field '{field_path}', rule '{pattern}')")]
pub struct SecurityViolation {
    /// Where the construct was found. Empty when the sanitizer ran outside a document.
    pub field_path: String,
    /// Stable `SEC###` code of the blacklist category that matched.
    pub code: ErrorCode,
    /// Name of the blacklist rule that matched.
    pub pattern: String,
    /// Human-readable message from the message catalog.
    pub message: String,
}

impl SecurityViolation {
    /// Attaches a field path to a violation raised by the context-free sanitizer.
    pub fn at(mut self, field_path: impl Into<String>) -> Self {
        self.field_path = field_path.into();
        self
    }
}
