// vitasafe-core/src/diagnostics.rs
//! Diagnostic model: severities, the versioned error-code registry, individual
//! diagnostics and the aggregate result of a validation run.
//!
//! Error codes are an external contract. API responses and tests assert on the
//! `VAL###` / `SEC###` literals, so a code is never renumbered or reused; new
//! conditions get new codes.
//!
//! License: MIT OR APACHE 2.0

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

use crate::errors::VitasafeError;
use crate::level::ValidationLevel;

/// How much a diagnostic matters for overall validity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Blocks validity under every level.
    Error,
    /// Blocks validity only under `Strict`.
    Warning,
    /// Never blocks; records a silent correction.
    Info,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Severity::Error => "error",
            Severity::Warning => "warning",
            Severity::Info => "info",
        })
    }
}

/// Broad family a code belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Structural,
    Format,
    Security,
    Normalization,
}

/// Stable identifiers for every validation outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ErrorCode {
    #[serde(rename = "VAL001")]
    RequiredFieldMissing,
    #[serde(rename = "VAL002")]
    RequiredFieldEmpty,
    #[serde(rename = "VAL003")]
    InvalidType,
    #[serde(rename = "VAL010")]
    InvalidDateFormat,
    #[serde(rename = "VAL011")]
    InvalidDateValue,
    #[serde(rename = "VAL012")]
    DateHasTimeComponent,
    #[serde(rename = "VAL020")]
    InvalidPhoneFormat,
    #[serde(rename = "VAL030")]
    UrlMissingHost,
    #[serde(rename = "VAL031")]
    UrlSchemeNotAllowed,
    #[serde(rename = "VAL040")]
    InvalidEmail,
    #[serde(rename = "VAL041")]
    EmailRepairable,
    #[serde(rename = "VAL050")]
    DateRangeInverted,
    #[serde(rename = "VAL101")]
    DateNormalized,
    #[serde(rename = "VAL102")]
    PhoneNormalized,
    #[serde(rename = "VAL103")]
    UrlNormalized,
    #[serde(rename = "VAL104")]
    EmailNormalized,
    #[serde(rename = "SEC001")]
    FileAccess,
    #[serde(rename = "SEC002")]
    ShellExecution,
    #[serde(rename = "SEC003")]
    MacroDefinition,
    #[serde(rename = "SEC004")]
    ParserStateMutation,
    #[serde(rename = "SEC005")]
    ExpansionPrimitive,
}

impl ErrorCode {
    /// Every registered code, in registry order.
    pub const ALL: [ErrorCode; 21] = [
        ErrorCode::RequiredFieldMissing,
        ErrorCode::RequiredFieldEmpty,
        ErrorCode::InvalidType,
        ErrorCode::InvalidDateFormat,
        ErrorCode::InvalidDateValue,
        ErrorCode::DateHasTimeComponent,
        ErrorCode::InvalidPhoneFormat,
        ErrorCode::UrlMissingHost,
        ErrorCode::UrlSchemeNotAllowed,
        ErrorCode::InvalidEmail,
        ErrorCode::EmailRepairable,
        ErrorCode::DateRangeInverted,
        ErrorCode::DateNormalized,
        ErrorCode::PhoneNormalized,
        ErrorCode::UrlNormalized,
        ErrorCode::EmailNormalized,
        ErrorCode::FileAccess,
        ErrorCode::ShellExecution,
        ErrorCode::MacroDefinition,
        ErrorCode::ParserStateMutation,
        ErrorCode::ExpansionPrimitive,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::RequiredFieldMissing => "VAL001",
            ErrorCode::RequiredFieldEmpty => "VAL002",
            ErrorCode::InvalidType => "VAL003",
            ErrorCode::InvalidDateFormat => "VAL010",
            ErrorCode::InvalidDateValue => "VAL011",
            ErrorCode::DateHasTimeComponent => "VAL012",
            ErrorCode::InvalidPhoneFormat => "VAL020",
            ErrorCode::UrlMissingHost => "VAL030",
            ErrorCode::UrlSchemeNotAllowed => "VAL031",
            ErrorCode::InvalidEmail => "VAL040",
            ErrorCode::EmailRepairable => "VAL041",
            ErrorCode::DateRangeInverted => "VAL050",
            ErrorCode::DateNormalized => "VAL101",
            ErrorCode::PhoneNormalized => "VAL102",
            ErrorCode::UrlNormalized => "VAL103",
            ErrorCode::EmailNormalized => "VAL104",
            ErrorCode::FileAccess => "SEC001",
            ErrorCode::ShellExecution => "SEC002",
            ErrorCode::MacroDefinition => "SEC003",
            ErrorCode::ParserStateMutation => "SEC004",
            ErrorCode::ExpansionPrimitive => "SEC005",
        }
    }

    pub fn category(&self) -> Category {
        match self {
            ErrorCode::RequiredFieldMissing
            | ErrorCode::RequiredFieldEmpty
            | ErrorCode::InvalidType => Category::Structural,
            ErrorCode::InvalidDateFormat
            | ErrorCode::InvalidDateValue
            | ErrorCode::DateHasTimeComponent
            | ErrorCode::InvalidPhoneFormat
            | ErrorCode::UrlMissingHost
            | ErrorCode::UrlSchemeNotAllowed
            | ErrorCode::InvalidEmail
            | ErrorCode::EmailRepairable
            | ErrorCode::DateRangeInverted => Category::Format,
            ErrorCode::DateNormalized
            | ErrorCode::PhoneNormalized
            | ErrorCode::UrlNormalized
            | ErrorCode::EmailNormalized => Category::Normalization,
            ErrorCode::FileAccess
            | ErrorCode::ShellExecution
            | ErrorCode::MacroDefinition
            | ErrorCode::ParserStateMutation
            | ErrorCode::ExpansionPrimitive => Category::Security,
        }
    }

    /// The severity a diagnostic with this code is created with, before any level policy.
    pub fn default_severity(&self) -> Severity {
        match self {
            ErrorCode::InvalidPhoneFormat | ErrorCode::DateRangeInverted => Severity::Warning,
            ErrorCode::DateNormalized
            | ErrorCode::PhoneNormalized
            | ErrorCode::UrlNormalized
            | ErrorCode::EmailNormalized => Severity::Info,
            _ => Severity::Error,
        }
    }

    pub fn is_security(&self) -> bool {
        self.category() == Category::Security
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ErrorCode {
    type Err = VitasafeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_uppercase();
        ErrorCode::ALL
            .iter()
            .copied()
            .find(|code| code.as_str() == wanted)
            .ok_or_else(|| VitasafeError::UnknownCode(s.to_string()))
    }
}

/// A single, immutable validation outcome attributed to one field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationError {
    field_path: String,
    code: ErrorCode,
    message: String,
    severity: Severity,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    suggested_fix: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    original_value: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    corrected_value: Option<Value>,
}

impl ValidationError {
    /// Creates a diagnostic with the code's default severity.
    pub fn new(field_path: impl Into<String>, code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            field_path: field_path.into(),
            code,
            message: message.into(),
            severity: code.default_severity(),
            suggested_fix: None,
            original_value: None,
            corrected_value: None,
        }
    }

    pub fn with_suggested_fix(mut self, fix: impl Into<String>) -> Self {
        self.suggested_fix = Some(fix.into());
        self
    }

    pub fn with_original(mut self, value: impl Into<Value>) -> Self {
        self.original_value = Some(value.into());
        self
    }

    pub fn with_corrected(mut self, value: impl Into<Value>) -> Self {
        self.corrected_value = Some(value.into());
        self
    }

    /// Returns a copy re-classified as a warning. Security codes are returned unchanged.
    pub(crate) fn downgraded(&self) -> Self {
        let mut copy = self.clone();
        if !self.code.is_security() {
            copy.severity = Severity::Warning;
        }
        copy
    }

    pub fn field_path(&self) -> &str {
        &self.field_path
    }

    pub fn code(&self) -> ErrorCode {
        self.code
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn severity(&self) -> Severity {
        self.severity
    }

    pub fn suggested_fix(&self) -> Option<&str> {
        self.suggested_fix.as_deref()
    }

    pub fn original_value(&self) -> Option<&Value> {
        self.original_value.as_ref()
    }

    pub fn corrected_value(&self) -> Option<&Value> {
        self.corrected_value.as_ref()
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {} {}: {}", self.severity, self.code, self.field_path, self.message)
    }
}

/// Per-severity diagnostic counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeverityCounts {
    pub errors: usize,
    pub warnings: usize,
    pub info: usize,
}

/// Observability data recorded alongside every result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultMetadata {
    pub level: ValidationLevel,
    pub counts: SeverityCounts,
    /// Hex SHA-256 of the compact JSON form of the input document.
    pub input_digest: String,
}

/// Everything a validation run produces when no security violation occurred.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationResult {
    pub is_valid: bool,
    pub errors: Vec<ValidationError>,
    pub warnings: Vec<ValidationError>,
    pub info: Vec<ValidationError>,
    pub normalized_data: Value,
    pub metadata: ResultMetadata,
}

impl ValidationResult {
    /// Iterates errors, then warnings, then info.
    pub fn diagnostics(&self) -> impl Iterator<Item = &ValidationError> {
        self.errors.iter().chain(self.warnings.iter()).chain(self.info.iter())
    }

    /// Finds the first diagnostic (any severity) with the given code and field path.
    pub fn find(&self, code: ErrorCode, field_path: &str) -> Option<&ValidationError> {
        self.diagnostics()
            .find(|d| d.code() == code && d.field_path() == field_path)
    }
}
