// vitasafe-core/src/lib.rs
//! # Vitasafe Core Library
//!
//! `vitasafe-core` validates, normalizes and sanitizes resume and cover-letter
//! payloads before they are interpolated into a LaTeX template. Callers get either a
//! normalized copy of their document that is safe to typeset, or a complete list of
//! diagnostics explaining what is wrong with it.
//!
//! The library performs no I/O during validation and keeps no global mutable state:
//! a [`Validator`] is built once from a [`ValidatorConfig`] and can then be shared
//! freely between threads.
//!
//! ## Modules
//!
//! * `config`: `ValidatorConfig`, document profiles, YAML loading and merging.
//! * `diagnostics`: the error-code registry, `ValidationError` and `ValidationResult`.
//! * `document`: field paths and helpers over `serde_json::Value` trees.
//! * `errors`: `VitasafeError` for setup failures and `SecurityViolation`.
//! * `level`: strictness levels and the permissive downgrade table.
//! * `messages`: the immutable message catalog.
//! * `normalizers`: date, phone, URL and email normalizers and the field-kind table.
//! * `sanitizer`: the LaTeX injection sanitizer.
//! * `validator`: the four-phase validation pipeline.
//! * `headless`: one-shot convenience wrappers.
//!
//! ## Usage Example
//!
//! ```rust
//! use vitasafe_core::{Validator, ValidatorConfig, ValidationLevel};
//! use serde_json::json;
//!
//! let validator = Validator::new(&ValidatorConfig::default()).unwrap();
//! let doc = json!({"personalInfo": {"name": "Jane", "email": "JANE@EXAMPLE.COM", "phone": "5551234567"}});
//!
//! let result = validator.validate_with_level(&doc, ValidationLevel::Strict).unwrap();
//! assert!(result.is_valid);
//! assert_eq!(result.normalized_data["personalInfo"]["phone"], "(555) 123-4567");
//! assert_eq!(result.info.len(), 2);
//! ```
//!
//! ## Error Handling
//!
//! Problems in a document are data: they come back as diagnostics inside the
//! `ValidationResult`. The single exception is a dangerous LaTeX construct, which
//! aborts the call with a [`SecurityViolation`]. Setup problems (bad config files,
//! message templates or blacklist patterns) are reported as [`VitasafeError`] or, from
//! the file loaders, as `anyhow::Error` with context.
//!
//! ---
//! License: MIT OR APACHE 2.0

pub mod config;
pub mod diagnostics;
pub mod document;
pub mod errors;
pub mod headless;
pub mod level;
pub mod messages;
pub mod normalizers;
pub mod sanitizer;
pub mod validator;

/// Configuration types and the config merge helper.
pub use config::{merge_config, DocumentKind, ValidatorConfig};

/// The diagnostic model.
pub use diagnostics::{
    Category, ErrorCode, ResultMetadata, Severity, SeverityCounts, ValidationError, ValidationResult,
};

pub use document::{FieldPath, PathSegment, PII_DEBUG_ENV};

pub use errors::{SecurityViolation, VitasafeError};

pub use level::{DowngradePolicy, ValidationLevel};

pub use messages::{MessageCatalog, MessageTemplate};

pub use normalizers::{FieldKind, FieldKindTable, NormalizeContext, Normalized, Normalizer};

/// The sanitizer and its rule types.
pub use sanitizer::{sanitize, BlacklistRule, Sanitizer, MAX_PATTERN_LENGTH};

pub use validator::Validator;

/// One-shot helpers.
pub use headless::{headless_sanitize, headless_validate};
