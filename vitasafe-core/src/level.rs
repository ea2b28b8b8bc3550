// vitasafe-core/src/level.rs
//! Strictness levels and the severity policy they apply.
//!
//! A level does more than move a pass/fail cutoff. `Permissive` re-classifies
//! correctable errors to warnings, but only for codes listed as eligible in the
//! `DowngradePolicy` table and only when the diagnostic carries a
//! `corrected_value`. Security codes are never eligible, whatever the table says.
//!
//! License: MIT OR APACHE 2.0

use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::diagnostics::{ErrorCode, Severity, SeverityCounts, ValidationError};
use crate::document::FieldPath;
use crate::errors::VitasafeError;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValidationLevel {
    /// Errors and warnings both block validity.
    Strict,
    /// Only errors block validity.
    #[default]
    Lenient,
    /// Only errors block validity; eligible correctable errors become warnings.
    Permissive,
}

impl fmt::Display for ValidationLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ValidationLevel::Strict => "strict",
            ValidationLevel::Lenient => "lenient",
            ValidationLevel::Permissive => "permissive",
        })
    }
}

impl FromStr for ValidationLevel {
    type Err = VitasafeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "strict" => Ok(ValidationLevel::Strict),
            "lenient" => Ok(ValidationLevel::Lenient),
            "permissive" => Ok(ValidationLevel::Permissive),
            other => Err(VitasafeError::InvalidConfig(format!(
                "unknown validation level '{}' (expected strict, lenient or permissive)",
                other
            ))),
        }
    }
}

/// Explicit table of which error codes `Permissive` may downgrade.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DowngradePolicy {
    eligible: BTreeMap<ErrorCode, bool>,
}

impl Default for DowngradePolicy {
    fn default() -> Self {
        let mut eligible = BTreeMap::new();
        eligible.insert(ErrorCode::DateHasTimeComponent, true);
        eligible.insert(ErrorCode::EmailRepairable, true);
        Self { eligible }
    }
}

impl DowngradePolicy {
    /// A policy under which nothing is ever downgraded.
    pub fn none() -> Self {
        Self { eligible: BTreeMap::new() }
    }

    /// Sets eligibility for one code. Security codes stay ineligible.
    pub fn set(&mut self, code: ErrorCode, eligible: bool) {
        if code.is_security() {
            debug!("Ignoring downgrade override for security code {}.", code);
            return;
        }
        self.eligible.insert(code, eligible);
    }

    pub fn is_eligible(&self, code: ErrorCode) -> bool {
        !code.is_security() && self.eligible.get(&code).copied().unwrap_or(false)
    }

    /// Codes currently marked eligible.
    pub fn eligible_codes(&self) -> Vec<ErrorCode> {
        self.eligible
            .iter()
            .filter(|(code, on)| **on && !code.is_security())
            .map(|(code, _)| *code)
            .collect()
    }
}

/// A correction applied to the working tree because a diagnostic was downgraded.
#[derive(Debug, Clone, PartialEq)]
pub struct AppliedCorrection {
    pub path: FieldPath,
    pub value: serde_json::Value,
}

/// Diagnostics sorted by their final severity.
#[derive(Debug, Clone, Default)]
pub struct Classified {
    pub errors: Vec<ValidationError>,
    pub warnings: Vec<ValidationError>,
    pub info: Vec<ValidationError>,
    pub corrections: Vec<AppliedCorrection>,
}

impl Classified {
    pub fn counts(&self) -> SeverityCounts {
        SeverityCounts {
            errors: self.errors.len(),
            warnings: self.warnings.len(),
            info: self.info.len(),
        }
    }
}

/// Applies the level's escalation policy and buckets diagnostics by final severity.
///
/// Each diagnostic comes with the structured path of the node it describes, which is
/// where a downgraded correction must be written back.
pub fn classify(
    level: ValidationLevel,
    policy: &DowngradePolicy,
    diagnostics: Vec<(FieldPath, ValidationError)>,
) -> Classified {
    let mut out = Classified::default();

    for (path, diagnostic) in diagnostics {
        let diagnostic = if level == ValidationLevel::Permissive
            && diagnostic.severity() == Severity::Error
            && policy.is_eligible(diagnostic.code())
        {
            match diagnostic.corrected_value() {
                Some(corrected) => {
                    debug!(
                        "Downgrading {} at '{}' to warning under permissive level.",
                        diagnostic.code(),
                        diagnostic.field_path()
                    );
                    out.corrections.push(AppliedCorrection {
                        path,
                        value: corrected.clone(),
                    });
                    diagnostic.downgraded()
                }
                None => diagnostic,
            }
        } else {
            diagnostic
        };

        match diagnostic.severity() {
            Severity::Error => out.errors.push(diagnostic),
            Severity::Warning => out.warnings.push(diagnostic),
            Severity::Info => out.info.push(diagnostic),
        }
    }

    out
}

/// Overall validity. Depends only on the bucket sizes and the level.
pub fn is_valid(level: ValidationLevel, errors: usize, warnings: usize) -> bool {
    match level {
        ValidationLevel::Strict => errors == 0 && warnings == 0,
        ValidationLevel::Lenient | ValidationLevel::Permissive => errors == 0,
    }
}
