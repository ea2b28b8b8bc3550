// vitasafe-core/src/normalizers/email.rs
//! Email normalization: trimmed, lower-cased and checked against a conservative pattern.
//!
//! License: MIT OR APACHE 2.0

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

use super::{FieldKind, NormalizeContext, Normalized, Normalizer};
use crate::diagnostics::ErrorCode;

static EMAIL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}$").expect("valid email regex")
});

/// Address with whitespace removed and a leading `mailto:` dropped, if that makes it valid.
fn repair(candidate: &str) -> Option<String> {
    let squeezed: String = candidate.chars().filter(|c| !c.is_whitespace()).collect();
    let repaired = squeezed.strip_prefix("mailto:").unwrap_or(&squeezed).to_string();
    EMAIL.is_match(&repaired).then_some(repaired)
}

pub struct EmailNormalizer;

impl Normalizer for EmailNormalizer {
    fn kind(&self) -> FieldKind {
        FieldKind::Email
    }

    fn normalize(&self, raw: &Value, ctx: &NormalizeContext<'_>) -> Normalized {
        let Some(text) = raw.as_str() else {
            return Normalized::rejected(ctx.diagnostic(ErrorCode::InvalidType, raw));
        };
        let candidate = text.trim().to_lowercase();

        if EMAIL.is_match(&candidate) {
            return Normalized::accepted(candidate, raw, ErrorCode::EmailNormalized, ctx);
        }
        match repair(&candidate) {
            Some(repaired) => Normalized::rejected(
                ctx.diagnostic(ErrorCode::EmailRepairable, raw).with_corrected(repaired),
            ),
            None => Normalized::rejected(ctx.diagnostic(ErrorCode::InvalidEmail, raw)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::Severity;
    use crate::messages::MessageCatalog;
    use serde_json::json;

    fn run(raw: Value) -> Normalized {
        let catalog = MessageCatalog::builtin().unwrap();
        EmailNormalizer.normalize(&raw, &NormalizeContext::new("personalInfo.email", &catalog))
    }

    #[test]
    fn upper_case_is_folded_with_info() {
        let out = run(json!("JOHN@X.COM"));
        assert_eq!(out.canonical.as_deref(), Some("john@x.com"));
        let d = &out.diagnostics[0];
        assert_eq!(d.code(), ErrorCode::EmailNormalized);
        assert_eq!(d.severity(), Severity::Info);
        assert_eq!(d.original_value(), Some(&json!("JOHN@X.COM")));
        assert_eq!(d.corrected_value(), Some(&json!("john@x.com")));
    }

    #[test]
    fn canonical_input_produces_no_diagnostics() {
        let out = run(json!("jane.doe+cv@example.co.uk"));
        assert_eq!(out.canonical.as_deref(), Some("jane.doe+cv@example.co.uk"));
        assert!(out.diagnostics.is_empty());
    }

    #[test]
    fn normalization_is_idempotent() {
        for input in [" Jane@X.COM ", "jane.doe+cv@Example.co.uk"] {
            let once = run(json!(input)).canonical.unwrap();
            let twice = run(json!(once.clone()));
            assert_eq!(twice.canonical.as_deref(), Some(once.as_str()), "{:?}", input);
            assert!(twice.diagnostics.is_empty(), "{:?}", input);
        }
    }

    #[test]
    fn stray_characters_are_repairable() {
        for (input, fixed) in [
            ("mailto:jane@example.com", "jane@example.com"),
            ("jane @ example.com", "jane@example.com"),
        ] {
            let out = run(json!(input));
            assert!(out.canonical.is_none());
            let d = &out.diagnostics[0];
            assert_eq!(d.code(), ErrorCode::EmailRepairable);
            assert_eq!(d.severity(), Severity::Error);
            assert_eq!(d.corrected_value(), Some(&json!(fixed)));
        }
    }

    #[test]
    fn hopeless_addresses_are_invalid() {
        for input in ["not-an-email", "a@b", "@example.com", "jane@@example.com"] {
            let out = run(json!(input));
            assert_eq!(out.diagnostics[0].code(), ErrorCode::InvalidEmail, "{}", input);
            assert!(out.diagnostics[0].corrected_value().is_none());
        }
    }

    #[test]
    fn non_strings_are_type_errors() {
        assert_eq!(run(json!(42)).diagnostics[0].code(), ErrorCode::InvalidType);
    }
}
