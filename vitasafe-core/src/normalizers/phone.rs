// vitasafe-core/src/normalizers/phone.rs
//! Phone number normalization.
//!
//! Only a handful of North American and international shapes are rewritten. Anything
//! else is passed through untouched with a warning, since phone formats vary too much
//! to reject outright.
//!
//! License: MIT OR APACHE 2.0

use serde_json::Value;

use super::{FieldKind, NormalizeContext, Normalized, Normalizer};
use crate::diagnostics::ErrorCode;

/// E.164 allows at most 15 digits; shorter than 8 is not a dialable international number.
const INTERNATIONAL_DIGITS: std::ops::RangeInclusive<usize> = 8..=15;

fn is_phone_char(c: char) -> bool {
    c.is_ascii_digit() || matches!(c, ' ' | '.' | '-' | '(' | ')' | '+')
}

fn north_american(d: &str) -> String {
    format!("({}) {}-{}", &d[0..3], &d[3..6], &d[6..10])
}

/// Canonical form of `text`, or `None` when it is not a recognised shape.
pub fn canonical_phone(text: &str) -> Option<String> {
    let text = text.trim();
    if text.is_empty() || !text.chars().all(is_phone_char) {
        return None;
    }
    let international = text.starts_with('+');
    if text.rfind('+').is_some_and(|pos| pos != 0) {
        return None;
    }
    let digits: String = text.chars().filter(|c| c.is_ascii_digit()).collect();

    if international {
        if digits.len() == 11 && digits.starts_with('1') {
            return Some(format!("+1 {}", north_american(&digits[1..])));
        }
        if !INTERNATIONAL_DIGITS.contains(&digits.len()) {
            return None;
        }
        let groups: Vec<&str> = text[1..]
            .split(|c: char| !c.is_ascii_digit())
            .filter(|g| !g.is_empty())
            .collect();
        return Some(format!("+{}", groups.join(" ")));
    }

    match digits.len() {
        10 => {
            let bare = text.chars().all(|c| c.is_ascii_digit());
            if bare || text.contains('(') {
                Some(north_american(&digits))
            } else {
                Some(format!("{}-{}-{}", &digits[0..3], &digits[3..6], &digits[6..10]))
            }
        }
        11 if digits.starts_with('1') => Some(format!("+1 {}", north_american(&digits[1..]))),
        7 => Some(format!("{}-{}", &digits[0..3], &digits[3..7])),
        _ => None,
    }
}

pub struct PhoneNormalizer;

impl Normalizer for PhoneNormalizer {
    fn kind(&self) -> FieldKind {
        FieldKind::Phone
    }

    fn normalize(&self, raw: &Value, ctx: &NormalizeContext<'_>) -> Normalized {
        let text = match raw {
            Value::String(s) => s.clone(),
            Value::Number(n) if n.is_u64() => n.to_string(),
            _ => return Normalized::rejected(ctx.diagnostic(ErrorCode::InvalidType, raw)),
        };

        match canonical_phone(&text) {
            Some(canonical) => {
                Normalized::accepted(canonical, raw, ErrorCode::PhoneNormalized, ctx)
            }
            None => Normalized::rejected(ctx.diagnostic(ErrorCode::InvalidPhoneFormat, raw)),
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
        PhoneNormalizer.normalize(&raw, &NormalizeContext::new("personalInfo.phone", &catalog))
    }

    #[test]
    fn dotted_number_becomes_dashed_with_info() {
        let out = run(json!("555.123.4567"));
        assert_eq!(out.canonical.as_deref(), Some("555-123-4567"));
        assert_eq!(out.diagnostics.len(), 1);
        let d = &out.diagnostics[0];
        assert_eq!(d.severity(), Severity::Info);
        assert_eq!(d.code(), ErrorCode::PhoneNormalized);
        assert_eq!(d.original_value(), Some(&json!("555.123.4567")));
        assert_eq!(d.corrected_value(), Some(&json!("555-123-4567")));
    }

    #[test]
    fn documented_shapes() {
        let cases = [
            ("5551234567", "(555) 123-4567"),
            ("(555)123-4567", "(555) 123-4567"),
            ("555 123 4567", "555-123-4567"),
            ("15551234567", "+1 (555) 123-4567"),
            ("1-555-123-4567", "+1 (555) 123-4567"),
            ("+1 555 123 4567", "+1 (555) 123-4567"),
            ("+44 (20) 7946-0958", "+44 20 7946 0958"),
            ("555.1234", "555-1234"),
        ];
        for (input, expected) in cases {
            assert_eq!(canonical_phone(input).as_deref(), Some(expected), "input {:?}", input);
        }
    }

    #[test]
    fn numeric_json_values_are_read_as_digits() {
        assert_eq!(run(json!(5551234567u64)).canonical.as_deref(), Some("(555) 123-4567"));
    }

    #[test]
    fn canonical_forms_are_fixed_points() {
        for input in ["555.123.4567", "5551234567", "15551234567", "+44 20 7946 0958", "5551234"] {
            let once = canonical_phone(input).unwrap();
            assert_eq!(canonical_phone(&once).as_deref(), Some(once.as_str()));
        }
    }

    #[test]
    fn unknown_shapes_warn_and_pass_through() {
        for input in ["12345", "555-CALL-NOW", "+12 34", "555-123-4567 ext 9", "55+5123"] {
            let out = run(json!(input));
            assert!(out.canonical.is_none(), "{}", input);
            assert_eq!(out.diagnostics.len(), 1);
            assert_eq!(out.diagnostics[0].code(), ErrorCode::InvalidPhoneFormat);
            assert_eq!(out.diagnostics[0].severity(), Severity::Warning);
        }
    }

    #[test]
    fn non_scalar_values_are_type_errors() {
        assert_eq!(run(json!(["555"])).diagnostics[0].code(), ErrorCode::InvalidType);
    }
}
