// vitasafe-core/src/normalizers/mod.rs
//! Format normalizers and the field-kind lookup that selects them.
//!
//! Each normalizer maps one raw scalar to a canonical string plus diagnostics. They
//! never fail: malformed input gives no canonical value and an error (or, for phone
//! numbers, a warning) diagnostic. When valid input is rewritten, an `info`
//! diagnostic records the original and corrected values so every silent change can
//! be audited.
//!
//! Which normalizer applies to a leaf is decided only by its key, through
//! [`FieldKindTable`]. The traversal never branches on field names itself.
//!
//! License: MIT OR APACHE 2.0

pub mod date;
pub mod email;
pub mod phone;
pub mod url;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use std::fmt;

use crate::diagnostics::{ErrorCode, ValidationError};
use crate::messages::MessageCatalog;

pub use self::date::DateNormalizer;
pub use self::email::EmailNormalizer;
pub use self::phone::PhoneNormalizer;
pub use self::url::UrlNormalizer;

/// Semantic kind of a scalar field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    Email,
    Phone,
    Url,
    Date,
    Generic,
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            FieldKind::Email => "email",
            FieldKind::Phone => "phone",
            FieldKind::Url => "url",
            FieldKind::Date => "date",
            FieldKind::Generic => "generic",
        })
    }
}

static DATE: DateNormalizer = DateNormalizer;
static EMAIL: EmailNormalizer = EmailNormalizer;
static PHONE: PhoneNormalizer = PhoneNormalizer;
static URL: UrlNormalizer = UrlNormalizer;

impl FieldKind {
    /// The normalizer for this kind. `Generic` fields are only sanitized.
    pub fn normalizer(&self) -> Option<&'static dyn Normalizer> {
        match self {
            FieldKind::Email => Some(&EMAIL),
            FieldKind::Phone => Some(&PHONE),
            FieldKind::Url => Some(&URL),
            FieldKind::Date => Some(&DATE),
            FieldKind::Generic => None,
        }
    }
}

const BUILTIN_FIELD_KINDS: &[(&str, FieldKind)] = &[
    ("email", FieldKind::Email),
    ("contactEmail", FieldKind::Email),
    ("phone", FieldKind::Phone),
    ("phoneNumber", FieldKind::Phone),
    ("mobile", FieldKind::Phone),
    ("url", FieldKind::Url),
    ("website", FieldKind::Url),
    ("linkedin", FieldKind::Url),
    ("github", FieldKind::Url),
    ("portfolio", FieldKind::Url),
    ("homepage", FieldKind::Url),
    ("link", FieldKind::Url),
    ("date", FieldKind::Date),
    ("startDate", FieldKind::Date),
    ("endDate", FieldKind::Date),
    ("graduationDate", FieldKind::Date),
    ("issueDate", FieldKind::Date),
    ("expirationDate", FieldKind::Date),
    ("publicationDate", FieldKind::Date),
    ("publishedDate", FieldKind::Date),
];

/// Exact, case-sensitive key to kind table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldKindTable {
    kinds: HashMap<String, FieldKind>,
}

impl Default for FieldKindTable {
    fn default() -> Self {
        Self {
            kinds: BUILTIN_FIELD_KINDS
                .iter()
                .map(|(key, kind)| (key.to_string(), *kind))
                .collect(),
        }
    }
}

impl FieldKindTable {
    /// Built-in table with `overrides` replacing entries key by key.
    pub fn with_overrides(overrides: &BTreeMap<String, FieldKind>) -> Self {
        let mut table = Self::default();
        for (key, kind) in overrides {
            table.kinds.insert(key.clone(), *kind);
        }
        table
    }

    pub fn kind_for(&self, key: &str) -> FieldKind {
        self.kinds.get(key).copied().unwrap_or(FieldKind::Generic)
    }

    pub fn len(&self) -> usize {
        self.kinds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.kinds.is_empty()
    }
}

/// What a normalizer needs to know besides the value itself.
#[derive(Debug, Clone, Copy)]
pub struct NormalizeContext<'a> {
    pub field_path: &'a str,
    pub catalog: &'a MessageCatalog,
}

impl<'a> NormalizeContext<'a> {
    pub fn new(field_path: &'a str, catalog: &'a MessageCatalog) -> Self {
        Self { field_path, catalog }
    }

    pub(crate) fn diagnostic(&self, code: ErrorCode, raw: &Value) -> ValidationError {
        self.catalog.diagnostic(code, self.field_path, Some(raw))
    }
}

/// Outcome of normalizing one value.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Normalized {
    /// Canonical form, or `None` when the original must be left in place.
    pub canonical: Option<String>,
    pub diagnostics: Vec<ValidationError>,
}

impl Normalized {
    /// No canonical value and one diagnostic.
    pub(crate) fn rejected(diagnostic: ValidationError) -> Self {
        Self { canonical: None, diagnostics: vec![diagnostic] }
    }

    /// A canonical value, with an info diagnostic when it differs from `raw`.
    pub(crate) fn accepted(
        canonical: String,
        raw: &Value,
        info_code: ErrorCode,
        ctx: &NormalizeContext<'_>,
    ) -> Self {
        let unchanged = matches!(raw, Value::String(s) if *s == canonical);
        let diagnostics = if unchanged {
            Vec::new()
        } else {
            vec![ctx.diagnostic(info_code, raw).with_corrected(canonical.clone())]
        };
        Self { canonical: Some(canonical), diagnostics }
    }
}

/// One normalizer per non-generic [`FieldKind`].
pub trait Normalizer: Send + Sync {
    fn kind(&self) -> FieldKind;

    /// Normalizes `raw`. Never panics and never fails; problems become diagnostics.
    fn normalize(&self, raw: &Value, ctx: &NormalizeContext<'_>) -> Normalized;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_table_maps_known_keys() {
        let table = FieldKindTable::default();
        assert_eq!(table.kind_for("startDate"), FieldKind::Date);
        assert_eq!(table.kind_for("graduationDate"), FieldKind::Date);
        assert_eq!(table.kind_for("email"), FieldKind::Email);
        assert_eq!(table.kind_for("linkedin"), FieldKind::Url);
        assert_eq!(table.kind_for("summary"), FieldKind::Generic);
        // Keys are case-sensitive.
        assert_eq!(table.kind_for("StartDate"), FieldKind::Generic);
    }

    #[test]
    fn overrides_replace_entries() {
        let mut overrides = BTreeMap::new();
        overrides.insert("link".to_string(), FieldKind::Generic);
        overrides.insert("fax".to_string(), FieldKind::Phone);
        let table = FieldKindTable::with_overrides(&overrides);
        assert_eq!(table.kind_for("link"), FieldKind::Generic);
        assert_eq!(table.kind_for("fax"), FieldKind::Phone);
        assert_eq!(table.kind_for("email"), FieldKind::Email);
    }

    #[test]
    fn each_kind_has_a_matching_normalizer() {
        for kind in [FieldKind::Email, FieldKind::Phone, FieldKind::Url, FieldKind::Date] {
            assert_eq!(kind.normalizer().map(|n| n.kind()), Some(kind));
        }
        assert!(FieldKind::Generic.normalizer().is_none());
    }
}
