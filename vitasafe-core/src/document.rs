// vitasafe-core/src/document.rs
//! Document tree helpers: field paths, lookups and digests.
//!
//! Documents are plain `serde_json::Value` trees (objects keep caller order). A field
//! path addresses one node, written the way users see it in diagnostics:
//! `experience[2].startDate`.
//!
//! License: MIT OR APACHE 2.0

use once_cell::sync::Lazy;
use serde_json::Value;
use sha2::{Digest, Sha256};
use std::fmt;

use crate::errors::VitasafeError;

/// One step in a field path.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PathSegment {
    Key(String),
    Index(usize),
}

/// A parsed field path.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct FieldPath {
    segments: Vec<PathSegment>,
}

impl FieldPath {
    pub fn root() -> Self {
        Self::default()
    }

    /// Parses `a.b[3].c` style paths.
    pub fn parse(text: &str) -> Result<Self, VitasafeError> {
        let bad = |why: &str| VitasafeError::InvalidConfig(format!("field path '{}': {}", text, why));
        let mut segments = Vec::new();

        for part in text.split('.') {
            if part.is_empty() {
                return Err(bad("empty segment"));
            }
            let (key, mut rest) = match part.find('[') {
                Some(pos) => (&part[..pos], &part[pos..]),
                None => (part, ""),
            };
            if key.is_empty() && segments.is_empty() {
                return Err(bad("path must start with a key"));
            }
            if !key.is_empty() {
                segments.push(PathSegment::Key(key.to_string()));
            }
            while !rest.is_empty() {
                let Some(close) = rest.find(']') else {
                    return Err(bad("unclosed '['"));
                };
                if !rest.starts_with('[') {
                    return Err(bad("unexpected text after ']'"));
                }
                let index = rest[1..close]
                    .parse::<usize>()
                    .map_err(|_| bad("index must be a non-negative integer"))?;
                segments.push(PathSegment::Index(index));
                rest = &rest[close + 1..];
            }
        }

        Ok(Self { segments })
    }

    pub fn segments(&self) -> &[PathSegment] {
        &self.segments
    }

    /// Every proper prefix, shortest first. `a.b[1]` yields `a`, `a.b`.
    pub fn ancestors(&self) -> impl Iterator<Item = FieldPath> + '_ {
        (1..self.segments.len()).map(move |n| FieldPath {
            segments: self.segments[..n].to_vec(),
        })
    }

    pub fn key(&self, key: &str) -> Self {
        let mut segments = self.segments.clone();
        segments.push(PathSegment::Key(key.to_string()));
        Self { segments }
    }

    pub fn index(&self, index: usize) -> Self {
        let mut segments = self.segments.clone();
        segments.push(PathSegment::Index(index));
        Self { segments }
    }

    pub fn lookup<'a>(&self, root: &'a Value) -> Option<&'a Value> {
        self.segments.iter().try_fold(root, |node, segment| match segment {
            PathSegment::Key(k) => node.as_object()?.get(k),
            PathSegment::Index(i) => node.as_array()?.get(*i),
        })
    }

    pub fn lookup_mut<'a>(&self, root: &'a mut Value) -> Option<&'a mut Value> {
        self.segments.iter().try_fold(root, |node, segment| match segment {
            PathSegment::Key(k) => node.as_object_mut()?.get_mut(k),
            PathSegment::Index(i) => node.as_array_mut()?.get_mut(*i),
        })
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (n, segment) in self.segments.iter().enumerate() {
            match segment {
                PathSegment::Key(k) if n == 0 => write!(f, "{}", k)?,
                PathSegment::Key(k) => write!(f, ".{}", k)?,
                PathSegment::Index(i) => write!(f, "[{}]", i)?,
            }
        }
        Ok(())
    }
}

/// `null`, blank strings, empty lists and empty objects count as empty.
pub fn is_empty_value(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.trim().is_empty(),
        Value::Array(a) => a.is_empty(),
        Value::Object(o) => o.is_empty(),
        Value::Bool(_) | Value::Number(_) => false,
    }
}

/// Hex SHA-256 of the compact JSON serialization.
pub fn digest(value: &Value) -> String {
    let mut hasher = Sha256::new();
    hasher.update(value.to_string().as_bytes());
    hex::encode(hasher.finalize())
}

/// Raw field values reach debug logs only when this is set to `true`.
pub const PII_DEBUG_ENV: &str = "VITASAFE_ALLOW_DEBUG_PII";

static PII_DEBUG_ALLOWED: Lazy<bool> = Lazy::new(|| {
    std::env::var(PII_DEBUG_ENV)
        .map(|s| s.eq_ignore_ascii_case("true"))
        .unwrap_or(false)
});

/// Replaces a value with a length marker.
pub fn redact_sensitive(s: &str) -> String {
    const MAX_LEN: usize = 8;
    if s.chars().count() <= MAX_LEN {
        "[REDACTED]".to_string()
    } else {
        format!("[REDACTED: {} chars]", s.chars().count())
    }
}

/// `s` itself when PII logging is enabled, otherwise a redaction marker.
pub fn loggable(s: &str) -> String {
    if *PII_DEBUG_ALLOWED {
        s.to_string()
    } else {
        redact_sensitive(s)
    }
}

/// Number of string leaves in the tree.
pub fn count_string_leaves(value: &Value) -> usize {
    match value {
        Value::String(_) => 1,
        Value::Array(items) => items.iter().map(count_string_leaves).sum(),
        Value::Object(map) => map.values().map(count_string_leaves).sum(),
        _ => 0,
    }
}
