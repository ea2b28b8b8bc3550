// vitasafe-core/src/normalizers/url.rs
//! URL normalization. Only `http` and `https` links survive; a missing scheme
//! defaults to `https://`.
//!
//! License: MIT OR APACHE 2.0

use log::debug;
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

use super::{FieldKind, NormalizeContext, Normalized, Normalizer};
use crate::diagnostics::ErrorCode;

static SCHEME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([A-Za-z][A-Za-z0-9+.-]*)://").expect("valid scheme regex"));

/// Schemes written without `//` that must not be mistaken for a bare host.
static OPAQUE_SCHEME: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^(javascript|data|vbscript|file|mailto|tel):").expect("valid opaque scheme regex")
});

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UrlProblem {
    SchemeNotAllowed,
    MissingHost,
}

/// Canonical form of `text` or the reason it cannot be used.
pub fn canonical_url(text: &str) -> Result<String, UrlProblem> {
    let text = text.trim();
    if OPAQUE_SCHEME.is_match(text) {
        return Err(UrlProblem::SchemeNotAllowed);
    }

    let candidate = match SCHEME.captures(text) {
        Some(caps) => {
            let scheme = caps[1].to_ascii_lowercase();
            if scheme != "http" && scheme != "https" {
                return Err(UrlProblem::SchemeNotAllowed);
            }
            format!("{}{}", scheme, &text[caps[1].len()..])
        }
        None => format!("https://{}", text),
    };

    match ::url::Url::parse(&candidate) {
        Ok(parsed) if parsed.host_str().is_some_and(|h| !h.is_empty()) => Ok(candidate),
        Ok(_) => Err(UrlProblem::MissingHost),
        Err(e) => {
            debug!("URL parser rejected candidate: {}", e);
            Err(UrlProblem::MissingHost)
        }
    }
}

pub struct UrlNormalizer;

impl Normalizer for UrlNormalizer {
    fn kind(&self) -> FieldKind {
        FieldKind::Url
    }

    fn normalize(&self, raw: &Value, ctx: &NormalizeContext<'_>) -> Normalized {
        let Some(text) = raw.as_str() else {
            return Normalized::rejected(ctx.diagnostic(ErrorCode::InvalidType, raw));
        };
        match canonical_url(text) {
            Ok(canonical) => Normalized::accepted(canonical, raw, ErrorCode::UrlNormalized, ctx),
            Err(UrlProblem::SchemeNotAllowed) => {
                Normalized::rejected(ctx.diagnostic(ErrorCode::UrlSchemeNotAllowed, raw))
            }
            Err(UrlProblem::MissingHost) => {
                Normalized::rejected(ctx.diagnostic(ErrorCode::UrlMissingHost, raw))
            }
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
        UrlNormalizer.normalize(&raw, &NormalizeContext::new("personalInfo.website", &catalog))
    }

    #[test]
    fn bare_hosts_get_https() {
        let out = run(json!("linkedin.com/in/jane"));
        assert_eq!(out.canonical.as_deref(), Some("https://linkedin.com/in/jane"));
        assert_eq!(out.diagnostics[0].code(), ErrorCode::UrlNormalized);
        assert_eq!(out.diagnostics[0].severity(), Severity::Info);
    }

    #[test]
    fn full_urls_are_kept_as_written() {
        let out = run(json!("http://example.com/a?b=c"));
        assert_eq!(out.canonical.as_deref(), Some("http://example.com/a?b=c"));
        assert!(out.diagnostics.is_empty());
    }

    #[test]
    fn scheme_is_lower_cased_and_whitespace_trimmed() {
        assert_eq!(canonical_url("  HTTPS://Example.com ").as_deref(), Ok("https://Example.com"));
    }

    #[test]
    fn dangerous_or_foreign_schemes_are_rejected() {
        for input in ["javascript:alert(1)", "JavaScript:void(0)", "data:text/html,x", "ftp://example.com", "file:///etc/passwd"] {
            let out = run(json!(input));
            assert_eq!(out.diagnostics[0].code(), ErrorCode::UrlSchemeNotAllowed, "{}", input);
            assert!(out.canonical.is_none());
        }
    }

    #[test]
    fn missing_host_is_reported() {
        for input in ["https://", "  "] {
            assert_eq!(canonical_url(input), Err(UrlProblem::MissingHost), "{:?}", input);
        }
    }

    #[test]
    fn normalization_is_idempotent() {
        for input in ["example.com", "HTTP://example.com/x"] {
            let once = canonical_url(input).unwrap();
            assert_eq!(canonical_url(&once), Ok(once.clone()));
        }
    }
}
