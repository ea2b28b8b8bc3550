// vitasafe-core/src/messages.rs
//! Message catalog: an immutable table from error code to message template.
//!
//! The catalog is built once (embedded defaults, then optional per-code overrides)
//! and shared by reference, typically through an `Arc`, with every validator that
//! uses it. Nothing here is global or mutable after construction, so validators with
//! different catalogs can run side by side on different threads.
//!
//! Templates use `tinytemplate` syntax with two placeholders: `{field}` and `{value}`.
//!
//! License: MIT OR APACHE 2.0

use log::{debug, warn};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::collections::BTreeMap;
use tinytemplate::TinyTemplate;

use crate::diagnostics::{ErrorCode, ValidationError};
use crate::errors::VitasafeError;

/// Values longer than this are shortened before being placed in a message.
const MAX_VALUE_CHARS: usize = 80;

const DEFAULT_MESSAGES_YAML: &str = include_str!("../config/default_messages.yaml");

/// Message and optional fix template for one code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageTemplate {
    pub message: String,
    #[serde(default)]
    pub suggested_fix: Option<String>,
}

#[derive(Debug, Deserialize)]
struct MessageFile {
    messages: BTreeMap<String, MessageTemplate>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageCatalog {
    templates: BTreeMap<ErrorCode, MessageTemplate>,
}

impl MessageCatalog {
    /// Builds the catalog from the embedded default templates.
    pub fn builtin() -> Result<Self, VitasafeError> {
        let file: MessageFile = serde_yml::from_str(DEFAULT_MESSAGES_YAML)
            .map_err(|e| VitasafeError::InvalidConfig(format!("default messages: {}", e)))?;
        let templates = parse_templates(file.messages)?;

        if let Some(missing) = ErrorCode::ALL.iter().find(|c| !templates.contains_key(c)) {
            return Err(VitasafeError::InvalidConfig(format!(
                "default messages: no template for {}",
                missing
            )));
        }

        debug!("Loaded {} default message templates.", templates.len());
        Ok(Self { templates })
    }

    /// Returns a new catalog with the given per-code templates replacing the current ones.
    pub fn with_overrides(
        &self,
        overrides: &BTreeMap<String, MessageTemplate>,
    ) -> Result<Self, VitasafeError> {
        let parsed = parse_templates(overrides.clone())?;
        let mut templates = self.templates.clone();
        for (code, template) in parsed {
            debug!("Overriding message template for {}.", code);
            templates.insert(code, template);
        }
        Ok(Self { templates })
    }

    pub fn template(&self, code: ErrorCode) -> Option<&MessageTemplate> {
        self.templates.get(&code)
    }

    /// Renders the message and suggested fix for `code`.
    pub fn render(&self, code: ErrorCode, field: &str, value: Option<&Value>) -> (String, Option<String>) {
        let Some(template) = self.templates.get(&code) else {
            return (format!("{} at '{}'", code, field), None);
        };
        let ctx = json!({ "field": field, "value": display_value(value) });
        let message = render_one(code, &template.message, &ctx);
        let fix = template
            .suggested_fix
            .as_deref()
            .map(|fix| render_one(code, fix, &ctx));
        (message, fix)
    }

    /// Creates a diagnostic for `code` with a rendered message, suggested fix and
    /// the original value attached.
    pub fn diagnostic(&self, code: ErrorCode, field: &str, original: Option<&Value>) -> ValidationError {
        let (message, fix) = self.render(code, field, original);
        let mut diagnostic = ValidationError::new(field, code, message);
        if let Some(fix) = fix {
            diagnostic = diagnostic.with_suggested_fix(fix);
        }
        if let Some(original) = original {
            diagnostic = diagnostic.with_original(original.clone());
        }
        diagnostic
    }
}

fn parse_templates(
    raw: BTreeMap<String, MessageTemplate>,
) -> Result<BTreeMap<ErrorCode, MessageTemplate>, VitasafeError> {
    let mut templates = BTreeMap::new();
    let mut errors = Vec::new();

    for (key, template) in raw {
        let code = match key.parse::<ErrorCode>() {
            Ok(code) => code,
            Err(e) => {
                errors.push(e.to_string());
                continue;
            }
        };
        if let Err(e) = check_template(&template.message) {
            errors.push(format!("{} message: {}", code, e));
            continue;
        }
        if let Some(fix) = &template.suggested_fix {
            if let Err(e) = check_template(fix) {
                errors.push(format!("{} suggested_fix: {}", code, e));
                continue;
            }
        }
        templates.insert(code, template);
    }

    if errors.is_empty() {
        Ok(templates)
    } else {
        Err(VitasafeError::TemplateError(
            format!("{} template(s)", errors.len()),
            errors.join("; "),
        ))
    }
}

fn check_template(text: &str) -> Result<(), String> {
    let mut tt = TinyTemplate::new();
    tt.add_template("t", text).map_err(|e| e.to_string())?;
    tt.render("t", &json!({ "field": "f", "value": "v" }))
        .map(|_| ())
        .map_err(|e| e.to_string())
}

fn render_one(code: ErrorCode, text: &str, ctx: &Value) -> String {
    let mut tt = TinyTemplate::new();
    tt.set_default_formatter(&tinytemplate::format_unescaped);
    let rendered = tt
        .add_template("t", text)
        .map_err(|e| e.to_string())
        .and_then(|_| tt.render("t", ctx).map_err(|e| e.to_string()));
    match rendered {
        Ok(s) => s,
        Err(e) => {
            warn!("Failed to render message template for {}: {}", code, e);
            text.to_string()
        }
    }
}

fn display_value(value: Option<&Value>) -> String {
    let text = match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    };
    if text.chars().count() > MAX_VALUE_CHARS {
        let head: String = text.chars().take(MAX_VALUE_CHARS).collect();
        format!("{}...", head)
    } else {
        text
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_catalog_covers_every_code() {
        let catalog = MessageCatalog::builtin().unwrap();
        for code in ErrorCode::ALL {
            assert!(catalog.template(code).is_some(), "missing {}", code);
        }
    }

    #[test]
    fn renders_field_and_value_without_html_escaping() {
        let catalog = MessageCatalog::builtin().unwrap();
        let (message, fix) = catalog.render(
            ErrorCode::InvalidEmail,
            "personalInfo.email",
            Some(&json!("a&b")),
        );
        assert_eq!(message, "Email address 'a&b' in 'personalInfo.email' is not valid.");
        assert!(fix.is_some());
    }

    #[test]
    fn overrides_replace_single_codes() {
        let base = MessageCatalog::builtin().unwrap();
        let mut overrides = BTreeMap::new();
        overrides.insert(
            "VAL001".to_string(),
            MessageTemplate { message: "Bitte '{field}' angeben.".to_string(), suggested_fix: None },
        );
        let custom = base.with_overrides(&overrides).unwrap();
        let d = custom.diagnostic(ErrorCode::RequiredFieldMissing, "personalInfo", None);
        assert_eq!(d.message(), "Bitte 'personalInfo' angeben.");
        assert!(d.suggested_fix().is_none());
        // The base catalog is untouched.
        assert_eq!(
            base.render(ErrorCode::RequiredFieldMissing, "x", None).0,
            "Required field 'x' is missing."
        );
    }

    #[test]
    fn overrides_with_unknown_codes_or_bad_templates_fail() {
        let base = MessageCatalog::builtin().unwrap();
        let mut overrides = BTreeMap::new();
        overrides.insert(
            "VAL999".to_string(),
            MessageTemplate { message: "x".to_string(), suggested_fix: None },
        );
        assert!(base.with_overrides(&overrides).is_err());

        let mut overrides = BTreeMap::new();
        overrides.insert(
            "VAL001".to_string(),
            MessageTemplate { message: "{unknown_var}".to_string(), suggested_fix: None },
        );
        assert!(base.with_overrides(&overrides).is_err());
    }

    #[test]
    fn long_values_are_shortened() {
        let catalog = MessageCatalog::builtin().unwrap();
        let long = "x".repeat(200);
        let (message, _) = catalog.render(ErrorCode::InvalidDateFormat, "date", Some(&json!(long)));
        assert!(message.contains("..."));
        assert!(message.len() < 200);
    }
}
