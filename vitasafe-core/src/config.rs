// vitasafe-core/src/config.rs
//! Configuration management for `vitasafe-core`.
//!
//! A `ValidatorConfig` describes one validator: its strictness level, which document
//! profile supplies the required fields, and any per-deployment overrides (message
//! templates, field kinds, downgrade eligibility, extra blacklist patterns). Configs
//! are plain YAML, loaded with `serde_yml`, and every field has a default so an empty
//! file is a valid config.
//!
//! License: MIT OR APACHE 2.0

use anyhow::{anyhow, Context, Result};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

use crate::diagnostics::ErrorCode;
use crate::document::FieldPath;
use crate::errors::VitasafeError;
use crate::level::{DowngradePolicy, ValidationLevel};
use crate::messages::{MessageCatalog, MessageTemplate};
use crate::normalizers::FieldKind;
use crate::sanitizer::{compile_rules, BlacklistRule};

const RESUME_REQUIRED: &[&str] = &["personalInfo", "personalInfo.name", "personalInfo.email"];
const COVER_LETTER_EXTRA: &[&str] = &["recipient", "body"];

const KNOWN_KEYS: &[&str] = &[
    "level",
    "document",
    "required_fields",
    "allow_basic_formatting",
    "downgrade",
    "field_kinds",
    "messages",
    "extra_blacklist",
];

/// Built-in document profiles.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentKind {
    #[default]
    Resume,
    CoverLetter,
}

impl DocumentKind {
    /// Required field paths for this profile, parents before children.
    pub fn required_fields(&self) -> Vec<String> {
        let mut fields: Vec<String> = RESUME_REQUIRED.iter().map(|s| s.to_string()).collect();
        if *self == DocumentKind::CoverLetter {
            fields.extend(COVER_LETTER_EXTRA.iter().map(|s| s.to_string()));
        }
        fields
    }
}

impl fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            DocumentKind::Resume => "resume",
            DocumentKind::CoverLetter => "cover_letter",
        })
    }
}

impl FromStr for DocumentKind {
    type Err = VitasafeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "resume" => Ok(DocumentKind::Resume),
            "cover_letter" => Ok(DocumentKind::CoverLetter),
            other => Err(VitasafeError::InvalidConfig(format!(
                "unknown document kind '{}' (expected resume or cover_letter)",
                other
            ))),
        }
    }
}

fn default_allow_formatting() -> bool {
    true
}

/// Everything needed to build a `Validator`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct ValidatorConfig {
    pub level: ValidationLevel,
    pub document: DocumentKind,
    /// Replaces the profile's required fields when non-empty.
    pub required_fields: Vec<String>,
    #[serde(default = "default_allow_formatting")]
    pub allow_basic_formatting: bool,
    /// Per-code downgrade eligibility overrides, keyed by code string.
    pub downgrade: BTreeMap<String, bool>,
    /// Field key to kind overrides.
    pub field_kinds: BTreeMap<String, FieldKind>,
    /// Per-code message template overrides, keyed by code string.
    pub messages: BTreeMap<String, MessageTemplate>,
    pub extra_blacklist: Vec<BlacklistRule>,
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self {
            level: ValidationLevel::default(),
            document: DocumentKind::default(),
            required_fields: Vec::new(),
            allow_basic_formatting: true,
            downgrade: BTreeMap::new(),
            field_kinds: BTreeMap::new(),
            messages: BTreeMap::new(),
            extra_blacklist: Vec::new(),
        }
    }
}

impl ValidatorConfig {
    /// Loads and validates a YAML config file.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        info!("Loading validator config from: {}", path.display());
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config = Self::from_yaml_str(&text)
            .with_context(|| format!("Failed to load config file {}", path.display()))?;
        info!(
            "Loaded config from {} (level: {}, document: {}).",
            path.display(),
            config.level,
            config.document
        );
        Ok(config)
    }

    /// Parses and validates config YAML. Unknown top-level keys are logged and ignored.
    pub fn from_yaml_str(text: &str) -> Result<Self> {
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        let raw: serde_yml::Value = serde_yml::from_str(text).context("Failed to parse config YAML")?;
        if raw.is_null() {
            return Ok(Self::default());
        }
        if let Some(map) = raw.as_mapping() {
            for key in map.keys() {
                match key.as_str() {
                    Some(k) if KNOWN_KEYS.contains(&k) => {}
                    Some(k) => warn!("Ignoring unknown config key '{}'.", k),
                    None => warn!("Ignoring non-string config key."),
                }
            }
        }
        let config: ValidatorConfig =
            serde_yml::from_value(raw).context("Failed to parse config YAML")?;
        config.validate()?;
        Ok(config)
    }

    /// Required field paths in effect.
    pub fn effective_required_fields(&self) -> Vec<String> {
        if self.required_fields.is_empty() {
            self.document.required_fields()
        } else {
            self.required_fields.clone()
        }
    }

    /// The downgrade table: defaults with this config's overrides applied.
    pub fn downgrade_policy(&self) -> Result<DowngradePolicy, VitasafeError> {
        let mut policy = DowngradePolicy::default();
        for (code, eligible) in &self.downgrade {
            let code = code.parse::<ErrorCode>()?;
            if code.is_security() && *eligible {
                warn!("Ignoring downgrade override for security code {}.", code);
            }
            policy.set(code, *eligible);
        }
        Ok(policy)
    }

    /// Checks every part of the config and reports all problems together.
    pub fn validate(&self) -> Result<()> {
        let mut errors = Vec::new();

        for path in &self.required_fields {
            if let Err(e) = FieldPath::parse(path) {
                errors.push(e.to_string());
            }
        }

        if let Err(e) = self.downgrade_policy() {
            errors.push(format!("downgrade: {}", e));
        }

        if !self.messages.is_empty() {
            match MessageCatalog::builtin() {
                Ok(catalog) => {
                    if let Err(e) = catalog.with_overrides(&self.messages) {
                        errors.push(format!("messages: {}", e));
                    }
                }
                Err(e) => errors.push(e.to_string()),
            }
        }

        let mut names = HashSet::new();
        for rule in &self.extra_blacklist {
            if rule.name.is_empty() {
                errors.push("A blacklist rule has an empty `name` field.".to_string());
            } else if !names.insert(rule.name.as_str()) {
                errors.push(format!("Duplicate blacklist rule name found: '{}'.", rule.name));
            }
            if rule.pattern.is_empty() {
                errors.push(format!("Blacklist rule '{}' has an empty `pattern` field.", rule.name));
            }
        }
        if let Err(e) = compile_rules(self.extra_blacklist.clone()) {
            errors.push(e.to_string());
        }

        if errors.is_empty() {
            debug!("Config validated successfully.");
            Ok(())
        } else {
            Err(anyhow!("Config validation failed:\n{}", errors.join("\n")))
        }
    }
}

/// Overlays a user config on the defaults.
///
/// Scalars come from the user config. Map entries and blacklist rules are merged by
/// key, with user entries winning; user `required_fields` replace the defaults only
/// when non-empty.
pub fn merge_config(default_config: ValidatorConfig, user_config: Option<ValidatorConfig>) -> ValidatorConfig {
    let Some(user) = user_config else {
        debug!("No user config provided; using defaults.");
        return default_config;
    };
    debug!(
        "Merging user config: {} message overrides, {} field kinds, {} blacklist rules.",
        user.messages.len(),
        user.field_kinds.len(),
        user.extra_blacklist.len()
    );

    let mut merged = default_config;
    merged.level = user.level;
    merged.document = user.document;
    merged.allow_basic_formatting = user.allow_basic_formatting;
    if !user.required_fields.is_empty() {
        merged.required_fields = user.required_fields;
    }
    merged.downgrade.extend(user.downgrade);
    merged.field_kinds.extend(user.field_kinds);
    merged.messages.extend(user.messages);

    for rule in user.extra_blacklist {
        match merged.extra_blacklist.iter_mut().find(|r| r.name == rule.name) {
            Some(existing) => *existing = rule,
            None => merged.extra_blacklist.push(rule),
        }
    }

    merged
}
