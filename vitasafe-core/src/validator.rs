// vitasafe-core/src/validator.rs
//! The validation pipeline.
//!
//! `Validator::validate` works on a private copy of the caller's document and runs
//! four phases in order:
//!
//! 1. **Required fields.** Each configured path must be present and non-empty. A path
//!    whose parent was already reported is skipped, so one missing section produces
//!    one diagnostic.
//! 2. **Normalization.** The tree is walked once. Every scalar whose key (or, inside a
//!    list, whose list's key) maps to a non-generic [`FieldKind`] goes through that
//!    kind's normalizer and is replaced by its canonical form when there is one. A
//!    container where a typed scalar belongs is a type error and is not descended.
//!    Sibling `startDate`/`endDate` pairs are checked for order.
//! 3. **Sanitization.** Every string leaf in the working copy, normalized or not, goes
//!    through the [`Sanitizer`]. The first dangerous construct aborts the whole call
//!    with a [`SecurityViolation`] and no result.
//! 4. **Aggregation.** Diagnostics are sorted into errors, warnings and info under the
//!    level's policy and validity is decided from the bucket sizes alone.
//!
//! Under `Permissive`, corrections carried by downgraded diagnostics are written into
//! the working copy before sanitization so they are escaped like everything else. Every
//! diagnostic travels with the structured path of its node, so a key containing `.` or
//! `[n]` is still corrected in place.
//!
//! A `Validator` holds no per-call state. One instance can serve any number of threads.
//!
//! License: MIT OR APACHE 2.0

use log::{debug, warn};
use serde_json::{Map, Value};
use std::cmp::Ordering;
use std::sync::Arc;

use crate::config::ValidatorConfig;
use crate::diagnostics::{ErrorCode, ResultMetadata, ValidationError, ValidationResult};
use crate::document::{self, is_empty_value, FieldPath};
use crate::errors::{SecurityViolation, VitasafeError};
use crate::level::{self, DowngradePolicy, ValidationLevel};
use crate::messages::MessageCatalog;
use crate::normalizers::date::{parse_date_str, PartialDate};
use crate::normalizers::{FieldKind, FieldKindTable, NormalizeContext, Normalizer};

/// A diagnostic paired with the node it was raised for.
type Located = (FieldPath, ValidationError);
use crate::sanitizer::Sanitizer;

const START_DATE_KEY: &str = "startDate";
const END_DATE_KEY: &str = "endDate";

#[derive(Debug, Clone)]
pub struct Validator {
    level: ValidationLevel,
    required: Vec<FieldPath>,
    allow_basic_formatting: bool,
    catalog: Arc<MessageCatalog>,
    kinds: FieldKindTable,
    sanitizer: Sanitizer,
    policy: DowngradePolicy,
}

impl Validator {
    /// Builds a validator with the built-in catalog plus the config's message overrides.
    pub fn new(config: &ValidatorConfig) -> Result<Self, VitasafeError> {
        let catalog = MessageCatalog::builtin()?.with_overrides(&config.messages)?;
        Self::with_catalog(config, Arc::new(catalog))
    }

    /// Builds a validator around an existing, shared catalog. The config's own
    /// `messages` overrides are not applied.
    pub fn with_catalog(
        config: &ValidatorConfig,
        catalog: Arc<MessageCatalog>,
    ) -> Result<Self, VitasafeError> {
        let mut required = config
            .effective_required_fields()
            .iter()
            .map(|p| FieldPath::parse(p))
            .collect::<Result<Vec<_>, _>>()?;
        // Parents first, so a missing section hides its children.
        required.sort_by_key(|p| p.segments().len());

        let validator = Self {
            level: config.level,
            required,
            allow_basic_formatting: config.allow_basic_formatting,
            catalog,
            kinds: FieldKindTable::with_overrides(&config.field_kinds),
            sanitizer: Sanitizer::with_extra_rules(config.extra_blacklist.clone())?,
            policy: config.downgrade_policy()?,
        };
        debug!(
            "Validator ready: level {}, {} required field(s), {} field kind(s), {} blacklist rule(s).",
            validator.level,
            validator.required.len(),
            validator.kinds.len(),
            validator.sanitizer.rule_names().len()
        );
        Ok(validator)
    }

    pub fn level(&self) -> ValidationLevel {
        self.level
    }

    pub fn catalog(&self) -> &Arc<MessageCatalog> {
        &self.catalog
    }

    pub fn sanitizer(&self) -> &Sanitizer {
        &self.sanitizer
    }

    /// Validates `input` at the configured level. The input is never modified.
    pub fn validate(&self, input: &Value) -> Result<ValidationResult, SecurityViolation> {
        self.validate_with_level(input, self.level)
    }

    /// Validates `input` at an explicit level.
    pub fn validate_with_level(
        &self,
        input: &Value,
        level: ValidationLevel,
    ) -> Result<ValidationResult, SecurityViolation> {
        let input_digest = document::digest(input);
        debug!(
            "Validating document {} at level {} ({} string field(s)).",
            &input_digest[..12],
            level,
            document::count_string_leaves(input)
        );

        let mut working = input.clone();
        let mut diagnostics: Vec<Located> = Vec::new();

        self.check_required(&working, &mut diagnostics);
        debug!("Required-field phase produced {} diagnostic(s).", diagnostics.len());

        self.normalize_node(&mut working, &FieldPath::root(), FieldKind::Generic, &mut diagnostics);
        debug!("Normalization phase finished with {} diagnostic(s) in total.", diagnostics.len());

        let classified = level::classify(level, &self.policy, diagnostics);
        for correction in &classified.corrections {
            apply_correction(&mut working, &correction.path, &correction.value);
        }

        let sanitized = self.sanitize_node(&mut working, &FieldPath::root())?;
        debug!("Sanitized {} string field(s).", sanitized);

        let counts = classified.counts();
        let is_valid = level::is_valid(level, counts.errors, counts.warnings);
        debug!(
            "Document {} is {}: {} error(s), {} warning(s), {} info.",
            &input_digest[..12],
            if is_valid { "valid" } else { "invalid" },
            counts.errors,
            counts.warnings,
            counts.info
        );

        Ok(ValidationResult {
            is_valid,
            errors: classified.errors,
            warnings: classified.warnings,
            info: classified.info,
            normalized_data: working,
            metadata: ResultMetadata { level, counts, input_digest },
        })
    }

    fn check_required(&self, doc: &Value, out: &mut Vec<Located>) {
        let mut reported: Vec<FieldPath> = Vec::new();

        for path in &self.required {
            if path.ancestors().any(|a| reported.contains(&a)) {
                continue;
            }
            let field = path.to_string();
            match path.lookup(doc) {
                Some(value) if is_empty_value(value) => {
                    let d = self.catalog.diagnostic(ErrorCode::RequiredFieldEmpty, &field, Some(value));
                    out.push((path.clone(), d));
                    reported.push(path.clone());
                }
                Some(_) => {}
                None => {
                    // A scalar where a section was expected is a shape problem of the parent.
                    let blocking = path.ancestors().find(|a| {
                        matches!(a.lookup(doc), Some(v) if !v.is_object() && !v.is_array() && !v.is_null())
                    });
                    match blocking {
                        Some(parent) => {
                            let parent_field = parent.to_string();
                            let value = parent.lookup(doc);
                            let d = self.catalog.diagnostic(ErrorCode::InvalidType, &parent_field, value);
                            out.push((parent.clone(), d));
                            reported.push(parent);
                        }
                        None => {
                            let d = self.catalog.diagnostic(ErrorCode::RequiredFieldMissing, &field, None);
                            out.push((path.clone(), d));
                            reported.push(path.clone());
                        }
                    }
                }
            }
        }
    }

    fn normalize_node(&self, node: &mut Value, path: &FieldPath, kind: FieldKind, out: &mut Vec<Located>) {
        if let Some(normalizer) = kind.normalizer() {
            self.normalize_typed(normalizer, node, path, false, out);
            return;
        }

        match node {
            Value::Object(map) => {
                for (key, child) in map.iter_mut() {
                    let child_kind = self.kinds.kind_for(key);
                    self.normalize_node(child, &path.key(key), child_kind, out);
                }
                self.check_date_order(map, path, out);
            }
            Value::Array(items) => {
                for (i, item) in items.iter_mut().enumerate() {
                    self.normalize_node(item, &path.index(i), kind, out);
                }
            }
            _ => {}
        }
    }

    /// A node under a typed key: a scalar, a structured date, or one flat list of those.
    fn normalize_typed(
        &self,
        normalizer: &dyn Normalizer,
        node: &mut Value,
        path: &FieldPath,
        in_list: bool,
        out: &mut Vec<Located>,
    ) {
        let structured_date = normalizer.kind() == FieldKind::Date && node.is_object();
        if structured_date || is_scalar(node) {
            self.normalize_leaf(normalizer, node, path, out);
            return;
        }
        if is_empty_value(node) {
            return;
        }
        match node {
            Value::Array(items) if !in_list => {
                for (i, item) in items.iter_mut().enumerate() {
                    self.normalize_typed(normalizer, item, &path.index(i), true, out);
                }
            }
            _ => {
                let field = path.to_string();
                debug!("Container found where a {} value belongs at '{}'.", normalizer.kind(), field);
                let d = self.catalog.diagnostic(ErrorCode::InvalidType, &field, Some(&*node));
                out.push((path.clone(), d));
            }
        }
    }

    fn normalize_leaf(
        &self,
        normalizer: &dyn Normalizer,
        node: &mut Value,
        path: &FieldPath,
        out: &mut Vec<Located>,
    ) {
        // Presence is the required-field check's concern.
        if is_empty_value(node) {
            return;
        }
        let field = path.to_string();
        let ctx = NormalizeContext::new(&field, &self.catalog);
        let normalized = normalizer.normalize(node, &ctx);

        if let Some(canonical) = normalized.canonical {
            if node.as_str() != Some(canonical.as_str()) {
                debug!(
                    "Normalized {} field '{}': {} -> {}",
                    normalizer.kind(),
                    field,
                    document::loggable(&node.to_string()),
                    document::loggable(&canonical)
                );
                *node = Value::String(canonical);
            }
        }
        out.extend(normalized.diagnostics.into_iter().map(|d| (path.clone(), d)));
    }

    fn check_date_order(&self, map: &Map<String, Value>, path: &FieldPath, out: &mut Vec<Located>) {
        if self.kinds.kind_for(START_DATE_KEY) != FieldKind::Date
            || self.kinds.kind_for(END_DATE_KEY) != FieldKind::Date
        {
            return;
        }
        let parsed = |key: &str| map.get(key).and_then(Value::as_str).and_then(|s| parse_date_str(s).ok());
        let (Some(start), Some(end)) = (parsed(START_DATE_KEY), parsed(END_DATE_KEY)) else {
            return;
        };
        if end != PartialDate::Present && end.compare(&start) == Ordering::Less {
            let end_path = path.key(END_DATE_KEY);
            let field = end_path.to_string();
            let d = self.catalog.diagnostic(ErrorCode::DateRangeInverted, &field, map.get(END_DATE_KEY));
            out.push((end_path, d));
        }
    }

    /// Sanitizes every string leaf in place. Returns how many were visited.
    fn sanitize_node(&self, node: &mut Value, path: &FieldPath) -> Result<usize, SecurityViolation> {
        match node {
            Value::String(text) => {
                let clean = self
                    .sanitizer
                    .sanitize(text, self.allow_basic_formatting)
                    .map_err(|violation| self.locate(violation, path))?;
                *text = clean;
                Ok(1)
            }
            Value::Array(items) => {
                let mut total = 0;
                for (i, item) in items.iter_mut().enumerate() {
                    total += self.sanitize_node(item, &path.index(i))?;
                }
                Ok(total)
            }
            Value::Object(map) => {
                let mut total = 0;
                for (key, child) in map.iter_mut() {
                    total += self.sanitize_node(child, &path.key(key))?;
                }
                Ok(total)
            }
            _ => Ok(0),
        }
    }

    fn locate(&self, violation: SecurityViolation, path: &FieldPath) -> SecurityViolation {
        let field = path.to_string();
        warn!(
            "Security violation {} in field '{}' (rule '{}'); rejecting document.",
            violation.code, field, violation.pattern
        );
        let (message, _) = self.catalog.render(violation.code, &field, None);
        SecurityViolation { message, ..violation.at(field) }
    }
}

fn is_scalar(value: &Value) -> bool {
    matches!(value, Value::String(_) | Value::Number(_) | Value::Bool(_))
}

fn apply_correction(working: &mut Value, path: &FieldPath, value: &Value) {
    match path.lookup_mut(working) {
        Some(slot) => {
            debug!("Applied permissive correction at '{}'.", path);
            *slot = value.clone();
        }
        None => warn!("Could not apply correction at '{}': path not found.", path),
    }
}
