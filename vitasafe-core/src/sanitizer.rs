// vitasafe-core/src/sanitizer.rs
//! LaTeX injection sanitizer.
//!
//! Every string that reaches the typesetting engine goes through [`Sanitizer::sanitize`],
//! which runs three steps in a fixed order:
//!
//! 1. **Reject gate.** The raw text is matched against the blacklist of dangerous
//!    control sequences (file access, shell execution, definitions, parser-state
//!    changes, expansion primitives). Any match rejects the whole string with a
//!    [`SecurityViolation`]; no partially cleaned text is ever returned, so a command
//!    cannot be rebuilt from fragments left over after stripping.
//! 2. **Escape pass.** Each reserved character is replaced with its literal-producing
//!    sequence in a single left-to-right pass, so produced escapes are never
//!    re-escaped.
//! 3. **Allowlist restore.** Optional. A fixed set of one-argument formatting wrappers
//!    (`\textbf`, `\textit`, `\emph`, `\underline`) is re-expanded, matched against the
//!    already escaped text. The argument may hold only plain characters and the simple
//!    single-character escapes, so nothing else can be smuggled through.
//!
//! The built-in blacklist is fixed. Callers may add patterns; they cannot remove any.
//!
//! License: MIT OR APACHE 2.0

use log::{debug, warn};
use once_cell::sync::Lazy;
use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::diagnostics::ErrorCode;
use crate::errors::{SecurityViolation, VitasafeError};

/// Maximum allowed length for a caller-supplied blacklist pattern.
pub const MAX_PATTERN_LENGTH: usize = 500;

/// Compiled size cap for caller-supplied patterns.
const REGEX_SIZE_LIMIT: usize = 10 * (1 << 20);

/// A named blacklist entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub struct BlacklistRule {
    pub name: String,
    /// Must be one of the `SEC###` codes.
    pub code: ErrorCode,
    pub pattern: String,
}

#[derive(Debug)]
pub struct CompiledRule {
    pub regex: Regex,
    pub name: String,
    pub code: ErrorCode,
}

#[derive(Debug, Default)]
pub struct CompiledBlacklist {
    pub rules: Vec<CompiledRule>,
}

impl CompiledBlacklist {
    /// First rule matching `text`, in rule order.
    pub fn first_match(&self, text: &str) -> Option<&CompiledRule> {
        self.rules.iter().find(|rule| rule.regex.is_match(text))
    }
}

/// Builds a pattern matching any of `words` as a complete TeX control word.
fn control_words(words: &[&str]) -> String {
    format!(r"\\(?:{})(?:[^A-Za-z]|$)", words.join("|"))
}

fn builtin_rules() -> Vec<BlacklistRule> {
    let rule = |name: &str, code: ErrorCode, pattern: String| BlacklistRule {
        name: name.to_string(),
        code,
        pattern,
    };

    // Order matters: the first match names the violation, so `\write18` must be
    // seen as shell execution before `\write` is seen as file access.
    vec![
        rule(
            "shell_escape",
            ErrorCode::ShellExecution,
            control_words(&[
                "write18",
                "immediate",
                "ShellEscape",
                "directlua",
                "luaexec",
                "latelua",
                "pdfshellescape",
                "shellescape",
            ]),
        ),
        rule(
            "pipe_input",
            ErrorCode::ShellExecution,
            r#"\\(?:input|openin|openout|include)\s*\{?\s*["']?\|"#.to_string(),
        ),
        rule(
            "file_access",
            ErrorCode::FileAccess,
            control_words(&[
                "input",
                "include",
                "InputIfFileExists",
                "openin",
                "openout",
                "read",
                "readline",
                "write",
                "closein",
                "closeout",
                "verbatiminput",
                "lstinputlisting",
                "includegraphics",
                "includeonly",
            ]),
        ),
        rule(
            "macro_definition",
            ErrorCode::MacroDefinition,
            control_words(&[
                "def",
                "edef",
                "gdef",
                "xdef",
                "let",
                "futurelet",
                "newcommand",
                "renewcommand",
                "providecommand",
                "DeclareRobustCommand",
                "newenvironment",
                "renewenvironment",
                "usepackage",
                "RequirePackage",
                "documentclass",
            ]),
        ),
        rule(
            "parser_state",
            ErrorCode::ParserStateMutation,
            control_words(&[
                "catcode",
                "makeatletter",
                "makeatother",
                "uccode",
                "lccode",
                "endlinechar",
                "escapechar",
                "newlinechar",
            ]),
        ),
        rule(
            "expansion_primitive",
            ErrorCode::ExpansionPrimitive,
            control_words(&[
                "csname",
                "endcsname",
                "expandafter",
                "noexpand",
                "scantokens",
                "detokenize",
                "string",
                "uppercase",
                "lowercase",
                "romannumeral",
                "special",
            ]),
        ),
        rule("hex_char_notation", ErrorCode::ExpansionPrimitive, r"\^\^".to_string()),
    ]
}

/// Compiles blacklist rules, collecting every failure into one error.
pub fn compile_rules(rules: Vec<BlacklistRule>) -> Result<CompiledBlacklist, VitasafeError> {
    debug!("Starting compilation of {} blacklist rules.", rules.len());

    let mut compiled = Vec::new();
    let mut errors = Vec::new();

    for rule in rules {
        if !rule.code.is_security() {
            errors.push(VitasafeError::InvalidConfig(format!(
                "blacklist rule '{}' must use a SEC code, not {}",
                rule.name, rule.code
            )));
            continue;
        }
        if rule.pattern.len() > MAX_PATTERN_LENGTH {
            errors.push(VitasafeError::PatternLengthExceeded(
                rule.name,
                rule.pattern.len(),
                MAX_PATTERN_LENGTH,
            ));
            continue;
        }
        match RegexBuilder::new(&rule.pattern).size_limit(REGEX_SIZE_LIMIT).build() {
            Ok(regex) => {
                debug!("Blacklist rule '{}' compiled successfully.", rule.name);
                compiled.push(CompiledRule { regex, name: rule.name, code: rule.code });
            }
            Err(e) => errors.push(VitasafeError::PatternCompilationError(rule.name, e)),
        }
    }

    if errors.is_empty() {
        Ok(CompiledBlacklist { rules: compiled })
    } else {
        let message = errors.iter().map(|e| e.to_string()).collect::<Vec<_>>().join("\n");
        Err(VitasafeError::InvalidConfig(format!(
            "failed to compile {} blacklist rule(s):\n{}",
            errors.len(),
            message
        )))
    }
}

static BUILTIN_BLACKLIST: Lazy<CompiledBlacklist> = Lazy::new(|| {
    compile_rules(builtin_rules()).expect("built-in blacklist patterns are valid")
});

static ALLOWED_WRAPPER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"\\textbackslash\{\}(textbf|textit|emph|underline)\\\{((?:[^\\{}]|\\[&%$#_])*)\\\}",
    )
    .expect("allowlist pattern is valid")
});

/// Literal-producing replacement for a reserved character, if it is one.
pub fn escape_for(c: char) -> Option<&'static str> {
    match c {
        '\\' => Some(r"\textbackslash{}"),
        '&' => Some(r"\&"),
        '%' => Some(r"\%"),
        '$' => Some(r"\$"),
        '#' => Some(r"\#"),
        '_' => Some(r"\_"),
        '{' => Some(r"\{"),
        '}' => Some(r"\}"),
        '~' => Some(r"\textasciitilde{}"),
        '^' => Some(r"\textasciicircum{}"),
        _ => None,
    }
}

/// Escapes every reserved character in one pass.
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + text.len() / 4);
    for c in text.chars() {
        match escape_for(c) {
            Some(seq) => out.push_str(seq),
            None => out.push(c),
        }
    }
    out
}

fn restore_allowed_wrappers(escaped: &str) -> String {
    ALLOWED_WRAPPER
        .replace_all(escaped, |caps: &regex::Captures<'_>| {
            format!("\\{}{{{}}}", &caps[1], &caps[2])
        })
        .into_owned()
}

/// The sanitizer. Cheap to clone; extra rules are shared.
#[derive(Debug, Clone, Default)]
pub struct Sanitizer {
    extra: Option<Arc<CompiledBlacklist>>,
}

impl Sanitizer {
    /// A sanitizer using only the built-in blacklist.
    pub fn new() -> Self {
        Self::default()
    }

    /// A sanitizer that also rejects text matching `extra` rules.
    pub fn with_extra_rules(extra: Vec<BlacklistRule>) -> Result<Self, VitasafeError> {
        if extra.is_empty() {
            return Ok(Self::new());
        }
        let compiled = compile_rules(extra)?;
        Ok(Self { extra: Some(Arc::new(compiled)) })
    }

    /// Checks `text` against the blacklist without transforming it.
    pub fn check(&self, text: &str) -> Result<(), SecurityViolation> {
        let hit = BUILTIN_BLACKLIST.first_match(text).or_else(|| {
            self.extra.as_ref().and_then(|extra| extra.first_match(text))
        });

        match hit {
            Some(rule) => {
                warn!("Rejected text matching blacklist rule '{}' ({}).", rule.name, rule.code);
                Err(SecurityViolation {
                    field_path: String::new(),
                    code: rule.code,
                    pattern: rule.name.clone(),
                    message: format!("dangerous construct matched rule '{}'", rule.name),
                })
            }
            None => Ok(()),
        }
    }

    /// Reject, escape, then optionally restore basic formatting.
    pub fn sanitize(&self, text: &str, allow_basic_formatting: bool) -> Result<String, SecurityViolation> {
        self.check(text)?;
        let escaped = escape(text);
        if allow_basic_formatting {
            Ok(restore_allowed_wrappers(&escaped))
        } else {
            Ok(escaped)
        }
    }

    /// Names of all active rules, built-in first.
    pub fn rule_names(&self) -> Vec<String> {
        let extra = self.extra.as_ref().map(|e| e.rules.as_slice()).unwrap_or(&[]);
        BUILTIN_BLACKLIST
            .rules
            .iter()
            .chain(extra.iter())
            .map(|r| r.name.clone())
            .collect()
    }
}

/// Sanitizes with the built-in blacklist only.
pub fn sanitize(text: &str, allow_basic_formatting: bool) -> Result<String, SecurityViolation> {
    Sanitizer::new().sanitize(text, allow_basic_formatting)
}
