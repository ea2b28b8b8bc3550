// vitasafe/src/cli.rs
//! Command-line interface definition for the `vitasafe` binary.
//! License: MIT OR APACHE 2.0

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use vitasafe_core::{DocumentKind, ValidationLevel};

/// Top-level CLI definition.
#[derive(Parser, Debug)]
#[command(
    name = "vitasafe",
    version = env!("CARGO_PKG_VERSION"),
    about = "Validate, normalize and LaTeX-sanitize resume data",
    long_about = "Vitasafe checks resume and cover-letter JSON before it is typeset. It reports every structural and format problem in one pass, rewrites dates, phone numbers, URLs and emails into canonical form, and rejects any field carrying a dangerous LaTeX construct.",
    arg_required_else_help = true
)]
pub struct Cli {
    /// Suppress informational messages and logging.
    #[arg(long, short = 'q', global = true, help = "Suppress all informational and debug messages.")]
    pub quiet: bool,

    /// Enable debug logging.
    #[arg(long, short = 'd', global = true, help = "Enable debug logging.")]
    pub debug: bool,

    /// Custom YAML theme file.
    #[arg(long = "theme", value_name = "FILE", global = true, help = "Specify the path to a custom YAML theme file.")]
    pub theme: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Validates and normalizes a JSON document.
    #[command(about = "Validate and normalize a resume or cover-letter JSON document.")]
    Validate(ValidateCommand),

    /// Sanitizes raw text for LaTeX.
    #[command(about = "Sanitize raw text for safe use in a LaTeX template.")]
    Sanitize(SanitizeCommand),

    /// Lists every diagnostic code.
    #[command(about = "List the diagnostic code registry.")]
    Codes(CodesCommand),
}

/// Strictness levels as accepted on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LevelArg {
    Strict,
    Lenient,
    Permissive,
}

impl From<LevelArg> for ValidationLevel {
    fn from(arg: LevelArg) -> Self {
        match arg {
            LevelArg::Strict => ValidationLevel::Strict,
            LevelArg::Lenient => ValidationLevel::Lenient,
            LevelArg::Permissive => ValidationLevel::Permissive,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum DocumentArg {
    Resume,
    #[value(name = "cover_letter", alias = "cover-letter")]
    CoverLetter,
}

impl From<DocumentArg> for DocumentKind {
    fn from(arg: DocumentArg) -> Self {
        match arg {
            DocumentArg::Resume => DocumentKind::Resume,
            DocumentArg::CoverLetter => DocumentKind::CoverLetter,
        }
    }
}

/// Arguments for the `validate` command.
#[derive(Parser, Debug)]
pub struct ValidateCommand {
    /// Path to an input file (reads from stdin if not provided).
    #[arg(long, short = 'i', value_name = "FILE", help = "Read the JSON document from a file instead of stdin.")]
    pub input_file: Option<PathBuf>,

    /// Overrides the configured level.
    #[arg(long, short = 'l', value_enum, help = "Strictness level (overrides the config file).")]
    pub level: Option<LevelArg>,

    /// Path to a validator configuration file (YAML).
    #[arg(
        long = "config",
        value_name = "FILE",
        env = "VITASAFE_CONFIG",
        help = "Path to a validator configuration file (YAML)."
    )]
    pub config: Option<PathBuf>,

    /// Overrides the configured document profile.
    #[arg(long = "document", value_enum, help = "Document profile that selects the required fields.")]
    pub document: Option<DocumentArg>,

    /// Print the full result as JSON.
    #[arg(long, help = "Print the full validation result as JSON on stdout.")]
    pub json: bool,

    /// Where to write the normalized document.
    #[arg(long, short = 'o', value_name = "FILE", help = "Write the normalized document to a file when it is valid.")]
    pub output: Option<PathBuf>,
}

/// Arguments for the `codes` command.
#[derive(Parser, Debug)]
pub struct CodesCommand {
    /// Config whose downgrade table fills the `Permissive` column.
    #[arg(
        long = "config",
        value_name = "FILE",
        env = "VITASAFE_CONFIG",
        help = "Path to a validator configuration file (YAML)."
    )]
    pub config: Option<PathBuf>,
}

/// Arguments for the `sanitize` command.
#[derive(Parser, Debug)]
pub struct SanitizeCommand {
    /// Path to an input file (reads from stdin if not provided).
    #[arg(long, short = 'i', value_name = "FILE", help = "Read input from a specified file instead of stdin.")]
    pub input_file: Option<PathBuf>,

    /// Escape everything, including basic formatting commands.
    #[arg(long = "no-formatting", help = "Do not restore \\textbf, \\textit, \\emph and \\underline.")]
    pub no_formatting: bool,
}
