// vitasafe/src/lib.rs
//! # Vitasafe CLI
//!
//! Command-line front end for `vitasafe-core`: validates resume and cover-letter
//! JSON, sanitizes raw text for LaTeX, and lists the diagnostic code registry.

pub mod cli;
pub mod commands;
pub mod logger;
pub mod ui;
pub mod utils;

pub use commands::Outcome;
