// vitasafe/src/commands/mod.rs
//! Subcommand implementations.

pub mod codes;
pub mod sanitize;
pub mod validate;

/// How a command ended, mapped to the process exit code by `main`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Valid document or successful command.
    Success,
    /// The document failed validation.
    Invalid,
    /// A dangerous LaTeX construct was rejected.
    SecurityRejected,
}

impl Outcome {
    pub fn exit_code(&self) -> i32 {
        match self {
            Outcome::Success => 0,
            Outcome::Invalid => 1,
            Outcome::SecurityRejected => 2,
        }
    }
}
