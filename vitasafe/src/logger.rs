// vitasafe/src/logger.rs
//! Logging setup for the CLI. Logs go to stderr so stdout stays clean for output.

use env_logger::{Builder, Env};
use log::LevelFilter;

/// Initializes `env_logger`.
///
/// With `level` set, that level applies to the vitasafe crates and overrides
/// `RUST_LOG` for them. Otherwise `RUST_LOG` decides, defaulting to `warn`.
/// Calling this more than once is harmless.
pub fn init_logger(level: Option<LevelFilter>) {
    let mut builder = Builder::from_env(Env::default().default_filter_or("warn"));
    if let Some(level) = level {
        builder.filter_module("vitasafe", level);
        builder.filter_module("vitasafe_core", level);
    }
    builder.format_timestamp(None).format_target(true);
    let _ = builder.try_init();
}

/// Level implied by the `--quiet` and `--debug` flags. `--quiet` wins.
pub fn level_for_flags(quiet: bool, debug: bool) -> Option<LevelFilter> {
    match (quiet, debug) {
        (true, _) => Some(LevelFilter::Off),
        (false, true) => Some(LevelFilter::Debug),
        (false, false) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quiet_beats_debug() {
        assert_eq!(level_for_flags(true, true), Some(LevelFilter::Off));
        assert_eq!(level_for_flags(false, true), Some(LevelFilter::Debug));
        assert_eq!(level_for_flags(false, false), None);
    }
}
