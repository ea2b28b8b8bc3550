// vitasafe/src/utils/config_path.rs
//! Locating and loading the validator configuration.

use anyhow::Result;
use log::{debug, info};
use std::path::{Path, PathBuf};

use vitasafe_core::{merge_config, ValidatorConfig};

const APP_DIR: &str = "vitasafe";
const CONFIG_FILE: &str = "config.yaml";

/// `<config_dir>/vitasafe/config.yaml`, if the platform has a config directory.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(APP_DIR).join(CONFIG_FILE))
}

/// The config file to use: the explicit path (flag or `VITASAFE_CONFIG`), else the
/// per-user file when it exists.
pub fn discover_config_path(explicit: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit {
        debug!("Using explicit config path {}.", path.display());
        return Some(path.to_path_buf());
    }
    default_config_path().filter(|path| {
        let exists = path.is_file();
        debug!("Default config {} {}.", path.display(), if exists { "found" } else { "not present" });
        exists
    })
}

/// Built-in defaults merged with the discovered config file, if any.
pub fn load_config(explicit: Option<&Path>) -> Result<ValidatorConfig> {
    let user = match discover_config_path(explicit) {
        Some(path) => Some(ValidatorConfig::load_from_file(&path)?),
        None => {
            info!("No config file found; using built-in defaults.");
            None
        }
    };
    Ok(merge_config(ValidatorConfig::default(), user))
}
