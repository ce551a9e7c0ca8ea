//! Configuration management.
//!
//! This module resolves the configuration file location and loads it.
//!
//! Resolution order for the file:
//! 1. explicit path (`--config` / `TIMELINE_CONFIG`)
//! 2. `~/.issue-timeline/config.json`
//!
//! Connection settings can then be overridden from the environment
//! (`TRACKER_URL`, `TRACKER_USERNAME`, `TRACKER_TOKEN`,
//! `TIMELINE_MAX_RESULTS`), so secrets need not live in the file.

mod settings;

pub use settings::{ConnectionSettings, QuerySettings, TimelineConfig};

use crate::error::{Error, Result};

use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Get the global configuration directory location (`~/.issue-timeline/`).
#[must_use]
pub fn global_config_dir() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|b| b.home_dir().join(".issue-timeline"))
}

/// Resolve the configuration file path.
///
/// Returns the explicit path if given, otherwise the global location.
#[must_use]
pub fn resolve_config_path(explicit_path: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit_path {
        return Some(path.to_path_buf());
    }

    global_config_dir().map(|dir| dir.join("config.json"))
}

/// Load configuration and apply environment overrides.
///
/// A missing default file yields the default configuration; a missing
/// explicit file is an error.
///
/// # Errors
///
/// Returns [`Error::Config`] if the file cannot be read or parsed.
pub fn load_config(explicit_path: Option<&Path>) -> Result<TimelineConfig> {
    let mut config = match resolve_config_path(explicit_path) {
        Some(path) if path.exists() => read_config(&path)?,
        Some(path) if explicit_path.is_some() => {
            return Err(Error::Config(format!(
                "Config file not found: {}",
                path.display()
            )));
        }
        _ => {
            debug!("No config file found, using defaults");
            TimelineConfig::default()
        }
    };

    config.apply_overrides(|key| std::env::var(key).ok())?;
    Ok(config)
}

/// Read and parse one configuration file.
///
/// # Errors
///
/// Returns [`Error::Config`] if the file cannot be read or parsed.
pub fn read_config(path: &Path) -> Result<TimelineConfig> {
    debug!(path = %path.display(), "Loading config");

    let content = fs::read_to_string(path)
        .map_err(|e| Error::Config(format!("Failed to read config file: {e}")))?;

    serde_json::from_str(&content)
        .map_err(|e| Error::Config(format!("Failed to parse config file: {e}")))
}
