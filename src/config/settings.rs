//! Configuration file structure.
//!
//! Stored at `~/.issue-timeline/config.json` unless another path is given.

use serde::{de, Deserialize, Deserializer};
use serde_json::Value;
use std::collections::BTreeMap;

use crate::error::{Error, Result};
use crate::query::KnownValues;

/// Full configuration file.
#[derive(Debug, Clone, Deserialize)]
pub struct TimelineConfig {
    #[serde(default)]
    pub connection: ConnectionSettings,

    #[serde(default)]
    pub query: QuerySettings,

    /// Changelog field names tracked by `timeline changes` when no `--field`
    /// is given.
    #[serde(default = "default_tracked_fields")]
    pub tracked_fields: Vec<String>,
}

impl Default for TimelineConfig {
    fn default() -> Self {
        Self {
            connection: ConnectionSettings::default(),
            query: QuerySettings::default(),
            tracked_fields: default_tracked_fields(),
        }
    }
}

fn default_tracked_fields() -> Vec<String> {
    vec!["status".to_string()]
}

/// Tracker connection.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ConnectionSettings {
    /// Base URL, e.g. `https://tracker.example.com`.
    pub url: Option<String>,

    /// Username for basic auth. Without it the token is sent as a bearer token.
    pub username: Option<String>,

    /// API token or password.
    pub token: Option<String>,
}

/// Settings consumed by [`crate::query::QueryManager`].
#[derive(Debug, Clone, Default, Deserialize)]
pub struct QuerySettings {
    /// Attribute name → tracker field display name.
    #[serde(default)]
    pub attributes: BTreeMap<String, String>,

    /// Attribute name → canonical values in priority order.
    #[serde(default)]
    pub known_values: KnownValues,

    /// Cap on issues fetched per query; `None` means unlimited.
    #[serde(default, deserialize_with = "deserialize_max_results")]
    pub max_results: Option<usize>,
}

impl TimelineConfig {
    /// Apply environment-style overrides.
    ///
    /// `lookup` is queried for `TRACKER_URL`, `TRACKER_USERNAME`,
    /// `TRACKER_TOKEN` and `TIMELINE_MAX_RESULTS`; empty values are ignored.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if `TIMELINE_MAX_RESULTS` is not an integer.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(url) = get("TRACKER_URL") {
            self.connection.url = Some(url);
        }
        if let Some(username) = get("TRACKER_USERNAME") {
            self.connection.username = Some(username);
        }
        if let Some(token) = get("TRACKER_TOKEN") {
            self.connection.token = Some(token);
        }
        if let Some(raw) = get("TIMELINE_MAX_RESULTS") {
            let cap: usize = raw.trim().parse().map_err(|e| {
                Error::Config(format!("TIMELINE_MAX_RESULTS must be an integer, got `{raw}`: {e}"))
            })?;
            self.query.max_results = (cap > 0).then_some(cap);
        }

        Ok(())
    }
}

/// `max_results` accepts a positive integer, or any falsy value for unlimited.
fn deserialize_max_results<'de, D>(deserializer: D) -> std::result::Result<Option<usize>, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::Null | Value::Bool(false) => Ok(None),
        Value::Number(n) => match n.as_u64() {
            Some(0) => Ok(None),
            Some(cap) => usize::try_from(cap).map(Some).map_err(de::Error::custom),
            None => Err(de::Error::custom(format!(
                "max_results must be a non-negative integer, got {n}"
            ))),
        },
        other => Err(de::Error::custom(format!(
            "max_results must be an integer or false, got {other}"
        ))),
    }
}
