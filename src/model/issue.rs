//! Issue model.
//!
//! Issues are read-only records handed over by an issue source, deserialized
//! from the tracker's JSON shape:
//!
//! ```json
//! {
//!   "key": "ISSUE-1",
//!   "fields": { "created": "2020-01-01T00:00:00.000+0000", "status": {"name": "Done"} },
//!   "changelog": {
//!     "histories": [
//!       { "created": "2020-01-02T00:00:00.000+0000",
//!         "items": [ {"field": "status", "fromString": "To Do", "toString": "In Progress"} ] }
//!     ]
//!   }
//! }
//! ```
//!
//! Timestamps are parsed to UTC at load time. An issue without a usable
//! `created` timestamp fails to load. Changelog damage only costs the damaged
//! part: a history with a missing or malformed timestamp, or an item without a
//! `field`, is dropped with a warning, and replay falls back to the field's
//! current value where no usable item remains.

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value};
use std::collections::HashMap;
use tracing::warn;

use crate::error::{Error, Result};

use super::value::FieldValue;

/// An issue with its current field values and changelog.
#[derive(Debug, Clone, Deserialize)]
#[serde(try_from = "RawIssue")]
pub struct Issue {
    /// Issue key, e.g. `ISSUE-1`.
    pub key: String,

    /// Creation time.
    pub created: DateTime<Utc>,

    /// Current values keyed by field id. Unset fields are absent.
    pub fields: HashMap<String, FieldValue>,

    pub changelog: Changelog,
}

impl Issue {
    /// Create an issue with no field values and an empty changelog.
    pub fn new(key: impl Into<String>, created: DateTime<Utc>) -> Self {
        Self {
            key: key.into(),
            created,
            fields: HashMap::new(),
            changelog: Changelog::default(),
        }
    }

    /// Set the current value of a field.
    #[must_use]
    pub fn with_field(mut self, field_id: impl Into<String>, value: FieldValue) -> Self {
        self.fields.insert(field_id.into(), value);
        self
    }

    /// Append a history entry to the changelog.
    #[must_use]
    pub fn with_history(mut self, history: History) -> Self {
        self.changelog.histories.push(history);
        self
    }

    /// Current raw value of a field, if set.
    #[must_use]
    pub fn field(&self, field_id: &str) -> Option<&FieldValue> {
        self.fields.get(field_id)
    }
}

/// The issue shape as it arrives on the wire.
#[derive(Deserialize)]
struct RawIssue {
    key: String,
    #[serde(default)]
    fields: Map<String, Value>,
    #[serde(default)]
    changelog: Option<Value>,
}

/// Changelog shape before histories are validated.
#[derive(Deserialize)]
struct RawChangelog {
    #[serde(default)]
    histories: Vec<Value>,
}

#[derive(Deserialize)]
struct RawHistory {
    #[serde(default)]
    created: Option<String>,
    #[serde(default)]
    items: Vec<Value>,
}

impl TryFrom<RawIssue> for Issue {
    type Error = Error;

    fn try_from(raw: RawIssue) -> Result<Self> {
        let created = match raw.fields.get("created") {
            Some(Value::String(s)) => parse_timestamp(s)?,
            _ => {
                return Err(Error::InvalidTimestamp {
                    value: String::new(),
                    reason: format!("issue {} has no `created` field", raw.key),
                });
            }
        };

        let fields = raw
            .fields
            .into_iter()
            .filter_map(|(id, value)| FieldValue::from_json(value).map(|v| (id, v)))
            .collect();

        let changelog = raw
            .changelog
            .map(|value| Changelog::from_json(&raw.key, value))
            .unwrap_or_default();

        Ok(Self {
            key: raw.key,
            created,
            fields,
            changelog,
        })
    }
}

/// Load issues from their JSON values, skipping the ones that fail to load.
pub fn load_issues(values: Vec<Value>) -> Vec<Issue> {
    values
        .into_iter()
        .filter_map(|value| {
            let key = value
                .get("key")
                .and_then(Value::as_str)
                .unwrap_or("<no key>")
                .to_string();
            serde_json::from_value::<Issue>(value)
                .inspect_err(|e| warn!(issue = %key, error = %e, "Skipping issue that failed to load"))
                .ok()
        })
        .collect()
}

/// Serde adapter for issue lists, see [`load_issues`].
///
/// # Errors
///
/// Fails only if the input is not a JSON array.
pub fn deserialize_issues<'de, D>(deserializer: D) -> std::result::Result<Vec<Issue>, D::Error>
where
    D: Deserializer<'de>,
{
    Vec::<Value>::deserialize(deserializer).map(load_issues)
}

/// Ordered audit log of field-level edits, oldest first.
#[derive(Debug, Clone, Default)]
pub struct Changelog {
    pub histories: Vec<History>,
}

impl Changelog {
    /// Build a changelog from its JSON form, dropping unusable histories and
    /// items.
    fn from_json(issue: &str, value: Value) -> Self {
        let raw: RawChangelog = match serde_json::from_value(value) {
            Ok(raw) => raw,
            Err(e) => {
                warn!(issue, error = %e, "Ignoring malformed changelog");
                return Self::default();
            }
        };

        let histories = raw
            .histories
            .into_iter()
            .filter_map(|value| History::from_json(issue, value))
            .collect();

        Self { histories }
    }

    /// All delta items across all histories, in changelog order.
    pub fn items(&self) -> impl Iterator<Item = &ChangeItem> {
        self.histories.iter().flat_map(|h| h.items.iter())
    }
}

/// One changelog entry: a timestamp and the fields edited at that time.
#[derive(Debug, Clone)]
pub struct History {
    pub created: DateTime<Utc>,
    pub items: Vec<ChangeItem>,
}

impl History {
    pub fn new(created: DateTime<Utc>, items: Vec<ChangeItem>) -> Self {
        Self { created, items }
    }

    fn from_json(issue: &str, value: Value) -> Option<Self> {
        let raw: RawHistory = serde_json::from_value(value)
            .inspect_err(|e| warn!(issue, error = %e, "Dropping malformed changelog history"))
            .ok()?;

        let Some(stamp) = raw.created else {
            warn!(issue, "Dropping changelog history without `created`");
            return None;
        };
        let created = parse_timestamp(&stamp)
            .inspect_err(|e| warn!(issue, error = %e, "Dropping changelog history"))
            .ok()?;

        let items = raw
            .items
            .into_iter()
            .filter_map(|item| {
                serde_json::from_value::<ChangeItem>(item)
                    .inspect_err(|e| warn!(issue, error = %e, "Dropping malformed changelog item"))
                    .ok()
            })
            .collect();

        Some(Self { created, items })
    }
}

/// A single field edit.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ChangeItem {
    /// Field name as the changelog reports it (e.g. `status`, `Flagged`).
    pub field: String,

    #[serde(rename = "fromString", default)]
    pub from_string: Option<String>,

    #[serde(rename = "toString", default)]
    pub to_string: Option<String>,
}

impl ChangeItem {
    pub fn new(field: impl Into<String>, from: Option<&str>, to: Option<&str>) -> Self {
        Self {
            field: field.into(),
            from_string: from.map(str::to_string),
            to_string: to.map(str::to_string),
        }
    }
}

const OFFSET_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f%z", "%Y-%m-%d %H:%M:%S%.f%z"];
const NAIVE_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

/// Parse a tracker timestamp and normalize it to UTC.
///
/// Accepts RFC 3339, the tracker's `2020-01-01T00:00:00.000+0000` form, and
/// naive date-times or dates, which are taken as UTC.
///
/// # Errors
///
/// Returns [`Error::InvalidTimestamp`] if no format matches.
pub fn parse_timestamp(value: &str) -> Result<DateTime<Utc>> {
    let trimmed = value.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(dt.with_timezone(&Utc));
    }

    for format in OFFSET_FORMATS {
        if let Ok(dt) = DateTime::parse_from_str(trimmed, format) {
            return Ok(dt.with_timezone(&Utc));
        }
    }

    for format in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(trimmed, format) {
            return Ok(Utc.from_utc_datetime(&naive));
        }
    }

    if let Some(naive) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
    {
        return Ok(Utc.from_utc_datetime(&naive));
    }

    Err(Error::InvalidTimestamp {
        value: value.to_string(),
        reason: "unrecognized date format".to_string(),
    })
}
