//! Issue snapshots.

use chrono::{DateTime, SecondsFormat, TimeZone, Utc};
use serde::Serialize;
use std::fmt;

use super::value::ResolvedValue;

/// The value of one field on one issue at one point in time, paired with the
/// value it replaced.
///
/// Snapshots are value objects: fields are only readable once built. The
/// synthesized initial snapshot of a field has no `from_value`, but neither
/// does a historical change from an unset value; [`IssueSnapshot::is_initial`]
/// tells them apart.
#[derive(Debug, Clone, Serialize)]
pub struct IssueSnapshot {
    change: String,
    key: String,
    date: DateTime<Utc>,
    from_value: Option<String>,
    to_value: Option<ResolvedValue>,
    #[serde(skip)]
    initial: bool,
}

impl IssueSnapshot {
    /// Build a historical snapshot; `date` is normalized to UTC.
    pub fn new<Tz: TimeZone>(
        change: impl Into<String>,
        key: impl Into<String>,
        date: DateTime<Tz>,
        from_value: Option<String>,
        to_value: Option<ResolvedValue>,
    ) -> Self {
        Self {
            change: change.into(),
            key: key.into(),
            date: date.with_timezone(&Utc),
            from_value,
            to_value,
            initial: false,
        }
    }

    /// Build the creation-time snapshot of a field.
    pub fn initial<Tz: TimeZone>(
        change: impl Into<String>,
        key: impl Into<String>,
        created: DateTime<Tz>,
        to_value: Option<ResolvedValue>,
    ) -> Self {
        Self {
            initial: true,
            ..Self::new(change, key, created, None, to_value)
        }
    }

    /// Tracked field name.
    #[must_use]
    pub fn change(&self) -> &str {
        &self.change
    }

    /// Owning issue key.
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    #[must_use]
    pub const fn date(&self) -> DateTime<Utc> {
        self.date
    }

    #[must_use]
    pub fn from_value(&self) -> Option<&str> {
        self.from_value.as_deref()
    }

    #[must_use]
    pub const fn to_value(&self) -> Option<&ResolvedValue> {
        self.to_value.as_ref()
    }

    /// Whether this is a synthesized creation-time snapshot.
    #[must_use]
    pub const fn is_initial(&self) -> bool {
        self.initial
    }

    /// Normalized textual form of the date, used for equality.
    #[must_use]
    pub fn date_text(&self) -> String {
        self.date.to_rfc3339_opts(SecondsFormat::AutoSi, true)
    }
}

/// Equality covers the five public fields only.
impl PartialEq for IssueSnapshot {
    fn eq(&self, other: &Self) -> bool {
        self.change == other.change
            && self.key == other.key
            && self.date_text() == other.date_text()
            && self.from_value == other.from_value
            && self.to_value == other.to_value
    }
}

impl fmt::Display for IssueSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "<IssueSnapshot change={} key={} date={} from={} to={}>",
            self.change,
            self.key,
            self.date_text(),
            self.from_value.as_deref().unwrap_or("None"),
            self.to_value
                .as_ref()
                .map_or_else(|| "None".to_string(), ToString::to_string),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::FixedOffset;

    fn utc(s: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(s).unwrap().with_timezone(&Utc)
    }

    #[test]
    fn test_date_normalized_to_utc() {
        let offset = FixedOffset::east_opt(2 * 3600).unwrap();
        let local = offset.with_ymd_and_hms(2020, 1, 1, 2, 0, 0).unwrap();
        let snapshot = IssueSnapshot::new("status", "ISSUE-1", local, None, Some("Done".into()));

        assert_eq!(snapshot.date(), utc("2020-01-01T00:00:00Z"));
        assert_eq!(snapshot.date_text(), "2020-01-01T00:00:00Z");
    }

    #[test]
    fn test_equality_covers_all_fields() {
        let a = IssueSnapshot::initial("status", "ISSUE-1", utc("2020-01-01T00:00:00Z"), Some("Done".into()));
        let b = IssueSnapshot::new("status", "ISSUE-1", utc("2020-01-01T00:00:00Z"), None, Some("Done".into()));
        let c = IssueSnapshot::new(
            "status",
            "ISSUE-1",
            utc("2020-01-01T00:00:00Z"),
            Some("To Do".into()),
            Some("Done".into()),
        );

        assert_eq!(a, b);
        assert_ne!(a, c);
        assert!(a.is_initial());
        assert!(!b.is_initial());
        assert!(!c.is_initial());
    }

    #[test]
    fn test_display() {
        let snapshot = IssueSnapshot::new("status", "ISSUE-1", utc("2020-01-02T00:00:00Z"), Some("To Do".into()), None);
        assert_eq!(
            snapshot.to_string(),
            "<IssueSnapshot change=status key=ISSUE-1 date=2020-01-02T00:00:00Z from=To Do to=None>"
        );
    }
}
