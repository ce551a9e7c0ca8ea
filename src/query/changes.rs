//! Changelog replay.
//!
//! [`ChangeHistoryReconstructor::reconstruct`] yields, for one issue:
//!
//! 1. one synthesized snapshot per tracked field, dated at issue creation,
//!    holding the value the field had when the issue was created;
//! 2. one snapshot per changelog item touching a tracked field, in changelog
//!    order.
//!
//! The creation-time value is the `fromString` of the oldest changelog item
//! for the field. A field with no changelog item falls back to its current
//! value, which is only exact if the field never changed: when the tracker
//! truncates the changelog the fallback is an approximation.

use chrono::{DateTime, Utc};
use std::collections::HashSet;
use std::iter::FusedIterator;
use std::slice;

use crate::error::Result;
use crate::model::{ChangeItem, History, Issue, IssueSnapshot, ResolvedValue};

use super::directory::AttributeDirectory;
use super::resolver::{FieldValueResolver, KnownValues};

/// Builds snapshot sequences for issues.
#[derive(Debug, Clone, Copy)]
pub struct ChangeHistoryReconstructor<'a> {
    directory: &'a AttributeDirectory,
    resolver: FieldValueResolver<'a>,
}

impl<'a> ChangeHistoryReconstructor<'a> {
    pub const fn new(directory: &'a AttributeDirectory, known_values: &'a KnownValues) -> Self {
        Self {
            directory,
            resolver: FieldValueResolver::new(directory, known_values),
        }
    }

    /// Snapshot sequence of `issue` for the tracked `fields`.
    ///
    /// Field names are resolved to field ids before the first snapshot is
    /// produced; iteration itself cannot fail. The returned iterator is
    /// single-pass: call `reconstruct` again to replay.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::UnknownField`] if a tracked field is not in the
    /// field directory.
    pub fn reconstruct<'i, S>(&self, issue: &'i Issue, fields: &[S]) -> Result<IssueChanges<'i>>
    where
        'a: 'i,
        S: AsRef<str>,
    {
        let initial = fields
            .iter()
            .map(|name| {
                let name = name.as_ref();
                self.directory.resolve(name).map(|id| TrackedField {
                    name: name.to_string(),
                    field_id: id.to_string(),
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let tracked = initial.iter().map(|f| f.name.clone()).collect();

        Ok(IssueChanges {
            issue,
            resolver: self.resolver,
            initial: initial.into_iter(),
            tracked,
            histories: issue.changelog.histories.iter(),
            items: slice::Iter::default(),
            history_date: issue.created,
        })
    }
}

#[derive(Debug)]
struct TrackedField {
    name: String,
    field_id: String,
}

/// Lazy, single-pass snapshot sequence for one issue.
///
/// All creation-time snapshots come first, in tracked-field order, followed
/// by the changelog snapshots. Dropping the iterator early has no effect.
#[derive(Debug)]
pub struct IssueChanges<'a> {
    issue: &'a Issue,
    resolver: FieldValueResolver<'a>,
    initial: std::vec::IntoIter<TrackedField>,
    tracked: HashSet<String>,
    histories: slice::Iter<'a, History>,
    items: slice::Iter<'a, ChangeItem>,
    history_date: DateTime<Utc>,
}

impl IssueChanges<'_> {
    fn initial_snapshot(&self, field: TrackedField) -> IssueSnapshot {
        let earliest = self
            .issue
            .changelog
            .items()
            .find(|item| item.field == field.name);

        let value = match earliest {
            Some(item) => item.from_string.clone().map(ResolvedValue::String),
            None => self.resolver.resolve(self.issue, &field.field_id),
        };

        IssueSnapshot::initial(field.name, &self.issue.key, self.issue.created, value)
    }
}

impl Iterator for IssueChanges<'_> {
    type Item = IssueSnapshot;

    fn next(&mut self) -> Option<IssueSnapshot> {
        if let Some(field) = self.initial.next() {
            return Some(self.initial_snapshot(field));
        }

        loop {
            if let Some(item) = self
                .items
                .find(|item| self.tracked.contains(item.field.as_str()))
            {
                return Some(IssueSnapshot::new(
                    &item.field,
                    &self.issue.key,
                    self.history_date,
                    item.from_string.clone(),
                    item.to_string.clone().map(ResolvedValue::String),
                ));
            }

            let history = self.histories.next()?;
            self.history_date = history.created;
            self.items = history.items.iter();
        }
    }
}

impl FusedIterator for IssueChanges<'_> {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::model::{parse_timestamp, FieldDescriptor, FieldValue};
    use std::collections::BTreeMap;

    fn ts(s: &str) -> DateTime<Utc> {
        parse_timestamp(s).unwrap()
    }

    fn directory() -> AttributeDirectory {
        let fields = vec![
            FieldDescriptor::new("status", "Status"),
            FieldDescriptor::new("resolution", "Resolution"),
            FieldDescriptor::new("customfield_7", "Flagged"),
        ];
        AttributeDirectory::new(fields, &BTreeMap::<String, String>::new()).unwrap()
    }

    fn base_issue() -> Issue {
        Issue::new("ISSUE-1", ts("2020-01-01T00:00:00Z"))
            .with_field("status", FieldValue::from_json(serde_json::json!({"name": "Done"})).unwrap())
    }

    fn snapshot(
        change: &str,
        date: &str,
        from: Option<&str>,
        to: Option<&str>,
    ) -> IssueSnapshot {
        IssueSnapshot::new(
            change,
            "ISSUE-1",
            ts(date),
            from.map(str::to_string),
            to.map(ResolvedValue::from),
        )
    }

    #[test]
    fn test_unchanged_field_uses_current_value() {
        let dir = directory();
        let kv = KnownValues::new();
        let reconstructor = ChangeHistoryReconstructor::new(&dir, &kv);
        let issue = base_issue();

        let changes: Vec<_> = reconstructor.reconstruct(&issue, &["status"]).unwrap().collect();

        assert_eq!(
            changes,
            vec![snapshot("status", "2020-01-01T00:00:00Z", None, Some("Done"))]
        );
    }

    #[test]
    fn test_initial_value_comes_from_first_change() {
        let dir = directory();
        let kv = KnownValues::new();
        let reconstructor = ChangeHistoryReconstructor::new(&dir, &kv);
        let issue = base_issue().with_history(History::new(
            ts("2020-01-02T00:00:00Z"),
            vec![ChangeItem::new("status", Some("To Do"), Some("In Progress"))],
        ));

        let changes: Vec<_> = reconstructor.reconstruct(&issue, &["status"]).unwrap().collect();

        assert_eq!(
            changes,
            vec![
                snapshot("status", "2020-01-01T00:00:00Z", None, Some("To Do")),
                snapshot("status", "2020-01-02T00:00:00Z", Some("To Do"), Some("In Progress")),
            ]
        );
    }

    #[test]
    fn test_initial_snapshots_precede_history() {
        let dir = directory();
        let kv = KnownValues::new();
        let reconstructor = ChangeHistoryReconstructor::new(&dir, &kv);
        let issue = base_issue()
            .with_history(History::new(
                ts("2020-01-02T00:00:00Z"),
                vec![
                    ChangeItem::new("status", Some("To Do"), Some("In Progress")),
                    ChangeItem::new("assignee", None, Some("Ada")),
                    ChangeItem::new("Flagged", None, Some("Impediment")),
                ],
            ))
            .with_history(History::new(ts("2020-01-03T00:00:00Z"), vec![]))
            .with_history(History::new(
                ts("2020-01-04T00:00:00Z"),
                vec![
                    ChangeItem::new("Flagged", Some("Impediment"), None),
                    ChangeItem::new("status", Some("In Progress"), Some("Done")),
                ],
            ));

        let changes: Vec<_> = reconstructor
            .reconstruct(&issue, &["status", "Flagged"])
            .unwrap()
            .collect();

        assert_eq!(
            changes,
            vec![
                snapshot("status", "2020-01-01T00:00:00Z", None, Some("To Do")),
                snapshot("Flagged", "2020-01-01T00:00:00Z", None, None),
                snapshot("status", "2020-01-02T00:00:00Z", Some("To Do"), Some("In Progress")),
                snapshot("Flagged", "2020-01-02T00:00:00Z", None, Some("Impediment")),
                snapshot("Flagged", "2020-01-04T00:00:00Z", Some("Impediment"), None),
                snapshot("status", "2020-01-04T00:00:00Z", Some("In Progress"), Some("Done")),
            ]
        );
    }

    #[test]
    fn test_count_and_ordering_properties() {
        let dir = directory();
        let kv = KnownValues::new();
        let reconstructor = ChangeHistoryReconstructor::new(&dir, &kv);

        let mut issue = base_issue();
        for day in 2..=9 {
            let field = if day % 3 == 0 { "resolution" } else { "status" };
            issue = issue.with_history(History::new(
                ts(&format!("2020-01-0{day}T00:00:00Z")),
                vec![
                    ChangeItem::new(field, Some("a"), Some("b")),
                    ChangeItem::new("summary", Some("x"), Some("y")),
                ],
            ));
        }

        let fields = ["status", "resolution"];
        let changes: Vec<_> = reconstructor.reconstruct(&issue, &fields).unwrap().collect();
        let tracked_deltas = issue
            .changelog
            .items()
            .filter(|i| fields.contains(&i.field.as_str()))
            .count();

        assert_eq!(changes.len(), fields.len() + tracked_deltas);
        assert!(changes[..2].iter().all(IssueSnapshot::is_initial));
        assert!(!changes[2..].iter().any(IssueSnapshot::is_initial));
        assert!(changes[2..].iter().all(|s| s.from_value() == Some("a")));
        assert!(changes[2..].windows(2).all(|w| w[0].date() <= w[1].date()));
    }

    #[test]
    fn test_early_stop_and_replay() {
        let dir = directory();
        let kv = KnownValues::new();
        let reconstructor = ChangeHistoryReconstructor::new(&dir, &kv);
        let issue = base_issue().with_history(History::new(
            ts("2020-01-02T00:00:00Z"),
            vec![ChangeItem::new("status", Some("To Do"), Some("Done"))],
        ));

        let mut first = reconstructor.reconstruct(&issue, &["status"]).unwrap();
        assert!(first.next().is_some());
        drop(first);

        let replay: Vec<_> = reconstructor.reconstruct(&issue, &["status"]).unwrap().collect();
        assert_eq!(replay.len(), 2);

        let mut exhausted = reconstructor.reconstruct(&issue, &["status"]).unwrap();
        assert_eq!(exhausted.by_ref().count(), 2);
        assert!(exhausted.next().is_none());
    }

    #[test]
    fn test_unknown_tracked_field() {
        let dir = directory();
        let kv = KnownValues::new();
        let reconstructor = ChangeHistoryReconstructor::new(&dir, &kv);
        let issue = base_issue();

        let result = reconstructor.reconstruct(&issue, &["Story Points"]);
        assert!(matches!(result, Err(Error::UnknownField { .. })));
    }

    #[test]
    fn test_change_from_unset_value_is_not_initial() {
        let dir = directory();
        let kv = KnownValues::new();
        let reconstructor = ChangeHistoryReconstructor::new(&dir, &kv);
        let issue = base_issue().with_history(History::new(
            ts("2020-01-02T00:00:00Z"),
            vec![ChangeItem::new("Flagged", None, Some("Impediment"))],
        ));

        let changes: Vec<_> = reconstructor.reconstruct(&issue, &["Flagged"]).unwrap().collect();

        assert_eq!(changes.len(), 2);
        assert_eq!(changes[1].from_value(), None);
        assert_eq!(
            changes.iter().map(IssueSnapshot::is_initial).collect::<Vec<_>>(),
            vec![true, false]
        );
    }
}
