//! Offline issue source backed by a JSON dump.
//!
//! The dump holds the field directory and the issues as the tracker returns
//! them:
//!
//! ```json
//! { "fields": [{"id": "status", "name": "Status"}], "issues": [ ... ] }
//! ```
//!
//! Queries are not evaluated. A query of the form `project = KEY` keeps the
//! issues whose key starts with `KEY-`; anything else returns every issue.

use serde::Deserialize;
use std::fs;
use std::path::Path;
use tracing::debug;

use crate::error::Result;
use crate::model::{FieldDescriptor, Issue};

use super::issue_source::IssueSource;

/// Contents of a dump file.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TrackerDump {
    #[serde(default)]
    pub fields: Vec<FieldDescriptor>,
    /// Issues that fail to load are skipped with a warning.
    #[serde(default, deserialize_with = "crate::model::deserialize_issues")]
    pub issues: Vec<Issue>,
}

/// Issue source reading from a [`TrackerDump`].
#[derive(Debug, Clone)]
pub struct FileSource {
    dump: TrackerDump,
}

impl FileSource {
    /// Load a dump file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not a JSON dump.
    pub fn open(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let dump: TrackerDump = serde_json::from_str(&content)?;
        debug!(
            path = %path.display(),
            fields = dump.fields.len(),
            issues = dump.issues.len(),
            "Loaded tracker dump"
        );
        Ok(Self::from_dump(dump))
    }

    #[must_use]
    pub const fn from_dump(dump: TrackerDump) -> Self {
        Self { dump }
    }
}

/// Project key named by a `project = KEY` query.
fn project_filter(query: &str) -> Option<&str> {
    let (lhs, rhs) = query.split_once('=')?;
    if !lhs.trim().eq_ignore_ascii_case("project") {
        return None;
    }
    let key = rhs.trim().trim_matches(|c| c == '"' || c == '\'');
    (!key.is_empty() && !key.contains(char::is_whitespace)).then_some(key)
}

impl IssueSource for FileSource {
    fn name(&self) -> &str {
        "file"
    }

    async fn fields(&self) -> Result<Vec<FieldDescriptor>> {
        Ok(self.dump.fields.clone())
    }

    async fn search_issues(&self, query: &str, max_results: Option<usize>) -> Result<Vec<Issue>> {
        let project = project_filter(query).map(|key| format!("{key}-"));

        let matching = self.dump.issues.iter().filter(|issue| {
            project
                .as_deref()
                .is_none_or(|prefix| issue.key.starts_with(prefix))
        });

        let issues: Vec<Issue> = match max_results {
            Some(cap) => matching.take(cap).cloned().collect(),
            None => matching.cloned().collect(),
        };
        Ok(issues)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use serde_json::json;
    use std::io::Write;

    fn dump_json() -> serde_json::Value {
        json!({
            "fields": [
                {"id": "status", "name": "Status"},
                {"id": "customfield_1", "name": "Team", "custom": true}
            ],
            "issues": [
                {"key": "A-1", "fields": {"created": "2020-01-01T00:00:00.000+0000"}},
                {"key": "B-1", "fields": {"created": "2020-01-02T00:00:00.000+0000"}},
                {"key": "A-2", "fields": {"created": "2020-01-03T00:00:00.000+0000"}}
            ]
        })
    }

    fn source() -> FileSource {
        FileSource::from_dump(serde_json::from_value(dump_json()).unwrap())
    }

    #[test]
    fn test_project_filter() {
        assert_eq!(project_filter("project = A"), Some("A"));
        assert_eq!(project_filter("PROJECT=\"ABC\""), Some("ABC"));
        assert_eq!(project_filter("status = Done"), None);
        assert_eq!(project_filter("project = A AND status = Done"), None);
        assert_eq!(project_filter("anything"), None);
    }

    #[tokio::test]
    async fn test_open_and_fields() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{}", dump_json()).unwrap();

        let source = FileSource::open(file.path()).unwrap();
        let fields = source.fields().await.unwrap();
        assert_eq!(fields.len(), 2);
        assert!(fields[1].custom);
    }

    #[tokio::test]
    async fn test_search_filters_by_project() {
        let issues = source().search_issues("project = A", None).await.unwrap();
        let keys: Vec<_> = issues.iter().map(|i| i.key.as_str()).collect();
        assert_eq!(keys, vec!["A-1", "A-2"]);
    }

    #[tokio::test]
    async fn test_search_returns_all_and_caps() {
        let all = source().search_issues("order by created", None).await.unwrap();
        assert_eq!(all.len(), 3);

        let capped = source().search_issues("order by created", Some(2)).await.unwrap();
        assert_eq!(capped.len(), 2);
    }

    #[tokio::test]
    async fn test_unloadable_issue_is_skipped() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            "{}",
            json!({"issues": [
                {"key": "A-1", "fields": {"created": "yesterday"}},
                {"key": "A-2", "fields": {"created": "2020-01-01T00:00:00Z"}}
            ]})
        )
        .unwrap();

        let source = FileSource::open(file.path()).unwrap();
        let issues = source.search_issues("project = A", None).await.unwrap();
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].key, "A-2");
    }

    #[test]
    fn test_not_a_dump_fails_to_load() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{}", json!({"issues": {"key": "A-1"}})).unwrap();

        assert!(matches!(FileSource::open(file.path()), Err(Error::Json(_))));
    }
}
