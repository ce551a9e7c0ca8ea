//! Data models for issue-timeline.
//!
//! This module contains the domain models:
//! - FieldDescriptor (field directory entries)
//! - Issue, Changelog, History, ChangeItem (read-only tracker records)
//! - FieldValue, Scalar, ResolvedValue (field representations)
//! - IssueSnapshot (one field value at one point in time)

pub mod field;
pub mod issue;
pub mod snapshot;
pub mod value;

pub use field::FieldDescriptor;
pub use issue::{deserialize_issues, load_issues, parse_timestamp, ChangeItem, Changelog, History, Issue};
pub use snapshot::IssueSnapshot;
pub use value::{FieldValue, ResolvedValue, Scalar};
