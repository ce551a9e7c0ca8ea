//! Issue sources.
//!
//! Everything the query layer knows about a tracker goes through the
//! [`IssueSource`] trait:
//!
//! ```text
//! ┌──────────────────┐
//! │   QueryManager   │
//! └────────┬─────────┘
//!          │
//!          ▼
//! ┌─────────────────┐
//! │    Factory      │  ← --from-file or connection settings
//! └────────┬────────┘
//!          │
//!     ┌────┴──────┐
//!     ▼           ▼
//! ┌──────────┐ ┌──────────┐
//! │JiraClient│ │FileSource│
//! └──────────┘ └──────────┘
//!     │           │
//!     ▼           ▼
//!   HTTP       JSON dump
//! ```

mod factory;
mod file;
mod issue_source;
mod jira;

pub use factory::create_source;
pub use file::{FileSource, TrackerDump};
pub use issue_source::{BoxedSource, IssueSource};
pub use jira::{Auth, JiraClient, PAGE_SIZE};
