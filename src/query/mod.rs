//! Field resolution and change history.
//!
//! - [`AttributeDirectory`] maps attribute names to field ids
//! - [`FieldValueResolver`] normalizes a field's current value
//! - [`ChangeHistoryReconstructor`] replays an issue's changelog into
//!   [`IssueSnapshot`](crate::model::IssueSnapshot)s
//! - [`QueryManager`] ties them to an issue source

mod changes;
mod directory;
mod manager;
mod resolver;

pub use changes::{ChangeHistoryReconstructor, IssueChanges};
pub use directory::AttributeDirectory;
pub use manager::QueryManager;
pub use resolver::{coerce, FieldValueResolver, KnownValues};
