//! Field directory entries.

use serde::{Deserialize, Serialize};

/// One entry of the tracker's field directory.
///
/// Ids are tracker-internal (`status`, `customfield_10002`); names are what
/// people see in the UI and what the configuration refers to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDescriptor {
    pub id: String,

    pub name: String,

    /// Whether the field is a custom (instance-defined) field.
    #[serde(default)]
    pub custom: bool,
}

impl FieldDescriptor {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            custom: false,
        }
    }
}
