//! Attribute directory.
//!
//! Maps the attribute names used in configuration to tracker field ids and
//! back. Built once from the tracker's field directory and never mutated.

use std::collections::{BTreeMap, HashMap};

use crate::error::{Error, Result};
use crate::model::FieldDescriptor;

/// Bidirectional attribute ↔ field id map plus the field catalog it was
/// resolved against.
#[derive(Debug, Clone)]
pub struct AttributeDirectory {
    fields: Vec<FieldDescriptor>,
    attributes_to_fields: BTreeMap<String, String>,
    fields_to_attributes: HashMap<String, String>,
}

impl AttributeDirectory {
    /// Resolve every configured attribute against the field directory.
    ///
    /// `attributes` maps attribute names to field display names.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownField`] for the first display name that the
    /// directory does not contain; no directory is built in that case.
    pub fn new<'a, I>(fields: Vec<FieldDescriptor>, attributes: I) -> Result<Self>
    where
        I: IntoIterator<Item = (&'a String, &'a String)>,
    {
        let mut directory = Self {
            fields,
            attributes_to_fields: BTreeMap::new(),
            fields_to_attributes: HashMap::new(),
        };

        for (name, field) in attributes {
            let field_id = directory.resolve(field)?.to_string();
            directory
                .fields_to_attributes
                .insert(field_id.clone(), name.clone());
            directory.attributes_to_fields.insert(name.clone(), field_id);
        }

        Ok(directory)
    }

    /// Field id for a display name, matched case-insensitively.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownField`] when no field has that name.
    pub fn resolve(&self, name: &str) -> Result<&str> {
        self.find(name).ok_or_else(|| Error::UnknownField {
            name: name.to_string(),
        })
    }

    /// First field whose display name matches, ignoring case.
    #[must_use]
    pub fn find(&self, name: &str) -> Option<&str> {
        let wanted = name.to_lowercase();
        self.fields
            .iter()
            .find(|f| f.name.to_lowercase() == wanted)
            .map(|f| f.id.as_str())
    }

    #[must_use]
    pub fn field_for_attribute(&self, attribute: &str) -> Option<&str> {
        self.attributes_to_fields.get(attribute).map(String::as_str)
    }

    #[must_use]
    pub fn attribute_for_field(&self, field_id: &str) -> Option<&str> {
        self.fields_to_attributes.get(field_id).map(String::as_str)
    }

    /// Configured attributes and their field ids, ordered by attribute name.
    pub fn attributes(&self) -> impl Iterator<Item = (&str, &str)> {
        self.attributes_to_fields
            .iter()
            .map(|(a, f)| (a.as_str(), f.as_str()))
    }

    /// The field catalog this directory was built from.
    #[must_use]
    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }
}
