//! Field value resolution.
//!
//! Turns the raw value of a field into a single primitive:
//!
//! 1. unset → `None`, including an option object wrapping `null`
//! 2. option objects are unwrapped
//! 3. lists collapse to one element: the first element, or for attributes
//!    with a known-values table, the first table entry present in the list
//! 4. non-primitives are converted to text where they have a textual form
//!
//! Resolution never fails: anomalies degrade to `None` or to the raw value.
//! A `null` picked out of a list has no textual form and passes through as
//! [`ResolvedValue::Opaque`].

use serde_json::Value;
use std::collections::HashMap;

use crate::error::{Error, Result};
use crate::model::{FieldValue, Issue, ResolvedValue, Scalar};

use super::directory::AttributeDirectory;

/// Attribute name → canonical values, highest priority first.
pub type KnownValues = HashMap<String, Vec<String>>;

/// Resolves current field values against a directory and known-values table.
#[derive(Debug, Clone, Copy)]
pub struct FieldValueResolver<'a> {
    directory: &'a AttributeDirectory,
    known_values: &'a KnownValues,
}

impl<'a> FieldValueResolver<'a> {
    pub const fn new(directory: &'a AttributeDirectory, known_values: &'a KnownValues) -> Self {
        Self {
            directory,
            known_values,
        }
    }

    /// Current value of `field_id` on `issue`.
    #[must_use]
    pub fn resolve(&self, issue: &Issue, field_id: &str) -> Option<ResolvedValue> {
        let raw = issue.field(field_id)?;
        self.select(field_id, raw.unwrapped()).map(coerce)
    }

    /// Current value of a configured attribute on `issue`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownAttribute`] if the attribute is not configured.
    pub fn resolve_attribute(&self, issue: &Issue, attribute: &str) -> Result<Option<ResolvedValue>> {
        let field_id = self
            .directory
            .field_for_attribute(attribute)
            .ok_or_else(|| Error::UnknownAttribute {
                name: attribute.to_string(),
            })?;
        Ok(self.resolve(issue, field_id))
    }

    fn select(&self, field_id: &str, value: &FieldValue) -> Option<Scalar> {
        match value {
            FieldValue::Scalar(scalar) => Some(scalar.clone()),
            FieldValue::List(items) => self.pick(field_id, items),
            FieldValue::Wrapped(inner) => self.select(field_id, inner),
        }
    }

    fn pick(&self, field_id: &str, items: &[Scalar]) -> Option<Scalar> {
        let candidates: Vec<Scalar> = items.iter().cloned().map(Scalar::into_named).collect();

        let known = self
            .directory
            .attribute_for_field(field_id)
            .and_then(|attribute| self.known_values.get(attribute));

        match known {
            None => candidates.into_iter().next(),
            Some(known) => known
                .iter()
                .find(|k| candidates.iter().any(|c| c.as_str() == Some(k.as_str())))
                .map(|k| Scalar::String(k.clone())),
        }
    }
}

/// Coerce a scalar to a primitive kind.
///
/// Values with no textual form (JSON `null`) are passed through as
/// [`ResolvedValue::Opaque`].
#[must_use]
pub fn coerce(scalar: Scalar) -> ResolvedValue {
    match scalar {
        Scalar::Bool(b) => ResolvedValue::Bool(b),
        Scalar::Integer(i) => ResolvedValue::Integer(i),
        Scalar::Float(f) => ResolvedValue::Float(f),
        Scalar::String(s) => ResolvedValue::String(s),
        Scalar::Bytes(b) => ResolvedValue::Bytes(b),
        Scalar::Other(value) => match textual_form(&value) {
            Some(text) => ResolvedValue::String(text),
            None => ResolvedValue::Opaque(value),
        },
    }
}

fn textual_form(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::Object(map) => ["name", "displayName", "value"]
            .iter()
            .find_map(|k| map.get(*k).and_then(Value::as_str))
            .map(str::to_string)
            .or_else(|| serde_json::to_string(value).ok()),
        other => serde_json::to_string(other).ok(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{parse_timestamp, FieldDescriptor};
    use serde_json::json;
    use std::collections::BTreeMap;

    fn directory() -> AttributeDirectory {
        let fields = vec![
            FieldDescriptor::new("issuetype", "Issue Type"),
            FieldDescriptor::new("labels", "Labels"),
            FieldDescriptor::new("components", "Components"),
        ];
        let attributes: BTreeMap<String, String> = [
            ("type".to_string(), "Issue Type".to_string()),
            ("labels".to_string(), "Labels".to_string()),
        ]
        .into_iter()
        .collect();
        AttributeDirectory::new(fields, &attributes).unwrap()
    }

    fn known() -> KnownValues {
        [("type".to_string(), vec!["Feature".to_string(), "Bug".to_string()])]
            .into_iter()
            .collect()
    }

    fn issue() -> Issue {
        Issue::new("ISSUE-1", parse_timestamp("2020-01-01T00:00:00Z").unwrap())
    }

    #[test]
    fn test_absent_field_is_none() {
        let (dir, kv) = (directory(), known());
        let resolver = FieldValueResolver::new(&dir, &kv);
        assert_eq!(resolver.resolve(&issue(), "issuetype"), None);
    }

    #[test]
    fn test_primitive_scalar_unchanged() {
        let (dir, kv) = (directory(), known());
        let resolver = FieldValueResolver::new(&dir, &kv);
        let issue = issue()
            .with_field("points", FieldValue::scalar(5_i64))
            .with_field("ratio", FieldValue::scalar(0.5))
            .with_field("flag", FieldValue::scalar(true))
            .with_field("summary", FieldValue::scalar("Fix it"));

        assert_eq!(resolver.resolve(&issue, "points"), Some(ResolvedValue::Integer(5)));
        assert_eq!(resolver.resolve(&issue, "ratio"), Some(ResolvedValue::Float(0.5)));
        assert_eq!(resolver.resolve(&issue, "flag"), Some(ResolvedValue::Bool(true)));
        assert_eq!(resolver.resolve(&issue, "summary"), Some("Fix it".into()));
    }

    #[test]
    fn test_known_values_priority_pick() {
        let (dir, kv) = (directory(), known());
        let resolver = FieldValueResolver::new(&dir, &kv);
        let issue = issue().with_field("issuetype", FieldValue::list(["Bug", "Feature"]));

        assert_eq!(resolver.resolve(&issue, "issuetype"), Some("Feature".into()));
    }

    #[test]
    fn test_known_values_no_match_is_none() {
        let (dir, kv) = (directory(), known());
        let resolver = FieldValueResolver::new(&dir, &kv);
        let issue = issue().with_field("issuetype", FieldValue::list(["Epic", "Story"]));

        assert_eq!(resolver.resolve(&issue, "issuetype"), None);
    }

    #[test]
    fn test_empty_list_is_none() {
        let (dir, kv) = (directory(), known());
        let resolver = FieldValueResolver::new(&dir, &kv);
        let issue = issue().with_field("labels", FieldValue::List(vec![]));

        assert_eq!(resolver.resolve(&issue, "labels"), None);
    }

    #[test]
    fn test_without_known_values_first_element_wins() {
        let (dir, kv) = (directory(), known());
        let resolver = FieldValueResolver::new(&dir, &kv);
        let issue = issue().with_field("labels", FieldValue::list(["backend", "urgent"]));

        assert_eq!(resolver.resolve(&issue, "labels"), Some("backend".into()));
    }

    #[test]
    fn test_list_elements_reduce_to_names() {
        let (dir, kv) = (directory(), known());
        let resolver = FieldValueResolver::new(&dir, &kv);
        let issue = issue().with_field(
            "components",
            FieldValue::from_json(json!([{"id": "1", "name": "API"}, {"id": "2", "name": "UI"}])).unwrap(),
        );

        assert_eq!(resolver.resolve(&issue, "components"), Some("API".into()));
    }

    #[test]
    fn test_known_values_match_named_elements() {
        let (dir, kv) = (directory(), known());
        let resolver = FieldValueResolver::new(&dir, &kv);
        let issue = issue().with_field(
            "issuetype",
            FieldValue::from_json(json!([{"name": "Bug"}, {"name": "Feature"}])).unwrap(),
        );

        assert_eq!(resolver.resolve(&issue, "issuetype"), Some("Feature".into()));
    }

    #[test]
    fn test_wrapped_option_is_unwrapped() {
        let (dir, kv) = (directory(), known());
        let resolver = FieldValueResolver::new(&dir, &kv);
        let issue = issue().with_field(
            "customfield_9",
            FieldValue::from_json(json!({"id": "10", "value": "Red"})).unwrap(),
        );

        assert_eq!(resolver.resolve(&issue, "customfield_9"), Some("Red".into()));
    }

    #[test]
    fn test_objects_convert_to_text() {
        let (dir, kv) = (directory(), known());
        let resolver = FieldValueResolver::new(&dir, &kv);
        let issue = issue()
            .with_field("status", FieldValue::from_json(json!({"name": "Done", "id": "3"})).unwrap())
            .with_field("votes", FieldValue::from_json(json!({"votes": 2})).unwrap());

        assert_eq!(resolver.resolve(&issue, "status"), Some("Done".into()));
        assert_eq!(resolver.resolve(&issue, "votes"), Some(r#"{"votes":2}"#.into()));
    }

    #[test]
    fn test_value_without_text_passes_through() {
        let (dir, kv) = (directory(), known());
        let resolver = FieldValueResolver::new(&dir, &kv);
        let issue = issue().with_field("odd", FieldValue::from_json(json!([null, "x"])).unwrap());

        assert_eq!(resolver.resolve(&issue, "odd"), Some(ResolvedValue::Opaque(Value::Null)));
    }

    #[test]
    fn test_resolve_attribute() {
        let (dir, kv) = (directory(), known());
        let resolver = FieldValueResolver::new(&dir, &kv);
        let issue = issue().with_field("issuetype", FieldValue::list(["Bug"]));

        assert_eq!(resolver.resolve_attribute(&issue, "type").unwrap(), Some("Bug".into()));
        assert!(matches!(
            resolver.resolve_attribute(&issue, "Team"),
            Err(Error::UnknownAttribute { .. })
        ));
    }
}
