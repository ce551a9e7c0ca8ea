//! Field value representations.
//!
//! Trackers hand back plain scalars, lists, and option objects that wrap a
//! `value`. [`FieldValue`] tags these shapes once, when the issue is loaded,
//! so resolution can dispatch on the variant instead of inspecting JSON.

use serde::Serialize;
use serde_json::Value;
use std::fmt;

/// A single element of a field value.
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    Bool(bool),
    Integer(i64),
    Float(f64),
    String(String),
    Bytes(Vec<u8>),
    /// Objects, nulls and nested arrays, kept in their JSON form.
    Other(Value),
}

impl Scalar {
    /// Build a scalar from a JSON value.
    #[must_use]
    pub fn from_json(value: Value) -> Self {
        match value {
            Value::Bool(b) => Self::Bool(b),
            Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Self::Integer(i)
                } else if let Some(f) = n.as_f64() {
                    Self::Float(f)
                } else {
                    Self::Other(Value::Number(n))
                }
            }
            Value::String(s) => Self::String(s),
            other => Self::Other(other),
        }
    }

    /// Display name of an object element: `name`, falling back to `displayName`.
    #[must_use]
    pub fn display_name(&self) -> Option<&str> {
        match self {
            Self::Other(Value::Object(map)) => map
                .get("name")
                .or_else(|| map.get("displayName"))
                .and_then(Value::as_str),
            _ => None,
        }
    }

    /// Replace the element by its display name when it has one.
    #[must_use]
    pub fn into_named(self) -> Self {
        let name = self.display_name().map(str::to_owned);
        name.map_or(self, Self::String)
    }

    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }
}

impl From<&str> for Scalar {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for Scalar {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<i64> for Scalar {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<f64> for Scalar {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<bool> for Scalar {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

/// The raw value of one field on one issue.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Scalar(Scalar),
    List(Vec<Scalar>),
    /// An option object; the inner value is never itself `Wrapped`.
    Wrapped(Box<FieldValue>),
}

impl FieldValue {
    /// Tag a JSON field value.
    ///
    /// `null` means the field is unset, and so does an option object whose
    /// `value` is `null`. A `null` inside a list is kept as
    /// [`Scalar::Other`].
    #[must_use]
    pub fn from_json(value: Value) -> Option<Self> {
        match value {
            Value::Null => None,
            Value::Object(mut map) if map.contains_key("value") => match map.remove("value") {
                None | Some(Value::Null) => None,
                Some(inner) => Some(Self::Wrapped(Box::new(Self::bare(inner)))),
            },
            other => Some(Self::bare(other)),
        }
    }

    fn bare(value: Value) -> Self {
        match value {
            Value::Array(items) => Self::List(items.into_iter().map(Scalar::from_json).collect()),
            other => Self::Scalar(Scalar::from_json(other)),
        }
    }

    /// Strip one `Wrapped` layer, if any.
    #[must_use]
    pub fn unwrapped(&self) -> &Self {
        match self {
            Self::Wrapped(inner) => inner.as_ref(),
            other => other,
        }
    }

    pub fn scalar(value: impl Into<Scalar>) -> Self {
        Self::Scalar(value.into())
    }

    pub fn list<I, T>(values: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<Scalar>,
    {
        Self::List(values.into_iter().map(Into::into).collect())
    }

    pub fn wrapped(value: Self) -> Self {
        Self::Wrapped(Box::new(value))
    }
}

/// A resolved field value: one of the primitive kinds, or the original value
/// when it has no textual form.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ResolvedValue {
    Bool(bool),
    Integer(i64),
    Float(f64),
    String(String),
    Bytes(Vec<u8>),
    Opaque(Value),
}

impl ResolvedValue {
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }
}

impl From<&str> for ResolvedValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for ResolvedValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl fmt::Display for ResolvedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(b) => write!(f, "{b}"),
            Self::Integer(i) => write!(f, "{i}"),
            Self::Float(x) => write!(f, "{x}"),
            Self::String(s) => f.write_str(s),
            Self::Bytes(bytes) => f.write_str(&String::from_utf8_lossy(bytes)),
            Self::Opaque(value) => write!(f, "{value}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_null_is_absent() {
        assert_eq!(FieldValue::from_json(Value::Null), None);
        assert_eq!(FieldValue::from_json(json!({"self": "x", "value": null})), None);
        assert!(matches!(
            FieldValue::from_json(json!([null, "x"])),
            Some(FieldValue::List(items)) if items[0] == Scalar::Other(Value::Null)
        ));
    }

    #[test]
    fn test_option_object_is_wrapped() {
        let value = FieldValue::from_json(json!({"self": "x", "value": "Red", "id": "1"})).unwrap();
        assert_eq!(value, FieldValue::wrapped(FieldValue::scalar("Red")));
        assert_eq!(value.unwrapped(), &FieldValue::scalar("Red"));
    }

    #[test]
    fn test_wrapped_list_stays_a_list() {
        let value = FieldValue::from_json(json!({"value": ["a", "b"]})).unwrap();
        assert_eq!(value.unwrapped(), &FieldValue::list(["a", "b"]));
    }

    #[test]
    fn test_named_objects() {
        let status = Scalar::from_json(json!({"name": "Done", "id": "10001"}));
        assert_eq!(status.display_name(), Some("Done"));
        assert_eq!(status.into_named(), Scalar::from("Done"));

        let user = Scalar::from_json(json!({"displayName": "Ada"}));
        assert_eq!(user.into_named(), Scalar::from("Ada"));

        let anonymous = Scalar::from_json(json!({"id": 3}));
        assert_eq!(anonymous.display_name(), None);
    }

    #[test]
    fn test_numbers() {
        assert_eq!(Scalar::from_json(json!(3)), Scalar::Integer(3));
        assert_eq!(Scalar::from_json(json!(2.5)), Scalar::Float(2.5));
    }

    #[test]
    fn test_resolved_display_and_json() {
        assert_eq!(ResolvedValue::from("Done").to_string(), "Done");
        assert_eq!(ResolvedValue::Integer(5).to_string(), "5");
        assert_eq!(serde_json::to_value(ResolvedValue::Float(1.5)).unwrap(), json!(1.5));
    }
}
