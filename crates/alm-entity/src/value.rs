//! Field values
//!
//! Provides [`FieldValue`], the closed set of scalar values an entity field
//! can hold after projection from the wire format.

use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};
use std::fmt::{self, Display, Formatter};

/// Scalar field value
///
/// A field that is present but has no value on the server is [`FieldValue::Null`];
/// a field that was never requested is simply absent from the entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    /// Known to be empty
    Null,
    /// Boolean value
    Bool(bool),
    /// Numeric value, kept in its JSON representation
    Number(Number),
    /// String value
    String(String),
}

impl FieldValue {
    /// Project a JSON value onto the scalar set
    ///
    /// Returns `None` for arrays and objects.
    #[must_use]
    pub fn from_json(value: Value) -> Option<Self> {
        match value {
            Value::Null => Some(Self::Null),
            Value::Bool(b) => Some(Self::Bool(b)),
            Value::Number(n) => Some(Self::Number(n)),
            Value::String(s) => Some(Self::String(s)),
            Value::Array(_) | Value::Object(_) => None,
        }
    }

    /// Check for null
    #[inline]
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Borrow as string
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Read as integer
    ///
    /// ALM serializes most numeric fields as strings, so numeric strings are
    /// accepted too.
    #[must_use]
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Number(n) => n.as_i64(),
            Self::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }
}

impl Display for FieldValue {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => Ok(()),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Number(n) => write!(f, "{n}"),
            Self::String(s) => f.write_str(s),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        Self::String(s.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

impl From<i64> for FieldValue {
    fn from(n: i64) -> Self {
        Self::Number(n.into())
    }
}

impl From<bool> for FieldValue {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn from_json_keeps_native_type() {
        assert_eq!(FieldValue::from_json(json!(null)), Some(FieldValue::Null));
        assert_eq!(FieldValue::from_json(json!(true)), Some(FieldValue::Bool(true)));
        assert_eq!(FieldValue::from_json(json!(7)), Some(FieldValue::from(7)));
        assert_eq!(FieldValue::from_json(json!("x")), Some(FieldValue::from("x")));
    }

    #[test]
    fn from_json_rejects_containers() {
        assert_eq!(FieldValue::from_json(json!([1, 2])), None);
        assert_eq!(FieldValue::from_json(json!({"a": 1})), None);
    }

    #[test]
    fn as_i64_accepts_numeric_strings() {
        assert_eq!(FieldValue::from("42").as_i64(), Some(42));
        assert_eq!(FieldValue::from(42).as_i64(), Some(42));
        assert_eq!(FieldValue::from("abc").as_i64(), None);
        assert_eq!(FieldValue::Null.as_i64(), None);
    }

    #[test]
    fn display() {
        assert_eq!(FieldValue::Null.to_string(), "");
        assert_eq!(FieldValue::from("Passed").to_string(), "Passed");
        assert_eq!(FieldValue::from(3).to_string(), "3");
        assert_eq!(FieldValue::from(false).to_string(), "false");
    }

    #[test]
    fn serializes_untagged() {
        let json = serde_json::to_string(&vec![
            FieldValue::Null,
            FieldValue::from("a"),
            FieldValue::from(1),
        ])
        .unwrap();
        assert_eq!(json, r#"[null,"a",1]"#);
    }
}
