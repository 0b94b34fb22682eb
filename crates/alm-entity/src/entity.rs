//! Dynamically-typed entities
//!
//! Provides [`Entity`], a flat record of scalar fields tagged with its
//! [`EntityKind`].

use crate::kind::EntityKind;
use crate::value::FieldValue;
use indexmap::IndexMap;
use serde::ser::{Serialize, SerializeMap, Serializer};

/// Well-known field names
pub mod fields {
    //! Field names shared by every entity kind

    /// Numeric identifier
    pub const ID: &str = "id";
    /// Display name
    pub const NAME: &str = "name";
}

/// Entity retrieved from a collection endpoint
///
/// Fields keep the order they arrived in. A field present with
/// [`FieldValue::Null`] is known to be empty; a missing field was never
/// requested.
#[derive(Debug, Clone, PartialEq)]
pub struct Entity {
    kind: EntityKind,
    type_name: String,
    fields: IndexMap<String, FieldValue>,
}

impl Entity {
    /// Create empty entity of the given kind, tagged with the kind's wire name
    #[inline]
    #[must_use]
    pub fn new(kind: EntityKind) -> Self {
        Self::with_type_name(kind, kind.wire_name())
    }

    /// Create empty entity of the given kind under an explicit wire type name
    #[inline]
    #[must_use]
    pub fn with_type_name(kind: EntityKind, type_name: impl Into<String>) -> Self {
        Self {
            kind,
            type_name: type_name.into(),
            fields: IndexMap::new(),
        }
    }

    /// Builder-style field setter
    #[inline]
    #[must_use]
    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.insert(name, value);
        self
    }

    /// Entity kind
    #[inline]
    #[must_use]
    pub fn kind(&self) -> EntityKind {
        self.kind
    }

    /// Wire type name the entity was received under
    #[inline]
    #[must_use]
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    /// Set a field, replacing any previous value
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<FieldValue>) {
        self.fields.insert(name.into(), value.into());
    }

    /// Get a field
    ///
    /// `None` means the field was never set; `Some(FieldValue::Null)` means it
    /// is known to be empty.
    #[inline]
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.fields.get(name)
    }

    /// Check whether a field was set at all
    #[inline]
    #[must_use]
    pub fn contains_field(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    /// Check whether a field is present and null
    #[inline]
    #[must_use]
    pub fn is_null(&self, name: &str) -> bool {
        self.get(name).is_some_and(FieldValue::is_null)
    }

    /// Identifier rendered as text
    #[must_use]
    pub fn id(&self) -> Option<String> {
        match self.get(fields::ID)? {
            FieldValue::Null => None,
            value => Some(value.to_string()),
        }
    }

    /// Display name
    #[inline]
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.get(fields::NAME).and_then(FieldValue::as_str)
    }

    /// Number of fields set
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Check if no field is set
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Iterate fields in arrival order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl Serialize for Entity {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len() + 1))?;
        map.serialize_entry("type", self.type_name())?;
        for (name, value) in &self.fields {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}
