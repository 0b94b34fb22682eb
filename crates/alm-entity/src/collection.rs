//! Collection page parsing
//!
//! Converts one page of the collection wire format into an
//! [`EntityCollection`]:
//!
//! ```json
//! {"TotalResults": 1, "entities": [
//!   {"Type": "run", "Fields": [{"Name": "id", "values": [{"value": "42"}]}]}
//! ]}
//! ```

use crate::entity::Entity;
use crate::error::{AlmError, AlmResult};
use crate::registry::TypeRegistry;
use crate::value::FieldValue;
use serde::Deserialize;
use serde_json::Value;

/// One page (or a merged set of pages) of entities
///
/// `total` is the server-side result count for the query, which can differ
/// from the number of entities actually carried.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EntityCollection {
    total: u64,
    entities: Vec<Entity>,
}

impl EntityCollection {
    /// Create collection
    #[inline]
    #[must_use]
    pub fn new(total: u64, entities: Vec<Entity>) -> Self {
        Self { total, entities }
    }

    /// Server-declared total
    #[inline]
    #[must_use]
    pub fn total(&self) -> u64 {
        self.total
    }

    /// Entities in server order
    #[inline]
    #[must_use]
    pub fn entities(&self) -> &[Entity] {
        &self.entities
    }

    /// Take the entities
    #[inline]
    #[must_use]
    pub fn into_entities(self) -> Vec<Entity> {
        self.entities
    }

    /// Number of entities carried
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    /// Check if no entity is carried
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }
}

impl IntoIterator for EntityCollection {
    type Item = Entity;
    type IntoIter = std::vec::IntoIter<Entity>;

    fn into_iter(self) -> Self::IntoIter {
        self.entities.into_iter()
    }
}

#[derive(Debug, Deserialize)]
struct WirePage {
    #[serde(rename = "TotalResults")]
    total_results: u64,
    entities: Vec<WireEntity>,
}

#[derive(Debug, Deserialize)]
struct WireEntity {
    #[serde(rename = "Type")]
    type_name: String,
    #[serde(rename = "Fields")]
    fields: Vec<WireField>,
}

#[derive(Debug, Deserialize)]
struct WireField {
    #[serde(rename = "Name")]
    name: String,
    values: Vec<Value>,
}

/// Parse one page response
///
/// Every field is materialized: only the first slot of `values` is read, and
/// a field without a value is stored as [`FieldValue::Null`].
///
/// # Errors
/// - [`AlmError::MalformedResponse`] if the document does not have the page shape
/// - [`AlmError::UnregisteredType`] if any entity carries an unknown `Type`
pub fn parse_collection(body: impl AsRef<[u8]>, registry: &TypeRegistry) -> AlmResult<EntityCollection> {
    let page: WirePage = serde_json::from_slice(body.as_ref())
        .map_err(|e| AlmError::malformed(format!("collection page: {e}")))?;

    let mut entities = Vec::with_capacity(page.entities.len());
    for wire in page.entities {
        let descriptor = registry.resolve(&wire.type_name)?;
        let mut entity = Entity::with_type_name(descriptor.kind(), wire.type_name);

        for field in wire.fields {
            let value = first_value(&field.name, field.values)?;
            entity.insert(field.name, value);
        }

        entities.push(entity);
    }

    tracing::trace!(total = page.total_results, returned = entities.len(), "parsed collection page");
    Ok(EntityCollection::new(page.total_results, entities))
}

fn first_value(name: &str, values: Vec<Value>) -> AlmResult<FieldValue> {
    match values.into_iter().next() {
        None => Ok(FieldValue::Null),
        Some(Value::Object(mut slot)) => match slot.remove("value") {
            None => Ok(FieldValue::Null),
            Some(value) => FieldValue::from_json(value).ok_or_else(|| {
                AlmError::malformed(format!("field '{name}' holds a non-scalar value"))
            }),
        },
        Some(_) => Err(AlmError::malformed(format!(
            "field '{name}' has a value slot that is not an object"
        ))),
    }
}
