//! Type registry for wire type names
//!
//! Provides [`TypeRegistry`] for mapping the `Type` tag of a wire entity to
//! the [`EntityDescriptor`] used to materialize and link it.

use crate::error::{AlmError, AlmResult};
use crate::kind::EntityKind;
use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::sync::Arc;

/// Static metadata for one wire type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntityDescriptor {
    kind: EntityKind,
    reference_template: &'static str,
}

impl EntityDescriptor {
    /// Create descriptor with an explicit reference template
    #[inline]
    #[must_use]
    pub const fn new(kind: EntityKind, reference_template: &'static str) -> Self {
        Self {
            kind,
            reference_template,
        }
    }

    /// Descriptor using the kind's built-in template
    #[inline]
    #[must_use]
    pub const fn for_kind(kind: EntityKind) -> Self {
        Self::new(kind, kind.reference_template())
    }

    /// Shape to instantiate
    #[inline]
    #[must_use]
    pub const fn kind(&self) -> EntityKind {
        self.kind
    }

    /// Deep-link template
    #[inline]
    #[must_use]
    pub const fn reference_template(&self) -> &'static str {
        self.reference_template
    }
}

static DEFAULT_REGISTRY: Lazy<Arc<TypeRegistry>> =
    Lazy::new(|| Arc::new(TypeRegistry::with_defaults()));

/// Registry of wire type names
///
/// Populated once at startup, then shared read-only behind an [`Arc`].
/// Only `&mut self` methods mutate, so a shared registry cannot change.
#[derive(Debug, Default, Clone)]
pub struct TypeRegistry {
    descriptors: HashMap<String, EntityDescriptor>,
}

impl TypeRegistry {
    /// Create new empty registry
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self {
            descriptors: HashMap::new(),
        }
    }

    /// Create registry with every built-in kind
    #[must_use]
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        for kind in EntityKind::ALL {
            registry
                .descriptors
                .insert(kind.wire_name().to_string(), EntityDescriptor::for_kind(kind));
        }
        registry
    }

    /// Process-wide registry with every built-in kind
    #[must_use]
    pub fn shared_defaults() -> Arc<Self> {
        Arc::clone(&DEFAULT_REGISTRY)
    }

    /// Register a descriptor under a wire type name
    ///
    /// # Errors
    /// Returns [`AlmError::DuplicateType`] if the name is already taken.
    pub fn register(
        &mut self,
        type_name: impl Into<String>,
        descriptor: EntityDescriptor,
    ) -> AlmResult<()> {
        let type_name = type_name.into();
        if self.descriptors.contains_key(&type_name) {
            return Err(AlmError::DuplicateType(type_name));
        }
        self.descriptors.insert(type_name, descriptor);
        Ok(())
    }

    /// Resolve a wire type name
    ///
    /// # Errors
    /// Returns [`AlmError::UnregisteredType`] if the name is unknown.
    pub fn resolve(&self, type_name: &str) -> AlmResult<&EntityDescriptor> {
        self.descriptors
            .get(type_name)
            .ok_or_else(|| AlmError::UnregisteredType(type_name.to_string()))
    }

    /// Check if a wire type name is registered
    #[inline]
    #[must_use]
    pub fn contains(&self, type_name: &str) -> bool {
        self.descriptors.contains_key(type_name)
    }

    /// List all registered wire type names
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        self.descriptors.keys().map(String::as_str).collect()
    }

    /// Get number of registered types
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    /// Check if registry is empty
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registry_new_empty() {
        let registry = TypeRegistry::new();
        assert!(registry.is_empty());
        assert_eq!(registry.len(), 0);
    }

    #[test]
    fn registry_with_defaults() {
        let registry = TypeRegistry::with_defaults();
        assert_eq!(registry.len(), 7);
        for name in ["release", "run", "test-set", "test", "release-cycle", "test-config", "test-folder"] {
            assert!(registry.contains(name), "missing {name}");
        }
    }

    #[test]
    fn registry_resolve_known() {
        let registry = TypeRegistry::with_defaults();
        let descriptor = registry.resolve("run").unwrap();
        assert_eq!(descriptor.kind(), EntityKind::Run);
        assert_eq!(descriptor.reference_template(), EntityKind::Run.reference_template());
    }

    #[test]
    fn registry_resolve_unknown() {
        let registry = TypeRegistry::with_defaults();
        let err = registry.resolve("defect").unwrap_err();
        assert!(matches!(err, AlmError::UnregisteredType(ref name) if name == "defect"));
    }

    #[test]
    fn registry_register_custom() {
        let mut registry = TypeRegistry::new();
        let descriptor = EntityDescriptor::new(EntityKind::Test, "{scheme}://{host}/t/{id}");
        registry.register("manual-test", descriptor).unwrap();

        assert_eq!(registry.resolve("manual-test").unwrap(), &descriptor);
        assert_eq!(registry.names(), vec!["manual-test"]);
    }

    #[test]
    fn registry_rejects_duplicate() {
        let mut registry = TypeRegistry::with_defaults();
        let err = registry
            .register("run", EntityDescriptor::for_kind(EntityKind::Run))
            .unwrap_err();
        assert!(matches!(err, AlmError::DuplicateType(_)));
    }

    #[test]
    fn shared_defaults_is_one_instance() {
        let a = TypeRegistry::shared_defaults();
        let b = TypeRegistry::shared_defaults();
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(a.len(), EntityKind::ALL.len());
    }
}
