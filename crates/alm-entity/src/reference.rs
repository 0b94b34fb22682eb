//! Reference (deep-link) URLs
//!
//! Formats `td://project.domain.host/...` links that open an entity in the
//! ALM desktop client.

use crate::entity::Entity;
use crate::error::AlmResult;
use crate::registry::TypeRegistry;
use serde::{Deserialize, Serialize};

/// Scheme token for plain HTTP servers (and unknown schemes)
pub const PLAIN_SCHEME: &str = "td";
/// Scheme token for HTTPS servers
pub const SECURE_SCHEME: &str = "tds";

/// Domain and project a service is bound to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectContext {
    domain: String,
    project: String,
}

impl ProjectContext {
    /// Create context
    #[inline]
    #[must_use]
    pub fn new(domain: impl Into<String>, project: impl Into<String>) -> Self {
        Self {
            domain: domain.into(),
            project: project.into(),
        }
    }

    /// ALM domain
    #[inline]
    #[must_use]
    pub fn domain(&self) -> &str {
        &self.domain
    }

    /// ALM project
    #[inline]
    #[must_use]
    pub fn project(&self) -> &str {
        &self.project
    }
}

/// Scheme token for a transport base URL
///
/// `https` maps to [`SECURE_SCHEME`]; `http` and any other scheme map to
/// [`PLAIN_SCHEME`].
#[must_use]
pub fn scheme_token(base_url: &str) -> &'static str {
    match base_url.split_once("://") {
        Some((scheme, _)) if scheme.eq_ignore_ascii_case("https") => SECURE_SCHEME,
        _ => PLAIN_SCHEME,
    }
}

/// Host part of a base URL: everything after `://`, without a trailing slash
#[must_use]
pub fn host_part(base_url: &str) -> &str {
    let rest = base_url.split_once("://").map_or(base_url, |(_, rest)| rest);
    rest.trim_end_matches('/')
}

/// Build the reference URL of an entity
///
/// # Errors
/// Returns [`crate::AlmError::UnregisteredType`] if the entity's type is not registered.
pub fn reference_url(
    entity: &Entity,
    registry: &TypeRegistry,
    context: &ProjectContext,
    base_url: &str,
) -> AlmResult<String> {
    let descriptor = registry.resolve(entity.type_name())?;
    // an entity without id still yields a link, with an empty EntityID
    let id = entity.id().unwrap_or_default();

    Ok(descriptor
        .reference_template()
        .replace("{scheme}", scheme_token(base_url))
        .replace("{project}", context.project())
        .replace("{domain}", context.domain())
        .replace("{host}", host_part(base_url))
        .replace("{id}", &id))
}
