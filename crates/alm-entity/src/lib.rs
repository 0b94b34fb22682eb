//! ALM Entity Access
//!
//! Typed, read-only access to paged ALM entity collections.
//!
//! # Core Concepts
//!
//! - [`TypeRegistry`]: Maps wire type names to [`EntityDescriptor`]s
//! - [`parse_collection`]: Turns one page of wire JSON into an [`EntityCollection`]
//! - [`Paginator`]: Walks every page of a collection query
//! - [`BatchResolver`]: Fetches entities for an id set in bounded batches
//! - [`reference_url`]: Builds `td://` deep links for entities
//!
//! Fetching is injected as a closure, so everything here runs without a
//! network connection.
//!
//! # Example
//!
//! ```rust
//! use alm_entity::{parse_collection, Paginator, QuerySpec, TypeRegistry};
//!
//! let registry = TypeRegistry::with_defaults();
//! let body = r#"{"TotalResults": 1, "entities": [
//!     {"Type": "run", "Fields": [{"Name": "id", "values": [{"value": "42"}]}]}
//! ]}"#;
//!
//! let runs = Paginator::default()
//!     .fetch_all(&QuerySpec::new().with_field("id"), |_| parse_collection(body, &registry))
//!     .unwrap();
//! assert_eq!(runs[0].id().as_deref(), Some("42"));
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

mod batch;
mod collection;
mod config;
mod entity;
mod error;
mod kind;
mod paging;
mod projects;
mod query;
mod reference;
mod registry;
mod value;

// Re-exports
pub use batch::{BatchResolver, DEFAULT_BATCH_SIZE};
pub use collection::{parse_collection, EntityCollection};
pub use config::AlmConfig;
pub use entity::{fields, Entity};
pub use error::{remote_error_title, AlmError, AlmResult, TransportError};
pub use kind::EntityKind;
pub use paging::{page_count, start_index, Paginator, DEFAULT_PAGE_SIZE};
pub use projects::parse_projects;
pub use query::{params, Condition, QuerySpec};
pub use reference::{host_part, reference_url, scheme_token, ProjectContext, PLAIN_SCHEME, SECURE_SCHEME};
pub use registry::{EntityDescriptor, TypeRegistry};
pub use value::FieldValue;

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for working with ALM entities
    pub use crate::{
        AlmConfig, AlmError, AlmResult, Entity, EntityCollection, EntityKind, FieldValue,
        QuerySpec, TypeRegistry,
    };
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
