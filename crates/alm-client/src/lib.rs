//! ALM Client
//!
//! Blocking HTTP access to ALM REST entity collections.
//!
//! # Core Concepts
//!
//! - [`Transport`]: Request/response seam, session cookies included
//! - [`HttpTransport`]: reqwest blocking implementation of [`Transport`]
//! - [`EntityService`]: Login, project listing, paged and by-id entity
//!   fetches, attachments and reference URLs for one project
//!
//! # Example
//!
//! ```rust,no_run
//! use alm_client::{EntityService, HttpTransport};
//! use alm_entity::{AlmConfig, EntityKind, QuerySpec};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = AlmConfig::from_file("alm.toml")?;
//! let transport = HttpTransport::new(&config.base_url, None)?;
//! let service = EntityService::from_config(transport, &config)?;
//!
//! if service.login("sa", Some("secret"))? {
//!     let runs = service.all_of_kind(EntityKind::Run, &QuerySpec::new().with_field("id"))?;
//!     println!("{} runs", runs.len());
//! }
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

mod http;
mod service;
mod transport;

// Re-exports
pub use http::{join_url, HttpTransport};
pub use service::{paths, EntityService};
pub use transport::{headers, Response, Transport};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for talking to an ALM server
    pub use crate::{EntityService, HttpTransport, Response, Transport};
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
