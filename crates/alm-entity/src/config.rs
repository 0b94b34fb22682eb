//! Service configuration
//!
//! [`AlmConfig`] is loaded from TOML and bound once when a service is
//! created. It never holds the password.

use crate::batch::{BatchResolver, DEFAULT_BATCH_SIZE};
use crate::error::{AlmError, AlmResult};
use crate::paging::{Paginator, DEFAULT_PAGE_SIZE};
use crate::reference::ProjectContext;
use serde::{Deserialize, Serialize};
use std::num::{NonZeroU64, NonZeroUsize};
use std::path::Path;

/// Configuration for an ALM entity service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AlmConfig {
    /// Server base URL, e.g. `http://alm.example.com:8080/qcbin`
    pub base_url: String,
    /// ALM domain
    pub domain: String,
    /// ALM project
    pub project: String,
    /// User to log in as
    pub username: Option<String>,
    /// Entities per page when walking a collection
    pub page_size: u64,
    /// Ids per request when resolving by id
    pub batch_size: usize,
    /// Per-request timeout applied by the HTTP transport
    pub request_timeout_secs: Option<u64>,
    /// Log filter used when `RUST_LOG` is not set
    pub log_level: String,
}

impl Default for AlmConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            domain: String::new(),
            project: String::new(),
            username: None,
            page_size: DEFAULT_PAGE_SIZE,
            batch_size: DEFAULT_BATCH_SIZE,
            request_timeout_secs: None,
            log_level: "info".to_string(),
        }
    }
}

impl AlmConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With base URL
    #[inline]
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// With domain and project
    #[inline]
    #[must_use]
    pub fn with_project(mut self, domain: impl Into<String>, project: impl Into<String>) -> Self {
        self.domain = domain.into();
        self.project = project.into();
        self
    }

    /// With login user
    #[inline]
    #[must_use]
    pub fn with_username(mut self, username: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self
    }

    /// With page size
    #[inline]
    #[must_use]
    pub fn with_page_size(mut self, page_size: u64) -> Self {
        self.page_size = page_size;
        self
    }

    /// With batch size
    #[inline]
    #[must_use]
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    /// Parse TOML text
    ///
    /// # Errors
    /// Returns [`AlmError::Config`] on syntax errors, unknown keys or failed validation.
    pub fn from_toml_str(text: &str) -> AlmResult<Self> {
        let config: Self = toml::from_str(text).map_err(|e| AlmError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a TOML file
    ///
    /// # Errors
    /// Returns [`AlmError::Io`] if the file cannot be read, otherwise as [`Self::from_toml_str`].
    pub fn from_file(path: impl AsRef<Path>) -> AlmResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| AlmError::io_error(path, e))?;
        Self::from_toml_str(&text)
    }

    /// Check invariants
    ///
    /// # Errors
    /// Returns [`AlmError::Config`] for an empty base URL or zero page/batch size.
    pub fn validate(&self) -> AlmResult<()> {
        if self.base_url.trim().is_empty() {
            return Err(AlmError::Config("base_url must not be empty".to_string()));
        }
        if self.page_size == 0 {
            return Err(AlmError::Config("page_size must be greater than zero".to_string()));
        }
        if self.batch_size == 0 {
            return Err(AlmError::Config("batch_size must be greater than zero".to_string()));
        }
        Ok(())
    }

    /// Domain and project as a bound context
    #[inline]
    #[must_use]
    pub fn project_context(&self) -> ProjectContext {
        ProjectContext::new(&self.domain, &self.project)
    }

    /// Paginator for the configured page size
    ///
    /// # Errors
    /// Returns [`AlmError::Config`] if the page size is zero.
    pub fn paginator(&self) -> AlmResult<Paginator> {
        NonZeroU64::new(self.page_size)
            .map(Paginator::new)
            .ok_or_else(|| AlmError::Config("page_size must be greater than zero".to_string()))
    }

    /// Batch resolver for the configured batch size
    ///
    /// # Errors
    /// Returns [`AlmError::Config`] if the batch size is zero.
    pub fn batch_resolver(&self) -> AlmResult<BatchResolver> {
        NonZeroUsize::new(self.batch_size)
            .map(BatchResolver::new)
            .ok_or_else(|| AlmError::Config("batch_size must be greater than zero".to_string()))
    }
}
