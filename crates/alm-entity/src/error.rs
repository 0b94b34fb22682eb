//! Error types for ALM entity access
//!
//! Provides error handling for:
//! - Type registry lookups (unknown or duplicate wire types)
//! - Page response parsing
//! - Transport failures and structured remote error documents
//! - Configuration loading

use serde::Deserialize;
use std::path::PathBuf;

/// Errors reported by the transport collaborator
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransportError {
    /// The server answered with a non-success status
    #[error("request to {path} failed with status {status}")]
    Status {
        /// Request path relative to the base URL
        path: String,
        /// HTTP status code
        status: u16,
        /// Raw response body
        body: String,
    },

    /// The request never produced a response
    #[error("connection error for {path}: {message}")]
    Connection {
        /// Request path relative to the base URL
        path: String,
        /// Underlying client message
        message: String,
    },
}

impl TransportError {
    /// Create status error
    pub fn status(path: impl Into<String>, status: u16, body: impl Into<String>) -> Self {
        Self::Status {
            path: path.into(),
            status,
            body: body.into(),
        }
    }

    /// Create connection error
    pub fn connection(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Connection {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Status code, if the server answered at all
    #[inline]
    #[must_use]
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            Self::Connection { .. } => None,
        }
    }
}

/// Main error type for entity access
#[derive(Debug, thiserror::Error)]
pub enum AlmError {
    /// Wire type name has no registered descriptor
    #[error("unregistered type: '{0}'")]
    UnregisteredType(String),

    /// Wire type name registered twice
    #[error("type already registered: '{0}'")]
    DuplicateType(String),

    /// Response body is missing required keys or has the wrong shape
    #[error("malformed response: {0}")]
    MalformedResponse(String),

    /// Transport failure, propagated unchanged
    #[error("transport failure: {0}")]
    Transport(#[from] TransportError),

    /// Transport failure whose body carried a structured error document
    #[error("remote application error ({status}): {title}")]
    RemoteApplication {
        /// HTTP status code of the failed request
        status: u16,
        /// Human-readable title extracted from the error document
        title: String,
    },

    /// Entity id that cannot be placed in an `id[...]` condition
    #[error("invalid entity id: '{0}'")]
    InvalidId(String),

    /// Invalid configuration
    #[error("configuration error: {0}")]
    Config(String),

    /// IO error while reading configuration
    #[error("io error reading {path}: {source}")]
    Io {
        /// File being read
        path: PathBuf,
        /// Underlying IO error
        #[source]
        source: std::io::Error,
    },
}

/// Result type alias for entity access operations
pub type AlmResult<T> = Result<T, AlmError>;

impl AlmError {
    /// Create malformed response error
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedResponse(message.into())
    }

    /// Create IO error for path
    pub fn io_error(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Reinterpret a transport failure
    ///
    /// A status failure whose body is an error document with a `Title`
    /// becomes [`AlmError::RemoteApplication`]. Anything else is returned as
    /// [`AlmError::Transport`] with the original error untouched.
    #[must_use]
    pub fn from_remote(error: TransportError) -> Self {
        let TransportError::Status { status, body, .. } = &error else {
            return Self::Transport(error);
        };

        match remote_error_title(body) {
            Some(title) => Self::RemoteApplication {
                status: *status,
                title,
            },
            None => Self::Transport(error),
        }
    }
}

#[derive(Debug, Deserialize)]
struct RemoteErrorDocument {
    #[serde(rename = "Title")]
    title: String,
}

/// Extract the `Title` of a structured remote error document
#[must_use]
pub fn remote_error_title(body: &str) -> Option<String> {
    serde_json::from_str::<RemoteErrorDocument>(body)
        .ok()
        .map(|doc| doc.title)
}
