//! Transport seam
//!
//! [`Transport`] is the blocking request/response boundary the entity
//! service talks through.

use alm_entity::TransportError;
use std::borrow::Cow;

/// Header names and media types used by the service
pub mod headers {
    //! Header constants

    /// `Accept`
    pub const ACCEPT: &str = "Accept";
    /// `Content-Type`
    pub const CONTENT_TYPE: &str = "Content-Type";
    /// JSON media type
    pub const APPLICATION_JSON: &str = "application/json";
    /// XML media type
    pub const APPLICATION_XML: &str = "application/xml";
    /// Raw bytes media type
    pub const OCTET_STREAM: &str = "application/octet-stream";
}

/// Raw response
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    status: u16,
    body: Vec<u8>,
}

impl Response {
    /// Create response
    #[inline]
    #[must_use]
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// HTTP status code
    #[inline]
    #[must_use]
    pub fn status(&self) -> u16 {
        self.status
    }

    /// Raw body
    #[inline]
    #[must_use]
    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// Take the raw body
    #[inline]
    #[must_use]
    pub fn into_body(self) -> Vec<u8> {
        self.body
    }

    /// Body as text, lossily decoded
    #[inline]
    #[must_use]
    pub fn text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.body)
    }

    /// Check for a 2xx status
    #[inline]
    #[must_use]
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Turn a non-2xx response into [`TransportError::Status`]
    ///
    /// # Errors
    /// Returns the status error, carrying the body, when the status is not 2xx.
    pub fn error_for_status(self, path: &str) -> Result<Self, TransportError> {
        if self.is_success() {
            Ok(self)
        } else {
            Err(TransportError::status(path, self.status, self.text()))
        }
    }
}

/// Blocking request/response transport
///
/// Paths are relative to [`Transport::base_url`]. Implementations report
/// only connection-level problems as errors; any HTTP status is a response.
pub trait Transport {
    /// Server base URL
    fn base_url(&self) -> &str;

    /// Issue a GET
    ///
    /// # Errors
    /// Returns [`TransportError::Connection`] if no response was received.
    fn get(
        &self,
        path: &str,
        params: &[(String, String)],
        headers: &[(&str, &str)],
    ) -> Result<Response, TransportError>;

    /// Issue a POST
    ///
    /// # Errors
    /// Returns [`TransportError::Connection`] if no response was received.
    fn post(
        &self,
        path: &str,
        body: Option<String>,
        headers: &[(&str, &str)],
    ) -> Result<Response, TransportError>;

    /// Drop every session cookie
    ///
    /// # Errors
    /// Returns [`TransportError::Connection`] if the session could not be reset.
    fn clear_session(&self) -> Result<(), TransportError>;
}

impl<T: Transport + ?Sized> Transport for &T {
    fn base_url(&self) -> &str {
        (**self).base_url()
    }

    fn get(
        &self,
        path: &str,
        params: &[(String, String)],
        headers: &[(&str, &str)],
    ) -> Result<Response, TransportError> {
        (**self).get(path, params, headers)
    }

    fn post(
        &self,
        path: &str,
        body: Option<String>,
        headers: &[(&str, &str)],
    ) -> Result<Response, TransportError> {
        (**self).post(path, body, headers)
    }

    fn clear_session(&self) -> Result<(), TransportError> {
        (**self).clear_session()
    }
}
