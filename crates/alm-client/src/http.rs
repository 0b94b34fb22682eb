//! reqwest-backed transport
//!
//! [`HttpTransport`] keeps the ALM session in a cookie jar owned by the
//! current blocking client.

use crate::transport::{Response, Transport};
use alm_entity::TransportError;
use parking_lot::Mutex;
use reqwest::blocking::{Client, RequestBuilder};
use reqwest::cookie::Jar;
use std::sync::Arc;
use std::time::Duration;

/// Join a base URL and a relative path with exactly one slash
#[must_use]
pub fn join_url(base_url: &str, path: &str) -> String {
    format!("{}/{}", base_url.trim_end_matches('/'), path.trim_start_matches('/'))
}

/// reqwest-backed blocking transport
///
/// Cookies set by the server (the ALM session) are kept in a jar owned by
/// the current client. Clearing the session swaps in a fresh client and jar.
#[derive(Debug)]
pub struct HttpTransport {
    base_url: String,
    timeout: Option<Duration>,
    client: Mutex<Client>,
}

impl HttpTransport {
    /// Create transport for a base URL
    ///
    /// # Errors
    /// Returns [`TransportError::Connection`] if the client cannot be built.
    pub fn new(base_url: impl Into<String>, timeout: Option<Duration>) -> Result<Self, TransportError> {
        let base_url = base_url.into();
        let client = build_client(&base_url, timeout)?;
        Ok(Self {
            base_url,
            timeout,
            client: Mutex::new(client),
        })
    }

    fn client(&self) -> Client {
        // reqwest clients are reference counted, cloning shares the pool and jar
        self.client.lock().clone()
    }

    fn send(&self, path: &str, request: RequestBuilder) -> Result<Response, TransportError> {
        let response = request
            .send()
            .map_err(|e| TransportError::connection(path, e.to_string()))?;
        let status = response.status().as_u16();
        let body = response
            .bytes()
            .map_err(|e| TransportError::connection(path, e.to_string()))?;

        tracing::trace!(path, status, bytes = body.len(), "response received");
        Ok(Response::new(status, body.to_vec()))
    }
}

fn build_client(base_url: &str, timeout: Option<Duration>) -> Result<Client, TransportError> {
    let mut builder = Client::builder().cookie_provider(Arc::new(Jar::default()));
    if let Some(timeout) = timeout {
        builder = builder.timeout(timeout);
    }
    builder
        .build()
        .map_err(|e| TransportError::connection(base_url, e.to_string()))
}

fn with_headers(
    mut request: RequestBuilder,
    headers: &[(&str, &str)],
) -> RequestBuilder {
    for (name, value) in headers {
        request = request.header(*name, *value);
    }
    request
}

impl Transport for HttpTransport {
    fn base_url(&self) -> &str {
        &self.base_url
    }

    fn get(
        &self,
        path: &str,
        params: &[(String, String)],
        headers: &[(&str, &str)],
    ) -> Result<Response, TransportError> {
        let url = join_url(&self.base_url, path);
        tracing::debug!(%url, "GET");
        let request = with_headers(self.client().get(&url).query(params), headers);
        self.send(path, request)
    }

    fn post(
        &self,
        path: &str,
        body: Option<String>,
        headers: &[(&str, &str)],
    ) -> Result<Response, TransportError> {
        let url = join_url(&self.base_url, path);
        tracing::debug!(%url, "POST");
        let request = with_headers(self.client().post(&url).body(body.unwrap_or_default()), headers);
        self.send(path, request)
    }

    fn clear_session(&self) -> Result<(), TransportError> {
        let fresh = build_client(&self.base_url, self.timeout)?;
        *self.client.lock() = fresh;
        tracing::debug!(base_url = %self.base_url, "session cleared");
        Ok(())
    }
}
