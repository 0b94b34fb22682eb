//! Testing utilities for the ALM workspace
//!
//! Scripted transport and wire-JSON fixtures.

#![allow(missing_docs)]

use alm_client::{Response, Transport};
use alm_entity::{ProjectContext, TransportError};
use parking_lot::Mutex;
use serde_json::{json, Value};
use std::collections::VecDeque;

pub const BASE_URL: &str = "http://alm.test:8080/qcbin";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedRequest {
    pub method: Method,
    pub path: String,
    pub params: Vec<(String, String)>,
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
}

impl RecordedRequest {
    pub fn param(&self, key: &str) -> Option<&str> {
        self.params.iter().find(|(k, _)| k == key).map(|(_, v)| v.as_str())
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.iter().find(|(k, _)| k == name).map(|(_, v)| v.as_str())
    }
}

/// Transport answering from a queue of scripted responses
///
/// Every request is recorded. Running out of responses is reported as a
/// connection error.
#[derive(Debug)]
pub struct FakeTransport {
    base_url: String,
    responses: Mutex<VecDeque<Response>>,
    requests: Mutex<Vec<RecordedRequest>>,
    session_clears: Mutex<usize>,
}

impl Default for FakeTransport {
    fn default() -> Self {
        Self::new(BASE_URL)
    }
}

impl FakeTransport {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.to_string(),
            responses: Mutex::new(VecDeque::new()),
            requests: Mutex::new(Vec::new()),
            session_clears: Mutex::new(0),
        }
    }

    pub fn respond(self, status: u16, body: impl Into<Vec<u8>>) -> Self {
        self.push(status, body);
        self
    }

    pub fn push(&self, status: u16, body: impl Into<Vec<u8>>) {
        self.responses.lock().push_back(Response::new(status, body));
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().clone()
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().len()
    }

    pub fn session_clears(&self) -> usize {
        *self.session_clears.lock()
    }

    pub fn pending(&self) -> usize {
        self.responses.lock().len()
    }

    fn answer(
        &self,
        method: Method,
        path: &str,
        params: &[(String, String)],
        headers: &[(&str, &str)],
        body: Option<String>,
    ) -> Result<Response, TransportError> {
        self.requests.lock().push(RecordedRequest {
            method,
            path: path.to_string(),
            params: params.to_vec(),
            headers: headers.iter().map(|(k, v)| ((*k).to_string(), (*v).to_string())).collect(),
            body,
        });
        self.responses
            .lock()
            .pop_front()
            .ok_or_else(|| TransportError::connection(path, "no scripted response"))
    }
}

impl Transport for FakeTransport {
    fn base_url(&self) -> &str {
        &self.base_url
    }

    fn get(
        &self,
        path: &str,
        params: &[(String, String)],
        headers: &[(&str, &str)],
    ) -> Result<Response, TransportError> {
        self.answer(Method::Get, path, params, headers, None)
    }

    fn post(
        &self,
        path: &str,
        body: Option<String>,
        headers: &[(&str, &str)],
    ) -> Result<Response, TransportError> {
        self.answer(Method::Post, path, &[], headers, body)
    }

    fn clear_session(&self) -> Result<(), TransportError> {
        *self.session_clears.lock() += 1;
        Ok(())
    }
}

pub fn test_context() -> ProjectContext {
    ProjectContext::new("DEFAULT", "demo")
}

/// One wire entity; `None` values become an empty `values` array
pub fn entity_json(type_name: &str, fields: &[(&str, Option<&str>)]) -> Value {
    let fields: Vec<Value> = fields
        .iter()
        .map(|(name, value)| match value {
            Some(v) => json!({"Name": name, "values": [{"value": v}]}),
            None => json!({"Name": name, "values": []}),
        })
        .collect();
    json!({"Type": type_name, "Fields": fields})
}

pub fn page_body(total: u64, entities: Vec<Value>) -> String {
    json!({"TotalResults": total, "entities": entities}).to_string()
}

/// Page of `type_name` entities carrying only ids
pub fn id_page(total: u64, type_name: &str, ids: impl IntoIterator<Item = u64>) -> String {
    let entities = ids
        .into_iter()
        .map(|id| entity_json(type_name, &[("id", Some(id.to_string().as_str()))]))
        .collect();
    page_body(total, entities)
}

pub fn error_document(title: &str) -> String {
    json!({"Id": "qccore.general-error", "Title": title}).to_string()
}
