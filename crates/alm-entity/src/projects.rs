//! Project-listing parsing
//!
//! The domain projects endpoint answers in one of two shapes:
//! `{"Project": [...]}` or `{"Projects": {"Project": [...] | {...}}}`.

use crate::error::{AlmError, AlmResult};
use serde_json::Value;

/// Parse a project-listing response into project names
///
/// # Errors
/// Returns [`AlmError::MalformedResponse`] if neither shape matches or a
/// project lacks a string `Name`.
pub fn parse_projects(body: impl AsRef<[u8]>) -> AlmResult<Vec<String>> {
    let root: Value = serde_json::from_slice(body.as_ref())
        .map_err(|e| AlmError::malformed(format!("project list: {e}")))?;

    let listing = if let Some(projects) = root.get("Project") {
        projects
    } else {
        match root.get("Projects") {
            // a domain without projects has an empty container
            Some(container) => match container.get("Project") {
                Some(projects) => projects,
                None => return Ok(Vec::new()),
            },
            None => return Err(AlmError::malformed("project list has neither 'Project' nor 'Projects'")),
        }
    };

    match listing {
        Value::Array(items) => items.iter().map(project_name).collect(),
        single @ Value::Object(_) => Ok(vec![project_name(single)?]),
        _ => Err(AlmError::malformed("'Project' is neither a list nor an object")),
    }
}

fn project_name(project: &Value) -> AlmResult<String> {
    project
        .get("Name")
        .and_then(Value::as_str)
        .map(ToString::to_string)
        .ok_or_else(|| AlmError::malformed("project without a 'Name'"))
}
