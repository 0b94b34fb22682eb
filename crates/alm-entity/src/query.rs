//! Collection query specifications
//!
//! Provides [`QuerySpec`] for describing one request against a collection
//! endpoint: paging, field selection and AND-joined conditions.

use std::fmt::{self, Display, Formatter};

/// Query parameter names
pub mod params {
    //! Query-string keys understood by the collection endpoint

    /// Page size
    pub const PAGE_SIZE: &str = "page-size";
    /// 1-based start index
    pub const START_INDEX: &str = "start-index";
    /// Comma-separated field selection
    pub const FIELDS: &str = "fields";
    /// Condition block
    pub const QUERY: &str = "query";
}

/// Single query condition (`field[expression]`)
///
/// The expression is passed through verbatim, so it can encode an OR set
/// such as `1 OR 2 OR 3`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Condition {
    field: String,
    expression: String,
}

impl Condition {
    /// Create condition
    #[inline]
    #[must_use]
    pub fn new(field: impl Into<String>, expression: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            expression: expression.into(),
        }
    }

    /// Field name
    #[inline]
    #[must_use]
    pub fn field(&self) -> &str {
        &self.field
    }

    /// Condition expression
    #[inline]
    #[must_use]
    pub fn expression(&self) -> &str {
        &self.expression
    }
}

impl Display for Condition {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}[{}]", self.field, self.expression)
    }
}

/// Query against a collection endpoint
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QuerySpec {
    page_size: Option<u64>,
    start_index: Option<u64>,
    fields: Vec<String>,
    conditions: Vec<Condition>,
}

impl QuerySpec {
    /// Create empty query
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With page size
    #[inline]
    #[must_use]
    pub fn with_page_size(mut self, page_size: u64) -> Self {
        self.page_size = Some(page_size);
        self
    }

    /// With 1-based start index
    #[inline]
    #[must_use]
    pub fn with_start_index(mut self, start_index: u64) -> Self {
        self.start_index = Some(start_index);
        self
    }

    /// With one selected field
    #[inline]
    #[must_use]
    pub fn with_field(mut self, field: impl Into<String>) -> Self {
        self.fields.push(field.into());
        self
    }

    /// With selected fields
    #[must_use]
    pub fn with_fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.fields.extend(fields.into_iter().map(Into::into));
        self
    }

    /// With a condition on a field
    #[inline]
    #[must_use]
    pub fn with_condition(mut self, field: impl Into<String>, expression: impl Into<String>) -> Self {
        self.conditions.push(Condition::new(field, expression));
        self
    }

    /// With existing conditions
    #[must_use]
    pub fn with_conditions(mut self, conditions: impl IntoIterator<Item = Condition>) -> Self {
        self.conditions.extend(conditions);
        self
    }

    /// Page size, if set
    #[inline]
    #[must_use]
    pub fn page_size(&self) -> Option<u64> {
        self.page_size
    }

    /// Start index, if set
    #[inline]
    #[must_use]
    pub fn start_index(&self) -> Option<u64> {
        self.start_index
    }

    /// Selected fields
    #[inline]
    #[must_use]
    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    /// Conditions, AND-joined
    #[inline]
    #[must_use]
    pub fn conditions(&self) -> &[Condition] {
        &self.conditions
    }

    /// Query-string parameters in a stable order
    ///
    /// Values are unencoded; the transport is responsible for encoding.
    #[must_use]
    pub fn to_params(&self) -> Vec<(String, String)> {
        let mut out = Vec::with_capacity(4);
        if let Some(size) = self.page_size {
            out.push((params::PAGE_SIZE.to_string(), size.to_string()));
        }
        if let Some(start) = self.start_index {
            out.push((params::START_INDEX.to_string(), start.to_string()));
        }
        if !self.fields.is_empty() {
            out.push((params::FIELDS.to_string(), self.fields.join(",")));
        }
        if !self.conditions.is_empty() {
            let joined: Vec<String> = self.conditions.iter().map(ToString::to_string).collect();
            out.push((params::QUERY.to_string(), format!("{{{}}}", joined.join(";"))));
        }
        out
    }

    /// Render as an unencoded query string
    #[must_use]
    pub fn build(&self) -> String {
        self.to_params()
            .into_iter()
            .map(|(k, v)| format!("{k}={v}"))
            .collect::<Vec<_>>()
            .join("&")
    }
}

impl Display for QuerySpec {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.build())
    }
}
