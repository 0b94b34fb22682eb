//! Identifier-batched retrieval
//!
//! The server bounds how long a query condition may be, so large id sets are
//! split into batches and each batch is fetched with a single `id[a OR b]`
//! condition. Ids must be numeric so they cannot alter that condition.

use crate::collection::EntityCollection;
use crate::entity::{fields, Entity};
use crate::error::{AlmError, AlmResult};
use crate::query::QuerySpec;
use indexmap::IndexSet;
use std::num::NonZeroUsize;

/// Default number of ids per batch
pub const DEFAULT_BATCH_SIZE: usize = 200;

const DEFAULT_BATCH_SIZE_NONZERO: NonZeroUsize = match NonZeroUsize::new(DEFAULT_BATCH_SIZE) {
    Some(size) => size,
    None => panic!("default batch size must be non-zero"),
};

/// Resolves entities by id, one request per batch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchResolver {
    batch_size: NonZeroUsize,
}

impl Default for BatchResolver {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE_NONZERO,
        }
    }
}

impl BatchResolver {
    /// Create resolver with a batch size
    #[inline]
    #[must_use]
    pub fn new(batch_size: NonZeroUsize) -> Self {
        Self { batch_size }
    }

    /// Configured batch size
    #[inline]
    #[must_use]
    pub fn batch_size(&self) -> usize {
        self.batch_size.get()
    }

    /// Query for one batch of ids
    ///
    /// The page size is pinned to the batch length so one page always holds
    /// the whole batch.
    #[must_use]
    pub fn batch_query(&self, ids: &[String], fields: &[String]) -> QuerySpec {
        QuerySpec::new()
            .with_condition(fields::ID, ids.join(" OR "))
            .with_fields(fields.iter().cloned())
            .with_page_size(ids.len() as u64)
    }

    /// Fetch entities for every id, batch by batch
    ///
    /// `ids` is treated as a set: repeated ids are dropped, keeping the first
    /// occurrence, so `n` distinct ids issue exactly `ceil(n / batch_size)`
    /// requests. Results are concatenated in batch order. An empty id set
    /// issues no request.
    ///
    /// # Errors
    /// - [`AlmError::InvalidId`] if any id is not a non-empty run of ASCII
    ///   digits; no request is issued then
    /// - the first error returned by `fetch`, which aborts the lookup
    pub fn fetch_by_ids<I, S, F>(&self, ids: I, fields: &[String], mut fetch: F) -> AlmResult<Vec<Entity>>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
        F: FnMut(&QuerySpec) -> AlmResult<EntityCollection>,
    {
        let ids = distinct_ids(ids)?;
        let mut entities = Vec::new();

        for (index, batch) in ids.chunks(self.batch_size()).enumerate() {
            tracing::debug!(batch = index + 1, ids = batch.len(), "fetching id batch");
            let page = fetch(&self.batch_query(batch, fields))?;
            entities.extend(page.into_entities());
        }

        Ok(entities)
    }
}

fn distinct_ids<I, S>(ids: I) -> AlmResult<Vec<String>>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let mut distinct = IndexSet::new();
    for id in ids {
        let id: String = id.into();
        if id.is_empty() || !id.bytes().all(|b| b.is_ascii_digit()) {
            return Err(AlmError::InvalidId(id));
        }
        distinct.insert(id);
    }
    Ok(distinct.into_iter().collect())
}
