//! Full-collection pagination
//!
//! Provides [`Paginator`], which walks every page of a collection query.
//! The number of pages is planned once from the first page's total; totals
//! reported by later pages are not used to re-plan, so a collection that
//! grows or shrinks during the walk is under- or over-fetched.

use crate::collection::EntityCollection;
use crate::entity::Entity;
use crate::error::AlmResult;
use crate::query::QuerySpec;
use std::num::NonZeroU64;

/// Default number of entities requested per page
pub const DEFAULT_PAGE_SIZE: u64 = 1000;

const DEFAULT_PAGE_SIZE_NONZERO: NonZeroU64 = match NonZeroU64::new(DEFAULT_PAGE_SIZE) {
    Some(size) => size,
    None => panic!("default page size must be non-zero"),
};

/// Number of pages needed for `total` items
///
/// # Panics
/// Panics if `page_size` is zero.
#[must_use]
pub const fn page_count(total: u64, page_size: u64) -> u64 {
    let mut pages = total / page_size;
    if total % page_size > 0 {
        pages += 1;
    }
    pages
}

/// 1-based start index of a 1-based page
#[inline]
#[must_use]
pub const fn start_index(page_index: u64, page_size: u64) -> u64 {
    (page_index - 1) * page_size + 1
}

/// Sequential page walker
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Paginator {
    page_size: NonZeroU64,
}

impl Default for Paginator {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE_NONZERO,
        }
    }
}

impl Paginator {
    /// Create paginator with a page size
    #[inline]
    #[must_use]
    pub fn new(page_size: NonZeroU64) -> Self {
        Self { page_size }
    }

    /// Configured page size
    #[inline]
    #[must_use]
    pub fn page_size(&self) -> u64 {
        self.page_size.get()
    }

    /// Query for one page, derived from the caller's base query
    #[must_use]
    pub fn page_query(&self, base: &QuerySpec, page_index: u64) -> QuerySpec {
        let size = self.page_size();
        base.clone()
            .with_page_size(size)
            .with_start_index(start_index(page_index, size))
    }

    /// Fetch every page and concatenate the entities in page order
    ///
    /// `fetch` is called once per page, strictly in sequence.
    ///
    /// # Errors
    /// The first error returned by `fetch` aborts the walk and is returned as is.
    pub fn fetch_all<F>(&self, base: &QuerySpec, mut fetch: F) -> AlmResult<Vec<Entity>>
    where
        F: FnMut(&QuerySpec) -> AlmResult<EntityCollection>,
    {
        let first = fetch(&self.page_query(base, 1))?;
        let total = first.total();
        let pages = page_count(total, self.page_size());
        tracing::debug!(total, pages, page_size = self.page_size(), "planned page walk");

        let mut entities = first.into_entities();
        for page_index in 2..=pages {
            let page = fetch(&self.page_query(base, page_index))?;
            if page.total() != total {
                tracing::debug!(
                    page_index,
                    planned_total = total,
                    reported_total = page.total(),
                    "total changed during page walk, keeping original plan"
                );
            }
            entities.extend(page.into_entities());
        }

        Ok(entities)
    }
}
