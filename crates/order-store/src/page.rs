use serde::Serialize;

use crate::{Result, StoreError};

/// A request for one page of an owner's orders.
///
/// Pages are zero-based. `size` must be at least one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    /// Zero-based page index.
    pub page: u32,

    /// Maximum number of items on the page.
    pub size: u32,
}

impl PageRequest {
    /// Creates a page request.
    pub fn new(page: u32, size: u32) -> Self {
        Self { page, size }
    }

    /// Creates a request for the first page of the given size.
    pub fn first(size: u32) -> Self {
        Self { page: 0, size }
    }

    /// Checks the request can be served.
    pub fn validate(&self) -> Result<()> {
        if self.size == 0 {
            return Err(StoreError::Validation(
                "Page size must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Number of items to skip before this page.
    pub fn offset(&self) -> u64 {
        u64::from(self.page) * u64::from(self.size)
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::first(20)
    }
}

/// One page of results along with the totals needed to navigate the rest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Page<T> {
    /// Items on this page, in store order.
    pub items: Vec<T>,

    /// Zero-based index of this page.
    pub page: u32,

    /// Page size that was requested.
    pub size: u32,

    /// Number of items across all pages.
    pub total_items: u64,

    /// Number of pages at this page size.
    pub total_pages: u64,
}

impl<T> Page<T> {
    /// Creates a page for `request` holding `items` out of `total_items`.
    pub fn new(items: Vec<T>, request: PageRequest, total_items: u64) -> Self {
        let total_pages = if request.size == 0 {
            0
        } else {
            total_items.div_ceil(u64::from(request.size))
        };

        Self {
            items,
            page: request.page,
            size: request.size,
            total_items,
            total_pages,
        }
    }

    /// Returns true if there are more pages after this one.
    pub fn has_next(&self) -> bool {
        u64::from(self.page) + 1 < self.total_pages
    }

    /// Maps the items on the page, keeping the paging metadata.
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            page: self.page,
            size: self.size,
            total_items: self.total_items,
            total_pages: self.total_pages,
        }
    }
}
