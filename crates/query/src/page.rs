use serde::Serialize;

use crate::params::AppliedFilters;

/// Pagination metadata for one page of results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub current_page: usize,
    pub total_pages: usize,
    pub total_items: usize,
    pub items_per_page: usize,
    pub has_next_page: bool,
    pub has_prev_page: bool,
}

impl Pagination {
    /// `page` is 1-based and `per_page` must be positive.
    pub fn new(page: usize, per_page: usize, total_items: usize) -> Self {
        let total_pages = total_items.div_ceil(per_page);
        Self {
            current_page: page,
            total_pages,
            total_items,
            items_per_page: per_page,
            has_next_page: page < total_pages,
            has_prev_page: page > 1 && total_items > 0,
        }
    }

    /// Number of matches skipped before this page.
    pub fn offset(page: usize, per_page: usize) -> usize {
        page.saturating_sub(1).saturating_mul(per_page)
    }
}

/// One page of a listing.
#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    pub users: Vec<T>,
    pub pagination: Pagination,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filters: Option<AppliedFilters>,
}

impl<T> Page<T> {
    /// Converts each item, keeping the metadata.
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            users: self.users.into_iter().map(f).collect(),
            pagination: self.pagination,
            filters: self.filters,
        }
    }
}
