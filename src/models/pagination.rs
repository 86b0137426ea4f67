//! Paging primitives for the appointments table.

use serde::{Deserialize, Serialize};

/// Page selection for the appointments table.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct Pagination {
    pub page: Option<usize>,
    pub per_page: Option<usize>,
}

impl Pagination {
    /// Maximum rows per page.
    const MAX_PER_PAGE: usize = 200;

    /// Default rows per page.
    const DEFAULT_PER_PAGE: usize = 50;

    pub fn new(page: usize, per_page: usize) -> Self {
        Self {
            page: Some(page),
            per_page: Some(per_page),
        }
    }

    pub fn limit(&self) -> usize {
        self.per_page
            .unwrap_or(Self::DEFAULT_PER_PAGE)
            .clamp(1, Self::MAX_PER_PAGE)
    }

    pub fn offset(&self) -> usize {
        // Saturates so an absurd page number yields an empty page.
        (self.current_page() - 1).saturating_mul(self.limit())
    }

    pub fn current_page(&self) -> usize {
        self.page.unwrap_or(1).max(1)
    }
}

/// One page of rows plus enough context to render the pager.
#[derive(Debug, Clone, Serialize)]
pub struct PagedResult<T: Serialize> {
    pub items: Vec<T>,
    pub total: usize,
    pub page: usize,
    pub per_page: usize,
    pub total_pages: usize,
}

impl<T: Serialize + Clone> PagedResult<T> {
    /// Cut the requested page out of an already filtered and sorted slice.
    pub fn from_slice(rows: &[T], pagination: &Pagination) -> Self {
        let per_page = pagination.limit();
        let total = rows.len();
        let items = rows
            .iter()
            .skip(pagination.offset())
            .take(per_page)
            .cloned()
            .collect();
        Self {
            items,
            total,
            page: pagination.current_page(),
            per_page,
            total_pages: total.div_ceil(per_page),
        }
    }
}
