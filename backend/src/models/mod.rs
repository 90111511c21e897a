//! Data models shared across persistence, the lifecycle service and API handlers.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Page request after defaults and clamping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: i64,
    pub page_size: i64,
}

pub const DEFAULT_PAGE_SIZE: i64 = 20;
pub const MAX_PAGE_SIZE: i64 = 100;

impl PageRequest {
    /// Page defaults to 1 (floored at 1), size to 20 (clamped to 1..=100).
    pub fn new(page: Option<i64>, page_size: Option<i64>) -> Self {
        Self {
            page: page.unwrap_or(1).max(1),
            page_size: page_size
                .unwrap_or(DEFAULT_PAGE_SIZE)
                .clamp(1, MAX_PAGE_SIZE),
        }
    }

    pub fn limit(&self) -> i64 {
        self.page_size
    }

    /// Saturates instead of overflowing for absurd page numbers.
    pub fn offset(&self) -> i64 {
        (self.page - 1).saturating_mul(self.page_size)
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::new(None, None)
    }
}

/// Wrapper for paginated API responses.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PaginatedResponse<T: Serialize> {
    pub items: Vec<T>,
    /// Total number of records matching the query.
    pub total: i64,
    pub total_pages: i64,
    pub page: i64,
    pub page_size: i64,
}

impl<T: Serialize> PaginatedResponse<T> {
    pub fn new(items: Vec<T>, total: i64, page: PageRequest) -> Self {
        let total = total.max(0);
        Self {
            items,
            total,
            total_pages: (total + page.page_size - 1) / page.page_size,
            page: page.page,
            page_size: page.page_size,
        }
    }
}

pub mod account;
pub mod caller;
pub mod lifecycle;
pub mod status_log;
