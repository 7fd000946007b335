//! Pagination parameters and the response envelope.

use serde::{Deserialize, Serialize};

/// Hard cap on page size across every list endpoint.
pub const MAX_PAGE_LIMIT: i64 = 100;

/// Default page size when the caller omits `limit`.
pub const DEFAULT_PAGE_LIMIT: i64 = 10;

/// Query-string pagination parameters, clamped into valid bounds.
///
/// Endpoints with extra query filters carry `page`/`limit` inline and build
/// this with [`PageParams::new`]: `serde_urlencoded` cannot deserialize
/// numeric fields through `#[serde(flatten)]`.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct PageParams {
    #[serde(default)]
    pub page: Option<i64>,
    #[serde(default)]
    pub limit: Option<i64>,
}

impl PageParams {
    pub fn new(page: Option<i64>, limit: Option<i64>) -> Self {
        Self { page, limit }
    }

    /// Effective page number (1-based).
    pub fn page(&self) -> i64 {
        self.page.unwrap_or(1).max(1)
    }

    /// Effective page size, clamped to `1..=MAX_PAGE_LIMIT`.
    pub fn limit(&self) -> i64 {
        self.limit
            .unwrap_or(DEFAULT_PAGE_LIMIT)
            .clamp(1, MAX_PAGE_LIMIT)
    }

    /// Row offset for the effective page.
    pub fn offset(&self) -> i64 {
        (self.page() - 1) * self.limit()
    }
}

/// Pagination metadata returned alongside every list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pagination {
    pub page: i64,
    pub limit: i64,
    pub total: i64,
    pub total_pages: i64,
}

impl Pagination {
    /// Build the envelope for a page of `total` rows.
    pub fn new(params: &PageParams, total: i64) -> Self {
        let limit = params.limit();
        Self {
            page: params.page(),
            limit,
            total,
            total_pages: (total + limit - 1) / limit,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let params = PageParams::default();
        assert_eq!(params.page(), 1);
        assert_eq!(params.limit(), DEFAULT_PAGE_LIMIT);
        assert_eq!(params.offset(), 0);
    }

    #[test]
    fn test_limit_clamped_to_bounds() {
        let params = PageParams { page: Some(1), limit: Some(500) };
        assert_eq!(params.limit(), MAX_PAGE_LIMIT);

        let params = PageParams { page: Some(1), limit: Some(0) };
        assert_eq!(params.limit(), 1);
    }

    #[test]
    fn test_page_floor_is_one() {
        let params = PageParams { page: Some(-3), limit: None };
        assert_eq!(params.page(), 1);
        assert_eq!(params.offset(), 0);
    }

    #[test]
    fn test_total_pages_rounds_up() {
        let params = PageParams { page: Some(2), limit: Some(10) };
        let pagination = Pagination::new(&params, 25);
        assert_eq!(pagination.total_pages, 3);
        assert_eq!(pagination.page, 2);

        let empty = Pagination::new(&params, 0);
        assert_eq!(empty.total_pages, 0);
    }
}
