//! Pagination Metadata
//!
//! Every listing endpoint returns this block next to its data page.

use serde::{Deserialize, Serialize};

/// Pagination metadata for a listing response
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub total: u64,
    pub page: u32,
    pub limit: u32,
    pub total_pages: u32,
    pub has_next: bool,
    pub has_prev: bool,
}

impl Pagination {
    /// Build metadata for `total` rows viewed through `page`/`limit`.
    ///
    /// Zero `page`/`limit` are clamped to 1, matching what the query
    /// layer actually serves. A page past the last one is valid and
    /// simply has no rows; `has_prev` stays true so clients can
    /// navigate back.
    pub fn new(total: u64, page: u32, limit: u32) -> Self {
        let page = page.max(1);
        let limit = limit.max(1);
        let total_pages = (total as f64 / limit as f64).ceil() as u32;
        Self {
            total,
            page,
            limit,
            total_pages,
            has_next: page < total_pages,
            has_prev: page > 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_multiple_of_limit() {
        let p = Pagination::new(20, 1, 10);
        assert_eq!(p.total_pages, 2);
        assert!(p.has_next);
        assert!(!p.has_prev);
    }

    #[test]
    fn partial_last_page() {
        let p = Pagination::new(15, 2, 10);
        assert_eq!(p.total_pages, 2);
        assert!(!p.has_next);
        assert!(p.has_prev);
    }

    #[test]
    fn page_beyond_total_pages() {
        let p = Pagination::new(15, 5, 10);
        assert_eq!(p.total_pages, 2);
        assert!(!p.has_next);
        assert!(p.has_prev);
    }

    #[test]
    fn zero_page_and_limit_are_clamped() {
        let p = Pagination::new(15, 0, 0);
        assert_eq!(p.page, 1);
        assert_eq!(p.limit, 1);
        assert_eq!(p.total_pages, 15);
        assert!(p.has_next);
        assert!(!p.has_prev);

        let p = Pagination::new(15, 1, 0);
        assert_eq!(p.limit, 1);
        assert_eq!(p.total_pages, 15);
    }

    #[test]
    fn empty_result_set() {
        let p = Pagination::new(0, 1, 10);
        assert_eq!(p.total_pages, 0);
        assert!(!p.has_next);
        assert!(!p.has_prev);
    }
}
