//! Pagination types for list queries.

use serde::{Deserialize, Serialize};

use crate::types::sorting::SortField;

/// Default page size.
const DEFAULT_LIMIT: u64 = 25;
/// Maximum page size.
const MAX_LIMIT: u64 = 100;

/// Request parameters for paginated queries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaginationQuery {
    /// Page number (1-based).
    #[serde(default = "default_page")]
    pub page: u64,
    /// Number of items per page.
    #[serde(default = "default_limit")]
    pub limit: u64,
    /// When false every matching item is returned in a single page.
    #[serde(default = "default_paginate")]
    pub paginate: bool,
    /// Optional ordering. Unsorted queries return rows in insertion order.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sort: Option<SortField>,
}

impl PaginationQuery {
    /// Create a new page request, clamping out-of-range values.
    pub fn new(page: u64, limit: u64) -> Self {
        Self {
            page: page.max(1),
            limit: limit.clamp(1, MAX_LIMIT),
            paginate: true,
            sort: None,
        }
    }

    /// A query returning every matching item.
    pub fn unpaginated() -> Self {
        Self {
            paginate: false,
            ..Self::default()
        }
    }

    /// Attach an ordering.
    pub fn with_sort(mut self, sort: SortField) -> Self {
        self.sort = Some(sort);
        self
    }

    /// Re-apply the bounds to a query that came in through deserialization.
    pub fn normalized(&self) -> Self {
        Self {
            sort: self.sort.clone(),
            paginate: self.paginate,
            ..Self::new(self.page, self.limit)
        }
    }

    /// Number of rows to skip. Saturates for page numbers past `u64::MAX / limit`.
    pub fn offset(&self) -> u64 {
        self.page.saturating_sub(1).saturating_mul(self.limit)
    }

    /// `(offset, limit)` to apply, or `None` when not paginating.
    pub fn window(&self) -> Option<(u64, u64)> {
        self.paginate.then(|| (self.offset(), self.limit))
    }
}

impl Default for PaginationQuery {
    fn default() -> Self {
        Self {
            page: default_page(),
            limit: default_limit(),
            paginate: default_paginate(),
            sort: None,
        }
    }
}

/// Paginated result envelope, returned even for unpaginated queries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginationResult<T> {
    /// The items on this page.
    pub items: Vec<T>,
    /// Total number of matching items across all pages.
    pub total_items: u64,
    /// Current page number (1-based).
    pub current_page: u64,
    /// Total number of pages.
    pub total_pages: u64,
}

impl<T> PaginationResult<T> {
    /// Build the envelope for `items` fetched with `query`.
    ///
    /// Unpaginated results report a single page (none when empty).
    pub fn new(items: Vec<T>, query: &PaginationQuery, total_items: u64) -> Self {
        let (current_page, total_pages) = if query.paginate {
            (query.page, total_items.div_ceil(query.limit))
        } else {
            (1, u64::from(total_items > 0))
        };
        Self {
            items,
            total_items,
            current_page,
            total_pages,
        }
    }

    /// Whether a later page exists.
    pub fn has_next(&self) -> bool {
        self.current_page < self.total_pages
    }

    /// Transform every item, keeping the envelope.
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> PaginationResult<U> {
        PaginationResult {
            items: self.items.into_iter().map(f).collect(),
            total_items: self.total_items,
            current_page: self.current_page,
            total_pages: self.total_pages,
        }
    }
}

fn default_page() -> u64 {
    1
}

fn default_limit() -> u64 {
    DEFAULT_LIMIT
}

fn default_paginate() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bounds_are_clamped() {
        let q = PaginationQuery::new(0, 1000);
        assert_eq!(q.page, 1);
        assert_eq!(q.limit, MAX_LIMIT);
        assert_eq!(PaginationQuery::new(3, 0).limit, 1);
    }

    #[test]
    fn test_window() {
        let q = PaginationQuery::new(2, 5);
        assert_eq!(q.window(), Some((5, 5)));
        assert_eq!(PaginationQuery::unpaginated().window(), None);
    }

    #[test]
    fn test_huge_page_offset_saturates() {
        let q = PaginationQuery::new(u64::MAX, 5);
        assert_eq!(q.offset(), u64::MAX);
        assert_eq!(q.window(), Some((u64::MAX, 5)));
    }

    #[test]
    fn test_total_pages_rounds_up() {
        let q = PaginationQuery::new(2, 5);
        let page = PaginationResult::new(vec![6, 7, 8, 9, 10], &q, 15);
        assert_eq!(page.total_pages, 3);
        assert_eq!(page.current_page, 2);
        assert!(page.has_next());

        let page = PaginationResult::new(Vec::<u8>::new(), &PaginationQuery::new(1, 5), 11);
        assert_eq!(page.total_pages, 3);
    }

    #[test]
    fn test_empty_result_has_no_pages() {
        let page = PaginationResult::new(Vec::<u8>::new(), &PaginationQuery::default(), 0);
        assert_eq!(page.total_pages, 0);
        assert_eq!(page.current_page, 1);
        assert!(!page.has_next());
    }

    #[test]
    fn test_unpaginated_is_single_page() {
        let page = PaginationResult::new(vec![1, 2, 3], &PaginationQuery::unpaginated(), 3);
        assert_eq!(page.total_pages, 1);
        assert_eq!(page.current_page, 1);
    }

    #[test]
    fn test_serializes_camel_case() {
        let page = PaginationResult::new(vec![1], &PaginationQuery::default(), 1);
        let json = serde_json::to_value(&page).unwrap();
        assert_eq!(json["totalItems"], 1);
        assert_eq!(json["currentPage"], 1);
        assert_eq!(json["totalPages"], 1);
    }

    #[test]
    fn test_deserialize_defaults() {
        let q: PaginationQuery = serde_json::from_str("{}").unwrap();
        assert_eq!(q, PaginationQuery::default());
        let q: PaginationQuery = serde_json::from_str(r#"{"page":0,"limit":500}"#).unwrap();
        assert_eq!(q.normalized(), PaginationQuery::new(1, 100));
    }
}
