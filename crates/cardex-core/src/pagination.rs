//! Pagination window math and page metadata

use crate::limits::{DEFAULT_LIST_LIMIT, MAX_PAGE_SIZE};
use serde::{Deserialize, Serialize};

/// A bounded window into a filtered result set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    pub limit: usize,
    pub offset: usize,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            limit: DEFAULT_LIST_LIMIT,
            offset: 0,
        }
    }
}

impl PageRequest {
    /// Window from a 1-based page number. Pages below 1 are treated as page
    /// 1; a non-positive limit falls back to `default_limit`.
    pub fn from_page(page: i64, limit: i64, default_limit: usize) -> Self {
        let limit = normalize_limit(limit, default_limit);
        let page = page.max(1) as usize;
        Self {
            limit,
            offset: (page - 1) * limit,
        }
    }

    /// Window from a raw offset. Negative offsets clamp to zero.
    pub fn from_offset(offset: i64, limit: i64, default_limit: usize) -> Self {
        Self {
            limit: normalize_limit(limit, default_limit),
            offset: offset.max(0) as usize,
        }
    }

    /// 1-based page number of this window.
    pub fn page(&self) -> usize {
        self.offset / self.limit.max(1) + 1
    }
}

fn normalize_limit(limit: i64, default_limit: usize) -> usize {
    if limit <= 0 {
        default_limit
    } else {
        (limit as usize).min(MAX_PAGE_SIZE)
    }
}

/// Metadata describing a full filtered result set relative to one window.
/// The total must come from a count pass over the same predicates as the
/// row pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageMeta {
    pub total: usize,
    pub limit: usize,
    pub offset: usize,
    pub pages: usize,
}

impl PageMeta {
    /// `pages` is the ceiling of `total / limit`; a zero total yields zero
    /// pages.
    pub fn new(total: usize, window: PageRequest) -> Self {
        Self {
            total,
            limit: window.limit,
            offset: window.offset,
            pages: total.div_ceil(window.limit.max(1)),
        }
    }

    /// 1-based page number of the described window.
    pub fn page(&self) -> usize {
        self.offset / self.limit.max(1) + 1
    }

    pub fn has_more(&self) -> bool {
        self.offset + self.limit < self.total
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pages_is_ceiling() {
        let meta = PageMeta::new(35, PageRequest { limit: 10, offset: 10 });
        assert_eq!(meta.pages, 4);
        assert_eq!(meta.page(), 2);
        assert!(meta.has_more());

        let exact = PageMeta::new(30, PageRequest { limit: 10, offset: 20 });
        assert_eq!(exact.pages, 3);
        assert!(!exact.has_more());
    }

    #[test]
    fn test_zero_total_zero_pages() {
        let meta = PageMeta::new(0, PageRequest::default());
        assert_eq!(meta.pages, 0);
        assert_eq!(meta.page(), 1);
        assert!(!meta.has_more());
    }

    #[test]
    fn test_from_page_clamps() {
        let window = PageRequest::from_page(3, 10, 50);
        assert_eq!(window.offset, 20);
        assert_eq!(window.limit, 10);

        // Page below 1 is page 1, never a negative offset.
        assert_eq!(PageRequest::from_page(0, 10, 50).offset, 0);
        assert_eq!(PageRequest::from_page(-4, 10, 50).offset, 0);
    }

    #[test]
    fn test_limit_defaults_and_cap() {
        assert_eq!(PageRequest::from_page(1, 0, 60).limit, 60);
        assert_eq!(PageRequest::from_page(1, -5, 50).limit, 50);
        assert_eq!(PageRequest::from_page(1, 100_000, 50).limit, MAX_PAGE_SIZE);
        assert_eq!(PageRequest::from_offset(-3, 25, 50).offset, 0);
    }
}
