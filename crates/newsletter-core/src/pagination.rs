//! Offset pagination for the post list.

use serde::Serialize;

/// Posts shown per list page.
pub const POSTS_PER_PAGE: u64 = 10;

/// A 1-based page request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u64,
    pub per_page: u64,
}

impl PageRequest {
    pub fn new(page: u64, per_page: u64) -> Self {
        Self { page, per_page }
    }

    /// Number of items to skip. Saturates instead of overflowing.
    pub fn offset(&self) -> u64 {
        self.page.saturating_sub(1).saturating_mul(self.per_page)
    }

    /// Whether every item up to the end of this page has a `u64` position.
    /// Pages beyond that cannot hold anything.
    pub fn is_addressable(&self) -> bool {
        self.page.checked_mul(self.per_page).is_some()
    }
}

/// One page of results plus what a pagination widget needs.
#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: u64,
    pub per_page: u64,
    pub total_items: u64,
}

impl<T> Page<T> {
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Always at least one, so an empty list still has a first page.
    pub fn num_pages(&self) -> u64 {
        if self.per_page == 0 {
            return 1;
        }
        self.total_items.div_ceil(self.per_page).max(1)
    }

    pub fn has_previous(&self) -> bool {
        self.page > 1
    }

    pub fn has_next(&self) -> bool {
        self.page < self.num_pages()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(page: u64, total_items: u64) -> Page<()> {
        Page {
            items: Vec::new(),
            page,
            per_page: POSTS_PER_PAGE,
            total_items,
        }
    }

    #[test]
    fn test_empty_list_has_one_page() {
        let p = page(1, 0);
        assert_eq!(p.num_pages(), 1);
        assert!(!p.has_next());
        assert!(!p.has_previous());
    }

    #[test]
    fn test_partial_last_page() {
        let p = page(2, 21);
        assert_eq!(p.num_pages(), 3);
        assert!(p.has_next());
        assert!(p.has_previous());
    }

    #[test]
    fn test_offset() {
        assert_eq!(PageRequest::new(1, 10).offset(), 0);
        assert_eq!(PageRequest::new(3, 10).offset(), 20);
    }

    #[test]
    fn test_huge_page_saturates() {
        let request = PageRequest::new(u64::MAX, POSTS_PER_PAGE);
        assert_eq!(request.offset(), u64::MAX);
        assert!(!request.is_addressable());
        assert!(PageRequest::new(u64::MAX / POSTS_PER_PAGE, POSTS_PER_PAGE).is_addressable());
    }
}
