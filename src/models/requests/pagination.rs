//! Page arithmetic shared by list endpoints.

use crate::constants::{DEFAULT_PAGE_NUMBER, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub page: u64,
    pub page_size: u64,
}

impl Pagination {
    /// Page starts at 1; size is clamped to `1..=MAX_PAGE_SIZE`.
    pub fn new(page: Option<u64>, page_size: Option<u64>) -> Self {
        Self {
            page: page.unwrap_or(DEFAULT_PAGE_NUMBER).max(1),
            page_size: page_size.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE),
        }
    }

    pub fn limit(&self) -> i64 {
        self.page_size as i64
    }

    /// Saturates at `i64::MAX` for absurd page numbers; such pages are simply empty.
    pub fn offset(&self) -> i64 {
        let rows = (self.page - 1).saturating_mul(self.page_size);
        i64::try_from(rows).unwrap_or(i64::MAX)
    }

    pub fn total_pages(&self, total: u64) -> u64 {
        total.div_ceil(self.page_size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_and_clamping() {
        let p = Pagination::new(None, None);
        assert_eq!((p.page, p.page_size), (1, 20));

        let p = Pagination::new(Some(0), Some(1000));
        assert_eq!((p.page, p.page_size), (1, 100));

        let p = Pagination::new(Some(3), Some(0));
        assert_eq!(p.page_size, 1);
    }

    #[test]
    fn test_offset_and_pages() {
        let p = Pagination::new(Some(3), Some(20));
        assert_eq!(p.offset(), 40);
        assert_eq!(p.limit(), 20);
        assert_eq!(p.total_pages(41), 3);
        assert_eq!(p.total_pages(0), 0);
    }

    #[test]
    fn test_huge_page_saturates_offset() {
        let p = Pagination::new(Some(u64::MAX), Some(100));
        assert_eq!(p.offset(), i64::MAX);

        let p = Pagination::new(Some(u64::MAX / 100), Some(100));
        assert_eq!(p.offset(), i64::MAX);
    }
}
