#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: i64,
    pub limit: i64,
}

impl PageRequest {
    pub const DEFAULT_LIMIT: i64 = 10;
    pub const MAX_LIMIT: i64 = 100;

    /// Pages are 1-based; out of range values are clamped rather than rejected.
    pub fn new(page: Option<i64>, limit: Option<i64>) -> Self {
        let page = page.unwrap_or(1).max(1);
        let limit = limit.unwrap_or(Self::DEFAULT_LIMIT).clamp(1, Self::MAX_LIMIT);
        Self { page, limit }
    }

    /// Pages past any reachable row saturate instead of overflowing.
    pub fn offset(&self) -> i64 {
        (self.page - 1).saturating_mul(self.limit)
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::new(None, None)
    }
}

#[derive(Debug, Clone)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: i64,
    pub page: i64,
    pub limit: i64,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, total: i64, request: PageRequest) -> Self {
        Self { items, total, page: request.page, limit: request.limit }
    }

    pub fn total_pages(&self) -> i64 {
        if self.limit <= 0 {
            return 0;
        }
        (self.total + self.limit - 1) / self.limit
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            total: self.total,
            page: self.page,
            limit: self.limit,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_second_page_of_twenty_five() {
        let request = PageRequest::new(Some(2), Some(10));
        assert_eq!(request.offset(), 10);

        let page: Page<()> = Page::new(vec![], 25, request);
        assert_eq!(page.total_pages(), 3);
    }

    #[test]
    fn test_huge_page_number_saturates_offset() {
        let request = PageRequest::new(Some(i64::MAX), Some(100));
        assert_eq!(request.page, i64::MAX);
        assert_eq!(request.offset(), i64::MAX);
    }

    #[test]
    fn test_request_is_clamped() {
        let request = PageRequest::new(Some(0), Some(5000));
        assert_eq!(request.page, 1);
        assert_eq!(request.limit, PageRequest::MAX_LIMIT);

        let request = PageRequest::new(Some(-3), Some(0));
        assert_eq!(request, PageRequest { page: 1, limit: 1 });
    }

    #[test]
    fn test_empty_result_has_zero_pages() {
        let page: Page<()> = Page::new(vec![], 0, PageRequest::default());
        assert_eq!(page.total_pages(), 0);
    }
}
