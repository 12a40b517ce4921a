//! Pagination state for the expense list
//!
//! Page size is fixed; the page index is 1-based.

/// Items per page requested from `/expenses`.
pub const PAGE_SIZE: u32 = 50;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PaginationState {
    /// 1-based page index
    pub page: u32,
    /// items per page
    pub page_size: u32,
    /// total items reported by the server
    pub total: u64,
}

impl PaginationState {
    /// `max(1, ceil(total / page_size))`
    pub fn max_page(&self) -> u32 {
        let pages = self.total.div_ceil(u64::from(self.page_size.max(1)));
        u32::try_from(pages).unwrap_or(u32::MAX).max(1)
    }

    pub fn contains(&self, page: u32) -> bool {
        (1..=self.max_page()).contains(&page)
    }

    /// Pull `page` back into `1..=max_page`; returns whether it moved.
    pub fn clamp_page(&mut self) -> bool {
        let clamped = self.page.clamp(1, self.max_page());
        let moved = clamped != self.page;
        self.page = clamped;
        moved
    }

    /// 1-based positions of the first and last item on the current page,
    /// `(0, 0)` when there is nothing to show.
    pub fn range(&self) -> (u64, u64) {
        if self.total == 0 {
            return (0, 0);
        }
        let size = u64::from(self.page_size);
        let start = u64::from(self.page.saturating_sub(1)) * size + 1;
        let end = self.total.min(u64::from(self.page) * size);
        (start, end)
    }

    pub fn label(&self) -> String {
        format!("Página {} de {}", self.page, self.max_page())
    }
}

impl Default for PaginationState {
    fn default() -> Self { Self { page: 1, page_size: PAGE_SIZE, total: 0 } }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn max_page_is_at_least_one() {
        let p = PaginationState::default();
        assert_eq!(p.max_page(), 1);
        assert_eq!(p.range(), (0, 0));
        assert_eq!(p.label(), "Página 1 de 1");
    }

    #[test]
    fn fifty_five_items_span_two_pages() {
        let mut p = PaginationState { total: 55, ..Default::default() };
        assert_eq!(p.max_page(), 2);
        assert_eq!(p.range(), (1, 50));
        assert_eq!(p.label(), "Página 1 de 2");
        p.page = 2;
        assert_eq!(p.range(), (51, 55));
        assert!(!p.contains(3));
    }

    #[test]
    fn clamp_pulls_page_back_into_range() {
        let mut p = PaginationState { page: 3, total: 100, ..Default::default() };
        assert!(p.clamp_page());
        assert_eq!(p.page, 2);
        assert!(!p.clamp_page());

        let mut zero = PaginationState { page: 0, ..Default::default() };
        assert!(zero.clamp_page());
        assert_eq!(zero.page, 1);
    }
}
