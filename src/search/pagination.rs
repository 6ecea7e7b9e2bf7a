//! Page arithmetic for the result list

/// Number of page buttons shown by default
pub const DEFAULT_MAX_VISIBLE: u32 = 5;

/// Page numbers to render, centred on `current` where possible.
///
/// Returns `1..=total_pages` when everything fits, otherwise a window of
/// exactly `max_visible` pages clamped to the valid range.
pub fn page_window(current: u32, total_pages: u32, max_visible: u32) -> Vec<u32> {
    if total_pages <= max_visible {
        return (1..=total_pages).collect();
    }
    if max_visible == 0 {
        return Vec::new();
    }

    let half = max_visible / 2;
    let last_start = total_pages - max_visible + 1;
    let start = current.saturating_sub(half).clamp(1, last_start);
    let end = start + max_visible - 1;

    (start..=end).collect()
}

/// Current position in a paged result set
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageState {
    current_page: u32,
    page_size: u32,
    total: u64,
}

impl PageState {
    /// `page_size` of zero is bumped to one
    pub fn new(page_size: u32) -> Self {
        Self {
            current_page: 1,
            page_size: page_size.max(1),
            total: 0,
        }
    }

    pub fn current_page(&self) -> u32 {
        self.current_page
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    pub fn total(&self) -> u64 {
        self.total
    }

    /// `ceil(total / page_size)`, never less than one
    pub fn total_pages(&self) -> u32 {
        let pages = self.total.div_ceil(self.page_size as u64).max(1);
        pages.min(u32::MAX as u64) as u32
    }

    pub fn has_next_page(&self) -> bool {
        self.current_page < self.total_pages()
    }

    pub fn has_previous_page(&self) -> bool {
        self.current_page > 1
    }

    /// Index of the first item on the current page
    pub fn offset(&self) -> u64 {
        (self.current_page as u64 - 1) * self.page_size as u64
    }

    /// 1-based `(first, last)` item numbers on this page, `None` when empty
    pub fn item_range(&self) -> Option<(u64, u64)> {
        if self.total == 0 {
            return None;
        }
        let first = self.offset() + 1;
        let last = (self.offset() + self.page_size as u64).min(self.total);
        if first > last {
            return None;
        }
        Some((first, last))
    }

    /// Record a new total and pull the current page back into range
    pub fn set_total(&mut self, total: u64) {
        self.total = total;
        self.current_page = self.current_page.clamp(1, self.total_pages());
    }

    /// Forget the total but stay on the current page, so a retry asks for
    /// the same page again. The next [`set_total`](Self::set_total) clamps.
    pub fn clear_total(&mut self) {
        self.total = 0;
    }

    /// Jump to `page`, clamped into `1..=total_pages`
    pub fn go_to(&mut self, page: u32) {
        self.current_page = page.clamp(1, self.total_pages());
    }

    /// Jump to `page` before the total is known; [`set_total`](Self::set_total)
    /// pulls it back into range once the server answers
    pub fn seek(&mut self, page: u32) {
        self.current_page = page.max(1);
    }

    /// Move forward one page; returns whether the page changed
    pub fn next(&mut self) -> bool {
        if self.has_next_page() {
            self.current_page += 1;
            true
        } else {
            false
        }
    }

    /// Move back one page; returns whether the page changed
    pub fn previous(&mut self) -> bool {
        if self.has_previous_page() {
            self.current_page -= 1;
            true
        } else {
            false
        }
    }

    pub fn reset(&mut self) {
        self.current_page = 1;
    }

    pub fn window(&self, max_visible: u32) -> Vec<u32> {
        page_window(self.current_page, self.total_pages(), max_visible)
    }
}

impl Default for PageState {
    fn default() -> Self {
        Self::new(12)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state(total: u64, page_size: u32) -> PageState {
        let mut page = PageState::new(page_size);
        page.set_total(total);
        page
    }

    quickcheck::quickcheck! {
        fn total_pages_is_ceiling_with_floor_of_one(total: u32, page_size: u16) -> bool {
            let page_size = page_size as u32 + 1;
            let page = state(total as u64, page_size);
            let expected = ((total as u64 + page_size as u64 - 1) / page_size as u64).max(1);
            page.total_pages() as u64 == expected
        }

        fn window_has_expected_length_and_contains_current(
            total_pages: u16,
            current: u16,
            max_visible: u8
        ) -> bool {
            let total_pages = total_pages as u32 % 500 + 1;
            let max_visible = max_visible as u32 % 12 + 1;
            let current = current as u32 % total_pages + 1;
            let window = page_window(current, total_pages, max_visible);
            window.len() as u32 == total_pages.min(max_visible)
                && window.contains(&current)
                && window.windows(2).all(|w| w[1] == w[0] + 1)
        }
    }

    #[test]
    fn small_totals_show_every_page() {
        assert_eq!(page_window(2, 3, 5), vec![1, 2, 3]);
        assert_eq!(page_window(1, 5, 5), vec![1, 2, 3, 4, 5]);
        assert!(page_window(1, 0, 5).is_empty());
    }

    #[test]
    fn window_is_centred_and_clamped() {
        assert_eq!(page_window(1, 20, 5), vec![1, 2, 3, 4, 5]);
        assert_eq!(page_window(10, 20, 5), vec![8, 9, 10, 11, 12]);
        assert_eq!(page_window(20, 20, 5), vec![16, 17, 18, 19, 20]);
        assert_eq!(page_window(19, 20, 5), vec![16, 17, 18, 19, 20]);
        assert_eq!(page_window(5, 10, 4), vec![3, 4, 5, 6]);
    }

    #[test]
    fn forty_seven_items_in_pages_of_twelve() {
        let mut page = state(47, 12);
        assert_eq!(page.total_pages(), 4);

        page.go_to(4);
        assert!(!page.has_next_page());
        assert!(page.has_previous_page());
        assert_eq!(page.item_range(), Some((37, 47)));
        assert_eq!(page.offset(), 36);
    }

    #[test]
    fn empty_results_still_have_one_page() {
        let page = state(0, 12);
        assert_eq!(page.total_pages(), 1);
        assert_eq!(page.current_page(), 1);
        assert!(!page.has_next_page());
        assert!(!page.has_previous_page());
        assert_eq!(page.item_range(), None);
    }

    #[test]
    fn navigation_stays_in_range() {
        let mut page = state(30, 10);
        assert!(!page.previous());
        assert!(page.next());
        assert!(page.next());
        assert!(!page.next());
        assert_eq!(page.current_page(), 3);

        page.go_to(99);
        assert_eq!(page.current_page(), 3);
        page.go_to(0);
        assert_eq!(page.current_page(), 1);
    }

    #[test]
    fn shrinking_total_clamps_current_page() {
        let mut page = state(100, 10);
        page.go_to(9);
        page.set_total(25);
        assert_eq!(page.current_page(), 3);
    }

    #[test]
    fn zero_page_size_is_rejected() {
        let page = PageState::new(0);
        assert_eq!(page.page_size(), 1);
    }

    #[test]
    fn seek_waits_for_the_total() {
        let mut page = PageState::new(12);
        page.seek(3);
        assert_eq!(page.current_page(), 3);
        assert_eq!(page.offset(), 24);

        page.set_total(20);
        assert_eq!(page.current_page(), 2);
    }

    #[test]
    fn clearing_the_total_keeps_the_page() {
        let mut page = state(47, 12);
        page.go_to(3);
        page.clear_total();
        assert_eq!(page.total(), 0);
        assert_eq!(page.current_page(), 3);
        assert_eq!(page.item_range(), None);

        page.set_total(47);
        assert_eq!(page.current_page(), 3);
    }
}
