/// Result table selection and scrolling
pub struct TableState {
    pub selected: Option<usize>,
    pub scroll_offset: usize,
    pub visible_rows: usize,
}

impl Default for TableState {
    fn default() -> Self {
        Self {
            selected: None,
            scroll_offset: 0,
            visible_rows: 20,
        }
    }
}

impl TableState {
    /// Point at the first row of a freshly loaded page
    pub fn reset(&mut self, total: usize) {
        self.selected = if total == 0 { None } else { Some(0) };
        self.scroll_offset = 0;
    }

    pub fn select_next(&mut self, total: usize) {
        if total == 0 {
            return;
        }
        let i = match self.selected {
            Some(i) => (i + 1).min(total - 1),
            None => 0,
        };
        self.selected = Some(i);
        self.ensure_visible(i);
    }

    pub fn select_prev(&mut self) {
        let i = match self.selected {
            Some(0) | None => 0,
            Some(i) => i - 1,
        };
        self.selected = Some(i);
        self.ensure_visible(i);
    }

    pub fn select_first(&mut self) {
        self.selected = Some(0);
        self.scroll_offset = 0;
    }

    pub fn select_last(&mut self, total: usize) {
        if total == 0 {
            return;
        }
        self.selected = Some(total - 1);
        self.ensure_visible(total - 1);
    }

    fn ensure_visible(&mut self, index: usize) {
        if index < self.scroll_offset {
            self.scroll_offset = index;
        } else if self.visible_rows > 0 && index >= self.scroll_offset + self.visible_rows {
            self.scroll_offset = index - self.visible_rows + 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn selection_scrolls_into_view() {
        let mut table = TableState {
            visible_rows: 3,
            ..Default::default()
        };
        table.reset(10);
        for _ in 0..4 {
            table.select_next(10);
        }
        assert_eq!(table.selected, Some(4));
        assert_eq!(table.scroll_offset, 2);

        table.select_first();
        assert_eq!(table.scroll_offset, 0);
        table.select_last(10);
        assert_eq!(table.selected, Some(9));
        assert_eq!(table.scroll_offset, 7);
    }

    #[test]
    fn empty_page_has_no_selection() {
        let mut table = TableState::default();
        table.reset(0);
        table.select_next(0);
        assert_eq!(table.selected, None);
    }
}
