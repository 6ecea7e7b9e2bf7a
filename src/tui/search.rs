use crossterm::event::KeyCode;

/// Search input state for the TUI
pub struct SearchState {
    pub query: String,
    pub cursor_pos: usize,
    pub focused: bool,
    /// Position while stepping back through history with Up/Down
    pub history_pos: Option<usize>,
}

impl Default for SearchState {
    fn default() -> Self {
        Self {
            query: String::new(),
            cursor_pos: 0,
            focused: true,
            history_pos: None,
        }
    }
}

impl SearchState {
    pub fn with_query(query: &str) -> Self {
        Self {
            query: query.to_string(),
            cursor_pos: query.len(),
            ..Default::default()
        }
    }

    pub fn set_query(&mut self, query: &str) {
        self.query = query.to_string();
        self.cursor_pos = self.query.len();
    }

    pub fn clear(&mut self) {
        self.query.clear();
        self.cursor_pos = 0;
        self.history_pos = None;
    }

    /// Step through `history` (newest first); returns whether the query changed
    pub fn recall(&mut self, history: &[String], older: bool) -> bool {
        if history.is_empty() {
            return false;
        }
        let next = match (self.history_pos, older) {
            (None, true) => Some(0),
            (None, false) => return false,
            (Some(i), true) => Some((i + 1).min(history.len() - 1)),
            (Some(0), false) => None,
            (Some(i), false) => Some(i - 1),
        };
        self.history_pos = next;
        match next {
            Some(i) => self.set_query(&history[i]),
            None => self.clear(),
        }
        true
    }
}

/// Apply a line-editing key to `text`, keeping `cursor` on a char boundary.
///
/// Returns true when the text itself changed.
pub fn edit_text(text: &mut String, cursor: &mut usize, key: KeyCode) -> bool {
    *cursor = (*cursor).min(text.len());
    match key {
        KeyCode::Char(c) => {
            text.insert(*cursor, c);
            *cursor += c.len_utf8();
            true
        }
        KeyCode::Backspace => {
            if *cursor == 0 {
                return false;
            }
            let prev = prev_boundary(text, *cursor);
            text.remove(prev);
            *cursor = prev;
            true
        }
        KeyCode::Delete => {
            if *cursor >= text.len() {
                return false;
            }
            text.remove(*cursor);
            true
        }
        KeyCode::Left => {
            *cursor = prev_boundary(text, *cursor);
            false
        }
        KeyCode::Right => {
            if *cursor < text.len() {
                *cursor = text[*cursor..]
                    .char_indices()
                    .nth(1)
                    .map(|(i, _)| *cursor + i)
                    .unwrap_or(text.len());
            }
            false
        }
        KeyCode::Home => {
            *cursor = 0;
            false
        }
        KeyCode::End => {
            *cursor = text.len();
            false
        }
        _ => false,
    }
}

fn prev_boundary(text: &str, cursor: usize) -> usize {
    text[..cursor]
        .char_indices()
        .last()
        .map(|(i, _)| i)
        .unwrap_or(0)
}

/// Display width of `text[..cursor]`, for placing the terminal cursor
pub fn cursor_column(text: &str, cursor: usize) -> u16 {
    let cursor = cursor.min(text.len());
    unicode_width::UnicodeWidthStr::width(&text[..cursor]) as u16
}

#[cfg(test)]
mod tests {
    use super::*;

    fn type_str(text: &mut String, cursor: &mut usize, s: &str) {
        for c in s.chars() {
            edit_text(text, cursor, KeyCode::Char(c));
        }
    }

    #[test]
    fn typing_and_deleting_multibyte_text() {
        let mut text = String::new();
        let mut cursor = 0;
        type_str(&mut text, &mut cursor, "café");
        assert_eq!(cursor, text.len());

        assert!(edit_text(&mut text, &mut cursor, KeyCode::Backspace));
        assert_eq!(text, "caf");

        edit_text(&mut text, &mut cursor, KeyCode::Home);
        edit_text(&mut text, &mut cursor, KeyCode::Right);
        type_str(&mut text, &mut cursor, "ö");
        assert_eq!(text, "cöaf");

        edit_text(&mut text, &mut cursor, KeyCode::Left);
        assert!(edit_text(&mut text, &mut cursor, KeyCode::Delete));
        assert_eq!(text, "caf");
    }

    #[test]
    fn edges_are_no_ops() {
        let mut text = String::from("ab");
        let mut cursor = 0;
        assert!(!edit_text(&mut text, &mut cursor, KeyCode::Backspace));
        edit_text(&mut text, &mut cursor, KeyCode::End);
        assert!(!edit_text(&mut text, &mut cursor, KeyCode::Delete));
        edit_text(&mut text, &mut cursor, KeyCode::Right);
        assert_eq!(cursor, 2);
    }

    #[test]
    fn cursor_column_counts_display_width() {
        assert_eq!(cursor_column("café", "café".len()), 4);
        assert_eq!(cursor_column("ab", 99), 2);
    }

    #[test]
    fn history_recall_walks_both_ways() {
        let history = vec!["sofa".to_string(), "lamp".to_string()];
        let mut search = SearchState::default();

        assert!(search.recall(&history, true));
        assert_eq!(search.query, "sofa");
        search.recall(&history, true);
        assert_eq!(search.query, "lamp");
        search.recall(&history, true);
        assert_eq!(search.query, "lamp");

        search.recall(&history, false);
        assert_eq!(search.query, "sofa");
        search.recall(&history, false);
        assert_eq!(search.query, "");
        assert!(!search.recall(&history, false));
    }
}
