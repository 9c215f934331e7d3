//! Single-line text input with a character cursor.

#[derive(Debug, Clone, Default)]
pub struct QueryInput {
    text: String,
    /// Cursor position in characters, not bytes.
    cursor: usize,
}

impl QueryInput {
    pub fn value(&self) -> &str {
        &self.text
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn move_cursor(&mut self, delta: isize) {
        let len = self.char_len() as isize;
        self.cursor = (self.cursor as isize + delta).clamp(0, len) as usize;
    }

    pub fn move_home(&mut self) {
        self.cursor = 0;
    }

    pub fn move_end(&mut self) {
        self.cursor = self.char_len();
    }

    /// Returns whether the text changed.
    pub fn insert(&mut self, ch: char) -> bool {
        if ch.is_control() {
            return false;
        }
        let at = self.byte_index(self.cursor);
        self.text.insert(at, ch);
        self.cursor += 1;
        true
    }

    /// Returns whether the text changed.
    pub fn backspace(&mut self) -> bool {
        if self.cursor == 0 {
            return false;
        }
        self.cursor -= 1;
        let at = self.byte_index(self.cursor);
        self.text.remove(at);
        true
    }

    /// Returns whether the text changed.
    pub fn delete(&mut self) -> bool {
        if self.cursor >= self.char_len() {
            return false;
        }
        let at = self.byte_index(self.cursor);
        self.text.remove(at);
        true
    }

    fn char_len(&self) -> usize {
        self.text.chars().count()
    }

    fn byte_index(&self, char_pos: usize) -> usize {
        self.text
            .char_indices()
            .nth(char_pos)
            .map(|(idx, _)| idx)
            .unwrap_or(self.text.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn typed(text: &str) -> QueryInput {
        let mut input = QueryInput::default();
        for ch in text.chars() {
            input.insert(ch);
        }
        input
    }

    #[test]
    fn edits_at_cursor() {
        let mut input = typed("Oak");
        input.move_cursor(-1);
        assert!(input.insert('x'));
        assert_eq!(input.value(), "Oaxk");
        assert!(input.backspace());
        assert!(input.delete());
        assert_eq!(input.value(), "Oa");
        assert!(!input.delete());
    }

    #[test]
    fn cursor_counts_characters() {
        let mut input = typed("Zürich");
        input.move_home();
        input.move_cursor(2);
        assert!(input.backspace());
        assert_eq!(input.value(), "Zrich");
        assert_eq!(input.cursor(), 1);
        input.move_end();
        assert_eq!(input.cursor(), 5);
    }

    #[test]
    fn backspace_at_start_is_no_change() {
        let mut input = typed("A");
        input.move_home();
        assert!(!input.backspace());
        assert_eq!(input.value(), "A");
    }

    #[test]
    fn control_characters_are_rejected() {
        let mut input = QueryInput::default();
        assert!(!input.insert('\n'));
        assert_eq!(input.value(), "");
    }

    #[test]
    fn long_queries_are_kept_whole() {
        let long = "Station ".repeat(20);
        let mut input = typed(&long);
        assert_eq!(input.value(), long);
        assert!(input.insert('!'));
        assert_eq!(input.cursor(), long.chars().count() + 1);
    }
}
