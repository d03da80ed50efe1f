//! Minimal multi-line text buffer with a cursor.

#[derive(Debug, Clone)]
pub struct Editor {
    lines: Vec<String>,
    row: usize,
    /// Cursor column in chars, not bytes.
    col: usize,
}

impl Editor {
    pub fn new() -> Self {
        Self {
            lines: vec![String::new()],
            row: 0,
            col: 0,
        }
    }

    pub fn text(&self) -> String {
        self.lines.join("\n")
    }

    /// Replace the contents and move the cursor to the end.
    pub fn set_text(&mut self, text: &str) {
        self.lines = text.split('\n').map(str::to_string).collect();
        self.row = self.lines.len() - 1;
        self.col = self.lines[self.row].chars().count();
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn cursor(&self) -> (usize, usize) {
        (self.row, self.col)
    }

    fn byte_index(&self) -> usize {
        let line = &self.lines[self.row];
        line.char_indices()
            .nth(self.col)
            .map_or(line.len(), |(i, _)| i)
    }

    pub fn insert_char(&mut self, c: char) {
        let at = self.byte_index();
        self.lines[self.row].insert(at, c);
        self.col += 1;
    }

    pub fn newline(&mut self) {
        let at = self.byte_index();
        let rest = self.lines[self.row].split_off(at);
        self.lines.insert(self.row + 1, rest);
        self.row += 1;
        self.col = 0;
    }

    /// Returns false when there was nothing to delete.
    pub fn backspace(&mut self) -> bool {
        if self.col > 0 {
            self.col -= 1;
            let at = self.byte_index();
            self.lines[self.row].remove(at);
            true
        } else if self.row > 0 {
            let line = self.lines.remove(self.row);
            self.row -= 1;
            self.col = self.lines[self.row].chars().count();
            self.lines[self.row].push_str(&line);
            true
        } else {
            false
        }
    }

    pub fn move_left(&mut self) {
        if self.col > 0 {
            self.col -= 1;
        } else if self.row > 0 {
            self.row -= 1;
            self.col = self.line_len();
        }
    }

    pub fn move_right(&mut self) {
        if self.col < self.line_len() {
            self.col += 1;
        } else if self.row + 1 < self.lines.len() {
            self.row += 1;
            self.col = 0;
        }
    }

    pub fn move_up(&mut self) {
        if self.row > 0 {
            self.row -= 1;
            self.col = self.col.min(self.line_len());
        }
    }

    pub fn move_down(&mut self) {
        if self.row + 1 < self.lines.len() {
            self.row += 1;
            self.col = self.col.min(self.line_len());
        }
    }

    fn line_len(&self) -> usize {
        self.lines[self.row].chars().count()
    }
}

impl Default for Editor {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn typed(s: &str) -> Editor {
        let mut editor = Editor::new();
        for c in s.chars() {
            if c == '\n' {
                editor.newline();
            } else {
                editor.insert_char(c);
            }
        }
        editor
    }

    #[test]
    fn typing_and_newlines() {
        let editor = typed("ab\ncd");
        assert_eq!(editor.text(), "ab\ncd");
        assert_eq!(editor.cursor(), (1, 2));
    }

    #[test]
    fn backspace_joins_lines() {
        let mut editor = typed("ab\n");
        assert!(editor.backspace());
        assert_eq!(editor.text(), "ab");
        assert_eq!(editor.cursor(), (0, 2));
        assert!(editor.backspace());
        assert!(editor.backspace());
        assert!(!editor.backspace());
        assert_eq!(editor.text(), "");
    }

    #[test]
    fn insert_in_the_middle_of_multibyte_text() {
        let mut editor = typed("héllo");
        editor.move_left();
        editor.move_left();
        editor.move_left();
        editor.insert_char('X');
        assert_eq!(editor.text(), "héXllo");
    }

    #[test]
    fn set_text_moves_cursor_to_end() {
        let mut editor = Editor::new();
        editor.set_text("one\ntwo three");
        assert_eq!(editor.lines().len(), 2);
        assert_eq!(editor.cursor(), (1, 9));
        editor.move_up();
        assert_eq!(editor.cursor(), (0, 3));
    }

    #[test]
    fn split_line_at_cursor() {
        let mut editor = typed("abcd");
        editor.move_left();
        editor.move_left();
        editor.newline();
        assert_eq!(editor.text(), "ab\ncd");
        assert_eq!(editor.cursor(), (1, 0));
    }
}
