use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use unicode_width::UnicodeWidthChar;

/// Single-line text buffer with a UTF-8 aware cursor.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextField {
    buffer: String,
    cursor: usize,
}

impl TextField {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_value(value: impl Into<String>) -> Self {
        let buffer = value.into();
        let cursor = buffer.len();
        Self { buffer, cursor }
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    pub fn value(&self) -> &str {
        &self.buffer
    }

    /// Replaces the content and moves the cursor to the end.
    pub fn set(&mut self, value: impl Into<String>) {
        self.buffer = value.into();
        self.cursor = self.buffer.len();
    }

    pub fn insert_char(&mut self, ch: char) {
        self.buffer.insert(self.cursor, ch);
        self.cursor += ch.len_utf8();
    }

    pub fn backspace(&mut self) {
        if self.cursor == 0 {
            return;
        }
        if let Some((idx, _)) = self.buffer[..self.cursor].char_indices().next_back() {
            self.buffer.drain(idx..self.cursor);
            self.cursor = idx;
        }
    }

    pub fn delete(&mut self) {
        if let Some((_, ch)) = self.buffer[self.cursor..].char_indices().next() {
            let end = self.cursor + ch.len_utf8();
            self.buffer.drain(self.cursor..end);
        }
    }

    pub fn move_left(&mut self) {
        if let Some((idx, _)) = self.buffer[..self.cursor].char_indices().next_back() {
            self.cursor = idx;
        }
    }

    pub fn move_right(&mut self) {
        if let Some((_, ch)) = self.buffer[self.cursor..].char_indices().next() {
            self.cursor += ch.len_utf8();
        }
    }

    pub fn move_home(&mut self) {
        self.cursor = 0;
    }

    pub fn move_end(&mut self) {
        self.cursor = self.buffer.len();
    }

    pub fn clear(&mut self) {
        self.buffer.clear();
        self.cursor = 0;
    }

    /// Takes the content out, leaving the field empty.
    pub fn take(&mut self) -> String {
        self.cursor = 0;
        std::mem::take(&mut self.buffer)
    }

    /// Applies an editing key. Returns true when the key was consumed.
    pub fn handle_key(&mut self, key: KeyEvent) -> bool {
        match key.code {
            KeyCode::Char(ch)
                if !key.modifiers.contains(KeyModifiers::CONTROL)
                    && !key.modifiers.contains(KeyModifiers::ALT) =>
            {
                self.insert_char(ch);
            }
            KeyCode::Backspace => self.backspace(),
            KeyCode::Delete => self.delete(),
            KeyCode::Left => self.move_left(),
            KeyCode::Right => self.move_right(),
            KeyCode::Home => self.move_home(),
            KeyCode::End => self.move_end(),
            _ => return false,
        }
        true
    }

    /// Text to draw, with every character replaced for secret fields.
    pub fn display(&self, secret: bool) -> String {
        if secret {
            "•".repeat(self.buffer.chars().count())
        } else {
            self.buffer.clone()
        }
    }

    /// Column of the cursor in terminal cells.
    pub fn cursor_column(&self, secret: bool) -> u16 {
        let width: usize = if secret {
            self.buffer[..self.cursor].chars().count()
        } else {
            self.buffer[..self.cursor]
                .chars()
                .map(|ch| UnicodeWidthChar::width(ch).unwrap_or(1))
                .sum()
        };
        width.min(u16::MAX as usize) as u16
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn edits_around_multibyte_characters() {
        let mut field = TextField::new();
        for ch in "代理x".chars() {
            field.insert_char(ch);
        }
        field.move_left();
        field.backspace();
        assert_eq!(field.value(), "代x");
        field.move_home();
        field.delete();
        assert_eq!(field.value(), "x");
    }

    #[test]
    fn cursor_column_counts_cells() {
        let field = TextField::with_value("代理");
        assert_eq!(field.cursor_column(false), 4);
        assert_eq!(field.cursor_column(true), 2);
    }

    #[test]
    fn control_chords_are_not_typed() {
        let mut field = TextField::new();
        assert!(field.handle_key(key(KeyCode::Char('a'))));
        assert!(!field.handle_key(KeyEvent::new(KeyCode::Char('s'), KeyModifiers::CONTROL)));
        assert_eq!(field.value(), "a");
    }

    #[test]
    fn secret_display_masks_every_character() {
        let field = TextField::with_value("secret");
        assert_eq!(field.display(true), "••••••");
        assert_eq!(field.display(false), "secret");
    }

    #[test]
    fn take_empties_the_field() {
        let mut field = TextField::with_value("hello");
        assert_eq!(field.take(), "hello");
        assert!(field.is_empty());
        field.insert_char('a');
        assert_eq!(field.value(), "a");
    }
}
