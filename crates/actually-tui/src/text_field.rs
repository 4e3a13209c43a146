//! Single-line editable text field.
//!
//! The cursor is a char index into `value`. Rendering scrolls horizontally
//! so the cursor stays visible.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use unicode_width::UnicodeWidthChar;

pub const MASK_CHAR: char = '•';

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextField {
    value: String,
    cursor: usize,
}

impl TextField {
    pub fn with_value(value: impl Into<String>) -> Self {
        let mut field = Self::default();
        field.set(value);
        field
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn is_empty(&self) -> bool {
        self.value.is_empty()
    }

    /// Replaces the value and moves the cursor to the end.
    pub fn set(&mut self, value: impl Into<String>) {
        self.value = value.into();
        self.cursor = self.value.chars().count();
    }

    pub fn clear(&mut self) {
        self.value.clear();
        self.cursor = 0;
    }

    pub fn insert_char(&mut self, ch: char) {
        let at = self.byte_index(self.cursor);
        self.value.insert(at, ch);
        self.cursor += 1;
    }

    /// Inserts pasted text. Line breaks become spaces.
    pub fn insert_str(&mut self, text: &str) {
        for ch in text.chars() {
            match ch {
                '\r' => {}
                '\n' | '\t' => self.insert_char(' '),
                c if c.is_control() => {}
                c => self.insert_char(c),
            }
        }
    }

    pub fn backspace(&mut self) {
        if self.cursor == 0 {
            return;
        }
        self.cursor -= 1;
        let at = self.byte_index(self.cursor);
        self.value.remove(at);
    }

    pub fn delete(&mut self) {
        if self.cursor >= self.value.chars().count() {
            return;
        }
        let at = self.byte_index(self.cursor);
        self.value.remove(at);
    }

    /// Deletes the word before the cursor.
    pub fn delete_word_back(&mut self) {
        let chars: Vec<char> = self.value.chars().collect();
        let mut start = self.cursor;
        while start > 0 && chars[start - 1].is_whitespace() {
            start -= 1;
        }
        while start > 0 && !chars[start - 1].is_whitespace() {
            start -= 1;
        }
        let from = self.byte_index(start);
        let to = self.byte_index(self.cursor);
        self.value.replace_range(from..to, "");
        self.cursor = start;
    }

    pub fn left(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn right(&mut self) {
        self.cursor = (self.cursor + 1).min(self.value.chars().count());
    }

    pub fn home(&mut self) {
        self.cursor = 0;
    }

    pub fn end(&mut self) {
        self.cursor = self.value.chars().count();
    }

    /// Applies an editing key. Returns `false` if the key is not an edit.
    pub fn handle_key(&mut self, key: &KeyEvent) -> bool {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        match key.code {
            KeyCode::Char('a') if ctrl => self.home(),
            KeyCode::Char('e') if ctrl => self.end(),
            KeyCode::Char('u') if ctrl => {
                let at = self.byte_index(self.cursor);
                self.value.replace_range(..at, "");
                self.cursor = 0;
            }
            KeyCode::Char('w') if ctrl => self.delete_word_back(),
            KeyCode::Char(_) if ctrl || key.modifiers.contains(KeyModifiers::ALT) => return false,
            KeyCode::Char(c) => self.insert_char(c),
            KeyCode::Backspace => self.backspace(),
            KeyCode::Delete => self.delete(),
            KeyCode::Left => self.left(),
            KeyCode::Right => self.right(),
            KeyCode::Home => self.home(),
            KeyCode::End => self.end(),
            _ => return false,
        }
        true
    }

    /// Returns the visible slice for a box `width` columns wide and the
    /// cursor column within it.
    pub fn visible(&self, width: usize, masked: bool) -> (String, usize) {
        let display: Vec<char> = if masked {
            std::iter::repeat_n(MASK_CHAR, self.value.chars().count()).collect()
        } else {
            self.value.chars().collect()
        };
        if width == 0 {
            return (String::new(), 0);
        }

        // Keep one column free for the cursor at end of line.
        let budget = width.saturating_sub(1).max(1);
        let col = |range: &[char]| range.iter().map(|c| c.width().unwrap_or(0)).sum::<usize>();

        let mut start = 0;
        while col(&display[start..self.cursor]) > budget {
            start += 1;
        }

        let mut out = String::new();
        let mut used = 0;
        for &ch in &display[start..] {
            let w = ch.width().unwrap_or(0);
            if used + w > width {
                break;
            }
            out.push(ch);
            used += w;
        }
        (out, col(&display[start..self.cursor]))
    }

    fn byte_index(&self, char_idx: usize) -> usize {
        self.value
            .char_indices()
            .nth(char_idx)
            .map_or(self.value.len(), |(i, _)| i)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn test_editing_in_the_middle() {
        let mut field = TextField::with_value("héllo");
        field.left();
        field.left();
        field.insert_char('X');
        assert_eq!(field.value(), "hélXlo");
        field.backspace();
        field.delete();
        assert_eq!(field.value(), "hélo");
        assert_eq!(field.cursor(), 3);
    }

    #[test]
    fn test_paste_flattens_newlines() {
        let mut field = TextField::default();
        field.insert_str("line one\r\nline two");
        assert_eq!(field.value(), "line one line two");
    }

    #[test]
    fn test_handle_key_ignores_non_edits() {
        let mut field = TextField::default();
        assert!(field.handle_key(&key(KeyCode::Char('a'))));
        assert!(!field.handle_key(&key(KeyCode::Enter)));
        assert!(!field.handle_key(&KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL)));
        assert_eq!(field.value(), "a");
    }

    #[test]
    fn test_ctrl_w_deletes_previous_word() {
        let mut field = TextField::with_value("why is  the sky");
        field.handle_key(&KeyEvent::new(KeyCode::Char('w'), KeyModifiers::CONTROL));
        assert_eq!(field.value(), "why is  the ");
    }

    #[test]
    fn test_masked_view_hides_characters() {
        let field = TextField::with_value("sk-secret");
        let (text, cursor) = field.visible(20, true);
        assert_eq!(text, "•••••••••");
        assert_eq!(cursor, 9);
    }

    #[test]
    fn test_visible_scrolls_to_cursor() {
        let field = TextField::with_value("abcdefghij");
        let (text, cursor) = field.visible(5, false);
        assert_eq!(text, "ghij");
        assert_eq!(cursor, 4);

        let mut field = field;
        field.home();
        let (text, cursor) = field.visible(5, false);
        assert_eq!(text, "abcde");
        assert_eq!(cursor, 0);
    }
}
