// Minimal text buffer used by every input in the UI
// Cursor positions are character offsets, same unit the composer works in

use crate::composer::{byte_offset, char_len};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// What a key press did to the buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditOutcome {
    Ignored,
    Moved,
    Edited,
    Newline, // Enter in a multi-line buffer - the rhyme trigger
}

#[derive(Debug, Clone, Default)]
pub struct TextBuffer {
    text: String,
    cursor: usize,
    multiline: bool,
}

impl TextBuffer {
    pub fn single_line() -> Self {
        Self::default()
    }

    pub fn multiline() -> Self {
        Self {
            multiline: true,
            ..Self::default()
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Replace the contents and put the cursor at the end.
    pub fn set_text(&mut self, text: &str) {
        self.text = text.to_string();
        self.cursor = char_len(&self.text);
    }

    /// Replace the contents keeping an explicit cursor (clamped).
    pub fn replace(&mut self, text: String, cursor: usize) {
        self.cursor = cursor.min(char_len(&text));
        self.text = text;
    }

    pub fn clear(&mut self) {
        self.text.clear();
        self.cursor = 0;
    }

    pub fn insert_char(&mut self, c: char) {
        if c == '\n' && !self.multiline {
            return;
        }
        let at = byte_offset(&self.text, self.cursor);
        self.text.insert(at, c);
        self.cursor += 1;
    }

    pub fn insert_newline(&mut self) -> bool {
        if !self.multiline {
            return false;
        }
        self.insert_char('\n');
        true
    }

    pub fn backspace(&mut self) -> bool {
        if self.cursor == 0 {
            return false;
        }
        self.cursor -= 1;
        let at = byte_offset(&self.text, self.cursor);
        self.text.remove(at);
        true
    }

    pub fn delete(&mut self) -> bool {
        if self.cursor >= char_len(&self.text) {
            return false;
        }
        let at = byte_offset(&self.text, self.cursor);
        self.text.remove(at);
        true
    }

    pub fn move_left(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn move_right(&mut self) {
        self.cursor = (self.cursor + 1).min(char_len(&self.text));
    }

    pub fn move_home(&mut self) {
        let (line, _) = self.cursor_line_col();
        self.cursor = self.offset_of(line, 0);
    }

    pub fn move_end(&mut self) {
        let (line, _) = self.cursor_line_col();
        self.cursor = self.offset_of(line, usize::MAX);
    }

    pub fn move_up(&mut self) {
        let (line, col) = self.cursor_line_col();
        self.cursor = match line.checked_sub(1) {
            Some(prev) => self.offset_of(prev, col),
            None => 0,
        };
    }

    pub fn move_down(&mut self) {
        let (line, col) = self.cursor_line_col();
        if line + 1 < self.line_count() {
            self.cursor = self.offset_of(line + 1, col);
        } else {
            self.cursor = char_len(&self.text);
        }
    }

    pub fn line_count(&self) -> usize {
        self.text.split('\n').count()
    }

    /// Zero-based (line, column) of the cursor.
    pub fn cursor_line_col(&self) -> (usize, usize) {
        let before = &self.text[..byte_offset(&self.text, self.cursor)];
        let line = before.matches('\n').count();
        let col = match before.rfind('\n') {
            Some(nl) => char_len(&before[nl + 1..]),
            None => char_len(before),
        };
        (line, col)
    }

    // Character offset of (line, col), with col clamped to the line length
    fn offset_of(&self, line: usize, col: usize) -> usize {
        let mut offset = 0;
        for (index, text) in self.text.split('\n').enumerate() {
            let len = char_len(text);
            if index == line {
                return offset + col.min(len);
            }
            offset += len + 1;
        }
        char_len(&self.text)
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> EditOutcome {
        let plain = !key
            .modifiers
            .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT);

        match key.code {
            KeyCode::Char(c) if plain => {
                self.insert_char(c);
                EditOutcome::Edited
            }
            KeyCode::Enter if self.multiline => {
                self.insert_newline();
                EditOutcome::Newline
            }
            KeyCode::Backspace => edited(self.backspace()),
            KeyCode::Delete => edited(self.delete()),
            KeyCode::Left => {
                self.move_left();
                EditOutcome::Moved
            }
            KeyCode::Right => {
                self.move_right();
                EditOutcome::Moved
            }
            KeyCode::Home => {
                self.move_home();
                EditOutcome::Moved
            }
            KeyCode::End => {
                self.move_end();
                EditOutcome::Moved
            }
            KeyCode::Up if self.multiline => {
                self.move_up();
                EditOutcome::Moved
            }
            KeyCode::Down if self.multiline => {
                self.move_down();
                EditOutcome::Moved
            }
            _ => EditOutcome::Ignored,
        }
    }
}

fn edited(changed: bool) -> EditOutcome {
    if changed {
        EditOutcome::Edited
    } else {
        EditOutcome::Ignored
    }
}
