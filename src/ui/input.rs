/// Input state tracker and single-line text editor.
///
/// `InputState` drains every pending terminal event once per frame and
/// keeps the presses (Press and Repeat; Release is ignored) for the
/// screens to query. Typing screens feed the same presses through a
/// `LineEditor`.

use std::time::Duration;

use crossterm::event::{self, poll, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

pub struct InputState {
    /// Key presses collected during the most recent drain.
    pub presses: Vec<KeyEvent>,
    /// Terminal was resized since the last drain.
    pub resized: bool,
}

impl InputState {
    pub fn new() -> Self {
        InputState {
            presses: Vec::with_capacity(8),
            resized: false,
        }
    }

    /// Drain all pending terminal events. Call once per frame.
    pub fn drain_events(&mut self) {
        self.presses.clear();
        self.resized = false;

        while poll(Duration::ZERO).unwrap_or(false) {
            match event::read() {
                Ok(Event::Key(key)) if key.kind != KeyEventKind::Release => {
                    self.presses.push(key);
                }
                Ok(Event::Resize(_, _)) => self.resized = true,
                _ => {}
            }
        }
    }

    pub fn ctrl_c_pressed(&self) -> bool {
        self.presses.iter().any(|k| {
            k.modifiers.contains(KeyModifiers::CONTROL)
                && (k.code == KeyCode::Char('c') || k.code == KeyCode::Char('C'))
        })
    }
}

// ══════════════════════════════════════════════════════════════
// Line editor
// ══════════════════════════════════════════════════════════════

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum EditAction {
    /// Key not consumed by the editor.
    Ignored,
    Edited,
    Submit,
}

#[derive(Clone, Debug, Default)]
pub struct LineEditor {
    buf: String,
    /// Cursor position in chars.
    cursor: usize,
    max_len: usize,
}

impl LineEditor {
    pub fn new(max_len: usize) -> Self {
        LineEditor { buf: String::new(), cursor: 0, max_len }
    }

    pub fn text(&self) -> &str {
        &self.buf
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    pub fn clear(&mut self) {
        self.buf.clear();
        self.cursor = 0;
    }

    /// Take the current text, leaving the editor empty.
    pub fn take(&mut self) -> String {
        self.cursor = 0;
        std::mem::take(&mut self.buf)
    }

    fn byte_at(&self, char_idx: usize) -> usize {
        self.buf.char_indices().nth(char_idx).map_or(self.buf.len(), |(i, _)| i)
    }

    fn char_len(&self) -> usize {
        self.buf.chars().count()
    }

    pub fn handle(&mut self, key: &KeyEvent) -> EditAction {
        if key.modifiers.contains(KeyModifiers::CONTROL) {
            return match key.code {
                KeyCode::Char('u') => { self.clear(); EditAction::Edited }
                _ => EditAction::Ignored,
            };
        }
        match key.code {
            KeyCode::Char(c) => {
                if self.char_len() >= self.max_len { return EditAction::Edited; }
                let at = self.byte_at(self.cursor);
                self.buf.insert(at, c);
                self.cursor += 1;
                EditAction::Edited
            }
            KeyCode::Backspace => {
                if self.cursor > 0 {
                    self.cursor -= 1;
                    let at = self.byte_at(self.cursor);
                    self.buf.remove(at);
                }
                EditAction::Edited
            }
            KeyCode::Delete => {
                if self.cursor < self.char_len() {
                    let at = self.byte_at(self.cursor);
                    self.buf.remove(at);
                }
                EditAction::Edited
            }
            KeyCode::Left => { self.cursor = self.cursor.saturating_sub(1); EditAction::Edited }
            KeyCode::Right => { self.cursor = (self.cursor + 1).min(self.char_len()); EditAction::Edited }
            KeyCode::Home => { self.cursor = 0; EditAction::Edited }
            KeyCode::End => { self.cursor = self.char_len(); EditAction::Edited }
            KeyCode::Enter => EditAction::Submit,
            _ => EditAction::Ignored,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn type_str(ed: &mut LineEditor, s: &str) {
        for c in s.chars() {
            ed.handle(&key(KeyCode::Char(c)));
        }
    }

    #[test]
    fn typing_and_cursor_edits() {
        let mut ed = LineEditor::new(32);
        type_str(&mut ed, "helo");
        ed.handle(&key(KeyCode::Left));
        type_str(&mut ed, "l");
        assert_eq!(ed.text(), "hello");
        ed.handle(&key(KeyCode::Home));
        ed.handle(&key(KeyCode::Delete));
        assert_eq!(ed.text(), "ello");
        ed.handle(&key(KeyCode::End));
        ed.handle(&key(KeyCode::Backspace));
        assert_eq!(ed.text(), "ell");
    }

    #[test]
    fn enter_submits_and_take_empties() {
        let mut ed = LineEditor::new(32);
        type_str(&mut ed, "push me");
        assert_eq!(ed.handle(&key(KeyCode::Enter)), EditAction::Submit);
        assert_eq!(ed.take(), "push me");
        assert!(ed.is_empty());
        assert_eq!(ed.cursor(), 0);
    }

    #[test]
    fn length_is_capped() {
        let mut ed = LineEditor::new(3);
        type_str(&mut ed, "abcdef");
        assert_eq!(ed.text(), "abc");
    }

    #[test]
    fn multibyte_chars_edit_cleanly() {
        let mut ed = LineEditor::new(32);
        type_str(&mut ed, "añb");
        ed.handle(&key(KeyCode::Left));
        ed.handle(&key(KeyCode::Backspace));
        assert_eq!(ed.text(), "ab");
    }

    #[test]
    fn ctrl_u_clears_and_escape_is_ignored() {
        let mut ed = LineEditor::new(32);
        type_str(&mut ed, "abc");
        assert_eq!(ed.handle(&key(KeyCode::Esc)), EditAction::Ignored);
        ed.handle(&KeyEvent::new(KeyCode::Char('u'), KeyModifiers::CONTROL));
        assert!(ed.is_empty());
    }
}
