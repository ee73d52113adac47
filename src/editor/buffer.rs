use std::ops::Range;

use ropey::Rope;
use serde::Serialize;
use thiserror::Error;

use super::format::Edit;

/// Active selection in the editor buffer, in char offsets.
///
/// `start <= end` always holds; an empty selection is a caret.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
pub struct Selection {
    start: usize,
    end: usize,
}

impl Selection {
    /// Create a selection between two offsets, in either order.
    pub const fn new(anchor: usize, head: usize) -> Self {
        if anchor <= head {
            Self {
                start: anchor,
                end: head,
            }
        } else {
            Self {
                start: head,
                end: anchor,
            }
        }
    }

    /// Create an empty selection (caret) at `pos`.
    pub const fn caret(pos: usize) -> Self {
        Self {
            start: pos,
            end: pos,
        }
    }

    pub const fn start(&self) -> usize {
        self.start
    }

    pub const fn end(&self) -> usize {
        self.end
    }

    pub const fn is_empty(&self) -> bool {
        self.start == self.end
    }

    pub const fn len(&self) -> usize {
        self.end - self.start
    }

    pub const fn range(&self) -> Range<usize> {
        self.start..self.end
    }

    /// Build a selection that must lie within a document of `len` chars.
    ///
    /// # Errors
    /// Returns [`SelectionError::OutOfBounds`] if either end exceeds `len`.
    pub const fn checked(anchor: usize, head: usize, len: usize) -> Result<Self, SelectionError> {
        let selection = Self::new(anchor, head);
        if selection.end > len {
            return Err(SelectionError::OutOfBounds {
                start: selection.start,
                end: selection.end,
                len,
            });
        }
        Ok(selection)
    }

    /// Clamp both ends to `len`.
    pub const fn clamp_to(self, len: usize) -> Self {
        let start = if self.start > len { len } else { self.start };
        let end = if self.end > len { len } else { self.end };
        Self::new(start, end)
    }
}

/// A selection that does not fit the document it was meant for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SelectionError {
    #[error("selection {start}..{end} is outside the document ({len} chars)")]
    OutOfBounds { start: usize, end: usize, len: usize },
}

/// A text buffer backed by a rope data structure.
///
/// Holds the document being edited and the current selection. All
/// formatting goes through [`EditorBuffer::apply`], which replaces one
/// range in a single step.
pub struct EditorBuffer {
    rope: Rope,
    selection: Selection,
}

impl EditorBuffer {
    /// Create a new buffer from a string, with the caret at the start.
    pub fn from_text(text: &str) -> Self {
        Self {
            rope: Rope::from_str(text),
            selection: Selection::default(),
        }
    }

    /// The current selection.
    pub const fn selection(&self) -> Selection {
        self.selection
    }

    /// Replace the selection, clamped to the buffer bounds.
    pub fn set_selection(&mut self, selection: Selection) {
        self.selection = selection.clamp_to(self.len_chars());
    }

    /// Length of the document in chars.
    pub fn len_chars(&self) -> usize {
        self.rope.len_chars()
    }

    pub fn is_empty(&self) -> bool {
        self.rope.len_chars() == 0
    }

    /// The full text content of the buffer.
    pub fn text(&self) -> String {
        self.rope.to_string()
    }

    /// Text inside `range` (char offsets), clamped to the buffer.
    pub fn slice(&self, range: Range<usize>) -> String {
        let len = self.len_chars();
        let end = range.end.min(len);
        let start = range.start.min(end);
        self.rope.slice(start..end).to_string()
    }

    /// The currently selected text.
    pub fn selected_text(&self) -> String {
        self.slice(self.selection.range())
    }

    /// Replace the whole document and put the caret at its end.
    pub fn set_text(&mut self, text: &str) {
        self.rope = Rope::from_str(text);
        self.selection = Selection::caret(self.len_chars());
    }

    /// Apply a single replacement and adopt its resulting selection.
    ///
    /// Returns `false` when the replacement equals the text it covers; the
    /// rope is then left untouched and only the selection moves.
    pub fn apply(&mut self, edit: &Edit) -> bool {
        let len = self.len_chars();
        let end = edit.range.end.min(len);
        let start = edit.range.start.min(end);
        let changed = self.rope.slice(start..end) != edit.replacement.as_str();
        if changed {
            self.rope.remove(start..end);
            self.rope.insert(start, &edit.replacement);
        }
        self.selection = edit.selection.clamp_to(self.len_chars());
        changed
    }

    /// Type `s` over the selection, leaving the caret after it.
    pub fn insert_str(&mut self, s: &str) {
        let Selection { start, end } = self.selection;
        if s.is_empty() && start == end {
            return;
        }
        self.rope.remove(start..end);
        self.rope.insert(start, s);
        self.selection = Selection::caret(start + s.chars().count());
    }

    /// Delete the selection, or the char before the caret (Backspace).
    ///
    /// Returns `true` if anything was deleted.
    pub fn delete_back(&mut self) -> bool {
        let Selection { start, end } = self.selection;
        if start != end {
            self.rope.remove(start..end);
            self.selection = Selection::caret(start);
        } else if start > 0 {
            self.rope.remove(start - 1..start);
            self.selection = Selection::caret(start - 1);
        } else {
            return false;
        }
        true
    }
}

impl std::fmt::Debug for EditorBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EditorBuffer")
            .field("len_chars", &self.rope.len_chars())
            .field("lines", &self.rope.len_lines())
            .field("selection", &self.selection)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_buffer_has_caret_at_start() {
        let buf = EditorBuffer::from_text("");
        assert!(buf.is_empty());
        assert_eq!(buf.selection(), Selection::caret(0));
    }

    #[test]
    fn test_from_text_preserves_content() {
        let buf = EditorBuffer::from_text("hello\nworld");
        assert_eq!(buf.len_chars(), 11);
        assert_eq!(buf.text(), "hello\nworld");
    }

    #[test]
    fn test_selection_new_orders_ends() {
        let sel = Selection::new(7, 2);
        assert_eq!(sel.start(), 2);
        assert_eq!(sel.end(), 7);
        assert_eq!(sel.len(), 5);
    }

    #[test]
    fn test_clamp_keeps_ends_ordered() {
        let sel = Selection::new(9, 2).clamp_to(5);
        assert_eq!(sel, Selection::new(2, 5));
        assert!(sel.start() <= sel.end());
        assert_eq!(Selection::new(8, 6).clamp_to(3), Selection::caret(3));
    }

    #[test]
    fn test_checked_selection_rejects_out_of_bounds() {
        assert_eq!(Selection::checked(4, 1, 5), Ok(Selection::new(1, 4)));
        let err = Selection::checked(2, 9, 5).unwrap_err();
        assert_eq!(
            err.to_string(),
            "selection 2..9 is outside the document (5 chars)"
        );
    }

    #[test]
    fn test_set_selection_clamps_to_bounds() {
        let mut buf = EditorBuffer::from_text("abc");
        buf.set_selection(Selection::new(1, 40));
        assert_eq!(buf.selection(), Selection::new(1, 3));
        buf.set_selection(Selection::new(10, 20));
        assert_eq!(buf.selection(), Selection::caret(3));
    }

    #[test]
    fn test_selected_text_uses_char_offsets() {
        let mut buf = EditorBuffer::from_text("héllo wörld");
        buf.set_selection(Selection::new(6, 11));
        assert_eq!(buf.selected_text(), "wörld");
    }

    #[test]
    fn test_apply_replaces_range_and_sets_selection() {
        let mut buf = EditorBuffer::from_text("say hi now");
        let edit = Edit {
            range: 4..6,
            replacement: "**hi**".to_string(),
            selection: Selection::new(6, 8),
        };
        assert!(buf.apply(&edit));
        assert_eq!(buf.text(), "say **hi** now");
        assert_eq!(buf.selection(), Selection::new(6, 8));
    }

    #[test]
    fn test_apply_identical_replacement_only_moves_selection() {
        let mut buf = EditorBuffer::from_text("- a\n- b");
        let edit = Edit {
            range: 0..7,
            replacement: "- a\n- b".to_string(),
            selection: Selection::caret(7),
        };
        assert!(!buf.apply(&edit));
        assert_eq!(buf.text(), "- a\n- b");
        assert_eq!(buf.selection(), Selection::caret(7));
    }

    #[test]
    fn test_insert_str_replaces_selection() {
        let mut buf = EditorBuffer::from_text("hello world");
        buf.set_selection(Selection::new(6, 11));
        buf.insert_str("there");
        assert_eq!(buf.text(), "hello there");
        assert_eq!(buf.selection(), Selection::caret(11));
    }

    #[test]
    fn test_insert_str_empty_is_noop() {
        let mut buf = EditorBuffer::from_text("abc");
        buf.set_selection(Selection::caret(1));
        buf.insert_str("");
        assert_eq!(buf.text(), "abc");
        assert_eq!(buf.selection(), Selection::caret(1));
    }

    #[test]
    fn test_insert_multibyte_advances_by_chars() {
        let mut buf = EditorBuffer::from_text("");
        buf.insert_str("日本");
        assert_eq!(buf.selection(), Selection::caret(2));
        buf.insert_str("語");
        assert_eq!(buf.text(), "日本語");
    }

    #[test]
    fn test_insert_over_reversed_selection() {
        let mut buf = EditorBuffer::from_text("hello");
        buf.set_selection(Selection::new(4, 1));
        buf.insert_str("-");
        assert_eq!(buf.text(), "h-o");
    }

    #[test]
    fn test_delete_back_at_start_is_noop() {
        let mut buf = EditorBuffer::from_text("abc");
        assert!(!buf.delete_back());
        assert_eq!(buf.text(), "abc");
    }

    #[test]
    fn test_delete_back_removes_char_before_caret() {
        let mut buf = EditorBuffer::from_text("abc");
        buf.set_selection(Selection::caret(2));
        assert!(buf.delete_back());
        assert_eq!(buf.text(), "ac");
        assert_eq!(buf.selection(), Selection::caret(1));
    }

    #[test]
    fn test_delete_back_removes_selection() {
        let mut buf = EditorBuffer::from_text("abcdef");
        buf.set_selection(Selection::new(1, 4));
        assert!(buf.delete_back());
        assert_eq!(buf.text(), "aef");
        assert_eq!(buf.selection(), Selection::caret(1));
    }

    #[test]
    fn test_set_text_moves_caret_to_end() {
        let mut buf = EditorBuffer::from_text("old");
        buf.set_text("brand new");
        assert_eq!(buf.text(), "brand new");
        assert_eq!(buf.selection(), Selection::caret(9));
    }
}
