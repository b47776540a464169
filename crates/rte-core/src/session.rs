//! Interactive editing state.
//!
//! [`EditorSession`] wraps a [`MultiPageEditor`] with the state an
//! interactive surface needs: a cursor tracked in both index spaces and an
//! optional selection anchored on resolved character references. The
//! session turns key events into engine operations and keeps the cursor
//! consistent across them.
//!
//! The two cursor components advance independently: typing a newline only
//! moves the raw cursor (newlines own no content slot), and deleting a
//! newline only moves it back.

use crate::editor::{EditError, MultiPageEditor};
use crate::index::{CharRef, ContentIndex, RawIndex};
use crate::style::{Style, StylePatch};

/// Caret position in both index spaces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CursorPosition {
    pub content: ContentIndex,
    pub raw: RawIndex,
}

/// One user's editing state over a document.
pub struct EditorSession {
    editor: MultiPageEditor,
    cursor: CursorPosition,
    selection_anchor: Option<CharRef>,
    selection_focus: Option<CharRef>,
}

impl EditorSession {
    /// Wrap an editor with a cursor at the document start.
    pub fn new(editor: MultiPageEditor) -> Self {
        Self {
            editor,
            cursor: CursorPosition::default(),
            selection_anchor: None,
            selection_focus: None,
        }
    }

    /// The underlying editor.
    pub fn editor(&self) -> &MultiPageEditor {
        &self.editor
    }

    /// The underlying editor, mutable.
    pub fn editor_mut(&mut self) -> &mut MultiPageEditor {
        &mut self.editor
    }

    /// Current caret position.
    pub fn cursor(&self) -> CursorPosition {
        self.cursor
    }

    /// Place the caret on a resolved character, clearing any selection.
    pub fn click(&mut self, at: CharRef) {
        self.cursor = CursorPosition {
            content: at.char_index,
            raw: at.raw_index,
        };
        self.clear_selection();
    }

    /// Start a selection at a character and place the caret there.
    pub fn begin_selection(&mut self, at: CharRef) {
        self.selection_anchor = Some(at);
        self.selection_focus = None;
        self.cursor = CursorPosition {
            content: at.char_index,
            raw: at.raw_index,
        };
    }

    /// Extend the selection to a character.
    pub fn extend_selection(&mut self, at: CharRef) {
        if self.selection_anchor.is_some() {
            self.selection_focus = Some(at);
        }
    }

    /// Drop any selection.
    pub fn clear_selection(&mut self) {
        self.selection_anchor = None;
        self.selection_focus = None;
    }

    /// The selected content range (end exclusive, focus character
    /// included), if a selection with both endpoints exists.
    pub fn selection_range(&self) -> Option<(ContentIndex, ContentIndex)> {
        let (a, b) = self.selection_endpoints()?;
        Some((a.char_index, b.char_index + 1))
    }

    /// The selected raw range matching [`selection_range`](Self::selection_range).
    pub fn selection_raw_range(&self) -> Option<(RawIndex, RawIndex)> {
        let (a, b) = self.selection_endpoints()?;
        Some((a.raw_index, b.raw_index + 1))
    }

    fn selection_endpoints(&self) -> Option<(CharRef, CharRef)> {
        let anchor = self.selection_anchor?;
        let focus = self.selection_focus?;
        if anchor.char_index <= focus.char_index {
            Some((anchor, focus))
        } else {
            Some((focus, anchor))
        }
    }

    /// Insert text at the caret with `style` and advance the caret past it.
    pub fn type_text(&mut self, text: &str, style: &Style) {
        if text.is_empty() {
            return;
        }
        self.editor
            .insert(self.cursor.content, self.cursor.raw, text, style, false);
        let content_chars = text.chars().filter(|&c| c != '\n').count();
        let raw_chars = text.chars().count();
        self.cursor.content += content_chars;
        self.cursor.raw += raw_chars;
    }

    /// Insert a line break. Only the raw cursor advances.
    pub fn press_enter(&mut self) {
        self.editor.insert(
            self.cursor.content,
            self.cursor.raw,
            "\n",
            &Style::default(),
            false,
        );
        self.cursor.raw += 1;
    }

    /// Delete the selection, or the character before the caret.
    pub fn backspace(&mut self) -> Result<(), EditError> {
        if let (Some((start, end)), Some((raw_start, raw_end))) =
            (self.selection_range(), self.selection_raw_range())
        {
            self.editor.delete(start, end, raw_start, raw_end)?;
            self.cursor = CursorPosition {
                content: start,
                raw: raw_start,
            };
            self.clear_selection();
            return Ok(());
        }

        if self.cursor.raw == RawIndex::ZERO {
            return Ok(());
        }
        let prev_raw = self.cursor.raw.saturating_sub(1);
        let deleting_newline = self.editor.get_char_at_index(prev_raw) == Some('\n');

        let (start, end) = if deleting_newline {
            // newlines own no content slot
            (self.cursor.content, self.cursor.content)
        } else {
            (self.cursor.content.saturating_sub(1), self.cursor.content)
        };
        self.editor.delete(start, end, prev_raw, self.cursor.raw)?;

        if !deleting_newline {
            self.cursor.content = self.cursor.content.saturating_sub(1);
        }
        self.cursor.raw = prev_raw;
        Ok(())
    }

    /// Apply a style patch over the selection, if any.
    pub fn apply_formatting(&mut self, patch: &StylePatch) {
        if let Some((start, end)) = self.selection_range() {
            self.editor.alter_formatting(start, end, patch);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::FontMetrics;
    use crate::page::PageSize;

    fn session() -> EditorSession {
        let metrics = FontMetrics::fixed(1000.0, 500.0, 750.0, 250.0, 700.0);
        EditorSession::new(MultiPageEditor::new(
            PageSize {
                width: 640.0,
                height: 900.0,
            },
            metrics,
        ))
    }

    fn char_ref(content: usize, raw: usize) -> CharRef {
        CharRef {
            page: 0,
            span_index: content,
            char_index: ContentIndex(content),
            raw_index: RawIndex(raw),
        }
    }

    #[test]
    fn test_type_text_advances_both_cursors() {
        let mut s = session();
        s.type_text("ab", &Style::default());
        assert_eq!(s.cursor().content, ContentIndex(2));
        assert_eq!(s.cursor().raw, RawIndex(2));
        assert_eq!(s.editor().get_all_content(), "ab");
    }

    #[test]
    fn test_enter_advances_raw_only() {
        let mut s = session();
        s.type_text("ab", &Style::default());
        s.press_enter();
        assert_eq!(s.cursor().content, ContentIndex(2));
        assert_eq!(s.cursor().raw, RawIndex(3));

        s.type_text("c", &Style::default());
        assert_eq!(s.editor().get_all_content(), "ab\nc");
        assert_eq!(s.cursor().content, ContentIndex(3));
        assert_eq!(s.cursor().raw, RawIndex(4));
    }

    #[test]
    fn test_backspace_regular_char() {
        let mut s = session();
        s.type_text("abc", &Style::default());
        s.backspace().unwrap();
        assert_eq!(s.editor().get_all_content(), "ab");
        assert_eq!(s.cursor().content, ContentIndex(2));
        assert_eq!(s.cursor().raw, RawIndex(2));
    }

    #[test]
    fn test_backspace_newline_keeps_content_cursor() {
        let mut s = session();
        s.type_text("ab", &Style::default());
        s.press_enter();
        s.backspace().unwrap();
        assert_eq!(s.editor().get_all_content(), "ab");
        assert_eq!(s.cursor().content, ContentIndex(2));
        assert_eq!(s.cursor().raw, RawIndex(2));
    }

    #[test]
    fn test_backspace_at_start_is_noop() {
        let mut s = session();
        s.backspace().unwrap();
        assert_eq!(s.cursor(), CursorPosition::default());
    }

    #[test]
    fn test_typing_mid_document() {
        let mut s = session();
        s.type_text("Hello", &Style::default());
        s.click(char_ref(2, 2));
        s.type_text("X", &Style::default());
        assert_eq!(s.editor().get_all_content(), "HeXllo");
        assert_eq!(s.cursor().content, ContentIndex(3));
    }

    #[test]
    fn test_selection_delete() {
        let mut s = session();
        s.type_text("abcdef", &Style::default());
        s.begin_selection(char_ref(1, 1));
        s.extend_selection(char_ref(3, 3));
        assert_eq!(
            s.selection_range(),
            Some((ContentIndex(1), ContentIndex(4)))
        );

        s.backspace().unwrap();
        assert_eq!(s.editor().get_all_content(), "aef");
        assert_eq!(s.cursor().content, ContentIndex(1));
        assert!(s.selection_range().is_none());
    }

    #[test]
    fn test_selection_reversed_order() {
        let mut s = session();
        s.type_text("abcdef", &Style::default());
        s.begin_selection(char_ref(4, 4));
        s.extend_selection(char_ref(1, 1));
        assert_eq!(
            s.selection_range(),
            Some((ContentIndex(1), ContentIndex(5)))
        );
    }

    #[test]
    fn test_apply_formatting_over_selection() {
        let mut s = session();
        s.type_text("abcdef", &Style::default());
        s.begin_selection(char_ref(0, 0));
        s.extend_selection(char_ref(2, 2));
        s.apply_formatting(&StylePatch::new().font_weight("700"));

        let page = &s.editor().pages()[0];
        assert_eq!(page.formatting.style_at(ContentIndex(1)).font_weight, "700");
        assert_eq!(
            page.formatting.style_at(ContentIndex(3)).font_weight,
            "normal"
        );
    }

    #[test]
    fn test_click_clears_selection() {
        let mut s = session();
        s.type_text("abc", &Style::default());
        s.begin_selection(char_ref(0, 0));
        s.extend_selection(char_ref(2, 2));
        s.click(char_ref(1, 1));
        assert!(s.selection_range().is_none());
        assert_eq!(s.cursor().content, ContentIndex(1));
    }
}
