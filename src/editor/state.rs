//! Editor state snapshots
//!
//! The formatting engine never touches a live text widget. A host implements
//! [`SelectionAdapter`] and the engine talks to it exactly twice per command:
//! once to capture an [`EditorState`] and once to apply the result.

use serde::{Deserialize, Serialize};

use crate::markdown::TextChunk;
use crate::string_utils::{char_len, clamp_char_range};

// ─────────────────────────────────────────────────────────────────────────────
// EditorState
// ─────────────────────────────────────────────────────────────────────────────

/// Text, selection and scroll position of an editor at one instant.
///
/// Selection bounds are character offsets.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EditorState {
    pub text: String,
    pub selection_start: usize,
    pub selection_end: usize,
    #[serde(default)]
    pub scroll_top: f32,
}

impl EditorState {
    /// Create a state with the given selection.
    pub fn new(text: impl Into<String>, selection_start: usize, selection_end: usize) -> Self {
        Self {
            text: text.into(),
            selection_start,
            selection_end,
            scroll_top: 0.0,
        }
    }

    /// Create a state with a collapsed caret.
    pub fn with_caret(text: impl Into<String>, caret: usize) -> Self {
        Self::new(text, caret, caret)
    }

    /// Selection bounds clamped to the text, start first.
    pub fn selection(&self) -> (usize, usize) {
        clamp_char_range(&self.text, self.selection_start, self.selection_end)
    }

    /// Split the buffer around the selection.
    pub fn to_chunk(&self) -> TextChunk {
        let (start, end) = self.selection();
        TextChunk::new(&self.text, start, end).with_scroll_top(self.scroll_top)
    }

    /// Reassemble a chunk into a state.
    pub fn from_chunk(chunk: &TextChunk) -> Self {
        let (selection_start, selection_end) = chunk.selection_range();
        Self {
            text: chunk.to_text(),
            selection_start,
            selection_end,
            scroll_top: chunk.scroll_top,
        }
    }

    /// The state after typing `text` over the selection.
    pub fn replace_selection(&self, text: &str) -> Self {
        let mut chunk = self.to_chunk();
        chunk.before.push_str(text);
        chunk.selection.clear();
        Self::from_chunk(&chunk)
    }

    /// The selected text.
    pub fn selected_text(&self) -> String {
        let (start, end) = self.selection();
        self.text.chars().skip(start).take(end - start).collect()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// SelectionAdapter
// ─────────────────────────────────────────────────────────────────────────────

/// The contract between the engine and a host text widget.
pub trait SelectionAdapter {
    /// Snapshot the widget's content, selection and scroll position.
    fn capture_state(&self) -> EditorState;

    /// Replace the widget's content, selection and scroll position.
    fn apply_state(&mut self, state: EditorState);
}

// ─────────────────────────────────────────────────────────────────────────────
// TextBuffer
// ─────────────────────────────────────────────────────────────────────────────

/// An in-memory text widget.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TextBuffer {
    state: EditorState,
    /// Number of times a state was applied
    revision: u64,
}

impl TextBuffer {
    /// Create a buffer with the caret at the end of `text`.
    pub fn new(text: impl Into<String>) -> Self {
        let text = text.into();
        let end = char_len(&text);
        Self {
            state: EditorState::with_caret(text, end),
            revision: 0,
        }
    }

    /// Builder method to set the selection.
    #[must_use]
    pub fn with_selection(mut self, start: usize, end: usize) -> Self {
        self.set_selection(start, end);
        self
    }

    pub fn text(&self) -> &str {
        &self.state.text
    }

    /// Current selection, clamped, start first.
    pub fn selection(&self) -> (usize, usize) {
        self.state.selection()
    }

    pub fn set_selection(&mut self, start: usize, end: usize) {
        self.state.selection_start = start;
        self.state.selection_end = end;
    }

    pub fn scroll_top(&self) -> f32 {
        self.state.scroll_top
    }

    pub fn set_scroll_top(&mut self, scroll_top: f32) {
        self.state.scroll_top = scroll_top;
    }

    pub fn selected_text(&self) -> String {
        self.state.selected_text()
    }

    /// How many times the buffer was written through the adapter.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Replace the selection with `text`, leaving the caret after it.
    pub fn insert(&mut self, text: &str) {
        let state = self.state.replace_selection(text);
        self.apply_state(state);
    }
}

impl SelectionAdapter for TextBuffer {
    fn capture_state(&self) -> EditorState {
        self.state.clone()
    }

    fn apply_state(&mut self, state: EditorState) {
        self.state = state;
        self.revision += 1;
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_selection_is_clamped() {
        let state = EditorState::new("abc", 7, 1);
        assert_eq!(state.selection(), (1, 3));
        assert_eq!(state.selected_text(), "bc");
    }

    #[test]
    fn test_state_chunk_roundtrip() {
        let mut state = EditorState::new("één twee", 4, 8);
        state.scroll_top = 12.0;
        let chunk = state.to_chunk();
        assert_eq!(chunk.selection, "twee");
        assert_eq!(EditorState::from_chunk(&chunk), state);
    }

    #[test]
    fn test_state_json() {
        let state = EditorState::new("x", 0, 1);
        let json = serde_json::to_string(&state).unwrap();
        assert!(json.contains("\"selection_end\":1"));
        let back: EditorState = serde_json::from_str(r#"{"text":"x","selection_start":0,"selection_end":1}"#).unwrap();
        assert_eq!(back, state);
    }

    #[test]
    fn test_buffer_starts_with_caret_at_end() {
        let buffer = TextBuffer::new("Grüße");
        assert_eq!(buffer.selection(), (5, 5));
        assert_eq!(buffer.revision(), 0);
    }

    #[test]
    fn test_buffer_insert_replaces_selection() {
        let mut buffer = TextBuffer::new("hello world").with_selection(6, 11);
        buffer.insert("there");
        assert_eq!(buffer.text(), "hello there");
        assert_eq!(buffer.selection(), (11, 11));
        assert_eq!(buffer.revision(), 1);
    }

    #[test]
    fn test_buffer_adapter_roundtrip() {
        let mut buffer = TextBuffer::new("abc");
        let mut state = buffer.capture_state();
        state.text = "abcd".into();
        state.selection_start = 1;
        state.selection_end = 2;
        buffer.apply_state(state);
        assert_eq!(buffer.text(), "abcd");
        assert_eq!(buffer.selected_text(), "b");
    }
}
