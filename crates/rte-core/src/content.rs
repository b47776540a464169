//! Character storage.
//!
//! [`ContentStore`] wraps a [`ropey::Rope`] and exposes edits in raw
//! (newline-inclusive) offsets plus conversions into the content
//! (newline-exclusive) space. All range arguments are clamped to the current
//! length rather than panicking; an out-of-range edit degrades to a smaller
//! or empty edit.

use crate::index::{ContentIndex, RawIndex};
use ropey::Rope;

/// Rope-backed text store for a single page.
#[derive(Debug, Clone)]
pub struct ContentStore {
    rope: Rope,
}

impl ContentStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self { rope: Rope::new() }
    }

    /// Create a store holding `text`.
    pub fn from_str(text: &str) -> Self {
        Self {
            rope: Rope::from_str(text),
        }
    }

    /// Total length in raw characters (newlines included).
    pub fn len(&self) -> RawIndex {
        RawIndex(self.rope.len_chars())
    }

    /// True if the store holds no characters at all.
    pub fn is_empty(&self) -> bool {
        self.rope.len_chars() == 0
    }

    /// Length in content characters (newlines excluded).
    ///
    /// O(1): the rope tracks line breaks, so this is total chars minus the
    /// newline count.
    pub fn content_len(&self) -> ContentIndex {
        ContentIndex(self.rope.len_chars() - self.newline_count())
    }

    /// Number of `\n` characters in the store.
    pub fn newline_count(&self) -> usize {
        self.rope.len_lines() - 1
    }

    /// Insert `text` at a raw offset, clamped to the end.
    pub fn insert(&mut self, at: RawIndex, text: &str) {
        let at = at.get().min(self.rope.len_chars());
        self.rope.insert(at, text);
    }

    /// Remove the raw range `start..end`. Both bounds are clamped; an
    /// inverted or empty range is a no-op.
    pub fn remove(&mut self, start: RawIndex, end: RawIndex) {
        let len = self.rope.len_chars();
        let start = start.get().min(len);
        let end = end.get().min(len);
        if start < end {
            self.rope.remove(start..end);
        }
    }

    /// Extract the raw range `start..end` as an owned string (clamped).
    pub fn substring(&self, start: RawIndex, end: RawIndex) -> String {
        let len = self.rope.len_chars();
        let start = start.get().min(len);
        let end = end.get().min(len);
        if start < end {
            self.rope.slice(start..end).to_string()
        } else {
            String::new()
        }
    }

    /// Character at a raw offset, or `None` past the end.
    pub fn char_at(&self, at: RawIndex) -> Option<char> {
        if at.get() < self.rope.len_chars() {
            Some(self.rope.char(at.get()))
        } else {
            None
        }
    }

    /// Full text as an owned string.
    pub fn text(&self) -> String {
        self.rope.to_string()
    }

    /// Raw offset of the `index`-th non-newline character.
    ///
    /// Newlines sitting directly before that character are not included, so
    /// the returned offset always addresses a non-newline character (or the
    /// end of the store when `index` is past the last content character).
    pub fn raw_for_content(&self, index: ContentIndex) -> RawIndex {
        let mut seen = 0usize;
        for (i, ch) in self.rope.chars().enumerate() {
            if ch == '\n' {
                continue;
            }
            if seen == index.get() {
                return RawIndex(i);
            }
            seen += 1;
        }
        RawIndex(self.rope.len_chars())
    }

    /// Content offset corresponding to a raw offset: the number of
    /// non-newline characters strictly before `raw`.
    pub fn content_for_raw(&self, raw: RawIndex) -> ContentIndex {
        let raw = raw.get().min(self.rope.len_chars());
        let newlines = self.rope.char_to_line(raw);
        ContentIndex(raw - newlines)
    }

    /// Count `\n` characters in the raw range `start..end` (clamped).
    pub fn newlines_between(&self, start: RawIndex, end: RawIndex) -> usize {
        let len = self.rope.len_chars();
        let start = start.get().min(len);
        let end = end.get().min(len);
        if start < end {
            self.rope.char_to_line(end) - self.rope.char_to_line(start)
        } else {
            0
        }
    }
}

impl Default for ContentStore {
    fn default() -> Self {
        Self::new()
    }
}
