//! Rendered output types.
//!
//! A layout pass produces one [`RenderItem`] per character: a positioned,
//! sized, styled glyph tagged with its page. The flattened item array is
//! what hosts draw from, and the same shape round-trips through
//! [`DocumentExport`] as the persisted document format.

use crate::style::Style;
use crate::visual::Visual;
use serde::{Deserialize, Serialize};

/// One positioned character, ready to draw.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderItem {
    /// Character to display. Differs from `real_ch` for markdown-transformed
    /// prefixes (a bullet glyph, or a space for suppressed slots).
    pub ch: char,
    /// Source character as stored in the document.
    pub real_ch: char,
    /// Position within the page, in pixels.
    pub x: f32,
    pub y: f32,
    /// Glyph box, in pixels. Zero width marks a suppressed slot.
    pub width: f32,
    pub height: f32,
    /// Line-advance height the glyph was measured with.
    pub cap_height: f32,
    /// Resolved style of the source character.
    pub style: Style,
    /// Page the item landed on.
    pub page: usize,
}

/// Payload delivered to render sinks after each mutation.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderUpdate {
    /// Full flattened render array across all pages.
    pub items: Vec<RenderItem>,
    /// When set, only items from this offset onward changed and the host
    /// may splice instead of replacing wholesale.
    pub splice_index: Option<usize>,
}

/// Split a flattened item array into per-page groups, indexed by page
/// number. Pages with no items come back empty.
pub fn group_by_page(items: &[RenderItem]) -> Vec<Vec<RenderItem>> {
    let page_count = items.iter().map(|i| i.page + 1).max().unwrap_or(0);
    let mut pages = vec![Vec::new(); page_count];
    for item in items {
        pages[item.page].push(item.clone());
    }
    pages
}

/// Serializable snapshot of a document: per-page render items plus overlay
/// visuals.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DocumentExport {
    pub pages: Vec<Vec<RenderItem>>,
    pub visuals: Vec<Visual>,
}

impl DocumentExport {
    /// Serialize to a JSON string.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    /// Parse from a JSON string.
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    /// Concatenate the page groups back into one flattened array.
    pub fn flattened(&self) -> Vec<RenderItem> {
        self.pages.iter().flatten().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(ch: char, page: usize) -> RenderItem {
        RenderItem {
            ch,
            real_ch: ch,
            x: 0.0,
            y: 0.0,
            width: 8.0,
            height: 16.0,
            cap_height: 27.2,
            style: Style::default(),
            page,
        }
    }

    #[test]
    fn test_group_by_page() {
        let items = vec![item('a', 0), item('b', 0), item('c', 2)];
        let pages = group_by_page(&items);
        assert_eq!(pages.len(), 3);
        assert_eq!(pages[0].len(), 2);
        assert!(pages[1].is_empty());
        assert_eq!(pages[2][0].ch, 'c');
    }

    #[test]
    fn test_group_by_page_empty() {
        assert!(group_by_page(&[]).is_empty());
    }

    #[test]
    fn test_export_json_round_trip() {
        let export = DocumentExport {
            pages: vec![vec![item('a', 0)], vec![item('b', 1)]],
            visuals: Vec::new(),
        };
        let json = export.to_json().unwrap();
        let back = DocumentExport::from_json(&json).unwrap();
        assert_eq!(back, export);
        assert_eq!(back.flattened().len(), 2);
    }
}
