//! Non-text overlay objects.
//!
//! Visuals are shapes and images anchored to a page at fixed pixel
//! coordinates. They never participate in text layout or pagination; they
//! ride along in the document export so a host can restore them.

use serde::{Deserialize, Serialize};

/// Stable identifier for a visual, allocated by the editor.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct VisualId(pub u64);

/// Shape of a visual.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VisualKind {
    Circle,
    Rectangle,
    Image,
}

/// One overlay object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Visual {
    pub id: VisualId,
    pub kind: VisualKind,
    /// Position on the page, in pixels.
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    /// Fill color for shapes.
    pub fill: String,
    /// Source URL for [`VisualKind::Image`].
    pub url: Option<String>,
    /// Page the visual is anchored to.
    pub page: usize,
}

impl Visual {
    /// Build a visual from a patch, filling unset fields with defaults: a
    /// black 50x50 circle at the top-left of page 0.
    pub fn from_patch(id: VisualId, patch: &VisualPatch) -> Self {
        Self {
            id,
            kind: patch.kind.unwrap_or(VisualKind::Circle),
            x: patch.x.unwrap_or(0.0),
            y: patch.y.unwrap_or(0.0),
            width: patch.width.unwrap_or(50.0),
            height: patch.height.unwrap_or(50.0),
            fill: patch.fill.clone().unwrap_or_else(|| "black".to_string()),
            url: patch.url.clone(),
            page: patch.page.unwrap_or(0),
        }
    }

    /// Apply a patch in place. `None` fields are left untouched.
    pub fn apply(&mut self, patch: &VisualPatch) {
        if let Some(kind) = patch.kind {
            self.kind = kind;
        }
        if let Some(x) = patch.x {
            self.x = x;
        }
        if let Some(y) = patch.y {
            self.y = y;
        }
        if let Some(width) = patch.width {
            self.width = width;
        }
        if let Some(height) = patch.height {
            self.height = height;
        }
        if let Some(fill) = &patch.fill {
            self.fill = fill.clone();
        }
        if let Some(url) = &patch.url {
            self.url = Some(url.clone());
        }
        if let Some(page) = patch.page {
            self.page = page;
        }
    }
}

/// Partial update for a visual, also used to create one.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VisualPatch {
    pub kind: Option<VisualKind>,
    pub x: Option<f32>,
    pub y: Option<f32>,
    pub width: Option<f32>,
    pub height: Option<f32>,
    pub fill: Option<String>,
    pub url: Option<String>,
    pub page: Option<usize>,
}

impl VisualPatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn kind(mut self, kind: VisualKind) -> Self {
        self.kind = Some(kind);
        self
    }

    pub fn position(mut self, x: f32, y: f32) -> Self {
        self.x = Some(x);
        self.y = Some(y);
        self
    }

    pub fn size(mut self, width: f32, height: f32) -> Self {
        self.width = Some(width);
        self.height = Some(height);
        self
    }

    pub fn fill(mut self, fill: &str) -> Self {
        self.fill = Some(fill.to_string());
        self
    }

    pub fn url(mut self, url: &str) -> Self {
        self.url = Some(url.to_string());
        self
    }

    pub fn page(mut self, page: usize) -> Self {
        self.page = Some(page);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_patch_defaults() {
        let v = Visual::from_patch(VisualId(1), &VisualPatch::new());
        assert_eq!(v.kind, VisualKind::Circle);
        assert_eq!((v.x, v.y), (0.0, 0.0));
        assert_eq!((v.width, v.height), (50.0, 50.0));
        assert_eq!(v.fill, "black");
        assert_eq!(v.page, 0);
        assert!(v.url.is_none());
    }

    #[test]
    fn test_apply_patch() {
        let mut v = Visual::from_patch(VisualId(2), &VisualPatch::new());
        v.apply(
            &VisualPatch::new()
                .kind(VisualKind::Image)
                .position(10.0, 20.0)
                .url("https://example.com/cat.png"),
        );
        assert_eq!(v.kind, VisualKind::Image);
        assert_eq!((v.x, v.y), (10.0, 20.0));
        assert_eq!(v.url.as_deref(), Some("https://example.com/cat.png"));
        // untouched fields keep their values
        assert_eq!(v.fill, "black");
        assert_eq!((v.width, v.height), (50.0, 50.0));
    }
}
