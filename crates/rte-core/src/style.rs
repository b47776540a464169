//! Character style records.
//!
//! A [`Style`] is a plain value describing how a character is drawn: color,
//! font size, weight, family, and the boolean attributes. Styles are stored
//! by value in the formatting store and carried on every rendered glyph, so
//! they derive `Clone` and compare structurally.
//!
//! Partial updates (what a toolbar "bold" button produces) are modeled as a
//! [`StylePatch`]: every field optional, applied over an existing style with
//! [`Style::merge`].

use serde::{Deserialize, Serialize};

/// Font size used when no formatting run covers a character.
pub const DEFAULT_FONT_SIZE: f32 = 16.0;

/// Font family used when no formatting run covers a character.
pub const DEFAULT_FONT_FAMILY: &str = "Inter";

/// A complete set of drawing attributes for one character.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Style {
    /// CSS-style color string (e.g. `"black"`, `"#ff0000"`).
    pub color: String,
    /// Font size in pixels.
    pub font_size: f32,
    /// Font weight keyword or numeric string (e.g. `"normal"`, `"700"`).
    pub font_weight: String,
    /// Font family name.
    pub font_family: String,
    /// Italic slant.
    pub italic: bool,
    /// Underline decoration.
    pub underline: bool,
    /// Marks the synthetic style attached to newline render items.
    pub is_line_break: bool,
}

impl Default for Style {
    fn default() -> Self {
        Self {
            color: "black".to_string(),
            font_size: DEFAULT_FONT_SIZE,
            font_weight: "normal".to_string(),
            font_family: DEFAULT_FONT_FAMILY.to_string(),
            italic: false,
            underline: false,
            is_line_break: false,
        }
    }
}

impl Style {
    /// The style attached to synthetic newline render items.
    pub fn line_break() -> Self {
        Self {
            is_line_break: true,
            ..Self::default()
        }
    }

    /// Apply a patch over this style, returning the merged result.
    ///
    /// Only the fields present in the patch change; everything else is kept.
    pub fn merge(&self, patch: &StylePatch) -> Style {
        let mut out = self.clone();
        if let Some(color) = &patch.color {
            out.color = color.clone();
        }
        if let Some(size) = patch.font_size {
            out.font_size = size;
        }
        if let Some(weight) = &patch.font_weight {
            out.font_weight = weight.clone();
        }
        if let Some(family) = &patch.font_family {
            out.font_family = family.clone();
        }
        if let Some(italic) = patch.italic {
            out.italic = italic;
        }
        if let Some(underline) = patch.underline {
            out.underline = underline;
        }
        if let Some(is_line_break) = patch.is_line_break {
            out.is_line_break = is_line_break;
        }
        out
    }
}

/// A partial style update. `None` fields leave the target untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StylePatch {
    pub color: Option<String>,
    pub font_size: Option<f32>,
    pub font_weight: Option<String>,
    pub font_family: Option<String>,
    pub italic: Option<bool>,
    pub underline: Option<bool>,
    pub is_line_break: Option<bool>,
}

impl StylePatch {
    /// An empty patch (merging it is a no-op).
    pub fn new() -> Self {
        Self::default()
    }

    /// A patch that sets every field, reproducing `style` exactly when merged
    /// over any base.
    pub fn from_style(style: &Style) -> Self {
        Self {
            color: Some(style.color.clone()),
            font_size: Some(style.font_size),
            font_weight: Some(style.font_weight.clone()),
            font_family: Some(style.font_family.clone()),
            italic: Some(style.italic),
            underline: Some(style.underline),
            is_line_break: Some(style.is_line_break),
        }
    }

    /// True if no field is set.
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }

    /// Set the color.
    pub fn color(mut self, color: &str) -> Self {
        self.color = Some(color.to_string());
        self
    }

    /// Set the font size.
    pub fn font_size(mut self, size: f32) -> Self {
        self.font_size = Some(size);
        self
    }

    /// Set the font weight.
    pub fn font_weight(mut self, weight: &str) -> Self {
        self.font_weight = Some(weight.to_string());
        self
    }

    /// Set the font family.
    pub fn font_family(mut self, family: &str) -> Self {
        self.font_family = Some(family.to_string());
        self
    }

    /// Set italic.
    pub fn italic(mut self, italic: bool) -> Self {
        self.italic = Some(italic);
        self
    }

    /// Set underline.
    pub fn underline(mut self, underline: bool) -> Self {
        self.underline = Some(underline);
        self
    }
}
