//! Host-supplied font metrics.
//!
//! The engine never loads font files itself; the embedding host parses the
//! font and hands over a [`FontMetrics`] table in design units. Layout
//! scales those units by `font_size / units_per_em` to get pixel boxes.
//!
//! Metrics are allowed to be incomplete. A character with no advance entry
//! (and no default) falls back to a visible placeholder box instead of
//! aborting layout.

use crate::style::Style;
use std::collections::HashMap;

/// Pixel box used when a glyph has no metrics at all.
pub const PLACEHOLDER_BOX: GlyphBox = GlyphBox {
    width: 5.0,
    height: 5.0,
};

/// A scaled glyph bounding box in pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GlyphBox {
    pub width: f32,
    pub height: f32,
}

/// Font measurement table in design units.
#[derive(Debug, Clone)]
pub struct FontMetrics {
    /// Design units per em square.
    pub units_per_em: f32,
    /// Ascender height in design units.
    pub ascent: f32,
    /// Descender depth in design units (positive).
    pub descent: f32,
    /// Capital letter height in design units.
    pub cap_height: f32,
    advances: HashMap<char, f32>,
    default_advance: Option<f32>,
}

impl FontMetrics {
    /// Create a table with no per-character advances.
    pub fn new(units_per_em: f32, ascent: f32, descent: f32, cap_height: f32) -> Self {
        Self {
            units_per_em,
            ascent,
            descent,
            cap_height,
            advances: HashMap::new(),
            default_advance: None,
        }
    }

    /// A monospace-like table where every character shares one advance.
    /// Handy for hosts without real metrics and for deterministic tests.
    pub fn fixed(
        units_per_em: f32,
        advance: f32,
        ascent: f32,
        descent: f32,
        cap_height: f32,
    ) -> Self {
        Self {
            units_per_em,
            ascent,
            descent,
            cap_height,
            advances: HashMap::new(),
            default_advance: Some(advance),
        }
    }

    /// Record the advance for one character, in design units.
    pub fn set_advance(&mut self, ch: char, advance: f32) {
        self.advances.insert(ch, advance);
    }

    /// Builder form of [`set_advance`](Self::set_advance).
    pub fn with_advance(mut self, ch: char, advance: f32) -> Self {
        self.set_advance(ch, advance);
        self
    }

    /// Set the advance used for characters without an entry.
    pub fn with_default_advance(mut self, advance: f32) -> Self {
        self.default_advance = Some(advance);
        self
    }

    /// Pixel box for `ch` at the style's font size.
    ///
    /// Width comes from the character's advance; height spans ascent plus
    /// descent. Unknown characters (or a degenerate em square) yield
    /// [`PLACEHOLDER_BOX`].
    pub fn glyph_box(&self, ch: char, style: &Style) -> GlyphBox {
        let advance = self.advances.get(&ch).copied().or(self.default_advance);
        match advance {
            Some(advance) if self.units_per_em > 0.0 => {
                let scale = style.font_size / self.units_per_em;
                GlyphBox {
                    width: advance * scale,
                    height: (self.ascent + self.descent) * scale,
                }
            }
            _ => PLACEHOLDER_BOX,
        }
    }

    /// Line-advance height in pixels at `font_size`.
    ///
    /// Includes cap height, ascent and descent so stacked lines clear each
    /// other.
    pub fn cap_height_px(&self, font_size: f32) -> f32 {
        if self.units_per_em <= 0.0 {
            return PLACEHOLDER_BOX.height;
        }
        (self.cap_height + self.ascent + self.descent) / self.units_per_em * font_size
    }
}
