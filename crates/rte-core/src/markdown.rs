//! Line-start markdown prefixes.
//!
//! Two prefixes get special treatment when they open a line: `- ` renders
//! as an indented bullet glyph and `# ` turns the line into a heading. The
//! source characters stay in the document untouched; only their display
//! tokens change. Every prefix character still occupies one layout slot so
//! content indices keep a 1:1 mapping onto layout items.
//!
//! A [`PrefixToken::Suppressed`] slot is emitted as a zero-width item whose
//! display character is a space, so renderers draw nothing for it while
//! hit testing and index math still see the slot.

/// Glyph substituted for the dash of a `- ` prefix.
pub const BULLET_GLYPH: char = '\u{2022}';

/// Classification of a line by its first characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineMarker {
    /// No recognized prefix.
    Plain,
    /// Line opens with `- `.
    Bullet,
    /// Line opens with `# `.
    Heading,
}

impl LineMarker {
    /// Number of source characters the prefix consumes.
    pub fn prefix_len(self) -> usize {
        match self {
            LineMarker::Plain => 0,
            LineMarker::Bullet | LineMarker::Heading => 2,
        }
    }
}

/// How one consumed prefix character is displayed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrefixToken {
    /// Render this glyph in place of the source character.
    Glyph(char),
    /// Occupy a layout slot but draw nothing.
    Suppressed,
}

/// Classify the line starting at the beginning of `line`.
pub fn detect_marker(line: &str) -> LineMarker {
    if line.starts_with("- ") {
        LineMarker::Bullet
    } else if line.starts_with("# ") {
        LineMarker::Heading
    } else {
        LineMarker::Plain
    }
}

/// Classify the line starting at `chars[at]`.
pub fn marker_at(chars: &[char], at: usize) -> LineMarker {
    match (chars.get(at), chars.get(at + 1)) {
        (Some('-'), Some(' ')) => LineMarker::Bullet,
        (Some('#'), Some(' ')) => LineMarker::Heading,
        _ => LineMarker::Plain,
    }
}

/// Display tokens for a marker's prefix characters, in source order.
pub fn prefix_tokens(marker: LineMarker) -> &'static [PrefixToken] {
    match marker {
        LineMarker::Plain => &[],
        // the dash becomes a bullet, the space after it is hidden
        LineMarker::Bullet => &[PrefixToken::Glyph(BULLET_GLYPH), PrefixToken::Suppressed],
        // both hash and space are hidden; the size override carries the look
        LineMarker::Heading => &[PrefixToken::Suppressed, PrefixToken::Suppressed],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_marker() {
        assert_eq!(detect_marker("- item"), LineMarker::Bullet);
        assert_eq!(detect_marker("# title"), LineMarker::Heading);
        assert_eq!(detect_marker("plain"), LineMarker::Plain);
        // prefix needs the trailing space
        assert_eq!(detect_marker("-item"), LineMarker::Plain);
        assert_eq!(detect_marker("#"), LineMarker::Plain);
        assert_eq!(detect_marker(""), LineMarker::Plain);
    }

    #[test]
    fn test_marker_at_mid_slice() {
        let chars: Vec<char> = "ab\n- x".chars().collect();
        assert_eq!(marker_at(&chars, 0), LineMarker::Plain);
        assert_eq!(marker_at(&chars, 3), LineMarker::Bullet);
        assert_eq!(marker_at(&chars, 5), LineMarker::Plain);
    }

    #[test]
    fn test_prefix_tokens_match_prefix_len() {
        for marker in [LineMarker::Plain, LineMarker::Bullet, LineMarker::Heading] {
            assert_eq!(prefix_tokens(marker).len(), marker.prefix_len());
        }
        assert_eq!(
            prefix_tokens(LineMarker::Bullet)[0],
            PrefixToken::Glyph(BULLET_GLYPH)
        );
    }
}
