//! # rte-core
//!
//! A headless, paginated rich-text engine. The crate owns document state
//! and geometry and leaves drawing, fonts, and input devices to the host:
//! it takes character edits and style patches in, and hands back arrays of
//! positioned, styled glyphs grouped into pages.
//!
//! ## Architecture
//!
//! ```text
//! EditorSession          cursor, selection, key handling
//!    └── MultiPageEditor page list, index translation, rebalancing,
//!        │               visuals, export/import, render sinks
//!        └── FormattedPage   one page of document state
//!            ├── ContentStore   rope-backed text (raw offsets)
//!            ├── FormatStore    style runs (content offsets)
//!            └── LayoutTree     cached positioned glyphs
//! ```
//!
//! Text is addressed in two spaces: [`RawIndex`] counts every character
//! while [`ContentIndex`] skips newlines, which never get a glyph of their
//! own. Formatting and layout live in content space; storage lives in raw
//! space.
//!
//! Each layout pass walks a page's characters once, resolving the
//! narrowest formatting run per character, consuming `- ` and `# `
//! markdown prefixes at line starts, wrapping at the page width, and
//! bumping a page counter at the page height. Items that land past their
//! page are the overflow signal: rebalancing cuts the page there and moves
//! the tail (text and formatting runs) to the next page, sweeping forward
//! until every page fits.
//!
//! ## Example
//!
//! ```rust
//! use rte_core::{
//!     ContentIndex, FontMetrics, MultiPageEditor, PageSize, RawIndex, Style, StylePatch,
//! };
//!
//! // host-supplied metrics: 1000 units/em, every glyph 500 units wide
//! let metrics = FontMetrics::fixed(1000.0, 500.0, 750.0, 250.0, 700.0);
//! let mut editor = MultiPageEditor::new(
//!     PageSize { width: 640.0, height: 900.0 },
//!     metrics,
//! );
//!
//! editor.insert(ContentIndex(0), RawIndex(0), "Hello", &Style::default(), true);
//! editor.alter_formatting(
//!     ContentIndex(0),
//!     ContentIndex(5),
//!     &StylePatch::new().font_weight("700"),
//! );
//!
//! let items = editor.render_all();
//! assert_eq!(items.len(), 5);
//! assert_eq!(items[0].x, 0.0);
//! assert_eq!(items[1].x, 9.0); // 8px glyph + 1px letter spacing
//! assert_eq!(items[2].style.font_weight, "700");
//! ```

pub mod content;
pub mod editor;
pub mod formatting;
pub mod index;
pub mod layout_cache;
pub mod markdown;
pub mod metrics;
pub mod page;
pub mod render;
pub mod session;
pub mod style;
pub mod visual;

pub use content::ContentStore;
pub use editor::{EditError, MultiPageEditor, RenderSinkCallback};
pub use formatting::{FormatRun, FormatStore};
pub use index::{CharRef, ContentIndex, RawIndex};
pub use layout_cache::{LayoutSlice, LayoutTree};
pub use markdown::{LineMarker, PrefixToken, BULLET_GLYPH};
pub use metrics::{FontMetrics, GlyphBox, PLACEHOLDER_BOX};
pub use page::{FormattedPage, LayoutOptions, PageSize};
pub use render::{group_by_page, DocumentExport, RenderItem, RenderUpdate};
pub use session::{CursorPosition, EditorSession};
pub use style::{Style, StylePatch, DEFAULT_FONT_SIZE};
pub use visual::{Visual, VisualId, VisualKind, VisualPatch};
