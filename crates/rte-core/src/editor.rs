//! Multi-page document coordination.
//!
//! [`MultiPageEditor`] owns the page list and routes every operation:
//! global offsets are translated into a page plus a local offset, the edit
//! is applied to that page, and a forward rebalancing sweep moves content
//! across page boundaries until every page fits again. Each mutation ends
//! with one synchronous notification to the subscribed render sinks
//! carrying the freshly combined flattened layout.

use crate::formatting::FormatRun;
use crate::index::{ContentIndex, RawIndex};
use crate::metrics::{FontMetrics, PLACEHOLDER_BOX};
use crate::page::{FormattedPage, LayoutOptions, PageSize};
use crate::render::{group_by_page, DocumentExport, RenderItem, RenderUpdate};
use crate::style::{Style, StylePatch};
use crate::visual::{Visual, VisualId, VisualPatch};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, trace};

/// Callback receiving the combined render output after each mutation.
pub type RenderSinkCallback = Box<dyn FnMut(&RenderUpdate) + Send>;

/// Errors surfaced by editor operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditError {
    /// A text deletion spanned more than one page.
    CrossPageRange { start_page: usize, end_page: usize },
    /// No visual exists with the given id.
    UnknownVisual(VisualId),
    /// An imported document payload could not be parsed.
    InvalidImport(String),
}

impl fmt::Display for EditError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EditError::CrossPageRange {
                start_page,
                end_page,
            } => write!(
                f,
                "range spans pages {} through {}; deletions must stay on one page",
                start_page, end_page
            ),
            EditError::UnknownVisual(id) => write!(f, "no visual with id {}", id.0),
            EditError::InvalidImport(msg) => write!(f, "invalid document payload: {}", msg),
        }
    }
}

impl std::error::Error for EditError {}

/// The paginated document engine.
pub struct MultiPageEditor {
    pages: Vec<FormattedPage>,
    visuals: Vec<Visual>,
    size: PageSize,
    metrics: Arc<FontMetrics>,
    options: LayoutOptions,
    sinks: Vec<RenderSinkCallback>,
    next_visual_id: u64,
}

impl MultiPageEditor {
    /// Create an editor with one empty page and default layout options.
    pub fn new(size: PageSize, metrics: FontMetrics) -> Self {
        Self::with_options(size, metrics, LayoutOptions::default())
    }

    /// Create an editor with explicit layout options.
    pub fn with_options(size: PageSize, metrics: FontMetrics, options: LayoutOptions) -> Self {
        let metrics = Arc::new(metrics);
        let first = FormattedPage::new(size, metrics.clone(), options.clone(), 0);
        Self {
            pages: vec![first],
            visuals: Vec::new(),
            size,
            metrics,
            options,
            sinks: Vec::new(),
            next_visual_id: 1,
        }
    }

    /// The pages in document order.
    pub fn pages(&self) -> &[FormattedPage] {
        &self.pages
    }

    /// Number of pages.
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// The layout options in effect.
    pub fn options(&self) -> &LayoutOptions {
        &self.options
    }

    /// Register a render sink. Sinks are called in registration order after
    /// every mutation.
    pub fn subscribe<F>(&mut self, sink: F)
    where
        F: FnMut(&RenderUpdate) + Send + 'static,
    {
        self.sinks.push(Box::new(sink));
    }

    /// Resolve a global content offset to `(page, local offset)`.
    ///
    /// An offset at the exact end of a page resolves to the start of the
    /// next page; an offset past the end of the document clamps to the end
    /// of the last page.
    pub fn page_for_content(&self, index: ContentIndex) -> (usize, ContentIndex) {
        let mut acc = 0usize;
        for (i, page) in self.pages.iter().enumerate() {
            let len = page.content_len().get();
            if acc + len > index.get() {
                return (i, ContentIndex(index.get() - acc));
            }
            acc += len;
        }
        let last = self.pages.len() - 1;
        let last_len = self.pages[last].content_len().get();
        let before = acc - last_len;
        (
            last,
            ContentIndex((index.get().saturating_sub(before)).min(last_len)),
        )
    }

    /// Resolve a global raw offset to `(page, local offset)`.
    pub fn page_for_raw(&self, index: RawIndex) -> (usize, RawIndex) {
        let mut acc = 0usize;
        for (i, page) in self.pages.iter().enumerate() {
            let len = page.raw_len().get();
            if acc + len > index.get() {
                return (i, RawIndex(index.get() - acc));
            }
            acc += len;
        }
        let last = self.pages.len() - 1;
        let last_len = self.pages[last].raw_len().get();
        let before = acc - last_len;
        (
            last,
            RawIndex((index.get().saturating_sub(before)).min(last_len)),
        )
    }

    /// Global raw offset of the start of `page`.
    fn raw_offset_of_page(&self, page: usize) -> usize {
        self.pages[..page].iter().map(|p| p.raw_len().get()).sum()
    }

    /// Translate a global raw offset into `page`'s local space, clamped to
    /// the page.
    fn local_raw_on_page(&self, page: usize, raw: RawIndex) -> RawIndex {
        let before = self.raw_offset_of_page(page);
        RawIndex(
            raw.get()
                .saturating_sub(before)
                .min(self.pages[page].raw_len().get()),
        )
    }

    /// Insert `text` at a global position with `style` on the new
    /// characters.
    ///
    /// `initialize` marks a bulk load: layout caches for every page are
    /// refreshed around the rebalancing sweep instead of relying on
    /// incremental reuse.
    pub fn insert(
        &mut self,
        index: ContentIndex,
        raw_index: RawIndex,
        text: &str,
        style: &Style,
        initialize: bool,
    ) {
        if text.is_empty() {
            return;
        }
        let (page_idx, local) = self.page_for_content(index);
        let local_raw = self.local_raw_on_page(page_idx, raw_index);
        let insert_len = text.chars().filter(|&c| c != '\n').count();

        debug!(
            page = page_idx,
            index = local.get(),
            chars = text.chars().count(),
            "insert"
        );
        self.pages[page_idx].insert(local, local_raw, text, style);
        self.render_and_rebalance(page_idx, initialize, insert_len, local, true);
    }

    /// Delete a global range given in both index spaces. The range must not
    /// span more than one page.
    pub fn delete(
        &mut self,
        start: ContentIndex,
        end: ContentIndex,
        raw_start: RawIndex,
        raw_end: RawIndex,
    ) -> Result<(), EditError> {
        let (start_page, local_start) = self.page_for_content(start);
        let (mut end_page, mut local_end) = self.page_for_content(end);

        // the exclusive end of a page-final range resolves to the next page
        if end_page == start_page + 1 && local_end == ContentIndex::ZERO {
            end_page = start_page;
            local_end = self.pages[start_page].content_len();
        }
        if end_page != start_page {
            return Err(EditError::CrossPageRange {
                start_page,
                end_page,
            });
        }

        let local_raw_start = self.local_raw_on_page(start_page, raw_start);
        let local_raw_end = self.local_raw_on_page(start_page, raw_end);

        debug!(
            page = start_page,
            start = local_start.get(),
            end = local_end.get(),
            "delete"
        );
        self.pages[start_page].delete(local_start, local_end, local_raw_start, local_raw_end);
        self.render_and_rebalance(start_page, false, 0, local_start, false);
        Ok(())
    }

    /// Apply a style patch over a global content range, splitting the range
    /// at page boundaries.
    pub fn alter_formatting(&mut self, start: ContentIndex, end: ContentIndex, patch: &StylePatch) {
        if start >= end {
            return;
        }
        let (start_page, local_start) = self.page_for_content(start);
        // resolve the owning page of the last character, not the exclusive end
        let (last_page, local_last) = self.page_for_content(ContentIndex(end.get() - 1));

        for page_idx in start_page..=last_page {
            let seg_start = if page_idx == start_page {
                local_start
            } else {
                ContentIndex::ZERO
            };
            let seg_end = if page_idx == last_page {
                local_last + 1
            } else {
                self.pages[page_idx].content_len()
            };
            self.pages[page_idx].alter_formatting(seg_start, seg_end, patch);
        }
        self.render_and_rebalance(start_page, false, 0, local_start, false);
    }

    /// Rebalance from `start_page`, refresh layout, and notify sinks.
    fn render_and_rebalance(
        &mut self,
        start_page: usize,
        initialize: bool,
        insert_len: usize,
        insert_index: ContentIndex,
        is_insertion: bool,
    ) {
        if initialize {
            self.refresh_layouts_after(start_page);
        }
        self.rebalance_pages(start_page, insert_len, insert_index, is_insertion);
        if initialize {
            self.refresh_layouts_after(start_page);
        }

        let items = self.render_all();
        let update = RenderUpdate {
            items,
            splice_index: None,
        };
        for sink in &mut self.sinks {
            sink(&update);
        }
    }

    fn refresh_layouts_after(&mut self, start_page: usize) {
        for page in self.pages.iter_mut().skip(start_page + 1) {
            page.update_layout(0, ContentIndex::ZERO);
        }
    }

    /// Forward sweep moving content across page boundaries until every page
    /// fits.
    ///
    /// Overflow: the first layout item landing past the page marks the cut;
    /// the tail moves to the front of the next page (created on demand)
    /// together with its formatting runs. Underflow after a deletion pulls
    /// content back from the next page. Trailing empty pages are dropped,
    /// except page zero.
    pub fn rebalance_pages(
        &mut self,
        start_page: usize,
        insert_len: usize,
        insert_index: ContentIndex,
        is_insertion: bool,
    ) {
        let mut i = start_page;
        while i < self.pages.len() {
            self.pages[i].page_number = i;
            let (len, at) = if i == start_page {
                (insert_len, insert_index)
            } else {
                (0, ContentIndex::ZERO)
            };
            let layout = self.pages[i].calculate_layout(len, at);
            let overflow = layout.iter().position(|item| item.page > i);

            if let Some(cut) = overflow {
                // a line taller than the page keeps its first character so
                // the sweep stays bounded by the character count; the
                // residual overflow renders clipped
                let cut = ContentIndex(cut.max(1));
                if cut < self.pages[i].content_len() {
                    debug!(
                        page = i,
                        cut = cut.get(),
                        "page overflow, moving tail forward"
                    );
                    let (text, runs) = self.pages[i].take_tail(cut);
                    if i + 1 >= self.pages.len() {
                        self.pages.push(FormattedPage::new(
                            self.size,
                            self.metrics.clone(),
                            self.options.clone(),
                            i + 1,
                        ));
                    }
                    self.pages[i + 1].splice_front(&text, runs);
                    self.pages[i + 1].page_number = i + 1;
                    self.pages[i + 1].update_layout(0, ContentIndex::ZERO);
                }
            } else if !is_insertion && i + 1 < self.pages.len() {
                self.pull_from_next(i);
            }
            i += 1;
        }

        while self.pages.len() > 1
            && self
                .pages
                .last()
                .map(|p| p.raw_len().get() == 0)
                .unwrap_or(false)
        {
            trace!(page = self.pages.len() - 1, "dropping empty trailing page");
            self.pages.pop();
        }

        let start = start_page.min(self.pages.len() - 1);
        let (len, at) = if start == start_page {
            (insert_len, insert_index)
        } else {
            (0, ContentIndex::ZERO)
        };
        self.pages[start].update_layout(len, at);
    }

    /// Pull as much of page `i + 1` back onto page `i` as fits.
    ///
    /// The concatenation of both pages is laid out as if it lived on page
    /// `i`; the first item landing past the page marks how much stays.
    fn pull_from_next(&mut self, i: usize) {
        let current_len = self.pages[i].content_len().get();
        let next_raw_len = self.pages[i + 1].raw_len().get();
        if next_raw_len == 0 {
            return;
        }

        let combined_text = self.pages[i].content.text() + &self.pages[i + 1].content.text();
        let mut combined_runs: Vec<FormatRun> = self.pages[i].formatting.runs().to_vec();
        for run in self.pages[i + 1].formatting.runs() {
            combined_runs.push(FormatRun::new(
                run.start + current_len,
                run.end + current_len,
                run.style.clone(),
            ));
        }
        let scratch = FormattedPage::with_content(
            self.size,
            self.metrics.clone(),
            self.options.clone(),
            i,
            &combined_text,
            combined_runs,
        );
        let layout = scratch.calculate_layout(0, ContentIndex::ZERO);
        let fits = layout.iter().position(|item| item.page > i);

        match fits {
            None => {
                debug!(page = i, "merging next page back");
                let next_len = self.pages[i + 1].content_len();
                let (text, runs) = self.pages[i + 1].take_head(next_len);
                self.pages[i].splice_back(&text, runs);
                self.pages.remove(i + 1);
                self.pages[i].update_layout(0, ContentIndex::ZERO);
            }
            Some(cut) if cut > current_len => {
                let pull = cut - current_len;
                debug!(page = i, pull, "pulling content back from next page");
                let (text, runs) = self.pages[i + 1].take_head(ContentIndex(pull));
                self.pages[i].splice_back(&text, runs);
                self.pages[i].update_layout(0, ContentIndex::ZERO);
                self.pages[i + 1].update_layout(0, ContentIndex::ZERO);
            }
            Some(_) => {}
        }
    }

    /// Combine every page's text with its cached layout into the flattened
    /// render array, newlines included.
    pub fn render_all(&self) -> Vec<RenderItem> {
        let mut out = Vec::new();
        for (i, page) in self.pages.iter().enumerate() {
            self.combine_text_and_layout(i, page, &mut out);
        }
        out
    }

    /// Merge one page's authoritative text and formatting with its cached
    /// geometry.
    ///
    /// Newlines get synthetic zero-width items carrying the position of the
    /// preceding glyph. If the cache has no entry for a character yet, a
    /// placeholder-sized item is emitted rather than dropping the
    /// character.
    fn combine_text_and_layout(&self, page_idx: usize, page: &FormattedPage, out: &mut Vec<RenderItem>) {
        let cached = page.layout.full_items();
        let text = page.content.text();
        let mut content_i = 0usize;
        let mut last: Option<RenderItem> = None;

        for ch in text.chars() {
            if ch == '\n' {
                let (x, y, cap, page_no) = match &last {
                    Some(it) => (it.x + it.width, it.y, it.cap_height, it.page),
                    None => (0.0, 0.0, 0.0, page_idx),
                };
                out.push(RenderItem {
                    ch: '\n',
                    real_ch: '\n',
                    x,
                    y,
                    width: 0.0,
                    height: 0.0,
                    cap_height: cap,
                    style: Style::line_break(),
                    page: page_no,
                });
                continue;
            }

            let style = page.formatting.style_at(ContentIndex(content_i));
            let item = match cached.as_ref().and_then(|arr| arr.get(content_i)) {
                Some(it) => RenderItem {
                    ch: it.ch,
                    real_ch: it.real_ch,
                    x: it.x,
                    y: it.y,
                    width: it.width,
                    height: it.height,
                    cap_height: it.cap_height,
                    style,
                    page: it.page,
                },
                None => RenderItem {
                    ch,
                    real_ch: ch,
                    x: 0.0,
                    y: 0.0,
                    width: PLACEHOLDER_BOX.width,
                    height: PLACEHOLDER_BOX.height,
                    cap_height: PLACEHOLDER_BOX.height,
                    style,
                    page: page_idx,
                },
            };
            last = Some(item.clone());
            out.push(item);
            content_i += 1;
        }
    }

    /// Full document text, newlines included.
    pub fn get_all_content(&self) -> String {
        let mut out = String::new();
        for page in &self.pages {
            out.push_str(&page.content.text());
        }
        out
    }

    /// Total length in content characters.
    pub fn content_len(&self) -> ContentIndex {
        ContentIndex(self.pages.iter().map(|p| p.content_len().get()).sum())
    }

    /// Total length in raw characters.
    pub fn raw_len(&self) -> RawIndex {
        RawIndex(self.pages.iter().map(|p| p.raw_len().get()).sum())
    }

    /// Character at a global raw offset.
    pub fn get_char_at_index(&self, raw: RawIndex) -> Option<char> {
        let (page, local) = self.page_for_raw(raw);
        self.pages[page].content.char_at(local)
    }

    /// Number of newlines between two global content offsets.
    pub fn get_newlines_between(&self, start: ContentIndex, end: ContentIndex) -> usize {
        let text = self.get_all_content();
        let mut content = 0usize;
        let mut newlines = 0usize;
        for ch in text.chars() {
            if content >= end.get() {
                break;
            }
            if ch == '\n' {
                if content >= start.get() {
                    newlines += 1;
                }
            } else {
                content += 1;
            }
        }
        newlines
    }

    /// Add a visual built from `patch`, returning its id.
    pub fn add_visual(&mut self, patch: &VisualPatch) -> VisualId {
        let id = VisualId(self.next_visual_id);
        self.next_visual_id += 1;
        self.visuals.push(Visual::from_patch(id, patch));
        id
    }

    /// Patch an existing visual.
    pub fn update_visual(&mut self, id: VisualId, patch: &VisualPatch) -> Result<(), EditError> {
        match self.visuals.iter_mut().find(|v| v.id == id) {
            Some(visual) => {
                visual.apply(patch);
                Ok(())
            }
            None => Err(EditError::UnknownVisual(id)),
        }
    }

    /// The overlay visuals.
    pub fn visuals(&self) -> &[Visual] {
        &self.visuals
    }

    /// Snapshot the document as per-page render groups plus visuals.
    pub fn export(&self) -> DocumentExport {
        DocumentExport {
            pages: group_by_page(&self.render_all()),
            visuals: self.visuals.clone(),
        }
    }

    /// Snapshot the document as a JSON string.
    pub fn export_json(&self) -> Result<String, EditError> {
        self.export()
            .to_json()
            .map_err(|e| EditError::InvalidImport(e.to_string()))
    }

    /// Bulk-load a previously exported flattened item array.
    ///
    /// Text is rebuilt from the source characters, inserted in one pass,
    /// and consecutive items sharing a non-default style are re-applied as
    /// formatting runs. Intended for a freshly constructed editor.
    pub fn insert_json(&mut self, items: &[RenderItem]) {
        if items.is_empty() {
            return;
        }
        let text: String = items.iter().map(|it| it.real_ch).collect();
        self.insert(
            ContentIndex::ZERO,
            RawIndex::ZERO,
            &text,
            &Style::default(),
            true,
        );

        // coalesce consecutive equal styles into runs
        let default = Style::default();
        let mut runs: Vec<(usize, usize, Style)> = Vec::new();
        let mut content_i = 0usize;
        for item in items {
            if item.real_ch == '\n' {
                continue;
            }
            if !item.style.is_line_break && item.style != default {
                match runs.last_mut() {
                    Some((_, end, style)) if *end == content_i && *style == item.style => {
                        *end += 1;
                    }
                    _ => runs.push((content_i, content_i + 1, item.style.clone())),
                }
            }
            content_i += 1;
        }
        for (start, end, style) in runs {
            let patch = StylePatch::from_style(&style);
            self.alter_formatting(ContentIndex(start), ContentIndex(end), &patch);
        }
    }

    /// Load a document previously produced by [`export_json`](Self::export_json).
    pub fn import_json(&mut self, json: &str) -> Result<(), EditError> {
        let export =
            DocumentExport::from_json(json).map_err(|e| EditError::InvalidImport(e.to_string()))?;
        self.insert_json(&export.flattened());
        let max_id = export.visuals.iter().map(|v| v.id.0).max().unwrap_or(0);
        self.next_visual_id = self.next_visual_id.max(max_id + 1);
        self.visuals = export.visuals;
        Ok(())
    }
}
