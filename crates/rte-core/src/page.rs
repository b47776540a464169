//! Single-page text engine.
//!
//! A [`FormattedPage`] owns one page's worth of state: the rope-backed
//! character store, the formatting run store, and the layout cache. It can
//! edit its text, re-tile its formatting, and lay its content out into
//! positioned glyphs.
//!
//! Layout walks every character once, resolving the narrowest formatting
//! run, consuming markdown prefixes at line starts, wrapping at the page
//! width and bumping the page counter at the page height. Glyph boxes are
//! reused from the previous cached pass when the character and style still
//! match at the predicted old position.

use crate::content::ContentStore;
use crate::formatting::{FormatRun, FormatStore};
use crate::index::{ContentIndex, RawIndex};
use crate::layout_cache::LayoutTree;
use crate::markdown::{marker_at, prefix_tokens, LineMarker, PrefixToken};
use crate::metrics::FontMetrics;
use crate::render::RenderItem;
use crate::style::{Style, StylePatch, DEFAULT_FONT_SIZE};
use std::sync::Arc;
use tracing::trace;

/// Page dimensions in pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageSize {
    pub width: f32,
    pub height: f32,
}

/// Tunables for the layout walk.
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutOptions {
    /// Horizontal gap added after every glyph, in pixels.
    pub letter_spacing: f32,
    /// Indent for bullet lines, in pixels.
    pub bullet_indent: f32,
    /// Font size applied to heading lines during layout.
    pub heading_font_size: f32,
    /// Rough characters-per-page estimate used for pre-allocation.
    pub avg_page_length: usize,
}

impl Default for LayoutOptions {
    fn default() -> Self {
        Self {
            letter_spacing: 1.0,
            bullet_indent: 12.0,
            heading_font_size: 24.0,
            avg_page_length: 3000,
        }
    }
}

/// One page: content, formatting, and a layout cache.
pub struct FormattedPage {
    /// Character storage in raw offsets.
    pub content: ContentStore,
    /// Formatting runs in content offsets.
    pub formatting: FormatStore,
    /// Cached positioned glyphs from the last layout pass.
    pub layout: LayoutTree,
    /// Page dimensions.
    pub size: PageSize,
    /// This page's position in the document.
    pub page_number: usize,
    metrics: Arc<FontMetrics>,
    options: LayoutOptions,
}

impl FormattedPage {
    /// Create an empty page.
    pub fn new(
        size: PageSize,
        metrics: Arc<FontMetrics>,
        options: LayoutOptions,
        page_number: usize,
    ) -> Self {
        Self {
            content: ContentStore::new(),
            formatting: FormatStore::new(),
            layout: LayoutTree::new(),
            size,
            page_number,
            metrics,
            options,
        }
    }

    /// Create a page pre-filled with text and formatting runs, without
    /// synthesizing default-style coverage.
    pub(crate) fn with_content(
        size: PageSize,
        metrics: Arc<FontMetrics>,
        options: LayoutOptions,
        page_number: usize,
        text: &str,
        runs: Vec<FormatRun>,
    ) -> Self {
        let mut page = Self::new(size, metrics, options, page_number);
        page.content = ContentStore::from_str(text);
        for run in runs {
            page.formatting.insert(run);
        }
        page
    }

    /// Length in content characters.
    pub fn content_len(&self) -> ContentIndex {
        self.content.content_len()
    }

    /// Length in raw characters.
    pub fn raw_len(&self) -> RawIndex {
        self.content.len()
    }

    /// Insert `text` at the given position, applying `style` to the
    /// inserted characters.
    ///
    /// Existing runs shift right by the inserted content length; a run
    /// straddling the insertion point absorbs it. `style` is only laid over
    /// the stretches of the insertion no run absorbed, so typing inside a
    /// styled run keeps that run's style without a narrower default run
    /// shadowing it.
    pub fn insert(&mut self, index: ContentIndex, raw_index: RawIndex, text: &str, style: &Style) {
        if text.is_empty() {
            return;
        }
        let index = index.min(self.content.content_len());
        let raw_index = raw_index.min(self.content.len());
        self.content.insert(raw_index, text);

        let inserted: usize = text.chars().filter(|&c| c != '\n').count();
        if inserted == 0 {
            return;
        }
        self.formatting.shift_for_insertion(index, inserted);

        // newline splits keep content offsets contiguous
        let mut seg_start = index;
        for line in text.split('\n') {
            let len = line.chars().count();
            if len == 0 {
                continue;
            }
            let seg_end = seg_start + len;
            for (gap_start, gap_end) in self.formatting.covering_gaps(seg_start, seg_end) {
                self.formatting
                    .insert(FormatRun::new(gap_start, gap_end, style.clone()));
            }
            seg_start = seg_end;
        }
    }

    /// Delete a range given in both index spaces.
    pub fn delete(
        &mut self,
        start: ContentIndex,
        end: ContentIndex,
        raw_start: RawIndex,
        raw_end: RawIndex,
    ) {
        self.content.remove(raw_start, raw_end);
        self.formatting.shift_for_deletion(start, end);
    }

    /// Re-tile formatting over `start..end` with `patch` and refresh the
    /// layout cache.
    pub fn alter_formatting(&mut self, start: ContentIndex, end: ContentIndex, patch: &StylePatch) {
        let max = self.content.content_len();
        let start = start.min(max);
        let end = end.min(max);
        if start >= end {
            return;
        }
        self.formatting.apply_patch(start, end, patch);
        self.update_layout(0, ContentIndex::ZERO);
    }

    /// Run a layout pass and store the result in the cache.
    ///
    /// `insert_len`/`insert_index` describe the edit since the previous
    /// pass, so cached measurements can be found at their old positions.
    pub fn update_layout(&mut self, insert_len: usize, insert_index: ContentIndex) {
        let items = self.calculate_layout(insert_len, insert_index);
        let end = self.content.len().get().max(1);
        self.layout.update(0, end, items);
    }

    /// Lay out the page's content into positioned glyphs.
    ///
    /// Produces exactly one item per content character, in content order,
    /// each tagged with the page it landed on. Items tagged with a page
    /// greater than `page_number` signal overflow; rebalancing consumes
    /// that signal.
    pub fn calculate_layout(&self, insert_len: usize, insert_index: ContentIndex) -> Vec<RenderItem> {
        let text = self.content.text();
        let chars: Vec<char> = text.chars().collect();
        let runs = self.formatting.runs();
        let prev = self.layout.full_items();

        let mut items = Vec::with_capacity(chars.len().min(self.options.avg_page_length));

        let mut current_x = 0.0f32;
        let mut current_y = 0.0f32;
        let mut line_height = self.metrics.cap_height_px(DEFAULT_FONT_SIZE);
        let mut line_indent = 0.0f32;
        let mut current_page = self.page_number;
        let mut heading_size: Option<f32> = None;
        let mut at_line_start = true;

        let mut content_index = 0usize;
        let mut i = 0usize;
        while i < chars.len() {
            let ch = chars[i];

            if ch == '\n' {
                current_y += line_height;
                current_x = 0.0;
                line_height = self.metrics.cap_height_px(DEFAULT_FONT_SIZE);
                line_indent = 0.0;
                heading_size = None;
                at_line_start = true;
                i += 1;
                continue;
            }

            if at_line_start {
                at_line_start = false;
                let marker = marker_at(&chars, i);
                match marker {
                    LineMarker::Bullet => {
                        line_indent = self.options.bullet_indent;
                        current_x = line_indent;
                    }
                    LineMarker::Heading => {
                        heading_size = Some(self.options.heading_font_size);
                    }
                    LineMarker::Plain => {}
                }
                if marker != LineMarker::Plain {
                    for (offset, token) in prefix_tokens(marker).iter().enumerate() {
                        let real_ch = chars[i + offset];
                        let style = FormatStore::narrowest_in(runs, ContentIndex(content_index))
                            .map(|r| r.style.clone())
                            .unwrap_or_default();
                        let item = match token {
                            PrefixToken::Glyph(glyph) => {
                                let size = heading_size.unwrap_or(style.font_size);
                                let measured = Style {
                                    font_size: size,
                                    ..style.clone()
                                };
                                let glyph_box = self.metrics.glyph_box(*glyph, &measured);
                                let cap_height = self.metrics.cap_height_px(size);

                                if current_y + cap_height > self.size.height {
                                    current_page += 1;
                                    current_y = 0.0;
                                }
                                let item = RenderItem {
                                    ch: *glyph,
                                    real_ch,
                                    x: current_x,
                                    y: current_y,
                                    width: glyph_box.width,
                                    height: glyph_box.height,
                                    cap_height,
                                    style,
                                    page: current_page,
                                };
                                current_x += glyph_box.width + self.options.letter_spacing;
                                line_height = line_height.max(cap_height);
                                item
                            }
                            PrefixToken::Suppressed => RenderItem {
                                ch: ' ',
                                real_ch,
                                x: current_x,
                                y: current_y,
                                width: 0.0,
                                height: 0.0,
                                cap_height: 0.0,
                                style,
                                page: current_page,
                            },
                        };
                        items.push(item);
                        content_index += 1;
                    }
                    i += marker.prefix_len();
                    continue;
                }
            }

            let style = FormatStore::narrowest_in(runs, ContentIndex(content_index))
                .map(|r| r.style.clone())
                .unwrap_or_default();
            let layout_size = heading_size.unwrap_or(style.font_size);
            let cap_height = self.metrics.cap_height_px(layout_size);

            // try the previous pass at the edit-predicted position; the cap
            // height must match too, or a box measured under a heading size
            // override would survive the line turning plain
            let mut cached_box: Option<(f32, f32)> = None;
            if heading_size.is_none() {
                if let Some(prev) = &prev {
                    let shifted = if content_index >= insert_index.get() {
                        content_index.checked_sub(insert_len)
                    } else {
                        Some(content_index)
                    };
                    let candidate = match prev.get(content_index) {
                        Some(it) if it.real_ch == ch => Some(it),
                        _ => shifted.and_then(|s| prev.get(s)),
                    };
                    if let Some(it) = candidate {
                        if it.real_ch == ch
                            && it.style == style
                            && it.width > 0.0
                            && it.cap_height == cap_height
                        {
                            cached_box = Some((it.width, it.height));
                        }
                    }
                }
            }

            let (width, height) = match cached_box {
                Some(b) => b,
                None => {
                    let measured = Style {
                        font_size: layout_size,
                        ..style.clone()
                    };
                    let b = self.metrics.glyph_box(ch, &measured);
                    (b.width, b.height)
                }
            };

            if current_x + width > self.size.width && current_x > line_indent {
                current_x = line_indent;
                current_y += line_height;
                line_height = self.metrics.cap_height_px(DEFAULT_FONT_SIZE);
            }
            if current_y + cap_height > self.size.height {
                trace!(
                    page = current_page,
                    content_index,
                    "layout crossed page height"
                );
                current_page += 1;
                current_y = 0.0;
            }

            items.push(RenderItem {
                ch,
                real_ch: ch,
                x: current_x,
                y: current_y,
                width,
                height,
                cap_height,
                style,
                page: current_page,
            });

            current_x += width + self.options.letter_spacing;
            line_height = line_height.max(cap_height);
            content_index += 1;
            i += 1;
        }

        items
    }

    /// Detach everything from content offset `cut` to the end, returning
    /// the raw text and the formatting runs rebased to start at zero.
    pub fn take_tail(&mut self, cut: ContentIndex) -> (String, Vec<FormatRun>) {
        let raw_cut = self.content.raw_for_content(cut);
        let text = self.content.substring(raw_cut, self.content.len());

        let content_end = self.content.content_len();
        let runs = self.rebased_runs(cut, content_end, cut.get());

        self.delete(cut, content_end, raw_cut, self.content.len());
        (text, runs)
    }

    /// Detach everything before content offset `cut`, returning the raw
    /// text and its formatting runs (already zero-based).
    pub fn take_head(&mut self, cut: ContentIndex) -> (String, Vec<FormatRun>) {
        let raw_cut = self.content.raw_for_content(cut);
        let text = self.content.substring(RawIndex::ZERO, raw_cut);
        let runs = self.rebased_runs(ContentIndex::ZERO, cut, 0);

        self.delete(ContentIndex::ZERO, cut, RawIndex::ZERO, raw_cut);
        (text, runs)
    }

    /// Prepend text and zero-based runs, shifting existing runs right.
    pub fn splice_front(&mut self, text: &str, runs: Vec<FormatRun>) {
        if text.is_empty() {
            return;
        }
        let inserted: usize = text.chars().filter(|&c| c != '\n').count();
        self.content.insert(RawIndex::ZERO, text);
        self.formatting.shift_for_insertion(ContentIndex::ZERO, inserted);
        for run in runs {
            self.formatting.insert(run);
        }
    }

    /// Append text and zero-based runs at the end of the page.
    pub fn splice_back(&mut self, text: &str, runs: Vec<FormatRun>) {
        if text.is_empty() {
            return;
        }
        let base = self.content.content_len().get();
        self.content.insert(self.content.len(), text);
        for run in runs {
            self.formatting
                .insert(FormatRun::new(run.start + base, run.end + base, run.style));
        }
    }

    /// Runs overlapping `start..end`, clipped to the range and shifted left
    /// by `rebase`.
    fn rebased_runs(&self, start: ContentIndex, end: ContentIndex, rebase: usize) -> Vec<FormatRun> {
        self.formatting
            .query_range(start, end)
            .into_iter()
            .map(|run| {
                FormatRun::new(
                    run.start.max(start).saturating_sub(rebase),
                    run.end.min(end).saturating_sub(rebase),
                    run.style.clone(),
                )
            })
            .collect()
    }
}
