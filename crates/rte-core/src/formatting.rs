//! Interval-based formatting store.
//!
//! Styles are attached to half-open content-index ranges held in a Vec
//! sorted by start offset. The set is small relative to the text (one run
//! per contiguous styled stretch), so binary-search insertion plus linear
//! overlap scans stay cheap while keeping iteration order deterministic.
//!
//! Runs may nest and overlap. Lookup resolves a single style per character
//! with the narrowest-enclosing rule: among all runs containing the index,
//! the one with the smallest width wins. Unformatted characters resolve to
//! [`Style::default`].

use crate::index::ContentIndex;
use crate::style::{Style, StylePatch};

/// One styled range, `start..end` in content offsets.
#[derive(Debug, Clone, PartialEq)]
pub struct FormatRun {
    /// Start offset (inclusive).
    pub start: ContentIndex,
    /// End offset (exclusive).
    pub end: ContentIndex,
    /// The style carried by this run.
    pub style: Style,
}

impl FormatRun {
    /// Create a run. Runs where `start >= end` are rejected by the store.
    pub fn new(start: ContentIndex, end: ContentIndex, style: Style) -> Self {
        Self { start, end, style }
    }

    /// True if `index` falls inside this run.
    pub fn contains(&self, index: ContentIndex) -> bool {
        self.start <= index && index < self.end
    }

    /// Number of characters covered.
    pub fn width(&self) -> usize {
        self.end.get() - self.start.get()
    }

    /// True if this run intersects `start..end`.
    pub fn overlaps(&self, start: ContentIndex, end: ContentIndex) -> bool {
        self.start < end && self.end > start
    }
}

/// Sorted collection of formatting runs for one page.
#[derive(Debug, Clone, Default)]
pub struct FormatStore {
    runs: Vec<FormatRun>,
}

impl FormatStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self { runs: Vec::new() }
    }

    /// Number of runs held.
    pub fn len(&self) -> usize {
        self.runs.len()
    }

    /// True if no runs are held.
    pub fn is_empty(&self) -> bool {
        self.runs.is_empty()
    }

    /// All runs in start order.
    pub fn runs(&self) -> &[FormatRun] {
        &self.runs
    }

    /// Remove every run.
    pub fn clear(&mut self) {
        self.runs.clear();
    }

    /// Visit every run in start order.
    pub fn for_each(&self, mut f: impl FnMut(&FormatRun)) {
        for run in &self.runs {
            f(run);
        }
    }

    /// Insert a run, keeping the Vec sorted by start offset. Empty runs are
    /// dropped.
    pub fn insert(&mut self, run: FormatRun) {
        if run.start >= run.end {
            return;
        }
        let pos = self
            .runs
            .binary_search_by(|r| r.start.cmp(&run.start))
            .unwrap_or_else(|p| p);
        self.runs.insert(pos, run);
    }

    /// Remove coverage in `start..end`. Runs extending past the range keep
    /// their outside parts; a run straddling both bounds is split in two.
    /// Offsets are not shifted.
    pub fn remove_range(&mut self, start: ContentIndex, end: ContentIndex) {
        if start >= end {
            return;
        }
        let mut kept = Vec::with_capacity(self.runs.len());
        for run in self.runs.drain(..) {
            if !run.overlaps(start, end) {
                kept.push(run);
                continue;
            }
            if run.start < start {
                kept.push(FormatRun::new(run.start, start, run.style.clone()));
            }
            if run.end > end {
                kept.push(FormatRun::new(end, run.end, run.style));
            }
        }
        kept.sort_by(|a, b| a.start.cmp(&b.start));
        self.runs = kept;
    }

    /// All runs intersecting `start..end`, in start order.
    pub fn query_range(&self, start: ContentIndex, end: ContentIndex) -> Vec<&FormatRun> {
        self.runs
            .iter()
            .filter(|r| r.overlaps(start, end))
            .collect()
    }

    /// Shift runs right for an insertion of `delta` content characters at
    /// `at`. Runs starting at or after the point move whole; a run
    /// straddling the point stretches to absorb the insertion.
    pub fn shift_for_insertion(&mut self, at: ContentIndex, delta: usize) {
        if delta == 0 {
            return;
        }
        for run in &mut self.runs {
            if run.start >= at {
                run.start += delta;
                run.end += delta;
            } else if run.end > at {
                run.end += delta;
            }
        }
    }

    /// Shift runs left for a deletion of the content range `start..end`.
    /// Runs entirely inside the range disappear; partially covered runs are
    /// clipped.
    pub fn shift_for_deletion(&mut self, start: ContentIndex, end: ContentIndex) {
        if start >= end {
            return;
        }
        let delta = end.get() - start.get();
        let mut kept = Vec::with_capacity(self.runs.len());
        for mut run in self.runs.drain(..) {
            if run.end <= start {
                // entirely before the deletion
                kept.push(run);
            } else if run.start >= end {
                run.start = run.start.saturating_sub(delta);
                run.end = run.end.saturating_sub(delta);
                kept.push(run);
            } else {
                let new_start = run.start.min(start);
                let new_end = if run.end >= end {
                    run.end.saturating_sub(delta)
                } else {
                    start
                };
                if new_start < new_end {
                    run.start = new_start;
                    run.end = new_end;
                    kept.push(run);
                }
            }
        }
        kept.sort_by(|a, b| a.start.cmp(&b.start));
        self.runs = kept;
    }

    /// The narrowest run containing `index`, from a caller-held slice.
    ///
    /// Split out so a layout pass can fetch the runs once and resolve per
    /// character without re-borrowing the store.
    pub fn narrowest_in(runs: &[FormatRun], index: ContentIndex) -> Option<&FormatRun> {
        let mut best: Option<&FormatRun> = None;
        for run in runs {
            if run.start > index {
                break;
            }
            if run.contains(index) {
                best = match best {
                    Some(b) if b.width() <= run.width() => Some(b),
                    _ => Some(run),
                };
            }
        }
        best
    }

    /// Resolved style at `index`: the narrowest enclosing run's style, or
    /// the default style when nothing covers the index.
    pub fn style_at(&self, index: ContentIndex) -> Style {
        Self::narrowest_in(&self.runs, index)
            .map(|r| r.style.clone())
            .unwrap_or_default()
    }

    /// Sub-ranges of `start..end` not covered by any run, in order.
    pub fn covering_gaps(
        &self,
        start: ContentIndex,
        end: ContentIndex,
    ) -> Vec<(ContentIndex, ContentIndex)> {
        let mut gaps = Vec::new();
        if start >= end {
            return gaps;
        }
        let mut cursor = start;
        for run in &self.runs {
            if !run.overlaps(start, end) {
                continue;
            }
            let s = run.start.max(start);
            if s > cursor {
                gaps.push((cursor, s));
            }
            cursor = cursor.max(run.end.min(end));
        }
        if cursor < end {
            gaps.push((cursor, end));
        }
        gaps
    }

    /// Re-tile `start..end` so every character in the range resolves to its
    /// previous style merged with `patch`.
    ///
    /// Overlapping runs are clipped at the range bounds: the parts outside
    /// survive untouched, the parts inside are re-inserted with the patch
    /// merged in, and uncovered stretches get a fresh default-plus-patch run.
    pub fn apply_patch(&mut self, start: ContentIndex, end: ContentIndex, patch: &StylePatch) {
        if start >= end {
            return;
        }

        let mut overlapping = Vec::new();
        let mut kept = Vec::with_capacity(self.runs.len());
        for run in self.runs.drain(..) {
            if run.overlaps(start, end) {
                overlapping.push(run);
            } else {
                kept.push(run);
            }
        }
        self.runs = kept;

        let mut cursor = start;
        for run in overlapping {
            // surviving outside parts
            if run.start < start {
                self.insert(FormatRun::new(run.start, start, run.style.clone()));
            }
            if run.end > end {
                self.insert(FormatRun::new(end, run.end, run.style.clone()));
            }

            // patched inside part
            let s = run.start.max(start);
            let e = run.end.min(end);
            self.insert(FormatRun::new(s, e, run.style.merge(patch)));

            if s > cursor {
                // uncovered stretch before this run
                self.insert(FormatRun::new(cursor, s, Style::default().merge(patch)));
            }
            cursor = cursor.max(e);
        }
        if cursor < end {
            self.insert(FormatRun::new(cursor, end, Style::default().merge(patch)));
        }
    }
}
