//! Positioned-glyph cache.
//!
//! [`LayoutTree`] caches the result of a layout pass over a binary
//! interval-subdivision tree. An update stores the item array at every node
//! it visits; nodes only partially covered by the update range split at
//! their midpoint, and fresh children inherit the parent's array by
//! pointer. Arrays are shared as `Arc<[RenderItem]>` so splitting and
//! querying never copy glyph data.
//!
//! The cache favors availability over freshness: a query may return an
//! array from an older pass. Consumers verify a cached entry (character and
//! style match) before trusting its measurements, and fall back to
//! recomputing when it is stale.

use crate::render::RenderItem;
use std::sync::Arc;
use tracing::trace;

/// One leaf's view of the cache, as returned by [`LayoutTree::query`].
#[derive(Debug, Clone)]
pub struct LayoutSlice {
    /// Leaf range start.
    pub start: usize,
    /// Leaf range end (exclusive).
    pub end: usize,
    /// Item array stored at the leaf.
    pub items: Arc<[RenderItem]>,
}

struct LayoutNode {
    start: usize,
    end: usize,
    left: Option<Box<LayoutNode>>,
    right: Option<Box<LayoutNode>>,
    items: Option<Arc<[RenderItem]>>,
}

impl LayoutNode {
    fn new(start: usize, end: usize, items: Option<Arc<[RenderItem]>>) -> Self {
        Self {
            start,
            end,
            left: None,
            right: None,
            items,
        }
    }

    fn is_leaf(&self) -> bool {
        self.left.is_none() && self.right.is_none()
    }

    fn split(&mut self) {
        let mid = self.start + (self.end - self.start) / 2;
        if mid == self.start || mid == self.end {
            return;
        }
        // children start from the parent's cached array
        self.left = Some(Box::new(LayoutNode::new(
            self.start,
            mid,
            self.items.clone(),
        )));
        self.right = Some(Box::new(LayoutNode::new(mid, self.end, self.items.clone())));
    }

    fn update(&mut self, start: usize, end: usize, items: &Arc<[RenderItem]>) {
        if end <= self.start || start >= self.end {
            return;
        }
        self.items = Some(items.clone());
        if start <= self.start && end >= self.end {
            // fully covered, the node becomes a leaf again so stale child
            // arrays cannot shadow this update
            self.left = None;
            self.right = None;
            return;
        }
        if self.is_leaf() {
            self.split();
        }
        if let Some(left) = &mut self.left {
            left.update(start, end, items);
        }
        if let Some(right) = &mut self.right {
            right.update(start, end, items);
        }
    }

    fn query(&self, start: usize, end: usize, out: &mut Vec<LayoutSlice>) {
        if end <= self.start || start >= self.end {
            return;
        }
        if self.is_leaf() {
            if let Some(items) = &self.items {
                out.push(LayoutSlice {
                    start: self.start,
                    end: self.end,
                    items: items.clone(),
                });
            }
            return;
        }
        if let Some(left) = &self.left {
            left.query(start, end, out);
        }
        if let Some(right) = &self.right {
            right.query(start, end, out);
        }
    }
}

/// Binary interval-subdivision cache over one page's layout.
pub struct LayoutTree {
    root: LayoutNode,
}

impl LayoutTree {
    /// Create an empty cache covering the whole addressable range.
    pub fn new() -> Self {
        Self {
            root: LayoutNode::new(0, usize::MAX, None),
        }
    }

    /// Store `items` for the range `start..end`.
    pub fn update(&mut self, start: usize, end: usize, items: Vec<RenderItem>) {
        if start >= end {
            return;
        }
        trace!(start, end, count = items.len(), "layout cache update");
        let items: Arc<[RenderItem]> = items.into();
        self.root.update(start, end, &items);
    }

    /// Leaf slices intersecting `start..end`, in range order. Leaves that
    /// never received an update are skipped.
    pub fn query(&self, start: usize, end: usize) -> Vec<LayoutSlice> {
        let mut out = Vec::new();
        self.root.query(start, end, &mut out);
        out
    }

    /// The most recent full item array, if any pass has run.
    ///
    /// Takes the first populated leaf of a full-range query; by the
    /// inheritance rule that leaf carries the latest array covering it.
    pub fn full_items(&self) -> Option<Arc<[RenderItem]>> {
        self.query(0, usize::MAX)
            .into_iter()
            .next()
            .map(|slice| slice.items)
    }

    /// Cached item for one layout index, cloned out of the latest array.
    pub fn cached_item(&self, index: usize) -> Option<RenderItem> {
        self.full_items()
            .and_then(|items| items.get(index).cloned())
    }
}

impl Default for LayoutTree {
    fn default() -> Self {
        Self::new()
    }
}
