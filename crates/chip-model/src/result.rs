//! Packing output.
//!
//! Contract:
//! * `row_boundaries[k]` is the index of the last item placed on row `k`;
//!   boundaries are strictly increasing.
//! * `visible_count == row_boundaries.last() + 1` for a non-empty layout.
//! * An empty layout (no items) has `visible_count == 0`, no rows and no
//!   overflow. It is produced by the caller, never by packing.

use std::ops::Range;

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct LayoutResult {
    pub visible_count: usize,
    pub row_boundaries: Vec<usize>,
    pub has_overflow: bool,
}

impl LayoutResult {
    /// The "nothing rendered" result for an empty item list.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.visible_count == 0
    }

    pub fn row_count(&self) -> usize {
        self.row_boundaries.len()
    }

    /// Number of items hidden behind the expand affordance.
    pub fn hidden_count(&self, item_count: usize) -> usize {
        item_count.saturating_sub(self.visible_count)
    }

    pub fn is_visible(&self, index: usize) -> bool {
        index < self.visible_count
    }

    /// Row (0-based) holding `index`, or `None` for hidden items.
    pub fn row_of(&self, index: usize) -> Option<usize> {
        if !self.is_visible(index) {
            return None;
        }
        Some(self.row_boundaries.partition_point(|&last| last < index))
    }

    /// Half-open item index ranges, one per populated row.
    pub fn rows(&self) -> impl Iterator<Item = Range<usize>> + '_ {
        let mut start = 0usize;
        self.row_boundaries.iter().map(move |&last| {
            let range = start..last + 1;
            start = last + 1;
            range
        })
    }

    /// The expand/collapse control renders when items are hidden or the bar
    /// is expanded (it then offers "collapse").
    pub fn shows_expand_affordance(&self, expanded: bool) -> bool {
        self.has_overflow || expanded
    }
}
