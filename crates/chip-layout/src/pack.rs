//! Row-packing core.
//!
//! Greedy, left-to-right, row-major placement of chips into rows of known
//! capacity. Pure: no measurement, no state, no clock. The scheduler feeds it a
//! `MeasuredWidths` snapshot and commits whatever comes back.
//!
//! Row budgets:
//! * Collapsed: row 1 loses `leading + trailing` (label and clear-all); the
//!   last permitted row (`max_rows`) loses `expand`, so the "+N" affordance
//!   always has room when it is needed. With `max_rows == 1` both apply to the
//!   same row. The slot is held even when the chips would all fit without it;
//!   the affordance never appears or disappears because of its own width.
//! * Expanded: rows are unbounded; row 1 still loses `leading`; the final row
//!   must leave `trailing` free for the collapse control.
//!
//! Fit rule: an item fits iff `used + gap + width <= available`. Equality fits.
//!
//! Degenerate inputs:
//! * Empty item list -> `LayoutResult::empty()`.
//! * First item fits nowhere on row 1 (oversize chip, zero-width container)
//!   -> it is force-placed alone on row 1 and every later item overflows.
//! * A later row too narrow for its first item ends packing there.

use chip_model::{Item, LayoutConfig, LayoutResult, MeasuredWidths, Width};

/// Pack `items` using widths from a measurement snapshot.
pub fn pack(
    items: &[Item],
    widths: &MeasuredWidths,
    config: &LayoutConfig,
    expanded: bool,
) -> LayoutResult {
    if items.is_empty() {
        return LayoutResult::empty();
    }
    let item_widths: Vec<Width> = items.iter().map(|i| widths.width_of(&i.id)).collect();
    let result = pack_widths(&item_widths, widths.container_width(), config, expanded);
    tracing::trace!(
        target: "layout.pack",
        items = items.len(),
        container = widths.container_width(),
        expanded,
        visible = result.visible_count,
        rows = result.row_count(),
        overflow = result.has_overflow,
        "pack"
    );
    result
}

/// Pack a plain width sequence. `pack` delegates here after resolving ids.
pub fn pack_widths(
    widths: &[Width],
    container_width: Width,
    config: &LayoutConfig,
    expanded: bool,
) -> LayoutResult {
    if widths.is_empty() {
        return LayoutResult::empty();
    }
    let budget = RowBudget {
        container: container_width as u64,
        config,
        expanded,
    };
    if expanded {
        pack_expanded(widths, &budget)
    } else {
        pack_collapsed(widths, &budget)
    }
}

struct RowBudget<'a> {
    container: u64,
    config: &'a LayoutConfig,
    expanded: bool,
}

impl RowBudget<'_> {
    fn max_rows(&self) -> usize {
        self.config.max_rows.max(1)
    }

    /// Width available to chips on `row` (0-based) before trailing-row checks.
    fn available(&self, row: usize) -> u64 {
        let cfg = self.config;
        let mut reserved = 0u64;
        if row == 0 {
            reserved += cfg.leading_reserved_width as u64;
            if !self.expanded {
                reserved += cfg.trailing_reserved_width as u64;
            }
        }
        if !self.expanded && row + 1 == self.max_rows() {
            reserved += cfg.expand_reserved_width as u64;
        }
        self.container.saturating_sub(reserved)
    }

    fn gap(&self) -> u64 {
        self.config.item_gap as u64
    }
}

/// Place items from `start` onto one row; returns the exclusive end index and
/// the width consumed.
fn fill_row(widths: &[Width], start: usize, available: u64, gap: u64) -> (usize, u64) {
    let mut used = 0u64;
    let mut end = start;
    while let Some(&w) = widths.get(end) {
        let next = used + gap + w as u64;
        if next > available {
            break;
        }
        used = next;
        end += 1;
    }
    (end, used)
}

fn pack_collapsed(widths: &[Width], budget: &RowBudget<'_>) -> LayoutResult {
    let n = widths.len();
    let max_rows = budget.max_rows();
    let mut row_boundaries = Vec::with_capacity(max_rows.min(n));
    let mut next = 0usize;

    for row in 0..max_rows {
        if next == n {
            break;
        }
        let (end, _) = fill_row(widths, next, budget.available(row), budget.gap());
        if end == next {
            if row == 0 {
                // Never render an empty bar when items exist.
                row_boundaries.push(0);
                next = 1;
            }
            break;
        }
        row_boundaries.push(end - 1);
        next = end;
    }

    LayoutResult {
        visible_count: next,
        row_boundaries,
        has_overflow: next < n,
    }
}

fn pack_expanded(widths: &[Width], budget: &RowBudget<'_>) -> LayoutResult {
    let n = widths.len();
    let gap = budget.gap();
    let mut row_boundaries = Vec::new();
    let mut next = 0usize;
    let mut last_used = 0u64;

    while next < n {
        let row = row_boundaries.len();
        let (mut end, mut used) = fill_row(widths, next, budget.available(row), gap);
        if end == next {
            // Oversize chip gets a row of its own.
            used = widths[next] as u64 + gap;
            end = next + 1;
        }
        row_boundaries.push(end - 1);
        last_used = used;
        next = end;
    }

    let trailing = budget.config.trailing_reserved_width as u64;
    let last_row = row_boundaries.len() - 1;
    let last_start = match last_row {
        0 => 0,
        r => row_boundaries[r - 1] + 1,
    };
    let last_end = row_boundaries[last_row];
    if last_end > last_start && last_used + trailing > budget.available(last_row) {
        // Wrap the final chip so the collapse control keeps its slot.
        row_boundaries[last_row] = last_end - 1;
        row_boundaries.push(last_end);
    }

    LayoutResult {
        visible_count: n,
        row_boundaries,
        has_overflow: false,
    }
}
