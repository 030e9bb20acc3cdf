//! Property-based tests for the row-packing core.

use chip_layout::pack::{pack, pack_widths};
use chip_model::{Item, LayoutConfig, MeasuredWidths};
use proptest::prelude::*;

fn config_strategy() -> impl Strategy<Value = LayoutConfig> {
    (1usize..5, 0u32..12, 0u32..120, 0u32..120, 0u32..120).prop_map(|(rows, gap, l, t, e)| {
        LayoutConfig::new(rows, gap).with_reservations(l, t, e)
    })
}

fn widths_strategy() -> impl Strategy<Value = Vec<u32>> {
    prop::collection::vec(0u32..160, 1..40)
}

/// Chip budget for `row` in collapsed mode, mirroring the documented rules.
fn collapsed_available(cfg: &LayoutConfig, container: u32, row: usize) -> u64 {
    let mut reserved = 0u64;
    if row == 0 {
        reserved += (cfg.leading_reserved_width + cfg.trailing_reserved_width) as u64;
    }
    if row + 1 == cfg.max_rows {
        reserved += cfg.expand_reserved_width as u64;
    }
    (container as u64).saturating_sub(reserved)
}

fn row_used(widths: &[u32], rows: std::ops::Range<usize>, gap: u32) -> u64 {
    widths[rows].iter().map(|w| (*w + gap) as u64).sum()
}

proptest! {
    #[test]
    fn packing_is_idempotent(widths in widths_strategy(), container in 0u32..800, cfg in config_strategy(), expanded in any::<bool>()) {
        let a = pack_widths(&widths, container, &cfg, expanded);
        let b = pack_widths(&widths, container, &cfg, expanded);
        prop_assert_eq!(a, b);
    }

    #[test]
    fn ids_do_not_matter(widths in widths_strategy(), container in 0u32..800, cfg in config_strategy()) {
        let n = widths.len();
        let left: Vec<Item> = (0..n).map(|i| Item::new(format!("x{i}"), "x")).collect();
        let right: Vec<Item> = (0..n).map(|i| Item::new(format!("id-{}", n - i), "y")).collect();
        let mut lw = MeasuredWidths::new(container);
        let mut rw = MeasuredWidths::new(container);
        for (i, w) in widths.iter().enumerate() {
            lw = lw.with_item(left[i].id.as_str(), *w);
            rw = rw.with_item(right[i].id.as_str(), *w);
        }
        prop_assert_eq!(pack(&left, &lw, &cfg, false), pack(&right, &rw, &cfg, false));
    }

    #[test]
    fn wider_container_never_hides_more(widths in widths_strategy(), container in 0u32..600, extra in 0u32..300, cfg in config_strategy()) {
        let narrow = pack_widths(&widths, container, &cfg, false);
        let wide = pack_widths(&widths, container + extra, &cfg, false);
        prop_assert!(wide.visible_count >= narrow.visible_count);
        prop_assert!(!( !narrow.has_overflow && wide.has_overflow ));
    }

    #[test]
    fn at_least_one_chip_is_visible(widths in widths_strategy(), container in 0u32..800, cfg in config_strategy(), expanded in any::<bool>()) {
        let r = pack_widths(&widths, container, &cfg, expanded);
        prop_assert!(r.visible_count >= 1);
    }

    #[test]
    fn overflow_iff_hidden_chips(widths in widths_strategy(), container in 0u32..800, cfg in config_strategy()) {
        let r = pack_widths(&widths, container, &cfg, false);
        prop_assert_eq!(r.has_overflow, r.visible_count < widths.len());
    }

    #[test]
    fn collapsed_rows_are_well_formed(widths in widths_strategy(), container in 0u32..800, cfg in config_strategy()) {
        let r = pack_widths(&widths, container, &cfg, false);
        prop_assert!(r.row_count() <= cfg.max_rows);
        prop_assert!(r.row_boundaries.windows(2).all(|w| w[0] < w[1]));
        prop_assert_eq!(r.row_boundaries.last().map(|l| l + 1), Some(r.visible_count));
        for (row, range) in r.rows().enumerate() {
            let forced = row == 0 && range.len() == 1;
            let used = row_used(&widths, range, cfg.item_gap);
            prop_assert!(forced || used <= collapsed_available(&cfg, container, row));
        }
    }

    #[test]
    fn expanded_shows_everything(widths in widths_strategy(), container in 0u32..800, cfg in config_strategy()) {
        let r = pack_widths(&widths, container, &cfg, true);
        prop_assert_eq!(r.visible_count, widths.len());
        prop_assert!(!r.has_overflow);
        prop_assert_eq!(r.row_boundaries.last().copied(), Some(widths.len() - 1));
    }

    #[test]
    fn expanded_last_row_leaves_collapse_slot(widths in widths_strategy(), container in 0u32..800, cfg in config_strategy()) {
        let r = pack_widths(&widths, container, &cfg, true);
        let rows: Vec<_> = r.rows().collect();
        let last = rows.len() - 1;
        let range = rows[last].clone();
        if range.len() > 1 {
            let leading = if last == 0 { cfg.leading_reserved_width as u64 } else { 0 };
            let available = (container as u64).saturating_sub(leading);
            let used = row_used(&widths, range, cfg.item_gap);
            prop_assert!(used + cfg.trailing_reserved_width as u64 <= available);
        }
    }

    #[test]
    fn single_chip_reservation_boundary(l in 0u32..100, t in 0u32..100, w in 1u32..200, gap in 0u32..10, slack in 0u32..3) {
        // Second chip is tiny; it lands on row 2 only if the first chip fit row 1.
        let cfg = LayoutConfig::new(2, gap).with_reservations(l, t, 0);
        let exact = l + t + w + gap;
        let fits = pack_widths(&[w, 0], exact + slack, &cfg, false);
        prop_assert!(!fits.has_overflow);
        if exact > 0 {
            let tight = pack_widths(&[w, 0], exact - 1, &cfg, false);
            prop_assert!(tight.has_overflow);
        }
    }
}
