//! Width measurement seam.
//!
//! The engine never renders. Hosts implement `WidthProvider` on top of their
//! renderer (terminal cells, DOM boxes, glyph runs) and the scheduler calls
//! `capture` only from a frame callback, after layout has settled. Earlier
//! queries may observe stale or missing widths and are not authoritative.
//!
//! `None` from any query means "not rendered yet"; `capture` records such
//! chips as unmeasured (width 0) and leaves the reserved slot unset so the
//! configured fallback applies. The next pass corrects the transient
//! over-packing this can cause.

use ahash::AHashMap;
use chip_model::{Item, MeasuredWidths, ReservedKey, ReservedWidths, Width};

/// Read-only view of rendered widths.
pub trait WidthProvider {
    /// Rendered width of the chip for `id`.
    fn width_of(&self, id: &str) -> Option<Width>;
    /// Rendered width of a reserved affordance.
    fn reserved_width_of(&self, key: ReservedKey) -> Option<Width>;
    /// Current content-box width of the chip container.
    fn container_width(&self) -> Option<Width>;
}

impl<P: WidthProvider + ?Sized> WidthProvider for &P {
    fn width_of(&self, id: &str) -> Option<Width> {
        (**self).width_of(id)
    }

    fn reserved_width_of(&self, key: ReservedKey) -> Option<Width> {
        (**self).reserved_width_of(key)
    }

    fn container_width(&self) -> Option<Width> {
        (**self).container_width()
    }
}

/// Take one consistent snapshot of every width the packing core needs.
pub fn capture<P: WidthProvider + ?Sized>(provider: &P, items: &[Item]) -> MeasuredWidths {
    let container = provider.container_width().unwrap_or(0);
    let mut reserved = ReservedWidths::default();
    for key in ReservedKey::ALL {
        reserved.set(key, provider.reserved_width_of(key));
    }
    let mut unmeasured = 0usize;
    let mut out = MeasuredWidths::new(container).with_reserved(reserved);
    for item in items {
        match provider.width_of(&item.id) {
            Some(w) => out = out.with_item(item.id.as_str(), w),
            None => unmeasured += 1,
        }
    }
    if unmeasured > 0 {
        tracing::debug!(target: "layout.measure", unmeasured, items = items.len(), "widths_incomplete");
    }
    out
}

/// Provider backed by precomputed widths. Useful for hosts that measure
/// eagerly and for tests.
#[derive(Debug, Clone, Default)]
pub struct StaticWidthProvider {
    items: AHashMap<String, Width>,
    reserved: ReservedWidths,
    container: Option<Width>,
}

impl StaticWidthProvider {
    pub fn new(container: Width) -> Self {
        Self {
            container: Some(container),
            ..Self::default()
        }
    }

    /// Provider for a container that has not reported its size yet.
    pub fn unmeasured() -> Self {
        Self::default()
    }

    pub fn with_item(mut self, id: impl Into<String>, width: Width) -> Self {
        self.items.insert(id.into(), width);
        self
    }

    pub fn with_reserved(mut self, key: ReservedKey, width: Width) -> Self {
        self.reserved.set(key, Some(width));
        self
    }

    pub fn set_item(&mut self, id: impl Into<String>, width: Width) {
        self.items.insert(id.into(), width);
    }

    pub fn set_container(&mut self, width: Width) {
        self.container = Some(width);
    }
}

impl WidthProvider for StaticWidthProvider {
    fn width_of(&self, id: &str) -> Option<Width> {
        self.items.get(id).copied()
    }

    fn reserved_width_of(&self, key: ReservedKey) -> Option<Width> {
        self.reserved.get(key)
    }

    fn container_width(&self) -> Option<Width> {
        self.container
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capture_snapshots_everything() {
        let provider = StaticWidthProvider::new(300)
            .with_item("a", 50)
            .with_item("b", 60)
            .with_reserved(ReservedKey::TrailingClear, 12);
        let items = [Item::new("a", "A"), Item::new("b", "B")];
        let snap = capture(&provider, &items);
        assert_eq!(snap.container_width(), 300);
        assert_eq!(snap.width_of("a"), 50);
        assert_eq!(snap.width_of("b"), 60);
        assert_eq!(snap.reserved().trailing, Some(12));
        assert_eq!(snap.reserved().leading, None);
    }

    #[test]
    fn unrendered_container_and_items_read_as_zero() {
        let provider = StaticWidthProvider::unmeasured();
        let items = [Item::new("a", "A")];
        let snap = capture(&provider, &items);
        assert_eq!(snap.container_width(), 0);
        assert_eq!(snap.width_of("a"), 0);
        assert!(!snap.is_measured("a"));
    }

    #[test]
    fn only_requested_ids_are_captured() {
        let provider = StaticWidthProvider::new(10)
            .with_item("a", 1)
            .with_item("stale", 2);
        let snap = capture(&provider, &[Item::new("a", "A")]);
        assert_eq!(snap.len(), 1);
        assert!(!snap.is_measured("stale"));
    }
}
