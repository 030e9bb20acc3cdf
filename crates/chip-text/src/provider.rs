//! Terminal-cell `WidthProvider`.
//!
//! The terminal draws synchronously, so "rendered width" is simply the display
//! width of the text a chip or control will be drawn as. Widths are cached per
//! item id on `sync_items`; the container width is only known after the first
//! resize report.

use crate::chrome::{chip_text, expand_text, leading_text, trailing_text};
use crate::segment::display_width;
use ahash::AHashMap;
use chip_layout::WidthProvider;
use chip_model::{Item, LocaleStrings, ReservedKey, Width};

#[derive(Debug, Clone, Default)]
pub struct CellWidthProvider {
    items: AHashMap<String, Width>,
    item_count: usize,
    locale: LocaleStrings,
    container: Option<Width>,
    expanded: bool,
}

impl CellWidthProvider {
    pub fn new(locale: LocaleStrings) -> Self {
        Self {
            locale,
            ..Self::default()
        }
    }

    /// Re-measure every chip. Called whenever the item list changes.
    pub fn sync_items(&mut self, items: &[Item]) {
        self.items.clear();
        for item in items {
            self.items
                .insert(item.id.clone(), display_width(&chip_text(item)));
        }
        self.item_count = items.len();
        tracing::trace!(target: "layout.measure", items = items.len(), "cell_widths_synced");
    }

    pub fn set_container(&mut self, cols: Width) {
        self.container = Some(cols);
    }

    /// Which trailing control group the bar currently draws.
    pub fn set_expanded(&mut self, expanded: bool) {
        self.expanded = expanded;
    }

    pub fn set_locale(&mut self, locale: LocaleStrings) {
        self.locale = locale;
    }

    pub fn locale(&self) -> &LocaleStrings {
        &self.locale
    }

    fn leading_width(&self) -> Width {
        leading_text(&self.locale).map_or(0, |t| display_width(&t))
    }

    fn trailing_width(&self) -> Width {
        display_width(&trailing_text(&self.locale, self.expanded))
    }

    // Sized for the widest count it may ever show: every chip hidden.
    fn expand_width(&self) -> Width {
        display_width(&expand_text(self.item_count))
    }
}

impl WidthProvider for CellWidthProvider {
    fn width_of(&self, id: &str) -> Option<Width> {
        self.items.get(id).copied()
    }

    fn reserved_width_of(&self, key: ReservedKey) -> Option<Width> {
        Some(match key {
            ReservedKey::Leading => self.leading_width(),
            ReservedKey::TrailingClear => self.trailing_width(),
            ReservedKey::Expand => self.expand_width(),
        })
    }

    fn container_width(&self) -> Option<Width> {
        self.container
    }
}
