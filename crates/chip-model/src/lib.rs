//! Chip bar data model.
//!
//! Plain data shared by the measurement, packing and scheduling layers. Nothing
//! in this crate renders or measures; widths are abstract units (terminal cells
//! for the bundled provider, pixels for any other host).
//!
//! Invariants:
//! * `Item` order is significant and preserved verbatim by every consumer.
//! * `Item::id` is the identity key; `label` is opaque text that only drives
//!   rendered width.
//! * `LayoutResult` values are immutable snapshots; a recomputation produces a
//!   fresh value which supersedes the previous one wholesale.

use std::collections::BTreeMap;

pub mod config;
pub mod measured;
pub mod result;

pub use config::{LayoutConfig, LayoutConfigError};
pub use measured::{MeasuredWidths, ReservedKey, ReservedWidths};
pub use result::LayoutResult;

/// Width in layout units (cells, pixels, ...). Unsigned so reservations
/// saturate at zero instead of going negative.
pub type Width = u32;

/// One filter chip.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Item {
    pub id: String,
    pub label: String,
    pub selected: bool,
    /// Opaque caller data, never interpreted by the engine.
    pub metadata: BTreeMap<String, String>,
}

impl Item {
    pub fn new(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            selected: false,
            metadata: BTreeMap::new(),
        }
    }

    pub fn with_selected(mut self, selected: bool) -> Self {
        self.selected = selected;
        self
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    /// True when `other` would render to a different width than `self`.
    ///
    /// Metadata is excluded: it never reaches the chip renderer.
    pub fn renders_differently(&self, other: &Item) -> bool {
        self.id != other.id || self.label != other.label || self.selected != other.selected
    }
}

/// Locale strings handed straight through to the presentation layer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LocaleStrings {
    /// Leading label such as "Filtered by". `None` disables the leading slot.
    pub label: Option<String>,
    pub clear_button_label: Option<String>,
}

impl LocaleStrings {
    pub fn new(label: Option<String>, clear_button_label: Option<String>) -> Self {
        Self {
            label,
            clear_button_label,
        }
    }
}
