//! Width snapshots captured after a layout pass.

use crate::Width;
use ahash::AHashMap;
use std::fmt;

/// Reserved (non-chip) affordance slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReservedKey {
    Leading,
    TrailingClear,
    Expand,
}

impl ReservedKey {
    pub const ALL: [ReservedKey; 3] = [
        ReservedKey::Leading,
        ReservedKey::TrailingClear,
        ReservedKey::Expand,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ReservedKey::Leading => "leading",
            ReservedKey::TrailingClear => "trailing-clear",
            ReservedKey::Expand => "expand",
        }
    }
}

impl fmt::Display for ReservedKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Measured affordance widths. `None` means "not rendered yet".
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReservedWidths {
    pub leading: Option<Width>,
    pub trailing: Option<Width>,
    pub expand: Option<Width>,
}

impl ReservedWidths {
    pub fn get(&self, key: ReservedKey) -> Option<Width> {
        match key {
            ReservedKey::Leading => self.leading,
            ReservedKey::TrailingClear => self.trailing,
            ReservedKey::Expand => self.expand,
        }
    }

    pub fn set(&mut self, key: ReservedKey, width: Option<Width>) {
        match key {
            ReservedKey::Leading => self.leading = width,
            ReservedKey::TrailingClear => self.trailing = width,
            ReservedKey::Expand => self.expand = width,
        }
    }
}

/// Chip widths plus container width for one item set and one container size.
///
/// Built in one go (see `chip_layout::measure::capture`) and never patched
/// afterwards, so it cannot be partially stale.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MeasuredWidths {
    items: AHashMap<String, Width>,
    reserved: ReservedWidths,
    container_width: Width,
}

impl MeasuredWidths {
    pub fn new(container_width: Width) -> Self {
        Self {
            items: AHashMap::new(),
            reserved: ReservedWidths::default(),
            container_width,
        }
    }

    /// Uniform widths keyed by the given ids (test and bench convenience).
    pub fn uniform<'a, I>(ids: I, width: Width, container_width: Width) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut out = Self::new(container_width);
        for id in ids {
            out.items.insert(id.to_string(), width);
        }
        out
    }

    pub fn with_item(mut self, id: impl Into<String>, width: Width) -> Self {
        self.items.insert(id.into(), width);
        self
    }

    pub fn with_reserved(mut self, reserved: ReservedWidths) -> Self {
        self.reserved = reserved;
        self
    }

    /// Width of a chip; unmeasured chips count as zero until the next pass.
    pub fn width_of(&self, id: &str) -> Width {
        self.items.get(id).copied().unwrap_or(0)
    }

    pub fn is_measured(&self, id: &str) -> bool {
        self.items.contains_key(id)
    }

    pub fn reserved(&self) -> &ReservedWidths {
        &self.reserved
    }

    pub fn container_width(&self) -> Width {
        self.container_width
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
