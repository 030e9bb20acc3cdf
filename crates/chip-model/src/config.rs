//! Packing parameters.
//!
//! Both chip widgets (tag filter, chip filter panel) feed the same packing core;
//! they differ only in the values held here and in which reserved affordances
//! their width provider reports.

use crate::{ReservedWidths, Width};
use thiserror::Error;

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum LayoutConfigError {
    #[error("max_rows must be at least 1 (got {0})")]
    ZeroRows(usize),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LayoutConfig {
    /// Visible row cap while collapsed.
    pub max_rows: usize,
    /// Gap counted after every chip, including the last one in a row.
    pub item_gap: Width,
    /// Leading label ("Filtered by"), reserved on row 1.
    pub leading_reserved_width: Width,
    /// Clear-all control (collapsed: row 1) / collapse control (expanded: last row).
    pub trailing_reserved_width: Width,
    /// Expand affordance, reserved on the last permitted row while collapsed.
    pub expand_reserved_width: Width,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            max_rows: Self::DEFAULT_MAX_ROWS,
            item_gap: 0,
            leading_reserved_width: 0,
            trailing_reserved_width: 0,
            expand_reserved_width: 0,
        }
    }
}

impl LayoutConfig {
    pub const DEFAULT_MAX_ROWS: usize = 2;

    pub fn new(max_rows: usize, item_gap: Width) -> Self {
        Self {
            max_rows,
            item_gap,
            ..Self::default()
        }
    }

    pub fn with_reservations(mut self, leading: Width, trailing: Width, expand: Width) -> Self {
        self.leading_reserved_width = leading;
        self.trailing_reserved_width = trailing;
        self.expand_reserved_width = expand;
        self
    }

    pub fn validate(&self) -> Result<(), LayoutConfigError> {
        if self.max_rows == 0 {
            return Err(LayoutConfigError::ZeroRows(self.max_rows));
        }
        Ok(())
    }

    /// Overlay measured affordance widths on the configured fallbacks. Keys the
    /// provider could not measure keep their configured value.
    pub fn with_measured(mut self, reserved: &ReservedWidths) -> Self {
        if let Some(w) = reserved.leading {
            self.leading_reserved_width = w;
        }
        if let Some(w) = reserved.trailing {
            self.trailing_reserved_width = w;
        }
        if let Some(w) = reserved.expand {
            self.expand_reserved_width = w;
        }
        self
    }
}
