//! Terminal text measurement for the chip bar.
//!
//! Labels are measured in terminal cells: NFC normalization, grapheme
//! segmentation, then a per-cluster width classifier that leans toward
//! over-estimating emoji so a chip never draws wider than it was measured.
//! `CellWidthProvider` applies the chip chrome and affordance texts on top of
//! that and feeds the layout engine through `chip_layout::WidthProvider`.

pub mod chrome;
pub mod provider;
pub mod segment;
pub mod width;

pub use chrome::{
    chip_text, clear_text, collapse_text, expand_text, leading_text, trailing_text,
};
pub use provider::CellWidthProvider;
pub use segment::{Segment, display_width, normalize_and_segment, truncate_to_width};
pub use width::{egc_width, egc_width_str};
