//! Text of every element drawn in the chip bar.
//!
//! Measurement and drawing both go through these functions, so the width the
//! layout engine packs with is the width that lands on screen.

use chip_model::{Item, LocaleStrings};

/// Prefix drawn inside a selected chip.
pub const SELECTED_MARKER: &str = "* ";
/// Delete glyph drawn at the end of every chip.
pub const DELETE_GLYPH: &str = "×";
pub const DEFAULT_CLEAR_LABEL: &str = "Clear all";
pub const COLLAPSE_LABEL: &str = "Show less";

/// `[label ×]`, or `[* label ×]` when selected.
pub fn chip_text(item: &Item) -> String {
    let marker = if item.selected { SELECTED_MARKER } else { "" };
    format!("[{marker}{} {DELETE_GLYPH}]", item.label)
}

/// Leading label plus its separating space; `None` when the bar has no label.
pub fn leading_text(locale: &LocaleStrings) -> Option<String> {
    locale
        .label
        .as_deref()
        .filter(|l| !l.is_empty())
        .map(|l| format!("{l}: "))
}

pub fn clear_text(locale: &LocaleStrings) -> String {
    let label = locale
        .clear_button_label
        .as_deref()
        .unwrap_or(DEFAULT_CLEAR_LABEL);
    format!("[{label}]")
}

/// Expand affordance showing how many chips are hidden.
pub fn expand_text(hidden: usize) -> String {
    format!("[+{hidden} more]")
}

pub fn collapse_text() -> String {
    format!("[{COLLAPSE_LABEL}]")
}

/// Controls that close a row holding the trailing reservation.
///
/// Collapsed, that is row one and it ends with clear-all. Expanded, it is the
/// last row and it ends with collapse followed by clear-all.
pub fn trailing_text(locale: &LocaleStrings, expanded: bool) -> String {
    if expanded {
        format!("{} {}", collapse_text(), clear_text(locale))
    } else {
        clear_text(locale)
    }
}
