//! Turns a committed layout into screen lines.
//!
//! Pure: the same inputs always produce the same lines, so the whole bar can be
//! checked without a terminal. Rows follow `LayoutResult` exactly; the view
//! never re-decides what fits.

use chip_model::{Item, LayoutResult, LocaleStrings, Width};
use chip_terminal::{Line, Span};
use chip_text::{
    chip_text, clear_text, display_width, expand_text, leading_text, trailing_text,
    truncate_to_width,
};

pub const HELP_TEXT: &str =
    "←/→ focus · space select · d delete · c clear all · e expand/collapse · q quit";

pub struct BarView<'a> {
    pub items: &'a [Item],
    pub layout: Option<&'a LayoutResult>,
    pub expanded: bool,
    pub focus: Option<usize>,
    pub locale: &'a LocaleStrings,
    pub gap: Width,
    pub container: Width,
}

impl BarView<'_> {
    pub fn lines(&self) -> Vec<Line> {
        let Some(layout) = self.layout else {
            return Vec::new();
        };
        if self.items.is_empty() || layout.is_empty() {
            return Vec::new();
        }
        let gap = " ".repeat(self.gap as usize);
        let rows: Vec<_> = layout.rows().collect();
        let last = rows.len() - 1;
        let mut out = Vec::with_capacity(rows.len());

        for (row, range) in rows.into_iter().enumerate() {
            let mut line: Line = Vec::new();
            if row == 0
                && let Some(lead) = leading_text(self.locale)
            {
                line.push(Span::plain(lead));
            }
            // The item list may already be shorter than the committed layout
            // until the next frame lands.
            let end = range.end.min(self.items.len());
            for idx in range.start..end {
                let mut text = chip_text(&self.items[idx]);
                if display_width(&text) > self.container {
                    text = truncate_to_width(&text, self.container);
                }
                let span = if self.focus == Some(idx) {
                    Span::emphasized(text)
                } else {
                    Span::plain(text)
                };
                line.push(span);
                line.push(Span::plain(gap.clone()));
            }
            if self.expanded {
                if row == last {
                    line.push(Span::plain(trailing_text(self.locale, true)));
                }
            } else {
                if row == 0 {
                    line.push(Span::plain(clear_text(self.locale)));
                }
                if row == last && layout.has_overflow {
                    if row == 0 {
                        line.push(Span::plain(gap.clone()));
                    }
                    let hidden = layout.hidden_count(self.items.len());
                    line.push(Span::plain(expand_text(hidden)));
                }
            }
            out.push(line);
        }
        out
    }
}

pub fn help_line() -> Line {
    vec![Span::plain(HELP_TEXT)]
}

/// Concatenated text of a line.
#[cfg(test)]
pub fn line_text(line: &Line) -> String {
    line.iter().map(|s| s.text.as_str()).collect()
}
