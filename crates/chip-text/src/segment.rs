//! Normalization + segmentation adapter.
//!
//! Labels arrive from arbitrary sources (CLI arguments, files, hosts), so they
//! are normalized to NFC before segmentation: `e` + U+0301 and `é` measure and
//! draw the same. Does not log content.

use crate::egc_width;
use chip_model::Width;
use unicode_normalization::UnicodeNormalization;
use unicode_segmentation::UnicodeSegmentation;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    pub cluster: String,
    pub start: usize, // byte offset in normalized string (inclusive)
    pub end: usize,   // byte offset in normalized string (exclusive)
    pub width: u16,
}

/// Normalize to NFC and segment into grapheme clusters with widths and byte ranges.
pub fn normalize_and_segment(input: &str) -> (String, Vec<Segment>) {
    let normalized: String = input.nfc().collect();
    let mut out = Vec::new();
    let mut byte = 0usize;
    for g in normalized.graphemes(true) {
        let len = g.len();
        out.push(Segment {
            cluster: g.to_string(),
            start: byte,
            end: byte + len,
            width: egc_width(g),
        });
        byte += len;
    }
    (normalized, out)
}

/// Total display width of `text` in cells.
pub fn display_width(text: &str) -> Width {
    let normalized: String = text.nfc().collect();
    normalized
        .graphemes(true)
        .map(|g| Width::from(egc_width(g)))
        .fold(0, Width::saturating_add)
}

const ELLIPSIS: &str = "…";

/// Cut `text` so it draws in at most `max` cells, ending in an ellipsis when
/// anything was dropped. Never splits a grapheme cluster.
pub fn truncate_to_width(text: &str, max: Width) -> String {
    let (normalized, segments) = normalize_and_segment(text);
    let total: Width = segments.iter().map(|s| Width::from(s.width)).sum();
    if total <= max {
        return normalized;
    }
    if max == 0 {
        return String::new();
    }
    let budget = max - 1; // ellipsis is one cell
    let mut used: Width = 0;
    let mut end = 0usize;
    for seg in &segments {
        let w = Width::from(seg.width);
        if used + w > budget {
            break;
        }
        used += w;
        end = seg.end;
    }
    let mut out = normalized[..end].to_string();
    out.push_str(ELLIPSIS);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nfc_equivalence_and_segmentation_single_cluster() {
        let decomposed = "e\u{0301}";
        let composed = "\u{00E9}";
        let (n1, s1) = normalize_and_segment(decomposed);
        let (n2, s2) = normalize_and_segment(composed);
        assert_eq!(n1, n2);
        assert_eq!(s1.len(), 1);
        assert_eq!(s2.len(), 1);
        assert_eq!(s1[0].width, s2[0].width);
        assert_eq!(display_width(decomposed), display_width(composed));
    }

    #[test]
    fn segmentation_covers_input() {
        let s = "漢😀👨‍👩‍👧‍👦a";
        let (n, segs) = normalize_and_segment(s);
        assert_eq!(segs.len(), 4);
        let mut prev_end = 0usize;
        let mut join = String::new();
        for seg in &segs {
            assert_eq!(seg.start, prev_end);
            prev_end = seg.end;
            join.push_str(&seg.cluster);
        }
        assert_eq!(join, n);
        assert_eq!(display_width(s), 7);
    }

    #[test]
    fn truncation_respects_cluster_boundaries() {
        assert_eq!(truncate_to_width("Status: open", 20), "Status: open");
        assert_eq!(truncate_to_width("Status: open", 7), "Status…");
        // A wide cluster that does not fit is dropped whole.
        assert_eq!(truncate_to_width("ab漢字", 4), "ab…");
        assert_eq!(truncate_to_width("anything", 0), "");
        assert_eq!(truncate_to_width("anything", 1), "…");
    }

    #[test]
    fn truncated_text_never_exceeds_budget() {
        for max in 0..12 {
            let t = truncate_to_width("Région: 東京 😀", max);
            assert!(display_width(&t) <= max, "max {max} gave {t:?}");
        }
    }
}
