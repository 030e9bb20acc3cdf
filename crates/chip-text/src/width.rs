//! Grapheme cluster display width.
//!
//! `egc_width` is the single authority for how many terminal cells one
//! extended grapheme cluster occupies. It classifies the cluster (ASCII,
//! wide East Asian, emoji composites, combining sequences) and maps the kind
//! to a width. Over-estimation only leaves a blank cell behind a chip;
//! under-estimation makes the next chip overdraw it, so every emoji signal
//! widens to 2.
//!
//! Callers segment first; the input must be exactly one cluster.

use unicode_width::UnicodeWidthChar;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EgcKind {
    Ascii,
    Narrow,
    Wide,
    /// One pictographic base, optionally with VS16.
    EmojiSimple,
    /// Pictographic base plus a skin tone modifier.
    EmojiModifier,
    /// Digit, `#` or `*`, optional VS16, then U+20E3.
    EmojiKeycap,
    /// Pair of regional indicators.
    EmojiFlag,
    /// ZWJ sequence of two or more pictographic bases.
    EmojiZwj,
    /// Base plus combining marks; true when the base itself is wide.
    Combining(bool),
}

const ZWJ: char = '\u{200D}';
const KEYCAP_COMBINING: char = '\u{20E3}';

fn is_regional_indicator(c: char) -> bool {
    ('\u{1F1E6}'..='\u{1F1FF}').contains(&c)
}

fn is_skin_tone_modifier(c: char) -> bool {
    ('\u{1F3FB}'..='\u{1F3FF}').contains(&c)
}

// Emoji blocks plus Misc Symbols / Dingbats where the legacy emoji live.
fn is_extended_pictographic(c: char) -> bool {
    ('\u{1F300}'..='\u{1FAFF}').contains(&c) || ('\u{2600}'..='\u{27BF}').contains(&c)
}

fn is_combining_mark(c: char) -> bool {
    ('\u{0300}'..='\u{036F}').contains(&c)
        || ('\u{1AB0}'..='\u{1AFF}').contains(&c)
        || ('\u{1DC0}'..='\u{1DFF}').contains(&c)
        || ('\u{20D0}'..='\u{20FF}').contains(&c)
        || ('\u{FE20}'..='\u{FE2F}').contains(&c)
}

fn char_is_wide(c: char) -> bool {
    UnicodeWidthChar::width(c).unwrap_or(1) == 2
}

fn classify(egc: &str) -> EgcKind {
    let mut chars = egc.chars();
    let Some(first) = chars.next() else {
        return EgcKind::Narrow;
    };
    if chars.next().is_none() {
        if first.is_ascii() {
            return EgcKind::Ascii;
        }
        if is_extended_pictographic(first) {
            return EgcKind::EmojiSimple;
        }
        return if char_is_wide(first) {
            EgcKind::Wide
        } else {
            EgcKind::Narrow
        };
    }

    let len = egc.chars().count();
    let mut pictographic = 0usize;
    let mut regional = 0usize;
    let mut has_zwj = false;
    let mut has_skin = false;
    let mut has_combining = false;
    let mut keycap_base = false;
    let mut ends_with_keycap = false;
    let mut any_wide = false;
    let mut base_wide = None;

    for (i, c) in egc.chars().enumerate() {
        pictographic += usize::from(is_extended_pictographic(c));
        regional += usize::from(is_regional_indicator(c));
        has_zwj |= c == ZWJ;
        has_skin |= is_skin_tone_modifier(c);
        has_combining |= is_combining_mark(c);
        keycap_base |= c.is_ascii_digit() || c == '#' || c == '*';
        ends_with_keycap = c == KEYCAP_COMBINING && i + 1 == len;
        any_wide |= char_is_wide(c);
        if base_wide.is_none() && !is_combining_mark(c) {
            base_wide = Some(is_extended_pictographic(c) || char_is_wide(c));
        }
    }

    if ends_with_keycap && keycap_base {
        EgcKind::EmojiKeycap
    } else if regional == 2 && len == 2 {
        EgcKind::EmojiFlag
    } else if has_zwj && pictographic >= 2 {
        EgcKind::EmojiZwj
    } else if pictographic >= 1 && has_skin {
        EgcKind::EmojiModifier
    } else if pictographic == 1 && !has_zwj {
        EgcKind::EmojiSimple
    } else if has_combining {
        EgcKind::Combining(base_wide.unwrap_or(false))
    } else if any_wide {
        EgcKind::Wide
    } else if pictographic > 0 {
        EgcKind::EmojiSimple
    } else {
        EgcKind::Narrow
    }
}

fn width_for_kind(kind: EgcKind) -> u16 {
    match kind {
        EgcKind::Ascii | EgcKind::Narrow | EgcKind::Combining(false) => 1,
        EgcKind::Wide
        | EgcKind::EmojiSimple
        | EgcKind::EmojiModifier
        | EgcKind::EmojiKeycap
        | EgcKind::EmojiFlag
        | EgcKind::EmojiZwj
        | EgcKind::Combining(true) => 2,
    }
}

/// Display width in cells of a single grapheme cluster. Empty input is 0.
#[inline]
pub fn egc_width(egc: &str) -> u16 {
    if egc.is_empty() {
        return 0;
    }
    // Control characters still take a cell once the renderer escapes them.
    if egc.chars().all(|c| c.is_ascii_control()) {
        return 1;
    }
    let width = width_for_kind(classify(egc));
    if width == 1
        && egc
            .chars()
            .any(|c| is_extended_pictographic(c) || is_regional_indicator(c))
    {
        return 2;
    }
    width
}

/// Convenience alias for call sites holding a `&String` cluster.
#[inline]
pub fn egc_width_str(s: &str) -> u16 {
    egc_width(s)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ascii() {
        assert_eq!(egc_width("a"), 1);
        assert_eq!(egc_width(""), 0);
    }

    #[test]
    fn wide_cjk() {
        assert_eq!(egc_width("界"), 2);
        assert_eq!(egc_width("漢"), 2);
    }

    #[test]
    fn emoji_basic() {
        assert_eq!(egc_width("😀"), 2);
    }

    #[test]
    fn combining_acute() {
        assert_eq!(egc_width("e\u{0301}"), 1);
    }

    #[test]
    fn emoji_flag() {
        assert_eq!(egc_width("🇺🇸"), 2);
    }

    #[test]
    fn lone_regional_indicator_is_widened() {
        assert_eq!(egc_width("\u{1F1FA}"), 2);
    }

    #[test]
    fn emoji_keycap() {
        assert_eq!(egc_width("1️⃣"), 2);
        assert_eq!(egc_width("1\u{20E3}"), 2);
    }

    #[test]
    fn emoji_zwj_family() {
        assert_eq!(egc_width("👨‍👩‍👧‍👦"), 2);
    }

    #[test]
    fn emoji_skin_tone() {
        assert_eq!(egc_width("👍🏽"), 2);
    }

    #[test]
    fn wide_base_with_combining_mark() {
        assert_eq!(egc_width("界\u{0301}"), 2);
    }

    #[test]
    fn variation_selector_on_simple_emoji() {
        assert_eq!(egc_width("❤️"), 2);
    }

    #[test]
    fn chrome_glyphs_are_narrow() {
        assert_eq!(egc_width("×"), 1);
        assert_eq!(egc_width("…"), 1);
        assert_eq!(egc_width("*"), 1);
    }
}
