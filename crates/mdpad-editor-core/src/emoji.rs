//! Emoji detection for inline `Emoji` spans.
//!
//! A grapheme counts as an emoji when it starts with a pictographic code point,
//! carries an emoji presentation selector, or is a regional-indicator flag pair.

const VARIATION_SELECTOR_16: char = '\u{FE0F}';
const KEYCAP: char = '\u{20E3}';

fn is_pictographic(c: char) -> bool {
    matches!(c as u32,
        0x1F300..=0x1F5FF   // misc symbols and pictographs
        | 0x1F600..=0x1F64F // emoticons
        | 0x1F680..=0x1F6FF // transport and map
        | 0x1F900..=0x1F9FF // supplemental symbols and pictographs
        | 0x1FA70..=0x1FAFF // symbols and pictographs extended-A
        | 0x1F000..=0x1F0FF // mahjong, dominos, playing cards
        | 0x1F200..=0x1F2FF // enclosed ideographic supplement
        | 0x2600..=0x26FF   // misc symbols
        | 0x2700..=0x27BF   // dingbats
        | 0x2B50 | 0x2B55 | 0x2B1B | 0x2B1C
        | 0x231A | 0x231B | 0x23E9..=0x23F3 | 0x23F8..=0x23FA
    )
}

fn is_regional_indicator(c: char) -> bool {
    matches!(c as u32, 0x1F1E6..=0x1F1FF)
}

/// Whether `grapheme` renders as an emoji.
pub fn is_emoji(grapheme: &str) -> bool {
    let mut chars = grapheme.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    if is_pictographic(first) {
        return true;
    }
    if is_regional_indicator(first) {
        return chars.next().is_some_and(is_regional_indicator);
    }
    // Keycaps and text-default symbols forced to emoji presentation.
    grapheme.contains(KEYCAP) || (!first.is_ascii() && grapheme.contains(VARIATION_SELECTOR_16))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detects_common_emoji() {
        assert!(is_emoji("🎉"));
        assert!(is_emoji("👍🏽"));
        assert!(is_emoji("👨\u{200d}👩\u{200d}👧"));
        assert!(is_emoji("🇳🇴"));
        assert!(is_emoji("❤\u{FE0F}"));
        assert!(is_emoji("1\u{FE0F}\u{20E3}"));
    }

    #[test]
    fn test_rejects_plain_text() {
        assert!(!is_emoji("a"));
        assert!(!is_emoji("é"));
        assert!(!is_emoji("1"));
        assert!(!is_emoji(""));
        assert!(!is_emoji("\u{1F1E6}"));
    }
}
