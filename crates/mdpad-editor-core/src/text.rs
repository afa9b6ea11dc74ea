//! String helpers: char/byte/UTF-16 conversion and grapheme-aware scanning.
//!
//! Browser selections report UTF-16 code unit offsets; the core counts chars.
//! Deletion extents are computed over grapheme clusters so an emoji with a
//! ZWJ sequence or a combining accent is removed as one unit.

use serde::{Deserialize, Serialize};
use unicode_segmentation::UnicodeSegmentation;

/// Number of chars in `s`.
pub fn char_len(s: &str) -> usize {
    s.chars().count()
}

/// Byte index of the `char_idx`th char, clamped to `s.len()`.
pub fn char_to_byte(s: &str, char_idx: usize) -> usize {
    s.char_indices()
        .nth(char_idx)
        .map(|(b, _)| b)
        .unwrap_or(s.len())
}

/// Convert a UTF-16 offset into a char offset. An offset that lands inside a
/// surrogate pair rounds down to the start of that char.
pub fn utf16_to_char(s: &str, utf16_offset: usize) -> usize {
    let mut units = 0;
    for (i, c) in s.chars().enumerate() {
        let next = units + c.len_utf16();
        if next > utf16_offset {
            return i;
        }
        units = next;
    }
    char_len(s)
}

/// Convert a char offset into a UTF-16 offset.
pub fn char_to_utf16(s: &str, char_offset: usize) -> usize {
    s.chars().take(char_offset).map(char::len_utf16).sum()
}

/// Character classes used for word-granularity deletion.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CharClass {
    Whitespace,
    Alphanumeric,
    Punctuation,
}

impl CharClass {
    /// Classify a grapheme by its first char. Emoji and other symbols count
    /// as punctuation.
    pub fn of(grapheme: &str) -> Self {
        match grapheme.chars().next() {
            Some(c) if c.is_whitespace() => CharClass::Whitespace,
            Some(c) if c.is_alphanumeric() || c == '_' => CharClass::Alphanumeric,
            _ => CharClass::Punctuation,
        }
    }
}

/// How much a deletion removes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DeleteUnit {
    /// One grapheme cluster.
    Rune,
    /// A run of graphemes of one [`CharClass`].
    Word,
    /// Everything up to the line boundary.
    Paragraph,
}

/// Chars to delete going backward from column `x` of `line`. Zero at the
/// start of the line; joining lines is the caller's job.
pub fn backward_extent(line: &str, x: usize, unit: DeleteUnit) -> usize {
    let before = &line[..char_to_byte(line, x)];
    match unit {
        DeleteUnit::Paragraph => char_len(before),
        DeleteUnit::Rune => before.graphemes(true).next_back().map(char_len).unwrap_or(0),
        DeleteUnit::Word => {
            let mut graphemes = before.graphemes(true).rev().peekable();
            let Some(class) = graphemes.peek().map(|g| CharClass::of(g)) else {
                return 0;
            };
            graphemes
                .take_while(|g| CharClass::of(g) == class)
                .map(char_len)
                .sum()
        }
    }
}

/// Chars to delete going forward from column `x` of `line`. Zero at the end
/// of the line.
pub fn forward_extent(line: &str, x: usize, unit: DeleteUnit) -> usize {
    let after = &line[char_to_byte(line, x)..];
    match unit {
        DeleteUnit::Paragraph => char_len(after),
        DeleteUnit::Rune => after.graphemes(true).next().map(char_len).unwrap_or(0),
        DeleteUnit::Word => {
            let mut graphemes = after.graphemes(true).peekable();
            let Some(class) = graphemes.peek().map(|g| CharClass::of(g)) else {
                return 0;
            };
            graphemes
                .take_while(|g| CharClass::of(g) == class)
                .map(char_len)
                .sum()
        }
    }
}
