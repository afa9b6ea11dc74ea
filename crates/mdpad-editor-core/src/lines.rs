//! The canonical document: an ordered sequence of lines with stable ids.
//!
//! The full text is the lines joined by a single `\n`. The store always holds
//! at least one (possibly empty) line. Lines are shared behind an `Arc` so
//! snapshots for history are cheap; mutation goes through `Arc::make_mut`.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use smol_str::{SmolStr, ToSmolStr};

use crate::error::EditorError;
use crate::text::{char_len, char_to_byte};
use crate::types::Pos;

/// Stable identifier of a line. Rendered into the DOM as the line element's id.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LineId(pub u64);

impl fmt::Display for LineId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ln-{}", self.0)
    }
}

impl FromStr for LineId {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.strip_prefix("ln-")
            .and_then(|n| n.parse::<u64>().ok())
            .map(LineId)
            .ok_or(())
    }
}

/// One line of the document, without its trailing newline.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Line {
    pub id: LineId,
    pub text: SmolStr,
}

impl Line {
    pub fn new(id: LineId, text: impl Into<SmolStr>) -> Self {
        Self {
            id,
            text: text.into(),
        }
    }

    /// Length in chars.
    pub fn len(&self) -> usize {
        char_len(&self.text)
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

/// Ordered line storage with an id allocator.
#[derive(Clone, Debug)]
pub struct LineStore {
    lines: Arc<Vec<Line>>,
    next_id: u64,
}

impl Default for LineStore {
    fn default() -> Self {
        Self::from_text("")
    }
}

impl LineStore {
    /// Split `text` on `\n` into lines with fresh ids.
    pub fn from_text(text: &str) -> Self {
        let lines: Vec<Line> = text
            .split('\n')
            .enumerate()
            .map(|(i, t)| Line::new(LineId(i as u64), t))
            .collect();
        let next_id = lines.len() as u64;
        Self {
            lines: Arc::new(lines),
            next_id,
        }
    }

    /// Allocate a fresh line id. Ids are never reused within a store's lineage.
    pub fn alloc_id(&mut self) -> LineId {
        let id = LineId(self.next_id);
        self.next_id += 1;
        id
    }

    /// Keep the allocator ahead of another store's, so restoring an older
    /// snapshot never re-issues ids the DOM has already seen.
    pub fn raise_id_floor(&mut self, other: &LineStore) {
        self.next_id = self.next_id.max(other.next_id);
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Always false; the store keeps at least one line.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn get(&self, y: usize) -> Option<&Line> {
        self.lines.get(y)
    }

    pub fn line(&self, y: usize) -> Result<&Line, EditorError> {
        self.lines.get(y).ok_or(EditorError::LineIndexOutOfRange {
            index: y,
            len: self.lines.len(),
        })
    }

    pub fn iter(&self) -> impl Iterator<Item = &Line> {
        self.lines.iter()
    }

    pub fn as_slice(&self) -> &[Line] {
        &self.lines
    }

    /// Whether two stores share the same backing allocation.
    pub fn ptr_eq(&self, other: &LineStore) -> bool {
        Arc::ptr_eq(&self.lines, &other.lines)
    }

    pub fn index_of(&self, id: LineId) -> Option<usize> {
        self.lines.iter().position(|l| l.id == id)
    }

    /// Full document text.
    pub fn text(&self) -> String {
        let mut out = String::with_capacity(self.lines.iter().map(|l| l.text.len() + 1).sum());
        for (i, line) in self.lines.iter().enumerate() {
            if i > 0 {
                out.push('\n');
            }
            out.push_str(&line.text);
        }
        out
    }

    /// Whether both stores hold the same text, ignoring ids.
    pub fn text_eq(&self, other: &LineStore) -> bool {
        self.ptr_eq(other)
            || (self.lines.len() == other.lines.len()
                && self
                    .lines
                    .iter()
                    .zip(other.lines.iter())
                    .all(|(a, b)| a.text == b.text))
    }

    /// Document length in chars, newlines included.
    pub fn total_len(&self) -> usize {
        self.lines.iter().map(Line::len).sum::<usize>() + self.lines.len() - 1
    }

    /// Absolute offset of the first char of line `y`.
    pub fn line_start(&self, y: usize) -> Result<usize, EditorError> {
        if y >= self.lines.len() {
            return Err(EditorError::LineIndexOutOfRange {
                index: y,
                len: self.lines.len(),
            });
        }
        Ok(self.lines[..y].iter().map(|l| l.len() + 1).sum())
    }

    /// Position at column `x` of line `y`, clamping `x` to the line length.
    pub fn pos_at(&self, y: usize, x: usize) -> Result<Pos, EditorError> {
        let start = self.line_start(y)?;
        let x = x.min(self.lines[y].len());
        Ok(Pos::new(x, y, start + x))
    }

    /// Resolve an absolute offset into a full position.
    pub fn pos_from_offset(&self, offset: usize) -> Result<Pos, EditorError> {
        let mut start = 0;
        for (y, line) in self.lines.iter().enumerate() {
            let len = line.len();
            if offset <= start + len {
                return Ok(Pos::new(offset - start, y, offset));
            }
            start += len + 1;
        }
        Err(EditorError::OffsetOutOfRange {
            offset,
            len: self.total_len(),
        })
    }

    /// Text between two absolute offsets, in either order.
    pub fn slice(&self, a: usize, b: usize) -> Result<String, EditorError> {
        let (start, end) = (a.min(b), a.max(b));
        let s = self.pos_from_offset(start)?;
        let e = self.pos_from_offset(end)?;
        if s.y == e.y {
            let text = &self.lines[s.y].text;
            return Ok(text[char_to_byte(text, s.x)..char_to_byte(text, e.x)].to_string());
        }
        let mut out = String::new();
        let first = &self.lines[s.y].text;
        out.push_str(&first[char_to_byte(first, s.x)..]);
        for line in &self.lines[s.y + 1..e.y] {
            out.push('\n');
            out.push_str(&line.text);
        }
        out.push('\n');
        let last = &self.lines[e.y].text;
        out.push_str(&last[..char_to_byte(last, e.x)]);
        Ok(out)
    }

    /// Replace the chars in `[a, b)` (either order) with `text`, which may span
    /// several lines. The first touched line keeps its id; lines created by
    /// newlines in `text` get fresh ids. Returns the caret after the insertion.
    pub fn replace(&mut self, a: usize, b: usize, text: &str) -> Result<Pos, EditorError> {
        let (start, end) = (a.min(b), a.max(b));
        let s = self.pos_from_offset(start)?;
        let e = self.pos_from_offset(end)?;

        let first = &self.lines[s.y];
        let last = &self.lines[e.y];
        let mut combined = String::with_capacity(first.text.len() + text.len() + last.text.len());
        combined.push_str(&first.text[..char_to_byte(&first.text, s.x)]);
        combined.push_str(text);
        combined.push_str(&last.text[char_to_byte(&last.text, e.x)..]);

        let first_id = first.id;
        let mut replacement = Vec::new();
        for (i, piece) in combined.split('\n').enumerate() {
            let id = if i == 0 { first_id } else { self.alloc_id() };
            replacement.push(Line::new(id, piece));
        }
        Arc::make_mut(&mut self.lines).splice(s.y..=e.y, replacement);

        let inserted_lines = text.split('\n').count() - 1;
        let x = match text.rfind('\n') {
            Some(i) => char_len(&text[i + 1..]),
            None => s.x + char_len(text),
        };
        Ok(Pos::new(x, s.y + inserted_lines, start + char_len(text)))
    }

    /// Overwrite the text of line `y`, keeping its id.
    pub fn set_line_text(&mut self, y: usize, text: &str) -> Result<(), EditorError> {
        let len = self.lines.len();
        let line = Arc::make_mut(&mut self.lines)
            .get_mut(y)
            .ok_or(EditorError::LineIndexOutOfRange { index: y, len })?;
        line.text = text.to_smolstr();
        Ok(())
    }

    /// Replace lines `first..=last` with `lines`. An empty replacement leaves a
    /// single empty line so the store never becomes empty.
    pub fn splice_lines(
        &mut self,
        first: usize,
        last: usize,
        mut lines: Vec<Line>,
    ) -> Result<(), EditorError> {
        let len = self.lines.len();
        if first > last || last >= len {
            return Err(EditorError::LineIndexOutOfRange { index: last, len });
        }
        if lines.is_empty() && first == 0 && last + 1 == len {
            let id = self.alloc_id();
            lines.push(Line::new(id, ""));
        }
        Arc::make_mut(&mut self.lines).splice(first..=last, lines);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_from_text_round_trips() {
        for text in ["", "a", "a\nb", "a\n", "\n\n", "héllo\nwörld 🎉"] {
            assert_eq!(LineStore::from_text(text).text(), text);
        }
        assert_eq!(LineStore::from_text("").len(), 1);
        assert_eq!(LineStore::from_text("a\n").len(), 2);
    }

    #[test]
    fn test_line_id_display_and_parse() {
        assert_eq!(LineId(7).to_string(), "ln-7");
        assert_eq!("ln-7".parse::<LineId>(), Ok(LineId(7)));
        assert!("line-7".parse::<LineId>().is_err());
    }

    #[test]
    fn test_pos_invariant() {
        let store = LineStore::from_text("ab\ncde\n\nf");
        for offset in 0..=store.total_len() {
            let p = store.pos_from_offset(offset).unwrap();
            assert_eq!(store.line_start(p.y).unwrap() + p.x, p.pos);
            assert_eq!(store.pos_at(p.y, p.x).unwrap(), p);
        }
        assert!(store.pos_from_offset(store.total_len() + 1).is_err());
    }

    #[test]
    fn test_replace_within_line() {
        let mut store = LineStore::from_text("hello world");
        let caret = store.replace(6, 11, "there").unwrap();
        assert_eq!(store.text(), "hello there");
        assert_eq!(caret, Pos::new(11, 0, 11));
    }

    #[test]
    fn test_replace_inserts_lines_with_fresh_ids() {
        let mut store = LineStore::from_text("ab\ncd");
        let ids_before: Vec<_> = store.iter().map(|l| l.id).collect();
        let caret = store.replace(1, 1, "\n").unwrap();
        assert_eq!(store.text(), "a\nb\ncd");
        assert_eq!(caret, Pos::new(0, 1, 2));
        assert_eq!(store.get(0).unwrap().id, ids_before[0]);
        assert!(!ids_before.contains(&store.get(1).unwrap().id));
        assert_eq!(store.get(2).unwrap().id, ids_before[1]);
    }

    #[test]
    fn test_replace_across_lines() {
        let mut store = LineStore::from_text("one\ntwo\nthree");
        let caret = store.replace(2, 9, "").unwrap();
        assert_eq!(store.text(), "onhree");
        assert_eq!(caret, Pos::new(2, 0, 2));
    }

    #[test]
    fn test_slice_spans_lines() {
        let store = LineStore::from_text("one\ntwo\nthree");
        assert_eq!(store.slice(2, 9).unwrap(), "e\ntwo\nt");
        assert_eq!(store.slice(9, 2).unwrap(), "e\ntwo\nt");
        assert_eq!(store.slice(4, 7).unwrap(), "two");
    }

    #[test]
    fn test_snapshot_shares_until_mutated() {
        let mut store = LineStore::from_text("a\nb");
        let snapshot = store.clone();
        assert!(store.ptr_eq(&snapshot));
        store.set_line_text(1, "c").unwrap();
        assert!(!store.ptr_eq(&snapshot));
        assert_eq!(snapshot.text(), "a\nb");
        assert!(!store.text_eq(&snapshot));
    }
}
