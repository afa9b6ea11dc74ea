//! Cursor types: positions and the primary/secondary selection pair.
//!
//! Positions are measured in chars (Unicode scalar values) throughout the core.
//! UTF-16 offsets only appear at the DOM boundary, see [`crate::text`].

use serde::{Deserialize, Serialize};

/// A cursor location in the document.
///
/// `x` is the column within line `y`, `pos` the absolute offset into the
/// document text where lines are joined by a single newline. A valid `Pos`
/// always satisfies `pos == sum(len(line[i]) + 1 for i < y) + x`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Pos {
    pub x: usize,
    pub y: usize,
    pub pos: usize,
}

impl Pos {
    pub fn new(x: usize, y: usize, pos: usize) -> Self {
        Self { x, y, pos }
    }
}

/// Selection expressed as a pair of positions.
///
/// `primary` is where the selection started, `secondary` is where the caret is
/// now. They may be in either order; use [`Selection::start`] and
/// [`Selection::end`] for ordered bounds. A collapsed selection is the plain
/// caret.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selection {
    pub primary: Pos,
    pub secondary: Pos,
}

impl Selection {
    pub fn new(primary: Pos, secondary: Pos) -> Self {
        Self { primary, secondary }
    }

    /// Create a collapsed selection (caret only).
    pub fn collapsed(pos: Pos) -> Self {
        Self {
            primary: pos,
            secondary: pos,
        }
    }

    /// Lower bound of the selection.
    pub fn start(&self) -> Pos {
        if self.primary.pos <= self.secondary.pos {
            self.primary
        } else {
            self.secondary
        }
    }

    /// Upper bound of the selection.
    pub fn end(&self) -> Pos {
        if self.primary.pos <= self.secondary.pos {
            self.secondary
        } else {
            self.primary
        }
    }

    pub fn is_collapsed(&self) -> bool {
        self.primary.pos == self.secondary.pos
    }

    /// Whether the selection was made right-to-left.
    pub fn is_backward(&self) -> bool {
        self.secondary.pos < self.primary.pos
    }

    pub fn len(&self) -> usize {
        self.end().pos - self.start().pos
    }

    pub fn is_empty(&self) -> bool {
        self.is_collapsed()
    }

    /// Lines covered by the selection, inclusive on both ends.
    pub fn line_span(&self) -> (usize, usize) {
        (self.start().y, self.end().y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_selection_bounds_are_ordered() {
        let a = Pos::new(1, 0, 1);
        let b = Pos::new(0, 1, 4);
        let sel = Selection::new(b, a);
        assert_eq!(sel.start(), a);
        assert_eq!(sel.end(), b);
        assert!(sel.is_backward());
        assert_eq!(sel.len(), 3);
        assert_eq!(sel.line_span(), (0, 1));
    }

    #[test]
    fn test_collapsed_selection() {
        let sel = Selection::collapsed(Pos::new(2, 0, 2));
        assert!(sel.is_collapsed());
        assert!(sel.is_empty());
        assert!(!sel.is_backward());
    }
}
