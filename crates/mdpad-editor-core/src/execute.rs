//! The edit engine.
//!
//! [`EditorState`] is an immutable value; [`reduce`] maps a state and an
//! [`EditorEvent`] to the next state. Side effects (history timers, DOM reads
//! and writes, the clipboard) belong to the caller.

use crate::cursor::ReadLine;
use crate::error::EditorError;
use crate::lines::{Line, LineId, LineStore};
use crate::text::{DeleteUnit, backward_extent, forward_extent};
use crate::text_helpers::{detect_list_context, is_list_item_empty, leading_tabs, toggle_todo};
use crate::types::{Pos, Selection};

/// Lines, selection and mode of one editor.
#[derive(Clone, Debug)]
pub struct EditorState {
    pub lines: LineStore,
    pub selection: Selection,
    pub read_only: bool,
}

impl EditorState {
    /// State for `text` with the caret at the start.
    pub fn new(text: &str) -> Self {
        Self {
            lines: LineStore::from_text(text),
            selection: Selection::default(),
            read_only: false,
        }
    }

    pub fn text(&self) -> String {
        self.lines.text()
    }

    /// The caret, i.e. the moving end of the selection.
    pub fn caret(&self) -> Pos {
        self.selection.secondary
    }

    pub fn selected_text(&self) -> Result<String, EditorError> {
        self.lines
            .slice(self.selection.start().pos, self.selection.end().pos)
    }
}

/// A user intent.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EditorEvent {
    /// Replace the selection with text (typing, IME commit).
    Write(String),
    Backspace(DeleteUnit),
    ForwardBackspace(DeleteUnit),
    Tab,
    Detab,
    Enter,
    /// Flip the checkbox of the todo item on this line.
    CheckTodo(LineId),
    /// Delete the selection. The caller reads the selected text first.
    Cut,
    Paste(String),
    /// Move the selection to two absolute offsets; clamped into the document.
    Select { primary: usize, secondary: usize },
    SelectAll,
    /// Lines `first..=last` were edited in place by the browser and read back.
    NativeInput {
        first: LineId,
        last: LineId,
        lines: Vec<ReadLine>,
    },
    ToggleReadOnly,
}

impl EditorEvent {
    /// Whether the event edits text.
    pub fn is_mutating(&self) -> bool {
        !matches!(
            self,
            EditorEvent::Select { .. } | EditorEvent::SelectAll | EditorEvent::ToggleReadOnly
        )
    }

    /// Whether the event gets its own undo step immediately instead of being
    /// coalesced with neighbouring typing.
    pub fn is_structural(&self) -> bool {
        match self {
            EditorEvent::Write(text) => text.contains('\n'),
            EditorEvent::Backspace(unit) | EditorEvent::ForwardBackspace(unit) => {
                *unit == DeleteUnit::Paragraph
            }
            EditorEvent::Tab
            | EditorEvent::Detab
            | EditorEvent::Enter
            | EditorEvent::CheckTodo(_)
            | EditorEvent::Cut
            | EditorEvent::Paste(_) => true,
            EditorEvent::Select { .. }
            | EditorEvent::SelectAll
            | EditorEvent::NativeInput { .. }
            | EditorEvent::ToggleReadOnly => false,
        }
    }

    /// Whether the event is allowed while the editor is read-only.
    fn allowed_read_only(&self) -> bool {
        !self.is_mutating() || matches!(self, EditorEvent::CheckTodo(_))
    }
}

/// Apply `event` to `state`.
pub fn reduce(state: &EditorState, event: &EditorEvent) -> Result<EditorState, EditorError> {
    let mut next = state.clone();
    if state.read_only && !event.allowed_read_only() {
        tracing::trace!(target: "mdpad::edit", ?event, "ignored while read-only");
        return Ok(next);
    }
    match event {
        EditorEvent::Write(text) => execute_write(&mut next, text)?,
        EditorEvent::Backspace(unit) => execute_backspace(&mut next, *unit)?,
        EditorEvent::ForwardBackspace(unit) => execute_forward_backspace(&mut next, *unit)?,
        EditorEvent::Tab => execute_tab(&mut next)?,
        EditorEvent::Detab => execute_detab(&mut next)?,
        EditorEvent::Enter => execute_enter(&mut next)?,
        EditorEvent::CheckTodo(id) => execute_check_todo(&mut next, *id)?,
        EditorEvent::Cut => execute_write(&mut next, "")?,
        EditorEvent::Paste(text) => execute_write(&mut next, &text.replace("\r\n", "\n"))?,
        EditorEvent::Select { primary, secondary } => {
            let len = next.lines.total_len();
            next.selection = Selection::new(
                next.lines.pos_from_offset((*primary).min(len))?,
                next.lines.pos_from_offset((*secondary).min(len))?,
            );
        }
        EditorEvent::SelectAll => {
            let end = next.lines.pos_from_offset(next.lines.total_len())?;
            next.selection = Selection::new(Pos::default(), end);
        }
        EditorEvent::NativeInput { first, last, lines } => {
            execute_native_input(&mut next, *first, *last, lines)?
        }
        EditorEvent::ToggleReadOnly => next.read_only = !next.read_only,
    }
    Ok(next)
}

fn execute_write(state: &mut EditorState, text: &str) -> Result<(), EditorError> {
    let (start, end) = (state.selection.start(), state.selection.end());
    let caret = state.lines.replace(start.pos, end.pos, text)?;
    state.selection = Selection::collapsed(caret);
    Ok(())
}

fn delete_range(state: &mut EditorState, a: usize, b: usize) -> Result<(), EditorError> {
    let caret = state.lines.replace(a, b, "")?;
    state.selection = Selection::collapsed(caret);
    Ok(())
}

fn execute_backspace(state: &mut EditorState, unit: DeleteUnit) -> Result<(), EditorError> {
    if !state.selection.is_collapsed() {
        return execute_write(state, "");
    }
    let caret = state.caret();
    if caret.x == 0 {
        // Join with the previous line.
        if caret.y > 0 {
            delete_range(state, caret.pos - 1, caret.pos)?;
        }
        return Ok(());
    }
    let n = backward_extent(&state.lines.line(caret.y)?.text, caret.x, unit);
    delete_range(state, caret.pos - n, caret.pos)
}

fn execute_forward_backspace(state: &mut EditorState, unit: DeleteUnit) -> Result<(), EditorError> {
    if !state.selection.is_collapsed() {
        return execute_write(state, "");
    }
    let caret = state.caret();
    let line = state.lines.line(caret.y)?;
    if caret.x == line.len() {
        // Join with the next line.
        if caret.y + 1 < state.lines.len() {
            delete_range(state, caret.pos, caret.pos + 1)?;
        }
        return Ok(());
    }
    let n = forward_extent(&line.text, caret.x, unit);
    delete_range(state, caret.pos, caret.pos + n)
}

/// Whether tab and detab act on whole lines rather than at the caret.
fn indents_lines(state: &EditorState) -> Result<bool, EditorError> {
    let (first, last) = state.selection.line_span();
    Ok(first != last || detect_list_context(&state.lines.line(first)?.text).is_some())
}

/// Rewrite each selected line with `edit`, which returns the new text and
/// the column shift it applied, then move both selection ends along.
fn edit_selected_lines(
    state: &mut EditorState,
    edit: impl Fn(&str) -> Option<(String, isize)>,
) -> Result<(), EditorError> {
    let (first, last) = state.selection.line_span();
    let mut shifts = Vec::with_capacity(last - first + 1);
    for y in first..=last {
        let text = state.lines.line(y)?.text.clone();
        match edit(&text) {
            Some((new_text, shift)) => {
                state.lines.set_line_text(y, &new_text)?;
                shifts.push(shift);
            }
            None => shifts.push(0),
        }
    }
    let moved = |pos: Pos| -> Result<Pos, EditorError> {
        let shift = shifts[pos.y - first];
        let x = pos.x.saturating_add_signed(shift);
        state.lines.pos_at(pos.y, x)
    };
    state.selection = Selection::new(
        moved(state.selection.primary)?,
        moved(state.selection.secondary)?,
    );
    Ok(())
}

fn execute_tab(state: &mut EditorState) -> Result<(), EditorError> {
    if !indents_lines(state)? {
        return execute_write(state, "\t");
    }
    edit_selected_lines(state, |text| Some((format!("\t{text}"), 1)))
}

fn execute_detab(state: &mut EditorState) -> Result<(), EditorError> {
    edit_selected_lines(state, |text| {
        (leading_tabs(text) > 0).then(|| (text[1..].to_string(), -1))
    })
}

fn execute_enter(state: &mut EditorState) -> Result<(), EditorError> {
    if !state.selection.is_collapsed() {
        execute_write(state, "")?;
    }
    let caret = state.caret();
    let line = state.lines.line(caret.y)?;
    let at_end = caret.x == line.len();

    if at_end && is_list_item_empty(&line.text) {
        state.lines.set_line_text(caret.y, "")?;
        state.selection = Selection::collapsed(state.lines.pos_at(caret.y, 0)?);
        return Ok(());
    }
    let continuation = match detect_list_context(&line.text) {
        Some(prefix) if at_end => prefix.context.continuation(),
        _ => String::new(),
    };
    execute_write(state, &format!("\n{continuation}"))
}

fn execute_check_todo(state: &mut EditorState, id: LineId) -> Result<(), EditorError> {
    let y = state.lines.index_of(id).ok_or(EditorError::UnknownLine(id))?;
    if let Some(toggled) = toggle_todo(&state.lines.line(y)?.text) {
        state.lines.set_line_text(y, &toggled)?;
    }
    Ok(())
}

fn execute_native_input(
    state: &mut EditorState,
    first: LineId,
    last: LineId,
    read: &[ReadLine],
) -> Result<(), EditorError> {
    let y1 = state.lines.index_of(first).ok_or(EditorError::UnknownLine(first))?;
    let y2 = state.lines.index_of(last).ok_or(EditorError::UnknownLine(last))?;
    if y2 < y1 {
        return Err(EditorError::UnknownLine(last));
    }
    let replaced: Vec<LineId> = state.lines.as_slice()[y1..=y2].iter().map(|l| l.id).collect();

    let mut lines = Vec::with_capacity(read.len());
    for r in read {
        let id = match r.id {
            Some(id) if replaced.contains(&id) => id,
            _ => state.lines.alloc_id(),
        };
        lines.push(Line::new(id, r.text.as_str()));
    }
    state.lines.splice_lines(y1, y2, lines)?;

    let clamp = |pos: Pos| {
        let y = pos.y.min(state.lines.len() - 1);
        state.lines.pos_at(y, pos.x)
    };
    state.selection = Selection::new(clamp(state.selection.primary)?, clamp(state.selection.secondary)?);
    tracing::trace!(target: "mdpad::edit", y1, y2, read = read.len(), "native input applied");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn at(text: &str, offset: usize) -> EditorState {
        let mut state = EditorState::new(text);
        state = reduce(
            &state,
            &EditorEvent::Select {
                primary: offset,
                secondary: offset,
            },
        )
        .unwrap();
        state
    }

    fn apply(state: &EditorState, event: EditorEvent) -> EditorState {
        reduce(state, &event).unwrap()
    }

    #[test]
    fn test_write_replaces_selection() {
        let state = EditorState::new("hello world");
        let state = apply(&state, EditorEvent::Select { primary: 6, secondary: 11 });
        let state = apply(&state, EditorEvent::Write("there\nfriend".into()));
        assert_eq!(state.text(), "hello there\nfriend");
        assert_eq!(state.caret(), Pos::new(6, 1, 18));
        assert!(state.selection.is_collapsed());
        // The first line keeps its id.
        assert_eq!(state.lines.as_slice()[0].id, LineId(0));
    }

    #[test]
    fn test_backspace_units() {
        let state = at("hello world", 11);
        assert_eq!(apply(&state, EditorEvent::Backspace(DeleteUnit::Rune)).text(), "hello worl");
        assert_eq!(apply(&state, EditorEvent::Backspace(DeleteUnit::Word)).text(), "hello ");
        assert_eq!(apply(&state, EditorEvent::Backspace(DeleteUnit::Paragraph)).text(), "");

        let emoji = at("a👍🏽", 3);
        assert_eq!(apply(&emoji, EditorEvent::Backspace(DeleteUnit::Rune)).text(), "a");
    }

    #[test]
    fn test_backspace_at_line_start_joins() {
        let state = at("ab\ncd", 3);
        let next = apply(&state, EditorEvent::Backspace(DeleteUnit::Word));
        assert_eq!(next.text(), "abcd");
        assert_eq!(next.caret(), Pos::new(2, 0, 2));
        let first = at("ab", 0);
        assert_eq!(apply(&first, EditorEvent::Backspace(DeleteUnit::Rune)).text(), "ab");
    }

    #[test]
    fn test_forward_backspace() {
        let state = at("hello world", 0);
        let next = apply(&state, EditorEvent::ForwardBackspace(DeleteUnit::Word));
        assert_eq!(next.text(), " world");
        assert_eq!(next.caret().pos, 0);
        let join = at("ab\ncd", 2);
        assert_eq!(apply(&join, EditorEvent::ForwardBackspace(DeleteUnit::Rune)).text(), "abcd");
        let end = at("ab", 2);
        assert_eq!(apply(&end, EditorEvent::ForwardBackspace(DeleteUnit::Rune)).text(), "ab");
    }

    #[test]
    fn test_tab_on_plain_line_inserts_at_caret() {
        let next = apply(&at("ab", 1), EditorEvent::Tab);
        assert_eq!(next.text(), "a\tb");
        assert_eq!(next.caret().pos, 2);
    }

    #[test]
    fn test_tab_and_detab_on_list_item() {
        let state = at("- a", 3);
        let tabbed = apply(&state, EditorEvent::Tab);
        assert_eq!(tabbed.text(), "\t- a");
        assert_eq!(tabbed.caret(), Pos::new(4, 0, 4));
        let back = apply(&tabbed, EditorEvent::Detab);
        assert_eq!(back.text(), "- a");
        assert_eq!(back.caret(), Pos::new(3, 0, 3));
        // Nothing to remove.
        assert_eq!(apply(&back, EditorEvent::Detab).text(), "- a");
    }

    #[test]
    fn test_tab_across_lines() {
        let state = EditorState::new("a\nb\nc");
        let state = apply(&state, EditorEvent::Select { primary: 0, secondary: 3 });
        let next = apply(&state, EditorEvent::Tab);
        assert_eq!(next.text(), "\ta\n\tb\nc");
        assert_eq!(next.selection.primary, Pos::new(1, 0, 1));
        assert_eq!(next.selection.secondary, Pos::new(2, 1, 5));
    }

    #[test]
    fn test_enter_continues_lists() {
        let next = apply(&at("- [x] task", 10), EditorEvent::Enter);
        assert_eq!(next.text(), "- [x] task\n- [ ] ");
        assert_eq!(next.caret(), Pos::new(6, 1, 17));

        let next = apply(&at("\t3. item", 8), EditorEvent::Enter);
        assert_eq!(next.text(), "\t3. item\n\t4. ");

        // Mid-line enter just splits.
        let next = apply(&at("- item", 4), EditorEvent::Enter);
        assert_eq!(next.text(), "- it\nem");
    }

    #[test]
    fn test_enter_on_empty_item_reverts_to_paragraph() {
        let next = apply(&at("- a\n- ", 6), EditorEvent::Enter);
        assert_eq!(next.text(), "- a\n");
        assert_eq!(next.caret(), Pos::new(0, 1, 4));
        // Whitespace is content.
        let next = apply(&at("- [ ]  ", 7), EditorEvent::Enter);
        assert_eq!(next.text(), "- [ ]  \n- [ ] ");
    }

    #[test]
    fn test_check_todo() {
        let state = at("- [ ] a\ntext", 9);
        let next = apply(&state, EditorEvent::CheckTodo(LineId(0)));
        assert_eq!(next.text(), "- [x] a\ntext");
        assert_eq!(next.selection, state.selection);
        assert_eq!(apply(&state, EditorEvent::CheckTodo(LineId(1))).text(), "- [ ] a\ntext");
        assert_eq!(
            reduce(&state, &EditorEvent::CheckTodo(LineId(9))).unwrap_err(),
            EditorError::UnknownLine(LineId(9))
        );
    }

    #[test]
    fn test_cut_and_paste() {
        let state = EditorState::new("one two");
        let state = apply(&state, EditorEvent::Select { primary: 3, secondary: 7 });
        assert_eq!(state.selected_text().unwrap(), " two");
        let cut = apply(&state, EditorEvent::Cut);
        assert_eq!(cut.text(), "one");
        let pasted = apply(&cut, EditorEvent::Paste("\r\nx".into()));
        assert_eq!(pasted.text(), "one\nx");
    }

    #[test]
    fn test_select_clamps_and_select_all() {
        let state = EditorState::new("ab\nc");
        let sel = apply(&state, EditorEvent::Select { primary: 99, secondary: 1 });
        assert_eq!(sel.selection.primary, Pos::new(1, 1, 4));
        let all = apply(&state, EditorEvent::SelectAll);
        assert_eq!(all.selected_text().unwrap(), "ab\nc");
    }

    #[test]
    fn test_read_only_ignores_edits_but_not_todos() {
        let state = apply(&at("- [ ] a", 7), EditorEvent::ToggleReadOnly);
        assert!(state.read_only);
        assert_eq!(apply(&state, EditorEvent::Write("x".into())).text(), "- [ ] a");
        assert_eq!(apply(&state, EditorEvent::CheckTodo(LineId(0))).text(), "- [x] a");
        assert!(!apply(&state, EditorEvent::ToggleReadOnly).read_only);
    }

    #[test]
    fn test_native_input_replaces_only_affected_lines() {
        let state = at("a\nb\nc", 3);
        let event = EditorEvent::NativeInput {
            first: LineId(1),
            last: LineId(1),
            lines: vec![
                ReadLine {
                    id: Some(LineId(1)),
                    text: "bé".into(),
                },
                ReadLine {
                    id: None,
                    text: "new".into(),
                },
            ],
        };
        let next = apply(&state, event);
        assert_eq!(next.text(), "a\nbé\nnew\nc");
        let ids: Vec<u64> = next.lines.iter().map(|l| l.id.0).collect();
        assert_eq!(ids, vec![0, 1, 3, 2]);
    }

    #[test]
    fn test_native_input_with_unknown_line_fails() {
        let state = EditorState::new("a");
        let event = EditorEvent::NativeInput {
            first: LineId(5),
            last: LineId(5),
            lines: vec![],
        };
        assert_eq!(reduce(&state, &event).unwrap_err(), EditorError::UnknownLine(LineId(5)));
    }

    #[test]
    fn test_structural_classification() {
        assert!(EditorEvent::Enter.is_structural());
        assert!(EditorEvent::Backspace(DeleteUnit::Paragraph).is_structural());
        assert!(!EditorEvent::Backspace(DeleteUnit::Word).is_structural());
        assert!(!EditorEvent::Write("a".into()).is_structural());
        assert!(EditorEvent::Write("a\nb".into()).is_structural());
        assert!(!EditorEvent::SelectAll.is_mutating());
    }
}
