//! An editor session: state, history, parse cache and the current element
//! tree, owned together.
//!
//! The session is the single writer. Every event replaces the whole
//! [`EditorState`] value, re-parses through the session's own cache and
//! updates history. Platform code drives it with events and the current time
//! and is told, through [`Outcome`], whether the DOM must be reconciled.

use web_time::Instant;

use crate::block::parse_document;
use crate::cache::ParseCache;
use crate::config::EditorConfig;
use crate::cursor::{
    DomPoint, dom_selection_to_pos, extended_addressable_range, pos_to_dom_point,
    read_all_lines, read_lines,
};
use crate::dom::DomNode;
use crate::element::{ElementTree, Heading};
use crate::error::EditorError;
use crate::execute::{EditorEvent, EditorState, reduce};
use crate::export;
use crate::lines::LineId;
use crate::persist;
use crate::render::render_editable;
use crate::types::Selection;
use crate::undo::{History, Snapshot};
use crate::vdom::VNode;

/// What an event did, for the platform layer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Outcome {
    /// The text changed.
    pub changed: bool,
    /// Read-only mode flipped.
    pub mode_changed: bool,
    /// Text cut from the document, to be placed on the clipboard.
    pub clipboard: Option<String>,
}

impl Outcome {
    /// Whether the live DOM must be reconciled against a fresh render.
    pub fn needs_render(&self) -> bool {
        self.changed || self.mode_changed
    }
}

pub struct Editor {
    state: EditorState,
    history: History,
    cache: ParseCache,
    tree: ElementTree,
    config: EditorConfig,
}

impl Editor {
    pub fn new(text: &str, config: EditorConfig) -> Self {
        let mut state = EditorState::new(text);
        state.read_only = config.read_only;
        let history = History::new(
            Snapshot {
                lines: state.lines.clone(),
                selection: state.selection,
            },
            config.history_limit,
            config.history_debounce(),
        );
        let mut cache = ParseCache::new(config.parse_cache_capacity);
        let tree = parse_document(&state.lines, &mut cache);
        Self {
            state,
            history,
            cache,
            tree,
            config,
        }
    }

    /// Session for a stored value, or the default document.
    pub fn from_storage(raw: Option<&str>, config: EditorConfig) -> Self {
        Self::new(&persist::load_document(raw), config)
    }

    pub fn state(&self) -> &EditorState {
        &self.state
    }

    pub fn tree(&self) -> &ElementTree {
        &self.tree
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn selection(&self) -> Selection {
        self.state.selection
    }

    pub fn is_read_only(&self) -> bool {
        self.state.read_only
    }

    pub fn text(&self) -> String {
        self.state.text()
    }

    /// Apply one event at time `now`.
    pub fn dispatch(&mut self, event: EditorEvent, now: Instant) -> Result<Outcome, EditorError> {
        let structural = event.is_structural();
        if event.is_mutating() {
            if structural {
                self.history.commit_pending();
            } else {
                self.history.commit_due(now);
            }
        }

        let mut outcome = Outcome::default();
        if event == EditorEvent::Cut && !self.state.read_only {
            outcome.clipboard = Some(self.state.selected_text()?);
        }
        let next = reduce(&self.state, &event).inspect_err(|err| {
            tracing::error!(target: "mdpad::edit", %err, ?event, "edit failed");
        })?;
        outcome.changed = !next.lines.text_eq(&self.state.lines);
        outcome.mode_changed = next.read_only != self.state.read_only;
        self.state = next;

        if outcome.changed {
            self.reparse();
            let snapshot = self.snapshot();
            if structural {
                self.history.push(snapshot);
            } else {
                self.history.schedule(snapshot, now);
            }
        }
        tracing::trace!(
            target: "mdpad::edit",
            changed = outcome.changed,
            pos = self.state.caret().pos,
            "dispatch"
        );
        Ok(outcome)
    }

    /// Step back one history entry. Ignored while read-only.
    pub fn undo(&mut self) -> bool {
        if self.state.read_only {
            return false;
        }
        match self.history.undo(self.snapshot()) {
            Some(snapshot) => {
                self.restore(snapshot);
                true
            }
            None => false,
        }
    }

    pub fn redo(&mut self) -> bool {
        if self.state.read_only {
            return false;
        }
        match self.history.redo() {
            Some(snapshot) => {
                self.restore(snapshot);
                true
            }
            None => false,
        }
    }

    /// Timer callback: commit a parked history snapshot whose quiet period
    /// has passed.
    pub fn tick(&mut self, now: Instant) -> bool {
        self.history.commit_due(now)
    }

    /// Commit any parked history snapshot now.
    pub fn flush_history(&mut self) -> bool {
        self.history.commit_pending()
    }

    /// Detached editable render of the current tree.
    pub fn render(&self) -> VNode {
        render_editable(&self.tree, self.state.read_only)
    }

    /// Adopt the native selection as the editor selection.
    pub fn sync_selection<N: DomNode>(
        &mut self,
        root: &N,
        anchor: &DomPoint<N>,
        focus: &DomPoint<N>,
    ) -> Result<Selection, EditorError> {
        self.state.selection = dom_selection_to_pos(root, &self.state.lines, anchor, focus)?;
        Ok(self.state.selection)
    }

    /// DOM points for writing the editor selection back into the live tree.
    pub fn selection_points<N: DomNode>(
        &self,
        root: &N,
    ) -> Result<(DomPoint<N>, DomPoint<N>), EditorError> {
        let lines = &self.state.lines;
        let sel = self.state.selection;
        let anchor = pos_to_dom_point(root, lines, sel.primary.pos)?;
        if sel.is_collapsed() {
            return Ok((anchor.clone(), anchor));
        }
        Ok((anchor, pos_to_dom_point(root, lines, sel.secondary.pos)?))
    }

    /// Ids of the lines a native edit at the current selection may touch.
    pub fn addressable_range(&self) -> Vec<LineId> {
        extended_addressable_range(
            &self.state.lines,
            &self.state.selection,
            self.config.addressable_window,
        )
    }

    /// Read lines `range` (ids captured before the native edit) back from the
    /// live DOM and apply them. If the range's end markers are gone, the
    /// whole document is re-read.
    pub fn apply_native_input<N: DomNode>(
        &mut self,
        root: &N,
        range: &[LineId],
        now: Instant,
    ) -> Result<Outcome, EditorError> {
        let lines = &self.state.lines;
        let bounds = match (range.first(), range.last()) {
            (Some(first), Some(last)) => Some((*first, *last)),
            _ => None,
        };
        let read = bounds
            .ok_or(EditorError::MissingMarker(crate::dom::NODE_MARKER))
            .and_then(|(first, last)| Ok((first, last, read_lines(root, first, last)?)));
        let (first, last, read) = match read {
            Ok(read) => read,
            Err(err) => {
                tracing::warn!(target: "mdpad::edit", %err, "addressable range lost, rereading document");
                let first = lines.line(0)?.id;
                let last = lines.line(lines.len() - 1)?.id;
                (first, last, read_all_lines(root))
            }
        };
        self.dispatch(
            EditorEvent::NativeInput {
                first,
                last,
                lines: read,
            },
            now,
        )
    }

    /// Persisted form of the current document.
    pub fn save(&self) -> Result<String, EditorError> {
        persist::save_document(&self.text())
    }

    pub fn outline(&self) -> &[Heading] {
        self.tree.outline()
    }

    /// File name for downloads: the first heading's slug, or `document.md`.
    pub fn download_name(&self) -> String {
        match self.tree.headings.first() {
            Some(heading) => format!("{}.md", heading.slug),
            None => "document.md".to_string(),
        }
    }

    pub fn to_text(&self) -> String {
        export::to_text(&self.tree)
    }

    pub fn to_html(&self) -> String {
        export::to_html(&self.tree)
    }

    pub fn to_bem_html(&self) -> String {
        export::to_bem_html(&self.tree)
    }

    pub fn to_jsx(&self) -> String {
        export::to_jsx(&self.tree)
    }

    fn snapshot(&self) -> Snapshot {
        Snapshot {
            lines: self.state.lines.clone(),
            selection: self.state.selection,
        }
    }

    fn restore(&mut self, snapshot: Snapshot) {
        let mut lines = snapshot.lines;
        lines.raise_id_floor(&self.state.lines);
        self.state.lines = lines;
        self.state.selection = snapshot.selection;
        self.reparse();
    }

    fn reparse(&mut self) {
        self.tree = parse_document(&self.state.lines, &mut self.cache);
        let (hits, misses) = self.cache.stats();
        tracing::debug!(
            target: "mdpad::parse",
            blocks = self.tree.blocks.len(),
            hits,
            misses,
            "reparsed"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cursor::line_nodes;
    use crate::reconcile::reconcile;
    use crate::text::DeleteUnit;
    use crate::types::Pos;
    use std::time::Duration;

    fn editor(text: &str) -> Editor {
        Editor::new(text, EditorConfig::default())
    }

    fn select(editor: &mut Editor, offset: usize, now: Instant) {
        editor
            .dispatch(
                EditorEvent::Select {
                    primary: offset,
                    secondary: offset,
                },
                now,
            )
            .unwrap();
    }

    #[test]
    fn test_typing_is_coalesced_into_one_undo_step() {
        let now = Instant::now();
        let mut ed = editor("");
        for (i, c) in "abc".chars().enumerate() {
            let at = now + Duration::from_millis(50 * i as u64);
            ed.dispatch(EditorEvent::Write(c.to_string()), at).unwrap();
        }
        assert_eq!(ed.text(), "abc");
        assert!(ed.tick(now + Duration::from_secs(1)));
        assert!(ed.undo());
        assert_eq!(ed.text(), "");
        assert!(ed.redo());
        assert_eq!(ed.text(), "abc");
    }

    #[test]
    fn test_structural_edits_are_separate_steps() {
        let now = Instant::now();
        let mut ed = editor("- a");
        select(&mut ed, 3, now);
        ed.dispatch(EditorEvent::Enter, now).unwrap();
        ed.dispatch(EditorEvent::Write("b".into()), now).unwrap();
        ed.dispatch(EditorEvent::Enter, now).unwrap();
        assert_eq!(ed.text(), "- a\n- b\n- ");
        assert!(ed.undo());
        assert_eq!(ed.text(), "- a\n- b");
        assert!(ed.undo());
        assert_eq!(ed.text(), "- a\n- ");
        assert!(ed.undo());
        assert_eq!(ed.text(), "- a");
        assert!(!ed.undo());
    }

    #[test]
    fn test_cut_fills_clipboard() {
        let now = Instant::now();
        let mut ed = editor("one two");
        ed.dispatch(EditorEvent::Select { primary: 3, secondary: 7 }, now).unwrap();
        let outcome = ed.dispatch(EditorEvent::Cut, now).unwrap();
        assert_eq!(outcome.clipboard.as_deref(), Some(" two"));
        assert!(outcome.changed);
        assert_eq!(ed.text(), "one");
    }

    #[test]
    fn test_undo_keeps_ids_fresh() {
        let now = Instant::now();
        let mut ed = editor("a");
        select(&mut ed, 1, now);
        ed.dispatch(EditorEvent::Enter, now).unwrap();
        let new_id = ed.state().lines.as_slice()[1].id;
        ed.undo();
        select(&mut ed, 1, now);
        ed.dispatch(EditorEvent::Enter, now).unwrap();
        assert!(ed.state().lines.as_slice()[1].id > new_id);
    }

    #[test]
    fn test_history_is_frozen_while_read_only() {
        let now = Instant::now();
        let mut ed = editor("a");
        select(&mut ed, 1, now);
        ed.dispatch(EditorEvent::Enter, now).unwrap();
        assert_eq!(ed.text(), "a\n");
        ed.dispatch(EditorEvent::ToggleReadOnly, now).unwrap();
        assert!(!ed.undo());
        assert_eq!(ed.text(), "a\n");
        ed.dispatch(EditorEvent::ToggleReadOnly, now).unwrap();
        assert!(ed.undo());
        assert_eq!(ed.text(), "a");
        ed.dispatch(EditorEvent::ToggleReadOnly, now).unwrap();
        assert!(!ed.redo());
        assert_eq!(ed.text(), "a");
    }

    #[test]
    fn test_enter_after_largest_item_number() {
        let now = Instant::now();
        let line = "18446744073709551615. x";
        let mut ed = editor(line);
        select(&mut ed, line.len(), now);
        ed.dispatch(EditorEvent::Enter, now).unwrap();
        assert_eq!(ed.text(), format!("{line}\n18446744073709551615. "));
    }

    #[test]
    fn test_toggle_read_only_requests_render() {
        let now = Instant::now();
        let mut ed = editor("- [ ] a");
        let outcome = ed.dispatch(EditorEvent::ToggleReadOnly, now).unwrap();
        assert!(outcome.mode_changed && outcome.needs_render());
        assert!(ed.is_read_only());
        assert!(ed.render().inner_html().contains("data-hidden"));
    }

    #[test]
    fn test_render_reconcile_and_caret_round_trip() {
        let now = Instant::now();
        let mut ed = editor("# T\nhello *world*\nend");
        let live = ed.render();
        select(&mut ed, 10, now);
        ed.dispatch(EditorEvent::Write("X".into()), now).unwrap();
        let mutations = reconcile(&ed.render(), &live, &mut ()).unwrap();
        assert_eq!(mutations, 1);
        assert_eq!(line_nodes(&live)[1].text_content(), "hello X*world*");

        let (anchor, focus) = ed.selection_points(&live).unwrap();
        let sel = ed.sync_selection(&live, &anchor, &focus).unwrap();
        assert_eq!(sel.secondary, Pos::new(7, 1, 11));
    }

    #[test]
    fn test_native_input_reads_back_lines() {
        let now = Instant::now();
        let mut ed = editor("a\nb\nc");
        let live = ed.render();
        select(&mut ed, 2, now);
        let range = ed.addressable_range();
        assert_eq!(range.len(), 3);

        // The browser edits line "b" in place.
        let line = live.find_by_id("ln-1").unwrap();
        line.children()[0].set_text("bee");
        let outcome = ed.apply_native_input(&live, &range, now).unwrap();
        assert!(outcome.changed);
        assert_eq!(ed.text(), "a\nbee\nc");
    }

    #[test]
    fn test_native_input_falls_back_to_whole_document() {
        let now = Instant::now();
        let mut ed = editor("a\nb");
        let live = ed.render();
        live.find_by_id("ln-0").unwrap().children()[0].set_text("z");
        let outcome = ed
            .apply_native_input(&live, &[LineId(0), LineId(7)], now)
            .unwrap();
        assert!(outcome.changed);
        assert_eq!(ed.text(), "z\nb");
    }

    #[test]
    fn test_backspace_word_through_session() {
        let now = Instant::now();
        let mut ed = editor("hello world");
        select(&mut ed, 11, now);
        ed.dispatch(EditorEvent::Backspace(DeleteUnit::Word), now).unwrap();
        assert_eq!(ed.text(), "hello ");
    }

    #[test]
    fn test_download_name_and_save() {
        let ed = editor("# My Notes\ntext");
        assert_eq!(ed.download_name(), "my-notes.md");
        assert_eq!(editor("text").download_name(), "document.md");
        assert_eq!(ed.save().unwrap(), r##"{"data":"# My Notes\ntext"}"##);
        let restored = Editor::from_storage(Some(&ed.save().unwrap()), EditorConfig::default());
        assert_eq!(restored.text(), "# My Notes\ntext");
    }
}
