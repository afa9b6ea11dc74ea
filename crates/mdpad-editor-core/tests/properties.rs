//! End-to-end behaviour of the editor core through its public API.

use std::sync::Arc;

use mdpad_editor_core::export::to_text;
use mdpad_editor_core::{
    DeleteUnit, DomNode, EditorEvent, EditorState, Inline, InlineNode, LineStore, ParseCache,
    Pos, VNode, parse_document, parse_inline, reconcile, reduce,
};
use pretty_assertions::assert_eq;

const DOCUMENTS: &[&str] = &[
    "",
    "\n",
    "plain",
    "# H1\n## H2 *em* **strong** ***both***\n###### six",
    "> quote\n>\n> more `code`",
    "```rs\nfn main() {}\n\n```\ntrailing",
    "~~~\nunterminated",
    "- a\n\t- b\n\t\t1. c\n- [ ] todo\n- [x] done\n+ plus",
    "---\n***\n- - -",
    "[link](https://example.com) and https://auto.link. \\*escaped\\*",
    "emoji 👍🏽 and 🇫🇷 text\n\ttabbed",
    "*unclosed **mixed ~strike~ `tick",
];

fn selected(state: &EditorState, offset: usize) -> EditorState {
    reduce(
        state,
        &EditorEvent::Select {
            primary: offset,
            secondary: offset,
        },
    )
    .unwrap()
}

#[test]
fn parse_then_serialize_round_trips() {
    for doc in DOCUMENTS {
        let tree = parse_document(&LineStore::from_text(doc), &mut ParseCache::default());
        assert_eq!(to_text(&tree), *doc);
    }
}

#[test]
fn reparsing_unchanged_lines_reuses_elements() {
    let mut store = LineStore::from_text("# T\n\npara\n- a\n- b");
    let mut cache = ParseCache::default();
    let first = parse_document(&store, &mut cache);
    let again = parse_document(&store, &mut cache);
    assert_eq!(first.blocks.len(), again.blocks.len());
    for (a, b) in first.blocks.iter().zip(&again.blocks) {
        assert!(Arc::ptr_eq(a, b));
    }

    // Editing the paragraph leaves its siblings untouched.
    store.set_line_text(2, "changed").unwrap();
    let edited = parse_document(&store, &mut cache);
    assert!(Arc::ptr_eq(&first.blocks[0], &edited.blocks[0]));
    assert!(!Arc::ptr_eq(&first.blocks[2], &edited.blocks[2]));
    assert!(Arc::ptr_eq(&first.blocks[3], &edited.blocks[3]));
}

/// Five delimiters pair at most twice, so `it` is not emphasized and the
/// last `*` stays literal. Underscores differ on purpose: intraword `_` never
/// opens or closes, so `_oh_man_is_it_` emphasizes only `oh`.
#[test]
fn asterisk_emphasis_alternates() {
    let Inline::Spans(spans) = parse_inline("*oh*man*is*it*") else {
        panic!("expected spans");
    };
    let emphasized: Vec<String> = spans
        .iter()
        .filter_map(|s| match &s.node {
            InlineNode::Emphasis { children, .. } => Some(children.plain_text()),
            _ => None,
        })
        .collect();
    assert_eq!(emphasized, vec!["oh", "is"]);
    assert_eq!(parse_inline("*oh*man*is*it*").source(), "*oh*man*is*it*");

    let Inline::Spans(spans) = parse_inline("_oh_man_is_it_") else {
        panic!("expected spans");
    };
    let emphasized = spans
        .iter()
        .filter(|s| matches!(s.node, InlineNode::Emphasis { .. }))
        .count();
    assert_eq!(emphasized, 1);
}

fn list(items: &[&str]) -> VNode {
    let root = VNode::element("div");
    for item in items {
        root.push(VNode::element("p").child(VNode::text(*item)));
    }
    root
}

#[test]
fn reconcile_mutation_counts() {
    let live = list(&["A", "B", "C"]);
    let fresh = list(&["B", "C"]);
    assert_eq!(reconcile(&fresh, &live, &mut ()).unwrap(), 2);
    assert!(fresh.deep_equal(&live));

    let live = list(&["A", "B", "C"]);
    let fresh = list(&["A", "B", "C", "D"]);
    assert_eq!(reconcile(&fresh, &live, &mut ()).unwrap(), 1);
    assert!(fresh.deep_equal(&live));
}

#[test]
fn typing_at_document_start() {
    let state = EditorState::new("hello\nworld");
    assert_eq!(state.selection.secondary, Pos::new(0, 0, 0));
    let next = reduce(&state, &EditorEvent::Write("X".into())).unwrap();
    assert_eq!(next.text(), "Xhello\nworld");
    assert!(next.selection.is_collapsed());
    assert_eq!(next.selection.secondary.pos, 1);
}

#[test]
fn undo_and_redo_walk_the_whole_stack() {
    use mdpad_editor_core::{Editor, EditorConfig};
    use web_time::Instant;

    let now = Instant::now();
    let mut editor = Editor::new("start", EditorConfig::default());
    let edits = ["one", "two", "three"];
    for text in edits {
        editor.dispatch(EditorEvent::SelectAll, now).unwrap();
        editor.dispatch(EditorEvent::Write(text.into()), now).unwrap();
        editor.flush_history();
    }
    let len = editor.history().len();
    editor.flush_history();
    assert_eq!(editor.history().len(), len);

    for _ in edits {
        assert!(editor.undo());
    }
    assert_eq!(editor.text(), "start");
    assert!(!editor.undo());
    for _ in edits {
        assert!(editor.redo());
    }
    assert_eq!(editor.text(), "three");
}

#[test]
fn enter_continues_todo_list() {
    let state = selected(&EditorState::new("- [ ] task"), 10);
    let next = reduce(&state, &EditorEvent::Enter).unwrap();
    let lines: Vec<&str> = next.lines.iter().map(|l| l.text.as_str()).collect();
    assert_eq!(lines, vec!["- [ ] task", "- [ ] "]);
}

#[test]
fn word_backspace_removes_last_word() {
    let state = selected(&EditorState::new("hello world"), 11);
    let next = reduce(&state, &EditorEvent::Backspace(DeleteUnit::Word)).unwrap();
    assert_eq!(next.text(), "hello ");
}
