//! Mapping between DOM selection points and document positions.
//!
//! This is the only code that walks a live tree. It relies on two contracts of
//! the rendered DOM: each line element carries [`NODE_MARKER`] with
//! `id = LineId`, and a line element's text (minus zero-width subtrees) is
//! exactly the line's text. DOM offsets are UTF-16 code units; positions are
//! chars.
//!
//! Both directions skip zero-width subtrees entirely and treat hidden syntax
//! spans as text the caret may not rest inside, so the two directions always
//! agree on lengths.

use crate::dom::{DomNode, HIDDEN_MARKER, NODE_MARKER};
use crate::error::EditorError;
use crate::lines::{LineId, LineStore};
use crate::text::{char_len, char_to_utf16, utf16_to_char};
use crate::types::{Pos, Selection};

/// A DOM position as the browser reports it: a node and a UTF-16 offset
/// (child index when `node` is an element).
#[derive(Clone, Debug, PartialEq)]
pub struct DomPoint<N> {
    pub node: N,
    pub offset: usize,
}

impl<N> DomPoint<N> {
    pub fn new(node: N, offset: usize) -> Self {
        Self { node, offset }
    }
}

/// A line read back from the DOM after a native edit. `id` is `None` for an
/// element the browser created or duplicated.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReadLine {
    pub id: Option<LineId>,
    pub text: String,
}

/// Where a walk stops.
#[derive(Clone, Debug)]
enum Stop<N> {
    Before(N),
    After(N),
    InText(N, usize),
}

impl<N: DomNode> Stop<N> {
    fn node(&self) -> &N {
        match self {
            Stop::Before(n) | Stop::After(n) | Stop::InText(n, _) => n,
        }
    }
}

/// Convert a native selection into positions. A collapsed selection is
/// resolved once and duplicated.
pub fn dom_selection_to_pos<N: DomNode>(
    root: &N,
    lines: &LineStore,
    anchor: &DomPoint<N>,
    focus: &DomPoint<N>,
) -> Result<Selection, EditorError> {
    let primary = dom_point_to_pos(root, lines, anchor)?;
    if anchor.node.same_node(&focus.node) && anchor.offset == focus.offset {
        return Ok(Selection::collapsed(primary));
    }
    let secondary = dom_point_to_pos(root, lines, focus)?;
    Ok(Selection::new(primary, secondary))
}

/// Convert one DOM point into a position.
pub fn dom_point_to_pos<N: DomNode>(
    root: &N,
    lines: &LineStore,
    point: &DomPoint<N>,
) -> Result<Pos, EditorError> {
    if !root.contains(&point.node) {
        return Err(EditorError::NodeNotInEditor);
    }
    let stop = snap(root, resolve(point));

    // A boundary next to (or inside a block of) whole lines.
    match &stop {
        Stop::Before(n) if !n.is_text() => {
            if let Some(first) = first_line_node(n) {
                return line_edge(lines, &first, false);
            }
        }
        Stop::After(n) if !n.is_text() => {
            if let Some(last) = last_line_node(n) {
                return line_edge(lines, &last, true);
            }
        }
        _ => {}
    }

    match enclosing_line(root, stop.node()) {
        Some(line_node) => {
            let y = line_index(lines, &line_node)?;
            let counted = count_until(&line_node, &stop, &mut 0).unwrap_or(0);
            let pos = lines.pos_at(y, counted)?;
            tracing::trace!(target: "mdpad::cursor", x = pos.x, y = pos.y, pos = pos.pos, "dom point to pos");
            Ok(pos)
        }
        None => walk_document(root, lines, &stop),
    }
}

/// Resolve an absolute offset into a DOM point inside the owning line element.
pub fn pos_to_dom_point<N: DomNode>(
    root: &N,
    lines: &LineStore,
    offset: usize,
) -> Result<DomPoint<N>, EditorError> {
    let pos = lines.pos_from_offset(offset)?;
    let id = lines.line(pos.y)?.id;
    let line_node = find_line_node(root, id).ok_or(EditorError::MissingMarker(NODE_MARKER))?;
    Ok(point_in_line(&line_node, pos.x))
}

/// DOM point `x` chars into `line_node`. A caret that would land inside a
/// hidden syntax span snaps past it.
pub fn point_in_line<N: DomNode>(line_node: &N, x: usize) -> DomPoint<N> {
    let mut texts = Vec::new();
    collect_texts(line_node, false, &mut texts);

    let mut remaining = x;
    let mut last_visible = None;
    for (node, data, hidden) in texts {
        let len = char_len(&data);
        if hidden {
            remaining = remaining.saturating_sub(len);
            continue;
        }
        if remaining <= len {
            return DomPoint::new(node, char_to_utf16(&data, remaining));
        }
        remaining -= len;
        last_visible = Some((node, data));
    }
    match last_visible {
        Some((node, data)) => {
            let end = char_to_utf16(&data, char_len(&data));
            DomPoint::new(node, end)
        }
        None => DomPoint::new(line_node.clone(), 0),
    }
}

/// Text of a line element, skipping zero-width subtrees.
pub fn line_text<N: DomNode>(line_node: &N) -> String {
    let mut texts = Vec::new();
    collect_texts(line_node, false, &mut texts);
    texts.into_iter().map(|(_, data, _)| data).collect()
}

/// All line elements under `root`, in document order.
pub fn line_nodes<N: DomNode>(root: &N) -> Vec<N> {
    let mut out = Vec::new();
    collect_line_nodes(root, &mut out);
    out
}

pub fn find_line_node<N: DomNode>(root: &N, id: LineId) -> Option<N> {
    let id = id.to_string();
    line_nodes(root)
        .into_iter()
        .find(|n| n.attribute("id").as_deref() == Some(id.as_str()))
}

/// Ids of the lines a native edit may have touched: the selected lines plus
/// `window` lines on either side.
pub fn extended_addressable_range(
    lines: &LineStore,
    selection: &Selection,
    window: usize,
) -> Vec<LineId> {
    let (first, last) = selection.line_span();
    let first = first.saturating_sub(window);
    let last = (last + window).min(lines.len().saturating_sub(1));
    lines.as_slice()[first..=last].iter().map(|l| l.id).collect()
}

/// Read the DOM lines between the elements for `first` and `last`, inclusive.
/// Ids the browser duplicated are reported once; later copies read as new.
pub fn read_lines<N: DomNode>(
    root: &N,
    first: LineId,
    last: LineId,
) -> Result<Vec<ReadLine>, EditorError> {
    let nodes = line_nodes(root);
    let start = nodes
        .iter()
        .position(|n| id_of(n) == Some(first))
        .ok_or(EditorError::UnknownLine(first))?;
    let end = nodes
        .iter()
        .rposition(|n| id_of(n) == Some(last))
        .ok_or(EditorError::UnknownLine(last))?;
    if end < start {
        return Err(EditorError::UnknownLine(last));
    }
    Ok(read_nodes(&nodes[start..=end]))
}

/// Read every line element under `root`.
pub fn read_all_lines<N: DomNode>(root: &N) -> Vec<ReadLine> {
    read_nodes(&line_nodes(root))
}

fn id_of<N: DomNode>(node: &N) -> Option<LineId> {
    node.attribute("id").and_then(|s| s.parse::<LineId>().ok())
}

fn read_nodes<N: DomNode>(nodes: &[N]) -> Vec<ReadLine> {
    let mut seen = Vec::new();
    let mut out = Vec::with_capacity(nodes.len());
    for node in nodes {
        let id = id_of(node).filter(|id| !seen.contains(id));
        if let Some(id) = id {
            seen.push(id);
        }
        out.push(ReadLine {
            id,
            text: line_text(node),
        });
    }
    out
}

fn resolve<N: DomNode>(point: &DomPoint<N>) -> Stop<N> {
    if let Some(data) = point.node.text_data() {
        return Stop::InText(point.node.clone(), utf16_to_char(&data, point.offset));
    }
    let children = point.node.children();
    match children.get(point.offset) {
        Some(child) => Stop::Before(child.clone()),
        None => match children.last() {
            Some(last) => Stop::After(last.clone()),
            // Empty element: its start is its end.
            None => Stop::Before(point.node.clone()),
        },
    }
}

/// Move a stop out of zero-width subtrees and hidden syntax spans.
fn snap<N: DomNode>(root: &N, stop: Stop<N>) -> Stop<N> {
    let mut zero_width = None;
    let mut hidden = None;
    let mut current = Some(stop.node().clone());
    while let Some(node) = current {
        if node.same_node(root) {
            break;
        }
        if node.is_zero_width() {
            zero_width = Some(node.clone());
        } else if hidden.is_none() && node.has_attribute(HIDDEN_MARKER) {
            hidden = Some(node.clone());
        }
        current = node.parent();
    }

    if let Some(outer) = zero_width {
        tracing::debug!(target: "mdpad::cursor", "selection inside zero-width subtree, snapping before it");
        return Stop::Before(outer);
    }
    let Some(span) = hidden else {
        return stop;
    };
    if let Stop::Before(n) = &stop {
        if n.same_node(&span) {
            return stop;
        }
    }
    let span_len = char_len(&line_text(&span));
    let before_span = match &stop {
        Stop::InText(_, k) => *k * 2 < span_len,
        Stop::Before(_) => true,
        Stop::After(_) => false,
    };
    tracing::debug!(target: "mdpad::cursor", before_span, "selection inside hidden syntax, snapping");
    if before_span {
        Stop::Before(span)
    } else {
        Stop::After(span)
    }
}

fn enclosing_line<N: DomNode>(root: &N, node: &N) -> Option<N> {
    let mut current = Some(node.clone());
    while let Some(n) = current {
        if n.has_attribute(NODE_MARKER) {
            return Some(n);
        }
        if n.same_node(root) {
            return None;
        }
        current = n.parent();
    }
    None
}

fn line_index<N: DomNode>(lines: &LineStore, line_node: &N) -> Result<usize, EditorError> {
    let id = line_node
        .attribute("id")
        .and_then(|s| s.parse::<LineId>().ok())
        .ok_or(EditorError::MissingMarker("id"))?;
    lines.index_of(id).ok_or(EditorError::UnknownLine(id))
}

fn line_edge<N: DomNode>(lines: &LineStore, line_node: &N, end: bool) -> Result<Pos, EditorError> {
    let y = line_index(lines, line_node)?;
    let x = if end { lines.line(y)?.len() } else { 0 };
    lines.pos_at(y, x)
}

fn first_line_node<N: DomNode>(node: &N) -> Option<N> {
    if node.is_zero_width() {
        return None;
    }
    if node.has_attribute(NODE_MARKER) {
        return Some(node.clone());
    }
    node.children().iter().find_map(first_line_node)
}

fn last_line_node<N: DomNode>(node: &N) -> Option<N> {
    if node.is_zero_width() {
        return None;
    }
    if node.has_attribute(NODE_MARKER) {
        return Some(node.clone());
    }
    node.children().iter().rev().find_map(last_line_node)
}

fn collect_line_nodes<N: DomNode>(node: &N, out: &mut Vec<N>) {
    if node.has_attribute(NODE_MARKER) {
        out.push(node.clone());
        return;
    }
    for child in node.children() {
        collect_line_nodes(&child, out);
    }
}

/// Text nodes under `node` in order, with whether each sits in a hidden span.
fn collect_texts<N: DomNode>(node: &N, hidden: bool, out: &mut Vec<(N, String, bool)>) {
    if let Some(data) = node.text_data() {
        out.push((node.clone(), data, hidden));
        return;
    }
    if node.is_zero_width() {
        return;
    }
    let hidden = hidden || node.has_attribute(HIDDEN_MARKER);
    for child in node.children() {
        collect_texts(&child, hidden, out);
    }
}

/// Chars under `node` before `stop`, accumulated into `acc`. `None` when the
/// stop is not in this subtree.
fn count_until<N: DomNode>(node: &N, stop: &Stop<N>, acc: &mut usize) -> Option<usize> {
    if let Stop::Before(target) = stop {
        if node.same_node(target) {
            return Some(*acc);
        }
    }
    if let Some(data) = node.text_data() {
        if let Stop::InText(target, k) = stop {
            if node.same_node(target) {
                return Some(*acc + (*k).min(char_len(&data)));
            }
        }
        *acc += char_len(&data);
    } else if !node.is_zero_width() {
        for child in node.children() {
            if let Some(found) = count_until(&child, stop, acc) {
                return Some(found);
            }
        }
    }
    if let Stop::After(target) = stop {
        if node.same_node(target) {
            return Some(*acc);
        }
    }
    None
}

/// Whole-document walk: count chars from the root, adding one newline each
/// time a further line element is entered. Used when the stop has no line
/// ancestor.
fn walk_document<N: DomNode>(
    root: &N,
    lines: &LineStore,
    stop: &Stop<N>,
) -> Result<Pos, EditorError> {
    struct Walk {
        seen_lines: usize,
        x: usize,
    }

    fn visit<N: DomNode>(node: &N, stop: &Stop<N>, walk: &mut Walk) -> bool {
        if let Stop::Before(target) = stop {
            if node.same_node(target) {
                return true;
            }
        }
        if node.has_attribute(NODE_MARKER) {
            walk.seen_lines += 1;
            walk.x = 0;
        }
        if let Some(data) = node.text_data() {
            if let Stop::InText(target, k) = stop {
                if node.same_node(target) {
                    walk.x += (*k).min(char_len(&data));
                    return true;
                }
            }
            walk.x += char_len(&data);
        } else if !node.is_zero_width() {
            for child in node.children() {
                if visit(&child, stop, walk) {
                    return true;
                }
            }
        }
        matches!(stop, Stop::After(target) if node.same_node(target))
    }

    let mut walk = Walk { seen_lines: 0, x: 0 };
    for child in root.children() {
        if visit(&child, stop, &mut walk) {
            break;
        }
    }
    let y = walk.seen_lines.saturating_sub(1);
    tracing::debug!(target: "mdpad::cursor", y, x = walk.x, "resolved selection by full walk");
    lines.pos_at(y, walk.x)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::parse_document;
    use crate::cache::ParseCache;
    use crate::dom::ZERO_WIDTH_MARKER;
    use crate::render::render_editable;
    use crate::vdom::VNode;
    use pretty_assertions::assert_eq;

    fn setup(text: &str, read_only: bool) -> (LineStore, VNode) {
        let store = LineStore::from_text(text);
        let tree = parse_document(&store, &mut ParseCache::new(64));
        (store.clone(), render_editable(&tree, read_only))
    }

    /// Every offset maps to a DOM point and back to itself.
    fn assert_round_trip(text: &str, read_only: bool) {
        let (store, root) = setup(text, read_only);
        for offset in 0..=store.total_len() {
            let point = pos_to_dom_point(&root, &store, offset).unwrap();
            let pos = dom_point_to_pos(&root, &store, &point).unwrap();
            assert_eq!(pos, store.pos_from_offset(offset).unwrap(), "offset {offset} in {text:?}");
        }
    }

    #[test]
    fn test_round_trip_edit_mode() {
        assert_round_trip("# Title *em*\n\npara with `code` and 🎉\n> q\n- [ ] t\n\t1. n", false);
        assert_round_trip("```rs\nfn x() {}\n\n```\n---", false);
    }

    #[test]
    fn test_text_offsets_are_utf16() {
        let (store, root) = setup("🎉a", false);
        let line = find_line_node(&root, LineId(0)).unwrap();
        let emoji_text = line.children()[0].children()[0].clone();
        let a_text = line.children()[1].clone();
        assert_eq!(a_text.text_data().as_deref(), Some("a"));
        let pos = dom_point_to_pos(&root, &store, &DomPoint::new(a_text.clone(), 1)).unwrap();
        assert_eq!(pos, Pos::new(2, 0, 2));
        let point = pos_to_dom_point(&root, &store, 1).unwrap();
        // End of the emoji's text node is two UTF-16 units in.
        assert_eq!(point, DomPoint::new(emoji_text, 2));
    }

    #[test]
    fn test_element_boundary_points() {
        let (store, root) = setup("ab\ncd", false);
        let second = find_line_node(&root, LineId(1)).unwrap();
        // Root with child offset 1 is the start of the second block.
        let pos = dom_point_to_pos(&root, &store, &DomPoint::new(root.clone(), 1)).unwrap();
        assert_eq!(pos, Pos::new(0, 1, 3));
        // Past the last child of the root is the document end.
        let pos = dom_point_to_pos(&root, &store, &DomPoint::new(root.clone(), 2)).unwrap();
        assert_eq!(pos, Pos::new(2, 1, 5));
        // Inside the line element after its only text node.
        let pos = dom_point_to_pos(&root, &store, &DomPoint::new(second, 1)).unwrap();
        assert_eq!(pos, Pos::new(2, 1, 5));
    }

    #[test]
    fn test_empty_line_maps_to_line_element() {
        let (store, root) = setup("a\n\nb", false);
        let point = pos_to_dom_point(&root, &store, 2).unwrap();
        let empty = find_line_node(&root, LineId(1)).unwrap();
        assert_eq!(point, DomPoint::new(empty.clone(), 0));
        assert_eq!(
            dom_point_to_pos(&root, &store, &point).unwrap(),
            Pos::new(0, 1, 2)
        );
    }

    #[test]
    fn test_collapsed_selection_is_equal_pair() {
        let (store, root) = setup("hello\nworld", false);
        let text = find_line_node(&root, LineId(1)).unwrap().children()[0].clone();
        let point = DomPoint::new(text, 3);
        let sel = dom_selection_to_pos(&root, &store, &point, &point).unwrap();
        assert!(sel.is_collapsed());
        assert_eq!(sel.primary, Pos::new(3, 1, 9));
    }

    #[test]
    fn test_zero_width_subtree_is_skipped_both_ways() {
        let store = LineStore::from_text("ab");
        let root = VNode::element("div");
        let widget = VNode::element("span")
            .attr(ZERO_WIDTH_MARKER, "")
            .child(VNode::text("☐ "));
        let text = VNode::text("ab");
        root.push(
            VNode::element("p")
                .attr(NODE_MARKER, "")
                .attr("id", "ln-0")
                .child(widget.clone())
                .child(text.clone()),
        );
        assert_eq!(
            dom_point_to_pos(&root, &store, &DomPoint::new(text.clone(), 1)).unwrap(),
            Pos::new(1, 0, 1)
        );
        assert_eq!(pos_to_dom_point(&root, &store, 1).unwrap(), DomPoint::new(text, 1));
        // A caret inside the widget snaps before it.
        let inside = widget.children()[0].clone();
        assert_eq!(
            dom_point_to_pos(&root, &store, &DomPoint::new(inside, 1)).unwrap(),
            Pos::new(0, 0, 0)
        );
        assert_eq!(line_text(&root.children()[0]), "ab");
    }

    #[test]
    fn test_read_only_round_trip_snaps_out_of_hidden_syntax() {
        let (store, root) = setup("## Title\n- [x] done", true);
        // Column 1 is inside the hidden "## " span: it resolves after it.
        let point = pos_to_dom_point(&root, &store, 1).unwrap();
        assert_eq!(point.node.text_data().as_deref(), Some("Title"));
        assert_eq!(point.offset, 0);
        assert_eq!(
            dom_point_to_pos(&root, &store, &point).unwrap(),
            Pos::new(3, 0, 3)
        );

        let syntax_text = find_line_node(&root, LineId(0)).unwrap().children()[0].children()[0].clone();
        assert_eq!(
            dom_point_to_pos(&root, &store, &DomPoint::new(syntax_text.clone(), 1)).unwrap(),
            Pos::new(0, 0, 0)
        );
        assert_eq!(
            dom_point_to_pos(&root, &store, &DomPoint::new(syntax_text, 2)).unwrap(),
            Pos::new(3, 0, 3)
        );
        // Visible text maps the same in both modes.
        let pos = dom_point_to_pos(&root, &store, &pos_to_dom_point(&root, &store, 15).unwrap()).unwrap();
        assert_eq!(pos, Pos::new(6, 1, 15));
    }

    #[test]
    fn test_foreign_node_is_an_error() {
        let (store, root) = setup("a", false);
        let stray = VNode::text("x");
        assert_eq!(
            dom_point_to_pos(&root, &store, &DomPoint::new(stray, 0)),
            Err(EditorError::NodeNotInEditor)
        );
    }

    #[test]
    fn test_unknown_line_id_is_an_error() {
        let (_, root) = setup("a\nb", false);
        let other = LineStore::from_text("only");
        let text = find_line_node(&root, LineId(1)).unwrap().children()[0].clone();
        assert_eq!(
            dom_point_to_pos(&root, &other, &DomPoint::new(text, 0)),
            Err(EditorError::UnknownLine(LineId(1)))
        );
    }

    #[test]
    fn test_full_walk_fallback_counts_line_markers() {
        let store = LineStore::from_text("ab\ncd");
        let root = VNode::element("div");
        root.push(VNode::element("p").attr(NODE_MARKER, "").child(VNode::text("ab")));
        root.push(VNode::element("p").attr(NODE_MARKER, "").child(VNode::text("cd")));
        // No ids: the stop has a line ancestor without an id, so addressing fails.
        let text = root.children()[1].children()[0].clone();
        assert_eq!(
            dom_point_to_pos(&root, &store, &DomPoint::new(text, 1)),
            Err(EditorError::MissingMarker("id"))
        );
        // A stop outside any line element falls back to counting markers.
        let tail = VNode::element("span");
        root.push(tail.clone());
        assert_eq!(
            dom_point_to_pos(&root, &store, &DomPoint::new(tail, 0)).unwrap(),
            Pos::new(2, 1, 5)
        );
    }

    #[test]
    fn test_extended_addressable_range_is_clamped() {
        let store = LineStore::from_text("a\nb\nc\nd\ne");
        let sel = Selection::collapsed(store.pos_at(1, 0).unwrap());
        let ids = extended_addressable_range(&store, &sel, 2);
        assert_eq!(ids, vec![LineId(0), LineId(1), LineId(2), LineId(3)]);
    }

    #[test]
    fn test_read_lines_reports_duplicated_ids_once() {
        let root = VNode::element("div");
        for (id, text) in [("ln-0", "a"), ("ln-1", "b"), ("ln-1", "c"), ("ln-2", "d")] {
            root.push(
                VNode::element("p")
                    .attr(NODE_MARKER, "")
                    .attr("id", id)
                    .child(VNode::text(text)),
            );
        }
        let read = read_lines(&root, LineId(1), LineId(1)).unwrap();
        assert_eq!(
            read,
            vec![
                ReadLine { id: Some(LineId(1)), text: "b".into() },
                ReadLine { id: None, text: "c".into() },
            ]
        );
    }
}
