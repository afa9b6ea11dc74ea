//! Block-level parsing: groups lines into headers, paragraphs, blockquotes,
//! fenced code, (nested) lists and thematic breaks.
//!
//! One left-to-right pass. Multi-line constructs consume their whole line
//! range at once. Parsing is total: anything that does not fit a construct
//! becomes a paragraph.

use std::sync::{Arc, LazyLock};

use regex::Regex;
use smol_str::SmolStr;

use crate::cache::{BlockKey, ParseCache};
use crate::element::{Element, ElementTree, Heading};
use crate::inline::parse_inline;
use crate::lines::{Line, LineStore};
use crate::slug::SlugCounter;

static HEADER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(#{1,6}) ").expect("valid header pattern")
});

pub(crate) static LIST_ITEM: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\t*)(- \[[ xX]\] |[-*+] |\d+\. )")
        .expect("valid list item pattern")
});

const FENCES: [&str; 2] = ["```", "~~~"];

/// Parse the whole document, reusing cached blocks for unchanged content.
pub fn parse_document(lines: &LineStore, cache: &mut ParseCache) -> ElementTree {
    let lines = lines.as_slice();
    let mut blocks = Vec::new();
    let mut y = 0;

    while y < lines.len() {
        let end = block_end(lines, y);
        let range = &lines[y..=end];
        let block = cache.get_or_parse(BlockKey::from_lines(range), || parse_block(range));
        blocks.push(block);
        y = end + 1;
    }

    let headings = collect_headings(&blocks);
    let (hits, misses) = cache.stats();
    tracing::trace!(target: "mdpad::parse", blocks = blocks.len(), hits, misses, "parsed document");
    ElementTree { blocks, headings }
}

/// Index of the last line of the block starting at `y`.
fn block_end(lines: &[Line], y: usize) -> usize {
    let text = lines[y].text.as_str();
    if let Some(fence) = fence_open(text) {
        return lines[y + 1..]
            .iter()
            .position(|l| is_fence_close(&l.text, fence))
            .map_or(y, |offset| y + 1 + offset);
    }
    if HEADER.is_match(text) || is_break(text) {
        return y;
    }
    if is_quote(text) {
        return run_end(lines, y, |t| is_quote(t));
    }
    if LIST_ITEM.is_match(text) {
        return run_end(lines, y, |t| LIST_ITEM.is_match(t) && !is_break(t));
    }
    y
}

fn run_end(lines: &[Line], y: usize, matches: impl Fn(&str) -> bool) -> usize {
    lines[y..]
        .iter()
        .take_while(|l| matches(&l.text))
        .count()
        + y
        - 1
}

fn fence_open(text: &str) -> Option<&'static str> {
    FENCES.into_iter().find(|f| text.starts_with(f))
}

fn is_fence_close(text: &str, fence: &str) -> bool {
    text.strip_prefix(fence)
        .is_some_and(|rest| rest.trim().is_empty())
}

fn is_break(text: &str) -> bool {
    text == "---" || text == "***"
}

fn is_quote(text: &str) -> bool {
    text == ">" || text.starts_with("> ")
}

/// Build the element for a line range already delimited by [`block_end`].
fn parse_block(range: &[Line]) -> Element {
    let first = &range[0];
    let text = first.text.as_str();

    if range.len() > 1 {
        if let Some(fence) = fence_open(text) {
            return parse_fenced(range, fence);
        }
        if is_quote(text) {
            return Element::Blockquote {
                id: first.id,
                children: range.iter().map(parse_quote_item).collect(),
            };
        }
        if LIST_ITEM.is_match(text) {
            return parse_list(range);
        }
    }

    if let Some(caps) = HEADER.captures(text) {
        let hashes = caps.get(1).map_or("", |m| m.as_str());
        return Element::Header {
            id: first.id,
            depth: hashes.len() as u8,
            syntax: SmolStr::new(format!("{hashes} ")),
            children: parse_inline(&text[hashes.len() + 1..]),
        };
    }
    if is_break(text) {
        return Element::Break {
            id: first.id,
            syntax: first.text.clone(),
        };
    }
    if is_quote(text) {
        return Element::Blockquote {
            id: first.id,
            children: vec![parse_quote_item(first)],
        };
    }
    if LIST_ITEM.is_match(text) {
        return parse_list(range);
    }
    // Also the landing spot for an unterminated fence opener.
    Element::Paragraph {
        id: first.id,
        children: parse_inline(text),
    }
}

fn parse_fenced(range: &[Line], fence: &'static str) -> Element {
    let first = &range[0];
    let info = &first.text[fence.len()..];
    let extension = info
        .trim()
        .rsplit('.')
        .next()
        .filter(|ext| !ext.is_empty())
        .map(|ext| SmolStr::new(ext.to_lowercase()));
    let last = range.len() - 1;
    Element::Preformatted {
        id: first.id,
        syntax: SmolStr::new_static(fence),
        info: SmolStr::new(info),
        extension,
        body: range[1..last].to_vec(),
        closing: range[last].clone(),
    }
}

fn parse_quote_item(line: &Line) -> Element {
    let text = line.text.as_str();
    let syntax = if text.starts_with("> ") { "> " } else { ">" };
    Element::BlockquoteItem {
        id: line.id,
        syntax: SmolStr::new_static(syntax),
        children: parse_inline(&text[syntax.len()..]),
    }
}

struct ListLine {
    depth: usize,
    ordered: bool,
    element: Element,
}

fn parse_list_line(line: &Line) -> ListLine {
    let text = line.text.as_str();
    let Some(caps) = LIST_ITEM.captures(text) else {
        // The run was delimited with the same pattern; keep the line as an
        // item with no syntax rather than dropping it.
        return ListLine {
            depth: 0,
            ordered: false,
            element: Element::AnyListItem {
                id: line.id,
                indent: 0,
                syntax: SmolStr::default(),
                children: parse_inline(text),
            },
        };
    };
    let depth = caps.get(1).map_or(0, |m| m.len());
    let marker = caps.get(2).map_or("", |m| m.as_str());
    let content = parse_inline(&text[depth + marker.len()..]);
    let syntax = SmolStr::new(marker);
    let ordered = marker.starts_with(|c: char| c.is_ascii_digit());

    let element = if marker.starts_with("- [") {
        Element::TodoItem {
            id: line.id,
            indent: depth,
            checked: !marker.starts_with("- [ ]"),
            syntax,
            children: content,
        }
    } else {
        Element::AnyListItem {
            id: line.id,
            indent: depth,
            syntax,
            children: content,
        }
    };
    ListLine {
        depth,
        ordered,
        element,
    }
}

fn parse_list(range: &[Line]) -> Element {
    let items: Vec<ListLine> = range.iter().map(parse_list_line).collect();
    let base = items.iter().map(|i| i.depth).min().unwrap_or(0);
    build_list(&items, 0, base, range[0].id).0
}

/// Build one list level starting at `start`. Items deeper than `depth` become
/// nested lists; returns the list and the index of the first unconsumed item.
fn build_list(
    items: &[ListLine],
    start: usize,
    depth: usize,
    id: crate::lines::LineId,
) -> (Element, usize) {
    let mut children = Vec::new();
    let mut ordered = None;
    let mut i = start;
    while i < items.len() && items[i].depth >= depth {
        if items[i].depth == depth {
            ordered.get_or_insert(items[i].ordered);
            children.push(items[i].element.clone());
            i += 1;
        } else {
            let nested_id = items[i].element.id();
            let (nested, next) = build_list(items, i, items[i].depth, nested_id);
            children.push(nested);
            i = next;
        }
    }
    (
        Element::AnyList {
            id,
            ordered: ordered.unwrap_or(false),
            depth,
            children,
        },
        i,
    )
}

fn collect_headings(blocks: &[Arc<Element>]) -> Vec<Heading> {
    let mut slugs = SlugCounter::new();
    blocks
        .iter()
        .filter_map(|block| match block.as_ref() {
            Element::Header {
                id,
                depth,
                children,
                ..
            } => {
                let title = children.plain_text();
                Some(Heading {
                    id: *id,
                    depth: *depth,
                    slug: slugs.next(&title),
                    title,
                })
            }
            _ => None,
        })
        .collect()
}
