//! The parsed element tree.
//!
//! Block elements own the ids of the lines they were parsed from. Inline spans
//! carry the char offset where they start within their line, which doubles as
//! a synthesized id (`{line}-{at}`). Every element keeps its Markdown syntax
//! verbatim so the tree serializes back to the exact source text.

use std::sync::Arc;

use smol_str::SmolStr;

use crate::lines::{Line, LineId};

/// Children of an inline-bearing element: nothing, a bare string, or spans.
///
/// A parse that produces a single unformatted text run is collapsed to
/// `Text` rather than a one-element `Spans`.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub enum Inline {
    #[default]
    Empty,
    Text(SmolStr),
    Spans(Vec<Span>),
}

/// An inline element positioned within its line.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Span {
    /// Char offset of the span's first syntax char within the line.
    pub at: usize,
    pub node: InlineNode,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum InlineNode {
    Text(SmolStr),
    /// Backslash escape; `syntax` is the backslash, `text` the escaped char.
    Escape { syntax: SmolStr, text: SmolStr },
    Emphasis { syntax: SmolStr, children: Inline },
    Strong { syntax: SmolStr, children: Inline },
    StrongEmphasis { syntax: SmolStr, children: Inline },
    /// Code content is verbatim; `syntax` is the backtick run.
    Code { syntax: SmolStr, text: SmolStr },
    Strikethrough { syntax: SmolStr, children: Inline },
    /// `open`/`close` are `[` and `](href)` for bracket links, empty for
    /// autolinks.
    Anchor {
        open: SmolStr,
        close: SmolStr,
        href: SmolStr,
        children: Inline,
    },
    Emoji { text: SmolStr },
}

impl InlineNode {
    /// Element type name, as used by the BEM and JSX exports.
    pub fn kind(&self) -> &'static str {
        match self {
            InlineNode::Text(_) => "text",
            InlineNode::Escape { .. } => "escape",
            InlineNode::Emphasis { .. } => "emphasis",
            InlineNode::Strong { .. } => "strong",
            InlineNode::StrongEmphasis { .. } => "strong-emphasis",
            InlineNode::Code { .. } => "code",
            InlineNode::Strikethrough { .. } => "strikethrough",
            InlineNode::Anchor { .. } => "anchor",
            InlineNode::Emoji { .. } => "emoji",
        }
    }
}

impl Span {
    /// Synthesized id, unique within the document.
    pub fn id(&self, line: LineId) -> String {
        format!("{line}-{}", self.at)
    }
}

impl Inline {
    /// The Markdown source this inline content was parsed from.
    pub fn source(&self) -> String {
        let mut out = String::new();
        self.write_source(&mut out);
        out
    }

    pub(crate) fn write_source(&self, out: &mut String) {
        match self {
            Inline::Empty => {}
            Inline::Text(t) => out.push_str(t),
            Inline::Spans(spans) => {
                for span in spans {
                    span.node.write_source(out);
                }
            }
        }
    }

    /// Visible text with all syntax stripped.
    pub fn plain_text(&self) -> String {
        let mut out = String::new();
        self.write_plain(&mut out);
        out
    }

    fn write_plain(&self, out: &mut String) {
        match self {
            Inline::Empty => {}
            Inline::Text(t) => out.push_str(t),
            Inline::Spans(spans) => {
                for span in spans {
                    match &span.node {
                        InlineNode::Text(t)
                        | InlineNode::Escape { text: t, .. }
                        | InlineNode::Code { text: t, .. }
                        | InlineNode::Emoji { text: t } => out.push_str(t),
                        InlineNode::Emphasis { children, .. }
                        | InlineNode::Strong { children, .. }
                        | InlineNode::StrongEmphasis { children, .. }
                        | InlineNode::Strikethrough { children, .. }
                        | InlineNode::Anchor { children, .. } => children.write_plain(out),
                    }
                }
            }
        }
    }
}

impl InlineNode {
    pub(crate) fn write_source(&self, out: &mut String) {
        match self {
            InlineNode::Text(t) | InlineNode::Emoji { text: t } => out.push_str(t),
            InlineNode::Escape { syntax, text } => {
                out.push_str(syntax);
                out.push_str(text);
            }
            InlineNode::Code { syntax, text } => {
                out.push_str(syntax);
                out.push_str(text);
                out.push_str(syntax);
            }
            InlineNode::Emphasis { syntax, children }
            | InlineNode::Strong { syntax, children }
            | InlineNode::StrongEmphasis { syntax, children }
            | InlineNode::Strikethrough { syntax, children } => {
                out.push_str(syntax);
                children.write_source(out);
                out.push_str(syntax);
            }
            InlineNode::Anchor {
                open,
                close,
                children,
                ..
            } => {
                out.push_str(open);
                children.write_source(out);
                out.push_str(close);
            }
        }
    }
}

/// A block-level element.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Element {
    /// `syntax` is the hash run plus its trailing space.
    Header {
        id: LineId,
        depth: u8,
        syntax: SmolStr,
        children: Inline,
    },
    Paragraph {
        id: LineId,
        children: Inline,
    },
    /// Contiguous quoted lines; children are `BlockquoteItem`s.
    Blockquote {
        id: LineId,
        children: Vec<Element>,
    },
    BlockquoteItem {
        id: LineId,
        syntax: SmolStr,
        children: Inline,
    },
    /// Fenced code block. `syntax` is the three-char fence, `info` the rest of
    /// the opening line, `extension` the lowercased language derived from it.
    Preformatted {
        id: LineId,
        syntax: SmolStr,
        info: SmolStr,
        extension: Option<SmolStr>,
        body: Vec<Line>,
        closing: Line,
    },
    /// A list level; children are items and nested lists.
    AnyList {
        id: LineId,
        ordered: bool,
        depth: usize,
        children: Vec<Element>,
    },
    /// `indent` counts leading tabs; `syntax` is the marker with its space.
    AnyListItem {
        id: LineId,
        indent: usize,
        syntax: SmolStr,
        children: Inline,
    },
    TodoItem {
        id: LineId,
        indent: usize,
        syntax: SmolStr,
        checked: bool,
        children: Inline,
    },
    Break {
        id: LineId,
        syntax: SmolStr,
    },
}

impl Element {
    /// Id of the first line this element covers.
    pub fn id(&self) -> LineId {
        match self {
            Element::Header { id, .. }
            | Element::Paragraph { id, .. }
            | Element::Blockquote { id, .. }
            | Element::BlockquoteItem { id, .. }
            | Element::Preformatted { id, .. }
            | Element::AnyList { id, .. }
            | Element::AnyListItem { id, .. }
            | Element::TodoItem { id, .. }
            | Element::Break { id, .. } => *id,
        }
    }

    /// Element type name, as used by the BEM and JSX exports.
    pub fn kind(&self) -> &'static str {
        match self {
            Element::Header { .. } => "header",
            Element::Paragraph { .. } => "paragraph",
            Element::Blockquote { .. } => "blockquote",
            Element::BlockquoteItem { .. } => "blockquote-item",
            Element::Preformatted { .. } => "preformatted",
            Element::AnyList { .. } => "list",
            Element::AnyListItem { .. } => "list-item",
            Element::TodoItem { .. } => "todo-item",
            Element::Break { .. } => "break",
        }
    }

    /// Source lines this element covers, in order.
    pub fn source_lines(&self) -> Vec<(LineId, String)> {
        let mut out = Vec::new();
        self.collect_lines(&mut out);
        out
    }

    fn collect_lines(&self, out: &mut Vec<(LineId, String)>) {
        match self {
            Element::Header {
                id,
                syntax,
                children,
                ..
            }
            | Element::BlockquoteItem {
                id,
                syntax,
                children,
            } => {
                let mut text = syntax.to_string();
                children.write_source(&mut text);
                out.push((*id, text));
            }
            Element::Paragraph { id, children } => out.push((*id, children.source())),
            Element::Blockquote { children, .. } | Element::AnyList { children, .. } => {
                for child in children {
                    child.collect_lines(out);
                }
            }
            Element::Preformatted {
                id,
                syntax,
                info,
                body,
                closing,
                ..
            } => {
                out.push((*id, format!("{syntax}{info}")));
                out.extend(body.iter().map(|l| (l.id, l.text.to_string())));
                out.push((closing.id, closing.text.to_string()));
            }
            Element::AnyListItem {
                id,
                indent,
                syntax,
                children,
            }
            | Element::TodoItem {
                id,
                indent,
                syntax,
                children,
                ..
            } => {
                let mut text = "\t".repeat(*indent);
                text.push_str(syntax);
                children.write_source(&mut text);
                out.push((*id, text));
            }
            Element::Break { id, syntax } => out.push((*id, syntax.to_string())),
        }
    }
}

/// A heading in document order, with its unique anchor slug.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize)]
pub struct Heading {
    pub id: LineId,
    pub depth: u8,
    pub slug: SmolStr,
    pub title: String,
}

/// Result of a block parse: top-level elements plus the heading outline.
///
/// Blocks are `Arc`s handed out by the parse cache, so unchanged content keeps
/// pointer identity across parses.
#[derive(Clone, Debug, Default)]
pub struct ElementTree {
    pub blocks: Vec<Arc<Element>>,
    pub headings: Vec<Heading>,
}

impl ElementTree {
    /// Table of contents, in document order.
    pub fn outline(&self) -> &[Heading] {
        &self.headings
    }

    pub fn slug_for(&self, id: LineId) -> Option<&str> {
        self.headings
            .iter()
            .find(|h| h.id == id)
            .map(|h| h.slug.as_str())
    }
}
