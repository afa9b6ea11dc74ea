//! Editable rendering of the element tree.
//!
//! Every line becomes one element carrying [`NODE_MARKER`] and `id = LineId`;
//! every top-level block carries [`ROOT_MARKER`]. All Markdown syntax is kept
//! as text inside `md-syntax` spans, so a line element's text is exactly the
//! line's text and offsets map one to one. Read-only mode only adds
//! [`HIDDEN_MARKER`] to those spans and shows zero-width checkbox widgets.

use crate::dom::{DomNode, HIDDEN_MARKER, NODE_MARKER, ROOT_MARKER, ZERO_WIDTH_MARKER};
use crate::element::{Element, ElementTree, Inline, InlineNode};
use crate::lines::LineId;
use crate::vdom::VNode;

/// Class on spans holding literal Markdown syntax.
pub const SYNTAX_CLASS: &str = "md-syntax";
/// Attribute on checkbox widgets naming the todo line they toggle.
pub const CHECK_ATTR: &str = "data-check";

/// Render the whole tree into a detached container `div`.
pub fn render_editable(tree: &ElementTree, read_only: bool) -> VNode {
    let renderer = Renderer { tree, read_only };
    let root = VNode::element("div");
    for block in &tree.blocks {
        root.push(renderer.block(block).attr(ROOT_MARKER, ""));
    }
    root
}

struct Renderer<'a> {
    tree: &'a ElementTree,
    read_only: bool,
}

impl Renderer<'_> {
    fn line(&self, tag: &str, id: LineId) -> VNode {
        VNode::element(tag)
            .attr(NODE_MARKER, "")
            .attr("id", id.to_string())
    }

    fn syntax(&self, text: &str) -> VNode {
        let span = VNode::element("span").attr("class", SYNTAX_CLASS);
        if self.read_only {
            span.set_attr(HIDDEN_MARKER, "");
        }
        span.child(VNode::text(text))
    }

    /// `<br>` keeps empty lines selectable and contributes no characters.
    fn placeholder_if_empty(&self, node: &VNode) {
        if node.children().is_empty() {
            node.push(VNode::element("br"));
        }
    }

    fn block(&self, element: &Element) -> VNode {
        match element {
            Element::Header {
                id,
                depth,
                syntax,
                children,
            } => {
                let node = self.line(&format!("h{depth}"), *id);
                if let Some(slug) = self.tree.slug_for(*id) {
                    node.set_attr("data-slug", slug);
                }
                node.push(self.syntax(syntax));
                self.inline(&node, children);
                node
            }
            Element::Paragraph { id, children } => {
                let node = self.line("p", *id);
                self.inline(&node, children);
                self.placeholder_if_empty(&node);
                node
            }
            Element::Blockquote { id, children } => {
                let node = VNode::element("blockquote").attr("data-first", id.to_string());
                for child in children {
                    node.push(self.block(child));
                }
                node
            }
            Element::BlockquoteItem {
                id,
                syntax,
                children,
            } => {
                let node = self.line("p", *id);
                node.push(self.syntax(syntax));
                self.inline(&node, children);
                node
            }
            Element::Preformatted {
                id,
                syntax,
                info,
                extension,
                body,
                closing,
            } => {
                let node = VNode::element("pre");
                if let Some(ext) = extension {
                    node.set_attr("data-lang", ext.as_str());
                }
                node.push(
                    self.line("div", *id)
                        .child(self.syntax(&format!("{syntax}{info}"))),
                );
                for line in body {
                    let row = self.line("div", line.id).child(VNode::text(line.text.as_str()));
                    self.placeholder_if_empty(&row);
                    node.push(row);
                }
                let close = self.line("div", closing.id);
                close.push(self.syntax(&closing.text));
                self.placeholder_if_empty(&close);
                node.push(close);
                node
            }
            Element::AnyList {
                ordered, children, ..
            } => {
                let node = VNode::element(if *ordered { "ol" } else { "ul" });
                for child in children {
                    node.push(self.block(child));
                }
                node
            }
            Element::AnyListItem {
                id,
                indent,
                syntax,
                children,
            } => {
                let node = self.line("li", *id);
                node.push(self.syntax(&format!("{}{syntax}", "\t".repeat(*indent))));
                self.inline(&node, children);
                node
            }
            Element::TodoItem {
                id,
                indent,
                syntax,
                checked,
                children,
            } => {
                let node = self.line("li", *id).attr("data-todo", "");
                if self.read_only {
                    let widget = VNode::element("input")
                        .attr("type", "checkbox")
                        .attr(ZERO_WIDTH_MARKER, "")
                        .attr("contenteditable", "false")
                        .attr(CHECK_ATTR, id.to_string());
                    if *checked {
                        widget.set_attr("checked", "");
                    }
                    node.push(widget);
                }
                node.push(self.syntax(&format!("{}{syntax}", "\t".repeat(*indent))));
                self.inline(&node, children);
                node
            }
            Element::Break { id, syntax } => self.line("div", *id).child(self.syntax(syntax)),
        }
    }

    fn inline(&self, parent: &VNode, inline: &Inline) {
        match inline {
            Inline::Empty => {}
            Inline::Text(t) => parent.push(VNode::text(t.as_str())),
            Inline::Spans(spans) => {
                for span in spans {
                    parent.push(self.inline_node(&span.node));
                }
            }
        }
    }

    fn wrap(&self, tag: &str, syntax: &str, children: &Inline) -> VNode {
        let node = VNode::element(tag);
        node.push(self.syntax(syntax));
        self.inline(&node, children);
        node.push(self.syntax(syntax));
        node
    }

    fn inline_node(&self, node: &InlineNode) -> VNode {
        match node {
            InlineNode::Text(t) => VNode::text(t.as_str()),
            InlineNode::Escape { syntax, text } => VNode::element("span")
                .attr("class", "md-escape")
                .child(self.syntax(syntax))
                .child(VNode::text(text.as_str())),
            InlineNode::Emphasis { syntax, children } => self.wrap("em", syntax, children),
            InlineNode::Strong { syntax, children } => self.wrap("strong", syntax, children),
            InlineNode::StrongEmphasis { syntax, children } => {
                let em = self.wrap("em", syntax, children);
                VNode::element("strong").child(em)
            }
            InlineNode::Code { syntax, text } => VNode::element("code")
                .child(self.syntax(syntax))
                .child(VNode::text(text.as_str()))
                .child(self.syntax(syntax)),
            InlineNode::Strikethrough { syntax, children } => self.wrap("del", syntax, children),
            InlineNode::Anchor {
                open,
                close,
                href,
                children,
            } => {
                let a = VNode::element("a").attr("href", href.as_str());
                if !open.is_empty() {
                    a.push(self.syntax(open));
                }
                self.inline(&a, children);
                if !close.is_empty() {
                    a.push(self.syntax(close));
                }
                a
            }
            InlineNode::Emoji { text } => VNode::element("span")
                .attr("class", "md-emoji")
                .child(VNode::text(text.as_str())),
        }
    }
}
