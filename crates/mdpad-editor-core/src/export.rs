//! Pure exports of the element tree: Markdown source, HTML, BEM-classed HTML,
//! and a JSX-like source string.
//!
//! Each export is an exhaustive match over [`Element`] and [`InlineNode`], so
//! a new element type fails to compile until every format handles it.

use std::fmt::Write as _;

use crate::element::{Element, ElementTree, Inline, InlineNode};

/// Serialize the tree back to Markdown. Inverse of parsing: for every text
/// `d`, `to_text(parse(d)) == d`.
pub fn to_text(tree: &ElementTree) -> String {
    let mut out = String::new();
    for (i, (_, line)) in tree
        .blocks
        .iter()
        .flat_map(|block| block.source_lines())
        .enumerate()
    {
        if i > 0 {
            out.push('\n');
        }
        out.push_str(&line);
    }
    out
}

/// Semantic HTML without classes.
pub fn to_html(tree: &ElementTree) -> String {
    HtmlWriter::new(tree, Flavor::Plain).finish()
}

/// HTML where every element carries `md__{kind}` BEM classes, plus
/// modifiers such as `md__header--2` or `md__todo-item--checked`.
pub fn to_bem_html(tree: &ElementTree) -> String {
    HtmlWriter::new(tree, Flavor::Bem).finish()
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Flavor {
    Plain,
    Bem,
}

struct HtmlWriter<'a> {
    tree: &'a ElementTree,
    flavor: Flavor,
    out: String,
}

impl<'a> HtmlWriter<'a> {
    fn new(tree: &'a ElementTree, flavor: Flavor) -> Self {
        Self {
            tree,
            flavor,
            out: String::new(),
        }
    }

    fn finish(mut self) -> String {
        let tree = self.tree;
        for block in &tree.blocks {
            self.block(block);
        }
        self.out
    }

    /// Write `<tag ...>`. `kind` and `modifier` only matter for BEM output.
    fn open(&mut self, tag: &str, kind: &str, modifier: Option<&str>, attrs: &[(&str, &str)]) {
        self.out.push('<');
        self.out.push_str(tag);
        if self.flavor == Flavor::Bem {
            let _ = write!(self.out, " class=\"md__{kind}");
            if let Some(modifier) = modifier {
                let _ = write!(self.out, " md__{kind}--{modifier}");
            }
            self.out.push('"');
        }
        for (name, value) in attrs {
            if value.is_empty() {
                let _ = write!(self.out, " {name}");
            } else {
                let _ = write!(
                    self.out,
                    " {name}=\"{}\"",
                    html_escape::encode_double_quoted_attribute(value)
                );
            }
        }
        self.out.push('>');
    }

    fn close(&mut self, tag: &str) {
        let _ = write!(self.out, "</{tag}>");
    }

    fn text(&mut self, text: &str) {
        self.out.push_str(&html_escape::encode_text(text));
    }

    fn block(&mut self, element: &Element) {
        match element {
            Element::Header {
                id,
                depth,
                children,
                ..
            } => {
                let tag = format!("h{depth}");
                let slug = self.tree.slug_for(*id).unwrap_or_default().to_string();
                self.open(&tag, "header", Some(&depth.to_string()), &[("id", slug.as_str())]);
                self.inline(children);
                self.close(&tag);
            }
            Element::Paragraph { children, .. } => {
                self.open("p", "paragraph", None, &[]);
                self.inline(children);
                self.close("p");
            }
            Element::Blockquote { children, .. } => {
                self.open("blockquote", "blockquote", None, &[]);
                for child in children {
                    self.block(child);
                }
                self.close("blockquote");
            }
            Element::BlockquoteItem { children, .. } => {
                self.open("p", "blockquote-item", None, &[]);
                self.inline(children);
                self.close("p");
            }
            Element::Preformatted {
                extension, body, ..
            } => {
                self.open("pre", "preformatted", None, &[]);
                let class = extension
                    .as_ref()
                    .map(|ext| format!("language-{ext}"))
                    .unwrap_or_default();
                if self.flavor == Flavor::Bem {
                    self.open("code", "code", extension.as_deref(), &[]);
                } else if class.is_empty() {
                    self.open("code", "code", None, &[]);
                } else {
                    self.open("code", "code", None, &[("class", class.as_str())]);
                }
                for (i, line) in body.iter().enumerate() {
                    if i > 0 {
                        self.out.push('\n');
                    }
                    self.text(&line.text);
                }
                self.close("code");
                self.close("pre");
            }
            Element::AnyList {
                ordered, children, ..
            } => {
                let tag = if *ordered { "ol" } else { "ul" };
                self.open(tag, "list", Some(tag), &[]);
                let mut iter = children.iter().peekable();
                while let Some(child) = iter.next() {
                    let nested_follows = matches!(iter.peek(), Some(Element::AnyList { .. }));
                    match child {
                        Element::AnyList { .. } => {
                            // A nested list with no item to hang from.
                            self.open("li", "list-item", None, &[]);
                            self.block(child);
                            self.close("li");
                        }
                        item => {
                            self.list_item(item);
                            if nested_follows {
                                if let Some(nested) = iter.next() {
                                    self.block(nested);
                                }
                            }
                            self.close("li");
                        }
                    }
                }
                self.close(tag);
            }
            Element::AnyListItem { .. } | Element::TodoItem { .. } => {
                self.list_item(element);
                self.close("li");
            }
            Element::Break { .. } => self.open("hr", "break", None, &[]),
        }
    }

    /// Open an `<li>` and write its content, leaving it open for a nested list.
    fn list_item(&mut self, element: &Element) {
        match element {
            Element::TodoItem {
                checked, children, ..
            } => {
                self.open("li", "todo-item", checked.then_some("checked"), &[]);
                let attrs: &[(&str, &str)] = if *checked {
                    &[("type", "checkbox"), ("disabled", ""), ("checked", "")]
                } else {
                    &[("type", "checkbox"), ("disabled", "")]
                };
                self.open("input", "checkbox", None, attrs);
                self.inline(children);
            }
            Element::AnyListItem { children, .. } => {
                self.open("li", "list-item", None, &[]);
                self.inline(children);
            }
            other => {
                self.open("li", "list-item", None, &[]);
                self.block(other);
            }
        }
    }

    fn inline(&mut self, inline: &Inline) {
        match inline {
            Inline::Empty => {}
            Inline::Text(t) => self.text(t),
            Inline::Spans(spans) => {
                for span in spans {
                    self.inline_node(&span.node);
                }
            }
        }
    }

    fn inline_node(&mut self, node: &InlineNode) {
        match node {
            InlineNode::Text(t) | InlineNode::Escape { text: t, .. } => self.text(t),
            InlineNode::Emphasis { children, .. } => self.wrap("em", "emphasis", children),
            InlineNode::Strong { children, .. } => self.wrap("strong", "strong", children),
            InlineNode::StrongEmphasis { children, .. } => {
                self.open("strong", "strong-emphasis", None, &[]);
                self.open("em", "emphasis", None, &[]);
                self.inline(children);
                self.close("em");
                self.close("strong");
            }
            InlineNode::Code { text, .. } => {
                self.open("code", "code", None, &[]);
                self.text(text);
                self.close("code");
            }
            InlineNode::Strikethrough { children, .. } => {
                self.wrap("del", "strikethrough", children)
            }
            InlineNode::Anchor { href, children, .. } => {
                self.open("a", "anchor", None, &[("href", href.as_str())]);
                self.inline(children);
                self.close("a");
            }
            InlineNode::Emoji { text } => {
                self.open("span", "emoji", None, &[("role", "img")]);
                self.text(text);
                self.close("span");
            }
        }
    }

    fn wrap(&mut self, tag: &str, kind: &str, children: &Inline) {
        self.open(tag, kind, None, &[]);
        self.inline(children);
        self.close(tag);
    }
}

/// A JSX-like component tree, one top-level component per line.
pub fn to_jsx(tree: &ElementTree) -> String {
    let mut out = String::from("<Markdown>\n");
    for block in &tree.blocks {
        jsx_block(tree, block, 1, &mut out);
    }
    out.push_str("</Markdown>");
    out
}

/// JS string literal for `s`.
fn js_string(s: &str) -> String {
    serde_json::Value::String(s.to_string()).to_string()
}

fn indent(out: &mut String, level: usize) {
    for _ in 0..level {
        out.push_str("  ");
    }
}

fn jsx_block(tree: &ElementTree, element: &Element, level: usize, out: &mut String) {
    indent(out, level);
    match element {
        Element::Header {
            id,
            depth,
            children,
            ..
        } => {
            let slug = tree.slug_for(*id).unwrap_or_default();
            let _ = write!(out, "<Header depth={{{depth}}} slug={}>", js_string(slug));
            jsx_inline(children, out);
            out.push_str("</Header>\n");
        }
        Element::Paragraph { children, .. } => {
            out.push_str("<Paragraph>");
            jsx_inline(children, out);
            out.push_str("</Paragraph>\n");
        }
        Element::BlockquoteItem { children, .. } => {
            out.push_str("<BlockquoteItem>");
            jsx_inline(children, out);
            out.push_str("</BlockquoteItem>\n");
        }
        Element::AnyListItem { children, .. } => {
            out.push_str("<ListItem>");
            jsx_inline(children, out);
            out.push_str("</ListItem>\n");
        }
        Element::TodoItem {
            checked, children, ..
        } => {
            let _ = write!(out, "<TodoItem checked={{{checked}}}>");
            jsx_inline(children, out);
            out.push_str("</TodoItem>\n");
        }
        Element::Blockquote { children, .. } => {
            out.push_str("<Blockquote>\n");
            for child in children {
                jsx_block(tree, child, level + 1, out);
            }
            indent(out, level);
            out.push_str("</Blockquote>\n");
        }
        Element::AnyList {
            ordered, children, ..
        } => {
            let _ = writeln!(out, "<List ordered={{{ordered}}}>");
            for child in children {
                jsx_block(tree, child, level + 1, out);
            }
            indent(out, level);
            out.push_str("</List>\n");
        }
        Element::Preformatted {
            extension, body, ..
        } => {
            let code: Vec<&str> = body.iter().map(|l| l.text.as_str()).collect();
            let lang = extension.as_deref().unwrap_or_default();
            let _ = writeln!(
                out,
                "<Code language={}>{{{}}}</Code>",
                js_string(lang),
                js_string(&code.join("\n"))
            );
        }
        Element::Break { .. } => out.push_str("<Break />\n"),
    }
}

fn jsx_inline(inline: &Inline, out: &mut String) {
    match inline {
        Inline::Empty => {}
        Inline::Text(t) => {
            let _ = write!(out, "{{{}}}", js_string(t));
        }
        Inline::Spans(spans) => {
            for span in spans {
                jsx_inline_node(&span.node, out);
            }
        }
    }
}

fn jsx_inline_node(node: &InlineNode, out: &mut String) {
    let (tag, children) = match node {
        InlineNode::Text(t) | InlineNode::Escape { text: t, .. } => {
            let _ = write!(out, "{{{}}}", js_string(t));
            return;
        }
        InlineNode::Code { text, .. } => {
            let _ = write!(out, "<InlineCode>{{{}}}</InlineCode>", js_string(text));
            return;
        }
        InlineNode::Emoji { text } => {
            let _ = write!(out, "<Emoji>{{{}}}</Emoji>", js_string(text));
            return;
        }
        InlineNode::Anchor { href, children, .. } => {
            let _ = write!(out, "<Anchor href={}>", js_string(href));
            jsx_inline(children, out);
            out.push_str("</Anchor>");
            return;
        }
        InlineNode::Emphasis { children, .. } => ("Emphasis", children),
        InlineNode::Strong { children, .. } => ("Strong", children),
        InlineNode::StrongEmphasis { children, .. } => ("StrongEmphasis", children),
        InlineNode::Strikethrough { children, .. } => ("Strikethrough", children),
    };
    let _ = write!(out, "<{tag}>");
    jsx_inline(children, out);
    let _ = write!(out, "</{tag}>");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::parse_document;
    use crate::cache::ParseCache;
    use crate::lines::LineStore;
    use pretty_assertions::assert_eq;

    fn parse(text: &str) -> ElementTree {
        parse_document(&LineStore::from_text(text), &mut ParseCache::new(64))
    }

    #[test]
    fn test_html_blocks() {
        let html = to_html(&parse("# Hi <there>\n**b** & *i*\n---"));
        insta::assert_snapshot!(html, @r#"<h1 id="hi-there">Hi &lt;there&gt;</h1><p><strong>b</strong> &amp; <em>i</em></p><hr>"#);
    }

    #[test]
    fn test_html_nested_list_hangs_from_item() {
        let html = to_html(&parse("- a\n\t- b\n- [x] c"));
        assert_eq!(
            html,
            "<ul><li>a<ul><li>b</li></ul></li><li><input type=\"checkbox\" disabled checked>c</li></ul>"
        );
    }

    #[test]
    fn test_html_code_block_is_escaped() {
        let html = to_html(&parse("```html\n<b>\n```"));
        assert_eq!(
            html,
            "<pre><code class=\"language-html\">&lt;b&gt;</code></pre>"
        );
    }

    #[test]
    fn test_bem_classes() {
        let html = to_bem_html(&parse("## T\n> q"));
        assert_eq!(
            html,
            "<h2 class=\"md__header md__header--2\" id=\"t\">T</h2>\
             <blockquote class=\"md__blockquote\"><p class=\"md__blockquote-item\">q</p></blockquote>"
        );
    }

    #[test]
    fn test_jsx() {
        let jsx = to_jsx(&parse("# A\n[x](u) `c`"));
        assert_eq!(
            jsx,
            "<Markdown>\n  <Header depth={1} slug=\"a\">{\"A\"}</Header>\n  <Paragraph><Anchor href=\"u\">{\"x\"}</Anchor>{\" \"}<InlineCode>{\"c\"}</InlineCode></Paragraph>\n</Markdown>"
        );
    }

    #[test]
    fn test_text_export_round_trips_mixed_document() {
        let doc = "# Notes\n\n- [ ] buy *milk*\n\t- 2%\n> \"quote\"\n```sh\necho hi\n```\n***";
        assert_eq!(to_text(&parse(doc)), doc);
    }
}
