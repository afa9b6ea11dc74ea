//! Inline Markdown parsing for a single line of text.
//!
//! At each position the parser tries, in order: backslash escape, `***`/`___`,
//! `**`/`__`, `*`/`_`, `~~`/`~`, code span, bare `http(s)://` autolink,
//! `[text](href)` link, then emoji. The first match wins; anything unmatched
//! accumulates as plain text. Formatting spans may not open or close against
//! whitespace. An underscore may only open after whitespace, punctuation, or
//! the start of the text, so `snake_case_words` stay literal.

use smol_str::SmolStr;
use unicode_segmentation::UnicodeSegmentation;

use crate::element::{Inline, InlineNode, Span};
use crate::emoji::is_emoji;
use crate::text::char_len;

/// Parse inline content of one line.
pub fn parse_inline(text: &str) -> Inline {
    collapse(parse_spans(text, 0))
}

fn collapse(spans: Vec<Span>) -> Inline {
    match spans.as_slice() {
        [] => Inline::Empty,
        [
            Span {
                node: InlineNode::Text(t),
                ..
            },
        ] => Inline::Text(t.clone()),
        _ => Inline::Spans(spans),
    }
}

/// Parse `text`, whose first char sits at char offset `base` in the line.
fn parse_spans(text: &str, base: usize) -> Vec<Span> {
    let mut spans = Vec::new();
    let mut pending = String::new();
    let mut pending_at = base;
    let mut i = 0;
    let mut at = base;

    while i < text.len() {
        if let Some((node, consumed)) = match_at(text, i, at) {
            flush(&mut spans, &mut pending, pending_at);
            spans.push(Span { at, node });
            at += char_len(&text[i..i + consumed]);
            i += consumed;
            continue;
        }
        let Some(c) = text[i..].chars().next() else {
            break;
        };
        if pending.is_empty() {
            pending_at = at;
        }
        pending.push(c);
        i += c.len_utf8();
        at += 1;
    }
    flush(&mut spans, &mut pending, pending_at);
    spans
}

fn flush(spans: &mut Vec<Span>, pending: &mut String, at: usize) {
    if !pending.is_empty() {
        spans.push(Span {
            at,
            node: InlineNode::Text(SmolStr::new(pending.as_str())),
        });
        pending.clear();
    }
}

/// Try every inline construct at byte `i`. Returns the node and the number of
/// bytes it consumed.
fn match_at(text: &str, i: usize, at: usize) -> Option<(InlineNode, usize)> {
    let rest = &text[i..];
    let c = rest.chars().next()?;
    match c {
        '\\' => match_escape(rest),
        '*' | '_' => match_emphasis(text, i, at, c),
        '~' => match_strikethrough(text, i, at),
        '`' => match_code(rest),
        'h' => match_autolink(rest),
        '[' => match_link(rest),
        _ => match_emoji(rest),
    }
}

fn match_escape(rest: &str) -> Option<(InlineNode, usize)> {
    let escaped = rest[1..].chars().next()?;
    if !escaped.is_ascii_punctuation() {
        return None;
    }
    Some((
        InlineNode::Escape {
            syntax: SmolStr::new_static("\\"),
            text: SmolStr::new(escaped.encode_utf8(&mut [0; 4])),
        },
        1 + escaped.len_utf8(),
    ))
}

fn match_emphasis(text: &str, i: usize, at: usize, c: char) -> Option<(InlineNode, usize)> {
    if c == '_' {
        let opens = text[..i]
            .chars()
            .next_back()
            .is_none_or(|p| p.is_whitespace() || !p.is_alphanumeric());
        if !opens {
            return None;
        }
    }
    for width in [3, 2, 1] {
        let delim: String = std::iter::repeat_n(c, width).collect();
        if !text[i..].starts_with(&delim) {
            continue;
        }
        if let Some((content, consumed)) = find_closing(text, i, &delim) {
            let syntax = SmolStr::new(&delim);
            let children = collapse(parse_spans(content, at + width));
            let node = match width {
                3 => InlineNode::StrongEmphasis { syntax, children },
                2 => InlineNode::Strong { syntax, children },
                _ => InlineNode::Emphasis { syntax, children },
            };
            return Some((node, consumed));
        }
    }
    None
}

fn match_strikethrough(text: &str, i: usize, at: usize) -> Option<(InlineNode, usize)> {
    for delim in ["~~", "~"] {
        if !text[i..].starts_with(delim) {
            continue;
        }
        if let Some((content, consumed)) = find_closing(text, i, delim) {
            return Some((
                InlineNode::Strikethrough {
                    syntax: SmolStr::new_static(delim),
                    children: collapse(parse_spans(content, at + delim.len())),
                },
                consumed,
            ));
        }
    }
    None
}

/// Find the closing `delim` for an opener at byte `i`. Content must be
/// non-empty and may neither start nor end with whitespace. A single-char
/// delimiter does not close inside a longer run of the same char, which keeps
/// `*a **b** c*` intact. Returns the content and total bytes consumed.
fn find_closing<'a>(text: &'a str, i: usize, delim: &str) -> Option<(&'a str, usize)> {
    let open_end = i + delim.len();
    let first = text[open_end..].chars().next()?;
    if first.is_whitespace() {
        return None;
    }
    let delim_char = delim.chars().next()?;
    let mut j = open_end + first.len_utf8();
    while j < text.len() {
        let rest = &text[j..];
        if rest.starts_with(delim) {
            let run = rest.chars().take_while(|&c| c == delim_char).count();
            let after_ws = text[..j].chars().next_back().is_some_and(char::is_whitespace);
            if delim.len() == 1 && run > 1 {
                j += run;
                continue;
            }
            let content = &text[open_end..j];
            if !after_ws && !content.chars().all(|c| c == delim_char) {
                return Some((content, j + delim.len() - i));
            }
        }
        j += rest.chars().next().map_or(1, char::len_utf8);
    }
    None
}

fn match_code(rest: &str) -> Option<(InlineNode, usize)> {
    let run = rest.chars().take_while(|&c| c == '`').count();
    let mut j = run;
    while j < rest.len() {
        if rest[j..].starts_with('`') {
            let close = rest[j..].chars().take_while(|&c| c == '`').count();
            if close == run && j > run {
                return Some((
                    InlineNode::Code {
                        syntax: SmolStr::new(&rest[..run]),
                        text: SmolStr::new(&rest[run..j]),
                    },
                    j + run,
                ));
            }
            j += close;
            continue;
        }
        j += rest[j..].chars().next().map_or(1, char::len_utf8);
    }
    None
}

const TRAILING_URL_PUNCTUATION: &[char] = &['.', ',', ';', ':', '!', '?', ')', '\'', '"'];

fn match_autolink(rest: &str) -> Option<(InlineNode, usize)> {
    let scheme = ["https://", "http://"]
        .into_iter()
        .find(|s| rest.starts_with(s))?;
    let end = rest.find(char::is_whitespace).unwrap_or(rest.len());
    let url = rest[..end].trim_end_matches(TRAILING_URL_PUNCTUATION);
    if url.len() <= scheme.len() {
        return None;
    }
    Some((
        InlineNode::Anchor {
            open: SmolStr::default(),
            close: SmolStr::default(),
            href: SmolStr::new(url),
            children: Inline::Text(SmolStr::new(url)),
        },
        url.len(),
    ))
}

fn match_link(rest: &str) -> Option<(InlineNode, usize)> {
    let close_bracket = rest.find(']')?;
    let label = &rest[1..close_bracket];
    if label.is_empty() || label.contains('[') {
        return None;
    }
    let after = &rest[close_bracket + 1..];
    if !after.starts_with('(') {
        return None;
    }
    let close_paren = after.find(')')?;
    let href = &after[1..close_paren];
    if href.is_empty() || href.contains(char::is_whitespace) {
        return None;
    }
    let consumed = close_bracket + 1 + close_paren + 1;
    Some((
        InlineNode::Anchor {
            open: SmolStr::new_static("["),
            close: SmolStr::new(&rest[close_bracket..consumed]),
            href: SmolStr::new(href),
            children: Inline::Text(SmolStr::new(label)),
        },
        consumed,
    ))
}

fn match_emoji(rest: &str) -> Option<(InlineNode, usize)> {
    let grapheme = rest.graphemes(true).next()?;
    is_emoji(grapheme).then(|| {
        (
            InlineNode::Emoji {
                text: SmolStr::new(grapheme),
            },
            grapheme.len(),
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn spans(text: &str) -> Vec<Span> {
        match parse_inline(text) {
            Inline::Spans(spans) => spans,
            other => panic!("expected spans, got {other:?}"),
        }
    }

    fn kinds(text: &str) -> Vec<(&'static str, String)> {
        spans(text)
            .into_iter()
            .map(|s| {
                let plain = Inline::Spans(vec![s.clone()]).plain_text();
                (s.node.kind(), plain)
            })
            .collect()
    }

    #[test]
    fn test_plain_text_collapses_to_string() {
        assert_eq!(parse_inline("just words"), Inline::Text("just words".into()));
        assert_eq!(parse_inline(""), Inline::Empty);
    }

    #[test]
    fn test_emphasis_widths() {
        assert_eq!(kinds("*a*"), vec![("emphasis", "a".into())]);
        assert_eq!(kinds("**a**"), vec![("strong", "a".into())]);
        assert_eq!(kinds("***a***"), vec![("strong-emphasis", "a".into())]);
        assert_eq!(kinds("__a__"), vec![("strong", "a".into())]);
    }

    /// Deliberately two spans, not three: five delimiters pair at most twice.
    #[test]
    fn test_alternating_asterisk_emphasis() {
        assert_eq!(
            kinds("*oh*man*is*it*"),
            vec![
                ("emphasis", "oh".into()),
                ("text", "man".into()),
                ("emphasis", "is".into()),
                ("text", "it*".into()),
            ]
        );
    }

    /// Deliberately unlike the `*` case: intraword `_` neither opens nor closes.
    #[test]
    fn test_underscore_requires_left_flank() {
        assert_eq!(parse_inline("snake_case_name"), Inline::Text("snake_case_name".into()));
        assert_eq!(
            kinds("_oh_man_is_it_"),
            vec![("emphasis", "oh".into()), ("text", "man_is_it_".into())]
        );
        assert_eq!(
            kinds("a (_b_)"),
            vec![("text", "a (".into()), ("emphasis", "b".into()), ("text", ")".into())]
        );
    }

    #[test]
    fn test_whitespace_bounded_spans_are_literal() {
        assert_eq!(parse_inline("* a *"), Inline::Text("* a *".into()));
        assert_eq!(parse_inline("** a**"), Inline::Text("** a**".into()));
        assert_eq!(parse_inline("~~a ~~"), Inline::Text("~~a ~~".into()));
        // Code spans may be whitespace-bounded.
        assert_eq!(kinds("` a `"), vec![("code", " a ".into())]);
    }

    #[test]
    fn test_nested_strong_inside_emphasis() {
        let spans = spans("*a **b** c*");
        assert_eq!(spans.len(), 1);
        let InlineNode::Emphasis { children, .. } = &spans[0].node else {
            panic!("expected emphasis");
        };
        let Inline::Spans(inner) = children else {
            panic!("expected nested spans");
        };
        assert_eq!(inner[1].node.kind(), "strong");
        assert_eq!(inner[1].at, 3);
    }

    #[test]
    fn test_code_is_verbatim() {
        let spans = spans("x `*not em*` y");
        assert_eq!(
            spans[1].node,
            InlineNode::Code {
                syntax: "`".into(),
                text: "*not em*".into()
            }
        );
        assert_eq!(kinds("``a`b``"), vec![("code", "a`b".into())]);
    }

    #[test]
    fn test_escape_wins_over_emphasis() {
        assert_eq!(
            kinds(r"\*a*"),
            vec![("escape", "*".into()), ("text", "a*".into())]
        );
        assert_eq!(parse_inline(r"\a"), Inline::Text(r"\a".into()));
    }

    #[test]
    fn test_strikethrough_single_and_double() {
        assert_eq!(kinds("~~gone~~"), vec![("strikethrough", "gone".into())]);
        assert_eq!(kinds("~gone~"), vec![("strikethrough", "gone".into())]);
    }

    #[test]
    fn test_links() {
        let spans = spans("see [docs](https://example.com/a) now");
        assert_eq!(
            spans[1].node,
            InlineNode::Anchor {
                open: "[".into(),
                close: "](https://example.com/a)".into(),
                href: "https://example.com/a".into(),
                children: Inline::Text("docs".into()),
            }
        );
        // Link text is verbatim.
        let spans = self::spans("[*x*](u)");
        let InlineNode::Anchor { children, .. } = &spans[0].node else {
            panic!("expected anchor");
        };
        assert_eq!(children, &Inline::Text("*x*".into()));
    }

    #[test]
    fn test_autolink_drops_trailing_punctuation() {
        let spans = spans("go to https://example.com.");
        let InlineNode::Anchor { href, .. } = &spans[1].node else {
            panic!("expected anchor");
        };
        assert_eq!(href, "https://example.com");
        assert_eq!(parse_inline("https://"), Inline::Text("https://".into()));
        assert_eq!(parse_inline("hello"), Inline::Text("hello".into()));
    }

    #[test]
    fn test_emoji_spans_and_offsets() {
        let spans = spans("hi 🎉 there");
        assert_eq!(spans[1].node, InlineNode::Emoji { text: "🎉".into() });
        assert_eq!(spans[1].at, 3);
        assert_eq!(spans[2].at, 4);
    }

    #[test]
    fn test_source_round_trips() {
        for text in [
            "",
            "plain",
            "*oh*man*is*it*",
            "_oh_man_is_it_",
            "**bold** and *it* and ***both***",
            r"\*escaped\* and `code` ~~del~~ ~single~",
            "[a](b) https://x.org, 🎉 ok",
            "* a * ** b** unclosed *stuff",
            "``` not a fence ```",
            "[broken](",
            "`` ` ``",
        ] {
            assert_eq!(parse_inline(text).source(), text, "round trip of {text:?}");
        }
    }
}
