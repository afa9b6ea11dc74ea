//! Line-level helpers used by the edit engine: list detection, list
//! continuation and todo toggling.

use crate::block::LIST_ITEM;
use crate::text::char_len;

/// What kind of list item a line is, if any.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ListContext {
    /// Bullet item with its marker char (`-`, `*` or `+`).
    Unordered { indent: usize, marker: char },
    /// Numbered item with its current number.
    Ordered { indent: usize, number: u64 },
    Todo { indent: usize, checked: bool },
}

impl ListContext {
    pub fn indent(&self) -> usize {
        match self {
            ListContext::Unordered { indent, .. }
            | ListContext::Ordered { indent, .. }
            | ListContext::Todo { indent, .. } => *indent,
        }
    }

    /// Prefix for the item that follows this one: same indentation, todos
    /// start unchecked, numbers increment.
    pub fn continuation(&self) -> String {
        let tabs = "\t".repeat(self.indent());
        match self {
            ListContext::Unordered { marker, .. } => format!("{tabs}{marker} "),
            ListContext::Ordered { number, .. } => {
                format!("{tabs}{}. ", number.saturating_add(1))
            }
            ListContext::Todo { .. } => format!("{tabs}- [ ] "),
        }
    }
}

/// A detected list prefix and its length in chars (tabs included).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ListPrefix {
    pub context: ListContext,
    pub len: usize,
}

pub fn detect_list_context(line: &str) -> Option<ListPrefix> {
    let caps = LIST_ITEM.captures(line)?;
    let indent = caps.get(1).map_or(0, |m| m.len());
    let marker = caps.get(2)?.as_str();

    let context = if let Some(rest) = marker.strip_prefix("- [") {
        ListContext::Todo {
            indent,
            checked: !rest.starts_with(' '),
        }
    } else if let Some(number) = marker.strip_suffix(". ") {
        ListContext::Ordered {
            indent,
            // Digits that overflow still make a list; restart the count.
            number: number.parse().unwrap_or(0),
        }
    } else {
        ListContext::Unordered {
            indent,
            marker: marker.chars().next().unwrap_or('-'),
        }
    };
    Some(ListPrefix {
        context,
        len: indent + char_len(marker),
    })
}

/// True when the line is a list item whose content after the marker is empty.
/// Whitespace-only content is not empty.
pub fn is_list_item_empty(line: &str) -> bool {
    detect_list_context(line).is_some_and(|prefix| char_len(line) == prefix.len)
}

/// The line with its todo checkbox flipped, or `None` if it is not a todo.
/// The length of the line never changes.
pub fn toggle_todo(line: &str) -> Option<String> {
    let prefix = detect_list_context(line)?;
    let ListContext::Todo { indent, checked } = prefix.context else {
        return None;
    };
    // Tabs are one byte each; the box sits at "- [" + 1.
    let at = indent + 3;
    let mut out = String::with_capacity(line.len());
    out.push_str(&line[..at]);
    out.push(if checked { ' ' } else { 'x' });
    out.push_str(&line[at + 1..]);
    Some(out)
}

/// Count of leading tabs on a line.
pub fn leading_tabs(line: &str) -> usize {
    line.bytes().take_while(|b| *b == b'\t').count()
}
