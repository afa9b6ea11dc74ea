//! Persisted document format.
//!
//! The document is stored as a JSON object `{"data": "<markdown>"}` under a
//! key that includes the crate version, so a format change in a new release
//! starts from a clean slate instead of misreading old state.

use serde::{Deserialize, Serialize};

use crate::error::EditorError;

/// Shown when nothing (or nothing readable) is stored.
pub const DEFAULT_DOCUMENT: &str = "# Welcome\n\
\n\
This is a **Markdown** editor. Everything you type is *plain text*; the\n\
formatting is only ~~decoration~~ rendering.\n\
\n\
> Press `Tab` to indent list items and `Shift-Tab` to outdent them.\n\
\n\
- [x] Write some Markdown\n\
- [ ] Toggle read-only mode with Cmd/Ctrl-P\n\
\t- [ ] Download with Cmd/Ctrl-S\n\
\n\
```rs\n\
fn main() {}\n\
```\n\
\n\
---\n\
\n\
See https://github.github.com/gfm/ for the syntax. :tada: 🎉";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistedDocument {
    pub data: String,
}

pub fn storage_key(prefix: &str) -> String {
    format!("{prefix}{}", env!("CARGO_PKG_VERSION"))
}

/// Decode a stored value, falling back to [`DEFAULT_DOCUMENT`] when absent or
/// malformed.
pub fn load_document(raw: Option<&str>) -> String {
    let Some(raw) = raw else {
        return DEFAULT_DOCUMENT.to_string();
    };
    match serde_json::from_str::<PersistedDocument>(raw) {
        Ok(doc) => doc.data,
        Err(err) => {
            tracing::warn!(target: "mdpad::edit", %err, "stored document unreadable, using default");
            DEFAULT_DOCUMENT.to_string()
        }
    }
}

pub fn save_document(text: &str) -> Result<String, EditorError> {
    Ok(serde_json::to_string(&PersistedDocument {
        data: text.to_string(),
    })?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_save_then_load() {
        let raw = save_document("# a\n\"quoted\"").unwrap();
        assert_eq!(raw, r##"{"data":"# a\n\"quoted\""}"##);
        assert_eq!(load_document(Some(&raw)), "# a\n\"quoted\"");
    }

    #[test]
    fn test_fallbacks() {
        assert_eq!(load_document(None), DEFAULT_DOCUMENT);
        assert_eq!(load_document(Some("not json")), DEFAULT_DOCUMENT);
        assert_eq!(load_document(Some(r#"{"other": 1}"#)), DEFAULT_DOCUMENT);
    }
}
