//! mdpad-editor-core: the Markdown editor core without browser dependencies.
//!
//! This crate provides:
//! - `LineStore` - the document as lines with stable ids
//! - inline and block GFM parsing into an `ElementTree`, memoized per block
//! - exports (Markdown, HTML, BEM HTML, JSX) and the editable render
//! - the `DomNode` abstraction, the cursor model and the DOM reconciler
//! - the pure `reduce` edit engine, snapshot history and the `Editor` session

pub mod actions;
pub mod block;
pub mod cache;
pub mod config;
pub mod cursor;
pub mod document;
pub mod dom;
pub mod element;
pub mod emoji;
pub mod error;
pub mod execute;
pub mod export;
pub mod inline;
pub mod lines;
pub mod persist;
pub mod reconcile;
pub mod render;
pub mod slug;
pub mod text;
pub mod text_helpers;
pub mod types;
pub mod undo;
pub mod vdom;

pub use actions::{Command, Key, KeyBindings, KeyCombo, Modifiers};
pub use block::parse_document;
pub use cache::ParseCache;
pub use config::EditorConfig;
pub use cursor::{DomPoint, ReadLine, dom_selection_to_pos, pos_to_dom_point};
pub use document::{Editor, Outcome};
pub use dom::{DomNode, HIDDEN_MARKER, NODE_MARKER, ROOT_MARKER, ZERO_WIDTH_MARKER};
pub use element::{Element, ElementTree, Heading, Inline, InlineNode, Span};
pub use error::{DomError, EditorError};
pub use execute::{EditorEvent, EditorState, reduce};
pub use inline::parse_inline;
pub use lines::{Line, LineId, LineStore};
pub use persist::{DEFAULT_DOCUMENT, PersistedDocument};
pub use reconcile::{SelectionHost, reconcile};
pub use render::render_editable;
pub use smol_str::SmolStr;
pub use text::DeleteUnit;
pub use types::{Pos, Selection};
pub use undo::{History, Snapshot};
pub use vdom::VNode;
