//! Browser DOM layer for the mdpad markdown editor.
//!
//! Implements the core's `DomNode` abstraction for live `web_sys::Node`s and
//! wires the editor session to the page. It assumes a
//! `wasm32-unknown-unknown` target environment.
//!
//! # Architecture
//!
//! - `node`: `DomNode` over live nodes
//! - `cursor`: native selection read/write
//! - `dom_sync`: reconcile renders into the editor element, read native edits back
//! - `events`: keydown, beforeinput and composition handling
//! - `clipboard`: plain-text clipboard and file download
//! - `platform`: browser/OS detection for key bindings
//! - `storage`: LocalStorage persistence
//! - `timers`: single-shot debounce timers
//!
//! This crate re-exports `mdpad-editor-core`, so consumers only need to
//! depend on `mdpad-editor-browser`.

pub use mdpad_editor_core;
pub use mdpad_editor_core::*;

pub mod clipboard;
pub mod cursor;
pub mod dom_sync;
mod errors;
pub mod events;
pub mod node;
pub mod platform;
pub mod storage;
pub mod timers;

pub use dom_sync::EditorView;
pub use errors::BrowserError;
pub use events::{CompositionTracker, InputAction, classify_beforeinput, handle_keydown};
pub use node::LiveNode;
pub use platform::{Platform, platform};
pub use timers::Debouncer;
