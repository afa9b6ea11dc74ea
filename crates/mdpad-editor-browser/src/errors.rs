//! Errors raised by the browser layer.

use mdpad_editor_core::{DomError, EditorError};
use thiserror::Error;
use wasm_bindgen::JsValue;

#[derive(Error, Debug)]
#[non_exhaustive]
pub enum BrowserError {
    #[error("no window")]
    NoWindow,

    #[error("no document")]
    NoDocument,

    #[error("element not found: {0}")]
    ElementNotFound(String),

    /// A DOM or JS API call threw.
    #[error("javascript error: {0}")]
    Js(String),

    #[error(transparent)]
    Storage(#[from] gloo_storage::errors::StorageError),

    #[error(transparent)]
    Editor(#[from] EditorError),
}

impl From<JsValue> for BrowserError {
    fn from(value: JsValue) -> Self {
        BrowserError::Js(format!("{value:?}"))
    }
}

impl From<DomError> for BrowserError {
    fn from(err: DomError) -> Self {
        BrowserError::Editor(EditorError::Dom(err))
    }
}

impl From<BrowserError> for JsValue {
    fn from(err: BrowserError) -> Self {
        JsValue::from_str(&err.to_string())
    }
}

pub(crate) fn window() -> Result<web_sys::Window, BrowserError> {
    web_sys::window().ok_or(BrowserError::NoWindow)
}

pub(crate) fn document() -> Result<web_sys::Document, BrowserError> {
    window()?.document().ok_or(BrowserError::NoDocument)
}
