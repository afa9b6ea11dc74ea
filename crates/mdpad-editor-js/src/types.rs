//! Types exposed to JavaScript via wasm-bindgen.

use mdpad_editor_browser::{EditorConfig, Heading};
use serde::{Deserialize, Serialize};
use tsify_next::Tsify;
use wasm_bindgen::prelude::*;

/// One heading of the document outline.
#[derive(Debug, Clone, Serialize, Deserialize, Tsify)]
#[tsify(into_wasm_abi, from_wasm_abi)]
#[serde(rename_all = "camelCase")]
pub struct OutlineEntry {
    pub depth: u8,
    pub slug: String,
    pub title: String,
    /// Element id of the heading's line.
    pub line_id: String,
}

impl From<&Heading> for OutlineEntry {
    fn from(heading: &Heading) -> Self {
        Self {
            depth: heading.depth,
            slug: heading.slug.to_string(),
            title: heading.title.clone(),
            line_id: heading.id.to_string(),
        }
    }
}

/// Editor config from a JS object. `undefined` and `null` give the defaults;
/// missing fields take their default values.
pub fn config_from_js(value: JsValue) -> Result<EditorConfig, JsError> {
    if value.is_undefined() || value.is_null() {
        return Ok(EditorConfig::default());
    }
    serde_wasm_bindgen::from_value(value)
        .map_err(|e| JsError::new(&format!("Invalid editor config: {}", e)))
}
