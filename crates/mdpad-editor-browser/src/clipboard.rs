//! Clipboard and file download.
//!
//! Cut/copy/paste go through the event's `DataTransfer`, plain text only.

use js_sys::Array;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{Blob, BlobPropertyBag, HtmlAnchorElement, Url};

use crate::errors::{BrowserError, document, window};

const PLAIN: &str = "text/plain";

/// Plain text carried by a paste event.
pub fn clipboard_text(event: &web_sys::ClipboardEvent) -> Option<String> {
    event
        .clipboard_data()?
        .get_data(PLAIN)
        .ok()
        .filter(|s| !s.is_empty())
}

/// Put `text` on the clipboard from a cut/copy handler. Returns false when the
/// event has no `DataTransfer`; the caller then falls back to
/// [`write_clipboard_text`].
pub fn set_clipboard_text(event: &web_sys::ClipboardEvent, text: &str) -> bool {
    let Some(data) = event.clipboard_data() else {
        return false;
    };
    match data.set_data(PLAIN, text) {
        Ok(()) => true,
        Err(err) => {
            tracing::warn!(target: "mdpad::dom", ?err, "clipboard sync write failed");
            false
        }
    }
}

/// Write through the async Clipboard API, for writes outside a clipboard event.
pub fn write_clipboard_text(text: String) {
    wasm_bindgen_futures::spawn_local(async move {
        if let Err(err) = write_async(&text).await {
            tracing::warn!(target: "mdpad::dom", %err, "clipboard async write failed");
        }
    });
}

async fn write_async(text: &str) -> Result<(), BrowserError> {
    let clipboard = window()?.navigator().clipboard();
    wasm_bindgen_futures::JsFuture::from(clipboard.write_text(text)).await?;
    Ok(())
}

/// Save `text` as a Markdown file named `name`.
pub fn download(name: &str, text: &str) -> Result<(), BrowserError> {
    let parts = Array::new();
    parts.push(&JsValue::from_str(text));
    let options = BlobPropertyBag::new();
    options.set_type("text/markdown");
    let blob = Blob::new_with_str_sequence_and_options(&parts, &options)?;
    let url = Url::create_object_url_with_blob(&blob)?;

    let anchor = document()?
        .create_element("a")?
        .dyn_into::<HtmlAnchorElement>()
        .map_err(|_| BrowserError::Js("anchor is not an HtmlAnchorElement".into()))?;
    anchor.set_href(&url);
    anchor.set_download(name);
    anchor.click();

    Url::revoke_object_url(&url)?;
    tracing::debug!(target: "mdpad::dom", name, bytes = text.len(), "downloaded document");
    Ok(())
}
