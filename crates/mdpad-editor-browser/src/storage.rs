//! LocalStorage persistence for the editor.
//!
//! The document is stored as a [`PersistedDocument`] under a versioned key
//! (see [`mdpad_editor_core::persist::storage_key`]).

use gloo_storage::errors::StorageError;
use gloo_storage::{LocalStorage, Storage};
use mdpad_editor_core::{DEFAULT_DOCUMENT, PersistedDocument};

/// Stored document text, or the default document when nothing readable is stored.
pub fn load(key: &str) -> String {
    match LocalStorage::get::<PersistedDocument>(key) {
        Ok(doc) => doc.data,
        Err(StorageError::KeyNotFound(_)) => {
            tracing::debug!(target: "mdpad::dom", key, "no stored document");
            DEFAULT_DOCUMENT.to_string()
        }
        Err(err) => {
            tracing::warn!(target: "mdpad::dom", key, %err, "stored document unreadable, using default");
            DEFAULT_DOCUMENT.to_string()
        }
    }
}

pub fn save(key: &str, text: &str) -> Result<(), StorageError> {
    let doc = PersistedDocument {
        data: text.to_string(),
    };
    LocalStorage::set(key, &doc)?;
    tracing::trace!(target: "mdpad::dom", key, len = text.len(), "saved document");
    Ok(())
}

pub fn clear(key: &str) {
    LocalStorage::delete(key);
}
