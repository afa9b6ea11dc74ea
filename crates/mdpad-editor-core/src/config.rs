//! Editor configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Tunables for one editor session. Every field has a default, so a partial
/// JSON object (or `{}`) deserializes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EditorConfig {
    /// Quiet period after a typing edit before it becomes an undo step.
    pub history_debounce_ms: u64,
    /// Maximum undo entries; the oldest are dropped beyond this.
    pub history_limit: usize,
    /// Maximum cached block parses.
    pub parse_cache_capacity: u64,
    /// Lines before and after the selection re-read after a native edit.
    pub addressable_window: usize,
    /// Prefix of the persistence key; the crate version is appended.
    pub storage_key_prefix: String,
    pub read_only: bool,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            history_debounce_ms: 250,
            history_limit: 500,
            parse_cache_capacity: 1024,
            addressable_window: 2,
            storage_key_prefix: "mdpad:".to_string(),
            read_only: false,
        }
    }
}

impl EditorConfig {
    pub fn history_debounce(&self) -> Duration {
        Duration::from_millis(self.history_debounce_ms)
    }

    pub fn storage_key(&self) -> String {
        crate::persist::storage_key(&self.storage_key_prefix)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config_fills_defaults() {
        let config: EditorConfig =
            serde_json::from_str(r#"{"historyDebounceMs": 100, "readOnly": true}"#).unwrap();
        assert_eq!(config.history_debounce(), Duration::from_millis(100));
        assert!(config.read_only);
        assert_eq!(config.history_limit, 500);
        assert_eq!(config.addressable_window, 2);

        let empty: EditorConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(empty, EditorConfig::default());
    }

    #[test]
    fn test_storage_key_carries_version() {
        let key = EditorConfig::default().storage_key();
        assert_eq!(key, format!("mdpad:{}", env!("CARGO_PKG_VERSION")));
    }
}
