//! Persisted key-value store.
//!
//! Document content and the theme choice survive restarts through a small
//! JSON store. Every value round-trips through `serde_json`, and every
//! failure path degrades to a default instead of surfacing to the caller:
//! the editor must keep working when the store is missing, unreadable,
//! or full.

mod file;
mod memory;
mod watcher;

pub use file::{FileStore, default_store_path};
pub use memory::MemoryStore;
pub use watcher::{ExternalChange, StoreWatcher};

use serde::Serialize;
use serde::de::DeserializeOwned;

/// Store key for the markdown document content.
pub const DOCUMENT_KEY: &str = "markdownEditorContent_v1";

/// Store key for the persisted theme choice.
pub const THEME_KEY: &str = "markdownEditorTheme_v1";

/// Errors raised by store backends.
///
/// Callers at the application layer never see these directly; the typed
/// [`read`]/[`write`] helpers log and swallow them.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("store I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("store entry is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// A key-value store holding JSON-encoded entries.
///
/// Implementations are fail-soft at the raw layer already: an absent or
/// corrupt backing file reads as "no entries". The trait keeps the core
/// logic off any global singleton so tests can inject [`MemoryStore`].
pub trait KvStore {
    /// Raw JSON value for `key`, or `None` when absent or unreadable.
    fn read_value(&self, key: &str) -> Option<serde_json::Value>;

    /// Write a raw JSON value under `key`.
    ///
    /// # Errors
    ///
    /// Returns an error when the backing store cannot be written.
    fn write_value(&mut self, key: &str, value: serde_json::Value) -> Result<(), StoreError>;

    /// Remove `key` from the store.
    ///
    /// # Errors
    ///
    /// Returns an error when the backing store cannot be written.
    fn remove(&mut self, key: &str) -> Result<(), StoreError>;
}

/// Read a typed value, falling back to `default` on any failure.
pub fn read<T: DeserializeOwned>(store: &dyn KvStore, key: &str, default: T) -> T {
    match store.read_value(key) {
        Some(value) => match serde_json::from_value(value) {
            Ok(parsed) => parsed,
            Err(err) => {
                tracing::warn!(key, %err, "store entry failed to decode, using default");
                default
            }
        },
        None => default,
    }
}

/// Write a typed value, logging and swallowing any failure.
///
/// In-memory state is the source of truth; a lost write only costs
/// persistence across restarts, never the current session.
pub fn write<T: Serialize>(store: &mut dyn KvStore, key: &str, value: &T) {
    let encoded = match serde_json::to_value(value) {
        Ok(encoded) => encoded,
        Err(err) => {
            tracing::warn!(key, %err, "store entry failed to encode, dropping write");
            return;
        }
    };
    if let Err(err) = store.write_value(key, encoded) {
        tracing::warn!(key, %err, "store write failed, keeping in-memory state only");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_returns_default_for_absent_key() {
        let store = MemoryStore::new();
        let value: String = read(&store, DOCUMENT_KEY, "fallback".to_string());
        assert_eq!(value, "fallback");
    }

    #[test]
    fn test_read_returns_default_on_type_mismatch() {
        let mut store = MemoryStore::new();
        store
            .write_value(THEME_KEY, serde_json::json!({"not": "a string"}))
            .unwrap();
        let value: String = read(&store, THEME_KEY, "light".to_string());
        assert_eq!(value, "light");
    }

    #[test]
    fn test_write_then_read_round_trips() {
        let mut store = MemoryStore::new();
        write(&mut store, DOCUMENT_KEY, &"# Hello".to_string());
        let value: String = read(&store, DOCUMENT_KEY, String::new());
        assert_eq!(value, "# Hello");
    }

    #[test]
    fn test_remove_resets_to_default() {
        let mut store = MemoryStore::new();
        write(&mut store, DOCUMENT_KEY, &"text".to_string());
        store.remove(DOCUMENT_KEY).unwrap();
        let value: String = read(&store, DOCUMENT_KEY, "default".to_string());
        assert_eq!(value, "default");
    }
}
