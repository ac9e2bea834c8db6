//! JSON file backing store.

use std::collections::BTreeMap;
use std::fs;
use std::hash::{DefaultHasher, Hash, Hasher};
use std::path::{Path, PathBuf};

use super::{KvStore, StoreError};

/// Default location of the store file, mirroring the platform's config
/// directory conventions.
pub fn default_store_path() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        if let Some(appdata) = std::env::var_os("APPDATA") {
            return PathBuf::from(appdata).join("livemark").join("store.json");
        }
    }

    #[cfg(target_os = "macos")]
    {
        if let Some(home) = std::env::var_os("HOME") {
            return PathBuf::from(home)
                .join("Library")
                .join("Application Support")
                .join("livemark")
                .join("store.json");
        }
    }

    #[cfg(not(any(target_os = "windows", target_os = "macos")))]
    {
        if let Some(xdg) = std::env::var_os("XDG_CONFIG_HOME") {
            return PathBuf::from(xdg).join("livemark").join("store.json");
        }
        if let Some(home) = std::env::var_os("HOME") {
            return PathBuf::from(home)
                .join(".config")
                .join("livemark")
                .join("store.json");
        }
    }

    PathBuf::from(".livemark-store.json")
}

/// Hash serialized store bytes for own-write detection.
pub(super) fn hash_bytes(bytes: &[u8]) -> u64 {
    let mut hasher = DefaultHasher::new();
    bytes.hash(&mut hasher);
    hasher.finish()
}

/// Key-value store backed by a single JSON object file.
///
/// Each access reads or rewrites the whole object; the store holds two
/// small entries, so there is no point in anything cleverer. A missing,
/// unreadable, or malformed file behaves as an empty store.
pub struct FileStore {
    path: PathBuf,
    /// Hash of the bytes this instance last wrote, so the watcher can
    /// tell an external change from our own write landing on disk.
    last_written_hash: Option<u64>,
}

impl FileStore {
    /// Create a store backed by the file at `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            last_written_hash: None,
        }
    }

    /// Create a store at the platform default location.
    pub fn at_default_path() -> Self {
        Self::new(default_store_path())
    }

    /// The path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Hash of the last write made through this instance, if any.
    pub const fn last_written_hash(&self) -> Option<u64> {
        self.last_written_hash
    }

    /// Read the entire store object from disk.
    ///
    /// Absent and malformed files both read as empty: the caller always
    /// gets a usable map and the defaults take over per key.
    pub fn read_all(&self) -> BTreeMap<String, serde_json::Value> {
        Self::read_all_at(&self.path)
    }

    pub(super) fn read_all_at(path: &Path) -> BTreeMap<String, serde_json::Value> {
        let Ok(bytes) = fs::read(path) else {
            return BTreeMap::new();
        };
        match serde_json::from_slice(&bytes) {
            Ok(map) => map,
            Err(err) => {
                tracing::warn!(path = %path.display(), %err, "store file is not valid JSON, treating as empty");
                BTreeMap::new()
            }
        }
    }

    fn write_all(&mut self, map: &BTreeMap<String, serde_json::Value>) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }
        let mut bytes = serde_json::to_vec_pretty(map)?;
        bytes.push(b'\n');
        fs::write(&self.path, &bytes)?;
        self.last_written_hash = Some(hash_bytes(&bytes));
        Ok(())
    }
}

impl KvStore for FileStore {
    fn read_value(&self, key: &str) -> Option<serde_json::Value> {
        self.read_all().remove(key)
    }

    fn write_value(&mut self, key: &str, value: serde_json::Value) -> Result<(), StoreError> {
        let mut map = self.read_all();
        map.insert(key.to_string(), value);
        self.write_all(&map)
    }

    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        let mut map = self.read_all();
        if map.remove(key).is_none() {
            return Ok(());
        }
        self.write_all(&map)
    }
}
