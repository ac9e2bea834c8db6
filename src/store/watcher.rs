//! Store file watching for cross-instance change pickup.
//!
//! Another livemark process writing the same store file should show up
//! here without a restart. Uses the notify crate for file system events.

use std::collections::BTreeMap;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver};
use std::time::{Duration, Instant};

use notify::{Event, RecommendedWatcher, RecursiveMode, Watcher};

use super::file::{FileStore, hash_bytes};

/// A change picked up from the store file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExternalChange {
    /// Keys whose values differ from the last snapshot, with the new value.
    /// A key that disappeared maps to `None` (reset to default).
    pub entries: BTreeMap<String, Option<serde_json::Value>>,
}

/// Watches the store file and emits debounced external changes.
///
/// Changes caused by this process's own [`FileStore`] writes are filtered
/// out by content hash, so only genuinely external edits surface.
pub struct StoreWatcher {
    _watcher: RecommendedWatcher,
    rx: Receiver<notify::Result<Event>>,
    store_path: PathBuf,
    store_name: Option<OsString>,
    snapshot: BTreeMap<String, serde_json::Value>,
    debounce: Duration,
    pending_since: Option<Instant>,
}

impl StoreWatcher {
    /// Create a watcher for the store file at `path`.
    ///
    /// The parent directory is watched rather than the file itself, so
    /// atomic-replace writes (delete + recreate) keep being observed.
    ///
    /// # Errors
    /// Returns an error if the file watcher cannot be created or the
    /// directory cannot be watched.
    pub fn new(path: impl AsRef<Path>, debounce: Duration) -> notify::Result<Self> {
        // Canonicalize so event paths from the OS (which are always absolute
        // and canonical) match our stored paths.
        let store_path = path
            .as_ref()
            .canonicalize()
            .unwrap_or_else(|_| path.as_ref().to_path_buf());
        let store_name = store_path.file_name().map(std::ffi::OsStr::to_os_string);
        let watch_root = watch_root_for(&store_path);

        let (tx, rx) = mpsc::channel();
        let mut watcher = notify::recommended_watcher(move |res| {
            let _ = tx.send(res);
        })?;
        watcher.watch(&watch_root, RecursiveMode::NonRecursive)?;

        let snapshot = FileStore::read_all_at(&store_path);
        Ok(Self {
            _watcher: watcher,
            rx,
            store_path,
            store_name,
            snapshot,
            debounce,
            pending_since: None,
        })
    }

    /// Poll for a debounced external change.
    ///
    /// `own_write_hash` is the hash of the bytes this process last wrote;
    /// when the on-disk content still matches it, the event was our own
    /// write echoing back and is dropped (after refreshing the snapshot).
    pub fn take_external_change(&mut self, own_write_hash: Option<u64>) -> Option<ExternalChange> {
        let mut saw_relevant_event = false;
        while let Ok(event) = self.rx.try_recv() {
            match event {
                Ok(ev) if self.is_relevant(&ev) => {
                    saw_relevant_event = true;
                }
                Ok(_) => {}
                Err(err) => {
                    tracing::warn!(%err, "store watcher event error");
                }
            }
        }

        if saw_relevant_event {
            self.pending_since = Some(Instant::now());
        }
        let pending_since = self.pending_since?;
        if pending_since.elapsed() < self.debounce {
            return None;
        }
        self.pending_since = None;

        if let Some(own) = own_write_hash
            && std::fs::read(&self.store_path)
                .is_ok_and(|bytes| hash_bytes(&bytes) == own)
        {
            // Our own write landing on disk; keep the snapshot current so a
            // later external edit diffs against what we wrote.
            self.snapshot = FileStore::read_all_at(&self.store_path);
            return None;
        }

        let current = FileStore::read_all_at(&self.store_path);
        let change = diff_snapshots(&self.snapshot, &current);
        self.snapshot = current;
        if change.entries.is_empty() {
            None
        } else {
            Some(change)
        }
    }

    fn is_relevant(&self, event: &Event) -> bool {
        event.paths.iter().any(|path| {
            path == &self.store_path
                || self
                    .store_name
                    .as_ref()
                    .is_some_and(|name| path.file_name().is_some_and(|f| f == name))
        })
    }
}

fn watch_root_for(path: &Path) -> PathBuf {
    path.parent()
        .filter(|p| !p.as_os_str().is_empty())
        .map_or_else(|| PathBuf::from("."), Path::to_path_buf)
}

fn diff_snapshots(
    old: &BTreeMap<String, serde_json::Value>,
    new: &BTreeMap<String, serde_json::Value>,
) -> ExternalChange {
    let mut entries = BTreeMap::new();
    for (key, value) in new {
        if old.get(key) != Some(value) {
            entries.insert(key.clone(), Some(value.clone()));
        }
    }
    for key in old.keys() {
        if !new.contains_key(key) {
            entries.insert(key.clone(), None);
        }
    }
    ExternalChange { entries }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{DOCUMENT_KEY, KvStore};
    use tempfile::tempdir;

    fn value(s: &str) -> serde_json::Value {
        serde_json::Value::String(s.to_string())
    }

    #[test]
    fn test_diff_reports_changed_and_removed_keys() {
        let mut old = BTreeMap::new();
        old.insert("kept".to_string(), value("same"));
        old.insert("changed".to_string(), value("before"));
        old.insert("removed".to_string(), value("gone"));
        let mut new = BTreeMap::new();
        new.insert("kept".to_string(), value("same"));
        new.insert("changed".to_string(), value("after"));
        new.insert("added".to_string(), value("fresh"));

        let change = diff_snapshots(&old, &new);
        assert_eq!(change.entries.len(), 3);
        assert_eq!(change.entries["changed"], Some(value("after")));
        assert_eq!(change.entries["added"], Some(value("fresh")));
        assert_eq!(change.entries["removed"], None);
    }

    #[test]
    fn test_watch_root_for_bare_filename_is_dot() {
        let root = watch_root_for(Path::new("store.json"));
        assert_eq!(root, PathBuf::from("."));
    }

    #[test]
    fn test_external_write_is_detected() {
        let dir = tempdir().expect("tempdir");
        let canonical_dir = dir.path().canonicalize().expect("canonicalize");
        let path = canonical_dir.join("store.json");
        let mut writer = FileStore::new(&path);
        writer.write_value(DOCUMENT_KEY, value("original")).unwrap();

        let mut watcher = StoreWatcher::new(&path, Duration::from_millis(50)).expect("watcher");

        // Give the watcher backend time to register the watch
        std::thread::sleep(Duration::from_millis(500));

        // Simulate another instance writing
        let mut other = FileStore::new(&path);
        other.write_value(DOCUMENT_KEY, value("external")).unwrap();

        let deadline = Instant::now() + Duration::from_secs(5);
        let mut change = None;
        while Instant::now() < deadline {
            if let Some(c) = watcher.take_external_change(writer.last_written_hash()) {
                change = Some(c);
                break;
            }
            std::thread::sleep(Duration::from_millis(50));
        }

        let change = change.expect("external change within 5 seconds");
        assert_eq!(change.entries[DOCUMENT_KEY], Some(value("external")));
    }

    #[test]
    fn test_own_write_is_suppressed() {
        let dir = tempdir().expect("tempdir");
        let canonical_dir = dir.path().canonicalize().expect("canonicalize");
        let path = canonical_dir.join("store.json");
        let mut writer = FileStore::new(&path);
        writer.write_value(DOCUMENT_KEY, value("start")).unwrap();

        let mut watcher = StoreWatcher::new(&path, Duration::from_millis(50)).expect("watcher");
        std::thread::sleep(Duration::from_millis(500));

        writer.write_value(DOCUMENT_KEY, value("own edit")).unwrap();

        // Poll past the debounce window; the only change was our own write.
        let deadline = Instant::now() + Duration::from_millis(1500);
        while Instant::now() < deadline {
            assert!(
                watcher
                    .take_external_change(writer.last_written_hash())
                    .is_none(),
                "own write must not surface as an external change"
            );
            std::thread::sleep(Duration::from_millis(50));
        }
    }
}
