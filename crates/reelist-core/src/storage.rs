//! Durable snapshot storage.
//!
//! The host environment provides a string-keyed blob store; everything above
//! it treats keys as opaque. Write failures are reported, never fatal.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use crate::error::ReelistError;

/// String-keyed durable storage for JSON snapshots.
pub trait SnapshotStore: Send {
    /// Load the value stored under `key`, or `None` if absent.
    fn load(&self, key: &str) -> Result<Option<String>, ReelistError>;

    /// Store `value` under `key`, replacing any previous value.
    fn save(&self, key: &str, value: &str) -> Result<(), ReelistError>;
}

/// File-backed store: each key maps to `<dir>/<key>.json`.
#[derive(Debug)]
pub struct JsonFileStore {
    dir: PathBuf,
}

impl JsonFileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl SnapshotStore for JsonFileStore {
    fn load(&self, key: &str) -> Result<Option<String>, ReelistError> {
        match std::fs::read_to_string(self.path_for(key)) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(ReelistError::Storage(format!("failed to read {key}: {e}"))),
        }
    }

    fn save(&self, key: &str, value: &str) -> Result<(), ReelistError> {
        std::fs::create_dir_all(&self.dir)
            .map_err(|e| ReelistError::Storage(format!("failed to create data dir: {e}")))?;

        // Write to a temp file, then rename, so a crash mid-write never leaves
        // a truncated snapshot behind.
        let path = self.path_for(key);
        let temp = path.with_extension("json.tmp");
        write_atomic(&temp, &path, value)
            .map_err(|e| ReelistError::Storage(format!("failed to write {key}: {e}")))
    }
}

fn write_atomic(temp: &Path, path: &Path, value: &str) -> std::io::Result<()> {
    std::fs::write(temp, value)?;
    std::fs::rename(temp, path)
}

/// In-memory store for tests and ephemeral sessions. Cloning shares the
/// underlying map.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    map: Arc<Mutex<HashMap<String, String>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a value, bypassing the trait. Useful for restore tests.
    pub fn seed(&self, key: &str, value: &str) {
        self.lock().insert(key.to_owned(), value.to_owned());
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, String>> {
        self.map.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl SnapshotStore for MemoryStore {
    fn load(&self, key: &str) -> Result<Option<String>, ReelistError> {
        Ok(self.lock().get(key).cloned())
    }

    fn save(&self, key: &str, value: &str) -> Result<(), ReelistError> {
        self.lock().insert(key.to_owned(), value.to_owned());
        Ok(())
    }
}
