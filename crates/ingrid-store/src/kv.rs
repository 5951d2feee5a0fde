//! # Key/Value Store
//!
//! Opaque string values addressed by key. The file backend keeps one file
//! per key under the data directory.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Key/Value Storage                                  │
//! │                                                                         │
//! │  Scanner startup                                                       │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  StoreConfig::new(dir) ← persist flag + data directory                 │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  open_store(&config)                                                   │
//! │       │                                                                 │
//! │       ├── persist && dir usable ──► FileStore                          │
//! │       │                              <dir>/ingrid_session_id            │
//! │       │                              <dir>/scan_result                  │
//! │       │                                                                 │
//! │       └── otherwise ──────────────► MemoryStore (process lifetime)     │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Atomic Writes
//! Values are written to a uniquely named temp file in the data directory
//! and persisted over `<key>`, so a crash mid-write leaves either the old
//! value or the new one, and concurrent writers never share a temp file.

use std::collections::HashMap;
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use directories::ProjectDirs;
use tempfile::NamedTempFile;
use tracing::{debug, info, warn};

use crate::error::{StoreError, StoreResult};

// =============================================================================
// Trait
// =============================================================================

/// Synchronous key/value storage of opaque strings.
pub trait KeyValueStore: Send + Sync {
    /// Reads a value. `Ok(None)` means the key was never written.
    fn get(&self, key: &str) -> StoreResult<Option<String>>;

    /// Writes a value, replacing any previous one.
    fn set(&self, key: &str, value: &str) -> StoreResult<()>;

    /// Deletes a value. Removing a missing key is not an error.
    fn remove(&self, key: &str) -> StoreResult<()>;

    /// Short backend name for logs.
    fn backend_name(&self) -> &'static str;
}

// =============================================================================
// Configuration
// =============================================================================

/// Storage configuration.
///
/// ## Example
/// ```rust,ignore
/// let config = StoreConfig::new("/path/to/data").persist(true);
/// let store = open_store(&config);
/// ```
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Directory holding one file per key.
    /// Default: platform data directory
    pub data_dir: Option<PathBuf>,

    /// Whether values survive the process.
    /// Default: true
    pub persist: bool,
}

impl StoreConfig {
    /// Creates a persistent configuration rooted at `dir`.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        StoreConfig {
            data_dir: Some(dir.into()),
            persist: true,
        }
    }

    /// Creates an in-memory configuration (for testing).
    pub fn in_memory() -> Self {
        StoreConfig {
            data_dir: None,
            persist: false,
        }
    }

    /// Sets whether values are persisted.
    pub fn persist(mut self, persist: bool) -> Self {
        self.persist = persist;
        self
    }

    /// Resolves the directory to use, falling back to the platform default.
    pub fn resolved_dir(&self) -> StoreResult<PathBuf> {
        match &self.data_dir {
            Some(dir) => Ok(dir.clone()),
            None => default_data_dir(),
        }
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        StoreConfig {
            data_dir: None,
            persist: true,
        }
    }
}

/// Platform data directory for the scanner.
///
/// - Linux: `~/.local/share/ingrid-scanner`
/// - macOS: `~/Library/Application Support/app.ingrid.ingrid-scanner`
/// - Windows: `%APPDATA%\ingrid\ingrid-scanner\data`
pub fn default_data_dir() -> StoreResult<PathBuf> {
    ProjectDirs::from("app", "ingrid", "ingrid-scanner")
        .map(|dirs| dirs.data_dir().to_path_buf())
        .ok_or(StoreError::NoDataDir)
}

/// Opens the configured store, degrading to memory if the directory is
/// unusable. Never fails.
pub fn open_store(config: &StoreConfig) -> Arc<dyn KeyValueStore> {
    if !config.persist {
        debug!("Persistence disabled, using in-memory store");
        return Arc::new(MemoryStore::new());
    }

    let opened = config.resolved_dir().and_then(|dir| FileStore::open(dir));
    match opened {
        Ok(store) => {
            info!(dir = %store.dir().display(), "Opened file store");
            Arc::new(store)
        }
        Err(e) => {
            warn!(error = %e, "Data directory unusable, falling back to in-memory store");
            Arc::new(MemoryStore::new())
        }
    }
}

// =============================================================================
// File Backend
// =============================================================================

/// One file per key under a directory.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Opens (creating if needed) a store rooted at `dir`.
    pub fn open(dir: impl Into<PathBuf>) -> StoreResult<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir).map_err(|e| StoreError::io(&dir, e))?;
        Ok(FileStore { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> StoreResult<PathBuf> {
        let usable = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
        if !usable {
            return Err(StoreError::InvalidKey(key.to_string()));
        }
        Ok(self.dir.join(key))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> StoreResult<Option<String>> {
        let path = self.path_for(key)?;
        match fs::read_to_string(&path) {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StoreError::io(path, e)),
        }
    }

    fn set(&self, key: &str, value: &str) -> StoreResult<()> {
        let path = self.path_for(key)?;

        let mut tmp =
            NamedTempFile::new_in(&self.dir).map_err(|e| StoreError::io(&self.dir, e))?;
        tmp.write_all(value.as_bytes())
            .map_err(|e| StoreError::io(tmp.path(), e))?;
        tmp.persist(&path).map_err(|e| StoreError::io(&path, e.error))?;

        debug!(key = %key, bytes = value.len(), "Wrote value");
        Ok(())
    }

    fn remove(&self, key: &str) -> StoreResult<()> {
        let path = self.path_for(key)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StoreError::io(path, e)),
        }
    }

    fn backend_name(&self) -> &'static str {
        "file"
    }
}

// =============================================================================
// Memory Backend
// =============================================================================

/// Values held for the lifetime of the process.
#[derive(Debug, Default)]
pub struct MemoryStore {
    values: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> StoreResult<Option<String>> {
        let values = self.values.lock().unwrap_or_else(|p| p.into_inner());
        Ok(values.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> StoreResult<()> {
        let mut values = self.values.lock().unwrap_or_else(|p| p.into_inner());
        values.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> StoreResult<()> {
        let mut values = self.values.lock().unwrap_or_else(|p| p.into_inner());
        values.remove(key);
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}

// =============================================================================
// Test Support
// =============================================================================

/// A store whose every operation fails, for exercising degraded paths.
#[cfg(test)]
pub(crate) struct FailingStore;

#[cfg(test)]
impl KeyValueStore for FailingStore {
    fn get(&self, key: &str) -> StoreResult<Option<String>> {
        Err(StoreError::io(key, std::io::Error::other("storage disabled")))
    }

    fn set(&self, key: &str, _value: &str) -> StoreResult<()> {
        Err(StoreError::io(key, std::io::Error::other("storage disabled")))
    }

    fn remove(&self, key: &str) -> StoreResult<()> {
        Err(StoreError::io(key, std::io::Error::other("storage disabled")))
    }

    fn backend_name(&self) -> &'static str {
        "failing"
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_store_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::open(dir.path()).unwrap();

        assert_eq!(store.get("scan_result").unwrap(), None);
        store.set("scan_result", "{\"a\":1}").unwrap();
        assert_eq!(store.get("scan_result").unwrap().as_deref(), Some("{\"a\":1}"));
        assert!(dir.path().join("scan_result").exists());
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);

        store.remove("scan_result").unwrap();
        assert_eq!(store.get("scan_result").unwrap(), None);
        store.remove("scan_result").unwrap();
    }

    #[test]
    fn test_concurrent_writers_to_one_key() {
        let dir = tempfile::tempdir().unwrap();
        let values: Vec<String> = (0..8).map(|i| format!("session_writer{i:04}")).collect();

        std::thread::scope(|scope| {
            for value in &values {
                let store = FileStore::open(dir.path()).unwrap();
                scope.spawn(move || {
                    for _ in 0..25 {
                        store.set("ingrid_session_id", value).unwrap();
                    }
                });
            }
        });

        let store = FileStore::open(dir.path()).unwrap();
        let stored = store.get("ingrid_session_id").unwrap().unwrap();
        assert!(values.contains(&stored));
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn test_file_store_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        FileStore::open(dir.path())
            .unwrap()
            .set("ingrid_session_id", "session_abc123xyz")
            .unwrap();

        let reopened = FileStore::open(dir.path()).unwrap();
        assert_eq!(
            reopened.get("ingrid_session_id").unwrap().as_deref(),
            Some("session_abc123xyz")
        );
    }

    #[test]
    fn test_file_store_rejects_path_keys() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::open(dir.path()).unwrap();
        assert!(matches!(
            store.set("../escape", "x"),
            Err(StoreError::InvalidKey(_))
        ));
        assert!(store.get("").is_err());
    }

    #[test]
    fn test_memory_store() {
        let store = MemoryStore::new();
        store.set("k", "v1").unwrap();
        store.set("k", "v2").unwrap();
        assert_eq!(store.get("k").unwrap().as_deref(), Some("v2"));
        store.remove("k").unwrap();
        assert_eq!(store.get("k").unwrap(), None);
    }

    #[test]
    fn test_open_store_selects_backend() {
        let dir = tempfile::tempdir().unwrap();
        let store = open_store(&StoreConfig::new(dir.path()));
        assert_eq!(store.backend_name(), "file");

        let store = open_store(&StoreConfig::new(dir.path()).persist(false));
        assert_eq!(store.backend_name(), "memory");
    }

    #[test]
    fn test_open_store_degrades_when_dir_is_a_file() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("not-a-dir");
        fs::write(&blocker, "x").unwrap();

        let store = open_store(&StoreConfig::new(&blocker));
        assert_eq!(store.backend_name(), "memory");
        store.set("k", "v").unwrap();
        assert_eq!(store.get("k").unwrap().as_deref(), Some("v"));
    }
}
