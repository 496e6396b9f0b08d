//! Test fixtures and store helpers.
//!
//! Provides convenience functions for setting up test stores
//! and common test scenarios.

use reclog_store::{InMemoryFile, Store, StoreConfig, StoreResult};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// A file-backed test store with automatic cleanup.
pub struct TestStore {
    /// The store instance.
    pub store: Store,
    /// Path of the store file.
    path: PathBuf,
    /// Configuration used to open (and reopen) the store.
    config: StoreConfig,
    /// The temporary directory (kept alive to prevent cleanup).
    _temp_dir: TempDir,
}

impl TestStore {
    /// Creates a new file-based test store with the default config.
    pub fn new() -> Self {
        Self::with_config(StoreConfig::default())
    }

    /// Creates a new file-based test store.
    pub fn with_config(config: StoreConfig) -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let path = temp_dir.path().join("test.store");
        let store = Store::open(&path, config.clone()).expect("Failed to open test store");

        Self {
            store,
            path,
            config,
            _temp_dir: temp_dir,
        }
    }

    /// Returns the path of the store file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the file length as seen by an independent reader.
    pub fn disk_len(&self) -> u64 {
        std::fs::metadata(&self.path)
            .expect("Failed to stat store file")
            .len()
    }

    /// Closes the store and opens a fresh one over the same file.
    ///
    /// # Errors
    ///
    /// Returns an error if closing or reopening fails.
    pub fn reopen(&mut self) -> StoreResult<()> {
        self.store.close()?;
        self.store = Store::open(&self.path, self.config.clone())?;
        Ok(())
    }
}

impl Default for TestStore {
    fn default() -> Self {
        Self::new()
    }
}

impl std::ops::Deref for TestStore {
    type Target = Store;

    fn deref(&self) -> &Self::Target {
        &self.store
    }
}

/// Creates an in-memory store and returns a handle to its file.
///
/// The handle shares contents with the store, so it shows exactly the
/// bytes that have been flushed.
pub fn memory_store() -> (InMemoryFile, Store<InMemoryFile>) {
    memory_store_with(StoreConfig::default())
}

/// Creates an in-memory store with the given config.
pub fn memory_store_with(config: StoreConfig) -> (InMemoryFile, Store<InMemoryFile>) {
    let file = InMemoryFile::new();
    let store = Store::new(file.clone(), config).expect("Failed to create in-memory store");
    (file, store)
}

/// Runs a test with a temporary file-based store.
///
/// # Example
///
/// ```rust
/// use reclog_testkit::with_temp_store;
///
/// with_temp_store(|store, _path| {
///     let (_, pos) = store.append(b"abc").unwrap();
///     assert_eq!(store.read(pos).unwrap(), b"abc");
/// });
/// ```
pub fn with_temp_store<F, R>(f: F) -> R
where
    F: FnOnce(&Store, &Path) -> R,
{
    let test_store = TestStore::new();
    f(&test_store.store, test_store.path())
}

/// Test scenario helpers.
pub mod scenarios {
    use super::*;

    /// Creates a file store holding `count` records.
    ///
    /// Record `i` is `i` copies of the byte `i as u8`. Returns the store
    /// and the position of each record.
    pub fn populated_store(count: usize) -> (TestStore, Vec<u64>) {
        let test_store = TestStore::new();
        let positions = (0..count)
            .map(|i| {
                let payload = vec![i as u8; i];
                let (_, pos) = test_store
                    .append(&payload)
                    .expect("Failed to append record");
                pos
            })
            .collect();
        (test_store, positions)
    }
}
