//! In-memory store file for testing.

use crate::file::StoreFile;
use parking_lot::RwLock;
use std::io::{self, Write};
use std::sync::Arc;

/// An in-memory store file.
///
/// This file keeps all bytes in memory and is suitable for:
/// - Unit tests
/// - Integration tests
/// - Ephemeral stores that don't need persistence
///
/// Clones share the same contents, so a test can keep a handle and
/// inspect exactly what a store has flushed.
///
/// # Example
///
/// ```rust
/// use reclog_store::{InMemoryFile, Store, StoreConfig};
///
/// let file = InMemoryFile::new();
/// let store = Store::new(file.clone(), StoreConfig::default()).unwrap();
/// store.append(b"abc").unwrap();
/// assert!(file.data().is_empty());
///
/// store.flush().unwrap();
/// assert_eq!(file.data().len(), 11);
/// ```
#[derive(Debug, Clone, Default)]
pub struct InMemoryFile {
    data: Arc<RwLock<Vec<u8>>>,
}

impl InMemoryFile {
    /// Creates a new empty in-memory file.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a new in-memory file with pre-existing data.
    ///
    /// Useful for testing recovery scenarios.
    #[must_use]
    pub fn with_data(data: Vec<u8>) -> Self {
        Self {
            data: Arc::new(RwLock::new(data)),
        }
    }

    /// Returns a copy of all data in the file.
    #[must_use]
    pub fn data(&self) -> Vec<u8> {
        self.data.read().clone()
    }
}

impl Write for InMemoryFile {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.data.write().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl StoreFile for InMemoryFile {
    fn read_at(&self, buf: &mut [u8], offset: u64) -> io::Result<usize> {
        let data = self.data.read();
        let Ok(start) = usize::try_from(offset) else {
            return Ok(0);
        };
        if start >= data.len() {
            return Ok(0);
        }

        let n = buf.len().min(data.len() - start);
        buf[..n].copy_from_slice(&data[start..start + n]);
        Ok(n)
    }

    fn sync(&self) -> io::Result<()> {
        // Nothing below memory to sync
        Ok(())
    }

    fn size(&self) -> io::Result<u64> {
        Ok(self.data.read().len() as u64)
    }
}
