//! Fault injection for store files.
//!
//! [`FaultyFile`] wraps an [`InMemoryFile`] and fails writes, flushes or
//! syncs on demand. It is used to check that a failed I/O call never
//! advances the store size and that close can be retried.
//!
//! ## Usage
//!
//! ```rust
//! use reclog_store::{Store, StoreConfig, StoreError};
//! use reclog_testkit::FaultyFile;
//!
//! let file = FaultyFile::new();
//! let store = Store::new(file.clone(), StoreConfig::default()).unwrap();
//! store.append(b"abc").unwrap();
//!
//! file.set_fail_on_sync(true);
//! assert!(matches!(store.close(), Err(StoreError::Io(_))));
//!
//! file.reset();
//! store.close().unwrap();
//! ```

use reclog_store::{InMemoryFile, StoreFile};
use std::io::{self, Write};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

#[derive(Debug)]
struct Faults {
    fail_after_bytes: AtomicUsize,
    bytes_written: AtomicUsize,
    fail_on_flush: AtomicBool,
    fail_on_sync: AtomicBool,
    tripped: AtomicBool,
}

/// A store file that can simulate I/O failures.
///
/// Clones share both the contents and the fault switches, so a test can
/// hand one clone to a store and steer it through another.
#[derive(Debug, Clone)]
pub struct FaultyFile {
    inner: InMemoryFile,
    faults: Arc<Faults>,
}

impl FaultyFile {
    /// Creates a new empty file with no faults armed.
    pub fn new() -> Self {
        Self::with_data(Vec::new())
    }

    /// Creates a new file with pre-existing data.
    pub fn with_data(data: Vec<u8>) -> Self {
        Self {
            inner: InMemoryFile::with_data(data),
            faults: Arc::new(Faults {
                fail_after_bytes: AtomicUsize::new(usize::MAX),
                bytes_written: AtomicUsize::new(0),
                fail_on_flush: AtomicBool::new(false),
                fail_on_sync: AtomicBool::new(false),
                tripped: AtomicBool::new(false),
            }),
        }
    }

    /// Fails every write once `bytes` bytes have been written in total.
    ///
    /// The write that crosses the limit is cut short at the limit.
    pub fn fail_after(&self, bytes: usize) {
        self.faults.fail_after_bytes.store(bytes, Ordering::SeqCst);
    }

    /// Sets whether flush should fail.
    pub fn set_fail_on_flush(&self, fail: bool) {
        self.faults.fail_on_flush.store(fail, Ordering::SeqCst);
    }

    /// Sets whether sync should fail.
    pub fn set_fail_on_sync(&self, fail: bool) {
        self.faults.fail_on_sync.store(fail, Ordering::SeqCst);
    }

    /// Disarms all faults and clears the write counter.
    pub fn reset(&self) {
        self.faults
            .fail_after_bytes
            .store(usize::MAX, Ordering::SeqCst);
        self.faults.bytes_written.store(0, Ordering::SeqCst);
        self.faults.fail_on_flush.store(false, Ordering::SeqCst);
        self.faults.fail_on_sync.store(false, Ordering::SeqCst);
        self.faults.tripped.store(false, Ordering::SeqCst);
    }

    /// Returns whether any fault has fired.
    pub fn has_tripped(&self) -> bool {
        self.faults.tripped.load(Ordering::SeqCst)
    }

    /// Returns a copy of the bytes that reached the file.
    pub fn data(&self) -> Vec<u8> {
        self.inner.data()
    }

    fn trip(&self, message: &str) -> io::Error {
        self.faults.tripped.store(true, Ordering::SeqCst);
        io::Error::new(io::ErrorKind::Other, message.to_string())
    }
}

impl Default for FaultyFile {
    fn default() -> Self {
        Self::new()
    }
}

impl Write for FaultyFile {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let written = self.faults.bytes_written.load(Ordering::SeqCst);
        let limit = self.faults.fail_after_bytes.load(Ordering::SeqCst);

        if written >= limit && !buf.is_empty() {
            return Err(self.trip("simulated failure during write"));
        }

        let n = buf.len().min(limit.saturating_sub(written));
        self.inner.write_all(&buf[..n])?;
        self.faults.bytes_written.fetch_add(n, Ordering::SeqCst);
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        if self.faults.fail_on_flush.load(Ordering::SeqCst) {
            return Err(self.trip("simulated failure during flush"));
        }
        self.inner.flush()
    }
}

impl StoreFile for FaultyFile {
    fn read_at(&self, buf: &mut [u8], offset: u64) -> io::Result<usize> {
        self.inner.read_at(buf, offset)
    }

    fn sync(&self) -> io::Result<()> {
        if self.faults.fail_on_sync.load(Ordering::SeqCst) {
            return Err(self.trip("simulated failure during sync"));
        }
        self.inner.sync()
    }

    fn size(&self) -> io::Result<u64> {
        self.inner.size()
    }
}
