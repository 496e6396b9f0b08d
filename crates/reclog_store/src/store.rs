//! The append-only record store.

use crate::config::StoreConfig;
use crate::error::{StoreError, StoreResult};
use crate::file::{read_full_at, StoreFile};
use crate::frame::MAX_LEN_WIDTH;
use crate::iter::Records;
use fs2::FileExt;
use parking_lot::Mutex;
use std::fs::{File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, trace, warn};

/// An append-only store of length-prefixed records in a single file.
///
/// Each record is written as a fixed-width big-endian length header
/// followed by its payload (see [`crate::frame`]). A record is addressed
/// by its position, the byte offset where its header begins.
///
/// # Durability
///
/// - `append()` writes into an in-memory buffer
/// - `flush()` pushes buffered bytes to the OS
/// - `sync()` and `close()` also call [`StoreFile::sync`]
///
/// Every read flushes first, so a record is readable as soon as
/// `append()` returns.
///
/// # Thread Safety
///
/// A single mutex guards the write buffer, the size counter and the
/// store state. Share the store across threads with `Arc`.
///
/// # Example
///
/// ```no_run
/// use reclog_store::{Store, StoreConfig};
/// use std::path::Path;
///
/// let store = Store::open(Path::new("records.store"), StoreConfig::default()).unwrap();
/// let (written, pos) = store.append(b"abc").unwrap();
/// assert_eq!(written, 11);
/// assert_eq!(store.read(pos).unwrap(), b"abc");
/// store.close().unwrap();
/// ```
pub struct Store<F: StoreFile = File> {
    inner: Mutex<Inner<F>>,
    config: StoreConfig,
    path: Option<PathBuf>,
}

struct Inner<F: StoreFile> {
    /// `None` once the store is closed.
    writer: Option<BufWriter<F>>,
    /// Logical end of file: where the next append begins.
    size: u64,
    /// Set when an append failed after bytes may have reached the buffer.
    poisoned: bool,
}

impl<F: StoreFile> Inner<F> {
    /// Flushes pending writes and returns the file for positional reads.
    fn flushed(&mut self) -> StoreResult<&F> {
        let writer = self.writer.as_mut().ok_or(StoreError::Closed)?;
        writer.flush()?;
        Ok(writer.get_ref())
    }
}

impl Store<File> {
    /// Opens or creates a store file at the given path.
    ///
    /// The file is opened for reading and appending; existing records are
    /// kept and new appends start at its current length. When
    /// `config.lock_file` is set, an exclusive advisory lock is taken for
    /// the lifetime of the store.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The configuration is invalid
    /// - The file cannot be opened or created
    /// - Another handle holds the lock (returns `Locked`)
    pub fn open(path: &Path, config: StoreConfig) -> StoreResult<Self> {
        config.validate()?;

        let file = OpenOptions::new()
            .read(true)
            .append(true)
            .create(true)
            .open(path)?;

        if config.lock_file {
            file.try_lock_exclusive().map_err(lock_error)?;
        }

        let mut store = Self::new(file, config)?;
        store.path = Some(path.to_path_buf());
        debug!(path = %path.display(), size = store.size(), "opened store file");
        Ok(store)
    }

    /// Opens or creates a store file, creating parent directories if needed.
    ///
    /// # Errors
    ///
    /// Returns an error if directories cannot be created or the file cannot be opened.
    pub fn open_with_create_dirs(path: &Path, config: StoreConfig) -> StoreResult<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        Self::open(path, config)
    }
}

/// Maps a failed lock attempt: contention means another handle owns the
/// file, anything else (no lock support, bad handle) is an I/O error.
fn lock_error(err: io::Error) -> StoreError {
    let contended = fs2::lock_contended_error();
    if err.kind() == io::ErrorKind::WouldBlock
        || (err.raw_os_error().is_some() && err.raw_os_error() == contended.raw_os_error())
    {
        StoreError::Locked
    } else {
        StoreError::Io(err)
    }
}

impl<F: StoreFile> Store<F> {
    /// Wraps an already open file.
    ///
    /// The file's current size becomes the position of the next append,
    /// so a store can resume over the records of an earlier session.
    ///
    /// # Requirements
    ///
    /// Writes land at the file's cursor while positions are counted from
    /// its size, so the two must agree: the file must be positioned at its
    /// end, e.g. a `File` opened with `append(true)`. A file opened with
    /// only `write(true)` starts at offset 0 and would overwrite existing
    /// records while handing out positions past them. [`Store::open`]
    /// opens files this way.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid or the file size
    /// cannot be determined.
    pub fn new(file: F, config: StoreConfig) -> StoreResult<Self> {
        config.validate()?;
        let size = file.size()?;

        debug!(size, len_width = config.len_width.get(), "created record store");

        Ok(Self {
            inner: Mutex::new(Inner {
                writer: Some(BufWriter::with_capacity(config.buffer_capacity, file)),
                size,
                poisoned: false,
            }),
            config,
            path: None,
        })
    }

    /// Appends a record.
    ///
    /// Returns `(written, position)`: the number of bytes the record takes
    /// on disk (header plus payload) and the position it begins at.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The payload length does not fit in the length header
    /// - The store is closed or poisoned
    /// - An I/O error occurs, in which case the size is not advanced and
    ///   the store is poisoned
    pub fn append(&self, payload: &[u8]) -> StoreResult<(u64, u64)> {
        let width = self.config.len_width;
        let header = width.encode_len(payload.len() as u64)?;

        let mut guard = self.inner.lock();
        let Inner {
            writer,
            size,
            poisoned,
        } = &mut *guard;

        let writer = writer.as_mut().ok_or(StoreError::Closed)?;
        if *poisoned {
            return Err(StoreError::Poisoned);
        }

        let result = writer
            .write_all(&header[..width.get()])
            .and_then(|()| writer.write_all(payload));
        if let Err(err) = result {
            *poisoned = true;
            warn!(pos = *size, error = %err, "append failed, store poisoned");
            return Err(err.into());
        }

        let pos = *size;
        let written = width.frame_size(payload.len() as u64);
        *size += written;

        trace!(pos, written, "appended record");
        Ok((written, pos))
    }

    /// Reads the record that begins at `pos`.
    ///
    /// `pos` must be a position returned by [`Store::append`] or reached by
    /// walking the header chain. Other offsets return garbage or an error.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The store is closed
    /// - The header or payload extends past the end of the file
    ///   (returns `UnexpectedEof`, checked before the payload is allocated)
    /// - The header describes a record too large to hold in memory
    ///   (returns `Corrupted`)
    /// - An I/O error occurs
    pub fn read(&self, pos: u64) -> StoreResult<Vec<u8>> {
        let mut inner = self.inner.lock();
        self.read_locked(&mut inner, pos)
    }

    /// Reads raw bytes into `buf` starting at `offset`.
    ///
    /// Pending writes are flushed first. Returns `buf.len()` on a full read.
    ///
    /// # Errors
    ///
    /// Returns `UnexpectedEof` if the file ends before `buf` is filled; its
    /// `read` field holds the number of bytes copied into `buf`. Also
    /// returns an error if the store is closed or an I/O error occurs.
    pub fn read_at(&self, buf: &mut [u8], offset: u64) -> StoreResult<usize> {
        let mut inner = self.inner.lock();
        let file = inner.flushed()?;
        read_exact_at(file, buf, offset)?;
        Ok(buf.len())
    }

    /// Pushes buffered writes to the OS.
    ///
    /// This does not make them durable; use [`Store::sync`] for that.
    ///
    /// # Errors
    ///
    /// Returns an error if the store is closed or the write fails.
    pub fn flush(&self) -> StoreResult<()> {
        self.inner.lock().flushed()?;
        Ok(())
    }

    /// Flushes buffered writes and makes them durable.
    ///
    /// # Errors
    ///
    /// Returns an error if the store is closed or the flush or sync fails.
    pub fn sync(&self) -> StoreResult<()> {
        let mut inner = self.inner.lock();
        inner.flushed()?.sync()?;
        Ok(())
    }

    /// Flushes, syncs and releases the file.
    ///
    /// After this returns successfully every appended record is durable
    /// and visible to independent readers, and every further operation
    /// returns `Closed`. If the flush or sync fails the error is returned
    /// and the file stays open, so the caller may retry.
    ///
    /// # Errors
    ///
    /// Returns an error if the store is already closed or the flush or
    /// sync fails.
    pub fn close(&self) -> StoreResult<()> {
        let mut inner = self.inner.lock();
        inner.flushed()?.sync()?;
        inner.writer = None;

        debug!(size = inner.size, "closed record store");
        Ok(())
    }

    /// Returns the logical size of the store in bytes.
    ///
    /// This is the position where the next `append` will write.
    #[must_use]
    pub fn size(&self) -> u64 {
        self.inner.lock().size
    }

    /// Returns `true` once [`Store::close`] has succeeded.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.inner.lock().writer.is_none()
    }

    /// Returns the store configuration.
    #[must_use]
    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// Returns the path of the backing file, if the store was opened from one.
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Returns an iterator over all records, starting at position 0.
    ///
    /// Each item is `(position, payload)`. This is how an index is rebuilt
    /// from the store after a restart.
    pub fn records(&self) -> Records<'_, F> {
        self.records_from(0)
    }

    /// Returns an iterator over records starting at `pos`.
    pub fn records_from(&self, pos: u64) -> Records<'_, F> {
        Records::new(self, pos)
    }

    /// Reads the record at `pos` unless `pos` is at the logical end.
    pub(crate) fn read_next(&self, pos: u64) -> StoreResult<Option<Vec<u8>>> {
        let mut inner = self.inner.lock();
        if pos >= inner.size {
            return Ok(None);
        }
        self.read_locked(&mut inner, pos).map(Some)
    }

    fn read_locked(&self, inner: &mut Inner<F>, pos: u64) -> StoreResult<Vec<u8>> {
        let width = self.config.len_width;
        let size = inner.size;
        let file = inner.flushed()?;

        let mut header = [0u8; MAX_LEN_WIDTH];
        read_exact_at(file, &mut header[..width.get()], pos)?;
        let len = width.decode_len(&header[..width.get()])?;

        let payload_pos = pos + width.get() as u64;
        let available = size.saturating_sub(payload_pos);
        if len > available {
            return Err(StoreError::UnexpectedEof {
                offset: payload_pos,
                requested: usize::try_from(len).unwrap_or(usize::MAX),
                read: usize::try_from(available).unwrap_or(usize::MAX),
            });
        }

        let len = usize::try_from(len).map_err(|_| {
            StoreError::corrupted(format!("record at {pos} too large for memory: {len} bytes"))
        })?;
        let mut payload = vec![0u8; len];
        read_exact_at(file, &mut payload, payload_pos)?;

        trace!(pos, len, "read record");
        Ok(payload)
    }
}

impl<F: StoreFile> Drop for Store<F> {
    fn drop(&mut self) {
        let inner = self.inner.get_mut();
        if let Some(writer) = inner.writer.as_mut() {
            if let Err(err) = writer.flush().and_then(|()| writer.get_ref().sync()) {
                warn!(error = %err, "failed to flush record store on drop");
            }
        }
    }
}

impl<F: StoreFile> std::fmt::Debug for Store<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Store")
            .field("path", &self.path)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

/// Fills `buf` from `offset` or reports how far the file got.
fn read_exact_at<F: StoreFile>(file: &F, buf: &mut [u8], offset: u64) -> StoreResult<()> {
    let read = read_full_at(file, buf, offset)?;
    if read < buf.len() {
        return Err(StoreError::UnexpectedEof {
            offset,
            requested: buf.len(),
            read,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::LenWidth;
    use crate::memory::InMemoryFile;
    use proptest::prelude::*;
    use std::sync::Arc;
    use std::thread;
    use tempfile::tempdir;

    fn memory_store() -> (InMemoryFile, Store<InMemoryFile>) {
        let file = InMemoryFile::new();
        let store = Store::new(file.clone(), StoreConfig::default()).unwrap();
        (file, store)
    }

    #[test]
    fn store_create_new() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("test.store");

        let store = Store::open(&path, StoreConfig::default()).unwrap();
        assert_eq!(store.size(), 0);
        assert_eq!(store.path(), Some(path.as_path()));
        assert!(path.exists());
    }

    #[test]
    fn store_append_returns_positions() {
        let (_, store) = memory_store();

        assert_eq!(store.append(b"abc").unwrap(), (11, 0));
        assert_eq!(store.append(b"abc").unwrap(), (11, 11));
        assert_eq!(store.append(b"abc").unwrap(), (11, 22));
        assert_eq!(store.size(), 33);
        assert_eq!(store.read(11).unwrap(), b"abc");
    }

    #[test]
    fn store_append_stays_buffered() {
        let (file, store) = memory_store();
        store.append(b"abc").unwrap();
        assert!(file.data().is_empty());

        store.flush().unwrap();
        let mut expected = vec![0u8, 0, 0, 0, 0, 0, 0, 3];
        expected.extend_from_slice(b"abc");
        assert_eq!(file.data(), expected);
    }

    #[test]
    fn store_read_flushes_pending_writes() {
        let (file, store) = memory_store();
        let (_, pos) = store.append(b"fresh").unwrap();

        assert_eq!(store.read(pos).unwrap(), b"fresh");
        assert_eq!(file.data().len(), 13);
    }

    #[test]
    fn store_read_at_header_then_payload() {
        let (_, store) = memory_store();
        store.append(b"hello").unwrap();
        let (_, pos) = store.append(b"world!").unwrap();

        let mut header = [0u8; 8];
        assert_eq!(store.read_at(&mut header, pos).unwrap(), 8);
        let len = u64::from_be_bytes(header);
        assert_eq!(len, 6);

        let mut payload = vec![0u8; len as usize];
        assert_eq!(store.read_at(&mut payload, pos + 8).unwrap(), 6);
        assert_eq!(payload, store.read(pos).unwrap());
    }

    #[test]
    fn store_read_at_past_end_is_eof() {
        let (_, store) = memory_store();
        store.append(b"abc").unwrap();

        let mut buf = [0u8; 8];
        let err = store.read_at(&mut buf, 6).unwrap_err();
        assert!(err.is_eof());
        assert!(matches!(
            err,
            StoreError::UnexpectedEof {
                offset: 6,
                requested: 8,
                read: 5
            }
        ));
        assert_eq!(&buf[..5], &[0, 3, b'a', b'b', b'c']);
    }

    #[test]
    fn store_read_at_empty_buffer() {
        let (_, store) = memory_store();
        let mut buf = [0u8; 0];
        assert_eq!(store.read_at(&mut buf, 100).unwrap(), 0);
    }

    #[test]
    fn store_read_past_end_is_eof() {
        let (_, store) = memory_store();
        store.append(b"abc").unwrap();

        let err = store.read(11).unwrap_err();
        assert!(err.is_eof());
    }

    #[test]
    fn store_read_misaligned_position_is_eof() {
        let (_, store) = memory_store();
        store.append(b"abc").unwrap();

        // Header bytes at 1..9 decode to 0x0361
        let err = store.read(1).unwrap_err();
        assert!(err.is_eof());
        assert!(matches!(
            err,
            StoreError::UnexpectedEof {
                offset: 9,
                requested: 0x0361,
                read: 2
            }
        ));
    }

    #[test]
    fn store_read_torn_payload_is_eof() {
        let mut data = vec![0, 0, 0, 0, 0, 0, 0, 10];
        data.extend_from_slice(b"abc");
        let store = Store::new(InMemoryFile::with_data(data), StoreConfig::default()).unwrap();

        let err = store.read(0).unwrap_err();
        assert!(err.is_eof());
        assert!(matches!(
            err,
            StoreError::UnexpectedEof {
                offset: 8,
                requested: 10,
                read: 3
            }
        ));
    }

    #[test]
    fn store_empty_payload() {
        let (_, store) = memory_store();

        let (written, pos) = store.append(b"").unwrap();
        assert_eq!((written, pos), (8, 0));
        assert!(store.read(pos).unwrap().is_empty());

        let (_, next) = store.append(b"x").unwrap();
        assert_eq!(next, 8);
        assert_eq!(store.read(next).unwrap(), b"x");
    }

    #[test]
    fn store_custom_len_width() {
        let file = InMemoryFile::new();
        let config = StoreConfig::new().len_width(LenWidth::U32);
        let store = Store::new(file.clone(), config).unwrap();

        assert_eq!(store.append(b"abc").unwrap(), (7, 0));
        assert_eq!(store.append(b"de").unwrap(), (6, 7));
        assert_eq!(store.read(7).unwrap(), b"de");

        store.flush().unwrap();
        assert_eq!(&file.data()[..4], &[0, 0, 0, 3]);
    }

    #[test]
    fn store_record_too_large() {
        let config = StoreConfig::new().len_width(LenWidth::new(1).unwrap());
        let store = Store::new(InMemoryFile::new(), config).unwrap();

        let result = store.append(&[0u8; 256]);
        assert!(matches!(
            result,
            Err(StoreError::RecordTooLarge { len: 256, max: 255 })
        ));
        assert_eq!(store.size(), 0);

        assert_eq!(store.append(&[7u8; 255]).unwrap(), (256, 0));
    }

    #[test]
    fn store_invalid_config_rejected() {
        let config = StoreConfig::new().buffer_capacity(0);
        let result = Store::new(InMemoryFile::new(), config);
        assert!(matches!(result, Err(StoreError::InvalidConfig(_))));
    }

    #[test]
    fn store_close_makes_bytes_durable() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("test.store");

        let store = Store::open(&path, StoreConfig::default()).unwrap();
        for _ in 0..3 {
            store.append(b"abc").unwrap();
        }

        let before = std::fs::metadata(&path).unwrap().len();
        assert_eq!(before, 0);

        store.close().unwrap();
        let after = std::fs::metadata(&path).unwrap().len();
        assert_eq!(after, 33);
        assert!(store.is_closed());
    }

    #[test]
    fn store_operations_after_close_fail() {
        let (_, store) = memory_store();
        let (_, pos) = store.append(b"abc").unwrap();
        store.close().unwrap();

        assert!(matches!(store.append(b"x"), Err(StoreError::Closed)));
        assert!(matches!(store.read(pos), Err(StoreError::Closed)));
        assert!(matches!(
            store.read_at(&mut [0u8; 4], 0),
            Err(StoreError::Closed)
        ));
        assert!(matches!(store.flush(), Err(StoreError::Closed)));
        assert!(matches!(store.sync(), Err(StoreError::Closed)));
        assert!(matches!(store.close(), Err(StoreError::Closed)));
        assert_eq!(store.size(), 11);
    }

    #[test]
    fn store_reopen_resumes_at_end() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("test.store");

        {
            let store = Store::open(&path, StoreConfig::default()).unwrap();
            store.append(b"first").unwrap();
            store.append(b"second").unwrap();
            store.close().unwrap();
        }

        let store = Store::open(&path, StoreConfig::default()).unwrap();
        assert_eq!(store.size(), 27);
        assert_eq!(store.read(13).unwrap(), b"second");

        let (_, pos) = store.append(b"third").unwrap();
        assert_eq!(pos, 27);
        assert_eq!(store.read(0).unwrap(), b"first");
        assert_eq!(store.read(pos).unwrap(), b"third");
    }

    #[test]
    fn store_open_with_create_dirs() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("path").join("test.store");

        let store = Store::open_with_create_dirs(&path, StoreConfig::default()).unwrap();
        assert_eq!(store.size(), 0);
        assert!(path.exists());
    }

    #[test]
    fn store_lock_is_exclusive() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("test.store");

        let store = Store::open(&path, StoreConfig::default()).unwrap();
        let second = Store::open(&path, StoreConfig::default());
        assert!(matches!(second, Err(StoreError::Locked)));

        store.close().unwrap();
        assert!(Store::open(&path, StoreConfig::default()).is_ok());
    }

    #[test]
    fn store_lock_contention_maps_to_locked() {
        let err = io::Error::new(io::ErrorKind::WouldBlock, "held elsewhere");
        assert!(matches!(lock_error(err), StoreError::Locked));
        assert!(matches!(
            lock_error(fs2::lock_contended_error()),
            StoreError::Locked
        ));
    }

    #[test]
    fn store_lock_failure_keeps_io_error() {
        let err = io::Error::new(io::ErrorKind::Unsupported, "no lock support");
        match lock_error(err) {
            StoreError::Io(err) => assert_eq!(err.kind(), io::ErrorKind::Unsupported),
            other => panic!("expected Io, got {other:?}"),
        }
    }

    #[test]
    fn store_new_over_append_mode_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("test.store");
        let mut data = vec![0, 0, 0, 0, 0, 0, 0, 2];
        data.extend_from_slice(b"hi");
        std::fs::write(&path, &data).unwrap();

        let file = OpenOptions::new()
            .read(true)
            .append(true)
            .open(&path)
            .unwrap();
        let store = Store::new(file, StoreConfig::default()).unwrap();

        let (_, pos) = store.append(b"next").unwrap();
        assert_eq!(pos, 10);
        assert_eq!(store.read(0).unwrap(), b"hi");
        assert_eq!(store.read(pos).unwrap(), b"next");
        store.close().unwrap();
        assert_eq!(std::fs::metadata(&path).unwrap().len(), 22);
    }

    #[test]
    fn store_drop_flushes() {
        let file = InMemoryFile::new();
        {
            let store = Store::new(file.clone(), StoreConfig::default()).unwrap();
            store.append(b"abc").unwrap();
            assert!(file.data().is_empty());
        }
        assert_eq!(file.data().len(), 11);
    }

    #[test]
    fn store_sync_keeps_store_open() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("test.store");

        let store = Store::open(&path, StoreConfig::default()).unwrap();
        store.append(b"data").unwrap();
        store.sync().unwrap();

        assert_eq!(std::fs::metadata(&path).unwrap().len(), 12);
        assert!(!store.is_closed());
        assert_eq!(store.append(b"more").unwrap(), (12, 12));
    }

    #[test]
    fn store_small_buffer_spills_to_file() {
        let file = InMemoryFile::new();
        let config = StoreConfig::new().buffer_capacity(16);
        let store = Store::new(file.clone(), config).unwrap();

        store.append(&[1u8; 32]).unwrap();
        assert!(!file.data().is_empty());
        assert_eq!(store.read(0).unwrap(), vec![1u8; 32]);
    }

    #[test]
    fn store_records_walks_header_chain() {
        let (_, store) = memory_store();
        let payloads: [&[u8]; 3] = [b"one", b"", b"three"];
        for payload in payloads {
            store.append(payload).unwrap();
        }

        let records: Vec<_> = store.records().collect::<StoreResult<_>>().unwrap();
        assert_eq!(records.len(), 3);
        assert_eq!(records[0], (0, b"one".to_vec()));
        assert_eq!(records[1], (11, Vec::new()));
        assert_eq!(records[2], (19, b"three".to_vec()));

        let tail: Vec<_> = store.records_from(11).map(|r| r.unwrap().0).collect();
        assert_eq!(tail, vec![11, 19]);
    }

    #[test]
    fn store_concurrent_appends_do_not_overlap() {
        let store = Arc::new(Store::new(InMemoryFile::new(), StoreConfig::default()).unwrap());

        let handles: Vec<_> = (0..8u8)
            .map(|t| {
                let store = Arc::clone(&store);
                thread::spawn(move || {
                    (0..100u8)
                        .map(|i| {
                            let payload = vec![t; usize::from(i % 17)];
                            let (_, pos) = store.append(&payload).unwrap();
                            (pos, payload)
                        })
                        .collect::<Vec<_>>()
                })
            })
            .collect();

        let mut appended: Vec<(u64, Vec<u8>)> = handles
            .into_iter()
            .flat_map(|h| h.join().unwrap())
            .collect();
        appended.sort_by_key(|(pos, _)| *pos);

        let mut expected_pos = 0;
        for (pos, payload) in &appended {
            assert_eq!(*pos, expected_pos);
            assert_eq!(&store.read(*pos).unwrap(), payload);
            expected_pos += 8 + payload.len() as u64;
        }
        assert_eq!(store.size(), expected_pos);
    }

    proptest! {
        #[test]
        fn prop_positions_and_roundtrip(
            payloads in prop::collection::vec(prop::collection::vec(any::<u8>(), 0..512), 1..32),
        ) {
            let (_, store) = memory_store();

            let mut expected = 0u64;
            let mut positions = Vec::new();
            for payload in &payloads {
                let (written, pos) = store.append(payload).unwrap();
                prop_assert_eq!(pos, expected);
                prop_assert_eq!(written, 8 + payload.len() as u64);
                expected += written;
                positions.push(pos);
            }

            for (pos, payload) in positions.iter().zip(&payloads) {
                prop_assert_eq!(&store.read(*pos).unwrap(), payload);
            }
        }
    }
}
