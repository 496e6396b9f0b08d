//! Backing file abstraction.

use std::fs::File;
use std::io::{self, Write};

/// The file underneath a [`crate::Store`].
///
/// A store file is an **append-only byte sink** that also supports
/// positional reads. Writes go through [`Write`] and always land at the
/// end of the file; reads never move the write position.
///
/// # Invariants
///
/// - Bytes written and flushed are returned by `read_at` at their offset
/// - `size` reports the number of bytes the OS currently holds
/// - `sync` returns only once flushed bytes are on stable storage
///
/// # Implementors
///
/// - [`std::fs::File`] - For persistent stores. The file must be
///   positioned at its end, e.g. opened with `append(true)`
/// - [`super::InMemoryFile`] - For testing and ephemeral stores
pub trait StoreFile: Write + Send {
    /// Reads into `buf` starting at `offset`.
    ///
    /// Returns the number of bytes read, which may be less than
    /// `buf.len()`. Zero means end of file.
    ///
    /// # Errors
    ///
    /// Returns an error if an I/O error occurs.
    fn read_at(&self, buf: &mut [u8], offset: u64) -> io::Result<usize>;

    /// Makes all written data and metadata durable.
    ///
    /// # Errors
    ///
    /// Returns an error if the sync operation fails.
    fn sync(&self) -> io::Result<()>;

    /// Returns the current size of the file in bytes.
    ///
    /// # Errors
    ///
    /// Returns an error if the size cannot be determined.
    fn size(&self) -> io::Result<u64>;
}

impl StoreFile for File {
    #[cfg(unix)]
    fn read_at(&self, buf: &mut [u8], offset: u64) -> io::Result<usize> {
        std::os::unix::fs::FileExt::read_at(self, buf, offset)
    }

    #[cfg(windows)]
    fn read_at(&self, buf: &mut [u8], offset: u64) -> io::Result<usize> {
        std::os::windows::fs::FileExt::seek_read(self, buf, offset)
    }

    #[cfg(not(any(unix, windows)))]
    fn read_at(&self, _buf: &mut [u8], _offset: u64) -> io::Result<usize> {
        Err(io::Error::new(
            io::ErrorKind::Unsupported,
            "positional reads are not supported on this platform",
        ))
    }

    fn sync(&self) -> io::Result<()> {
        self.sync_all()
    }

    fn size(&self) -> io::Result<u64> {
        Ok(self.metadata()?.len())
    }
}

/// Fills `buf` from `offset`, retrying short and interrupted reads.
///
/// Returns the number of bytes read. A value below `buf.len()` means the
/// file ended first.
pub(crate) fn read_full_at<F: StoreFile + ?Sized>(
    file: &F,
    buf: &mut [u8],
    offset: u64,
) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match file.read_at(&mut buf[filled..], offset + filled as u64) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(err) if err.kind() == io::ErrorKind::Interrupted => {}
            Err(err) => return Err(err),
        }
    }
    Ok(filled)
}
