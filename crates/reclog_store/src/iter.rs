//! Forward iteration over stored records.
//!
//! Walks the header chain from a starting position to the logical end of
//! the store. This is the recovery path: a caller that lost its index
//! rebuilds it from the `(position, payload)` pairs.

use crate::error::StoreResult;
use crate::file::StoreFile;
use crate::store::Store;

/// Iterator over `(position, payload)` pairs of a [`Store`].
///
/// Each step takes the store lock on its own, so appends may interleave
/// with iteration; records appended before the iterator reaches the end
/// are yielded too.
///
/// # Error Handling
///
/// - A torn tail (header or payload cut short) yields `UnexpectedEof`
/// - A length too large to hold in memory yields `Corrupted`
///
/// The iterator ends after yielding its first error.
///
/// # Example
///
/// ```rust
/// use reclog_store::{InMemoryFile, Store, StoreConfig};
///
/// let store = Store::new(InMemoryFile::new(), StoreConfig::default()).unwrap();
/// store.append(b"a").unwrap();
/// store.append(b"b").unwrap();
///
/// let positions: Vec<u64> = store.records().map(|r| r.unwrap().0).collect();
/// assert_eq!(positions, vec![0, 9]);
/// ```
#[derive(Debug)]
pub struct Records<'a, F: StoreFile> {
    store: &'a Store<F>,
    next_pos: u64,
    finished: bool,
}

impl<'a, F: StoreFile> Records<'a, F> {
    pub(crate) fn new(store: &'a Store<F>, start: u64) -> Self {
        Self {
            store,
            next_pos: start,
            finished: false,
        }
    }

    /// Returns the position the next record will be read from.
    #[must_use]
    pub fn position(&self) -> u64 {
        self.next_pos
    }
}

impl<F: StoreFile> Iterator for Records<'_, F> {
    type Item = StoreResult<(u64, Vec<u8>)>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }

        match self.store.read_next(self.next_pos) {
            Ok(Some(payload)) => {
                let pos = self.next_pos;
                let width = self.store.config().len_width;
                self.next_pos += width.frame_size(payload.len() as u64);
                Some(Ok((pos, payload)))
            }
            Ok(None) => {
                self.finished = true;
                None
            }
            Err(err) => {
                self.finished = true;
                Some(Err(err))
            }
        }
    }
}
