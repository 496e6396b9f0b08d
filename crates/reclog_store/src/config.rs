//! Store configuration.

use crate::error::{StoreError, StoreResult};
use crate::frame::LenWidth;

/// Default capacity of the write buffer.
pub const DEFAULT_BUFFER_CAPACITY: usize = 8 * 1024;

/// Configuration for opening a record store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    /// Width of the big-endian length header, fixed for the store's lifetime.
    pub len_width: LenWidth,

    /// Capacity of the in-memory write buffer in bytes.
    pub buffer_capacity: usize,

    /// Whether [`crate::Store::open`] takes an exclusive advisory lock on the file.
    pub lock_file: bool,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            len_width: LenWidth::U64,
            buffer_capacity: DEFAULT_BUFFER_CAPACITY,
            lock_file: true,
        }
    }
}

impl StoreConfig {
    /// Creates a new configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the length header width.
    #[must_use]
    pub const fn len_width(mut self, width: LenWidth) -> Self {
        self.len_width = width;
        self
    }

    /// Sets the write buffer capacity.
    #[must_use]
    pub const fn buffer_capacity(mut self, capacity: usize) -> Self {
        self.buffer_capacity = capacity;
        self
    }

    /// Sets whether to lock the file on open.
    #[must_use]
    pub const fn lock_file(mut self, value: bool) -> Self {
        self.lock_file = value;
        self
    }

    /// Checks the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::InvalidConfig`] if the buffer capacity is zero.
    pub fn validate(&self) -> StoreResult<()> {
        if self.buffer_capacity == 0 {
            return Err(StoreError::invalid_config(
                "write buffer capacity must be non-zero",
            ));
        }
        Ok(())
    }
}
