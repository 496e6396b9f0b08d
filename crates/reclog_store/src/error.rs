//! Error types for record store operations.

use std::io;
use thiserror::Error;

/// Result type for record store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors that can occur during record store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The file ended before the requested bytes could be read.
    #[error("unexpected end of file: offset {offset}, requested {requested}, read {read}")]
    UnexpectedEof {
        /// The requested read offset.
        offset: u64,
        /// The number of bytes requested.
        requested: usize,
        /// The number of bytes actually read before end of file.
        read: usize,
    },

    /// The payload length cannot be encoded in the store's length header.
    #[error("record too large: {len} bytes, header allows at most {max}")]
    RecordTooLarge {
        /// The payload length.
        len: u64,
        /// The largest length the header can encode.
        max: u64,
    },

    /// A length header does not describe a record inside the file.
    #[error("store corrupted: {0}")]
    Corrupted(String),

    /// The store configuration was rejected.
    #[error("invalid store config: {0}")]
    InvalidConfig(String),

    /// Another handle holds the exclusive lock on the store file.
    #[error("store locked: another handle has exclusive access")]
    Locked,

    /// An earlier append failed part way; further appends are refused.
    #[error("store poisoned by a failed append")]
    Poisoned,

    /// The store is closed.
    #[error("store is closed")]
    Closed,
}

impl StoreError {
    /// Creates a corruption error.
    pub fn corrupted(message: impl Into<String>) -> Self {
        Self::Corrupted(message.into())
    }

    /// Creates an invalid config error.
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig(message.into())
    }

    /// Returns `true` if this error means the file has no more data.
    ///
    /// Covers both [`StoreError::UnexpectedEof`] and an I/O error of kind
    /// [`io::ErrorKind::UnexpectedEof`].
    #[must_use]
    pub fn is_eof(&self) -> bool {
        match self {
            Self::UnexpectedEof { .. } => true,
            Self::Io(err) => err.kind() == io::ErrorKind::UnexpectedEof,
            _ => false,
        }
    }
}
