//! # reclog Store
//!
//! Append-only record store for reclog.
//!
//! This crate provides the lowest-level durability primitive of the log:
//! a store that persists variable-length records to a single file and
//! reads them back by position. Records are **opaque bytes** - the store
//! does not interpret them.
//!
//! ## Design Principles
//!
//! - One store per file, one file per store
//! - Records are framed by a fixed-width big-endian length header
//! - Appends are buffered; every read flushes first
//! - `close()` flushes, syncs and releases the file
//! - Must be `Send + Sync` for concurrent access
//!
//! ## Example
//!
//! ```rust
//! use reclog_store::{InMemoryFile, Store, StoreConfig};
//!
//! let store = Store::new(InMemoryFile::new(), StoreConfig::default()).unwrap();
//! let (written, pos) = store.append(b"hello world").unwrap();
//! assert_eq!((written, pos), (19, 0));
//! assert_eq!(store.read(pos).unwrap(), b"hello world");
//! store.close().unwrap();
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod error;
mod file;
pub mod frame;
mod iter;
mod memory;
mod store;

pub use config::{StoreConfig, DEFAULT_BUFFER_CAPACITY};
pub use error::{StoreError, StoreResult};
pub use file::StoreFile;
pub use frame::LenWidth;
pub use iter::Records;
pub use memory::InMemoryFile;
pub use store::Store;
