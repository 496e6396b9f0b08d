//! # reclog Testkit
//!
//! Test utilities for reclog.
//!
//! This crate provides:
//! - Test fixtures and store helpers
//! - Fault-injecting store files
//! - Property-based test generators using proptest
//! - Stress testing utilities
//!
//! ## Usage
//!
//! ```rust
//! use reclog_testkit::prelude::*;
//!
//! let (file, store) = memory_store();
//! store.append(b"abc").unwrap();
//! store.flush().unwrap();
//! assert_eq!(file.data().len(), 11);
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod faults;
pub mod fixtures;
pub mod generators;
pub mod stress;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::faults::*;
    pub use crate::fixtures::*;
    pub use crate::generators::*;
    pub use crate::stress::*;
}

pub use faults::*;
pub use fixtures::*;
pub use generators::*;
pub use stress::*;
