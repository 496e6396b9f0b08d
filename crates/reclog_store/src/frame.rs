//! Record framing.
//!
//! Every record is laid out on disk as a fixed-width big-endian length
//! header followed by the payload:
//!
//! ```text
//! [width bytes: big-endian length L][L bytes: payload]
//! ```
//!
//! There is no padding and no marker beyond the header. The width is
//! chosen once per store and shared by every record in it.

use crate::error::{StoreError, StoreResult};

/// Maximum supported header width in bytes (a `u64`).
pub const MAX_LEN_WIDTH: usize = 8;

/// Width of the length header in bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LenWidth(u8);

impl LenWidth {
    /// An 8-byte (`u64`) header.
    pub const U64: Self = Self(8);
    /// A 4-byte (`u32`) header.
    pub const U32: Self = Self(4);

    /// Creates a header width of `bytes`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::InvalidConfig`] unless `1 <= bytes <= 8`.
    pub fn new(bytes: usize) -> StoreResult<Self> {
        if bytes == 0 || bytes > MAX_LEN_WIDTH {
            return Err(StoreError::invalid_config(format!(
                "length header width must be between 1 and {MAX_LEN_WIDTH}, got {bytes}"
            )));
        }
        Ok(Self(bytes as u8))
    }

    /// Returns the width in bytes.
    #[must_use]
    pub const fn get(self) -> usize {
        self.0 as usize
    }

    /// Returns the largest payload length this width can encode.
    #[must_use]
    pub const fn max_len(self) -> u64 {
        if self.0 as usize == MAX_LEN_WIDTH {
            u64::MAX
        } else {
            (1u64 << (self.0 as u32 * 8)) - 1
        }
    }

    /// Returns the on-disk size of a record with `payload_len` bytes.
    #[must_use]
    pub const fn frame_size(self, payload_len: u64) -> u64 {
        self.0 as u64 + payload_len
    }

    /// Encodes `len` into a header.
    ///
    /// Only the first [`LenWidth::get`] bytes of the returned array are
    /// meaningful.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::RecordTooLarge`] if `len` exceeds
    /// [`LenWidth::max_len`].
    pub fn encode_len(self, len: u64) -> StoreResult<[u8; MAX_LEN_WIDTH]> {
        let max = self.max_len();
        if len > max {
            return Err(StoreError::RecordTooLarge { len, max });
        }

        let full = len.to_be_bytes();
        let mut header = [0u8; MAX_LEN_WIDTH];
        header[..self.get()].copy_from_slice(&full[MAX_LEN_WIDTH - self.get()..]);
        Ok(header)
    }

    /// Decodes a header.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Corrupted`] if `bytes` is not exactly
    /// [`LenWidth::get`] bytes long.
    pub fn decode_len(self, bytes: &[u8]) -> StoreResult<u64> {
        if bytes.len() != self.get() {
            return Err(StoreError::corrupted(format!(
                "length header is {} bytes, expected {}",
                bytes.len(),
                self.get()
            )));
        }

        let mut full = [0u8; MAX_LEN_WIDTH];
        full[MAX_LEN_WIDTH - bytes.len()..].copy_from_slice(bytes);
        Ok(u64::from_be_bytes(full))
    }
}

impl Default for LenWidth {
    fn default() -> Self {
        Self::U64
    }
}
