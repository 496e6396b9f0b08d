//! Property-based test generators using proptest.
//!
//! Provides strategies for generating record payloads and header widths
//! that respect the store's framing limits.

use proptest::prelude::*;
use reclog_store::LenWidth;

/// Largest payload the generators produce.
pub const MAX_GENERATED_PAYLOAD: usize = 1024;

/// Strategy for generating a record payload (arbitrary bytes, possibly empty).
pub fn payload_strategy() -> impl Strategy<Value = Vec<u8>> {
    prop::collection::vec(any::<u8>(), 0..MAX_GENERATED_PAYLOAD)
}

/// Strategy for generating a batch of payloads.
pub fn payloads_strategy(max_records: usize) -> impl Strategy<Value = Vec<Vec<u8>>> {
    prop::collection::vec(payload_strategy(), 0..max_records)
}

/// Strategy for generating every valid header width.
pub fn len_width_strategy() -> impl Strategy<Value = LenWidth> {
    (1usize..=8).prop_map(|bytes| LenWidth::new(bytes).expect("Width in range"))
}

/// Strategy for generating a header width together with payloads it can frame.
pub fn framed_payloads_strategy(
    max_records: usize,
) -> impl Strategy<Value = (LenWidth, Vec<Vec<u8>>)> {
    len_width_strategy().prop_flat_map(move |width| {
        let max_len = usize::try_from(width.max_len())
            .unwrap_or(usize::MAX)
            .min(MAX_GENERATED_PAYLOAD);
        let payloads =
            prop::collection::vec(prop::collection::vec(any::<u8>(), 0..=max_len), 0..max_records);
        (Just(width), payloads)
    })
}

/// Configuration for property tests.
#[derive(Debug, Clone)]
pub struct PropTestConfig {
    /// Number of test cases to run.
    pub cases: u32,
    /// Maximum shrinking iterations.
    pub max_shrink_iters: u32,
}

impl Default for PropTestConfig {
    fn default() -> Self {
        Self {
            cases: 256,
            max_shrink_iters: 1000,
        }
    }
}

impl PropTestConfig {
    /// Creates a quick config for fast tests.
    pub fn quick() -> Self {
        Self {
            cases: 32,
            max_shrink_iters: 100,
        }
    }

    /// Converts to proptest's ProptestConfig.
    pub fn to_proptest_config(&self) -> ProptestConfig {
        ProptestConfig {
            cases: self.cases,
            max_shrink_iters: self.max_shrink_iters,
            ..ProptestConfig::default()
        }
    }
}
