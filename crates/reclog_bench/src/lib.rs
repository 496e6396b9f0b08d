//! Benchmark utilities for reclog.

#![deny(unsafe_code)]
#![warn(missing_docs)]

use rand::Rng;

/// Generate random payload data of the specified size.
pub fn random_data(size: usize) -> Vec<u8> {
    let mut rng = rand::thread_rng();
    (0..size).map(|_| rng.gen()).collect()
}

/// Generate a batch of payloads with sizes drawn from `min..=max`.
pub fn random_payloads(count: usize, min: usize, max: usize) -> Vec<Vec<u8>> {
    let mut rng = rand::thread_rng();
    (0..count)
        .map(|_| random_data(rng.gen_range(min..=max)))
        .collect()
}
