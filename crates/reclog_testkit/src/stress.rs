//! Stress tests for the record store.
//!
//! These helpers drive a shared store from many threads and verify that
//! every appended record reads back intact at its own position.

use parking_lot::Mutex;
use reclog_store::{Store, StoreFile};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

/// Result of a stress test run.
#[derive(Debug, Clone)]
pub struct StressTestResult {
    /// Total operations performed.
    pub total_ops: usize,
    /// Successful operations.
    pub successful_ops: usize,
    /// Failed operations, including reads that returned the wrong bytes.
    pub failed_ops: usize,
    /// Total duration.
    pub duration: Duration,
    /// Operations per second.
    pub ops_per_second: f64,
}

impl StressTestResult {
    /// Creates a new result.
    pub fn new(successful: usize, failed: usize, duration: Duration) -> Self {
        let total = successful + failed;
        let ops_per_second = if duration.as_secs_f64() > 0.0 {
            total as f64 / duration.as_secs_f64()
        } else {
            0.0
        };

        Self {
            total_ops: total,
            successful_ops: successful,
            failed_ops: failed,
            duration,
            ops_per_second,
        }
    }
}

/// Configuration for stress tests.
#[derive(Debug, Clone)]
pub struct StressConfig {
    /// Appends performed by each writer thread.
    pub appends_per_thread: usize,
    /// Number of writer threads.
    pub writers: usize,
    /// Number of reader threads (mixed test only).
    pub readers: usize,
    /// Largest payload in bytes; payload sizes cycle up to it.
    pub max_payload: usize,
}

impl Default for StressConfig {
    fn default() -> Self {
        Self {
            appends_per_thread: 1_000,
            writers: 4,
            readers: 2,
            max_payload: 256,
        }
    }
}

/// Builds a payload unique to `(thread, seq)` so misplaced reads are detected.
fn payload_for(thread: usize, seq: usize, max_payload: usize) -> Vec<u8> {
    let len = if max_payload == 0 {
        0
    } else {
        seq % (max_payload + 1)
    };
    let tag = (thread.wrapping_mul(31) ^ seq) as u8;
    vec![tag; len]
}

/// Runs concurrent appends, then reads every record back.
///
/// Fails an operation if an append errors, a position is handed out
/// twice, or a read does not return the appended bytes.
pub fn stress_concurrent_appends<F>(store: &Arc<Store<F>>, config: &StressConfig) -> StressTestResult
where
    F: StoreFile + 'static,
{
    let start = Instant::now();
    let failed = Arc::new(AtomicUsize::new(0));

    let handles: Vec<_> = (0..config.writers)
        .map(|t| {
            let store = Arc::clone(store);
            let failed = Arc::clone(&failed);
            let config = config.clone();
            thread::spawn(move || {
                let mut appended = Vec::with_capacity(config.appends_per_thread);
                for seq in 0..config.appends_per_thread {
                    let payload = payload_for(t, seq, config.max_payload);
                    match store.append(&payload) {
                        Ok((_, pos)) => appended.push((pos, payload)),
                        Err(_) => {
                            failed.fetch_add(1, Ordering::SeqCst);
                        }
                    }
                }
                appended
            })
        })
        .collect();

    let mut appended = join_writers(handles, &failed);
    appended.sort_by_key(|(pos, _)| *pos);

    let width = store.config().len_width;
    let mut successful = 0usize;
    let mut failed = failed.load(Ordering::SeqCst);
    let mut expected_pos = appended.first().map_or(0, |(pos, _)| *pos);

    for (pos, payload) in &appended {
        let in_place = *pos == expected_pos;
        let intact = matches!(store.read(*pos), Ok(ref read) if read == payload);
        if in_place && intact {
            successful += 1;
        } else {
            failed += 1;
        }
        expected_pos = pos + width.frame_size(payload.len() as u64);
    }

    StressTestResult::new(successful, failed, start.elapsed())
}

/// Collects what each writer appended; a panicked writer counts as a failure.
fn join_writers(
    handles: Vec<JoinHandle<Vec<(u64, Vec<u8>)>>>,
    failed: &AtomicUsize,
) -> Vec<(u64, Vec<u8>)> {
    let mut appended = Vec::new();
    for handle in handles {
        match handle.join() {
            Ok(records) => appended.extend(records),
            Err(_) => {
                failed.fetch_add(1, Ordering::SeqCst);
            }
        }
    }
    appended
}

/// Runs writers and readers against the store at the same time.
///
/// Readers repeatedly read records the writers have already reported,
/// so every read races with in-flight appends and their buffered bytes.
pub fn stress_mixed_operations<F>(store: &Arc<Store<F>>, config: &StressConfig) -> StressTestResult
where
    F: StoreFile + 'static,
{
    let start = Instant::now();
    let published: Arc<Mutex<Vec<(u64, Vec<u8>)>>> = Arc::new(Mutex::new(Vec::new()));
    let successful = Arc::new(AtomicUsize::new(0));
    let failed = Arc::new(AtomicUsize::new(0));
    let writers_done = Arc::new(AtomicUsize::new(0));

    let mut handles = Vec::new();

    for t in 0..config.writers {
        let store = Arc::clone(store);
        let published = Arc::clone(&published);
        let successful = Arc::clone(&successful);
        let failed = Arc::clone(&failed);
        let writers_done = Arc::clone(&writers_done);
        let config = config.clone();
        handles.push(thread::spawn(move || {
            for seq in 0..config.appends_per_thread {
                let payload = payload_for(t, seq, config.max_payload);
                match store.append(&payload) {
                    Ok((_, pos)) => {
                        published.lock().push((pos, payload));
                        successful.fetch_add(1, Ordering::SeqCst);
                    }
                    Err(_) => {
                        failed.fetch_add(1, Ordering::SeqCst);
                    }
                }
            }
            writers_done.fetch_add(1, Ordering::SeqCst);
        }));
    }

    for r in 0..config.readers {
        let store = Arc::clone(store);
        let published = Arc::clone(&published);
        let successful = Arc::clone(&successful);
        let failed = Arc::clone(&failed);
        let writers_done = Arc::clone(&writers_done);
        let writers = config.writers;
        handles.push(thread::spawn(move || {
            let mut cursor = r;
            while writers_done.load(Ordering::SeqCst) < writers {
                let target = {
                    let published = published.lock();
                    if published.is_empty() {
                        None
                    } else {
                        Some(published[cursor % published.len()].clone())
                    }
                };
                cursor = cursor.wrapping_add(7);

                let Some((pos, payload)) = target else {
                    thread::yield_now();
                    continue;
                };
                match store.read(pos) {
                    Ok(read) if read == payload => {
                        successful.fetch_add(1, Ordering::SeqCst);
                    }
                    _ => {
                        failed.fetch_add(1, Ordering::SeqCst);
                    }
                }
            }
        }));
    }

    for handle in handles {
        if handle.join().is_err() {
            failed.fetch_add(1, Ordering::SeqCst);
        }
    }

    StressTestResult::new(
        successful.load(Ordering::SeqCst),
        failed.load(Ordering::SeqCst),
        start.elapsed(),
    )
}
