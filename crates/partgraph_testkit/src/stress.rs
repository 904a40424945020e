//! Stress tests for concurrent readers.
//!
//! These helpers hammer a loaded partial graph from many threads while a
//! sampler checks that the byte counters never go backwards.

use partgraph_core::PartialGraphLoader;
use partgraph_format::EdgeRecord;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::thread::{self, ScopedJoinHandle};
use std::time::{Duration, Instant};

/// Result of a stress test run.
#[derive(Debug, Clone)]
pub struct StressTestResult {
    /// Accessor calls that succeeded.
    pub successful_ops: usize,
    /// Accessor calls that failed, plus one per worker that panicked.
    pub failed_ops: usize,
    /// Total bytes reported by the loader at the end.
    pub bytes_read: u64,
    /// Counter samples taken while workers ran.
    pub samples: usize,
    /// False if any sample was smaller than the one before it.
    pub monotonic: bool,
    /// Total duration.
    pub duration: Duration,
}

impl StressTestResult {
    /// Prints a summary of the test.
    pub fn print_summary(&self, name: &str) {
        println!("\n=== {} ===", name);
        println!("Successful: {}", self.successful_ops);
        println!("Failed: {}", self.failed_ops);
        println!("Bytes read: {}", self.bytes_read);
        println!("Samples: {} (monotonic: {})", self.samples, self.monotonic);
        println!("Duration: {:?}", self.duration);
    }
}

/// Configuration for stress tests.
#[derive(Debug, Clone)]
pub struct StressConfig {
    /// Number of concurrent reader threads.
    pub threads: usize,
    /// Full passes over the loaded range per thread.
    pub rounds: usize,
}

impl Default for StressConfig {
    fn default() -> Self {
        Self {
            threads: 4,
            rounds: 10,
        }
    }
}

/// Walks every loaded node and edge `config.rounds` times on each of
/// `config.threads` threads, sampling `total_bytes_read` meanwhile.
pub fn stress_concurrent_walk<E: EdgeRecord>(
    loader: &PartialGraphLoader<E>,
    config: &StressConfig,
) -> StressTestResult {
    let successful = AtomicUsize::new(0);
    let failed = AtomicUsize::new(0);
    let done = AtomicBool::new(false);
    let (successful_ref, failed_ref, done_ref) = (&successful, &failed, &done);
    let start = Instant::now();

    let (samples, monotonic) = thread::scope(|scope| {
        let sampler = scope.spawn(move || {
            let mut last = 0;
            let mut samples = 0;
            let mut monotonic = true;
            while !done_ref.load(Ordering::Acquire) {
                let total = loader.total_bytes_read();
                monotonic &= total >= last;
                last = total;
                samples += 1;
                thread::yield_now();
            }
            (samples, monotonic)
        });

        let workers: Vec<_> = (0..config.threads)
            .map(|_| {
                scope.spawn(move || {
                    for _ in 0..config.rounds {
                        for node in loader.node_range() {
                            let record = |ok: bool| {
                                let counter = if ok { successful_ref } else { failed_ref };
                                counter.fetch_add(1, Ordering::Relaxed);
                            };
                            let Ok(edges) = loader.edges(node) else {
                                record(false);
                                continue;
                            };
                            record(true);
                            for edge in edges {
                                record(loader.edge_destination(edge).is_ok());
                                record(loader.edge_data(edge).is_ok());
                            }
                        }
                    }
                })
            })
            .collect();

        failed_ref.fetch_add(join_counting_panics(workers), Ordering::Relaxed);
        done.store(true, Ordering::Release);
        sampler.join().unwrap_or((0, false))
    });

    StressTestResult {
        successful_ops: successful.into_inner(),
        failed_ops: failed.into_inner(),
        bytes_read: loader.total_bytes_read(),
        samples,
        monotonic,
        duration: start.elapsed(),
    }
}

/// Joins every worker and returns how many panicked.
fn join_counting_panics<T>(workers: Vec<ScopedJoinHandle<'_, T>>) -> usize {
    workers
        .into_iter()
        .map(ScopedJoinHandle::join)
        .filter(Result::is_err)
        .count()
}
