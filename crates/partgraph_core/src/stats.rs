//! Byte counters for partial graph access.
//!
//! A loaded partial graph is queried from many worker threads at once. Each
//! accessor records the bytes it touched so callers can measure how much of
//! the graph an algorithm actually reads. Counters are sharded: a thread
//! always updates the same shard, and [`ReadCounters::snapshot`] reduces all
//! shards into a [`ReadCountsSnapshot`] on demand.

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

const SHARDS: usize = 16;

static NEXT_SHARD: AtomicUsize = AtomicUsize::new(0);

thread_local! {
    static SHARD: usize = NEXT_SHARD.fetch_add(1, Ordering::Relaxed) % SHARDS;
}

/// Which part of the graph an access touched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadCategory {
    /// Out-index entries (`edge_begin`/`edge_end`).
    OutIndex,
    /// Destination entries.
    Destination,
    /// Edge-data records.
    EdgeData,
}

#[derive(Debug, Default)]
#[repr(align(64))]
struct Shard {
    out_index: AtomicU64,
    destination: AtomicU64,
    edge_data: AtomicU64,
}

impl Shard {
    fn counter(&self, category: ReadCategory) -> &AtomicU64 {
        match category {
            ReadCategory::OutIndex => &self.out_index,
            ReadCategory::Destination => &self.destination,
            ReadCategory::EdgeData => &self.edge_data,
        }
    }
}

/// Sharded per-category byte counters.
///
/// Individual shard values only grow between resets, so successive
/// snapshots taken by one thread never decrease.
#[derive(Debug)]
pub struct ReadCounters {
    shards: [Shard; SHARDS],
}

impl Default for ReadCounters {
    fn default() -> Self {
        Self {
            shards: std::array::from_fn(|_| Shard::default()),
        }
    }
}

impl ReadCounters {
    /// Creates zeroed counters.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `bytes` to `category` on the calling thread's shard.
    pub fn record(&self, category: ReadCategory, bytes: u64) {
        let shard = SHARD.with(|s| *s);
        self.shards[shard]
            .counter(category)
            .fetch_add(bytes, Ordering::Relaxed);
    }

    /// Returns the total for one category across all shards.
    pub fn total(&self, category: ReadCategory) -> u64 {
        self.shards
            .iter()
            .map(|s| s.counter(category).load(Ordering::Relaxed))
            .sum()
    }

    /// Reduces all shards into a snapshot.
    pub fn snapshot(&self) -> ReadCountsSnapshot {
        ReadCountsSnapshot {
            out_index_bytes: self.total(ReadCategory::OutIndex),
            destination_bytes: self.total(ReadCategory::Destination),
            edge_data_bytes: self.total(ReadCategory::EdgeData),
        }
    }

    /// Zeroes every counter.
    ///
    /// Takes `&mut self` so a reset cannot interleave with concurrent
    /// recording.
    pub fn reset(&mut self) {
        for shard in &mut self.shards {
            *shard = Shard::default();
        }
    }
}

/// A point-in-time reduction of [`ReadCounters`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ReadCountsSnapshot {
    /// Bytes of out-index entries read.
    pub out_index_bytes: u64,
    /// Bytes of destination entries read.
    pub destination_bytes: u64,
    /// Bytes of edge-data records read.
    pub edge_data_bytes: u64,
}

impl ReadCountsSnapshot {
    /// Returns the sum over all categories.
    #[must_use]
    pub fn total(&self) -> u64 {
        self.out_index_bytes + self.destination_bytes + self.edge_data_bytes
    }
}
