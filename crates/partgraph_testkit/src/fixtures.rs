//! Test fixtures and storage helpers.
//!
//! Provides temporary stores, sample graphs and random payloads for
//! exercising the storage, format and loader crates together.

use partgraph_format::{CsrGraph, EdgeRecord};
use partgraph_storage::{FileBackend, InMemoryBackend, StorageBackend};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;

/// A file-backed store in a temporary directory with automatic cleanup.
pub struct TestStore {
    /// The backend rooted at the temporary directory.
    pub backend: Arc<dyn StorageBackend>,
    _temp_dir: TempDir,
}

impl TestStore {
    /// Creates a store in a fresh temporary directory.
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        Self {
            backend: Arc::new(FileBackend::new(temp_dir.path())),
            _temp_dir: temp_dir,
        }
    }

    /// Returns the directory backing this store.
    pub fn path(&self) -> &Path {
        self._temp_dir.path()
    }

    /// Returns a new handle to the backend.
    pub fn backend(&self) -> Arc<dyn StorageBackend> {
        Arc::clone(&self.backend)
    }
}

impl Default for TestStore {
    fn default() -> Self {
        Self::new()
    }
}

/// Returns an empty in-memory backend.
pub fn memory_backend() -> Arc<dyn StorageBackend> {
    Arc::new(InMemoryBackend::new())
}

/// Returns an in-memory backend that serves at most `chunk` bytes per
/// read, like a remote object store.
pub fn short_read_backend(chunk: usize) -> Arc<dyn StorageBackend> {
    Arc::new(InMemoryBackend::with_max_read_chunk(chunk))
}

/// Encodes `graph` and stores it as `name`.
pub fn store_graph<E: EdgeRecord>(
    backend: &Arc<dyn StorageBackend>,
    name: &str,
    graph: &CsrGraph<E>,
) {
    backend
        .put(name, &graph.encode())
        .expect("Failed to store graph");
}

/// Returns `len` random bytes from a seeded generator.
pub fn random_bytes(len: usize, seed: u64) -> Vec<u8> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut bytes = vec![0u8; len];
    rng.fill(&mut bytes[..]);
    bytes
}

/// Sample graphs.
pub mod graphs {
    use super::*;

    /// Three nodes, four edges, out-index `[2, 3, 4]`, 4-byte records
    /// `100..=103`.
    pub fn small_weighted() -> CsrGraph<u32> {
        CsrGraph::from_edges(3, [(0, 1, 100), (0, 2, 101), (1, 2, 102), (2, 0, 103)])
            .expect("valid graph")
    }

    /// A directed cycle over `n` nodes.
    pub fn cycle(n: u32) -> CsrGraph {
        CsrGraph::from_pairs(u64::from(n), (0..n).map(|i| (i, (i + 1) % n))).expect("valid graph")
    }

    /// A star whose hub (node 0) points at every other node.
    pub fn star(n: u32) -> CsrGraph {
        CsrGraph::from_pairs(u64::from(n), (1..n).map(|i| (0, i))).expect("valid graph")
    }

    /// A seeded random graph with `u64` edge data equal to the edge's
    /// source times 1000 plus its destination.
    pub fn random(nodes: u32, edges: usize, seed: u64) -> CsrGraph<u64> {
        let mut rng = StdRng::seed_from_u64(seed);
        let list: Vec<(u32, u32, u64)> = (0..edges)
            .map(|_| {
                let src = rng.gen_range(0..nodes);
                let dst = rng.gen_range(0..nodes);
                (src, dst, u64::from(src) * 1000 + u64::from(dst))
            })
            .collect();
        CsrGraph::from_edges(u64::from(nodes), list).expect("valid graph")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_round_trips_objects() {
        let store = TestStore::new();
        store.backend.put("obj", b"abc").unwrap();
        assert!(store.path().join("obj").exists());
        assert_eq!(store.backend().stat("obj").unwrap().size, 3);
    }

    #[test]
    fn random_bytes_are_seeded() {
        assert_eq!(random_bytes(64, 7), random_bytes(64, 7));
        assert_ne!(random_bytes(64, 7), random_bytes(64, 8));
    }

    #[test]
    fn sample_graphs_have_expected_shape() {
        assert_eq!(graphs::small_weighted().out_index(), &[2, 3, 4]);
        assert_eq!(graphs::cycle(5).num_edges(), 5);
        assert_eq!(graphs::star(4).neighbors(0).unwrap(), &[1, 2, 3]);
        assert_eq!(graphs::random(10, 50, 1).num_edges(), 50);
    }
}
