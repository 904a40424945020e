//! Benchmark utilities.

use partgraph_format::CsrGraph;
use partgraph_storage::{InMemoryBackend, StorageBackend};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::Arc;

/// Generate random payload bytes of the specified size.
pub fn random_data(size: usize) -> Vec<u8> {
    let mut rng = rand::thread_rng();
    (0..size).map(|_| rng.gen()).collect()
}

/// Generate a random weighted graph with a fixed seed.
///
/// Edge weights are `source * 1000 + destination` so results can be
/// checked without keeping the edge list around.
pub fn random_graph(nodes: u32, edges: usize, seed: u64) -> CsrGraph<u64> {
    let mut rng = StdRng::seed_from_u64(seed);
    let list: Vec<(u32, u32, u64)> = (0..edges)
        .map(|_| {
            let src = rng.gen_range(0..nodes);
            let dst = rng.gen_range(0..nodes);
            (src, dst, u64::from(src) * 1000 + u64::from(dst))
        })
        .collect();
    CsrGraph::from_edges(u64::from(nodes), list).expect("endpoints are in range")
}

/// Store `graph` under `name` in a fresh in-memory backend.
pub fn memory_graph(name: &str, graph: &CsrGraph<u64>) -> Arc<dyn StorageBackend> {
    let backend: Arc<dyn StorageBackend> = Arc::new(InMemoryBackend::new());
    backend
        .put(name, &graph.encode())
        .expect("in-memory put");
    backend
}
