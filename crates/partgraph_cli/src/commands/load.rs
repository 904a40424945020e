//! Load command implementation.

use super::{format_size, open_path};
use partgraph_core::{split_nodes, CoreError, PartialGraphLoader};
use partgraph_format::{EdgeRecord, NoEdgeData};
use partgraph_storage::StorageBackend;
use std::path::Path;
use std::sync::Arc;
use std::thread;
use std::time::Instant;
use tracing::info;

/// Totals gathered by walking a loaded range.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct WalkTotals {
    /// Nodes visited.
    pub nodes: u64,
    /// Edges visited.
    pub edges: u64,
    /// Largest out-degree seen.
    pub max_degree: u64,
}

impl WalkTotals {
    fn merge(self, other: Self) -> Self {
        Self {
            nodes: self.nodes + other.nodes,
            edges: self.edges + other.edges,
            max_degree: self.max_degree.max(other.max_degree),
        }
    }
}

/// Runs the load command.
pub fn run(
    path: &Path,
    start: u64,
    end: Option<u64>,
    threads: usize,
) -> Result<(), Box<dyn std::error::Error>> {
    let (backend, name) = open_path(path)?;
    let header = PartialGraphLoader::<NoEdgeData>::load_header(&backend, &name)?;
    let end = end.unwrap_or(header.num_nodes);

    match header.edge_data_size {
        4 => load_and_walk::<u32>(&backend, &name, start..end, threads),
        8 => load_and_walk::<u64>(&backend, &name, start..end, threads),
        _ => load_and_walk::<NoEdgeData>(&backend, &name, start..end, threads),
    }
}

fn load_and_walk<E: EdgeRecord>(
    backend: &Arc<dyn StorageBackend>,
    name: &str,
    nodes: std::ops::Range<u64>,
    threads: usize,
) -> Result<(), Box<dyn std::error::Error>> {
    let started = Instant::now();
    let mut loader = PartialGraphLoader::<E>::new();
    loader.load_nodes(backend, name, nodes)?;
    info!(
        nodes = ?loader.node_range(),
        edges = ?loader.edge_range(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "loaded"
    );

    let walked = Instant::now();
    let totals = walk(&loader, threads)?;
    let counts = loader.read_counts();

    println!("Loaded nodes {:?}, edges {:?}", loader.node_range(), loader.edge_range());
    println!();
    println!("Walk ({} threads):", threads.max(1));
    println!("  Nodes visited:  {}", totals.nodes);
    println!("  Edges visited:  {}", totals.edges);
    println!("  Max degree:     {}", totals.max_degree);
    println!("  Elapsed:        {:?}", walked.elapsed());
    println!();
    println!("Bytes read:");
    println!("  Out-index:      {}", format_size(counts.out_index_bytes));
    println!("  Destinations:   {}", format_size(counts.destination_bytes));
    println!("  Edge data:      {}", format_size(counts.edge_data_bytes));
    println!("  Total:          {}", format_size(loader.total_bytes_read()));
    Ok(())
}

/// Visits every loaded node and edge, splitting the node range across
/// `threads` scoped workers.
pub fn walk<E: EdgeRecord>(
    loader: &PartialGraphLoader<E>,
    threads: usize,
) -> Result<WalkTotals, CoreError> {
    let range = loader.node_range();
    let parts = split_nodes(range.end - range.start, threads.max(1));

    thread::scope(|scope| {
        let workers: Vec<_> = parts
            .into_iter()
            .map(|part| {
                let offset = range.start;
                scope.spawn(move || {
                    let mut totals = WalkTotals::default();
                    for node in part.start + offset..part.end + offset {
                        let edges = loader.edges(node)?;
                        totals.nodes += 1;
                        totals.edges += edges.end - edges.start;
                        totals.max_degree = totals.max_degree.max(edges.end - edges.start);
                        for edge in edges {
                            loader.edge_destination(edge)?;
                            if loader.has_edge_data() {
                                loader.edge_data(edge)?;
                            }
                        }
                    }
                    Ok::<_, CoreError>(totals)
                })
            })
            .collect();

        workers
            .into_iter()
            .try_fold(WalkTotals::default(), |acc, worker| {
                let totals = worker
                    .join()
                    .map_err(|_| CoreError::invalid_operation("walk worker panicked"))??;
                Ok(acc.merge(totals))
            })
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use partgraph_format::CsrGraph;
    use partgraph_storage::InMemoryBackend;

    #[test]
    fn walk_counts_every_edge_once() {
        let graph =
            CsrGraph::from_edges(5, [(0, 1, 1u32), (0, 2, 2), (1, 3, 3), (3, 4, 4), (4, 0, 5)])
                .unwrap();
        let backend: Arc<dyn StorageBackend> = Arc::new(InMemoryBackend::new());
        backend.put("g", &graph.encode()).unwrap();

        let mut loader = PartialGraphLoader::<u32>::new();
        loader.load_nodes(&backend, "g", 0..5).unwrap();

        let single = walk(&loader, 1).unwrap();
        let parallel = walk(&loader, 3).unwrap();
        assert_eq!(single.edges, 5);
        assert_eq!(single.nodes, 5);
        assert_eq!(single.max_degree, 2);
        assert_eq!(single, parallel);
    }
}
