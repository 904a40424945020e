//! Verify command implementation.

use super::open_path;
use partgraph_core::{LoadRequest, PartialGraphLoader};
use partgraph_format::NoEdgeData;
use partgraph_storage::StorageBackend;
use std::path::Path;
use std::sync::Arc;

/// Verification result.
#[derive(Debug, Default)]
pub struct VerifyResult {
    /// Number of nodes checked.
    pub nodes_checked: u64,
    /// Number of edges checked.
    pub edges_checked: u64,
    /// List of errors found.
    pub errors: Vec<String>,
}

impl VerifyResult {
    /// Returns true if no problem was found.
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Runs the verify command.
pub fn run(path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    println!("Verifying graph at {}", path.display());
    println!();

    let (backend, name) = open_path(path)?;
    let result = verify_graph(&backend, &name)?;

    println!("  Nodes checked: {}", result.nodes_checked);
    println!("  Edges checked: {}", result.edges_checked);
    for error in result.errors.iter().take(20) {
        println!("  ✗ {error}");
    }
    if result.errors.len() > 20 {
        println!("  ... and {} more", result.errors.len() - 20);
    }

    println!();
    if result.is_ok() {
        println!("✓ Graph verification passed");
        Ok(())
    } else {
        println!("✗ Graph verification failed");
        Err("Verification failed".into())
    }
}

/// Checks that the file size matches the header, the out-index is
/// non-decreasing and ends at the edge count, and every destination is a
/// valid node id.
pub fn verify_graph(
    backend: &Arc<dyn StorageBackend>,
    name: &str,
) -> Result<VerifyResult, Box<dyn std::error::Error>> {
    let mut result = VerifyResult::default();
    let header = PartialGraphLoader::<NoEdgeData>::load_header(backend, name)?;

    let expected = header.layout().checked_total_size()?;
    let actual = backend.stat(name)?.size;
    if actual != expected {
        result.errors.push(format!(
            "file is {actual} bytes, header implies {expected}"
        ));
        return Ok(result);
    }

    let mut loader = PartialGraphLoader::<NoEdgeData>::new();
    loader.load(backend, name, &LoadRequest::whole(&header))?;

    let mut previous = 0;
    for node in 0..header.num_nodes {
        let end = loader.edge_end(node)?;
        if end < previous {
            result
                .errors
                .push(format!("node {node}: out-index {end} below previous {previous}"));
        } else if end > header.num_edges {
            result
                .errors
                .push(format!("node {node}: out-index {end} past edge count"));
        }
        previous = previous.max(end);
        result.nodes_checked += 1;
    }
    if header.num_nodes > 0 && previous != header.num_edges {
        result.errors.push(format!(
            "out-index ends at {previous}, header has {} edges",
            header.num_edges
        ));
    }

    for (edge, &dst) in loader.destinations().iter().enumerate() {
        if u64::from(dst) >= header.num_nodes {
            result
                .errors
                .push(format!("edge {edge}: destination {dst} is not a node"));
        }
        result.edges_checked += 1;
    }

    Ok(result)
}
