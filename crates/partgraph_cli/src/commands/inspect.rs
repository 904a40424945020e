//! Inspect command implementation.

use super::{format_size, open_path};
use partgraph_core::PartialGraphLoader;
use serde::Serialize;
use std::path::Path;

/// Graph file inspection result.
#[derive(Debug, Serialize)]
pub struct InspectResult {
    /// Graph file path.
    pub path: String,
    /// Format version.
    pub version: u64,
    /// Number of nodes.
    pub num_nodes: u64,
    /// Number of edges.
    pub num_edges: u64,
    /// Edge-data record size in bytes (0 for none).
    pub edge_data_size: u64,
    /// Actual file size in bytes.
    pub file_size: u64,
    /// File size implied by the header.
    pub expected_size: u64,
    /// Region offsets.
    pub regions: Regions,
}

/// Byte offsets of the file regions.
#[derive(Debug, Serialize)]
pub struct Regions {
    /// Start of the out-index.
    pub out_index: u64,
    /// Start of the destinations.
    pub destinations: u64,
    /// Alignment pad before edge data.
    pub padding: u64,
    /// Start of the edge data.
    pub edge_data: u64,
}

/// Runs the inspect command.
pub fn run(path: &Path, format: &str) -> Result<(), Box<dyn std::error::Error>> {
    let (backend, name) = open_path(path)?;
    let header = PartialGraphLoader::<partgraph_format::NoEdgeData>::load_header(&backend, &name)?;
    let layout = header.layout();

    let result = InspectResult {
        path: path.display().to_string(),
        version: header.version,
        num_nodes: header.num_nodes,
        num_edges: header.num_edges,
        edge_data_size: header.edge_data_size,
        file_size: backend.stat(&name)?.size,
        expected_size: layout.checked_total_size()?,
        regions: Regions {
            out_index: layout.out_index_offset(0),
            destinations: layout.dest_offset(0),
            padding: layout.padding(),
            edge_data: layout.edge_data_offset(0),
        },
    };

    match format {
        "json" => {
            println!("{}", serde_json::to_string_pretty(&result)?);
        }
        _ => {
            print_text_output(&result);
        }
    }

    Ok(())
}

fn print_text_output(result: &InspectResult) {
    println!("PartGraph File Inspection");
    println!("=========================");
    println!();
    println!("Path: {}", result.path);
    println!();
    println!("Header:");
    println!("  Version:        {}", result.version);
    println!("  Nodes:          {}", result.num_nodes);
    println!("  Edges:          {}", result.num_edges);
    if result.edge_data_size == 0 {
        println!("  Edge data:      none");
    } else {
        println!("  Edge data:      {} bytes/edge", result.edge_data_size);
    }
    println!();
    println!("Layout:");
    println!("  Out-index at:   {}", result.regions.out_index);
    println!("  Destinations at: {}", result.regions.destinations);
    if result.edge_data_size > 0 {
        println!("  Padding:        {}", result.regions.padding);
        println!("  Edge data at:   {}", result.regions.edge_data);
    }
    println!();
    println!("Size:");
    println!("  File:           {} bytes", format_size(result.file_size));
    println!("  Expected:       {} bytes", format_size(result.expected_size));
    if result.file_size != result.expected_size {
        println!();
        println!("⚠ File size does not match the header");
    }
}
