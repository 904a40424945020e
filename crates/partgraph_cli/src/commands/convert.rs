//! Convert command implementation.

use super::{format_size, open_path};
use partgraph_core::{persist_graph, Config};
use partgraph_format::{CsrGraph, EdgeRecord, NoEdgeData};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use tracing::info;

/// Runs the convert command.
pub fn run(
    input: &Path,
    output: &Path,
    weighted: bool,
    nodes: Option<u64>,
) -> Result<(), Box<dyn std::error::Error>> {
    let reader = BufReader::new(File::open(input)?);
    let edges = parse_edge_list(reader, weighted)?;
    info!(edges = edges.len(), input = %input.display(), "parsed edge list");

    let num_nodes = match nodes {
        Some(n) => n,
        None => edges
            .iter()
            .map(|&(src, dst, _)| u64::from(src.max(dst)) + 1)
            .max()
            .unwrap_or(0),
    };

    let written = if weighted {
        write_graph(output, CsrGraph::from_edges(num_nodes, edges)?)?
    } else {
        let pairs = edges.into_iter().map(|(src, dst, _)| (src, dst, NoEdgeData));
        write_graph(output, CsrGraph::from_edges(num_nodes, pairs)?)?
    };

    println!(
        "Wrote {} ({} nodes, {})",
        output.display(),
        num_nodes,
        format_size(written)
    );
    Ok(())
}

fn write_graph<E: EdgeRecord>(
    output: &Path,
    graph: CsrGraph<E>,
) -> Result<u64, Box<dyn std::error::Error>> {
    let (backend, name) = open_path(output)?;
    Ok(persist_graph(backend, &name, &graph, &Config::default())?)
}

/// Parses `src dst [weight]` lines. Blank lines and `#` comments are
/// skipped; the weight defaults to zero and is required when `weighted`.
pub fn parse_edge_list(
    reader: impl BufRead,
    weighted: bool,
) -> Result<Vec<(u32, u32, u32)>, Box<dyn std::error::Error>> {
    let mut edges = Vec::new();
    for (number, line) in reader.lines().enumerate() {
        let line = line?;
        let line = line.split('#').next().unwrap_or("").trim();
        if line.is_empty() {
            continue;
        }

        let mut fields = line.split_whitespace();
        let mut field = |what: &str| -> Result<Option<u32>, Box<dyn std::error::Error>> {
            fields
                .next()
                .map(|f| {
                    f.parse::<u32>()
                        .map_err(|e| format!("line {}: bad {what} {f:?}: {e}", number + 1).into())
                })
                .transpose()
        };

        let src = field("source")?.ok_or_else(|| format!("line {}: missing source", number + 1))?;
        let dst =
            field("destination")?.ok_or_else(|| format!("line {}: missing destination", number + 1))?;
        let weight = match field("weight")? {
            Some(w) => w,
            None if weighted => return Err(format!("line {}: missing weight", number + 1).into()),
            None => 0,
        };
        edges.push((src, dst, weight));
    }
    Ok(edges)
}
