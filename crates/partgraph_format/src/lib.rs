//! # PartGraph Format
//!
//! The version-1 compressed-sparse-row (CSR) binary graph layout.
//!
//! This crate knows the byte layout of a graph file and nothing about where
//! the bytes live. Readers that load only part of a file use
//! [`GraphLayout`] to compute region offsets; writers build a [`CsrGraph`]
//! and encode it.
//!
//! ## Layout
//!
//! ```text
//! | header (4 x u64) | out_index (u64 x N) | dests (u32 x E) | pad | data (S x E) |
//! ```
//!
//! - Header words: version (1), edge record size, node count, edge count
//! - `out_index[i]` is one past the last edge id of node `i`
//! - The 4-byte pad exists only with edge data and an odd edge count
//! - Everything is little-endian
//!
//! ## Usage
//!
//! ```
//! use partgraph_format::{CsrGraph, GraphHeader};
//!
//! let graph = CsrGraph::from_edges(3, [(0, 1, 7u32), (0, 2, 8), (1, 2, 9)]).unwrap();
//! let bytes = graph.encode();
//!
//! let header = GraphHeader::decode(&bytes).unwrap();
//! assert_eq!(header.num_nodes, 3);
//! assert_eq!(header.edge_data_size, 4);
//! assert_eq!(CsrGraph::<u32>::decode(&bytes).unwrap(), graph);
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod csr;
mod error;
mod header;
mod record;

pub use csr::CsrGraph;
pub use error::{FormatError, FormatResult};
pub use header::{
    GraphHeader, GraphLayout, DEST_ENTRY_SIZE, GRAPH_FORMAT_VERSION, HEADER_SIZE,
    OUT_INDEX_ENTRY_SIZE,
};
pub use record::{EdgeRecord, NoEdgeData};
