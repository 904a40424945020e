//! # PartGraph Core
//!
//! Partial graph loading and partition containers.
//!
//! This crate provides:
//! - [`PartialGraphLoader`] for loading a node/edge slice of a CSR graph file
//! - Sharded byte counters observed by concurrent readers
//! - [`PartitionContainer`] bundling property tables, topology and metadata
//! - [`persist_graph`] for writing graphs through a write frame
//!
//! Errors report [`CoreError::is_unrecoverable`] for misuse and environment
//! failures; the embedding application decides how to react.

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod error;
mod loader;
mod part_header;
mod partition;
mod persist;
mod stats;
mod table;

pub use config::Config;
pub use error::{CoreError, CoreResult};
pub use loader::{split_nodes, LoadRequest, PartialGraphLoader};
pub use part_header::{PartHeader, PART_HEADER_VERSION};
pub use partition::PartitionContainer;
pub use persist::persist_graph;
pub use stats::{ReadCategory, ReadCounters, ReadCountsSnapshot};
pub use table::{Column, ColumnData, PropertyTable};
