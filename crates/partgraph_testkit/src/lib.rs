//! # PartGraph Testkit
//!
//! Test utilities for PartGraph.
//!
//! This crate provides:
//! - Temporary stores, sample graphs and random payloads
//! - Property-based test generators using proptest
//! - Concurrent reader stress helpers
//!
//! Cross-crate integration tests live in this crate's `tests/` directory.
//!
//! ## Usage
//!
//! ```rust
//! use partgraph_core::{LoadRequest, PartialGraphLoader};
//! use partgraph_testkit::prelude::*;
//!
//! let store = TestStore::new();
//! let graph = graphs::small_weighted();
//! store_graph(&store.backend, "g", &graph);
//!
//! let mut loader = PartialGraphLoader::<u32>::new();
//! loader.load(&store.backend, "g", &LoadRequest::whole(&graph.header())).unwrap();
//! assert_eq!(loader.edges(0).unwrap(), 0..2);
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod fixtures;
pub mod generators;
pub mod stress;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::fixtures::*;
    pub use crate::generators::*;
    pub use crate::stress::*;
}

pub use fixtures::*;
pub use generators::*;
pub use stress::*;
