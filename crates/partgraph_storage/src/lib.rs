//! # PartGraph Storage
//!
//! Durable storage abstraction for PartGraph.
//!
//! This crate provides the lowest-level storage layer: named, immutable
//! byte objects addressed by opaque destination identifiers. Backends do
//! not interpret the data they store.
//!
//! ## Design Principles
//!
//! - Backends are simple object stores (open, put, stat)
//! - No knowledge of graph file formats or partition metadata
//! - Must be `Send + Sync` for concurrent access
//! - Reads may be short; callers that need exact counts retry
//!
//! ## Available Backends
//!
//! - [`InMemoryBackend`] - For testing and simulating remote stores
//! - [`FileBackend`] - For objects in a local directory tree
//!
//! ## Producer and consumer sides
//!
//! - [`WriteFrame`] buffers bytes, binds a destination, persists atomically
//! - [`ReadView`] binds an existing object and reads it through a cursor
//!
//! ## Example
//!
//! ```rust
//! use partgraph_storage::{InMemoryBackend, ReadView, WriteFrame};
//! use std::sync::Arc;
//!
//! let backend = Arc::new(InMemoryBackend::new());
//!
//! let mut frame = WriteFrame::new(backend.clone());
//! frame.init().unwrap();
//! frame.write(b"hello world").unwrap();
//! frame.bind("greeting").unwrap();
//! frame.persist().unwrap();
//!
//! let mut view = ReadView::new(backend);
//! view.bind("greeting").unwrap();
//! assert_eq!(&view.read(11).unwrap()[..], b"hello world");
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod backend;
mod error;
mod file;
mod frame;
mod memory;
mod view;

pub use backend::{ObjectHandle, ObjectStat, StorageBackend};
pub use error::{StorageError, StorageResult};
pub use file::FileBackend;
pub use frame::{FrameState, WriteFrame, DEFAULT_FRAME_RESERVE};
pub use memory::InMemoryBackend;
pub use view::ReadView;
