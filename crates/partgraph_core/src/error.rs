//! Error types for PartGraph core.

use partgraph_storage::StorageError;
use thiserror::Error;

/// Result type for core operations.
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors that can occur in PartGraph core operations.
///
/// Errors fall in two classes. [`CoreError::is_unrecoverable`] is true for
/// misuse or environment failures after which the object involved must not
/// be used further (double load, unreadable source, out-of-range ids); the
/// embedding application decides whether to abort. Everything else is an
/// ordinary failure the caller is expected to inspect and handle.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Storage backend error.
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    /// Graph format error.
    #[error("format error: {0}")]
    Format(#[from] partgraph_format::FormatError),

    /// Metadata (de)serialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A loader was asked to load a second time.
    #[error("cannot load a partial graph more than once")]
    AlreadyLoaded,

    /// A loader accessor was called before `load`.
    #[error("partial graph has not been loaded")]
    NotLoaded,

    /// The graph source could not be opened.
    #[error("failed to open graph source {name}: {error}")]
    SourceOpen {
        /// The source identifier.
        name: String,
        /// The underlying storage failure.
        #[source]
        error: StorageError,
    },

    /// A region of the graph source could not be read completely.
    #[error("failed to read {region} region: {error}")]
    LoadFailed {
        /// Which region was being read.
        region: &'static str,
        /// The underlying storage failure.
        #[source]
        error: StorageError,
    },

    /// A load buffer could not be allocated.
    #[error("failed to allocate {bytes} bytes for {region} buffer")]
    Allocation {
        /// Which buffer was being allocated.
        region: &'static str,
        /// Bytes requested.
        bytes: u64,
    },

    /// The requested node/edge ranges are malformed or exceed the graph.
    #[error("invalid load range: {message}")]
    InvalidRange {
        /// Description of the problem.
        message: String,
    },

    /// The file header disagrees with the load request.
    #[error("graph header mismatch: {message}")]
    HeaderMismatch {
        /// Description of the mismatch.
        message: String,
    },

    /// A global node id outside the loaded node range was queried.
    #[error("node {node} outside loaded range {start}..{end}")]
    NodeOutOfRange {
        /// The queried global node id.
        node: u64,
        /// First loaded node.
        start: u64,
        /// One past the last loaded node.
        end: u64,
    },

    /// A global edge id outside the loaded edge range was queried.
    #[error("edge {edge} outside loaded range {start}..{end}")]
    EdgeOutOfRange {
        /// The queried global edge id.
        edge: u64,
        /// First loaded edge.
        start: u64,
        /// One past the last loaded edge.
        end: u64,
    },

    /// An incoming property table has the wrong number of rows.
    #[error("{table} table expected {expected} rows, found {actual}")]
    RowCountMismatch {
        /// Which table was being extended.
        table: &'static str,
        /// Rows in the existing table.
        expected: u64,
        /// Rows in the incoming table.
        actual: u64,
    },

    /// A property column index is out of range.
    #[error("{table} table has {columns} columns, no column {index}")]
    ColumnOutOfRange {
        /// Which table was addressed.
        table: &'static str,
        /// The requested column.
        index: usize,
        /// Number of columns in the table.
        columns: usize,
    },

    /// Persisted metadata is malformed or from an unsupported version.
    #[error("invalid partition format: {message}")]
    InvalidFormat {
        /// Description of the format issue.
        message: String,
    },

    /// Operation not permitted in current state.
    #[error("invalid operation: {message}")]
    InvalidOperation {
        /// Description of why operation is invalid.
        message: String,
    },
}

impl CoreError {
    /// Creates an invalid range error.
    pub fn invalid_range(message: impl Into<String>) -> Self {
        Self::InvalidRange {
            message: message.into(),
        }
    }

    /// Creates a header mismatch error.
    pub fn header_mismatch(message: impl Into<String>) -> Self {
        Self::HeaderMismatch {
            message: message.into(),
        }
    }

    /// Creates an invalid format error.
    pub fn invalid_format(message: impl Into<String>) -> Self {
        Self::InvalidFormat {
            message: message.into(),
        }
    }

    /// Creates an invalid operation error.
    pub fn invalid_operation(message: impl Into<String>) -> Self {
        Self::InvalidOperation {
            message: message.into(),
        }
    }

    /// Returns true if the error reports misuse or an environment failure
    /// that leaves the object involved unusable.
    #[must_use]
    pub fn is_unrecoverable(&self) -> bool {
        match self {
            Self::AlreadyLoaded
            | Self::NotLoaded
            | Self::SourceOpen { .. }
            | Self::LoadFailed { .. }
            | Self::Allocation { .. }
            | Self::NodeOutOfRange { .. }
            | Self::EdgeOutOfRange { .. } => true,
            Self::Storage(e) => e.is_unrecoverable(),
            _ => false,
        }
    }
}
