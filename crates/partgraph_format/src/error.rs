//! Error types for the format crate.

use thiserror::Error;

/// Result type for format operations.
pub type FormatResult<T> = Result<T, FormatError>;

/// Errors that can occur while encoding, decoding or validating a graph file.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FormatError {
    /// The header names a format version this crate does not read.
    #[error("unsupported graph format version {version} (only version 1 is supported)")]
    UnsupportedVersion {
        /// Version word found in the header.
        version: u64,
    },

    /// Input ended before a complete structure could be read.
    #[error("unexpected end of input: needed {needed} bytes, have {available}")]
    Truncated {
        /// Bytes required.
        needed: u64,
        /// Bytes available.
        available: u64,
    },

    /// The header's edge record size disagrees with the requested record type.
    #[error("edge data size mismatch: file has {actual}-byte records, expected {expected}")]
    EdgeSizeMismatch {
        /// Record size the reader expects.
        expected: u64,
        /// Record size the file declares.
        actual: u64,
    },

    /// The object size disagrees with the size implied by the header.
    #[error("graph size mismatch: layout requires {expected} bytes, object has {actual}")]
    SizeMismatch {
        /// Size implied by the layout.
        expected: u64,
        /// Actual size.
        actual: u64,
    },

    /// Node or edge counts overflow the addressable range.
    #[error("graph too large: {message}")]
    TooLarge {
        /// Which quantity overflowed.
        message: String,
    },

    /// The CSR arrays are inconsistent.
    #[error("invalid graph: {message}")]
    InvalidGraph {
        /// Description of the inconsistency.
        message: String,
    },
}

impl FormatError {
    /// Creates an invalid graph error.
    pub fn invalid_graph(message: impl Into<String>) -> Self {
        Self::InvalidGraph {
            message: message.into(),
        }
    }

    /// Creates a too-large error.
    pub fn too_large(message: impl Into<String>) -> Self {
        Self::TooLarge {
            message: message.into(),
        }
    }
}
