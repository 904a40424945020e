//! Error types for storage operations.

use std::io;
use thiserror::Error;

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Errors that can occur during storage operations.
#[derive(Debug, Error)]
pub enum StorageError {
    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The named object does not exist.
    #[error("object not found: {name}")]
    NotFound {
        /// The destination identifier that was looked up.
        name: String,
    },

    /// The destination identifier cannot be resolved by this backend.
    #[error("invalid destination {name:?}: {reason}")]
    InvalidDestination {
        /// The rejected destination identifier.
        name: String,
        /// Why it was rejected.
        reason: String,
    },

    /// Attempted to position beyond the end of an object.
    #[error("seek beyond end of object: offset {offset}, size {size}")]
    SeekPastEnd {
        /// The requested position.
        offset: u64,
        /// The size of the bound object.
        size: u64,
    },

    /// A persist was requested before any destination was bound.
    #[error("write frame has no destination bound")]
    PersistWithoutDestination,

    /// The frame already persisted its contents to the bound destination.
    #[error("write frame already persisted to {name}")]
    AlreadyPersisted {
        /// The destination the frame was persisted to.
        name: String,
    },

    /// A frame was written to before `init`.
    #[error("write frame is not initialized")]
    NotInitialized,

    /// A read view was used before being bound to an object.
    #[error("read view is not bound (during {operation})")]
    NotBound {
        /// The operation that was attempted.
        operation: &'static str,
    },

    /// The frame or view is closed.
    #[error("storage object is closed")]
    Closed,

    /// A buffer could not be allocated.
    #[error("failed to allocate {requested} bytes")]
    Allocation {
        /// Number of bytes requested.
        requested: usize,
    },
}

impl StorageError {
    /// Creates a not-found error.
    pub fn not_found(name: impl Into<String>) -> Self {
        Self::NotFound { name: name.into() }
    }

    /// Creates an invalid destination error.
    pub fn invalid_destination(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidDestination {
            name: name.into(),
            reason: reason.into(),
        }
    }

    /// Returns true for misuse of a frame or view that the caller cannot
    /// repair locally: the object state is undefined for further use.
    ///
    /// Missing destinations, persist-before-bind and double persists are
    /// ordinary failures the caller is expected to inspect.
    #[must_use]
    pub fn is_unrecoverable(&self) -> bool {
        matches!(
            self,
            Self::NotInitialized | Self::NotBound { .. } | Self::Closed | Self::Allocation { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classification() {
        assert!(StorageError::Closed.is_unrecoverable());
        assert!(StorageError::NotBound { operation: "read" }.is_unrecoverable());
        assert!(StorageError::NotInitialized.is_unrecoverable());
        assert!(!StorageError::PersistWithoutDestination.is_unrecoverable());
        assert!(!StorageError::not_found("x").is_unrecoverable());
    }

    #[test]
    fn display_names_object() {
        let err = StorageError::not_found("graphs/part-0");
        assert_eq!(err.to_string(), "object not found: graphs/part-0");
    }
}
