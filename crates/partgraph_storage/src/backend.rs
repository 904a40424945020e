//! Storage backend trait definitions.

use crate::error::StorageResult;
use std::fmt;

/// Metadata about a stored object.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ObjectStat {
    /// Size of the object in bytes.
    pub size: u64,
}

/// A durable store of named, immutable byte objects.
///
/// Backends are **opaque byte stores**. Destination identifiers are opaque
/// strings; a backend may resolve them to local paths, keys in a remote
/// bucket, or entries in a map. Backends do not interpret the bytes.
///
/// # Invariants
///
/// - `put` replaces the object atomically: readers observe either the old
///   contents or the new contents, never a mix
/// - `open` fails with [`crate::StorageError::NotFound`] for missing objects
/// - Backends must be `Send + Sync` so handles can be shared across threads
///
/// # Implementors
///
/// - [`super::InMemoryBackend`] - For testing and simulating remote stores
/// - [`super::FileBackend`] - For objects in a local directory tree
pub trait StorageBackend: Send + Sync + fmt::Debug {
    /// Opens an existing object for positioned reads.
    ///
    /// # Errors
    ///
    /// Returns an error if the object does not exist or cannot be opened.
    fn open(&self, name: &str) -> StorageResult<Box<dyn ObjectHandle>>;

    /// Atomically stores `data` under `name`, replacing any previous object.
    ///
    /// # Errors
    ///
    /// Returns an error if the destination is invalid or an I/O error occurs.
    fn put(&self, name: &str, data: &[u8]) -> StorageResult<()>;

    /// Returns metadata for an existing object.
    ///
    /// # Errors
    ///
    /// Returns an error if the object does not exist.
    fn stat(&self, name: &str) -> StorageResult<ObjectStat>;

    /// Returns true if an object exists under `name`.
    ///
    /// # Errors
    ///
    /// Returns an error if existence cannot be determined.
    fn exists(&self, name: &str) -> StorageResult<bool>;

    /// Removes the object stored under `name`.
    ///
    /// # Errors
    ///
    /// Returns an error if the object does not exist.
    fn remove(&self, name: &str) -> StorageResult<()>;
}

/// An open object supporting positioned reads.
///
/// A single read may return fewer bytes than requested even before the
/// end of the object (remote stores deliver data in chunks). Callers that
/// need an exact count loop until it is consumed.
pub trait ObjectHandle: Send + Sync + fmt::Debug {
    /// Returns the size of the object in bytes.
    fn size(&self) -> u64;

    /// Reads up to `dst.len()` bytes starting at `offset`.
    ///
    /// Returns the number of bytes read. Zero means `offset` is at or past
    /// the end of the object, or `dst` is empty.
    ///
    /// # Errors
    ///
    /// Returns an error if an I/O error occurs.
    fn read_at(&self, offset: u64, dst: &mut [u8]) -> StorageResult<usize>;
}
