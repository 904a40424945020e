//! In-memory storage backend for testing.

use crate::backend::{ObjectHandle, ObjectStat, StorageBackend};
use crate::error::{StorageError, StorageResult};
use bytes::Bytes;
use parking_lot::RwLock;
use std::collections::HashMap;

/// An in-memory storage backend.
///
/// Objects live in a map keyed by destination identifier. This backend is
/// suitable for:
/// - Unit tests
/// - Integration tests
/// - Simulating a remote object store that answers range reads in
///   bounded chunks (see [`InMemoryBackend::with_max_read_chunk`])
///
/// # Example
///
/// ```rust
/// use partgraph_storage::{StorageBackend, InMemoryBackend};
///
/// let backend = InMemoryBackend::new();
/// backend.put("graph.gr", b"test data").unwrap();
/// assert_eq!(backend.stat("graph.gr").unwrap().size, 9);
/// ```
#[derive(Debug, Default)]
pub struct InMemoryBackend {
    objects: RwLock<HashMap<String, Bytes>>,
    max_read_chunk: Option<usize>,
}

impl InMemoryBackend {
    /// Creates a new empty in-memory backend.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a backend whose handles return at most `chunk` bytes per read.
    ///
    /// Useful for exercising short-read handling.
    #[must_use]
    pub fn with_max_read_chunk(chunk: usize) -> Self {
        Self {
            objects: RwLock::new(HashMap::new()),
            max_read_chunk: Some(chunk.max(1)),
        }
    }

    /// Returns a copy of the object stored under `name`, if any.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<Bytes> {
        self.objects.read().get(name).cloned()
    }

    /// Returns the names of all stored objects, sorted.
    #[must_use]
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.objects.read().keys().cloned().collect();
        names.sort();
        names
    }

    /// Removes all objects.
    pub fn clear(&self) {
        self.objects.write().clear();
    }
}

impl StorageBackend for InMemoryBackend {
    fn open(&self, name: &str) -> StorageResult<Box<dyn ObjectHandle>> {
        let data = self.get(name).ok_or_else(|| StorageError::not_found(name))?;
        Ok(Box::new(MemoryHandle {
            data,
            max_read_chunk: self.max_read_chunk,
        }))
    }

    fn put(&self, name: &str, data: &[u8]) -> StorageResult<()> {
        if name.is_empty() {
            return Err(StorageError::invalid_destination(name, "empty name"));
        }
        self.objects
            .write()
            .insert(name.to_string(), Bytes::copy_from_slice(data));
        Ok(())
    }

    fn stat(&self, name: &str) -> StorageResult<ObjectStat> {
        self.objects
            .read()
            .get(name)
            .map(|data| ObjectStat {
                size: data.len() as u64,
            })
            .ok_or_else(|| StorageError::not_found(name))
    }

    fn exists(&self, name: &str) -> StorageResult<bool> {
        Ok(self.objects.read().contains_key(name))
    }

    fn remove(&self, name: &str) -> StorageResult<()> {
        self.objects
            .write()
            .remove(name)
            .map(|_| ())
            .ok_or_else(|| StorageError::not_found(name))
    }
}

/// Read handle over an immutable snapshot of an in-memory object.
#[derive(Debug)]
struct MemoryHandle {
    data: Bytes,
    max_read_chunk: Option<usize>,
}

impl ObjectHandle for MemoryHandle {
    fn size(&self) -> u64 {
        self.data.len() as u64
    }

    fn read_at(&self, offset: u64, dst: &mut [u8]) -> StorageResult<usize> {
        let Ok(start) = usize::try_from(offset) else {
            return Ok(0);
        };
        if start >= self.data.len() {
            return Ok(0);
        }

        let mut len = dst.len().min(self.data.len() - start);
        if let Some(chunk) = self.max_read_chunk {
            len = len.min(chunk);
        }
        dst[..len].copy_from_slice(&self.data[start..start + len]);
        Ok(len)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_new_is_empty() {
        let backend = InMemoryBackend::new();
        assert!(backend.names().is_empty());
        assert!(!backend.exists("a").unwrap());
    }

    #[test]
    fn memory_put_and_read() {
        let backend = InMemoryBackend::new();
        backend.put("a", b"hello world").unwrap();

        let handle = backend.open("a").unwrap();
        assert_eq!(handle.size(), 11);

        let mut buf = [0u8; 5];
        assert_eq!(handle.read_at(6, &mut buf).unwrap(), 5);
        assert_eq!(&buf, b"world");
    }

    #[test]
    fn memory_put_replaces() {
        let backend = InMemoryBackend::new();
        backend.put("a", b"first").unwrap();
        backend.put("a", b"second!").unwrap();
        assert_eq!(backend.stat("a").unwrap().size, 7);
        assert_eq!(backend.get("a").unwrap(), Bytes::from_static(b"second!"));
    }

    #[test]
    fn memory_open_missing_fails() {
        let backend = InMemoryBackend::new();
        let result = backend.open("missing");
        assert!(matches!(result, Err(StorageError::NotFound { .. })));
    }

    #[test]
    fn memory_read_at_end_returns_zero() {
        let backend = InMemoryBackend::new();
        backend.put("a", b"hello").unwrap();
        let handle = backend.open("a").unwrap();

        let mut buf = [0u8; 4];
        assert_eq!(handle.read_at(5, &mut buf).unwrap(), 0);
        assert_eq!(handle.read_at(100, &mut buf).unwrap(), 0);
    }

    #[test]
    fn memory_read_near_end_is_short() {
        let backend = InMemoryBackend::new();
        backend.put("a", b"hello").unwrap();
        let handle = backend.open("a").unwrap();

        let mut buf = [0u8; 4];
        assert_eq!(handle.read_at(3, &mut buf).unwrap(), 2);
        assert_eq!(&buf[..2], b"lo");
    }

    #[test]
    fn memory_max_read_chunk_limits_reads() {
        let backend = InMemoryBackend::with_max_read_chunk(3);
        backend.put("a", b"abcdefgh").unwrap();
        let handle = backend.open("a").unwrap();

        let mut buf = [0u8; 8];
        assert_eq!(handle.read_at(0, &mut buf).unwrap(), 3);
        assert_eq!(&buf[..3], b"abc");
    }

    #[test]
    fn memory_handle_is_a_snapshot() {
        let backend = InMemoryBackend::new();
        backend.put("a", b"old").unwrap();
        let handle = backend.open("a").unwrap();
        backend.put("a", b"newer").unwrap();
        assert_eq!(handle.size(), 3);
    }

    #[test]
    fn memory_remove() {
        let backend = InMemoryBackend::new();
        backend.put("a", b"x").unwrap();
        backend.remove("a").unwrap();
        assert!(!backend.exists("a").unwrap());
        assert!(backend.remove("a").is_err());
    }

    #[test]
    fn memory_empty_name_rejected() {
        let backend = InMemoryBackend::new();
        assert!(matches!(
            backend.put("", b"x"),
            Err(StorageError::InvalidDestination { .. })
        ));
    }
}
