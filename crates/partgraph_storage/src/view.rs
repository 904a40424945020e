//! Seekable read views over stored objects.

use crate::backend::{ObjectHandle, StorageBackend};
use crate::error::{StorageError, StorageResult};
use bytes::Bytes;
use std::fmt;
use std::io;
use std::sync::Arc;

/// A seekable, cursor-based reader bound to one stored object.
///
/// Binding is separate from reading so one view can front either a local
/// file or a lazily fetched remote object, and so many range reads reuse a
/// single open handle.
///
/// Cursor-moving operations take `&mut self`; to read one object from many
/// threads, use [`read_exact_at`](Self::read_exact_at) (which ignores the
/// cursor) or one view per thread.
///
/// # Example
///
/// ```rust
/// use partgraph_storage::{InMemoryBackend, ReadView, StorageBackend};
/// use std::sync::Arc;
///
/// let backend = Arc::new(InMemoryBackend::new());
/// backend.put("obj", b"hello world").unwrap();
///
/// let mut view = ReadView::new(backend);
/// view.bind("obj").unwrap();
/// view.seek(6).unwrap();
/// assert_eq!(&view.read(100).unwrap()[..], b"world");
/// assert_eq!(view.tell().unwrap(), 11);
/// ```
pub struct ReadView {
    backend: Arc<dyn StorageBackend>,
    bound: Option<BoundObject>,
    cursor: u64,
    closed: bool,
}

struct BoundObject {
    name: String,
    handle: Box<dyn ObjectHandle>,
}

impl ReadView {
    /// Creates an unbound view reading from `backend`.
    pub fn new(backend: Arc<dyn StorageBackend>) -> Self {
        Self {
            backend,
            bound: None,
            cursor: 0,
            closed: false,
        }
    }

    /// Returns the backend this view reads from.
    #[must_use]
    pub fn backend(&self) -> &Arc<dyn StorageBackend> {
        &self.backend
    }

    /// Opens `destination` for reading and resets the cursor to zero.
    ///
    /// On failure the view is left exactly as it was before the call.
    ///
    /// # Errors
    ///
    /// Returns an error if the view is closed or the object does not exist.
    pub fn bind(&mut self, destination: &str) -> StorageResult<()> {
        if self.closed {
            return Err(StorageError::Closed);
        }
        let handle = self.backend.open(destination)?;
        self.bound = Some(BoundObject {
            name: destination.to_string(),
            handle,
        });
        self.cursor = 0;
        Ok(())
    }

    /// Drops the current binding, if any. The next read must rebind.
    pub fn unbind(&mut self) {
        self.bound = None;
        self.cursor = 0;
    }

    /// Returns true if the view is bound to an object.
    #[must_use]
    pub fn is_bound(&self) -> bool {
        self.bound.is_some()
    }

    /// Returns the bound destination identifier, if any.
    #[must_use]
    pub fn destination(&self) -> Option<&str> {
        self.bound.as_ref().map(|b| b.name.as_str())
    }

    /// Returns the size of the bound object.
    ///
    /// # Errors
    ///
    /// Returns an error if the view is unbound or closed.
    pub fn size(&self) -> StorageResult<u64> {
        Ok(self.handle("size")?.size())
    }

    /// Reads up to `n` bytes from the cursor and advances it by the number
    /// of bytes returned. Fewer than `n` bytes come back only at the end of
    /// the object.
    ///
    /// # Errors
    ///
    /// Returns an error if the view is unbound or closed, allocation fails,
    /// or the backend read fails.
    pub fn read(&mut self, n: usize) -> StorageResult<Bytes> {
        let handle = self.handle("read")?;
        let available = handle.size().saturating_sub(self.cursor);
        let len = usize::try_from(available).map_or(n, |a| a.min(n));

        let mut buf = Vec::new();
        buf.try_reserve_exact(len)
            .map_err(|_| StorageError::Allocation { requested: len })?;
        buf.resize(len, 0);

        let filled = fill_at(handle, self.cursor, &mut buf)?;
        buf.truncate(filled);
        self.cursor += filled as u64;
        Ok(Bytes::from(buf))
    }

    /// Reads up to `dst.len()` bytes from the cursor into `dst`.
    ///
    /// Same semantics as [`read`](Self::read) with a caller-supplied buffer.
    /// Returns the number of bytes written into `dst`.
    ///
    /// # Errors
    ///
    /// Returns an error if the view is unbound or closed, or the backend
    /// read fails.
    pub fn read_into(&mut self, dst: &mut [u8]) -> StorageResult<usize> {
        let handle = self.handle("read")?;
        let filled = fill_at(handle, self.cursor, dst)?;
        self.cursor += filled as u64;
        Ok(filled)
    }

    /// Fills `dst` from the absolute position `offset` without moving the
    /// cursor, retrying short reads until the exact count is consumed.
    ///
    /// # Errors
    ///
    /// Returns an `UnexpectedEof` I/O error if the object ends first, or an
    /// error if the view is unbound or closed.
    pub fn read_exact_at(&self, offset: u64, dst: &mut [u8]) -> StorageResult<()> {
        let handle = self.handle("read")?;
        let filled = fill_at(handle, offset, dst)?;
        if filled < dst.len() {
            return Err(StorageError::Io(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                format!(
                    "object ended after {filled} of {} bytes at offset {offset}",
                    dst.len()
                ),
            )));
        }
        Ok(())
    }

    /// Moves the cursor to the absolute position `offset`.
    ///
    /// # Errors
    ///
    /// Returns an error if the view is unbound or closed, or `offset` is
    /// past the end of the object.
    pub fn seek(&mut self, offset: u64) -> StorageResult<()> {
        let size = self.handle("seek")?.size();
        if offset > size {
            return Err(StorageError::SeekPastEnd { offset, size });
        }
        self.cursor = offset;
        Ok(())
    }

    /// Returns the cursor position.
    ///
    /// # Errors
    ///
    /// Returns an error if the view is unbound or closed.
    pub fn tell(&self) -> StorageResult<u64> {
        self.handle("tell")?;
        Ok(self.cursor)
    }

    /// Releases the binding. Closing twice is a no-op.
    pub fn close(&mut self) -> StorageResult<()> {
        self.bound = None;
        self.cursor = 0;
        self.closed = true;
        Ok(())
    }

    /// Returns true once [`close`](Self::close) has been called.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.closed
    }

    fn handle(&self, operation: &'static str) -> StorageResult<&dyn ObjectHandle> {
        if self.closed {
            return Err(StorageError::Closed);
        }
        self.bound
            .as_ref()
            .map(|b| b.handle.as_ref())
            .ok_or(StorageError::NotBound { operation })
    }
}

/// Reads into `dst` from `offset` until it is full or the object ends.
///
/// Short reads are retried; a zero-length read means end of object.
fn fill_at(handle: &dyn ObjectHandle, offset: u64, dst: &mut [u8]) -> StorageResult<usize> {
    let mut filled = 0;
    while filled < dst.len() {
        let n = handle.read_at(offset + filled as u64, &mut dst[filled..])?;
        if n == 0 {
            break;
        }
        filled += n;
    }
    Ok(filled)
}

impl fmt::Debug for ReadView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReadView")
            .field("destination", &self.destination())
            .field("cursor", &self.cursor)
            .field("closed", &self.closed)
            .finish()
    }
}

/// Views compare by what they are bound to and where their cursor is, not
/// by which backend instance serves them.
impl PartialEq for ReadView {
    fn eq(&self, other: &Self) -> bool {
        self.destination() == other.destination()
            && self.cursor == other.cursor
            && self.closed == other.closed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::InMemoryBackend;

    fn backend_with(name: &str, data: &[u8]) -> Arc<InMemoryBackend> {
        let backend = Arc::new(InMemoryBackend::new());
        backend.put(name, data).unwrap();
        backend
    }

    #[test]
    fn bind_missing_fails_without_state() {
        let backend = backend_with("obj", b"abc");
        let mut view = ReadView::new(backend);

        assert!(matches!(
            view.bind("nope"),
            Err(StorageError::NotFound { .. })
        ));
        assert!(!view.is_bound());

        view.bind("obj").unwrap();
        view.seek(2).unwrap();
        assert!(view.bind("nope").is_err());
        assert_eq!(view.destination(), Some("obj"));
        assert_eq!(view.tell().unwrap(), 2);
    }

    #[test]
    fn sequential_reads_advance_cursor() {
        let backend = backend_with("obj", b"hello world");
        let mut view = ReadView::new(backend);
        view.bind("obj").unwrap();

        assert_eq!(&view.read(5).unwrap()[..], b"hello");
        assert_eq!(view.tell().unwrap(), 5);
        assert_eq!(&view.read(100).unwrap()[..], b" world");
        assert_eq!(view.tell().unwrap(), 11);
        assert!(view.read(10).unwrap().is_empty());
    }

    #[test]
    fn read_into_caller_buffer() {
        let backend = backend_with("obj", b"hello world");
        let mut view = ReadView::new(backend);
        view.bind("obj").unwrap();
        view.seek(6).unwrap();

        let mut buf = [0u8; 16];
        let n = view.read_into(&mut buf).unwrap();
        assert_eq!(n, 5);
        assert_eq!(&buf[..n], b"world");
    }

    #[test]
    fn short_reads_are_retried() {
        let backend = Arc::new(InMemoryBackend::with_max_read_chunk(3));
        backend.put("obj", b"0123456789").unwrap();
        let mut view = ReadView::new(backend);
        view.bind("obj").unwrap();

        assert_eq!(&view.read(8).unwrap()[..], b"01234567");

        let mut buf = [0u8; 4];
        view.read_exact_at(6, &mut buf).unwrap();
        assert_eq!(&buf, b"6789");
        assert_eq!(view.tell().unwrap(), 8);
    }

    #[test]
    fn read_exact_at_past_end_fails() {
        let backend = backend_with("obj", b"abc");
        let mut view = ReadView::new(backend);
        view.bind("obj").unwrap();

        let mut buf = [0u8; 4];
        assert!(matches!(
            view.read_exact_at(0, &mut buf),
            Err(StorageError::Io(_))
        ));
    }

    #[test]
    fn seek_past_end_rejected() {
        let backend = backend_with("obj", b"abc");
        let mut view = ReadView::new(backend);
        view.bind("obj").unwrap();

        view.seek(3).unwrap();
        assert!(matches!(
            view.seek(4),
            Err(StorageError::SeekPastEnd { offset: 4, size: 3 })
        ));
        assert_eq!(view.tell().unwrap(), 3);
    }

    #[test]
    fn unbound_view_is_a_usage_error() {
        let backend = Arc::new(InMemoryBackend::new());
        let mut view = ReadView::new(backend);

        let err = view.read(1).unwrap_err();
        assert!(err.is_unrecoverable());
        assert!(view.tell().is_err());
        assert!(view.seek(0).is_err());
    }

    #[test]
    fn unbind_then_rebind() {
        let backend = backend_with("a", b"first");
        backend.put("b", b"second").unwrap();
        let mut view = ReadView::new(backend);

        view.bind("a").unwrap();
        view.unbind();
        assert!(!view.is_bound());
        view.bind("b").unwrap();
        assert_eq!(&view.read(6).unwrap()[..], b"second");
    }

    #[test]
    fn close_is_terminal() {
        let backend = backend_with("obj", b"abc");
        let mut view = ReadView::new(backend);
        view.bind("obj").unwrap();
        view.close().unwrap();

        assert!(view.is_closed());
        assert!(matches!(view.read(1), Err(StorageError::Closed)));
        assert!(matches!(view.bind("obj"), Err(StorageError::Closed)));
    }

    #[test]
    fn equality_is_structural() {
        let a = backend_with("obj", b"abc");
        let b = backend_with("obj", b"xyz");

        let mut left = ReadView::new(a);
        let mut right = ReadView::new(b);
        assert_eq!(left, right);

        left.bind("obj").unwrap();
        assert_ne!(left, right);
        right.bind("obj").unwrap();
        assert_eq!(left, right);

        right.seek(1).unwrap();
        assert_ne!(left, right);
    }
}
