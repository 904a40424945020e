//! Buffered write frames.
//!
//! A [`WriteFrame`] accumulates bytes in memory and flushes them to a
//! destination in one atomic `put`. The destination can be bound before or
//! after the bytes are written:
//!
//! ```text
//! new -> init -> (write | bind)* -> persist -> close
//! ```

use crate::backend::StorageBackend;
use crate::error::{StorageError, StorageResult};
use bytes::{Buf, BufMut};
use std::io;
use std::sync::Arc;
use tracing::debug;

/// Capacity reserved by [`WriteFrame::init`].
pub const DEFAULT_FRAME_RESERVE: usize = 4096;

/// Lifecycle state of a [`WriteFrame`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameState {
    /// No buffer has been allocated yet.
    Uninitialized,
    /// Accepting writes; no destination bound.
    Unbound,
    /// Accepting writes; a destination is bound.
    Bound,
    /// Contents were flushed to the bound destination.
    Persisted,
    /// Resources released.
    Closed,
}

/// An in-memory byte buffer that persists atomically to a destination.
///
/// # Rules
///
/// - Writes append in submission order, whether given as a slice
///   ([`write`](Self::write)) or as a pre-built buffer
///   ([`write_buf`](Self::write_buf))
/// - [`persist`](Self::persist) fails until a destination is bound
/// - A frame persists at most once per [`bind`](Self::bind); binding again
///   re-arms persist with the same contents
/// - Writing after a successful persist fails
///
/// # Example
///
/// ```rust
/// use partgraph_storage::{InMemoryBackend, StorageBackend, WriteFrame};
/// use std::sync::Arc;
///
/// let backend = Arc::new(InMemoryBackend::new());
/// let mut frame = WriteFrame::new(backend.clone());
/// frame.init().unwrap();
/// frame.write(b"hello").unwrap();
/// assert!(frame.persist().is_err());
///
/// frame.bind("greeting").unwrap();
/// frame.persist().unwrap();
/// assert_eq!(backend.stat("greeting").unwrap().size, 5);
/// ```
#[derive(Debug)]
pub struct WriteFrame {
    backend: Arc<dyn StorageBackend>,
    buf: Option<Vec<u8>>,
    destination: Option<String>,
    persisted: bool,
    closed: bool,
}

impl WriteFrame {
    /// Creates an uninitialized frame writing to `backend`.
    pub fn new(backend: Arc<dyn StorageBackend>) -> Self {
        Self {
            backend,
            buf: None,
            destination: None,
            persisted: false,
            closed: false,
        }
    }

    /// Allocates the buffer with the default reservation.
    ///
    /// # Errors
    ///
    /// Returns an error if the frame is closed or allocation fails.
    pub fn init(&mut self) -> StorageResult<()> {
        self.init_with_capacity(DEFAULT_FRAME_RESERVE)
    }

    /// Allocates the buffer, reserving `reserve` bytes up front.
    ///
    /// Re-initializing discards any previous contents and binding.
    ///
    /// # Errors
    ///
    /// Returns an error if the frame is closed or allocation fails.
    pub fn init_with_capacity(&mut self, reserve: usize) -> StorageResult<()> {
        if self.closed {
            return Err(StorageError::Closed);
        }
        let mut buf = Vec::new();
        buf.try_reserve_exact(reserve)
            .map_err(|_| StorageError::Allocation { requested: reserve })?;

        self.buf = Some(buf);
        self.destination = None;
        self.persisted = false;
        Ok(())
    }

    /// Appends raw bytes.
    ///
    /// # Errors
    ///
    /// Returns an error if the frame is uninitialized, persisted or closed,
    /// or if the buffer cannot grow.
    pub fn write(&mut self, data: &[u8]) -> StorageResult<()> {
        let buf = self.writable()?;
        buf.try_reserve(data.len())
            .map_err(|_| StorageError::Allocation {
                requested: data.len(),
            })?;
        buf.extend_from_slice(data);
        Ok(())
    }

    /// Appends the remaining contents of a pre-built buffer.
    ///
    /// Produces exactly the same contents as [`write`](Self::write) with
    /// the buffer's bytes.
    ///
    /// # Errors
    ///
    /// Same as [`write`](Self::write).
    pub fn write_buf(&mut self, mut data: impl Buf) -> StorageResult<()> {
        let len = data.remaining();
        let buf = self.writable()?;
        buf.try_reserve(len)
            .map_err(|_| StorageError::Allocation { requested: len })?;
        buf.put(&mut data);
        Ok(())
    }

    /// Reserves `len` more bytes and lets `encode` append directly into
    /// the frame buffer.
    ///
    /// Avoids building an intermediate copy when the writer can encode
    /// into any [`BufMut`]. `len` is a capacity hint; `encode` may append
    /// more or fewer bytes.
    ///
    /// # Errors
    ///
    /// Same as [`write`](Self::write).
    pub fn write_with<F>(&mut self, len: usize, encode: F) -> StorageResult<()>
    where
        F: FnOnce(&mut Vec<u8>),
    {
        let buf = self.writable()?;
        buf.try_reserve(len)
            .map_err(|_| StorageError::Allocation { requested: len })?;
        encode(buf);
        Ok(())
    }

    /// Attaches the destination identifier that `persist` writes to.
    ///
    /// # Errors
    ///
    /// Returns an error if the frame is closed or the identifier is empty.
    pub fn bind(&mut self, destination: impl Into<String>) -> StorageResult<()> {
        if self.closed {
            return Err(StorageError::Closed);
        }
        let destination = destination.into();
        if destination.is_empty() {
            return Err(StorageError::invalid_destination(destination, "empty name"));
        }
        self.destination = Some(destination);
        self.persisted = false;
        Ok(())
    }

    /// Flushes the accumulated bytes to the bound destination.
    ///
    /// # Errors
    ///
    /// Returns an error if no destination is bound, the frame already
    /// persisted to the current binding, the frame is uninitialized or
    /// closed, or the backend write fails.
    pub fn persist(&mut self) -> StorageResult<()> {
        if self.closed {
            return Err(StorageError::Closed);
        }
        let buf = self.buf.as_ref().ok_or(StorageError::NotInitialized)?;
        let destination = self
            .destination
            .as_deref()
            .ok_or(StorageError::PersistWithoutDestination)?;
        if self.persisted {
            return Err(StorageError::AlreadyPersisted {
                name: destination.to_string(),
            });
        }

        self.backend.put(destination, buf)?;
        debug!(destination, bytes = buf.len(), "persisted write frame");
        self.persisted = true;
        Ok(())
    }

    /// Releases the buffer. Closing twice is a no-op.
    pub fn close(&mut self) -> StorageResult<()> {
        self.buf = None;
        self.destination = None;
        self.closed = true;
        Ok(())
    }

    /// Returns true once [`close`](Self::close) has been called.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Returns the current lifecycle state.
    #[must_use]
    pub fn state(&self) -> FrameState {
        if self.closed {
            FrameState::Closed
        } else if self.buf.is_none() {
            FrameState::Uninitialized
        } else if self.persisted {
            FrameState::Persisted
        } else if self.destination.is_some() {
            FrameState::Bound
        } else {
            FrameState::Unbound
        }
    }

    /// Returns the bound destination, if any.
    #[must_use]
    pub fn destination(&self) -> Option<&str> {
        self.destination.as_deref()
    }

    /// Returns the bytes written so far.
    #[must_use]
    pub fn contents(&self) -> &[u8] {
        self.buf.as_deref().unwrap_or(&[])
    }

    /// Returns the number of bytes written so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.contents().len()
    }

    /// Returns true if nothing has been written.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn writable(&mut self) -> StorageResult<&mut Vec<u8>> {
        if self.closed {
            return Err(StorageError::Closed);
        }
        if self.persisted {
            let name = self.destination.clone().unwrap_or_default();
            return Err(StorageError::AlreadyPersisted { name });
        }
        self.buf.as_mut().ok_or(StorageError::NotInitialized)
    }
}

impl io::Write for WriteFrame {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        WriteFrame::write(self, buf).map_err(|e| io::Error::new(io::ErrorKind::Other, e))?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
