//! File-based storage backend for persistent storage.

use crate::backend::{ObjectHandle, ObjectStat, StorageBackend};
use crate::error::{StorageError, StorageResult};
use parking_lot::Mutex;
use std::fs::{self, File, OpenOptions};
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::path::{Component, Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

/// Distinguishes temporary files created concurrently by one process.
static TEMP_COUNTER: AtomicU64 = AtomicU64::new(0);

/// A storage backend over a local directory tree.
///
/// Relative destination identifiers resolve beneath the root directory;
/// absolute identifiers are used as-is. Identifiers may not contain `..`.
///
/// # Durability
///
/// `put()` writes to a temporary sibling file, calls `File::sync_all()`,
/// then renames it over the destination, so a crash never leaves a
/// partially written object under the destination name.
///
/// # Example
///
/// ```no_run
/// use partgraph_storage::{StorageBackend, FileBackend};
///
/// let backend = FileBackend::new("/var/lib/partgraph");
/// backend.put("graphs/web.gr", b"persistent data").unwrap();
/// ```
#[derive(Debug, Clone)]
pub struct FileBackend {
    root: PathBuf,
}

impl FileBackend {
    /// Creates a backend rooted at `root`.
    ///
    /// The directory is created lazily by the first `put`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Returns the root directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolves a destination identifier to a filesystem path.
    ///
    /// # Errors
    ///
    /// Returns an error if the identifier is empty or contains `..`.
    pub fn resolve(&self, name: &str) -> StorageResult<PathBuf> {
        if name.is_empty() {
            return Err(StorageError::invalid_destination(name, "empty name"));
        }
        let rel = Path::new(name);
        if rel.components().any(|c| matches!(c, Component::ParentDir)) {
            return Err(StorageError::invalid_destination(
                name,
                "parent directory components are not allowed",
            ));
        }
        Ok(self.root.join(rel))
    }

    fn map_not_found(err: io::Error, name: &str) -> StorageError {
        if err.kind() == io::ErrorKind::NotFound {
            StorageError::not_found(name)
        } else {
            StorageError::Io(err)
        }
    }
}

impl StorageBackend for FileBackend {
    fn open(&self, name: &str) -> StorageResult<Box<dyn ObjectHandle>> {
        let path = self.resolve(name)?;
        let file = File::open(&path).map_err(|e| Self::map_not_found(e, name))?;
        let metadata = file.metadata()?;
        if !metadata.is_file() {
            return Err(StorageError::not_found(name));
        }

        Ok(Box::new(FileHandle {
            file: Mutex::new(file),
            size: metadata.len(),
        }))
    }

    fn put(&self, name: &str, data: &[u8]) -> StorageResult<()> {
        let path = self.resolve(name)?;
        let parent = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        fs::create_dir_all(parent)?;

        let file_name = path
            .file_name()
            .ok_or_else(|| StorageError::invalid_destination(name, "no file name"))?;
        let temp_path = parent.join(format!(
            ".{}.tmp-{}-{}",
            file_name.to_string_lossy(),
            std::process::id(),
            TEMP_COUNTER.fetch_add(1, Ordering::Relaxed)
        ));

        let result = (|| -> StorageResult<()> {
            let mut file = OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(&temp_path)?;
            file.write_all(data)?;
            file.sync_all()?;
            fs::rename(&temp_path, &path)?;
            Ok(())
        })();

        if result.is_err() {
            let _ = fs::remove_file(&temp_path);
        }
        result
    }

    fn stat(&self, name: &str) -> StorageResult<ObjectStat> {
        let path = self.resolve(name)?;
        let metadata = fs::metadata(&path).map_err(|e| Self::map_not_found(e, name))?;
        if !metadata.is_file() {
            return Err(StorageError::not_found(name));
        }
        Ok(ObjectStat {
            size: metadata.len(),
        })
    }

    fn exists(&self, name: &str) -> StorageResult<bool> {
        let path = self.resolve(name)?;
        Ok(path.is_file())
    }

    fn remove(&self, name: &str) -> StorageResult<()> {
        let path = self.resolve(name)?;
        fs::remove_file(&path).map_err(|e| Self::map_not_found(e, name))
    }
}

/// Positioned-read handle over an open file.
#[derive(Debug)]
struct FileHandle {
    file: Mutex<File>,
    size: u64,
}

impl ObjectHandle for FileHandle {
    fn size(&self) -> u64 {
        self.size
    }

    fn read_at(&self, offset: u64, dst: &mut [u8]) -> StorageResult<usize> {
        if dst.is_empty() || offset >= self.size {
            return Ok(0);
        }

        let mut file = self.file.lock();
        file.seek(SeekFrom::Start(offset))?;
        loop {
            match file.read(dst) {
                Ok(n) => return Ok(n),
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn file_put_and_read() {
        let dir = tempdir().unwrap();
        let backend = FileBackend::new(dir.path());

        backend.put("test.bin", b"hello world").unwrap();
        assert!(dir.path().join("test.bin").exists());

        let handle = backend.open("test.bin").unwrap();
        assert_eq!(handle.size(), 11);

        let mut buf = [0u8; 5];
        assert_eq!(handle.read_at(6, &mut buf).unwrap(), 5);
        assert_eq!(&buf, b"world");
    }

    #[test]
    fn file_put_creates_dirs() {
        let dir = tempdir().unwrap();
        let backend = FileBackend::new(dir.path());

        backend.put("nested/path/test.bin", b"x").unwrap();
        assert!(dir.path().join("nested").join("path").join("test.bin").exists());
    }

    #[test]
    fn file_put_replaces_and_leaves_no_temp() {
        let dir = tempdir().unwrap();
        let backend = FileBackend::new(dir.path());

        backend.put("a", b"first version").unwrap();
        backend.put("a", b"second").unwrap();
        assert_eq!(backend.stat("a").unwrap().size, 6);

        let entries: Vec<_> = fs::read_dir(dir.path()).unwrap().collect();
        assert_eq!(entries.len(), 1);
    }

    #[test]
    fn file_open_missing_is_not_found() {
        let dir = tempdir().unwrap();
        let backend = FileBackend::new(dir.path());

        assert!(matches!(
            backend.open("missing"),
            Err(StorageError::NotFound { .. })
        ));
        assert!(matches!(
            backend.stat("missing"),
            Err(StorageError::NotFound { .. })
        ));
    }

    #[test]
    fn file_directory_is_not_an_object() {
        let dir = tempdir().unwrap();
        let backend = FileBackend::new(dir.path());
        fs::create_dir(dir.path().join("sub")).unwrap();

        assert!(!backend.exists("sub").unwrap());
        assert!(backend.open("sub").is_err());
    }

    #[test]
    fn file_absolute_name_used_as_is() {
        let dir = tempdir().unwrap();
        let other = tempdir().unwrap();
        let backend = FileBackend::new(dir.path());

        let absolute = other.path().join("abs.bin");
        let name = absolute.to_str().unwrap();
        backend.put(name, b"abc").unwrap();
        assert!(absolute.exists());
        assert_eq!(backend.stat(name).unwrap().size, 3);
    }

    #[test]
    fn file_parent_components_rejected() {
        let dir = tempdir().unwrap();
        let backend = FileBackend::new(dir.path());

        assert!(matches!(
            backend.put("../escape", b"x"),
            Err(StorageError::InvalidDestination { .. })
        ));
        assert!(matches!(
            backend.resolve(""),
            Err(StorageError::InvalidDestination { .. })
        ));
    }

    #[test]
    fn file_read_past_end_returns_zero() {
        let dir = tempdir().unwrap();
        let backend = FileBackend::new(dir.path());
        backend.put("a", b"hello").unwrap();

        let handle = backend.open("a").unwrap();
        let mut buf = [0u8; 4];
        assert_eq!(handle.read_at(5, &mut buf).unwrap(), 0);
    }

    #[test]
    fn file_remove() {
        let dir = tempdir().unwrap();
        let backend = FileBackend::new(dir.path());
        backend.put("a", b"x").unwrap();

        backend.remove("a").unwrap();
        assert!(!backend.exists("a").unwrap());
        assert!(matches!(
            backend.remove("a"),
            Err(StorageError::NotFound { .. })
        ));
    }
}
