//! CLI command implementations.

pub mod convert;
pub mod inspect;
pub mod load;
pub mod verify;

use partgraph_storage::{FileBackend, StorageBackend};
use std::path::Path;
use std::sync::Arc;

/// Returns a backend rooted at the file's directory and the object name of
/// the file within it.
pub fn open_path(path: &Path) -> Result<(Arc<dyn StorageBackend>, String), Box<dyn std::error::Error>> {
    let name = path
        .file_name()
        .ok_or_else(|| format!("{} does not name a file", path.display()))?
        .to_string_lossy()
        .into_owned();
    let root = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => ".".into(),
    };
    Ok((Arc::new(FileBackend::new(root)), name))
}

/// Formats a byte count for humans.
pub fn format_size(bytes: u64) -> String {
    if bytes < 1024 {
        format!("{bytes}")
    } else if bytes < 1024 * 1024 {
        format!("{:.1} KB", bytes as f64 / 1024.0)
    } else if bytes < 1024 * 1024 * 1024 {
        format!("{:.1} MB", bytes as f64 / (1024.0 * 1024.0))
    } else {
        format!("{:.1} GB", bytes as f64 / (1024.0 * 1024.0 * 1024.0))
    }
}
