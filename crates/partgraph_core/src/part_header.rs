//! Partition metadata.

use crate::error::{CoreError, CoreResult};
use partgraph_storage::{ReadView, StorageBackend, WriteFrame};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::debug;

/// Current part header version.
pub const PART_HEADER_VERSION: u32 = 1;

/// Metadata describing one partition.
///
/// The header stores:
/// - Format version
/// - Path of the serialized topology
/// - Paths of persisted property tables, once written
/// - Free-form string metadata
///
/// The topology path changes only through
/// [`PartitionContainer::register_topology_file`](crate::PartitionContainer::register_topology_file)
/// so the container can keep its topology view consistent with it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartHeader {
    /// Header format version.
    pub format_version: u32,
    topology_path: String,
    /// Node count of the partition, when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub num_nodes: Option<u64>,
    /// Edge count of the partition, when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub num_edges: Option<u64>,
    /// Where the node property table is persisted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub node_properties_path: Option<String>,
    /// Where the edge property table is persisted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub edge_properties_path: Option<String>,
    /// Free-form metadata.
    #[serde(default)]
    pub metadata: BTreeMap<String, String>,
}

impl Default for PartHeader {
    fn default() -> Self {
        Self::new()
    }
}

impl PartHeader {
    /// Creates an empty header with no topology.
    #[must_use]
    pub fn new() -> Self {
        Self {
            format_version: PART_HEADER_VERSION,
            topology_path: String::new(),
            num_nodes: None,
            num_edges: None,
            node_properties_path: None,
            edge_properties_path: None,
            metadata: BTreeMap::new(),
        }
    }

    /// Creates a header referencing an existing topology.
    #[must_use]
    pub fn with_topology(path: impl Into<String>) -> Self {
        Self {
            topology_path: path.into(),
            ..Self::new()
        }
    }

    /// Creates a header for a partition with known node and edge counts.
    #[must_use]
    pub fn with_counts(num_nodes: u64, num_edges: u64) -> Self {
        Self {
            num_nodes: Some(num_nodes),
            num_edges: Some(num_edges),
            ..Self::new()
        }
    }

    /// Returns the topology path; empty if none is registered.
    pub fn topology_path(&self) -> &str {
        &self.topology_path
    }

    /// Returns true if a topology path is registered.
    pub fn has_topology(&self) -> bool {
        !self.topology_path.is_empty()
    }

    pub(crate) fn set_topology_path(&mut self, path: String) {
        self.topology_path = path;
    }

    /// Encodes the header as JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn encode(&self) -> CoreResult<Vec<u8>> {
        Ok(serde_json::to_vec_pretty(self)?)
    }

    /// Decodes a header from JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if the bytes are not a header or the version is
    /// newer than this library understands.
    pub fn decode(data: &[u8]) -> CoreResult<Self> {
        let header: Self = serde_json::from_slice(data)?;
        if header.format_version == 0 || header.format_version > PART_HEADER_VERSION {
            return Err(CoreError::invalid_format(format!(
                "unsupported part header version: {}",
                header.format_version
            )));
        }
        Ok(header)
    }

    /// Writes the header to `destination`.
    ///
    /// # Errors
    ///
    /// Returns an error if encoding or persisting fails.
    pub fn persist(&self, backend: Arc<dyn StorageBackend>, destination: &str) -> CoreResult<()> {
        let bytes = self.encode()?;
        let mut frame = WriteFrame::new(backend);
        frame.init_with_capacity(bytes.len())?;
        frame.write(&bytes)?;
        frame.bind(destination)?;
        frame.persist()?;
        frame.close()?;
        debug!(destination, "persisted part header");
        Ok(())
    }

    /// Reads a header from `source`.
    ///
    /// # Errors
    ///
    /// Returns an error if the object is missing or not a valid header.
    pub fn load(backend: Arc<dyn StorageBackend>, source: &str) -> CoreResult<Self> {
        let mut view = ReadView::new(backend);
        view.bind(source)?;
        let size = usize::try_from(view.size()?)
            .map_err(|_| CoreError::invalid_format("part header too large"))?;
        let bytes = view.read(size)?;
        view.close()?;
        Self::decode(&bytes)
    }
}
