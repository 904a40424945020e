//! Partition container.

use crate::config::Config;
use crate::error::{CoreError, CoreResult};
use crate::part_header::PartHeader;
use crate::table::PropertyTable;
use partgraph_storage::{ReadView, StorageBackend, WriteFrame};
use std::sync::Arc;
use tracing::debug;

/// One partition of a graph: node and edge property tables, a read view
/// over the serialized topology, and the partition's metadata.
///
/// All parts are owned exclusively. Equality is structural: two containers
/// are equal when their tables, topology views and headers are equal.
///
/// # Example
///
/// ```rust
/// use partgraph_core::{Column, ColumnData, PartitionContainer, PropertyTable};
/// use partgraph_storage::InMemoryBackend;
/// use std::sync::Arc;
///
/// let mut part = PartitionContainer::new(Arc::new(InMemoryBackend::new()));
/// let ranks = PropertyTable::from_columns(vec![Column::new(
///     "rank",
///     ColumnData::Float64(vec![0.5, 0.25, 0.25]),
/// )])?;
///
/// part.add_node_properties(&ranks)?;
/// assert_eq!(part.node_table().num_columns(), 1);
/// assert!(part.add_node_properties(&PropertyTable::empty(2)).is_err());
/// # Ok::<(), partgraph_core::CoreError>(())
/// ```
#[derive(Debug)]
pub struct PartitionContainer {
    node_table: PropertyTable,
    edge_table: PropertyTable,
    topology: ReadView,
    part_header: PartHeader,
}

impl PartitionContainer {
    /// Creates an empty partition whose topology lives in `backend`.
    pub fn new(backend: Arc<dyn StorageBackend>) -> Self {
        Self::with_header(backend, PartHeader::new())
    }

    /// Creates a partition from existing metadata.
    ///
    /// Known node and edge counts in the header fix the row counts of the
    /// (empty) property tables.
    pub fn with_header(backend: Arc<dyn StorageBackend>, part_header: PartHeader) -> Self {
        Self {
            node_table: part_header
                .num_nodes
                .map_or_else(PropertyTable::default, PropertyTable::empty),
            edge_table: part_header
                .num_edges
                .map_or_else(PropertyTable::default, PropertyTable::empty),
            topology: ReadView::new(backend),
            part_header,
        }
    }

    /// Appends the columns of `table` to the node table.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::RowCountMismatch`] if `table` does not have one
    /// row per node. The node table is unchanged on failure.
    pub fn add_node_properties(&mut self, table: &PropertyTable) -> CoreResult<()> {
        self.node_table.append_columns_as("node", table)
    }

    /// Appends the columns of `table` to the edge table.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::RowCountMismatch`] if `table` does not have one
    /// row per edge. The edge table is unchanged on failure.
    pub fn add_edge_properties(&mut self, table: &PropertyTable) -> CoreResult<()> {
        self.edge_table.append_columns_as("edge", table)
    }

    /// Removes node property column `index`.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::ColumnOutOfRange`] if there is no such column.
    pub fn remove_node_property(&mut self, index: usize) -> CoreResult<()> {
        self.node_table.remove_column_as("node", index).map(drop)
    }

    /// Removes edge property column `index`.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::ColumnOutOfRange`] if there is no such column.
    pub fn remove_edge_property(&mut self, index: usize) -> CoreResult<()> {
        self.edge_table.remove_column_as("edge", index).map(drop)
    }

    /// Points the partition at a new topology file.
    ///
    /// Any bound topology view is released; the next call to
    /// [`topology_view`](Self::topology_view) binds the new path.
    pub fn register_topology_file(&mut self, path: impl Into<String>) {
        self.topology.unbind();
        self.part_header.set_topology_path(path.into());
    }

    /// Returns the topology view, binding it to the registered path first
    /// if needed.
    ///
    /// # Errors
    ///
    /// Returns an error if no topology is registered or the path cannot be
    /// bound.
    pub fn topology_view(&mut self) -> CoreResult<&mut ReadView> {
        if !self.topology.is_bound() {
            if !self.part_header.has_topology() {
                return Err(CoreError::invalid_operation(
                    "partition has no registered topology file",
                ));
            }
            self.topology.bind(self.part_header.topology_path())?;
        }
        Ok(&mut self.topology)
    }

    /// Returns the topology view without binding it.
    pub fn topology_storage(&self) -> &ReadView {
        &self.topology
    }

    /// Returns the node property table.
    pub fn node_table(&self) -> &PropertyTable {
        &self.node_table
    }

    /// Returns the edge property table.
    pub fn edge_table(&self) -> &PropertyTable {
        &self.edge_table
    }

    /// Replaces the node property table.
    pub fn set_node_table(&mut self, table: PropertyTable) {
        self.node_table = table;
    }

    /// Replaces the edge property table.
    pub fn set_edge_table(&mut self, table: PropertyTable) {
        self.edge_table = table;
    }

    /// Returns the partition metadata.
    pub fn part_header(&self) -> &PartHeader {
        &self.part_header
    }

    /// Replaces the partition metadata and releases the topology view.
    pub fn set_part_header(&mut self, part_header: PartHeader) {
        self.topology.unbind();
        self.part_header = part_header;
    }

    /// Writes both property tables and the header under `prefix`.
    ///
    /// Tables go to `{prefix}.nodes.json` and `{prefix}.edges.json`; the
    /// header, which records both paths, goes to `{prefix}.part.json`.
    /// Returns the header path.
    ///
    /// # Errors
    ///
    /// Returns an error if encoding or persisting any object fails.
    pub fn persist(&mut self, prefix: &str, config: &Config) -> CoreResult<String> {
        let backend = Arc::clone(self.topology.backend());
        let node_path = format!("{prefix}.nodes.json");
        let edge_path = format!("{prefix}.edges.json");
        let header_path = format!("{prefix}.part.json");

        persist_json(Arc::clone(&backend), &node_path, &self.node_table, config)?;
        persist_json(Arc::clone(&backend), &edge_path, &self.edge_table, config)?;

        self.part_header.node_properties_path = Some(node_path);
        self.part_header.edge_properties_path = Some(edge_path);
        self.part_header.num_nodes = self.node_table.fixed_rows();
        self.part_header.num_edges = self.edge_table.fixed_rows();
        self.part_header.persist(backend, &header_path)?;

        debug!(
            header = %header_path,
            node_columns = self.node_table.num_columns(),
            edge_columns = self.edge_table.num_columns(),
            "persisted partition"
        );
        Ok(header_path)
    }

    /// Reads a partition previously written by [`persist`](Self::persist).
    ///
    /// The topology view is left unbound.
    ///
    /// # Errors
    ///
    /// Returns an error if the header or a table is missing or malformed.
    pub fn open(backend: Arc<dyn StorageBackend>, header_path: &str) -> CoreResult<Self> {
        let part_header = PartHeader::load(Arc::clone(&backend), header_path)?;
        let mut part = Self::with_header(Arc::clone(&backend), part_header);

        if let Some(path) = part.part_header.node_properties_path.clone() {
            part.node_table = load_json(Arc::clone(&backend), &path)?;
        }
        if let Some(path) = part.part_header.edge_properties_path.clone() {
            part.edge_table = load_json(backend, &path)?;
        }
        Ok(part)
    }
}

impl PartialEq for PartitionContainer {
    fn eq(&self, other: &Self) -> bool {
        self.node_table == other.node_table
            && self.edge_table == other.edge_table
            && self.topology == other.topology
            && self.part_header == other.part_header
    }
}

fn persist_json(
    backend: Arc<dyn StorageBackend>,
    destination: &str,
    table: &PropertyTable,
    config: &Config,
) -> CoreResult<()> {
    let mut frame = WriteFrame::new(backend);
    frame.init_with_capacity(config.frame_reserve)?;
    serde_json::to_writer(&mut frame, table)?;
    frame.bind(destination)?;
    frame.persist()?;
    frame.close()?;
    Ok(())
}

fn load_json(backend: Arc<dyn StorageBackend>, source: &str) -> CoreResult<PropertyTable> {
    let mut view = ReadView::new(backend);
    view.bind(source)?;
    let size = usize::try_from(view.size()?)
        .map_err(|_| CoreError::invalid_format(format!("{source} too large")))?;
    let bytes = view.read(size)?;
    view.close()?;
    Ok(serde_json::from_slice(&bytes)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::{Column, ColumnData};
    use partgraph_storage::InMemoryBackend;

    fn backend() -> Arc<dyn StorageBackend> {
        Arc::new(InMemoryBackend::new())
    }

    fn column(name: &str, rows: usize) -> PropertyTable {
        PropertyTable::from_columns(vec![Column::new(
            name,
            ColumnData::UInt64((0..rows as u64).collect()),
        )])
        .unwrap()
    }

    #[test]
    fn add_properties_checks_rows() {
        let mut part =
            PartitionContainer::with_header(backend(), PartHeader::with_counts(3, 0));

        part.add_node_properties(&column("a", 3)).unwrap();
        part.add_node_properties(&column("b", 3)).unwrap();
        assert_eq!(part.node_table().num_columns(), 2);

        let err = part.add_node_properties(&column("c", 4)).unwrap_err();
        assert!(matches!(
            err,
            CoreError::RowCountMismatch {
                table: "node",
                expected: 3,
                actual: 4
            }
        ));
        assert!(!err.is_unrecoverable());
        assert_eq!(part.node_table().num_columns(), 2);
    }

    #[test]
    fn known_zero_count_is_fixed() {
        let mut header = PartHeader::new();
        header.num_nodes = Some(0);
        let mut part = PartitionContainer::with_header(backend(), header);

        assert!(matches!(
            part.add_node_properties(&column("a", 3)),
            Err(CoreError::RowCountMismatch {
                table: "node",
                expected: 0,
                actual: 3
            })
        ));
        assert_eq!(part.node_table().num_rows(), 0);
        assert_eq!(part.node_table().num_columns(), 0);

        // Edge count unknown: the first table decides.
        part.add_edge_properties(&column("w", 3)).unwrap();
        assert_eq!(part.edge_table().num_rows(), 3);
    }

    #[test]
    fn edge_properties_are_independent() {
        let mut part = PartitionContainer::new(backend());
        part.add_node_properties(&column("rank", 3)).unwrap();
        part.add_edge_properties(&column("weight", 5)).unwrap();
        assert_eq!(part.node_table().num_rows(), 3);
        assert_eq!(part.edge_table().num_rows(), 5);
    }

    #[test]
    fn remove_properties() {
        let mut part = PartitionContainer::new(backend());
        part.add_edge_properties(&column("w", 2)).unwrap();

        assert!(matches!(
            part.remove_edge_property(1),
            Err(CoreError::ColumnOutOfRange { table: "edge", .. })
        ));
        part.remove_edge_property(0).unwrap();
        assert_eq!(part.edge_table().num_columns(), 0);
        assert!(part.remove_node_property(0).is_err());
    }

    #[test]
    fn register_topology_rebinds_lazily() {
        let storage = backend();
        storage.put("topo_a", b"aaaa").unwrap();
        storage.put("topo_b", b"bb").unwrap();

        let mut part = PartitionContainer::new(Arc::clone(&storage));
        assert!(part.topology_view().is_err());

        part.register_topology_file("topo_a");
        assert_eq!(part.topology_view().unwrap().size().unwrap(), 4);
        assert!(part.topology_storage().is_bound());

        part.register_topology_file("topo_b");
        assert!(!part.topology_storage().is_bound());
        assert_eq!(part.part_header().topology_path(), "topo_b");
        assert_eq!(part.topology_view().unwrap().size().unwrap(), 2);
    }

    #[test]
    fn missing_topology_fails_to_bind() {
        let mut part = PartitionContainer::new(backend());
        part.register_topology_file("missing");
        assert!(matches!(
            part.topology_view(),
            Err(CoreError::Storage(_))
        ));
    }

    #[test]
    fn equality_is_structural() {
        let storage = backend();
        let mut a = PartitionContainer::new(Arc::clone(&storage));
        let mut b = PartitionContainer::new(backend());
        assert_eq!(a, b);

        a.add_node_properties(&column("x", 2)).unwrap();
        assert_ne!(a, b);
        b.add_node_properties(&column("x", 2)).unwrap();
        assert_eq!(a, b);

        a.register_topology_file("t");
        assert_ne!(a, b);
        b.register_topology_file("t");
        assert_eq!(a, b);
    }

    #[test]
    fn persist_and_open() {
        let storage = backend();
        storage.put("topo", b"graph bytes").unwrap();

        let mut part = PartitionContainer::new(Arc::clone(&storage));
        part.register_topology_file("topo");
        part.add_node_properties(&column("rank", 3)).unwrap();
        part.add_edge_properties(&column("weight", 4)).unwrap();

        let header_path = part.persist("part_0", &Config::default()).unwrap();
        assert_eq!(header_path, "part_0.part.json");

        let reopened = PartitionContainer::open(storage, &header_path).unwrap();
        assert_eq!(reopened, part);
        assert_eq!(reopened.part_header().num_nodes, Some(3));
    }
}
