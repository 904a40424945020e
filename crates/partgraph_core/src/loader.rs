//! Partial (range) loading of CSR graph files.
//!
//! A [`PartialGraphLoader`] materializes one node range and one edge range
//! of a graph file into three owned buffers: out-index entries, destination
//! ids, and (optionally) edge-data records. After loading, all accessors
//! take `&self` and may be called from many threads at once; only the byte
//! counters are shared mutable state.

use crate::config::Config;
use crate::error::{CoreError, CoreResult};
use crate::stats::{ReadCategory, ReadCounters, ReadCountsSnapshot};
use partgraph_format::{
    EdgeRecord, GraphHeader, GraphLayout, NoEdgeData, DEST_ENTRY_SIZE, HEADER_SIZE,
    OUT_INDEX_ENTRY_SIZE,
};
use partgraph_storage::{ReadView, StorageBackend};
use std::ops::Range;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, warn};

/// The node and edge ranges to load, plus the global graph dimensions
/// needed to locate them in the file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadRequest {
    /// Global node ids to load.
    pub nodes: Range<u64>,
    /// Global edge ids to load.
    pub edges: Range<u64>,
    /// Node count of the whole graph.
    pub num_global_nodes: u64,
    /// Edge count of the whole graph.
    pub num_global_edges: u64,
}

impl LoadRequest {
    /// Creates a request for explicit node and edge ranges.
    #[must_use]
    pub fn new(
        nodes: Range<u64>,
        edges: Range<u64>,
        num_global_nodes: u64,
        num_global_edges: u64,
    ) -> Self {
        Self {
            nodes,
            edges,
            num_global_nodes,
            num_global_edges,
        }
    }

    /// Creates a request covering the whole graph described by `header`.
    #[must_use]
    pub fn whole(header: &GraphHeader) -> Self {
        Self::new(
            0..header.num_nodes,
            0..header.num_edges,
            header.num_nodes,
            header.num_edges,
        )
    }

    fn validate(&self) -> CoreResult<()> {
        if self.nodes.start > self.nodes.end || self.nodes.end > self.num_global_nodes {
            return Err(CoreError::invalid_range(format!(
                "nodes {}..{} not within 0..{}",
                self.nodes.start, self.nodes.end, self.num_global_nodes
            )));
        }
        if self.edges.start > self.edges.end || self.edges.end > self.num_global_edges {
            return Err(CoreError::invalid_range(format!(
                "edges {}..{} not within 0..{}",
                self.edges.start, self.edges.end, self.num_global_edges
            )));
        }
        Ok(())
    }
}

/// A node/edge slice of a CSR graph file held in memory.
///
/// `E` selects the edge-data record; the default [`NoEdgeData`] skips the
/// edge-data region entirely. A loader loads at most once; call
/// [`reset`](Self::reset) to reuse it.
///
/// # Example
///
/// ```rust
/// use partgraph_core::{LoadRequest, PartialGraphLoader};
/// use partgraph_format::CsrGraph;
/// use partgraph_storage::{InMemoryBackend, StorageBackend};
/// use std::sync::Arc;
///
/// let graph = CsrGraph::from_edges(3, [(0, 1, 10u32), (0, 2, 11), (1, 2, 12), (2, 0, 13)])?;
/// let backend: Arc<dyn StorageBackend> = Arc::new(InMemoryBackend::new());
/// backend.put("graph", &graph.encode())?;
///
/// let mut loader = PartialGraphLoader::<u32>::new();
/// loader.load(&backend, "graph", &LoadRequest::new(1..3, 2..4, 3, 4))?;
///
/// assert_eq!(loader.edges(1)?, 2..3);
/// assert_eq!(loader.edge_destination(2)?, 2);
/// assert_eq!(loader.edge_data(3)?, 13);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug)]
pub struct PartialGraphLoader<E: EdgeRecord = NoEdgeData> {
    config: Config,
    out_index: Vec<u64>,
    dests: Vec<u32>,
    data: Vec<E>,
    node_offset: u64,
    edge_offset: u64,
    loaded: bool,
    counters: ReadCounters,
    warned_no_data: AtomicBool,
}

impl<E: EdgeRecord> Default for PartialGraphLoader<E> {
    fn default() -> Self {
        Self::with_config(Config::default())
    }
}

impl<E: EdgeRecord> PartialGraphLoader<E> {
    /// Creates an unloaded loader with default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an unloaded loader with the given configuration.
    #[must_use]
    pub fn with_config(config: Config) -> Self {
        Self {
            config,
            out_index: Vec::new(),
            dests: Vec::new(),
            data: Vec::new(),
            node_offset: 0,
            edge_offset: 0,
            loaded: false,
            counters: ReadCounters::new(),
            warned_no_data: AtomicBool::new(false),
        }
    }

    /// Returns the loader configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Reads and decodes the header of a bound graph file.
    ///
    /// # Errors
    ///
    /// Returns an error if the header cannot be read or is not a
    /// version-1 header.
    pub fn read_header(view: &ReadView) -> CoreResult<GraphHeader> {
        let mut buf = [0u8; HEADER_SIZE as usize];
        view.read_exact_at(0, &mut buf)
            .map_err(|error| CoreError::LoadFailed {
                region: "header",
                error,
            })?;
        Ok(GraphHeader::decode(&buf)?)
    }

    /// Opens `source` and reads its header.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::SourceOpen`] if the source cannot be opened, or
    /// an error if the header is unreadable.
    pub fn load_header(backend: &Arc<dyn StorageBackend>, source: &str) -> CoreResult<GraphHeader> {
        let view = open_source(backend, source)?;
        Self::read_header(&view)
    }

    /// Opens `source` and loads the ranges named by `request`.
    ///
    /// # Errors
    ///
    /// See [`load_from_view`](Self::load_from_view). Failing to open the
    /// source is reported as [`CoreError::SourceOpen`].
    pub fn load(
        &mut self,
        backend: &Arc<dyn StorageBackend>,
        source: &str,
        request: &LoadRequest,
    ) -> CoreResult<()> {
        if self.loaded {
            return Err(CoreError::AlreadyLoaded);
        }
        let view = open_source(backend, source)?;
        self.load_from_view(&view, request)
    }

    /// Loads the ranges named by `request` from an already bound view.
    ///
    /// Each region is read at its exact layout offset in chunks of at most
    /// `max_read_chunk` bytes; short reads from the medium are retried.
    /// On any failure the loader stays unloaded and holds no buffers.
    ///
    /// # Errors
    ///
    /// - [`CoreError::AlreadyLoaded`] if this loader already holds data
    /// - [`CoreError::InvalidRange`] if a range exceeds the global counts,
    ///   or the global counts describe a file too large to address
    /// - [`CoreError::HeaderMismatch`] if header validation is enabled and
    ///   the file disagrees with the request or the record type
    /// - [`CoreError::Allocation`] if a buffer cannot be allocated
    /// - [`CoreError::LoadFailed`] if a region cannot be read completely
    pub fn load_from_view(&mut self, view: &ReadView, request: &LoadRequest) -> CoreResult<()> {
        if self.loaded {
            return Err(CoreError::AlreadyLoaded);
        }
        request.validate()?;
        if self.config.validate_header {
            check_header::<E>(&Self::read_header(view)?, request)?;
        }

        let layout = GraphLayout::new(
            request.num_global_nodes,
            request.num_global_edges,
            E::SIZE as u64,
        );
        layout
            .checked_total_size()
            .map_err(|e| CoreError::invalid_range(format!("request does not fit a file: {e}")))?;
        let num_nodes = request.nodes.end - request.nodes.start;
        let num_edges = request.edges.end - request.edges.start;
        let chunk = self.config.max_read_chunk;

        let out_index = read_region(
            view,
            "out-index",
            layout.out_index_offset(request.nodes.start),
            num_nodes,
            OUT_INDEX_ENTRY_SIZE as usize,
            chunk,
            |b: &mut &[u8]| bytes::Buf::get_u64_le(b),
        )?;
        let dests = read_region(
            view,
            "destination",
            layout.dest_offset(request.edges.start),
            num_edges,
            DEST_ENTRY_SIZE as usize,
            chunk,
            |b: &mut &[u8]| bytes::Buf::get_u32_le(b),
        )?;
        let data = if E::SIZE > 0 {
            read_region(
                view,
                "edge-data",
                layout.edge_data_offset(request.edges.start),
                num_edges,
                E::SIZE,
                chunk,
                |b: &mut &[u8]| E::decode(b),
            )?
        } else {
            Vec::new()
        };

        self.out_index = out_index;
        self.dests = dests;
        self.data = data;
        self.node_offset = request.nodes.start;
        self.edge_offset = request.edges.start;
        self.loaded = true;

        debug!(
            nodes = ?request.nodes,
            edges = ?request.edges,
            edge_data = E::SIZE > 0,
            "loaded partial graph"
        );
        Ok(())
    }

    /// Opens `source` and loads `nodes` together with exactly the edges
    /// those nodes own.
    ///
    /// # Errors
    ///
    /// See [`load_nodes_from_view`](Self::load_nodes_from_view).
    pub fn load_nodes(
        &mut self,
        backend: &Arc<dyn StorageBackend>,
        source: &str,
        nodes: Range<u64>,
    ) -> CoreResult<()> {
        if self.loaded {
            return Err(CoreError::AlreadyLoaded);
        }
        let view = open_source(backend, source)?;
        self.load_nodes_from_view(&view, nodes)
    }

    /// Loads `nodes` from a bound view, deriving the edge range from the
    /// out-index entries that bracket the node range.
    ///
    /// # Errors
    ///
    /// Same as [`load_from_view`](Self::load_from_view).
    pub fn load_nodes_from_view(&mut self, view: &ReadView, nodes: Range<u64>) -> CoreResult<()> {
        if self.loaded {
            return Err(CoreError::AlreadyLoaded);
        }
        let header = Self::read_header(view)?;
        let request = LoadRequest::new(nodes.clone(), 0..0, header.num_nodes, header.num_edges);
        request.validate()?;

        let layout = header.layout();
        let start = if nodes.start == 0 {
            0
        } else {
            read_out_index_entry(view, &layout, nodes.start - 1)?
        };
        let end = if nodes.end <= nodes.start {
            start
        } else {
            read_out_index_entry(view, &layout, nodes.end - 1)?
        };
        self.load_from_view(
            view,
            &LoadRequest::new(nodes, start..end, header.num_nodes, header.num_edges),
        )
    }

    /// Returns true once a load has completed.
    #[must_use]
    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    /// Returns true if edge-data records are held.
    #[must_use]
    pub fn has_edge_data(&self) -> bool {
        E::SIZE > 0
    }

    /// Returns the loaded global node range.
    pub fn node_range(&self) -> Range<u64> {
        self.node_offset..self.node_offset + self.out_index.len() as u64
    }

    /// Returns the loaded global edge range.
    pub fn edge_range(&self) -> Range<u64> {
        self.edge_offset..self.edge_offset + self.dests.len() as u64
    }

    /// Returns the first global edge id of `node`'s adjacency.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::NotLoaded`] before loading, or
    /// [`CoreError::NodeOutOfRange`] if `node` is not loaded.
    pub fn edge_begin(&self, node: u64) -> CoreResult<u64> {
        let local = self.local_node(node)?;
        self.counters
            .record(ReadCategory::OutIndex, OUT_INDEX_ENTRY_SIZE);
        Ok(if local == 0 {
            self.edge_offset
        } else {
            self.out_index[local - 1]
        })
    }

    /// Returns one past the last global edge id of `node`'s adjacency.
    ///
    /// # Errors
    ///
    /// Same as [`edge_begin`](Self::edge_begin).
    pub fn edge_end(&self, node: u64) -> CoreResult<u64> {
        let local = self.local_node(node)?;
        self.counters
            .record(ReadCategory::OutIndex, OUT_INDEX_ENTRY_SIZE);
        Ok(self.out_index[local])
    }

    /// Returns the global edge-id range of `node`'s adjacency.
    ///
    /// # Errors
    ///
    /// Same as [`edge_begin`](Self::edge_begin).
    pub fn edges(&self, node: u64) -> CoreResult<Range<u64>> {
        Ok(self.edge_begin(node)?..self.edge_end(node)?)
    }

    /// Returns the destination node of global edge `edge`.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::NotLoaded`] before loading, or
    /// [`CoreError::EdgeOutOfRange`] if `edge` is not loaded.
    pub fn edge_destination(&self, edge: u64) -> CoreResult<u64> {
        let local = self.local_edge(edge)?;
        self.counters
            .record(ReadCategory::Destination, DEST_ENTRY_SIZE);
        Ok(u64::from(self.dests[local]))
    }

    /// Returns the edge-data record of global edge `edge`.
    ///
    /// A loader without edge data logs a warning (once per load) and
    /// returns `E::default()`.
    ///
    /// # Errors
    ///
    /// Same as [`edge_destination`](Self::edge_destination) when edge data
    /// is present.
    pub fn edge_data(&self, edge: u64) -> CoreResult<E> {
        if !self.has_edge_data() {
            if !self.warned_no_data.swap(true, Ordering::Relaxed) {
                warn!(edge, "edge data requested from a graph loaded without edge data");
            }
            return Ok(E::default());
        }
        let local = self.local_edge(edge)?;
        self.counters.record(ReadCategory::EdgeData, E::SIZE as u64);
        Ok(self.data[local])
    }

    /// Returns the loaded destination ids in edge order.
    pub fn destinations(&self) -> &[u32] {
        &self.dests
    }

    /// Returns the loaded edge-data records in edge order.
    pub fn edge_data_slice(&self) -> &[E] {
        &self.data
    }

    /// Returns the bytes observed by accessors so far, summed over all
    /// categories and threads.
    pub fn total_bytes_read(&self) -> u64 {
        self.counters.snapshot().total()
    }

    /// Returns a per-category reduction of the byte counters.
    pub fn read_counts(&self) -> ReadCountsSnapshot {
        self.counters.snapshot()
    }

    /// Zeroes the byte counters without touching loaded data.
    pub fn reset_read_counts(&mut self) {
        self.counters.reset();
    }

    /// Frees all buffers and clears offsets and counters so the loader can
    /// load again.
    pub fn reset(&mut self) {
        self.out_index = Vec::new();
        self.dests = Vec::new();
        self.data = Vec::new();
        self.node_offset = 0;
        self.edge_offset = 0;
        self.loaded = false;
        self.counters.reset();
        self.warned_no_data.store(false, Ordering::Relaxed);
    }

    fn local_node(&self, node: u64) -> CoreResult<usize> {
        if !self.loaded {
            return Err(CoreError::NotLoaded);
        }
        let range = self.node_range();
        if !range.contains(&node) {
            return Err(CoreError::NodeOutOfRange {
                node,
                start: range.start,
                end: range.end,
            });
        }
        Ok((node - range.start) as usize)
    }

    fn local_edge(&self, edge: u64) -> CoreResult<usize> {
        if !self.loaded {
            return Err(CoreError::NotLoaded);
        }
        let range = self.edge_range();
        if !range.contains(&edge) {
            return Err(CoreError::EdgeOutOfRange {
                edge,
                start: range.start,
                end: range.end,
            });
        }
        Ok((edge - range.start) as usize)
    }
}

/// Splits `0..num_nodes` into `parts` contiguous ranges whose sizes differ
/// by at most one. Returns no ranges when `parts` is zero.
pub fn split_nodes(num_nodes: u64, parts: usize) -> Vec<Range<u64>> {
    if parts == 0 {
        return Vec::new();
    }
    let parts = parts as u64;
    let base = num_nodes / parts;
    let extra = num_nodes % parts;

    let mut start = 0;
    (0..parts)
        .map(|i| {
            let len = base + u64::from(i < extra);
            let range = start..start + len;
            start += len;
            range
        })
        .collect()
}

fn open_source(backend: &Arc<dyn StorageBackend>, source: &str) -> CoreResult<ReadView> {
    let mut view = ReadView::new(Arc::clone(backend));
    view.bind(source).map_err(|error| CoreError::SourceOpen {
        name: source.to_string(),
        error,
    })?;
    Ok(view)
}

fn check_header<E: EdgeRecord>(header: &GraphHeader, request: &LoadRequest) -> CoreResult<()> {
    if header.num_nodes != request.num_global_nodes || header.num_edges != request.num_global_edges
    {
        return Err(CoreError::header_mismatch(format!(
            "file has {} nodes and {} edges, request expects {} and {}",
            header.num_nodes, header.num_edges, request.num_global_nodes, request.num_global_edges
        )));
    }
    if E::SIZE > 0 && header.edge_data_size != E::SIZE as u64 {
        return Err(CoreError::header_mismatch(format!(
            "file edge records are {} bytes, loader expects {}",
            header.edge_data_size,
            E::SIZE
        )));
    }
    Ok(())
}

fn read_out_index_entry(view: &ReadView, layout: &GraphLayout, node: u64) -> CoreResult<u64> {
    let mut buf = [0u8; OUT_INDEX_ENTRY_SIZE as usize];
    view.read_exact_at(layout.out_index_offset(node), &mut buf)
        .map_err(|error| CoreError::LoadFailed {
            region: "out-index",
            error,
        })?;
    Ok(u64::from_le_bytes(buf))
}

fn alloc<T>(region: &'static str, count: usize, entry_size: usize) -> CoreResult<Vec<T>> {
    let mut buf = Vec::new();
    buf.try_reserve_exact(count)
        .map_err(|_| CoreError::Allocation {
            region,
            bytes: (count as u64).saturating_mul(entry_size as u64),
        })?;
    Ok(buf)
}

fn read_region<T>(
    view: &ReadView,
    region: &'static str,
    offset: u64,
    count: u64,
    entry_size: usize,
    max_chunk: usize,
    mut decode: impl FnMut(&mut &[u8]) -> T,
) -> CoreResult<Vec<T>> {
    let too_large = || CoreError::Allocation {
        region,
        bytes: count.saturating_mul(entry_size as u64),
    };
    let count = usize::try_from(count).map_err(|_| too_large())?;
    count.checked_mul(entry_size).ok_or_else(too_large)?;

    let mut out = alloc::<T>(region, count, entry_size)?;
    let per_chunk = (max_chunk / entry_size).max(1).min(count.max(1));
    let mut scratch = alloc::<u8>(region, per_chunk * entry_size, 1)?;
    scratch.resize(per_chunk * entry_size, 0);

    let mut pos = offset;
    let mut remaining = count;
    while remaining > 0 {
        let n = remaining.min(per_chunk);
        let chunk = &mut scratch[..n * entry_size];
        view.read_exact_at(pos, chunk)
            .map_err(|error| CoreError::LoadFailed { region, error })?;

        let mut cursor: &[u8] = chunk;
        out.extend((0..n).map(|_| decode(&mut cursor)));

        pos += chunk.len() as u64;
        remaining -= n;
    }
    Ok(out)
}
