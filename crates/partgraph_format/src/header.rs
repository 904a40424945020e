//! Graph file header and region layout.

use crate::error::{FormatError, FormatResult};
use bytes::{Buf, BufMut};

/// The only graph format version this crate reads and writes.
pub const GRAPH_FORMAT_VERSION: u64 = 1;

/// Size of the fixed header: four little-endian `u64` words.
pub const HEADER_SIZE: u64 = 4 * 8;

/// Size of one out-index entry.
pub const OUT_INDEX_ENTRY_SIZE: u64 = 8;

/// Size of one destination entry.
pub const DEST_ENTRY_SIZE: u64 = 4;

/// Fixed header at the start of every graph file.
///
/// ```text
/// | version (8) | edge_data_size (8) | num_nodes (8) | num_edges (8) |
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GraphHeader {
    /// Format version, always [`GRAPH_FORMAT_VERSION`].
    pub version: u64,
    /// Size in bytes of one edge-data record; zero when edges carry no data.
    pub edge_data_size: u64,
    /// Number of nodes in the whole graph.
    pub num_nodes: u64,
    /// Number of edges in the whole graph.
    pub num_edges: u64,
}

impl GraphHeader {
    /// Creates a version-1 header.
    #[must_use]
    pub const fn new(num_nodes: u64, num_edges: u64, edge_data_size: u64) -> Self {
        Self {
            version: GRAPH_FORMAT_VERSION,
            edge_data_size,
            num_nodes,
            num_edges,
        }
    }

    /// Returns true if the file carries an edge-data region.
    #[must_use]
    pub const fn has_edge_data(&self) -> bool {
        self.edge_data_size > 0
    }

    /// Returns the region layout this header describes.
    #[must_use]
    pub const fn layout(&self) -> GraphLayout {
        GraphLayout::new(self.num_nodes, self.num_edges, self.edge_data_size)
    }

    /// Appends the encoded header to `buf`.
    pub fn encode_into(&self, buf: &mut impl BufMut) {
        buf.put_u64_le(self.version);
        buf.put_u64_le(self.edge_data_size);
        buf.put_u64_le(self.num_nodes);
        buf.put_u64_le(self.num_edges);
    }

    /// Encodes the header to its fixed 32-byte form.
    #[must_use]
    pub fn encode(&self) -> [u8; HEADER_SIZE as usize] {
        let mut out = [0u8; HEADER_SIZE as usize];
        self.encode_into(&mut &mut out[..]);
        out
    }

    /// Decodes and validates a header from the start of `data`.
    ///
    /// # Errors
    ///
    /// Returns an error if `data` is shorter than the header, the version
    /// is not 1, or the counts describe a file larger than `u64::MAX` bytes.
    pub fn decode(data: &[u8]) -> FormatResult<Self> {
        if (data.len() as u64) < HEADER_SIZE {
            return Err(FormatError::Truncated {
                needed: HEADER_SIZE,
                available: data.len() as u64,
            });
        }

        let mut buf = data;
        let header = Self {
            version: buf.get_u64_le(),
            edge_data_size: buf.get_u64_le(),
            num_nodes: buf.get_u64_le(),
            num_edges: buf.get_u64_le(),
        };

        if header.version != GRAPH_FORMAT_VERSION {
            return Err(FormatError::UnsupportedVersion {
                version: header.version,
            });
        }
        header.layout().checked_total_size()?;
        Ok(header)
    }
}

/// Byte offsets of every region of a version-1 graph file.
///
/// ```text
/// | header (32) | out_index (8 * N) | dests (4 * E) | pad (0|4) | data (S * E) |
/// ```
///
/// The pad is present only when there is edge data and `E` is odd, so the
/// data region starts 8-byte aligned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GraphLayout {
    num_nodes: u64,
    num_edges: u64,
    edge_data_size: u64,
}

impl GraphLayout {
    /// Creates the layout for the given global counts and record size.
    #[must_use]
    pub const fn new(num_nodes: u64, num_edges: u64, edge_data_size: u64) -> Self {
        Self {
            num_nodes,
            num_edges,
            edge_data_size,
        }
    }

    /// Byte offset of the out-index entry of `node`.
    #[must_use]
    pub const fn out_index_offset(&self, node: u64) -> u64 {
        HEADER_SIZE + node * OUT_INDEX_ENTRY_SIZE
    }

    /// Byte offset of the destination entry of `edge`.
    #[must_use]
    pub const fn dest_offset(&self, edge: u64) -> u64 {
        self.out_index_offset(self.num_nodes) + edge * DEST_ENTRY_SIZE
    }

    /// Size of the alignment pad between destinations and edge data.
    #[must_use]
    pub const fn padding(&self) -> u64 {
        if self.edge_data_size > 0 && self.num_edges % 2 == 1 {
            DEST_ENTRY_SIZE
        } else {
            0
        }
    }

    /// Byte offset of the edge-data record of `edge`.
    #[must_use]
    pub const fn edge_data_offset(&self, edge: u64) -> u64 {
        self.dest_offset(self.num_edges) + self.padding() + edge * self.edge_data_size
    }

    /// Total size of a file with this layout.
    #[must_use]
    pub const fn total_size(&self) -> u64 {
        self.edge_data_offset(self.num_edges)
    }

    /// Total size of a file with this layout, failing instead of overflowing.
    ///
    /// # Errors
    ///
    /// Returns an error if the size does not fit in a `u64`.
    pub fn checked_total_size(&self) -> FormatResult<u64> {
        let overflow = || FormatError::too_large("file size overflows u64");
        let out_index = self
            .num_nodes
            .checked_mul(OUT_INDEX_ENTRY_SIZE)
            .ok_or_else(overflow)?;
        let dests = self
            .num_edges
            .checked_mul(DEST_ENTRY_SIZE)
            .ok_or_else(overflow)?;
        let data = self
            .num_edges
            .checked_mul(self.edge_data_size)
            .ok_or_else(overflow)?;
        HEADER_SIZE
            .checked_add(out_index)
            .and_then(|n| n.checked_add(dests))
            .and_then(|n| n.checked_add(self.padding()))
            .and_then(|n| n.checked_add(data))
            .ok_or_else(overflow)
    }

    /// Number of nodes the layout was built for.
    #[must_use]
    pub const fn num_nodes(&self) -> u64 {
        self.num_nodes
    }

    /// Number of edges the layout was built for.
    #[must_use]
    pub const fn num_edges(&self) -> u64 {
        self.num_edges
    }

    /// Edge record size the layout was built for.
    #[must_use]
    pub const fn edge_data_size(&self) -> u64 {
        self.edge_data_size
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_encode_decode() {
        let header = GraphHeader::new(3, 4, 4);
        let bytes = header.encode();
        assert_eq!(&bytes[0..8], &1u64.to_le_bytes());
        assert_eq!(&bytes[8..16], &4u64.to_le_bytes());
        assert_eq!(&bytes[16..24], &3u64.to_le_bytes());
        assert_eq!(&bytes[24..32], &4u64.to_le_bytes());
        assert_eq!(GraphHeader::decode(&bytes).unwrap(), header);
    }

    #[test]
    fn header_rejects_other_versions() {
        let mut bytes = GraphHeader::new(1, 0, 0).encode();
        bytes[0] = 2;
        assert_eq!(
            GraphHeader::decode(&bytes),
            Err(FormatError::UnsupportedVersion { version: 2 })
        );
    }

    #[test]
    fn header_rejects_short_input() {
        assert!(matches!(
            GraphHeader::decode(&[0u8; 31]),
            Err(FormatError::Truncated { needed: 32, .. })
        ));
    }

    #[test]
    fn header_rejects_overflowing_counts() {
        let bytes = GraphHeader::new(u64::MAX, 1, 0).encode();
        assert!(matches!(
            GraphHeader::decode(&bytes),
            Err(FormatError::TooLarge { .. })
        ));
    }

    #[test]
    fn layout_offsets_even_edges() {
        let layout = GraphLayout::new(3, 4, 4);
        assert_eq!(layout.out_index_offset(0), 32);
        assert_eq!(layout.out_index_offset(2), 48);
        assert_eq!(layout.dest_offset(0), 56);
        assert_eq!(layout.dest_offset(3), 68);
        assert_eq!(layout.padding(), 0);
        assert_eq!(layout.edge_data_offset(0), 72);
        assert_eq!(layout.total_size(), 88);
    }

    #[test]
    fn layout_pads_odd_edge_count_with_data() {
        let layout = GraphLayout::new(2, 3, 8);
        assert_eq!(layout.dest_offset(0), 48);
        assert_eq!(layout.padding(), 4);
        assert_eq!(layout.edge_data_offset(0), 64);
        assert_eq!(layout.edge_data_offset(0) % 8, 0);
        assert_eq!(layout.total_size(), 88);
    }

    #[test]
    fn layout_no_pad_without_data() {
        let layout = GraphLayout::new(2, 3, 0);
        assert_eq!(layout.padding(), 0);
        assert_eq!(layout.total_size(), 60);
        assert_eq!(layout.checked_total_size().unwrap(), 60);
    }
}
