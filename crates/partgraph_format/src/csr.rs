//! In-memory CSR graphs and their encoded form.

use crate::error::{FormatError, FormatResult};
use crate::header::{GraphHeader, GraphLayout};
use crate::record::{EdgeRecord, NoEdgeData};
use bytes::{Buf, BufMut, Bytes, BytesMut};
use std::ops::Range;

/// A whole graph in compressed-sparse-row form.
///
/// `out_index[i]` is the one-past-last edge id of node `i`, so node `i`
/// owns edges `out_index[i-1]..out_index[i]` (starting at zero for node 0).
/// Edge data is empty when `E` is [`NoEdgeData`].
#[derive(Debug, Clone, PartialEq)]
pub struct CsrGraph<E: EdgeRecord = NoEdgeData> {
    out_index: Vec<u64>,
    dests: Vec<u32>,
    data: Vec<E>,
}

impl<E: EdgeRecord> CsrGraph<E> {
    /// Builds a graph from its three arrays, validating consistency.
    ///
    /// For [`NoEdgeData`] graphs `data` is ignored.
    ///
    /// # Errors
    ///
    /// Returns an error if the out-index is not non-decreasing, does not end
    /// at the number of destinations, a destination is not a node, or the
    /// data array has the wrong length.
    pub fn from_parts(out_index: Vec<u64>, dests: Vec<u32>, data: Vec<E>) -> FormatResult<Self> {
        let num_nodes = out_index.len() as u64;
        let num_edges = dests.len() as u64;

        let mut prev = 0u64;
        for (node, &end) in out_index.iter().enumerate() {
            if end < prev {
                return Err(FormatError::invalid_graph(format!(
                    "out-index decreases at node {node}: {end} < {prev}"
                )));
            }
            prev = end;
        }
        if prev != num_edges {
            return Err(FormatError::invalid_graph(format!(
                "out-index ends at {prev} but there are {num_edges} edges"
            )));
        }

        if let Some((edge, &dst)) = dests
            .iter()
            .enumerate()
            .find(|&(_, &dst)| u64::from(dst) >= num_nodes)
        {
            return Err(FormatError::invalid_graph(format!(
                "edge {edge} points at node {dst}, graph has {num_nodes} nodes"
            )));
        }

        let data = if E::SIZE == 0 {
            Vec::new()
        } else if data.len() != dests.len() {
            return Err(FormatError::invalid_graph(format!(
                "{} edge-data records for {num_edges} edges",
                data.len()
            )));
        } else {
            data
        };

        Ok(Self {
            out_index,
            dests,
            data,
        })
    }

    /// Builds a graph from `(source, destination, data)` triples.
    ///
    /// Edges keep their input order within each source node.
    ///
    /// # Errors
    ///
    /// Returns an error if an endpoint is not below `num_nodes`.
    pub fn from_edges<I>(num_nodes: u64, edges: I) -> FormatResult<Self>
    where
        I: IntoIterator<Item = (u32, u32, E)>,
    {
        let n = usize::try_from(num_nodes)
            .map_err(|_| FormatError::too_large("node count exceeds address space"))?;
        let edges: Vec<(u32, u32, E)> = edges.into_iter().collect();

        let mut counts = vec![0u64; n];
        for &(src, dst, _) in &edges {
            for endpoint in [src, dst] {
                if u64::from(endpoint) >= num_nodes {
                    return Err(FormatError::invalid_graph(format!(
                        "edge ({src}, {dst}) references node {endpoint}, graph has {num_nodes} nodes"
                    )));
                }
            }
            counts[src as usize] += 1;
        }

        let mut out_index = Vec::with_capacity(n);
        let mut running = 0u64;
        for count in &counts {
            running += count;
            out_index.push(running);
        }

        // Next free slot per node, starting at each node's first edge.
        let mut next: Vec<u64> = out_index
            .iter()
            .zip(&counts)
            .map(|(&end, &count)| end - count)
            .collect();
        let mut dests = vec![0u32; edges.len()];
        let mut data = vec![E::default(); if E::SIZE == 0 { 0 } else { edges.len() }];
        for (src, dst, record) in edges {
            let slot = next[src as usize] as usize;
            next[src as usize] += 1;
            dests[slot] = dst;
            if E::SIZE > 0 {
                data[slot] = record;
            }
        }

        Ok(Self {
            out_index,
            dests,
            data,
        })
    }

    /// Decodes a complete graph file.
    ///
    /// # Errors
    ///
    /// Returns an error if the header is invalid, its record size differs
    /// from `E::SIZE`, the input length differs from the layout, or the
    /// arrays are inconsistent.
    pub fn decode(data: &[u8]) -> FormatResult<Self> {
        let header = GraphHeader::decode(data)?;
        if header.edge_data_size != E::SIZE as u64 {
            return Err(FormatError::EdgeSizeMismatch {
                expected: E::SIZE as u64,
                actual: header.edge_data_size,
            });
        }
        let layout = header.layout();
        let expected = layout.checked_total_size()?;
        if expected != data.len() as u64 {
            return Err(FormatError::SizeMismatch {
                expected,
                actual: data.len() as u64,
            });
        }

        let num_nodes = to_usize(header.num_nodes)?;
        let num_edges = to_usize(header.num_edges)?;

        let mut buf = &data[to_usize(layout.out_index_offset(0))?..];
        let out_index = (0..num_nodes).map(|_| buf.get_u64_le()).collect();
        let dests = (0..num_edges).map(|_| buf.get_u32_le()).collect();
        let records = if E::SIZE == 0 {
            Vec::new()
        } else {
            buf.advance(to_usize(layout.padding())?);
            (0..num_edges).map(|_| E::decode(&mut buf)).collect()
        };

        Self::from_parts(out_index, dests, records)
    }

    /// Returns the header describing this graph.
    #[must_use]
    pub fn header(&self) -> GraphHeader {
        GraphHeader::new(self.num_nodes(), self.num_edges(), E::SIZE as u64)
    }

    /// Returns the region layout of the encoded graph.
    #[must_use]
    pub fn layout(&self) -> GraphLayout {
        self.header().layout()
    }

    /// Number of nodes.
    #[must_use]
    pub fn num_nodes(&self) -> u64 {
        self.out_index.len() as u64
    }

    /// Number of edges.
    #[must_use]
    pub fn num_edges(&self) -> u64 {
        self.dests.len() as u64
    }

    /// The out-index array.
    #[must_use]
    pub fn out_index(&self) -> &[u64] {
        &self.out_index
    }

    /// The destination array.
    #[must_use]
    pub fn destinations(&self) -> &[u32] {
        &self.dests
    }

    /// The edge-data array (empty for [`NoEdgeData`]).
    #[must_use]
    pub fn edge_data(&self) -> &[E] {
        &self.data
    }

    /// The edge-id range of `node`, or `None` if it is not a node.
    #[must_use]
    pub fn edges(&self, node: u64) -> Option<Range<u64>> {
        let idx = usize::try_from(node).ok()?;
        let end = *self.out_index.get(idx)?;
        let begin = if idx == 0 { 0 } else { self.out_index[idx - 1] };
        Some(begin..end)
    }

    /// The destinations of `node`'s edges, or `None` if it is not a node.
    #[must_use]
    pub fn neighbors(&self, node: u64) -> Option<&[u32]> {
        let range = self.edges(node)?;
        Some(&self.dests[range.start as usize..range.end as usize])
    }

    /// Appends the encoded graph file to `buf`.
    pub fn encode_into(&self, buf: &mut impl BufMut) {
        let layout = self.layout();
        self.header().encode_into(buf);
        for &end in &self.out_index {
            buf.put_u64_le(end);
        }
        for &dst in &self.dests {
            buf.put_u32_le(dst);
        }
        if E::SIZE > 0 {
            buf.put_bytes(0, layout.padding() as usize);
            for record in &self.data {
                record.encode(buf);
            }
        }
    }

    /// Encodes the graph file.
    #[must_use]
    pub fn encode(&self) -> Bytes {
        let mut buf = BytesMut::with_capacity(self.layout().total_size() as usize);
        self.encode_into(&mut buf);
        buf.freeze()
    }
}

impl CsrGraph<NoEdgeData> {
    /// Builds a graph without edge data from `(source, destination)` pairs.
    ///
    /// # Errors
    ///
    /// Returns an error if an endpoint is not below `num_nodes`.
    pub fn from_pairs<I>(num_nodes: u64, pairs: I) -> FormatResult<Self>
    where
        I: IntoIterator<Item = (u32, u32)>,
    {
        Self::from_edges(
            num_nodes,
            pairs.into_iter().map(|(src, dst)| (src, dst, NoEdgeData)),
        )
    }
}

fn to_usize(n: u64) -> FormatResult<usize> {
    usize::try_from(n).map_err(|_| FormatError::too_large("count exceeds address space"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> CsrGraph<u32> {
        // 0 -> {1, 2}, 1 -> {2}, 2 -> {0}
        CsrGraph::from_parts(vec![2, 3, 4], vec![1, 2, 2, 0], vec![10, 20, 30, 40]).unwrap()
    }

    #[test]
    fn edges_follow_exclusive_prefix_sums() {
        let graph = sample();
        assert_eq!(graph.edges(0), Some(0..2));
        assert_eq!(graph.edges(1), Some(2..3));
        assert_eq!(graph.edges(2), Some(3..4));
        assert_eq!(graph.edges(3), None);
        assert_eq!(graph.neighbors(0), Some(&[1u32, 2][..]));
    }

    #[test]
    fn encoded_layout_is_byte_exact() {
        let bytes = sample().encode();
        assert_eq!(bytes.len(), 88);
        assert_eq!(&bytes[32..40], &2u64.to_le_bytes());
        assert_eq!(&bytes[56..60], &1u32.to_le_bytes());
        assert_eq!(&bytes[72..76], &10u32.to_le_bytes());
        assert_eq!(&bytes[84..88], &40u32.to_le_bytes());
    }

    #[test]
    fn odd_edge_count_is_padded() {
        let graph =
            CsrGraph::<u64>::from_parts(vec![1, 3], vec![1, 0, 1], vec![7, 8, 9]).unwrap();
        let bytes = graph.encode();
        assert_eq!(bytes.len() as u64, graph.layout().total_size());
        assert_eq!(&bytes[60..64], &[0, 0, 0, 0]);
        assert_eq!(&bytes[64..72], &7u64.to_le_bytes());
    }

    #[test]
    fn no_edge_data_has_no_data_region() {
        let graph = CsrGraph::from_pairs(2, [(0, 1), (1, 0), (1, 1)]).unwrap();
        let bytes = graph.encode();
        assert_eq!(bytes.len(), 32 + 16 + 12);
        assert!(graph.edge_data().is_empty());
    }

    #[test]
    fn decode_inverts_encode() {
        let graph = sample();
        assert_eq!(CsrGraph::<u32>::decode(&graph.encode()).unwrap(), graph);
    }

    #[test]
    fn decode_rejects_wrong_record_size() {
        let bytes = sample().encode();
        assert_eq!(
            CsrGraph::<u64>::decode(&bytes),
            Err(FormatError::EdgeSizeMismatch {
                expected: 8,
                actual: 4
            })
        );
    }

    #[test]
    fn decode_rejects_truncated_file() {
        let bytes = sample().encode();
        assert!(matches!(
            CsrGraph::<u32>::decode(&bytes[..80]),
            Err(FormatError::SizeMismatch { .. })
        ));
    }

    #[test]
    fn from_edges_groups_by_source_stably() {
        let graph =
            CsrGraph::from_edges(3, [(2, 0, 5u32), (0, 2, 1), (0, 1, 2), (1, 2, 3)]).unwrap();
        assert_eq!(graph.out_index(), &[2, 3, 4]);
        assert_eq!(graph.destinations(), &[2, 1, 2, 0]);
        assert_eq!(graph.edge_data(), &[1, 2, 3, 5]);
    }

    #[test]
    fn from_edges_rejects_unknown_nodes() {
        assert!(CsrGraph::from_pairs(2, [(0, 2)]).is_err());
        assert!(CsrGraph::from_pairs(2, [(5, 0)]).is_err());
    }

    #[test]
    fn from_parts_validation() {
        assert!(CsrGraph::<NoEdgeData>::from_parts(vec![2, 1], vec![0, 0], vec![]).is_err());
        assert!(CsrGraph::<NoEdgeData>::from_parts(vec![1, 1], vec![0, 0], vec![]).is_err());
        assert!(CsrGraph::<NoEdgeData>::from_parts(vec![1], vec![3], vec![]).is_err());
        assert!(CsrGraph::<u32>::from_parts(vec![1], vec![0], vec![]).is_err());
        assert!(CsrGraph::<NoEdgeData>::from_parts(vec![], vec![], vec![]).is_ok());
    }
}
