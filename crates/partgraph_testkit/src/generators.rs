//! Property-based test generators using proptest.
//!
//! Provides strategies for generating random graphs and load plans that
//! maintain the format's invariants.

use partgraph_format::CsrGraph;
use proptest::prelude::*;
use std::ops::Range;

/// Strategy for `(num_nodes, edges)` with every endpoint below `num_nodes`.
pub fn edge_list_strategy(
    max_nodes: u32,
    max_edges: usize,
) -> impl Strategy<Value = (u32, Vec<(u32, u32, u32)>)> {
    (1..=max_nodes.max(1)).prop_flat_map(move |n| {
        (
            Just(n),
            prop::collection::vec((0..n, 0..n, any::<u32>()), 0..=max_edges),
        )
    })
}

/// Strategy for graphs with 4-byte edge data.
pub fn graph_strategy(max_nodes: u32, max_edges: usize) -> impl Strategy<Value = CsrGraph<u32>> {
    edge_list_strategy(max_nodes, max_edges).prop_map(|(n, edges)| {
        CsrGraph::from_edges(u64::from(n), edges).expect("endpoints are in range")
    })
}

/// Strategy for a graph together with a node range inside it.
pub fn graph_and_range_strategy(
    max_nodes: u32,
    max_edges: usize,
) -> impl Strategy<Value = (CsrGraph<u32>, Range<u64>)> {
    graph_strategy(max_nodes, max_edges).prop_flat_map(|graph| {
        let n = graph.num_nodes();
        (0..=n)
            .prop_flat_map(move |start| (Just(start), start..=n))
            .prop_map(move |(start, end)| (graph.clone(), start..end))
    })
}

/// Strategy for a graph together with a split point `0 < k < num_nodes`.
pub fn graph_and_split_strategy(
    max_nodes: u32,
    max_edges: usize,
) -> impl Strategy<Value = (CsrGraph<u32>, u64)> {
    graph_strategy(max_nodes.max(2), max_edges)
        .prop_filter("need at least two nodes", |g| g.num_nodes() >= 2)
        .prop_flat_map(|graph| {
            let n = graph.num_nodes();
            (Just(graph), 1..n)
        })
}

/// Strategy for a sequence of chunk sizes used to read an object piecewise.
pub fn read_plan_strategy(max_chunks: usize, max_chunk: usize) -> impl Strategy<Value = Vec<usize>> {
    prop::collection::vec(0..=max_chunk, 1..=max_chunks.max(1))
}

/// Configuration for property tests.
#[derive(Debug, Clone)]
pub struct PropTestConfig {
    /// Number of test cases to run.
    pub cases: u32,
    /// Maximum shrink iterations.
    pub max_shrink_iters: u32,
}

impl Default for PropTestConfig {
    fn default() -> Self {
        Self {
            cases: 256,
            max_shrink_iters: 1000,
        }
    }
}

impl PropTestConfig {
    /// Creates a configuration for quick tests.
    #[must_use]
    pub fn quick() -> Self {
        Self {
            cases: 32,
            max_shrink_iters: 100,
        }
    }

    /// Creates a configuration for thorough tests.
    #[must_use]
    pub fn thorough() -> Self {
        Self {
            cases: 1024,
            max_shrink_iters: 10000,
        }
    }

    /// Converts to proptest config.
    #[must_use]
    pub fn to_proptest_config(&self) -> ProptestConfig {
        ProptestConfig {
            cases: self.cases,
            max_shrink_iters: self.max_shrink_iters,
            ..ProptestConfig::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    proptest! {
        #![proptest_config(PropTestConfig::quick().to_proptest_config())]

        #[test]
        fn edges_stay_in_range((n, edges) in edge_list_strategy(20, 50)) {
            for (src, dst, _) in edges {
                prop_assert!(src < n && dst < n);
            }
        }

        #[test]
        fn ranges_fit_the_graph((graph, range) in graph_and_range_strategy(20, 50)) {
            prop_assert!(range.start <= range.end);
            prop_assert!(range.end <= graph.num_nodes());
        }

        #[test]
        fn split_is_interior((graph, k) in graph_and_split_strategy(20, 50)) {
            prop_assert!(k > 0 && k < graph.num_nodes());
        }
    }
}
