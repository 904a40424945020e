//! CSR encoding benchmarks.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use partgraph_bench::utils::random_graph;
use partgraph_format::{CsrGraph, GraphHeader, NoEdgeData};

/// Benchmark encoding graphs of increasing size.
fn bench_encode(c: &mut Criterion) {
    let mut group = c.benchmark_group("encode");

    for nodes in [1_000u32, 10_000, 100_000].iter() {
        let graph = random_graph(*nodes, *nodes as usize * 8, 7);
        group.throughput(Throughput::Bytes(graph.layout().total_size()));
        group.bench_with_input(BenchmarkId::from_parameter(nodes), nodes, |b, _| {
            b.iter(|| black_box(black_box(&graph).encode()));
        });
    }

    group.finish();
}

/// Benchmark decoding with and without edge data.
fn bench_decode(c: &mut Criterion) {
    let mut group = c.benchmark_group("decode");
    let graph = random_graph(50_000, 400_000, 8);
    let bytes = graph.encode();
    group.throughput(Throughput::Bytes(bytes.len() as u64));

    group.bench_function("weighted", |b| {
        b.iter(|| {
            let decoded = CsrGraph::<u64>::decode(black_box(&bytes)).unwrap();
            black_box(decoded);
        });
    });

    group.bench_function("header_only", |b| {
        b.iter(|| black_box(GraphHeader::decode(black_box(&bytes)).unwrap()));
    });

    let pairs = CsrGraph::from_pairs(
        graph.num_nodes(),
        (0..graph.num_nodes() as u32)
            .flat_map(|n| graph.neighbors(u64::from(n)).unwrap().iter().map(move |&d| (n, d))),
    )
    .unwrap();
    let bytes = pairs.encode();
    group.bench_function("topology_only", |b| {
        b.iter(|| {
            let decoded = CsrGraph::<NoEdgeData>::decode(black_box(&bytes)).unwrap();
            black_box(decoded);
        });
    });

    group.finish();
}

criterion_group!(benches, bench_encode, bench_decode);

criterion_main!(benches);
