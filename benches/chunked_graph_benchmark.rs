use chunkgraph::{Chunk, ChunkedGraph, CompactChunkedGraph, FixedArityGraph, GapChunk, GraphConfig};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

const VERTICES: usize = 4096;
const DEGREE: usize = 8;

/// Deterministic arrow list: every vertex gets `DEGREE` pseudo-random targets.
fn arrows() -> Vec<(usize, usize, u32)> {
    let mut state = 0x2545_F491_4F6C_DD1Du64;
    let mut out = Vec::with_capacity(VERTICES * DEGREE);
    for v in 0..VERTICES {
        for _ in 0..DEGREE {
            state ^= state << 13;
            state ^= state >> 7;
            state ^= state << 17;
            out.push((v, (state % VERTICES as u64) as usize, (state >> 48) as u32));
        }
    }
    out
}

fn populated<C: Chunk>(config: GraphConfig, arrows: &[(usize, usize, u32)]) -> ChunkedGraph<C> {
    let mut graph = ChunkedGraph::<C>::with_config(config).unwrap();
    graph.add_vertices(VERTICES).unwrap();
    graph.extend_arrows(arrows.iter().copied()).unwrap();
    graph
}

fn bench_add_arrow(c: &mut Criterion) {
    let arrows = arrows();
    let mut group = c.benchmark_group("add_arrow");
    group.throughput(Throughput::Elements(arrows.len() as u64));

    for chunk_size in [64usize, 256, 1024] {
        let config = GraphConfig::default().with_chunk_size(chunk_size);
        group.bench_with_input(BenchmarkId::new("u32", chunk_size), &config, |b, &config| {
            b.iter(|| black_box(populated::<GapChunk<u32>>(config, &arrows)));
        });
        group.bench_with_input(BenchmarkId::new("u16", chunk_size), &config, |b, &config| {
            b.iter(|| black_box(populated::<GapChunk<u16>>(config, &arrows)));
        });
    }

    let fixed = GraphConfig::default().with_max_arity(Some(2 * DEGREE + 8));
    group.bench_function("fixed_arity", |b| {
        b.iter(|| {
            let mut graph = FixedArityGraph::with_config(fixed).unwrap();
            graph.add_vertices(VERTICES).unwrap();
            for &(v, u, d) in &arrows {
                // Targets are random, so a few in-runs overflow the arity.
                let _ = graph.add_arrow(v, u, d);
            }
            black_box(graph)
        });
    });
    group.finish();
}

fn bench_queries(c: &mut Criterion) {
    let arrows = arrows();
    let graph: ChunkedGraph = populated(GraphConfig::default(), &arrows);
    let compact: CompactChunkedGraph = populated(GraphConfig::default(), &arrows);

    let mut group = c.benchmark_group("queries");
    group.throughput(Throughput::Elements(VERTICES as u64));
    group.bench_function("next_iter_sum", |b| {
        b.iter(|| {
            let mut sum = 0usize;
            for v in 0..VERTICES {
                sum += graph.next_iter(v).unwrap().map(|(u, _)| u).sum::<usize>();
            }
            black_box(sum)
        });
    });
    group.bench_function("prev_iter_sum_u16", |b| {
        b.iter(|| {
            let mut sum = 0usize;
            for v in 0..VERTICES {
                sum += compact.prev_iter(v).unwrap().map(|(u, _)| u).sum::<usize>();
            }
            black_box(sum)
        });
    });
    group.bench_function("find_index_of_next", |b| {
        b.iter(|| {
            let mut hits = 0usize;
            for &(v, u, _) in arrows.iter().step_by(7) {
                hits += usize::from(graph.find_index_of_next(v, u).unwrap().is_ok());
            }
            black_box(hits)
        });
    });
    group.finish();
}

fn bench_removal(c: &mut Criterion) {
    let arrows = arrows();
    let graph: ChunkedGraph = populated(GraphConfig::default(), &arrows);

    let mut group = c.benchmark_group("removal");
    group.bench_function("remove_all_next", |b| {
        b.iter_batched(
            || graph.clone(),
            |mut g| {
                for v in (0..VERTICES).step_by(16) {
                    g.remove_all_next(v).unwrap();
                }
                g
            },
            criterion::BatchSize::LargeInput,
        );
    });
    group.bench_function("remove_next_front", |b| {
        b.iter_batched(
            || graph.clone(),
            |mut g| {
                for v in (0..VERTICES).step_by(16) {
                    if g.next_count(v).unwrap() > 0 {
                        g.remove_next(v, 0).unwrap();
                    }
                }
                g
            },
            criterion::BatchSize::LargeInput,
        );
    });
    group.sample_size(10);
    group.bench_function("insert_vertex_middle", |b| {
        b.iter_batched(
            || graph.clone(),
            |mut g| {
                g.insert_vertex(VERTICES / 2, 1).unwrap();
                g
            },
            criterion::BatchSize::LargeInput,
        );
    });
    group.bench_function("remove_vertex_middle", |b| {
        b.iter_batched(
            || graph.clone(),
            |mut g| {
                g.remove_vertex(VERTICES / 2).unwrap();
                g
            },
            criterion::BatchSize::LargeInput,
        );
    });
    group.finish();
}

criterion_group!(benches, bench_add_arrow, bench_queries, bench_removal);
criterion_main!(benches);
