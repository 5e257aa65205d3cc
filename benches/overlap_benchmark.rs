use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use genseq::{assemble, overlap_length, overlap_length_by_slices, OverlapGraph};
use std::time::Duration;

/// Benchmarks comparing the byte-loop and slice-comparison overlap scans,
/// plus graph construction and full assembly at the input size limits.

fn generate_synthetic_fragments(n: usize, fragment_len: usize, overlap_len: usize) -> Vec<String> {
    use rand::rngs::StdRng;
    use rand::seq::SliceRandom;
    use rand::{Rng, SeedableRng};

    let mut rng = StdRng::seed_from_u64(42);
    let bases = b"ACGT";
    let mut fragments = Vec::with_capacity(n);

    let mut current: Vec<u8> = (0..fragment_len)
        .map(|_| bases[rng.gen_range(0..4)])
        .collect();
    fragments.push(String::from_utf8(current.clone()).unwrap());

    // Each fragment repeats the tail of the previous one
    for _ in 1..n {
        let mut next = Vec::with_capacity(fragment_len);
        next.extend_from_slice(&current[fragment_len - overlap_len..]);
        for _ in overlap_len..fragment_len {
            next.push(bases[rng.gen_range(0..4)]);
        }
        fragments.push(String::from_utf8(next.clone()).unwrap());
        current = next;
    }

    fragments.shuffle(&mut rng);
    fragments
}

fn bench_overlap_scans(c: &mut Criterion) {
    let mut group = c.benchmark_group("overlap_scan");
    group.measurement_time(Duration::from_secs(10));

    for fragment_len in [100, 1000].iter() {
        let fragments = generate_synthetic_fragments(50, *fragment_len, fragment_len * 3 / 5);

        group.bench_with_input(
            BenchmarkId::new("byte_loop", fragment_len),
            &fragments,
            |b, fragments| {
                b.iter(|| {
                    for x in fragments {
                        for y in fragments {
                            black_box(overlap_length(black_box(x), black_box(y)));
                        }
                    }
                });
            },
        );

        group.bench_with_input(
            BenchmarkId::new("slices", fragment_len),
            &fragments,
            |b, fragments| {
                b.iter(|| {
                    for x in fragments {
                        for y in fragments {
                            black_box(overlap_length_by_slices(black_box(x), black_box(y)));
                        }
                    }
                });
            },
        );
    }

    group.finish();
}

fn bench_assembly(c: &mut Criterion) {
    let mut group = c.benchmark_group("assembly");
    group.sample_size(20);

    for n in [10, 50].iter() {
        let fragments = generate_synthetic_fragments(*n, 1000, 600);

        group.bench_with_input(BenchmarkId::new("build_graph", n), &fragments, |b, fragments| {
            b.iter(|| OverlapGraph::build(black_box(fragments)).unwrap());
        });

        group.bench_with_input(BenchmarkId::new("assemble", n), &fragments, |b, fragments| {
            b.iter(|| assemble(black_box(fragments)).unwrap());
        });
    }

    group.finish();
}

criterion_group!(benches, bench_overlap_scans, bench_assembly);

criterion_main!(benches);
