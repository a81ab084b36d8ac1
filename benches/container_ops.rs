use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use hotpath_containers::{AppendVec, Indexed, ShortVec, SparseVec};
use std::collections::HashMap;

/// Benchmark building short sequences: inline arena vs heap Vec
fn bench_short_push(c: &mut Criterion) {
    let mut group = c.benchmark_group("short_push");

    for len in [4, 16, 64].iter() {
        group.bench_with_input(BenchmarkId::new("ShortVec", len), len, |b, &len| {
            b.iter(|| {
                let mut v = ShortVec::<u32, 128>::new();
                for i in 0..len {
                    v.push(i);
                }
                black_box(v.len())
            });
        });

        group.bench_with_input(BenchmarkId::new("Vec", len), len, |b, &len| {
            b.iter(|| {
                let mut v = Vec::new();
                for i in 0..len {
                    v.push(i);
                }
                black_box(v.len())
            });
        });
    }

    group.finish();
}

/// Benchmark find_or_add below and above the cutover
fn bench_sparse_find_or_add(c: &mut Criterion) {
    let mut group = c.benchmark_group("sparse_find_or_add");

    for count in [8u32, 32, 256].iter() {
        group.bench_with_input(BenchmarkId::new("SparseVec", count), count, |b, &count| {
            b.iter(|| {
                let mut sparse = SparseVec::<Indexed<u64>>::new();
                for i in 0..count {
                    sparse.find_or_add(i * 7).value += 1;
                    sparse.find_or_add(i * 7).value += 1;
                }
                black_box(sparse.len())
            });
        });

        group.bench_with_input(BenchmarkId::new("HashMap", count), count, |b, &count| {
            b.iter(|| {
                let mut map: HashMap<u32, u64> = HashMap::new();
                for i in 0..count {
                    *map.entry(i * 7).or_default() += 1;
                    *map.entry(i * 7).or_default() += 1;
                }
                black_box(map.len())
            });
        });
    }

    group.finish();
}

/// Benchmark uncontended appends through the spin lock
fn bench_append(c: &mut Criterion) {
    let mut group = c.benchmark_group("append");
    let size = 10_000u64;

    group.bench_function("AppendVec", |b| {
        b.iter(|| {
            let seq = AppendVec::new();
            for i in 0..size {
                black_box(seq.emplace_back(i));
            }
            seq
        });
    });

    group.bench_function("Vec", |b| {
        b.iter(|| {
            let mut v = Vec::new();
            for i in 0..size {
                v.push(i);
            }
            v
        });
    });

    group.finish();
}

criterion_group!(benches, bench_short_push, bench_sparse_find_or_add, bench_append);
criterion_main!(benches);
