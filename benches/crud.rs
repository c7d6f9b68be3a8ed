use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use rand::prelude::*;
use ranktree::RankTree;
use std::collections::BTreeMap;

const SIZES: [usize; 3] = [1_000, 10_000, 100_000];

fn shuffled_keys(n: usize) -> Vec<u64> {
    let mut keys: Vec<u64> = (0..n as u64).collect();
    keys.shuffle(&mut StdRng::seed_from_u64(1));
    keys
}

fn bench_insert(c: &mut Criterion) {
    let mut group = c.benchmark_group("insert");
    for &size in &SIZES {
        group.bench_with_input(BenchmarkId::new("ascending", size), &size, |b, &n| {
            b.iter(|| {
                let mut tree = RankTree::with_default_order();
                for i in 0..n as u64 {
                    tree.insert(i, i);
                }
                black_box(tree.len())
            })
        });
        let keys = shuffled_keys(size);
        group.bench_with_input(BenchmarkId::new("shuffled", size), &keys, |b, keys| {
            b.iter(|| {
                let mut tree = RankTree::with_default_order();
                for &k in keys {
                    tree.insert(k, k);
                }
                black_box(tree.len())
            })
        });
    }
    group.finish();
}

fn bench_get(c: &mut Criterion) {
    let mut group = c.benchmark_group("get");
    for &size in &SIZES {
        let tree = RankTree::from_sorted_iter(32, (0..size as u64).map(|i| (i, i))).unwrap();
        let std_tree: BTreeMap<u64, u64> = (0..size as u64).map(|i| (i, i)).collect();
        let probes = shuffled_keys(size);

        group.bench_with_input(BenchmarkId::new("ranktree", size), &probes, |b, probes| {
            b.iter(|| {
                let mut hits = 0usize;
                for k in probes {
                    hits += tree.get(k).is_some() as usize;
                }
                black_box(hits)
            })
        });
        group.bench_with_input(BenchmarkId::new("btreemap", size), &probes, |b, probes| {
            b.iter(|| {
                let mut hits = 0usize;
                for k in probes {
                    hits += std_tree.get(k).is_some() as usize;
                }
                black_box(hits)
            })
        });
    }
    group.finish();
}

fn bench_rank(c: &mut Criterion) {
    let mut group = c.benchmark_group("rank");
    for &size in &SIZES {
        let tree = RankTree::from_sorted_iter(32, (0..size as u64).map(|i| (i, i))).unwrap();
        let ranks: Vec<usize> = {
            let mut r: Vec<usize> = (0..size).collect();
            r.shuffle(&mut StdRng::seed_from_u64(2));
            r
        };

        group.bench_with_input(BenchmarkId::new("get_by_rank", size), &ranks, |b, ranks| {
            b.iter(|| {
                let mut sum = 0u64;
                for &r in ranks {
                    if let Some((k, _)) = tree.get_by_rank(r) {
                        sum = sum.wrapping_add(*k);
                    }
                }
                black_box(sum)
            })
        });
        group.bench_with_input(BenchmarkId::new("rank_of_key", size), &ranks, |b, ranks| {
            b.iter(|| {
                let mut sum = 0usize;
                for &r in ranks {
                    sum = sum.wrapping_add(tree.rank_of_key(&(r as u64)).unwrap_or(0));
                }
                black_box(sum)
            })
        });
        // The naive alternative a plain ordered map offers.
        let std_tree: BTreeMap<u64, u64> = (0..size as u64).map(|i| (i, i)).collect();
        group.bench_with_input(
            BenchmarkId::new("btreemap_nth", size),
            &ranks[..16.min(ranks.len())],
            |b, ranks| {
                b.iter(|| {
                    let mut sum = 0u64;
                    for &r in ranks {
                        if let Some((k, _)) = std_tree.iter().nth(r) {
                            sum = sum.wrapping_add(*k);
                        }
                    }
                    black_box(sum)
                })
            },
        );
    }
    group.finish();
}

fn bench_remove(c: &mut Criterion) {
    let mut group = c.benchmark_group("remove");
    for &size in &SIZES {
        let keys = shuffled_keys(size);
        group.bench_with_input(BenchmarkId::new("shuffled", size), &keys, |b, keys| {
            b.iter_batched(
                || RankTree::from_sorted_iter(32, (0..size as u64).map(|i| (i, i))).unwrap(),
                |mut tree| {
                    for k in keys {
                        tree.remove(k);
                    }
                    black_box(tree.is_empty())
                },
                criterion::BatchSize::LargeInput,
            )
        });
    }
    group.finish();
}

fn bench_iteration(c: &mut Criterion) {
    let mut group = c.benchmark_group("iteration");
    for &size in &SIZES {
        let tree = RankTree::from_sorted_iter(32, (0..size as u64).map(|i| (i, i))).unwrap();
        group.bench_with_input(BenchmarkId::new("full_scan", size), &tree, |b, tree| {
            b.iter(|| black_box(tree.iter().count()))
        });
        group.bench_with_input(BenchmarkId::new("range_1pct", size), &tree, |b, tree| {
            let lo = size as u64 / 2;
            let hi = lo + (size as u64 / 100).max(1);
            b.iter(|| black_box(tree.range(lo..hi).count()))
        });
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_insert,
    bench_get,
    bench_rank,
    bench_remove,
    bench_iteration
);
criterion_main!(benches);
