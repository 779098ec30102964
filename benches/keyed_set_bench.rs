use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};
use keyed_set::{IdKeys, IdSet, KeyedSet};
use serde_json::Value;
use std::time::Duration;

fn lcg(mut s: u64) -> impl Iterator<Item = u64> {
    std::iter::from_fn(move || {
        s = s.wrapping_mul(6364136223846793005).wrapping_add(1);
        Some(s)
    })
}

fn key(n: u64) -> String {
    format!("k{:016x}", n)
}

fn filled(seed: u64, n: usize) -> KeyedSet<String> {
    lcg(seed).take(n).map(key).collect()
}

fn bench_add(c: &mut Criterion) {
    c.bench_function("keyed_set_add_10k", |b| {
        b.iter_batched(
            KeyedSet::<String, IdKeys>::new,
            |mut s| {
                for x in lcg(1).take(10_000) {
                    s.add(key(x));
                }
                black_box(s)
            },
            BatchSize::SmallInput,
        )
    });
}

fn bench_contains(c: &mut Criterion) {
    c.bench_function("keyed_set_contains_hit", |b| {
        let keys: Vec<_> = lcg(7).take(20_000).map(key).collect();
        let s: KeyedSet<String> = keys.iter().cloned().collect();
        let mut it = keys.iter().cycle();
        b.iter(|| black_box(s.contains(it.next().unwrap())))
    });

    c.bench_function("keyed_set_contains_miss", |b| {
        let s = filled(11, 10_000);
        let mut miss = lcg(0xdead_beef);
        b.iter(|| black_box(s.contains(&key(miss.next().unwrap()))))
    });
}

fn bench_remove_readd(c: &mut Criterion) {
    // Exercises tombstone revival on the same key.
    c.bench_function("keyed_set_remove_readd", |b| {
        let mut s = filled(3, 1_000);
        let k = key(lcg(3).next().unwrap());
        b.iter(|| {
            s.remove(&k);
            s.add(k.clone());
        })
    });
}

fn bench_algebra(c: &mut Criterion) {
    let a: IdSet = (0..5_000i64).map(Value::from).collect();
    let b: IdSet = (2_500..7_500i64).map(Value::from).collect();
    c.bench_function("keyed_set_union_5k", |bch| {
        bch.iter(|| black_box(a.union(&b)))
    });
    c.bench_function("keyed_set_intersection_5k", |bch| {
        bch.iter(|| black_box(a.intersection(&b)))
    });
    c.bench_function("keyed_set_is_subset_5k", |bch| {
        bch.iter(|| black_box(a.is_subset(&b)))
    });
}

fn bench_config() -> Criterion {
    Criterion::default()
        .sample_size(50)
        .measurement_time(Duration::from_secs(8))
        .warm_up_time(Duration::from_secs(2))
}

criterion_group! {
    name = benches;
    config = bench_config();
    targets = bench_add, bench_contains, bench_remove_readd, bench_algebra
}
criterion_main!(benches);
