use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};
use netsim_containers::{HashTable, TableConfig};
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

fn filled(seed: u64, n: usize) -> (HashTable<String, u64>, Vec<String>) {
    let mut t = HashTable::with_capacity(1);
    let keys: Vec<_> = lcg(seed).take(n).map(key).collect();
    for (i, k) in keys.iter().enumerate() {
        t.put(k.clone(), i as u64).unwrap();
    }
    (t, keys)
}

fn bench_insert(c: &mut Criterion) {
    c.bench_function("hash_table_put_10k_from_one_slot", |b| {
        b.iter_batched(
            || lcg(1).take(10_000).map(key).collect::<Vec<_>>(),
            |keys| {
                let mut t = HashTable::with_capacity(1);
                for (i, k) in keys.into_iter().enumerate() {
                    t.put(k, i as u64).unwrap();
                }
                black_box(t)
            },
            BatchSize::SmallInput,
        )
    });
}

fn bench_get_hit(c: &mut Criterion) {
    c.bench_function("hash_table_get_hit", |b| {
        let (t, keys) = filled(7, 20_000);
        let mut it = keys.iter().cycle();
        b.iter(|| {
            let k = it.next().unwrap();
            black_box(t.get(k.as_str()).unwrap());
        })
    });
}

fn bench_get_miss(c: &mut Criterion) {
    c.bench_function("hash_table_get_miss", |b| {
        let (t, _) = filled(11, 10_000);
        let mut miss = lcg(0xdead_beef);
        b.iter(|| {
            let k = key(miss.next().unwrap());
            black_box(t.has_key(k.as_str()));
        })
    });
}

// Grow to 10k then drain with a min load factor, so removals trigger shrinks.
fn bench_drain_with_shrink(c: &mut Criterion) {
    let cfg = TableConfig::default()
        .with_min_load_factor(0.33)
        .with_max_load_factor(1.0)
        .with_resize_factor(1.5);
    c.bench_function("hash_table_drain_10k_shrinking", |b| {
        b.iter_batched(
            || {
                let mut t = HashTable::with_config(1, cfg).unwrap();
                let keys: Vec<_> = lcg(3).take(10_000).map(key).collect();
                for (i, k) in keys.iter().enumerate() {
                    t.put(k.clone(), i as u64).unwrap();
                }
                (t, keys)
            },
            |(mut t, keys)| {
                for k in &keys {
                    black_box(t.remove(k.as_str()).unwrap());
                }
                black_box(t)
            },
            BatchSize::SmallInput,
        )
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
    targets = bench_insert, bench_get_hit, bench_get_miss, bench_drain_with_shrink
}
criterion_main!(benches);
