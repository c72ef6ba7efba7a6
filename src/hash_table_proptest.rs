#![cfg(test)]

// Property tests for HashTable kept inside the crate so the collision key
// can implement HashKey next to the table it stresses.

use crate::config::TableConfig;
use crate::error::{Error, Result};
use crate::hash_table::HashTable;
use crate::key::HashKey;
use crate::prime::is_prime;
use proptest::prelude::*;
use std::borrow::Cow;
use std::collections::{BTreeMap, HashMap};

// The reference (min, max, resize) configurations.
fn config(i: usize) -> TableConfig {
    let (min, max, resize) = [(0.0, 0.5, 2.0), (0.0, 1.0, 1.2), (0.33, 1.0, 1.5)][i];
    TableConfig::default()
        .with_min_load_factor(min)
        .with_max_load_factor(max)
        .with_resize_factor(resize)
}

// Pool-indexed operations: indices shrink to earlier keys, the pool shrinks,
// and op lists shrink in length.
#[derive(Clone, Debug)]
enum Op {
    Put(usize, i32),
    Remove(usize),
    Get(usize),
    HasKey(String),
    Iterate,
    RoundTrip,
}

fn arb_scenario() -> impl Strategy<Value = (usize, usize, Vec<String>, Vec<Op>)> {
    (0usize..3, 1usize..40, proptest::collection::vec("[a-z]{1,5}", 1..=24)).prop_flat_map(
        |(cfg, size, pool)| {
            let idx = 0..pool.len();
            let op = prop_oneof![
                4 => (idx.clone(), any::<i32>()).prop_map(|(i, v)| Op::Put(i, v)),
                3 => idx.clone().prop_map(Op::Remove),
                2 => idx.clone().prop_map(Op::Get),
                1 => "[a-z]{1,5}".prop_map(Op::HasKey),
                1 => Just(Op::Iterate),
                1 => Just(Op::RoundTrip),
            ];
            proptest::collection::vec(op, 1..120).prop_map(move |ops| (cfg, size, pool.clone(), ops))
        },
    )
}

fn check_window<K: HashKey, V>(t: &HashTable<K, V>, cfg: &TableConfig) {
    assert!(is_prime(t.capacity()), "capacity {} not prime", t.capacity());
    assert!(t.load_factor() <= cfg.max_load_factor);
    if !t.is_empty() {
        assert!(
            t.load_factor() >= cfg.min_load_factor,
            "load factor {} below {} at {} / {}",
            t.load_factor(),
            cfg.min_load_factor,
            t.len(),
            t.capacity()
        );
    }
}

// Property: state-machine equivalence against std::collections::HashMap.
// Invariants exercised across random operation sequences:
// - `has_key(k)` is true iff `k` was put and not removed since.
// - `put` returns the previous value; `remove`/`get` agree with the model or
//   fail with `KeyNotFound`.
// - `iter` yields each live entry exactly once.
// - `read(export())` reproduces the mapping.
// - After every op: capacity is prime and the load factor sits in the window.
proptest! {
    #![proptest_config(ProptestConfig { cases: 96, .. ProptestConfig::default() })]
    #[test]
    fn prop_state_machine((cfg_idx, size, pool, ops) in arb_scenario()) {
        let cfg = config(cfg_idx);
        let mut sut: HashTable<String, i32> = HashTable::with_config(size, cfg).unwrap();
        let mut model: HashMap<String, i32> = HashMap::new();

        for op in ops {
            match op {
                Op::Put(i, v) => {
                    let k = pool[i].clone();
                    let prev = sut.put(k.clone(), v).unwrap();
                    prop_assert_eq!(prev, model.insert(k, v));
                }
                Op::Remove(i) => {
                    let k = &pool[i];
                    match model.remove(k) {
                        Some(mv) => prop_assert_eq!(sut.remove(k.as_str()), Ok(mv)),
                        None => prop_assert_eq!(sut.remove(k.as_str()), Err(Error::KeyNotFound)),
                    }
                }
                Op::Get(i) => {
                    let k = &pool[i];
                    prop_assert_eq!(sut.get(k.as_str()).ok(), model.get(k));
                    prop_assert_eq!(sut.has_key(k.as_str()), model.contains_key(k));
                }
                Op::HasKey(s) => {
                    prop_assert_eq!(sut.has_key(s.as_str()), model.contains_key(&s));
                }
                Op::Iterate => {
                    let seen: BTreeMap<String, i32> =
                        sut.iter().map(|(k, v)| (k.clone(), *v)).collect();
                    prop_assert_eq!(seen.len(), sut.len());
                    let expected: BTreeMap<String, i32> =
                        model.iter().map(|(k, v)| (k.clone(), *v)).collect();
                    prop_assert_eq!(seen, expected);
                }
                Op::RoundTrip => {
                    let back: HashTable<String, i32> = HashTable::read(&sut.export()).unwrap();
                    prop_assert_eq!(back.len(), model.len());
                    for (k, v) in &model {
                        prop_assert_eq!(back.get(k.as_str()), Ok(v));
                    }
                }
            }

            prop_assert_eq!(sut.len(), model.len());
            prop_assert_eq!(sut.is_empty(), model.is_empty());
            check_window(&sut, &cfg);
        }
    }
}

// Every key encodes to the same bytes, so every key shares one home slot and
// one stride. Lookups then rely entirely on equality and tombstone skipping.
#[derive(Clone, Debug, PartialEq, Eq)]
struct Colliding(String);

impl HashKey for Colliding {
    fn key_bytes(&self) -> Result<Cow<'_, [u8]>> {
        Ok(Cow::Borrowed(b"same"))
    }
}

// Property: same model equivalence under worst-case collisions. With the
// max-load-1 configurations tombstones pile up and force in-place rebuilds.
proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]
    #[test]
    fn prop_state_machine_with_collisions((cfg_idx, size, pool, ops) in arb_scenario()) {
        let cfg = config(cfg_idx);
        let mut sut: HashTable<Colliding, i32> = HashTable::with_config(size, cfg).unwrap();
        let mut model: HashMap<String, i32> = HashMap::new();

        for op in ops {
            match op {
                Op::Put(i, v) => {
                    let k = pool[i].clone();
                    let prev = sut.put(Colliding(k.clone()), v).unwrap();
                    prop_assert_eq!(prev, model.insert(k, v));
                }
                Op::Remove(i) => {
                    let k = &pool[i];
                    let got = sut.remove(&Colliding(k.clone())).ok();
                    prop_assert_eq!(got, model.remove(k));
                }
                Op::Get(i) => {
                    let k = &pool[i];
                    prop_assert_eq!(sut.get(&Colliding(k.clone())).ok(), model.get(k));
                }
                Op::HasKey(s) => {
                    prop_assert_eq!(sut.has_key(&Colliding(s.clone())), model.contains_key(&s));
                }
                Op::Iterate | Op::RoundTrip => {
                    let seen: BTreeMap<String, i32> =
                        sut.iter().map(|(k, v)| (k.0.clone(), *v)).collect();
                    let expected: BTreeMap<String, i32> =
                        model.iter().map(|(k, v)| (k.clone(), *v)).collect();
                    prop_assert_eq!(seen, expected);
                }
            }

            prop_assert_eq!(sut.len(), model.len());
            check_window(&sut, &cfg);
        }
    }
}

// Any configuration that passes validation, not just the reference three.
fn arb_valid_config() -> impl Strategy<Value = TableConfig> {
    (
        prop_oneof![Just(0.0), 0.0f64..=0.5],
        0.05f64..=1.0,
        1.01f64..4.0,
    )
        .prop_map(|(min, max, resize)| {
            TableConfig::default()
                .with_min_load_factor(min)
                .with_max_load_factor(max)
                .with_resize_factor(resize)
        })
        .prop_filter("configuration must validate", |c| c.validate().is_ok())
}

#[derive(Clone, Debug)]
enum WindowOp {
    Put(u16),
    Remove(u16),
}

fn arb_window_op() -> impl Strategy<Value = WindowOp> {
    prop_oneof![
        3 => (0u16..300).prop_map(WindowOp::Put),
        2 => (0u16..300).prop_map(WindowOp::Remove),
    ]
}

// Property: for every validated configuration the load factor stays inside
// [min, max] after each put and remove, whatever size the table starts at.
proptest! {
    #![proptest_config(ProptestConfig {
        cases: 128,
        max_global_rejects: 4096,
        .. ProptestConfig::default()
    })]
    #[test]
    fn prop_window_holds_for_any_valid_config(
        cfg in arb_valid_config(),
        size in 0usize..200,
        ops in proptest::collection::vec(arb_window_op(), 1..400),
    ) {
        let mut sut: HashTable<u16, u16> = HashTable::with_config(size, cfg).unwrap();
        let mut model: HashMap<u16, u16> = HashMap::new();
        for op in ops {
            match op {
                WindowOp::Put(k) => {
                    prop_assert_eq!(sut.put(k, k).unwrap(), model.insert(k, k));
                }
                WindowOp::Remove(k) => {
                    prop_assert_eq!(sut.remove(&k).ok(), model.remove(&k));
                }
            }
            prop_assert_eq!(sut.len(), model.len());
            check_window(&sut, &cfg);
        }
        for (k, v) in &model {
            prop_assert_eq!(sut.get(k), Ok(v));
        }
    }
}
