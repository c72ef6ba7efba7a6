#![cfg(test)]

// Property tests for MaxHeap against a plain Vec model.

use crate::error::Error;
use crate::max_heap::{heap_sort, MaxHeap};
use proptest::prelude::*;

#[derive(Clone, Debug)]
enum Op {
    Add(i16),
    Remove,
    // Index into the model's current priorities, reduced modulo its length.
    RemoveArbitrary(usize),
    RemoveMissing,
    Sort,
}

fn arb_op() -> impl Strategy<Value = Op> {
    prop_oneof![
        5 => (-40i16..40).prop_map(Op::Add),
        2 => Just(Op::Remove),
        3 => any::<usize>().prop_map(Op::RemoveArbitrary),
        1 => Just(Op::RemoveMissing),
        1 => Just(Op::Sort),
    ]
}

fn model_max(model: &[i16]) -> Option<i16> {
    model.iter().copied().max()
}

// Property: heap order holds after every op, `remove` always yields the
// model's maximum, `remove_arbitrary` never leaves the removed entry behind,
// and `sort` matches the model sorted descending.
proptest! {
    #![proptest_config(ProptestConfig { cases: 128, .. ProptestConfig::default() })]
    #[test]
    fn prop_heap_matches_model(cap in 0usize..6, ops in proptest::collection::vec(arb_op(), 1..150)) {
        let mut sut: MaxHeap<i16, u32> = MaxHeap::with_capacity(cap);
        let mut model: Vec<i16> = Vec::new();
        let mut next_id = 0u32;

        for op in ops {
            match op {
                Op::Add(p) => {
                    sut.add(p, next_id);
                    next_id += 1;
                    model.push(p);
                }
                Op::Remove => match model_max(&model) {
                    Some(max) => {
                        let (p, _) = sut.remove().unwrap();
                        prop_assert_eq!(p, max);
                        let at = model.iter().position(|&m| m == max).unwrap();
                        model.swap_remove(at);
                    }
                    None => prop_assert_eq!(sut.remove(), Err(Error::EmptyHeap)),
                },
                Op::RemoveArbitrary(raw) => {
                    if model.is_empty() {
                        prop_assert_eq!(sut.remove_arbitrary(&0), Err(Error::ElementNotFound));
                    } else {
                        let target = model[raw % model.len()];
                        let before = sut.iter().filter(|(p, _)| **p == target).count();
                        let (p, id) = sut.remove_arbitrary(&target).unwrap();
                        prop_assert_eq!(p, target);
                        prop_assert!(sut.iter().all(|(_, v)| *v != id));
                        let after = sut.iter().filter(|(p, _)| **p == target).count();
                        prop_assert_eq!(after + 1, before);
                        let at = model.iter().position(|&m| m == target).unwrap();
                        model.swap_remove(at);
                    }
                }
                Op::RemoveMissing => {
                    prop_assert_eq!(sut.remove_arbitrary(&i16::MAX), Err(Error::ElementNotFound));
                }
                Op::Sort => {
                    let sorted: Vec<i16> = sut.sort().into_iter().map(|(p, _)| p).collect();
                    let mut expected = model.clone();
                    expected.sort_unstable_by(|a, b| b.cmp(a));
                    prop_assert_eq!(sorted, expected);
                    prop_assert_eq!(sut.len(), model.len());
                }
            }

            prop_assert!(sut.is_heap());
            prop_assert_eq!(sut.len(), model.len());
            prop_assert!(sut.capacity() >= sut.len());
            prop_assert_eq!(sut.peek().map(|(p, _)| *p), model_max(&model));
        }
    }
}

proptest! {
    #[test]
    fn prop_heap_sort_ascending(values in proptest::collection::vec((any::<i32>(), any::<u8>()), 0..200)) {
        let sorted = heap_sort(values.clone());
        let mut expected: Vec<i32> = values.iter().map(|(p, _)| *p).collect();
        expected.sort_unstable();
        let got: Vec<i32> = sorted.iter().map(|(p, _)| *p).collect();
        prop_assert_eq!(got, expected);

        // Same multiset of pairs: nothing lost or duplicated.
        let mut a = values;
        let mut b = sorted;
        a.sort_unstable();
        b.sort_unstable();
        prop_assert_eq!(a, b);
    }

    #[test]
    fn prop_from_entries_is_heap(values in proptest::collection::vec(-100i32..100, 0..120)) {
        let heap: MaxHeap<i32, ()> = values.iter().map(|&p| (p, ())).collect();
        prop_assert!(heap.is_heap());
        prop_assert_eq!(heap.len(), values.len());
    }
}
