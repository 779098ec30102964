#![cfg(test)]

// Property tests for KeyedSet kept inside the crate so they can look at
// store-level details such as tombstone counts.

use crate::{AddError, IdSet, KeyTable, KeyedSet};
use proptest::prelude::*;
use serde_json::Value;
use std::collections::BTreeMap;

// Model identity: (type tag, text). Mirrors the tag separation of the
// default policy without reusing its code.
fn model_key(v: &Value) -> Option<(u8, String)> {
    match v {
        Value::String(s) => Some((0, s.clone())),
        Value::Number(n) => n.as_i64().map(|i| (1, i.to_string())),
        _ => None,
    }
}

fn arb_value() -> impl Strategy<Value = Value> {
    prop_oneof![
        4 => "[a-c1-2]{0,2}".prop_map(Value::from),
        4 => (0i64..6).prop_map(Value::from),
        1 => Just(Value::Null),
        1 => any::<bool>().prop_map(Value::from),
    ]
}

#[derive(Clone, Debug)]
enum Op {
    Add(usize),
    Remove(usize),
    Contains(Value),
    Iterate,
    Compact,
    Clear,
}

fn arb_scenario() -> impl Strategy<Value = (Vec<Value>, Vec<Op>)> {
    proptest::collection::vec(arb_value(), 1..=8).prop_flat_map(|pool| {
        let idxs: Vec<usize> = (0..pool.len()).collect();
        let idx = proptest::sample::select(idxs);
        let op = prop_oneof![
            6 => idx.clone().prop_map(Op::Add),
            4 => idx.clone().prop_map(Op::Remove),
            2 => arb_value().prop_map(Op::Contains),
            1 => Just(Op::Iterate),
            1 => Just(Op::Compact),
            1 => Just(Op::Clear),
        ];
        proptest::collection::vec(op, 1..60).prop_map(move |ops| (pool.clone(), ops))
    })
}

// Property: state-machine equivalence against a BTreeMap model.
// Invariants exercised across random operation sequences:
// - `try_add` fails exactly for unsupported values and present keys.
// - `take` returns the stored representative, which is the first instance added.
// - `contains` parity with the model; unsupported values are never members.
// - `for_each` visits each live member exactly once; tombstones are skipped.
// - `len` equals the traversal count after every operation.
proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]
    #[test]
    fn prop_state_machine((pool, ops) in arb_scenario()) {
        let mut sut = IdSet::new();
        let mut model: BTreeMap<(u8, String), Value> = BTreeMap::new();

        for op in ops {
            match op {
                Op::Add(i) => {
                    let v = pool[i].clone();
                    let mk = model_key(&v);
                    match sut.try_add(v.clone()) {
                        Ok(()) => {
                            let mk = mk.expect("only supported values are stored");
                            prop_assert!(model.insert(mk, v).is_none());
                        }
                        Err(AddError::Unsupported) => prop_assert!(mk.is_none()),
                        Err(AddError::Duplicate) => {
                            prop_assert!(mk.map_or(false, |k| model.contains_key(&k)));
                        }
                        Err(AddError::Rejected) => prop_assert!(false, "default policy never rejects"),
                    }
                }
                Op::Remove(i) => {
                    let v = &pool[i];
                    let expected = model_key(v).and_then(|k| model.remove(&k));
                    prop_assert_eq!(sut.take(v), expected);
                }
                Op::Contains(v) => {
                    let expected = model_key(&v).map_or(false, |k| model.contains_key(&k));
                    prop_assert_eq!(sut.contains(&v), expected);
                }
                Op::Iterate => {
                    let mut seen: BTreeMap<(u8, String), Value> = BTreeMap::new();
                    sut.for_each(|v| {
                        let k = model_key(v).expect("stored values are supported");
                        assert!(seen.insert(k, v.clone()).is_none(), "visited twice");
                    });
                    prop_assert_eq!(&seen, &model);
                }
                Op::Compact => {
                    sut.compact();
                    prop_assert_eq!(sut.tombstones(), 0);
                }
                Op::Clear => {
                    sut.clear();
                    model.clear();
                }
            }

            let mut count = 0usize;
            sut.for_each(|_| count += 1);
            prop_assert_eq!(sut.len(), model.len());
            prop_assert_eq!(count, model.len());
            prop_assert_eq!(sut.is_empty(), model.is_empty());
        }
    }
}

// Property: adding twice is the same as adding once, and removal undoes a
// fresh add.
proptest! {
    #[test]
    fn prop_idempotent_add_and_round_trip(seed in proptest::collection::vec(arb_value(), 0..10), v in arb_value()) {
        let mut once: IdSet = seed.iter().cloned().collect();
        let mut twice = once.clone();
        once.add(v.clone());
        twice.add(v.clone()).add(v.clone());
        prop_assert_eq!(once.len(), twice.len());
        prop_assert!(once == twice);

        if model_key(&v).is_some() {
            prop_assert!(once.contains(&v));
            once.remove(&v);
            prop_assert!(!once.contains(&v));
        } else {
            prop_assert!(!once.contains(&v));
        }
    }
}

#[derive(Clone, Default)]
struct ConstBuildHasher;
struct ConstHasher;
impl std::hash::BuildHasher for ConstBuildHasher {
    type Hasher = ConstHasher;
    fn build_hasher(&self) -> Self::Hasher {
        ConstHasher
    }
}
impl std::hash::Hasher for ConstHasher {
    fn write(&mut self, _bytes: &[u8]) {}
    fn finish(&self) -> u64 {
        0
    }
}

// Property: membership is unaffected by worst-case hash collisions in the
// store's index.
proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]
    #[test]
    fn prop_membership_with_collisions(adds in proptest::collection::vec(0i64..20, 0..30), removes in proptest::collection::vec(0i64..20, 0..30)) {
        let mut sut: KeyedSet<i64, crate::IdKeys, KeyTable<i64, ConstBuildHasher>> = KeyedSet::with_hasher(ConstBuildHasher);
        let mut model = std::collections::BTreeSet::new();
        for a in &adds {
            sut.add(*a);
            model.insert(*a);
        }
        for r in &removes {
            sut.remove(r);
            model.remove(r);
        }
        for x in 0i64..20 {
            prop_assert_eq!(sut.contains(&x), model.contains(&x));
        }
        prop_assert_eq!(sut.len(), model.len());
    }
}
