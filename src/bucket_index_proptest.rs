#![cfg(test)]

// Property tests for BucketIndex kept inside the crate so they can call the
// test-only consistency check.

use crate::bucket_index::BucketIndex;
use crate::config::IndexConfig;
use proptest::prelude::*;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::hash::{BuildHasher, Hasher};

// Key newtype with Borrow<str> to exercise borrowed lookup.
#[derive(Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
struct Key(String);
impl fmt::Debug for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}
impl std::borrow::Borrow<str> for Key {
    fn borrow(&self) -> &str {
        &self.0
    }
}

// Pool-indexed operations to improve shrinking: indices shrink to earlier keys,
// pool length shrinks, and op lists shrink in length.
#[derive(Clone, Debug)]
enum OpI {
    Insert(usize, i32),
    Remove(usize),
    Get(usize),
    Contains(String),
    Mutate(usize, i32),
    Iterate,
    Clear,
}

fn key_from(pool: &[String], i: usize) -> Key {
    Key(pool[i].clone())
}

fn arb_scenario() -> impl Strategy<Value = (Vec<String>, Vec<OpI>)> {
    proptest::collection::vec("[a-z]{0,5}", 1..=24).prop_flat_map(|pool| {
        let idxs: Vec<usize> = (0..pool.len()).collect();
        let idx = proptest::sample::select(idxs);
        let contains_pool = proptest::sample::select(pool.clone());
        let op = prop_oneof![
            4 => (idx.clone(), any::<i32>()).prop_map(|(i, v)| OpI::Insert(i, v)),
            2 => idx.clone().prop_map(OpI::Remove),
            1 => idx.clone().prop_map(OpI::Get),
            1 => prop_oneof![
                contains_pool.prop_map(|s: String| s),
                "[a-z]{0,5}".prop_map(|s| s)
            ]
            .prop_map(OpI::Contains),
            1 => (idx.clone(), any::<i32>()).prop_map(|(i, d)| OpI::Mutate(i, d)),
            1 => Just(OpI::Iterate),
            1 => Just(OpI::Clear),
        ];
        proptest::collection::vec(op, 1..80).prop_map(move |ops| (pool.clone(), ops))
    })
}

fn run_against_model<S: BuildHasher>(
    mut sut: BucketIndex<Key, i32, S>,
    pool: Vec<String>,
    ops: Vec<OpI>,
) -> Result<(), TestCaseError> {
    let mut model: BTreeMap<Key, i32> = BTreeMap::new();
    for op in ops {
        match op {
            OpI::Insert(i, v) => {
                let k = key_from(&pool, i);
                let before = sut.bucket_count();
                let prev = sut.insert(k.clone(), v);
                prop_assert_eq!(prev, model.insert(k, v), "overwrite returns old value");
                if prev.is_some() {
                    prop_assert_eq!(sut.bucket_count(), before, "overwrite must not resize");
                }
            }
            OpI::Remove(i) => {
                let k = key_from(&pool, i);
                let got = sut.remove(&k);
                prop_assert_eq!(got, model.remove_entry(&k));
                prop_assert!(!sut.contains(&k));
            }
            OpI::Get(i) => {
                let k = key_from(&pool, i);
                prop_assert_eq!(sut.get(&k), model.get(&k));
            }
            OpI::Contains(s) => {
                let has = sut.contains(s.as_str());
                let has_model = model.keys().any(|k| k.0 == s);
                prop_assert_eq!(has, has_model);
            }
            OpI::Mutate(i, d) => {
                let k = key_from(&pool, i);
                match (sut.get_mut(&k), model.get_mut(&k)) {
                    (Some(v), Some(mv)) => {
                        *v = v.saturating_add(d);
                        *mv = mv.saturating_add(d);
                    }
                    (None, None) => {}
                    _ => {
                        prop_assert!(false, "get_mut presence disagrees with model");
                    }
                }
            }
            OpI::Iterate => {
                let seen: Vec<(Key, i32)> = sut.iter().map(|(k, v)| (k.clone(), *v)).collect();
                prop_assert_eq!(seen.len(), model.len(), "each entry exactly once");
                let as_set: BTreeSet<Key> = seen.iter().map(|(k, _)| k.clone()).collect();
                prop_assert_eq!(as_set.len(), seen.len(), "no duplicates");
                let as_map: BTreeMap<Key, i32> = seen.into_iter().collect();
                prop_assert_eq!(&as_map, &model);
            }
            OpI::Clear => {
                sut.clear();
                model.clear();
            }
        }

        // Post-conditions after each op
        sut.assert_consistent();
        prop_assert_eq!(sut.len(), model.len());
        prop_assert_eq!(sut.is_empty(), model.is_empty());
    }
    Ok(())
}

// Property: state-machine equivalence against std::collections::BTreeMap.
// Starting from a single bucket forces many resizes along the way.
// Invariants exercised across random operation sequences:
// - `insert` overwrites and returns the previous value; overwrites never resize.
// - `remove` returns the owned entry and `len` tracks the model exactly.
// - `get`/`contains` parity, including borrowed `&str` lookup.
// - `iter` yields each live entry exactly once.
// - After every op: `len == Σ bucket.len()`, every bucket is a valid BST,
//   every entry sits in `hash % bucket_count`, and the load factor holds.
proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]
    #[test]
    fn prop_state_machine((pool, ops) in arb_scenario()) {
        let sut: BucketIndex<Key, i32> = BucketIndex::with_config(
            IndexConfig::new().with_initial_buckets(1),
        ).unwrap();
        run_against_model(sut, pool, ops)?;
    }
}

// Collision variant using a constant hasher: every key lands in one bucket
// tree, so all ordering work happens inside a single OrderedTree.
#[derive(Clone, Default)]
struct ConstBuildHasher;
struct ConstHasher;
impl BuildHasher for ConstBuildHasher {
    type Hasher = ConstHasher;
    fn build_hasher(&self) -> Self::Hasher {
        ConstHasher
    }
}
impl Hasher for ConstHasher {
    fn write(&mut self, _bytes: &[u8]) {}
    fn finish(&self) -> u64 {
        0
    }
}

proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]
    #[test]
    fn prop_state_machine_with_collisions((pool, ops) in arb_scenario()) {
        let sut: BucketIndex<Key, i32, ConstBuildHasher> = BucketIndex::with_config_and_hasher(
            IndexConfig::new().with_initial_buckets(2),
            ConstBuildHasher,
        ).unwrap();
        run_against_model(sut, pool, ops)?;
    }
}
