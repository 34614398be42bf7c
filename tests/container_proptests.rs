// Property tests over the public containers.
//
// Property 1: AssociativeMap tracks a BTreeMap model.
//  - Operations: set, remove, get.
//  - Invariant: len() == model.len(); get(k) == model[k] for every pool key;
//               entries() is exactly the model's entry set.
//
// Property 2: crossing the load-factor threshold preserves content.
//  - Before each insert that grows the bucket vector, snapshot the entry
//    set; afterwards the snapshot is still fully retrievable and the entry
//    set equals snapshot + the new entry.
//
// Property 3: ValueSet tracks a BTreeSet model.
use proptest::prelude::*;
use std::collections::{BTreeMap, BTreeSet};
use tree_hashmap::{AssociativeMap, IndexConfig, LookupError, ValueSet};

proptest! {
    #[test]
    fn prop_map_matches_model(keys in 1usize..=40, ops in proptest::collection::vec((0u8..=2u8, 0usize..1000usize, any::<i64>()), 1..200)) {
        let mut m: AssociativeMap<String, i64> = AssociativeMap::new();
        let mut model: BTreeMap<String, i64> = BTreeMap::new();

        for (op, raw_k, v) in ops {
            let key = format!("k{}", raw_k % keys);
            match op {
                0 => {
                    prop_assert_eq!(m.set(key.clone(), v), model.insert(key, v));
                }
                1 => {
                    prop_assert_eq!(m.remove(&key), model.remove(&key));
                    prop_assert!(!m.contains(&key));
                }
                2 => {
                    match model.get(&key) {
                        Some(expected) => {
                            prop_assert_eq!(m.get(&key), Ok(expected));
                        }
                        None => {
                            prop_assert_eq!(m.get(&key), Err(LookupError::KeyNotFound));
                        }
                    }
                }
                _ => unreachable!(),
            }
            prop_assert_eq!(m.len(), model.len());
        }

        let got: BTreeMap<String, i64> = m.entries().map(|(k, v)| (k.clone(), *v)).collect();
        prop_assert_eq!(got, model);
    }
}

proptest! {
    #[test]
    fn prop_resize_preserves_content(
        initial in 1usize..=8,
        factor in 0.25f32..=2.0f32,
        values in proptest::collection::btree_set(any::<u32>(), 1..300),
    ) {
        let config = IndexConfig::new()
            .with_initial_buckets(initial)
            .with_max_load_factor(factor);
        let mut m: AssociativeMap<u32, u64> = AssociativeMap::with_config(config).unwrap();
        let mut resizes = 0;

        for v in values {
            let before_buckets = m.bucket_count();
            let snapshot: BTreeMap<u32, u64> = m.entries().map(|(k, x)| (*k, *x)).collect();

            m.set(v, u64::from(v) * 3);
            prop_assert!(m.load_factor() <= f64::from(factor));

            if m.bucket_count() != before_buckets {
                resizes += 1;
                prop_assert!(m.bucket_count() > before_buckets);
                for (k, val) in &snapshot {
                    prop_assert_eq!(m.get(k), Ok(val));
                }
                let mut expected = snapshot;
                expected.insert(v, u64::from(v) * 3);
                let after: BTreeMap<u32, u64> = m.entries().map(|(k, x)| (*k, *x)).collect();
                prop_assert_eq!(m.entries().count(), after.len(), "no duplicates after resize");
                prop_assert_eq!(after, expected);
            }
        }
        prop_assert!(resizes > 0 || m.len() as f64 <= initial as f64 * f64::from(factor));
    }
}

proptest! {
    #[test]
    fn prop_set_matches_model(ops in proptest::collection::vec((any::<bool>(), 0u16..64), 1..200)) {
        let mut s: ValueSet<u16> = ValueSet::new();
        let mut model: BTreeSet<u16> = BTreeSet::new();
        for (insert, v) in ops {
            if insert {
                prop_assert_eq!(s.insert(v), model.insert(v));
            } else {
                prop_assert_eq!(s.remove(&v), model.remove(&v));
            }
            prop_assert_eq!(s.len(), model.len());
            prop_assert_eq!(s.contains(&v), model.contains(&v));
        }
        let got: BTreeSet<u16> = s.values().copied().collect();
        prop_assert_eq!(got, model);
    }
}
