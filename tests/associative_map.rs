use std::collections::BTreeMap;
use std::hash::{BuildHasher, Hasher};
use std::sync::{Arc, Mutex};
use tree_hashmap::{AssociativeMap, ConfigError, IndexConfig, LookupError};

/// Sends every key to the same hash so all keys collide.
#[derive(Clone, Default)]
struct FixedBuildHasher(u64);
struct FixedHasher(u64);
impl BuildHasher for FixedBuildHasher {
    type Hasher = FixedHasher;
    fn build_hasher(&self) -> Self::Hasher {
        FixedHasher(self.0)
    }
}
impl Hasher for FixedHasher {
    fn write(&mut self, _bytes: &[u8]) {}
    fn finish(&self) -> u64 {
        self.0
    }
}

#[test]
fn set_get_contains_remove() {
    let mut m = AssociativeMap::new();
    assert!(m.is_empty());
    assert_eq!(m.set("apple".to_string(), 5), None);
    assert_eq!(m.set("banana".to_string(), 2), None);
    assert_eq!(m.len(), 2);
    assert_eq!(m.get("apple"), Ok(&5));
    assert!(m.contains("banana"));
    assert!(!m.contains("grape"));
    assert_eq!(m.get("grape"), Err(LookupError::KeyNotFound));

    assert_eq!(m.remove("apple"), Some(5));
    assert_eq!(m.remove("apple"), None);
    assert!(!m.contains("apple"));
    assert_eq!(m.len(), 1);
}

#[test]
fn set_on_existing_key_overwrites() {
    let mut m = AssociativeMap::new();
    m.set("k", 1);
    assert_eq!(m.set("k", 2), Some(1));
    assert_eq!(m.get(&"k"), Ok(&2));
    assert_eq!(m.len(), 1);
}

#[test]
fn colliding_keys_share_bucket_two() {
    let config = IndexConfig::new()
        .with_initial_buckets(4)
        .with_max_load_factor(0.75);
    let mut m: AssociativeMap<&str, i32, FixedBuildHasher> =
        AssociativeMap::with_config_and_hasher(config, FixedBuildHasher(2)).unwrap();
    let keys = ["delta", "alpha", "charlie", "bravo"];
    for (i, k) in keys.iter().enumerate() {
        m.set(*k, i as i32);
    }
    assert_eq!(m.len(), 4);
    assert_eq!(m.bucket_of("alpha"), 2);
    assert_eq!(m.bucket_len(2), Some(4));
    for b in (0..m.bucket_count()).filter(|&b| b != 2) {
        assert_eq!(m.bucket_len(b), Some(0));
    }
    for (i, k) in keys.iter().enumerate() {
        assert_eq!(m.get(k), Ok(&(i as i32)));
    }
    // One bucket, so iteration is fully sorted.
    let order: Vec<&str> = m.keys().copied().collect();
    assert_eq!(order, vec!["alpha", "bravo", "charlie", "delta"]);
}

#[test]
fn crossing_load_factor_doubles_buckets_and_keeps_values() {
    let mut m = AssociativeMap::new();
    assert_eq!(m.bucket_count(), 8);
    for i in 0..6u32 {
        m.set(i, i * 100);
    }
    assert_eq!(m.bucket_count(), 8);
    let before: BTreeMap<u32, u32> = m.entries().map(|(k, v)| (*k, *v)).collect();

    m.set(6, 600);
    assert_eq!(m.bucket_count(), 16);
    assert!(m.load_factor() <= 0.75);
    for (k, v) in &before {
        assert_eq!(m.get(k), Ok(v));
    }
    assert_eq!(m.len(), 7);
}

#[test]
fn many_inserts_keep_every_key_retrievable() {
    let mut m = AssociativeMap::new();
    for i in 0..2_000u32 {
        m.set(format!("key-{i}"), i);
        assert!(m.load_factor() <= 0.75);
    }
    assert_eq!(m.len(), 2_000);
    assert_eq!(m.bucket_count(), 4096);
    for i in 0..2_000u32 {
        assert_eq!(m.get(format!("key-{i}").as_str()), Ok(&i));
    }
    assert_eq!(m.keys().count(), 2_000);
    assert_eq!(m.values().copied().sum::<u32>(), (0..2_000).sum());
}

#[test]
fn removing_everything_then_reusing() {
    let mut m: AssociativeMap<u16, u16> = (0..300).map(|i| (i, i)).collect();
    for i in 0..300 {
        assert_eq!(m.remove(&i), Some(i));
    }
    assert!(m.is_empty());
    assert_eq!(m.entries().count(), 0);
    m.extend([(1, 10), (2, 20)]);
    assert_eq!(m.get(&2), Ok(&20));
}

#[test]
fn clear_and_clone_are_independent() {
    let mut m: AssociativeMap<String, Vec<u8>> = AssociativeMap::new();
    m.set("a".into(), vec![1, 2]);
    let snapshot = m.clone();
    m.get_mut("a").unwrap().push(3);
    m.clear();
    assert!(m.is_empty());
    assert_eq!(snapshot.get("a"), Ok(&vec![1, 2]));
}

#[test]
fn debug_lists_entries() {
    let mut m = AssociativeMap::new();
    m.set(1, "one");
    assert_eq!(format!("{:?}", m), "{1: \"one\"}");
}

#[test]
fn invalid_config_is_an_error() {
    assert_eq!(
        AssociativeMap::<u8, u8>::with_config(IndexConfig::new().with_initial_buckets(0)).err(),
        Some(ConfigError::ZeroBuckets)
    );
    let zero_factor = IndexConfig::new().with_max_load_factor(0.0);
    assert!(AssociativeMap::<u8, u8>::with_config(zero_factor).is_err());
}

#[test]
fn unreachable_load_factor_is_rejected_up_front() {
    let tiny = IndexConfig::new()
        .with_initial_buckets(1)
        .with_max_load_factor(1e-30);
    assert_eq!(
        AssociativeMap::<u32, u32>::with_config(tiny).err(),
        Some(ConfigError::InvalidLoadFactor(1e-30))
    );

    let floor = tiny.with_max_load_factor(IndexConfig::MIN_MAX_LOAD_FACTOR);
    let mut m: AssociativeMap<u32, u32> = AssociativeMap::with_config(floor).unwrap();
    assert_eq!(m.set(1, 1), None);
    assert_eq!(m.get(&1), Ok(&1));
    assert_eq!(m.bucket_count(), 64);
}

#[test]
fn shared_across_threads_behind_a_mutex() {
    let m: Arc<Mutex<AssociativeMap<u32, u32>>> = Arc::new(Mutex::new(AssociativeMap::new()));
    let handles: Vec<_> = (0..4u32)
        .map(|t| {
            let m = Arc::clone(&m);
            std::thread::spawn(move || {
                for i in 0..250 {
                    m.lock().unwrap().set(t * 1000 + i, i);
                }
            })
        })
        .collect();
    for h in handles {
        h.join().unwrap();
    }
    let m = m.lock().unwrap();
    assert_eq!(m.len(), 1000);
    assert_eq!(m.get(&3_249), Ok(&249));
}

// Borrowing iteration and size queries need no bounds on K, V or S.
fn describe<K, V, S>(m: &AssociativeMap<K, V, S>) -> (usize, usize, bool) {
    (m.into_iter().count(), m.keys().len(), m.is_empty())
}

#[test]
fn borrowed_iteration_has_no_hashing_bounds() {
    let m: AssociativeMap<u8, &str> = [(1, "a"), (2, "b")].into_iter().collect();
    assert_eq!(describe(&m), (2, 2, false));
}
