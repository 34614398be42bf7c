//! BucketIndex: a vector of `OrderedTree` buckets selected by hash, grown by
//! doubling when the load factor is exceeded.
//!
//! Invariants
//! - `len == Σ bucket.len()` at every public boundary.
//! - An entry lives in bucket `hash % bucket_count` for the current count.
//! - Each entry stores the hash computed at insertion; rehashing uses the
//!   stored hash and never calls `K: Hash` again.
//! - After an insert returns, `len / bucket_count <= max_load_factor`,
//!   unless the bucket vector has reached the largest addressable size.
//!
//! Empty buckets own no arena, so a resize allocates the bucket vector plus
//! one arena per bucket that receives an entry.

use crate::config::IndexConfig;
use crate::error::ConfigError;
use crate::fnv::FnvBuildHasher;
use crate::ordered_tree::{self, OrderedTree};
use crate::reentrancy::DebugReentrancy;
use core::borrow::Borrow;
use core::fmt;
use core::hash::{BuildHasher, Hash};
use core::mem;

#[derive(Clone, Debug)]
struct Slot<V> {
    value: V,
    hash: u64,
}

type Bucket<K, V> = OrderedTree<K, Slot<V>>;

fn empty_buckets<K, V>(count: usize) -> Vec<Bucket<K, V>> {
    core::iter::repeat_with(OrderedTree::new).take(count).collect()
}

/// Largest bucket count whose vector stays within `isize::MAX` bytes.
fn max_bucket_count<K, V>() -> usize {
    isize::MAX as usize / mem::size_of::<Bucket<K, V>>().max(1)
}

#[inline]
fn slot_for(hash: u64, bucket_count: usize) -> usize {
    (hash % bucket_count as u64) as usize
}

/// Hash index whose buckets are [`OrderedTree`]s keyed on `K`.
#[derive(Clone)]
pub struct BucketIndex<K, V, S = FnvBuildHasher> {
    hasher: S,
    buckets: Vec<Bucket<K, V>>,
    len: usize,
    max_load_factor: f32,
    reentrancy: DebugReentrancy,
}

impl<K, V> BucketIndex<K, V>
where
    K: Ord + Hash,
{
    /// Default configuration with FNV-1a hashing.
    pub fn new() -> Self {
        Self::with_hasher(FnvBuildHasher)
    }

    /// Custom bucket count and load factor with FNV-1a hashing.
    pub fn with_config(config: IndexConfig) -> Result<Self, ConfigError> {
        Self::with_config_and_hasher(config, FnvBuildHasher)
    }
}

impl<K, V, S> BucketIndex<K, V, S> {
    /// Total entries across all buckets.
    pub fn len(&self) -> usize {
        self.len
    }

    /// True when no bucket holds an entry.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Length of the bucket vector; never shrinks.
    pub fn bucket_count(&self) -> usize {
        self.buckets.len()
    }

    /// Threshold above which an insert doubles the bucket count.
    pub fn max_load_factor(&self) -> f32 {
        self.max_load_factor
    }

    /// `len / bucket_count`.
    pub fn load_factor(&self) -> f64 {
        self.len as f64 / self.buckets.len() as f64
    }

    /// Number of entries in bucket `index`, or `None` if out of range.
    pub fn bucket_len(&self, index: usize) -> Option<usize> {
        self.buckets.get(index).map(OrderedTree::len)
    }

    /// Bucket-major, key-ascending within each bucket.
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter::new(&self.buckets, self.len)
    }
}

impl<K, V, S> BucketIndex<K, V, S>
where
    K: Ord + Hash,
    S: BuildHasher,
{
    /// Default configuration with a caller-supplied hasher.
    pub fn with_hasher(hasher: S) -> Self {
        let config = IndexConfig::default();
        Self {
            hasher,
            buckets: empty_buckets(config.initial_buckets),
            len: 0,
            max_load_factor: config.max_load_factor,
            reentrancy: DebugReentrancy::new(),
        }
    }

    /// Build an index from a validated `config`. The initial bucket vector
    /// must also fit in memory for this `K`/`V`.
    pub fn with_config_and_hasher(config: IndexConfig, hasher: S) -> Result<Self, ConfigError> {
        config.validate()?;
        let limit = max_bucket_count::<K, V>();
        if config.initial_buckets > limit {
            return Err(ConfigError::TooManyBuckets {
                requested: config.initial_buckets,
                limit,
            });
        }
        Ok(Self {
            hasher,
            buckets: empty_buckets(config.initial_buckets),
            len: 0,
            max_load_factor: config.max_load_factor,
            reentrancy: DebugReentrancy::new(),
        })
    }

    fn make_hash<Q>(&self, q: &Q) -> u64
    where
        Q: ?Sized + Hash,
    {
        self.hasher.hash_one(q)
    }

    /// Bucket that `q` maps to under the current bucket count.
    pub fn bucket_of<Q>(&self, q: &Q) -> usize
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash,
    {
        slot_for(self.make_hash(q), self.buckets.len())
    }

    /// Insert or overwrite. Returns the previous value for an existing key;
    /// a new key may trigger a resize before this returns.
    pub fn insert(&mut self, key: K, value: V) -> Option<V> {
        {
            let _g = self.reentrancy.enter("insert");
            let hash = self.make_hash(&key);
            let index = slot_for(hash, self.buckets.len());
            let previous = self.buckets[index].insert(key, Slot { value, hash });
            if let Some(old) = previous {
                tracing::trace!(bucket = index, "overwrote value of existing key");
                return Some(old.value);
            }
            self.len += 1;
        }
        self.maybe_grow();
        None
    }

    /// Hash `q`, then search only its bucket's tree.
    pub fn get<Q>(&self, q: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Ord,
    {
        let _g = self.reentrancy.enter("get");
        let index = slot_for(self.make_hash(q), self.buckets.len());
        self.buckets[index].get(q).map(|s| &s.value)
    }

    pub fn get_key_value<Q>(&self, q: &Q) -> Option<(&K, &V)>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Ord,
    {
        let _g = self.reentrancy.enter("get_key_value");
        let index = slot_for(self.make_hash(q), self.buckets.len());
        self.buckets[index]
            .get_key_value(q)
            .map(|(k, s)| (k, &s.value))
    }

    pub fn get_mut<Q>(&mut self, q: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Ord,
    {
        let _g = self.reentrancy.enter("get_mut");
        let index = slot_for(self.hasher.hash_one(q), self.buckets.len());
        self.buckets[index].get_mut(q).map(|s| &mut s.value)
    }

    pub fn contains<Q>(&self, q: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Ord,
    {
        let _g = self.reentrancy.enter("contains");
        let index = slot_for(self.make_hash(q), self.buckets.len());
        self.buckets[index].contains(q)
    }

    /// Remove `q`, returning its entry. `len` only changes when the bucket
    /// actually held the key.
    pub fn remove<Q>(&mut self, q: &Q) -> Option<(K, V)>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Ord,
    {
        let _g = self.reentrancy.enter("remove");
        let index = slot_for(self.hasher.hash_one(q), self.buckets.len());
        let (key, slot) = self.buckets[index].remove(q)?;
        self.len -= 1;
        Some((key, slot.value))
    }

    /// Drop every entry; the bucket count is kept.
    pub fn clear(&mut self) {
        let _g = self.reentrancy.enter("clear");
        for bucket in &mut self.buckets {
            bucket.clear();
        }
        self.len = 0;
    }

    /// Double the bucket count until the load factor holds again. Growth
    /// stops at the largest count a `Vec` of buckets can address.
    fn maybe_grow(&mut self) {
        let threshold = f64::from(self.max_load_factor);
        let limit = max_bucket_count::<K, V>();
        let mut target = self.buckets.len();
        while self.len as f64 / target as f64 > threshold {
            match target.checked_mul(2).filter(|&t| t <= limit) {
                Some(t) => target = t,
                None => {
                    tracing::warn!(
                        buckets = target,
                        len = self.len,
                        "bucket index at maximum size"
                    );
                    break;
                }
            }
        }
        if target != self.buckets.len() {
            self.rehash(target);
        }
    }

    /// Move every entry into a fresh vector of `new_count` buckets and swap
    /// it in. Buckets are drained in pre-order so each new tree keeps the
    /// shape its keys had in the old one.
    ///
    /// The new vector is allocated before anything is taken out of `self`,
    /// so a failed allocation leaves the index untouched. `K: Ord` runs
    /// during reinsertion; if it panics the index is left empty with a
    /// single bucket rather than half-moved.
    fn rehash(&mut self, new_count: usize) {
        let _g = self.reentrancy.enter("rehash");
        let mut fresh: Vec<Bucket<K, V>> = empty_buckets(new_count);

        let old_count = self.buckets.len();
        let len = mem::replace(&mut self.len, 0);
        let old = mem::replace(&mut self.buckets, empty_buckets(1));
        for bucket in old {
            for (key, slot) in bucket.into_pre_order() {
                let index = slot_for(slot.hash, new_count);
                fresh[index].insert(key, slot);
            }
        }
        debug_assert_eq!(fresh.iter().map(OrderedTree::len).sum::<usize>(), len);

        self.buckets = fresh;
        self.len = len;
        tracing::debug!(from = old_count, to = new_count, len, "bucket index resized");
    }
}

impl<K, V> Default for BucketIndex<K, V>
where
    K: Ord + Hash,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K: fmt::Debug, V: fmt::Debug, S> fmt::Debug for BucketIndex<K, V, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

/// Iterator over `(&K, &V)` across all buckets.
pub struct Iter<'a, K, V> {
    buckets: core::slice::Iter<'a, Bucket<K, V>>,
    current: Option<ordered_tree::Iter<'a, K, Slot<V>>>,
    remaining: usize,
}

impl<'a, K, V> Iter<'a, K, V> {
    fn new(buckets: &'a [Bucket<K, V>], len: usize) -> Self {
        let mut buckets = buckets.iter();
        let current = buckets.next().map(OrderedTree::iter);
        Self {
            buckets,
            current,
            remaining: len,
        }
    }
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some((k, s)) = self.current.as_mut()?.next() {
                self.remaining -= 1;
                return Some((k, &s.value));
            }
            self.current = Some(self.buckets.next()?.iter());
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K, V> ExactSizeIterator for Iter<'_, K, V> {}

impl<K, V> Clone for Iter<'_, K, V> {
    fn clone(&self) -> Self {
        Self {
            buckets: self.buckets.clone(),
            current: self.current.clone(),
            remaining: self.remaining,
        }
    }
}

#[cfg(test)]
impl<K, V, S> BucketIndex<K, V, S>
where
    K: Ord + Hash,
    S: BuildHasher,
{
    /// Check size bookkeeping, tree shape, bucket placement and load factor.
    pub(crate) fn assert_consistent(&self) {
        let total: usize = self.buckets.iter().map(OrderedTree::len).sum();
        assert_eq!(total, self.len, "len disagrees with bucket contents");
        for (i, bucket) in self.buckets.iter().enumerate() {
            bucket.assert_well_formed();
            for (k, slot) in bucket.iter() {
                assert_eq!(slot.hash, self.make_hash(k), "stale stored hash");
                assert_eq!(slot_for(slot.hash, self.buckets.len()), i, "misplaced entry");
            }
        }
        assert!(self.load_factor() <= f64::from(self.max_load_factor));
    }
}
