//! AssociativeMap: key -> value facade over `BucketIndex`.

use crate::bucket_index::{self, BucketIndex};
use crate::config::IndexConfig;
use crate::error::{ConfigError, LookupError};
use crate::fnv::FnvBuildHasher;
use core::borrow::Borrow;
use core::fmt;
use core::hash::{BuildHasher, Hash};

/// Iterator over `(&K, &V)`; bucket-major, key-ascending within a bucket.
pub type Entries<'a, K, V> = bucket_index::Iter<'a, K, V>;

/// Hash map whose buckets are [`OrderedTree`](crate::OrderedTree)s.
#[derive(Clone)]
pub struct AssociativeMap<K, V, S = FnvBuildHasher> {
    index: BucketIndex<K, V, S>,
}

impl<K, V> AssociativeMap<K, V>
where
    K: Ord + Hash,
{
    /// 8 buckets, max load factor 0.75, FNV-1a hashing.
    pub fn new() -> Self {
        Self {
            index: BucketIndex::new(),
        }
    }

    /// Default FNV-1a hashing with a custom bucket count and load factor.
    pub fn with_config(config: IndexConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            index: BucketIndex::with_config(config)?,
        })
    }
}

impl<K, V, S> AssociativeMap<K, V, S> {
    /// Number of keys in the map.
    pub fn len(&self) -> usize {
        self.index.len()
    }

    /// True when the map holds no keys.
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Current number of buckets; only ever grows.
    pub fn bucket_count(&self) -> usize {
        self.index.bucket_count()
    }

    /// `len / bucket_count`.
    pub fn load_factor(&self) -> f64 {
        self.index.load_factor()
    }

    /// Number of keys stored in bucket `index`, or `None` past the end.
    pub fn bucket_len(&self, index: usize) -> Option<usize> {
        self.index.bucket_len(index)
    }

    /// Keys in bucket-major order, ascending within each bucket.
    pub fn keys(&self) -> Keys<'_, K, V> {
        Keys {
            inner: self.index.iter(),
        }
    }

    /// Values in the same order as [`keys`](Self::keys).
    pub fn values(&self) -> Values<'_, K, V> {
        Values {
            inner: self.index.iter(),
        }
    }

    /// `(key, value)` pairs in the same order as [`keys`](Self::keys).
    pub fn entries(&self) -> Entries<'_, K, V> {
        self.index.iter()
    }
}

impl<K, V, S> AssociativeMap<K, V, S>
where
    K: Ord + Hash,
    S: BuildHasher,
{
    /// Default configuration with a caller-supplied hasher.
    pub fn with_hasher(hasher: S) -> Self {
        Self {
            index: BucketIndex::with_hasher(hasher),
        }
    }

    /// Fails when `config` is rejected by [`IndexConfig::validate`] or asks
    /// for more buckets than memory can address.
    pub fn with_config_and_hasher(config: IndexConfig, hasher: S) -> Result<Self, ConfigError> {
        Ok(Self {
            index: BucketIndex::with_config_and_hasher(config, hasher)?,
        })
    }

    /// Bucket that `q` hashes to under the current bucket count.
    pub fn bucket_of<Q>(&self, q: &Q) -> usize
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash,
    {
        self.index.bucket_of(q)
    }

    /// Last write wins: setting an existing key replaces its value and
    /// returns the old one. A new key may double the bucket count.
    pub fn set(&mut self, key: K, value: V) -> Option<V> {
        self.index.insert(key, value)
    }

    /// Value for `q`, or [`LookupError::KeyNotFound`].
    pub fn get<Q>(&self, q: &Q) -> Result<&V, LookupError>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Ord,
    {
        self.index.get(q).ok_or(LookupError::KeyNotFound)
    }

    pub fn get_mut<Q>(&mut self, q: &Q) -> Result<&mut V, LookupError>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Ord,
    {
        self.index.get_mut(q).ok_or(LookupError::KeyNotFound)
    }

    /// Stored key and value for `q`.
    pub fn get_key_value<Q>(&self, q: &Q) -> Option<(&K, &V)>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Ord,
    {
        self.index.get_key_value(q)
    }

    pub fn contains<Q>(&self, q: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Ord,
    {
        self.index.contains(q)
    }

    /// Remove `q`, returning its value if it was present.
    pub fn remove<Q>(&mut self, q: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Ord,
    {
        self.index.remove(q).map(|(_, v)| v)
    }

    /// Like [`remove`](Self::remove) but also hands back the stored key.
    pub fn remove_entry<Q>(&mut self, q: &Q) -> Option<(K, V)>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Ord,
    {
        self.index.remove(q)
    }

    /// Drop every entry; the bucket count is kept.
    pub fn clear(&mut self) {
        self.index.clear();
    }

    #[cfg(test)]
    pub(crate) fn assert_consistent(&self) {
        self.index.assert_consistent();
    }
}

impl<K, V> Default for AssociativeMap<K, V>
where
    K: Ord + Hash,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K: fmt::Debug, V: fmt::Debug, S> fmt::Debug for AssociativeMap<K, V, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.index.fmt(f)
    }
}

impl<K, V, S> FromIterator<(K, V)> for AssociativeMap<K, V, S>
where
    K: Ord + Hash,
    S: BuildHasher + Default,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = Self::with_hasher(S::default());
        map.extend(iter);
        map
    }
}

impl<K, V, S> Extend<(K, V)> for AssociativeMap<K, V, S>
where
    K: Ord + Hash,
    S: BuildHasher,
{
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (k, v) in iter {
            self.set(k, v);
        }
    }
}

impl<'a, K, V, S> IntoIterator for &'a AssociativeMap<K, V, S> {
    type Item = (&'a K, &'a V);
    type IntoIter = Entries<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries()
    }
}

/// Iterator returned by [`AssociativeMap::keys`].
pub struct Keys<'a, K, V> {
    inner: Entries<'a, K, V>,
}

impl<'a, K, V> Iterator for Keys<'a, K, V> {
    type Item = &'a K;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(k, _)| k)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> ExactSizeIterator for Keys<'_, K, V> {}

/// Iterator returned by [`AssociativeMap::values`].
pub struct Values<'a, K, V> {
    inner: Entries<'a, K, V>,
}

impl<'a, K, V> Iterator for Values<'a, K, V> {
    type Item = &'a V;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(_, v)| v)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> ExactSizeIterator for Values<'_, K, V> {}
