//! ValueSet: membership-only facade over `BucketIndex` with a unit payload.

use crate::bucket_index::{self, BucketIndex};
use crate::config::IndexConfig;
use crate::error::ConfigError;
use crate::fnv::FnvBuildHasher;
use core::borrow::Borrow;
use core::fmt;
use core::hash::{BuildHasher, Hash};

/// Hash set of bare values sharing the map's bucket index.
#[derive(Clone)]
pub struct ValueSet<T, S = FnvBuildHasher> {
    index: BucketIndex<T, (), S>,
}

impl<T> ValueSet<T>
where
    T: Ord + Hash,
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

impl<T, S> ValueSet<T, S> {
    /// Number of members.
    pub fn len(&self) -> usize {
        self.index.len()
    }

    /// True when the set has no members.
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

    /// Bucket-major, ascending within each bucket.
    pub fn values(&self) -> Iter<'_, T> {
        Iter {
            inner: self.index.iter(),
        }
    }

    /// Same as [`values`](Self::values).
    pub fn iter(&self) -> Iter<'_, T> {
        self.values()
    }
}

impl<T, S> ValueSet<T, S>
where
    T: Ord + Hash,
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

    /// Add `value`. Returns `false`, keeping the stored element, if an equal
    /// value was already present.
    pub fn insert(&mut self, value: T) -> bool {
        self.index.insert(value, ()).is_none()
    }

    pub fn contains<Q>(&self, q: &Q) -> bool
    where
        T: Borrow<Q>,
        Q: ?Sized + Hash + Ord,
    {
        self.index.contains(q)
    }

    /// The stored element equal to `q`.
    pub fn get<Q>(&self, q: &Q) -> Option<&T>
    where
        T: Borrow<Q>,
        Q: ?Sized + Hash + Ord,
    {
        self.index.get_key_value(q).map(|(k, _)| k)
    }

    /// Returns whether `q` was a member.
    pub fn remove<Q>(&mut self, q: &Q) -> bool
    where
        T: Borrow<Q>,
        Q: ?Sized + Hash + Ord,
    {
        self.index.remove(q).is_some()
    }

    /// Remove and return the stored element equal to `q`.
    pub fn take<Q>(&mut self, q: &Q) -> Option<T>
    where
        T: Borrow<Q>,
        Q: ?Sized + Hash + Ord,
    {
        self.index.remove(q).map(|(k, ())| k)
    }

    /// Drop every member; the bucket count is kept.
    pub fn clear(&mut self) {
        self.index.clear();
    }

    #[cfg(test)]
    pub(crate) fn assert_consistent(&self) {
        self.index.assert_consistent();
    }
}

impl<T> Default for ValueSet<T>
where
    T: Ord + Hash,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<T: fmt::Debug, S> fmt::Debug for ValueSet<T, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set()
            .entries(self.index.iter().map(|(k, _)| k))
            .finish()
    }
}

impl<T, S> FromIterator<T> for ValueSet<T, S>
where
    T: Ord + Hash,
    S: BuildHasher + Default,
{
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut set = Self::with_hasher(S::default());
        set.extend(iter);
        set
    }
}

impl<T, S> Extend<T> for ValueSet<T, S>
where
    T: Ord + Hash,
    S: BuildHasher,
{
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for v in iter {
            self.insert(v);
        }
    }
}

impl<'a, T, S> IntoIterator for &'a ValueSet<T, S> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.values()
    }
}

/// Iterator returned by [`ValueSet::values`].
pub struct Iter<'a, T> {
    inner: bucket_index::Iter<'a, T, ()>,
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(k, _)| k)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<T> ExactSizeIterator for Iter<'_, T> {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicate_insert_keeps_original_element() {
        #[derive(Debug, Clone)]
        struct Tagged(u32, &'static str);
        impl PartialEq for Tagged {
            fn eq(&self, o: &Self) -> bool {
                self.0 == o.0
            }
        }
        impl Eq for Tagged {}
        impl PartialOrd for Tagged {
            fn partial_cmp(&self, o: &Self) -> Option<core::cmp::Ordering> {
                Some(self.cmp(o))
            }
        }
        impl Ord for Tagged {
            fn cmp(&self, o: &Self) -> core::cmp::Ordering {
                self.0.cmp(&o.0)
            }
        }
        impl Hash for Tagged {
            fn hash<H: core::hash::Hasher>(&self, h: &mut H) {
                self.0.hash(h);
            }
        }

        let mut s = ValueSet::new();
        assert!(s.insert(Tagged(1, "first")));
        assert!(!s.insert(Tagged(1, "second")));
        assert_eq!(s.len(), 1);
        assert_eq!(s.get(&Tagged(1, "")).map(|t| t.1), Some("first"));
        s.assert_consistent();
    }

    #[test]
    fn take_returns_owned_element() {
        let mut s: ValueSet<String> = ["x", "y"].iter().map(|s| s.to_string()).collect();
        assert_eq!(s.take("x"), Some("x".to_string()));
        assert_eq!(s.take("x"), None);
        assert!(!s.remove("x"));
        assert!(s.remove("y"));
        assert!(s.is_empty());
        s.assert_consistent();
    }
}
