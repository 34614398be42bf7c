//! tree-hashmap: a single-threaded hash map and hash set whose collision
//! buckets are binary search trees instead of chains.
//!
//! Internal Design:
//!
//! Summary
//! - Goal: keep each layer small enough to reason about on its own.
//! - Layers:
//!   - OrderedTree<K, V>: unbalanced BST over a `SlotMap` arena; ordered
//!     insert (overwriting on an equal key), lookup, delete with in-order
//!     successor promotion, and the four traversal orders.
//!   - BucketIndex<K, V, S>: vector of OrderedTree buckets chosen by
//!     `hash % bucket_count`, with load-factor driven doubling and a full
//!     rehash; includes a debug-only reentrancy guard.
//!   - AssociativeMap<K, V, S> / ValueSet<T, S>: public facades that pin the
//!     error and size contracts (`get` returns `LookupError::KeyNotFound`,
//!     `remove` only shrinks `len` when something was removed).
//!
//! Constraints
//! - Single-threaded: no locks, no atomics, no background work. The
//!   containers are `Send` (for `Send` contents) but not `Sync`; wrap one in
//!   a `Mutex` to share it.
//! - Keys are `Ord + Hash`. The `Hash` impl plus the `BuildHasher` define
//!   the canonical encoding; the default is 32-bit FNV-1a, which is stable
//!   across calls and instances.
//! - No rebalancing: tree operations are O(log n) on random input and O(n)
//!   on adversarial input. Every tree walk is iterative.
//!
//! Hasher and rehashing invariants
//! - Each entry stores the hash computed at insertion; a resize places
//!   entries by that stored hash and never invokes `K: Hash` again.
//! - A resize builds the new bucket vector off to the side and swaps it in;
//!   every entry is present exactly once before and after.
//! - Bucket trees are drained in pre-order during a resize, so a bucket's
//!   tree shape carries over instead of collapsing into a sorted chain.
//!
//! Notes and non-goals
//! - Iteration order is bucket-major and key-ascending within a bucket; it
//!   is not globally sorted.
//! - Resizes are logged at `debug` level through `tracing`.

mod associative_map;
pub mod bucket_index;
mod config;
mod error;
pub mod fnv;
pub mod ordered_tree;
mod reentrancy;
pub mod value_set;

mod bucket_index_proptest;

// Public surface
pub use associative_map::{AssociativeMap, Entries, Keys, Values};
pub use bucket_index::BucketIndex;
pub use config::IndexConfig;
pub use error::{ConfigError, LookupError};
pub use fnv::{Fnv1aHasher, FnvBuildHasher};
pub use ordered_tree::OrderedTree;
pub use value_set::ValueSet;
