//! OrderedTree: an unbalanced binary search tree over a `SlotMap` arena.
//!
//! Every node is owned by the tree's arena and referenced from exactly one
//! place: the root slot or a single parent's `left`/`right` link. Keys in a
//! left subtree compare less than the node's key, keys in a right subtree
//! compare greater, and no key occurs twice.
//!
//! All walks are iterative (explicit stack or queue), so a degenerate tree
//! built from sorted input costs O(n) per operation but never recurses.
//!
//! The arena is created on the first insert. An empty tree, and so an empty
//! bucket in the index, owns no heap memory; `clear` keeps the arena.

use core::borrow::Borrow;
use core::cmp::Ordering;
use core::fmt;
use core::mem;
use core::ops::{Index, IndexMut};
use slotmap::{new_key_type, SlotMap};
use std::collections::VecDeque;

new_key_type! {
    struct NodeKey;
}

#[derive(Clone, Debug)]
struct Node<K, V> {
    key: K,
    value: V,
    left: Option<NodeKey>,
    right: Option<NodeKey>,
}

impl<K, V> Node<K, V> {
    fn leaf(key: K, value: V) -> Self {
        Self {
            key,
            value,
            left: None,
            right: None,
        }
    }
}

#[derive(Copy, Clone, Debug)]
enum Side {
    Left,
    Right,
}

/// Node storage, allocated lazily.
#[derive(Clone)]
struct Arena<K, V> {
    slots: Option<SlotMap<NodeKey, Node<K, V>>>,
}

impl<K, V> Arena<K, V> {
    const fn new() -> Self {
        Self { slots: None }
    }

    fn len(&self) -> usize {
        self.slots.as_ref().map_or(0, |s| s.len())
    }

    fn clear(&mut self) {
        if let Some(s) = &mut self.slots {
            s.clear();
        }
    }

    fn insert(&mut self, node: Node<K, V>) -> NodeKey {
        self.slots.get_or_insert_with(SlotMap::with_key).insert(node)
    }

    fn remove(&mut self, k: NodeKey) -> Option<Node<K, V>> {
        self.slots.as_mut()?.remove(k)
    }

    fn get_mut(&mut self, k: NodeKey) -> Option<&mut Node<K, V>> {
        self.slots.as_mut()?.get_mut(k)
    }
}

impl<K, V> Index<NodeKey> for Arena<K, V> {
    type Output = Node<K, V>;

    fn index(&self, k: NodeKey) -> &Node<K, V> {
        match &self.slots {
            Some(s) => &s[k],
            None => panic!("invalid node key"),
        }
    }
}

impl<K, V> IndexMut<NodeKey> for Arena<K, V> {
    fn index_mut(&mut self, k: NodeKey) -> &mut Node<K, V> {
        match &mut self.slots {
            Some(s) => &mut s[k],
            None => panic!("invalid node key"),
        }
    }
}

/// The slot that points at a node: `None` for the root, otherwise the parent and side.
type Link = Option<(NodeKey, Side)>;

#[derive(Clone)]
pub struct OrderedTree<K, V> {
    nodes: Arena<K, V>,
    root: Option<NodeKey>,
}

impl<K, V> OrderedTree<K, V> {
    /// Empty tree; does not allocate.
    pub const fn new() -> Self {
        Self {
            nodes: Arena::new(),
            root: None,
        }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    pub fn clear(&mut self) {
        self.nodes.clear();
        self.root = None;
    }

    /// Entry stored at the root, if any.
    pub fn root(&self) -> Option<(&K, &V)> {
        self.root.map(|k| self.entry(k))
    }

    /// Smallest entry.
    pub fn first(&self) -> Option<(&K, &V)> {
        let mut cur = self.root?;
        while let Some(l) = self.nodes[cur].left {
            cur = l;
        }
        Some(self.entry(cur))
    }

    /// Largest entry.
    pub fn last(&self) -> Option<(&K, &V)> {
        let mut cur = self.root?;
        while let Some(r) = self.nodes[cur].right {
            cur = r;
        }
        Some(self.entry(cur))
    }

    /// Number of nodes on the longest root-to-leaf path; 0 when empty.
    pub fn height(&self) -> usize {
        let mut height = 0;
        let mut level: Vec<NodeKey> = self.root.into_iter().collect();
        while !level.is_empty() {
            height += 1;
            level = level
                .iter()
                .flat_map(|&k| {
                    let n = &self.nodes[k];
                    n.left.into_iter().chain(n.right)
                })
                .collect();
        }
        height
    }

    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter::new(self)
    }

    pub fn keys(&self) -> impl Iterator<Item = &K> + '_ {
        self.iter().map(|(k, _)| k)
    }

    pub fn values(&self) -> impl Iterator<Item = &V> + '_ {
        self.iter().map(|(_, v)| v)
    }

    /// Left, node, right: ascending by key.
    pub fn in_order(&self) -> Vec<(&K, &V)> {
        self.iter().collect()
    }

    /// Node, left, right.
    pub fn pre_order(&self) -> Vec<(&K, &V)> {
        self.pre_order_keys()
            .into_iter()
            .map(|k| self.entry(k))
            .collect()
    }

    /// Left, right, node.
    pub fn post_order(&self) -> Vec<(&K, &V)> {
        let mut out = Vec::with_capacity(self.len());
        let mut stack: Vec<NodeKey> = self.root.into_iter().collect();
        // Collect node, right, left and reverse it.
        while let Some(k) = stack.pop() {
            out.push(k);
            let n = &self.nodes[k];
            stack.extend(n.left);
            stack.extend(n.right);
        }
        out.into_iter().rev().map(|k| self.entry(k)).collect()
    }

    /// Breadth-first, left to right within each level.
    pub fn level_order(&self) -> Vec<(&K, &V)> {
        let mut out = Vec::with_capacity(self.len());
        let mut queue: VecDeque<NodeKey> = self.root.into_iter().collect();
        while let Some(k) = queue.pop_front() {
            let n = &self.nodes[k];
            out.push((&n.key, &n.value));
            queue.extend(n.left);
            queue.extend(n.right);
        }
        out
    }

    /// Consume the tree, yielding owned entries in pre-order.
    ///
    /// Reinserting this sequence into an empty tree rebuilds the same shape.
    pub fn into_pre_order(mut self) -> impl Iterator<Item = (K, V)> {
        let order = self.pre_order_keys();
        order
            .into_iter()
            .filter_map(move |k| self.nodes.remove(k).map(|n| (n.key, n.value)))
    }

    fn entry(&self, k: NodeKey) -> (&K, &V) {
        let n = &self.nodes[k];
        (&n.key, &n.value)
    }

    fn pre_order_keys(&self) -> Vec<NodeKey> {
        let mut out = Vec::with_capacity(self.len());
        let mut stack: Vec<NodeKey> = self.root.into_iter().collect();
        while let Some(k) = stack.pop() {
            out.push(k);
            let n = &self.nodes[k];
            stack.extend(n.right);
            stack.extend(n.left);
        }
        out
    }

    fn set_link(&mut self, link: Link, child: Option<NodeKey>) {
        match link {
            None => self.root = child,
            Some((parent, Side::Left)) => self.nodes[parent].left = child,
            Some((parent, Side::Right)) => self.nodes[parent].right = child,
        }
    }
}

impl<K: Ord, V> OrderedTree<K, V> {
    /// Insert `key -> value`. An existing key keeps its node and has its value
    /// replaced; the previous value is returned.
    pub fn insert(&mut self, key: K, value: V) -> Option<V> {
        let mut link: Link = None;
        let mut cur = self.root;
        while let Some(k) = cur {
            let node = &mut self.nodes[k];
            match key.cmp(&node.key) {
                Ordering::Less => {
                    link = Some((k, Side::Left));
                    cur = node.left;
                }
                Ordering::Greater => {
                    link = Some((k, Side::Right));
                    cur = node.right;
                }
                Ordering::Equal => return Some(mem::replace(&mut node.value, value)),
            }
        }
        let fresh = self.nodes.insert(Node::leaf(key, value));
        self.set_link(link, Some(fresh));
        None
    }

    pub fn contains<Q>(&self, q: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        self.find(q).is_some()
    }

    pub fn get<Q>(&self, q: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        self.find(q).map(|(k, _)| &self.nodes[k].value)
    }

    pub fn get_key_value<Q>(&self, q: &Q) -> Option<(&K, &V)>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        self.find(q).map(|(k, _)| self.entry(k))
    }

    pub fn get_mut<Q>(&mut self, q: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        let (k, _) = self.find(q)?;
        self.nodes.get_mut(k).map(|n| &mut n.value)
    }

    /// Remove `q` and return its entry. A node with two children takes over
    /// its in-order successor's entry and the successor node is unlinked.
    pub fn remove<Q>(&mut self, q: &Q) -> Option<(K, V)>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        let (target, link) = self.find(q)?;
        let (left, right) = {
            let n = &self.nodes[target];
            (n.left, n.right)
        };
        match (left, right) {
            (None, child) | (child, None) => {
                self.set_link(link, child);
                let node = self.nodes.remove(target)?;
                Some((node.key, node.value))
            }
            (Some(_), Some(right)) => {
                let mut succ_link = (target, Side::Right);
                let mut succ = right;
                while let Some(l) = self.nodes[succ].left {
                    succ_link = (succ, Side::Left);
                    succ = l;
                }
                let succ_right = self.nodes[succ].right;
                self.set_link(Some(succ_link), succ_right);
                let promoted = self.nodes.remove(succ)?;
                let node = &mut self.nodes[target];
                let key = mem::replace(&mut node.key, promoted.key);
                let value = mem::replace(&mut node.value, promoted.value);
                Some((key, value))
            }
        }
    }

    /// Locate `q` along with the link that points at it.
    fn find<Q>(&self, q: &Q) -> Option<(NodeKey, Link)>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        let mut link: Link = None;
        let mut cur = self.root;
        while let Some(k) = cur {
            let node = &self.nodes[k];
            match q.cmp(node.key.borrow()) {
                Ordering::Less => {
                    link = Some((k, Side::Left));
                    cur = node.left;
                }
                Ordering::Greater => {
                    link = Some((k, Side::Right));
                    cur = node.right;
                }
                Ordering::Equal => return Some((k, link)),
            }
        }
        None
    }
}

impl<K, V> Default for OrderedTree<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: fmt::Debug, V: fmt::Debug> fmt::Debug for OrderedTree<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<K: Ord, V> FromIterator<(K, V)> for OrderedTree<K, V> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut tree = Self::new();
        tree.extend(iter);
        tree
    }
}

impl<K: Ord, V> Extend<(K, V)> for OrderedTree<K, V> {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (k, v) in iter {
            self.insert(k, v);
        }
    }
}

impl<'a, K, V> IntoIterator for &'a OrderedTree<K, V> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Lazy in-order iterator over an `OrderedTree`.
pub struct Iter<'a, K, V> {
    tree: &'a OrderedTree<K, V>,
    stack: Vec<NodeKey>,
    remaining: usize,
}

impl<'a, K, V> Iter<'a, K, V> {
    fn new(tree: &'a OrderedTree<K, V>) -> Self {
        let mut it = Self {
            tree,
            stack: Vec::new(),
            remaining: tree.len(),
        };
        it.push_left_spine(tree.root);
        it
    }

    fn push_left_spine(&mut self, mut cur: Option<NodeKey>) {
        while let Some(k) = cur {
            self.stack.push(k);
            cur = self.tree.nodes[k].left;
        }
    }
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        let k = self.stack.pop()?;
        let node = &self.tree.nodes[k];
        self.push_left_spine(node.right);
        self.remaining -= 1;
        Some((&node.key, &node.value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K, V> ExactSizeIterator for Iter<'_, K, V> {}

impl<K, V> Clone for Iter<'_, K, V> {
    fn clone(&self) -> Self {
        Self {
            tree: self.tree,
            stack: self.stack.clone(),
            remaining: self.remaining,
        }
    }
}

#[cfg(test)]
impl<K: Ord, V> OrderedTree<K, V> {
    /// Walk every node and check the ordering invariant, reachability and count.
    pub(crate) fn assert_well_formed(&self) {
        let mut reached = 0usize;
        // (node, exclusive lower bound, exclusive upper bound)
        let mut stack: Vec<(NodeKey, Option<&K>, Option<&K>)> =
            self.root.map(|k| (k, None, None)).into_iter().collect();
        while let Some((k, lo, hi)) = stack.pop() {
            reached += 1;
            let n = &self.nodes[k];
            if let Some(lo) = lo {
                assert!(n.key > *lo, "left-subtree bound violated");
            }
            if let Some(hi) = hi {
                assert!(n.key < *hi, "right-subtree bound violated");
            }
            if let Some(l) = n.left {
                stack.push((l, lo, Some(&n.key)));
            }
            if let Some(r) = n.right {
                stack.push((r, Some(&n.key), hi));
            }
        }
        assert_eq!(reached, self.nodes.len(), "orphaned or shared nodes");
    }

    pub(crate) fn owns_arena(&self) -> bool {
        self.nodes.slots.is_some()
    }
}
