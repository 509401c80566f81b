//! Classic in-memory collections: an AVL tree, a chained hash table and a binary heap.
//!
//! The centrepiece is [`AvlTree`], a height-balanced binary search tree with parent links.
//! [`ChainedHashMap`] and [`BinaryHeap`] are the usual array-backed companions.

// Conventions used in comments:
// - The height of a node `x` is denoted `h(x)`. A missing child has height -1.
// - The balance of `x` is `h(left(x)) - h(right(x))`.
// - `x` is left-heavy if its balance is greater than 1, and right-heavy if it is less than -1.
//
// The invariants of an AVL tree are:
// 1. All balances are in {-1, 0, 1}.
// 2. `h(x) = 1 + max(h(left(x)), h(right(x)))`, so all leaves have height 0.
//
// Nodes live in an arena owned by the tree and refer to each other by index. The arena is the only
// owner; child and parent links are plain indices.

use core::{cmp::Ordering, fmt, mem, ops::Not};
use std::borrow::Borrow;

mod debug;
mod error;
pub mod hash_map;
pub mod heap;
mod iter;
#[cfg(any(test, feature = "model"))]
pub mod model;

pub use error::ConfigError;
pub use hash_map::{ChainedHashMap, HashMapConfig};
pub use heap::{BinaryHeap, HeapKind};
pub use iter::{InOrder, LevelOrder};

/// A self-balancing binary search tree, or AVL tree.
///
/// Values are kept in ascending order according to their [`Ord`] implementation. Inserting a value
/// that is already present and removing a value that is absent are both no-ops.
///
/// ```
/// use avl_collections::AvlTree;
///
/// let tree: AvlTree<u32> = [5, 3, 8, 1, 4, 7, 9].into_iter().collect();
///
/// assert_eq!(tree.height(), Some(2));
/// assert_eq!(tree.minimum(), Some(&1));
/// assert!(tree.in_order().copied().eq([1, 3, 4, 5, 7, 8, 9]));
/// ```
pub struct AvlTree<T> {
    nodes: Vec<Option<Node<T>>>,
    free: Vec<NodeId>,
    root: Link,
    len: usize,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) struct NodeId(usize);

pub(crate) type Link = Option<NodeId>;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Dir {
    Left = 0,
    Right = 1,
}

impl Not for Dir {
    type Output = Dir;

    fn not(self) -> Self::Output {
        match self {
            Dir::Left => Dir::Right,
            Dir::Right => Dir::Left,
        }
    }
}

struct Node<T> {
    value: T,
    parent: Link,
    children: [Link; 2],
    height: i8,
}

impl<T> AvlTree<T> {
    /// Returns a new empty tree.
    pub const fn new() -> AvlTree<T> {
        AvlTree {
            nodes: Vec::new(),
            free: Vec::new(),
            root: None,
            len: 0,
        }
    }

    /// Returns `true` if the tree contains no elements.
    pub fn is_empty(&self) -> bool {
        let empty = self.len() == 0;
        debug_assert_eq!(empty, self.root.is_none());
        empty
    }

    /// Returns the number of elements in the tree.
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Returns the height of the tree, or `None` if the tree is empty.
    ///
    /// A tree with a single element has height 0. This completes in _O(1)_ time.
    pub fn height(&self) -> Option<usize> {
        self.root.map(|root| self.node(root).height as usize)
    }

    /// Returns the minimum element of the tree.
    pub fn minimum(&self) -> Option<&T> {
        let root = self.root?;
        Some(&self.node(self.min_in_subtree(root)).value)
    }

    /// Returns the maximum element of the tree.
    pub fn maximum(&self) -> Option<&T> {
        let mut cur = self.root?;
        while let Some(right) = self.right(cur) {
            cur = right;
        }

        Some(&self.node(cur).value)
    }

    /// Returns an iterator over the elements of the tree in ascending order.
    pub fn in_order(&self) -> InOrder<'_, T> {
        InOrder::new(self)
    }

    /// Returns an iterator over the elements of the tree in breadth-first order, starting at the
    /// root.
    pub fn level_order(&self) -> LevelOrder<'_, T> {
        LevelOrder::new(self)
    }

    /// Clears the tree, removing all elements.
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.free.clear();
        self.root = None;
        self.len = 0;
    }

    // Arena ==================================================================

    #[inline]
    fn node(&self, id: NodeId) -> &Node<T> {
        match &self.nodes[id.0] {
            Some(node) => node,
            None => unreachable!("link to released node {id:?}"),
        }
    }

    #[inline]
    fn node_mut(&mut self, id: NodeId) -> &mut Node<T> {
        match &mut self.nodes[id.0] {
            Some(node) => node,
            None => unreachable!("link to released node {id:?}"),
        }
    }

    fn alloc(&mut self, value: T, parent: Link) -> NodeId {
        let node = Node {
            value,
            parent,
            children: [None; 2],
            height: 0,
        };

        match self.free.pop() {
            Some(id) => {
                debug_assert!(self.nodes[id.0].is_none());
                self.nodes[id.0] = Some(node);
                id
            }
            None => {
                self.nodes.push(Some(node));
                NodeId(self.nodes.len() - 1)
            }
        }
    }

    // Releases the slot of an unlinked node and returns its value.
    fn release(&mut self, id: NodeId) -> T {
        let node = match self.nodes[id.0].take() {
            Some(node) => node,
            None => unreachable!("double release of {id:?}"),
        };

        self.free.push(id);
        node.value
    }

    // Links ==================================================================

    #[inline]
    pub(crate) fn value(&self, id: NodeId) -> &T {
        &self.node(id).value
    }

    #[inline]
    pub(crate) fn root(&self) -> Link {
        self.root
    }

    #[inline]
    fn parent(&self, id: NodeId) -> Link {
        self.node(id).parent
    }

    #[inline]
    fn child(&self, id: NodeId, dir: Dir) -> Link {
        self.node(id).children[dir as usize]
    }

    #[inline]
    pub(crate) fn left(&self, id: NodeId) -> Link {
        self.child(id, Dir::Left)
    }

    #[inline]
    pub(crate) fn right(&self, id: NodeId) -> Link {
        self.child(id, Dir::Right)
    }

    #[inline]
    fn set_parent(&mut self, id: NodeId, parent: Link) -> Link {
        mem::replace(&mut self.node_mut(id).parent, parent)
    }

    #[inline]
    fn set_child(&mut self, id: NodeId, dir: Dir, child: Link) -> Link {
        mem::replace(&mut self.node_mut(id).children[dir as usize], child)
    }

    fn maybe_set_parent(&mut self, opt_node: Link, parent: Link) {
        if let Some(node) = opt_node {
            self.set_parent(node, parent);
        }
    }

    fn which_child(&self, parent: NodeId, child: NodeId) -> Dir {
        if self.left(parent) == Some(child) {
            Dir::Left
        } else {
            debug_assert_eq!(self.right(parent), Some(child), "not a child of `parent`");
            Dir::Right
        }
    }

    // Replaces the link pointing at `old_child` with `new_child`, or sets the root if `parent` is
    // `None`.
    //
    // `new_child`'s parent link is not updated.
    fn replace_child_or_set_root(&mut self, parent: Link, old_child: NodeId, new_child: Link) {
        match parent {
            Some(parent) => {
                let dir = self.which_child(parent, old_child);
                self.set_child(parent, dir, new_child);
            }
            None => self.root = new_child,
        }
    }

    fn min_in_subtree(&self, root: NodeId) -> NodeId {
        let mut cur = root;
        while let Some(left) = self.left(cur) {
            cur = left;
        }

        cur
    }

    // Balancing ==============================================================

    /// Returns the height of the linked node, or -1 if there is none.
    #[inline]
    fn height_of(&self, link: Link) -> i8 {
        link.map(|n| self.node(n).height).unwrap_or(-1)
    }

    #[inline]
    fn update_height(&mut self, id: NodeId) {
        let height = 1 + self.height_of(self.left(id)).max(self.height_of(self.right(id)));
        self.node_mut(id).height = height;
    }

    #[inline]
    fn balance(&self, id: NodeId) -> i8 {
        self.height_of(self.left(id)) - self.height_of(self.right(id))
    }

    // Performs a rotation, moving `up` up and its parent `down` down.
    //
    // `up`'s inner subtree moves across to `down`, and whatever linked to `down` (a parent or the
    // root) now links to `up`. The heights of `down` and then `up` are recomputed. Returns `up`.
    fn rotate_at(&mut self, down: NodeId, up: NodeId) -> NodeId {
        // - `down` becomes the `dir` child of `up`.
        // - `across` goes from the `dir` child of `up` to the `!dir` child of `down`.
        let dir = !self.which_child(down, up);

        let across = self.child(up, dir);
        self.set_child(down, !dir, across);
        self.maybe_set_parent(across, Some(down));

        self.set_child(up, dir, Some(down));
        let parent = self.set_parent(down, Some(up));
        self.set_parent(up, parent);
        self.replace_child_or_set_root(parent, down, Some(up));

        self.update_height(down);
        self.update_height(up);

        up
    }

    // Restores the balance of `node`, which is heavy on the `heavy` side. Returns the root of the
    // rebalanced subtree.
    fn rebalance_heavy(&mut self, node: NodeId, heavy: Dir) -> NodeId {
        let Some(child) = self.child(node, heavy) else {
            unreachable!("heavy side of a node must be present");
        };

        // If `child` leans the other way, straighten it first so a single rotation at `node`
        // suffices.
        let outer = self.height_of(self.child(child, heavy));
        let inner = self.height_of(self.child(child, !heavy));
        if outer < inner {
            if let Some(grandchild) = self.child(child, !heavy) {
                log::trace!("double rotation at {node:?} ({heavy:?}-{:?})", !heavy);
                self.rotate_at(child, grandchild);
            }
        } else {
            log::trace!("single rotation at {node:?} ({heavy:?}-{heavy:?})");
        }

        let Some(up) = self.child(node, heavy) else {
            unreachable!("heavy side of a node must be present");
        };
        self.rotate_at(node, up)
    }

    // Walks from `start` to the root, refreshing heights and rotating wherever the balance
    // invariant is broken.
    fn rebalance(&mut self, start: NodeId) {
        let mut opt_cur = Some(start);

        while let Some(mut cur) = opt_cur {
            match self.balance(cur) {
                b if b > 1 => cur = self.rebalance_heavy(cur, Dir::Left),
                b if b < -1 => cur = self.rebalance_heavy(cur, Dir::Right),
                _ => self.update_height(cur),
            }

            opt_cur = self.parent(cur);
            if opt_cur.is_none() {
                self.root = Some(cur);
            }
        }
    }

    #[doc(hidden)]
    pub fn assert_invariants(&self)
    where
        T: Ord,
    {
        if let Some(root) = self.root {
            assert_eq!(self.parent(root), None, "root must not have a parent");
            self.assert_invariants_at(root);
        }

        let occupied = self.nodes.iter().filter(|slot| slot.is_some()).count();
        assert_eq!(occupied, self.len, "arena occupancy must match length");
        assert_eq!(self.nodes.len(), self.len + self.free.len());

        let mut prev = None;
        for value in self.in_order() {
            if let Some(prev) = prev {
                assert!(prev < value, "in-order values must be strictly ascending");
            }
            prev = Some(value);
        }
    }

    fn assert_invariants_at(&self, node: NodeId) {
        let height = self.node(node).height;

        for dir in [Dir::Left, Dir::Right] {
            if let Some(child) = self.child(node, dir) {
                // Ensure child's parent link points to this node.
                assert_eq!(self.parent(child), Some(node), "child parent link not set");
                self.assert_invariants_at(child);
            }
        }

        // Ensure the cached height is correct.
        let expected = 1 + self.height_of(self.left(node)).max(self.height_of(self.right(node)));
        assert_eq!(height, expected, "stale height at {node:?}");

        // Ensure the node is balanced.
        assert!(self.balance(node).abs() <= 1, "unbalanced node {node:?}");
    }
}

impl<T: Ord> AvlTree<T> {
    /// Inserts a value into the tree.
    ///
    /// Returns `false`, leaving the tree unchanged, if an equal value is already present.
    ///
    /// This operation completes in _O(log(n))_ time.
    pub fn insert(&mut self, value: T) -> bool {
        let Some(mut parent) = self.root else {
            // Tree is empty. Set `value` as the root and return.
            self.root = Some(self.alloc(value, None));
            self.len += 1;
            return true;
        };

        // Descend the tree, looking for a vacant child slot.
        let dir = loop {
            let dir = match value.cmp(self.value(parent)) {
                Ordering::Less => Dir::Left,
                Ordering::Equal => return false,
                Ordering::Greater => Dir::Right,
            };

            match self.child(parent, dir) {
                Some(child) => parent = child,
                None => break dir,
            }
        };

        let leaf = self.alloc(value, Some(parent));
        self.set_child(parent, dir, Some(leaf));
        self.len += 1;

        self.rebalance(parent);
        true
    }

    /// Returns `true` if the tree contains `value`.
    pub fn contains<Q>(&self, value: &Q) -> bool
    where
        T: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.find(value).is_some()
    }

    /// Returns a reference to the element equal to `value`.
    pub fn get<Q>(&self, value: &Q) -> Option<&T>
    where
        T: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.find(value).map(|(node, _)| self.value(node))
    }

    /// Removes `value` from the tree, returning `true` if it was present.
    ///
    /// This operation completes in _O(log(n))_ time.
    pub fn remove<Q>(&mut self, value: &Q) -> bool
    where
        T: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.take(value).is_some()
    }

    /// Removes and returns the element equal to `value`, if any.
    pub fn take<Q>(&mut self, value: &Q) -> Option<T>
    where
        T: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let (node, from_parent) = self.find(value)?;

        let removed = match (self.left(node), self.right(node)) {
            (Some(_), Some(right)) => {
                // The successor has no left child, so unlinking it only elevates its right child.
                // Its value then takes the place of the removed one.
                let successor = self.min_in_subtree(right);
                let successor_parent = self.parent(successor);
                let successor_right = self.right(successor);

                self.replace_child_or_set_root(successor_parent, successor, successor_right);
                self.maybe_set_parent(successor_right, successor_parent);

                let successor_value = self.release(successor);
                let removed = mem::replace(&mut self.node_mut(node).value, successor_value);

                if let Some(successor_parent) = successor_parent {
                    self.rebalance(successor_parent);
                }

                removed
            }

            (left, right) => {
                let child = left.or(right);

                match (self.parent(node), from_parent) {
                    (Some(parent), Some(dir)) => {
                        self.set_child(parent, dir, child);
                        self.maybe_set_parent(child, Some(parent));
                        let removed = self.release(node);
                        self.rebalance(parent);
                        removed
                    }

                    // A unary root's child is a leaf, so promoting it needs no rebalancing.
                    _ => {
                        self.root = child;
                        self.maybe_set_parent(child, None);
                        self.release(node)
                    }
                }
            }
        };

        self.len -= 1;
        Some(removed)
    }

    // Returns the node holding `value` along with the direction taken from its parent to reach it.
    fn find<Q>(&self, value: &Q) -> Option<(NodeId, Option<Dir>)>
    where
        T: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let mut cur = self.root?;
        let mut from_parent = None;

        loop {
            let dir = match value.cmp(self.value(cur).borrow()) {
                Ordering::Less => Dir::Left,
                Ordering::Equal => return Some((cur, from_parent)),
                Ordering::Greater => Dir::Right,
            };

            from_parent = Some(dir);
            cur = self.child(cur, dir)?;
        }
    }
}

impl<T> Default for AvlTree<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: fmt::Debug> fmt::Debug for AvlTree<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.in_order()).finish()
    }
}

impl<T: Ord> FromIterator<T> for AvlTree<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut tree = AvlTree::new();
        tree.extend(iter);
        tree
    }
}

impl<T: Ord> Extend<T> for AvlTree<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for value in iter {
            self.insert(value);
        }
    }
}

impl<'tree, T> IntoIterator for &'tree AvlTree<T> {
    type Item = &'tree T;
    type IntoIter = InOrder<'tree, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.in_order()
    }
}

#[cfg(test)]
mod unit_tests {
    use super::*;

    fn tree_of(values: &[u32]) -> AvlTree<u32> {
        let mut tree = AvlTree::new();
        for &value in values {
            assert!(tree.insert(value));
            tree.assert_invariants();
        }
        tree
    }

    #[test]
    fn empty_tree() {
        let tree: AvlTree<u32> = AvlTree::new();

        assert!(tree.is_empty());
        assert_eq!(tree.height(), None);
        assert_eq!(tree.minimum(), None);
        assert_eq!(tree.maximum(), None);
        assert_eq!(tree.in_order().count(), 0);
        assert_eq!(tree.level_order().count(), 0);
        assert!(!tree.contains(&0));
    }

    #[test]
    fn scenario_insert_then_remove_root() {
        let mut tree = tree_of(&[5, 3, 8, 1, 4, 7, 9]);

        assert_eq!(tree.height(), Some(2));
        assert_eq!(tree.in_order().copied().collect::<Vec<_>>(), [1, 3, 4, 5, 7, 8, 9]);
        assert_eq!(tree.level_order().copied().collect::<Vec<_>>(), [5, 3, 8, 1, 4, 7, 9]);
        assert_eq!(tree.minimum(), Some(&1));
        assert_eq!(tree.maximum(), Some(&9));

        assert!(tree.remove(&5));
        tree.assert_invariants();

        assert_eq!(tree.root.map(|root| *tree.value(root)), Some(7));
        assert!(!tree.contains(&5));
        assert!(tree.height().unwrap() <= 2);
        assert_eq!(tree.in_order().copied().collect::<Vec<_>>(), [1, 3, 4, 7, 8, 9]);
    }

    #[test]
    fn duplicate_insert_is_noop() {
        let mut tree = tree_of(&[2, 1, 3]);

        assert!(!tree.insert(2));
        assert_eq!(tree.len(), 3);
        tree.assert_invariants();
    }

    #[test]
    fn remove_absent_is_noop() {
        let mut tree = tree_of(&[2, 1, 3]);

        assert!(!tree.remove(&4));
        assert!(!tree.remove(&0));
        assert_eq!(tree.len(), 3);
        tree.assert_invariants();
    }

    #[test]
    fn remove_single_node_empties_tree() {
        let mut tree = tree_of(&[42]);

        assert!(tree.remove(&42));
        tree.assert_invariants();

        assert!(tree.is_empty());
        assert_eq!(tree.height(), None);
        assert_eq!(tree.minimum(), None);
    }

    #[test]
    fn remove_unary_root_promotes_child() {
        let mut tree = tree_of(&[1, 2]);

        assert!(tree.remove(&1));
        tree.assert_invariants();

        assert_eq!(tree.len(), 1);
        assert!(tree.contains(&2));
        assert_eq!(tree.height(), Some(0));
    }

    #[test]
    fn ascending_inserts_stay_balanced() {
        let values: Vec<u32> = (0..1024).collect();
        let tree = tree_of(&values);

        // A perfectly filled tree of 1024 nodes has height 10; AVL allows a little slack.
        let height = tree.height().unwrap();
        assert!((10..=14).contains(&height), "height {height}");
    }

    #[test]
    fn take_returns_stored_value() {
        let mut tree = tree_of(&[10, 5, 15, 12]);

        assert_eq!(tree.take(&10), Some(10));
        assert_eq!(tree.take(&10), None);
        tree.assert_invariants();
    }

    #[test]
    fn released_slots_are_reused() {
        let mut tree = tree_of(&[1, 2, 3]);
        let capacity = tree.nodes.len();

        tree.remove(&2);
        tree.insert(4);
        tree.assert_invariants();

        assert_eq!(tree.nodes.len(), capacity);
    }

    #[test]
    fn borrowed_lookup() {
        let tree: AvlTree<String> = ["pear", "apple", "fig"].iter().map(|s| s.to_string()).collect();

        assert!(tree.contains("fig"));
        assert_eq!(tree.get("apple").map(String::as_str), Some("apple"));
        assert_eq!(tree.minimum().map(String::as_str), Some("apple"));
        assert_eq!(format!("{tree:?}"), r#"{"apple", "fig", "pear"}"#);
    }
}
