use core::iter::FusedIterator;
use std::collections::VecDeque;

use crate::{AvlTree, Link, NodeId};

/// An iterator over the elements of an [`AvlTree`] in ascending order.
///
/// Created by [`AvlTree::in_order`].
pub struct InOrder<'tree, T> {
    tree: &'tree AvlTree<T>,

    // Ancestors whose left subtree is being walked, nearest last.
    stack: Vec<NodeId>,
    // Root of the next subtree to descend into.
    cur: Link,

    len: usize,
}

impl<'tree, T> InOrder<'tree, T> {
    pub(crate) fn new(tree: &'tree AvlTree<T>) -> Self {
        InOrder {
            tree,
            stack: Vec::with_capacity(tree.height().map_or(0, |h| h + 1)),
            cur: tree.root(),
            len: tree.len(),
        }
    }
}

impl<'tree, T> Iterator for InOrder<'tree, T> {
    type Item = &'tree T;

    fn next(&mut self) -> Option<Self::Item> {
        // Upon entering a new subtree, stack up the path to its minimum element.
        while let Some(cur) = self.cur {
            self.stack.push(cur);
            self.cur = self.tree.left(cur);
        }

        // The left subtree of the top node has been exhausted, so it is up next. Its right subtree
        // follows.
        let node = self.stack.pop()?;
        self.cur = self.tree.right(node);
        self.len -= 1;

        Some(self.tree.value(node))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.len, Some(self.len))
    }
}

impl<T> ExactSizeIterator for InOrder<'_, T> {}

impl<T> FusedIterator for InOrder<'_, T> {}

/// An iterator over the elements of an [`AvlTree`] in breadth-first order.
///
/// Created by [`AvlTree::level_order`].
pub struct LevelOrder<'tree, T> {
    tree: &'tree AvlTree<T>,
    queue: VecDeque<NodeId>,
    len: usize,
}

impl<'tree, T> LevelOrder<'tree, T> {
    pub(crate) fn new(tree: &'tree AvlTree<T>) -> Self {
        LevelOrder {
            tree,
            queue: tree.root().into_iter().collect(),
            len: tree.len(),
        }
    }
}

impl<'tree, T> Iterator for LevelOrder<'tree, T> {
    type Item = &'tree T;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.queue.pop_front()?;

        self.queue.extend(self.tree.left(node));
        self.queue.extend(self.tree.right(node));
        self.len -= 1;

        Some(self.tree.value(node))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.len, Some(self.len))
    }
}

impl<T> ExactSizeIterator for LevelOrder<'_, T> {}

impl<T> FusedIterator for LevelOrder<'_, T> {}

#[cfg(test)]
mod tests {
    use crate::AvlTree;

    #[test]
    fn in_order_is_sorted() {
        let tree: AvlTree<i32> = [7, -3, 12, 0, 5, 99, -40].into_iter().collect();

        let values: Vec<i32> = tree.in_order().copied().collect();
        assert_eq!(values, [-40, -3, 0, 5, 7, 12, 99]);
    }

    #[test]
    fn level_order_visits_root_first() {
        // Ascending inserts rotate into a perfect tree rooted at 4.
        let tree: AvlTree<u8> = (1..=7).collect();

        let values: Vec<u8> = tree.level_order().copied().collect();
        assert_eq!(values, [4, 2, 6, 1, 3, 5, 7]);
    }

    #[test]
    fn exact_size() {
        let tree: AvlTree<u8> = (0..10).collect();

        let mut iter = tree.in_order();
        assert_eq!(iter.len(), 10);
        iter.next();
        assert_eq!(iter.len(), 9);

        let mut iter = tree.level_order();
        iter.by_ref().for_each(drop);
        assert_eq!(iter.len(), 0);
        assert_eq!(iter.next(), None);
    }

    #[test]
    fn borrowing_iteration() {
        let tree: AvlTree<u8> = [3, 1, 2].into_iter().collect();

        let mut sum = 0;
        for value in &tree {
            sum += value;
        }
        assert_eq!(sum, 6);
    }
}
