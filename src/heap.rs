//! Binary heap
//!
//! An array-backed binary heap that orders its elements either smallest-first or largest-first,
//! chosen when the heap is created.
//!
//! # Time Complexity
//!
//! | Operation         | Complexity |
//! |-------------------|------------|
//! | `push`            | O(log n)   |
//! | `pop`             | O(log n)   |
//! | `peek`            | O(1)       |
//! | `from_vec`        | O(n)       |
//! | `into_sorted_vec` | O(n log n) |
//!
//! # Example
//!
//! ```rust
//! use avl_collections::{BinaryHeap, HeapKind};
//!
//! let mut heap = BinaryHeap::new(HeapKind::Max);
//! heap.push(3);
//! heap.push(7);
//! heap.push(5);
//!
//! assert_eq!(heap.peek(), Some(&7));
//! assert_eq!(heap.pop(), Some(7));
//! assert_eq!(heap.into_sorted_vec(), vec![5, 3]);
//! ```

use core::{cmp::Ordering, slice};

use arbitrary::Arbitrary;

/// Which end of the ordering a [`BinaryHeap`] yields first.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Arbitrary)]
pub enum HeapKind {
    /// Smallest element first.
    #[default]
    Min,
    /// Largest element first.
    Max,
}

impl HeapKind {
    /// Returns `true` if `a` belongs strictly closer to the top of the heap than `b`.
    #[inline]
    fn precedes<T: Ord>(self, a: &T, b: &T) -> bool {
        match self {
            HeapKind::Min => a.cmp(b) == Ordering::Less,
            HeapKind::Max => a.cmp(b) == Ordering::Greater,
        }
    }
}

/// A binary min-heap or max-heap.
#[derive(Clone, Debug)]
pub struct BinaryHeap<T: Ord> {
    /// The heap data, with children of index `i` at `2i + 1` and `2i + 2`
    data: Vec<T>,
    kind: HeapKind,
}

impl<T: Ord> BinaryHeap<T> {
    /// Creates an empty heap of the given kind.
    pub fn new(kind: HeapKind) -> Self {
        Self {
            data: Vec::new(),
            kind,
        }
    }

    /// Creates an empty min-heap.
    pub fn min() -> Self {
        Self::new(HeapKind::Min)
    }

    /// Creates an empty max-heap.
    pub fn max() -> Self {
        Self::new(HeapKind::Max)
    }

    /// Builds a heap from an existing collection in O(n) time.
    pub fn from_vec(kind: HeapKind, data: Vec<T>) -> Self {
        let mut heap = Self { data, kind };
        heap.build();
        heap
    }

    /// Builds a heap from the contents of an iterator in O(n) time.
    pub fn from_iter_with<I>(kind: HeapKind, iter: I) -> Self
    where
        I: IntoIterator<Item = T>,
    {
        Self::from_vec(kind, iter.into_iter().collect())
    }

    pub fn kind(&self) -> HeapKind {
        self.kind
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns the top element without removing it.
    pub fn peek(&self) -> Option<&T> {
        self.data.first()
    }

    pub fn push(&mut self, item: T) {
        self.data.push(item);
        self.sift_up(self.data.len() - 1);
    }

    /// Removes and returns the top element.
    pub fn pop(&mut self) -> Option<T> {
        if self.data.is_empty() {
            return None;
        }

        let result = self.data.swap_remove(0);

        if !self.data.is_empty() {
            self.sift_down(0);
        }

        Some(result)
    }

    pub fn clear(&mut self) {
        self.data.clear();
    }

    /// Drains the heap by repeated [`pop`](Self::pop), returning its elements in heap order.
    ///
    /// For a min-heap this is ascending order; for a max-heap, descending.
    pub fn into_sorted_vec(mut self) -> Vec<T> {
        let mut sorted = Vec::with_capacity(self.len());
        while let Some(item) = self.pop() {
            sorted.push(item);
        }

        sorted
    }

    /// Returns an iterator over the elements in storage order, which is unspecified.
    pub fn iter(&self) -> slice::Iter<'_, T> {
        self.data.iter()
    }

    /// Restores the heap property over the whole array, bottom-up
    fn build(&mut self) {
        log::debug!("building {:?}-heap of {} elements", self.kind, self.data.len());

        for index in (0..self.data.len() / 2).rev() {
            self.sift_down(index);
        }
    }

    /// Move element at index up to maintain heap property
    fn sift_up(&mut self, mut index: usize) {
        while index > 0 {
            let parent = (index - 1) / 2;
            if self.kind.precedes(&self.data[index], &self.data[parent]) {
                self.data.swap(index, parent);
                index = parent;
            } else {
                break;
            }
        }
    }

    /// Move element at index down to maintain heap property
    fn sift_down(&mut self, mut index: usize) {
        let len = self.data.len();
        loop {
            let left = 2 * index + 1;
            let right = 2 * index + 2;
            let mut top = index;

            if left < len && self.kind.precedes(&self.data[left], &self.data[top]) {
                top = left;
            }
            if right < len && self.kind.precedes(&self.data[right], &self.data[top]) {
                top = right;
            }

            if top != index {
                self.data.swap(index, top);
                index = top;
            } else {
                break;
            }
        }
    }

    #[doc(hidden)]
    pub fn assert_invariants(&self) {
        for child in 1..self.data.len() {
            let parent = (child - 1) / 2;
            assert!(
                !self.kind.precedes(&self.data[child], &self.data[parent]),
                "child {child} precedes its parent {parent}"
            );
        }
    }
}

impl<T: Ord> Default for BinaryHeap<T> {
    fn default() -> Self {
        Self::min()
    }
}

impl<T: Ord> Extend<T> for BinaryHeap<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for item in iter {
            self.push(item);
        }
    }
}

impl<'heap, T: Ord> IntoIterator for &'heap BinaryHeap<T> {
    type Item = &'heap T;
    type IntoIter = slice::Iter<'heap, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_min_heap_order() {
        let mut heap = BinaryHeap::min();

        assert!(heap.is_empty());
        assert_eq!(heap.peek(), None);

        for item in [5, 1, 8, 3, 9, 2] {
            heap.push(item);
            heap.assert_invariants();
        }

        assert_eq!(heap.len(), 6);
        assert_eq!(heap.peek(), Some(&1));
        assert_eq!(heap.into_sorted_vec(), vec![1, 2, 3, 5, 8, 9]);
    }

    #[test]
    fn test_max_heap_order() {
        let mut heap = BinaryHeap::max();
        heap.extend([5, 1, 8, 3, 9, 2]);
        heap.assert_invariants();

        assert_eq!(heap.pop(), Some(9));
        assert_eq!(heap.pop(), Some(8));
        heap.assert_invariants();
        assert_eq!(heap.into_sorted_vec(), vec![5, 3, 2, 1]);
    }

    #[test]
    fn test_duplicates() {
        let mut heap = BinaryHeap::min();
        heap.extend([2, 2, 1, 1]);

        assert_eq!(heap.into_sorted_vec(), vec![1, 1, 2, 2]);
    }

    #[test]
    fn test_pop_empty() {
        let mut heap: BinaryHeap<u8> = BinaryHeap::default();
        assert_eq!(heap.kind(), HeapKind::Min);
        assert_eq!(heap.pop(), None);

        heap.push(4);
        assert_eq!(heap.pop(), Some(4));
        assert_eq!(heap.pop(), None);
    }

    #[test]
    fn test_build_matches_pushes() {
        let items: Vec<i64> = vec![13, -2, 7, 7, 0, 42, -19, 5, 3, 11, 8];

        for kind in [HeapKind::Min, HeapKind::Max] {
            let built = BinaryHeap::from_vec(kind, items.clone());
            built.assert_invariants();

            let mut pushed = BinaryHeap::new(kind);
            pushed.extend(items.iter().copied());

            assert_eq!(built.into_sorted_vec(), pushed.into_sorted_vec());
        }
    }

    #[test]
    fn test_build_small() {
        for len in 0..8 {
            let heap = BinaryHeap::from_iter_with(HeapKind::Max, (0..len).rev().chain(0..len));
            heap.assert_invariants();
            assert_eq!(heap.len(), 2 * len);
        }
    }
}
