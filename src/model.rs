extern crate std;

use std::{
    collections::{BTreeSet, HashMap},
    prelude::v1::*,
};

use arbitrary::Arbitrary;
use proptest::strategy::{Just, Strategy};

use crate::{AvlTree, BinaryHeap, ChainedHashMap, HashMapConfig, HeapKind};

#[derive(Copy, Clone, Debug, Arbitrary)]
pub enum ItemValue {
    Index(usize),
    Random(u32),
}

proptest::prop_compose! {
    fn index_strategy()(
        index in 0usize..1000,
    ) -> ItemValue {
        ItemValue::Index(index)
    }
}

proptest::prop_compose! {
    fn random_strategy()(
        random in 0u32..1000,
    ) -> ItemValue {
        ItemValue::Random(random)
    }
}

fn value_strategy() -> impl Strategy<Value = ItemValue> {
    proptest::prop_oneof![index_strategy(), random_strategy()]
}

impl ItemValue {
    // Resolves to a present value (by index into the sorted contents) or an arbitrary one.
    fn resolve(self, sorted: &[u32]) -> u32 {
        match self {
            ItemValue::Index(idx) => {
                if sorted.is_empty() {
                    idx as u32
                } else {
                    sorted[idx % sorted.len()]
                }
            }
            ItemValue::Random(v) => v,
        }
    }
}

// AvlTree ====================================================================

#[derive(Copy, Clone, Debug, Arbitrary)]
pub enum Op {
    Insert(ItemValue),
    Contains(ItemValue),
    Remove(ItemValue),
    Take(ItemValue),
    Minimum,
    Maximum,
    Clear,
}

impl Op {
    fn finalize(self, sorted: &[u32]) -> FinalOp {
        match self {
            Op::Insert(item) => FinalOp::Insert(item.resolve(sorted)),
            Op::Contains(item) => FinalOp::Contains(item.resolve(sorted)),
            Op::Remove(item) => FinalOp::Remove(item.resolve(sorted)),
            Op::Take(item) => FinalOp::Take(item.resolve(sorted)),
            Op::Minimum => FinalOp::Minimum,
            Op::Maximum => FinalOp::Maximum,
            Op::Clear => FinalOp::Clear,
        }
    }
}

#[derive(Copy, Clone, Debug)]
enum FinalOp {
    Insert(u32),
    Contains(u32),
    Remove(u32),
    Take(u32),
    Minimum,
    Maximum,
    Clear,
}

pub fn op_strategy() -> impl Strategy<Value = Op> {
    // Clearing is rare so that trees get a chance to grow.
    proptest::prop_oneof![
        10 => value_strategy().prop_map(Op::Insert),
        4 => value_strategy().prop_map(Op::Contains),
        6 => value_strategy().prop_map(Op::Remove),
        2 => value_strategy().prop_map(Op::Take),
        1 => Just(Op::Minimum),
        1 => Just(Op::Maximum),
        1 => Just(Op::Clear),
    ]
}

/// Asserts that the height of a valid AVL tree with `len` elements is within the worst-case bound.
pub fn assert_height_bound(height: usize, len: usize) {
    let bound = 1.45 * ((len + 2) as f64).log2();
    assert!(
        (height as f64) <= bound,
        "height {height} exceeds AVL bound {bound:.2} for {len} elements"
    );
}

pub fn run_tree_equivalence(ops: Vec<Op>) {
    let mut sorted_values: Vec<u32> = Vec::with_capacity(ops.len());
    let mut btree = BTreeSet::new();
    let mut avl: AvlTree<u32> = AvlTree::new();

    for (op_id, op) in ops.into_iter().enumerate() {
        let final_op = op.finalize(&sorted_values);

        match final_op {
            FinalOp::Insert(value) => {
                assert_eq!(
                    btree.insert(value),
                    avl.insert(value),
                    "FinalOp #{op_id}: {final_op:?}"
                );
            }

            FinalOp::Contains(value) => {
                assert_eq!(
                    btree.contains(&value),
                    avl.contains(&value),
                    "FinalOp #{op_id}: {final_op:?}"
                );
            }

            FinalOp::Remove(value) => {
                assert_eq!(
                    btree.remove(&value),
                    avl.remove(&value),
                    "FinalOp #{op_id}: {final_op:?}"
                );
            }

            FinalOp::Take(value) => {
                assert_eq!(
                    btree.take(&value),
                    avl.take(&value),
                    "FinalOp #{op_id}: {final_op:?}"
                );
            }

            FinalOp::Minimum => {
                assert_eq!(btree.first(), avl.minimum(), "FinalOp #{op_id}: {final_op:?}");
                assert_eq!(avl.minimum(), avl.in_order().next());
            }

            FinalOp::Maximum => {
                assert_eq!(btree.last(), avl.maximum(), "FinalOp #{op_id}: {final_op:?}");
            }

            FinalOp::Clear => {
                btree.clear();
                avl.clear();
            }
        }

        sorted_values.clear();
        sorted_values.extend(btree.iter().copied());

        avl.assert_invariants();
        assert_eq!(btree.len(), avl.len());
        assert!(btree.iter().eq(avl.in_order()));
        assert_eq!(avl.level_order().count(), avl.len());

        match avl.height() {
            Some(height) => assert_height_bound(height, avl.len()),
            None => assert!(avl.is_empty()),
        }
    }
}

// ChainedHashMap =============================================================

#[derive(Copy, Clone, Debug, Arbitrary)]
pub enum MapOp {
    Put(u8, u32),
    Get(u8),
    Remove(u8),
    Increment(u8),
    Clear,
}

pub fn map_op_strategy() -> impl Strategy<Value = MapOp> {
    proptest::prop_oneof![
        8 => (proptest::prelude::any::<u8>(), proptest::prelude::any::<u32>())
            .prop_map(|(k, v)| MapOp::Put(k, v)),
        4 => proptest::prelude::any::<u8>().prop_map(MapOp::Get),
        4 => proptest::prelude::any::<u8>().prop_map(MapOp::Remove),
        2 => proptest::prelude::any::<u8>().prop_map(MapOp::Increment),
        1 => Just(MapOp::Clear),
    ]
}

#[derive(Clone, Debug, Arbitrary)]
pub struct MapInput {
    pub initial_capacity: u8,
    pub ops: Vec<MapOp>,
}

pub fn run_hash_map_equivalence(input: MapInput) {
    let config = HashMapConfig::new().with_initial_capacity(usize::from(input.initial_capacity).max(1));
    let mut chained = ChainedHashMap::with_config(config).expect("valid config");
    let mut std_map = HashMap::new();

    for (op_id, op) in input.ops.into_iter().enumerate() {
        match op {
            MapOp::Put(key, value) => {
                assert_eq!(
                    std_map.insert(key, value),
                    chained.put(key, value),
                    "MapOp #{op_id}: {op:?}"
                );
            }

            MapOp::Get(key) => {
                assert_eq!(std_map.get(&key), chained.get(&key), "MapOp #{op_id}: {op:?}");
                assert_eq!(std_map.contains_key(&key), chained.contains_key(&key));
            }

            MapOp::Remove(key) => {
                assert_eq!(
                    std_map.remove(&key),
                    chained.remove(&key),
                    "MapOp #{op_id}: {op:?}"
                );
            }

            MapOp::Increment(key) => {
                if let Some(value) = std_map.get_mut(&key) {
                    *value = value.wrapping_add(1);
                }
                if let Some(value) = chained.get_mut(&key) {
                    *value = value.wrapping_add(1);
                }
            }

            MapOp::Clear => {
                std_map.clear();
                chained.clear();
            }
        }

        assert_eq!(std_map.len(), chained.len());
        assert!((chained.len() as f32) <= chained.capacity() as f32 * chained.load_factor());

        let mut entries: Vec<(u8, u32)> = chained.iter().map(|(&k, &v)| (k, v)).collect();
        entries.sort_unstable();
        let mut expected: Vec<(u8, u32)> = std_map.iter().map(|(&k, &v)| (k, v)).collect();
        expected.sort_unstable();
        assert_eq!(entries, expected);
    }
}

// BinaryHeap =================================================================

#[derive(Copy, Clone, Debug, Arbitrary)]
pub enum HeapOp {
    Push(u32),
    Pop,
    Peek,
}

pub fn heap_op_strategy() -> impl Strategy<Value = HeapOp> {
    proptest::prop_oneof![
        3 => (0u32..1000).prop_map(HeapOp::Push),
        2 => Just(HeapOp::Pop),
        1 => Just(HeapOp::Peek),
    ]
}

#[derive(Clone, Debug, Arbitrary)]
pub struct HeapInput {
    pub kind: HeapKind,
    pub initial: Vec<u32>,
    pub ops: Vec<HeapOp>,
}

pub fn heap_input_strategy(ops: core::ops::Range<usize>) -> impl Strategy<Value = HeapInput> {
    (
        proptest::prop_oneof![Just(HeapKind::Min), Just(HeapKind::Max)],
        proptest::collection::vec(0u32..1000, 0..64),
        proptest::collection::vec(heap_op_strategy(), ops),
    )
        .prop_map(|(kind, initial, ops)| HeapInput { kind, initial, ops })
}

pub fn run_heap_equivalence(input: HeapInput) {
    let HeapInput { kind, initial, ops } = input;

    // Reference contents, kept sorted so that the top of the heap is always at the end.
    let mut sorted = initial.clone();
    let sort = |v: &mut Vec<u32>| match kind {
        HeapKind::Min => v.sort_unstable_by(|a, b| b.cmp(a)),
        HeapKind::Max => v.sort_unstable(),
    };
    sort(&mut sorted);

    let mut heap = BinaryHeap::from_vec(kind, initial);
    heap.assert_invariants();

    for (op_id, op) in ops.into_iter().enumerate() {
        match op {
            HeapOp::Push(value) => {
                sorted.push(value);
                sort(&mut sorted);
                heap.push(value);
            }

            HeapOp::Pop => {
                assert_eq!(sorted.pop(), heap.pop(), "HeapOp #{op_id}: {op:?}");
            }

            HeapOp::Peek => {
                assert_eq!(sorted.last(), heap.peek(), "HeapOp #{op_id}: {op:?}");
            }
        }

        heap.assert_invariants();
        assert_eq!(sorted.len(), heap.len());
    }

    sorted.reverse();
    assert_eq!(sorted, heap.into_sorted_vec());
}
