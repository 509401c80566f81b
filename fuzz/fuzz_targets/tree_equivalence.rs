#![no_main]
use libfuzzer_sys::fuzz_target;

use avl_collections::model::{run_tree_equivalence, Op};

fuzz_target!(|ops: Vec<Op>| { run_tree_equivalence(ops) });
