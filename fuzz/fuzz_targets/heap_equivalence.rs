#![no_main]

use avl_collections::model::HeapInput;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|input: HeapInput| {
    avl_collections::model::run_heap_equivalence(input);
});
