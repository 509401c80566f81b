#![no_main]

use avl_collections::model::MapInput;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|input: MapInput| {
    avl_collections::model::run_hash_map_equivalence(input);
});
