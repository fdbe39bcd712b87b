//! Fuzz target for descriptor artifact loading.
//!
//! Tests that `SchemaModule::from_bytes` never panics on arbitrary input, and
//! that any module it does accept is internally consistent: every iterated
//! symbol resolves through `get`, and every bundled file name is unique.

#![no_main]

use libfuzzer_sys::fuzz_target;

use attestor_schemas::descriptor::SchemaModule;

fuzz_target!(|data: &[u8]| {
    let Ok(module) = SchemaModule::from_bytes("fuzz", data) else {
        return;
    };

    for symbol in module.symbols() {
        let looked_up = module.get(symbol.full_name());
        assert_eq!(looked_up, Some(symbol), "indexed symbol must resolve by name");
    }

    let mut files = module.files().to_vec();
    files.sort();
    files.dedup();
    assert_eq!(files.len(), module.files().len(), "bundled file names must be unique");
});
