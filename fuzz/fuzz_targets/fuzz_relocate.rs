//! Fuzz target for vendor namespace relocation.
//!
//! Tests that `relocate` never panics on any decodable descriptor set, that
//! its output never keeps vendored or bundled runtime file names, and that a
//! second pass is always a no-op.

#![no_main]

use libfuzzer_sys::fuzz_target;
use prost::Message as _;
use prost_types::FileDescriptorSet;

use attestor_schemas::{descriptor::is_runtime_provided, relocate::relocate};

fuzz_target!(|data: &[u8]| {
    let Ok(set) = FileDescriptorSet::decode(data) else {
        return;
    };

    let (relocated, _) = relocate(&set);
    for file in &relocated.file {
        let name = file.name();
        assert!(!name.starts_with("buf/validate/"), "vendored name survived: {name}");
        assert!(!is_runtime_provided(name), "runtime file survived: {name}");
    }

    let (again, report) = relocate(&relocated);
    assert_eq!(again, relocated, "relocation must be idempotent");
    assert!(report.is_noop(), "second pass must report a no-op");
});
