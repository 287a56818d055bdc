#![allow(dead_code)]

use proptest::prelude::*;
use proptest::test_runner::{Config as ProptestConfig, FileFailurePersistence};

pub fn proptest_config() -> ProptestConfig {
    let cases = std::env::var("PROPTEST_CASES")
        .ok()
        .and_then(|v| v.parse::<u32>().ok())
        .unwrap_or(64);

    let mut config = ProptestConfig::with_failure_persistence(FileFailurePersistence::WithSource(
        "proptest-regressions",
    ));
    config.cases = cases;
    config.max_shrink_iters = 1024;
    config
}

/// Dataset ids in `name` or `namespace/name` form over a small alphabet,
/// so that random queries actually hit.
pub fn arb_dataset_id() -> impl Strategy<Value = String> {
    prop_oneof![
        "[a-cA-C0-9_-]{1,8}",
        "[a-c]{1,4}/[a-cA-C0-9_-]{1,8}",
    ]
}

pub fn arb_listing(max_len: usize) -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec(arb_dataset_id(), 0..max_len)
}

pub fn arb_query() -> impl Strategy<Value = String> {
    "[a-cA-C/]{0,3}"
}

/// Cell text that CSV writes without quoting.
pub fn arb_plain_cell() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9 ._-]{1,12}"
}
