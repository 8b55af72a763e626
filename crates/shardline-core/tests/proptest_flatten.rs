// crates/shardline-core/tests/proptest_flatten.rs
// ============================================================================
// Module: Complex Key Flattening Property-Based Tests
// Description: Property tests for multi-column value combination.
// Purpose: Check the Cartesian product size and per-combination coverage.
// ============================================================================

//! Property-based tests for complex sharding value flattening.

#![allow(
    clippy::panic,
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only assertions and helpers are permitted."
)]

use std::collections::BTreeMap;

use proptest::prelude::*;
use shardline_core::core::ShardingValue;
use shardline_core::runtime::algorithm::flatten;

proptest! {
    #[test]
    fn flatten_yields_product_of_list_sizes(
        sizes in proptest::collection::vec(0_usize .. 5, 1 .. 4),
    ) {
        let mut columns: BTreeMap<String, Vec<ShardingValue>> = BTreeMap::new();
        for (index, size) in sizes.iter().enumerate() {
            let values = (0 .. *size).map(|value| ShardingValue::Int(i64::try_from(value).unwrap_or_default())).collect();
            columns.insert(format!("c{index}"), values);
        }
        let combinations = flatten(&columns);
        prop_assert_eq!(combinations.len(), sizes.iter().product::<usize>());
        for combination in &combinations {
            prop_assert_eq!(combination.len(), sizes.len());
        }
    }
}

#[test]
fn two_by_two_columns_flatten_to_four_combinations() {
    let mut columns: BTreeMap<String, Vec<ShardingValue>> = BTreeMap::new();
    columns.insert("a".to_string(), vec![ShardingValue::Int(1), ShardingValue::Int(2)]);
    columns.insert("b".to_string(), vec![ShardingValue::Int(3), ShardingValue::Int(4)]);
    let combinations = flatten(&columns);
    assert_eq!(combinations.len(), 4);
    let first = &combinations[0];
    assert_eq!(first.get("a"), Some(&ShardingValue::Int(1)));
    assert_eq!(first.get("b"), Some(&ShardingValue::Int(3)));
    let last = &combinations[3];
    assert_eq!(last.get("a"), Some(&ShardingValue::Int(2)));
    assert_eq!(last.get("b"), Some(&ShardingValue::Int(4)));
}

#[test]
fn no_columns_flatten_to_no_combinations() {
    assert!(flatten(&BTreeMap::new()).is_empty());
}
