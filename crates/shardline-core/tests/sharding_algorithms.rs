// crates/shardline-core/tests/sharding_algorithms.rs
// ============================================================================
// Test Module: Sharding Algorithms
// Coverage: Built-in algorithms, strategies, and the algorithm registry.
// ============================================================================
//! ## Overview
//! Integration tests for `INLINE`, `COMPLEX_INLINE`, `HINT_INLINE`, `MOD`,
//! `HASH_MOD`, `INCREMENT`, and registry lookups.

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
    reason = "Test-only output and panic-based assertions are permitted."
)]

mod support;

use std::collections::BTreeMap;

use shardline_core::core::AlgorithmError;
use shardline_core::core::ComplexKeysShardingValue;
use shardline_core::core::ConditionValue;
use shardline_core::core::HintShardingValue;
use shardline_core::core::PreciseShardingValue;
use shardline_core::core::RangeShardingValue;
use shardline_core::core::RouteError;
use shardline_core::core::ShardingCondition;
use shardline_core::core::ShardingConditionValue;
use shardline_core::core::ShardingValue;
use shardline_core::core::ValueRange;
use shardline_core::interfaces::ComplexKeysShardingAlgorithm;
use shardline_core::interfaces::HintShardingAlgorithm;
use shardline_core::interfaces::StandardShardingAlgorithm;
use shardline_core::runtime::AlgorithmConfig;
use shardline_core::runtime::AlgorithmRegistry;
use shardline_core::runtime::ShardingAlgorithm;
use shardline_core::runtime::ShardingStrategy;
use shardline_core::runtime::algorithm::AlgorithmProps;
use shardline_core::runtime::algorithm::ComplexInlineShardingAlgorithm;
use shardline_core::runtime::algorithm::HashModShardingAlgorithm;
use shardline_core::runtime::algorithm::HintInlineShardingAlgorithm;
use shardline_core::runtime::algorithm::InlineShardingAlgorithm;
use shardline_core::runtime::algorithm::ModShardingAlgorithm;
use support::TestResult;
use support::ensure;
use support::fail;

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Builds an option bag from pairs.
fn props(pairs: &[(&str, &str)]) -> AlgorithmProps {
    pairs.iter().map(|(key, value)| ((*key).to_string(), (*value).to_string())).collect()
}

/// Owned target names.
fn targets(names: &[&str]) -> Vec<String> {
    names.iter().map(|name| (*name).to_string()).collect()
}

/// Precise value for `t_order.<column>`.
fn precise(column: &str, value: impl Into<ShardingValue>) -> PreciseShardingValue {
    PreciseShardingValue {
        logic_table: "t_order".to_string(),
        column: column.to_string(),
        value: value.into(),
    }
}

/// Range value for `t_order.<column>`.
fn range(column: &str, range: ValueRange) -> RangeShardingValue {
    RangeShardingValue {
        logic_table: "t_order".to_string(),
        column: column.to_string(),
        range,
    }
}

// ============================================================================
// SECTION: INLINE
// ============================================================================

#[test]
fn inline_routes_by_template() -> TestResult {
    let algorithm = InlineShardingAlgorithm::new(&props(&[("algorithm-expression", "ds_${id % 2}")]))?;
    let available = targets(&["ds_0", "ds_1"]);
    let even = algorithm.do_sharding_precise(&available, &precise("id", 4))?;
    let odd = algorithm.do_sharding_precise(&available, &precise("id", 5))?;
    ensure(even.as_deref() == Some("ds_0"), format!("id 4 routed to {even:?}"))?;
    ensure(odd.as_deref() == Some("ds_1"), format!("id 5 routed to {odd:?}"))
}

#[test]
fn inline_rejects_foreign_column() -> TestResult {
    let algorithm = InlineShardingAlgorithm::new(&props(&[("algorithm-expression", "ds_${id % 2}")]))?;
    match algorithm.do_sharding_precise(&targets(&["ds_0", "ds_1"]), &precise("uid", 4)) {
        Err(RouteError::MismatchedExpression {
            column, ..
        }) => ensure(column == "uid", format!("unexpected column {column}")),
        other => fail(format!("expected mismatched expression, got {other:?}")),
    }
}

#[test]
fn inline_rejects_null_key() -> TestResult {
    let algorithm = InlineShardingAlgorithm::new(&props(&[("algorithm-expression", "ds_${id % 2}")]))?;
    match algorithm.do_sharding_precise(&targets(&["ds_0"]), &precise("id", ShardingValue::Null)) {
        Err(RouteError::NullShardingValue(column)) => ensure(column == "id", "null column reported"),
        other => fail(format!("expected null sharding value, got {other:?}")),
    }
}

#[test]
fn inline_range_is_rejected_unless_enabled() -> TestResult {
    let available = targets(&["ds_0", "ds_1"]);
    let strict = InlineShardingAlgorithm::new(&props(&[("algorithm-expression", "ds_${id % 2}")]))?;
    match strict.do_sharding_range(&available, &range("id", ValueRange::closed(1, 10))) {
        Err(RouteError::UnsupportedRangeQuery(_)) => {}
        other => return fail(format!("expected range rejection, got {other:?}")),
    }

    let relaxed = InlineShardingAlgorithm::new(&props(&[
        ("algorithm-expression", "ds_${id % 2}"),
        ("allow-range-query-with-inline-sharding", "true"),
    ]))?;
    let routed = relaxed.do_sharding_range(&available, &range("id", ValueRange::closed(1, 10)))?;
    ensure(routed == available, format!("range should broadcast, got {routed:?}"))
}

#[test]
fn inline_requires_expression() -> TestResult {
    match InlineShardingAlgorithm::new(&AlgorithmProps::new()) {
        Err(AlgorithmError::Initialization {
            ..
        }) => Ok(()),
        other => fail(format!("expected initialization failure, got {other:?}")),
    }
}

#[test]
fn inline_rejects_malformed_boolean_option() -> TestResult {
    let result = InlineShardingAlgorithm::new(&props(&[
        ("algorithm-expression", "ds_${id % 2}"),
        ("allow-range-query-with-inline-sharding", "sometimes"),
    ]));
    ensure(result.is_err(), "non-boolean option must be rejected")
}

// ============================================================================
// SECTION: COMPLEX_INLINE
// ============================================================================

#[test]
fn complex_inline_evaluates_every_combination() -> TestResult {
    let algorithm =
        ComplexInlineShardingAlgorithm::new(&props(&[("algorithm-expression", "t_${a}_${b}")]))?;
    let mut value = ComplexKeysShardingValue {
        logic_table: "t_order".to_string(),
        ..ComplexKeysShardingValue::default()
    };
    value.column_values.insert("a".to_string(), vec![ShardingValue::Int(1), ShardingValue::Int(2)]);
    value.column_values.insert("b".to_string(), vec![ShardingValue::Int(9)]);
    let routed = algorithm.do_sharding(&[], &value)?;
    ensure(routed == targets(&["t_1_9", "t_2_9"]), format!("unexpected targets {routed:?}"))
}

#[test]
fn complex_inline_checks_column_count() -> TestResult {
    let algorithm = ComplexInlineShardingAlgorithm::new(&props(&[
        ("algorithm-expression", "t_${a}_${b}"),
        ("sharding-columns", "a, b"),
    ]))?;
    let mut value = ComplexKeysShardingValue::default();
    value.column_values.insert("a".to_string(), vec![ShardingValue::Int(1)]);
    match algorithm.do_sharding(&[], &value) {
        Err(RouteError::MismatchedColumnCount {
            expected: 2,
            actual: 1,
        }) => Ok(()),
        other => fail(format!("expected column count mismatch, got {other:?}")),
    }
}

#[test]
fn complex_inline_without_columns_routes_nowhere() -> TestResult {
    let algorithm =
        ComplexInlineShardingAlgorithm::new(&props(&[("algorithm-expression", "t_${a}")]))?;
    let routed = algorithm.do_sharding(&targets(&["t_1", "t_2"]), &ComplexKeysShardingValue::default())?;
    ensure(routed.is_empty(), format!("expected no targets, got {routed:?}"))
}

#[test]
fn complex_inline_range_broadcasts_when_enabled() -> TestResult {
    let algorithm = ComplexInlineShardingAlgorithm::new(&props(&[
        ("algorithm-expression", "t_${a}"),
        ("allow-range-query-with-inline-sharding", "true"),
    ]))?;
    let mut value = ComplexKeysShardingValue::default();
    value.column_ranges.insert("a".to_string(), ValueRange::closed(1, 3));
    let available = targets(&["t_1", "t_2"]);
    let routed = algorithm.do_sharding(&available, &value)?;
    ensure(routed == available, format!("range should broadcast, got {routed:?}"))
}

// ============================================================================
// SECTION: HINT_INLINE
// ============================================================================

#[test]
fn hint_inline_defaults_to_value_verbatim() -> TestResult {
    let algorithm = HintInlineShardingAlgorithm::new(&AlgorithmProps::new())?;
    let value = HintShardingValue {
        logic_table: "t_order".to_string(),
        values: vec![ShardingValue::from("ds_1"), ShardingValue::from("ds_1")],
    };
    let routed = algorithm.do_sharding(&[], &value)?;
    ensure(routed == targets(&["ds_1"]), format!("unexpected targets {routed:?}"))
}

#[test]
fn hint_inline_applies_template() -> TestResult {
    let algorithm =
        HintInlineShardingAlgorithm::new(&props(&[("algorithm-expression", "ds_${value % 2}")]))?;
    let value = HintShardingValue {
        logic_table: "t_order".to_string(),
        values: vec![ShardingValue::Int(3)],
    };
    let routed = algorithm.do_sharding(&[], &value)?;
    ensure(routed == targets(&["ds_1"]), format!("unexpected targets {routed:?}"))
}

// ============================================================================
// SECTION: MOD and HASH_MOD
// ============================================================================

#[test]
fn mod_matches_trailing_digits() -> TestResult {
    let algorithm = ModShardingAlgorithm::new(&props(&[("sharding-count", "4")]))?;
    let available = targets(&["t_12", "t_0", "t_1", "t_2", "t_3"]);
    let routed = algorithm.do_sharding_precise(&available, &precise("id", 6))?;
    ensure(routed.as_deref() == Some("t_2"), format!("id 6 routed to {routed:?}"))?;
    let parsed = algorithm.do_sharding_precise(&available, &precise("id", "7"))?;
    ensure(parsed.as_deref() == Some("t_3"), format!("id \"7\" routed to {parsed:?}"))
}

#[test]
fn mod_narrows_short_ranges() -> TestResult {
    let algorithm = ModShardingAlgorithm::new(&props(&[("sharding-count", "4")]))?;
    let available = targets(&["t_0", "t_1", "t_2", "t_3"]);
    let narrow = algorithm.do_sharding_range(&available, &range("id", ValueRange::closed(5, 6)))?;
    ensure(narrow == targets(&["t_1", "t_2"]), format!("unexpected narrow range {narrow:?}"))?;
    let wide = algorithm.do_sharding_range(&available, &range("id", ValueRange::closed(0, 100)))?;
    ensure(wide == available, format!("wide range should broadcast, got {wide:?}"))?;
    let empty = algorithm.do_sharding_range(&available, &range("id", ValueRange::closed(6, 5)))?;
    ensure(empty.is_empty(), format!("empty range routed to {empty:?}"))
}

#[test]
fn mod_requires_positive_count() -> TestResult {
    ensure(ModShardingAlgorithm::new(&props(&[("sharding-count", "0")])).is_err(), "zero count accepted")?;
    ensure(ModShardingAlgorithm::new(&AlgorithmProps::new()).is_err(), "missing count accepted")
}

#[test]
fn hash_mod_is_deterministic() -> TestResult {
    let algorithm = HashModShardingAlgorithm::new(&props(&[("sharding-count", "2")]))?;
    let available = targets(&["t_0", "t_1"]);
    let first = algorithm.do_sharding_precise(&available, &precise("name", "alice"))?;
    let second = algorithm.do_sharding_precise(&available, &precise("name", "alice"))?;
    ensure(first.is_some(), "hash mod must pick a target")?;
    ensure(first == second, "hash mod must be stable")
}

// ============================================================================
// SECTION: Strategies
// ============================================================================

#[test]
fn standard_strategy_filters_to_available_targets() -> TestResult {
    let algorithm = AlgorithmRegistry::with_builtins().build_sharding(
        &AlgorithmConfig::new("inline").with_prop("algorithm-expression", "ds_${user_id % 3}"),
    )?;
    let strategy = ShardingStrategy::new(&["user_id".to_string()], algorithm)?;
    let condition = ShardingCondition {
        values: vec![ShardingConditionValue {
            table: "t_order".to_string(),
            column: "user_id".to_string(),
            value: ConditionValue::list([ShardingValue::Int(1), ShardingValue::Int(2)]),
        }],
    };
    let available = targets(&["DS_0", "DS_1"]);
    let routed = strategy.do_sharding(&available, "t_order", Some(&condition), None)?;
    ensure(routed == targets(&["DS_1"]), format!("unexpected targets {routed:?}"))?;
    let unconstrained = strategy.do_sharding(&available, "t_order", None, None)?;
    ensure(unconstrained == available, "missing condition should route everywhere")
}

#[test]
fn standard_strategy_needs_one_column() -> TestResult {
    let algorithm = AlgorithmRegistry::with_builtins().build_sharding(
        &AlgorithmConfig::new("MOD").with_prop("sharding-count", "2"),
    )?;
    let columns = vec!["a".to_string(), "b".to_string()];
    ensure(ShardingStrategy::new(&columns, algorithm).is_err(), "two columns accepted")
}

#[test]
fn hint_strategy_reads_hint_values() -> TestResult {
    let algorithm = AlgorithmRegistry::with_builtins().build_sharding(&AlgorithmConfig::new("HINT_INLINE"))?;
    let strategy = ShardingStrategy::new(&[], algorithm)?;
    ensure(strategy.is_hint(), "hint algorithm should build a hint strategy")?;
    let available = targets(&["ds_0", "ds_1"]);
    let hinted = strategy.do_sharding(&available, "t_order", None, Some(&[ShardingValue::from("ds_1")]))?;
    ensure(hinted == targets(&["ds_1"]), format!("unexpected targets {hinted:?}"))
}

// ============================================================================
// SECTION: Registry
// ============================================================================

#[test]
fn registry_lists_builtins() -> TestResult {
    let registry = AlgorithmRegistry::with_builtins();
    let types = registry.sharding_types();
    for expected in ["COMPLEX_INLINE", "HASH_MOD", "HINT_INLINE", "INLINE", "MOD"] {
        ensure(types.contains(&expected), format!("missing builtin {expected}"))?;
    }
    Ok(())
}

#[test]
fn registry_rejects_unknown_and_duplicate_types() -> TestResult {
    let mut registry = AlgorithmRegistry::with_builtins();
    match registry.build_sharding(&AlgorithmConfig::new("VOLUME_RANGE")) {
        Err(AlgorithmError::UnknownType(name)) => ensure(name == "VOLUME_RANGE", "unknown type echoed")?,
        other => return fail(format!("expected unknown type, got {other:?}")),
    }
    let duplicate = registry.register_sharding("inline", |_| {
        Err(AlgorithmError::UnknownType("never built".to_string()))
    });
    ensure(
        matches!(duplicate, Err(AlgorithmError::DuplicateType(_))),
        format!("expected duplicate type, got {duplicate:?}"),
    )
}

#[test]
fn registry_builds_custom_algorithms() -> TestResult {
    let mut registry = AlgorithmRegistry::new();
    registry.register_sharding("FIXED", |_| {
        Ok(ShardingAlgorithm::Standard(std::sync::Arc::new(ModShardingAlgorithm::new(
            &BTreeMap::from([("sharding-count".to_string(), "1".to_string())]),
        )?)))
    })?;
    let built = registry.build_sharding(&AlgorithmConfig::new("fixed"))?;
    ensure(built.kind() == "standard", format!("unexpected kind {}", built.kind()))
}

#[test]
fn increment_key_generator_counts_from_start() -> TestResult {
    let registry = AlgorithmRegistry::with_builtins();
    let generator = registry.build_key_generator(&AlgorithmConfig::new("INCREMENT").with_prop("start", "10"))?;
    let keys = [generator.generate_key(), generator.generate_key()];
    ensure(
        keys == [ShardingValue::Int(10), ShardingValue::Int(11)],
        format!("unexpected keys {keys:?}"),
    )
}
