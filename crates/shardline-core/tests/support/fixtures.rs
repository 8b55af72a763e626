// crates/shardline-core/tests/support/fixtures.rs
// ============================================================================
// Module: Test Fixtures
// Description: Shared sharding rule and topology for routing tests.
// ============================================================================
//! ## Overview
//! `t_order` and `t_order_item` are bound tables spread over `ds_0` and
//! `ds_1`, two actual tables each. The database key is `user_id`; the table
//! key is `order_id`. `t_config` is a broadcast table.

use std::sync::Arc;

use shardline_core::core::DatabaseType;
use shardline_core::core::Topology;
use shardline_core::runtime::AlgorithmConfig;
use shardline_core::runtime::AlgorithmRegistry;
use shardline_core::runtime::ShardingRule;
use shardline_core::runtime::ShardingSqlRouter;
use shardline_core::runtime::ShardingStrategy;
use shardline_core::runtime::SqlRouteEngine;
use shardline_core::runtime::TableRule;

use super::TestResult;

/// Single-column `INLINE` strategy.
pub fn inline_strategy(column: &str, expression: &str) -> TestResult<ShardingStrategy> {
    let algorithm = AlgorithmRegistry::with_builtins().build_sharding(
        &AlgorithmConfig::new("INLINE").with_prop("algorithm-expression", expression),
    )?;
    Ok(ShardingStrategy::new(&[column.to_string()], algorithm)?)
}

/// Table rule over `ds_${0..1}.<table>_${0..1}`.
pub fn table_rule(table: &str) -> TestResult<TableRule> {
    Ok(TableRule::from_expression(table, &format!("ds_${{0..1}}.{table}_${{0..1}}"))?
        .with_database_strategy(inline_strategy("user_id", "ds_${user_id % 2}")?)
        .with_table_strategy(inline_strategy("order_id", &format!("{table}_${{order_id % 2}}"))?))
}

/// Order tables, bound together, plus the `t_config` broadcast table.
pub fn order_rule() -> TestResult<ShardingRule> {
    Ok(ShardingRule::new()
        .with_table_rule(table_rule("t_order")?)
        .with_table_rule(table_rule("t_order_item")?)
        .with_binding_group(&["t_order", "t_order_item"])?
        .with_broadcast_table("t_config"))
}

/// `sharding_db` with `ds_0` and `ds_1` on `MySQL`.
pub fn topology() -> Topology {
    Topology::new("sharding_db")
        .with_unit("ds_0", DatabaseType::MySql)
        .with_unit("ds_1", DatabaseType::MySql)
}

/// Route engine with only the sharding router.
pub fn sharding_engine(rule: ShardingRule) -> SqlRouteEngine {
    SqlRouteEngine::new(vec![Arc::new(ShardingSqlRouter::new(Arc::new(rule)))])
}
