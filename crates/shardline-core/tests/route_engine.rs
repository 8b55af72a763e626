// crates/shardline-core/tests/route_engine.rs
// ============================================================================
// Test Module: Route Engine
// Coverage: Sharding routes, hints, fallback, broadcast, binding, validators.
// ============================================================================
//! ## Overview
//! Integration tests routing logical statements through the router chain
//! against the shared order-table fixture.

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

use std::sync::Arc;

use proptest::prelude::*;
use shardline_core::core::DataNode;
use shardline_core::core::DatabaseType;
use shardline_core::core::HintValueContext;
use shardline_core::core::Operand;
use shardline_core::core::Predicate;
use shardline_core::core::PredicateCondition;
use shardline_core::core::QueryContext;
use shardline_core::core::RouteContext;
use shardline_core::core::RouteError;
use shardline_core::core::ShardingValue;
use shardline_core::core::StatementContext;
use shardline_core::core::StatementFeatures;
use shardline_core::core::StatementKind;
use shardline_core::core::Topology;
use shardline_core::interfaces::SqlRouter;
use shardline_core::runtime::AlgorithmConfig;
use shardline_core::runtime::AlgorithmRegistry;
use shardline_core::runtime::AuditStrategy;
use shardline_core::runtime::KeyGenerateStrategy;
use shardline_core::runtime::ReadwriteSplittingRouter;
use shardline_core::runtime::ReadwriteSplittingRule;
use shardline_core::runtime::ShardingCacheOptions;
use shardline_core::runtime::ShardingRule;
use shardline_core::runtime::ShardingSqlRouter;
use shardline_core::runtime::ShardingStrategy;
use shardline_core::runtime::SqlRouteEngine;
use shardline_core::runtime::TableRule;
use shardline_core::runtime::route::LoadBalancer;
use shardline_core::runtime::route::ReadwriteSplittingGroup;
use shardline_core::runtime::route::ShardingDmlValidator;
use support::TestResult;
use support::ensure;
use support::fail;
use support::fixtures::order_rule;
use support::fixtures::sharding_engine;
use support::fixtures::table_rule;
use support::fixtures::topology;

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// `SELECT * FROM t_order WHERE user_id = ? AND order_id = ?`.
fn select_by_keys(user_id: i64, order_id: i64) -> QueryContext {
    let statement = StatementContext::select(&["t_order"]).with_predicates(vec![
        Predicate::eq("t_order", "user_id", Operand::Parameter(0)),
        Predicate::eq("t_order", "order_id", Operand::Parameter(1)),
    ]);
    QueryContext::new(
        "SELECT * FROM t_order WHERE user_id = ? AND order_id = ?",
        statement,
        vec![ShardingValue::Int(user_id), ShardingValue::Int(order_id)],
    )
}

/// `(data source, logic table, actual table)` triples of `route`.
fn triples(route: &RouteContext) -> Vec<(String, String, String)> {
    let mut result = Vec::new();
    for unit in route.route_units() {
        for mapper in &unit.table_mappers {
            result.push((
                unit.data_source_name().to_string(),
                mapper.logic_name.clone(),
                mapper.actual_name.clone(),
            ));
        }
    }
    result
}

/// Owned triple.
fn triple(data_source: &str, logic: &str, actual: &str) -> (String, String, String) {
    (data_source.to_string(), logic.to_string(), actual.to_string())
}

/// Data source names of every unit, in order.
fn data_sources(route: &RouteContext) -> Vec<String> {
    route.route_units().iter().map(|unit| unit.data_source_name().to_string()).collect()
}

// ============================================================================
// SECTION: Standard Routes
// ============================================================================

#[test]
fn full_sharding_keys_route_to_one_node() -> TestResult {
    let route = sharding_engine(order_rule()?).route(&select_by_keys(3, 4), &topology())?;
    ensure(
        triples(&route) == vec![triple("ds_1", "t_order", "t_order_0")],
        format!("unexpected route {:?}", triples(&route)),
    )
}

#[test]
fn missing_conditions_route_to_every_node() -> TestResult {
    let query = QueryContext::new("SELECT * FROM t_order", StatementContext::select(&["t_order"]), Vec::new());
    let route = sharding_engine(order_rule()?).route(&query, &topology())?;
    ensure(route.route_units().len() == 4, format!("expected 4 units, got {}", route.route_units().len()))
}

#[test]
fn in_list_routes_to_each_listed_table() -> TestResult {
    let statement = StatementContext::select(&["t_order"]).with_predicates(vec![
        Predicate::eq("t_order", "user_id", Operand::literal(1)),
        Predicate::in_list("t_order", "order_id", vec![Operand::literal(1), Operand::literal(2)]),
    ]);
    let query = QueryContext::new("SELECT * FROM t_order WHERE ...", statement, Vec::new());
    let route = sharding_engine(order_rule()?).route(&query, &topology())?;
    ensure(
        triples(&route)
            == vec![triple("ds_1", "t_order", "t_order_1"), triple("ds_1", "t_order", "t_order_0")],
        format!("unexpected route {:?}", triples(&route)),
    )
}

#[test]
fn contradictory_predicates_route_nowhere() -> TestResult {
    let statement = StatementContext::select(&["t_order"]).with_predicates(vec![
        Predicate::eq("t_order", "user_id", Operand::literal(1)),
        Predicate::eq("t_order", "user_id", Operand::literal(2)),
    ]);
    let query = QueryContext::new("SELECT * FROM t_order WHERE ...", statement, Vec::new());
    let route = sharding_engine(order_rule()?).route(&query, &topology())?;
    ensure(route.is_empty(), format!("expected empty route, got {:?}", triples(&route)))
}

#[test]
fn unconstrained_or_branch_routes_everywhere() -> TestResult {
    let statement = StatementContext::select(&["t_order"])
        .with_predicates(vec![Predicate::eq("t_order", "user_id", Operand::literal(1))])
        .with_predicates(vec![Predicate::eq("t_order", "status", Operand::literal("OK"))]);
    let query = QueryContext::new("SELECT * FROM t_order WHERE ...", statement, Vec::new());
    let route = sharding_engine(order_rule()?).route(&query, &topology())?;
    ensure(route.route_units().len() == 4, format!("expected 4 units, got {}", route.route_units().len()))
}

#[test]
fn between_predicate_broadcasts_when_ranges_allowed() -> TestResult {
    let algorithm = AlgorithmRegistry::with_builtins().build_sharding(
        &AlgorithmConfig::new("INLINE")
            .with_prop("algorithm-expression", "ds_${user_id % 2}")
            .with_prop("allow-range-query-with-inline-sharding", "true"),
    )?;
    let rule = ShardingRule::new().with_table_rule(
        TableRule::from_expression("t_order", "ds_${0..1}.t_order")?
            .with_database_strategy(ShardingStrategy::new(&["user_id".to_string()], algorithm)?),
    );
    let statement = StatementContext::select(&["t_order"]).with_predicates(vec![Predicate::between(
        "t_order",
        "user_id",
        Operand::literal(1),
        Operand::literal(9),
    )]);
    let query = QueryContext::new("SELECT * FROM t_order WHERE user_id BETWEEN 1 AND 9", statement, Vec::new());
    let route = sharding_engine(rule).route(&query, &topology())?;
    ensure(data_sources(&route) == vec!["ds_0", "ds_1"], format!("unexpected route {:?}", triples(&route)))
}

#[test]
fn range_predicate_is_rejected_by_default() -> TestResult {
    let statement = StatementContext::select(&["t_order"]).with_predicates(vec![Predicate::new(
        "t_order",
        "user_id",
        PredicateCondition::GreaterThan(Operand::literal(5)),
    )]);
    let query = QueryContext::new("SELECT * FROM t_order WHERE user_id > 5", statement, Vec::new());
    match sharding_engine(order_rule()?).route(&query, &topology()) {
        Err(RouteError::UnsupportedRangeQuery(_)) => Ok(()),
        other => fail(format!("expected range rejection, got {other:?}")),
    }
}

#[test]
fn missing_parameter_is_reported() -> TestResult {
    let mut query = select_by_keys(1, 2);
    query.params.truncate(1);
    match sharding_engine(order_rule()?).route(&query, &topology()) {
        Err(RouteError::ParameterIndexOutOfRange {
            index: 1,
            count: 1,
        }) => Ok(()),
        other => fail(format!("expected parameter error, got {other:?}")),
    }
}

#[test]
fn binding_tables_share_actual_table_index() -> TestResult {
    let statement = StatementContext::select(&["t_order", "t_order_item"]).with_predicates(vec![
        Predicate::eq("t_order", "user_id", Operand::literal(1)),
        Predicate::eq("t_order", "order_id", Operand::literal(2)),
    ]);
    let query = QueryContext::new("SELECT * FROM t_order o JOIN t_order_item i ...", statement, Vec::new());
    let route = sharding_engine(order_rule()?).route(&query, &topology())?;
    ensure(
        triples(&route)
            == vec![
                triple("ds_1", "t_order", "t_order_0"),
                triple("ds_1", "t_order_item", "t_order_item_0"),
            ],
        format!("unexpected route {:?}", triples(&route)),
    )
}

#[test]
fn ddl_routes_to_every_data_node() -> TestResult {
    let query = QueryContext::new(
        "ALTER TABLE t_order ADD COLUMN note VARCHAR(32)",
        StatementContext::new(StatementKind::Ddl, &["t_order"]),
        Vec::new(),
    );
    let route = sharding_engine(order_rule()?).route(&query, &topology())?;
    ensure(route.route_units().len() == 4, format!("expected 4 units, got {}", route.route_units().len()))
}

// ============================================================================
// SECTION: Broadcast and Fallback
// ============================================================================

#[test]
fn broadcast_reads_unicast_and_writes_fan_out() -> TestResult {
    let engine = sharding_engine(order_rule()?);
    let read = QueryContext::new("SELECT * FROM t_config", StatementContext::select(&["t_config"]), Vec::new());
    let route = engine.route(&read, &topology())?;
    ensure(data_sources(&route) == vec!["ds_0"], format!("unexpected read route {:?}", data_sources(&route)))?;

    let write = QueryContext::new(
        "UPDATE t_config SET value = 1",
        StatementContext::new(StatementKind::Update, &["t_config"]),
        Vec::new(),
    );
    let route = engine.route(&write, &topology())?;
    ensure(
        data_sources(&route) == vec!["ds_0", "ds_1"],
        format!("unexpected write route {:?}", data_sources(&route)),
    )
}

#[test]
fn single_storage_unit_takes_unrouted_statements() -> TestResult {
    let topology = Topology::new("sharding_db").with_unit("ds_0", DatabaseType::MySql);
    let query = QueryContext::new("SELECT * FROM t_user", StatementContext::select(&["t_user"]), Vec::new());
    let route = sharding_engine(order_rule()?).route(&query, &topology)?;
    ensure(data_sources(&route) == vec!["ds_0"], format!("unexpected route {:?}", data_sources(&route)))
}

#[test]
fn unrouted_statement_stays_empty_with_many_units() -> TestResult {
    let query = QueryContext::new("SELECT * FROM t_user", StatementContext::select(&["t_user"]), Vec::new());
    let route = sharding_engine(order_rule()?).route(&query, &topology())?;
    ensure(route.is_empty(), "multi-unit topology must not fall back")
}

#[test]
fn unknown_route_target_is_rejected() -> TestResult {
    let topology = Topology::new("sharding_db").with_unit("ds_0", DatabaseType::MySql);
    match sharding_engine(order_rule()?).route(&select_by_keys(1, 1), &topology) {
        Err(RouteError::UnknownStorageUnit(name)) => ensure(name == "ds_1", format!("unexpected unit {name}")),
        other => fail(format!("expected unknown storage unit, got {other:?}")),
    }
}

// ============================================================================
// SECTION: Hints
// ============================================================================

#[test]
fn hint_data_source_overrides_routing() -> TestResult {
    let query = select_by_keys(3, 4).with_hint(HintValueContext::default().with_data_source("ds_0"));
    let route = sharding_engine(order_rule()?).route(&query, &topology())?;
    ensure(data_sources(&route) == vec!["ds_0"], format!("unexpected route {:?}", data_sources(&route)))?;
    ensure(route.route_units()[0].table_mappers.is_empty(), "hint route carries no table mappers")
}

#[test]
fn unknown_hint_data_source_is_rejected() -> TestResult {
    let query = select_by_keys(3, 4).with_hint(HintValueContext::default().with_data_source("ds_9"));
    match sharding_engine(order_rule()?).route(&query, &topology()) {
        Err(RouteError::UnknownHintTarget(name)) => ensure(name == "ds_9", format!("unexpected target {name}")),
        other => fail(format!("expected unknown hint target, got {other:?}")),
    }
}

#[test]
fn hint_strategy_routes_by_hint_values() -> TestResult {
    let algorithm = AlgorithmRegistry::with_builtins().build_sharding(
        &AlgorithmConfig::new("HINT_INLINE").with_prop("algorithm-expression", "ds_${value % 2}"),
    )?;
    let rule = ShardingRule::new().with_table_rule(
        TableRule::from_expression("t_order", "ds_${0..1}.t_order")?
            .with_database_strategy(ShardingStrategy::new(&[], algorithm)?),
    );
    let query = QueryContext::new("SELECT * FROM t_order", StatementContext::select(&["t_order"]), Vec::new())
        .with_hint(HintValueContext::default().with_database_value("T_ORDER", 3));
    let route = sharding_engine(rule).route(&query, &topology())?;
    ensure(data_sources(&route) == vec!["ds_1"], format!("unexpected route {:?}", data_sources(&route)))
}

// ============================================================================
// SECTION: Inserts and Key Generation
// ============================================================================

#[test]
fn insert_rows_route_individually_with_generated_keys() -> TestResult {
    let generator = AlgorithmRegistry::with_builtins()
        .build_key_generator(&AlgorithmConfig::new("INCREMENT").with_prop("start", "10"))?;
    let rule = ShardingRule::new().with_table_rule(table_rule("t_order")?.with_key_generate(KeyGenerateStrategy {
        column: "order_id".to_string(),
        generator,
    }));
    let statement = StatementContext::insert(
        "t_order",
        &["user_id", "status"],
        vec![
            vec![Operand::Parameter(0), Operand::Parameter(1)],
            vec![Operand::Parameter(2), Operand::Parameter(3)],
        ],
    );
    let query = QueryContext::new(
        "INSERT INTO t_order (user_id, status) VALUES (?, ?), (?, ?)",
        statement,
        vec![
            ShardingValue::Int(1),
            ShardingValue::from("a"),
            ShardingValue::Int(2),
            ShardingValue::from("b"),
        ],
    );
    let route = sharding_engine(rule).route(&query, &topology())?;
    ensure(
        route.generated_keys == vec![ShardingValue::Int(10), ShardingValue::Int(11)],
        format!("unexpected keys {:?}", route.generated_keys),
    )?;
    ensure(
        route.original_data_nodes
            == vec![vec![DataNode::new("ds_1", "t_order_0")], vec![DataNode::new("ds_0", "t_order_1")]],
        format!("unexpected original nodes {:?}", route.original_data_nodes),
    )?;
    ensure(
        triples(&route)
            == vec![triple("ds_1", "t_order", "t_order_0"), triple("ds_0", "t_order", "t_order_1")],
        format!("unexpected route {:?}", triples(&route)),
    )
}

#[test]
fn insert_with_explicit_key_skips_generation() -> TestResult {
    let generator = AlgorithmRegistry::with_builtins().build_key_generator(&AlgorithmConfig::new("INCREMENT"))?;
    let rule = ShardingRule::new().with_table_rule(table_rule("t_order")?.with_key_generate(KeyGenerateStrategy {
        column: "order_id".to_string(),
        generator,
    }));
    let statement = StatementContext::insert(
        "t_order",
        &["user_id", "order_id"],
        vec![vec![Operand::literal(2), Operand::literal(3)]],
    );
    let query = QueryContext::new("INSERT INTO t_order (user_id, order_id) VALUES (2, 3)", statement, Vec::new());
    let route = sharding_engine(rule).route(&query, &topology())?;
    ensure(route.generated_keys.is_empty(), "explicit key must not be generated")?;
    ensure(
        triples(&route) == vec![triple("ds_0", "t_order", "t_order_1")],
        format!("unexpected route {:?}", triples(&route)),
    )
}

#[test]
fn insert_row_without_database_key_is_rejected() -> TestResult {
    let statement =
        StatementContext::insert("t_order", &["order_id"], vec![vec![Operand::literal(3)]]);
    let query = QueryContext::new("INSERT INTO t_order (order_id) VALUES (3)", statement, Vec::new());
    match sharding_engine(order_rule()?).route(&query, &topology()) {
        Err(RouteError::Validation(_)) => Ok(()),
        other => fail(format!("expected validation error, got {other:?}")),
    }
}

// ============================================================================
// SECTION: Validators and Auditors
// ============================================================================

#[test]
fn multi_table_update_requires_binding() -> TestResult {
    let rule = Arc::new(order_rule()?);
    let router = ShardingSqlRouter::new(Arc::clone(&rule))
        .with_validator(Arc::new(ShardingDmlValidator::new(Arc::clone(&rule))));
    let engine = SqlRouteEngine::new(vec![Arc::new(router)]);

    let unbound = QueryContext::new(
        "UPDATE t_order, t_config SET ...",
        StatementContext::new(StatementKind::Update, &["t_order", "t_config"]),
        Vec::new(),
    );
    match engine.route(&unbound, &topology()) {
        Err(RouteError::Validation(message)) => {
            ensure(message.starts_with("UPDATE"), format!("unexpected message {message}"))?;
        }
        other => return fail(format!("expected validation error, got {other:?}")),
    }

    let bound = QueryContext::new(
        "UPDATE t_order, t_order_item SET ...",
        StatementContext::new(StatementKind::Update, &["t_order", "t_order_item"]),
        Vec::new(),
    );
    engine.route(&bound, &topology())?;
    Ok(())
}

#[test]
fn limited_delete_must_not_span_units() -> TestResult {
    let rule = Arc::new(order_rule()?);
    let router = ShardingSqlRouter::new(Arc::clone(&rule))
        .with_validator(Arc::new(ShardingDmlValidator::new(Arc::clone(&rule))));
    let engine = SqlRouteEngine::new(vec![Arc::new(router)]);
    let query = QueryContext::new(
        "DELETE FROM t_order LIMIT 10",
        StatementContext::new(StatementKind::Delete, &["t_order"]).with_features(StatementFeatures {
            pagination: true,
            ..StatementFeatures::default()
        }),
        Vec::new(),
    );
    match engine.route(&query, &topology()) {
        Err(RouteError::Validation(message)) => ensure(message.starts_with("DELETE"), message),
        other => fail(format!("expected validation error, got {other:?}")),
    }
}

#[test]
fn auditor_blocks_unconditioned_dml_unless_disabled_by_hint() -> TestResult {
    let auditor = AlgorithmRegistry::with_builtins()
        .build_auditor(&AlgorithmConfig::new("DML_SHARDING_CONDITIONS"))?;
    let rule = order_rule()?.with_auditor("sharding_key_required", auditor).with_audit_strategy(
        AuditStrategy {
            auditor_names: vec!["sharding_key_required".to_string()],
            allow_hint_disable: true,
        },
    );
    let engine = sharding_engine(rule);
    let query = QueryContext::new("SELECT * FROM t_order", StatementContext::select(&["t_order"]), Vec::new());
    match engine.route(&query, &topology()) {
        Err(RouteError::Audit(_)) => {}
        other => return fail(format!("expected audit failure, got {other:?}")),
    }

    let disabled = query.with_hint(HintValueContext::default().with_disabled_auditor("sharding_key_required"));
    let route = engine.route(&disabled, &topology())?;
    ensure(route.route_units().len() == 4, "disabled auditor should allow a full route")?;
    engine.route(&select_by_keys(1, 1), &topology())?;
    Ok(())
}

// ============================================================================
// SECTION: Readwrite Splitting
// ============================================================================

#[test]
fn readwrite_router_rewrites_data_sources() -> TestResult {
    let readwrite = Arc::new(ReadwriteSplittingRule::new(vec![ReadwriteSplittingGroup {
        name: "ds_0".to_string(),
        write_storage_unit: "ds_0_write".to_string(),
        read_storage_units: vec!["ds_0_read_0".to_string(), "ds_0_read_1".to_string()],
        load_balancer: LoadBalancer::RoundRobin,
    }]));
    let engine = SqlRouteEngine::new(vec![
        Arc::new(ShardingSqlRouter::new(Arc::new(order_rule()?))),
        Arc::new(ReadwriteSplittingRouter::new(readwrite)),
    ]);
    ensure(engine.router_names() == vec!["sharding", "readwrite_splitting"], "router order")?;
    let topology = Topology::new("sharding_db")
        .with_unit("ds_0_write", DatabaseType::MySql)
        .with_unit("ds_0_read_0", DatabaseType::MySql)
        .with_unit("ds_0_read_1", DatabaseType::MySql)
        .with_unit("ds_1", DatabaseType::MySql);

    let first = engine.route(&select_by_keys(2, 1), &topology)?;
    let second = engine.route(&select_by_keys(2, 1), &topology)?;
    ensure(data_sources(&first) == vec!["ds_0_read_0"], format!("first read {:?}", data_sources(&first)))?;
    ensure(data_sources(&second) == vec!["ds_0_read_1"], format!("second read {:?}", data_sources(&second)))?;
    ensure(first.route_units()[0].data_source_mapper.logic_name == "ds_0", "logic name kept")?;

    let write = QueryContext::new(
        "UPDATE t_order SET status = 'x' WHERE user_id = 2 AND order_id = 1",
        StatementContext::new(StatementKind::Update, &["t_order"]).with_predicates(vec![
            Predicate::eq("t_order", "user_id", Operand::literal(2)),
            Predicate::eq("t_order", "order_id", Operand::literal(1)),
        ]),
        Vec::new(),
    );
    let routed = engine.route(&write, &topology)?;
    ensure(data_sources(&routed) == vec!["ds_0_write"], format!("write {:?}", data_sources(&routed)))
}

#[test]
fn write_route_only_hint_reads_from_primary() -> TestResult {
    let rule = ReadwriteSplittingRule::new(vec![ReadwriteSplittingGroup {
        name: "readwrite_ds".to_string(),
        write_storage_unit: "primary".to_string(),
        read_storage_units: vec!["replica".to_string()],
        load_balancer: LoadBalancer::First,
    }]);
    let engine = SqlRouteEngine::new(vec![Arc::new(ReadwriteSplittingRouter::new(Arc::new(rule)))]);
    let topology = Topology::new("db")
        .with_unit("primary", DatabaseType::PostgreSql)
        .with_unit("replica", DatabaseType::PostgreSql);
    let read = QueryContext::new("SELECT 1", StatementContext::select(&[]), Vec::new());
    let route = engine.route(&read, &topology)?;
    ensure(data_sources(&route) == vec!["replica"], format!("read {:?}", data_sources(&route)))?;
    let pinned = read.with_hint(HintValueContext::default().with_write_route_only());
    let route = engine.route(&pinned, &topology)?;
    ensure(data_sources(&route) == vec!["primary"], format!("pinned {:?}", data_sources(&route)))
}

// ============================================================================
// SECTION: Cache and Determinism
// ============================================================================

#[test]
fn cache_stores_routes_by_sql_and_conditions() -> TestResult {
    let rule = Arc::new(order_rule()?.with_cache(ShardingCacheOptions::default()));
    let router = Arc::new(ShardingSqlRouter::new(rule));
    let engine = SqlRouteEngine::new(vec![Arc::clone(&router) as Arc<dyn SqlRouter>]);
    let first = engine.route(&select_by_keys(1, 2), &topology())?;
    let second = engine.route(&select_by_keys(1, 2), &topology())?;
    engine.route(&select_by_keys(2, 2), &topology())?;
    ensure(first == second, "cached route must match")?;
    let cache = router.cache().ok_or("cache should be enabled")?;
    ensure(cache.len() == 2, format!("expected 2 cache entries, got {}", cache.len()))
}

#[test]
fn long_sql_bypasses_cache() -> TestResult {
    let rule = Arc::new(order_rule()?.with_cache(ShardingCacheOptions {
        allowed_max_sql_length: 8,
        maximum_size: 16,
    }));
    let router = Arc::new(ShardingSqlRouter::new(rule));
    let engine = SqlRouteEngine::new(vec![Arc::clone(&router) as Arc<dyn SqlRouter>]);
    engine.route(&select_by_keys(1, 2), &topology())?;
    let cache = router.cache().ok_or("cache should be enabled")?;
    ensure(cache.is_empty(), "long statements must not be cached")
}

#[test]
fn write_route_only_hint_bypasses_cache() -> TestResult {
    let rule = Arc::new(order_rule()?.with_cache(ShardingCacheOptions::default()));
    let router = Arc::new(ShardingSqlRouter::new(rule));
    let engine = SqlRouteEngine::new(vec![Arc::clone(&router) as Arc<dyn SqlRouter>]);
    let read = QueryContext::new("SELECT * FROM t_config", StatementContext::select(&["t_config"]), Vec::new());

    let hinted = read.clone().with_hint(HintValueContext::default().with_write_route_only());
    let route = engine.route(&hinted, &topology())?;
    ensure(
        data_sources(&route) == vec!["ds_0", "ds_1"],
        format!("unexpected hinted route {:?}", data_sources(&route)),
    )?;
    let cache = router.cache().ok_or("cache should be enabled")?;
    ensure(cache.is_empty(), "hinted routes must not be cached")?;

    let route = engine.route(&read, &topology())?;
    ensure(data_sources(&route) == vec!["ds_0"], format!("unexpected plain route {:?}", data_sources(&route)))?;
    ensure(cache.len() == 1, format!("expected 1 cache entry, got {}", cache.len()))
}

proptest! {
    #[test]
    fn routing_is_deterministic(user_id in 0_i64 .. 10_000, order_id in 0_i64 .. 10_000) {
        let engine = sharding_engine(order_rule().unwrap());
        let query = select_by_keys(user_id, order_id);
        let first = engine.route(&query, &topology()).unwrap();
        let second = engine.route(&query, &topology()).unwrap();
        prop_assert_eq!(first.route_units().len(), 1);
        prop_assert_eq!(first, second);
    }
}
