// crates/shardline-core/src/runtime/rewrite/mod.rs
// ============================================================================
// Module: Rewrite Engine
// Description: Per-route-unit SQL and parameters, UNION ALL aggregation, translation.
// Purpose: Turn the logical statement and its route into executable SQL units.
// Dependencies: crate::{core, interfaces}
// ============================================================================

//! ## Overview
//! Route units are grouped by actual data source in first-seen order. A
//! group is aggregated into one `UNION ALL` statement when the statement is
//! a plain `SELECT` (no subquery, join, ordering, pagination, or lock) and
//! the group holds more than one unit; the aggregated unit is keyed by the
//! group's first route unit. Every other unit is rewritten on its own.
//!
//! Parameters follow the parameter builder: standard builders hand every
//! unit the full list; grouped builders hand each unit only the row groups
//! whose recorded data nodes it serves, followed by the generic parameters.
//!
//! Aggregated statements using `$n` markers bind one shared parameter list,
//! so parameters are captured once rather than once per branch.
//!
//! Each result is finally translated for its storage unit's dialect.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod builder;
pub mod translator;

// ============================================================================
// SECTION: Imports
// ============================================================================

use crate::core::DataNode;
use crate::core::ParameterBuilder;
use crate::core::QueryContext;
use crate::core::RewriteError;
use crate::core::RouteContext;
use crate::core::RouteSqlRewriteResult;
use crate::core::RouteUnit;
use crate::core::ShardingValue;
use crate::core::SqlRewriteContext;
use crate::core::SqlRewriteUnit;
use crate::core::StatementKind;
use crate::core::Topology;

pub use builder::build_sql;
pub use builder::trim_semicolon;
pub use translator::IdentifierQuoteTranslator;
pub use translator::NativeSqlTranslator;
pub use translator::TranslatorRule;

/// Separator between aggregated branches.
const UNION_ALL: &str = " UNION ALL ";

// ============================================================================
// SECTION: Engine
// ============================================================================

/// Route-aware rewrite engine.
#[derive(Clone, Default)]
pub struct SqlRewriteEngine {
    /// Dialect translators.
    translator: TranslatorRule,
}

impl SqlRewriteEngine {
    /// Creates an engine with `translator`.
    #[must_use]
    pub const fn new(translator: TranslatorRule) -> Self {
        Self {
            translator,
        }
    }

    /// Rewrites `context` for every unit of `route`.
    ///
    /// # Errors
    /// Returns [`RewriteError`] for malformed tokens, a unit whose storage
    /// unit is not in `topology`, or a translation failure.
    pub fn rewrite(
        &self,
        query: &QueryContext,
        context: &SqlRewriteContext,
        route: &RouteContext,
        topology: &Topology,
    ) -> Result<RouteSqlRewriteResult, RewriteError> {
        let mut rewritten: Vec<(RouteUnit, SqlRewriteUnit)> = Vec::with_capacity(route.route_units().len());
        for (_, units) in group_by_data_source(route.route_units()) {
            if is_aggregatable(query, &units) {
                let unit = aggregate(query, context, route, &units)?;
                rewritten.push((units[0].clone(), unit));
            } else {
                for route_unit in units {
                    let unit = SqlRewriteUnit {
                        sql: build_sql(&context.sql, &context.tokens, Some(route_unit))?,
                        params: parameters(context, route, route_unit),
                    };
                    rewritten.push((route_unit.clone(), unit));
                }
            }
        }

        let mut result = RouteSqlRewriteResult::default();
        for (route_unit, unit) in rewritten {
            let data_source = route_unit.data_source_name();
            let target = topology
                .storage_type(data_source)
                .ok_or_else(|| RewriteError::UnknownStorageUnit(data_source.to_string()))?;
            let unit = self.translator.translate(unit, query, target)?;
            result.units.push((route_unit, unit));
        }
        Ok(result)
    }
}

// ============================================================================
// SECTION: Aggregation
// ============================================================================

/// Groups units by actual data source, keeping first-seen order.
fn group_by_data_source(units: &[RouteUnit]) -> Vec<(&str, Vec<&RouteUnit>)> {
    let mut groups: Vec<(&str, Vec<&RouteUnit>)> = Vec::new();
    for unit in units {
        let name = unit.data_source_name();
        match groups.iter_mut().find(|(known, _)| *known == name) {
            Some((_, members)) => members.push(unit),
            None => groups.push((name, vec![unit])),
        }
    }
    groups
}

/// Plain multi-unit SELECTs are aggregated.
fn is_aggregatable(query: &QueryContext, units: &[&RouteUnit]) -> bool {
    query.statement.kind == StatementKind::Select
        && units.len() > 1
        && query.statement.features.is_plain()
}

/// One `UNION ALL` unit for a data source group.
fn aggregate(
    query: &QueryContext,
    context: &SqlRewriteContext,
    route: &RouteContext,
    units: &[&RouteUnit],
) -> Result<SqlRewriteUnit, RewriteError> {
    let dollar_marker = query.statement.dollar_parameter_marker;
    let mut branches: Vec<String> = Vec::with_capacity(units.len());
    let mut params: Vec<ShardingValue> = Vec::new();
    for &route_unit in units {
        let sql = build_sql(&context.sql, &context.tokens, Some(route_unit))?;
        branches.push(trim_semicolon(&sql).to_string());
        if dollar_marker && !params.is_empty() {
            continue;
        }
        params.extend(parameters(context, route, route_unit));
    }
    Ok(SqlRewriteUnit {
        sql: branches.join(UNION_ALL),
        params,
    })
}

// ============================================================================
// SECTION: Parameters
// ============================================================================

/// Parameters bound for `route_unit`.
fn parameters(context: &SqlRewriteContext, route: &RouteContext, route_unit: &RouteUnit) -> Vec<ShardingValue> {
    let grouped = match &context.parameter_builder {
        ParameterBuilder::Standard(params) => return params.clone(),
        ParameterBuilder::Grouped(grouped) => grouped,
    };
    if route.original_data_nodes.is_empty() {
        return grouped.all();
    }
    let mut params: Vec<ShardingValue> = Vec::new();
    for (index, nodes) in route.original_data_nodes.iter().enumerate() {
        if in_same_data_node(nodes, route_unit)
            && let Some(group) = grouped.groups.get(index)
        {
            params.extend(group.iter().cloned());
        }
    }
    params.extend(grouped.generic.iter().cloned());
    params
}

/// Returns true when `nodes` is empty or any node is served by `route_unit`.
fn in_same_data_node(nodes: &[DataNode], route_unit: &RouteUnit) -> bool {
    nodes.is_empty()
        || nodes.iter().any(|node| route_unit.find_table_mapper(&node.data_source, &node.table).is_some())
}
