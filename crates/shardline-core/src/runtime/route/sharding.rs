// crates/shardline-core/src/runtime/route/sharding.rs
// ============================================================================
// Module: Sharding Router
// Description: Routes statements over sharding, binding, and broadcast tables.
// Purpose: Turn extracted conditions into route units via table strategies.
// Dependencies: crate::{core, interfaces, runtime::{condition, rule}}
// ============================================================================

//! ## Overview
//! For DML and cursor statements the router extracts conditions, runs the
//! auditors and pre-route validators, merges duplicate conditions when
//! required, routes, and finally runs the post-route validators.
//!
//! Route shapes:
//! - **Broadcast**: every referenced table is a broadcast table. Plain reads
//!   go to the first data source; everything else goes to all of them.
//! - **Table broadcast**: DDL over sharding tables reaches every data node.
//! - **Standard**: each sharding table (with its binding partners) is routed
//!   through its database then table strategy. Independent tables are
//!   combined per data source as a Cartesian product.
//!
//! INSERT rows must each land on exactly one data node; the per-row nodes
//! are recorded in `original_data_nodes` for grouped parameter rewrite.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;

use crate::core::DataNode;
use crate::core::QueryContext;
use crate::core::RouteContext;
use crate::core::RouteError;
use crate::core::RouteMapper;
use crate::core::RouteUnit;
use crate::core::ShardingCondition;
use crate::core::ShardingConditions;
use crate::core::StatementKind;
use crate::core::Topology;
use crate::interfaces::SqlRouter;
use crate::interfaces::StatementValidator;
use crate::runtime::condition::ShardingConditionEngine;
use crate::runtime::route::cache::ShardingCache;
use crate::runtime::rule::ShardingRule;
use crate::runtime::rule::TableRule;

/// Data source plus table mappings produced for one routed node.
type RoutedPiece = (String, Vec<RouteMapper>);

// ============================================================================
// SECTION: Router
// ============================================================================

/// Router for the sharding rule.
pub struct ShardingSqlRouter {
    /// Sharding rule.
    rule: Arc<ShardingRule>,
    /// Statement validators run around routing.
    validators: Vec<Arc<dyn StatementValidator>>,
    /// Route cache, when the rule enables it.
    cache: Option<ShardingCache>,
}

impl ShardingSqlRouter {
    /// Router name.
    pub const NAME: &'static str = "sharding";

    /// Creates a router; the cache follows the rule's cache options.
    #[must_use]
    pub fn new(rule: Arc<ShardingRule>) -> Self {
        let cache = rule.cache_options().map(ShardingCache::new);
        Self {
            rule,
            validators: Vec::new(),
            cache,
        }
    }

    /// Adds a statement validator.
    #[must_use]
    pub fn with_validator(mut self, validator: Arc<dyn StatementValidator>) -> Self {
        self.validators.push(validator);
        self
    }

    /// Sharding rule.
    #[must_use]
    pub fn rule(&self) -> &ShardingRule {
        &self.rule
    }

    /// Route cache, when enabled.
    #[must_use]
    pub const fn cache(&self) -> Option<&ShardingCache> {
        self.cache.as_ref()
    }

    /// Full routing pass for one statement.
    fn route(&self, query: &QueryContext, topology: &Topology) -> Result<RouteContext, RouteError> {
        let statement = &query.statement;
        let extracted = ShardingConditionEngine::new(&self.rule).create(query)?;
        let mut conditions = extracted.conditions;
        let sharding_tables = self.rule.sharding_tables(&statement.tables);

        if statement.kind.is_dml() {
            for (_, auditor) in self.rule.active_auditors(&query.hint) {
                auditor.check(query, &conditions, &sharding_tables)?;
            }
        }
        for validator in &self.validators {
            validator.pre_validate(query, &conditions)?;
        }
        if statement.kind.is_dml() && conditions.is_need_merge() {
            conditions.merge();
        }

        let cache = self.cache.as_ref().filter(|cache| {
            cache.is_cacheable(&query.sql)
                && !query.hint.has_routing_hint()
                && extracted.generated_keys.is_empty()
        });
        let cached = cache.and_then(|cache| cache.get(&query.sql, &conditions));
        let mut route = match cached {
            Some(route) => route,
            None => {
                let route = self.route_statement(query, topology, &conditions, &sharding_tables)?;
                if let Some(cache) = cache {
                    cache.put(&query.sql, &conditions, &route);
                }
                route
            }
        };
        route.generated_keys = extracted.generated_keys;

        for validator in &self.validators {
            validator.post_validate(query, &route)?;
        }
        Ok(route)
    }

    /// Picks the route shape.
    fn route_statement(
        &self,
        query: &QueryContext,
        topology: &Topology,
        conditions: &ShardingConditions,
        sharding_tables: &[String],
    ) -> Result<RouteContext, RouteError> {
        let statement = &query.statement;
        if self.rule.is_all_broadcast(&statement.tables) {
            return Ok(self.route_broadcast(query, topology));
        }
        if sharding_tables.is_empty() || conditions.always_false {
            return Ok(RouteContext::new());
        }
        if statement.kind == StatementKind::Ddl {
            return self.route_table_broadcast(sharding_tables);
        }
        self.route_standard(query, conditions, sharding_tables)
    }

    /// Broadcast tables: first data source for plain reads, else all.
    fn route_broadcast(&self, query: &QueryContext, topology: &Topology) -> RouteContext {
        let mut data_sources = self.rule.data_source_names();
        if data_sources.is_empty() {
            data_sources = topology.names().map(str::to_string).collect();
        }
        let unicast = query.statement.kind == StatementKind::Select
            && !query.statement.features.lock
            && !query.hint.write_route_only;
        if unicast {
            data_sources.truncate(1);
        }
        let mappers: Vec<RouteMapper> = query
            .statement
            .tables
            .iter()
            .map(|table| RouteMapper::new(table.clone(), table.clone()))
            .collect();
        let mut route = RouteContext::new();
        for data_source in data_sources {
            route.add_route_unit(RouteUnit::new(
                RouteMapper::new(data_source.clone(), data_source),
                mappers.clone(),
            ));
        }
        route
    }

    /// Every data node of every sharding table.
    fn route_table_broadcast(&self, sharding_tables: &[String]) -> Result<RouteContext, RouteError> {
        let mut route = RouteContext::new();
        for table in sharding_tables {
            let table_rule = self.table_rule(table)?;
            for node in table_rule.actual_data_nodes() {
                route.add_route_unit(unit_for(
                    &node.data_source,
                    vec![RouteMapper::new(table.clone(), node.table.clone())],
                ));
            }
        }
        Ok(route)
    }

    /// Conditions through strategies, binding expansion, then Cartesian join.
    fn route_standard(
        &self,
        query: &QueryContext,
        conditions: &ShardingConditions,
        sharding_tables: &[String],
    ) -> Result<RouteContext, RouteError> {
        let mut route = RouteContext::new();
        let mut covered: Vec<String> = Vec::new();
        let mut groups: Vec<Vec<RoutedPiece>> = Vec::new();
        for table in sharding_tables {
            if covered.iter().any(|known| known.eq_ignore_ascii_case(table)) {
                continue;
            }
            let partners: Vec<String> = sharding_tables
                .iter()
                .filter(|other| {
                    !other.eq_ignore_ascii_case(table)
                        && self.rule.is_all_binding(&[table.clone(), (*other).clone()])
                })
                .cloned()
                .collect();
            covered.push(table.clone());
            covered.extend(partners.iter().cloned());

            let per_condition = self.route_table(query, self.table_rule(table)?, conditions)?;
            if query.statement.kind == StatementKind::Insert {
                for nodes in &per_condition {
                    if nodes.len() != 1 {
                        return Err(RouteError::Validation(format!(
                            "insert row on `{table}` must route to exactly one data node, got {}",
                            nodes.len()
                        )));
                    }
                }
                route.original_data_nodes.clone_from(&per_condition);
            }

            let mut pieces: Vec<RoutedPiece> = Vec::new();
            for node in per_condition.into_iter().flatten() {
                let mut mappers = vec![RouteMapper::new(table.clone(), node.table.clone())];
                for partner in &partners {
                    let actual = self
                        .rule
                        .binding_actual_table(&node.data_source, table, &node.table, partner)
                        .ok_or_else(|| {
                            RouteError::Validation(format!(
                                "binding table `{partner}` has no actual table paired with `{node}`"
                            ))
                        })?;
                    mappers.push(RouteMapper::new(partner.clone(), actual));
                }
                let piece = (node.data_source, mappers);
                if !pieces.contains(&piece) {
                    pieces.push(piece);
                }
            }
            groups.push(pieces);
        }

        for (data_source, mappers) in cartesian(&groups) {
            route.add_route_unit(unit_for(&data_source, mappers));
        }
        Ok(route)
    }

    /// Data nodes for one table, one list per condition.
    fn route_table(
        &self,
        query: &QueryContext,
        table_rule: &TableRule,
        conditions: &ShardingConditions,
    ) -> Result<Vec<Vec<DataNode>>, RouteError> {
        let table = table_rule.logic_table();
        let database_strategy = self.rule.database_strategy(table_rule);
        let table_strategy = self.rule.table_strategy(table_rule);
        let database_hint = query.hint.database_values(table);
        let table_hint = query.hint.table_values(table);
        let available_sources = table_rule.actual_data_source_names();

        let scoped: Vec<Option<&ShardingCondition>> = if conditions.is_empty() {
            vec![None]
        } else {
            conditions.conditions.iter().map(Some).collect()
        };
        let mut result: Vec<Vec<DataNode>> = Vec::with_capacity(scoped.len());
        for condition in scoped {
            let mut nodes: Vec<DataNode> = Vec::new();
            let sources =
                database_strategy.do_sharding(&available_sources, table, condition, database_hint)?;
            for source in sources {
                let available_tables = table_rule.actual_table_names(&source);
                let tables =
                    table_strategy.do_sharding(&available_tables, table, condition, table_hint)?;
                for actual in tables {
                    let node = DataNode::new(source.clone(), actual);
                    if !nodes.contains(&node) {
                        nodes.push(node);
                    }
                }
            }
            result.push(nodes);
        }
        Ok(result)
    }

    /// Table rule or [`RouteError::MissingTableRule`].
    fn table_rule(&self, table: &str) -> Result<&TableRule, RouteError> {
        self.rule.table_rule(table).ok_or_else(|| RouteError::MissingTableRule(table.to_string()))
    }
}

impl SqlRouter for ShardingSqlRouter {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn create_route_context(
        &self,
        query: &QueryContext,
        topology: &Topology,
    ) -> Result<RouteContext, RouteError> {
        self.route(query, topology)
    }

    fn decorate_route_context(
        &self,
        route: &mut RouteContext,
        query: &QueryContext,
        topology: &Topology,
    ) -> Result<(), RouteError> {
        if route.is_empty() {
            *route = self.route(query, topology)?;
        }
        Ok(())
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Builds a route unit whose logical and actual data source coincide.
fn unit_for(data_source: &str, mappers: Vec<RouteMapper>) -> RouteUnit {
    RouteUnit::new(RouteMapper::new(data_source, data_source), mappers)
}

/// Joins independently routed table groups per data source.
///
/// A data source survives only when every group routed to it; its mappings
/// are the Cartesian product of each group's mappings there.
fn cartesian(groups: &[Vec<RoutedPiece>]) -> Vec<RoutedPiece> {
    let Some((first, rest)) = groups.split_first() else {
        return Vec::new();
    };
    let mut combined: Vec<RoutedPiece> = first.clone();
    for group in rest {
        let mut next: Vec<RoutedPiece> = Vec::new();
        for (data_source, mappers) in &combined {
            for (other_source, other_mappers) in group {
                if other_source == data_source {
                    let mut joined = mappers.clone();
                    joined.extend(other_mappers.iter().cloned());
                    next.push((data_source.clone(), joined));
                }
            }
        }
        combined = next;
    }
    combined
}
