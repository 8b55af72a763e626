// crates/shardline-core/src/runtime/route/readwrite.rs
// ============================================================================
// Module: Readwrite Splitting Router
// Description: Maps logical readwrite groups to write or read storage units.
// Purpose: Send writes to the primary and spread reads over replicas.
// Dependencies: crate::{core, interfaces}, serde
// ============================================================================

//! ## Overview
//! A readwrite group is a logical data source backed by one write storage
//! unit and zero or more read storage units. Writes, locked reads, and
//! statements hinted `write_route_only` go to the write unit. Other reads go
//! to a read unit picked by the group's load balancer, or to the write unit
//! when the group has no readers.
//!
//! As a decorating router it only rewrites the actual data source of units
//! whose logical data source is a group; it never adds or drops units.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering;

use serde::Deserialize;
use serde::Serialize;

use crate::core::QueryContext;
use crate::core::RouteContext;
use crate::core::RouteError;
use crate::core::RouteMapper;
use crate::core::RouteUnit;
use crate::core::StatementKind;
use crate::core::Topology;
use crate::interfaces::SqlRouter;

// ============================================================================
// SECTION: Rule
// ============================================================================

/// Read unit selection policy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LoadBalancer {
    /// Always the first read unit.
    #[default]
    First,
    /// Cycle through read units.
    RoundRobin,
}

/// One logical readwrite group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReadwriteSplittingGroup {
    /// Logical data source name.
    pub name: String,
    /// Write storage unit.
    pub write_storage_unit: String,
    /// Read storage units.
    pub read_storage_units: Vec<String>,
    /// Read selection policy.
    #[serde(default)]
    pub load_balancer: LoadBalancer,
}

/// Readwrite groups plus per-group round-robin counters.
#[derive(Debug, Default)]
pub struct ReadwriteSplittingRule {
    /// Groups keyed by lower-cased name.
    groups: BTreeMap<String, ReadwriteSplittingGroup>,
    /// Round-robin positions keyed like `groups`.
    counters: BTreeMap<String, AtomicUsize>,
}

impl ReadwriteSplittingRule {
    /// Creates a rule from `groups`.
    #[must_use]
    pub fn new(groups: Vec<ReadwriteSplittingGroup>) -> Self {
        let mut rule = Self::default();
        for group in groups {
            let key = group.name.to_lowercase();
            rule.counters.insert(key.clone(), AtomicUsize::new(0));
            rule.groups.insert(key, group);
        }
        rule
    }

    /// Group named `name`.
    #[must_use]
    pub fn group(&self, name: &str) -> Option<&ReadwriteSplittingGroup> {
        self.groups.get(&name.to_lowercase())
    }

    /// Group names.
    #[must_use]
    pub fn group_names(&self) -> Vec<&str> {
        self.groups.values().map(|group| group.name.as_str()).collect()
    }

    /// Picks the storage unit for `group`.
    #[must_use]
    pub fn route_to(&self, group: &ReadwriteSplittingGroup, write: bool) -> String {
        if write || group.read_storage_units.is_empty() {
            return group.write_storage_unit.clone();
        }
        let index = match group.load_balancer {
            LoadBalancer::First => 0,
            LoadBalancer::RoundRobin => self
                .counters
                .get(&group.name.to_lowercase())
                .map_or(0, |counter| counter.fetch_add(1, Ordering::Relaxed)),
        };
        group.read_storage_units[index % group.read_storage_units.len()].clone()
    }
}

// ============================================================================
// SECTION: Router
// ============================================================================

/// Router for the readwrite splitting rule.
#[derive(Debug, Clone)]
pub struct ReadwriteSplittingRouter {
    /// Readwrite rule.
    rule: Arc<ReadwriteSplittingRule>,
}

impl ReadwriteSplittingRouter {
    /// Router name.
    pub const NAME: &'static str = "readwrite_splitting";

    /// Creates a router.
    #[must_use]
    pub const fn new(rule: Arc<ReadwriteSplittingRule>) -> Self {
        Self {
            rule,
        }
    }
}

/// Returns true when `query` must reach the write unit.
fn is_write(query: &QueryContext) -> bool {
    query.hint.write_route_only
        || query.statement.kind != StatementKind::Select
        || query.statement.features.lock
}

impl SqlRouter for ReadwriteSplittingRouter {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn create_route_context(
        &self,
        query: &QueryContext,
        _topology: &Topology,
    ) -> Result<RouteContext, RouteError> {
        let mut route = RouteContext::new();
        if let [group] = self.rule.groups.values().collect::<Vec<_>>().as_slice() {
            let actual = self.rule.route_to(group, is_write(query));
            route.add_route_unit(RouteUnit::new(RouteMapper::new(group.name.clone(), actual), Vec::new()));
        }
        Ok(route)
    }

    fn decorate_route_context(
        &self,
        route: &mut RouteContext,
        query: &QueryContext,
        topology: &Topology,
    ) -> Result<(), RouteError> {
        if route.is_empty() {
            *route = self.create_route_context(query, topology)?;
            return Ok(());
        }
        let write = is_write(query);
        for unit in route.route_units_mut().iter_mut() {
            if let Some(group) = self.rule.group(&unit.data_source_mapper.logic_name) {
                unit.data_source_mapper.actual_name = self.rule.route_to(group, write);
            }
        }
        route.dedup();
        Ok(())
    }
}
