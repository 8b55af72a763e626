// crates/shardline-core/src/core/route.rs
// ============================================================================
// Module: Route Context
// Description: Route units, data nodes, and the per-statement route result.
// Purpose: Record which logical names map to which physical names per target.
// Dependencies: crate::core::ShardingValue, serde
// ============================================================================

//! ## Overview
//! A [`RouteUnit`] pairs one logical data source with its actual storage
//! unit plus the logic-to-actual table mappings that apply there. A
//! [`RouteContext`] is the ordered, deduplicated set of route units for one
//! statement, plus the per-row data nodes an INSERT was routed to (used to
//! align grouped parameters during rewrite).

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use serde::Deserialize;
use serde::Serialize;

use crate::core::ShardingValue;

// ============================================================================
// SECTION: Data Nodes
// ============================================================================

/// One physical table on one storage unit.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DataNode {
    /// Storage unit name.
    pub data_source: String,
    /// Actual table name.
    pub table: String,
}

impl DataNode {
    /// Creates a data node.
    #[must_use]
    pub fn new(data_source: impl Into<String>, table: impl Into<String>) -> Self {
        Self {
            data_source: data_source.into(),
            table: table.into(),
        }
    }

    /// Parses `data_source.table`; `None` without exactly one dot.
    #[must_use]
    pub fn parse(text: &str) -> Option<Self> {
        let (data_source, table) = text.trim().split_once('.')?;
        if data_source.is_empty() || table.is_empty() || table.contains('.') {
            return None;
        }
        Some(Self::new(data_source, table))
    }
}

impl fmt::Display for DataNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.data_source, self.table)
    }
}

// ============================================================================
// SECTION: Route Units
// ============================================================================

/// Logical name paired with its actual name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RouteMapper {
    /// Logical name.
    pub logic_name: String,
    /// Actual name.
    pub actual_name: String,
}

impl RouteMapper {
    /// Creates a mapper.
    #[must_use]
    pub fn new(logic_name: impl Into<String>, actual_name: impl Into<String>) -> Self {
        Self {
            logic_name: logic_name.into(),
            actual_name: actual_name.into(),
        }
    }
}

/// One routed target.
///
/// # Invariants
/// - At most one table mapper per logic table.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RouteUnit {
    /// Data source mapping.
    pub data_source_mapper: RouteMapper,
    /// Table mappings applying on this data source.
    pub table_mappers: Vec<RouteMapper>,
}

impl RouteUnit {
    /// Creates a route unit.
    #[must_use]
    pub const fn new(data_source_mapper: RouteMapper, table_mappers: Vec<RouteMapper>) -> Self {
        Self {
            data_source_mapper,
            table_mappers,
        }
    }

    /// Route unit targeting a whole storage unit with no table mappings.
    #[must_use]
    pub fn data_source_only(name: &str) -> Self {
        Self::new(RouteMapper::new(name, name), Vec::new())
    }

    /// Actual storage unit name.
    #[must_use]
    pub fn data_source_name(&self) -> &str {
        &self.data_source_mapper.actual_name
    }

    /// Finds the mapper whose actual table is `actual_table` when this unit's
    /// logic data source is `logic_data_source` (case-insensitive).
    #[must_use]
    pub fn find_table_mapper(
        &self,
        logic_data_source: &str,
        actual_table: &str,
    ) -> Option<&RouteMapper> {
        if !self.data_source_mapper.logic_name.eq_ignore_ascii_case(logic_data_source) {
            return None;
        }
        self.table_mappers.iter().find(|mapper| mapper.actual_name.eq_ignore_ascii_case(actual_table))
    }

    /// Actual table name for `logic_table`, if mapped.
    #[must_use]
    pub fn actual_table_name(&self, logic_table: &str) -> Option<&str> {
        self.table_mappers
            .iter()
            .find(|mapper| mapper.logic_name.eq_ignore_ascii_case(logic_table))
            .map(|mapper| mapper.actual_name.as_str())
    }
}

// ============================================================================
// SECTION: Route Context
// ============================================================================

/// Result of routing one statement.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RouteContext {
    /// Route units in insertion order, without duplicates.
    route_units: Vec<RouteUnit>,
    /// Data nodes each INSERT row (or condition) was routed to, in order.
    pub original_data_nodes: Vec<Vec<DataNode>>,
    /// Keys generated for INSERT rows that omitted the key column.
    pub generated_keys: Vec<ShardingValue>,
}

impl RouteContext {
    /// Creates an empty context.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            route_units: Vec::new(),
            original_data_nodes: Vec::new(),
            generated_keys: Vec::new(),
        }
    }

    /// Adds a route unit unless an identical one is already present.
    pub fn add_route_unit(&mut self, unit: RouteUnit) {
        if !self.route_units.contains(&unit) {
            self.route_units.push(unit);
        }
    }

    /// Route units in order.
    #[must_use]
    pub fn route_units(&self) -> &[RouteUnit] {
        &self.route_units
    }

    /// Mutable access for decorating routers.
    ///
    /// Decorators must keep the set deduplicated; call [`Self::dedup`] after
    /// renaming units.
    pub fn route_units_mut(&mut self) -> &mut Vec<RouteUnit> {
        &mut self.route_units
    }

    /// Removes duplicates introduced by in-place edits, keeping first occurrences.
    pub fn dedup(&mut self) {
        let units = std::mem::take(&mut self.route_units);
        for unit in units {
            self.add_route_unit(unit);
        }
    }

    /// Returns true when nothing was routed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.route_units.is_empty()
    }

    /// Returns true for exactly one route unit.
    #[must_use]
    pub fn is_single_route_unit(&self) -> bool {
        self.route_units.len() == 1
    }

    /// Distinct actual storage unit names in first-seen order.
    #[must_use]
    pub fn actual_data_source_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = Vec::new();
        for unit in &self.route_units {
            let name = unit.data_source_name();
            if !names.contains(&name) {
                names.push(name);
            }
        }
        names
    }
}
