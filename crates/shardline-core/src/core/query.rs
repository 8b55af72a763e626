// crates/shardline-core/src/core/query.rs
// ============================================================================
// Module: Query Context
// Description: Logical SQL, parsed statement, bound parameters, and hints.
// Purpose: Carry everything one incoming statement contributes to routing.
// Dependencies: crate::core::{statement, ShardingValue}, serde
// ============================================================================

//! ## Overview
//! [`QueryContext`] is created per incoming statement by the caller and is
//! never mutated by the kernel. [`HintValueContext`] is the out-of-band hint
//! channel: forced data source, write-only routing, hint sharding values,
//! and auditor opt-outs.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::collections::BTreeSet;

use serde::Deserialize;
use serde::Serialize;

use crate::core::ShardingValue;
use crate::core::statement::StatementContext;

// ============================================================================
// SECTION: Hint Channel
// ============================================================================

/// Per-call routing hints.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HintValueContext {
    /// Storage unit forced for the whole statement.
    pub data_source_name: Option<String>,
    /// Route reads to the write storage unit.
    pub write_route_only: bool,
    /// Database sharding values keyed by lower-case logic table.
    pub database_sharding_values: BTreeMap<String, Vec<ShardingValue>>,
    /// Table sharding values keyed by lower-case logic table.
    pub table_sharding_values: BTreeMap<String, Vec<ShardingValue>>,
    /// Auditor names the caller asked to skip.
    pub disabled_auditor_names: BTreeSet<String>,
}

impl HintValueContext {
    /// Forces every statement to `name`.
    #[must_use]
    pub fn with_data_source(mut self, name: impl Into<String>) -> Self {
        self.data_source_name = Some(name.into());
        self
    }

    /// Routes reads to the write storage unit.
    #[must_use]
    pub const fn with_write_route_only(mut self) -> Self {
        self.write_route_only = true;
        self
    }

    /// Adds a database sharding value for `table`.
    #[must_use]
    pub fn with_database_value(mut self, table: &str, value: impl Into<ShardingValue>) -> Self {
        self.database_sharding_values.entry(table.to_lowercase()).or_default().push(value.into());
        self
    }

    /// Adds a table sharding value for `table`.
    #[must_use]
    pub fn with_table_value(mut self, table: &str, value: impl Into<ShardingValue>) -> Self {
        self.table_sharding_values.entry(table.to_lowercase()).or_default().push(value.into());
        self
    }

    /// Disables the named auditor for this call.
    #[must_use]
    pub fn with_disabled_auditor(mut self, name: impl Into<String>) -> Self {
        self.disabled_auditor_names.insert(name.into());
        self
    }

    /// Returns the forced storage unit, if any.
    #[must_use]
    pub fn hint_data_source_name(&self) -> Option<&str> {
        self.data_source_name.as_deref()
    }

    /// Hint database values for `table`, if any were supplied.
    #[must_use]
    pub fn database_values(&self, table: &str) -> Option<&[ShardingValue]> {
        self.database_sharding_values.get(&table.to_lowercase()).map(Vec::as_slice)
    }

    /// Hint table values for `table`, if any were supplied.
    #[must_use]
    pub fn table_values(&self, table: &str) -> Option<&[ShardingValue]> {
        self.table_sharding_values.get(&table.to_lowercase()).map(Vec::as_slice)
    }

    /// Returns true when any routing hint is present, including
    /// `write_route_only`.
    #[must_use]
    pub fn has_routing_hint(&self) -> bool {
        self.write_route_only
            || self.data_source_name.is_some()
            || !self.database_sharding_values.is_empty()
            || !self.table_sharding_values.is_empty()
    }
}

// ============================================================================
// SECTION: Query Context
// ============================================================================

/// One incoming logical statement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryContext {
    /// Logical SQL text.
    pub sql: String,
    /// Parsed statement.
    pub statement: StatementContext,
    /// Bound parameters in marker order.
    pub params: Vec<ShardingValue>,
    /// Hint channel.
    pub hint: HintValueContext,
}

impl QueryContext {
    /// Creates a query context without hints.
    #[must_use]
    pub fn new(sql: impl Into<String>, statement: StatementContext, params: Vec<ShardingValue>) -> Self {
        Self {
            sql: sql.into(),
            statement,
            params,
            hint: HintValueContext::default(),
        }
    }

    /// Attaches hints.
    #[must_use]
    pub fn with_hint(mut self, hint: HintValueContext) -> Self {
        self.hint = hint;
        self
    }
}
