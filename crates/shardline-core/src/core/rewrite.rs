// crates/shardline-core/src/core/rewrite.rs
// ============================================================================
// Module: Rewrite Model
// Description: Rewrite inputs (tokens, parameter builders) and outputs.
// Purpose: Describe what the rewrite engine consumes and produces.
// Dependencies: crate::core::{route, token, ShardingValue}, serde
// ============================================================================

//! ## Overview
//! A [`SqlRewriteContext`] bundles the logical SQL with its tokens and a
//! [`ParameterBuilder`]. Flat statements use
//! [`ParameterBuilder::Standard`]; batched INSERTs use
//! [`ParameterBuilder::Grouped`] so each route unit receives only the rows
//! routed to it.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;

use crate::core::ShardingValue;
use crate::core::route::RouteUnit;
use crate::core::token::SqlToken;

// ============================================================================
// SECTION: Parameter Builders
// ============================================================================

/// Parameters grouped per INSERT row plus statement-wide parameters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupedParameters {
    /// Parameters of each row, in row order.
    pub groups: Vec<Vec<ShardingValue>>,
    /// Parameters outside the rows (e.g. `ON DUPLICATE KEY UPDATE`).
    pub generic: Vec<ShardingValue>,
}

impl GroupedParameters {
    /// All parameters: every group in order, then generic ones.
    #[must_use]
    pub fn all(&self) -> Vec<ShardingValue> {
        self.groups.iter().flatten().chain(self.generic.iter()).cloned().collect()
    }
}

/// Shape of a statement's parameter list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParameterBuilder {
    /// One flat list shared by every route unit.
    Standard(Vec<ShardingValue>),
    /// Per-row groups aligned with the route context's original data nodes.
    Grouped(GroupedParameters),
}

impl Default for ParameterBuilder {
    fn default() -> Self {
        Self::Standard(Vec::new())
    }
}

// ============================================================================
// SECTION: Rewrite Context
// ============================================================================

/// Logical SQL prepared for rewriting.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SqlRewriteContext {
    /// Logical SQL text.
    pub sql: String,
    /// Tokens over `sql`, in any order.
    pub tokens: Vec<SqlToken>,
    /// Parameter shape.
    pub parameter_builder: ParameterBuilder,
}

impl SqlRewriteContext {
    /// Creates a context with standard parameters.
    #[must_use]
    pub fn new(sql: impl Into<String>, tokens: Vec<SqlToken>, params: Vec<ShardingValue>) -> Self {
        Self {
            sql: sql.into(),
            tokens,
            parameter_builder: ParameterBuilder::Standard(params),
        }
    }

    /// Replaces the parameter builder.
    #[must_use]
    pub fn with_parameter_builder(mut self, parameter_builder: ParameterBuilder) -> Self {
        self.parameter_builder = parameter_builder;
        self
    }
}

// ============================================================================
// SECTION: Rewrite Results
// ============================================================================

/// Final SQL and parameters for one route unit (or aggregated group).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SqlRewriteUnit {
    /// Actual SQL.
    pub sql: String,
    /// Bound parameters.
    pub params: Vec<ShardingValue>,
}

/// Rewrite result keyed by route unit.
///
/// Aggregated groups are keyed by their first route unit.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RouteSqlRewriteResult {
    /// Rewrite units in route order.
    pub units: Vec<(RouteUnit, SqlRewriteUnit)>,
}
