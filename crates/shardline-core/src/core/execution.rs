// crates/shardline-core/src/core/execution.rs
// ============================================================================
// Module: Execution Model
// Description: Execution units, groups, and group contexts.
// Purpose: Describe the work handed from preparation to the executor.
// Dependencies: crate::core::{identifiers, query, route, ShardingValue}, serde
// ============================================================================

//! ## Overview
//! An [`ExecutionUnit`] is the atomic piece of work sent to one connection.
//! The prepare engine groups units by storage unit and partitions them into
//! [`ExecutionGroup`]s; one group owns one connection for its lifetime.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;

use crate::core::ShardingValue;
use crate::core::identifiers::ProcessId;
use crate::core::query::QueryContext;
use crate::core::route::RouteContext;
use crate::core::route::RouteMapper;

// ============================================================================
// SECTION: Units
// ============================================================================

/// SQL text and parameters for one execution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SqlUnit {
    /// Actual SQL.
    pub sql: String,
    /// Bound parameters.
    pub params: Vec<ShardingValue>,
    /// Table mappings the SQL was rewritten with.
    pub table_route_mappers: Vec<RouteMapper>,
}

/// One statement bound to one storage unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionUnit {
    /// Storage unit name.
    pub data_source: String,
    /// SQL and parameters.
    pub sql_unit: SqlUnit,
}

impl ExecutionUnit {
    /// Creates an execution unit without table mappers.
    #[must_use]
    pub fn new(data_source: impl Into<String>, sql: impl Into<String>, params: Vec<ShardingValue>) -> Self {
        Self {
            data_source: data_source.into(),
            sql_unit: SqlUnit {
                sql: sql.into(),
                params,
                table_route_mappers: Vec::new(),
            },
        }
    }
}

/// Connection acquisition strategy for a storage unit's units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionMode {
    /// One connection per group; results may be streamed.
    MemoryStrictly,
    /// Several connections; results must be buffered.
    ConnectionStrictly,
}

/// Execution unit bound to an acquired connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DriverExecutionUnit<C> {
    /// Unit to run.
    pub execution_unit: ExecutionUnit,
    /// Mode the connection was acquired under.
    pub connection_mode: ConnectionMode,
    /// Connection handle owned by the group.
    pub connection: C,
}

// ============================================================================
// SECTION: Groups
// ============================================================================

/// Ordered batch of inputs sharing one connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionGroup<T> {
    /// Inputs in arrival order.
    pub inputs: Vec<T>,
}

impl<T> ExecutionGroup<T> {
    /// Creates a group.
    #[must_use]
    pub const fn new(inputs: Vec<T>) -> Self {
        Self {
            inputs,
        }
    }
}

/// Identifies one statement's execution for progress and cancellation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionGroupReportContext {
    /// Process identifier.
    pub process_id: ProcessId,
    /// Logical database name.
    pub database_name: String,
}

/// All groups for one statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionGroupContext<T> {
    /// Groups in submission order.
    pub groups: Vec<ExecutionGroup<T>>,
    /// Report context.
    pub report: ExecutionGroupReportContext,
}

impl<T> ExecutionGroupContext<T> {
    /// Total number of inputs across groups.
    #[must_use]
    pub fn input_count(&self) -> usize {
        self.groups.iter().map(|group| group.inputs.len()).sum()
    }
}

// ============================================================================
// SECTION: Execution Context
// ============================================================================

/// Output of the kernel processor for one statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionContext {
    /// Incoming query.
    pub query: QueryContext,
    /// Units to execute, in route order.
    pub execution_units: Vec<ExecutionUnit>,
    /// Route result.
    pub route_context: RouteContext,
    /// Keys generated for INSERT rows, in row order.
    pub generated_keys: Vec<ShardingValue>,
}
