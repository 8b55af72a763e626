// crates/shardline-core/src/runtime/prepare.rs
// ============================================================================
// Module: Execution Prepare Engine
// Description: Groups execution units per storage unit under a connection budget.
// Purpose: Bind every group to exactly one connection before execution.
// Dependencies: crate::{core, interfaces}
// ============================================================================

//! ## Overview
//! Units are grouped by storage unit, keeping arrival order inside each
//! storage unit and first-seen order across them. A storage unit with `n`
//! units and a budget of `b` connections per query:
//! - uses `MemoryStrictly` (one connection, units pipelined) when `n <= b`,
//!   otherwise `ConnectionStrictly`;
//! - is split into `ceil(n / b)` groups whose sizes differ by at most one,
//!   so no group holds more than `b` units.
//!
//! Each group owns one connection. Decorators then see the full group list
//! in registration order.

// ============================================================================
// SECTION: Imports
// ============================================================================

use crate::core::ConnectionMode;
use crate::core::DriverExecutionUnit;
use crate::core::ExecutionError;
use crate::core::ExecutionGroup;
use crate::core::ExecutionGroupContext;
use crate::core::ExecutionGroupReportContext;
use crate::core::ExecutionUnit;
use crate::core::RouteContext;
use crate::interfaces::ConnectionProvider;
use crate::interfaces::ExecutionPrepareDecorator;

/// Decorator over driver execution units for connection type `C`.
pub type DriverDecorator<'a, C> = &'a dyn ExecutionPrepareDecorator<DriverExecutionUnit<C>>;

// ============================================================================
// SECTION: Partitioning
// ============================================================================

/// Connection mode for `unit_count` units under `budget`.
#[must_use]
pub const fn connection_mode(unit_count: usize, budget: usize) -> ConnectionMode {
    if unit_count <= budget { ConnectionMode::MemoryStrictly } else { ConnectionMode::ConnectionStrictly }
}

/// Splits `items` into `ceil(len / budget)` near-equal groups.
///
/// A zero budget is treated as one. Earlier groups take the remainder, so
/// 10 items under a budget of 3 split as `[3, 3, 2, 2]`. The budget bounds
/// the group size, so a data source may hold more than `budget` connections.
#[must_use]
pub fn partition<T>(items: Vec<T>, budget: usize) -> Vec<Vec<T>> {
    let budget = budget.max(1);
    let total = items.len();
    if total == 0 {
        return Vec::new();
    }
    let group_count = total.div_ceil(budget);
    let base = total / group_count;
    let remainder = total % group_count;
    let mut groups: Vec<Vec<T>> = Vec::with_capacity(group_count);
    let mut items = items.into_iter();
    for index in 0 .. group_count {
        let size = base + usize::from(index < remainder);
        groups.push(items.by_ref().take(size).collect());
    }
    groups
}

/// Groups units by storage unit in first-seen order.
fn group_by_data_source(units: Vec<ExecutionUnit>) -> Vec<(String, Vec<ExecutionUnit>)> {
    let mut groups: Vec<(String, Vec<ExecutionUnit>)> = Vec::new();
    for unit in units {
        match groups.iter_mut().find(|(name, _)| *name == unit.data_source) {
            Some((_, members)) => members.push(unit),
            None => groups.push((unit.data_source.clone(), vec![unit])),
        }
    }
    groups
}

// ============================================================================
// SECTION: Engine
// ============================================================================

/// Prepare engine for driver execution.
pub struct ExecutionPrepareEngine<'a, P: ConnectionProvider> {
    /// Connections allowed per storage unit per query.
    max_connections_size_per_query: usize,
    /// Connection source.
    provider: &'a P,
    /// Decorators in registration order.
    decorators: Vec<DriverDecorator<'a, P::Connection>>,
}

impl<'a, P: ConnectionProvider> ExecutionPrepareEngine<'a, P> {
    /// Creates an engine; a zero budget is treated as one.
    #[must_use]
    pub fn new(max_connections_size_per_query: usize, provider: &'a P) -> Self {
        Self {
            max_connections_size_per_query: max_connections_size_per_query.max(1),
            provider,
            decorators: Vec::new(),
        }
    }

    /// Adds a decorator.
    #[must_use]
    pub fn with_decorator(mut self, decorator: DriverDecorator<'a, P::Connection>) -> Self {
        self.decorators.push(decorator);
        self
    }

    /// Builds the group context for `units`.
    ///
    /// # Errors
    /// Returns [`ExecutionError::Connection`] when the provider fails or
    /// returns fewer connections than groups, or any decorator failure.
    pub fn prepare(
        &self,
        route: &RouteContext,
        units: Vec<ExecutionUnit>,
        report: ExecutionGroupReportContext,
    ) -> Result<ExecutionGroupContext<DriverExecutionUnit<P::Connection>>, ExecutionError> {
        let budget = self.max_connections_size_per_query;
        let mut groups: Vec<ExecutionGroup<DriverExecutionUnit<P::Connection>>> = Vec::new();
        for (data_source, members) in group_by_data_source(units) {
            let mode = connection_mode(members.len(), budget);
            let partitions = partition(members, budget);
            let connections = self.provider.get_connections(&data_source, partitions.len(), mode)?;
            if connections.len() < partitions.len() {
                return Err(ExecutionError::Connection(format!(
                    "`{data_source}` supplied {} of {} connections",
                    connections.len(),
                    partitions.len()
                )));
            }
            for (partition, connection) in partitions.into_iter().zip(connections) {
                groups.push(group_with_connection(partition, connection, mode));
            }
        }
        for decorator in &self.decorators {
            groups = decorator.decorate(route, groups)?;
        }
        Ok(ExecutionGroupContext {
            groups,
            report,
        })
    }
}

/// Binds every unit of one partition to its connection.
///
/// Units of a group run sequentially on the group's connection; the handle
/// is shared by cloning.
fn group_with_connection<C: Clone>(
    units: Vec<ExecutionUnit>,
    connection: C,
    mode: ConnectionMode,
) -> ExecutionGroup<DriverExecutionUnit<C>> {
    ExecutionGroup::new(
        units
            .into_iter()
            .map(|execution_unit| DriverExecutionUnit {
                execution_unit,
                connection_mode: mode,
                connection: connection.clone(),
            })
            .collect(),
    )
}
