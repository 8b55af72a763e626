// crates/shardline-core/src/interfaces/mod.rs
// ============================================================================
// Module: Shardline Interfaces
// Description: Extension points for algorithms, routers, translators, and execution.
// Purpose: Define the contract surfaces the runtime pipeline is assembled from.
// Dependencies: crate::core
// ============================================================================

//! ## Overview
//! The runtime never discovers implementations on its own. Rules and engines
//! are assembled from these traits by the caller (usually from configuration)
//! and passed in by reference. Implementations must be deterministic for the
//! same inputs and must fail closed.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use crate::core::ComplexKeysShardingValue;
use crate::core::ConnectionMode;
use crate::core::DatabaseType;
use crate::core::ExecutionError;
use crate::core::ExecutionGroup;
use crate::core::HintShardingValue;
use crate::core::KernelEvent;
use crate::core::PreciseShardingValue;
use crate::core::QueryContext;
use crate::core::RangeShardingValue;
use crate::core::RouteContext;
use crate::core::RouteError;
use crate::core::ShardingConditions;
use crate::core::ShardingValue;
use crate::core::SqlRewriteUnit;
use crate::core::Topology;
use crate::core::TranslationError;

// ============================================================================
// SECTION: Sharding Algorithms
// ============================================================================

/// Single-column algorithm handling precise values and ranges.
pub trait StandardShardingAlgorithm: Send + Sync {
    /// Computes the target for one key value.
    ///
    /// `None` means no target matched. The result may name a target outside
    /// `available`; strategies filter it.
    ///
    /// # Errors
    /// Returns [`RouteError`] for null keys or template mismatches.
    fn do_sharding_precise(
        &self,
        available: &[String],
        value: &PreciseShardingValue,
    ) -> Result<Option<String>, RouteError>;

    /// Computes the targets for a key range.
    ///
    /// # Errors
    /// Returns [`RouteError::UnsupportedRangeQuery`] when ranges are disabled.
    fn do_sharding_range(
        &self,
        available: &[String],
        value: &RangeShardingValue,
    ) -> Result<Vec<String>, RouteError>;
}

/// Multi-column algorithm.
pub trait ComplexKeysShardingAlgorithm: Send + Sync {
    /// Computes the targets for several columns at once.
    ///
    /// # Errors
    /// Returns [`RouteError`] on column-count mismatch, disabled ranges, or
    /// evaluation failure.
    fn do_sharding(
        &self,
        available: &[String],
        value: &ComplexKeysShardingValue,
    ) -> Result<Vec<String>, RouteError>;
}

/// Algorithm driven by hint values instead of columns.
pub trait HintShardingAlgorithm: Send + Sync {
    /// Computes the targets for hint values.
    ///
    /// # Errors
    /// Returns [`RouteError`] when a value cannot be evaluated.
    fn do_sharding(
        &self,
        available: &[String],
        value: &HintShardingValue,
    ) -> Result<Vec<String>, RouteError>;
}

/// Generates keys for INSERT rows that omit the key column.
pub trait KeyGenerateAlgorithm: Send + Sync {
    /// Returns the next key.
    fn generate_key(&self) -> ShardingValue;
}

impl fmt::Debug for dyn KeyGenerateAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("KeyGenerateAlgorithm")
    }
}

// ============================================================================
// SECTION: Routing Hooks
// ============================================================================

/// Checks a statement before it is routed.
pub trait ShardingAuditAlgorithm: Send + Sync {
    /// Rejects statements that violate the audit policy.
    ///
    /// # Errors
    /// Returns [`RouteError::Audit`] when the statement is rejected.
    fn check(
        &self,
        query: &QueryContext,
        conditions: &ShardingConditions,
        sharding_tables: &[String],
    ) -> Result<(), RouteError>;
}

impl fmt::Debug for dyn ShardingAuditAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ShardingAuditAlgorithm")
    }
}

/// Pre- and post-route statement validation.
pub trait StatementValidator: Send + Sync {
    /// Runs before routing.
    ///
    /// # Errors
    /// Returns [`RouteError::Validation`] when the statement is unsupported.
    fn pre_validate(
        &self,
        _query: &QueryContext,
        _conditions: &ShardingConditions,
    ) -> Result<(), RouteError> {
        Ok(())
    }

    /// Runs after routing.
    ///
    /// # Errors
    /// Returns [`RouteError::Validation`] when the route is not allowed.
    fn post_validate(&self, _query: &QueryContext, _route: &RouteContext) -> Result<(), RouteError> {
        Ok(())
    }
}

/// One rule's router.
///
/// The first router in the chain creates the route context; later routers
/// decorate it. Decorating routers must not drop route units.
pub trait SqlRouter: Send + Sync {
    /// Router name for diagnostics.
    fn name(&self) -> &'static str;

    /// Builds the initial route context.
    ///
    /// # Errors
    /// Returns [`RouteError`] when routing fails.
    fn create_route_context(
        &self,
        query: &QueryContext,
        topology: &Topology,
    ) -> Result<RouteContext, RouteError>;

    /// Decorates an existing route context.
    ///
    /// # Errors
    /// Returns [`RouteError`] when decoration fails.
    fn decorate_route_context(
        &self,
        route: &mut RouteContext,
        query: &QueryContext,
        topology: &Topology,
    ) -> Result<(), RouteError>;
}

// ============================================================================
// SECTION: Rewrite Hooks
// ============================================================================

/// Dialect translator applied to every rewrite unit.
pub trait SqlTranslator: Send + Sync {
    /// Translates `unit` for the `target` dialect.
    ///
    /// # Errors
    /// Returns [`TranslationError`] when the statement cannot be expressed.
    fn translate(
        &self,
        unit: SqlRewriteUnit,
        query: &QueryContext,
        target: DatabaseType,
    ) -> Result<SqlRewriteUnit, TranslationError>;
}

// ============================================================================
// SECTION: Execution Hooks
// ============================================================================

/// Supplies connections to the prepare engine.
pub trait ConnectionProvider {
    /// Connection handle type; clones share one underlying connection.
    type Connection: Clone + Send + 'static;

    /// Acquires `count` connections to `data_source`.
    ///
    /// # Errors
    /// Returns [`ExecutionError::Connection`] when connections are unavailable.
    fn get_connections(
        &self,
        data_source: &str,
        count: usize,
        mode: ConnectionMode,
    ) -> Result<Vec<Self::Connection>, ExecutionError>;
}

/// Rule-specific decoration of prepared execution groups.
pub trait ExecutionPrepareDecorator<T> {
    /// Decorates the full group collection.
    ///
    /// # Errors
    /// Returns [`ExecutionError`] when decoration fails.
    fn decorate(
        &self,
        route: &RouteContext,
        groups: Vec<ExecutionGroup<T>>,
    ) -> Result<Vec<ExecutionGroup<T>>, ExecutionError>;
}

/// Work performed for one execution group.
pub trait ExecutorCallback<I, O>: Send + Sync {
    /// Executes every input of one group.
    ///
    /// `is_trunk_thread` is true when running on the caller's thread.
    ///
    /// # Errors
    /// Returns [`ExecutionError`] when execution fails.
    fn execute(&self, inputs: Vec<I>, is_trunk_thread: bool) -> Result<Vec<O>, ExecutionError>;
}

impl<I, O, F> ExecutorCallback<I, O> for F
where
    F: Fn(Vec<I>, bool) -> Result<Vec<O>, ExecutionError> + Send + Sync,
{
    fn execute(&self, inputs: Vec<I>, is_trunk_thread: bool) -> Result<Vec<O>, ExecutionError> {
        self(inputs, is_trunk_thread)
    }
}

// ============================================================================
// SECTION: Event Sink
// ============================================================================

/// Destination for structured kernel events.
pub trait KernelEventSink: Send + Sync {
    /// Records an event.
    fn record(&self, event: &KernelEvent);
}
