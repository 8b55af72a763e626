// crates/shardline-core/src/runtime/driver.rs
// ============================================================================
// Module: Driver Executor
// Description: Prepares and executes an execution context against connections.
// Purpose: Tie preparation, execution, and process tracking together per call.
// Dependencies: crate::{core, interfaces, runtime::{executor, prepare, process, rule}}
// ============================================================================

//! ## Overview
//! Each call registers the statement in the [`ProcessRegistry`], prepares
//! groups, runs them, and completes the process even when execution fails.
//! Callbacks are wrapped so every group checks for cancellation before it
//! touches its connection.
//!
//! - `execute_query` returns per-group results in group order.
//! - `execute_update` sums affected rows when a sharding table is involved,
//!   otherwise returns the first count.
//! - `execute` reports whether the first result is a result set.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;

use crate::core::DriverExecutionUnit;
use crate::core::ExecutionContext;
use crate::core::ExecutionError;
use crate::core::ExecutionGroupReportContext;
use crate::core::KernelError;
use crate::core::ProcessId;
use crate::interfaces::ConnectionProvider;
use crate::interfaces::ExecutorCallback;
use crate::runtime::executor::ExecutorEngine;
use crate::runtime::prepare::DriverDecorator;
use crate::runtime::prepare::ExecutionPrepareEngine;
use crate::runtime::process::ProcessRegistry;
use crate::runtime::rule::ShardingRule;

/// Callback over driver units for connection type `C`.
pub type DriverCallback<C, O> = Arc<dyn ExecutorCallback<DriverExecutionUnit<C>, O>>;

// ============================================================================
// SECTION: Cancellation
// ============================================================================

/// Callback wrapper that stops cancelled processes.
struct CancellableCallback<I, O> {
    /// Wrapped callback.
    inner: Arc<dyn ExecutorCallback<I, O>>,
    /// Registry holding the cancellation flag.
    registry: ProcessRegistry,
    /// Process being executed.
    process_id: ProcessId,
}

impl<I, O> ExecutorCallback<I, O> for CancellableCallback<I, O> {
    fn execute(&self, inputs: Vec<I>, is_trunk_thread: bool) -> Result<Vec<O>, ExecutionError> {
        self.registry.check(&self.process_id)?;
        self.inner.execute(inputs, is_trunk_thread)
    }
}

// ============================================================================
// SECTION: Driver Executor
// ============================================================================

/// Executes prepared contexts through a connection provider.
pub struct DriverExecutor<'a, P: ConnectionProvider> {
    /// Worker pool.
    executor: &'a ExecutorEngine,
    /// In-flight statement registry.
    registry: &'a ProcessRegistry,
    /// Connection source.
    provider: &'a P,
    /// Connections allowed per storage unit per query.
    max_connections_size_per_query: usize,
    /// Sharding rule deciding update accumulation.
    rule: Option<&'a ShardingRule>,
    /// Prepare decorators.
    decorators: Vec<DriverDecorator<'a, P::Connection>>,
    /// Run groups on the caller's thread (e.g. inside a transaction).
    serial: bool,
}

impl<'a, P: ConnectionProvider> DriverExecutor<'a, P> {
    /// Creates a driver executor.
    #[must_use]
    pub const fn new(
        executor: &'a ExecutorEngine,
        registry: &'a ProcessRegistry,
        provider: &'a P,
        max_connections_size_per_query: usize,
    ) -> Self {
        Self {
            executor,
            registry,
            provider,
            max_connections_size_per_query,
            rule: None,
            decorators: Vec::new(),
            serial: false,
        }
    }

    /// Sets the sharding rule.
    #[must_use]
    pub const fn with_rule(mut self, rule: &'a ShardingRule) -> Self {
        self.rule = Some(rule);
        self
    }

    /// Adds a prepare decorator.
    #[must_use]
    pub fn with_decorator(mut self, decorator: DriverDecorator<'a, P::Connection>) -> Self {
        self.decorators.push(decorator);
        self
    }

    /// Selects serial execution.
    #[must_use]
    pub const fn with_serial(mut self, serial: bool) -> Self {
        self.serial = serial;
        self
    }

    /// Runs a query and returns per-group results in order.
    ///
    /// # Errors
    /// Returns [`KernelError::Execution`] on preparation or execution failure.
    pub fn execute_query<O: Send + 'static>(
        &self,
        context: &ExecutionContext,
        database: &str,
        callback: DriverCallback<P::Connection, O>,
    ) -> Result<Vec<O>, KernelError> {
        self.run(context, database, callback)
    }

    /// Runs an update and returns the affected row count.
    ///
    /// # Errors
    /// Returns [`KernelError::Execution`] on preparation or execution failure.
    pub fn execute_update(
        &self,
        context: &ExecutionContext,
        database: &str,
        callback: DriverCallback<P::Connection, u64>,
    ) -> Result<u64, KernelError> {
        let results = self.run(context, database, callback)?;
        let accumulate = self.rule.is_some_and(|rule| {
            !rule.sharding_tables(&context.query.statement.tables).is_empty()
        });
        if accumulate {
            return Ok(results.into_iter().fold(0_u64, u64::saturating_add));
        }
        Ok(results.first().copied().unwrap_or(0))
    }

    /// Runs a statement and reports whether the first result is a result set.
    ///
    /// # Errors
    /// Returns [`KernelError::Execution`] on preparation or execution failure.
    pub fn execute(
        &self,
        context: &ExecutionContext,
        database: &str,
        callback: DriverCallback<P::Connection, bool>,
    ) -> Result<bool, KernelError> {
        let results = self.run(context, database, callback)?;
        Ok(results.first().copied().unwrap_or(false))
    }

    /// Registers, prepares, executes, and completes one statement.
    fn run<O: Send + 'static>(
        &self,
        context: &ExecutionContext,
        database: &str,
        callback: DriverCallback<P::Connection, O>,
    ) -> Result<Vec<O>, KernelError> {
        let process_id = self.registry.add(database, &context.query.sql)?;
        let outcome = self.run_registered(context, database, callback, &process_id);
        let completed = self.registry.complete(&process_id);
        let results = outcome?;
        completed?;
        Ok(results)
    }

    /// Body of [`Self::run`] once the process is registered.
    fn run_registered<O: Send + 'static>(
        &self,
        context: &ExecutionContext,
        database: &str,
        callback: DriverCallback<P::Connection, O>,
        process_id: &ProcessId,
    ) -> Result<Vec<O>, ExecutionError> {
        let mut prepare = ExecutionPrepareEngine::new(self.max_connections_size_per_query, self.provider);
        for decorator in &self.decorators {
            prepare = prepare.with_decorator(*decorator);
        }
        let report = ExecutionGroupReportContext {
            process_id: process_id.clone(),
            database_name: database.to_string(),
        };
        let groups = prepare.prepare(&context.route_context, context.execution_units.clone(), report)?;
        let callback: DriverCallback<P::Connection, O> = Arc::new(CancellableCallback {
            inner: callback,
            registry: self.registry.clone(),
            process_id: process_id.clone(),
        });
        self.executor.execute(groups, None, callback, self.serial)
    }
}
