// crates/shardline-core/src/runtime/executor.rs
// ============================================================================
// Module: Executor Engine
// Description: Runs execution groups serially or on a shared worker pool.
// Purpose: Execute groups concurrently while returning results in group order.
// Dependencies: crate::{core, interfaces}, rayon
// ============================================================================

//! ## Overview
//! - Serial mode runs every group on the caller's thread in order; the first
//!   failure aborts the rest.
//! - Parallel mode submits groups `1..n` to the pool first, then runs group
//!   `0` on the caller's thread (with the dedicated first callback when one
//!   is supplied), then waits for each submitted group in submission order.
//!
//! Result position `i` always belongs to group `i`. The first failing group
//! in submission order decides the error: statement failures surface
//! unchanged, anything else is reported as an unknown execution error. A
//! group whose result can no longer be received is recorded as interrupted
//! and skipped.
//!
//! ### Invariants
//! - Empty input never touches the pool.
//! - Worker panics are caught and reported as [`ExecutionError::Unknown`].

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::num::NonZeroUsize;
use std::panic;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::sync::mpsc;
use std::thread;

use rayon::ThreadPool;
use rayon::ThreadPoolBuilder;

use crate::core::ExecutionError;
use crate::core::ExecutionGroup;
use crate::core::ExecutionGroupContext;
use crate::core::KernelEvent;
use crate::interfaces::ExecutorCallback;
use crate::interfaces::KernelEventSink;

/// Result of one group.
type GroupOutcome<O> = Result<Vec<O>, ExecutionError>;

// ============================================================================
// SECTION: Engine
// ============================================================================

/// Executor over a fixed-size worker pool shared by all statements.
pub struct ExecutorEngine {
    /// Worker pool.
    pool: ThreadPool,
    /// Event destination.
    sink: Arc<dyn KernelEventSink>,
}

impl ExecutorEngine {
    /// Creates an engine with `size` workers; zero means available parallelism.
    ///
    /// # Errors
    /// Returns [`ExecutionError::PoolInitialization`] when the pool cannot start.
    pub fn new(size: usize, sink: Arc<dyn KernelEventSink>) -> Result<Self, ExecutionError> {
        let threads = if size == 0 {
            thread::available_parallelism().map_or(1, NonZeroUsize::get)
        } else {
            size
        };
        let pool = ThreadPoolBuilder::new()
            .num_threads(threads)
            .thread_name(|index| format!("shardline-executor-{index}"))
            .build()
            .map_err(|err| ExecutionError::PoolInitialization(err.to_string()))?;
        Ok(Self {
            pool,
            sink,
        })
    }

    /// Worker count.
    #[must_use]
    pub fn size(&self) -> usize {
        self.pool.current_num_threads()
    }

    /// Executes every group of `context`.
    ///
    /// `first` runs group `0` when supplied; `callback` runs every other group.
    ///
    /// # Errors
    /// Returns the first [`ExecutionError`] in group order.
    pub fn execute<I, O>(
        &self,
        context: ExecutionGroupContext<I>,
        first: Option<Arc<dyn ExecutorCallback<I, O>>>,
        callback: Arc<dyn ExecutorCallback<I, O>>,
        serial: bool,
    ) -> Result<Vec<O>, ExecutionError>
    where
        I: Send + 'static,
        O: Send + 'static,
    {
        let process_id = context.report.process_id.to_string();
        let outcome = if serial {
            Self::execute_serially(context.groups, first, &callback)
        } else {
            self.execute_in_parallel(context.groups, first, &callback, &process_id)
        };
        if let Err(err) = &outcome {
            self.sink.record(&KernelEvent::ExecutionFailed {
                process_id,
                error: err.to_string(),
            });
        }
        outcome
    }

    /// Every group on the caller's thread.
    fn execute_serially<I, O>(
        groups: Vec<ExecutionGroup<I>>,
        first: Option<Arc<dyn ExecutorCallback<I, O>>>,
        callback: &Arc<dyn ExecutorCallback<I, O>>,
    ) -> GroupOutcome<O> {
        let mut groups = groups.into_iter();
        let Some(first_group) = groups.next() else {
            return Ok(Vec::new());
        };
        let first = first.unwrap_or_else(|| Arc::clone(callback));
        let mut results = run_guarded(first.as_ref(), first_group, true)?;
        for group in groups {
            results.extend(run_guarded(callback.as_ref(), group, true)?);
        }
        Ok(results)
    }

    /// Group `0` inline, the rest on the pool.
    fn execute_in_parallel<I, O>(
        &self,
        groups: Vec<ExecutionGroup<I>>,
        first: Option<Arc<dyn ExecutorCallback<I, O>>>,
        callback: &Arc<dyn ExecutorCallback<I, O>>,
        process_id: &str,
    ) -> GroupOutcome<O>
    where
        I: Send + 'static,
        O: Send + 'static,
    {
        let mut groups = groups.into_iter();
        let Some(first_group) = groups.next() else {
            return Ok(Vec::new());
        };
        let pending: Vec<mpsc::Receiver<GroupOutcome<O>>> =
            groups.map(|group| self.submit(Arc::clone(callback), group)).collect();

        let first = first.unwrap_or_else(|| Arc::clone(callback));
        let results = run_guarded(first.as_ref(), first_group, true)?;
        self.collect(results, pending, process_id)
    }

    /// Appends each submitted group's outputs in submission order.
    ///
    /// A disconnected channel means the worker went away without reporting
    /// (the job was dropped or unwound past [`run_guarded`]); that group is
    /// recorded as interrupted and skipped.
    fn collect<O>(
        &self,
        mut results: Vec<O>,
        pending: Vec<mpsc::Receiver<GroupOutcome<O>>>,
        process_id: &str,
    ) -> GroupOutcome<O> {
        for (offset, receiver) in pending.into_iter().enumerate() {
            match receiver.recv() {
                Ok(Ok(outputs)) => results.extend(outputs),
                Ok(Err(err)) => return Err(surface(err)),
                Err(_) => self.sink.record(&KernelEvent::ExecutionInterrupted {
                    process_id: process_id.to_string(),
                    group_index: offset + 1,
                }),
            }
        }
        Ok(results)
    }

    /// Submits one group; its outcome arrives on the returned channel.
    fn submit<I, O>(
        &self,
        callback: Arc<dyn ExecutorCallback<I, O>>,
        group: ExecutionGroup<I>,
    ) -> mpsc::Receiver<GroupOutcome<O>>
    where
        I: Send + 'static,
        O: Send + 'static,
    {
        let (sender, receiver) = mpsc::sync_channel(1);
        self.pool.spawn(move || {
            let outcome = run_guarded(callback.as_ref(), group, false);
            // The caller stops listening after an earlier group fails.
            let _ = sender.send(outcome);
        });
        receiver
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Runs one group, converting a panic into an unknown execution error.
fn run_guarded<I, O>(
    callback: &dyn ExecutorCallback<I, O>,
    group: ExecutionGroup<I>,
    is_trunk_thread: bool,
) -> GroupOutcome<O> {
    panic::catch_unwind(AssertUnwindSafe(|| callback.execute(group.inputs, is_trunk_thread)))
        .unwrap_or_else(|_| Err(ExecutionError::Unknown("execution group panicked".to_string())))
}

/// Keeps statement and unknown errors; wraps anything else as unknown.
fn surface(err: ExecutionError) -> ExecutionError {
    match err {
        ExecutionError::Statement {
            ..
        }
        | ExecutionError::Unknown(_) => err,
        other => ExecutionError::Unknown(other.to_string()),
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================
