// crates/shardline-core/src/runtime/process.rs
// ============================================================================
// Module: Process Registry
// Description: Tracks in-flight statements and their cancellation flags.
// Purpose: Give operators a handle to list and cancel running statements.
// Dependencies: crate::{core, interfaces}
// ============================================================================

//! ## Overview
//! Every executed statement is registered under a unique [`ProcessId`]
//! before its groups run and completed afterwards. Cancellation only marks
//! the process; execution callbacks poll [`ProcessRegistry::check`] between
//! units and stop with [`ExecutionError::Cancelled`].
//!
//! A poisoned registry lock fails closed: registration errors and every
//! process reads as cancelled.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::AtomicU64;
use std::sync::atomic::Ordering;

use serde::Serialize;

use crate::core::ExecutionError;
use crate::core::KernelEvent;
use crate::core::ProcessId;
use crate::interfaces::KernelEventSink;

// ============================================================================
// SECTION: Process Records
// ============================================================================

/// Snapshot of one registered statement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProcessSnapshot {
    /// Process identifier.
    pub id: ProcessId,
    /// Logical database.
    pub database: String,
    /// Logical SQL.
    pub sql: String,
    /// Cancellation flag.
    pub cancelled: bool,
}

// ============================================================================
// SECTION: Registry
// ============================================================================

/// Registry of in-flight statements.
///
/// # Invariants
/// - Process ids are unique for the lifetime of the registry.
#[derive(Clone)]
pub struct ProcessRegistry {
    /// Registered processes keyed by id.
    processes: Arc<Mutex<BTreeMap<ProcessId, ProcessSnapshot>>>,
    /// Next sequence number.
    sequence: Arc<AtomicU64>,
    /// Event destination.
    sink: Arc<dyn KernelEventSink>,
}

impl ProcessRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new(sink: Arc<dyn KernelEventSink>) -> Self {
        Self {
            processes: Arc::new(Mutex::new(BTreeMap::new())),
            sequence: Arc::new(AtomicU64::new(1)),
            sink,
        }
    }

    /// Registers a statement and returns its id.
    ///
    /// # Errors
    /// Returns [`ExecutionError::Unknown`] when the registry lock is poisoned.
    pub fn add(&self, database: &str, sql: &str) -> Result<ProcessId, ExecutionError> {
        let id = ProcessId::new(format!("process-{}", self.sequence.fetch_add(1, Ordering::Relaxed)));
        let mut processes = self.lock()?;
        processes.insert(
            id.clone(),
            ProcessSnapshot {
                id: id.clone(),
                database: database.to_string(),
                sql: sql.to_string(),
                cancelled: false,
            },
        );
        Ok(id)
    }

    /// Marks `id` cancelled; returns false when it is not registered.
    ///
    /// # Errors
    /// Returns [`ExecutionError::Unknown`] when the registry lock is poisoned.
    pub fn cancel(&self, id: &ProcessId) -> Result<bool, ExecutionError> {
        let found = {
            let mut processes = self.lock()?;
            processes.get_mut(id).map(|process| process.cancelled = true).is_some()
        };
        if found {
            self.sink.record(&KernelEvent::ProcessCancelled {
                process_id: id.to_string(),
            });
        }
        Ok(found)
    }

    /// Returns true when `id` was cancelled.
    #[must_use]
    pub fn is_cancelled(&self, id: &ProcessId) -> bool {
        self.processes
            .lock()
            .map_or(true, |processes| processes.get(id).is_some_and(|process| process.cancelled))
    }

    /// Fails with [`ExecutionError::Cancelled`] once `id` is cancelled.
    ///
    /// # Errors
    /// Returns [`ExecutionError::Cancelled`] for cancelled processes.
    pub fn check(&self, id: &ProcessId) -> Result<(), ExecutionError> {
        if self.is_cancelled(id) {
            return Err(ExecutionError::Cancelled(id.to_string()));
        }
        Ok(())
    }

    /// Removes `id`.
    ///
    /// # Errors
    /// Returns [`ExecutionError::Unknown`] when the registry lock is poisoned.
    pub fn complete(&self, id: &ProcessId) -> Result<(), ExecutionError> {
        self.lock()?.remove(id);
        Ok(())
    }

    /// Registered processes in id order.
    ///
    /// # Errors
    /// Returns [`ExecutionError::Unknown`] when the registry lock is poisoned.
    pub fn list(&self) -> Result<Vec<ProcessSnapshot>, ExecutionError> {
        Ok(self.lock()?.values().cloned().collect())
    }

    /// Locks the process map.
    fn lock(
        &self,
    ) -> Result<std::sync::MutexGuard<'_, BTreeMap<ProcessId, ProcessSnapshot>>, ExecutionError> {
        self.processes
            .lock()
            .map_err(|_| ExecutionError::Unknown("process registry lock poisoned".to_string()))
    }
}
