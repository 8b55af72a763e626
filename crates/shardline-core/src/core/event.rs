// crates/shardline-core/src/core/event.rs
// ============================================================================
// Module: Kernel Events
// Description: Structured events emitted by routing and execution.
// Purpose: Give operators JSON-line visibility without a global logger.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! Events are plain serializable records handed to a
//! [`crate::interfaces::KernelEventSink`]. They never carry parameter values
//! unless SQL display is explicitly enabled.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Serialize;

// ============================================================================
// SECTION: Events
// ============================================================================

/// Actual SQL sent to one storage unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActualSql {
    /// Storage unit name.
    pub data_source: String,
    /// Actual SQL text.
    pub sql: String,
    /// Rendered parameters.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub params: Vec<String>,
}

/// Structured kernel event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum KernelEvent {
    /// A statement was routed.
    RouteCompleted {
        /// Logical database name.
        database: String,
        /// Number of route units.
        route_units: usize,
        /// Distinct storage units touched.
        data_sources: Vec<String>,
    },
    /// SQL display (`sql_show`).
    SqlShow {
        /// Logical SQL.
        logic_sql: String,
        /// Storage units touched; filled in simple mode.
        #[serde(skip_serializing_if = "Vec::is_empty")]
        data_sources: Vec<String>,
        /// Per-unit SQL; filled in full mode.
        #[serde(skip_serializing_if = "Vec::is_empty")]
        actual: Vec<ActualSql>,
    },
    /// Waiting on an asynchronous group was interrupted.
    ExecutionInterrupted {
        /// Process identifier.
        process_id: String,
        /// Index of the group whose result was lost.
        group_index: usize,
    },
    /// Execution failed.
    ExecutionFailed {
        /// Process identifier.
        process_id: String,
        /// Error message.
        error: String,
    },
    /// A process was cancelled.
    ProcessCancelled {
        /// Process identifier.
        process_id: String,
    },
}

impl KernelEvent {
    /// Event name as serialized in the `event` field.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::RouteCompleted {
                ..
            } => "route_completed",
            Self::SqlShow {
                ..
            } => "sql_show",
            Self::ExecutionInterrupted {
                ..
            } => "execution_interrupted",
            Self::ExecutionFailed {
                ..
            } => "execution_failed",
            Self::ProcessCancelled {
                ..
            } => "process_cancelled",
        }
    }
}
