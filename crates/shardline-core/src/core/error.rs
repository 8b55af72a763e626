// crates/shardline-core/src/core/error.rs
// ============================================================================
// Module: Shardline Errors
// Description: Typed failure kinds for algorithms, routing, rewrite, and execution.
// Purpose: Give every pipeline stage a terminal, non-retried error surface.
// Dependencies: shardline-expr, thiserror
// ============================================================================

//! ## Overview
//! Errors are grouped by the pipeline stage that raises them. None of them
//! are retried inside the kernel; retry policy belongs to the caller.
//! [`KernelError`] is the umbrella returned by the kernel processor and
//! driver executor.

// ============================================================================
// SECTION: Imports
// ============================================================================

use shardline_expr::ExprError;
use thiserror::Error;

// ============================================================================
// SECTION: Algorithm Errors
// ============================================================================

/// Configuration errors raised while building algorithms.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AlgorithmError {
    /// Required option missing or invalid.
    #[error("algorithm `{algorithm}` initialization failed: {reason}")]
    Initialization {
        /// Algorithm type tag.
        algorithm: String,
        /// Human-readable failure reason.
        reason: String,
    },
    /// Algorithm type tag is not registered.
    #[error("unknown algorithm type `{0}`")]
    UnknownType(String),
    /// Algorithm type tag is already registered.
    #[error("algorithm type `{0}` is already registered")]
    DuplicateType(String),
}

impl AlgorithmError {
    /// Builds an initialization error.
    #[must_use]
    pub fn init(algorithm: &str, reason: impl Into<String>) -> Self {
        Self::Initialization {
            algorithm: algorithm.to_string(),
            reason: reason.into(),
        }
    }
}

// ============================================================================
// SECTION: Rule Errors
// ============================================================================

/// Errors raised while assembling sharding rules.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RuleError {
    /// Actual data node declaration is malformed.
    #[error("table `{table}` has invalid actual data nodes: {reason}")]
    InvalidDataNodes {
        /// Logic table name.
        table: String,
        /// Human-readable failure reason.
        reason: String,
    },
    /// A binding group or key generator names a table without a rule.
    #[error("table `{0}` has no sharding table rule")]
    UnknownTable(String),
    /// Algorithm could not be built or bound.
    #[error(transparent)]
    Algorithm(#[from] AlgorithmError),
}

// ============================================================================
// SECTION: Route Errors
// ============================================================================

/// Errors raised while extracting conditions or routing a statement.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RouteError {
    /// Hint named a storage unit that does not exist.
    #[error("hint data source `{0}` does not exist")]
    UnknownHintTarget(String),
    /// Complex algorithm saw a different number of columns than configured.
    #[error("sharding columns count {expected} does not match sharding values count {actual}")]
    MismatchedColumnCount {
        /// Configured column count.
        expected: usize,
        /// Column count present in the condition.
        actual: usize,
    },
    /// Sharding key value was null.
    #[error("sharding value for column `{0}` cannot be null")]
    NullShardingValue(String),
    /// Template did not match the supplied columns.
    #[error("inline expression `{expression}` does not match sharding column `{column}`")]
    MismatchedExpression {
        /// Template text.
        expression: String,
        /// Column or columns supplied.
        column: String,
    },
    /// Range condition on an algorithm that disallows it.
    #[error("range query is not supported by `{0}`; enable allow-range-query-with-inline-sharding")]
    UnsupportedRangeQuery(String),
    /// Parameter marker index beyond the bound parameters.
    #[error("parameter index {index} out of range for {count} bound parameters")]
    ParameterIndexOutOfRange {
        /// Zero-based marker index.
        index: usize,
        /// Number of bound parameters.
        count: usize,
    },
    /// Route target is not a known storage unit.
    #[error("storage unit `{0}` is not registered")]
    UnknownStorageUnit(String),
    /// Statement references a table without a sharding rule.
    #[error("no sharding rule for table `{0}`")]
    MissingTableRule(String),
    /// Statement validator rejected the statement.
    #[error("statement validation failed: {0}")]
    Validation(String),
    /// Sharding auditor rejected the statement.
    #[error("sharding audit failed: {0}")]
    Audit(String),
    /// Expression evaluation failed for a reason other than a mismatch.
    #[error("inline expression evaluation failed: {0}")]
    Expression(#[from] ExprError),
    /// Algorithm configuration error surfaced at route time.
    #[error(transparent)]
    Algorithm(#[from] AlgorithmError),
}

// ============================================================================
// SECTION: Rewrite Errors
// ============================================================================

/// Dialect translation failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TranslationError {
    /// Translator cannot express the statement for the target dialect.
    #[error("cannot translate statement to {dialect}: {reason}")]
    Unsupported {
        /// Target dialect name.
        dialect: String,
        /// Human-readable reason.
        reason: String,
    },
}

/// Errors raised while rebuilding SQL for route units.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RewriteError {
    /// Token span lies outside the SQL text or splits a character.
    #[error("sql token [{start}, {stop}] is outside the statement of {len} bytes")]
    TokenOutOfBounds {
        /// Token start offset.
        start: usize,
        /// Token stop offset.
        stop: usize,
        /// SQL length in bytes.
        len: usize,
    },
    /// Two tokens overlap.
    #[error("sql tokens overlap at offset {0}")]
    OverlappingTokens(usize),
    /// Route unit targets an unknown storage unit.
    #[error("storage unit `{0}` is not registered")]
    UnknownStorageUnit(String),
    /// Dialect translation failed.
    #[error(transparent)]
    Translation(#[from] TranslationError),
}

// ============================================================================
// SECTION: Execution Errors
// ============================================================================

/// Errors raised while preparing or executing groups.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExecutionError {
    /// A statement failed on its connection.
    #[error("statement failed on `{data_source}`: {message}")]
    Statement {
        /// Storage unit the statement ran on.
        data_source: String,
        /// Driver-reported message.
        message: String,
    },
    /// A connection could not be acquired.
    #[error("connection error: {0}")]
    Connection(String),
    /// Execution was cancelled through the process registry.
    #[error("process `{0}` was cancelled")]
    Cancelled(String),
    /// Non-statement failure inside an asynchronous group.
    #[error("unknown execution error: {0}")]
    Unknown(String),
    /// Worker pool could not be created.
    #[error("executor pool initialization failed: {0}")]
    PoolInitialization(String),
}

impl ExecutionError {
    /// Returns true for statement-execution failures.
    #[must_use]
    pub const fn is_statement(&self) -> bool {
        matches!(self, Self::Statement { .. })
    }
}

// ============================================================================
// SECTION: Kernel Errors
// ============================================================================

/// Umbrella error for the end-to-end kernel.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum KernelError {
    /// Routing failed.
    #[error(transparent)]
    Route(#[from] RouteError),
    /// Rewrite failed.
    #[error(transparent)]
    Rewrite(#[from] RewriteError),
    /// Execution failed.
    #[error(transparent)]
    Execution(#[from] ExecutionError),
}
