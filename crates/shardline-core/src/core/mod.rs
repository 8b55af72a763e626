// crates/shardline-core/src/core/mod.rs
// ============================================================================
// Module: Shardline Core Types
// Description: Data model shared by routing, rewriting, and execution.
// Purpose: Provide stable, serializable types for one statement's journey.
// Dependencies: shardline-expr, serde, thiserror
// ============================================================================

//! ## Overview
//! Everything here is created fresh per incoming statement and discarded when
//! the statement completes. Route contexts and conditions may be reused by
//! the sharding cache across re-executions with new parameters.

// ============================================================================
// SECTION: Submodules
// ============================================================================

pub mod condition;
pub mod error;
pub mod event;
pub mod execution;
pub mod identifiers;
pub mod query;
pub mod rewrite;
pub mod route;
pub mod sharding_value;
pub mod statement;
pub mod token;
pub mod topology;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use condition::ConditionValue;
pub use condition::ShardingCondition;
pub use condition::ShardingConditionValue;
pub use condition::ShardingConditions;
pub use condition::ValueRange;
pub use error::AlgorithmError;
pub use error::ExecutionError;
pub use error::KernelError;
pub use error::RewriteError;
pub use error::RouteError;
pub use error::RuleError;
pub use error::TranslationError;
pub use event::ActualSql;
pub use event::KernelEvent;
pub use execution::ConnectionMode;
pub use execution::DriverExecutionUnit;
pub use execution::ExecutionContext;
pub use execution::ExecutionGroup;
pub use execution::ExecutionGroupContext;
pub use execution::ExecutionGroupReportContext;
pub use execution::ExecutionUnit;
pub use execution::SqlUnit;
pub use identifiers::DatabaseType;
pub use identifiers::ProcessId;
pub use query::HintValueContext;
pub use query::QueryContext;
pub use rewrite::GroupedParameters;
pub use rewrite::ParameterBuilder;
pub use rewrite::RouteSqlRewriteResult;
pub use rewrite::SqlRewriteContext;
pub use rewrite::SqlRewriteUnit;
pub use route::DataNode;
pub use route::RouteContext;
pub use route::RouteMapper;
pub use route::RouteUnit;
pub use sharding_value::ComplexKeysShardingValue;
pub use sharding_value::HintShardingValue;
pub use sharding_value::PreciseShardingValue;
pub use sharding_value::RangeShardingValue;
pub use statement::InsertValues;
pub use statement::Operand;
pub use statement::Predicate;
pub use statement::PredicateCondition;
pub use statement::StatementContext;
pub use statement::StatementFeatures;
pub use statement::StatementKind;
pub use token::ColumnProjection;
pub use token::InsertValueRow;
pub use token::QuoteCharacter;
pub use token::SqlToken;
pub use topology::StorageUnit;
pub use topology::Topology;

/// Comparable sharding key value (shared with the inline expression language).
pub type ShardingValue = shardline_expr::Value;
