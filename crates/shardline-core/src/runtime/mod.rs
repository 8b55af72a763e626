// crates/shardline-core/src/runtime/mod.rs
// ============================================================================
// Module: Shardline Runtime
// Description: Routing, rewriting, preparation, and execution engines.
// Purpose: Implement the statement pipeline over the core model.
// Dependencies: crate::{core, interfaces}, rayon, shardline-expr
// ============================================================================

//! ## Overview
//! A statement flows through [`SqlRouteEngine`], [`SqlRewriteEngine`],
//! [`ExecutionPrepareEngine`], and [`ExecutorEngine`]. [`KernelProcessor`]
//! runs the first two stages; [`DriverExecutor`] runs the last two and
//! tracks the statement in a [`ProcessRegistry`].

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod algorithm;
pub mod condition;
pub mod driver;
pub mod executor;
pub mod kernel;
pub mod prepare;
pub mod process;
pub mod rewrite;
pub mod route;
pub mod rule;
pub mod sink;
pub mod strategy;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use algorithm::AlgorithmConfig;
pub use algorithm::AlgorithmRegistry;
pub use algorithm::ShardingAlgorithm;
pub use condition::ExtractedConditions;
pub use condition::ShardingConditionEngine;
pub use driver::DriverCallback;
pub use driver::DriverExecutor;
pub use executor::ExecutorEngine;
pub use kernel::KernelProcessor;
pub use kernel::KernelProps;
pub use prepare::ExecutionPrepareEngine;
pub use prepare::connection_mode;
pub use prepare::partition;
pub use process::ProcessRegistry;
pub use process::ProcessSnapshot;
pub use rewrite::SqlRewriteEngine;
pub use rewrite::TranslatorRule;
pub use route::ReadwriteSplittingRouter;
pub use route::ReadwriteSplittingRule;
pub use route::ShardingSqlRouter;
pub use route::SqlRouteEngine;
pub use rule::AuditStrategy;
pub use rule::KeyGenerateStrategy;
pub use rule::ShardingCacheOptions;
pub use rule::ShardingRule;
pub use rule::TableRule;
pub use sink::InMemoryEventSink;
pub use sink::NoopEventSink;
pub use sink::StderrEventSink;
pub use strategy::ShardingStrategy;
