// crates/shardline-core/src/lib.rs
// ============================================================================
// Module: Shardline Core Root
// Description: Public API surface for the sharding kernel.
// Purpose: Expose the statement model, extension traits, and runtime engines.
// Dependencies: crate::{core, interfaces, runtime}
// ============================================================================

//! ## Overview
//! `shardline-core` routes a parsed logical statement to physical storage
//! units, rewrites it per target, and executes the result through a
//! caller-supplied connection provider.
//!
//! - [`core`] holds the data model: statements, conditions, route and
//!   execution contexts, errors, and events.
//! - [`interfaces`] declares the seams: sharding algorithms, routers,
//!   validators, translators, connection providers, and callbacks.
//! - [`runtime`] implements the pipeline engines and built-in algorithms.
//!
//! SQL parsing is out of scope; callers supply a [`core::StatementContext`]
//! and the rewrite tokens describing the statement.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod core;
pub mod interfaces;
pub mod runtime;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use crate::core::ExecutionContext;
pub use crate::core::KernelError;
pub use crate::core::KernelEvent;
pub use crate::core::QueryContext;
pub use crate::core::RouteContext;
pub use crate::core::ShardingValue;
pub use crate::core::Topology;
pub use crate::runtime::DriverExecutor;
pub use crate::runtime::ExecutorEngine;
pub use crate::runtime::KernelProcessor;
pub use crate::runtime::KernelProps;
pub use crate::runtime::ShardingRule;
pub use crate::runtime::SqlRewriteEngine;
pub use crate::runtime::SqlRouteEngine;
