// crates/shardline-core/src/runtime/route/mod.rs
// ============================================================================
// Module: Route Engine
// Description: Hint override, ordered router chain, and single-unit fallback.
// Purpose: Produce the route context for one statement.
// Dependencies: crate::{core, interfaces}
// ============================================================================

//! ## Overview
//! Routing runs `NoRoute -> (HintOverride | RouterChain) -> Routed`:
//! 1. A hint data source short-circuits every router and must name a known
//!    storage unit.
//! 2. Otherwise the first router creates the context and every later router
//!    decorates it.
//! 3. An empty result on a single-unit topology routes to that unit.
//!
//! Every routed unit must name a known storage unit; anything else is
//! rejected before rewrite.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod cache;
pub mod readwrite;
pub mod sharding;
pub mod validator;

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;

use crate::core::QueryContext;
use crate::core::RouteContext;
use crate::core::RouteError;
use crate::core::RouteUnit;
use crate::core::Topology;
use crate::interfaces::SqlRouter;

pub use cache::ShardingCache;
pub use readwrite::LoadBalancer;
pub use readwrite::ReadwriteSplittingGroup;
pub use readwrite::ReadwriteSplittingRouter;
pub use readwrite::ReadwriteSplittingRule;
pub use sharding::ShardingSqlRouter;
pub use validator::ShardingDmlValidator;

// ============================================================================
// SECTION: Engine
// ============================================================================

/// Ordered router chain.
///
/// # Invariants
/// - Routers run in registration order.
/// - Routing the same query twice against the same topology yields the
///   same route context.
#[derive(Clone, Default)]
pub struct SqlRouteEngine {
    /// Routers in priority order.
    routers: Vec<Arc<dyn SqlRouter>>,
}

impl SqlRouteEngine {
    /// Creates an engine over `routers`.
    #[must_use]
    pub fn new(routers: Vec<Arc<dyn SqlRouter>>) -> Self {
        Self {
            routers,
        }
    }

    /// Router names in priority order.
    #[must_use]
    pub fn router_names(&self) -> Vec<&'static str> {
        self.routers.iter().map(|router| router.name()).collect()
    }

    /// Routes `query`.
    ///
    /// # Errors
    /// Returns [`RouteError::UnknownHintTarget`] for a hint naming an unknown
    /// storage unit, [`RouteError::UnknownStorageUnit`] when a router targets
    /// one, or any router failure.
    pub fn route(&self, query: &QueryContext, topology: &Topology) -> Result<RouteContext, RouteError> {
        if let Some(name) = query.hint.hint_data_source_name() {
            if !topology.contains(name) {
                return Err(RouteError::UnknownHintTarget(name.to_string()));
            }
            let mut route = RouteContext::new();
            route.add_route_unit(RouteUnit::data_source_only(name));
            return Ok(route);
        }

        let mut route: Option<RouteContext> = None;
        for router in &self.routers {
            match route.as_mut() {
                None => route = Some(router.create_route_context(query, topology)?),
                Some(existing) => router.decorate_route_context(existing, query, topology)?,
            }
        }
        let mut route = route.unwrap_or_default();

        if route.is_empty()
            && let Some(name) = topology.single_unit_name()
        {
            route.add_route_unit(RouteUnit::data_source_only(name));
        }
        route.dedup();

        for unit in route.route_units() {
            if !topology.contains(unit.data_source_name()) {
                return Err(RouteError::UnknownStorageUnit(unit.data_source_name().to_string()));
            }
        }
        Ok(route)
    }
}
