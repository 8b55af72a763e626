// crates/shardline-core/src/runtime/route/cache.rs
// ============================================================================
// Module: Sharding Route Cache
// Description: Bounded cache of route contexts keyed by SQL and conditions.
// Purpose: Skip re-routing statements that are re-executed with equal keys.
// Dependencies: crate::{core, runtime::rule}
// ============================================================================

//! ## Overview
//! The key is the logical SQL text together with the extracted conditions,
//! so re-executions with different parameter values that resolve to the
//! same sharding values share an entry. The cache evicts the oldest entry
//! once `maximum_size` is reached. A poisoned lock degrades to a miss.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::HashMap;
use std::collections::VecDeque;
use std::sync::Mutex;

use crate::core::RouteContext;
use crate::core::ShardingConditions;
use crate::runtime::rule::ShardingCacheOptions;

// ============================================================================
// SECTION: Cache
// ============================================================================

/// Cache key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct CacheKey {
    /// Logical SQL.
    sql: String,
    /// Extracted conditions.
    conditions: ShardingConditions,
}

/// Entries plus insertion order for eviction.
#[derive(Debug, Default)]
struct CacheState {
    /// Cached contexts.
    entries: HashMap<CacheKey, RouteContext>,
    /// Keys oldest first.
    order: VecDeque<CacheKey>,
}

/// Bounded route-context cache.
#[derive(Debug, Default)]
pub struct ShardingCache {
    /// Size bounds.
    options: ShardingCacheOptions,
    /// Guarded state.
    state: Mutex<CacheState>,
}

impl ShardingCache {
    /// Creates an empty cache.
    #[must_use]
    pub fn new(options: ShardingCacheOptions) -> Self {
        Self {
            options,
            state: Mutex::new(CacheState::default()),
        }
    }

    /// Returns true when `sql` is short enough to cache.
    #[must_use]
    pub const fn is_cacheable(&self, sql: &str) -> bool {
        self.options.maximum_size > 0 && sql.len() <= self.options.allowed_max_sql_length
    }

    /// Looks up a cached route context.
    #[must_use]
    pub fn get(&self, sql: &str, conditions: &ShardingConditions) -> Option<RouteContext> {
        let state = self.state.lock().ok()?;
        let key = CacheKey {
            sql: sql.to_string(),
            conditions: conditions.clone(),
        };
        state.entries.get(&key).cloned()
    }

    /// Stores a route context, evicting the oldest entry when full.
    pub fn put(&self, sql: &str, conditions: &ShardingConditions, route: &RouteContext) {
        if !self.is_cacheable(sql) {
            return;
        }
        let Ok(mut state) = self.state.lock() else {
            return;
        };
        let key = CacheKey {
            sql: sql.to_string(),
            conditions: conditions.clone(),
        };
        if state.entries.insert(key.clone(), route.clone()).is_none() {
            state.order.push_back(key);
        }
        while state.entries.len() > self.options.maximum_size {
            let Some(oldest) = state.order.pop_front() else {
                break;
            };
            state.entries.remove(&oldest);
        }
    }

    /// Number of cached contexts.
    #[must_use]
    pub fn len(&self) -> usize {
        self.state.lock().map_or(0, |state| state.entries.len())
    }

    /// Returns true when nothing is cached.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
