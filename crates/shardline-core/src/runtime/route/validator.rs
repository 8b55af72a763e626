// crates/shardline-core/src/runtime/route/validator.rs
// ============================================================================
// Module: Sharding Statement Validator
// Description: Built-in pre- and post-route checks for sharded DML.
// Purpose: Reject UPDATE/DELETE shapes the router cannot execute correctly.
// Dependencies: crate::{core, interfaces, runtime::rule}
// ============================================================================

//! ## Overview
//! - Before routing: UPDATE and DELETE may reference several tables only when
//!   they all share one binding group.
//! - After routing: UPDATE and DELETE with a row limit must reach a single
//!   route unit, since a per-shard limit would change the affected rows.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;

use crate::core::QueryContext;
use crate::core::RouteContext;
use crate::core::RouteError;
use crate::core::ShardingConditions;
use crate::core::StatementKind;
use crate::interfaces::StatementValidator;
use crate::runtime::rule::ShardingRule;

/// Built-in DML validator.
#[derive(Debug, Clone)]
pub struct ShardingDmlValidator {
    /// Sharding rule.
    rule: Arc<ShardingRule>,
}

impl ShardingDmlValidator {
    /// Creates a validator over `rule`.
    #[must_use]
    pub const fn new(rule: Arc<ShardingRule>) -> Self {
        Self {
            rule,
        }
    }
}

/// Returns true for UPDATE and DELETE.
const fn is_update_or_delete(kind: StatementKind) -> bool {
    matches!(kind, StatementKind::Update | StatementKind::Delete)
}

impl StatementValidator for ShardingDmlValidator {
    fn pre_validate(
        &self,
        query: &QueryContext,
        _conditions: &ShardingConditions,
    ) -> Result<(), RouteError> {
        let statement = &query.statement;
        if !is_update_or_delete(statement.kind) || statement.tables.len() <= 1 {
            return Ok(());
        }
        if self.rule.sharding_tables(&statement.tables).is_empty()
            || self.rule.is_all_binding(&statement.tables)
        {
            return Ok(());
        }
        Err(RouteError::Validation(format!(
            "{} over multiple sharding tables {} requires one binding group",
            statement.kind.keyword(),
            statement.tables.join(", ")
        )))
    }

    fn post_validate(&self, query: &QueryContext, route: &RouteContext) -> Result<(), RouteError> {
        let statement = &query.statement;
        if is_update_or_delete(statement.kind)
            && statement.features.pagination
            && route.route_units().len() > 1
        {
            return Err(RouteError::Validation(format!(
                "{} with a row limit cannot span {} route units",
                statement.kind.keyword(),
                route.route_units().len()
            )));
        }
        Ok(())
    }
}
