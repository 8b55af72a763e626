// crates/shardline-core/src/runtime/algorithm/audit.rs
// ============================================================================
// Module: Sharding Audit Algorithms
// Description: Built-in statement auditors run before routing.
// Purpose: Reject DML that would fan out to every shard unintentionally.
// Dependencies: crate::{core, interfaces}
// ============================================================================

//! ## Overview
//! `DML_SHARDING_CONDITIONS` rejects `SELECT`, `UPDATE`, and `DELETE`
//! statements over sharding tables that carry no sharding condition. INSERTs
//! always carry one condition per row and are never rejected.

// ============================================================================
// SECTION: Imports
// ============================================================================

use crate::core::AlgorithmError;
use crate::core::QueryContext;
use crate::core::RouteError;
use crate::core::ShardingConditions;
use crate::core::StatementKind;
use crate::interfaces::ShardingAuditAlgorithm;
use crate::runtime::algorithm::props::AlgorithmProps;

/// `DML_SHARDING_CONDITIONS` auditor.
#[derive(Debug, Clone, Copy, Default)]
pub struct DmlShardingConditionsAuditAlgorithm;

impl DmlShardingConditionsAuditAlgorithm {
    /// Registry type tag.
    pub const TYPE: &'static str = "DML_SHARDING_CONDITIONS";

    /// Builds the auditor. It takes no options.
    ///
    /// # Errors
    /// Never fails; the signature matches the registry constructor shape.
    pub const fn new(_options: &AlgorithmProps) -> Result<Self, AlgorithmError> {
        Ok(Self)
    }
}

impl ShardingAuditAlgorithm for DmlShardingConditionsAuditAlgorithm {
    fn check(
        &self,
        query: &QueryContext,
        conditions: &ShardingConditions,
        sharding_tables: &[String],
    ) -> Result<(), RouteError> {
        let kind = query.statement.kind;
        if !kind.is_dml() || kind == StatementKind::Insert || sharding_tables.is_empty() {
            return Ok(());
        }
        if conditions.is_empty() && !conditions.always_false {
            return Err(RouteError::Audit(format!(
                "not allow DML operation without sharding conditions on {}",
                sharding_tables.join(", ")
            )));
        }
        Ok(())
    }
}
