// crates/shardline-core/src/core/sharding_value.rs
// ============================================================================
// Module: Algorithm Inputs
// Description: Per-call inputs handed to sharding algorithms.
// Purpose: Separate precise, range, multi-column, and hint computations.
// Dependencies: crate::core::{condition, ShardingValue}
// ============================================================================

//! ## Overview
//! Strategies translate a [`crate::core::ShardingCondition`] into one of these
//! inputs before invoking an algorithm.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;

use crate::core::ShardingValue;
use crate::core::condition::ValueRange;

// ============================================================================
// SECTION: Inputs
// ============================================================================

/// Single value for one column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreciseShardingValue {
    /// Logic table.
    pub logic_table: String,
    /// Sharding column.
    pub column: String,
    /// Key value.
    pub value: ShardingValue,
}

/// Range for one column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RangeShardingValue {
    /// Logic table.
    pub logic_table: String,
    /// Sharding column.
    pub column: String,
    /// Key range.
    pub range: ValueRange,
}

/// Values and ranges for several columns at once.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ComplexKeysShardingValue {
    /// Logic table.
    pub logic_table: String,
    /// Discrete values per column.
    pub column_values: BTreeMap<String, Vec<ShardingValue>>,
    /// Ranges per column.
    pub column_ranges: BTreeMap<String, ValueRange>,
}

/// Values supplied through the hint channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HintShardingValue {
    /// Logic table.
    pub logic_table: String,
    /// Hint values.
    pub values: Vec<ShardingValue>,
}
