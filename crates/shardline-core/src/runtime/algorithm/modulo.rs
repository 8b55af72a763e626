// crates/shardline-core/src/runtime/algorithm/modulo.rs
// ============================================================================
// Module: Modulo Sharding Algorithms
// Description: `MOD` and `HASH_MOD` single-column algorithms.
// Purpose: Pick the target whose numeric suffix equals the key modulo a count.
// Dependencies: crate::{core, interfaces}, shardline-expr
// ============================================================================

//! ## Overview
//! `MOD` takes `key % sharding-count` of an integer key (string keys must
//! parse as integers); `HASH_MOD` takes the stable hash of any key first.
//! The shard number selects the available target whose trailing digits
//! equal it, so `t_order_1` matches shard 1 but `t_order_11` does not.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::ops::Bound;

use shardline_expr::stable_hash;

use crate::core::AlgorithmError;
use crate::core::PreciseShardingValue;
use crate::core::RangeShardingValue;
use crate::core::RouteError;
use crate::core::ShardingValue;
use crate::interfaces::StandardShardingAlgorithm;
use crate::runtime::algorithm::props;
use crate::runtime::algorithm::props::AlgorithmProps;

// ============================================================================
// SECTION: MOD
// ============================================================================

/// `MOD` algorithm.
#[derive(Debug, Clone, Copy)]
pub struct ModShardingAlgorithm {
    /// Number of shards.
    sharding_count: i64,
}

impl ModShardingAlgorithm {
    /// Registry type tag.
    pub const TYPE: &'static str = "MOD";

    /// Builds the algorithm from options.
    ///
    /// # Errors
    /// Returns [`AlgorithmError::Initialization`] when `sharding-count` is
    /// missing or not positive.
    pub fn new(options: &AlgorithmProps) -> Result<Self, AlgorithmError> {
        Ok(Self {
            sharding_count: props::positive_int(options, Self::TYPE, props::SHARDING_COUNT)?,
        })
    }
}

impl StandardShardingAlgorithm for ModShardingAlgorithm {
    fn do_sharding_precise(
        &self,
        available: &[String],
        value: &PreciseShardingValue,
    ) -> Result<Option<String>, RouteError> {
        let key = integer_key(&value.column, &value.value)?;
        Ok(find_by_suffix(available, key.rem_euclid(self.sharding_count)))
    }

    fn do_sharding_range(
        &self,
        available: &[String],
        value: &RangeShardingValue,
    ) -> Result<Vec<String>, RouteError> {
        let Some((lower, upper)) = closed_int_bounds(&value.range.lower, &value.range.upper) else {
            return Ok(available.to_vec());
        };
        if upper.saturating_sub(lower) >= self.sharding_count - 1 {
            return Ok(available.to_vec());
        }
        let mut targets: Vec<String> = Vec::new();
        for key in lower ..= upper {
            if let Some(target) = find_by_suffix(available, key.rem_euclid(self.sharding_count))
                && !targets.contains(&target)
            {
                targets.push(target);
            }
        }
        Ok(targets)
    }
}

// ============================================================================
// SECTION: HASH_MOD
// ============================================================================

/// `HASH_MOD` algorithm.
#[derive(Debug, Clone, Copy)]
pub struct HashModShardingAlgorithm {
    /// Number of shards.
    sharding_count: i64,
}

impl HashModShardingAlgorithm {
    /// Registry type tag.
    pub const TYPE: &'static str = "HASH_MOD";

    /// Builds the algorithm from options.
    ///
    /// # Errors
    /// Returns [`AlgorithmError::Initialization`] when `sharding-count` is
    /// missing or not positive.
    pub fn new(options: &AlgorithmProps) -> Result<Self, AlgorithmError> {
        Ok(Self {
            sharding_count: props::positive_int(options, Self::TYPE, props::SHARDING_COUNT)?,
        })
    }
}

impl StandardShardingAlgorithm for HashModShardingAlgorithm {
    fn do_sharding_precise(
        &self,
        available: &[String],
        value: &PreciseShardingValue,
    ) -> Result<Option<String>, RouteError> {
        if value.value.is_null() {
            return Err(RouteError::NullShardingValue(value.column.clone()));
        }
        let shard = stable_hash(&value.value).rem_euclid(self.sharding_count);
        Ok(find_by_suffix(available, shard))
    }

    fn do_sharding_range(
        &self,
        available: &[String],
        _value: &RangeShardingValue,
    ) -> Result<Vec<String>, RouteError> {
        Ok(available.to_vec())
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Reads an integer key, parsing string keys.
fn integer_key(column: &str, value: &ShardingValue) -> Result<i64, RouteError> {
    match value {
        ShardingValue::Null => Err(RouteError::NullShardingValue(column.to_string())),
        ShardingValue::Int(key) => Ok(*key),
        ShardingValue::Str(raw) => raw.trim().parse::<i64>().map_err(|_| {
            RouteError::Validation(format!("MOD sharding key `{column}` must be an integer"))
        }),
        ShardingValue::Bool(_) => {
            Err(RouteError::Validation(format!("MOD sharding key `{column}` must be an integer")))
        }
    }
}

/// Converts integer bounds to an inclusive `[lower, upper]` pair.
fn closed_int_bounds(lower: &Bound<ShardingValue>, upper: &Bound<ShardingValue>) -> Option<(i64, i64)> {
    let lower = match lower {
        Bound::Included(ShardingValue::Int(value)) => *value,
        Bound::Excluded(ShardingValue::Int(value)) => value.checked_add(1)?,
        _ => return None,
    };
    let upper = match upper {
        Bound::Included(ShardingValue::Int(value)) => *value,
        Bound::Excluded(ShardingValue::Int(value)) => value.checked_sub(1)?,
        _ => return None,
    };
    Some((lower, upper))
}

/// Finds the target whose trailing digits equal `shard`.
fn find_by_suffix(available: &[String], shard: i64) -> Option<String> {
    available
        .iter()
        .find(|target| {
            let digits = target.bytes().rev().take_while(u8::is_ascii_digit).count();
            target[target.len() - digits ..].parse::<i64>().is_ok_and(|suffix| suffix == shard)
        })
        .cloned()
}
