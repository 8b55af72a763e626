// crates/shardline-core/src/runtime/strategy.rs
// ============================================================================
// Module: Sharding Strategies
// Description: Bind sharding algorithms to the columns that feed them.
// Purpose: Turn one sharding condition into target names for one dimension.
// Dependencies: crate::{core, interfaces, runtime::algorithm}
// ============================================================================

//! ## Overview
//! A strategy shards one dimension of a table: its data sources or its
//! actual tables. It picks the condition values for its columns, invokes the
//! algorithm, and keeps only targets that are actually available.
//!
//! ### Invariants
//! - Results are a subset of `available`, spelled as in `available`, in the
//!   order the algorithm produced them, without duplicates.
//! - A strategy with no usable condition value returns every available target.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;
use std::sync::Arc;

use crate::core::AlgorithmError;
use crate::core::ComplexKeysShardingValue;
use crate::core::ConditionValue;
use crate::core::HintShardingValue;
use crate::core::PreciseShardingValue;
use crate::core::RangeShardingValue;
use crate::core::RouteError;
use crate::core::ShardingCondition;
use crate::core::ShardingValue;
use crate::interfaces::ComplexKeysShardingAlgorithm;
use crate::interfaces::HintShardingAlgorithm;
use crate::interfaces::StandardShardingAlgorithm;
use crate::runtime::algorithm::ShardingAlgorithm;

// ============================================================================
// SECTION: Strategy
// ============================================================================

/// Sharding strategy for one dimension.
#[derive(Clone, Default)]
pub enum ShardingStrategy {
    /// One column, one standard algorithm.
    Standard {
        /// Sharding column.
        column: String,
        /// Algorithm.
        algorithm: Arc<dyn StandardShardingAlgorithm>,
    },
    /// Several columns, one complex algorithm.
    Complex {
        /// Sharding columns.
        columns: Vec<String>,
        /// Algorithm.
        algorithm: Arc<dyn ComplexKeysShardingAlgorithm>,
    },
    /// Values come from the hint channel.
    Hint {
        /// Algorithm.
        algorithm: Arc<dyn HintShardingAlgorithm>,
    },
    /// No sharding; every available target.
    #[default]
    None,
}

impl fmt::Debug for ShardingStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Standard {
                column, ..
            } => f.debug_struct("Standard").field("column", column).finish_non_exhaustive(),
            Self::Complex {
                columns, ..
            } => f.debug_struct("Complex").field("columns", columns).finish_non_exhaustive(),
            Self::Hint {
                ..
            } => f.debug_struct("Hint").finish_non_exhaustive(),
            Self::None => f.write_str("None"),
        }
    }
}

impl ShardingStrategy {
    /// Binds a built algorithm to its columns.
    ///
    /// Standard algorithms need exactly one column; complex algorithms need
    /// at least one; hint algorithms ignore columns.
    ///
    /// # Errors
    /// Returns [`AlgorithmError::Initialization`] when the column count does
    /// not fit the algorithm shape.
    pub fn new(columns: &[String], algorithm: ShardingAlgorithm) -> Result<Self, AlgorithmError> {
        match algorithm {
            ShardingAlgorithm::Standard(algorithm) => match columns {
                [column] => Ok(Self::Standard {
                    column: column.clone(),
                    algorithm,
                }),
                _ => Err(AlgorithmError::init(
                    "standard strategy",
                    format!("expected exactly one sharding column, got {}", columns.len()),
                )),
            },
            ShardingAlgorithm::Complex(algorithm) => {
                if columns.is_empty() {
                    return Err(AlgorithmError::init(
                        "complex strategy",
                        "at least one sharding column is required",
                    ));
                }
                Ok(Self::Complex {
                    columns: columns.to_vec(),
                    algorithm,
                })
            }
            ShardingAlgorithm::Hint(algorithm) => Ok(Self::Hint {
                algorithm,
            }),
        }
    }

    /// Columns this strategy reads from conditions.
    #[must_use]
    pub fn sharding_columns(&self) -> Vec<&str> {
        match self {
            Self::Standard {
                column, ..
            } => vec![column.as_str()],
            Self::Complex {
                columns, ..
            } => columns.iter().map(String::as_str).collect(),
            Self::Hint {
                ..
            }
            | Self::None => Vec::new(),
        }
    }

    /// Returns true for hint strategies.
    #[must_use]
    pub const fn is_hint(&self) -> bool {
        matches!(self, Self::Hint { .. })
    }

    /// Computes the targets for one condition.
    ///
    /// `hint_values` feeds hint strategies; other strategies read
    /// `condition`. Either being absent routes to every available target.
    ///
    /// # Errors
    /// Returns [`RouteError`] from the algorithm.
    pub fn do_sharding(
        &self,
        available: &[String],
        logic_table: &str,
        condition: Option<&ShardingCondition>,
        hint_values: Option<&[ShardingValue]>,
    ) -> Result<Vec<String>, RouteError> {
        let targets = match self {
            Self::Standard {
                column,
                algorithm,
            } => {
                let Some(found) = condition.and_then(|condition| condition.find(logic_table, column))
                else {
                    return Ok(available.to_vec());
                };
                match &found.value {
                    ConditionValue::List(values) => {
                        let mut targets = Vec::with_capacity(values.len());
                        for value in values {
                            let precise = PreciseShardingValue {
                                logic_table: logic_table.to_string(),
                                column: column.clone(),
                                value: value.clone(),
                            };
                            if let Some(target) = algorithm.do_sharding_precise(available, &precise)? {
                                targets.push(target);
                            }
                        }
                        targets
                    }
                    ConditionValue::Range(range) => {
                        let value = RangeShardingValue {
                            logic_table: logic_table.to_string(),
                            column: column.clone(),
                            range: range.clone(),
                        };
                        algorithm.do_sharding_range(available, &value)?
                    }
                }
            }
            Self::Complex {
                columns,
                algorithm,
            } => {
                let mut value = ComplexKeysShardingValue {
                    logic_table: logic_table.to_string(),
                    ..ComplexKeysShardingValue::default()
                };
                if let Some(condition) = condition {
                    for column in columns {
                        match condition.find(logic_table, column).map(|found| &found.value) {
                            Some(ConditionValue::List(values)) => {
                                value.column_values.insert(column.clone(), values.clone());
                            }
                            Some(ConditionValue::Range(range)) => {
                                value.column_ranges.insert(column.clone(), range.clone());
                            }
                            None => {}
                        }
                    }
                }
                if value.column_values.is_empty() && value.column_ranges.is_empty() {
                    return Ok(available.to_vec());
                }
                algorithm.do_sharding(available, &value)?
            }
            Self::Hint {
                algorithm,
            } => {
                let Some(values) = hint_values.filter(|values| !values.is_empty()) else {
                    return Ok(available.to_vec());
                };
                let value = HintShardingValue {
                    logic_table: logic_table.to_string(),
                    values: values.to_vec(),
                };
                algorithm.do_sharding(available, &value)?
            }
            Self::None => return Ok(available.to_vec()),
        };
        Ok(retain_available(available, targets))
    }
}

/// Keeps targets present in `available` (case-insensitively), deduplicated.
fn retain_available(available: &[String], targets: Vec<String>) -> Vec<String> {
    let mut result: Vec<String> = Vec::with_capacity(targets.len());
    for target in targets {
        if let Some(known) = available.iter().find(|name| name.eq_ignore_ascii_case(&target))
            && !result.contains(known)
        {
            result.push(known.clone());
        }
    }
    result
}
