// crates/shardline-core/src/core/condition.rs
// ============================================================================
// Module: Sharding Conditions
// Description: Column-to-value bindings extracted from a statement.
// Purpose: Describe which key values or ranges a statement touches.
// Dependencies: crate::core::ShardingValue, serde
// ============================================================================

//! ## Overview
//! A [`ShardingCondition`] binds each sharding column to either a discrete
//! value list (equality / `IN`) or a [`ValueRange`]. One statement yields a
//! [`ShardingConditions`] collection: one condition per OR branch of the
//! WHERE clause, or one per INSERT row.
//!
//! Conditions are immutable once extracted. The only transformation is
//! [`ShardingConditions::merge`], which drops duplicate conditions.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::cmp::Ordering;
use std::ops::Bound;

use serde::Deserialize;
use serde::Serialize;

use crate::core::ShardingValue;

// ============================================================================
// SECTION: Value Ranges
// ============================================================================

/// Interval over sharding values with optional bounds.
///
/// # Invariants
/// - Bounds compare with [`ShardingValue`]'s total order.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ValueRange {
    /// Lower bound.
    pub lower: Bound<ShardingValue>,
    /// Upper bound.
    pub upper: Bound<ShardingValue>,
}

impl ValueRange {
    /// Unbounded range.
    #[must_use]
    pub const fn all() -> Self {
        Self {
            lower: Bound::Unbounded,
            upper: Bound::Unbounded,
        }
    }

    /// Closed range `[lower, upper]`.
    #[must_use]
    pub fn closed(lower: impl Into<ShardingValue>, upper: impl Into<ShardingValue>) -> Self {
        Self {
            lower: Bound::Included(lower.into()),
            upper: Bound::Included(upper.into()),
        }
    }

    /// Range with only a lower bound.
    #[must_use]
    pub fn from_lower(lower: Bound<ShardingValue>) -> Self {
        Self {
            lower,
            upper: Bound::Unbounded,
        }
    }

    /// Range with only an upper bound.
    #[must_use]
    pub fn from_upper(upper: Bound<ShardingValue>) -> Self {
        Self {
            lower: Bound::Unbounded,
            upper,
        }
    }

    /// Returns true when `value` lies inside the range.
    #[must_use]
    pub fn contains(&self, value: &ShardingValue) -> bool {
        let above = match &self.lower {
            Bound::Included(lower) => value >= lower,
            Bound::Excluded(lower) => value > lower,
            Bound::Unbounded => true,
        };
        let below = match &self.upper {
            Bound::Included(upper) => value <= upper,
            Bound::Excluded(upper) => value < upper,
            Bound::Unbounded => true,
        };
        above && below
    }

    /// Intersects two ranges; `None` when the intersection is empty.
    #[must_use]
    pub fn intersect(&self, other: &Self) -> Option<Self> {
        let lower = tighter(&self.lower, &other.lower, Ordering::Greater);
        let upper = tighter(&self.upper, &other.upper, Ordering::Less);
        let range = Self {
            lower,
            upper,
        };
        if range.is_empty() { None } else { Some(range) }
    }

    /// Returns true when no value can satisfy the range.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        match (&self.lower, &self.upper) {
            (Bound::Included(lower), Bound::Included(upper)) => lower > upper,
            (Bound::Included(lower) | Bound::Excluded(lower), Bound::Excluded(upper))
            | (Bound::Excluded(lower), Bound::Included(upper)) => lower >= upper,
            _ => false,
        }
    }
}

/// Picks the stricter of two bounds; `prefer` is the ordering that wins.
fn tighter(
    left: &Bound<ShardingValue>,
    right: &Bound<ShardingValue>,
    prefer: Ordering,
) -> Bound<ShardingValue> {
    match (left, right) {
        (Bound::Unbounded, other) | (other, Bound::Unbounded) => other.clone(),
        (Bound::Included(a) | Bound::Excluded(a), Bound::Included(b) | Bound::Excluded(b)) => {
            match a.cmp(b) {
                Ordering::Equal => {
                    if matches!(left, Bound::Excluded(_)) { left.clone() } else { right.clone() }
                }
                ordering if ordering == prefer => left.clone(),
                _ => right.clone(),
            }
        }
    }
}

// ============================================================================
// SECTION: Condition Values
// ============================================================================

/// Values a column is constrained to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConditionValue {
    /// Discrete values (equality / `IN`), duplicates removed, order preserved.
    List(Vec<ShardingValue>),
    /// Interval.
    Range(ValueRange),
}

impl ConditionValue {
    /// Builds a list value, dropping duplicates.
    #[must_use]
    pub fn list(values: impl IntoIterator<Item = ShardingValue>) -> Self {
        let mut unique = Vec::new();
        for value in values {
            if !unique.contains(&value) {
                unique.push(value);
            }
        }
        Self::List(unique)
    }

    /// Intersects two constraints on the same column; `None` when empty.
    #[must_use]
    pub fn intersect(&self, other: &Self) -> Option<Self> {
        let merged = match (self, other) {
            (Self::List(left), Self::List(right)) => {
                Self::List(left.iter().filter(|value| right.contains(value)).cloned().collect())
            }
            (Self::List(values), Self::Range(range)) | (Self::Range(range), Self::List(values)) => {
                Self::List(values.iter().filter(|value| range.contains(value)).cloned().collect())
            }
            (Self::Range(left), Self::Range(right)) => Self::Range(left.intersect(right)?),
        };
        match &merged {
            Self::List(values) if values.is_empty() => None,
            _ => Some(merged),
        }
    }
}

// ============================================================================
// SECTION: Sharding Conditions
// ============================================================================

/// Constraint on one sharding column of one logic table.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ShardingConditionValue {
    /// Logic table, lower case.
    pub table: String,
    /// Column name, lower case.
    pub column: String,
    /// Constraint.
    pub value: ConditionValue,
}

/// Conjunction of column constraints.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ShardingCondition {
    /// Column constraints; at most one per `(table, column)`.
    pub values: Vec<ShardingConditionValue>,
}

impl ShardingCondition {
    /// Finds the constraint for `table.column`.
    #[must_use]
    pub fn find(&self, table: &str, column: &str) -> Option<&ShardingConditionValue> {
        self.values.iter().find(|value| {
            value.table.eq_ignore_ascii_case(table) && value.column.eq_ignore_ascii_case(column)
        })
    }

    /// Returns the constraints owned by `table`.
    pub fn for_table<'a>(
        &'a self,
        table: &'a str,
    ) -> impl Iterator<Item = &'a ShardingConditionValue> + 'a {
        self.values.iter().filter(move |value| value.table.eq_ignore_ascii_case(table))
    }
}

/// All conditions extracted for one statement.
///
/// # Invariants
/// - `always_false` is set when every extracted branch was contradictory;
///   such statements route nowhere.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ShardingConditions {
    /// Conditions in extraction order.
    pub conditions: Vec<ShardingCondition>,
    /// Every branch was contradictory.
    pub always_false: bool,
    /// Merge was requested by the statement shape.
    need_merge: bool,
}

impl ShardingConditions {
    /// Creates a collection.
    #[must_use]
    pub const fn new(conditions: Vec<ShardingCondition>, need_merge: bool) -> Self {
        Self {
            conditions,
            always_false: false,
            need_merge,
        }
    }

    /// Creates a contradictory collection.
    #[must_use]
    pub const fn always_false() -> Self {
        Self {
            conditions: Vec::new(),
            always_false: true,
            need_merge: false,
        }
    }

    /// Returns true when no condition was extracted.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    /// Returns true when duplicate conditions should be merged.
    #[must_use]
    pub fn is_need_merge(&self) -> bool {
        self.need_merge && self.conditions.len() > 1
    }

    /// Drops duplicate conditions, keeping first occurrences in order.
    pub fn merge(&mut self) {
        let mut unique: Vec<ShardingCondition> = Vec::with_capacity(self.conditions.len());
        for condition in self.conditions.drain(..) {
            if !unique.contains(&condition) {
                unique.push(condition);
            }
        }
        self.conditions = unique;
    }
}
