// crates/shardline-core/src/runtime/algorithm/complex_inline.rs
// ============================================================================
// Module: Complex Inline Sharding Algorithm
// Description: Multi-column algorithm driven by an inline template.
// Purpose: Evaluate one template per Cartesian combination of column values.
// Dependencies: crate::{core, interfaces}, shardline-expr
// ============================================================================

//! ## Overview
//! Columns `{a: [1, 2], b: [9]}` flatten to `{a=1, b=9}` and `{a=2, b=9}`.
//! The template is evaluated once per combination and the target names are
//! unioned in first-seen order. Any range constraint broadcasts (or is
//! rejected when ranges are disabled).

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;

use shardline_expr::InlineTemplate;

use crate::core::AlgorithmError;
use crate::core::ComplexKeysShardingValue;
use crate::core::RouteError;
use crate::core::ShardingValue;
use crate::interfaces::ComplexKeysShardingAlgorithm;
use crate::runtime::algorithm::inline::evaluate_template;
use crate::runtime::algorithm::inline::parse_template;
use crate::runtime::algorithm::props;
use crate::runtime::algorithm::props::AlgorithmProps;

// ============================================================================
// SECTION: Algorithm
// ============================================================================

/// `COMPLEX_INLINE` algorithm.
#[derive(Debug, Clone)]
pub struct ComplexInlineShardingAlgorithm {
    /// Parsed template.
    template: InlineTemplate,
    /// Expected sharding columns; empty disables the count check.
    sharding_columns: Vec<String>,
    /// Broadcast ranges instead of rejecting them.
    allow_range_query: bool,
}

impl ComplexInlineShardingAlgorithm {
    /// Registry type tag.
    pub const TYPE: &'static str = "COMPLEX_INLINE";

    /// Builds the algorithm from options.
    ///
    /// # Errors
    /// Returns [`AlgorithmError::Initialization`] when `algorithm-expression`
    /// is missing or does not parse.
    pub fn new(options: &AlgorithmProps) -> Result<Self, AlgorithmError> {
        Ok(Self {
            template: parse_template(options, Self::TYPE)?,
            sharding_columns: props::list(options, props::SHARDING_COLUMNS),
            allow_range_query: props::boolean(
                options,
                Self::TYPE,
                props::ALLOW_RANGE_QUERY,
                false,
            )?,
        })
    }
}

impl ComplexKeysShardingAlgorithm for ComplexInlineShardingAlgorithm {
    fn do_sharding(
        &self,
        available: &[String],
        value: &ComplexKeysShardingValue,
    ) -> Result<Vec<String>, RouteError> {
        if !value.column_ranges.is_empty() {
            if !self.allow_range_query {
                return Err(RouteError::UnsupportedRangeQuery(Self::TYPE.to_string()));
            }
            return Ok(available.to_vec());
        }
        if !self.sharding_columns.is_empty()
            && self.sharding_columns.len() != value.column_values.len()
        {
            return Err(RouteError::MismatchedColumnCount {
                expected: self.sharding_columns.len(),
                actual: value.column_values.len(),
            });
        }
        for (column, values) in &value.column_values {
            if values.iter().any(ShardingValue::is_null) {
                return Err(RouteError::NullShardingValue(column.clone()));
            }
        }

        let columns = value.column_values.keys().cloned().collect::<Vec<_>>().join(",");
        let mut targets: Vec<String> = Vec::new();
        for combination in flatten(&value.column_values) {
            let target = evaluate_template(&self.template, &combination, &columns)?;
            if !targets.contains(&target) {
                targets.push(target);
            }
        }
        Ok(targets)
    }
}

// ============================================================================
// SECTION: Flattening
// ============================================================================

/// Cartesian product of per-column value lists.
///
/// An empty map, or a column with no values, yields no combinations.
/// Combinations follow column order, then value order.
#[must_use]
pub fn flatten(
    column_values: &BTreeMap<String, Vec<ShardingValue>>,
) -> Vec<BTreeMap<String, ShardingValue>> {
    if column_values.is_empty() {
        return Vec::new();
    }
    let mut combinations = vec![BTreeMap::new()];
    for (column, values) in column_values {
        let mut next = Vec::with_capacity(combinations.len() * values.len());
        for combination in &combinations {
            for value in values {
                let mut extended: BTreeMap<String, ShardingValue> = combination.clone();
                extended.insert(column.clone(), value.clone());
                next.push(extended);
            }
        }
        combinations = next;
    }
    combinations
}
