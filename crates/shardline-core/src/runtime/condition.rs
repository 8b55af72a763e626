// crates/shardline-core/src/runtime/condition.rs
// ============================================================================
// Module: Sharding Condition Engine
// Description: Extracts sharding conditions from a parsed statement.
// Purpose: Resolve predicates and INSERT rows into column-to-value bindings.
// Dependencies: crate::{core, runtime::rule}
// ============================================================================

//! ## Overview
//! WHERE clauses arrive as an OR of AND groups. Each AND group yields one
//! [`ShardingCondition`]; predicates on the same column inside a group are
//! intersected. A group whose intersection is empty can never match and is
//! dropped; when every group is dropped the statement is always false. A
//! group with no sharding predicate at all leaves the statement unconstrained
//! (full route).
//!
//! INSERT statements yield one condition per row. Rows that omit the key
//! column of a table with a key generator receive a generated key, which also
//! feeds the condition when that column is a sharding column.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::ops::Bound;

use crate::core::ConditionValue;
use crate::core::InsertValues;
use crate::core::Operand;
use crate::core::Predicate;
use crate::core::PredicateCondition;
use crate::core::QueryContext;
use crate::core::RouteError;
use crate::core::ShardingCondition;
use crate::core::ShardingConditionValue;
use crate::core::ShardingConditions;
use crate::core::ShardingValue;
use crate::core::StatementKind;
use crate::core::ValueRange;
use crate::runtime::rule::ShardingRule;

// ============================================================================
// SECTION: Output
// ============================================================================

/// Conditions extracted from one statement plus any generated keys.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractedConditions {
    /// Sharding conditions.
    pub conditions: ShardingConditions,
    /// Keys generated for INSERT rows, in row order.
    pub generated_keys: Vec<ShardingValue>,
}

// ============================================================================
// SECTION: Engine
// ============================================================================

/// Condition extractor bound to a sharding rule.
#[derive(Debug, Clone, Copy)]
pub struct ShardingConditionEngine<'a> {
    /// Rule deciding which columns are sharding columns.
    rule: &'a ShardingRule,
}

impl<'a> ShardingConditionEngine<'a> {
    /// Creates an engine for `rule`.
    #[must_use]
    pub const fn new(rule: &'a ShardingRule) -> Self {
        Self {
            rule,
        }
    }

    /// Extracts conditions from `query`.
    ///
    /// # Errors
    /// Returns [`RouteError::ParameterIndexOutOfRange`] when a parameter
    /// marker has no bound value.
    pub fn create(&self, query: &QueryContext) -> Result<ExtractedConditions, RouteError> {
        let statement = &query.statement;
        if !statement.needs_conditions() {
            return Ok(ExtractedConditions::default());
        }
        if statement.kind == StatementKind::Insert
            && let Some(insert) = &statement.insert
        {
            return self.create_insert(insert, &query.params);
        }
        let need_merge = statement.kind == StatementKind::Select && statement.features.subquery;
        Ok(ExtractedConditions {
            conditions: self.create_where(&statement.predicate_groups, &query.params, need_merge)?,
            generated_keys: Vec::new(),
        })
    }

    /// One condition per satisfiable AND group.
    fn create_where(
        &self,
        groups: &[Vec<Predicate>],
        params: &[ShardingValue],
        need_merge: bool,
    ) -> Result<ShardingConditions, RouteError> {
        let mut conditions: Vec<ShardingCondition> = Vec::with_capacity(groups.len());
        let mut unsatisfiable = 0_usize;
        for group in groups {
            match self.create_group(group, params)? {
                GroupOutcome::Condition(condition) => conditions.push(condition),
                GroupOutcome::Unconstrained => return Ok(ShardingConditions::default()),
                GroupOutcome::Unsatisfiable => unsatisfiable += 1,
            }
        }
        if conditions.is_empty() && unsatisfiable > 0 {
            return Ok(ShardingConditions::always_false());
        }
        Ok(ShardingConditions::new(conditions, need_merge))
    }

    /// Intersects the sharding predicates of one AND group.
    fn create_group(
        &self,
        group: &[Predicate],
        params: &[ShardingValue],
    ) -> Result<GroupOutcome, RouteError> {
        let mut condition = ShardingCondition::default();
        for predicate in group {
            if !self.rule.is_sharding_column(&predicate.table, &predicate.column) {
                continue;
            }
            let value = condition_value(&predicate.condition, params)?;
            let existing = condition.values.iter_mut().find(|existing| {
                existing.table.eq_ignore_ascii_case(&predicate.table)
                    && existing.column.eq_ignore_ascii_case(&predicate.column)
            });
            match existing {
                Some(existing) => match existing.value.intersect(&value) {
                    Some(merged) => existing.value = merged,
                    None => return Ok(GroupOutcome::Unsatisfiable),
                },
                None => condition.values.push(ShardingConditionValue {
                    table: predicate.table.clone(),
                    column: predicate.column.clone(),
                    value,
                }),
            }
        }
        if condition.values.is_empty() {
            return Ok(GroupOutcome::Unconstrained);
        }
        Ok(GroupOutcome::Condition(condition))
    }

    /// One condition per INSERT row.
    fn create_insert(
        &self,
        insert: &InsertValues,
        params: &[ShardingValue],
    ) -> Result<ExtractedConditions, RouteError> {
        let Some(table_rule) = self.rule.table_rule(&insert.table) else {
            return Ok(ExtractedConditions::default());
        };
        let key_generate = table_rule.key_generate().filter(|key_generate| {
            !insert.columns.iter().any(|column| column.eq_ignore_ascii_case(&key_generate.column))
        });
        let mut conditions: Vec<ShardingCondition> = Vec::with_capacity(insert.rows.len());
        let mut generated_keys: Vec<ShardingValue> = Vec::new();
        for row in &insert.rows {
            let mut condition = ShardingCondition::default();
            for (column, operand) in insert.columns.iter().zip(row) {
                if self.rule.is_sharding_column(&insert.table, column) {
                    condition.values.push(ShardingConditionValue {
                        table: insert.table.clone(),
                        column: column.clone(),
                        value: ConditionValue::list([resolve(operand, params)?]),
                    });
                }
            }
            if let Some(key_generate) = key_generate {
                let key = key_generate.generator.generate_key();
                if self.rule.is_sharding_column(&insert.table, &key_generate.column) {
                    condition.values.push(ShardingConditionValue {
                        table: insert.table.clone(),
                        column: key_generate.column.clone(),
                        value: ConditionValue::list([key.clone()]),
                    });
                }
                generated_keys.push(key);
            }
            conditions.push(condition);
        }
        Ok(ExtractedConditions {
            conditions: ShardingConditions::new(conditions, false),
            generated_keys,
        })
    }
}

/// Result of intersecting one AND group.
enum GroupOutcome {
    /// The group constrains at least one sharding column.
    Condition(ShardingCondition),
    /// The group has no sharding predicate.
    Unconstrained,
    /// Two predicates on one column cannot both hold.
    Unsatisfiable,
}

// ============================================================================
// SECTION: Operand Resolution
// ============================================================================

/// Resolves a literal or parameter marker.
fn resolve(operand: &Operand, params: &[ShardingValue]) -> Result<ShardingValue, RouteError> {
    match operand {
        Operand::Literal(value) => Ok(value.clone()),
        Operand::Parameter(index) => {
            params.get(*index).cloned().ok_or(RouteError::ParameterIndexOutOfRange {
                index: *index,
                count: params.len(),
            })
        }
    }
}

/// Converts one predicate into a condition value.
fn condition_value(
    condition: &PredicateCondition,
    params: &[ShardingValue],
) -> Result<ConditionValue, RouteError> {
    let value = match condition {
        PredicateCondition::Equal(operand) => ConditionValue::list([resolve(operand, params)?]),
        PredicateCondition::In(operands) => ConditionValue::list(
            operands.iter().map(|operand| resolve(operand, params)).collect::<Result<Vec<_>, _>>()?,
        ),
        PredicateCondition::Between {
            lower,
            upper,
        } => ConditionValue::Range(ValueRange {
            lower: Bound::Included(resolve(lower, params)?),
            upper: Bound::Included(resolve(upper, params)?),
        }),
        PredicateCondition::LessThan(operand) => {
            ConditionValue::Range(ValueRange::from_upper(Bound::Excluded(resolve(operand, params)?)))
        }
        PredicateCondition::AtMost(operand) => {
            ConditionValue::Range(ValueRange::from_upper(Bound::Included(resolve(operand, params)?)))
        }
        PredicateCondition::GreaterThan(operand) => {
            ConditionValue::Range(ValueRange::from_lower(Bound::Excluded(resolve(operand, params)?)))
        }
        PredicateCondition::AtLeast(operand) => {
            ConditionValue::Range(ValueRange::from_lower(Bound::Included(resolve(operand, params)?)))
        }
    };
    Ok(value)
}
