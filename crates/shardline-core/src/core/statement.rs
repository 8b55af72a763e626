// crates/shardline-core/src/core/statement.rs
// ============================================================================
// Module: Parsed Statement Model
// Description: The parsed-statement surface the pipeline consumes.
// Purpose: Expose tables, predicates, insert rows, and clause flags without a parser.
// Dependencies: crate::core::ShardingValue, serde
// ============================================================================

//! ## Overview
//! SQL parsing happens upstream. The kernel only needs a small object model:
//! the statement kind, referenced tables, WHERE predicates as an OR of AND
//! groups, INSERT rows, and the clause flags that decide whether SELECTs can
//! be aggregated with `UNION ALL`.
//!
//! Operands are either literals or zero-based parameter markers resolved
//! against the bound parameters during condition extraction.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;

use crate::core::ShardingValue;

// ============================================================================
// SECTION: Statement Kind
// ============================================================================

/// Kind of parsed statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatementKind {
    /// `SELECT`.
    Select,
    /// `INSERT`.
    Insert,
    /// `UPDATE`.
    Update,
    /// `DELETE`.
    Delete,
    /// Schema change (`CREATE`, `ALTER`, `DROP`, ...).
    Ddl,
    /// Anything else (`SET`, `SHOW`, transaction control, ...).
    Other,
}

impl StatementKind {
    /// Returns true for data-manipulation statements.
    #[must_use]
    pub const fn is_dml(self) -> bool {
        matches!(self, Self::Select | Self::Insert | Self::Update | Self::Delete)
    }

    /// Returns true for statements that modify rows.
    #[must_use]
    pub const fn is_write(self) -> bool {
        matches!(self, Self::Insert | Self::Update | Self::Delete)
    }

    /// SQL keyword naming the statement kind.
    #[must_use]
    pub const fn keyword(self) -> &'static str {
        match self {
            Self::Select => "SELECT",
            Self::Insert => "INSERT",
            Self::Update => "UPDATE",
            Self::Delete => "DELETE",
            Self::Ddl => "DDL",
            Self::Other => "OTHER",
        }
    }
}

// ============================================================================
// SECTION: Operands and Predicates
// ============================================================================

/// Predicate or insert operand.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operand {
    /// Literal value in the SQL text.
    Literal(ShardingValue),
    /// Zero-based parameter marker.
    Parameter(usize),
}

impl Operand {
    /// Builds a literal operand.
    #[must_use]
    pub fn literal(value: impl Into<ShardingValue>) -> Self {
        Self::Literal(value.into())
    }
}

/// Comparison applied by a predicate.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PredicateCondition {
    /// `column = v`.
    Equal(Operand),
    /// `column IN (v, ...)`.
    In(Vec<Operand>),
    /// `column BETWEEN lower AND upper`.
    Between {
        /// Inclusive lower bound.
        lower: Operand,
        /// Inclusive upper bound.
        upper: Operand,
    },
    /// `column < v`.
    LessThan(Operand),
    /// `column <= v`.
    AtMost(Operand),
    /// `column > v`.
    GreaterThan(Operand),
    /// `column >= v`.
    AtLeast(Operand),
}

/// One `table.column <op> value` predicate.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Predicate {
    /// Logic table that owns the column.
    pub table: String,
    /// Column name.
    pub column: String,
    /// Comparison.
    pub condition: PredicateCondition,
}

impl Predicate {
    /// Builds an equality predicate.
    #[must_use]
    pub fn eq(table: &str, column: &str, operand: Operand) -> Self {
        Self::new(table, column, PredicateCondition::Equal(operand))
    }

    /// Builds an `IN` predicate.
    #[must_use]
    pub fn in_list(table: &str, column: &str, operands: Vec<Operand>) -> Self {
        Self::new(table, column, PredicateCondition::In(operands))
    }

    /// Builds a `BETWEEN` predicate.
    #[must_use]
    pub fn between(table: &str, column: &str, lower: Operand, upper: Operand) -> Self {
        Self::new(
            table,
            column,
            PredicateCondition::Between {
                lower,
                upper,
            },
        )
    }

    /// Builds a predicate with an arbitrary condition.
    #[must_use]
    pub fn new(table: &str, column: &str, condition: PredicateCondition) -> Self {
        Self {
            table: table.to_string(),
            column: column.to_string(),
            condition,
        }
    }
}

// ============================================================================
// SECTION: Insert Values
// ============================================================================

/// Column list and value rows of an `INSERT`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InsertValues {
    /// Target logic table.
    pub table: String,
    /// Column names in statement order.
    pub columns: Vec<String>,
    /// One operand list per `VALUES` row, aligned with `columns`.
    pub rows: Vec<Vec<Operand>>,
}

// ============================================================================
// SECTION: Statement Context
// ============================================================================

/// Clause flags that block `UNION ALL` aggregation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[allow(clippy::struct_excessive_bools, reason = "Flags mirror independent SQL clauses.")]
pub struct StatementFeatures {
    /// Statement contains a subquery.
    pub subquery: bool,
    /// Statement contains a join.
    pub join: bool,
    /// Statement has an `ORDER BY`.
    pub order_by: bool,
    /// Statement has `LIMIT`/`OFFSET` style pagination.
    pub pagination: bool,
    /// Statement takes a row lock (`FOR UPDATE`).
    pub lock: bool,
}

impl StatementFeatures {
    /// Returns true when none of the blocking clauses are present.
    #[must_use]
    pub const fn is_plain(self) -> bool {
        !(self.subquery || self.join || self.order_by || self.pagination || self.lock)
    }
}

/// Parsed statement as seen by the kernel.
///
/// # Invariants
/// - `predicate_groups` is a disjunction of conjunctions; an empty list means
///   no usable WHERE predicates.
/// - `insert` is only set for [`StatementKind::Insert`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatementContext {
    /// Statement kind.
    pub kind: StatementKind,
    /// Logic tables referenced, in statement order.
    pub tables: Vec<String>,
    /// WHERE predicates as OR-of-AND groups.
    pub predicate_groups: Vec<Vec<Predicate>>,
    /// INSERT column list and rows.
    pub insert: Option<InsertValues>,
    /// Clause flags.
    pub features: StatementFeatures,
    /// Statement uses `$n` positional parameter markers.
    pub dollar_parameter_marker: bool,
    /// Statement is a cursor fetch/move.
    pub cursor: bool,
}

impl StatementContext {
    /// Creates a statement context with no predicates.
    #[must_use]
    pub fn new(kind: StatementKind, tables: &[&str]) -> Self {
        Self {
            kind,
            tables: tables.iter().map(|table| (*table).to_string()).collect(),
            predicate_groups: Vec::new(),
            insert: None,
            features: StatementFeatures::default(),
            dollar_parameter_marker: false,
            cursor: false,
        }
    }

    /// Creates a `SELECT` context.
    #[must_use]
    pub fn select(tables: &[&str]) -> Self {
        Self::new(StatementKind::Select, tables)
    }

    /// Creates an `INSERT` context.
    #[must_use]
    pub fn insert(table: &str, columns: &[&str], rows: Vec<Vec<Operand>>) -> Self {
        let mut context = Self::new(StatementKind::Insert, &[table]);
        context.insert = Some(InsertValues {
            table: table.to_string(),
            columns: columns.iter().map(|column| (*column).to_string()).collect(),
            rows,
        });
        context
    }

    /// Adds an AND group of predicates (OR-ed with existing groups).
    #[must_use]
    pub fn with_predicates(mut self, group: Vec<Predicate>) -> Self {
        self.predicate_groups.push(group);
        self
    }

    /// Replaces the clause flags.
    #[must_use]
    pub const fn with_features(mut self, features: StatementFeatures) -> Self {
        self.features = features;
        self
    }

    /// Marks the statement as using `$n` markers.
    #[must_use]
    pub const fn with_dollar_parameter_marker(mut self) -> Self {
        self.dollar_parameter_marker = true;
        self
    }

    /// Returns true for DML or cursor statements, which get sharding conditions.
    #[must_use]
    pub const fn needs_conditions(&self) -> bool {
        self.kind.is_dml() || self.cursor
    }
}
