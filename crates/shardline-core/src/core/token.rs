// crates/shardline-core/src/core/token.rs
// ============================================================================
// Module: SQL Tokens
// Description: Spans of logical SQL with per-route-unit replacement rules.
// Purpose: Let the rewrite engine rebuild SQL without re-parsing it.
// Dependencies: crate::core::{error, route}, serde
// ============================================================================

//! ## Overview
//! Tokens are produced upstream alongside the parsed statement. Each token
//! covers the inclusive byte span `[start, stop]` of the logical SQL and
//! renders replacement text for one [`RouteUnit`]. Insertion tokens cover no
//! text; they add text at `start`.
//!
//! ### Invariants
//! - Tokens sort by `start` and never overlap.
//! - Table and column tokens resolve names per route unit, never globally.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;

use crate::core::error::RewriteError;
use crate::core::route::DataNode;
use crate::core::route::RouteUnit;

// ============================================================================
// SECTION: Identifier Quoting
// ============================================================================

/// Quote style of an identifier in the logical SQL.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuoteCharacter {
    /// Bare identifier.
    #[default]
    None,
    /// `` `name` ``.
    BackQuote,
    /// `"name"`.
    Quote,
    /// `[name]`.
    Brackets,
}

impl QuoteCharacter {
    /// Wraps `name` in this quote style.
    #[must_use]
    pub fn wrap(self, name: &str) -> String {
        match self {
            Self::None => name.to_string(),
            Self::BackQuote => format!("`{name}`"),
            Self::Quote => format!("\"{name}\""),
            Self::Brackets => format!("[{name}]"),
        }
    }
}

// ============================================================================
// SECTION: Token Payloads
// ============================================================================

/// Projection column rendered by [`SqlToken::SubstitutableColumnName`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnProjection {
    /// Owning logic table or alias, if qualified.
    pub owner: Option<String>,
    /// Column name.
    pub name: String,
    /// Output alias.
    pub alias: Option<String>,
}

impl ColumnProjection {
    /// Renders the projection for `unit`, mapping a logic-table owner to its
    /// actual table.
    fn render(&self, unit: Option<&RouteUnit>) -> String {
        let mut out = String::new();
        if let Some(owner) = &self.owner {
            let owner = unit.and_then(|unit| unit.actual_table_name(owner)).unwrap_or(owner);
            out.push_str(owner);
            out.push('.');
        }
        out.push_str(&self.name);
        if let Some(alias) = &self.alias {
            out.push_str(" AS ");
            out.push_str(alias);
        }
        out
    }
}

/// One rendered `VALUES` row and the data nodes it was routed to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InsertValueRow {
    /// Row text including parentheses, e.g. `(?, ?, ?)`.
    pub text: String,
    /// Data nodes this row belongs to; empty means every unit.
    pub data_nodes: Vec<DataNode>,
}

// ============================================================================
// SECTION: SQL Token
// ============================================================================

/// Replacement rule over a span of logical SQL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SqlToken {
    /// Logic table name replaced by the unit's actual table.
    TableName {
        /// First byte of the span.
        start: usize,
        /// Last byte of the span (inclusive).
        stop: usize,
        /// Logic table name.
        logic_table: String,
        /// Quote style to reproduce.
        quote: QuoteCharacter,
    },
    /// Span replaced by fixed text (empty text removes the span).
    Substitute {
        /// First byte of the span.
        start: usize,
        /// Last byte of the span (inclusive).
        stop: usize,
        /// Replacement text.
        text: String,
    },
    /// Text inserted at `start`; no original text is consumed.
    Insertion {
        /// Insertion offset.
        start: usize,
        /// Inserted text.
        text: String,
    },
    /// Column list rendered per route unit.
    SubstitutableColumnName {
        /// First byte of the span.
        start: usize,
        /// Last byte of the span (inclusive).
        stop: usize,
        /// Projections in output order.
        columns: Vec<ColumnProjection>,
    },
    /// `VALUES` rows filtered to those routed to the unit.
    InsertValues {
        /// First byte of the span.
        start: usize,
        /// Last byte of the span (inclusive).
        stop: usize,
        /// Rows in statement order.
        rows: Vec<InsertValueRow>,
    },
    /// Span rebuilt from nested tokens.
    Composable {
        /// First byte of the span.
        start: usize,
        /// Last byte of the span (inclusive).
        stop: usize,
        /// Nested tokens inside `[start, stop]`.
        tokens: Vec<Self>,
    },
}

impl SqlToken {
    /// Table-name token without quoting.
    #[must_use]
    pub fn table(start: usize, stop: usize, logic_table: &str) -> Self {
        Self::TableName {
            start,
            stop,
            logic_table: logic_table.to_string(),
            quote: QuoteCharacter::None,
        }
    }

    /// Token removing `[start, stop]`.
    #[must_use]
    pub const fn remove(start: usize, stop: usize) -> Self {
        Self::Substitute {
            start,
            stop,
            text: String::new(),
        }
    }

    /// First byte covered (or insertion offset).
    #[must_use]
    pub const fn start(&self) -> usize {
        match self {
            Self::TableName {
                start, ..
            }
            | Self::Substitute {
                start, ..
            }
            | Self::Insertion {
                start, ..
            }
            | Self::SubstitutableColumnName {
                start, ..
            }
            | Self::InsertValues {
                start, ..
            }
            | Self::Composable {
                start, ..
            } => *start,
        }
    }

    /// Last byte covered; `None` for insertions.
    #[must_use]
    pub const fn stop(&self) -> Option<usize> {
        match self {
            Self::Insertion {
                ..
            } => None,
            Self::TableName {
                stop, ..
            }
            | Self::Substitute {
                stop, ..
            }
            | Self::SubstitutableColumnName {
                stop, ..
            }
            | Self::InsertValues {
                stop, ..
            }
            | Self::Composable {
                stop, ..
            } => Some(*stop),
        }
    }

    /// Offset where copying of original text resumes after this token.
    #[must_use]
    pub fn resume_index(&self, sql_len: usize) -> usize {
        self.stop().map_or(self.start(), |stop| stop.saturating_add(1)).min(sql_len)
    }

    /// Renders replacement text for `unit`.
    ///
    /// `sql` is the full logical SQL, needed by composable tokens to copy the
    /// text between their nested tokens.
    ///
    /// # Errors
    /// Returns [`RewriteError`] when nested tokens are out of bounds.
    pub fn render(&self, sql: &str, unit: Option<&RouteUnit>) -> Result<String, RewriteError> {
        let text = match self {
            Self::TableName {
                logic_table,
                quote,
                ..
            } => {
                let actual =
                    unit.and_then(|unit| unit.actual_table_name(logic_table)).unwrap_or(logic_table);
                quote.wrap(actual)
            }
            Self::Substitute {
                text, ..
            }
            | Self::Insertion {
                text, ..
            } => text.clone(),
            Self::SubstitutableColumnName {
                columns, ..
            } => columns.iter().map(|column| column.render(unit)).collect::<Vec<_>>().join(", "),
            Self::InsertValues {
                rows, ..
            } => rows
                .iter()
                .filter(|row| row_matches(row, unit))
                .map(|row| row.text.as_str())
                .collect::<Vec<_>>()
                .join(", "),
            Self::Composable {
                start,
                stop,
                tokens,
            } => {
                let end = stop.saturating_add(1).min(sql.len());
                let mut nested = tokens.clone();
                nested.sort_by_key(Self::start);
                validate_tokens(sql, &nested)?;
                let mut out = String::new();
                let mut cursor = *start;
                for token in &nested {
                    if token.start() < cursor || token.start() > end {
                        return Err(RewriteError::OverlappingTokens(token.start()));
                    }
                    let resume = token.resume_index(sql.len());
                    if resume > end {
                        return Err(RewriteError::OverlappingTokens(token.start()));
                    }
                    out.push_str(&sql[cursor .. token.start()]);
                    out.push_str(&token.render(sql, unit)?);
                    cursor = resume;
                }
                if cursor < end {
                    out.push_str(&sql[cursor .. end]);
                }
                out
            }
        };
        Ok(text)
    }
}

/// Returns true when `row` belongs to `unit`.
fn row_matches(row: &InsertValueRow, unit: Option<&RouteUnit>) -> bool {
    let Some(unit) = unit else {
        return true;
    };
    row.data_nodes.is_empty()
        || row
            .data_nodes
            .iter()
            .any(|node| unit.find_table_mapper(&node.data_source, &node.table).is_some())
}

/// Checks that sorted tokens lie inside `sql`, on character boundaries, and
/// do not overlap.
///
/// # Errors
/// Returns [`RewriteError::TokenOutOfBounds`] or
/// [`RewriteError::OverlappingTokens`].
pub fn validate_tokens(sql: &str, tokens: &[SqlToken]) -> Result<(), RewriteError> {
    let mut previous_end = 0_usize;
    for token in tokens {
        let start = token.start();
        let stop = token.stop().unwrap_or(start);
        let end = token.stop().map_or(start, |stop| stop.saturating_add(1));
        let out_of_bounds = end > sql.len()
            || (token.stop().is_some() && stop < start)
            || !sql.is_char_boundary(start)
            || !sql.is_char_boundary(end);
        if out_of_bounds {
            return Err(RewriteError::TokenOutOfBounds {
                start,
                stop,
                len: sql.len(),
            });
        }
        if start < previous_end {
            return Err(RewriteError::OverlappingTokens(start));
        }
        previous_end = end;
    }
    Ok(())
}
