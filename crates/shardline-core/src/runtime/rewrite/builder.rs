// crates/shardline-core/src/runtime/rewrite/builder.rs
// ============================================================================
// Module: SQL Builder
// Description: Rebuilds SQL text from the logical SQL and its tokens.
// Purpose: Produce byte-exact per-route-unit SQL without re-parsing.
// Dependencies: crate::core
// ============================================================================

//! ## Overview
//! Text before the first token and between tokens is copied verbatim. Each
//! token contributes its own text for the route unit. Copying resumes after
//! a token's span, or at its start for insertion tokens.

// ============================================================================
// SECTION: Imports
// ============================================================================

use crate::core::RewriteError;
use crate::core::RouteUnit;
use crate::core::SqlToken;
use crate::core::token::validate_tokens;

/// Rebuilds `sql` for `unit` (or generically when `unit` is `None`).
///
/// # Errors
/// Returns [`RewriteError::TokenOutOfBounds`] or
/// [`RewriteError::OverlappingTokens`] for malformed tokens.
pub fn build_sql(
    sql: &str,
    tokens: &[SqlToken],
    unit: Option<&RouteUnit>,
) -> Result<String, RewriteError> {
    let mut sorted = tokens.to_vec();
    sorted.sort_by_key(SqlToken::start);
    let Some(first) = sorted.first() else {
        return Ok(sql.to_string());
    };
    validate_tokens(sql, &sorted)?;

    let mut out = String::with_capacity(sql.len());
    out.push_str(&sql[.. first.start()]);
    for (index, token) in sorted.iter().enumerate() {
        out.push_str(&token.render(sql, unit)?);
        let resume = token.resume_index(sql.len());
        let next = sorted.get(index + 1).map_or(sql.len(), SqlToken::start);
        if resume < next {
            out.push_str(&sql[resume .. next]);
        }
    }
    Ok(out)
}

/// Drops one trailing semicolon.
#[must_use]
pub fn trim_semicolon(sql: &str) -> &str {
    sql.strip_suffix(';').unwrap_or(sql)
}
