// crates/shardline-expr/src/template.rs
// ============================================================================
// Module: Inline Templates
// Description: Literal text interleaved with `${ expr }` placeholders.
// Purpose: Compute shard/table names and expand data-node declarations.
// Dependencies: crate::{error, eval, syntax, value}
// ============================================================================

//! ## Overview
//! A template such as `t_order_${order_id % 4}` is parsed once into
//! segments and evaluated many times. `$->{ expr }` is accepted as an alias
//! for `${ expr }`.
//!
//! Evaluation renders each placeholder's value with [`Value`]'s `Display`
//! and concatenates. Expansion takes the Cartesian product of every
//! placeholder's expanded values, left to right, so
//! `ds_${0..1}.t_${[0, 2]}` yields `ds_0.t_0`, `ds_0.t_2`, `ds_1.t_0`,
//! `ds_1.t_2`.

use std::collections::BTreeSet;

use crate::error::ExprError;
use crate::eval::MAX_EXPANSION;
use crate::eval::VariableResolver;
use crate::eval::evaluate;
use crate::eval::expand;
use crate::syntax::Expr;
use crate::syntax::parse_expression;

// ============================================================================
// SECTION: Limits
// ============================================================================

/// Maximum template size in bytes.
pub const MAX_TEMPLATE_BYTES: usize = 64 * 1024;

// ============================================================================
// SECTION: Template Model
// ============================================================================

/// One piece of a parsed template.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    /// Verbatim text.
    Literal(String),
    /// Parsed placeholder body.
    Placeholder(Expr),
}

/// Parsed inline template.
///
/// # Invariants
/// - `source` is the normalized text (`$->{` rewritten to `${`).
/// - Adjacent literal text is stored as one segment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InlineTemplate {
    /// Normalized template text.
    source: String,
    /// Parsed segments in template order.
    segments: Vec<Segment>,
}

impl InlineTemplate {
    /// Parses a template.
    ///
    /// # Errors
    /// Returns [`ExprError::EmptyInput`] for blank input,
    /// [`ExprError::InputTooLarge`] above [`MAX_TEMPLATE_BYTES`],
    /// [`ExprError::UnterminatedPlaceholder`] for an unclosed `${`, and any
    /// parse error of a placeholder body.
    pub fn parse(template: &str) -> Result<Self, ExprError> {
        if template.len() > MAX_TEMPLATE_BYTES {
            return Err(ExprError::InputTooLarge {
                max_bytes: MAX_TEMPLATE_BYTES,
                actual_bytes: template.len(),
            });
        }
        if template.trim().is_empty() {
            return Err(ExprError::EmptyInput);
        }
        let source = handle_placeholder(template);
        let mut segments = Vec::new();
        let mut literal = String::new();
        let mut offset = 0;

        while let Some(found) = source[offset ..].find("${") {
            let open = offset + found;
            literal.push_str(&source[offset .. open]);
            let body_start = open + 2;
            let close = find_placeholder_end(&source, body_start).ok_or(
                ExprError::UnterminatedPlaceholder {
                    position: open,
                },
            )?;
            if !literal.is_empty() {
                segments.push(Segment::Literal(std::mem::take(&mut literal)));
            }
            let expr = parse_expression(&source[body_start .. close], body_start)?;
            segments.push(Segment::Placeholder(expr));
            offset = close + 1;
        }
        literal.push_str(&source[offset ..]);
        if !literal.is_empty() {
            segments.push(Segment::Literal(literal));
        }

        Ok(Self {
            source,
            segments,
        })
    }

    /// Returns the normalized template text.
    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Returns the distinct variable names referenced by placeholders.
    #[must_use]
    pub fn variables(&self) -> BTreeSet<&str> {
        let mut names = Vec::new();
        for segment in &self.segments {
            if let Segment::Placeholder(expr) = segment {
                expr.collect_variables(&mut names);
            }
        }
        names.into_iter().collect()
    }

    /// Returns true when a placeholder references `name`.
    #[must_use]
    pub fn references(&self, name: &str) -> bool {
        self.variables().contains(name)
    }

    /// Returns true when the template has no placeholders.
    #[must_use]
    pub fn is_constant(&self) -> bool {
        self.segments.iter().all(|segment| matches!(segment, Segment::Literal(_)))
    }

    /// Renders the template to a single string.
    ///
    /// # Errors
    /// Returns [`ExprError`] when any placeholder fails to evaluate.
    pub fn evaluate(&self, vars: &dyn VariableResolver) -> Result<String, ExprError> {
        let mut out = String::with_capacity(self.source.len());
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => out.push_str(text),
                Segment::Placeholder(expr) => out.push_str(&evaluate(expr, vars)?.to_string()),
            }
        }
        Ok(out)
    }

    /// Expands the template into every string it denotes.
    ///
    /// # Errors
    /// Returns [`ExprError::ExpansionTooLarge`] when the product exceeds
    /// [`MAX_EXPANSION`], plus any evaluation error.
    pub fn expand(&self, vars: &dyn VariableResolver) -> Result<Vec<String>, ExprError> {
        let mut results = vec![String::new()];
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => {
                    for result in &mut results {
                        result.push_str(text);
                    }
                }
                Segment::Placeholder(expr) => {
                    let values = expand(expr, vars)?;
                    if results.len().saturating_mul(values.len()) > MAX_EXPANSION {
                        return Err(ExprError::ExpansionTooLarge {
                            max_values: MAX_EXPANSION,
                        });
                    }
                    let mut next = Vec::with_capacity(results.len() * values.len());
                    for prefix in &results {
                        for value in &values {
                            next.push(format!("{prefix}{value}"));
                        }
                    }
                    results = next;
                }
            }
        }
        Ok(results)
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Rewrites `$->{` placeholders to `${`.
#[must_use]
pub fn handle_placeholder(template: &str) -> String {
    template.replace("$->{", "${")
}

/// Splits `input` on commas outside placeholders and expands each part.
///
/// Parts are trimmed; empty parts are ignored.
///
/// # Errors
/// Returns [`ExprError`] when any part fails to parse or expand.
pub fn split_and_expand(
    input: &str,
    vars: &dyn VariableResolver,
) -> Result<Vec<String>, ExprError> {
    let normalized = handle_placeholder(input);
    let mut results = Vec::new();
    for part in split_top_level(&normalized)? {
        let part = part.trim();
        if part.is_empty() {
            continue;
        }
        results.extend(InlineTemplate::parse(part)?.expand(vars)?);
        if results.len() > MAX_EXPANSION {
            return Err(ExprError::ExpansionTooLarge {
                max_values: MAX_EXPANSION,
            });
        }
    }
    Ok(results)
}

/// Splits on commas that are not inside a `${ ... }` placeholder.
fn split_top_level(input: &str) -> Result<Vec<&str>, ExprError> {
    let mut parts = Vec::new();
    let mut start = 0;
    let mut offset = 0;
    let bytes = input.as_bytes();
    while offset < bytes.len() {
        if bytes[offset ..].starts_with(b"${") {
            let close = find_placeholder_end(input, offset + 2).ok_or(
                ExprError::UnterminatedPlaceholder {
                    position: offset,
                },
            )?;
            offset = close + 1;
            continue;
        }
        if bytes[offset] == b',' {
            parts.push(&input[start .. offset]);
            start = offset + 1;
        }
        offset += 1;
    }
    parts.push(&input[start ..]);
    Ok(parts)
}

/// Finds the byte index of the `}` closing a placeholder body.
///
/// Braces inside quoted strings are ignored; nested braces are balanced.
fn find_placeholder_end(source: &str, body_start: usize) -> Option<usize> {
    let bytes = source.as_bytes();
    let mut depth = 0_usize;
    let mut quote: Option<u8> = None;
    let mut index = body_start;
    while let Some(&b) = bytes.get(index) {
        match quote {
            Some(_) if b == b'\\' => index += 1,
            Some(q) if b == q => quote = None,
            Some(_) => {}
            None => match b {
                b'\'' | b'"' => quote = Some(b),
                b'{' => depth += 1,
                b'}' if depth == 0 => return Some(index),
                b'}' => depth -= 1,
                _ => {}
            },
        }
        index += 1;
    }
    None
}
