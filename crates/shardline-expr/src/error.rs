// crates/shardline-expr/src/error.rs
// ============================================================================
// Module: Inline Expression Errors
// Description: Structured diagnostics for template parsing and evaluation.
// Purpose: Give callers typed failure kinds instead of opaque evaluation panics.
// Dependencies: std::fmt
// ============================================================================

//! ## Overview
//! Every failure the expression language can produce is a variant of
//! [`ExprError`]. Parse failures carry byte offsets into the original
//! template; evaluation failures carry the offending name or operator so the
//! sharding layer can map them onto its own error kinds (for example an
//! [`ExprError::UnknownVariable`] becomes a mismatched-expression error).

use std::fmt;

// ============================================================================
// SECTION: Error Type
// ============================================================================

/// Errors raised while parsing, evaluating, or expanding inline expressions.
///
/// # Invariants
/// - Positions are byte offsets into the template as supplied by the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExprError {
    /// Input was empty or whitespace only.
    EmptyInput,
    /// Input exceeded the size limit.
    InputTooLarge {
        /// Maximum allowed bytes.
        max_bytes: usize,
        /// Actual input length in bytes.
        actual_bytes: usize,
    },
    /// Expression nesting exceeded the depth limit.
    NestingTooDeep {
        /// Maximum allowed depth.
        max_depth: usize,
        /// Byte offset where the limit was crossed.
        position: usize,
    },
    /// Unexpected token during parsing.
    UnexpectedToken {
        /// Human-friendly expectation summary.
        expected: &'static str,
        /// The token that was actually seen.
        found: String,
        /// Byte offset in the template.
        position: usize,
    },
    /// String literal without a closing quote.
    UnterminatedString {
        /// Byte offset of the opening quote.
        position: usize,
    },
    /// `${` without a matching `}`.
    UnterminatedPlaceholder {
        /// Byte offset of the `$`.
        position: usize,
    },
    /// Numeric literal failed to parse or overflowed.
    InvalidNumber {
        /// Raw literal text.
        raw: String,
        /// Byte offset in the template.
        position: usize,
    },
    /// Input continued after a complete expression.
    TrailingInput {
        /// Byte offset where trailing input begins.
        position: usize,
    },
    /// Variable was not supplied by the resolver.
    UnknownVariable(String),
    /// Function name is not a builtin.
    UnknownFunction(String),
    /// Function received the wrong number of arguments.
    ArgumentCount {
        /// Function name.
        function: String,
        /// Human-friendly arity description.
        expected: &'static str,
        /// Number of arguments supplied.
        actual: usize,
    },
    /// Operator or function applied to incompatible values.
    TypeMismatch {
        /// Operator or function name.
        operation: String,
        /// Description of the operand kinds.
        operands: String,
    },
    /// Integer division or remainder by zero.
    DivisionByZero,
    /// Integer arithmetic overflowed.
    ArithmeticOverflow(String),
    /// Range or list used where a single value is required.
    NotScalar,
    /// Expansion produced more values than allowed.
    ExpansionTooLarge {
        /// Maximum number of expanded values.
        max_values: usize,
    },
}

impl fmt::Display for ExprError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyInput => write!(f, "expression is empty"),
            Self::InputTooLarge {
                max_bytes,
                actual_bytes,
            } => write!(f, "expression exceeds size limit: {actual_bytes} bytes (max {max_bytes})"),
            Self::NestingTooDeep {
                max_depth,
                position,
            } => write!(f, "expression nesting exceeds limit {max_depth} at {position}"),
            Self::UnexpectedToken {
                expected,
                found,
                position,
            } => write!(f, "unexpected token `{found}` at {position}, expected {expected}"),
            Self::UnterminatedString {
                position,
            } => write!(f, "unterminated string literal starting at {position}"),
            Self::UnterminatedPlaceholder {
                position,
            } => write!(f, "unterminated `${{` placeholder starting at {position}"),
            Self::InvalidNumber {
                raw,
                position,
            } => write!(f, "invalid number `{raw}` at {position}"),
            Self::TrailingInput {
                position,
            } => write!(f, "unexpected trailing input at {position}"),
            Self::UnknownVariable(name) => write!(f, "unknown variable `{name}`"),
            Self::UnknownFunction(name) => write!(f, "unknown function `{name}`"),
            Self::ArgumentCount {
                function,
                expected,
                actual,
            } => write!(f, "function `{function}` expects {expected} argument(s), got {actual}"),
            Self::TypeMismatch {
                operation,
                operands,
            } => write!(f, "cannot apply `{operation}` to {operands}"),
            Self::DivisionByZero => write!(f, "division by zero"),
            Self::ArithmeticOverflow(operation) => {
                write!(f, "integer overflow in `{operation}`")
            }
            Self::NotScalar => write!(f, "range or list used where a single value is required"),
            Self::ExpansionTooLarge {
                max_values,
            } => write!(f, "expansion exceeds {max_values} values"),
        }
    }
}

impl std::error::Error for ExprError {}
