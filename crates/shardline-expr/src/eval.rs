// crates/shardline-expr/src/eval.rs
// ============================================================================
// Module: Inline Expression Evaluation
// Description: Evaluates parsed expressions against a variable resolver.
// Purpose: Provide deterministic, overflow-checked evaluation and expansion.
// Dependencies: crate::{error, syntax, value}
// ============================================================================

//! ## Overview
//! Evaluation is pure: the only input besides the tree is a
//! [`VariableResolver`]. Integer arithmetic is checked and `%` keeps the sign
//! of the dividend, so `-3 % 2 == -1`. `+` concatenates when either side is a
//! string, which is what data-source naming templates rely on.
//!
//! Expansion ([`expand`]) is the multi-valued counterpart used for data-node
//! declarations such as `ds_${0..1}.t_order_${[0, 2]}`.

use std::collections::BTreeMap;
use std::collections::HashMap;
use std::hash::BuildHasher;

use crate::error::ExprError;
use crate::syntax::BinaryOp;
use crate::syntax::Expr;
use crate::syntax::UnaryOp;
use crate::value::Value;

// ============================================================================
// SECTION: Limits
// ============================================================================

/// Maximum number of values a single expansion may produce.
pub const MAX_EXPANSION: usize = 65_536;

// ============================================================================
// SECTION: Variable Resolution
// ============================================================================

/// Supplies variable values during evaluation.
pub trait VariableResolver {
    /// Returns the value bound to `name`, if any.
    fn resolve(&self, name: &str) -> Option<Value>;
}

impl<S: BuildHasher> VariableResolver for HashMap<String, Value, S> {
    fn resolve(&self, name: &str) -> Option<Value> {
        self.get(name).cloned()
    }
}

impl VariableResolver for BTreeMap<String, Value> {
    fn resolve(&self, name: &str) -> Option<Value> {
        self.get(name).cloned()
    }
}

impl<F> VariableResolver for F
where
    F: Fn(&str) -> Option<Value>,
{
    fn resolve(&self, name: &str) -> Option<Value> {
        self(name)
    }
}

/// Resolver with no bindings, used for constant templates.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoVariables;

impl VariableResolver for NoVariables {
    fn resolve(&self, _name: &str) -> Option<Value> {
        None
    }
}

// ============================================================================
// SECTION: Scalar Evaluation
// ============================================================================

/// Evaluates `expr` to a single value.
///
/// # Errors
/// Returns [`ExprError::UnknownVariable`] for unbound variables,
/// [`ExprError::NotScalar`] for ranges or lists, and arithmetic or type
/// errors as they occur.
pub fn evaluate(expr: &Expr, vars: &dyn VariableResolver) -> Result<Value, ExprError> {
    match expr {
        Expr::Literal(value) => Ok(value.clone()),
        Expr::Variable(name) => {
            vars.resolve(name).ok_or_else(|| ExprError::UnknownVariable(name.clone()))
        }
        Expr::Unary {
            op,
            operand,
        } => {
            let value = evaluate(operand, vars)?;
            match op {
                UnaryOp::Not => Ok(Value::Bool(!value.is_truthy())),
                UnaryOp::Negate => match value {
                    Value::Int(n) => n
                        .checked_neg()
                        .map(Value::Int)
                        .ok_or_else(|| ExprError::ArithmeticOverflow("-".to_string())),
                    other => Err(ExprError::TypeMismatch {
                        operation: "-".to_string(),
                        operands: other.kind().to_string(),
                    }),
                },
            }
        }
        Expr::Binary {
            op: BinaryOp::And,
            left,
            right,
        } => {
            if !evaluate(left, vars)?.is_truthy() {
                return Ok(Value::Bool(false));
            }
            Ok(Value::Bool(evaluate(right, vars)?.is_truthy()))
        }
        Expr::Binary {
            op: BinaryOp::Or,
            left,
            right,
        } => {
            if evaluate(left, vars)?.is_truthy() {
                return Ok(Value::Bool(true));
            }
            Ok(Value::Bool(evaluate(right, vars)?.is_truthy()))
        }
        Expr::Binary {
            op,
            left,
            right,
        } => {
            let lhs = evaluate(left, vars)?;
            let rhs = evaluate(right, vars)?;
            apply_binary(*op, lhs, rhs)
        }
        Expr::Ternary {
            condition,
            then,
            otherwise,
        } => {
            if evaluate(condition, vars)?.is_truthy() {
                evaluate(then, vars)
            } else {
                evaluate(otherwise, vars)
            }
        }
        Expr::Call {
            name,
            args,
        } => {
            let values = args.iter().map(|arg| evaluate(arg, vars)).collect::<Result<Vec<_>, _>>()?;
            call_builtin(name, values)
        }
        Expr::Range {
            ..
        }
        | Expr::List(_) => Err(ExprError::NotScalar),
    }
}

/// Applies a non-short-circuit binary operator.
fn apply_binary(op: BinaryOp, lhs: Value, rhs: Value) -> Result<Value, ExprError> {
    match op {
        BinaryOp::Eq => return Ok(Value::Bool(lhs == rhs)),
        BinaryOp::Ne => return Ok(Value::Bool(lhs != rhs)),
        BinaryOp::Add => {
            if matches!(lhs, Value::Str(_)) || matches!(rhs, Value::Str(_)) {
                return Ok(Value::Str(format!("{lhs}{rhs}")));
            }
        }
        _ => {}
    }

    match (&lhs, &rhs) {
        (Value::Int(a), Value::Int(b)) => int_binary(op, *a, *b),
        (Value::Str(a), Value::Str(b)) => compare(op, a.cmp(b)).ok_or_else(|| mismatch(op, &lhs, &rhs)),
        _ => Err(mismatch(op, &lhs, &rhs)),
    }
}

/// Integer arithmetic and comparison.
fn int_binary(op: BinaryOp, a: i64, b: i64) -> Result<Value, ExprError> {
    if let Some(result) = compare(op, a.cmp(&b)) {
        return Ok(result);
    }
    let overflow = || ExprError::ArithmeticOverflow(op.symbol().to_string());
    let result = match op {
        BinaryOp::Add => a.checked_add(b).ok_or_else(overflow)?,
        BinaryOp::Sub => a.checked_sub(b).ok_or_else(overflow)?,
        BinaryOp::Mul => a.checked_mul(b).ok_or_else(overflow)?,
        BinaryOp::Div | BinaryOp::Rem if b == 0 => return Err(ExprError::DivisionByZero),
        BinaryOp::Div => a.checked_div(b).ok_or_else(overflow)?,
        BinaryOp::Rem => a.checked_rem(b).ok_or_else(overflow)?,
        _ => {
            return Err(ExprError::TypeMismatch {
                operation: op.symbol().to_string(),
                operands: "int and int".to_string(),
            });
        }
    };
    Ok(Value::Int(result))
}

/// Maps a relational operator onto an ordering; `None` for non-relational ops.
fn compare(op: BinaryOp, ordering: std::cmp::Ordering) -> Option<Value> {
    let result = match op {
        BinaryOp::Lt => ordering.is_lt(),
        BinaryOp::Le => ordering.is_le(),
        BinaryOp::Gt => ordering.is_gt(),
        BinaryOp::Ge => ordering.is_ge(),
        _ => return None,
    };
    Some(Value::Bool(result))
}

/// Builds a type-mismatch error for a binary operator.
fn mismatch(op: BinaryOp, lhs: &Value, rhs: &Value) -> ExprError {
    ExprError::TypeMismatch {
        operation: op.symbol().to_string(),
        operands: format!("{} and {}", lhs.kind(), rhs.kind()),
    }
}

// ============================================================================
// SECTION: Builtins
// ============================================================================

/// Dispatches a builtin function call.
fn call_builtin(name: &str, args: Vec<Value>) -> Result<Value, ExprError> {
    match name {
        "abs" => {
            let [value] = take_args::<1>(name, "1", args)?;
            match value {
                Value::Int(n) => n
                    .checked_abs()
                    .map(Value::Int)
                    .ok_or_else(|| ExprError::ArithmeticOverflow("abs".to_string())),
                other => Err(builtin_mismatch(name, &other)),
            }
        }
        "hash" => {
            let [value] = take_args::<1>(name, "1", args)?;
            Ok(Value::Int(stable_hash(&value)))
        }
        "str" => {
            let [value] = take_args::<1>(name, "1", args)?;
            Ok(Value::Str(value.to_string()))
        }
        "lower" | "upper" => {
            let [value] = take_args::<1>(name, "1", args)?;
            match value {
                Value::Str(text) if name == "lower" => Ok(Value::Str(text.to_lowercase())),
                Value::Str(text) => Ok(Value::Str(text.to_uppercase())),
                other => Err(builtin_mismatch(name, &other)),
            }
        }
        "substr" => substr(args),
        _ => Err(ExprError::UnknownFunction(name.to_string())),
    }
}

/// `substr(text, start[, len])` over characters; out-of-range bounds clamp.
fn substr(args: Vec<Value>) -> Result<Value, ExprError> {
    let actual = args.len();
    if !(2 ..= 3).contains(&actual) {
        return Err(ExprError::ArgumentCount {
            function: "substr".to_string(),
            expected: "2 or 3",
            actual,
        });
    }
    let mut iter = args.into_iter();
    let (Some(text), Some(start)) = (iter.next(), iter.next()) else {
        return Err(ExprError::ArgumentCount {
            function: "substr".to_string(),
            expected: "2 or 3",
            actual,
        });
    };
    let len = iter.next();
    let (Value::Str(text), Value::Int(start)) = (&text, &start) else {
        return Err(ExprError::TypeMismatch {
            operation: "substr".to_string(),
            operands: format!("{} and {}", text.kind(), start.kind()),
        });
    };
    let skip = usize::try_from(*start).unwrap_or(0);
    let take = match len {
        None => usize::MAX,
        Some(Value::Int(n)) => usize::try_from(n).unwrap_or(0),
        Some(other) => return Err(builtin_mismatch("substr", &other)),
    };
    Ok(Value::Str(text.chars().skip(skip).take(take).collect()))
}

/// Destructures an exact argument count.
fn take_args<const N: usize>(
    name: &str,
    expected: &'static str,
    args: Vec<Value>,
) -> Result<[Value; N], ExprError> {
    let actual = args.len();
    args.try_into().map_err(|_| ExprError::ArgumentCount {
        function: name.to_string(),
        expected,
        actual,
    })
}

/// Builds a type-mismatch error for a builtin.
fn builtin_mismatch(name: &str, value: &Value) -> ExprError {
    ExprError::TypeMismatch {
        operation: name.to_string(),
        operands: value.kind().to_string(),
    }
}

/// Non-negative FNV-1a hash of the value's display form.
///
/// Stable across processes and platforms, unlike `std` hashers.
#[must_use]
pub fn stable_hash(value: &Value) -> i64 {
    const OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
    const PRIME: u64 = 0x0000_0100_0000_01b3;
    let mut hash = OFFSET;
    for byte in value.to_string().bytes() {
        hash ^= u64::from(byte);
        hash = hash.wrapping_mul(PRIME);
    }
    i64::try_from(hash >> 1).unwrap_or(i64::MAX)
}

// ============================================================================
// SECTION: Expansion
// ============================================================================

/// Expands `expr` into every value it denotes.
///
/// Ranges yield each integer in `start..=end` (empty when `start > end`),
/// lists yield the expansion of each element in order, and binary `+`
/// distributes over expanded operands as a Cartesian product. All other
/// expressions yield a single value.
///
/// # Errors
/// Returns [`ExprError::ExpansionTooLarge`] when more than
/// [`MAX_EXPANSION`] values would be produced, plus any scalar evaluation
/// error.
pub fn expand(expr: &Expr, vars: &dyn VariableResolver) -> Result<Vec<Value>, ExprError> {
    match expr {
        Expr::Range {
            start,
            end,
        } => {
            let start = expect_int(evaluate(start, vars)?, "..")?;
            let end = expect_int(evaluate(end, vars)?, "..")?;
            if start > end {
                return Ok(Vec::new());
            }
            let span = end.abs_diff(start);
            if span >= MAX_EXPANSION as u64 {
                return Err(ExprError::ExpansionTooLarge {
                    max_values: MAX_EXPANSION,
                });
            }
            Ok((start ..= end).map(Value::Int).collect())
        }
        Expr::List(items) => {
            let mut values = Vec::new();
            for item in items {
                values.extend(expand(item, vars)?);
                ensure_within_limit(values.len())?;
            }
            Ok(values)
        }
        Expr::Binary {
            op: BinaryOp::Add,
            left,
            right,
        } if is_expandable(left) || is_expandable(right) => {
            let lefts = expand(left, vars)?;
            let rights = expand(right, vars)?;
            ensure_within_limit(lefts.len().saturating_mul(rights.len()))?;
            let mut values = Vec::with_capacity(lefts.len() * rights.len());
            for lhs in &lefts {
                for rhs in &rights {
                    values.push(apply_binary(BinaryOp::Add, lhs.clone(), rhs.clone())?);
                }
            }
            Ok(values)
        }
        _ => Ok(vec![evaluate(expr, vars)?]),
    }
}

/// Returns true when the tree contains a range or list reachable by expansion.
fn is_expandable(expr: &Expr) -> bool {
    match expr {
        Expr::Range {
            ..
        }
        | Expr::List(_) => true,
        Expr::Binary {
            op: BinaryOp::Add,
            left,
            right,
        } => is_expandable(left) || is_expandable(right),
        _ => false,
    }
}

/// Requires an integer operand.
fn expect_int(value: Value, operation: &str) -> Result<i64, ExprError> {
    match value {
        Value::Int(n) => Ok(n),
        other => Err(ExprError::TypeMismatch {
            operation: operation.to_string(),
            operands: other.kind().to_string(),
        }),
    }
}

/// Fails when an expansion would exceed [`MAX_EXPANSION`].
const fn ensure_within_limit(count: usize) -> Result<(), ExprError> {
    if count > MAX_EXPANSION {
        return Err(ExprError::ExpansionTooLarge {
            max_values: MAX_EXPANSION,
        });
    }
    Ok(())
}
