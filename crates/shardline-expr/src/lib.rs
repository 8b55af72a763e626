// crates/shardline-expr/src/lib.rs
// ============================================================================
// Module: Inline Expression Root
// Description: Public API surface for the inline expression language.
// Purpose: Wire together the lexer, parser, evaluator, and template layer.
// Dependencies: crate::{error, eval, syntax, template, value}
// ============================================================================

//! ## Overview
//! `shardline-expr` is a small sandboxed expression language for sharding
//! templates. It replaces a general-purpose scripting engine with a bounded
//! parser and a pure evaluator over caller-supplied variables.
//!
//! ```
//! use std::collections::BTreeMap;
//!
//! use shardline_expr::InlineTemplate;
//! use shardline_expr::Value;
//!
//! let template = InlineTemplate::parse("ds_${id % 2}").unwrap();
//! let mut vars = BTreeMap::new();
//! vars.insert("id".to_string(), Value::Int(5));
//! assert_eq!(template.evaluate(&vars).unwrap(), "ds_1");
//! ```

// ============================================================================
// SECTION: Core Modules
// ============================================================================

pub mod error;
pub mod eval;
pub mod syntax;
pub mod template;
pub mod value;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use error::ExprError;
pub use eval::MAX_EXPANSION;
pub use eval::NoVariables;
pub use eval::VariableResolver;
pub use eval::evaluate;
pub use eval::expand;
pub use eval::stable_hash;
pub use syntax::BinaryOp;
pub use syntax::Expr;
pub use syntax::UnaryOp;
pub use syntax::parse_expression;
pub use template::InlineTemplate;
pub use template::MAX_TEMPLATE_BYTES;
pub use template::handle_placeholder;
pub use template::split_and_expand;
pub use value::Value;
