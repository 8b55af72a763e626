// crates/shardline-expr/tests/proptest_modulo.rs
// ============================================================================
// Module: Modulo Template Property-Based Tests
// Description: Property tests for modulo templates and range expansion.
// Purpose: Check evaluator arithmetic against native integer semantics.
// ============================================================================

//! Property-based tests for inline template arithmetic.

#![allow(
    clippy::panic,
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only assertions and helpers are permitted."
)]

use std::collections::BTreeMap;

use proptest::prelude::*;
use shardline_expr::InlineTemplate;
use shardline_expr::NoVariables;
use shardline_expr::Value;

proptest! {
    #[test]
    fn modulo_template_matches_native_remainder(id in any::<i64>(), count in 1_i64 .. 64) {
        let template = InlineTemplate::parse(&format!("ds_${{id % {count}}}")).unwrap();
        let mut vars = BTreeMap::new();
        vars.insert("id".to_string(), Value::Int(id));
        let rendered = template.evaluate(&vars).unwrap();
        prop_assert_eq!(rendered, format!("ds_{}", id % count));
    }

    #[test]
    fn range_expansion_has_inclusive_cardinality(start in -50_i64 .. 50, len in 0_i64 .. 50) {
        let end = start + len;
        let template = InlineTemplate::parse(&format!("t_${{{start}..{end}}}")).unwrap();
        let expanded = template.expand(&NoVariables).unwrap();
        prop_assert_eq!(expanded.len(), usize::try_from(len + 1).unwrap());
        prop_assert_eq!(expanded.first().cloned(), Some(format!("t_{start}")));
        prop_assert_eq!(expanded.last().cloned(), Some(format!("t_{end}")));
    }

    #[test]
    fn parser_never_panics_on_arbitrary_input(input in ".{0,64}") {
        let _ = InlineTemplate::parse(&input);
    }
}
