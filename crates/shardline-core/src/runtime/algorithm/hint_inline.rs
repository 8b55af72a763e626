// crates/shardline-core/src/runtime/algorithm/hint_inline.rs
// ============================================================================
// Module: Hint Inline Sharding Algorithm
// Description: Hint-driven algorithm evaluating a template over `value`.
// Purpose: Turn caller-supplied hint values into target names.
// Dependencies: crate::{core, interfaces}, shardline-expr
// ============================================================================

//! ## Overview
//! Each hint value is bound to the variable `value`; the default template
//! `${value}` uses the hint verbatim as the target name.

// ============================================================================
// SECTION: Imports
// ============================================================================

use shardline_expr::InlineTemplate;

use crate::core::AlgorithmError;
use crate::core::HintShardingValue;
use crate::core::RouteError;
use crate::interfaces::HintShardingAlgorithm;
use crate::runtime::algorithm::inline::bind;
use crate::runtime::algorithm::inline::evaluate_template;
use crate::runtime::algorithm::props;
use crate::runtime::algorithm::props::AlgorithmProps;

/// Variable bound to each hint value.
const HINT_VARIABLE: &str = "value";

/// Template used when none is configured.
const DEFAULT_EXPRESSION: &str = "${value}";

/// `HINT_INLINE` algorithm.
#[derive(Debug, Clone)]
pub struct HintInlineShardingAlgorithm {
    /// Parsed template.
    template: InlineTemplate,
}

impl HintInlineShardingAlgorithm {
    /// Registry type tag.
    pub const TYPE: &'static str = "HINT_INLINE";

    /// Builds the algorithm from options.
    ///
    /// # Errors
    /// Returns [`AlgorithmError::Initialization`] when the template does not parse.
    pub fn new(options: &AlgorithmProps) -> Result<Self, AlgorithmError> {
        let raw = options
            .get(props::ALGORITHM_EXPRESSION)
            .map(|raw| raw.trim())
            .filter(|raw| !raw.is_empty())
            .unwrap_or(DEFAULT_EXPRESSION);
        let template = InlineTemplate::parse(raw).map_err(|err| {
            AlgorithmError::init(Self::TYPE, format!("invalid `{}`: {err}", props::ALGORITHM_EXPRESSION))
        })?;
        Ok(Self {
            template,
        })
    }
}

impl HintShardingAlgorithm for HintInlineShardingAlgorithm {
    fn do_sharding(
        &self,
        _available: &[String],
        value: &HintShardingValue,
    ) -> Result<Vec<String>, RouteError> {
        let mut targets: Vec<String> = Vec::new();
        for hint in &value.values {
            if hint.is_null() {
                return Err(RouteError::NullShardingValue(HINT_VARIABLE.to_string()));
            }
            let target = evaluate_template(&self.template, &bind(HINT_VARIABLE, hint), HINT_VARIABLE)?;
            if !targets.contains(&target) {
                targets.push(target);
            }
        }
        Ok(targets)
    }
}
