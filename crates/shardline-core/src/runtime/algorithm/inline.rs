// crates/shardline-core/src/runtime/algorithm/inline.rs
// ============================================================================
// Module: Inline Sharding Algorithm
// Description: Single-column algorithm driven by an inline template.
// Purpose: Map one key value to a target name, e.g. `ds_${id % 2}`.
// Dependencies: crate::{core, interfaces}, shardline-expr
// ============================================================================

//! ## Overview
//! The template must reference the configured column as a free variable.
//! Precise values are evaluated with that single binding; range values are
//! either rejected or broadcast to every available target.

// ============================================================================
// SECTION: Imports
// ============================================================================

use shardline_expr::ExprError;
use shardline_expr::InlineTemplate;
use shardline_expr::VariableResolver;

use crate::core::AlgorithmError;
use crate::core::PreciseShardingValue;
use crate::core::RangeShardingValue;
use crate::core::RouteError;
use crate::core::ShardingValue;
use crate::interfaces::StandardShardingAlgorithm;
use crate::runtime::algorithm::props;
use crate::runtime::algorithm::props::AlgorithmProps;

// ============================================================================
// SECTION: Algorithm
// ============================================================================

/// `INLINE` algorithm.
#[derive(Debug, Clone)]
pub struct InlineShardingAlgorithm {
    /// Parsed template.
    template: InlineTemplate,
    /// Broadcast ranges instead of rejecting them.
    allow_range_query: bool,
}

impl InlineShardingAlgorithm {
    /// Registry type tag.
    pub const TYPE: &'static str = "INLINE";

    /// Builds the algorithm from options.
    ///
    /// # Errors
    /// Returns [`AlgorithmError::Initialization`] when `algorithm-expression`
    /// is missing or does not parse.
    pub fn new(options: &AlgorithmProps) -> Result<Self, AlgorithmError> {
        Ok(Self {
            template: parse_template(options, Self::TYPE)?,
            allow_range_query: props::boolean(
                options,
                Self::TYPE,
                props::ALLOW_RANGE_QUERY,
                false,
            )?,
        })
    }

    /// Template text.
    #[must_use]
    pub fn expression(&self) -> &str {
        self.template.source()
    }
}

impl StandardShardingAlgorithm for InlineShardingAlgorithm {
    fn do_sharding_precise(
        &self,
        _available: &[String],
        value: &PreciseShardingValue,
    ) -> Result<Option<String>, RouteError> {
        if value.value.is_null() {
            return Err(RouteError::NullShardingValue(value.column.clone()));
        }
        if !self.template.references(&value.column) {
            return Err(RouteError::MismatchedExpression {
                expression: self.template.source().to_string(),
                column: value.column.clone(),
            });
        }
        let resolver = bind(&value.column, &value.value);
        evaluate_template(&self.template, &resolver, &value.column).map(Some)
    }

    fn do_sharding_range(
        &self,
        available: &[String],
        _value: &RangeShardingValue,
    ) -> Result<Vec<String>, RouteError> {
        if !self.allow_range_query {
            return Err(RouteError::UnsupportedRangeQuery(Self::TYPE.to_string()));
        }
        Ok(available.to_vec())
    }
}

// ============================================================================
// SECTION: Shared Helpers
// ============================================================================

/// Parses the required `algorithm-expression` option.
pub(crate) fn parse_template(
    options: &AlgorithmProps,
    algorithm: &str,
) -> Result<InlineTemplate, AlgorithmError> {
    let raw = props::required(options, algorithm, props::ALGORITHM_EXPRESSION)?;
    InlineTemplate::parse(raw).map_err(|err| {
        AlgorithmError::init(algorithm, format!("invalid `{}`: {err}", props::ALGORITHM_EXPRESSION))
    })
}

/// Evaluates `template`, reporting unbound variables as a mismatch with `columns`.
pub(crate) fn evaluate_template(
    template: &InlineTemplate,
    vars: &dyn VariableResolver,
    columns: &str,
) -> Result<String, RouteError> {
    template.evaluate(vars).map_err(|err| match err {
        ExprError::UnknownVariable(_) => RouteError::MismatchedExpression {
            expression: template.source().to_string(),
            column: columns.to_string(),
        },
        other => RouteError::Expression(other),
    })
}

/// Single-binding resolver.
pub(crate) fn bind(name: &str, value: &ShardingValue) -> impl Fn(&str) -> Option<ShardingValue> {
    let name = name.to_string();
    let value = value.clone();
    move |candidate: &str| (candidate == name).then(|| value.clone())
}
