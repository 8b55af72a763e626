// crates/shardline-core/src/runtime/algorithm/props.rs
// ============================================================================
// Module: Algorithm Properties
// Description: String-keyed option bags and typed accessors.
// Purpose: Fail closed on missing or malformed algorithm options at build time.
// Dependencies: crate::core::AlgorithmError
// ============================================================================

//! ## Overview
//! Algorithms are configured with string options such as
//! `algorithm-expression` or `sharding-count`. Accessors here convert and
//! validate them, reporting an [`AlgorithmError::Initialization`] naming the
//! algorithm and the offending key.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;

use crate::core::AlgorithmError;

// ============================================================================
// SECTION: Option Keys
// ============================================================================

/// Template option key.
pub const ALGORITHM_EXPRESSION: &str = "algorithm-expression";
/// Allow-range option key.
pub const ALLOW_RANGE_QUERY: &str = "allow-range-query-with-inline-sharding";
/// Expected columns option key (complex algorithms).
pub const SHARDING_COLUMNS: &str = "sharding-columns";
/// Shard count option key (modulo algorithms).
pub const SHARDING_COUNT: &str = "sharding-count";

/// Algorithm options.
pub type AlgorithmProps = BTreeMap<String, String>;

// ============================================================================
// SECTION: Accessors
// ============================================================================

/// Returns a required, non-blank option.
///
/// # Errors
/// Returns [`AlgorithmError::Initialization`] when the option is missing or blank.
pub fn required<'a>(
    props: &'a AlgorithmProps,
    algorithm: &str,
    key: &str,
) -> Result<&'a str, AlgorithmError> {
    match props.get(key).map(|value| value.trim()) {
        Some(value) if !value.is_empty() => Ok(value),
        _ => Err(AlgorithmError::init(algorithm, format!("`{key}` is required"))),
    }
}

/// Returns a boolean option, or `default` when absent.
///
/// # Errors
/// Returns [`AlgorithmError::Initialization`] when the value is not `true`/`false`.
pub fn boolean(
    props: &AlgorithmProps,
    algorithm: &str,
    key: &str,
    default: bool,
) -> Result<bool, AlgorithmError> {
    let Some(raw) = props.get(key) else {
        return Ok(default);
    };
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" => Ok(true),
        "false" => Ok(false),
        _ => Err(AlgorithmError::init(algorithm, format!("`{key}` must be true or false"))),
    }
}

/// Returns a required positive integer option.
///
/// # Errors
/// Returns [`AlgorithmError::Initialization`] when missing, malformed, or zero.
pub fn positive_int(
    props: &AlgorithmProps,
    algorithm: &str,
    key: &str,
) -> Result<i64, AlgorithmError> {
    let raw = required(props, algorithm, key)?;
    match raw.parse::<i64>() {
        Ok(value) if value > 0 => Ok(value),
        _ => Err(AlgorithmError::init(algorithm, format!("`{key}` must be a positive integer"))),
    }
}

/// Returns an integer option, or `default` when absent.
///
/// # Errors
/// Returns [`AlgorithmError::Initialization`] when the value is malformed.
pub fn int_or(
    props: &AlgorithmProps,
    algorithm: &str,
    key: &str,
    default: i64,
) -> Result<i64, AlgorithmError> {
    props.get(key).map_or(Ok(default), |raw| {
        raw.trim()
            .parse::<i64>()
            .map_err(|_| AlgorithmError::init(algorithm, format!("`{key}` must be an integer")))
    })
}

/// Splits a comma-separated list, trimming and dropping blanks.
#[must_use]
pub fn list(props: &AlgorithmProps, key: &str) -> Vec<String> {
    props
        .get(key)
        .map(|raw| {
            raw.split(',')
                .map(str::trim)
                .filter(|item| !item.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}
