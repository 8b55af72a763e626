// crates/shardline-core/src/runtime/algorithm/key_generate.rs
// ============================================================================
// Module: Key Generation Algorithms
// Description: Built-in generators for INSERT rows that omit their key column.
// Purpose: Produce monotonically increasing keys without external coordination.
// Dependencies: crate::{core, interfaces}
// ============================================================================

//! ## Overview
//! `INCREMENT` hands out `start`, `start + 1`, ... from an atomic counter.
//! Keys are unique per generator instance only; nothing is persisted.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::atomic::AtomicI64;
use std::sync::atomic::Ordering;

use crate::core::AlgorithmError;
use crate::core::ShardingValue;
use crate::interfaces::KeyGenerateAlgorithm;
use crate::runtime::algorithm::props;
use crate::runtime::algorithm::props::AlgorithmProps;

/// First-key option.
pub const START: &str = "start";

/// `INCREMENT` key generator.
#[derive(Debug)]
pub struct IncrementKeyGenerateAlgorithm {
    /// Next key to hand out.
    next: AtomicI64,
}

impl IncrementKeyGenerateAlgorithm {
    /// Registry type tag.
    pub const TYPE: &'static str = "INCREMENT";

    /// Builds the generator; `start` defaults to 1.
    ///
    /// # Errors
    /// Returns [`AlgorithmError::Initialization`] when `start` is not an integer.
    pub fn new(options: &AlgorithmProps) -> Result<Self, AlgorithmError> {
        Ok(Self {
            next: AtomicI64::new(props::int_or(options, Self::TYPE, START, 1)?),
        })
    }
}

impl KeyGenerateAlgorithm for IncrementKeyGenerateAlgorithm {
    fn generate_key(&self) -> ShardingValue {
        ShardingValue::Int(self.next.fetch_add(1, Ordering::Relaxed))
    }
}
