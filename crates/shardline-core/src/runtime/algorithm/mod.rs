// crates/shardline-core/src/runtime/algorithm/mod.rs
// ============================================================================
// Module: Algorithm Registry
// Description: Built-in algorithms and the type-tag registry that builds them.
// Purpose: Resolve configured algorithm tags to instances once, at load time.
// Dependencies: crate::{core, interfaces}
// ============================================================================

//! ## Overview
//! Algorithms are looked up by case-insensitive type tag (`INLINE`, `MOD`,
//! ...) in an explicit [`AlgorithmRegistry`]. Nothing is discovered
//! implicitly: callers start from [`AlgorithmRegistry::with_builtins`] and
//! register their own constructors next to the built-ins.
//!
//! ### Invariants
//! - Type tags are unique per registry and stored upper-cased.
//! - Constructors validate every option; a built algorithm never fails for
//!   configuration reasons at route time.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod audit;
pub mod complex_inline;
pub mod hint_inline;
pub mod inline;
pub mod key_generate;
pub mod modulo;
pub mod props;

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use serde::Deserialize;
use serde::Serialize;

use crate::core::AlgorithmError;
use crate::interfaces::ComplexKeysShardingAlgorithm;
use crate::interfaces::HintShardingAlgorithm;
use crate::interfaces::KeyGenerateAlgorithm;
use crate::interfaces::ShardingAuditAlgorithm;
use crate::interfaces::StandardShardingAlgorithm;

pub use audit::DmlShardingConditionsAuditAlgorithm;
pub use complex_inline::ComplexInlineShardingAlgorithm;
pub use complex_inline::flatten;
pub use hint_inline::HintInlineShardingAlgorithm;
pub use inline::InlineShardingAlgorithm;
pub use key_generate::IncrementKeyGenerateAlgorithm;
pub use modulo::HashModShardingAlgorithm;
pub use modulo::ModShardingAlgorithm;
pub use props::AlgorithmProps;

// ============================================================================
// SECTION: Algorithm Handles
// ============================================================================

/// A built sharding algorithm, tagged by the strategy shape it serves.
#[derive(Clone)]
pub enum ShardingAlgorithm {
    /// Single-column precise/range algorithm.
    Standard(Arc<dyn StandardShardingAlgorithm>),
    /// Multi-column algorithm.
    Complex(Arc<dyn ComplexKeysShardingAlgorithm>),
    /// Hint-value algorithm.
    Hint(Arc<dyn HintShardingAlgorithm>),
}

impl ShardingAlgorithm {
    /// Shape name for diagnostics.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Standard(_) => "standard",
            Self::Complex(_) => "complex",
            Self::Hint(_) => "hint",
        }
    }
}

impl fmt::Debug for ShardingAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ShardingAlgorithm::{}", self.kind())
    }
}

/// Algorithm declaration: type tag plus options.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlgorithmConfig {
    /// Registry type tag, matched case-insensitively.
    #[serde(rename = "type")]
    pub algorithm_type: String,
    /// String-keyed options.
    #[serde(default)]
    pub props: AlgorithmProps,
}

impl AlgorithmConfig {
    /// Creates a declaration without options.
    #[must_use]
    pub fn new(algorithm_type: impl Into<String>) -> Self {
        Self {
            algorithm_type: algorithm_type.into(),
            props: AlgorithmProps::new(),
        }
    }

    /// Adds one option.
    #[must_use]
    pub fn with_prop(mut self, key: &str, value: impl Into<String>) -> Self {
        self.props.insert(key.to_string(), value.into());
        self
    }
}

// ============================================================================
// SECTION: Registry
// ============================================================================

/// Constructor for sharding algorithms.
pub type ShardingConstructor = fn(&AlgorithmProps) -> Result<ShardingAlgorithm, AlgorithmError>;
/// Constructor for key generators.
pub type KeyGeneratorConstructor =
    fn(&AlgorithmProps) -> Result<Arc<dyn KeyGenerateAlgorithm>, AlgorithmError>;
/// Constructor for auditors.
pub type AuditorConstructor =
    fn(&AlgorithmProps) -> Result<Arc<dyn ShardingAuditAlgorithm>, AlgorithmError>;

/// Registry of algorithm constructors keyed by type tag.
///
/// # Invariants
/// - Tags are unique within each family.
#[derive(Debug, Clone, Default)]
pub struct AlgorithmRegistry {
    /// Sharding algorithm constructors.
    sharding: BTreeMap<String, ShardingConstructor>,
    /// Key generator constructors.
    key_generators: BTreeMap<String, KeyGeneratorConstructor>,
    /// Auditor constructors.
    auditors: BTreeMap<String, AuditorConstructor>,
}

impl AlgorithmRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry with every built-in algorithm registered.
    #[must_use]
    pub fn with_builtins() -> Self {
        let mut sharding: BTreeMap<String, ShardingConstructor> = BTreeMap::new();
        sharding.insert(InlineShardingAlgorithm::TYPE.to_string(), |options| {
            Ok(ShardingAlgorithm::Standard(Arc::new(InlineShardingAlgorithm::new(options)?)))
        });
        sharding.insert(ComplexInlineShardingAlgorithm::TYPE.to_string(), |options| {
            Ok(ShardingAlgorithm::Complex(Arc::new(ComplexInlineShardingAlgorithm::new(options)?)))
        });
        sharding.insert(HintInlineShardingAlgorithm::TYPE.to_string(), |options| {
            Ok(ShardingAlgorithm::Hint(Arc::new(HintInlineShardingAlgorithm::new(options)?)))
        });
        sharding.insert(ModShardingAlgorithm::TYPE.to_string(), |options| {
            Ok(ShardingAlgorithm::Standard(Arc::new(ModShardingAlgorithm::new(options)?)))
        });
        sharding.insert(HashModShardingAlgorithm::TYPE.to_string(), |options| {
            Ok(ShardingAlgorithm::Standard(Arc::new(HashModShardingAlgorithm::new(options)?)))
        });

        let mut key_generators: BTreeMap<String, KeyGeneratorConstructor> = BTreeMap::new();
        key_generators.insert(IncrementKeyGenerateAlgorithm::TYPE.to_string(), |options| {
            Ok(Arc::new(IncrementKeyGenerateAlgorithm::new(options)?))
        });

        let mut auditors: BTreeMap<String, AuditorConstructor> = BTreeMap::new();
        auditors.insert(DmlShardingConditionsAuditAlgorithm::TYPE.to_string(), |options| {
            Ok(Arc::new(DmlShardingConditionsAuditAlgorithm::new(options)?))
        });

        Self {
            sharding,
            key_generators,
            auditors,
        }
    }

    /// Registers a sharding algorithm constructor.
    ///
    /// # Errors
    /// Returns [`AlgorithmError::DuplicateType`] when the tag is taken.
    pub fn register_sharding(
        &mut self,
        algorithm_type: &str,
        constructor: ShardingConstructor,
    ) -> Result<(), AlgorithmError> {
        insert_unique(&mut self.sharding, algorithm_type, constructor)
    }

    /// Registers a key generator constructor.
    ///
    /// # Errors
    /// Returns [`AlgorithmError::DuplicateType`] when the tag is taken.
    pub fn register_key_generator(
        &mut self,
        algorithm_type: &str,
        constructor: KeyGeneratorConstructor,
    ) -> Result<(), AlgorithmError> {
        insert_unique(&mut self.key_generators, algorithm_type, constructor)
    }

    /// Registers an auditor constructor.
    ///
    /// # Errors
    /// Returns [`AlgorithmError::DuplicateType`] when the tag is taken.
    pub fn register_auditor(
        &mut self,
        algorithm_type: &str,
        constructor: AuditorConstructor,
    ) -> Result<(), AlgorithmError> {
        insert_unique(&mut self.auditors, algorithm_type, constructor)
    }

    /// Builds a sharding algorithm.
    ///
    /// # Errors
    /// Returns [`AlgorithmError::UnknownType`] for unregistered tags and
    /// [`AlgorithmError::Initialization`] for invalid options.
    pub fn build_sharding(&self, config: &AlgorithmConfig) -> Result<ShardingAlgorithm, AlgorithmError> {
        lookup(&self.sharding, &config.algorithm_type)?(&config.props)
    }

    /// Builds a key generator.
    ///
    /// # Errors
    /// Returns [`AlgorithmError::UnknownType`] for unregistered tags and
    /// [`AlgorithmError::Initialization`] for invalid options.
    pub fn build_key_generator(
        &self,
        config: &AlgorithmConfig,
    ) -> Result<Arc<dyn KeyGenerateAlgorithm>, AlgorithmError> {
        lookup(&self.key_generators, &config.algorithm_type)?(&config.props)
    }

    /// Builds an auditor.
    ///
    /// # Errors
    /// Returns [`AlgorithmError::UnknownType`] for unregistered tags and
    /// [`AlgorithmError::Initialization`] for invalid options.
    pub fn build_auditor(
        &self,
        config: &AlgorithmConfig,
    ) -> Result<Arc<dyn ShardingAuditAlgorithm>, AlgorithmError> {
        lookup(&self.auditors, &config.algorithm_type)?(&config.props)
    }

    /// Registered sharding algorithm tags.
    #[must_use]
    pub fn sharding_types(&self) -> Vec<&str> {
        self.sharding.keys().map(String::as_str).collect()
    }
}

/// Inserts `value` under the upper-cased tag unless it is taken.
fn insert_unique<T>(
    map: &mut BTreeMap<String, T>,
    algorithm_type: &str,
    value: T,
) -> Result<(), AlgorithmError> {
    let key = algorithm_type.trim().to_ascii_uppercase();
    if map.contains_key(&key) {
        return Err(AlgorithmError::DuplicateType(key));
    }
    map.insert(key, value);
    Ok(())
}

/// Case-insensitive tag lookup.
fn lookup<T: Copy>(map: &BTreeMap<String, T>, algorithm_type: &str) -> Result<T, AlgorithmError> {
    map.get(&algorithm_type.trim().to_ascii_uppercase())
        .copied()
        .ok_or_else(|| AlgorithmError::UnknownType(algorithm_type.to_string()))
}
