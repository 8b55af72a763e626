// crates/shardline-config/src/config.rs
// ============================================================================
// Module: Shardline Configuration
// Description: Configuration loading, validation, and runtime rule assembly.
// Purpose: Provide strict, fail-closed config parsing with hard limits.
// Dependencies: shardline-core, serde, toml
// ============================================================================

//! ## Overview
//! Configuration is loaded from a TOML file with strict size and path limits.
//! Unknown keys, dangling algorithm references, and data nodes on unknown
//! storage units fail closed at load time, before any statement is routed.
//!
//! A validated [`ShardlineConfig`] is turned into a [`ShardlineRuntime`]:
//! the sharding rule, the readwrite rule, the topology, and kernel props,
//! plus helpers wiring them into route, rewrite, and execution engines.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::collections::BTreeSet;
use std::env;
use std::fs;
use std::path::Path;
use std::path::PathBuf;
use std::sync::Arc;

use serde::Deserialize;
use shardline_core::core::AlgorithmError;
use shardline_core::core::DatabaseType;
use shardline_core::core::ExecutionError;
use shardline_core::core::Topology;
use shardline_core::interfaces::KernelEventSink;
use shardline_core::interfaces::KeyGenerateAlgorithm;
use shardline_core::interfaces::SqlRouter;
use shardline_core::runtime::AlgorithmConfig;
use shardline_core::runtime::AlgorithmRegistry;
use shardline_core::runtime::AuditStrategy;
use shardline_core::runtime::ExecutorEngine;
use shardline_core::runtime::KernelProcessor;
use shardline_core::runtime::KernelProps;
use shardline_core::runtime::KeyGenerateStrategy;
use shardline_core::runtime::ReadwriteSplittingRouter;
use shardline_core::runtime::ReadwriteSplittingRule;
use shardline_core::runtime::ShardingAlgorithm;
use shardline_core::runtime::ShardingCacheOptions;
use shardline_core::runtime::ShardingRule;
use shardline_core::runtime::ShardingSqlRouter;
use shardline_core::runtime::ShardingStrategy;
use shardline_core::runtime::SqlRewriteEngine;
use shardline_core::runtime::SqlRouteEngine;
use shardline_core::runtime::TableRule;
use shardline_core::runtime::TranslatorRule;
use shardline_core::runtime::route::ReadwriteSplittingGroup;
use shardline_core::runtime::route::ShardingDmlValidator;
use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default configuration filename when no path is specified.
const DEFAULT_CONFIG_NAME: &str = "shardline.toml";
/// Environment variable used to override the config path.
pub(crate) const CONFIG_ENV_VAR: &str = "SHARDLINE_CONFIG";
/// Maximum configuration file size in bytes.
pub(crate) const MAX_CONFIG_FILE_SIZE: usize = 1024 * 1024;
/// Maximum length of a single path component.
pub(crate) const MAX_PATH_COMPONENT_LENGTH: usize = 255;
/// Maximum total path length.
pub(crate) const MAX_TOTAL_PATH_LENGTH: usize = 4096;
/// Default logical database name.
const DEFAULT_DATABASE_NAME: &str = "logic_db";

// ============================================================================
// SECTION: Configuration Types
// ============================================================================

/// Shardline configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ShardlineConfig {
    /// Kernel properties.
    #[serde(default)]
    pub props: KernelProps,
    /// Logical database and its storage units.
    #[serde(default)]
    pub database: DatabaseConfig,
    /// Sharding rule declaration.
    #[serde(default)]
    pub sharding: ShardingConfig,
    /// Readwrite splitting declaration.
    #[serde(default)]
    pub readwrite_splitting: ReadwriteSplittingConfig,
}

impl ShardlineConfig {
    /// Loads configuration from disk using the default resolution rules.
    ///
    /// The path is `path` when given, else `$SHARDLINE_CONFIG`, else
    /// `shardline.toml` in the working directory.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when loading or validation fails.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        Self::load_with(path, &AlgorithmRegistry::with_builtins())
    }

    /// Loads configuration, validating algorithms against `registry`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when loading or validation fails.
    pub fn load_with(path: Option<&Path>, registry: &AlgorithmRegistry) -> Result<Self, ConfigError> {
        let resolved = resolve_path(path)?;
        validate_path(&resolved)?;
        let bytes = fs::read(&resolved).map_err(|err| ConfigError::Io(err.to_string()))?;
        if bytes.len() > MAX_CONFIG_FILE_SIZE {
            return Err(ConfigError::Invalid("config file exceeds size limit".to_string()));
        }
        let content = std::str::from_utf8(&bytes)
            .map_err(|_| ConfigError::Invalid("config file must be utf-8".to_string()))?;
        let config = Self::from_toml(content)?;
        config.validate_with(registry)?;
        Ok(config)
    }

    /// Parses configuration text without validating it.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] for malformed TOML or unknown keys.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|err| ConfigError::Parse(err.to_string()))
    }

    /// Validates the configuration against the built-in algorithms.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when configuration is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.validate_with(&AlgorithmRegistry::with_builtins())
    }

    /// Validates the configuration against `registry`.
    ///
    /// Every declared algorithm is built once, so option errors surface here
    /// rather than on the first routed statement.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when configuration is invalid.
    pub fn validate_with(&self, registry: &AlgorithmRegistry) -> Result<(), ConfigError> {
        self.build_with(registry).map(|_| ())
    }

    /// Builds the runtime against the built-in algorithms.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when configuration is invalid.
    pub fn build(&self) -> Result<ShardlineRuntime, ConfigError> {
        self.build_with(&AlgorithmRegistry::with_builtins())
    }

    /// Builds the runtime against `registry`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when configuration is invalid.
    pub fn build_with(&self, registry: &AlgorithmRegistry) -> Result<ShardlineRuntime, ConfigError> {
        if self.props.max_connections_size_per_query == 0 {
            return Err(ConfigError::Invalid(
                "props.max_connections_size_per_query must be at least 1".to_string(),
            ));
        }
        let topology = self.database.topology()?;
        let readwrite_rule = self.readwrite_splitting.build(&topology)?;
        let mut logical_sources: BTreeSet<String> = topology.names().map(str::to_lowercase).collect();
        if let Some(rule) = &readwrite_rule {
            logical_sources.extend(rule.group_names().into_iter().map(str::to_lowercase));
        }
        let sharding_rule = self.sharding.build(registry, &logical_sources)?;
        Ok(ShardlineRuntime {
            props: self.props,
            topology,
            sharding_rule: Arc::new(sharding_rule),
            readwrite_rule: readwrite_rule.map(Arc::new),
            translator: TranslatorRule::with_builtins(self.database.frontend_dialect),
        })
    }
}

/// Logical database configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DatabaseConfig {
    /// Logical database name.
    #[serde(default = "default_database_name")]
    pub name: String,
    /// Dialect clients speak.
    #[serde(default)]
    pub frontend_dialect: DatabaseType,
    /// Physical storage units keyed by name.
    #[serde(default)]
    pub storage_units: BTreeMap<String, StorageUnitConfig>,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            name: default_database_name(),
            frontend_dialect: DatabaseType::default(),
            storage_units: BTreeMap::new(),
        }
    }
}

impl DatabaseConfig {
    /// Builds the topology snapshot.
    fn topology(&self) -> Result<Topology, ConfigError> {
        if self.name.trim().is_empty() {
            return Err(ConfigError::Invalid("database.name must be non-empty".to_string()));
        }
        if self.storage_units.is_empty() {
            return Err(ConfigError::Invalid(
                "database.storage_units must declare at least one unit".to_string(),
            ));
        }
        let mut topology = Topology::new(self.name.trim());
        for (name, unit) in &self.storage_units {
            if name.trim().is_empty() || name.contains('.') {
                return Err(ConfigError::Invalid(format!(
                    "storage unit name `{name}` must be non-empty and contain no dots"
                )));
            }
            topology.insert(name.clone(), unit.dialect);
        }
        Ok(topology)
    }
}

/// One physical storage unit.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StorageUnitConfig {
    /// Storage dialect.
    #[serde(default)]
    pub dialect: DatabaseType,
}

// ============================================================================
// SECTION: Sharding Configuration
// ============================================================================

/// Sharding rule declaration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ShardingConfig {
    /// Sharding tables keyed by logic table name.
    #[serde(default)]
    pub tables: BTreeMap<String, TableConfig>,
    /// Binding groups; the first table of each group is primary.
    #[serde(default)]
    pub binding_tables: Vec<Vec<String>>,
    /// Tables replicated on every storage unit.
    #[serde(default)]
    pub broadcast_tables: Vec<String>,
    /// Database strategy for tables without their own.
    #[serde(default)]
    pub default_database_strategy: Option<StrategyConfig>,
    /// Table strategy for tables without their own.
    #[serde(default)]
    pub default_table_strategy: Option<StrategyConfig>,
    /// Column used by strategies that name none.
    #[serde(default)]
    pub default_sharding_column: Option<String>,
    /// Named sharding algorithms.
    #[serde(default)]
    pub sharding_algorithms: BTreeMap<String, AlgorithmConfig>,
    /// Named key generators.
    #[serde(default)]
    pub key_generators: BTreeMap<String, AlgorithmConfig>,
    /// Named auditors.
    #[serde(default)]
    pub auditors: BTreeMap<String, AlgorithmConfig>,
    /// Auditor selection policy.
    #[serde(default)]
    pub audit_strategy: Option<AuditStrategyConfig>,
    /// Route cache; absent disables caching.
    #[serde(default)]
    pub cache: Option<CacheConfig>,
}

/// One sharding table.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TableConfig {
    /// Inline data node declaration, e.g. `ds_${0..1}.t_order_${0..1}`.
    pub actual_data_nodes: String,
    /// Table-specific database strategy.
    #[serde(default)]
    pub database_strategy: Option<StrategyConfig>,
    /// Table-specific table strategy.
    #[serde(default)]
    pub table_strategy: Option<StrategyConfig>,
    /// Key generation binding.
    #[serde(default)]
    pub key_generate_strategy: Option<KeyGenerateStrategyConfig>,
}

/// Strategy declaration.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StrategyConfig {
    /// Sharding columns; ignored by hint algorithms.
    #[serde(default)]
    pub sharding_columns: Vec<String>,
    /// Name of an entry in `sharding.sharding_algorithms`.
    pub algorithm: String,
}

/// Key generation declaration.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct KeyGenerateStrategyConfig {
    /// Generated column.
    pub column: String,
    /// Name of an entry in `sharding.key_generators`.
    pub key_generator: String,
}

/// Auditor selection policy.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AuditStrategyConfig {
    /// Names of entries in `sharding.auditors`, in execution order.
    #[serde(default)]
    pub auditor_names: Vec<String>,
    /// Allow hints to disable auditors.
    #[serde(default = "default_true")]
    pub allow_hint_disable: bool,
}

/// Route cache bounds.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CacheConfig {
    /// Statements longer than this are never cached.
    #[serde(default = "default_cache_sql_length")]
    pub allowed_max_sql_length: usize,
    /// Maximum cached route contexts.
    #[serde(default = "default_cache_size")]
    pub maximum_size: usize,
}

impl ShardingConfig {
    /// Builds the sharding rule.
    fn build(
        &self,
        registry: &AlgorithmRegistry,
        logical_sources: &BTreeSet<String>,
    ) -> Result<ShardingRule, ConfigError> {
        let algorithms = build_named(&self.sharding_algorithms, "sharding algorithm", |config| {
            registry.build_sharding(config)
        })?;
        let key_generators = build_named(&self.key_generators, "key generator", |config| {
            registry.build_key_generator(config)
        })?;
        let auditors =
            build_named(&self.auditors, "auditor", |config| registry.build_auditor(config))?;

        let mut rule = ShardingRule::new();
        for (logic_table, table) in &self.tables {
            rule = rule.with_table_rule(self.table_rule(
                logic_table,
                table,
                &algorithms,
                &key_generators,
                logical_sources,
            )?);
        }
        for group in &self.binding_tables {
            let tables: Vec<&str> = group.iter().map(String::as_str).collect();
            rule = rule
                .with_binding_group(&tables)
                .map_err(|err| ConfigError::Invalid(format!("sharding.binding_tables: {err}")))?;
        }
        for table in &self.broadcast_tables {
            if self.tables.keys().any(|name| name.eq_ignore_ascii_case(table)) {
                return Err(ConfigError::Invalid(format!(
                    "table `{table}` cannot be both sharded and broadcast"
                )));
            }
            rule = rule.with_broadcast_table(table);
        }
        if let Some(strategy) = &self.default_database_strategy {
            rule = rule.with_default_database_strategy(self.strategy(
                "sharding.default_database_strategy",
                strategy,
                &algorithms,
            )?);
        }
        if let Some(strategy) = &self.default_table_strategy {
            rule = rule.with_default_table_strategy(self.strategy(
                "sharding.default_table_strategy",
                strategy,
                &algorithms,
            )?);
        }
        for (name, auditor) in auditors {
            rule = rule.with_auditor(&name, auditor);
        }
        if let Some(strategy) = &self.audit_strategy {
            for name in &strategy.auditor_names {
                if !self.auditors.contains_key(name) {
                    return Err(ConfigError::Invalid(format!(
                        "sharding.audit_strategy references unknown auditor `{name}`"
                    )));
                }
            }
            rule = rule.with_audit_strategy(AuditStrategy {
                auditor_names: strategy.auditor_names.clone(),
                allow_hint_disable: strategy.allow_hint_disable,
            });
        }
        if let Some(cache) = self.cache {
            if cache.maximum_size == 0 {
                return Err(ConfigError::Invalid(
                    "sharding.cache.maximum_size must be at least 1".to_string(),
                ));
            }
            rule = rule.with_cache(ShardingCacheOptions {
                allowed_max_sql_length: cache.allowed_max_sql_length,
                maximum_size: cache.maximum_size,
            });
        }
        Ok(rule)
    }

    /// Builds one table rule and checks its data nodes.
    fn table_rule(
        &self,
        logic_table: &str,
        table: &TableConfig,
        algorithms: &BTreeMap<String, ShardingAlgorithm>,
        key_generators: &BTreeMap<String, Arc<dyn KeyGenerateAlgorithm>>,
        logical_sources: &BTreeSet<String>,
    ) -> Result<TableRule, ConfigError> {
        let field = format!("sharding.tables.{logic_table}");
        let mut rule = TableRule::from_expression(logic_table, &table.actual_data_nodes)
            .map_err(|err| ConfigError::Invalid(format!("{field}: {err}")))?;
        for data_source in rule.actual_data_source_names() {
            if !logical_sources.contains(&data_source.to_lowercase()) {
                return Err(ConfigError::Invalid(format!(
                    "{field} references unknown storage unit `{data_source}`"
                )));
            }
        }
        if let Some(strategy) = &table.database_strategy {
            rule = rule.with_database_strategy(self.strategy(
                &format!("{field}.database_strategy"),
                strategy,
                algorithms,
            )?);
        }
        if let Some(strategy) = &table.table_strategy {
            rule = rule.with_table_strategy(self.strategy(
                &format!("{field}.table_strategy"),
                strategy,
                algorithms,
            )?);
        }
        if let Some(key_generate) = &table.key_generate_strategy {
            let generator = key_generators.get(&key_generate.key_generator).ok_or_else(|| {
                ConfigError::Invalid(format!(
                    "{field} references unknown key generator `{}`",
                    key_generate.key_generator
                ))
            })?;
            if key_generate.column.trim().is_empty() {
                return Err(ConfigError::Invalid(format!(
                    "{field}.key_generate_strategy.column must be non-empty"
                )));
            }
            rule = rule.with_key_generate(KeyGenerateStrategy {
                column: key_generate.column.trim().to_string(),
                generator: Arc::clone(generator),
            });
        }
        Ok(rule)
    }

    /// Binds a strategy declaration to its built algorithm.
    fn strategy(
        &self,
        field: &str,
        strategy: &StrategyConfig,
        algorithms: &BTreeMap<String, ShardingAlgorithm>,
    ) -> Result<ShardingStrategy, ConfigError> {
        let algorithm = algorithms.get(&strategy.algorithm).ok_or_else(|| {
            ConfigError::Invalid(format!(
                "{field} references unknown sharding algorithm `{}`",
                strategy.algorithm
            ))
        })?;
        let mut columns: Vec<String> = strategy
            .sharding_columns
            .iter()
            .map(|column| column.trim().to_string())
            .filter(|column| !column.is_empty())
            .collect();
        if columns.is_empty()
            && !matches!(algorithm, ShardingAlgorithm::Hint(_))
            && let Some(column) = &self.default_sharding_column
        {
            columns.push(column.trim().to_string());
        }
        ShardingStrategy::new(&columns, algorithm.clone())
            .map_err(|err| ConfigError::Invalid(format!("{field}: {err}")))
    }
}

// ============================================================================
// SECTION: Readwrite Splitting Configuration
// ============================================================================

/// Readwrite splitting declaration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ReadwriteSplittingConfig {
    /// Logical readwrite groups.
    #[serde(default)]
    pub groups: Vec<ReadwriteSplittingGroup>,
}

impl ReadwriteSplittingConfig {
    /// Builds the readwrite rule; `None` when no group is declared.
    fn build(&self, topology: &Topology) -> Result<Option<ReadwriteSplittingRule>, ConfigError> {
        if self.groups.is_empty() {
            return Ok(None);
        }
        let mut names: BTreeSet<String> = BTreeSet::new();
        for group in &self.groups {
            let name = group.name.trim();
            if name.is_empty() {
                return Err(ConfigError::Invalid(
                    "readwrite_splitting group name must be non-empty".to_string(),
                ));
            }
            if !names.insert(name.to_lowercase()) {
                return Err(ConfigError::Invalid(format!(
                    "readwrite_splitting group `{name}` is declared twice"
                )));
            }
            for unit in std::iter::once(&group.write_storage_unit).chain(&group.read_storage_units) {
                if !topology.contains(unit) {
                    return Err(ConfigError::Invalid(format!(
                        "readwrite_splitting group `{name}` references unknown storage unit `{unit}`"
                    )));
                }
            }
        }
        Ok(Some(ReadwriteSplittingRule::new(self.groups.clone())))
    }
}

// ============================================================================
// SECTION: Runtime
// ============================================================================

/// Runtime assembled from a validated configuration.
#[derive(Debug, Clone)]
pub struct ShardlineRuntime {
    /// Kernel properties.
    pub props: KernelProps,
    /// Storage unit snapshot.
    pub topology: Topology,
    /// Sharding rule.
    pub sharding_rule: Arc<ShardingRule>,
    /// Readwrite rule, when groups are declared.
    pub readwrite_rule: Option<Arc<ReadwriteSplittingRule>>,
    /// Dialect translators.
    pub translator: TranslatorRule,
}

impl ShardlineRuntime {
    /// Route engine: sharding first, then readwrite splitting.
    #[must_use]
    pub fn route_engine(&self) -> SqlRouteEngine {
        let sharding = ShardingSqlRouter::new(Arc::clone(&self.sharding_rule))
            .with_validator(Arc::new(ShardingDmlValidator::new(Arc::clone(&self.sharding_rule))));
        let mut routers: Vec<Arc<dyn SqlRouter>> = vec![Arc::new(sharding)];
        if let Some(rule) = &self.readwrite_rule {
            routers.push(Arc::new(ReadwriteSplittingRouter::new(Arc::clone(rule))));
        }
        SqlRouteEngine::new(routers)
    }

    /// Rewrite engine using the configured translators.
    #[must_use]
    pub fn rewrite_engine(&self) -> SqlRewriteEngine {
        SqlRewriteEngine::new(self.translator.clone())
    }

    /// Kernel processor reporting to `sink`.
    #[must_use]
    pub fn kernel(&self, sink: Arc<dyn KernelEventSink>) -> KernelProcessor {
        KernelProcessor::new(self.route_engine(), self.rewrite_engine(), self.props, sink)
    }

    /// Executor sized by `props.kernel_executor_size`.
    ///
    /// # Errors
    ///
    /// Returns [`ExecutionError::PoolInitialization`] when the pool cannot start.
    pub fn executor(&self, sink: Arc<dyn KernelEventSink>) -> Result<ExecutorEngine, ExecutionError> {
        ExecutorEngine::new(self.props.kernel_executor_size, sink)
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// I/O failure while reading configuration.
    #[error("config io error: {0}")]
    Io(String),
    /// TOML parsing error.
    #[error("config parse error: {0}")]
    Parse(String),
    /// Invalid configuration data.
    #[error("invalid config: {0}")]
    Invalid(String),
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Resolves the config path from the caller or environment defaults.
fn resolve_path(path: Option<&Path>) -> Result<PathBuf, ConfigError> {
    if let Some(path) = path {
        return Ok(path.to_path_buf());
    }
    if let Ok(env_path) = env::var(CONFIG_ENV_VAR) {
        if env_path.len() > MAX_TOTAL_PATH_LENGTH {
            return Err(ConfigError::Invalid("config path exceeds max length".to_string()));
        }
        return Ok(PathBuf::from(env_path));
    }
    Ok(PathBuf::from(DEFAULT_CONFIG_NAME))
}

/// Validates the resolved path against length limits.
fn validate_path(path: &Path) -> Result<(), ConfigError> {
    let text = path.to_string_lossy();
    if text.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(ConfigError::Invalid("config path exceeds max length".to_string()));
    }
    for component in path.components() {
        let value = component.as_os_str().to_string_lossy();
        if value.len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(ConfigError::Invalid("config path component too long".to_string()));
        }
    }
    Ok(())
}

/// Builds every named algorithm, naming the entry on failure.
fn build_named<T>(
    declared: &BTreeMap<String, AlgorithmConfig>,
    family: &str,
    build: impl Fn(&AlgorithmConfig) -> Result<T, AlgorithmError>,
) -> Result<BTreeMap<String, T>, ConfigError> {
    let mut built = BTreeMap::new();
    for (name, config) in declared {
        let algorithm = build(config)
            .map_err(|err| ConfigError::Invalid(format!("{family} `{name}`: {err}")))?;
        built.insert(name.clone(), algorithm);
    }
    Ok(built)
}

/// Default logical database name.
fn default_database_name() -> String {
    DEFAULT_DATABASE_NAME.to_string()
}

/// Serde default for opt-out flags.
const fn default_true() -> bool {
    true
}

/// Default cached SQL length.
fn default_cache_sql_length() -> usize {
    ShardingCacheOptions::default().allowed_max_sql_length
}

/// Default cache capacity.
fn default_cache_size() -> usize {
    ShardingCacheOptions::default().maximum_size
}

// ============================================================================
// SECTION: Tests
// ============================================================================
