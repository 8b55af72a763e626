// crates/shardline-core/src/runtime/rule.rs
// ============================================================================
// Module: Sharding Rule
// Description: Table rules, binding groups, broadcast tables, and audit policy.
// Purpose: Answer every "how is this table sharded" question during routing.
// Dependencies: crate::{core, interfaces, runtime::strategy}, shardline-expr
// ============================================================================

//! ## Overview
//! A [`ShardingRule`] is assembled once (usually from configuration) and
//! shared read-only by every statement. Table names are matched
//! case-insensitively; actual data nodes keep their declared spelling.
//!
//! ### Invariants
//! - Every table in a binding group has a table rule.
//! - A table rule always has at least one actual data node.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::collections::BTreeSet;
use std::sync::Arc;

use serde::Deserialize;
use serde::Serialize;
use shardline_expr::NoVariables;
use shardline_expr::split_and_expand;

use crate::core::DataNode;
use crate::core::HintValueContext;
use crate::core::RuleError;
use crate::interfaces::KeyGenerateAlgorithm;
use crate::interfaces::ShardingAuditAlgorithm;
use crate::runtime::strategy::ShardingStrategy;

// ============================================================================
// SECTION: Table Rule
// ============================================================================

/// Key generation binding for a table.
#[derive(Debug, Clone)]
pub struct KeyGenerateStrategy {
    /// Column receiving generated keys.
    pub column: String,
    /// Generator.
    pub generator: Arc<dyn KeyGenerateAlgorithm>,
}

/// Sharding layout of one logic table.
#[derive(Debug, Clone)]
pub struct TableRule {
    /// Logic table name.
    logic_table: String,
    /// Actual data nodes in declaration order.
    actual_data_nodes: Vec<DataNode>,
    /// Table-specific database strategy; the rule default applies when absent.
    database_strategy: Option<ShardingStrategy>,
    /// Table-specific table strategy; the rule default applies when absent.
    table_strategy: Option<ShardingStrategy>,
    /// Key generation binding.
    key_generate: Option<KeyGenerateStrategy>,
}

impl TableRule {
    /// Creates a rule over explicit data nodes.
    ///
    /// # Errors
    /// Returns [`RuleError::InvalidDataNodes`] when `nodes` is empty.
    pub fn new(logic_table: &str, nodes: Vec<DataNode>) -> Result<Self, RuleError> {
        if nodes.is_empty() {
            return Err(RuleError::InvalidDataNodes {
                table: logic_table.to_string(),
                reason: "no data nodes".to_string(),
            });
        }
        Ok(Self {
            logic_table: logic_table.to_string(),
            actual_data_nodes: nodes,
            database_strategy: None,
            table_strategy: None,
            key_generate: None,
        })
    }

    /// Creates a rule from an inline declaration such as
    /// `ds_${0..1}.t_order_${0..1}`.
    ///
    /// # Errors
    /// Returns [`RuleError::InvalidDataNodes`] when the declaration does not
    /// expand or an entry is not `data_source.table`.
    pub fn from_expression(logic_table: &str, expression: &str) -> Result<Self, RuleError> {
        let invalid = |reason: String| RuleError::InvalidDataNodes {
            table: logic_table.to_string(),
            reason,
        };
        let expanded = split_and_expand(expression, &NoVariables).map_err(|err| invalid(err.to_string()))?;
        let mut nodes: Vec<DataNode> = Vec::with_capacity(expanded.len());
        for entry in expanded {
            let node = DataNode::parse(&entry)
                .ok_or_else(|| invalid(format!("`{entry}` is not data_source.table")))?;
            if !nodes.contains(&node) {
                nodes.push(node);
            }
        }
        Self::new(logic_table, nodes)
    }

    /// Sets the database strategy.
    #[must_use]
    pub fn with_database_strategy(mut self, strategy: ShardingStrategy) -> Self {
        self.database_strategy = Some(strategy);
        self
    }

    /// Sets the table strategy.
    #[must_use]
    pub fn with_table_strategy(mut self, strategy: ShardingStrategy) -> Self {
        self.table_strategy = Some(strategy);
        self
    }

    /// Sets the key generation binding.
    #[must_use]
    pub fn with_key_generate(mut self, key_generate: KeyGenerateStrategy) -> Self {
        self.key_generate = Some(key_generate);
        self
    }

    /// Logic table name.
    #[must_use]
    pub fn logic_table(&self) -> &str {
        &self.logic_table
    }

    /// Actual data nodes.
    #[must_use]
    pub fn actual_data_nodes(&self) -> &[DataNode] {
        &self.actual_data_nodes
    }

    /// Key generation binding.
    #[must_use]
    pub const fn key_generate(&self) -> Option<&KeyGenerateStrategy> {
        self.key_generate.as_ref()
    }

    /// Data sources hosting this table, in declaration order.
    #[must_use]
    pub fn actual_data_source_names(&self) -> Vec<String> {
        let mut names: Vec<String> = Vec::new();
        for node in &self.actual_data_nodes {
            if !names.contains(&node.data_source) {
                names.push(node.data_source.clone());
            }
        }
        names
    }

    /// Actual tables hosted on `data_source`, in declaration order.
    #[must_use]
    pub fn actual_table_names(&self, data_source: &str) -> Vec<String> {
        self.actual_data_nodes
            .iter()
            .filter(|node| node.data_source.eq_ignore_ascii_case(data_source))
            .map(|node| node.table.clone())
            .collect()
    }

    /// Position of `actual_table` among the tables on `data_source`.
    fn table_index(&self, data_source: &str, actual_table: &str) -> Option<usize> {
        self.actual_table_names(data_source)
            .iter()
            .position(|table| table.eq_ignore_ascii_case(actual_table))
    }
}

// ============================================================================
// SECTION: Policies
// ============================================================================

/// Which auditors run, and whether hints may disable them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditStrategy {
    /// Auditor names in execution order.
    pub auditor_names: Vec<String>,
    /// Allow `disabled_auditor_names` hints to skip auditors.
    pub allow_hint_disable: bool,
}

impl Default for AuditStrategy {
    fn default() -> Self {
        Self {
            auditor_names: Vec::new(),
            allow_hint_disable: true,
        }
    }
}

/// Route cache bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShardingCacheOptions {
    /// Statements longer than this are never cached.
    pub allowed_max_sql_length: usize,
    /// Maximum cached route contexts.
    pub maximum_size: usize,
}

impl Default for ShardingCacheOptions {
    fn default() -> Self {
        Self {
            allowed_max_sql_length: 512,
            maximum_size: 262_144,
        }
    }
}

// ============================================================================
// SECTION: Sharding Rule
// ============================================================================

/// Complete sharding configuration for one logical database.
#[derive(Debug, Clone, Default)]
pub struct ShardingRule {
    /// Logical data source names; derived from table rules when empty.
    data_source_names: Vec<String>,
    /// Table rules keyed by lower-cased logic table.
    table_rules: BTreeMap<String, TableRule>,
    /// Binding groups of lower-cased logic tables; the first is primary.
    binding_groups: Vec<Vec<String>>,
    /// Lower-cased broadcast tables.
    broadcast_tables: BTreeSet<String>,
    /// Fallback database strategy.
    default_database_strategy: ShardingStrategy,
    /// Fallback table strategy.
    default_table_strategy: ShardingStrategy,
    /// Named auditors.
    auditors: BTreeMap<String, Arc<dyn ShardingAuditAlgorithm>>,
    /// Auditor selection policy.
    audit_strategy: AuditStrategy,
    /// Route cache bounds; `None` disables caching.
    cache: Option<ShardingCacheOptions>,
}

impl ShardingRule {
    /// Creates an empty rule.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the logical data source names used by broadcast routes.
    #[must_use]
    pub fn with_data_sources(mut self, names: Vec<String>) -> Self {
        self.data_source_names = names;
        self
    }

    /// Adds a table rule, replacing any rule for the same table.
    #[must_use]
    pub fn with_table_rule(mut self, rule: TableRule) -> Self {
        self.table_rules.insert(rule.logic_table.to_lowercase(), rule);
        self
    }

    /// Adds a binding group.
    ///
    /// # Errors
    /// Returns [`RuleError::UnknownTable`] when a table has no table rule.
    pub fn with_binding_group(mut self, tables: &[&str]) -> Result<Self, RuleError> {
        let mut group: Vec<String> = Vec::with_capacity(tables.len());
        for table in tables {
            let key = table.to_lowercase();
            if !self.table_rules.contains_key(&key) {
                return Err(RuleError::UnknownTable((*table).to_string()));
            }
            if !group.contains(&key) {
                group.push(key);
            }
        }
        self.binding_groups.push(group);
        Ok(self)
    }

    /// Adds a broadcast table.
    #[must_use]
    pub fn with_broadcast_table(mut self, table: &str) -> Self {
        self.broadcast_tables.insert(table.to_lowercase());
        self
    }

    /// Sets the fallback database strategy.
    #[must_use]
    pub fn with_default_database_strategy(mut self, strategy: ShardingStrategy) -> Self {
        self.default_database_strategy = strategy;
        self
    }

    /// Sets the fallback table strategy.
    #[must_use]
    pub fn with_default_table_strategy(mut self, strategy: ShardingStrategy) -> Self {
        self.default_table_strategy = strategy;
        self
    }

    /// Registers a named auditor.
    #[must_use]
    pub fn with_auditor(mut self, name: &str, auditor: Arc<dyn ShardingAuditAlgorithm>) -> Self {
        self.auditors.insert(name.to_string(), auditor);
        self
    }

    /// Sets the auditor selection policy.
    #[must_use]
    pub fn with_audit_strategy(mut self, strategy: AuditStrategy) -> Self {
        self.audit_strategy = strategy;
        self
    }

    /// Enables the route cache.
    #[must_use]
    pub const fn with_cache(mut self, options: ShardingCacheOptions) -> Self {
        self.cache = Some(options);
        self
    }

    /// Logical data sources: configured names, else those of table rules.
    #[must_use]
    pub fn data_source_names(&self) -> Vec<String> {
        if !self.data_source_names.is_empty() {
            return self.data_source_names.clone();
        }
        let mut names: Vec<String> = Vec::new();
        for rule in self.table_rules.values() {
            for name in rule.actual_data_source_names() {
                if !names.contains(&name) {
                    names.push(name);
                }
            }
        }
        names
    }

    /// Table rule for `logic_table`.
    #[must_use]
    pub fn table_rule(&self, logic_table: &str) -> Option<&TableRule> {
        self.table_rules.get(&logic_table.to_lowercase())
    }

    /// Returns true when `table` has a table rule.
    #[must_use]
    pub fn is_sharding_table(&self, table: &str) -> bool {
        self.table_rule(table).is_some()
    }

    /// Returns true when `table` is a broadcast table.
    #[must_use]
    pub fn is_broadcast_table(&self, table: &str) -> bool {
        self.broadcast_tables.contains(&table.to_lowercase())
    }

    /// Returns true when `tables` is non-empty and every table is broadcast.
    #[must_use]
    pub fn is_all_broadcast(&self, tables: &[String]) -> bool {
        !tables.is_empty() && tables.iter().all(|table| self.is_broadcast_table(table))
    }

    /// The sharding tables among `tables`, in order, without duplicates.
    #[must_use]
    pub fn sharding_tables(&self, tables: &[String]) -> Vec<String> {
        let mut result: Vec<String> = Vec::new();
        for table in tables {
            if self.is_sharding_table(table)
                && !result.iter().any(|known| known.eq_ignore_ascii_case(table))
            {
                result.push(table.clone());
            }
        }
        result
    }

    /// Effective database strategy of `rule`.
    #[must_use]
    pub fn database_strategy<'a>(&'a self, rule: &'a TableRule) -> &'a ShardingStrategy {
        rule.database_strategy.as_ref().unwrap_or(&self.default_database_strategy)
    }

    /// Effective table strategy of `rule`.
    #[must_use]
    pub fn table_strategy<'a>(&'a self, rule: &'a TableRule) -> &'a ShardingStrategy {
        rule.table_strategy.as_ref().unwrap_or(&self.default_table_strategy)
    }

    /// Returns true when `column` feeds either strategy of `table`.
    #[must_use]
    pub fn is_sharding_column(&self, table: &str, column: &str) -> bool {
        self.table_rule(table).is_some_and(|rule| {
            self.database_strategy(rule)
                .sharding_columns()
                .into_iter()
                .chain(self.table_strategy(rule).sharding_columns())
                .any(|candidate| candidate.eq_ignore_ascii_case(column))
        })
    }

    /// Binding group containing `table`.
    #[must_use]
    pub fn binding_group(&self, table: &str) -> Option<&[String]> {
        let key = table.to_lowercase();
        self.binding_groups.iter().find(|group| group.contains(&key)).map(Vec::as_slice)
    }

    /// Returns true when every table shares one binding group.
    #[must_use]
    pub fn is_all_binding(&self, tables: &[String]) -> bool {
        let Some(first) = tables.first() else {
            return false;
        };
        self.binding_group(first).is_some_and(|group| {
            tables.iter().all(|table| group.contains(&table.to_lowercase()))
        })
    }

    /// Maps `primary_actual` of `primary` to the same position for `binding`.
    ///
    /// Tables in one binding group are laid out identically per data source,
    /// so the n-th actual table of one is paired with the n-th of the other.
    #[must_use]
    pub fn binding_actual_table(
        &self,
        data_source: &str,
        primary: &str,
        primary_actual: &str,
        binding: &str,
    ) -> Option<String> {
        let index = self.table_rule(primary)?.table_index(data_source, primary_actual)?;
        self.table_rule(binding)?.actual_table_names(data_source).into_iter().nth(index)
    }

    /// Auditors to run for a statement with `hint`, in configured order.
    #[must_use]
    pub fn active_auditors(
        &self,
        hint: &HintValueContext,
    ) -> Vec<(&str, &Arc<dyn ShardingAuditAlgorithm>)> {
        self.audit_strategy
            .auditor_names
            .iter()
            .filter(|name| {
                !(self.audit_strategy.allow_hint_disable
                    && hint.disabled_auditor_names.contains(name.as_str()))
            })
            .filter_map(|name| {
                self.auditors.get(name).map(|auditor| (name.as_str(), auditor))
            })
            .collect()
    }

    /// Route cache bounds, when caching is enabled.
    #[must_use]
    pub const fn cache_options(&self) -> Option<ShardingCacheOptions> {
        self.cache
    }
}
