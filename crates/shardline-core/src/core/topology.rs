// crates/shardline-core/src/core/topology.rs
// ============================================================================
// Module: Shardline Topology
// Description: Snapshot of known storage units and their dialects.
// Purpose: Validate route targets and key dialect translation.
// Dependencies: crate::core::identifiers, serde
// ============================================================================

//! ## Overview
//! A [`Topology`] is an immutable per-statement snapshot of the physical
//! storage units (shards) a logical database spans. Storage units are kept in
//! name order so iteration is deterministic.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;

use serde::Deserialize;
use serde::Serialize;

use crate::core::identifiers::DatabaseType;

// ============================================================================
// SECTION: Storage Units
// ============================================================================

/// One physical storage unit (shard).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageUnit {
    /// Storage unit name as used in data nodes.
    pub name: String,
    /// Dialect spoken by the storage unit.
    pub storage_type: DatabaseType,
}

/// Known storage units for one logical database.
///
/// # Invariants
/// - Names are unique; re-registering a name replaces the previous unit.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Topology {
    /// Logical database name.
    pub database_name: String,
    /// Storage units keyed by name.
    storage_units: BTreeMap<String, StorageUnit>,
}

impl Topology {
    /// Creates an empty topology for `database_name`.
    #[must_use]
    pub fn new(database_name: impl Into<String>) -> Self {
        Self {
            database_name: database_name.into(),
            storage_units: BTreeMap::new(),
        }
    }

    /// Adds a storage unit and returns the topology.
    #[must_use]
    pub fn with_unit(mut self, name: impl Into<String>, storage_type: DatabaseType) -> Self {
        self.insert(name, storage_type);
        self
    }

    /// Adds or replaces a storage unit.
    pub fn insert(&mut self, name: impl Into<String>, storage_type: DatabaseType) {
        let name = name.into();
        self.storage_units.insert(
            name.clone(),
            StorageUnit {
                name,
                storage_type,
            },
        );
    }

    /// Returns true when `name` is a known storage unit.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.storage_units.contains_key(name)
    }

    /// Returns the storage unit named `name`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&StorageUnit> {
        self.storage_units.get(name)
    }

    /// Returns the dialect of `name`.
    #[must_use]
    pub fn storage_type(&self, name: &str) -> Option<DatabaseType> {
        self.storage_units.get(name).map(|unit| unit.storage_type)
    }

    /// Iterates storage unit names in order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.storage_units.keys().map(String::as_str)
    }

    /// Number of storage units.
    #[must_use]
    pub fn len(&self) -> usize {
        self.storage_units.len()
    }

    /// Returns true when no storage units are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.storage_units.is_empty()
    }

    /// Returns the only storage unit name when exactly one exists.
    #[must_use]
    pub fn single_unit_name(&self) -> Option<&str> {
        if self.storage_units.len() == 1 { self.names().next() } else { None }
    }
}
