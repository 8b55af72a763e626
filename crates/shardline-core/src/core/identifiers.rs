// crates/shardline-core/src/core/identifiers.rs
// ============================================================================
// Module: Shardline Identifiers
// Description: Storage dialect tags and statement process identifiers.
// Purpose: Provide small typed identifiers with stable string forms.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! [`DatabaseType`] tags each storage unit with the SQL dialect it speaks and
//! keys dialect translation. [`ProcessId`] tags one statement's execution in
//! the process registry.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use serde::Deserialize;
use serde::Serialize;

// ============================================================================
// SECTION: Database Type
// ============================================================================

/// SQL dialect spoken by a storage unit.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub enum DatabaseType {
    /// `MySQL` and wire-compatible engines.
    #[default]
    #[serde(rename = "MySQL")]
    MySql,
    /// `PostgreSQL`.
    #[serde(rename = "PostgreSQL")]
    PostgreSql,
    /// `openGauss`.
    #[serde(rename = "openGauss")]
    OpenGauss,
    /// Oracle.
    Oracle,
    /// Microsoft SQL Server.
    #[serde(rename = "SQLServer")]
    SqlServer,
    /// H2 (embedded, tests).
    H2,
    /// Plain SQL-92.
    #[serde(rename = "SQL92")]
    Sql92,
}

impl DatabaseType {
    /// Canonical display name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::MySql => "MySQL",
            Self::PostgreSql => "PostgreSQL",
            Self::OpenGauss => "openGauss",
            Self::Oracle => "Oracle",
            Self::SqlServer => "SQLServer",
            Self::H2 => "H2",
            Self::Sql92 => "SQL92",
        }
    }

    /// Returns true for dialects that quote identifiers with double quotes.
    #[must_use]
    pub const fn uses_ansi_quotes(self) -> bool {
        matches!(self, Self::PostgreSql | Self::OpenGauss | Self::Oracle | Self::Sql92)
    }
}

impl fmt::Display for DatabaseType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ============================================================================
// SECTION: Process Identifier
// ============================================================================

/// Identifier for one statement's execution in the process registry.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProcessId(String);

impl ProcessId {
    /// Creates a new process identifier.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProcessId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<&str> for ProcessId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}
