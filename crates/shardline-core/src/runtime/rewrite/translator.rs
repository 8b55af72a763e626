// crates/shardline-core/src/runtime/rewrite/translator.rs
// ============================================================================
// Module: Dialect Translation
// Description: Translator registry keyed by storage dialect.
// Purpose: Adapt rewritten SQL to the dialect of its target storage unit.
// Dependencies: crate::{core, interfaces}
// ============================================================================

//! ## Overview
//! [`TranslatorRule`] knows the frontend dialect clients speak. Units bound
//! for a storage unit of the same dialect pass through untouched; others go
//! through the translator registered for the target dialect, or the native
//! (identity) translator when none is registered.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use crate::core::DatabaseType;
use crate::core::QueryContext;
use crate::core::SqlRewriteUnit;
use crate::core::TranslationError;
use crate::interfaces::SqlTranslator;

// ============================================================================
// SECTION: Built-in Translators
// ============================================================================

/// Identity translator.
#[derive(Debug, Clone, Copy, Default)]
pub struct NativeSqlTranslator;

impl SqlTranslator for NativeSqlTranslator {
    fn translate(
        &self,
        unit: SqlRewriteUnit,
        _query: &QueryContext,
        _target: DatabaseType,
    ) -> Result<SqlRewriteUnit, TranslationError> {
        Ok(unit)
    }
}

/// Rewrites back-quoted identifiers to ANSI double quotes.
///
/// Single-quoted literals (with `\'` and `''` escapes) and comments are
/// copied untouched. A double-quoted literal has no ANSI spelling that keeps
/// its meaning, so it is rejected.
#[derive(Debug, Clone, Copy, Default)]
pub struct IdentifierQuoteTranslator;

impl SqlTranslator for IdentifierQuoteTranslator {
    fn translate(
        &self,
        unit: SqlRewriteUnit,
        _query: &QueryContext,
        target: DatabaseType,
    ) -> Result<SqlRewriteUnit, TranslationError> {
        if !target.uses_ansi_quotes() {
            return Ok(unit);
        }
        let mut sql = String::with_capacity(unit.sql.len());
        let mut state = ScanState::Code;
        let mut chars = unit.sql.chars().peekable();
        while let Some(ch) = chars.next() {
            sql.push(ch);
            match state {
                ScanState::Code => match ch {
                    '\'' => state = ScanState::Literal,
                    '#' => state = ScanState::LineComment,
                    '-' if chars.peek() == Some(&'-') => state = ScanState::LineComment,
                    '/' if chars.peek() == Some(&'*') => {
                        sql.extend(chars.next());
                        state = ScanState::BlockComment;
                    }
                    '`' => {
                        sql.pop();
                        sql.push('"');
                    }
                    '"' => {
                        return Err(TranslationError::Unsupported {
                            dialect: target.name().to_string(),
                            reason: "double-quoted string literals are identifiers in ANSI SQL"
                                .to_string(),
                        });
                    }
                    _ => {}
                },
                ScanState::Literal => match ch {
                    '\\' => sql.extend(chars.next()),
                    '\'' if chars.peek() == Some(&'\'') => sql.extend(chars.next()),
                    '\'' => state = ScanState::Code,
                    _ => {}
                },
                ScanState::LineComment => {
                    if ch == '\n' {
                        state = ScanState::Code;
                    }
                }
                ScanState::BlockComment => {
                    if ch == '*' && chars.peek() == Some(&'/') {
                        sql.extend(chars.next());
                        state = ScanState::Code;
                    }
                }
            }
        }
        Ok(SqlRewriteUnit {
            sql,
            params: unit.params,
        })
    }
}

/// Lexical position of the quote scanner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScanState {
    /// Plain SQL text.
    Code,
    /// Inside a single-quoted literal.
    Literal,
    /// Inside a `--` or `#` comment.
    LineComment,
    /// Inside a `/* */` comment.
    BlockComment,
}

// ============================================================================
// SECTION: Translator Rule
// ============================================================================

/// Translators keyed by target dialect.
#[derive(Clone)]
pub struct TranslatorRule {
    /// Dialect clients speak.
    frontend: DatabaseType,
    /// Registered translators.
    translators: BTreeMap<DatabaseType, Arc<dyn SqlTranslator>>,
    /// Translator for unregistered dialects.
    fallback: Arc<dyn SqlTranslator>,
}

impl Default for TranslatorRule {
    fn default() -> Self {
        Self::new(DatabaseType::default())
    }
}

impl fmt::Debug for TranslatorRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TranslatorRule")
            .field("frontend", &self.frontend)
            .field("targets", &self.translators.keys().collect::<Vec<_>>())
            .finish_non_exhaustive()
    }
}

impl TranslatorRule {
    /// Creates a rule with only the native translator.
    #[must_use]
    pub fn new(frontend: DatabaseType) -> Self {
        Self {
            frontend,
            translators: BTreeMap::new(),
            fallback: Arc::new(NativeSqlTranslator),
        }
    }

    /// Creates a rule with the identifier-quote translator registered for
    /// every ANSI-quoting dialect.
    #[must_use]
    pub fn with_builtins(frontend: DatabaseType) -> Self {
        let mut rule = Self::new(frontend);
        let quotes: Arc<dyn SqlTranslator> = Arc::new(IdentifierQuoteTranslator);
        for target in [
            DatabaseType::PostgreSql,
            DatabaseType::OpenGauss,
            DatabaseType::Oracle,
            DatabaseType::Sql92,
        ] {
            rule.translators.insert(target, Arc::clone(&quotes));
        }
        rule
    }

    /// Registers a translator for `target`.
    #[must_use]
    pub fn with_translator(mut self, target: DatabaseType, translator: Arc<dyn SqlTranslator>) -> Self {
        self.translators.insert(target, translator);
        self
    }

    /// Frontend dialect.
    #[must_use]
    pub const fn frontend(&self) -> DatabaseType {
        self.frontend
    }

    /// Translates `unit` for `target`.
    ///
    /// # Errors
    /// Returns the translator's [`TranslationError`] unchanged.
    pub fn translate(
        &self,
        unit: SqlRewriteUnit,
        query: &QueryContext,
        target: DatabaseType,
    ) -> Result<SqlRewriteUnit, TranslationError> {
        if target == self.frontend {
            return Ok(unit);
        }
        self.translators.get(&target).unwrap_or(&self.fallback).translate(unit, query, target)
    }
}
