// crates/shardline-config/src/lib.rs
// ============================================================================
// Module: Shardline Config Library
// Description: Canonical config model, validation, and runtime assembly.
// Purpose: Single source of truth for shardline.toml semantics.
// Dependencies: shardline-core, serde, toml
// ============================================================================

//! ## Overview
//! `shardline-config` defines the TOML configuration model for Shardline.
//! It loads with strict size and path limits, validates every cross
//! reference fail-closed, and assembles the sharding rule, readwrite rule,
//! and topology the kernel runs against.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod config;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use config::*;
