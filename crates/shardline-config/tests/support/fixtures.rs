// crates/shardline-config/tests/support/fixtures.rs
// ============================================================================
// Module: Test Fixtures
// Description: Sample configuration documents and temp-file helpers.
// ============================================================================
//! ## Overview
//! [`SHARDING_TOML`] declares bound `t_order`/`t_order_item` tables over the
//! readwrite group `ds_0` (backed by `write_ds_0` and `read_ds_0`) and the
//! `PostgreSQL` unit `ds_1`, with generated order ids and a DML auditor.

use std::fs;
use std::path::PathBuf;

use tempfile::TempDir;

use super::TestResult;

/// Smallest valid configuration.
pub const MINIMAL_TOML: &str = r#"
[database.storage_units.ds_0]
dialect = "MySQL"
"#;

/// Full sharding configuration.
pub const SHARDING_TOML: &str = r#"
[props]
max_connections_size_per_query = 2
sql_show = true

[database]
name = "sharding_db"

[database.storage_units.write_ds_0]
dialect = "MySQL"

[database.storage_units.read_ds_0]
dialect = "MySQL"

[database.storage_units.ds_1]
dialect = "PostgreSQL"

[[readwrite_splitting.groups]]
name = "ds_0"
write_storage_unit = "write_ds_0"
read_storage_units = ["read_ds_0"]
load_balancer = "ROUND_ROBIN"

[sharding]
default_sharding_column = "user_id"
binding_tables = [["t_order", "t_order_item"]]
broadcast_tables = ["t_config"]

[sharding.default_database_strategy]
algorithm = "database_inline"

[sharding.tables.t_order]
actual_data_nodes = 'ds_${0..1}.t_order_${0..1}'
table_strategy = { sharding_columns = ["order_id"], algorithm = "t_order_inline" }
key_generate_strategy = { column = "order_id", key_generator = "increment" }

[sharding.tables.t_order_item]
actual_data_nodes = 'ds_${0..1}.t_order_item_${0..1}'
table_strategy = { sharding_columns = ["order_id"], algorithm = "t_order_item_inline" }

[sharding.sharding_algorithms.database_inline]
type = "INLINE"
props = { algorithm-expression = 'ds_${user_id % 2}' }

[sharding.sharding_algorithms.t_order_inline]
type = "INLINE"
props = { algorithm-expression = 't_order_${order_id % 2}' }

[sharding.sharding_algorithms.t_order_item_inline]
type = "INLINE"
props = { algorithm-expression = 't_order_item_${order_id % 2}' }

[sharding.key_generators.increment]
type = "INCREMENT"
props = { start = "100" }

[sharding.auditors.sharding_key_required]
type = "DML_SHARDING_CONDITIONS"

[sharding.audit_strategy]
auditor_names = ["sharding_key_required"]
"#;

/// Writes `contents` to `shardline.toml` in a fresh temp dir.
///
/// The directory must outlive the returned path.
pub fn write_config(contents: &[u8]) -> TestResult<(TempDir, PathBuf)> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("shardline.toml");
    fs::write(&path, contents)?;
    Ok((dir, path))
}
