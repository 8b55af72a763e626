// crates/shardline-core/src/runtime/kernel.rs
// ============================================================================
// Module: Kernel Processor
// Description: Route, rewrite, and build the execution context for a statement.
// Purpose: Run the pipeline stages in order and emit routing events.
// Dependencies: crate::{core, interfaces, runtime::{route, rewrite}}, serde
// ============================================================================

//! ## Overview
//! [`KernelProcessor::generate_execution_context`] routes a query, rewrites
//! it per route unit, and returns one [`ExecutionUnit`] per rewrite unit. It
//! records a `route_completed` event for every statement and, when
//! `sql_show` is enabled, a `sql_show` event listing either the target data
//! sources (`sql_simple`) or every actual SQL with its parameters.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;

use serde::Deserialize;
use serde::Serialize;

use crate::core::ActualSql;
use crate::core::ExecutionContext;
use crate::core::ExecutionUnit;
use crate::core::KernelError;
use crate::core::KernelEvent;
use crate::core::QueryContext;
use crate::core::SqlRewriteContext;
use crate::core::SqlUnit;
use crate::core::Topology;
use crate::interfaces::KernelEventSink;
use crate::runtime::rewrite::SqlRewriteEngine;
use crate::runtime::route::SqlRouteEngine;

// ============================================================================
// SECTION: Properties
// ============================================================================

/// Kernel-wide properties.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct KernelProps {
    /// Connections allowed per storage unit per query.
    pub max_connections_size_per_query: usize,
    /// Worker pool size; zero means available parallelism.
    pub kernel_executor_size: usize,
    /// Emit `sql_show` events.
    pub sql_show: bool,
    /// Only list data sources in `sql_show` events.
    pub sql_simple: bool,
}

impl Default for KernelProps {
    fn default() -> Self {
        Self {
            max_connections_size_per_query: 1,
            kernel_executor_size: 0,
            sql_show: false,
            sql_simple: false,
        }
    }
}

// ============================================================================
// SECTION: Processor
// ============================================================================

/// Route-then-rewrite pipeline front.
#[derive(Clone)]
pub struct KernelProcessor {
    /// Router chain.
    route_engine: SqlRouteEngine,
    /// Rewrite engine.
    rewrite_engine: SqlRewriteEngine,
    /// Kernel properties.
    props: KernelProps,
    /// Event destination.
    sink: Arc<dyn KernelEventSink>,
}

impl KernelProcessor {
    /// Creates a processor.
    #[must_use]
    pub fn new(
        route_engine: SqlRouteEngine,
        rewrite_engine: SqlRewriteEngine,
        props: KernelProps,
        sink: Arc<dyn KernelEventSink>,
    ) -> Self {
        Self {
            route_engine,
            rewrite_engine,
            props,
            sink,
        }
    }

    /// Kernel properties.
    #[must_use]
    pub const fn props(&self) -> &KernelProps {
        &self.props
    }

    /// Routes and rewrites `query` into an execution context.
    ///
    /// # Errors
    /// Returns [`KernelError::Route`] or [`KernelError::Rewrite`] from the
    /// failing stage.
    pub fn generate_execution_context(
        &self,
        query: &QueryContext,
        rewrite: &SqlRewriteContext,
        topology: &Topology,
    ) -> Result<ExecutionContext, KernelError> {
        let route = self.route_engine.route(query, topology)?;
        self.sink.record(&KernelEvent::RouteCompleted {
            database: topology.database_name.clone(),
            route_units: route.route_units().len(),
            data_sources: route.actual_data_source_names().into_iter().map(str::to_string).collect(),
        });

        let rewritten = self.rewrite_engine.rewrite(query, rewrite, &route, topology)?;
        let execution_units: Vec<ExecutionUnit> = rewritten
            .units
            .into_iter()
            .map(|(route_unit, unit)| ExecutionUnit {
                data_source: route_unit.data_source_name().to_string(),
                sql_unit: SqlUnit {
                    sql: unit.sql,
                    params: unit.params,
                    table_route_mappers: route_unit.table_mappers,
                },
            })
            .collect();

        if self.props.sql_show {
            self.show_sql(query, &execution_units);
        }
        let generated_keys = route.generated_keys.clone();
        Ok(ExecutionContext {
            query: query.clone(),
            execution_units,
            route_context: route,
            generated_keys,
        })
    }

    /// Records the `sql_show` event.
    fn show_sql(&self, query: &QueryContext, units: &[ExecutionUnit]) {
        let event = if self.props.sql_simple {
            let mut data_sources: Vec<String> = Vec::new();
            for unit in units {
                if !data_sources.contains(&unit.data_source) {
                    data_sources.push(unit.data_source.clone());
                }
            }
            KernelEvent::SqlShow {
                logic_sql: query.sql.clone(),
                data_sources,
                actual: Vec::new(),
            }
        } else {
            KernelEvent::SqlShow {
                logic_sql: query.sql.clone(),
                data_sources: Vec::new(),
                actual: units
                    .iter()
                    .map(|unit| ActualSql {
                        data_source: unit.data_source.clone(),
                        sql: unit.sql_unit.sql.clone(),
                        params: unit.sql_unit.params.iter().map(ToString::to_string).collect(),
                    })
                    .collect(),
            }
        };
        self.sink.record(&event);
    }
}
