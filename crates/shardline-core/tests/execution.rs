// crates/shardline-core/tests/execution.rs
// ============================================================================
// Test Module: Execution
// Coverage: Prepare grouping, executor ordering and errors, process registry,
//           kernel processor events, and the driver executor.
// ============================================================================
//! ## Overview
//! Integration tests for the execution half of the pipeline using an
//! in-memory connection provider.

#![allow(
    clippy::panic,
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only output and panic-based assertions are permitted."
)]

mod support;

use std::sync::Arc;
use std::sync::Mutex;
use std::thread;
use std::time::Duration;

use shardline_core::core::ConnectionMode;
use shardline_core::core::DriverExecutionUnit;
use shardline_core::core::ExecutionError;
use shardline_core::core::ExecutionGroup;
use shardline_core::core::ExecutionGroupContext;
use shardline_core::core::ExecutionGroupReportContext;
use shardline_core::core::ExecutionUnit;
use shardline_core::core::KernelError;
use shardline_core::core::KernelEvent;
use shardline_core::core::Operand;
use shardline_core::core::Predicate;
use shardline_core::core::ProcessId;
use shardline_core::core::QueryContext;
use shardline_core::core::RouteContext;
use shardline_core::core::ShardingValue;
use shardline_core::core::SqlRewriteContext;
use shardline_core::core::SqlToken;
use shardline_core::core::StatementContext;
use shardline_core::core::StatementFeatures;
use shardline_core::interfaces::ConnectionProvider;
use shardline_core::interfaces::ExecutionPrepareDecorator;
use shardline_core::interfaces::ExecutorCallback;
use shardline_core::runtime::DriverCallback;
use shardline_core::runtime::DriverExecutor;
use shardline_core::runtime::ExecutionPrepareEngine;
use shardline_core::runtime::ExecutorEngine;
use shardline_core::runtime::InMemoryEventSink;
use shardline_core::runtime::KernelProcessor;
use shardline_core::runtime::KernelProps;
use shardline_core::runtime::NoopEventSink;
use shardline_core::runtime::ProcessRegistry;
use shardline_core::runtime::SqlRewriteEngine;
use support::TestResult;
use support::ensure;
use support::fail;
use support::fixtures::order_rule;
use support::fixtures::sharding_engine;
use support::fixtures::topology;

// ============================================================================
// SECTION: Fixtures
// ============================================================================

/// Provider handing out `<data source>#<n>` connection names.
#[derive(Default)]
struct RecordingProvider {
    /// Requests as `(data source, count, mode)`.
    requests: Mutex<Vec<(String, usize, ConnectionMode)>>,
    /// Return one connection fewer than requested.
    short: bool,
}

impl ConnectionProvider for RecordingProvider {
    type Connection = String;

    fn get_connections(
        &self,
        data_source: &str,
        count: usize,
        mode: ConnectionMode,
    ) -> Result<Vec<String>, ExecutionError> {
        self.requests.lock().unwrap().push((data_source.to_string(), count, mode));
        let supplied = if self.short { count.saturating_sub(1) } else { count };
        Ok((0 .. supplied).map(|index| format!("{data_source}#{index}")).collect())
    }
}

/// Decorator reversing group order.
struct ReverseGroups;

impl ExecutionPrepareDecorator<DriverExecutionUnit<String>> for ReverseGroups {
    fn decorate(
        &self,
        _route: &RouteContext,
        mut groups: Vec<ExecutionGroup<DriverExecutionUnit<String>>>,
    ) -> Result<Vec<ExecutionGroup<DriverExecutionUnit<String>>>, ExecutionError> {
        groups.reverse();
        Ok(groups)
    }
}

/// Report context for ad-hoc group contexts.
fn report() -> ExecutionGroupReportContext {
    ExecutionGroupReportContext {
        process_id: ProcessId::new("process-test"),
        database_name: "sharding_db".to_string(),
    }
}

/// One single-input group per label.
fn labelled_groups(labels: &[&'static str]) -> ExecutionGroupContext<&'static str> {
    ExecutionGroupContext {
        groups: labels.iter().map(|label| ExecutionGroup::new(vec![*label])).collect(),
        report: report(),
    }
}

/// Callback echoing labels after a per-label delay.
fn delayed_echo() -> Arc<dyn ExecutorCallback<&'static str, String>> {
    Arc::new(|inputs: Vec<&'static str>, _trunk: bool| -> Result<Vec<String>, ExecutionError> {
        let mut outputs = Vec::new();
        for label in inputs {
            let delay = match label {
                "A" => 60,
                "B" => 30,
                _ => 0,
            };
            thread::sleep(Duration::from_millis(delay));
            outputs.push(label.to_string());
        }
        Ok(outputs)
    })
}

/// Select over `t_order` by `user_id`; two units on `ds_1`.
fn ordered_select(user_id: i64) -> (QueryContext, SqlRewriteContext) {
    let sql = "SELECT * FROM t_order WHERE user_id = ? ORDER BY order_id";
    let statement = StatementContext::select(&["t_order"])
        .with_predicates(vec![Predicate::eq("t_order", "user_id", Operand::Parameter(0))])
        .with_features(StatementFeatures {
            order_by: true,
            ..StatementFeatures::default()
        });
    let params = vec![ShardingValue::Int(user_id)];
    let query = QueryContext::new(sql, statement, params.clone());
    let rewrite = SqlRewriteContext::new(sql, vec![SqlToken::table(14, 20, "t_order")], params);
    (query, rewrite)
}

/// Kernel processor over the order fixture.
fn processor(props: KernelProps, sink: Arc<InMemoryEventSink>) -> TestResult<KernelProcessor> {
    Ok(KernelProcessor::new(sharding_engine(order_rule()?), SqlRewriteEngine::default(), props, sink))
}

/// Callback returning each unit's SQL and connection.
fn echo_sql() -> DriverCallback<String, String> {
    Arc::new(|inputs: Vec<DriverExecutionUnit<String>>, _trunk: bool| -> Result<Vec<String>, ExecutionError> {
        Ok(inputs
            .into_iter()
            .map(|unit| format!("{} @ {}", unit.execution_unit.sql_unit.sql, unit.connection))
            .collect())
    })
}

// ============================================================================
// SECTION: Prepare
// ============================================================================

#[test]
fn prepare_partitions_units_per_data_source() -> TestResult {
    let provider = RecordingProvider::default();
    let engine = ExecutionPrepareEngine::new(2, &provider);
    let units = vec![
        ExecutionUnit::new("ds_0", "SELECT 1", Vec::new()),
        ExecutionUnit::new("ds_1", "SELECT 2", Vec::new()),
        ExecutionUnit::new("ds_0", "SELECT 3", Vec::new()),
        ExecutionUnit::new("ds_0", "SELECT 4", Vec::new()),
    ];
    let context = engine.prepare(&RouteContext::new(), units, report())?;
    let shape: Vec<Vec<(String, String)>> = context
        .groups
        .iter()
        .map(|group| {
            group
                .inputs
                .iter()
                .map(|unit| (unit.execution_unit.sql_unit.sql.clone(), unit.connection.clone()))
                .collect()
        })
        .collect();
    let expected = vec![
        vec![("SELECT 1".to_string(), "ds_0#0".to_string()), ("SELECT 3".to_string(), "ds_0#0".to_string())],
        vec![("SELECT 4".to_string(), "ds_0#1".to_string())],
        vec![("SELECT 2".to_string(), "ds_1#0".to_string())],
    ];
    ensure(shape == expected, format!("unexpected groups {shape:?}"))?;
    let requests = provider.requests.lock().unwrap().clone();
    ensure(
        requests
            == vec![
                ("ds_0".to_string(), 2, ConnectionMode::ConnectionStrictly),
                ("ds_1".to_string(), 1, ConnectionMode::MemoryStrictly),
            ],
        format!("unexpected requests {requests:?}"),
    )?;
    ensure(context.input_count() == 4, "every unit must be prepared")
}

#[test]
fn prepare_fails_when_connections_run_short() -> TestResult {
    let provider = RecordingProvider {
        short: true,
        ..RecordingProvider::default()
    };
    let engine = ExecutionPrepareEngine::new(1, &provider);
    let units = vec![ExecutionUnit::new("ds_0", "SELECT 1", Vec::new())];
    match engine.prepare(&RouteContext::new(), units, report()) {
        Err(ExecutionError::Connection(_)) => Ok(()),
        other => fail(format!("expected connection error, got {other:?}")),
    }
}

#[test]
fn prepare_applies_decorators() -> TestResult {
    let provider = RecordingProvider::default();
    let decorator = ReverseGroups;
    let engine = ExecutionPrepareEngine::new(1, &provider).with_decorator(&decorator);
    let units = vec![
        ExecutionUnit::new("ds_0", "SELECT 1", Vec::new()),
        ExecutionUnit::new("ds_1", "SELECT 2", Vec::new()),
    ];
    let context = engine.prepare(&RouteContext::new(), units, report())?;
    let first = context.groups.first().and_then(|group| group.inputs.first()).ok_or("no groups")?;
    ensure(first.execution_unit.data_source == "ds_1", "decorator should reverse groups")
}

// ============================================================================
// SECTION: Executor
// ============================================================================

#[test]
fn parallel_results_follow_group_order() -> TestResult {
    let executor = ExecutorEngine::new(4, Arc::new(NoopEventSink))?;
    let results = executor.execute(labelled_groups(&["A", "B", "C"]), None, delayed_echo(), false)?;
    ensure(results == vec!["A", "B", "C"], format!("unexpected order {results:?}"))
}

#[test]
fn serial_execution_runs_on_the_caller_thread() -> TestResult {
    let executor = ExecutorEngine::new(2, Arc::new(NoopEventSink))?;
    let callback: Arc<dyn ExecutorCallback<&'static str, bool>> =
        Arc::new(|inputs: Vec<&'static str>, trunk: bool| -> Result<Vec<bool>, ExecutionError> {
            Ok(inputs.iter().map(|_| trunk).collect())
        });
    let serial = executor.execute(labelled_groups(&["A", "B", "C"]), None, Arc::clone(&callback), true)?;
    ensure(serial == vec![true, true, true], format!("serial flags {serial:?}"))?;
    let parallel = executor.execute(labelled_groups(&["A", "B", "C"]), None, callback, false)?;
    ensure(parallel == vec![true, false, false], format!("parallel flags {parallel:?}"))
}

#[test]
fn first_callback_handles_only_group_zero() -> TestResult {
    let executor = ExecutorEngine::new(2, Arc::new(NoopEventSink))?;
    let first: Arc<dyn ExecutorCallback<&'static str, String>> =
        Arc::new(|inputs: Vec<&'static str>, _trunk: bool| -> Result<Vec<String>, ExecutionError> {
            Ok(inputs.iter().map(|label| format!("first:{label}")).collect())
        });
    let results = executor.execute(labelled_groups(&["A", "B"]), Some(first), delayed_echo(), false)?;
    ensure(results == vec!["first:A", "B"], format!("unexpected results {results:?}"))
}

#[test]
fn statement_error_propagates_unchanged() -> TestResult {
    let sink = Arc::new(InMemoryEventSink::new());
    let executor = ExecutorEngine::new(4, sink.clone())?;
    let callback: Arc<dyn ExecutorCallback<&'static str, String>> =
        Arc::new(|inputs: Vec<&'static str>, _trunk: bool| -> Result<Vec<String>, ExecutionError> {
            if inputs.contains(&"B") {
                return Err(ExecutionError::Statement {
                    data_source: "ds_1".to_string(),
                    message: "duplicate key".to_string(),
                });
            }
            Ok(inputs.iter().map(|label| (*label).to_string()).collect())
        });
    match executor.execute(labelled_groups(&["A", "B", "C"]), None, callback, false) {
        Err(ExecutionError::Statement {
            data_source,
            message,
        }) => {
            ensure(data_source == "ds_1" && message == "duplicate key", "statement error altered")?;
        }
        other => return fail(format!("expected statement error, got {other:?}")),
    }
    ensure(sink.event_names() == vec!["execution_failed"], format!("events {:?}", sink.event_names()))
}

#[test]
fn asynchronous_non_statement_errors_become_unknown() -> TestResult {
    let executor = ExecutorEngine::new(2, Arc::new(NoopEventSink))?;
    let callback: Arc<dyn ExecutorCallback<&'static str, String>> =
        Arc::new(|inputs: Vec<&'static str>, _trunk: bool| -> Result<Vec<String>, ExecutionError> {
            if inputs.contains(&"B") {
                return Err(ExecutionError::Connection("reset".to_string()));
            }
            Ok(Vec::new())
        });
    match executor.execute(labelled_groups(&["A", "B"]), None, callback, false) {
        Err(ExecutionError::Unknown(message)) => {
            ensure(message.contains("reset"), format!("unexpected message {message}"))
        }
        other => fail(format!("expected unknown error, got {other:?}")),
    }
}

#[test]
fn panicking_group_reports_unknown_error() -> TestResult {
    let executor = ExecutorEngine::new(2, Arc::new(NoopEventSink))?;
    let callback: Arc<dyn ExecutorCallback<&'static str, String>> =
        Arc::new(|inputs: Vec<&'static str>, _trunk: bool| -> Result<Vec<String>, ExecutionError> {
            if inputs.contains(&"B") {
                panic!("driver crashed");
            }
            Ok(Vec::new())
        });
    match executor.execute(labelled_groups(&["A", "B"]), None, callback, false) {
        Err(ExecutionError::Unknown(_)) => Ok(()),
        other => fail(format!("expected unknown error, got {other:?}")),
    }
}

#[test]
fn empty_context_yields_no_results() -> TestResult {
    let executor = ExecutorEngine::new(0, Arc::new(NoopEventSink))?;
    ensure(executor.size() >= 1, "default pool must have a worker")?;
    let results = executor.execute(labelled_groups(&[]), None, delayed_echo(), false)?;
    ensure(results.is_empty(), "no groups, no results")
}

// ============================================================================
// SECTION: Process Registry
// ============================================================================

#[test]
fn process_registry_tracks_and_cancels() -> TestResult {
    let sink = Arc::new(InMemoryEventSink::new());
    let registry = ProcessRegistry::new(sink.clone());
    let first = registry.add("sharding_db", "SELECT 1")?;
    let second = registry.add("sharding_db", "SELECT 2")?;
    ensure(first != second, "process ids must be unique")?;
    ensure(registry.list()?.len() == 2, "both processes listed")?;

    ensure(registry.cancel(&first)?, "registered process should cancel")?;
    ensure(registry.is_cancelled(&first), "cancel flag set")?;
    ensure(matches!(registry.check(&first), Err(ExecutionError::Cancelled(_))), "check must fail")?;
    registry.check(&second)?;

    registry.complete(&first)?;
    ensure(!registry.cancel(&first)?, "completed process cannot be cancelled")?;
    ensure(sink.event_names() == vec!["process_cancelled"], format!("events {:?}", sink.event_names()))
}

// ============================================================================
// SECTION: Kernel Processor
// ============================================================================

#[test]
fn kernel_builds_units_and_records_route_event() -> TestResult {
    let sink = Arc::new(InMemoryEventSink::new());
    let kernel = processor(KernelProps::default(), sink.clone())?;
    let (query, rewrite) = ordered_select(1);
    let context = kernel.generate_execution_context(&query, &rewrite, &topology())?;
    let units: Vec<(&str, &str)> = context
        .execution_units
        .iter()
        .map(|unit| (unit.data_source.as_str(), unit.sql_unit.sql.as_str()))
        .collect();
    ensure(
        units
            == vec![
                ("ds_1", "SELECT * FROM t_order_0 WHERE user_id = ? ORDER BY order_id"),
                ("ds_1", "SELECT * FROM t_order_1 WHERE user_id = ? ORDER BY order_id"),
            ],
        format!("unexpected units {units:?}"),
    )?;
    ensure(sink.event_names() == vec!["route_completed"], format!("events {:?}", sink.event_names()))
}

#[test]
fn sql_show_lists_actual_sql_or_data_sources() -> TestResult {
    let (query, rewrite) = ordered_select(1);

    let full_sink = Arc::new(InMemoryEventSink::new());
    let full = processor(
        KernelProps {
            sql_show: true,
            ..KernelProps::default()
        },
        full_sink.clone(),
    )?;
    full.generate_execution_context(&query, &rewrite, &topology())?;
    match full_sink.events().last() {
        Some(KernelEvent::SqlShow {
            actual,
            data_sources,
            ..
        }) => {
            ensure(actual.len() == 2 && data_sources.is_empty(), "full mode lists actual sql")?;
            ensure(actual.iter().all(|entry| entry.params == vec!["1"]), "params rendered")?;
        }
        other => return fail(format!("expected sql_show, got {other:?}")),
    }

    let simple_sink = Arc::new(InMemoryEventSink::new());
    let simple = processor(
        KernelProps {
            sql_show: true,
            sql_simple: true,
            ..KernelProps::default()
        },
        simple_sink.clone(),
    )?;
    simple.generate_execution_context(&query, &rewrite, &topology())?;
    match simple_sink.events().last() {
        Some(KernelEvent::SqlShow {
            actual,
            data_sources,
            ..
        }) => ensure(actual.is_empty() && data_sources == &vec!["ds_1".to_string()], "simple mode"),
        other => fail(format!("expected sql_show, got {other:?}")),
    }
}

#[test]
fn kernel_surfaces_route_errors() -> TestResult {
    let kernel = processor(KernelProps::default(), Arc::new(InMemoryEventSink::new()))?;
    let (mut query, rewrite) = ordered_select(1);
    query.params.clear();
    match kernel.generate_execution_context(&query, &rewrite, &topology()) {
        Err(KernelError::Route(_)) => Ok(()),
        other => fail(format!("expected route error, got {other:?}")),
    }
}

// ============================================================================
// SECTION: Driver Executor
// ============================================================================

#[test]
fn driver_query_returns_results_in_unit_order() -> TestResult {
    let kernel = processor(KernelProps::default(), Arc::new(InMemoryEventSink::new()))?;
    let (query, rewrite) = ordered_select(1);
    let context = kernel.generate_execution_context(&query, &rewrite, &topology())?;
    let executor = ExecutorEngine::new(2, Arc::new(NoopEventSink))?;
    let registry = ProcessRegistry::new(Arc::new(NoopEventSink));
    let provider = RecordingProvider::default();
    let driver = DriverExecutor::new(&executor, &registry, &provider, 1);
    let results = driver.execute_query(&context, "sharding_db", echo_sql())?;
    ensure(
        results
            == vec![
                "SELECT * FROM t_order_0 WHERE user_id = ? ORDER BY order_id @ ds_1#0",
                "SELECT * FROM t_order_1 WHERE user_id = ? ORDER BY order_id @ ds_1#1",
            ],
        format!("unexpected results {results:?}"),
    )?;
    ensure(registry.list()?.is_empty(), "process must be completed")
}

#[test]
fn driver_update_sums_sharded_counts() -> TestResult {
    let rule = order_rule()?;
    let kernel = processor(KernelProps::default(), Arc::new(InMemoryEventSink::new()))?;
    let (query, rewrite) = ordered_select(1);
    let context = kernel.generate_execution_context(&query, &rewrite, &topology())?;
    let executor = ExecutorEngine::new(2, Arc::new(NoopEventSink))?;
    let registry = ProcessRegistry::new(Arc::new(NoopEventSink));
    let provider = RecordingProvider::default();
    let counts: DriverCallback<String, u64> =
        Arc::new(|inputs: Vec<DriverExecutionUnit<String>>, _trunk: bool| -> Result<Vec<u64>, ExecutionError> {
            Ok(inputs.iter().map(|_| 3).collect())
        });

    let sharded = DriverExecutor::new(&executor, &registry, &provider, 1).with_rule(&rule);
    ensure(sharded.execute_update(&context, "sharding_db", Arc::clone(&counts))? == 6, "counts summed")?;
    let plain = DriverExecutor::new(&executor, &registry, &provider, 1);
    ensure(plain.execute_update(&context, "sharding_db", counts)? == 3, "first count only")
}

#[test]
fn driver_stops_cancelled_processes_and_completes_them() -> TestResult {
    let kernel = processor(KernelProps::default(), Arc::new(InMemoryEventSink::new()))?;
    let (query, rewrite) = ordered_select(1);
    let context = kernel.generate_execution_context(&query, &rewrite, &topology())?;
    let executor = ExecutorEngine::new(2, Arc::new(NoopEventSink))?;
    let registry = ProcessRegistry::new(Arc::new(NoopEventSink));
    let provider = RecordingProvider::default();
    let canceller = registry.clone();
    let cancel_all: DriverCallback<String, bool> = Arc::new(
        move |inputs: Vec<DriverExecutionUnit<String>>, _trunk: bool| -> Result<Vec<bool>, ExecutionError> {
            for process in canceller.list()? {
                canceller.cancel(&process.id)?;
            }
            Ok(inputs.iter().map(|_| true).collect())
        },
    );
    let driver = DriverExecutor::new(&executor, &registry, &provider, 1).with_serial(true);
    match driver.execute(&context, "sharding_db", cancel_all) {
        Err(KernelError::Execution(ExecutionError::Cancelled(_))) => {}
        other => return fail(format!("expected cancellation, got {other:?}")),
    }
    ensure(registry.list()?.is_empty(), "cancelled process must still be completed")
}
