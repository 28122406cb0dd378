// tests/scheduler_scenarios.rs

mod common;
use crate::common::{
    GraphBuilder, RecordingBody, assert_topological, diamond_graph, fan_in_graph, fan_out_graph,
    init_tracing, position, test_options,
};

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;

use anyhow::Result;
use parking_lot::Mutex;

use dagpool::dag::{DependencyGraph, ReadyEntry, StatusTracker, TaskStatus};
use dagpool::engine::{ExecutionHooks, TaskOutcome, TaskScheduler};
use dagpool::errors::DagpoolError;
use dagpool::types::FailurePolicy;

#[test]
fn fan_out_runs_root_first() -> Result<()> {
    init_tracing();

    let body = RecordingBody::new().with_default_delay(Duration::from_millis(10));
    let report = TaskScheduler::new(fan_out_graph(), body)
        .with_options(test_options(3))
        .run()?;

    assert!(report.is_success(), "report: {report}");
    assert_eq!(report.completion_order.len(), 3);
    assert_eq!(report.completion_order[0], "A");
    Ok(())
}

#[test]
fn fan_in_runs_join_last() -> Result<()> {
    init_tracing();

    let body = RecordingBody::new().with_default_delay(Duration::from_millis(10));
    let report = TaskScheduler::new(fan_in_graph(), body)
        .with_options(test_options(2))
        .run()?;

    assert!(report.is_success());
    assert_eq!(report.completion_order.last().map(String::as_str), Some("C"));
    Ok(())
}

#[test]
fn diamond_respects_every_edge() -> Result<()> {
    init_tracing();

    let graph = diamond_graph();
    let body = RecordingBody::new().with_delay("B", Duration::from_millis(30));
    let started = body.started_handle();
    let report = TaskScheduler::new(graph.clone(), body)
        .with_options(test_options(3))
        .run()?;

    assert!(report.is_success());
    assert_topological(&graph, &report.completion_order);

    let started = started.lock().clone();
    assert_eq!(started.len(), 4, "each task started once: {started:?}");
    assert!(position(&started, "D") > position(&started, "B"));
    assert!(position(&started, "D") > position(&started, "C"));
    Ok(())
}

#[test]
fn cyclic_graph_is_rejected_before_any_task_runs() {
    init_tracing();

    // {A: [B], B: [A]}
    let graph = GraphBuilder::new()
        .task("A", &["B"])
        .task("B", &["A"])
        .build();
    let body = RecordingBody::new();
    let started = body.started_handle();

    let err = TaskScheduler::new(graph, body)
        .with_options(test_options(2))
        .run()
        .expect_err("graph without root must be rejected");

    assert!(matches!(err, DagpoolError::NoRootTask), "got {err:?}");
    assert!(started.lock().is_empty());
}

#[test]
fn zero_workers_is_a_config_error() {
    let err = TaskScheduler::new(fan_out_graph(), RecordingBody::new())
        .with_options(test_options(0))
        .run()
        .expect_err("pool size 0 must be rejected");
    assert!(matches!(err, DagpoolError::ConfigError(_)));
}

#[test]
fn zero_keep_alive_is_a_config_error() {
    let mut options = test_options(2);
    options.keep_alive = Duration::ZERO;

    let body = RecordingBody::new();
    let started = body.started_handle();
    let err = TaskScheduler::new(fan_out_graph(), body)
        .with_options(options)
        .run()
        .expect_err("zero keep-alive must be rejected");

    match err {
        DagpoolError::ConfigError(msg) => assert!(msg.contains("keep-alive"), "{msg}"),
        other => panic!("expected ConfigError, got {other:?}"),
    }
    assert!(started.lock().is_empty());
}

#[test]
fn single_worker_runs_everything_sequentially() -> Result<()> {
    init_tracing();

    let graph = GraphBuilder::new()
        .root("A")
        .root("B")
        .task("C", &["A"])
        .task("D", &["B", "C"])
        .task("E", &["D"])
        .build();
    let body = RecordingBody::new();
    let started = body.started_handle();
    let report = TaskScheduler::new(graph.clone(), body)
        .with_options(test_options(1))
        .run()?;

    assert!(report.is_success());
    assert_topological(&graph, &report.completion_order);
    // With one worker the start order is the completion order.
    assert_eq!(*started.lock(), report.completion_order);
    Ok(())
}

#[test]
fn failing_task_skips_its_dependents() -> Result<()> {
    init_tracing();

    let graph = GraphBuilder::new()
        .root("A")
        .root("X")
        .task("B", &["A"])
        .task("C", &["B"])
        .task("Y", &["X"])
        .build();
    let body = RecordingBody::new().failing("A");
    let started = body.started_handle();
    let scheduler = TaskScheduler::new(graph, body).with_options(test_options(2));
    let tracker = scheduler.status_tracker();
    assert!(!tracker.all_terminal());
    let report = scheduler.run()?;

    assert!(report.terminated);
    assert!(tracker.all_terminal(), "statuses: {:?}", tracker.snapshot());
    assert!(!report.is_success());
    assert_eq!(report.failed(), vec!["A"]);
    assert_eq!(report.skipped(), vec!["B", "C"]);
    assert_eq!(report.statuses[&"Y".to_string()], TaskStatus::Completed);

    let started = started.lock().clone();
    assert!(!started.contains(&"B".to_string()));
    assert!(!started.contains(&"C".to_string()));
    Ok(())
}

#[test]
fn panicking_task_does_not_kill_the_pool() -> Result<()> {
    init_tracing();

    let body = RecordingBody::new().panicking("B");
    let report = TaskScheduler::new(diamond_graph(), body)
        .with_options(test_options(1))
        .run()?;

    assert!(report.terminated, "pool must still terminate");
    assert_eq!(report.failed(), vec!["B"]);
    assert_eq!(report.skipped(), vec!["D"]);
    assert_eq!(report.statuses[&"C".to_string()], TaskStatus::Completed);
    Ok(())
}

#[test]
fn continue_policy_runs_dependents_of_failed_tasks() -> Result<()> {
    init_tracing();

    let mut options = test_options(2);
    options.failure_policy = FailurePolicy::Continue;

    let graph = diamond_graph();
    let body = RecordingBody::new().failing("B");
    let report = TaskScheduler::new(graph.clone(), body)
        .with_options(options)
        .run()?;

    assert!(report.terminated);
    assert_topological(&graph, &report.completion_order);
    assert_eq!(report.failed(), vec!["B"]);
    assert!(report.skipped().is_empty());
    assert_eq!(report.statuses[&"D".to_string()], TaskStatus::Completed);
    Ok(())
}

/// Records every task that started while one of its dependencies was not yet
/// `Completed`.
struct DependencyCheck {
    graph: DependencyGraph<String>,
    statuses: Arc<StatusTracker<String>>,
    violations: Mutex<Vec<String>>,
    finished: Mutex<usize>,
}

impl ExecutionHooks<String> for DependencyCheck {
    fn before_run(&self, entry: &ReadyEntry<String>) {
        for dep in self.graph.dependencies_of(&entry.task) {
            if self.statuses.get(dep) != Some(TaskStatus::Completed) {
                self.violations
                    .lock()
                    .push(format!("{} started before {}", entry.task, dep));
            }
        }
    }

    fn after_run(&self, _entry: &ReadyEntry<String>, _outcome: &TaskOutcome) {
        *self.finished.lock() += 1;
    }
}

#[test]
fn dependencies_are_completed_before_a_task_starts() -> Result<()> {
    init_tracing();

    let graph = GraphBuilder::new()
        .root("A")
        .root("B")
        .root("C")
        .task("D", &["A", "B"])
        .task("E", &["B", "C"])
        .task("F", &["D", "E"])
        .task("G", &["A"])
        .task("H", &["F", "G"])
        .build();
    let body = RecordingBody::new().with_default_delay(Duration::from_millis(15));
    let scheduler = TaskScheduler::new(graph.clone(), body).with_options(test_options(3));

    let check = Arc::new(DependencyCheck {
        graph: graph.clone(),
        statuses: scheduler.status_tracker(),
        violations: Mutex::new(Vec::new()),
        finished: Mutex::new(0),
    });
    let report = scheduler.with_observer(check.clone()).run()?;

    assert!(report.is_success());
    assert_topological(&graph, &report.completion_order);
    assert!(check.violations.lock().is_empty(), "{:?}", check.violations.lock());
    assert_eq!(*check.finished.lock(), graph.len());
    Ok(())
}

#[test]
fn statuses_only_move_forward_while_sampled() -> Result<()> {
    init_tracing();

    let graph = diamond_graph();
    let body = RecordingBody::new().with_default_delay(Duration::from_millis(20));
    let scheduler = TaskScheduler::new(graph, body).with_options(test_options(2));

    let tracker = scheduler.status_tracker();
    let done = Arc::new(AtomicBool::new(false));
    let sampler = {
        let done = Arc::clone(&done);
        thread::spawn(move || {
            let mut last = tracker.snapshot();
            let mut regressions = Vec::new();
            while !done.load(Ordering::Acquire) {
                let now = tracker.snapshot();
                for (task, status) in &now {
                    if status.rank() < last[task].rank() {
                        regressions.push(format!("{task}: {} -> {status}", last[task]));
                    }
                }
                last = now;
                thread::sleep(Duration::from_millis(1));
            }
            regressions
        })
    };

    let report = scheduler.run()?;
    done.store(true, Ordering::Release);
    let regressions = sampler.join().expect("sampler thread");

    assert!(report.is_success());
    assert!(regressions.is_empty(), "status went backwards: {regressions:?}");
    assert!(report.statuses.values().all(|s| *s == TaskStatus::Completed));
    Ok(())
}

#[test]
fn max_wait_expiry_returns_unterminated_report() -> Result<()> {
    init_tracing();

    let graph = GraphBuilder::new().root("slow").task("after", &["slow"]).build();
    let body = RecordingBody::new().with_delay("slow", Duration::from_millis(500));

    let mut options = test_options(1);
    options.max_wait = Duration::from_millis(50);

    let report = TaskScheduler::new(graph, body).with_options(options).run()?;

    assert!(!report.terminated);
    assert!(!report.is_success());
    assert!(report.completion_order.is_empty());
    assert_eq!(report.statuses[&"after".to_string()], TaskStatus::Waiting);
    Ok(())
}

#[test]
fn integer_keyed_graph_runs_with_a_closure_body() -> Result<()> {
    init_tracing();

    let seen = Arc::new(Mutex::new(Vec::new()));
    let graph: DependencyGraph<u32> = [(1, vec![]), (2, vec![1]), (3, vec![1]), (4, vec![2, 3])]
        .into_iter()
        .collect();

    let body = {
        let seen = Arc::clone(&seen);
        move |task: &u32| -> Result<()> {
            seen.lock().push(*task);
            Ok(())
        }
    };
    let report = TaskScheduler::new(graph.clone(), body)
        .with_options(test_options(2))
        .run()?;

    assert!(report.is_success());
    assert!(graph.is_topological_order(&report.completion_order));
    assert_eq!(seen.lock().len(), 4);
    Ok(())
}
