// tests/coordinator_steps.rs
//
// Drives the completion coordinator by hand, without worker threads.

mod common;
use crate::common::{GraphBuilder, assert_topological, diamond_graph, fan_in_graph, fan_out_graph};

use std::sync::Arc;

use dagpool::dag::{DependencyGraph, DependencyIndex, ReadyEntry, StatusTracker, TaskStatus};
use dagpool::engine::{CompletionCoordinator, TaskOutcome};
use dagpool::types::FailurePolicy;

fn coordinator_for(
    graph: &DependencyGraph<String>,
    policy: FailurePolicy,
) -> (CompletionCoordinator<String>, Arc<StatusTracker<String>>) {
    let statuses = Arc::new(StatusTracker::from_graph(graph));
    let coordinator =
        CompletionCoordinator::from_index(DependencyIndex::build(graph), Arc::clone(&statuses), policy);
    (coordinator, statuses)
}

fn entry(task: &str, fan_out: usize) -> ReadyEntry<String> {
    ReadyEntry::new(task.to_string(), fan_out)
}

/// Pop and complete tasks until the queue is empty, returning the order.
fn drain(coordinator: &CompletionCoordinator<String>, fail: &[&str]) -> Vec<String> {
    let mut order = Vec::new();
    while let Some(next) = coordinator.state().try_dequeue() {
        let outcome = if fail.contains(&next.task.as_str()) {
            TaskOutcome::Failed("scripted".to_string())
        } else {
            TaskOutcome::Success
        };
        coordinator.on_task_complete(&next.task, &outcome);
        order.push(next.task);
    }
    order
}

#[test]
fn roots_start_scheduled() {
    let (coordinator, statuses) = coordinator_for(&fan_in_graph(), FailurePolicy::default());

    assert_eq!(statuses.get(&"A".to_string()), Some(TaskStatus::Scheduled));
    assert_eq!(statuses.get(&"B".to_string()), Some(TaskStatus::Scheduled));
    assert_eq!(statuses.get(&"C".to_string()), Some(TaskStatus::Waiting));
    assert_eq!(coordinator.state().ready_len(), 2);
    assert_eq!(coordinator.state().remaining_len(), 1);
}

#[test]
fn fan_out_releases_both_dependents_and_shuts_down_once() {
    let (coordinator, statuses) = coordinator_for(&fan_out_graph(), FailurePolicy::default());
    let state = coordinator.state();

    assert_eq!(state.try_dequeue(), Some(entry("A", 2)));
    let step = coordinator.on_task_complete(&"A".to_string(), &TaskOutcome::Success);
    assert_eq!(step.newly_scheduled, vec![entry("B", 0), entry("C", 0)]);
    assert!(!step.shutdown_signalled);
    assert_eq!(statuses.get(&"B".to_string()), Some(TaskStatus::Scheduled));

    let first = state.try_dequeue().expect("one of B/C queued");
    let step = coordinator.on_task_complete(&first.task, &TaskOutcome::Success);
    assert!(!step.shutdown_signalled, "one task still queued");

    let second = state.try_dequeue().expect("the other of B/C queued");
    let step = coordinator.on_task_complete(&second.task, &TaskOutcome::Success);
    assert!(step.shutdown_signalled);
    assert!(state.is_shut_down());
    assert!(state.try_dequeue().is_none());
}

#[test]
fn fan_in_waits_for_both_dependencies() {
    let (coordinator, statuses) = coordinator_for(&fan_in_graph(), FailurePolicy::default());

    let step = coordinator.on_task_complete(&"A".to_string(), &TaskOutcome::Success);
    assert!(step.newly_scheduled.is_empty());
    assert_eq!(statuses.get(&"C".to_string()), Some(TaskStatus::Waiting));

    let step = coordinator.on_task_complete(&"B".to_string(), &TaskOutcome::Success);
    assert_eq!(step.newly_scheduled, vec![entry("C", 0)]);
    assert_eq!(statuses.get(&"C".to_string()), Some(TaskStatus::Scheduled));
}

#[test]
fn diamond_schedules_join_exactly_once() {
    let graph = diamond_graph();
    let (coordinator, _statuses) = coordinator_for(&graph, FailurePolicy::default());

    let order = drain(&coordinator, &[]);
    assert_topological(&graph, &order);
    assert_eq!(order.last().map(String::as_str), Some("D"));
    assert_eq!(coordinator.state().completion_order(), order);
    assert!(coordinator.state().is_shut_down());
}

#[test]
fn queue_prefers_higher_fan_out() {
    // After A: C unblocks three tasks, B unblocks none. B is released first.
    let graph = GraphBuilder::new()
        .root("A")
        .task("B", &["A"])
        .task("C", &["A"])
        .task("X", &["C"])
        .task("Y", &["C"])
        .task("Z", &["C"])
        .build();
    let (coordinator, _statuses) = coordinator_for(&graph, FailurePolicy::default());
    let state = coordinator.state();

    let a = state.try_dequeue().expect("A ready");
    coordinator.on_task_complete(&a.task, &TaskOutcome::Success);

    assert_eq!(state.try_dequeue(), Some(entry("C", 3)));
    assert_eq!(state.try_dequeue(), Some(entry("B", 0)));
}

#[test]
fn failure_skips_transitive_dependents() {
    let graph = GraphBuilder::new()
        .root("A")
        .root("E")
        .task("B", &["A"])
        .task("C", &["B"])
        .task("D", &["C", "E"])
        .build();
    let (coordinator, statuses) = coordinator_for(&graph, FailurePolicy::SkipDependents);
    let state = coordinator.state();

    assert_eq!(state.try_dequeue(), Some(entry("A", 1)));
    let step = coordinator.on_task_complete(&"A".to_string(), &TaskOutcome::Failed("boom".into()));
    let mut skipped = step.newly_skipped.clone();
    skipped.sort();
    assert_eq!(skipped, vec!["B", "C", "D"]);
    assert!(step.newly_scheduled.is_empty());
    assert!(!step.shutdown_signalled, "E is still queued");

    for task in ["B", "C", "D"] {
        assert_eq!(statuses.get(&task.to_string()), Some(TaskStatus::Skipped));
    }

    // E finishing cannot resurrect D.
    assert_eq!(state.try_dequeue(), Some(entry("E", 1)));
    let step = coordinator.on_task_complete(&"E".to_string(), &TaskOutcome::Success);
    assert!(step.newly_scheduled.is_empty());
    assert!(step.shutdown_signalled);
    assert_eq!(statuses.get(&"D".to_string()), Some(TaskStatus::Skipped));
    assert_eq!(state.completion_order(), vec!["A", "E"]);
}

#[test]
fn failed_task_is_still_recorded_and_run_still_ends() {
    let graph = diamond_graph();
    let (coordinator, statuses) = coordinator_for(&graph, FailurePolicy::SkipDependents);

    let order = drain(&coordinator, &["B"]);
    assert_eq!(order.len(), 3, "D is skipped: {order:?}");
    assert!(!order.contains(&"D".to_string()));
    assert_eq!(statuses.get(&"D".to_string()), Some(TaskStatus::Skipped));
    assert!(coordinator.state().is_shut_down());
}

#[test]
fn continue_policy_releases_dependents_of_failed_tasks() {
    let graph = diamond_graph();
    let (coordinator, statuses) = coordinator_for(&graph, FailurePolicy::Continue);

    let order = drain(&coordinator, &["A"]);
    assert_topological(&graph, &order);
    assert!(statuses.tasks_in(TaskStatus::Skipped).is_empty());
    assert!(coordinator.state().is_shut_down());
}
