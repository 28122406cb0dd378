// src/engine/hooks.rs

//! Lifecycle callbacks the worker pool invokes around each task body.

use std::sync::Arc;

use crate::dag::{ReadyEntry, StatusTracker, TaskKey, TaskStatus};
use crate::engine::TaskOutcome;
use crate::engine::coordinator::CompletionCoordinator;

/// Callbacks run by a worker immediately before and after a task body.
///
/// Passed into the pool at construction, so the pool needs no knowledge of
/// statuses or dependency bookkeeping.
pub trait ExecutionHooks<T>: Send + Sync {
    fn before_run(&self, entry: &ReadyEntry<T>);
    fn after_run(&self, entry: &ReadyEntry<T>, outcome: &TaskOutcome);
}

/// The scheduler's own hooks.
///
/// - before: mark the task `Running`.
/// - after: mark it `Completed` (or `Failed`) and hand it to the
///   [`CompletionCoordinator`].
///
/// An optional observer is called after each built-in step; it sees the
/// status already updated and, after a run, the coordinator's bookkeeping
/// already applied.
pub struct SchedulerHooks<T: TaskKey> {
    statuses: Arc<StatusTracker<T>>,
    coordinator: Arc<CompletionCoordinator<T>>,
    observer: Option<Arc<dyn ExecutionHooks<T>>>,
}

impl<T: TaskKey> SchedulerHooks<T> {
    pub fn new(
        statuses: Arc<StatusTracker<T>>,
        coordinator: Arc<CompletionCoordinator<T>>,
        observer: Option<Arc<dyn ExecutionHooks<T>>>,
    ) -> Self {
        Self {
            statuses,
            coordinator,
            observer,
        }
    }
}

impl<T: TaskKey> ExecutionHooks<T> for SchedulerHooks<T> {
    fn before_run(&self, entry: &ReadyEntry<T>) {
        self.statuses.transition(&entry.task, TaskStatus::Running);
        if let Some(observer) = &self.observer {
            observer.before_run(entry);
        }
    }

    fn after_run(&self, entry: &ReadyEntry<T>, outcome: &TaskOutcome) {
        let status = if outcome.is_success() {
            TaskStatus::Completed
        } else {
            TaskStatus::Failed
        };
        self.statuses.transition(&entry.task, status);
        self.coordinator.on_task_complete(&entry.task, outcome);
        if let Some(observer) = &self.observer {
            observer.after_run(entry, outcome);
        }
    }
}
