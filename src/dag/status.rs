// src/dag/status.rs

//! Per-task lifecycle state, readable from any thread at any time.

use std::collections::BTreeMap;
use std::fmt;

use dashmap::DashMap;
use tracing::{trace, warn};

use crate::dag::graph::{DependencyGraph, TaskKey};

/// Lifecycle state of a task.
///
/// Normal path: `Waiting -> Scheduled -> Running -> Completed`.
/// A body failure ends in `Failed` instead of `Completed`; a task that can
/// never run because an upstream task failed goes `Waiting -> Skipped`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskStatus {
    /// Has unmet dependencies.
    Waiting,
    /// In the ready queue.
    Scheduled,
    /// A worker has started it.
    Running,
    /// Finished successfully.
    Completed,
    /// The body returned an error or panicked.
    Failed,
    /// Never ran because an upstream task failed.
    Skipped,
}

impl TaskStatus {
    /// Whether the state machine allows moving from `self` to `next`.
    pub fn can_transition_to(self, next: TaskStatus) -> bool {
        use TaskStatus::*;
        matches!(
            (self, next),
            (Waiting, Scheduled)
                | (Scheduled, Running)
                | (Running, Completed)
                | (Running, Failed)
                | (Waiting, Skipped)
        )
    }

    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            TaskStatus::Completed | TaskStatus::Failed | TaskStatus::Skipped
        )
    }

    /// Position along the lifecycle; terminal states share the last rank.
    pub fn rank(self) -> u8 {
        match self {
            TaskStatus::Waiting => 0,
            TaskStatus::Scheduled => 1,
            TaskStatus::Running => 2,
            TaskStatus::Completed | TaskStatus::Failed | TaskStatus::Skipped => 3,
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TaskStatus::Waiting => "WAITING",
            TaskStatus::Scheduled => "SCHEDULED",
            TaskStatus::Running => "RUNNING",
            TaskStatus::Completed => "COMPLETED",
            TaskStatus::Failed => "FAILED",
            TaskStatus::Skipped => "SKIPPED",
        };
        f.write_str(s)
    }
}

/// Concurrent map task -> [`TaskStatus`].
///
/// Backed by a sharded `DashMap`, independent of the coordinator's lock:
/// updates touch a single key and need no cross-key atomicity. Readers may
/// observe a value one transition behind; the tracker is for observability
/// and never drives scheduling decisions.
#[derive(Debug)]
pub struct StatusTracker<T: TaskKey> {
    statuses: DashMap<T, TaskStatus>,
}

impl<T: TaskKey> StatusTracker<T> {
    /// Create a tracker with every task of `graph` in `Waiting`.
    pub fn from_graph(graph: &DependencyGraph<T>) -> Self {
        let statuses = DashMap::with_capacity(graph.len());
        for task in graph.tasks() {
            statuses.insert(task.clone(), TaskStatus::Waiting);
        }
        Self { statuses }
    }

    /// Move `task` to `next` if the state machine allows it.
    ///
    /// Returns `false` for unknown tasks and illegal transitions; neither is
    /// applied.
    pub fn transition(&self, task: &T, next: TaskStatus) -> bool {
        let Some(mut current) = self.statuses.get_mut(task) else {
            warn!(task = %task, to = %next, "status update for unknown task; ignoring");
            return false;
        };

        if !current.can_transition_to(next) {
            warn!(
                task = %task,
                from = %*current,
                to = %next,
                "illegal status transition; ignoring"
            );
            return false;
        }

        trace!(task = %task, from = %*current, to = %next, "status transition");
        *current = next;
        true
    }

    pub fn get(&self, task: &T) -> Option<TaskStatus> {
        self.statuses.get(task).map(|s| *s)
    }

    /// Point-in-time copy of every task's status, ordered by task.
    ///
    /// Each entry is read under its shard lock, but the snapshot as a whole is
    /// not atomic across tasks.
    pub fn snapshot(&self) -> BTreeMap<T, TaskStatus> {
        self.statuses
            .iter()
            .map(|entry| (entry.key().clone(), *entry.value()))
            .collect()
    }

    /// Tasks currently in `status`, ordered.
    pub fn tasks_in(&self, status: TaskStatus) -> Vec<T> {
        let mut tasks: Vec<T> = self
            .statuses
            .iter()
            .filter(|entry| *entry.value() == status)
            .map(|entry| entry.key().clone())
            .collect();
        tasks.sort();
        tasks
    }

    pub fn all_terminal(&self) -> bool {
        self.statuses.iter().all(|entry| entry.value().is_terminal())
    }

    pub fn len(&self) -> usize {
        self.statuses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.statuses.is_empty()
    }
}
