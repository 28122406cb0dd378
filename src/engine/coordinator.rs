// src/engine/coordinator.rs

//! Post-completion bookkeeping.

use std::sync::Arc;

use tracing::{debug, error, info, warn};

use crate::dag::{DependencyIndex, ReadyEntry, ReverseGraph, StatusTracker, TaskKey, TaskStatus};
use crate::engine::TaskOutcome;
use crate::engine::state::SchedulingState;
use crate::types::FailurePolicy;

/// Structured result of a single completion.
///
/// Workers ignore it; tests use it to step the coordinator by hand and
/// assert on what changed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionStep<T> {
    /// Dependents whose last dependency just finished, now in the ready queue.
    pub newly_scheduled: Vec<ReadyEntry<T>>,
    /// Dependents that will never run because this task failed.
    pub newly_skipped: Vec<T>,
    /// Whether this completion observed no remaining work and started the
    /// pool's shutdown. True for at most one completion per run.
    pub shutdown_signalled: bool,
}

/// Serialises every completion through the scheduling lock.
///
/// The reverse graph is immutable and read without locking; the counts, the
/// ready queue and the completion order are only touched while holding the
/// lock in [`SchedulingState`].
#[derive(Debug)]
pub struct CompletionCoordinator<T: TaskKey> {
    reverse: ReverseGraph<T>,
    state: Arc<SchedulingState<T>>,
    statuses: Arc<StatusTracker<T>>,
    policy: FailurePolicy,
}

impl<T: TaskKey> CompletionCoordinator<T> {
    pub fn new(
        reverse: ReverseGraph<T>,
        state: Arc<SchedulingState<T>>,
        statuses: Arc<StatusTracker<T>>,
        policy: FailurePolicy,
    ) -> Self {
        Self {
            reverse,
            state,
            statuses,
            policy,
        }
    }

    /// Build a coordinator and its scheduling state straight from an index.
    ///
    /// Initially ready tasks are enqueued and marked `Scheduled`.
    pub fn from_index(
        index: DependencyIndex<T>,
        statuses: Arc<StatusTracker<T>>,
        policy: FailurePolicy,
    ) -> Self {
        let (reverse, remaining, initial_ready) = index.into_parts();
        for entry in &initial_ready {
            statuses.transition(&entry.task, TaskStatus::Scheduled);
        }
        let state = Arc::new(SchedulingState::new(remaining, initial_ready));
        Self::new(reverse, state, statuses, policy)
    }

    pub fn state(&self) -> &Arc<SchedulingState<T>> {
        &self.state
    }

    /// Record that `task` finished and update the scheduling state.
    ///
    /// 1. Append `task` to the completion order.
    /// 2. If the task succeeded (or failed under [`FailurePolicy::Continue`]),
    ///    decrement each dependent's remaining count and enqueue those that
    ///    reach zero, marking them `Scheduled`. If it failed under
    ///    [`FailurePolicy::SkipDependents`], drop every transitive dependent
    ///    from the counts and mark it `Skipped`.
    /// 3. If no task is waiting and the ready queue is empty, begin shutdown.
    pub fn on_task_complete(&self, task: &T, outcome: &TaskOutcome) -> CompletionStep<T> {
        let mut state = self.state.lock();
        state.completion_order.push(task.clone());

        let mut newly_scheduled = Vec::new();
        let mut newly_skipped = Vec::new();

        let release = outcome.is_success() || self.policy == FailurePolicy::Continue;

        if release {
            for dependent in self.reverse.dependents_of(task) {
                let Some(count) = state.remaining.get_mut(dependent) else {
                    // Skipped by an earlier failure.
                    debug!(
                        task = %task,
                        dependent = %dependent,
                        "dependent no longer waiting; nothing to release"
                    );
                    continue;
                };

                if *count == 0 {
                    error!(
                        task = %task,
                        dependent = %dependent,
                        "remaining-dependency count already zero; ignoring"
                    );
                    continue;
                }

                *count -= 1;
                if *count > 0 {
                    debug!(
                        task = %task,
                        dependent = %dependent,
                        remaining = *count,
                        "dependency satisfied; still waiting"
                    );
                    continue;
                }

                state.remaining.remove(dependent);
                let entry = ReadyEntry::new(dependent.clone(), self.reverse.fan_out(dependent));
                if state.ready.push(entry.clone()) {
                    self.statuses.transition(dependent, TaskStatus::Scheduled);
                    debug!(
                        task = %dependent,
                        fan_out = entry.fan_out,
                        "all dependencies satisfied; scheduled"
                    );
                    newly_scheduled.push(entry);
                }
            }
        } else {
            warn!(task = %task, "task failed; skipping its dependents");
            let mut stack: Vec<&T> = self.reverse.dependents_of(task).iter().collect();
            while let Some(dependent) = stack.pop() {
                if state.remaining.remove(dependent).is_none() {
                    continue;
                }
                self.statuses.transition(dependent, TaskStatus::Skipped);
                debug!(task = %dependent, failed = %task, "skipped due to upstream failure");
                newly_skipped.push(dependent.clone());
                stack.extend(self.reverse.dependents_of(dependent));
            }
        }

        self.state.notify_work(newly_scheduled.len());

        let shutdown_signalled = state.remaining.is_empty()
            && state.ready.is_empty()
            && self.state.begin_shutdown(&mut state);

        if shutdown_signalled {
            info!(
                completed = state.completion_order.len(),
                last = %task,
                "no tasks left waiting or queued; shutting down pool"
            );
        }

        CompletionStep {
            newly_scheduled,
            newly_skipped,
            shutdown_signalled,
        }
    }
}
