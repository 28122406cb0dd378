// src/engine/mod.rs

//! Scheduling engine.
//!
//! - [`state`] holds the lock-guarded counts, ready queue and completion order.
//! - [`coordinator`] applies each completion to that state.
//! - [`hooks`] defines the before/after callbacks workers run around a body.
//! - [`pool`] owns the worker threads and their lifecycle.
//! - [`scheduler`] wires everything together for one run.
//! - [`report`] is what a run hands back.

pub mod coordinator;
pub mod hooks;
pub mod pool;
pub mod report;
pub mod scheduler;
pub mod state;

pub use coordinator::{CompletionCoordinator, CompletionStep};
pub use hooks::{ExecutionHooks, SchedulerHooks};
pub use pool::{PoolConfig, WorkerPool};
pub use report::RunReport;
pub use scheduler::{SchedulerOptions, TaskScheduler};
pub use state::SchedulingState;

/// Outcome of running a task body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskOutcome {
    Success,
    Failed(String),
}

impl TaskOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, TaskOutcome::Success)
    }
}
