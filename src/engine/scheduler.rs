// src/engine/scheduler.rs

use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{info, warn};

use crate::dag::{DependencyGraph, DependencyIndex, StatusTracker, TaskKey, validate_graph};
use crate::engine::coordinator::CompletionCoordinator;
use crate::engine::hooks::{ExecutionHooks, SchedulerHooks};
use crate::engine::pool::{PoolConfig, WorkerPool};
use crate::engine::report::RunReport;
use crate::errors::{DagpoolError, Result};
use crate::exec::TaskBody;
use crate::types::FailurePolicy;

/// Runtime knobs for one scheduling run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SchedulerOptions {
    /// Number of worker threads, all started eagerly.
    pub pool_size: usize,
    /// Idle worker wake-up interval. Must be non-zero.
    pub keep_alive: Duration,
    /// Upper bound on how long `run` waits for the pool to terminate.
    pub max_wait: Duration,
    pub failure_policy: FailurePolicy,
}

impl SchedulerOptions {
    pub const DEFAULT_POOL_SIZE: usize = 3;
    pub const DEFAULT_KEEP_ALIVE: Duration = Duration::from_secs(10);
    pub const DEFAULT_MAX_WAIT: Duration = Duration::from_secs(60 * 60);
}

impl Default for SchedulerOptions {
    fn default() -> Self {
        Self {
            pool_size: Self::DEFAULT_POOL_SIZE,
            keep_alive: Self::DEFAULT_KEEP_ALIVE,
            max_wait: Self::DEFAULT_MAX_WAIT,
            failure_policy: FailurePolicy::default(),
        }
    }
}

/// Runs a [`DependencyGraph`] on a pool of worker threads.
///
/// The status tracker is created up front (every task `Waiting`) so callers
/// can take a handle via [`TaskScheduler::status_tracker`] and watch it from
/// another thread while [`TaskScheduler::run`] blocks.
pub struct TaskScheduler<T: TaskKey, B: TaskBody<T> + ?Sized> {
    graph: DependencyGraph<T>,
    body: Arc<B>,
    options: SchedulerOptions,
    statuses: Arc<StatusTracker<T>>,
    observer: Option<Arc<dyn ExecutionHooks<T>>>,
}

impl<T: TaskKey, B: TaskBody<T> + 'static> TaskScheduler<T, B> {
    pub fn new(graph: DependencyGraph<T>, body: B) -> Self {
        Self::with_shared_body(graph, Arc::new(body))
    }
}

impl<T: TaskKey, B: TaskBody<T> + ?Sized + 'static> TaskScheduler<T, B> {
    pub fn with_shared_body(graph: DependencyGraph<T>, body: Arc<B>) -> Self {
        let statuses = Arc::new(StatusTracker::from_graph(&graph));
        Self {
            graph,
            body,
            options: SchedulerOptions::default(),
            statuses,
            observer: None,
        }
    }

    pub fn with_options(mut self, options: SchedulerOptions) -> Self {
        self.options = options;
        self
    }

    /// Extra hooks invoked by workers after the scheduler's own.
    pub fn with_observer(mut self, observer: Arc<dyn ExecutionHooks<T>>) -> Self {
        self.observer = Some(observer);
        self
    }

    pub fn graph(&self) -> &DependencyGraph<T> {
        &self.graph
    }

    pub fn options(&self) -> &SchedulerOptions {
        &self.options
    }

    pub fn status_tracker(&self) -> Arc<StatusTracker<T>> {
        Arc::clone(&self.statuses)
    }

    /// Validate the graph, run every task and wait for the pool to finish.
    ///
    /// Malformed graphs are rejected before any worker starts. If the pool
    /// does not terminate within `max_wait`, a warning is logged and a report
    /// with `terminated == false` is returned; workers are not stopped.
    pub fn run(self) -> Result<RunReport<T>> {
        if self.options.pool_size == 0 {
            return Err(DagpoolError::ConfigError(
                "pool size must be >= 1 (got 0)".to_string(),
            ));
        }
        if self.options.keep_alive.is_zero() {
            return Err(DagpoolError::ConfigError(
                "keep-alive must be greater than zero".to_string(),
            ));
        }

        validate_graph(&self.graph)?;

        let index = DependencyIndex::build(&self.graph);
        info!(
            tasks = self.graph.len(),
            ready = index.initial_ready().len(),
            workers = self.options.pool_size,
            policy = %self.options.failure_policy,
            "starting scheduling run"
        );

        let coordinator = Arc::new(CompletionCoordinator::from_index(
            index,
            Arc::clone(&self.statuses),
            self.options.failure_policy,
        ));
        let state = Arc::clone(coordinator.state());
        let hooks = Arc::new(SchedulerHooks::new(
            Arc::clone(&self.statuses),
            coordinator,
            self.observer.clone(),
        ));

        let started = Instant::now();
        let pool = WorkerPool::start(
            PoolConfig {
                size: self.options.pool_size,
                keep_alive: self.options.keep_alive,
            },
            Arc::clone(&state),
            Arc::clone(&self.body),
            hooks,
        )?;

        let terminated = pool.await_termination(self.options.max_wait);
        let elapsed = started.elapsed();

        if terminated {
            info!(elapsed_ms = elapsed.as_millis() as u64, "scheduling run finished");
        } else {
            warn!(
                elapsed_ms = elapsed.as_millis() as u64,
                "scheduling run abandoned after maximum wait"
            );
        }

        Ok(RunReport {
            completion_order: state.completion_order(),
            statuses: self.statuses.snapshot(),
            elapsed,
            terminated,
        })
    }
}
