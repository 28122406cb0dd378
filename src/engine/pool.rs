// src/engine/pool.rs

//! Fixed-size pool of worker threads draining the ready queue.

use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use tracing::{debug, error, info, warn};

use crate::dag::TaskKey;
use crate::engine::hooks::ExecutionHooks;
use crate::engine::state::SchedulingState;
use crate::errors::{DagpoolError, Result};
use crate::exec::{TaskBody, run_guarded};

/// Pool sizing and idle behaviour.
#[derive(Debug, Clone, Copy)]
pub struct PoolConfig {
    pub size: usize,
    /// How often an idle worker wakes to re-check the pool state.
    pub keep_alive: Duration,
}

/// Handle to a running pool.
///
/// All workers are started eagerly by [`WorkerPool::start`]. Each loops:
/// dequeue (blocking) -> before-hook -> body -> after-hook, until shutdown
/// has begun and the ready queue is empty.
#[derive(Debug)]
pub struct WorkerPool<T: TaskKey> {
    state: Arc<SchedulingState<T>>,
    handles: Vec<JoinHandle<()>>,
}

impl<T: TaskKey> WorkerPool<T> {
    pub fn start<B, H>(
        config: PoolConfig,
        state: Arc<SchedulingState<T>>,
        body: Arc<B>,
        hooks: Arc<H>,
    ) -> Result<Self>
    where
        B: TaskBody<T> + ?Sized + 'static,
        H: ExecutionHooks<T> + ?Sized + 'static,
    {
        let mut handles = Vec::with_capacity(config.size);

        for id in 0..config.size {
            state.worker_started();

            let worker = Worker {
                id,
                keep_alive: config.keep_alive,
                state: Arc::clone(&state),
                body: Arc::clone(&body),
                hooks: Arc::clone(&hooks),
            };

            let spawned = thread::Builder::new()
                .name(format!("dagpool-worker-{id}"))
                .spawn(move || worker.run());

            match spawned {
                Ok(handle) => handles.push(handle),
                Err(err) => {
                    error!(worker = id, error = %err, "failed to spawn worker thread");
                    state.worker_exited();
                    state.abort();
                    return Err(DagpoolError::WorkerSpawn(err));
                }
            }
        }

        info!(workers = config.size, "worker pool started");
        Ok(Self { state, handles })
    }

    /// Block until every worker has exited, for at most `max_wait`.
    ///
    /// Returns `true` if the pool terminated in time. On timeout the worker
    /// threads are detached and keep running; nothing cancels their bodies.
    pub fn await_termination(self, max_wait: Duration) -> bool {
        let deadline = Instant::now() + max_wait;

        if !self.state.wait_for_workers(deadline) {
            warn!(
                max_wait_secs = max_wait.as_secs_f64(),
                remaining = self.state.remaining_len(),
                queued = self.state.ready_len(),
                "worker pool did not terminate within the maximum wait; tasks may still be running"
            );
            return false;
        }

        for handle in self.handles {
            if handle.join().is_err() {
                error!("worker thread panicked outside a task body");
            }
        }

        info!("worker pool terminated");
        true
    }
}

struct Worker<T: TaskKey, B: ?Sized, H: ?Sized> {
    id: usize,
    keep_alive: Duration,
    state: Arc<SchedulingState<T>>,
    body: Arc<B>,
    hooks: Arc<H>,
}

impl<T, B, H> Worker<T, B, H>
where
    T: TaskKey,
    B: TaskBody<T> + ?Sized,
    H: ExecutionHooks<T> + ?Sized,
{
    fn run(self) {
        let _exit = ExitGuard {
            id: self.id,
            state: self.state.as_ref(),
        };
        debug!(worker = self.id, "worker started");

        while let Some(entry) = self.state.dequeue(self.keep_alive) {
            debug!(
                worker = self.id,
                task = %entry.task,
                fan_out = entry.fan_out,
                "dispatching task"
            );
            self.hooks.before_run(&entry);
            let outcome = run_guarded(&*self.body, &entry.task);
            self.hooks.after_run(&entry, &outcome);
        }

        debug!(worker = self.id, "worker leaving loop; pool shut down and queue drained");
    }
}

/// Reports the worker's exit even if a hook panics, so the caller's wait
/// does not hang on a dead thread.
struct ExitGuard<'a, T: TaskKey> {
    id: usize,
    state: &'a SchedulingState<T>,
}

impl<T: TaskKey> Drop for ExitGuard<'_, T> {
    fn drop(&mut self) {
        if thread::panicking() {
            error!(worker = self.id, "worker panicked outside a task body; aborting run");
            self.state.abort();
        }
        self.state.worker_exited();
    }
}
