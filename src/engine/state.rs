// src/engine/state.rs

//! Shared scheduling state guarded by the coordinator's single lock.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use parking_lot::{Condvar, Mutex, MutexGuard};
use tracing::{debug, trace, warn};

use crate::dag::{ReadyEntry, ReadyQueue, TaskKey};

/// Everything that must change atomically when a task completes.
///
/// Promoting a task from `remaining` into `ready` happens under one lock, so
/// a task can neither be enqueued twice nor be lost between the two.
#[derive(Debug)]
pub(crate) struct LockedState<T: TaskKey> {
    /// Remaining-dependency count per waiting task. Tasks leave this map when
    /// their count reaches zero (or when they are skipped).
    pub(crate) remaining: HashMap<T, usize>,
    pub(crate) ready: ReadyQueue<T>,
    /// Finish order of every task that ran, failed ones included.
    pub(crate) completion_order: Vec<T>,
    /// Set once, by the completion that observes no remaining work.
    pub(crate) shutdown: bool,
    /// Workers that have not yet left their loop.
    pub(crate) live_workers: usize,
}

/// Lock plus the two condition variables workers and the caller block on.
#[derive(Debug)]
pub struct SchedulingState<T: TaskKey> {
    inner: Mutex<LockedState<T>>,
    /// Signalled when a task is enqueued or shutdown begins.
    work_available: Condvar,
    /// Signalled when the last worker exits.
    workers_exited: Condvar,
}

impl<T: TaskKey> SchedulingState<T> {
    /// Seed the state with the initial counts and ready entries.
    pub fn new(remaining: HashMap<T, usize>, initial_ready: Vec<ReadyEntry<T>>) -> Self {
        let mut ready = ReadyQueue::new();
        ready.extend(initial_ready);
        Self {
            inner: Mutex::new(LockedState {
                remaining,
                ready,
                completion_order: Vec::new(),
                shutdown: false,
                live_workers: 0,
            }),
            work_available: Condvar::new(),
            workers_exited: Condvar::new(),
        }
    }

    pub(crate) fn lock(&self) -> MutexGuard<'_, LockedState<T>> {
        self.inner.lock()
    }

    pub(crate) fn notify_work(&self, tasks: usize) {
        match tasks {
            0 => {}
            1 => {
                self.work_available.notify_one();
            }
            _ => {
                self.work_available.notify_all();
            }
        }
    }

    /// Flip the shutdown flag (if not already set) and wake every idle worker.
    ///
    /// Returns `true` only for the call that actually set the flag.
    pub(crate) fn begin_shutdown(&self, state: &mut LockedState<T>) -> bool {
        if state.shutdown {
            return false;
        }
        state.shutdown = true;
        self.work_available.notify_all();
        true
    }

    /// Stop dispatching regardless of remaining work. Used when a worker dies
    /// outside a task body and the run can no longer finish normally.
    pub(crate) fn abort(&self) {
        let mut state = self.inner.lock();
        if self.begin_shutdown(&mut state) {
            warn!(
                remaining = state.remaining.len(),
                ready = state.ready.len(),
                "scheduling aborted with work outstanding"
            );
        }
    }

    /// Blocking dequeue for workers.
    ///
    /// Waits while the ready queue is empty and shutdown has not begun,
    /// waking every `keep_alive` to re-check. Returns `None` once the pool is
    /// shutting down.
    pub(crate) fn dequeue(&self, keep_alive: Duration) -> Option<ReadyEntry<T>> {
        let mut state = self.inner.lock();
        loop {
            // Shutdown only begins once the queue is empty for good, so an
            // entry still queued here means the run was aborted.
            if state.shutdown {
                return None;
            }
            if let Some(entry) = state.ready.pop() {
                return Some(entry);
            }
            if self
                .work_available
                .wait_for(&mut state, keep_alive)
                .timed_out()
            {
                trace!(
                    remaining = state.remaining.len(),
                    "worker idle for keep-alive interval; still waiting"
                );
            }
        }
    }

    /// Non-blocking dequeue; `None` if the queue is empty or shut down.
    pub fn try_dequeue(&self) -> Option<ReadyEntry<T>> {
        let mut state = self.inner.lock();
        if state.shutdown {
            return None;
        }
        state.ready.pop()
    }

    pub(crate) fn worker_started(&self) {
        self.inner.lock().live_workers += 1;
    }

    pub(crate) fn worker_exited(&self) {
        let mut state = self.inner.lock();
        state.live_workers = state.live_workers.saturating_sub(1);
        debug!(live_workers = state.live_workers, "worker exited");
        if state.live_workers == 0 {
            self.workers_exited.notify_all();
        }
    }

    /// Block until every worker has exited or `deadline` passes.
    ///
    /// Returns `true` if the workers exited in time.
    pub(crate) fn wait_for_workers(&self, deadline: Instant) -> bool {
        let mut state = self.inner.lock();
        while state.live_workers > 0 {
            if self
                .workers_exited
                .wait_until(&mut state, deadline)
                .timed_out()
            {
                return state.live_workers == 0;
            }
        }
        true
    }

    /// Copy of the completion order recorded so far.
    pub fn completion_order(&self) -> Vec<T> {
        self.inner.lock().completion_order.clone()
    }

    pub fn is_shut_down(&self) -> bool {
        self.inner.lock().shutdown
    }

    /// Number of tasks still waiting on dependencies.
    pub fn remaining_len(&self) -> usize {
        self.inner.lock().remaining.len()
    }

    pub fn ready_len(&self) -> usize {
        self.inner.lock().ready.len()
    }
}
