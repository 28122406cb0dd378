// src/exec/body.rs

//! Task bodies: the unit of work a worker runs for a task.

use std::thread;
use std::time::Duration;

use anyhow::Result;
use tracing::info;

use crate::dag::TaskKey;

/// The work performed for a task once its dependencies are satisfied.
///
/// Implementations are shared by all workers, so they must be `Send + Sync`.
/// Returning an error marks the task `Failed`; what happens to its dependents
/// is decided by the run's [`FailurePolicy`](crate::types::FailurePolicy).
/// No retry is attempted.
pub trait TaskBody<T>: Send + Sync {
    fn run(&self, task: &T) -> Result<()>;
}

impl<T, F> TaskBody<T> for F
where
    F: Fn(&T) -> Result<()> + Send + Sync,
{
    fn run(&self, task: &T) -> Result<()> {
        self(task)
    }
}

/// Simulated work: sleeps a random number of units in `0..max_units`.
///
/// Models tasks of variable cost. With the defaults (1s units, 10 units) a
/// task takes between 0 and 9 seconds.
#[derive(Debug, Clone, Copy)]
pub struct SimulatedWork {
    pub unit: Duration,
    pub max_units: u32,
}

impl SimulatedWork {
    pub const DEFAULT_MAX_UNITS: u32 = 10;

    pub fn new(unit: Duration) -> Self {
        Self {
            unit,
            max_units: Self::DEFAULT_MAX_UNITS,
        }
    }
}

impl Default for SimulatedWork {
    fn default() -> Self {
        Self::new(Duration::from_secs(1))
    }
}

impl<T: TaskKey> TaskBody<T> for SimulatedWork {
    fn run(&self, task: &T) -> Result<()> {
        let units = fastrand::u32(0..self.max_units.max(1));
        info!(task = %task, units, "starting simulated task");
        thread::sleep(self.unit * units);
        info!(task = %task, units, "finished simulated task");
        Ok(())
    }
}
