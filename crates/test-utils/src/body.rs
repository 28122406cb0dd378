use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use anyhow::{Result, bail};
use parking_lot::Mutex;

use dagpool::exec::TaskBody;

/// A task body that:
/// - records the order in which bodies *started*
/// - optionally sleeps per task
/// - fails or panics for scripted tasks.
#[derive(Clone, Default)]
pub struct RecordingBody {
    started: Arc<Mutex<Vec<String>>>,
    delays: HashMap<String, Duration>,
    default_delay: Duration,
    failing: HashSet<String>,
    panicking: HashSet<String>,
}

impl RecordingBody {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_default_delay(mut self, delay: Duration) -> Self {
        self.default_delay = delay;
        self
    }

    pub fn with_delay(mut self, task: &str, delay: Duration) -> Self {
        self.delays.insert(task.to_string(), delay);
        self
    }

    pub fn failing(mut self, task: &str) -> Self {
        self.failing.insert(task.to_string());
        self
    }

    pub fn panicking(mut self, task: &str) -> Self {
        self.panicking.insert(task.to_string());
        self
    }

    /// Shared handle to the start log; stays valid after the body is moved
    /// into a scheduler.
    pub fn started_handle(&self) -> Arc<Mutex<Vec<String>>> {
        Arc::clone(&self.started)
    }
}

impl TaskBody<String> for RecordingBody {
    fn run(&self, task: &String) -> Result<()> {
        self.started.lock().push(task.clone());

        let delay = self.delays.get(task).copied().unwrap_or(self.default_delay);
        if !delay.is_zero() {
            thread::sleep(delay);
        }

        if self.panicking.contains(task) {
            panic!("scripted panic in task {task}");
        }
        if self.failing.contains(task) {
            bail!("scripted failure in task {task}");
        }
        Ok(())
    }
}
