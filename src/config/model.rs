// src/config/model.rs

use std::collections::{BTreeMap, HashMap};
use std::time::Duration;

use serde::Deserialize;

use crate::dag::DependencyGraph;
use crate::engine::SchedulerOptions;
use crate::exec::SimulatedWork;
use crate::types::FailurePolicy;

/// Top-level configuration as read from a TOML file.
///
/// ```toml
/// [pool]
/// pool_size = 4
/// failure_policy = "skip-dependents"
///
/// [task.A]
///
/// [task.B]
/// after = ["A"]
/// cmd = "echo B"
/// ```
///
/// All sections are optional and have reasonable defaults.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct RawConfigFile {
    /// Worker pool behaviour from `[pool]`.
    #[serde(default)]
    pub pool: PoolSection,

    /// All tasks from `[task.<name>]`, keyed by task name.
    #[serde(default)]
    pub task: BTreeMap<String, TaskConfig>,
}

/// Validated configuration.
///
/// Only obtainable through `TryFrom<RawConfigFile>`, which guarantees a
/// non-empty, acyclic graph whose dependencies all exist.
#[derive(Debug, Clone)]
pub struct ConfigFile {
    pub pool: PoolSection,
    pub task: BTreeMap<String, TaskConfig>,
}

impl ConfigFile {
    pub(crate) fn new_unchecked(pool: PoolSection, task: BTreeMap<String, TaskConfig>) -> Self {
        Self { pool, task }
    }

    /// Dependency graph described by the `after` lists.
    pub fn graph(&self) -> DependencyGraph<String> {
        graph_from_tasks(&self.task)
    }

    /// Shell commands of the tasks that define one.
    pub fn commands(&self) -> HashMap<String, String> {
        self.task
            .iter()
            .filter_map(|(name, task)| task.cmd.clone().map(|cmd| (name.clone(), cmd)))
            .collect()
    }

    pub fn scheduler_options(&self) -> SchedulerOptions {
        self.pool.scheduler_options()
    }
}

pub(crate) fn graph_from_tasks(tasks: &BTreeMap<String, TaskConfig>) -> DependencyGraph<String> {
    tasks
        .iter()
        .map(|(name, task)| (name.clone(), task.after.clone()))
        .collect()
}

/// `[pool]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct PoolSection {
    /// Number of worker threads.
    #[serde(default = "default_pool_size")]
    pub pool_size: usize,

    /// Idle worker wake-up interval, in seconds.
    #[serde(default = "default_keep_alive_secs")]
    pub keep_alive_secs: u64,

    /// Maximum wait for the whole schedule, in seconds.
    #[serde(default = "default_max_wait_secs")]
    pub max_wait_secs: u64,

    #[serde(default)]
    pub failure_policy: FailurePolicy,

    /// One unit of simulated work, in milliseconds. Tasks without a `cmd`
    /// sleep between 0 and 9 units.
    #[serde(default = "default_work_unit_ms")]
    pub work_unit_ms: u64,
}

fn default_pool_size() -> usize {
    SchedulerOptions::DEFAULT_POOL_SIZE
}

fn default_keep_alive_secs() -> u64 {
    SchedulerOptions::DEFAULT_KEEP_ALIVE.as_secs()
}

fn default_max_wait_secs() -> u64 {
    SchedulerOptions::DEFAULT_MAX_WAIT.as_secs()
}

fn default_work_unit_ms() -> u64 {
    1000
}

impl Default for PoolSection {
    fn default() -> Self {
        Self {
            pool_size: default_pool_size(),
            keep_alive_secs: default_keep_alive_secs(),
            max_wait_secs: default_max_wait_secs(),
            failure_policy: FailurePolicy::default(),
            work_unit_ms: default_work_unit_ms(),
        }
    }
}

impl PoolSection {
    pub fn scheduler_options(&self) -> SchedulerOptions {
        SchedulerOptions {
            pool_size: self.pool_size,
            keep_alive: Duration::from_secs(self.keep_alive_secs),
            max_wait: Duration::from_secs(self.max_wait_secs),
            failure_policy: self.failure_policy,
        }
    }

    pub fn simulated_work(&self) -> SimulatedWork {
        SimulatedWork::new(Duration::from_millis(self.work_unit_ms))
    }
}

/// `[task.<name>]` section.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct TaskConfig {
    /// Dependency list: this task waits for all tasks listed here.
    #[serde(default)]
    pub after: Vec<String>,

    /// Optional shell command. Tasks without one run simulated work.
    #[serde(default)]
    pub cmd: Option<String>,
}
