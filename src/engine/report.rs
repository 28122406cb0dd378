// src/engine/report.rs

use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

use crate::dag::{TaskKey, TaskStatus};

/// Outcome of a whole scheduling run.
#[derive(Debug, Clone)]
pub struct RunReport<T: TaskKey> {
    /// Tasks in the order workers finished them (failed tasks included).
    pub completion_order: Vec<T>,
    /// Final status of every task.
    pub statuses: BTreeMap<T, TaskStatus>,
    pub elapsed: Duration,
    /// `false` if the maximum wait expired before the pool terminated.
    pub terminated: bool,
}

impl<T: TaskKey> RunReport<T> {
    pub fn tasks_with(&self, status: TaskStatus) -> Vec<T> {
        self.statuses
            .iter()
            .filter(|(_, s)| **s == status)
            .map(|(task, _)| task.clone())
            .collect()
    }

    pub fn failed(&self) -> Vec<T> {
        self.tasks_with(TaskStatus::Failed)
    }

    pub fn skipped(&self) -> Vec<T> {
        self.tasks_with(TaskStatus::Skipped)
    }

    /// The pool terminated and every task completed.
    pub fn is_success(&self) -> bool {
        self.terminated
            && self
                .statuses
                .values()
                .all(|status| *status == TaskStatus::Completed)
    }

    /// Completion order as `A -> B -> C`.
    pub fn order_string(&self) -> String {
        self.completion_order
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(" -> ")
    }
}

impl<T: TaskKey> fmt::Display for RunReport<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Order of task completion : {}", self.order_string())?;
        writeln!(f, "Task status:")?;
        for (task, status) in &self.statuses {
            writeln!(f, "  {task} -> {status}")?;
        }
        if !self.terminated {
            writeln!(f, "WARNING: pool did not terminate within the maximum wait")?;
        }
        write!(f, "Tasks finished. Time to execute : {:.2?}", self.elapsed)
    }
}
