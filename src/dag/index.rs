// src/dag/index.rs

use std::collections::{HashMap, HashSet};

use tracing::debug;

use crate::dag::graph::{DependencyGraph, TaskKey};
use crate::dag::ready_queue::ReadyEntry;

/// Read-only mapping task -> tasks that list it as a dependency.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReverseGraph<T: TaskKey> {
    dependents: HashMap<T, Vec<T>>,
}

impl<T: TaskKey> ReverseGraph<T> {
    /// Direct dependents of `task` (empty if nothing depends on it).
    pub fn dependents_of(&self, task: &T) -> &[T] {
        self.dependents.get(task).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Number of direct dependents of `task`.
    pub fn fan_out(&self, task: &T) -> usize {
        self.dependents_of(task).len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&T, &[T])> {
        self.dependents.iter().map(|(task, deps)| (task, deps.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.dependents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dependents.is_empty()
    }
}

/// Reverse dependency graph plus the initial scheduling state derived from a
/// [`DependencyGraph`].
///
/// The reverse graph is built once and is read-only afterwards, so the
/// coordinator shares it behind an `Arc` without locking. `initial_counts`
/// and `initial_ready` are moved into the coordinator's locked state when a
/// run starts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DependencyIndex<T: TaskKey> {
    reverse: ReverseGraph<T>,
    initial_counts: HashMap<T, usize>,
    initial_ready: Vec<ReadyEntry<T>>,
}

impl<T: TaskKey> DependencyIndex<T> {
    /// Build the reverse graph, the remaining-dependency counts and the set of
    /// tasks that are ready from the start.
    ///
    /// - `t` is added to `reverse[d]` for each dependency `d` of `t`, at most
    ///   once even if `d` is listed several times.
    /// - A task with no dependencies goes straight into `initial_ready` with
    ///   its fan-out; it gets no count entry.
    /// - Any other task gets a count equal to its number of distinct
    ///   dependencies.
    pub fn build(graph: &DependencyGraph<T>) -> Self {
        let mut reverse: HashMap<T, Vec<T>> = HashMap::new();
        let mut initial_counts = HashMap::new();

        for (task, deps) in graph.iter() {
            // Each (dep, task) edge is visited once per task, so dedupe the
            // task's own list rather than scanning `reverse[dep]`.
            let mut seen: HashSet<&T> = HashSet::with_capacity(deps.len());
            for dep in deps {
                if seen.insert(dep) {
                    reverse.entry(dep.clone()).or_default().push(task.clone());
                }
            }
            if !seen.is_empty() {
                initial_counts.insert(task.clone(), seen.len());
            }
        }

        let initial_ready: Vec<ReadyEntry<T>> = graph
            .roots()
            .map(|task| {
                let fan_out = reverse.get(task).map_or(0, Vec::len);
                ReadyEntry::new(task.clone(), fan_out)
            })
            .collect();

        debug!(
            tasks = graph.len(),
            waiting = initial_counts.len(),
            ready = initial_ready.len(),
            "built dependency index"
        );

        Self {
            reverse: ReverseGraph {
                dependents: reverse,
            },
            initial_counts,
            initial_ready,
        }
    }

    pub fn dependents_of(&self, task: &T) -> &[T] {
        self.reverse.dependents_of(task)
    }

    pub fn fan_out(&self, task: &T) -> usize {
        self.reverse.fan_out(task)
    }

    pub fn reverse_graph(&self) -> &ReverseGraph<T> {
        &self.reverse
    }

    pub fn initial_counts(&self) -> &HashMap<T, usize> {
        &self.initial_counts
    }

    pub fn initial_ready(&self) -> &[ReadyEntry<T>] {
        &self.initial_ready
    }

    /// Split into the read-only reverse graph and the mutable seed state.
    pub(crate) fn into_parts(self) -> (ReverseGraph<T>, HashMap<T, usize>, Vec<ReadyEntry<T>>) {
        (self.reverse, self.initial_counts, self.initial_ready)
    }
}
