// src/dag/graph.rs

use std::collections::{BTreeMap, HashMap};
use std::fmt::{Debug, Display};
use std::hash::Hash;

/// Anything usable as a task identifier.
///
/// Blanket-implemented, so `String`, `&'static str` and the integer types all
/// work without ceremony.
pub trait TaskKey: Clone + Eq + Hash + Ord + Debug + Display + Send + Sync + 'static {}

impl<T> TaskKey for T where T: Clone + Eq + Hash + Ord + Debug + Display + Send + Sync + 'static {}

/// Forward dependency map: task -> tasks it must wait for.
///
/// Iteration order is the key order of the underlying `BTreeMap`, which keeps
/// everything derived from the graph deterministic. The graph is handed to the
/// scheduler by value and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DependencyGraph<T: TaskKey> {
    deps: BTreeMap<T, Vec<T>>,
}

impl<T: TaskKey> Default for DependencyGraph<T> {
    fn default() -> Self {
        Self {
            deps: BTreeMap::new(),
        }
    }
}

impl<T: TaskKey> DependencyGraph<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `task` with the given dependencies.
    ///
    /// If the task is already present the dependencies are appended, so a
    /// graph may be assembled line by line.
    pub fn insert(&mut self, task: T, deps: impl IntoIterator<Item = T>) {
        self.deps.entry(task).or_default().extend(deps);
    }

    /// Add a task without dependencies (no-op if it already exists).
    pub fn add_task(&mut self, task: T) {
        self.deps.entry(task).or_default();
    }

    pub fn tasks(&self) -> impl Iterator<Item = &T> {
        self.deps.keys()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&T, &[T])> {
        self.deps.iter().map(|(task, deps)| (task, deps.as_slice()))
    }

    /// Immediate dependencies of a task, as listed by the caller.
    pub fn dependencies_of(&self, task: &T) -> &[T] {
        self.deps.get(task).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Tasks with an empty dependency list.
    pub fn roots(&self) -> impl Iterator<Item = &T> {
        self.deps
            .iter()
            .filter(|(_, deps)| deps.is_empty())
            .map(|(task, _)| task)
    }

    pub fn contains(&self, task: &T) -> bool {
        self.deps.contains_key(task)
    }

    pub fn len(&self) -> usize {
        self.deps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.deps.is_empty()
    }

    /// Whether `order` lists every task exactly once, each after all of its
    /// dependencies.
    pub fn is_topological_order(&self, order: &[T]) -> bool {
        if order.len() != self.deps.len() {
            return false;
        }

        let mut position: HashMap<&T, usize> = HashMap::with_capacity(order.len());
        for (idx, task) in order.iter().enumerate() {
            if !self.deps.contains_key(task) || position.insert(task, idx).is_some() {
                return false;
            }
        }

        self.deps.iter().all(|(task, deps)| {
            let at = position[task];
            deps.iter()
                .all(|dep| position.get(dep).is_some_and(|&dep_at| dep_at < at))
        })
    }
}

impl<T: TaskKey> FromIterator<(T, Vec<T>)> for DependencyGraph<T> {
    fn from_iter<I: IntoIterator<Item = (T, Vec<T>)>>(iter: I) -> Self {
        let mut graph = Self::new();
        for (task, deps) in iter {
            graph.insert(task, deps);
        }
        graph
    }
}

impl<T: TaskKey> From<BTreeMap<T, Vec<T>>> for DependencyGraph<T> {
    fn from(deps: BTreeMap<T, Vec<T>>) -> Self {
        Self { deps }
    }
}

impl<T: TaskKey> From<HashMap<T, Vec<T>>> for DependencyGraph<T> {
    fn from(deps: HashMap<T, Vec<T>>) -> Self {
        deps.into_iter().collect()
    }
}
