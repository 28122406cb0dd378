// src/dag/validate.rs

//! Up-front checks that turn a would-be scheduler stall into an error.
//!
//! A graph the scheduler cannot finish shows up at runtime as an empty ready
//! queue with non-zero remaining counts. Everything that leads there is
//! rejected here, before a single worker starts.

use std::collections::HashMap;

use petgraph::algo::toposort;
use petgraph::graph::{DiGraph, NodeIndex};

use crate::dag::graph::{DependencyGraph, TaskKey};
use crate::errors::{DagpoolError, Result};

/// Validate that `graph` can be scheduled to completion.
///
/// Checks, in order:
/// - the graph has at least one task,
/// - every dependency is itself a task in the graph,
/// - at least one task has no dependencies,
/// - the graph is acyclic (this includes self-dependencies).
pub fn validate_graph<T: TaskKey>(graph: &DependencyGraph<T>) -> Result<()> {
    ensure_not_empty(graph)?;
    ensure_dependencies_known(graph)?;
    ensure_has_root(graph)?;
    ensure_acyclic(graph)?;
    Ok(())
}

fn ensure_not_empty<T: TaskKey>(graph: &DependencyGraph<T>) -> Result<()> {
    if graph.is_empty() {
        return Err(DagpoolError::EmptyGraph);
    }
    Ok(())
}

fn ensure_dependencies_known<T: TaskKey>(graph: &DependencyGraph<T>) -> Result<()> {
    for (task, deps) in graph.iter() {
        if let Some(dep) = deps.iter().find(|dep| !graph.contains(dep)) {
            return Err(DagpoolError::UnknownDependency {
                task: task.to_string(),
                dependency: dep.to_string(),
            });
        }
    }
    Ok(())
}

fn ensure_has_root<T: TaskKey>(graph: &DependencyGraph<T>) -> Result<()> {
    if graph.roots().next().is_none() {
        return Err(DagpoolError::NoRootTask);
    }
    Ok(())
}

fn ensure_acyclic<T: TaskKey>(graph: &DependencyGraph<T>) -> Result<()> {
    // Edge direction: dep -> task, i.e. `B -> A` for `B` depending on `A`
    // becomes the edge A -> B.
    let mut dag: DiGraph<&T, ()> = DiGraph::with_capacity(graph.len(), graph.len());
    let mut nodes: HashMap<&T, NodeIndex> = HashMap::with_capacity(graph.len());

    for task in graph.tasks() {
        nodes.insert(task, dag.add_node(task));
    }

    for (task, deps) in graph.iter() {
        for dep in deps {
            dag.update_edge(nodes[dep], nodes[task], ());
        }
    }

    match toposort(&dag, None) {
        Ok(_order) => Ok(()),
        Err(cycle) => Err(DagpoolError::DagCycle(format!(
            "cycle detected in task DAG involving task '{}'",
            dag[cycle.node_id()]
        ))),
    }
}
