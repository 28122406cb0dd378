// src/config/text.rs

//! Plain-text graph format.
//!
//! One task per line:
//!
//! ```text
//! # comment
//! A
//! B
//! C -> A, B
//! ```
//!
//! A bare name declares a task without dependencies; `TASK -> DEP, DEP`
//! declares dependencies. Repeating a task appends to its list.

use crate::dag::DependencyGraph;
use crate::errors::{DagpoolError, Result};

pub fn parse_graph_text(input: &str) -> Result<DependencyGraph<String>> {
    let mut graph = DependencyGraph::new();

    for (idx, raw) in input.lines().enumerate() {
        let line_no = idx + 1;
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let Some((task, deps)) = line.split_once("->") else {
            graph.add_task(line.to_string());
            continue;
        };

        let task = task.trim();
        if task.is_empty() {
            return Err(parse_error(line_no, "missing task name before '->'"));
        }

        let deps: Vec<String> = deps
            .split(',')
            .map(str::trim)
            .filter(|dep| !dep.is_empty())
            .map(str::to_string)
            .collect();
        if deps.is_empty() {
            return Err(parse_error(
                line_no,
                &format!("task '{task}' has '->' but no dependencies"),
            ));
        }

        graph.insert(task.to_string(), deps);
    }

    Ok(graph)
}

fn parse_error(line: usize, message: &str) -> DagpoolError {
    DagpoolError::GraphParse {
        line,
        message: message.to_string(),
    }
}
