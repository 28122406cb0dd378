#![allow(dead_code)]

use std::time::Duration;

use dagpool::dag::DependencyGraph;
use dagpool::engine::SchedulerOptions;
use dagpool::types::FailurePolicy;

/// Builder for string-keyed `DependencyGraph`s.
///
/// ```ignore
/// let graph = GraphBuilder::new()
///     .root("A")
///     .task("B", &["A"])
///     .build();
/// ```
#[derive(Default)]
pub struct GraphBuilder {
    graph: DependencyGraph<String>,
}

impl GraphBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn root(mut self, name: &str) -> Self {
        self.graph.add_task(name.to_string());
        self
    }

    pub fn task(mut self, name: &str, deps: &[&str]) -> Self {
        self.graph
            .insert(name.to_string(), deps.iter().map(|d| d.to_string()));
        self
    }

    pub fn build(self) -> DependencyGraph<String> {
        self.graph
    }
}

/// `{A: [], B: [A], C: [A]}`
pub fn fan_out_graph() -> DependencyGraph<String> {
    GraphBuilder::new()
        .root("A")
        .task("B", &["A"])
        .task("C", &["A"])
        .build()
}

/// `{A: [], B: [], C: [A, B]}`
pub fn fan_in_graph() -> DependencyGraph<String> {
    GraphBuilder::new()
        .root("A")
        .root("B")
        .task("C", &["A", "B"])
        .build()
}

/// `{A: [], B: [A], C: [A], D: [B, C]}`
pub fn diamond_graph() -> DependencyGraph<String> {
    GraphBuilder::new()
        .root("A")
        .task("B", &["A"])
        .task("C", &["A"])
        .task("D", &["B", "C"])
        .build()
}

/// Options suited to tests: short keep-alive, bounded wait.
pub fn test_options(pool_size: usize) -> SchedulerOptions {
    SchedulerOptions {
        pool_size,
        keep_alive: Duration::from_millis(50),
        max_wait: Duration::from_secs(10),
        failure_policy: FailurePolicy::SkipDependents,
    }
}
