#![allow(dead_code)]

pub use dagpool_test_utils::body::RecordingBody;
pub use dagpool_test_utils::builders::{
    GraphBuilder, diamond_graph, fan_in_graph, fan_out_graph, test_options,
};
pub use dagpool_test_utils::init_tracing;

use dagpool::dag::DependencyGraph;

/// Position of `task` in `order`; panics if absent.
pub fn position(order: &[String], task: &str) -> usize {
    order
        .iter()
        .position(|t| t == task)
        .unwrap_or_else(|| panic!("task {task} missing from {order:?}"))
}

pub fn assert_topological(graph: &DependencyGraph<String>, order: &[String]) {
    assert!(
        graph.is_topological_order(order),
        "completion order {order:?} is not a topological order of {graph:?}"
    );
}
