// src/dag/mod.rs

//! Dependency graph representation and the scheduling data structures built
//! from it.
//!
//! - [`graph`] holds the caller-supplied forward dependency map.
//! - [`validate`] rejects graphs the scheduler could never finish.
//! - [`index`] derives the reverse graph, remaining-dependency counts and the
//!   initially ready tasks.
//! - [`ready_queue`] orders ready tasks by fan-out.
//! - [`status`] tracks each task's lifecycle state.

pub mod graph;
pub mod index;
pub mod ready_queue;
pub mod status;
pub mod validate;

pub use graph::{DependencyGraph, TaskKey};
pub use index::{DependencyIndex, ReverseGraph};
pub use ready_queue::{ReadyEntry, ReadyQueue};
pub use status::{StatusTracker, TaskStatus};
pub use validate::validate_graph;
