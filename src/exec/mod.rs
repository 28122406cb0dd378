// src/exec/mod.rs

//! Task execution layer.
//!
//! - [`body`] defines the [`TaskBody`] trait, the closure adapter and the
//!   simulated-work body.
//! - [`command`] runs shell commands configured per task.
//! - [`runner`] isolates a body's errors and panics from the worker running it.

pub mod body;
pub mod command;
pub mod runner;

pub use body::{SimulatedWork, TaskBody};
pub use command::CommandBody;
pub use runner::run_guarded;
