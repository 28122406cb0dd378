// src/errors.rs

//! Crate-wide error aliases and helpers.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DagpoolError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("Graph parse error on line {line}: {message}")]
    GraphParse { line: usize, message: String },

    #[error("Dependency graph is empty")]
    EmptyGraph,

    #[error("Task '{task}' depends on unknown task '{dependency}'")]
    UnknownDependency { task: String, dependency: String },

    #[error("Dependency graph has no task without dependencies; nothing can start")]
    NoRootTask,

    #[error("Cycle detected in DAG: {0}")]
    DagCycle(String),

    #[error("Failed to spawn worker thread: {0}")]
    WorkerSpawn(std::io::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, DagpoolError>;
