// src/config/loader.rs

use std::fs;
use std::path::Path;

use tracing::debug;

use crate::config::model::{ConfigFile, RawConfigFile};
use crate::config::text::parse_graph_text;
use crate::dag::DependencyGraph;
use crate::errors::Result;

/// A graph as loaded from disk.
#[derive(Debug, Clone)]
pub enum GraphSource {
    /// A validated TOML config (graph, commands and pool settings).
    Config(ConfigFile),
    /// A bare text graph; validated when scheduled.
    Text(DependencyGraph<String>),
}

impl GraphSource {
    pub fn graph(&self) -> DependencyGraph<String> {
        match self {
            GraphSource::Config(cfg) => cfg.graph(),
            GraphSource::Text(graph) => graph.clone(),
        }
    }
}

/// Load a configuration file from a given path and return the raw `RawConfigFile`.
///
/// This only performs TOML deserialization; it does **not** perform semantic
/// validation. Use [`load_and_validate`] for that.
pub fn load_from_path(path: impl AsRef<Path>) -> Result<RawConfigFile> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path)?;

    let config: RawConfigFile = toml::from_str(&contents)?;

    Ok(config)
}

/// Load a TOML configuration file and validate it: at least one task, sane
/// pool settings, known `after` references, no cycles.
pub fn load_and_validate(path: impl AsRef<Path>) -> Result<ConfigFile> {
    let raw_config = load_from_path(&path)?;
    let config = ConfigFile::try_from(raw_config)?;
    Ok(config)
}

/// Read a graph in the plain-text `TASK -> DEP, DEP` format.
pub fn load_graph_text(path: impl AsRef<Path>) -> Result<DependencyGraph<String>> {
    let contents = fs::read_to_string(path)?;
    parse_graph_text(&contents)
}

/// Load `path` as TOML config if it ends in `.toml`, as a text graph otherwise.
pub fn load_source(path: impl AsRef<Path>) -> Result<GraphSource> {
    let path = path.as_ref();
    let is_toml = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("toml"));

    debug!(path = %path.display(), is_toml, "loading graph");

    if is_toml {
        load_and_validate(path).map(GraphSource::Config)
    } else {
        load_graph_text(path).map(GraphSource::Text)
    }
}
