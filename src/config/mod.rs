// src/config/mod.rs

//! Loading graphs and pool settings from disk.
//!
//! - `model.rs`: the TOML-backed data model.
//! - `loader.rs`: reading files (TOML config or text graph).
//! - `text.rs`: the `TASK -> DEP, DEP` line format.
//! - `validate.rs`: turning a raw config into a validated one.

pub mod loader;
pub mod model;
pub mod text;
pub mod validate;

pub use loader::{GraphSource, load_and_validate, load_from_path, load_graph_text, load_source};
pub use model::{ConfigFile, PoolSection, RawConfigFile, TaskConfig};
pub use text::parse_graph_text;
pub use validate::validate_pool;
