// src/config/validate.rs

use crate::config::model::{ConfigFile, PoolSection, RawConfigFile, graph_from_tasks};
use crate::dag::validate_graph;
use crate::errors::{DagpoolError, Result};

impl TryFrom<RawConfigFile> for ConfigFile {
    type Error = DagpoolError;

    fn try_from(raw: RawConfigFile) -> std::result::Result<Self, Self::Error> {
        validate_raw_config(&raw)?;
        Ok(ConfigFile::new_unchecked(raw.pool, raw.task))
    }
}

fn validate_raw_config(cfg: &RawConfigFile) -> Result<()> {
    ensure_has_tasks(cfg)?;
    validate_pool(&cfg.pool)?;
    validate_task_dependencies(cfg)?;
    validate_graph(&graph_from_tasks(&cfg.task))?;
    Ok(())
}

fn ensure_has_tasks(cfg: &RawConfigFile) -> Result<()> {
    if cfg.task.is_empty() {
        return Err(DagpoolError::ConfigError(
            "config must contain at least one [task.<name>] section".to_string(),
        ));
    }
    Ok(())
}

/// Check `[pool]` values the scheduler cannot work with. Also run after CLI
/// overrides are applied.
pub fn validate_pool(pool: &PoolSection) -> Result<()> {
    if pool.pool_size == 0 {
        return Err(DagpoolError::ConfigError(
            "[pool].pool_size must be >= 1 (got 0)".to_string(),
        ));
    }
    if pool.keep_alive_secs == 0 {
        return Err(DagpoolError::ConfigError(
            "[pool].keep_alive_secs must be >= 1 (got 0)".to_string(),
        ));
    }
    Ok(())
}

fn validate_task_dependencies(cfg: &RawConfigFile) -> Result<()> {
    for (name, task) in cfg.task.iter() {
        for dep in task.after.iter() {
            if !cfg.task.contains_key(dep) {
                return Err(DagpoolError::ConfigError(format!(
                    "task '{}' has unknown dependency '{}' in `after`",
                    name, dep
                )));
            }
            if dep == name {
                return Err(DagpoolError::ConfigError(format!(
                    "task '{}' cannot depend on itself in `after`",
                    name
                )));
            }
        }
    }
    Ok(())
}
