// src/exec/command.rs

//! Shell-command task body used for graphs loaded from a TOML config.

use std::collections::HashMap;
use std::process::Command;

use anyhow::{Context, Result, bail};
use tracing::{debug, info};

use crate::exec::body::{SimulatedWork, TaskBody};

/// Runs each task's configured `cmd` through the platform shell.
///
/// Tasks without a command fall back to [`SimulatedWork`].
#[derive(Debug, Clone)]
pub struct CommandBody {
    commands: HashMap<String, String>,
    fallback: SimulatedWork,
}

impl CommandBody {
    pub fn new(commands: HashMap<String, String>, fallback: SimulatedWork) -> Self {
        Self { commands, fallback }
    }

    pub fn command_for(&self, task: &str) -> Option<&str> {
        self.commands.get(task).map(String::as_str)
    }
}

impl TaskBody<String> for CommandBody {
    fn run(&self, task: &String) -> Result<()> {
        let Some(cmd) = self.commands.get(task) else {
            return self.fallback.run(task);
        };

        info!(task = %task, cmd = %cmd, "starting task process");

        let mut command = if cfg!(windows) {
            let mut c = Command::new("cmd");
            c.arg("/C").arg(cmd);
            c
        } else {
            let mut c = Command::new("sh");
            c.arg("-c").arg(cmd);
            c
        };

        let output = command
            .output()
            .with_context(|| format!("spawning process for task '{task}'"))?;

        for line in String::from_utf8_lossy(&output.stdout).lines() {
            debug!(task = %task, "stdout: {}", line);
        }
        for line in String::from_utf8_lossy(&output.stderr).lines() {
            debug!(task = %task, "stderr: {}", line);
        }

        let code = output.status.code().unwrap_or(-1);
        info!(
            task = %task,
            exit_code = code,
            success = output.status.success(),
            "task process exited"
        );

        if !output.status.success() {
            bail!("command for task '{task}' exited with code {code}");
        }
        Ok(())
    }
}
