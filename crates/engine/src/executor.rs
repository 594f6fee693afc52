// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Runs a single step: shell steps synchronously (in a spawned task that
//! reports back over a channel), agent steps by dispatching to the agent
//! manager and leaving the step `running` until an inbound `step-done`
//! completes it.

use crate::agent_manager::AgentManager;
use crate::error::EngineError;
use meow_adapters::SessionAdapter;
use meow_core::{Agent, AgentId, Clock, StepError, StepId, Value};
use std::collections::BTreeMap;
use std::path::PathBuf;
use tokio::sync::mpsc;

/// Result of a step that ran to completion outside the caller's call stack
/// (currently only shell steps; agent steps complete via inbound IPC).
#[derive(Debug, Clone)]
pub struct ShellOutcome {
    pub step_id: StepId,
    pub exit_code: i32,
    pub outputs: BTreeMap<String, Value>,
    pub stderr: String,
}

/// Executes steps against a session-adapter-backed agent manager.
pub struct Executor<S: SessionAdapter, C: Clock> {
    agents: std::sync::Arc<AgentManager<S>>,
    clock: C,
    shell_done_tx: mpsc::Sender<ShellOutcome>,
}

impl<S: SessionAdapter, C: Clock> Executor<S, C> {
    pub fn new(
        agents: std::sync::Arc<AgentManager<S>>,
        clock: C,
        shell_done_tx: mpsc::Sender<ShellOutcome>,
    ) -> Self {
        Self {
            agents,
            clock,
            shell_done_tx,
        }
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// Run a shell step's command in a spawned task; the result arrives later
    /// on `shell_done_tx` so the caller never blocks the scheduler loop.
    pub fn dispatch_shell(&self, step_id: StepId, command: String, cwd: PathBuf, env: Vec<(String, String)>) {
        let tx = self.shell_done_tx.clone();
        tokio::spawn(async move {
            let span = tracing::info_span!("shell_step", step = %step_id);
            let _guard = span.enter();
            tracing::info!(%command, cwd = %cwd.display(), "running shell command");

            let wrapped = format!("set -euo pipefail\n{command}");
            let result = tokio::process::Command::new("bash")
                .arg("-c")
                .arg(&wrapped)
                .current_dir(&cwd)
                .envs(env)
                .output()
                .await;

            let outcome = match result {
                Ok(output) => {
                    let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
                    let stderr = String::from_utf8_lossy(&output.stderr).into_owned();
                    if !stderr.is_empty() {
                        tracing::warn!(%stderr, "shell stderr");
                    }
                    ShellOutcome {
                        step_id,
                        exit_code: output.status.code().unwrap_or(-1),
                        outputs: parse_name_value_outputs(&stdout),
                        stderr,
                    }
                }
                Err(e) => {
                    tracing::error!(error = %e, "shell execution failed");
                    ShellOutcome {
                        step_id,
                        exit_code: -1,
                        outputs: BTreeMap::new(),
                        stderr: e.to_string(),
                    }
                }
            };

            if tx.send(outcome).await.is_err() {
                tracing::error!("shell_done receiver dropped");
            }
        });
    }

    /// Ensure the agent exists, write the expanded prompt, and return the
    /// session handle. Completion arrives later via `step-done`.
    pub async fn dispatch_agent(
        &self,
        agent: &mut Agent,
        prompt: &str,
        cwd: &std::path::Path,
        cmd: &str,
        env: &[(String, String)],
    ) -> Result<(), EngineError> {
        let handle = self.agents.ensure(agent, cwd, cmd, env).await.map_err(|e| match e {
            crate::agent_manager::AgentManagerError::Session(s) => EngineError::Session(s),
        })?;
        self.agents.write_input(&handle, prompt).await.map_err(|e| match e {
            crate::agent_manager::AgentManagerError::Session(s) => EngineError::Session(s),
        })?;
        Ok(())
    }

    pub async fn agent_is_alive(&self, agent: &Agent) -> bool {
        self.agents.is_alive(&agent.session_handle).await
    }

    pub async fn teardown_agent(&self, agent: &Agent) -> Result<(), EngineError> {
        self.agents
            .teardown(agent)
            .await
            .map_err(|e| match e {
                crate::agent_manager::AgentManagerError::Session(s) => EngineError::Session(s),
            })
    }
}

/// Conventional output parsing for shell steps: lines matching `name=value`
/// in stdout become step outputs, later lines winning on duplicate keys.
pub fn parse_name_value_outputs(stdout: &str) -> BTreeMap<String, Value> {
    let mut outputs = BTreeMap::new();
    for line in stdout.lines() {
        if let Some((name, value)) = line.split_once('=') {
            let name = name.trim();
            if !name.is_empty() && name.chars().all(|c| c.is_alphanumeric() || c == '_') {
                outputs.insert(name.to_string(), Value::string(value.trim()));
            }
        }
    }
    outputs
}

/// Merge `--output name=value` pairs with a parsed `--output-json` object;
/// the JSON object wins on key conflicts.
pub fn merge_outputs(
    pairs: &[(String, String)],
    json: Option<&str>,
) -> Result<BTreeMap<String, Value>, EngineError> {
    let mut outputs: BTreeMap<String, Value> = pairs
        .iter()
        .map(|(k, v)| (k.clone(), Value::string(v.clone())))
        .collect();

    if let Some(raw) = json {
        let parsed: serde_json::Value = serde_json::from_str(raw)
            .map_err(|e| EngineError::MalformedOutput(format!("invalid --output-json: {e}")))?;
        let serde_json::Value::Object(map) = parsed else {
            return Err(EngineError::MalformedOutput(
                "--output-json must be a JSON object".to_string(),
            ));
        };
        for (k, v) in map {
            outputs.insert(k, Value::from(v));
        }
    }

    Ok(outputs)
}

/// Build the structured error recorded on a step from a shell step's exit.
pub fn shell_step_error(exit_code: i32, stderr: String) -> Option<StepError> {
    if exit_code == 0 {
        None
    } else {
        Some(StepError::ShellExit {
            code: exit_code,
            stderr,
        })
    }
}

/// Identifies the agent a step should dispatch to, resolving the synthetic
/// case where a `step-done` arrives without an explicit step id (matched by
/// the agent's currently-running step instead).
pub fn resolve_agent_for_step(agents: &BTreeMap<String, Agent>, agent_id: &AgentId) -> Option<&Agent> {
    agents.get(agent_id.as_str())
}

#[cfg(test)]
#[path = "executor_tests.rs"]
mod tests;
