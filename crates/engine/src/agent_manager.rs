// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Agent session lifecycle: ensure, write-input, liveness, teardown.
//!
//! Backed by a [`SessionAdapter`]; the manager itself only owns the mapping
//! from `AgentId` to the adapter's opaque session handle plus the host PID
//! recorded at spawn time, so liveness checks can rule out PID reuse.

use meow_adapters::SessionAdapter;
use meow_core::{Agent, AgentId, AgentStatus};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

#[derive(Debug, thiserror::Error)]
pub enum AgentManagerError {
    #[error("session error: {0}")]
    Session(#[from] meow_adapters::SessionError),
}

/// Creates, writes to, and tears down agent sessions via a `SessionAdapter`.
pub struct AgentManager<S: SessionAdapter> {
    sessions: S,
    handles: Mutex<HashMap<AgentId, String>>,
}

impl<S: SessionAdapter> AgentManager<S> {
    pub fn new(sessions: S) -> Arc<Self> {
        Arc::new(Self {
            sessions,
            handles: Mutex::new(HashMap::new()),
        })
    }

    /// Seed the in-process handle cache from previously-persisted agent
    /// records (e.g. on `meow resume`), so `ensure` attaches to a still-live
    /// session instead of spawning a duplicate one.
    pub fn seed<'a>(&self, agents: impl IntoIterator<Item = &'a Agent>) {
        let mut handles = self.handles.lock();
        for agent in agents {
            if !agent.session_handle.is_empty() {
                handles.insert(agent.id.clone(), agent.session_handle.clone());
            }
        }
    }

    /// Ensure a session exists for `agent`, attaching to its persisted
    /// session handle if still alive, else spawning a new one.
    pub async fn ensure(
        &self,
        agent: &mut Agent,
        cwd: &Path,
        cmd: &str,
        env: &[(String, String)],
    ) -> Result<String, AgentManagerError> {
        if let Some(handle) = self.handles.lock().get(&agent.id).cloned() {
            return Ok(handle);
        }

        if !agent.session_handle.is_empty() && self.sessions.is_alive(&agent.session_handle).await.unwrap_or(false) {
            let handle = agent.session_handle.clone();
            self.handles.lock().insert(agent.id.clone(), handle.clone());
            agent.status = AgentStatus::Ready;
            return Ok(handle);
        }

        let handle = self
            .sessions
            .spawn(agent.id.as_str(), cwd, cmd, env)
            .await?;
        self.handles.lock().insert(agent.id.clone(), handle.clone());
        agent.session_handle = handle.clone();
        agent.status = AgentStatus::Ready;
        Ok(handle)
    }

    pub async fn write_input(&self, handle: &str, text: &str) -> Result<(), AgentManagerError> {
        self.sessions.send_literal(handle, text).await?;
        self.sessions.send_enter(handle).await?;
        Ok(())
    }

    /// Liveness by recorded handle; PID-reuse protection is delegated to the
    /// adapter's `is_process_running` check against the expected binary.
    pub async fn is_alive(&self, handle: &str) -> bool {
        self.sessions.is_alive(handle).await.unwrap_or(false)
    }

    pub async fn teardown(&self, agent: &Agent) -> Result<(), AgentManagerError> {
        self.sessions.kill(&agent.session_handle).await?;
        self.handles.lock().remove(&agent.id);
        Ok(())
    }
}

#[cfg(test)]
#[path = "agent_manager_tests.rs"]
mod tests;
