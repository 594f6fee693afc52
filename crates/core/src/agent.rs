// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Agent identifier and runtime state.
//!
//! An `Agent` is a single long-lived worker dispatched by an agent step. Its
//! `session_handle` is the opaque multiplexer/process-supervisor handle used
//! by the agent manager; its `session_id` is a backend-specific identifier
//! (e.g. an assistant conversation id) learned asynchronously via the
//! `session-id-set` IPC request.

use serde::{Deserialize, Serialize};
use std::fmt;

crate::define_id! {
    /// Unique identifier for an agent instance within a workflow.
    pub struct AgentId;
}

/// Lifecycle state of an agent.
///
/// Invariant: at most one step at a time may be in status `running` for a
/// given agent (enforced by the executor, not this type).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentStatus {
    /// Session is being created.
    Starting,
    /// Session is live and idle.
    Ready,
    /// Session is live and has a step dispatched to it.
    Busy,
    /// Session process is gone.
    Exited,
}

impl fmt::Display for AgentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AgentStatus::Starting => write!(f, "starting"),
            AgentStatus::Ready => write!(f, "ready"),
            AgentStatus::Busy => write!(f, "busy"),
            AgentStatus::Exited => write!(f, "exited"),
        }
    }
}

/// A single agent's durable record within a workflow.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Agent {
    pub id: AgentId,
    /// Adapter name (e.g. "tmux", "claude"); opaque to the engine.
    pub kind: String,
    /// Opaque handle used by the agent manager (e.g. a tmux session name).
    pub session_handle: String,
    /// Host process id of the session driver, if known.
    #[serde(default)]
    pub pid: Option<u32>,
    /// Backend-specific identifier, e.g. an assistant conversation id.
    /// Learned asynchronously via `session-id-set`.
    #[serde(default)]
    pub session_id: Option<String>,
    pub status: AgentStatus,
    /// The step currently dispatched to this agent, if any.
    #[serde(default)]
    pub current_step: Option<String>,
}

impl Agent {
    pub fn new(id: AgentId, kind: impl Into<String>, session_handle: impl Into<String>) -> Self {
        Self {
            id,
            kind: kind.into(),
            session_handle: session_handle.into(),
            pid: None,
            session_id: None,
            status: AgentStatus::Starting,
            current_step: None,
        }
    }

    pub fn is_busy(&self) -> bool {
        self.status == AgentStatus::Busy
    }

    /// Mark this agent dispatched with a step, enforcing the at-most-one-running invariant.
    pub fn dispatch(&mut self, step_id: impl Into<String>) -> Result<(), AgentBusyError> {
        if self.is_busy() {
            return Err(AgentBusyError {
                agent_id: self.id.clone(),
                current_step: self.current_step.clone(),
            });
        }
        self.current_step = Some(step_id.into());
        self.status = AgentStatus::Busy;
        Ok(())
    }

    pub fn complete_dispatch(&mut self) {
        self.current_step = None;
        self.status = AgentStatus::Ready;
    }
}

/// Raised when a step tries to dispatch to an agent already running a step.
#[derive(Debug, Clone, thiserror::Error)]
#[error("agent {agent_id} is already running step {current_step:?}")]
pub struct AgentBusyError {
    pub agent_id: AgentId,
    pub current_step: Option<String>,
}

#[cfg(test)]
#[path = "agent_tests.rs"]
mod tests;
