// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Typed IPC messages exchanged between agent-side CLI subcommands and the
//! orchestrator. Unknown `type` tags decode to [`Request::Unknown`]/
//! [`Response::Unknown`] instead of failing, so older/newer peers can
//! round-trip messages they don't recognize (forward/backward compatibility
//! per the wire format's contract).

use meow_core::{AgentId, StepId, StepStatus, Value};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Request from an agent-side CLI invocation to the orchestrator.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum Request {
    /// A step finished; `step_id` is resolved by the orchestrator from the
    /// agent's currently-dispatched step when omitted.
    StepDone {
        agent_id: AgentId,
        #[serde(default)]
        step_id: Option<StepId>,
        #[serde(default)]
        outputs: BTreeMap<String, Value>,
        #[serde(default)]
        notes: Option<String>,
    },
    EventEmit {
        name: String,
        #[serde(default)]
        data: BTreeMap<String, Value>,
    },
    EventAwait {
        name: String,
        #[serde(default)]
        predicate: BTreeMap<String, Value>,
        #[serde(default)]
        timeout_ms: Option<u64>,
    },
    SessionIdGet {
        agent_id: AgentId,
    },
    SessionIdSet {
        agent_id: AgentId,
        session_id: String,
    },
    StepStatusGet {
        step_id: StepId,
    },
    #[serde(other)]
    Unknown,
}

/// Response from the orchestrator back to the agent-side caller.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum Response {
    Ack { ok: bool },
    Error { message: String },
    SessionId { session_id: Option<String> },
    Event {
        name: String,
        data: BTreeMap<String, Value>,
        seq: u64,
    },
    StepStatus { status: Option<StepStatus> },
    #[serde(other)]
    Unknown,
}

impl Response {
    pub fn error(message: impl Into<String>) -> Self {
        Response::Error { message: message.into() }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Response::Error { .. })
    }
}

#[cfg(test)]
#[path = "protocol_tests.rs"]
mod tests;
