// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use meow_core::StepId;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("session error: {0}")]
    Session(#[from] meow_adapters::SessionError),
    #[error("store error: {0}")]
    Store(#[from] meow_store::StoreError),
    #[error("step graph rejected: {0}")]
    Core(#[from] meow_core::CoreError),
    #[error("workflow already terminal")]
    TerminalEscape(#[from] meow_core::workflow::TerminalEscapeError),
    #[error("unknown step: {0}")]
    UnknownStep(StepId),
    #[error("unknown agent: {0}")]
    UnknownAgent(String),
    #[error("step '{step_id}' is dispatched to agent '{expected}', not '{actual}'")]
    AgentMismatch { step_id: StepId, expected: String, actual: String },
    #[error(transparent)]
    AgentBusy(#[from] meow_core::agent::AgentBusyError),
    #[error("malformed step output: {0}")]
    MalformedOutput(String),
    #[error("shell step {step_id} failed: {reason}")]
    ShellFailed { step_id: StepId, reason: String },
    #[error("recovery refused to resume: {0}")]
    RecoveryRefused(String),
    #[error("run() called more than once on the same orchestrator")]
    AlreadyRunning,
}
