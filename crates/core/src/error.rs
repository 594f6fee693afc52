// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Structured error types recorded on steps and surfaced to operators.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Structured failure reason recorded on a step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StepError {
    /// The shell runner exited non-zero.
    ShellExit { code: i32, stderr: String },
    /// The agent reported failure via `step-done`, or the CLI request itself
    /// was malformed (invalid JSON, bad `name=value`).
    AgentReported { message: String },
    /// A step was `running` when the orchestrator crashed and the recovery
    /// pass could not confirm the step is still in flight.
    RecoveryInterrupted,
    /// Any other failure, with a human-readable message.
    Other { message: String },
}

impl fmt::Display for StepError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StepError::ShellExit { code, stderr } => {
                write!(f, "shell exited with code {code}: {stderr}")
            }
            StepError::AgentReported { message } => write!(f, "agent reported failure: {message}"),
            StepError::RecoveryInterrupted => write!(f, "recovery-interrupted"),
            StepError::Other { message } => write!(f, "{message}"),
        }
    }
}

/// Top-level errors surfaced by `meow-core` operations (currently just step
/// graph validation; most error handling lives closer to its owning crate).
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("dependency cycle detected among steps: {0:?}")]
    CyclicDependencies(Vec<String>),
    #[error("step {0} depends on unknown step {1}")]
    UnknownDependency(String, String),
}
