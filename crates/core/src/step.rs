// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Step identifier and state machine.
//!
//! A step is a single node in a workflow's dependency graph. Invariant: a
//! step is `ready` iff every dependency is in a terminal status and the join
//! policy is satisfied (see [`Step::is_ready`]).

use crate::agent::AgentId;
use crate::error::StepError;
use crate::value::Value;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

crate::define_id! {
    /// Unique identifier for a step within its workflow.
    pub struct StepId;
}

/// What a step does when it runs.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum StepKind {
    /// Run a shell command/script synchronously.
    Shell { command: String },
    /// Dispatch to an agent and wait for its `done` report.
    Agent { agent_id: AgentId, prompt: String },
    /// Emit a named event.
    EventEmit { name: String, data: BTreeMap<String, Value> },
    /// Block until a named event (with optional predicate) arrives.
    EventAwait {
        name: String,
        #[serde(default)]
        predicate: BTreeMap<String, Value>,
        #[serde(default)]
        timeout_ms: Option<u64>,
    },
    /// Conditional fan-out; Non-goal for the core engine beyond declaration.
    Branch { condition: String },
    /// Marks completion of a sub-graph; carries no behavior of its own.
    DoneMarker,
}

impl StepKind {
    pub fn is_agent(&self) -> bool {
        matches!(self, StepKind::Agent { .. })
    }

    pub fn is_shell(&self) -> bool {
        matches!(self, StepKind::Shell { .. })
    }
}

/// Join policy evaluated once every dependency reaches a terminal status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum JoinPolicy {
    /// Ready only if every dependency succeeded; any failure marks this step `skipped`.
    #[default]
    AllSucceeded,
    /// Ready as soon as every dependency is terminal, regardless of outcome.
    AnyTerminal,
}

/// Lifecycle status of a step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepStatus {
    Pending,
    Ready,
    Running,
    Succeeded,
    Failed,
    Skipped,
}

impl StepStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            StepStatus::Succeeded | StepStatus::Failed | StepStatus::Skipped
        )
    }
}

impl fmt::Display for StepStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            StepStatus::Pending => "pending",
            StepStatus::Ready => "ready",
            StepStatus::Running => "running",
            StepStatus::Succeeded => "succeeded",
            StepStatus::Failed => "failed",
            StepStatus::Skipped => "skipped",
        };
        write!(f, "{s}")
    }
}

/// A single node in a workflow's step graph.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Step {
    pub id: StepId,
    #[serde(default)]
    pub depends_on: BTreeSet<StepId>,
    pub kind: StepKind,
    #[serde(default)]
    pub join_policy: JoinPolicy,
    pub status: StepStatus,
    #[serde(default)]
    pub outputs: BTreeMap<String, Value>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub error: Option<StepError>,
    #[serde(default)]
    pub started_at_ms: Option<u64>,
    #[serde(default)]
    pub done_at_ms: Option<u64>,
}

impl Step {
    pub fn new(id: StepId, kind: StepKind) -> Self {
        Self {
            id,
            depends_on: BTreeSet::new(),
            kind,
            join_policy: JoinPolicy::default(),
            status: StepStatus::Pending,
            outputs: BTreeMap::new(),
            notes: None,
            error: None,
            started_at_ms: None,
            done_at_ms: None,
        }
    }

    pub fn depends_on(mut self, deps: impl IntoIterator<Item = StepId>) -> Self {
        self.depends_on = deps.into_iter().collect();
        self
    }

    /// Evaluate readiness given the terminal statuses of this step's dependencies.
    ///
    /// Returns `Some(true)` if ready to run, `Some(false)` if it should be
    /// `skipped` under the join policy, or `None` if still blocked.
    pub fn evaluate_readiness(&self, dep_statuses: &[StepStatus]) -> Option<bool> {
        if !dep_statuses.iter().all(|s| s.is_terminal()) {
            return None;
        }
        match self.join_policy {
            JoinPolicy::AllSucceeded => {
                let all_ok = dep_statuses.iter().all(|s| *s == StepStatus::Succeeded);
                Some(all_ok)
            }
            JoinPolicy::AnyTerminal => Some(true),
        }
    }

    pub fn mark_running(&mut self, now_ms: u64) {
        self.status = StepStatus::Running;
        self.started_at_ms = Some(now_ms);
    }

    pub fn mark_succeeded(&mut self, outputs: BTreeMap<String, Value>, now_ms: u64) {
        self.outputs = outputs;
        self.status = StepStatus::Succeeded;
        self.done_at_ms = Some(now_ms);
    }

    pub fn mark_failed(&mut self, error: StepError, now_ms: u64) {
        self.error = Some(error);
        self.status = StepStatus::Failed;
        self.done_at_ms = Some(now_ms);
    }

    pub fn mark_skipped(&mut self, now_ms: u64) {
        self.status = StepStatus::Skipped;
        self.done_at_ms = Some(now_ms);
    }
}

#[cfg(test)]
#[path = "step_tests.rs"]
mod tests;
