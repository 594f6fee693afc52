// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Workflow identifier, status, and the declared step graph.
//!
//! Invariant: a workflow with terminal status never transitions out — see
//! [`Workflow::transition_to`].

use crate::agent::Agent;
use crate::error::CoreError;
use crate::event::Event;
use crate::step::{Step, StepId};
use crate::value::Value;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

crate::define_id! {
    /// Unique, stable identifier for a workflow.
    pub struct WorkflowId;
}

/// Lifecycle status of a workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkflowStatus {
    Pending,
    Running,
    Succeeded,
    Failed,
    Stopped,
    Cancelled,
}

impl WorkflowStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            WorkflowStatus::Succeeded
                | WorkflowStatus::Failed
                | WorkflowStatus::Stopped
                | WorkflowStatus::Cancelled
        )
    }
}

impl fmt::Display for WorkflowStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            WorkflowStatus::Pending => "pending",
            WorkflowStatus::Running => "running",
            WorkflowStatus::Succeeded => "succeeded",
            WorkflowStatus::Failed => "failed",
            WorkflowStatus::Stopped => "stopped",
            WorkflowStatus::Cancelled => "cancelled",
        };
        write!(f, "{s}")
    }
}

/// Raised when a caller tries to move a workflow out of a terminal status.
#[derive(Debug, Clone, thiserror::Error)]
#[error("workflow {workflow_id} is already terminal ({status}); cannot transition to {attempted}")]
pub struct TerminalEscapeError {
    pub workflow_id: WorkflowId,
    pub status: WorkflowStatus,
    pub attempted: WorkflowStatus,
}

/// The whole run: declared step graph plus runtime state.
///
/// `steps` preserves declaration order; `step_order` in the scheduler is
/// dependency-driven, not this field's order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Workflow {
    pub id: WorkflowId,
    pub steps: Vec<Step>,
    pub status: WorkflowStatus,
    pub default_adapter: String,
    #[serde(default)]
    pub orchestrator_pid: u32,
    #[serde(default)]
    pub started_at_ms: Option<u64>,
    #[serde(default)]
    pub done_at_ms: Option<u64>,
    #[serde(default)]
    pub variables: BTreeMap<String, Value>,
    #[serde(default)]
    pub agents: BTreeMap<String, Agent>,
    #[serde(default)]
    pub events: Vec<Event>,
    /// True while the workflow's `cleanup_on_stop` script is running; read
    /// by recovery to replay idempotent cleanup hooks after a crash.
    #[serde(default)]
    pub cleanup_phase: bool,
}

impl Workflow {
    pub fn new(id: WorkflowId, default_adapter: impl Into<String>, steps: Vec<Step>) -> Self {
        Self {
            id,
            steps,
            status: WorkflowStatus::Pending,
            default_adapter: default_adapter.into(),
            orchestrator_pid: 0,
            started_at_ms: None,
            done_at_ms: None,
            variables: BTreeMap::new(),
            agents: BTreeMap::new(),
            events: Vec::new(),
            cleanup_phase: false,
        }
    }

    pub fn step(&self, id: &StepId) -> Option<&Step> {
        self.steps.iter().find(|s| &s.id == id)
    }

    pub fn step_mut(&mut self, id: &StepId) -> Option<&mut Step> {
        self.steps.iter_mut().find(|s| &s.id == id)
    }

    /// Validate the step graph is acyclic, at load time, before any step runs.
    ///
    /// Returns the ids of steps participating in a cycle, in declaration
    /// order, on failure.
    pub fn validate_acyclic(&self) -> Result<(), CoreError> {
        #[derive(Clone, Copy, PartialEq)]
        enum Mark {
            Unvisited,
            InProgress,
            Done,
        }

        let index: BTreeMap<&StepId, usize> = self
            .steps
            .iter()
            .enumerate()
            .map(|(i, s)| (&s.id, i))
            .collect();

        for step in &self.steps {
            for dep in &step.depends_on {
                if !index.contains_key(dep) {
                    return Err(CoreError::UnknownDependency(
                        step.id.to_string(),
                        dep.to_string(),
                    ));
                }
            }
        }

        let mut marks = vec![Mark::Unvisited; self.steps.len()];

        fn visit(
            i: usize,
            steps: &[Step],
            index: &BTreeMap<&StepId, usize>,
            marks: &mut Vec<Mark>,
            stack: &mut Vec<usize>,
        ) -> Option<Vec<String>> {
            match marks[i] {
                Mark::Done => return None,
                Mark::InProgress => {
                    let start = stack.iter().position(|&x| x == i).unwrap_or(0);
                    return Some(
                        stack[start..]
                            .iter()
                            .map(|&idx| steps[idx].id.to_string())
                            .collect(),
                    );
                }
                Mark::Unvisited => {}
            }
            marks[i] = Mark::InProgress;
            stack.push(i);
            for dep in &steps[i].depends_on {
                let dep_idx = index[dep];
                if let Some(cycle) = visit(dep_idx, steps, index, marks, stack) {
                    return Some(cycle);
                }
            }
            stack.pop();
            marks[i] = Mark::Done;
            None
        }

        let mut stack = Vec::new();
        for i in 0..self.steps.len() {
            if let Some(cycle) = visit(i, &self.steps, &index, &mut marks, &mut stack) {
                return Err(CoreError::CyclicDependencies(cycle));
            }
        }
        Ok(())
    }

    /// Move the workflow to a new status. No-op check: a terminal workflow
    /// never transitions out, regardless of the requested target.
    pub fn transition_to(&mut self, target: WorkflowStatus, now_ms: u64) -> Result<(), TerminalEscapeError> {
        if self.status.is_terminal() {
            return Err(TerminalEscapeError {
                workflow_id: self.id.clone(),
                status: self.status,
                attempted: target,
            });
        }
        self.status = target;
        if target.is_terminal() {
            self.done_at_ms = Some(now_ms);
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "workflow_tests.rs"]
mod tests;
