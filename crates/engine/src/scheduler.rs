// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Readiness computation over a workflow's step graph.
//!
//! The scheduler itself holds no state beyond the workflow it's given each
//! call — `blocked`/`ready`/`running` are implicit partitions of
//! `workflow.steps` by `StepStatus`, recomputed on every call to
//! [`ready_steps`]. Declared order is preserved so dispatch is deterministic.

use meow_core::{JoinPolicy, StepId, StepStatus, Workflow};

/// A step that just became ready to run, or was skipped by join-policy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Readiness {
    Ready(StepId),
    Skipped(StepId),
}

/// Scan pending steps and return those whose dependencies are all terminal,
/// in declared order. Steps whose join policy rejects the outcome are
/// reported as `Skipped` instead of `Ready` — the caller applies the
/// transition (the scheduler never mutates the workflow directly).
pub fn ready_steps(workflow: &Workflow) -> Vec<Readiness> {
    let mut out = Vec::new();
    for step in &workflow.steps {
        if step.status != StepStatus::Pending {
            continue;
        }

        let dep_statuses: Vec<StepStatus> = step
            .depends_on
            .iter()
            .filter_map(|dep| workflow.step(dep))
            .map(|dep| dep.status)
            .collect();

        match step.evaluate_readiness(&dep_statuses) {
            Some(true) => out.push(Readiness::Ready(step.id.clone())),
            Some(false) => out.push(Readiness::Skipped(step.id.clone())),
            None => {}
        }
    }
    out
}

/// True once every step has reached a terminal status.
pub fn all_terminal(workflow: &Workflow) -> bool {
    workflow.steps.iter().all(|s| s.status.is_terminal())
}

/// True if any step ended `failed` under a join policy that doesn't absorb it
/// (an `AllSucceeded` dependent already gets `Skipped`, not `Failed`, so any
/// remaining `Failed` step is an unrecovered failure).
pub fn has_unrecovered_failure(workflow: &Workflow) -> bool {
    workflow.steps.iter().any(|s| s.status == StepStatus::Failed)
}

/// Whether dispatching every dependency of `step_id` strictly before it would
/// be honored by `join_policy`'s default (all-succeeded). Exposed for tests
/// exercising property 2 (dependency respect) directly against the scheduler.
pub fn join_policy_of(workflow: &Workflow, step_id: &StepId) -> Option<JoinPolicy> {
    workflow.step(step_id).map(|s| s.join_policy)
}

#[cfg(test)]
#[path = "scheduler_tests.rs"]
mod tests;
