// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Reconcile on-disk state with live agents before the scheduler resumes a
//! workflow. Runs once, under the workflow's file lock, before any step is
//! dispatched.

use meow_adapters::SessionAdapter;
use meow_core::{StepKind, StepStatus, Workflow};

use crate::agent_manager::AgentManager;
use crate::orchestrator::run_cleanup_command;

/// For every `running` step: if it's agent-backed and the agent is still
/// alive, leave it `running` (it may yet report `done`). If the agent is
/// gone, reset to `pending` so the scheduler re-dispatches it. A `running`
/// shell step is irreversible — a crash mid-execution means the attempt is
/// lost — so it's marked `failed` with `recovery-interrupted`.
pub async fn recover<S: SessionAdapter>(
    workflow: &mut Workflow,
    agents: &AgentManager<S>,
    now_ms: u64,
) {
    let running_steps: Vec<usize> = workflow
        .steps
        .iter()
        .enumerate()
        .filter(|(_, s)| s.status == StepStatus::Running)
        .map(|(i, _)| i)
        .collect();

    for i in running_steps {
        let is_agent_step = matches!(workflow.steps[i].kind, StepKind::Agent { .. });

        if !is_agent_step {
            workflow.steps[i].mark_failed(meow_core::StepError::RecoveryInterrupted, now_ms);
            continue;
        }

        let StepKind::Agent { agent_id, .. } = &workflow.steps[i].kind else {
            unreachable!()
        };
        let handle = workflow
            .agents
            .get(agent_id.as_str())
            .map(|a| a.session_handle.clone());

        let alive = match handle {
            Some(handle) if !handle.is_empty() => agents.is_alive(&handle).await,
            _ => false,
        };

        if !alive {
            workflow.steps[i].status = StepStatus::Pending;
        }
    }
}

/// True if the workflow was mid-`cleanup_on_stop` when the orchestrator
/// crashed; the caller should replay that step before resuming the
/// scheduler.
pub fn needs_cleanup_replay(workflow: &Workflow) -> bool {
    workflow.cleanup_phase
}

pub(crate) fn cleanup_on_stop_command(workflow: &Workflow) -> Option<String> {
    workflow
        .steps
        .iter()
        .find(|s| s.id.as_str() == "cleanup_on_stop")
        .and_then(|s| match &s.kind {
            StepKind::Shell { command } => Some(command.clone()),
            _ => None,
        })
}

/// Re-run the `cleanup_on_stop` step left unfinished by a crash mid-stop
/// (§4.8 step 3), bounded by `grace`, then clear the `cleanup_phase` flag.
/// A no-op if [`needs_cleanup_replay`] is false.
pub async fn replay_cleanup(workflow: &mut Workflow, grace: std::time::Duration) {
    if !needs_cleanup_replay(workflow) {
        return;
    }
    if let Some(command) = cleanup_on_stop_command(workflow) {
        let _ = tokio::time::timeout(grace, run_cleanup_command(&command)).await;
    }
    workflow.cleanup_phase = false;
}

#[cfg(test)]
#[path = "recovery_tests.rs"]
mod tests;
