// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Ties the scheduler, executor, event bus, agent manager, and store
//! together into the single authoritative in-memory workflow the IPC layer
//! calls into.
//!
//! All mutation funnels through `&self` methods here; the IPC server (in
//! `meow-daemon`) holds an `Arc<Orchestrator<_, _>>` and never touches the
//! workflow directly, matching the ownership rule in the data model.

use crate::agent_manager::AgentManager;
use crate::error::EngineError;
use crate::event_bus::{AwaitTimeoutError, EventBus};
use crate::executor::{Executor, ShellOutcome};
use crate::recovery;
use crate::scheduler::{self, Readiness};
use meow_adapters::SessionAdapter;
use meow_core::{AgentId, Clock, Event, StepId, StepStatus, Value, Workflow, WorkflowStatus};
use meow_store::WorkflowStore;
use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::mpsc;

/// The running orchestrator for a single workflow.
pub struct Orchestrator<S: SessionAdapter, C: Clock> {
    workflow: Mutex<Workflow>,
    store: Arc<WorkflowStore>,
    executor: Executor<S, C>,
    agents: Arc<AgentManager<S>>,
    events: EventBus,
    clock: C,
    advance_tx: mpsc::UnboundedSender<()>,
    advance_rx: Mutex<Option<mpsc::UnboundedReceiver<()>>>,
    shell_done_rx: Mutex<Option<mpsc::Receiver<ShellOutcome>>>,
}

impl<S: SessionAdapter, C: Clock> Orchestrator<S, C> {
    /// Build a fresh orchestrator. `workflow` should already have passed
    /// [`Workflow::validate_acyclic`] and, if resuming, [`recovery::recover`].
    pub fn new(workflow: Workflow, store: Arc<WorkflowStore>, sessions: S, clock: C) -> Arc<Self> {
        let (shell_tx, shell_rx) = mpsc::channel(64);
        let (advance_tx, advance_rx) = mpsc::unbounded_channel();
        let agents = AgentManager::new(sessions);
        agents.seed(workflow.agents.values());
        let events = EventBus::from_log(workflow.id.clone(), workflow.events.clone());

        Arc::new(Self {
            executor: Executor::new(Arc::clone(&agents), clock.clone(), shell_tx),
            workflow: Mutex::new(workflow),
            store,
            agents,
            events,
            clock,
            advance_tx,
            advance_rx: Mutex::new(Some(advance_rx)),
            shell_done_rx: Mutex::new(Some(shell_rx)),
        })
    }

    pub fn workflow_snapshot(&self) -> Workflow {
        self.workflow.lock().clone()
    }

    fn persist(&self) -> Result<(), EngineError> {
        let wf = self.workflow.lock();
        self.store.save(&wf)?;
        Ok(())
    }

    fn wake(&self) {
        let _ = self.advance_tx.send(());
    }

    /// Run the scheduler loop to completion: dispatch ready steps, apply
    /// shell results as they arrive, wake on any external mutation (agent
    /// `step-done`, `event-emit`), and settle the workflow's terminal status.
    pub async fn run(self: Arc<Self>) -> Result<WorkflowStatus, EngineError> {
        let mut advance_rx = self.advance_rx.lock().take().ok_or(EngineError::AlreadyRunning)?;
        let mut shell_done_rx = self.shell_done_rx.lock().take().ok_or(EngineError::AlreadyRunning)?;

        {
            let mut wf = self.workflow.lock();
            if wf.status == WorkflowStatus::Pending {
                let now = self.clock.epoch_ms();
                wf.started_at_ms = Some(now);
                let _ = wf.transition_to(WorkflowStatus::Running, now);
            }
        }

        loop {
            {
                let wf = self.workflow.lock();
                if wf.status == WorkflowStatus::Stopped {
                    return Ok(WorkflowStatus::Stopped);
                }
            }

            self.dispatch_ready()?;

            let terminal_status = {
                let wf = self.workflow.lock();
                if wf.status == WorkflowStatus::Stopped {
                    None
                } else if scheduler::all_terminal(&wf) {
                    Some(if scheduler::has_unrecovered_failure(&wf) {
                        WorkflowStatus::Failed
                    } else {
                        WorkflowStatus::Succeeded
                    })
                } else {
                    None
                }
            };

            if let Some(status) = terminal_status {
                let mut wf = self.workflow.lock();
                let now = self.clock.epoch_ms();
                let _ = wf.transition_to(status, now);
                drop(wf);
                self.persist()?;
                return Ok(status);
            }

            {
                let wf = self.workflow.lock();
                if wf.status == WorkflowStatus::Stopped {
                    return Ok(WorkflowStatus::Stopped);
                }
            }

            tokio::select! {
                Some(outcome) = shell_done_rx.recv() => {
                    self.apply_shell_outcome(outcome)?;
                }
                Some(()) = advance_rx.recv() => {}
            }
        }
    }

    fn dispatch_ready(self: &Arc<Self>) -> Result<(), EngineError> {
        let ready = {
            let wf = self.workflow.lock();
            scheduler::ready_steps(&wf)
        };

        for item in ready {
            match item {
                Readiness::Skipped(step_id) => {
                    let now = self.clock.epoch_ms();
                    let mut wf = self.workflow.lock();
                    if let Some(step) = wf.step_mut(&step_id) {
                        step.mark_skipped(now);
                    }
                    drop(wf);
                    self.persist()?;
                    self.wake();
                }
                Readiness::Ready(step_id) => self.dispatch_step(&step_id)?,
            }
        }
        Ok(())
    }

    fn dispatch_step(self: &Arc<Self>, step_id: &StepId) -> Result<(), EngineError> {
        let now = self.clock.epoch_ms();
        let kind = {
            let mut wf = self.workflow.lock();
            let step = wf.step_mut(step_id).ok_or_else(|| EngineError::UnknownStep(step_id.clone()))?;
            step.mark_running(now);
            step.kind.clone()
        };
        self.persist()?;

        match kind {
            meow_core::StepKind::Shell { command } => {
                self.executor
                    .dispatch_shell(step_id.clone(), command, PathBuf::from("."), Vec::new());
            }
            meow_core::StepKind::Agent { .. } => {
                // Agent dispatch needs a mutable agent handle and runs async;
                // queued onto the tokio runtime so `dispatch_step` stays sync.
                self.spawn_agent_dispatch(step_id.clone());
            }
            meow_core::StepKind::EventEmit { name, data } => {
                self.events.emit(name, data);
                let mut wf = self.workflow.lock();
                wf.events = self.events.log();
                if let Some(step) = wf.step_mut(step_id) {
                    step.mark_succeeded(BTreeMap::new(), now);
                }
                drop(wf);
                self.persist()?;
                self.wake();
            }
            meow_core::StepKind::EventAwait { name, predicate, timeout_ms } => {
                let timeout = timeout_ms.map(std::time::Duration::from_millis);
                self.spawn_event_await(step_id.clone(), name, predicate, timeout);
            }
            meow_core::StepKind::Branch { .. } | meow_core::StepKind::DoneMarker => {
                // Branch/done-marker carry no behavior of their own beyond bookkeeping.
                let mut wf = self.workflow.lock();
                if let Some(step) = wf.step_mut(step_id) {
                    step.mark_succeeded(BTreeMap::new(), now);
                }
                drop(wf);
                self.persist()?;
                self.wake();
            }
        }
        Ok(())
    }

    fn spawn_agent_dispatch(self: &Arc<Self>, step_id: StepId) {
        let this = Arc::clone(self);
        tokio::spawn(async move {
            if let Err(e) = this.run_agent_dispatch(&step_id).await {
                tracing::error!(step = %step_id, error = %e, "agent dispatch failed");
                let now = this.clock.epoch_ms();
                let mut wf = this.workflow.lock();
                if let Some(step) = wf.step_mut(&step_id) {
                    if step.status == StepStatus::Running {
                        step.mark_failed(meow_core::StepError::Other { message: e.to_string() }, now);
                    }
                }
                drop(wf);
                let _ = this.persist();
                this.wake();
            }
        });
    }

    async fn run_agent_dispatch(&self, step_id: &StepId) -> Result<(), EngineError> {
        let (agent_id, prompt) = {
            let wf = self.workflow.lock();
            let step = wf.step(step_id).ok_or_else(|| EngineError::UnknownStep(step_id.clone()))?;
            let meow_core::StepKind::Agent { agent_id, prompt } = &step.kind else {
                return Ok(());
            };
            (agent_id.clone(), prompt.clone())
        };

        let mut agent = {
            let mut wf = self.workflow.lock();
            wf.agents
                .entry(agent_id.as_str().to_string())
                .or_insert_with(|| meow_core::Agent::new(agent_id.clone(), wf.default_adapter.clone(), ""))
                .clone()
        };
        agent.dispatch(step_id.as_str())?;

        self.executor
            .dispatch_agent(&mut agent, &prompt, std::path::Path::new("."), "bash", &[])
            .await?;

        let mut wf = self.workflow.lock();
        wf.agents.insert(agent_id.as_str().to_string(), agent);
        Ok(())
    }

    /// Block a running `event-await` step on a background task so the
    /// dispatch loop never stalls; the step settles when the event arrives
    /// or the declared timeout elapses.
    fn spawn_event_await(
        self: &Arc<Self>,
        step_id: StepId,
        name: String,
        predicate: BTreeMap<String, Value>,
        timeout: Option<std::time::Duration>,
    ) {
        let this = Arc::clone(self);
        tokio::spawn(async move {
            let result = this.events.await_event(&name, predicate, timeout).await;
            let now = this.clock.epoch_ms();
            let mut wf = this.workflow.lock();
            if let Some(step) = wf.step_mut(&step_id) {
                match result {
                    Ok(event) => step.mark_succeeded(event.data, now),
                    Err(_) => step.mark_failed(
                        meow_core::StepError::Other {
                            message: format!("event '{name}' did not arrive before timeout"),
                        },
                        now,
                    ),
                }
            }
            drop(wf);
            if let Err(e) = this.persist() {
                tracing::error!(step = %step_id, error = %e, "failed to persist after event-await settled");
            }
            this.wake();
        });
    }

    fn apply_shell_outcome(&self, outcome: ShellOutcome) -> Result<(), EngineError> {
        let now = self.clock.epoch_ms();
        let mut wf = self.workflow.lock();
        if let Some(step) = wf.step_mut(&outcome.step_id) {
            match crate::executor::shell_step_error(outcome.exit_code, outcome.stderr) {
                None => step.mark_succeeded(outcome.outputs, now),
                Some(err) => step.mark_failed(err, now),
            }
        }
        drop(wf);
        self.persist()?;
        self.wake();
        Ok(())
    }

    /// Handle an inbound `step-done` IPC request.
    pub fn step_done(
        &self,
        agent_id: &AgentId,
        step_id: Option<&StepId>,
        outputs: BTreeMap<String, Value>,
        _notes: Option<String>,
    ) -> Result<(), EngineError> {
        let now = self.clock.epoch_ms();
        let mut wf = self.workflow.lock();

        let resolved_step_id = match step_id {
            Some(id) => id.clone(),
            None => wf
                .agents
                .get(agent_id.as_str())
                .and_then(|a| a.current_step.clone())
                .map(StepId::new)
                .ok_or_else(|| EngineError::UnknownAgent(agent_id.to_string()))?,
        };

        let step = wf
            .step_mut(&resolved_step_id)
            .ok_or_else(|| EngineError::UnknownStep(resolved_step_id.clone()))?;
        if step.status != StepStatus::Running {
            return Err(EngineError::UnknownStep(resolved_step_id));
        }
        match &step.kind {
            meow_core::StepKind::Agent { agent_id: expected, .. } if expected == agent_id => {}
            meow_core::StepKind::Agent { agent_id: expected, .. } => {
                return Err(EngineError::AgentMismatch {
                    step_id: resolved_step_id,
                    expected: expected.to_string(),
                    actual: agent_id.to_string(),
                });
            }
            _ => {
                return Err(EngineError::AgentMismatch {
                    step_id: resolved_step_id,
                    expected: "<none>".to_string(),
                    actual: agent_id.to_string(),
                });
            }
        }
        step.mark_succeeded(outputs, now);

        if let Some(agent) = wf.agents.get_mut(agent_id.as_str()) {
            agent.complete_dispatch();
        }

        drop(wf);
        self.persist()?;
        self.wake();
        Ok(())
    }

    pub fn event_emit(&self, name: impl Into<String>, data: BTreeMap<String, Value>) -> Result<Event, EngineError> {
        let event = self.events.emit(name, data);
        {
            let mut wf = self.workflow.lock();
            wf.events = self.events.log();
        }
        self.persist()?;
        self.wake();
        Ok(event)
    }

    pub async fn event_await(
        &self,
        name: &str,
        predicate: BTreeMap<String, Value>,
        timeout: Option<std::time::Duration>,
    ) -> Result<Event, AwaitTimeoutError> {
        self.events.await_event(name, predicate, timeout).await
    }

    pub fn session_id_get(&self, agent_id: &AgentId) -> Option<String> {
        self.workflow
            .lock()
            .agents
            .get(agent_id.as_str())
            .and_then(|a| a.session_id.clone())
    }

    pub fn session_id_set(&self, agent_id: &AgentId, session_id: String) -> Result<(), EngineError> {
        {
            let mut wf = self.workflow.lock();
            let agent = wf
                .agents
                .get_mut(agent_id.as_str())
                .ok_or_else(|| EngineError::UnknownAgent(agent_id.to_string()))?;
            agent.session_id = Some(session_id);
        }
        self.persist()
    }

    pub fn step_status_get(&self, step_id: &StepId) -> Option<StepStatus> {
        self.workflow.lock().step(step_id).map(|s| s.status)
    }

    /// Handle a SIGTERM-driven stop (§5): run the `cleanup_on_stop` shell
    /// step, if the workflow declares one, with an uncancelled context bounded
    /// by `grace`, then persist `status = stopped`. A no-op if the workflow
    /// is already terminal.
    pub async fn stop(&self, grace: std::time::Duration) -> Result<(), EngineError> {
        {
            let wf = self.workflow.lock();
            if wf.status.is_terminal() {
                return Ok(());
            }
        }

        let cleanup_command = {
            let mut wf = self.workflow.lock();
            wf.cleanup_phase = true;
            recovery::cleanup_on_stop_command(&wf)
        };
        self.persist()?;

        if let Some(command) = cleanup_command {
            let _ = tokio::time::timeout(grace, run_cleanup_command(&command)).await;
        }

        let now = self.clock.epoch_ms();
        let mut wf = self.workflow.lock();
        wf.cleanup_phase = false;
        let _ = wf.transition_to(WorkflowStatus::Stopped, now);
        drop(wf);
        self.persist()?;
        self.wake();
        Ok(())
    }
}

pub(crate) async fn run_cleanup_command(command: &str) {
    let wrapped = format!("set -euo pipefail\n{command}");
    match tokio::process::Command::new("bash").arg("-c").arg(&wrapped).output().await {
        Ok(output) if !output.status.success() => {
            tracing::warn!(code = ?output.status.code(), "cleanup_on_stop exited non-zero");
        }
        Err(e) => tracing::error!(error = %e, "cleanup_on_stop failed to run"),
        _ => {}
    }
}

#[cfg(test)]
#[path = "orchestrator_tests.rs"]
mod tests;
