// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `meow resume <id>` — reconcile a previously-running workflow's on-disk
//! state with live agents, then resume the scheduler loop (§4.8).

use clap::Args;
use meow_adapters::TmuxAdapter;
use meow_engine::{recover, replay_cleanup, AgentManager};
use meow_store::{Paths, WorkflowLock, WorkflowStore};
use std::sync::Arc;

#[derive(Args, Debug)]
pub struct ResumeArgs {
    pub workflow_id: String,
}

pub async fn run(args: ResumeArgs) -> i32 {
    let paths = match Paths::resolve() {
        Ok(paths) => paths,
        Err(e) => {
            eprintln!("meow resume: {e}");
            return 1;
        }
    };

    let lock = match WorkflowLock::acquire(&paths, &args.workflow_id) {
        Ok(lock) => lock,
        Err(e) => {
            eprintln!("meow resume: {e}");
            return 1;
        }
    };

    let store = Arc::new(WorkflowStore::new(paths));
    let mut workflow = match store.get(&args.workflow_id) {
        Ok(wf) => wf,
        Err(e) => {
            eprintln!("meow resume: {e}");
            return 1;
        }
    };

    let agents = AgentManager::new(TmuxAdapter::new());
    agents.seed(workflow.agents.values());
    let now_ms = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64;
    recover(&mut workflow, &agents, now_ms).await;
    replay_cleanup(&mut workflow, super::STOP_GRACE).await;
    workflow.orchestrator_pid = std::process::id();

    if let Err(e) = store.save(&workflow) {
        eprintln!("meow resume: {e}");
        return 1;
    }

    super::run_orchestrator(workflow, store, lock).await
}

#[cfg(test)]
#[path = "resume_tests.rs"]
mod tests;
