// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `meow start <workflow-file>` — load a declared workflow, bind its IPC
//! socket, and run the scheduler loop to completion.

use clap::Args;
use meow_core::Workflow;
use meow_store::{Paths, WorkflowLock, WorkflowStore};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Args, Debug)]
pub struct StartArgs {
    /// Path to a YAML workflow definition (the same schema the store persists).
    pub workflow_file: PathBuf,
}

pub async fn run(args: StartArgs) -> i32 {
    let raw = match std::fs::read_to_string(&args.workflow_file) {
        Ok(raw) => raw,
        Err(e) => {
            eprintln!("meow start: cannot read {}: {e}", args.workflow_file.display());
            return 1;
        }
    };
    let mut workflow: Workflow = match serde_yaml::from_str(&raw) {
        Ok(wf) => wf,
        Err(e) => {
            eprintln!("meow start: malformed workflow definition: {e}");
            return 1;
        }
    };
    if let Err(e) = workflow.validate_acyclic() {
        eprintln!("meow start: {e}");
        return 1;
    }

    let paths = match Paths::resolve() {
        Ok(paths) => paths,
        Err(e) => {
            eprintln!("meow start: {e}");
            return 1;
        }
    };
    if paths.workflow_yaml(workflow.id.as_str()).is_file() {
        eprintln!("meow start: workflow '{}' already exists; use resume", workflow.id);
        return 1;
    }

    let lock = match WorkflowLock::acquire(&paths, workflow.id.as_str()) {
        Ok(lock) => lock,
        Err(e) => {
            eprintln!("meow start: {e}");
            return 1;
        }
    };

    workflow.orchestrator_pid = std::process::id();
    let store = Arc::new(WorkflowStore::new(paths));
    if let Err(e) = store.save(&workflow) {
        eprintln!("meow start: {e}");
        return 1;
    }

    super::run_orchestrator(workflow, store, lock).await
}

#[cfg(test)]
#[path = "start_tests.rs"]
mod tests;
