// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `meow stop <id>` — signal a running orchestrator to stop. Reads the
//! recorded PID from the workflow's record; never takes the workflow's file
//! lock (§4.3) since this process isn't the orchestrator.

use crate::process;
use clap::Args;
use meow_store::{Paths, WorkflowStore};

#[derive(Args, Debug)]
pub struct StopArgs {
    pub workflow_id: String,
}

pub async fn run(args: StopArgs) -> i32 {
    let paths = match Paths::resolve() {
        Ok(paths) => paths,
        Err(e) => {
            eprintln!("meow stop: {e}");
            return 1;
        }
    };
    let store = WorkflowStore::new(paths);
    let workflow = match store.get(&args.workflow_id) {
        Ok(wf) => wf,
        Err(e) => {
            eprintln!("meow stop: {e}");
            return 1;
        }
    };

    if workflow.orchestrator_pid == 0 {
        eprintln!("meow stop: workflow '{}' has no recorded orchestrator pid", args.workflow_id);
        return 1;
    }

    match process::signal_stop(workflow.orchestrator_pid) {
        Ok(()) => 0,
        Err(e) => {
            eprintln!("meow stop: {e}");
            1
        }
    }
}

#[cfg(test)]
#[path = "stop_tests.rs"]
mod tests;
