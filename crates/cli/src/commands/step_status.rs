// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `meow step-status` — query a step's status, composing with shell
//! conditionals via exit code: 0 match, 1 no-match, 2 hard error.
//!
//! Unlike the other agent-side commands, an unmanaged invocation is a hard
//! error here (exit 2 with a stderr diagnostic), not a silent no-op — there's
//! no step to report on outside a workflow.

use crate::env;
use clap::Args;
use meow_core::StepId;
use meow_daemon::{client, Request, Response};

#[derive(Args, Debug)]
pub struct StepStatusArgs {
    /// Step id; defaults to MEOW_STEP.
    pub step: Option<String>,
    /// If given, exit 0 when the step's status equals this, 1 otherwise.
    /// Without it, exit 0 prints the status if the step is found.
    #[arg(long)]
    pub want: Option<String>,
}

pub async fn run(args: StepStatusArgs) -> i32 {
    if env::is_unmanaged() {
        eprintln!("meow step-status: not running inside a managed workflow (MEOW_ORCH_SOCK/MEOW_WORKFLOW unset)");
        return 2;
    }

    let Some(step_id) = args.step.or_else(env::step) else {
        eprintln!("meow step-status: no step id (pass it as an argument or set MEOW_STEP)");
        return 2;
    };

    let request = Request::StepStatusGet { step_id: StepId::new(step_id) };
    match client::resolve_and_send(&request).await {
        Ok(Response::StepStatus { status: Some(status) }) => match &args.want {
            Some(want) if want == &status.to_string() => 0,
            Some(_) => 1,
            None => {
                println!("{status}");
                0
            }
        },
        Ok(Response::StepStatus { status: None }) => {
            eprintln!("meow step-status: unknown step");
            2
        }
        Ok(Response::Error { message }) => {
            eprintln!("meow step-status: {message}");
            2
        }
        Ok(_) => 2,
        Err(e) => {
            eprintln!("meow step-status: {e}");
            2
        }
    }
}

#[cfg(test)]
#[path = "step_status_tests.rs"]
mod tests;
