// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `meow done` — report a step's completion to the orchestrator.

use crate::env;
use clap::Args;
use meow_core::{AgentId, StepId};
use meow_daemon::{client, Request, Response};
use meow_engine::merge_outputs;

#[derive(Args, Debug)]
pub struct DoneArgs {
    /// Agent id; defaults to MEOW_AGENT.
    #[arg(long)]
    pub agent: Option<String>,
    /// Step id; defaults to MEOW_STEP, or is resolved by the orchestrator
    /// from the agent's currently-dispatched step.
    #[arg(long)]
    pub step: Option<String>,
    /// Repeatable `name=value` output.
    #[arg(long = "output", value_parser = crate::util::parse_key_value)]
    pub outputs: Vec<(String, String)>,
    /// A JSON object of outputs; wins over `--output` on key conflicts.
    #[arg(long = "output-json")]
    pub output_json: Option<String>,
    #[arg(long)]
    pub notes: Option<String>,
}

pub async fn run(args: DoneArgs) -> i32 {
    if env::is_unmanaged() {
        return 0;
    }

    let Some(agent_id) = args.agent.or_else(env::agent) else {
        eprintln!("meow done: no agent id (pass --agent or set MEOW_AGENT)");
        return 1;
    };

    let outputs = match merge_outputs(&args.outputs, args.output_json.as_deref()) {
        Ok(outputs) => outputs,
        Err(e) => {
            eprintln!("meow done: {e}");
            return 1;
        }
    };

    let step_id = args.step.or_else(env::step).map(StepId::new);
    let request = Request::StepDone {
        agent_id: AgentId::new(agent_id),
        step_id,
        outputs,
        notes: args.notes,
    };

    match client::resolve_and_send(&request).await {
        Ok(Response::Ack { ok: true }) => 0,
        Ok(Response::Error { message }) => {
            eprintln!("meow done: {message}");
            1
        }
        Ok(_) => 0,
        Err(e) => {
            eprintln!("meow done: {e}");
            1
        }
    }
}

#[cfg(test)]
#[path = "done_tests.rs"]
mod tests;
