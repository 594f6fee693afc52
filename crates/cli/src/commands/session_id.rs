// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `meow session-id` — read or write an agent's backend session id.

use crate::env;
use clap::{Args, Subcommand};
use meow_core::AgentId;
use meow_daemon::{client, Request, Response};

#[derive(Args, Debug)]
pub struct SessionIdArgs {
    /// Agent id; defaults to MEOW_AGENT.
    #[arg(long, global = true)]
    pub agent: Option<String>,
    #[command(subcommand)]
    pub action: SessionIdAction,
}

#[derive(Subcommand, Debug)]
pub enum SessionIdAction {
    /// Print the agent's recorded session id, if any.
    Get,
    /// Record the agent's session id.
    Set { session_id: String },
}

pub async fn run(args: SessionIdArgs) -> i32 {
    if env::is_unmanaged() {
        return 0;
    }

    let Some(agent_id) = args.agent.or_else(env::agent) else {
        eprintln!("meow session-id: no agent id (pass --agent or set MEOW_AGENT)");
        return 1;
    };
    let agent_id = AgentId::new(agent_id);

    let request = match args.action {
        SessionIdAction::Get => Request::SessionIdGet { agent_id },
        SessionIdAction::Set { session_id } => Request::SessionIdSet { agent_id, session_id },
    };

    match client::resolve_and_send(&request).await {
        Ok(Response::SessionId { session_id: Some(id) }) => {
            println!("{id}");
            0
        }
        Ok(Response::SessionId { session_id: None }) => 0,
        Ok(Response::Ack { ok: true }) => 0,
        Ok(Response::Error { message }) => {
            eprintln!("meow session-id: {message}");
            1
        }
        Ok(_) => 0,
        Err(e) => {
            eprintln!("meow session-id: {e}");
            1
        }
    }
}

#[cfg(test)]
#[path = "session_id_tests.rs"]
mod tests;
