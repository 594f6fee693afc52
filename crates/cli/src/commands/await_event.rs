// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `meow await-event` — block until a matching event arrives, or time out.
//!
//! Unlike `done`/`event`/`session-id`, an unmanaged invocation is treated as
//! an immediate timeout (exit 1), not a silent no-op: there is no sensible
//! "event" to wait for outside a workflow.

use crate::env;
use crate::util::{key_values_to_map, parse_duration};
use clap::Args;
use meow_daemon::{client, Request, Response};

#[derive(Args, Debug)]
pub struct AwaitEventArgs {
    pub name: String,
    /// Repeatable `key=value` predicate the event's data must match exactly.
    #[arg(long = "predicate", value_parser = crate::util::parse_key_value)]
    pub predicate: Vec<(String, String)>,
    /// How long to wait, e.g. `100ms`, `5s`, `2m`.
    #[arg(long, value_parser = parse_duration)]
    pub timeout: Option<std::time::Duration>,
}

pub async fn run(args: AwaitEventArgs) -> i32 {
    if env::is_unmanaged() {
        return 1;
    }

    let timeout_ms = args.timeout.map(|d| d.as_millis() as u64);
    let request = Request::EventAwait {
        name: args.name,
        predicate: key_values_to_map(&args.predicate),
        timeout_ms,
    };
    let read_timeout = args
        .timeout
        .map(|d| d + std::time::Duration::from_secs(1))
        .unwrap_or(meow_daemon::wire::DEFAULT_TIMEOUT);

    match client::resolve_and_send_with_timeout(&request, read_timeout).await {
        Ok(Response::Event { .. }) => 0,
        Ok(Response::Error { .. }) | Ok(_) => 1,
        Err(e) => {
            eprintln!("meow await-event: {e}");
            1
        }
    }
}

#[cfg(test)]
#[path = "await_event_tests.rs"]
mod tests;
