// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `meow event` — emit a named event into the workflow's event bus.

use crate::env;
use crate::util::key_values_to_map;
use clap::Args;
use meow_daemon::{client, Request, Response};

#[derive(Args, Debug)]
pub struct EventArgs {
    pub name: String,
    /// Repeatable `key=value` data for the event payload.
    #[arg(long = "data", value_parser = crate::util::parse_key_value)]
    pub data: Vec<(String, String)>,
}

pub async fn run(args: EventArgs) -> i32 {
    if env::is_unmanaged() {
        return 0;
    }

    let request = Request::EventEmit { name: args.name, data: key_values_to_map(&args.data) };
    match client::resolve_and_send(&request).await {
        Ok(Response::Error { message }) => {
            eprintln!("meow event: {message}");
            1
        }
        Ok(_) => 0,
        Err(e) => {
            eprintln!("meow event: {e}");
            1
        }
    }
}

#[cfg(test)]
#[path = "event_tests.rs"]
mod tests;
