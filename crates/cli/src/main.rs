// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

mod commands;
mod env;
mod logging;
mod process;
mod util;

use clap::{Parser, Subcommand};

/// Agent-facing and operator-facing interface to a workflow orchestrator.
#[derive(Parser, Debug)]
#[command(name = "meow", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Load a workflow definition and run it to completion.
    Start(commands::start::StartArgs),
    /// Reconcile on-disk state with live agents and resume a workflow.
    Resume(commands::resume::ResumeArgs),
    /// Signal a running orchestrator to stop.
    Stop(commands::stop::StopArgs),
    /// Report a step's outcome back to the orchestrator (agent-facing).
    Done(commands::done::DoneArgs),
    /// Emit an event for other steps to await (agent-facing).
    Event(commands::event::EventArgs),
    /// Block until a named event satisfying a predicate is observed.
    #[command(name = "await-event")]
    AwaitEvent(commands::await_event::AwaitEventArgs),
    /// Get or set the saved session id for an agent.
    #[command(name = "session-id")]
    SessionId(commands::session_id::SessionIdArgs),
    /// Query a step's current status.
    #[command(name = "step-status")]
    StepStatus(commands::step_status::StepStatusArgs),
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let default_filter = match cli.command {
        Command::Start(_) | Command::Resume(_) => "info",
        _ => "warn",
    };
    logging::init(default_filter);

    let code = match cli.command {
        Command::Start(args) => commands::start::run(args).await,
        Command::Resume(args) => commands::resume::run(args).await,
        Command::Stop(args) => commands::stop::run(args).await,
        Command::Done(args) => commands::done::run(args).await,
        Command::Event(args) => commands::event::run(args).await,
        Command::AwaitEvent(args) => commands::await_event::run(args).await,
        Command::SessionId(args) => commands::session_id::run(args).await,
        Command::StepStatus(args) => commands::step_status::run(args).await,
    };
    std::process::exit(code);
}
