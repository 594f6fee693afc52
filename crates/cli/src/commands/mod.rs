// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

pub mod await_event;
pub mod done;
pub mod event;
pub mod resume;
pub mod session_id;
pub mod start;
pub mod step_status;
pub mod stop;

use meow_adapters::TmuxAdapter;
use meow_core::SystemClock;
use meow_daemon::Server;
use meow_engine::Orchestrator;
use meow_store::{WorkflowLock, WorkflowStore};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Notify;

/// Grace period for `cleanup_on_stop` to finish after a SIGTERM/SIGINT.
pub(crate) const STOP_GRACE: Duration = Duration::from_secs(10);

/// Shared tail of `start`/`resume`: bind the IPC socket, run the scheduler
/// loop, and honor SIGINT/SIGTERM as a `stop` (§5). `lock` is held for the
/// duration — dropping it at the end releases the workflow for future runs.
pub(crate) async fn run_orchestrator(
    workflow: meow_core::Workflow,
    store: Arc<WorkflowStore>,
    lock: WorkflowLock,
) -> i32 {
    let socket_path = store.paths().socket_path(workflow.id.as_str());
    let server = match Server::bind(&socket_path) {
        Ok(server) => server,
        Err(e) => {
            eprintln!("meow: {e}");
            return 1;
        }
    };

    let mut stop_signals = match StopSignals::install() {
        Ok(signals) => signals,
        Err(e) => {
            eprintln!("meow: {e}");
            return 1;
        }
    };

    let orchestrator = Orchestrator::new(workflow, Arc::clone(&store), TmuxAdapter::new(), SystemClock);
    let shutdown = Arc::new(Notify::new());

    let server_handle = tokio::spawn(server.serve(Arc::clone(&orchestrator), Arc::clone(&shutdown)));
    let mut run_handle = tokio::spawn(Arc::clone(&orchestrator).run());

    let exit_code = tokio::select! {
        result = &mut run_handle => {
            match result {
                Ok(Ok(_status)) => 0,
                Ok(Err(e)) => {
                    eprintln!("meow: {e}");
                    1
                }
                Err(e) => {
                    eprintln!("meow: orchestrator task panicked: {e}");
                    1
                }
            }
        }
        _ = stop_signals.wait() => {
            if let Err(e) = orchestrator.stop(STOP_GRACE).await {
                eprintln!("meow: error during stop: {e}");
            }
            0
        }
    };

    shutdown.notify_one();
    let _ = server_handle.await;
    drop(lock);
    exit_code
}

/// SIGINT/SIGTERM listeners, installed once up front so a failure to install
/// either surfaces as an ordinary error rather than a panic mid-run.
struct StopSignals {
    term: tokio::signal::unix::Signal,
    int: tokio::signal::unix::Signal,
}

impl StopSignals {
    fn install() -> std::io::Result<Self> {
        use tokio::signal::unix::{signal, SignalKind};
        Ok(Self {
            term: signal(SignalKind::terminate())?,
            int: signal(SignalKind::interrupt())?,
        })
    }

    async fn wait(&mut self) {
        tokio::select! {
            _ = self.term.recv() => {}
            _ = self.int.recv() => {}
        }
    }
}
