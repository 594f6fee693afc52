// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-workflow IPC server: one Unix socket bound at
//! [`meow_store::Paths::socket_path`], one short-lived task per connection
//! (one request, one response, then the connection closes), shut down by a
//! [`tokio::sync::Notify`] the orchestrator's caller signals on completion.

use crate::dispatch;
use crate::wire::{self, ProtocolError, DEFAULT_TIMEOUT};
use meow_adapters::SessionAdapter;
use meow_core::Clock;
use meow_engine::Orchestrator;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::net::{UnixListener, UnixStream};
use tokio::sync::Notify;
use tokio::task::JoinSet;

/// How long to wait for in-flight connection handlers to finish after
/// shutdown is signalled, before the socket file is unlinked out from under
/// them anyway (§4.2 step 4).
const SHUTDOWN_GRACE: Duration = Duration::from_secs(5);

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("io error binding {path}: {source}")]
    Bind { path: PathBuf, source: std::io::Error },
}

/// Bound listener plus the path it owns, so the caller can clean up the
/// socket file on shutdown.
pub struct Server {
    listener: UnixListener,
    socket_path: PathBuf,
}

impl Server {
    /// Bind `socket_path`, removing a stale file left by a prior crash first.
    /// The parent directory and the socket itself end up owner-only (0700).
    pub fn bind(socket_path: &Path) -> Result<Self, ServerError> {
        if let Some(parent) = socket_path.parent() {
            std::fs::create_dir_all(parent).map_err(|source| ServerError::Bind { path: socket_path.to_path_buf(), source })?;
            let _ = std::fs::set_permissions(parent, std::fs::Permissions::from_mode(0o700));
        }
        if socket_path.exists() {
            let _ = std::fs::remove_file(socket_path);
        }

        let listener = UnixListener::bind(socket_path).map_err(|source| ServerError::Bind {
            path: socket_path.to_path_buf(),
            source,
        })?;
        let _ = std::fs::set_permissions(socket_path, std::fs::Permissions::from_mode(0o600));

        Ok(Self { listener, socket_path: socket_path.to_path_buf() })
    }

    /// Accept connections until `shutdown` is notified, dispatching each
    /// request against `orchestrator`. On shutdown, waits (bounded by
    /// [`SHUTDOWN_GRACE`]) for in-flight handlers to finish before removing
    /// the socket file.
    pub async fn serve<S, C>(self, orchestrator: Arc<Orchestrator<S, C>>, shutdown: Arc<Notify>)
    where
        S: SessionAdapter + Send + Sync + 'static,
        C: Clock + Send + Sync + 'static,
    {
        let mut handlers = JoinSet::new();

        loop {
            tokio::select! {
                accepted = self.listener.accept() => {
                    match accepted {
                        Ok((stream, _addr)) => {
                            let orchestrator = Arc::clone(&orchestrator);
                            handlers.spawn(async move {
                                if let Err(e) = handle_connection(stream, orchestrator).await {
                                    tracing::debug!(error = %e, "ipc connection ended with an error");
                                }
                            });
                        }
                        Err(e) => tracing::warn!(error = %e, "failed to accept ipc connection"),
                    }
                }
                _ = shutdown.notified() => break,
            }
        }

        let drain = async {
            while handlers.join_next().await.is_some() {}
        };
        if tokio::time::timeout(SHUTDOWN_GRACE, drain).await.is_err() {
            tracing::warn!("timed out waiting for in-flight ipc connections to finish; shutting down anyway");
            handlers.abort_all();
        }

        let _ = std::fs::remove_file(&self.socket_path);
    }

    pub fn socket_path(&self) -> &Path {
        &self.socket_path
    }
}

async fn handle_connection<S, C>(
    mut stream: UnixStream,
    orchestrator: Arc<Orchestrator<S, C>>,
) -> Result<(), ProtocolError>
where
    S: SessionAdapter,
    C: Clock,
{
    let (mut reader, mut writer) = stream.split();
    let request = match wire::read_request(&mut reader, DEFAULT_TIMEOUT).await {
        Ok(request) => request,
        Err(ProtocolError::ConnectionClosed) => return Ok(()),
        Err(e) => return Err(e),
    };
    let response = dispatch::handle(&orchestrator, request).await;
    wire::write_response(&mut writer, &response, DEFAULT_TIMEOUT).await
}

#[cfg(test)]
#[path = "server_tests.rs"]
mod tests;
