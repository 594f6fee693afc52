// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Agent-side IPC client: resolve the per-workflow socket, dial it, send one
//! request, read one reply, then the connection closes (§4.2: short-lived
//! per-request connections).
//!
//! Socket precedence is a strict contract (§6, §8 property 3): `MEOW_ORCH_SOCK`
//! always wins over deriving the path from `MEOW_WORKFLOW`.

use crate::protocol::{Request, Response};
use crate::wire::{self, ProtocolError, DEFAULT_TIMEOUT};
use meow_store::Paths;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::net::UnixStream;

pub const ORCH_SOCK_ENV: &str = "MEOW_ORCH_SOCK";
pub const WORKFLOW_ENV: &str = "MEOW_WORKFLOW";

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("neither MEOW_ORCH_SOCK nor MEOW_WORKFLOW is set")]
    Unconfigured,
    #[error("no state directory: {0}")]
    NoStateDir(#[from] meow_store::paths::NoStateDirError),
    #[error(transparent)]
    Protocol(#[from] ProtocolError),
}

/// `SocketPath(workflow_id)`, preferring `MEOW_ORCH_SOCK` when set.
pub fn resolve_socket_path() -> Result<PathBuf, ClientError> {
    if let Ok(path) = std::env::var(ORCH_SOCK_ENV) {
        return Ok(PathBuf::from(path));
    }
    let workflow_id = std::env::var(WORKFLOW_ENV).map_err(|_| ClientError::Unconfigured)?;
    let paths = Paths::resolve()?;
    Ok(paths.socket_path(&workflow_id))
}

/// Dial `socket_path`, send `request`, and return the single reply, using the
/// implicit connect/read timeout for both connecting and the reply.
pub async fn send_request(socket_path: &Path, request: &Request) -> Result<Response, ClientError> {
    send_request_with_timeout(socket_path, request, DEFAULT_TIMEOUT).await
}

/// Like [`send_request`], but the caller supplies the timeout — used by
/// `await-event`, whose reply legitimately blocks longer than the implicit
/// default while the orchestrator waits for a matching event.
pub async fn send_request_with_timeout(
    socket_path: &Path,
    request: &Request,
    timeout: std::time::Duration,
) -> Result<Response, ClientError> {
    let mut stream = tokio::time::timeout(DEFAULT_TIMEOUT, UnixStream::connect(socket_path))
        .await
        .map_err(|_| ProtocolError::Timeout)??;
    let (mut reader, mut writer) = stream.split();
    wire::write_request(&mut writer, request, DEFAULT_TIMEOUT).await?;
    let response = wire::read_response(&mut reader, timeout).await?;
    Ok(response)
}

/// Resolve the socket and send in one call; the common case for CLI subcommands.
pub async fn resolve_and_send(request: &Request) -> Result<Response, ClientError> {
    let socket_path = resolve_socket_path()?;
    send_request(&socket_path, request).await
}

/// Resolve the socket and send with a caller-supplied reply timeout.
pub async fn resolve_and_send_with_timeout(
    request: &Request,
    timeout: std::time::Duration,
) -> Result<Response, ClientError> {
    let socket_path = resolve_socket_path()?;
    send_request_with_timeout(&socket_path, request, timeout).await
}

/// True if a listener is accepting connections at `socket_path`.
pub fn probe(socket_path: &Path) -> bool {
    std::os::unix::net::UnixStream::connect(socket_path).is_ok()
}

#[cfg(test)]
#[path = "client_tests.rs"]
mod tests;
