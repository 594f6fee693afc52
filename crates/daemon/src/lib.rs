// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! IPC layer between agent-side CLI invocations and a running workflow's
//! orchestrator: wire codec, typed request/response messages, the
//! per-workflow Unix socket server, and the client used by agent-facing
//! subcommands to dial it.

pub mod client;
pub mod dispatch;
pub mod protocol;
pub mod server;
pub mod wire;

pub use client::{ClientError, ORCH_SOCK_ENV, WORKFLOW_ENV};
pub use protocol::{Request, Response};
pub use server::{Server, ServerError};
pub use wire::ProtocolError;
