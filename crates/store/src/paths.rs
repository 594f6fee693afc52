// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Filesystem and socket path derivation.
//!
//! `MEOW_STATE_DIR` takes priority (used by tests and the agent-side CLI for
//! isolation); otherwise falls back to `XDG_STATE_HOME/meow` or
//! `~/.local/state/meow`.

use std::path::PathBuf;

/// Environment override for the state directory base.
pub const STATE_DIR_ENV: &str = "MEOW_STATE_DIR";

/// Resolved filesystem layout for the store and IPC sockets.
#[derive(Debug, Clone)]
pub struct Paths {
    pub state_dir: PathBuf,
}

impl Paths {
    /// Resolve from the environment, following `MEOW_STATE_DIR` → `XDG_STATE_HOME` → `~/.local/state`.
    pub fn resolve() -> Result<Self, NoStateDirError> {
        if let Ok(dir) = std::env::var(STATE_DIR_ENV) {
            return Ok(Self {
                state_dir: PathBuf::from(dir).join("meow"),
            });
        }

        if let Ok(xdg) = std::env::var("XDG_STATE_HOME") {
            return Ok(Self {
                state_dir: PathBuf::from(xdg).join("meow"),
            });
        }

        let home = dirs::home_dir().ok_or(NoStateDirError)?;
        Ok(Self {
            state_dir: home.join(".local/state/meow"),
        })
    }

    pub fn workflows_dir(&self) -> PathBuf {
        self.state_dir.join("workflows")
    }

    pub fn workflow_yaml(&self, workflow_id: &str) -> PathBuf {
        self.workflows_dir().join(format!("{workflow_id}.yaml"))
    }

    pub fn workflow_lock(&self, workflow_id: &str) -> PathBuf {
        self.workflows_dir().join(format!("{workflow_id}.lock"))
    }

    /// Per-workflow runtime directory holding the Unix socket. Kept separate
    /// from `workflows_dir` so socket cleanup never touches the durable
    /// record.
    pub fn run_dir(&self) -> PathBuf {
        self.state_dir.join("run")
    }

    /// `SocketPath(workflow_id)` — deterministic path under a user-private
    /// runtime directory. Callers MUST prefer `MEOW_ORCH_SOCK` when set; this
    /// is only the fallback derivation (see [`crate::error::StoreError`] users
    /// in `meow-daemon` for the precedence contract).
    pub fn socket_path(&self, workflow_id: &str) -> PathBuf {
        self.run_dir().join(format!("{workflow_id}.sock"))
    }
}

#[derive(Debug, Clone, Copy, thiserror::Error)]
#[error("cannot resolve a state directory: no $HOME and no MEOW_STATE_DIR/XDG_STATE_HOME override")]
pub struct NoStateDirError;

#[cfg(test)]
#[path = "paths_tests.rs"]
mod tests;
