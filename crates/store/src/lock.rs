// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-workflow advisory file lock.
//!
//! The lock is reentrant within a single process only in the sense that the
//! orchestrator acquires it once at startup and holds it for the workflow's
//! lifetime. Other processes (e.g. `meow stop`) never take this lock — they
//! only read metadata and signal the running orchestrator. The lock is
//! released automatically by the kernel on process crash, so no cleanup code
//! needs to run for correctness.

use crate::error::StoreError;
use crate::paths::Paths;
use fs2::FileExt;
use std::fs::{File, OpenOptions};
use std::io::Write;

/// An exclusive hold on a workflow's lock file. Dropping this releases the
/// lock (or the kernel does, on crash).
pub struct WorkflowLock {
    workflow_id: String,
    file: File,
}

impl WorkflowLock {
    /// Acquire the lock for `workflow_id`, failing immediately (no blocking)
    /// if another process already holds it.
    pub fn acquire(paths: &Paths, workflow_id: &str) -> Result<Self, StoreError> {
        let lock_path = paths.workflow_lock(workflow_id);
        if let Some(parent) = lock_path.parent() {
            std::fs::create_dir_all(parent).map_err(|source| StoreError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        // Avoid truncating before we hold the lock — that would stomp on
        // another process's recorded PID if the try_lock below fails.
        let file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(false)
            .open(&lock_path)
            .map_err(|source| StoreError::Io {
                path: lock_path.clone(),
                source,
            })?;

        file.try_lock_exclusive()
            .map_err(|source| StoreError::LockFailed {
                workflow_id: workflow_id.to_string(),
                source,
            })?;

        let mut file = file;
        file.set_len(0).map_err(|source| StoreError::Io {
            path: lock_path.clone(),
            source,
        })?;
        writeln!(file, "{}", std::process::id()).map_err(|source| StoreError::Io {
            path: lock_path,
            source,
        })?;

        Ok(Self {
            workflow_id: workflow_id.to_string(),
            file,
        })
    }

    pub fn workflow_id(&self) -> &str {
        &self.workflow_id
    }
}

impl Drop for WorkflowLock {
    fn drop(&mut self) {
        let _ = FileExt::unlock(&self.file);
    }
}

#[cfg(test)]
#[path = "lock_tests.rs"]
mod tests;
