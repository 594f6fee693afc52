// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! PID liveness and stop-safety checks for the orchestrator process (§4.7,
//! §5, §8 property 8): `stop` must refuse to signal a PID whose command line
//! doesn't look like a `meow` process, guarding against PID reuse.

use std::process::Command;

/// Substring every orchestrator process's argv[0] is expected to contain.
const EXPECTED_BINARY_NAME: &str = "meow";

/// True if a process with `pid` exists (`kill -0`).
pub fn process_exists(pid: u32) -> bool {
    kill_signal("-0", pid)
}

/// Read `/proc/<pid>/cmdline` and check it names the expected binary.
/// Returns `false` if the process is gone or its cmdline can't be read —
/// either way, it's not safe to signal.
pub fn is_meow_process(pid: u32) -> bool {
    let path = format!("/proc/{pid}/cmdline");
    let Ok(raw) = std::fs::read(&path) else {
        return false;
    };
    raw.split(|&b| b == 0)
        .next()
        .map(|argv0| String::from_utf8_lossy(argv0).contains(EXPECTED_BINARY_NAME))
        .unwrap_or(false)
}

/// Send SIGTERM to `pid`, refusing if it doesn't look like a `meow` process.
pub fn signal_stop(pid: u32) -> Result<(), StopError> {
    if !process_exists(pid) {
        return Err(StopError::NotRunning(pid));
    }
    if !is_meow_process(pid) {
        return Err(StopError::UnexpectedProcess(pid));
    }
    if !kill_signal("-15", pid) {
        return Err(StopError::SignalFailed(pid));
    }
    Ok(())
}

fn kill_signal(signal: &str, pid: u32) -> bool {
    Command::new("kill")
        .args([signal, &pid.to_string()])
        .stdin(std::process::Stdio::null())
        .stdout(std::process::Stdio::null())
        .stderr(std::process::Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

#[derive(Debug, thiserror::Error)]
pub enum StopError {
    #[error("process {0} is not running")]
    NotRunning(u32),
    #[error("refusing to signal pid {0}: command line does not look like a meow process")]
    UnexpectedProcess(u32),
    #[error("failed to signal pid {0}")]
    SignalFailed(u32),
}

#[cfg(test)]
#[path = "process_tests.rs"]
mod tests;
