// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! Workflow execution engine: the scheduler, step executor, event bus, agent
//! manager, and crash recovery that together drive a single workflow from
//! `pending` to a terminal status.

mod agent_manager;
mod error;
mod event_bus;
mod executor;
mod orchestrator;
mod recovery;
mod scheduler;

pub use agent_manager::{AgentManager, AgentManagerError};
pub use error::EngineError;
pub use event_bus::{AwaitTimeoutError, EventBus};
pub use executor::{merge_outputs, parse_name_value_outputs, shell_step_error, Executor, ShellOutcome};
pub use orchestrator::Orchestrator;
pub use recovery::{needs_cleanup_replay, recover, replay_cleanup};
pub use scheduler::{all_terminal, has_unrecovered_failure, join_policy_of, ready_steps, Readiness};
