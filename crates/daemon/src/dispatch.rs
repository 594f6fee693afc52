// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Maps each [`Request`] variant onto the matching [`Orchestrator`] call and
//! converts the result into a [`Response`].

use crate::protocol::{Request, Response};
use meow_adapters::SessionAdapter;
use meow_core::Clock;
use meow_engine::Orchestrator;
use std::sync::Arc;

pub async fn handle<S: SessionAdapter, C: Clock>(
    orchestrator: &Arc<Orchestrator<S, C>>,
    request: Request,
) -> Response {
    match request {
        Request::StepDone { agent_id, step_id, outputs, notes } => {
            match orchestrator.step_done(&agent_id, step_id.as_ref(), outputs, notes) {
                Ok(()) => Response::Ack { ok: true },
                Err(e) => Response::error(e.to_string()),
            }
        }
        Request::EventEmit { name, data } => match orchestrator.event_emit(name, data) {
            Ok(event) => Response::Event { name: event.name, data: event.data, seq: event.seq },
            Err(e) => Response::error(e.to_string()),
        },
        Request::EventAwait { name, predicate, timeout_ms } => {
            let timeout = timeout_ms.map(std::time::Duration::from_millis);
            match orchestrator.event_await(&name, predicate, timeout).await {
                Ok(event) => Response::Event { name: event.name, data: event.data, seq: event.seq },
                Err(_) => Response::error(format!("event '{name}' did not arrive before timeout")),
            }
        }
        Request::SessionIdGet { agent_id } => {
            Response::SessionId { session_id: orchestrator.session_id_get(&agent_id) }
        }
        Request::SessionIdSet { agent_id, session_id } => {
            match orchestrator.session_id_set(&agent_id, session_id) {
                Ok(()) => Response::Ack { ok: true },
                Err(e) => Response::error(e.to_string()),
            }
        }
        Request::StepStatusGet { step_id } => {
            Response::StepStatus { status: orchestrator.step_status_get(&step_id) }
        }
        Request::Unknown => Response::error("unknown request type"),
    }
}

#[cfg(test)]
#[path = "dispatch_tests.rs"]
mod tests;
