// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-workflow publish/subscribe event log.
//!
//! `emit` appends under the workflow mutex and wakes every waiter whose
//! predicate matches; `await_event` first scans the log for a match, then
//! falls back to registering a waiter woken by `emit`. Waiters are removed on
//! timeout.

use meow_core::{Event, Value, WorkflowId};
use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::oneshot;

struct Waiter {
    id: u64,
    name: String,
    predicate: BTreeMap<String, Value>,
    reply: oneshot::Sender<Event>,
}

struct Inner {
    log: Vec<Event>,
    next_seq: u64,
    next_waiter_id: u64,
    waiters: Vec<Waiter>,
}

/// Append-only event log with fan-out wakeups for a single workflow.
#[derive(Clone)]
pub struct EventBus {
    workflow_id: WorkflowId,
    inner: Arc<Mutex<Inner>>,
}

impl EventBus {
    pub fn new(workflow_id: WorkflowId) -> Self {
        Self {
            workflow_id,
            inner: Arc::new(Mutex::new(Inner {
                log: Vec::new(),
                next_seq: 0,
                next_waiter_id: 0,
                waiters: Vec::new(),
            })),
        }
    }

    /// Rehydrate from a workflow's persisted event log (used by recovery).
    pub fn from_log(workflow_id: WorkflowId, events: Vec<Event>) -> Self {
        let next_seq = events.last().map(|e| e.seq + 1).unwrap_or(0);
        Self {
            workflow_id,
            inner: Arc::new(Mutex::new(Inner {
                log: events,
                next_seq,
                next_waiter_id: 0,
                waiters: Vec::new(),
            })),
        }
    }

    /// Append an event and wake every waiter whose predicate matches.
    pub fn emit(&self, name: impl Into<String>, data: BTreeMap<String, Value>) -> Event {
        let mut inner = self.inner.lock();
        let seq = inner.next_seq;
        inner.next_seq += 1;

        let event = Event::new(self.workflow_id.clone(), name, data, seq);
        inner.log.push(event.clone());

        let mut still_waiting = Vec::with_capacity(inner.waiters.len());
        for waiter in inner.waiters.drain(..) {
            if event.matches(&waiter.name, &waiter.predicate) {
                let _ = waiter.reply.send(event.clone());
            } else {
                still_waiting.push(waiter);
            }
        }
        inner.waiters = still_waiting;

        event
    }

    /// Full log, in `seq` order.
    pub fn log(&self) -> Vec<Event> {
        self.inner.lock().log.clone()
    }

    /// Block until an event matching `name`/`predicate` arrives, or `timeout` elapses.
    pub async fn await_event(
        &self,
        name: &str,
        predicate: BTreeMap<String, Value>,
        timeout: Option<Duration>,
    ) -> Result<Event, AwaitTimeoutError> {
        let (waiter_id, rx) = {
            let mut inner = self.inner.lock();
            if let Some(existing) = inner.log.iter().find(|e| e.matches(name, &predicate)) {
                return Ok(existing.clone());
            }
            let id = inner.next_waiter_id;
            inner.next_waiter_id += 1;
            let (tx, rx) = oneshot::channel();
            inner.waiters.push(Waiter {
                id,
                name: name.to_string(),
                predicate,
                reply: tx,
            });
            (id, rx)
        };

        match timeout {
            Some(d) => match tokio::time::timeout(d, rx).await {
                Ok(Ok(event)) => Ok(event),
                _ => {
                    self.inner.lock().waiters.retain(|w| w.id != waiter_id);
                    Err(AwaitTimeoutError)
                }
            },
            None => rx.await.map_err(|_| AwaitTimeoutError),
        }
    }
}

#[derive(Debug, Clone, Copy, thiserror::Error)]
#[error("timed out waiting for event")]
pub struct AwaitTimeoutError;

#[cfg(test)]
#[path = "event_bus_tests.rs"]
mod tests;
