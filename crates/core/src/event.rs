// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Named, sequenced pub/sub events exchanged within a workflow.

use crate::value::Value;
use crate::workflow::WorkflowId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

crate::define_id! {
    /// Identifies an event record for logging/debugging; not used for routing
    /// (routing is by `name` and `seq`).
    pub struct EventId;
}

/// A single published event. Events are retained for the lifetime of the
/// workflow record and are append-only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub workflow_id: WorkflowId,
    pub name: String,
    #[serde(default)]
    pub data: BTreeMap<String, Value>,
    /// Monotonically increasing within a workflow; assigned under the
    /// workflow's state mutex so concurrent `emit`s get distinct values.
    pub seq: u64,
}

impl Event {
    pub fn new(workflow_id: WorkflowId, name: impl Into<String>, data: BTreeMap<String, Value>, seq: u64) -> Self {
        Self {
            workflow_id,
            name: name.into(),
            data,
            seq,
        }
    }

    pub fn matches(&self, name: &str, predicate: &BTreeMap<String, Value>) -> bool {
        self.name == name && Value::matches_predicate(&self.data, predicate)
    }
}

#[cfg(test)]
#[path = "event_tests.rs"]
mod tests;
