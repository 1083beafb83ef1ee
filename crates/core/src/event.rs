// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Events that wake the controller.
//!
//! Events only say *which* record needs attention. The reconcile pass
//! re-reads everything it needs from the store, so dropping or duplicating
//! an event never changes the outcome, only its timing.

use crate::namespace::RecordKey;
use crate::timer::TimerId;
use serde::{Deserialize, Serialize};

/// Serializes with `{"type": "event:name", ...fields}` format.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    /// A record was created or its spec edited
    #[serde(rename = "record:changed")]
    RecordChanged { key: RecordKey },

    #[serde(rename = "record:deleted")]
    RecordDeleted { key: RecordKey },

    /// A job owned by the record was created, deleted, or changed phase
    #[serde(rename = "job:changed")]
    JobChanged { owner: RecordKey, job: String },

    #[serde(rename = "timer:start")]
    TimerStart { id: TimerId },

    #[serde(rename = "system:shutdown")]
    Shutdown,
}

impl Event {
    pub fn name(&self) -> &'static str {
        match self {
            Event::RecordChanged { .. } => "record:changed",
            Event::RecordDeleted { .. } => "record:deleted",
            Event::JobChanged { .. } => "job:changed",
            Event::TimerStart { .. } => "timer:start",
            Event::Shutdown => "system:shutdown",
        }
    }

    /// The record this event should trigger a reconcile for.
    pub fn record_key(&self) -> Option<RecordKey> {
        match self {
            Event::RecordChanged { key } | Event::RecordDeleted { key } => Some(key.clone()),
            Event::JobChanged { owner, .. } => Some(owner.clone()),
            Event::TimerStart { id } => id.record_key(),
            Event::Shutdown => None,
        }
    }

    pub fn log_summary(&self) -> String {
        let t = self.name();
        match self {
            Event::RecordChanged { key } | Event::RecordDeleted { key } => {
                format!("{t} cronjob={key}")
            }
            Event::JobChanged { owner, job } => format!("{t} cronjob={owner} job={job}"),
            Event::TimerStart { id } => format!("{t} id={id}"),
            Event::Shutdown => t.to_string(),
        }
    }
}

#[cfg(test)]
#[path = "event_tests.rs"]
mod tests;
