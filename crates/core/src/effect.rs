// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Effects represent side effects the controller needs to perform

use crate::job::Job;
use crate::meta::ObjectReference;
use crate::namespace::RecordKey;
use crate::record::CronJobStatus;
use crate::timer::TimerId;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Severity of a recorded event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventType {
    Normal,
    Warning,
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EventType::Normal => write!(f, "Normal"),
            EventType::Warning => write!(f, "Warning"),
        }
    }
}

/// Effects that need to be executed by the engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Effect {
    // === Job effects ===
    /// Create a job; an existing job of the same name counts as success
    CreateJob { job: Job },

    /// Delete a job; a job that is already gone counts as success
    DeleteJob { job: ObjectReference },

    // === Record effects ===
    /// Write the status sub-object, guarded by the record's resource version
    UpdateStatus {
        key: RecordKey,
        resource_version: u64,
        status: CronJobStatus,
    },

    /// Attach a user-visible event to a record
    Record {
        key: RecordKey,
        event_type: EventType,
        reason: String,
        message: String,
    },

    // === Timer effects ===
    SetTimer {
        id: TimerId,
        #[serde(with = "duration_serde")]
        duration: Duration,
    },

    CancelTimer { id: TimerId },
}

impl crate::traced::TracedEffect for Effect {
    fn name(&self) -> &'static str {
        match self {
            Effect::CreateJob { .. } => "create_job",
            Effect::DeleteJob { .. } => "delete_job",
            Effect::UpdateStatus { .. } => "update_status",
            Effect::Record { .. } => "record",
            Effect::SetTimer { .. } => "set_timer",
            Effect::CancelTimer { .. } => "cancel_timer",
        }
    }

    fn fields(&self) -> Vec<(&'static str, String)> {
        match self {
            Effect::CreateJob { job } => vec![
                ("job", job.metadata.key().to_string()),
                (
                    "scheduled_at",
                    job.scheduled_time()
                        .map(|t| t.to_rfc3339())
                        .unwrap_or_default(),
                ),
            ],
            Effect::DeleteJob { job } => vec![("job", job.key().to_string())],
            Effect::UpdateStatus {
                key,
                resource_version,
                status,
            } => vec![
                ("cronjob", key.to_string()),
                ("resource_version", resource_version.to_string()),
                ("active", status.active.len().to_string()),
            ],
            Effect::Record {
                key,
                event_type,
                reason,
                ..
            } => vec![
                ("cronjob", key.to_string()),
                ("type", event_type.to_string()),
                ("reason", reason.clone()),
            ],
            Effect::SetTimer { id, duration } => vec![
                ("id", id.to_string()),
                ("duration_ms", duration.as_millis().to_string()),
            ],
            Effect::CancelTimer { id } => vec![("id", id.to_string())],
        }
    }
}

mod duration_serde {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(duration: &Duration, s: S) -> Result<S::Ok, S::Error> {
        duration.as_millis().serialize(s)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        let millis = u64::deserialize(d)?;
        Ok(Duration::from_millis(millis))
    }
}

#[cfg(test)]
#[path = "effect_tests.rs"]
mod tests;
