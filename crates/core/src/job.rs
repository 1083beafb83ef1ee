// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Child job instances created for scheduled instants.
//!
//! The controller never runs a job itself. It creates the job object, then
//! observes the phase the job primitive reports back.

use crate::meta::{ObjectMeta, ObjectReference};
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Annotation recording which scheduled instant a job was created for
pub const SCHEDULED_AT_ANNOTATION: &str = "batch.cj.dev/scheduled-at";

pub const JOB_KIND: &str = "Job";

/// Lifecycle phase reported by the job primitive
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum JobPhase {
    #[default]
    Running,
    Succeeded,
    Failed,
}

impl JobPhase {
    pub fn is_finished(self) -> bool {
        matches!(self, JobPhase::Succeeded | JobPhase::Failed)
    }
}

impl fmt::Display for JobPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JobPhase::Running => write!(f, "running"),
            JobPhase::Succeeded => write!(f, "succeeded"),
            JobPhase::Failed => write!(f, "failed"),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobStatus {
    #[serde(default)]
    pub phase: JobPhase,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_time: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completion_time: Option<DateTime<Utc>>,
}

/// One run produced for a scheduled instant
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Job {
    pub metadata: ObjectMeta,
    #[serde(default)]
    pub spec: serde_json::Value,
    #[serde(default)]
    pub status: JobStatus,
}

impl Job {
    pub fn name(&self) -> &str {
        &self.metadata.name
    }

    pub fn is_finished(&self) -> bool {
        self.status.phase.is_finished()
    }

    /// The instant this job was created for, read from its annotation.
    ///
    /// Returns `None` for jobs without the annotation or with a malformed one.
    pub fn scheduled_time(&self) -> Option<DateTime<Utc>> {
        let raw = self.metadata.annotations.get(SCHEDULED_AT_ANNOTATION)?;
        DateTime::parse_from_rfc3339(raw)
            .ok()
            .map(|t| t.with_timezone(&Utc))
    }

    pub fn reference(&self) -> ObjectReference {
        ObjectReference {
            kind: JOB_KIND.to_string(),
            namespace: self.metadata.namespace.clone(),
            name: self.metadata.name.clone(),
            uid: self.metadata.uid.clone(),
            resource_version: self.metadata.resource_version,
        }
    }
}

/// Deterministic job name for a record and scheduled instant.
///
/// The instant is truncated to whole seconds, so every pass that acts on
/// the same instant derives the same name and a repeated create collides.
pub fn job_name(record_name: &str, scheduled: DateTime<Utc>) -> String {
    format!("{}-{}", record_name, scheduled.timestamp())
}

/// Annotation value for a scheduled instant
pub fn format_scheduled_at(scheduled: DateTime<Utc>) -> String {
    scheduled.to_rfc3339_opts(SecondsFormat::Secs, true)
}

#[cfg(test)]
#[path = "job_tests.rs"]
mod tests;
