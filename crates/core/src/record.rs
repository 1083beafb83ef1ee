// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The cron job record: desired schedule plus controller-owned status.

use crate::meta::{ObjectMeta, ObjectReference};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

/// Completed jobs of the succeeded class retained when no limit is set
pub const DEFAULT_SUCCESSFUL_JOBS_HISTORY_LIMIT: usize = 3;

/// Completed jobs of the failed class retained when no limit is set
pub const DEFAULT_FAILED_JOBS_HISTORY_LIMIT: usize = 1;

pub const CRON_JOB_KIND: &str = "CronJob";

/// How overlapping runs are handled.
///
/// Serializes as `"Allow"`, `"Forbid"`, `"Replace"`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ConcurrencyPolicy {
    /// Start every scheduled run, even while earlier runs are still active
    #[default]
    Allow,
    /// Skip a scheduled run while any earlier run is active
    Forbid,
    /// Delete active runs, then start the new one
    Replace,
}

impl fmt::Display for ConcurrencyPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConcurrencyPolicy::Allow => write!(f, "Allow"),
            ConcurrencyPolicy::Forbid => write!(f, "Forbid"),
            ConcurrencyPolicy::Replace => write!(f, "Replace"),
        }
    }
}

/// Template copied into every job the controller creates.
///
/// `spec` is opaque to the controller and copied verbatim.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobTemplate {
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub labels: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub annotations: BTreeMap<String, String>,
    #[serde(default)]
    pub spec: serde_json::Value,
}

/// Desired state, edited by users
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CronJobSpec {
    /// Cron expression
    pub schedule: String,
    /// Seconds after a scheduled instant during which a late start is still allowed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub starting_deadline_seconds: Option<i64>,
    #[serde(default)]
    pub concurrency_policy: ConcurrencyPolicy,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suspend: Option<bool>,
    pub job_template: JobTemplate,
    #[serde(
        default,
        rename = "successfulJobHistoryLimit",
        alias = "successfulJobsHistoryLimit",
        skip_serializing_if = "Option::is_none"
    )]
    pub successful_jobs_history_limit: Option<i32>,
    #[serde(
        default,
        rename = "failedJobHistoryLimit",
        alias = "failedJobsHistoryLimit",
        skip_serializing_if = "Option::is_none"
    )]
    pub failed_jobs_history_limit: Option<i32>,
}

impl CronJobSpec {
    pub fn is_suspended(&self) -> bool {
        self.suspend.unwrap_or(false)
    }

    /// Negative deadlines are treated as zero.
    pub fn starting_deadline(&self) -> Option<Duration> {
        self.starting_deadline_seconds
            .map(|secs| Duration::from_secs(u64::try_from(secs).unwrap_or(0)))
    }

    pub fn successful_history_limit(&self) -> usize {
        limit_or(
            self.successful_jobs_history_limit,
            DEFAULT_SUCCESSFUL_JOBS_HISTORY_LIMIT,
        )
    }

    pub fn failed_history_limit(&self) -> usize {
        limit_or(
            self.failed_jobs_history_limit,
            DEFAULT_FAILED_JOBS_HISTORY_LIMIT,
        )
    }
}

fn limit_or(limit: Option<i32>, default: usize) -> usize {
    match limit {
        Some(n) => usize::try_from(n).unwrap_or(0),
        None => default,
    }
}

/// Observed state, written only by the controller
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CronJobStatus {
    /// Jobs that have not reached a terminal phase
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub active: Vec<ObjectReference>,
    /// Most recent instant a job was created for
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_schedule_time: Option<DateTime<Utc>>,
    /// Latest instant accounted for: run, skipped, or fast-forwarded past
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_processed_time: Option<DateTime<Utc>>,
    /// Why the schedule does not parse; cleared once it does
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schedule_error: Option<String>,
}

/// A recurring job definition
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CronJob {
    pub metadata: ObjectMeta,
    pub spec: CronJobSpec,
    #[serde(default)]
    pub status: CronJobStatus,
}

impl CronJob {
    pub fn new(metadata: ObjectMeta, spec: CronJobSpec) -> Self {
        Self {
            metadata,
            spec,
            status: CronJobStatus::default(),
        }
    }
}

#[cfg(test)]
#[path = "record_tests.rs"]
mod tests;
