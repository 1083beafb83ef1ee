// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared test helpers for use across crates.
//!
//! Gated behind `#[cfg(any(test, feature = "test-support"))]`.

use crate::job::{format_scheduled_at, job_name, SCHEDULED_AT_ANNOTATION};
use crate::record::CRON_JOB_KIND;
use crate::{
    ConcurrencyPolicy, CronJob, CronJobSpec, Job, JobPhase, JobStatus, JobTemplate, ObjectMeta,
    OwnerReference, Uid,
};
use chrono::{DateTime, TimeZone, Utc};

// ── Time helpers ────────────────────────────────────────────────────────────

/// Build a UTC timestamp, panicking on an invalid date (tests only).
#[allow(clippy::panic)]
pub fn utc(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32) -> DateTime<Utc> {
    match Utc.with_ymd_and_hms(y, mo, d, h, mi, s) {
        chrono::LocalResult::Single(t) => t,
        _ => panic!("invalid test timestamp {y}-{mo}-{d} {h}:{mi}:{s}"),
    }
}

// ── Record builders ─────────────────────────────────────────────────────────

/// A record with the given schedule, created at `created`, uid `uid-{name}`.
pub fn cron_job(name: &str, schedule: &str, created: DateTime<Utc>) -> CronJob {
    let mut metadata = ObjectMeta::new("default", name);
    metadata.uid = Uid::new(format!("uid-{name}"));
    metadata.resource_version = 1;
    metadata.creation_timestamp = Some(created);
    CronJob::new(
        metadata,
        CronJobSpec {
            schedule: schedule.to_string(),
            job_template: JobTemplate {
                spec: serde_json::json!({"command": ["echo", "hello"]}),
                ..JobTemplate::default()
            },
            ..CronJobSpec::default()
        },
    )
}

/// Fluent tweaks for records built by [`cron_job`].
pub trait CronJobExt {
    fn with_policy(self, policy: ConcurrencyPolicy) -> Self;
    fn with_deadline_secs(self, secs: i64) -> Self;
    fn with_suspend(self, suspend: bool) -> Self;
    fn with_history(self, succeeded: i32, failed: i32) -> Self;
    fn with_last_schedule(self, at: DateTime<Utc>) -> Self;
}

impl CronJobExt for CronJob {
    fn with_policy(mut self, policy: ConcurrencyPolicy) -> Self {
        self.spec.concurrency_policy = policy;
        self
    }

    fn with_deadline_secs(mut self, secs: i64) -> Self {
        self.spec.starting_deadline_seconds = Some(secs);
        self
    }

    fn with_suspend(mut self, suspend: bool) -> Self {
        self.spec.suspend = Some(suspend);
        self
    }

    fn with_history(mut self, succeeded: i32, failed: i32) -> Self {
        self.spec.successful_jobs_history_limit = Some(succeeded);
        self.spec.failed_jobs_history_limit = Some(failed);
        self
    }

    fn with_last_schedule(mut self, at: DateTime<Utc>) -> Self {
        self.status.last_schedule_time = Some(at);
        self
    }
}

// ── Job builders ────────────────────────────────────────────────────────────

/// A job owned by `record`, created for `scheduled`, in the given phase.
///
/// Creation timestamp equals the scheduled instant.
pub fn owned_job(record: &CronJob, scheduled: DateTime<Utc>, phase: JobPhase) -> Job {
    let mut metadata = ObjectMeta::new(
        &record.metadata.namespace,
        job_name(&record.metadata.name, scheduled),
    );
    metadata.uid = Uid::new(format!("uid-{}", metadata.name));
    metadata.resource_version = 1;
    metadata.creation_timestamp = Some(scheduled);
    metadata.annotations.insert(
        SCHEDULED_AT_ANNOTATION.to_string(),
        format_scheduled_at(scheduled),
    );
    metadata.owner_references.push(OwnerReference {
        kind: CRON_JOB_KIND.to_string(),
        name: record.metadata.name.clone(),
        uid: record.metadata.uid.clone(),
        controller: true,
    });
    Job {
        metadata,
        spec: record.spec.job_template.spec.clone(),
        status: JobStatus {
            phase,
            start_time: Some(scheduled),
            completion_time: phase.is_finished().then_some(scheduled),
        },
    }
}
