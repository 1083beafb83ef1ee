// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Level-triggered reconcile pass for one record.
//!
//! A pass re-reads the record and lists its jobs, decides everything in
//! [`plan`] without touching the store, then applies the decision through
//! the [`Executor`]. Nothing is carried between passes: a crash at any
//! point is repaired by the next pass, and the deterministic job name
//! turns a repeated create for the same instant into an "already exists".

use crate::concurrency::{self, Admission, SkipReason};
use crate::history::{self, HistoryLimits};
use crate::schedule::{CronSchedule, ScheduleError, MAX_MISSED_RUNS};
use crate::{Applied, ExecuteError, Executor, ReconcileError};
use chrono::{DateTime, Utc};
use cj_adapters::{EventRecorder, JobGateway, RecordStore};
use cj_core::job::{format_scheduled_at, job_name};
use cj_core::record::CRON_JOB_KIND;
use cj_core::{
    Clock, CronJob, CronJobStatus, Effect, EventType, Job, JobPhase, JobStatus, ObjectMeta,
    ObjectReference, OwnerReference, RecordKey, SCHEDULED_AT_ANNOTATION,
};
use std::time::Duration;
use tracing::Instrument;

/// When the caller should run the next pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReconcileResult {
    /// `None` means no timer: only an external event triggers the next pass
    pub requeue_after: Option<Duration>,
}

/// What to do about the latest due instant
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Due {
    /// No unprocessed instant at or before now
    Nothing,
    /// The window overflowed; fast-forward without running
    TooManyMissed,
    Skip {
        instant: DateTime<Utc>,
        reason: SkipReason,
    },
    Start {
        instant: DateTime<Utc>,
        /// Active jobs to delete first
        replace: Vec<ObjectReference>,
    },
}

/// Decisions for one pass, computed from the record and its jobs alone
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Plan {
    /// Unfinished jobs, ordered by name
    pub active: Vec<ObjectReference>,
    /// Stored value raised to the newest job's scheduled instant
    pub last_schedule_time: Option<DateTime<Utc>>,
    /// Finished jobs past their history limit
    pub prune: Vec<ObjectReference>,
    pub due: Due,
    /// First instant after now, if the schedule has one
    pub next_run: Option<DateTime<Utc>>,
    pub schedule_error: Option<ScheduleError>,
}

/// Decide a pass.
///
/// The schedule window starts at the record's watermark: the later of the
/// processed time and the (re-derived) last schedule time, or the record's
/// creation time if neither is set.
pub fn plan(record: &CronJob, jobs: &[Job], now: DateTime<Utc>) -> Plan {
    let mut active = Vec::new();
    let mut succeeded = Vec::new();
    let mut failed = Vec::new();
    for job in jobs {
        match job.status.phase {
            JobPhase::Running => active.push(job.reference()),
            JobPhase::Succeeded => succeeded.push(job),
            JobPhase::Failed => failed.push(job),
        }
    }
    active.sort_by(|a, b| a.name.cmp(&b.name));

    let newest_child = jobs.iter().filter_map(Job::scheduled_time).max();
    let last_schedule_time = record.status.last_schedule_time.max(newest_child);
    let prune = history::select(&succeeded, &failed, HistoryLimits::from_spec(&record.spec));

    let mut plan = Plan {
        active,
        last_schedule_time,
        prune,
        due: Due::Nothing,
        next_run: None,
        schedule_error: None,
    };

    let schedule = match CronSchedule::parse(&record.spec.schedule) {
        Ok(schedule) => schedule,
        Err(e) => {
            plan.schedule_error = Some(e);
            return plan;
        }
    };

    let watermark = record.status.last_processed_time.max(last_schedule_time);
    let earliest = watermark
        .or(record.metadata.creation_timestamp)
        .unwrap_or(now);
    let window = schedule.next_instants(earliest, now, record.spec.starting_deadline());
    plan.next_run = window.next_after_now;

    plan.due = if window.too_many_missed {
        Due::TooManyMissed
    } else if let Some(instant) = window.latest() {
        match concurrency::decide(
            record.spec.concurrency_policy,
            &plan.active,
            record.spec.is_suspended(),
        ) {
            Admission::CreateNew => Due::Start {
                instant,
                replace: Vec::new(),
            },
            Admission::ReplaceThenCreate(replace) => Due::Start { instant, replace },
            Admission::Skip(reason) => Due::Skip { instant, reason },
        }
    } else {
        Due::Nothing
    };
    plan
}

/// The job a record runs for `instant`
pub fn job_for_instant(record: &CronJob, instant: DateTime<Utc>) -> Job {
    let template = &record.spec.job_template;
    let mut metadata = ObjectMeta::new(
        &record.metadata.namespace,
        job_name(&record.metadata.name, instant),
    );
    metadata.labels = template.labels.clone();
    metadata.annotations = template.annotations.clone();
    metadata.annotations.insert(
        SCHEDULED_AT_ANNOTATION.to_string(),
        format_scheduled_at(instant),
    );
    metadata.owner_references.push(OwnerReference {
        kind: CRON_JOB_KIND.to_string(),
        name: record.metadata.name.clone(),
        uid: record.metadata.uid.clone(),
        controller: true,
    });
    Job {
        metadata,
        spec: template.spec.clone(),
        status: JobStatus::default(),
    }
}

/// Runs reconcile passes against the adapters
pub struct Reconciler<R, G, E, C: Clock> {
    executor: Executor<R, G, E, C>,
}

impl<R, G, E, C> Reconciler<R, G, E, C>
where
    R: RecordStore,
    G: JobGateway,
    E: EventRecorder,
    C: Clock,
{
    pub fn new(executor: Executor<R, G, E, C>) -> Self {
        Self { executor }
    }

    pub fn executor(&self) -> &Executor<R, G, E, C> {
        &self.executor
    }

    /// Bring one record's jobs and status in line with its spec.
    pub async fn reconcile(&self, key: &RecordKey) -> Result<ReconcileResult, ReconcileError> {
        self.reconcile_inner(key)
            .instrument(tracing::info_span!("reconcile", cronjob = %key))
            .await
    }

    async fn reconcile_inner(&self, key: &RecordKey) -> Result<ReconcileResult, ReconcileError> {
        let record = match self.executor.records().get(key).await {
            Ok(Some(record)) => record,
            Ok(None) => {
                tracing::debug!("record not found, nothing to do");
                return Ok(ReconcileResult::default());
            }
            Err(e) => return Err(ExecuteError::from(e).into()),
        };
        let jobs = self
            .executor
            .jobs()
            .list(&record.metadata)
            .await
            .map_err(ExecuteError::from)?;
        let now = self.executor.clock().utc_now();
        let plan = plan(&record, &jobs, now);

        let mut status = CronJobStatus {
            active: plan.active.clone(),
            last_schedule_time: plan.last_schedule_time,
            last_processed_time: record.status.last_processed_time,
            schedule_error: None,
        };

        for job in &plan.prune {
            if let Err(e) = self
                .executor
                .execute(Effect::DeleteJob { job: job.clone() })
                .await
            {
                tracing::warn!(job = %job.name, error = %e, "prune failed, retrying next pass");
            }
        }

        if let Some(err) = plan.schedule_error {
            tracing::warn!(schedule = %record.spec.schedule, error = %err, "invalid schedule");
            self.record(key, EventType::Warning, "InvalidSchedule", err.to_string())
                .await?;
            status.schedule_error = Some(err.to_string());
            self.write_status(&record, status).await?;
            return Err(err.into());
        }

        match plan.due {
            Due::Nothing => {}
            Due::TooManyMissed => {
                tracing::warn!(limit = MAX_MISSED_RUNS, "too many missed start times");
                self.record(
                    key,
                    EventType::Warning,
                    "TooManyMissedTimes",
                    format!(
                        "too many missed start times (> {MAX_MISSED_RUNS}); \
                         set or decrease startingDeadlineSeconds or check clock skew"
                    ),
                )
                .await?;
                status.last_schedule_time = status.last_schedule_time.max(Some(now));
                status.last_processed_time = status.last_processed_time.max(Some(now));
            }
            Due::Skip { instant, reason } => {
                tracing::info!(scheduled_at = %instant, reason = reason.as_str(), "skipping run");
                self.record(
                    key,
                    EventType::Normal,
                    "JobSkipped",
                    format!("skipped run for {} ({})", format_scheduled_at(instant), reason.as_str()),
                )
                .await?;
                status.last_processed_time = status.last_processed_time.max(Some(instant));
            }
            Due::Start { instant, replace } => {
                for job in &replace {
                    match self
                        .executor
                        .execute(Effect::DeleteJob { job: job.clone() })
                        .await
                    {
                        Ok(_) => {
                            tracing::info!(job = %job.name, "replaced active job");
                            status.active.retain(|a| a.uid != job.uid);
                            self.record(
                                key,
                                EventType::Normal,
                                "SuccessfulDelete",
                                format!("deleted job {}", job.name),
                            )
                            .await?;
                        }
                        Err(e) => {
                            tracing::warn!(job = %job.name, error = %e, "replace delete failed")
                        }
                    }
                }

                let job = job_for_instant(&record, instant);
                let name = job.metadata.name.clone();
                match self.executor.execute(Effect::CreateJob { job }).await {
                    Ok(Applied::Created(created)) => {
                        tracing::info!(job = %name, scheduled_at = %instant, "created job");
                        status.active.push(created.reference());
                        status.active.sort_by(|a, b| a.name.cmp(&b.name));
                        self.record(
                            key,
                            EventType::Normal,
                            "SuccessfulCreate",
                            format!("created job {name}"),
                        )
                        .await?;
                    }
                    Ok(_) => {
                        tracing::info!(job = %name, "job already exists, instant claimed");
                        self.report_existing(&record, &name, &mut status).await;
                    }
                    Err(e) => {
                        self.record(
                            key,
                            EventType::Warning,
                            "FailedCreate",
                            format!("error creating job {name}: {e}"),
                        )
                        .await?;
                        self.write_status(&record, status).await?;
                        return Err(e.into());
                    }
                }
                status.last_schedule_time = status.last_schedule_time.max(Some(instant));
                status.last_processed_time = status.last_processed_time.max(Some(instant));
            }
        }

        self.write_status(&record, status).await?;

        let requeue_after = plan
            .next_run
            .map(|next| (next - now).to_std().unwrap_or(Duration::ZERO));
        if let Some(after) = requeue_after {
            tracing::debug!(requeue_after = %cj_core::format_duration(after), "requeue");
        }
        Ok(ReconcileResult { requeue_after })
    }

    async fn record(
        &self,
        key: &RecordKey,
        event_type: EventType,
        reason: &str,
        message: String,
    ) -> Result<(), ExecuteError> {
        self.executor
            .execute(Effect::Record {
                key: key.clone(),
                event_type,
                reason: reason.to_string(),
                message,
            })
            .await
            .map(|_| ())
    }

    /// Add a job another writer created for this instant to `active`.
    ///
    /// A failed lookup is only logged; the next pass lists it anyway.
    async fn report_existing(&self, record: &CronJob, name: &str, status: &mut CronJobStatus) {
        let jobs = match self.executor.jobs().list(&record.metadata).await {
            Ok(jobs) => jobs,
            Err(e) => {
                tracing::warn!(job = %name, error = %e, "cannot look up existing job");
                return;
            }
        };
        let Some(job) = jobs
            .iter()
            .find(|j| j.metadata.name == name && !j.is_finished())
        else {
            return;
        };
        if status.active.iter().all(|a| a.uid != job.metadata.uid) {
            status.active.push(job.reference());
            status.active.sort_by(|a, b| a.name.cmp(&b.name));
        }
    }

    /// Write status only when it differs from what was read
    async fn write_status(
        &self,
        record: &CronJob,
        status: CronJobStatus,
    ) -> Result<(), ExecuteError> {
        if status == record.status {
            return Ok(());
        }
        self.executor
            .execute(Effect::UpdateStatus {
                key: record.metadata.key(),
                resource_version: record.metadata.resource_version,
                status,
            })
            .await
            .map(|_| ())
    }
}

#[cfg(test)]
#[path = "reconcile_tests.rs"]
mod tests;
