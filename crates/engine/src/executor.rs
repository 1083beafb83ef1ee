// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Effect executor

use crate::{ControllerDeps, Scheduler};
use cj_adapters::{EventRecorder, GatewayError, JobGateway, RecordError, RecordStore};
use cj_core::{Clock, CronJob, Effect, Job, TracedEffect};
use parking_lot::Mutex;
use std::sync::Arc;
use thiserror::Error;
use tracing::Instrument;

/// Errors that can occur during effect execution
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExecuteError {
    #[error("record store error: {0}")]
    Record(#[from] RecordError),
    #[error("job gateway error: {0}")]
    Gateway(#[from] GatewayError),
}

impl ExecuteError {
    /// A status write lost a compare-and-swap race
    pub fn is_conflict(&self) -> bool {
        matches!(self, ExecuteError::Record(RecordError::Conflict { .. }))
    }
}

/// What an effect turned out to do
#[derive(Debug, Clone, PartialEq)]
pub enum Applied {
    Done,
    Created(Job),
    /// A job with the same name was already there; the instant is claimed
    AlreadyExisted,
    Deleted,
    /// The job was gone before the delete arrived
    AlreadyGone,
    StatusWritten(Box<CronJob>),
}

/// Executes effects using the configured adapters
pub struct Executor<R, G, E, C: Clock> {
    records: R,
    jobs: G,
    recorder: E,
    scheduler: Arc<Mutex<Scheduler>>,
    clock: C,
}

impl<R, G, E, C> Executor<R, G, E, C>
where
    R: RecordStore,
    G: JobGateway,
    E: EventRecorder,
    C: Clock,
{
    pub fn new(deps: ControllerDeps<R, G, E>, scheduler: Arc<Mutex<Scheduler>>, clock: C) -> Self {
        Self {
            records: deps.records,
            jobs: deps.jobs,
            recorder: deps.recorder,
            scheduler,
            clock,
        }
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn scheduler(&self) -> Arc<Mutex<Scheduler>> {
        Arc::clone(&self.scheduler)
    }

    pub fn records(&self) -> &R {
        &self.records
    }

    pub fn jobs(&self) -> &G {
        &self.jobs
    }

    /// Execute a single effect with tracing
    pub async fn execute(&self, effect: Effect) -> Result<Applied, ExecuteError> {
        let span = tracing::info_span!("effect", effect = effect.name());
        async {
            tracing::debug!(fields = ?effect.fields(), "executing");

            let start = std::time::Instant::now();
            let result = self.execute_inner(effect).await;
            let elapsed_ms = start.elapsed().as_millis() as u64;

            match &result {
                Ok(applied) => tracing::debug!(elapsed_ms, ?applied, "completed"),
                Err(e) if e.is_conflict() => tracing::info!(elapsed_ms, error = %e, "conflict"),
                Err(e) => tracing::error!(elapsed_ms, error = %e, "failed"),
            }

            result
        }
        .instrument(span)
        .await
    }

    async fn execute_inner(&self, effect: Effect) -> Result<Applied, ExecuteError> {
        match effect {
            // === Job effects ===
            Effect::CreateJob { job } => match self.jobs.create(job).await {
                Ok(created) => Ok(Applied::Created(created)),
                Err(GatewayError::AlreadyExists(_)) => Ok(Applied::AlreadyExisted),
                Err(e) => Err(e.into()),
            },

            Effect::DeleteJob { job } => match self.jobs.delete(&job).await {
                Ok(()) => Ok(Applied::Deleted),
                Err(GatewayError::NotFound(_)) => Ok(Applied::AlreadyGone),
                Err(e) => Err(e.into()),
            },

            // === Record effects ===
            Effect::UpdateStatus {
                key,
                resource_version,
                status,
            } => {
                let updated = self
                    .records
                    .update_status(&key, resource_version, status)
                    .await?;
                Ok(Applied::StatusWritten(Box::new(updated)))
            }

            Effect::Record {
                key,
                event_type,
                reason,
                message,
            } => {
                self.recorder
                    .record(&key, event_type, &reason, &message)
                    .await;
                Ok(Applied::Done)
            }

            // === Timer effects ===
            Effect::SetTimer { id, duration } => {
                let now = self.clock.now();
                self.scheduler.lock().set_timer(id, duration, now);
                Ok(Applied::Done)
            }

            Effect::CancelTimer { id } => {
                self.scheduler.lock().cancel_timer(&id);
                Ok(Applied::Done)
            }
        }
    }
}

#[cfg(test)]
#[path = "executor_tests.rs"]
mod tests;
