// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Traced adapter wrappers for consistent observability

use crate::job::{GatewayError, JobGateway};
use crate::record::{RecordError, RecordStore};
use async_trait::async_trait;
use cj_core::{CronJob, CronJobStatus, Job, ObjectMeta, ObjectReference, RecordKey};
use tracing::Instrument;

/// Wrapper that adds tracing to any RecordStore
#[derive(Clone)]
pub struct TracedRecordStore<R> {
    inner: R,
}

impl<R> TracedRecordStore<R> {
    pub fn new(inner: R) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl<R: RecordStore> RecordStore for TracedRecordStore<R> {
    async fn get(&self, key: &RecordKey) -> Result<Option<CronJob>, RecordError> {
        let result = self.inner.get(key).await;
        match &result {
            Ok(found) => tracing::trace!(cronjob = %key, found = found.is_some(), "fetched"),
            Err(e) => tracing::error!(cronjob = %key, error = %e, "get failed"),
        }
        result
    }

    async fn update_status(
        &self,
        key: &RecordKey,
        resource_version: u64,
        status: CronJobStatus,
    ) -> Result<CronJob, RecordError> {
        async {
            let active = status.active.len();
            let result = self.inner.update_status(key, resource_version, status).await;
            match &result {
                Ok(updated) => tracing::debug!(
                    active,
                    new_version = updated.metadata.resource_version,
                    "status written"
                ),
                Err(RecordError::Conflict { actual, .. }) => {
                    tracing::info!(actual, "status write lost a race")
                }
                Err(e) => tracing::error!(error = %e, "status write failed"),
            }
            result
        }
        .instrument(tracing::info_span!("record.update_status", cronjob = %key, resource_version))
        .await
    }
}

/// Wrapper that adds tracing to any JobGateway
#[derive(Clone)]
pub struct TracedJobGateway<G> {
    inner: G,
}

impl<G> TracedJobGateway<G> {
    pub fn new(inner: G) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl<G: JobGateway> JobGateway for TracedJobGateway<G> {
    async fn list(&self, owner: &ObjectMeta) -> Result<Vec<Job>, GatewayError> {
        let result = self.inner.list(owner).await;
        match &result {
            Ok(jobs) => tracing::trace!(cronjob = %owner.key(), count = jobs.len(), "listed"),
            Err(e) => tracing::error!(cronjob = %owner.key(), error = %e, "list failed"),
        }
        result
    }

    async fn create(&self, job: Job) -> Result<Job, GatewayError> {
        let span = tracing::info_span!("job.create", job = %job.metadata.key());
        async {
            let start = std::time::Instant::now();
            let result = self.inner.create(job).await;
            let elapsed_ms = start.elapsed().as_millis() as u64;
            match &result {
                Ok(created) => tracing::info!(uid = %created.metadata.uid, elapsed_ms, "job created"),
                Err(GatewayError::AlreadyExists(_)) => {
                    tracing::info!(elapsed_ms, "job already exists")
                }
                Err(e) => tracing::error!(elapsed_ms, error = %e, "create failed"),
            }
            result
        }
        .instrument(span)
        .await
    }

    async fn delete(&self, job: &ObjectReference) -> Result<(), GatewayError> {
        let result = self.inner.delete(job).await;
        tracing::info_span!("job.delete", job = %job.key()).in_scope(|| match &result {
            Ok(()) => tracing::info!("deleted"),
            Err(GatewayError::NotFound(_)) => tracing::debug!("already gone"),
            Err(e) => tracing::warn!(error = %e, "delete failed"),
        });
        result
    }
}

#[cfg(test)]
#[path = "traced_tests.rs"]
mod tests;
