// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! In-process object store for records and jobs.
//!
//! Every write bumps a store-wide revision and stamps it on the written
//! object as its resource version. Status writes are compare-and-swap on
//! that version; spec writes never touch status, and status writes never
//! touch spec.

use chrono::{DateTime, Utc};
use cj_core::{CronJob, CronJobStatus, IdGen, Job, JobPhase, RecordKey, Uid};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

/// Errors from store operations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("{kind} {key} not found")]
    NotFound { kind: &'static str, key: String },
    #[error("{kind} {key} already exists")]
    AlreadyExists { kind: &'static str, key: String },
    #[error("conflict writing {key}: expected version {expected}, found {actual}")]
    Conflict {
        key: String,
        expected: u64,
        actual: u64,
    },
}

impl StoreError {
    fn record_not_found(key: &RecordKey) -> Self {
        StoreError::NotFound {
            kind: "cronjob",
            key: key.to_string(),
        }
    }

    fn job_not_found(key: &RecordKey) -> Self {
        StoreError::NotFound {
            kind: "job",
            key: key.to_string(),
        }
    }
}

/// All persisted objects
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClusterState {
    /// Records keyed by `namespace/name`
    #[serde(default)]
    pub records: BTreeMap<String, CronJob>,
    /// Jobs keyed by `namespace/name`
    #[serde(default)]
    pub jobs: BTreeMap<String, Job>,
    /// Last revision handed out
    #[serde(default)]
    pub revision: u64,
}

impl ClusterState {
    fn next_revision(&mut self) -> u64 {
        self.revision += 1;
        self.revision
    }

    pub fn get_record(&self, key: &RecordKey) -> Option<&CronJob> {
        self.records.get(&key.to_string())
    }

    /// Create a record or replace the spec of an existing one.
    ///
    /// Metadata identity (uid, creation timestamp) and the whole status of
    /// an existing record are preserved.
    pub fn apply_record(
        &mut self,
        mut record: CronJob,
        ids: &impl IdGen,
        now: DateTime<Utc>,
    ) -> CronJob {
        let key = record.metadata.key().to_string();
        let revision = self.next_revision();
        let stored = match self.records.remove(&key) {
            Some(mut existing) => {
                existing.spec = record.spec;
                existing.metadata.labels = record.metadata.labels;
                existing.metadata.annotations = record.metadata.annotations;
                existing.metadata.resource_version = revision;
                existing
            }
            None => {
                if record.metadata.uid.is_empty() {
                    record.metadata.uid = Uid::new(ids.next());
                }
                if record.metadata.creation_timestamp.is_none() {
                    record.metadata.creation_timestamp = Some(now);
                }
                record.metadata.resource_version = revision;
                record
            }
        };
        self.records.insert(key, stored.clone());
        stored
    }

    /// Remove a record. Its jobs are left in place for separate cleanup.
    pub fn delete_record(&mut self, key: &RecordKey) -> Result<CronJob, StoreError> {
        let removed = self
            .records
            .remove(&key.to_string())
            .ok_or_else(|| StoreError::record_not_found(key))?;
        self.next_revision();
        Ok(removed)
    }

    /// Replace the status sub-object if the stored version matches.
    pub fn update_status(
        &mut self,
        key: &RecordKey,
        expected_version: u64,
        status: CronJobStatus,
    ) -> Result<CronJob, StoreError> {
        let actual = self
            .get_record(key)
            .map(|r| r.metadata.resource_version)
            .ok_or_else(|| StoreError::record_not_found(key))?;
        if actual != expected_version {
            return Err(StoreError::Conflict {
                key: key.to_string(),
                expected: expected_version,
                actual,
            });
        }
        let revision = self.next_revision();
        let record = self
            .records
            .get_mut(&key.to_string())
            .ok_or_else(|| StoreError::record_not_found(key))?;
        record.status = status;
        record.metadata.resource_version = revision;
        Ok(record.clone())
    }

    /// Jobs in `namespace` whose controlling owner has `owner_uid`.
    pub fn list_jobs(&self, namespace: &str, owner_uid: &Uid) -> Vec<Job> {
        self.jobs
            .values()
            .filter(|j| j.metadata.namespace == namespace && j.metadata.is_controlled_by(owner_uid))
            .cloned()
            .collect()
    }

    pub fn get_job(&self, key: &RecordKey) -> Option<&Job> {
        self.jobs.get(&key.to_string())
    }

    /// Create a job; fails if the name is taken in that namespace.
    pub fn create_job(
        &mut self,
        mut job: Job,
        ids: &impl IdGen,
        now: DateTime<Utc>,
    ) -> Result<Job, StoreError> {
        let key = job.metadata.key();
        if self.jobs.contains_key(&key.to_string()) {
            return Err(StoreError::AlreadyExists {
                kind: "job",
                key: key.to_string(),
            });
        }
        job.metadata.uid = Uid::new(ids.next());
        job.metadata.creation_timestamp = Some(now);
        job.metadata.resource_version = self.next_revision();
        self.jobs.insert(key.to_string(), job.clone());
        Ok(job)
    }

    pub fn delete_job(&mut self, key: &RecordKey) -> Result<Job, StoreError> {
        let removed = self
            .jobs
            .remove(&key.to_string())
            .ok_or_else(|| StoreError::job_not_found(key))?;
        self.next_revision();
        Ok(removed)
    }

    /// Report a phase change, as the job primitive would.
    pub fn set_job_phase(
        &mut self,
        key: &RecordKey,
        phase: JobPhase,
        now: DateTime<Utc>,
    ) -> Result<Job, StoreError> {
        let revision = self.next_revision();
        let job = self
            .jobs
            .get_mut(&key.to_string())
            .ok_or_else(|| StoreError::job_not_found(key))?;
        job.status.phase = phase;
        if job.status.start_time.is_none() {
            job.status.start_time = Some(now);
        }
        if phase.is_finished() {
            job.status.completion_time = Some(now);
        }
        job.metadata.resource_version = revision;
        Ok(job.clone())
    }

    /// Keys of every stored record, for cold-start resync.
    pub fn record_keys(&self) -> Vec<RecordKey> {
        self.records.values().map(|r| r.metadata.key()).collect()
    }
}

#[cfg(test)]
#[path = "state_tests.rs"]
mod tests;
