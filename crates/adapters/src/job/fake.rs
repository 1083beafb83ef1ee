// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fake job gateway for testing
#![cfg_attr(coverage_nightly, coverage(off))]

use super::{GatewayError, JobGateway};
use async_trait::async_trait;
use cj_core::{Job, JobPhase, ObjectMeta, ObjectReference, RecordKey};
use parking_lot::Mutex;
use std::collections::{BTreeMap, HashSet, VecDeque};
use std::sync::Arc;

/// Recorded gateway call
#[derive(Debug, Clone, PartialEq)]
pub enum JobCall {
    List { owner: RecordKey },
    Create { job: Job },
    Delete { job: RecordKey },
}

#[derive(Default)]
struct FakeJobState {
    jobs: BTreeMap<RecordKey, Job>,
    calls: Vec<JobCall>,
    list_errors: VecDeque<GatewayError>,
    create_errors: VecDeque<GatewayError>,
    racing_creates: VecDeque<Job>,
    failing_deletes: HashSet<RecordKey>,
}

/// In-memory job gateway.
///
/// Created jobs are stored as given and listed back by controller uid, so
/// a reconcile pass sees its own writes on the next pass.
#[derive(Clone, Default)]
pub struct FakeJobGateway {
    inner: Arc<Mutex<FakeJobState>>,
}

impl FakeJobGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a job as if the primitive had it already
    pub fn insert(&self, job: Job) {
        self.inner.lock().jobs.insert(job.metadata.key(), job);
    }

    /// All stored jobs, ordered by key
    pub fn jobs(&self) -> Vec<Job> {
        self.inner.lock().jobs.values().cloned().collect()
    }

    pub fn job_names(&self) -> Vec<String> {
        self.inner
            .lock()
            .jobs
            .values()
            .map(|j| j.metadata.name.clone())
            .collect()
    }

    /// Move a stored job to a new phase
    pub fn set_phase(&self, key: &RecordKey, phase: JobPhase) {
        if let Some(job) = self.inner.lock().jobs.get_mut(key) {
            job.status.phase = phase;
        }
    }

    /// Get all recorded calls
    pub fn calls(&self) -> Vec<JobCall> {
        self.inner.lock().calls.clone()
    }

    /// Names of every job passed to `create`, including rejected ones
    pub fn created(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                JobCall::Create { job } => Some(job.metadata.name),
                _ => None,
            })
            .collect()
    }

    /// Names of every job passed to `delete`
    pub fn deleted(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                JobCall::Delete { job } => Some(job.name),
                _ => None,
            })
            .collect()
    }

    pub fn fail_next_list(&self, err: GatewayError) {
        self.inner.lock().list_errors.push_back(err);
    }

    pub fn fail_next_create(&self, err: GatewayError) {
        self.inner.lock().create_errors.push_back(err);
    }

    /// Store `job` just before the next create lands, as a concurrent
    /// writer would
    pub fn race_next_create(&self, job: Job) {
        self.inner.lock().racing_creates.push_back(job);
    }

    /// Make every delete of `key` fail until cleared
    pub fn fail_deletes_of(&self, key: RecordKey) {
        self.inner.lock().failing_deletes.insert(key);
    }

    pub fn clear_delete_failures(&self) {
        self.inner.lock().failing_deletes.clear();
    }
}

#[async_trait]
impl JobGateway for FakeJobGateway {
    async fn list(&self, owner: &ObjectMeta) -> Result<Vec<Job>, GatewayError> {
        let mut inner = self.inner.lock();
        inner.calls.push(JobCall::List { owner: owner.key() });
        if let Some(err) = inner.list_errors.pop_front() {
            return Err(err);
        }
        Ok(inner
            .jobs
            .values()
            .filter(|j| {
                j.metadata.namespace == owner.namespace && j.metadata.is_controlled_by(&owner.uid)
            })
            .cloned()
            .collect())
    }

    async fn create(&self, job: Job) -> Result<Job, GatewayError> {
        let mut inner = self.inner.lock();
        inner.calls.push(JobCall::Create { job: job.clone() });
        if let Some(err) = inner.create_errors.pop_front() {
            return Err(err);
        }
        if let Some(racer) = inner.racing_creates.pop_front() {
            inner.jobs.insert(racer.metadata.key(), racer);
        }
        let key = job.metadata.key();
        if inner.jobs.contains_key(&key) {
            return Err(GatewayError::AlreadyExists(key.to_string()));
        }
        inner.jobs.insert(key, job.clone());
        Ok(job)
    }

    async fn delete(&self, job: &ObjectReference) -> Result<(), GatewayError> {
        let mut inner = self.inner.lock();
        let key = job.key();
        inner.calls.push(JobCall::Delete { job: key.clone() });
        if inner.failing_deletes.contains(&key) {
            return Err(GatewayError::Unavailable(format!("delete {key} refused")));
        }
        inner
            .jobs
            .remove(&key)
            .map(|_| ())
            .ok_or_else(|| GatewayError::NotFound(key.to_string()))
    }
}

#[cfg(test)]
#[path = "fake_tests.rs"]
mod tests;
