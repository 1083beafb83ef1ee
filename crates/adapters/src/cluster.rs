// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared handle to the object store with watch notifications.
//!
//! Every mutation goes through [`Cluster`] so that observers see an
//! [`Event`] for it: record edits wake that record, job writes wake the
//! job's controlling record. Events are best effort; a full channel drops
//! the notification and the next timer or resync picks the change up.

use cj_core::{Clock, CronJob, Event, IdGen, Job, JobPhase, RecordKey, UuidIdGen};
use cj_storage::{ClusterState, StoreError};
use parking_lot::Mutex;
use std::sync::Arc;
use tokio::sync::mpsc;

#[derive(Clone)]
pub struct Cluster<C: Clock, I: IdGen = UuidIdGen> {
    state: Arc<Mutex<ClusterState>>,
    event_tx: mpsc::Sender<Event>,
    clock: C,
    ids: I,
}

impl<C: Clock, I: IdGen> Cluster<C, I> {
    pub fn new(state: ClusterState, event_tx: mpsc::Sender<Event>, clock: C, ids: I) -> Self {
        Self {
            state: Arc::new(Mutex::new(state)),
            event_tx,
            clock,
            ids,
        }
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// Point-in-time copy of the whole store, for checkpoints.
    pub fn snapshot(&self) -> ClusterState {
        self.state.lock().clone()
    }

    /// Run `f` with the store locked. Does not emit events.
    pub fn read<R>(&self, f: impl FnOnce(&ClusterState) -> R) -> R {
        f(&self.state.lock())
    }

    pub fn record_keys(&self) -> Vec<RecordKey> {
        self.state.lock().record_keys()
    }

    pub fn get_record(&self, key: &RecordKey) -> Option<CronJob> {
        self.state.lock().get_record(key).cloned()
    }

    /// Create or edit a record's desired state.
    pub fn apply_record(&self, record: CronJob) -> CronJob {
        let now = self.clock.utc_now();
        let stored = self.state.lock().apply_record(record, &self.ids, now);
        self.emit(Event::RecordChanged {
            key: stored.metadata.key(),
        });
        stored
    }

    pub fn delete_record(&self, key: &RecordKey) -> Result<CronJob, StoreError> {
        let removed = self.state.lock().delete_record(key)?;
        self.emit(Event::RecordDeleted { key: key.clone() });
        Ok(removed)
    }

    pub fn update_status(
        &self,
        key: &RecordKey,
        expected_version: u64,
        status: cj_core::CronJobStatus,
    ) -> Result<CronJob, StoreError> {
        self.state
            .lock()
            .update_status(key, expected_version, status)
    }

    pub fn list_jobs(&self, namespace: &str, owner_uid: &cj_core::Uid) -> Vec<Job> {
        self.state.lock().list_jobs(namespace, owner_uid)
    }

    pub fn create_job(&self, job: Job) -> Result<Job, StoreError> {
        let now = self.clock.utc_now();
        let created = self.state.lock().create_job(job, &self.ids, now)?;
        self.emit_job_changed(&created);
        Ok(created)
    }

    pub fn delete_job(&self, key: &RecordKey) -> Result<Job, StoreError> {
        let removed = self.state.lock().delete_job(key)?;
        self.emit_job_changed(&removed);
        Ok(removed)
    }

    /// Report a job phase transition on behalf of the job primitive.
    pub fn set_job_phase(&self, key: &RecordKey, phase: JobPhase) -> Result<Job, StoreError> {
        let now = self.clock.utc_now();
        let job = self.state.lock().set_job_phase(key, phase, now)?;
        self.emit_job_changed(&job);
        Ok(job)
    }

    fn emit_job_changed(&self, job: &Job) {
        if let Some(owner) = job.metadata.controller() {
            self.emit(Event::JobChanged {
                owner: RecordKey::new(&job.metadata.namespace, &owner.name),
                job: job.metadata.name.clone(),
            });
        }
    }

    fn emit(&self, event: Event) {
        if let Err(e) = self.event_tx.try_send(event) {
            tracing::warn!(error = %e, "dropping watch event");
        }
    }
}

#[cfg(test)]
#[path = "cluster_tests.rs"]
mod tests;
