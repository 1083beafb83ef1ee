// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fake record store for testing
#![cfg_attr(coverage_nightly, coverage(off))]

use super::{RecordError, RecordStore};
use async_trait::async_trait;
use cj_core::{CronJob, CronJobStatus, RecordKey};
use parking_lot::Mutex;
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

/// Recorded record store call
#[derive(Debug, Clone, PartialEq)]
pub enum RecordCall {
    Get {
        key: RecordKey,
    },
    UpdateStatus {
        key: RecordKey,
        resource_version: u64,
        status: CronJobStatus,
    },
}

#[derive(Default)]
struct FakeRecordState {
    records: HashMap<RecordKey, CronJob>,
    calls: Vec<RecordCall>,
    get_errors: VecDeque<RecordError>,
    update_errors: VecDeque<RecordError>,
}

/// In-memory record store with compare-and-swap status writes
#[derive(Clone, Default)]
pub struct FakeRecordStore {
    inner: Arc<Mutex<FakeRecordState>>,
}

impl FakeRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a record as-is
    pub fn insert(&self, record: CronJob) {
        self.inner
            .lock()
            .records
            .insert(record.metadata.key(), record);
    }

    pub fn remove(&self, key: &RecordKey) {
        self.inner.lock().records.remove(key);
    }

    pub fn record(&self, key: &RecordKey) -> Option<CronJob> {
        self.inner.lock().records.get(key).cloned()
    }

    /// Get all recorded calls
    pub fn calls(&self) -> Vec<RecordCall> {
        self.inner.lock().calls.clone()
    }

    /// Status writes only
    pub fn status_writes(&self) -> Vec<CronJobStatus> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                RecordCall::UpdateStatus { status, .. } => Some(status),
                RecordCall::Get { .. } => None,
            })
            .collect()
    }

    /// Fail the next `get` with `err`
    pub fn fail_next_get(&self, err: RecordError) {
        self.inner.lock().get_errors.push_back(err);
    }

    /// Fail the next `update_status` with `err`
    pub fn fail_next_update(&self, err: RecordError) {
        self.inner.lock().update_errors.push_back(err);
    }
}

#[async_trait]
impl RecordStore for FakeRecordStore {
    async fn get(&self, key: &RecordKey) -> Result<Option<CronJob>, RecordError> {
        let mut inner = self.inner.lock();
        inner.calls.push(RecordCall::Get { key: key.clone() });
        if let Some(err) = inner.get_errors.pop_front() {
            return Err(err);
        }
        Ok(inner.records.get(key).cloned())
    }

    async fn update_status(
        &self,
        key: &RecordKey,
        resource_version: u64,
        status: CronJobStatus,
    ) -> Result<CronJob, RecordError> {
        let mut inner = self.inner.lock();
        inner.calls.push(RecordCall::UpdateStatus {
            key: key.clone(),
            resource_version,
            status: status.clone(),
        });
        if let Some(err) = inner.update_errors.pop_front() {
            return Err(err);
        }

        let record = inner
            .records
            .get_mut(key)
            .ok_or_else(|| RecordError::NotFound(key.to_string()))?;
        if record.metadata.resource_version != resource_version {
            return Err(RecordError::Conflict {
                key: key.to_string(),
                expected: resource_version,
                actual: record.metadata.resource_version,
            });
        }
        record.status = status;
        record.metadata.resource_version += 1;
        Ok(record.clone())
    }
}

#[cfg(test)]
#[path = "fake_tests.rs"]
mod tests;
