// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Record store adapters

mod state;

pub use state::StateRecordStore;

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
mod fake;
#[cfg(any(test, feature = "test-support"))]
pub use fake::{FakeRecordStore, RecordCall};

use async_trait::async_trait;
use cj_core::{CronJob, CronJobStatus, RecordKey};
use thiserror::Error;

/// Errors from record store operations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RecordError {
    #[error("cronjob {0} not found")]
    NotFound(String),
    #[error("cronjob {key} was modified (expected version {expected}, found {actual})")]
    Conflict {
        key: String,
        expected: u64,
        actual: u64,
    },
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Read access to records and compare-and-swap writes of their status
#[async_trait]
pub trait RecordStore: Clone + Send + Sync + 'static {
    /// Fetch a record; `None` when it does not exist
    async fn get(&self, key: &RecordKey) -> Result<Option<CronJob>, RecordError>;

    /// Replace the status sub-object if the record is still at `resource_version`
    async fn update_status(
        &self,
        key: &RecordKey,
        resource_version: u64,
        status: CronJobStatus,
    ) -> Result<CronJob, RecordError>;
}

impl From<cj_storage::StoreError> for RecordError {
    fn from(e: cj_storage::StoreError) -> Self {
        use cj_storage::StoreError;
        let message = e.to_string();
        match e {
            StoreError::NotFound { key, .. } => RecordError::NotFound(key),
            StoreError::Conflict {
                key,
                expected,
                actual,
            } => RecordError::Conflict {
                key,
                expected,
                actual,
            },
            StoreError::AlreadyExists { .. } => RecordError::Unavailable(message),
        }
    }
}
