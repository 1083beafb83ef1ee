// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Child job gateways

mod state;

pub use state::StateJobGateway;

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
mod fake;
#[cfg(any(test, feature = "test-support"))]
pub use fake::{FakeJobGateway, JobCall};

use async_trait::async_trait;
use cj_core::{Job, ObjectMeta, ObjectReference};
use thiserror::Error;

/// Errors from job gateway operations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GatewayError {
    #[error("job {0} already exists")]
    AlreadyExists(String),
    #[error("job {0} not found")]
    NotFound(String),
    #[error("gateway unavailable: {0}")]
    Unavailable(String),
}

/// Create, list and delete the jobs a record owns
#[async_trait]
pub trait JobGateway: Clone + Send + Sync + 'static {
    /// Jobs in the owner's namespace whose controller is the owner
    async fn list(&self, owner: &ObjectMeta) -> Result<Vec<Job>, GatewayError>;

    /// Create a job under its deterministic name
    async fn create(&self, job: Job) -> Result<Job, GatewayError>;

    async fn delete(&self, job: &ObjectReference) -> Result<(), GatewayError>;
}

impl From<cj_storage::StoreError> for GatewayError {
    fn from(e: cj_storage::StoreError) -> Self {
        use cj_storage::StoreError;
        let message = e.to_string();
        match e {
            StoreError::AlreadyExists { key, .. } => GatewayError::AlreadyExists(key),
            StoreError::NotFound { key, .. } => GatewayError::NotFound(key),
            StoreError::Conflict { .. } => GatewayError::Unavailable(message),
        }
    }
}
