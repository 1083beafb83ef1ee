// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Record store backed by the in-process cluster state.

use super::{RecordError, RecordStore};
use crate::cluster::Cluster;
use async_trait::async_trait;
use cj_core::{Clock, CronJob, CronJobStatus, IdGen, RecordKey};

#[derive(Clone)]
pub struct StateRecordStore<C: Clock, I: IdGen> {
    cluster: Cluster<C, I>,
}

impl<C: Clock, I: IdGen> StateRecordStore<C, I> {
    pub fn new(cluster: Cluster<C, I>) -> Self {
        Self { cluster }
    }
}

#[async_trait]
impl<C: Clock, I: IdGen> RecordStore for StateRecordStore<C, I> {
    async fn get(&self, key: &RecordKey) -> Result<Option<CronJob>, RecordError> {
        Ok(self.cluster.get_record(key))
    }

    async fn update_status(
        &self,
        key: &RecordKey,
        resource_version: u64,
        status: CronJobStatus,
    ) -> Result<CronJob, RecordError> {
        Ok(self.cluster.update_status(key, resource_version, status)?)
    }
}

#[cfg(test)]
#[path = "state_tests.rs"]
mod tests;
