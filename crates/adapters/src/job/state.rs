// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Job gateway backed by the in-process cluster state.

use super::{GatewayError, JobGateway};
use crate::cluster::Cluster;
use async_trait::async_trait;
use cj_core::{Clock, IdGen, Job, ObjectMeta, ObjectReference};

#[derive(Clone)]
pub struct StateJobGateway<C: Clock, I: IdGen> {
    cluster: Cluster<C, I>,
}

impl<C: Clock, I: IdGen> StateJobGateway<C, I> {
    pub fn new(cluster: Cluster<C, I>) -> Self {
        Self { cluster }
    }
}

#[async_trait]
impl<C: Clock, I: IdGen> JobGateway for StateJobGateway<C, I> {
    async fn list(&self, owner: &ObjectMeta) -> Result<Vec<Job>, GatewayError> {
        Ok(self.cluster.list_jobs(&owner.namespace, &owner.uid))
    }

    async fn create(&self, job: Job) -> Result<Job, GatewayError> {
        Ok(self.cluster.create_job(job)?)
    }

    async fn delete(&self, job: &ObjectReference) -> Result<(), GatewayError> {
        self.cluster.delete_job(&job.key())?;
        Ok(())
    }
}

#[cfg(test)]
#[path = "state_tests.rs"]
mod tests;
