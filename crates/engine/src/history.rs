// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Retention of finished jobs.

use cj_core::{CronJobSpec, Job, ObjectReference};
use std::cmp::Reverse;

/// How many finished jobs of each outcome to keep
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HistoryLimits {
    pub succeeded: usize,
    pub failed: usize,
}

impl HistoryLimits {
    pub fn from_spec(spec: &CronJobSpec) -> Self {
        Self {
            succeeded: spec.successful_history_limit(),
            failed: spec.failed_history_limit(),
        }
    }
}

/// Pick the finished jobs to delete.
///
/// Each group keeps its `limit` newest jobs by creation time; everything
/// older is selected. Jobs without a creation time count as oldest. Ties
/// break on name so repeated passes pick the same victims.
pub fn select(succeeded: &[&Job], failed: &[&Job], limits: HistoryLimits) -> Vec<ObjectReference> {
    let mut doomed = excess(succeeded, limits.succeeded);
    doomed.extend(excess(failed, limits.failed));
    doomed
}

fn excess(group: &[&Job], limit: usize) -> Vec<ObjectReference> {
    let mut sorted: Vec<&Job> = group.to_vec();
    sorted.sort_by_key(|j| {
        Reverse((j.metadata.creation_timestamp, j.metadata.name.clone()))
    });
    sorted.into_iter().skip(limit).map(Job::reference).collect()
}

#[cfg(test)]
#[path = "history_tests.rs"]
mod tests;
