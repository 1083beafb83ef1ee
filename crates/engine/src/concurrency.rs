// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Concurrency policy decisions.

use cj_core::{ConcurrencyPolicy, ObjectReference};

/// What to do about a due instant given the jobs still running
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Admission {
    CreateNew,
    /// Account for the instant without starting a job
    Skip(SkipReason),
    /// Delete these jobs (best effort), then create
    ReplaceThenCreate(Vec<ObjectReference>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    Suspended,
    ActiveJobsForbidden,
}

impl SkipReason {
    pub fn as_str(self) -> &'static str {
        match self {
            SkipReason::Suspended => "suspended",
            SkipReason::ActiveJobsForbidden => "forbid: previous run still active",
        }
    }
}

/// Decide admission for one due instant.
///
/// Suspension wins over every policy.
pub fn decide(policy: ConcurrencyPolicy, active: &[ObjectReference], suspend: bool) -> Admission {
    if suspend {
        return Admission::Skip(SkipReason::Suspended);
    }
    match policy {
        ConcurrencyPolicy::Allow => Admission::CreateNew,
        ConcurrencyPolicy::Forbid if active.is_empty() => Admission::CreateNew,
        ConcurrencyPolicy::Forbid => Admission::Skip(SkipReason::ActiveJobsForbidden),
        ConcurrencyPolicy::Replace if active.is_empty() => Admission::CreateNew,
        ConcurrencyPolicy::Replace => Admission::ReplaceThenCreate(active.to_vec()),
    }
}

#[cfg(test)]
#[path = "concurrency_tests.rs"]
mod tests;
