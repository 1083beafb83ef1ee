// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Error types for reconcile passes

use crate::schedule::ScheduleError;
use crate::ExecuteError;
use thiserror::Error;

/// Why a reconcile pass did not complete
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReconcileError {
    /// The record's schedule does not parse; persists until the record is edited
    #[error("invalid schedule: {0}")]
    InvalidSchedule(#[from] ScheduleError),
    /// A store or gateway call failed
    #[error(transparent)]
    Execute(#[from] ExecuteError),
}

impl ReconcileError {
    /// True for failures expected to clear on their own
    pub fn is_transient(&self) -> bool {
        matches!(self, ReconcileError::Execute(_))
    }

    pub fn is_conflict(&self) -> bool {
        matches!(self, ReconcileError::Execute(e) if e.is_conflict())
    }
}
