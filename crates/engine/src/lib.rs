// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! cj-engine: schedule arithmetic, reconcile passes, and the controller loop

pub mod concurrency;
mod controller;
mod error;
mod executor;
pub mod history;
mod queue;
pub mod reconcile;
pub mod schedule;
mod scheduler;

pub use concurrency::{decide, Admission, SkipReason};
pub use controller::{Controller, ControllerConfig, ControllerDeps};
pub use error::ReconcileError;
pub use executor::{Applied, ExecuteError, Executor};
pub use history::HistoryLimits;
pub use queue::{WorkQueue, DEFAULT_BACKOFF_BASE, DEFAULT_BACKOFF_MAX};
pub use reconcile::{job_for_instant, plan, Due, Plan, ReconcileResult, Reconciler};
pub use schedule::{CronSchedule, ScheduleError, ScheduleWindow, MAX_MISSED_RUNS};
pub use scheduler::Scheduler;
