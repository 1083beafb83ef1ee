// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! cj-core: data model for the cron job controller

pub mod clock;
pub mod effect;
pub mod event;
pub mod id;
pub mod job;
pub mod meta;
pub mod namespace;
pub mod record;
pub mod time_fmt;
pub mod timer;
pub mod traced;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use clock::{Clock, FakeClock, SystemClock};
pub use effect::{Effect, EventType};
pub use event::Event;
pub use id::{IdGen, SequentialIdGen, UuidIdGen};
pub use job::{Job, JobPhase, JobStatus, SCHEDULED_AT_ANNOTATION};
pub use meta::{ObjectMeta, ObjectReference, OwnerReference, Uid};
pub use namespace::{scoped_name, split_scoped_name, RecordKey};
pub use record::{
    ConcurrencyPolicy, CronJob, CronJobSpec, CronJobStatus, JobTemplate,
    DEFAULT_FAILED_JOBS_HISTORY_LIMIT, DEFAULT_SUCCESSFUL_JOBS_HISTORY_LIMIT,
};
pub use time_fmt::{format_duration, format_elapsed};
pub use timer::TimerId;
pub use traced::TracedEffect;
