// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Clock abstraction so scheduling decisions can be driven from tests.
//!
//! Two notions of time are exposed: a monotonic [`Instant`] for in-process
//! timers, and wall-clock UTC for cron arithmetic and persisted timestamps.

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Source of the current time
pub trait Clock: Clone + Send + Sync + 'static {
    /// Monotonic time, used for timer deadlines
    fn now(&self) -> Instant;

    /// Wall-clock time, used for cron schedules and status timestamps
    fn utc_now(&self) -> DateTime<Utc>;
}

/// Real system clock
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    fn utc_now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

struct FakeClockState {
    instant: Instant,
    utc: DateTime<Utc>,
}

/// Manually driven clock for tests.
///
/// Both time bases move together on [`FakeClock::advance`]; [`FakeClock::set_utc`]
/// jumps wall-clock time alone, which is how clock skew is simulated.
#[derive(Clone)]
pub struct FakeClock {
    inner: Arc<Mutex<FakeClockState>>,
}

impl FakeClock {
    /// Start at the Unix epoch plus one day, a stable and obviously synthetic time.
    pub fn new() -> Self {
        Self::at(DateTime::<Utc>::from_timestamp(86_400, 0).unwrap_or_default())
    }

    /// Start at the given wall-clock time
    pub fn at(utc: DateTime<Utc>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(FakeClockState {
                instant: Instant::now(),
                utc,
            })),
        }
    }

    /// Move both clocks forward
    pub fn advance(&self, duration: Duration) {
        let mut state = self.inner.lock();
        state.instant += duration;
        state.utc += chrono::Duration::from_std(duration).unwrap_or(chrono::Duration::zero());
    }

    /// Set wall-clock time without touching the monotonic clock
    pub fn set_utc(&self, utc: DateTime<Utc>) {
        self.inner.lock().utc = utc;
    }
}

impl Default for FakeClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for FakeClock {
    fn now(&self) -> Instant {
        self.inner.lock().instant
    }

    fn utc_now(&self) -> DateTime<Utc> {
        self.inner.lock().utc
    }
}

#[cfg(test)]
#[path = "clock_tests.rs"]
mod tests;
