// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Requeue timer table.
//!
//! Timers are keyed by [`TimerId`]; setting a timer that already exists
//! replaces its deadline, so each record has at most one pending requeue.

use cj_core::{Event, TimerId};
use std::collections::HashMap;
use std::time::{Duration, Instant};

/// Pending timers, fired by polling with the current instant
#[derive(Debug, Default)]
pub struct Scheduler {
    timers: HashMap<TimerId, Instant>,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Arm `id` to fire `duration` after `now`
    pub fn set_timer(&mut self, id: TimerId, duration: Duration, now: Instant) {
        self.timers.insert(id, now + duration);
    }

    pub fn cancel_timer(&mut self, id: &TimerId) {
        self.timers.remove(id);
    }

    /// Remove expired timers and return their events, earliest first
    pub fn fired_timers(&mut self, now: Instant) -> Vec<Event> {
        let mut fired: Vec<(Instant, TimerId)> = Vec::new();
        self.timers.retain(|id, fires_at| {
            if *fires_at <= now {
                fired.push((*fires_at, id.clone()));
                false
            } else {
                true
            }
        });
        fired.sort_by(|a, b| a.0.cmp(&b.0).then_with(|| a.1.as_str().cmp(b.1.as_str())));
        fired
            .into_iter()
            .map(|(_, id)| Event::TimerStart { id })
            .collect()
    }

    /// When `id` will fire, if armed
    pub fn deadline(&self, id: &TimerId) -> Option<Instant> {
        self.timers.get(id).copied()
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.timers.values().min().copied()
    }

    pub fn has_timers(&self) -> bool {
        !self.timers.is_empty()
    }

    pub fn len(&self) -> usize {
        self.timers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timers.is_empty()
    }
}

#[cfg(test)]
#[path = "scheduler_tests.rs"]
mod tests;
