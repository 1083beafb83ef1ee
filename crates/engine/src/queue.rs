// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Deduplicating work queue of record keys.
//!
//! A key is held at most once, and never by two workers at the same time.
//! A key added while a worker holds it is parked as dirty and re-queued
//! when the worker calls [`WorkQueue::done`], so no trigger is lost.

use cj_core::RecordKey;
use parking_lot::Mutex;
use std::collections::{HashMap, HashSet, VecDeque};
use std::time::Duration;
use tokio::sync::Notify;

/// Default first retry delay
pub const DEFAULT_BACKOFF_BASE: Duration = Duration::from_millis(500);

/// Default retry delay ceiling
pub const DEFAULT_BACKOFF_MAX: Duration = Duration::from_secs(300);

#[derive(Default)]
struct QueueState {
    queue: VecDeque<RecordKey>,
    /// Keys in `queue`
    queued: HashSet<RecordKey>,
    /// Keys handed to a worker and not yet done
    processing: HashSet<RecordKey>,
    /// Keys added while processing
    dirty: HashSet<RecordKey>,
    failures: HashMap<RecordKey, u32>,
    shutdown: bool,
}

pub struct WorkQueue {
    state: Mutex<QueueState>,
    notify: Notify,
    backoff_base: Duration,
    backoff_max: Duration,
}

impl Default for WorkQueue {
    fn default() -> Self {
        Self::new(DEFAULT_BACKOFF_BASE, DEFAULT_BACKOFF_MAX)
    }
}

impl WorkQueue {
    pub fn new(backoff_base: Duration, backoff_max: Duration) -> Self {
        Self {
            state: Mutex::new(QueueState::default()),
            notify: Notify::new(),
            backoff_base,
            backoff_max,
        }
    }

    /// Queue a key unless it is already waiting.
    pub fn add(&self, key: RecordKey) {
        let mut state = self.state.lock();
        if state.shutdown {
            return;
        }
        if state.processing.contains(&key) {
            state.dirty.insert(key);
            return;
        }
        if state.queued.insert(key.clone()) {
            state.queue.push_back(key);
            drop(state);
            self.notify.notify_one();
        }
    }

    /// Wait for the next key. Returns `None` once the queue is shut down.
    pub async fn get(&self) -> Option<RecordKey> {
        loop {
            let notified = self.notify.notified();
            tokio::pin!(notified);
            // Register before checking so a concurrent add is not missed
            notified.as_mut().enable();

            {
                let mut state = self.state.lock();
                if state.shutdown {
                    return None;
                }
                if let Some(key) = Self::take(&mut state) {
                    return Some(key);
                }
            }
            notified.await;
        }
    }

    /// Take the next key without waiting
    pub fn try_get(&self) -> Option<RecordKey> {
        let mut state = self.state.lock();
        if state.shutdown {
            return None;
        }
        Self::take(&mut state)
    }

    fn take(state: &mut QueueState) -> Option<RecordKey> {
        let key = state.queue.pop_front()?;
        state.queued.remove(&key);
        state.processing.insert(key.clone());
        Some(key)
    }

    /// Release a key taken with [`get`](Self::get). A dirty key goes back on the queue.
    pub fn done(&self, key: &RecordKey) {
        let mut state = self.state.lock();
        state.processing.remove(key);
        if state.dirty.remove(key) && !state.shutdown && state.queued.insert(key.clone()) {
            state.queue.push_back(key.clone());
            drop(state);
            self.notify.notify_one();
        }
    }

    /// Count a failure for `key` and return how long to wait before retrying.
    ///
    /// Doubles from the base delay up to the ceiling.
    pub fn retry_delay(&self, key: &RecordKey) -> Duration {
        let mut state = self.state.lock();
        let failures = state.failures.entry(key.clone()).or_insert(0);
        let exponent = *failures;
        *failures = failures.saturating_add(1);
        let factor = 2u32.checked_pow(exponent).unwrap_or(u32::MAX);
        self.backoff_base
            .checked_mul(factor)
            .map_or(self.backoff_max, |d| d.min(self.backoff_max))
    }

    /// Reset the failure count after a successful pass
    pub fn forget(&self, key: &RecordKey) {
        self.state.lock().failures.remove(key);
    }

    pub fn failures(&self, key: &RecordKey) -> u32 {
        self.state.lock().failures.get(key).copied().unwrap_or(0)
    }

    /// Stop handing out keys and wake every waiting worker
    pub fn shutdown(&self) {
        self.state.lock().shutdown = true;
        self.notify.notify_waiters();
    }

    pub fn is_shutdown(&self) -> bool {
        self.state.lock().shutdown
    }

    /// Keys waiting to be taken
    pub fn len(&self) -> usize {
        self.state.lock().queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Keys currently held by workers
    pub fn in_flight(&self) -> usize {
        self.state.lock().processing.len()
    }
}

#[cfg(test)]
#[path = "queue_tests.rs"]
mod tests;
