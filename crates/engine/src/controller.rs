// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Controller: routes watch events and timers into the work queue and runs
//! reconcile passes on a pool of workers.

use crate::queue::{WorkQueue, DEFAULT_BACKOFF_BASE, DEFAULT_BACKOFF_MAX};
use crate::{Executor, ReconcileResult, Reconciler, Scheduler};
use cj_adapters::{EventRecorder, JobGateway, RecordStore};
use cj_core::{format_duration, Clock, Effect, Event, RecordKey, TimerId};
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;

/// Adapter dependencies
pub struct ControllerDeps<R, G, E> {
    pub records: R,
    pub jobs: G,
    pub recorder: E,
}

/// Worker pool and retry tuning
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControllerConfig {
    pub workers: usize,
    pub backoff_base: Duration,
    pub backoff_max: Duration,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            workers: 4,
            backoff_base: DEFAULT_BACKOFF_BASE,
            backoff_max: DEFAULT_BACKOFF_MAX,
        }
    }
}

pub struct Controller<R, G, E, C: Clock> {
    reconciler: Reconciler<R, G, E, C>,
    queue: WorkQueue,
    config: ControllerConfig,
}

impl<R, G, E, C> Controller<R, G, E, C>
where
    R: RecordStore,
    G: JobGateway,
    E: EventRecorder,
    C: Clock,
{
    pub fn new(deps: ControllerDeps<R, G, E>, clock: C, config: ControllerConfig) -> Self {
        let executor = Executor::new(deps, Arc::new(Mutex::new(Scheduler::new())), clock);
        Self {
            reconciler: Reconciler::new(executor),
            queue: WorkQueue::new(config.backoff_base, config.backoff_max),
            config,
        }
    }

    pub fn clock(&self) -> &C {
        self.reconciler.executor().clock()
    }

    /// Shared timer table, for the daemon's timer loop
    pub fn scheduler(&self) -> Arc<Mutex<Scheduler>> {
        self.reconciler.executor().scheduler()
    }

    pub fn queue(&self) -> &WorkQueue {
        &self.queue
    }

    pub fn config(&self) -> &ControllerConfig {
        &self.config
    }

    pub fn enqueue(&self, key: RecordKey) {
        self.queue.add(key);
    }

    /// Route an event to the record it concerns.
    pub fn handle_event(&self, event: &Event) {
        tracing::debug!(event = %event.log_summary(), "event");
        match event {
            Event::Shutdown => self.shutdown(),
            _ => {
                if let Some(key) = event.record_key() {
                    self.queue.add(key);
                }
            }
        }
    }

    /// Enqueue records whose timers have expired. Returns how many fired.
    pub fn tick(&self) -> usize {
        let now = self.clock().now();
        let fired = self.scheduler().lock().fired_timers(now);
        for event in &fired {
            self.handle_event(event);
        }
        fired.len()
    }

    /// Run one pass for `key`, then arm its requeue timer.
    pub async fn process(&self, key: RecordKey) {
        let timer = TimerId::requeue(&key);
        let follow_up = match self.reconciler.reconcile(&key).await {
            Ok(ReconcileResult {
                requeue_after: Some(duration),
            }) => {
                self.queue.forget(&key);
                Effect::SetTimer {
                    id: timer,
                    duration,
                }
            }
            Ok(ReconcileResult {
                requeue_after: None,
            }) => {
                self.queue.forget(&key);
                Effect::CancelTimer { id: timer }
            }
            Err(e) => {
                let delay = self.queue.retry_delay(&key);
                let retry_in = format_duration(delay);
                if e.is_conflict() {
                    tracing::info!(cronjob = %key, retry_in = %retry_in, "status conflict, retrying");
                } else if !e.is_transient() {
                    tracing::warn!(cronjob = %key, error = %e, retry_in = %retry_in, "record needs an edit");
                } else {
                    tracing::warn!(cronjob = %key, error = %e, retry_in = %retry_in, "reconcile failed");
                }
                Effect::SetTimer {
                    id: timer,
                    duration: delay,
                }
            }
        };
        if let Err(e) = self.reconciler.executor().execute(follow_up).await {
            tracing::error!(cronjob = %key, error = %e, "failed to arm requeue timer");
        }
        self.queue.done(&key);
    }

    /// Process queued keys on the current task until none are left.
    ///
    /// Keys re-added during the drain are processed too. Returns the number
    /// of passes run.
    pub async fn drain(&self) -> usize {
        let mut passes = 0;
        while let Some(key) = self.queue.try_get() {
            self.process(key).await;
            passes += 1;
        }
        passes
    }

    /// Start the worker pool. Workers exit after [`shutdown`](Self::shutdown).
    pub fn spawn_workers(self: &Arc<Self>) -> Vec<JoinHandle<()>> {
        (0..self.config.workers.max(1))
            .map(|worker| {
                let controller = Arc::clone(self);
                tokio::spawn(async move { controller.run_worker(worker).await })
            })
            .collect()
    }

    async fn run_worker(&self, worker: usize) {
        tracing::debug!(worker, "worker started");
        while let Some(key) = self.queue.get().await {
            self.process(key).await;
        }
        tracing::debug!(worker, "worker stopped");
    }

    pub fn shutdown(&self) {
        tracing::info!("controller shutting down");
        self.queue.shutdown();
    }
}

#[cfg(test)]
#[path = "controller_tests.rs"]
mod tests;
