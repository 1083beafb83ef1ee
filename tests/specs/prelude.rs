//! Shared harness: a store-backed controller on a fake clock.
//!
//! [`Harness::settle`] plays the daemon loop by hand: it forwards watch
//! events, fires expired timers, and drains the work queue until nothing
//! is left to do.

pub use chrono::{DateTime, Utc};
pub use cj_core::test_support::{cron_job, utc, CronJobExt};
pub use cj_core::{ConcurrencyPolicy, CronJob, CronJobStatus, JobPhase, RecordKey, TimerId};
pub use std::time::Duration;

use cj_adapters::{Cluster, FakeEventRecorder, StateJobGateway, StateRecordStore};
use cj_core::{Clock, Event, FakeClock, SequentialIdGen};
use cj_engine::{Controller, ControllerConfig, ControllerDeps};
use cj_storage::ClusterState;
use tokio::sync::mpsc;

type SpecController = Controller<
    StateRecordStore<FakeClock, SequentialIdGen>,
    StateJobGateway<FakeClock, SequentialIdGen>,
    FakeEventRecorder,
    FakeClock,
>;

pub struct Harness {
    pub cluster: Cluster<FakeClock, SequentialIdGen>,
    pub controller: SpecController,
    pub recorder: FakeEventRecorder,
    pub clock: FakeClock,
    events: mpsc::Receiver<Event>,
}

impl Harness {
    pub fn at(now: DateTime<Utc>) -> Self {
        let clock = FakeClock::at(now);
        let (tx, events) = mpsc::channel(256);
        let cluster = Cluster::new(
            ClusterState::default(),
            tx,
            clock.clone(),
            SequentialIdGen::new("uid"),
        );
        let recorder = FakeEventRecorder::new();
        let controller = Controller::new(
            ControllerDeps {
                records: StateRecordStore::new(cluster.clone()),
                jobs: StateJobGateway::new(cluster.clone()),
                recorder: recorder.clone(),
            },
            clock.clone(),
            ControllerConfig::default(),
        );
        Self {
            cluster,
            controller,
            recorder,
            clock,
            events,
        }
    }

    pub fn apply(&self, record: CronJob) -> RecordKey {
        self.cluster.apply_record(record).metadata.key()
    }

    /// Run passes until no events, due timers, or queued keys remain.
    pub async fn settle(&mut self) -> usize {
        let mut passes = 0;
        for _ in 0..64 {
            while let Ok(event) = self.events.try_recv() {
                self.controller.handle_event(&event);
            }
            self.controller.tick();
            let ran = self.controller.drain().await;
            passes += ran;
            if ran == 0 {
                return passes;
            }
        }
        panic!("controller did not settle after {passes} passes");
    }

    /// Move the clock forward and settle.
    pub async fn advance(&mut self, by: Duration) -> usize {
        self.clock.advance(by);
        self.settle().await
    }

    pub fn status(&self, key: &RecordKey) -> CronJobStatus {
        self.cluster
            .get_record(key)
            .map(|r| r.status)
            .unwrap_or_default()
    }

    /// Names of every stored job, sorted
    pub fn job_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .cluster
            .read(|state| state.jobs.values().map(|j| j.metadata.name.clone()).collect());
        names.sort();
        names
    }

    pub fn active_names(&self, key: &RecordKey) -> Vec<String> {
        self.status(key).active.into_iter().map(|r| r.name).collect()
    }

    pub fn finish(&self, job: &str, phase: JobPhase) {
        let key = RecordKey::new("default", job);
        if let Err(e) = self.cluster.set_job_phase(&key, phase) {
            panic!("cannot finish {key}: {e}");
        }
    }

    /// When the record's requeue timer fires, relative to now
    pub fn requeue_in(&self, key: &RecordKey) -> Option<Duration> {
        let deadline = self
            .controller
            .scheduler()
            .lock()
            .deadline(&TimerId::requeue(key))?;
        Some(deadline.saturating_duration_since(self.clock.now()))
    }
}

/// Job name for `record` at `instant`
pub fn job(record: &str, instant: DateTime<Utc>) -> String {
    cj_core::job::job_name(record, instant)
}
