// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Daemon lifecycle management: startup, checkpoints, shutdown.

use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use cj_adapters::{
    Cluster, LogEventRecorder, StateJobGateway, StateRecordStore, TracedJobGateway,
    TracedRecordStore,
};
use cj_core::{Clock, Event, SystemClock, UuidIdGen};
use cj_engine::{Controller, ControllerConfig, ControllerDeps};
use cj_storage::{ClusterState, Snapshot};
use fs2::FileExt;
use thiserror::Error;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::{env, manifest};

/// Capacity of the watch event channel; events past it are dropped and
/// recovered by timers and the startup resync.
const EVENT_CHANNEL_CAPACITY: usize = 1024;

const DEFAULT_TIMER_CHECK: Duration = Duration::from_secs(1);
const DEFAULT_CHECKPOINT_INTERVAL: Duration = Duration::from_secs(60);

/// Daemon cluster handle with concrete id and clock types
pub type DaemonCluster = Cluster<SystemClock, UuidIdGen>;

/// Controller with concrete adapter types (wrapped with tracing)
pub type DaemonController = Controller<
    TracedRecordStore<StateRecordStore<SystemClock, UuidIdGen>>,
    TracedJobGateway<StateJobGateway<SystemClock, UuidIdGen>>,
    LogEventRecorder,
    SystemClock,
>;

/// Daemon configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Root state directory (e.g. ~/.local/state/cj)
    pub state_dir: PathBuf,
    /// Path to lock/PID file
    pub lock_path: PathBuf,
    /// Path to daemon log file
    pub log_path: PathBuf,
    /// Path to snapshot file
    pub snapshot_path: PathBuf,
    /// Directory of record manifests applied at startup
    pub manifests_path: PathBuf,
    /// Directory the job primitive drops phase reports into
    pub phases_path: PathBuf,
    pub controller: ControllerConfig,
    /// How often expired requeue timers are checked
    pub timer_check: Duration,
    /// How often the store is snapshotted
    pub checkpoint_interval: Duration,
}

impl Config {
    /// Load configuration from the environment.
    pub fn load() -> Result<Self, LifecycleError> {
        let mut config = Self::for_state_dir(env::state_dir()?);
        if let Some(workers) = env::workers() {
            config.controller.workers = workers;
        }
        if let Some(interval) = env::timer_check_ms() {
            config.timer_check = interval;
        }
        if let Some(interval) = env::checkpoint_secs() {
            config.checkpoint_interval = interval;
        }
        Ok(config)
    }

    /// Default layout under `state_dir`
    pub fn for_state_dir(state_dir: PathBuf) -> Self {
        Self {
            lock_path: state_dir.join("daemon.pid"),
            log_path: state_dir.join("daemon.log"),
            snapshot_path: state_dir.join("snapshot.json"),
            manifests_path: state_dir.join("cronjobs"),
            phases_path: state_dir.join("job-phases"),
            controller: ControllerConfig::default(),
            timer_check: DEFAULT_TIMER_CHECK,
            checkpoint_interval: DEFAULT_CHECKPOINT_INTERVAL,
            state_dir,
        }
    }
}

/// Lifecycle errors
#[derive(Debug, Error)]
pub enum LifecycleError {
    #[error("Could not determine state directory")]
    NoStateDir,

    #[error("Failed to acquire lock: daemon already running?")]
    LockFailed(#[source] std::io::Error),

    #[error("Snapshot error: {0}")]
    Snapshot(#[from] cj_storage::SnapshotError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Daemon state during operation
pub struct DaemonState {
    pub config: Config,
    // NOTE(lifetime): Held to maintain exclusive file lock; released on drop
    #[allow(dead_code)]
    lock_file: File,
    pub cluster: DaemonCluster,
    pub controller: Arc<DaemonController>,
    pub start_time: Instant,
}

/// Result of daemon startup
pub struct StartupResult {
    pub daemon: DaemonState,
    /// Watch events from the store, for the main loop
    pub events: mpsc::Receiver<Event>,
}

/// Start the daemon: lock the state dir, restore the store, apply
/// manifests, and queue every record for an initial pass.
pub fn startup(config: &Config) -> Result<StartupResult, LifecycleError> {
    // 1. Create state directory
    std::fs::create_dir_all(&config.state_dir)?;

    // 2. Acquire lock file FIRST - prevents races
    // Open without truncating so a running daemon's PID survives a failed attempt.
    let mut lock_file = std::fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(false)
        .open(&config.lock_path)?;
    lock_file
        .try_lock_exclusive()
        .map_err(LifecycleError::LockFailed)?;
    {
        use std::io::Write;
        lock_file.set_len(0)?;
        writeln!(lock_file, "{}", std::process::id())?;
    }

    // 3. Restore the store
    let state = match Snapshot::load(&config.snapshot_path)? {
        Some(snapshot) => {
            info!(
                records = snapshot.state.records.len(),
                jobs = snapshot.state.jobs.len(),
                saved_at = %snapshot.created_at,
                "loaded snapshot"
            );
            snapshot.state
        }
        None => {
            info!("no snapshot found, starting with empty store");
            ClusterState::default()
        }
    };

    // 4. Wire the store into the controller
    let (event_tx, events) = mpsc::channel(EVENT_CHANNEL_CAPACITY);
    let cluster = Cluster::new(state, event_tx, SystemClock, UuidIdGen);
    let controller = Arc::new(Controller::new(
        ControllerDeps {
            records: TracedRecordStore::new(StateRecordStore::new(cluster.clone())),
            jobs: TracedJobGateway::new(StateJobGateway::new(cluster.clone())),
            recorder: LogEventRecorder::new(),
        },
        SystemClock,
        config.controller.clone(),
    ));

    // 5. Apply manifests; each apply emits its own RecordChanged event
    let manifests = manifest::load_dir(&config.manifests_path);
    if !manifests.is_empty() {
        info!(count = manifests.len(), "applying record manifests");
    }
    for record in manifests {
        cluster.apply_record(record);
    }

    // 6. Resync: every record gets a pass, covering anything that came due
    // while the daemon was down.
    let keys = cluster.record_keys();
    info!(records = keys.len(), "queueing initial reconcile");
    for key in keys {
        controller.enqueue(key);
    }

    Ok(StartupResult {
        daemon: DaemonState {
            config: config.clone(),
            lock_file,
            cluster,
            controller,
            start_time: Instant::now(),
        },
        events,
    })
}

/// Persist the store to `path`. Returns the bytes written.
pub fn checkpoint(cluster: &DaemonCluster, path: &Path) -> Result<u64, LifecycleError> {
    let snapshot = Snapshot::new(cluster.snapshot(), cluster.clock().utc_now());
    Ok(snapshot.save(path)?)
}

/// Spawn a task that periodically snapshots the store.
pub fn spawn_checkpoint(cluster: DaemonCluster, path: PathBuf, interval: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        // The first tick completes immediately; startup state is already on disk.
        ticker.tick().await;
        loop {
            ticker.tick().await;
            match checkpoint(&cluster, &path) {
                Ok(size_bytes) => tracing::debug!(size_bytes, "saved checkpoint snapshot"),
                Err(e) => warn!(error = %e, "failed to save checkpoint snapshot"),
            }
        }
    })
}

impl DaemonState {
    /// Stop the workers, save a final snapshot, and release the lock.
    pub async fn shutdown(self, workers: Vec<JoinHandle<()>>) -> Result<(), LifecycleError> {
        info!("shutting down daemon");
        self.controller.shutdown();
        for worker in workers {
            if let Err(e) = worker.await {
                warn!(error = %e, "worker task failed");
            }
        }

        match checkpoint(&self.cluster, &self.config.snapshot_path) {
            Ok(size_bytes) => info!(size_bytes, "saved final shutdown snapshot"),
            Err(e) => warn!(error = %e, "failed to save shutdown snapshot"),
        }

        if self.config.lock_path.exists() {
            if let Err(e) = std::fs::remove_file(&self.config.lock_path) {
                warn!(error = %e, "failed to remove PID file");
            }
        }

        info!(uptime_secs = self.start_time.elapsed().as_secs(), "daemon shutdown complete");
        Ok(())
    }
}

#[cfg(test)]
#[path = "lifecycle_tests.rs"]
mod tests;
