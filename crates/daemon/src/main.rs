// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Cron job controller daemon (cjd)
//!
//! Owns the in-process object store and drives the controller.
//!
//! Architecture:
//! - Worker tasks: run reconcile passes pulled from the work queue
//! - Checkpoint task: periodically snapshots the store
//! - Main loop: routes store watch events and expired timers into the queue,
//!   and applies job phase reports

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

mod env;
mod lifecycle;
mod manifest;
mod phase;

use std::path::{Path, PathBuf};

use cj_core::Event;
use tokio::signal::unix::{signal, SignalKind};
use tracing::{error, info};

use crate::lifecycle::{Config, LifecycleError, StartupResult};

const VERSION: &str = env!("CARGO_PKG_VERSION");

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Handle info flags before any config/lock acquisition
    if let Some(arg) = std::env::args().nth(1) {
        match arg.as_str() {
            "--version" | "-V" | "-v" => {
                println!("cjd {VERSION}");
                return Ok(());
            }
            "--help" | "-h" | "help" => {
                println!("cjd {VERSION}");
                println!("Cron job controller - creates jobs for recurring schedules");
                println!();
                println!("USAGE:");
                println!("    cjd");
                println!();
                println!("Records are read from $CJ_STATE_DIR/cronjobs/*.json at startup;");
                println!("Job phase reports are consumed from $CJ_STATE_DIR/job-phases/*.json;");
                println!("the store is snapshotted to $CJ_STATE_DIR/snapshot.json.");
                println!();
                println!("ENVIRONMENT:");
                println!("    CJ_STATE_DIR         State directory (default ~/.local/state/cj)");
                println!("    CJ_WORKERS           Reconcile workers (default 4)");
                println!("    CJ_TIMER_CHECK_MS    Timer check interval (default 1000)");
                println!("    CJ_CHECKPOINT_SECS   Snapshot interval (default 60)");
                println!("    RUST_LOG             Log filter (default info)");
                println!();
                println!("OPTIONS:");
                println!("    -h, --help       Print help information");
                println!("    -v, --version    Print version information");
                return Ok(());
            }
            _ => {
                eprintln!("error: unexpected argument '{arg}'");
                eprintln!("Usage: cjd [--help | --version]");
                std::process::exit(1);
            }
        }
    }

    let config = Config::load()?;

    // Write startup marker to log (before tracing setup)
    rotate_log_if_needed(&config.log_path);
    write_startup_marker(&config)?;

    let log_guard = setup_logging(&config)?;

    info!(version = VERSION, "starting cron job controller");

    let StartupResult { daemon, mut events } = match lifecycle::startup(&config) {
        Ok(r) => r,
        Err(LifecycleError::LockFailed(_)) => {
            let pid = std::fs::read_to_string(&config.lock_path)
                .unwrap_or_default()
                .trim()
                .to_string();
            eprintln!("cjd is already running");
            if !pid.is_empty() {
                eprintln!("  pid: {pid}");
            }
            std::process::exit(1);
        }
        Err(e) => {
            // Write error synchronously (tracing is non-blocking and may not flush in time)
            write_startup_error(&config, &e);
            error!("Failed to start daemon: {}", e);
            drop(log_guard);
            return Err(e.into());
        }
    };

    let workers = daemon.controller.spawn_workers();
    let checkpoint = lifecycle::spawn_checkpoint(
        daemon.cluster.clone(),
        config.snapshot_path.clone(),
        config.checkpoint_interval,
    );

    let mut sigterm = signal(SignalKind::terminate())?;
    let mut sigint = signal(SignalKind::interrupt())?;

    info!(
        workers = workers.len(),
        state_dir = %config.state_dir.display(),
        "daemon ready"
    );
    println!("READY");

    // NOTE: Must be created outside the loop - tokio::select! re-evaluates
    // branches on each iteration, so a sleep() inside would reset on every
    // event and timers would never fire during activity.
    let mut timer_check = tokio::time::interval(config.timer_check);

    loop {
        tokio::select! {
            event = events.recv() => {
                match event {
                    Some(Event::Shutdown) | None => {
                        info!("event stream closed, shutting down...");
                        break;
                    }
                    Some(event) => daemon.controller.handle_event(&event),
                }
            }

            _ = sigterm.recv() => {
                info!("Received SIGTERM, shutting down...");
                break;
            }

            _ = sigint.recv() => {
                info!("Received SIGINT, shutting down...");
                break;
            }

            _ = timer_check.tick() => {
                let fired = daemon.controller.tick();
                if fired > 0 {
                    tracing::debug!(fired, "requeue timers fired");
                }
                let reported = phase::apply_dir(&daemon.cluster, &config.phases_path);
                if reported > 0 {
                    tracing::debug!(reported, "job phases applied");
                }
            }
        }
    }

    checkpoint.abort();
    daemon.shutdown(workers).await?;
    info!("Daemon stopped");
    Ok(())
}

/// Startup marker prefix written to log before anything else.
/// Full format: "--- cjd: starting (pid: 12345) ---"
pub const STARTUP_MARKER_PREFIX: &str = "--- cjd: starting (pid: ";

/// Rotate the log once it grows past this size
const MAX_LOG_SIZE: u64 = 10 * 1024 * 1024;

/// Rotated logs kept: daemon.log.1 (newest) through daemon.log.3
const MAX_ROTATED_LOGS: u32 = 3;

/// Append the startup marker to the log file
fn write_startup_marker(config: &Config) -> Result<(), LifecycleError> {
    use std::io::Write;

    if let Some(parent) = config.log_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let mut file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&config.log_path)?;
    writeln!(file, "{}{}) ---", STARTUP_MARKER_PREFIX, std::process::id())?;

    Ok(())
}

/// Write startup error synchronously to log file.
fn write_startup_error(config: &Config, error: &LifecycleError) {
    use std::io::Write;

    let Ok(mut file) = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&config.log_path)
    else {
        return;
    };
    let _ = writeln!(file, "ERROR Failed to start daemon: {}", error);
}

/// Shift `daemon.log` to `daemon.log.1` when it is too large, keeping at
/// most [`MAX_ROTATED_LOGS`] old files.
fn rotate_log_if_needed(log_path: &Path) {
    let Ok(meta) = std::fs::metadata(log_path) else {
        return;
    };
    if meta.len() <= MAX_LOG_SIZE {
        return;
    }

    let rotated = |n: u32| -> PathBuf {
        let mut name = log_path.as_os_str().to_owned();
        name.push(format!(".{n}"));
        PathBuf::from(name)
    };

    let _ = std::fs::remove_file(rotated(MAX_ROTATED_LOGS));
    for n in (1..MAX_ROTATED_LOGS).rev() {
        let from = rotated(n);
        if from.exists() {
            let _ = std::fs::rename(&from, rotated(n + 1));
        }
    }
    let _ = std::fs::rename(log_path, rotated(1));
}

fn setup_logging(
    config: &Config,
) -> Result<tracing_appender::non_blocking::WorkerGuard, LifecycleError> {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    if let Some(parent) = config.log_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let file_appender = tracing_appender::rolling::never(
        config.log_path.parent().ok_or(LifecycleError::NoStateDir)?,
        config
            .log_path
            .file_name()
            .ok_or(LifecycleError::NoStateDir)?,
    );
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(non_blocking))
        .init();

    Ok(guard)
}

#[cfg(test)]
#[path = "main_tests.rs"]
mod tests;
