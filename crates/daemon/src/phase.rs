// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Phase reports from the job primitive.
//!
//! Each `*.json` file names one job and the phase it reached:
//! `{"namespace": "ops", "name": "nightly-1777604400", "phase": "Succeeded"}`.
//! Reports are consumed: a file is removed once read, whether or not the job
//! still exists.

use std::path::{Path, PathBuf};

use cj_adapters::Cluster;
use cj_core::{Clock, IdGen, JobPhase, RecordKey};
use serde::Deserialize;
use tracing::{debug, warn};

use crate::manifest::DEFAULT_NAMESPACE;

/// Suffix given to reports that cannot be parsed, so they are not retried
pub const REJECTED_SUFFIX: &str = "rejected";

#[derive(Debug, Deserialize)]
struct PhaseReport {
    #[serde(default)]
    namespace: String,
    name: String,
    phase: JobPhase,
}

/// Apply every pending report in `dir`, ordered by file name.
///
/// Returns how many reports changed a stored job.
pub fn apply_dir<C: Clock, I: IdGen>(cluster: &Cluster<C, I>, dir: &Path) -> usize {
    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return 0,
        Err(e) => {
            warn!(dir = %dir.display(), error = %e, "cannot read phase directory");
            return 0;
        }
    };

    let mut paths: Vec<PathBuf> = entries
        .filter_map(Result::ok)
        .map(|entry| entry.path())
        .filter(|path| path.extension().is_some_and(|ext| ext == "json"))
        .collect();
    paths.sort();

    paths.iter().filter(|path| apply_file(cluster, path)).count()
}

fn apply_file<C: Clock, I: IdGen>(cluster: &Cluster<C, I>, path: &Path) -> bool {
    let report = match read_report(path) {
        Some(report) => report,
        None => {
            reject(path);
            return false;
        }
    };

    let namespace = if report.namespace.is_empty() {
        DEFAULT_NAMESPACE
    } else {
        report.namespace.as_str()
    };
    let key = RecordKey::new(namespace, &report.name);
    let applied = match cluster.set_job_phase(&key, report.phase) {
        Ok(_) => {
            debug!(job = %key, phase = ?report.phase, "job phase reported");
            true
        }
        Err(e) => {
            warn!(job = %key, error = %e, "phase report for unknown job");
            false
        }
    };

    if let Err(e) = std::fs::remove_file(path) {
        warn!(path = %path.display(), error = %e, "cannot remove phase report");
    }
    applied
}

fn read_report(path: &Path) -> Option<PhaseReport> {
    let raw = match std::fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "cannot read phase report");
            return None;
        }
    };
    match serde_json::from_str::<PhaseReport>(&raw) {
        Ok(report) if report.name.is_empty() => {
            warn!(path = %path.display(), "phase report has no name");
            None
        }
        Ok(report) => Some(report),
        Err(e) => {
            warn!(path = %path.display(), error = %e, "malformed phase report");
            None
        }
    }
}

fn reject(path: &Path) {
    let mut rejected = path.as_os_str().to_owned();
    rejected.push(".");
    rejected.push(REJECTED_SUFFIX);
    if let Err(e) = std::fs::rename(path, &rejected) {
        warn!(path = %path.display(), error = %e, "cannot set aside phase report");
    }
}

#[cfg(test)]
#[path = "phase_tests.rs"]
mod tests;
