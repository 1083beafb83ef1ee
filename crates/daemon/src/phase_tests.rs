// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use cj_core::test_support::{cron_job, owned_job, utc};
use cj_core::{Event, FakeClock, SequentialIdGen};
use cj_storage::ClusterState;
use tempfile::tempdir;
use tokio::sync::mpsc;

const JOB: &str = "nightly-1777604400";

fn cluster_with_running_job(
    namespace: &str,
) -> (Cluster<FakeClock, SequentialIdGen>, mpsc::Receiver<Event>) {
    let (tx, rx) = mpsc::channel(16);
    let clock = FakeClock::at(utc(2026, 5, 1, 3, 0, 5));
    let cluster = Cluster::new(ClusterState::default(), tx, clock, SequentialIdGen::default());
    let mut record = cron_job("nightly", "0 3 * * *", utc(2026, 4, 1, 0, 0, 0));
    record.metadata.namespace = namespace.to_string();
    cluster
        .create_job(owned_job(&record, utc(2026, 5, 1, 3, 0, 0), JobPhase::Running))
        .unwrap();
    (cluster, rx)
}

fn phase_of(cluster: &Cluster<FakeClock, SequentialIdGen>, namespace: &str) -> JobPhase {
    cluster.read(|state| state.get_job(&RecordKey::new(namespace, JOB)).unwrap().status.phase)
}

#[test]
fn missing_directory_applies_nothing() {
    let dir = tempdir().unwrap();
    let (cluster, _rx) = cluster_with_running_job("ops");
    assert_eq!(apply_dir(&cluster, &dir.path().join("nope")), 0);
}

#[test]
fn report_finishes_job_and_is_consumed() {
    let dir = tempdir().unwrap();
    let (cluster, mut rx) = cluster_with_running_job("ops");
    while rx.try_recv().is_ok() {}
    let report = dir.path().join("a.json");
    std::fs::write(
        &report,
        format!(r#"{{"namespace": "ops", "name": "{JOB}", "phase": "Succeeded"}}"#),
    )
    .unwrap();

    assert_eq!(apply_dir(&cluster, dir.path()), 1);

    assert_eq!(phase_of(&cluster, "ops"), JobPhase::Succeeded);
    assert!(!report.exists());
    assert_eq!(
        rx.try_recv().unwrap(),
        Event::JobChanged {
            owner: RecordKey::new("ops", "nightly"),
            job: JOB.to_string(),
        }
    );
}

#[test]
fn blank_namespace_means_default() {
    let dir = tempdir().unwrap();
    let (cluster, _rx) = cluster_with_running_job(DEFAULT_NAMESPACE);
    std::fs::write(
        dir.path().join("a.json"),
        format!(r#"{{"name": "{JOB}", "phase": "Failed"}}"#),
    )
    .unwrap();

    assert_eq!(apply_dir(&cluster, dir.path()), 1);
    assert_eq!(phase_of(&cluster, DEFAULT_NAMESPACE), JobPhase::Failed);
}

#[test]
fn unknown_job_report_is_dropped() {
    let dir = tempdir().unwrap();
    let (cluster, _rx) = cluster_with_running_job("ops");
    let report = dir.path().join("a.json");
    std::fs::write(&report, r#"{"namespace": "ops", "name": "gone", "phase": "Failed"}"#).unwrap();

    assert_eq!(apply_dir(&cluster, dir.path()), 0);
    assert!(!report.exists());
    assert_eq!(phase_of(&cluster, "ops"), JobPhase::Running);
}

#[yare::parameterized(
    not_json = { "not json" },
    unknown_phase = { r#"{"name": "nightly-1777604400", "phase": "Exploded"}"# },
    no_name = { r#"{"name": "", "phase": "Failed"}"# },
)]
fn bad_report_is_set_aside(raw: &str) {
    let dir = tempdir().unwrap();
    let (cluster, _rx) = cluster_with_running_job(DEFAULT_NAMESPACE);
    std::fs::write(dir.path().join("a.json"), raw).unwrap();
    std::fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

    assert_eq!(apply_dir(&cluster, dir.path()), 0);

    assert!(!dir.path().join("a.json").exists());
    assert!(dir.path().join("a.json.rejected").exists());
    assert!(dir.path().join("notes.txt").exists());
    assert_eq!(phase_of(&cluster, DEFAULT_NAMESPACE), JobPhase::Running);
}
