//! Suspension holds new runs but keeps reporting existing ones.

use crate::prelude::*;
use cj_core::test_support::owned_job;
use similar_asserts::assert_eq;

#[tokio::test]
async fn suspended_record_skips_and_reports_active() {
    let mut h = Harness::at(utc(2026, 5, 1, 3, 0, 30));
    let key = h.apply(
        cron_job("nightly", "0 3 * * *", utc(2026, 4, 29, 12, 0, 0)).with_suspend(true),
    );
    let stored = h.cluster.get_record(&key).unwrap();
    let yesterday = utc(2026, 4, 30, 3, 0, 0);
    h.cluster
        .create_job(owned_job(&stored, yesterday, JobPhase::Running))
        .unwrap();

    h.settle().await;

    assert_eq!(h.job_names(), vec![job("nightly", yesterday)]);
    assert_eq!(h.active_names(&key), vec![job("nightly", yesterday)]);
    assert_eq!(h.recorder.reasons(), vec!["JobSkipped"]);
    assert_eq!(h.controller.queue().failures(&key), 0);
    let status = h.status(&key);
    assert_eq!(status.last_schedule_time, Some(yesterday));
    assert_eq!(status.last_processed_time, Some(utc(2026, 5, 1, 3, 0, 0)));
}

#[tokio::test]
async fn resuming_does_not_run_skipped_instants() {
    let mut h = Harness::at(utc(2026, 5, 1, 3, 0, 30));
    let record = cron_job("nightly", "0 3 * * *", utc(2026, 4, 30, 12, 0, 0));
    let key = h.apply(record.clone().with_suspend(true));
    h.settle().await;
    assert!(h.job_names().is_empty());

    h.apply(record.with_suspend(false));
    h.settle().await;
    assert!(h.job_names().is_empty());
    assert_eq!(h.requeue_in(&key), Some(Duration::from_secs(86_370)));

    h.advance(Duration::from_secs(86_370)).await;
    assert_eq!(h.job_names(), vec![job("nightly", utc(2026, 5, 2, 3, 0, 0))]);
}
