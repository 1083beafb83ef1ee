//! Missed instants after an outage, with and without a starting deadline.

use crate::prelude::*;
use similar_asserts::assert_eq;

#[tokio::test]
async fn outage_with_deadline_runs_only_latest_instant() {
    // Every minute, Forbid, deadline 200s, last run ten minutes ago
    let record = cron_job("minutely", "* * * * *", utc(2026, 5, 1, 2, 0, 0))
        .with_policy(ConcurrencyPolicy::Forbid)
        .with_deadline_secs(200)
        .with_last_schedule(utc(2026, 5, 1, 3, 0, 0));
    let mut h = Harness::at(utc(2026, 5, 1, 3, 10, 0));
    let key = h.apply(record);

    h.settle().await;

    let resumed = utc(2026, 5, 1, 3, 10, 0);
    assert_eq!(h.job_names(), vec![job("minutely", resumed)]);
    assert_eq!(h.status(&key).last_schedule_time, Some(resumed));
    assert_eq!(h.requeue_in(&key), Some(Duration::from_secs(60)));
}

#[tokio::test]
async fn instant_older_than_deadline_never_runs() {
    let record = cron_job("nightly", "0 3 * * *", utc(2026, 5, 1, 2, 0, 0)).with_deadline_secs(30);
    let mut h = Harness::at(utc(2026, 5, 1, 3, 1, 0));
    let key = h.apply(record);

    h.settle().await;
    h.advance(Duration::from_secs(5)).await;

    assert!(h.job_names().is_empty());
    assert_eq!(h.status(&key).last_schedule_time, None);
    assert_eq!(
        h.requeue_in(&key),
        Some(Duration::from_secs(24 * 3600 - 65))
    );
}

#[tokio::test]
async fn too_many_missed_fast_forwards_then_resumes() {
    let record = cron_job("minutely", "* * * * *", utc(2026, 4, 29, 0, 0, 0));
    let mut h = Harness::at(utc(2026, 5, 1, 3, 0, 30));
    let key = h.apply(record);

    h.settle().await;

    assert!(h.job_names().is_empty());
    assert_eq!(h.recorder.reasons(), vec!["TooManyMissedTimes"]);
    let now = utc(2026, 5, 1, 3, 0, 30);
    assert_eq!(h.status(&key).last_processed_time, Some(now));
    assert_eq!(h.status(&key).last_schedule_time, Some(now));

    h.advance(Duration::from_secs(30)).await;
    assert_eq!(h.job_names(), vec![job("minutely", utc(2026, 5, 1, 3, 1, 0))]);
}

#[tokio::test]
async fn invalid_schedule_creates_nothing() {
    let record = cron_job("broken", "every day at noon", utc(2026, 5, 1, 2, 0, 0));
    let mut h = Harness::at(utc(2026, 5, 1, 3, 0, 0));
    h.apply(record);

    h.settle().await;

    assert!(h.job_names().is_empty());
    assert_eq!(h.recorder.reasons(), vec!["InvalidSchedule"]);
}
