//! Finished jobs beyond the history limits are deleted oldest first.

use crate::prelude::*;
use cj_core::test_support::owned_job;
use similar_asserts::assert_eq;

#[tokio::test]
async fn success_limit_keeps_newest() {
    let mut h = Harness::at(utc(2026, 5, 1, 2, 59, 30));
    let key = h.apply(
        cron_job("minutely", "* * * * *", utc(2026, 5, 1, 2, 0, 0))
            .with_history(1, 1)
            .with_last_schedule(utc(2026, 5, 1, 2, 59, 0)),
    );
    let stored = h.cluster.get_record(&key).unwrap();
    for minute in [58, 59] {
        h.cluster
            .create_job(owned_job(&stored, utc(2026, 5, 1, 2, minute, 0), JobPhase::Succeeded))
            .unwrap();
    }

    h.settle().await;

    assert_eq!(h.job_names(), vec![job("minutely", utc(2026, 5, 1, 2, 59, 0))]);
    assert!(h.active_names(&key).is_empty());
}

#[tokio::test]
async fn repeated_failures_keep_last_two() {
    let mut h = Harness::at(utc(2026, 5, 1, 2, 59, 30));
    h.apply(cron_job("flaky", "* * * * *", utc(2026, 5, 1, 2, 59, 30)).with_history(3, 2));
    h.settle().await;

    let mut step = Duration::from_secs(30);
    for minute in 0..3 {
        h.advance(step).await;
        h.finish(&job("flaky", utc(2026, 5, 1, 3, minute, 0)), JobPhase::Failed);
        h.settle().await;
        step = Duration::from_secs(60);
    }

    assert_eq!(
        h.job_names(),
        vec![
            job("flaky", utc(2026, 5, 1, 3, 1, 0)),
            job("flaky", utc(2026, 5, 1, 3, 2, 0)),
        ]
    );
}

#[tokio::test]
async fn running_jobs_are_never_pruned() {
    let mut h = Harness::at(utc(2026, 5, 1, 3, 0, 30));
    let key = h.apply(
        cron_job("nightly", "0 3 * * *", utc(2026, 4, 1, 0, 0, 0))
            .with_history(0, 0)
            .with_last_schedule(utc(2026, 5, 1, 3, 0, 0)),
    );
    let stored = h.cluster.get_record(&key).unwrap();
    let running = utc(2026, 5, 1, 3, 0, 0);
    h.cluster
        .create_job(owned_job(&stored, running, JobPhase::Running))
        .unwrap();
    h.cluster
        .create_job(owned_job(&stored, utc(2026, 4, 30, 3, 0, 0), JobPhase::Succeeded))
        .unwrap();

    h.settle().await;

    assert_eq!(h.job_names(), vec![job("nightly", running)]);
    assert_eq!(h.active_names(&key), vec![job("nightly", running)]);
}
