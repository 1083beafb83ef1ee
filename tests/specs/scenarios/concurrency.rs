//! Concurrency policy across consecutive instants.

use crate::prelude::*;
use similar_asserts::assert_eq;

const MINUTELY: &str = "* * * * *";

fn minutely(policy: ConcurrencyPolicy) -> CronJob {
    cron_job("minutely", MINUTELY, utc(2026, 5, 1, 2, 59, 30)).with_policy(policy)
}

#[tokio::test]
async fn forbid_waits_for_active_child_to_finish() {
    let mut h = Harness::at(utc(2026, 5, 1, 2, 59, 30));
    let key = h.apply(minutely(ConcurrencyPolicy::Forbid));
    h.settle().await;

    h.advance(Duration::from_secs(30)).await;
    let first = job("minutely", utc(2026, 5, 1, 3, 0, 0));
    assert_eq!(h.job_names(), vec![first.clone()]);

    // 03:01 comes due while the first run is still going
    h.advance(Duration::from_secs(60)).await;
    assert_eq!(h.job_names(), vec![first.clone()]);
    assert_eq!(h.status(&key).last_processed_time, Some(utc(2026, 5, 1, 3, 1, 0)));

    // Finishing does not retroactively run the skipped instant
    h.finish(&first, JobPhase::Succeeded);
    h.settle().await;
    assert_eq!(h.job_names(), vec![first.clone()]);

    h.advance(Duration::from_secs(60)).await;
    assert_eq!(
        h.job_names(),
        vec![first, job("minutely", utc(2026, 5, 1, 3, 2, 0))]
    );
}

#[tokio::test]
async fn replace_deletes_prior_active_child() {
    let mut h = Harness::at(utc(2026, 5, 1, 2, 59, 30));
    let key = h.apply(minutely(ConcurrencyPolicy::Replace));

    h.advance(Duration::from_secs(30)).await;
    h.advance(Duration::from_secs(60)).await;

    let second = job("minutely", utc(2026, 5, 1, 3, 1, 0));
    assert_eq!(h.job_names(), vec![second.clone()]);
    assert_eq!(h.active_names(&key), vec![second]);
    assert_eq!(
        h.recorder.reasons(),
        vec!["SuccessfulCreate", "SuccessfulDelete", "SuccessfulCreate"]
    );
}

#[tokio::test]
async fn allow_runs_overlap() {
    let mut h = Harness::at(utc(2026, 5, 1, 2, 59, 30));
    let key = h.apply(minutely(ConcurrencyPolicy::Allow));

    h.advance(Duration::from_secs(30)).await;
    h.advance(Duration::from_secs(60)).await;

    let expected = vec![
        job("minutely", utc(2026, 5, 1, 3, 0, 0)),
        job("minutely", utc(2026, 5, 1, 3, 1, 0)),
    ];
    assert_eq!(h.job_names(), expected.clone());
    assert_eq!(h.active_names(&key), expected);
}
