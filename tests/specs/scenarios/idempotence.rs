//! Repeated, reordered, or partially failed passes converge on the same state.

use crate::prelude::*;
use similar_asserts::assert_eq;

fn nightly() -> CronJob {
    cron_job("nightly", "0 3 * * *", utc(2026, 5, 1, 0, 0, 0))
}

#[tokio::test]
async fn duplicate_triggers_match_a_clean_run() {
    let now = utc(2026, 5, 1, 3, 0, 30);

    let mut clean = Harness::at(now);
    let clean_key = clean.apply(nightly());
    clean.settle().await;

    let mut noisy = Harness::at(now);
    let key = noisy.apply(nightly());
    noisy.controller.handle_event(&cj_core::Event::RecordDeleted { key: key.clone() });
    noisy.controller.handle_event(&cj_core::Event::JobChanged {
        owner: key.clone(),
        job: "unrelated".to_string(),
    });
    for _ in 0..3 {
        noisy.controller.enqueue(key.clone());
    }
    noisy.settle().await;
    for _ in 0..3 {
        noisy.controller.enqueue(key.clone());
        noisy.settle().await;
    }

    assert_eq!(noisy.job_names(), clean.job_names());
    assert_eq!(noisy.job_names(), vec![job("nightly", utc(2026, 5, 1, 3, 0, 0))]);
    assert_eq!(noisy.status(&key), clean.status(&clean_key));
    assert_eq!(noisy.recorder.reasons(), vec!["SuccessfulCreate"]);
}

#[tokio::test]
async fn lost_status_write_does_not_duplicate() {
    let mut h = Harness::at(utc(2026, 5, 1, 3, 0, 30));
    let key = h.apply(nightly());
    h.settle().await;
    let instant = utc(2026, 5, 1, 3, 0, 0);
    assert_eq!(h.status(&key).last_schedule_time, Some(instant));

    // The job exists but the status never landed
    let version = h.cluster.get_record(&key).unwrap().metadata.resource_version;
    h.cluster
        .update_status(&key, version, CronJobStatus::default())
        .unwrap();
    h.controller.enqueue(key.clone());
    h.settle().await;

    assert_eq!(h.job_names(), vec![job("nightly", instant)]);
    let status = h.status(&key);
    assert_eq!(status.last_schedule_time, Some(instant));
    assert_eq!(h.active_names(&key), vec![job("nightly", instant)]);
    assert_eq!(h.recorder.reasons(), vec!["SuccessfulCreate"]);
}

#[tokio::test]
async fn last_schedule_time_only_moves_forward() {
    let mut h = Harness::at(utc(2026, 5, 1, 2, 59, 30));
    let key = h.apply(cron_job("minutely", "* * * * *", utc(2026, 5, 1, 2, 59, 30)));
    h.settle().await;

    let mut seen = Vec::new();
    let mut step = Duration::from_secs(30);
    for _ in 0..5 {
        h.advance(step).await;
        seen.push(h.status(&key).last_schedule_time);
        // Extra passes in between must not move it
        h.controller.enqueue(key.clone());
        h.settle().await;
        seen.push(h.status(&key).last_schedule_time);
        step = Duration::from_secs(60);
    }

    assert!(seen.windows(2).all(|w| w[0] <= w[1]), "went backwards: {seen:?}");
    assert_eq!(seen.last().copied().flatten(), Some(utc(2026, 5, 1, 3, 4, 0)));
    assert_eq!(h.job_names().len(), 5);
}
