// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use cj_core::{Clock, FakeClock, RecordKey};

fn requeue(name: &str) -> TimerId {
    TimerId::requeue(&RecordKey::new("default", name))
}

fn fired_ids(events: &[Event]) -> Vec<String> {
    events
        .iter()
        .filter_map(|e| match e {
            Event::TimerStart { id } => Some(id.to_string()),
            _ => None,
        })
        .collect()
}

#[test]
fn timer_fires_once_at_deadline() {
    let clock = FakeClock::new();
    let mut scheduler = Scheduler::new();

    scheduler.set_timer(requeue("nightly"), Duration::from_secs(10), clock.now());
    assert_eq!(
        scheduler.deadline(&requeue("nightly")),
        Some(clock.now() + Duration::from_secs(10))
    );

    clock.advance(Duration::from_secs(5));
    assert!(scheduler.fired_timers(clock.now()).is_empty());

    clock.advance(Duration::from_secs(5));
    let events = scheduler.fired_timers(clock.now());
    assert_eq!(fired_ids(&events), vec!["requeue:default/nightly"]);
    assert_eq!(events[0].record_key(), Some(RecordKey::new("default", "nightly")));
    assert!(scheduler.is_empty());

    clock.advance(Duration::from_secs(60));
    assert!(scheduler.fired_timers(clock.now()).is_empty());
}

#[test]
fn cancelled_timer_never_fires() {
    let clock = FakeClock::new();
    let mut scheduler = Scheduler::new();

    scheduler.set_timer(requeue("nightly"), Duration::from_secs(10), clock.now());
    scheduler.cancel_timer(&requeue("nightly"));

    clock.advance(Duration::from_secs(15));
    assert!(scheduler.fired_timers(clock.now()).is_empty());
    assert!(!scheduler.has_timers());
}

#[test]
fn setting_again_replaces_deadline() {
    let clock = FakeClock::new();
    let mut scheduler = Scheduler::new();

    scheduler.set_timer(requeue("nightly"), Duration::from_secs(10), clock.now());
    scheduler.set_timer(requeue("nightly"), Duration::from_secs(30), clock.now());
    assert_eq!(scheduler.len(), 1);

    clock.advance(Duration::from_secs(11));
    assert!(scheduler.fired_timers(clock.now()).is_empty());

    clock.advance(Duration::from_secs(20));
    assert_eq!(scheduler.fired_timers(clock.now()).len(), 1);
}

#[test]
fn fired_timers_are_ordered_and_only_expired() {
    let clock = FakeClock::new();
    let mut scheduler = Scheduler::new();

    scheduler.set_timer(requeue("c"), Duration::from_secs(9), clock.now());
    scheduler.set_timer(requeue("a"), Duration::from_secs(3), clock.now());
    scheduler.set_timer(requeue("b"), Duration::from_secs(6), clock.now());
    scheduler.set_timer(requeue("later"), Duration::from_secs(60), clock.now());

    clock.advance(Duration::from_secs(10));
    let events = scheduler.fired_timers(clock.now());

    assert_eq!(
        fired_ids(&events),
        vec![
            "requeue:default/a",
            "requeue:default/b",
            "requeue:default/c"
        ]
    );
    assert_eq!(scheduler.len(), 1);
    assert_eq!(
        scheduler.next_deadline(),
        Some(clock.now() + Duration::from_secs(50))
    );
}

#[test]
fn empty_scheduler_has_no_deadline() {
    let scheduler = Scheduler::new();
    assert!(!scheduler.has_timers());
    assert!(scheduler.next_deadline().is_none());
}
