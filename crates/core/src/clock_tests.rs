// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use chrono::TimeZone;

#[test]
fn fake_clock_advance_moves_both_time_bases() {
    let clock = FakeClock::new();
    let start_instant = clock.now();
    let start_utc = clock.utc_now();

    clock.advance(Duration::from_secs(90));

    assert_eq!(clock.now() - start_instant, Duration::from_secs(90));
    assert_eq!(clock.utc_now() - start_utc, chrono::Duration::seconds(90));
}

#[test]
fn fake_clock_set_utc_leaves_instant_alone() {
    let clock = FakeClock::new();
    let instant = clock.now();
    let target = Utc.with_ymd_and_hms(2030, 1, 1, 0, 0, 0).unwrap();

    clock.set_utc(target);

    assert_eq!(clock.utc_now(), target);
    assert_eq!(clock.now(), instant);
}

#[test]
fn fake_clock_clones_share_state() {
    let clock = FakeClock::new();
    let other = clock.clone();
    clock.advance(Duration::from_secs(5));
    assert_eq!(clock.utc_now(), other.utc_now());
}

#[test]
fn system_clock_is_after_epoch() {
    assert!(SystemClock.utc_now().timestamp() > 0);
}
