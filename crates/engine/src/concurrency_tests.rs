// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use cj_core::Uid;

fn running(name: &str) -> ObjectReference {
    ObjectReference {
        kind: "Job".to_string(),
        namespace: "default".to_string(),
        name: name.to_string(),
        uid: Uid::new(format!("uid-{name}")),
        resource_version: 1,
    }
}

#[yare::parameterized(
    allow_idle     = { ConcurrencyPolicy::Allow, 0, Admission::CreateNew },
    allow_busy     = { ConcurrencyPolicy::Allow, 2, Admission::CreateNew },
    forbid_idle    = { ConcurrencyPolicy::Forbid, 0, Admission::CreateNew },
    forbid_busy    = { ConcurrencyPolicy::Forbid, 1, Admission::Skip(SkipReason::ActiveJobsForbidden) },
    replace_idle   = { ConcurrencyPolicy::Replace, 0, Admission::CreateNew },
)]
fn policy_decisions(policy: ConcurrencyPolicy, active: usize, expected: Admission) {
    let active: Vec<_> = (0..active).map(|i| running(&format!("j{i}"))).collect();
    assert_eq!(decide(policy, &active, false), expected);
}

#[test]
fn replace_names_every_active_job() {
    let active = vec![running("a"), running("b")];
    assert_eq!(
        decide(ConcurrencyPolicy::Replace, &active, false),
        Admission::ReplaceThenCreate(active)
    );
}

#[yare::parameterized(
    allow   = { ConcurrencyPolicy::Allow },
    forbid  = { ConcurrencyPolicy::Forbid },
    replace = { ConcurrencyPolicy::Replace },
)]
fn suspend_always_skips(policy: ConcurrencyPolicy) {
    for active in [vec![], vec![running("a")]] {
        assert_eq!(
            decide(policy, &active, true),
            Admission::Skip(SkipReason::Suspended)
        );
    }
}
