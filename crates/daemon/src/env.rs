// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Centralized environment variable access for the daemon crate.

use std::path::PathBuf;
use std::time::Duration;

use crate::lifecycle::LifecycleError;

/// Resolve state directory: CJ_STATE_DIR > XDG_STATE_HOME/cj > ~/.local/state/cj
pub fn state_dir() -> Result<PathBuf, LifecycleError> {
    if let Ok(dir) = std::env::var("CJ_STATE_DIR") {
        return Ok(PathBuf::from(dir));
    }
    if let Ok(xdg) = std::env::var("XDG_STATE_HOME") {
        return Ok(PathBuf::from(xdg).join("cj"));
    }
    let home = std::env::var("HOME").map_err(|_| LifecycleError::NoStateDir)?;
    Ok(PathBuf::from(home).join(".local/state/cj"))
}

/// Worker pool size override
pub fn workers() -> Option<usize> {
    parse_var("CJ_WORKERS").filter(|n: &usize| *n > 0)
}

/// Timer check interval override
pub fn timer_check_ms() -> Option<Duration> {
    parse_var("CJ_TIMER_CHECK_MS").map(Duration::from_millis)
}

/// Snapshot interval override
pub fn checkpoint_secs() -> Option<Duration> {
    parse_var("CJ_CHECKPOINT_SECS").map(Duration::from_secs)
}

fn parse_var<T: std::str::FromStr>(name: &str) -> Option<T> {
    std::env::var(name).ok().and_then(|s| s.trim().parse().ok())
}

#[cfg(test)]
#[path = "env_tests.rs"]
mod tests;
