// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Timer identifier type for tracking scheduled timers.
//!
//! Each record owns at most one requeue timer; setting it again replaces
//! the previous deadline.

use crate::namespace::RecordKey;
use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;

const REQUEUE_PREFIX: &str = "requeue:";

/// Unique identifier for a timer instance.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TimerId(pub String);

impl TimerId {
    /// Create a new TimerId from any string-like value.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the string value of this TimerId.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Timer ID for the next reconcile of a record.
    pub fn requeue(key: &RecordKey) -> Self {
        Self::new(format!("{}{}", REQUEUE_PREFIX, key))
    }

    /// Returns true if this is a requeue timer.
    pub fn is_requeue(&self) -> bool {
        self.0.starts_with(REQUEUE_PREFIX)
    }

    /// The record a requeue timer belongs to.
    pub fn record_key(&self) -> Option<RecordKey> {
        self.0.strip_prefix(REQUEUE_PREFIX).map(RecordKey::parse)
    }
}

impl fmt::Display for TimerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for TimerId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for TimerId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl PartialEq<str> for TimerId {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for TimerId {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

impl Borrow<str> for TimerId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
#[path = "timer_tests.rs"]
mod tests;
