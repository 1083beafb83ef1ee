// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Namespace-scoped record keys.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Build a namespace-scoped key from namespace and name.
///
/// When namespace is empty, returns the bare name.
/// Otherwise returns `"{namespace}/{name}"`.
pub fn scoped_name(namespace: &str, name: &str) -> String {
    if namespace.is_empty() {
        name.to_string()
    } else {
        format!("{}/{}", namespace, name)
    }
}

/// Parse a namespace-scoped key into `(namespace, name)`.
///
/// Returns `("", key)` when no slash is present.
pub fn split_scoped_name(scoped: &str) -> (&str, &str) {
    match scoped.split_once('/') {
        Some((ns, name)) => (ns, name),
        None => ("", scoped),
    }
}

/// Identity of a cron job record: the unit of reconciliation.
///
/// Work queues, timers and log fields all address a record by this key.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RecordKey {
    #[serde(default)]
    pub namespace: String,
    pub name: String,
}

impl RecordKey {
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            name: name.into(),
        }
    }

    /// Parse `namespace/name` or a bare `name`.
    pub fn parse(scoped: &str) -> Self {
        let (namespace, name) = split_scoped_name(scoped);
        Self::new(namespace, name)
    }
}

impl fmt::Display for RecordKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&scoped_name(&self.namespace, &self.name))
    }
}

#[cfg(test)]
#[path = "namespace_tests.rs"]
mod tests;
