// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Record manifests: one JSON-encoded record per `*.json` file.

use std::path::Path;

use cj_core::CronJob;
use tracing::warn;

/// Namespace given to manifests that leave it blank
pub const DEFAULT_NAMESPACE: &str = "default";

/// Read every manifest in `dir`, ordered by file name.
///
/// A missing directory yields no records. Unreadable or malformed files are
/// logged and skipped so one bad manifest does not block the others.
pub fn load_dir(dir: &Path) -> Vec<CronJob> {
    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Vec::new(),
        Err(e) => {
            warn!(dir = %dir.display(), error = %e, "cannot read manifest directory");
            return Vec::new();
        }
    };

    let mut paths: Vec<_> = entries
        .filter_map(Result::ok)
        .map(|entry| entry.path())
        .filter(|path| path.extension().is_some_and(|ext| ext == "json"))
        .collect();
    paths.sort();

    paths.iter().filter_map(|path| load_file(path)).collect()
}

fn load_file(path: &Path) -> Option<CronJob> {
    let raw = match std::fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "cannot read manifest");
            return None;
        }
    };
    let mut record: CronJob = match serde_json::from_str(&raw) {
        Ok(record) => record,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "malformed manifest");
            return None;
        }
    };
    if record.metadata.name.is_empty() {
        warn!(path = %path.display(), "manifest has no metadata.name");
        return None;
    }
    if record.metadata.namespace.is_empty() {
        record.metadata.namespace = DEFAULT_NAMESPACE.to_string();
    }
    Some(record)
}

#[cfg(test)]
#[path = "manifest_tests.rs"]
mod tests;
