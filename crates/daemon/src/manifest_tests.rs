// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use cj_core::ConcurrencyPolicy;
use tempfile::tempdir;

const NIGHTLY: &str = r#"{
  "metadata": { "name": "nightly" },
  "spec": {
    "schedule": "0 3 * * *",
    "concurrencyPolicy": "Forbid",
    "startingDeadlineSeconds": 200,
    "jobTemplate": { "spec": { "command": ["backup"] } }
  }
}"#;

#[test]
fn missing_directory_is_empty() {
    let dir = tempdir().unwrap();
    assert!(load_dir(&dir.path().join("nope")).is_empty());
}

#[test]
fn loads_json_manifests_in_name_order() {
    let dir = tempdir().unwrap();
    std::fs::write(dir.path().join("b.json"), NIGHTLY.replace("nightly", "weekly")).unwrap();
    std::fs::write(dir.path().join("a.json"), NIGHTLY).unwrap();
    std::fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

    let records = load_dir(dir.path());

    let names: Vec<_> = records.iter().map(|r| r.metadata.name.as_str()).collect();
    assert_eq!(names, vec!["nightly", "weekly"]);
    let nightly = &records[0];
    assert_eq!(nightly.metadata.namespace, DEFAULT_NAMESPACE);
    assert_eq!(nightly.spec.concurrency_policy, ConcurrencyPolicy::Forbid);
    assert_eq!(nightly.spec.starting_deadline_seconds, Some(200));
}

#[yare::parameterized(
    not_json = { "schedule: daily" },
    no_name  = { r#"{"metadata": {}, "spec": {"schedule": "@daily", "jobTemplate": {}}}"# },
    no_spec  = { r#"{"metadata": {"name": "x"}}"# },
)]
fn bad_manifests_are_skipped(contents: &str) {
    let dir = tempdir().unwrap();
    std::fs::write(dir.path().join("bad.json"), contents).unwrap();
    std::fs::write(dir.path().join("good.json"), NIGHTLY).unwrap();

    let records = load_dir(dir.path());

    assert_eq!(records.len(), 1);
    assert_eq!(records[0].metadata.name, "nightly");
}
