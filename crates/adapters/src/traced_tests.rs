// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::job::{FakeJobGateway, JobCall};
use crate::record::FakeRecordStore;
use cj_core::test_support::{cron_job, owned_job, utc};
use cj_core::JobPhase;
use serial_test::{parallel, serial};
use std::sync::{Arc, Mutex};
use tracing_subscriber::fmt::MakeWriter;

/// A writer that captures log output for testing
#[derive(Clone, Default)]
struct CapturedLogs {
    logs: Arc<Mutex<Vec<u8>>>,
}

impl CapturedLogs {
    fn contents(&self) -> String {
        let logs = self.logs.lock().unwrap();
        String::from_utf8_lossy(&logs).to_string()
    }
}

impl std::io::Write for CapturedLogs {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.logs.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for CapturedLogs {
    type Writer = CapturedLogs;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

/// Run a test with captured tracing output
fn with_tracing<F, Fut>(f: F) -> (String, Fut::Output)
where
    F: FnOnce() -> Fut,
    Fut: std::future::Future,
{
    let logs = CapturedLogs::default();
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::TRACE)
        .with_writer(logs.clone())
        .with_ansi(false)
        .without_time()
        .finish();

    let result = tracing::subscriber::with_default(subscriber, || {
        tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap()
            .block_on(f())
    });

    (logs.contents(), result)
}

fn assert_log(logs: &str, label: &str, expected: &str) {
    assert!(logs.contains(expected), "Should log {label}. Logs:\n{logs}");
}

#[test]
#[serial(tracing)]
fn traced_create_logs_span_and_timing() {
    let (logs, result) = with_tracing(|| async {
        let traced = TracedJobGateway::new(FakeJobGateway::new());
        let record = cron_job("nightly", "0 3 * * *", utc(2026, 5, 1, 0, 0, 0));
        traced
            .create(owned_job(&record, utc(2026, 5, 1, 3, 0, 0), JobPhase::Running))
            .await
    });

    assert!(result.is_ok());
    assert_log(&logs, "span name", "job.create");
    assert_log(&logs, "job key", "default/nightly-1777604400");
    assert_log(&logs, "completion", "job created");
    assert_log(&logs, "timing", "elapsed_ms");
}

#[test]
#[serial(tracing)]
fn traced_create_logs_duplicate_as_info() {
    let (logs, result) = with_tracing(|| async {
        let traced = TracedJobGateway::new(FakeJobGateway::new());
        let record = cron_job("nightly", "0 3 * * *", utc(2026, 5, 1, 0, 0, 0));
        let job = owned_job(&record, utc(2026, 5, 1, 3, 0, 0), JobPhase::Running);
        let _ = traced.create(job.clone()).await;
        traced.create(job).await
    });

    assert!(matches!(result, Err(GatewayError::AlreadyExists(_))));
    assert_log(&logs, "duplicate", "job already exists");
    assert!(!logs.contains("create failed"), "Logs:\n{logs}");
}

#[test]
#[serial(tracing)]
fn traced_status_conflict_is_not_an_error() {
    let (logs, result) = with_tracing(|| async {
        let fake = FakeRecordStore::new();
        let record = cron_job("nightly", "0 3 * * *", utc(2026, 5, 1, 0, 0, 0));
        let key = record.metadata.key();
        fake.insert(record);
        let traced = TracedRecordStore::new(fake);
        traced.update_status(&key, 7, CronJobStatus::default()).await
    });

    assert!(matches!(result, Err(RecordError::Conflict { .. })));
    assert_log(&logs, "span name", "record.update_status");
    assert_log(&logs, "race", "status write lost a race");
}

#[test]
#[serial(tracing)]
fn traced_delete_logs_failure_as_warning() {
    let (logs, result) = with_tracing(|| async {
        let fake = FakeJobGateway::new();
        let record = cron_job("nightly", "0 3 * * *", utc(2026, 5, 1, 0, 0, 0));
        let job = owned_job(&record, utc(2026, 5, 1, 3, 0, 0), JobPhase::Succeeded);
        fake.insert(job.clone());
        fake.fail_deletes_of(job.metadata.key());
        TracedJobGateway::new(fake).delete(&job.reference()).await
    });

    assert!(result.is_err());
    assert_log(&logs, "span name", "job.delete");
    assert_log(&logs, "warning", "delete failed");
}

#[tokio::test]
#[parallel(tracing)]
async fn traced_gateway_delegates_to_inner() {
    let fake = FakeJobGateway::new();
    let traced = TracedJobGateway::new(fake.clone());
    let record = cron_job("nightly", "0 3 * * *", utc(2026, 5, 1, 0, 0, 0));
    let job = owned_job(&record, utc(2026, 5, 1, 3, 0, 0), JobPhase::Running);

    traced.create(job.clone()).await.unwrap();
    let listed = traced.list(&record.metadata).await.unwrap();
    traced.delete(&job.reference()).await.unwrap();

    assert_eq!(listed, vec![job.clone()]);
    assert_eq!(
        fake.calls(),
        vec![
            JobCall::Create { job: job.clone() },
            JobCall::List {
                owner: record.metadata.key()
            },
            JobCall::Delete {
                job: job.metadata.key()
            },
        ]
    );
}

#[tokio::test]
#[parallel(tracing)]
async fn traced_record_store_delegates_get() {
    let fake = FakeRecordStore::new();
    let record = cron_job("nightly", "0 3 * * *", utc(2026, 5, 1, 0, 0, 0));
    fake.insert(record.clone());
    let traced = TracedRecordStore::new(fake);

    assert_eq!(traced.get(&record.metadata.key()).await.unwrap(), Some(record));
}
