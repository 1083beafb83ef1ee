// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! User-visible event recorders

mod log;

pub use self::log::LogEventRecorder;

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
mod fake;
#[cfg(any(test, feature = "test-support"))]
pub use fake::{FakeEventRecorder, RecordedEvent};

use async_trait::async_trait;
use cj_core::{EventType, RecordKey};

/// Sink for events attached to a record.
///
/// Recording never fails the caller; a recorder that cannot deliver drops
/// the event.
#[async_trait]
pub trait EventRecorder: Clone + Send + Sync + 'static {
    async fn record(&self, key: &RecordKey, event_type: EventType, reason: &str, message: &str);
}
