// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Recorder that writes events to the daemon log.

use super::EventRecorder;
use async_trait::async_trait;
use cj_core::{EventType, RecordKey};

#[derive(Clone, Copy, Debug, Default)]
pub struct LogEventRecorder;

impl LogEventRecorder {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl EventRecorder for LogEventRecorder {
    async fn record(&self, key: &RecordKey, event_type: EventType, reason: &str, message: &str) {
        match event_type {
            EventType::Normal => tracing::info!(cronjob = %key, reason, "{message}"),
            EventType::Warning => tracing::warn!(cronjob = %key, reason, "{message}"),
        }
    }
}
