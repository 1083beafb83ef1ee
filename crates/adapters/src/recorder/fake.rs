// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fake event recorder for testing
#![cfg_attr(coverage_nightly, coverage(off))]

use super::EventRecorder;
use async_trait::async_trait;
use cj_core::{EventType, RecordKey};
use parking_lot::Mutex;
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedEvent {
    pub key: RecordKey,
    pub event_type: EventType,
    pub reason: String,
    pub message: String,
}

#[derive(Clone, Default)]
pub struct FakeEventRecorder {
    events: Arc<Mutex<Vec<RecordedEvent>>>,
}

impl FakeEventRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<RecordedEvent> {
        self.events.lock().clone()
    }

    /// Reasons of all recorded events, in order
    pub fn reasons(&self) -> Vec<String> {
        self.events.lock().iter().map(|e| e.reason.clone()).collect()
    }
}

#[async_trait]
impl EventRecorder for FakeEventRecorder {
    async fn record(&self, key: &RecordKey, event_type: EventType, reason: &str, message: &str) {
        self.events.lock().push(RecordedEvent {
            key: key.clone(),
            event_type,
            reason: reason.to_string(),
            message: message.to_string(),
        });
    }
}
