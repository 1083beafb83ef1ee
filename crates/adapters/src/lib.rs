// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]
// Enable coverage(off) attribute for excluding test infrastructure
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! Adapters for the controller's external collaborators: the record store,
//! the child job primitive, and the event sink.

pub mod cluster;
pub mod job;
pub mod record;
pub mod recorder;
pub mod traced;

pub use cluster::Cluster;
pub use job::{GatewayError, JobGateway, StateJobGateway};
pub use record::{RecordError, RecordStore, StateRecordStore};
pub use recorder::{EventRecorder, LogEventRecorder};
pub use traced::{TracedJobGateway, TracedRecordStore};

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
pub use job::{FakeJobGateway, JobCall};
#[cfg(any(test, feature = "test-support"))]
pub use record::{FakeRecordStore, RecordCall};
#[cfg(any(test, feature = "test-support"))]
pub use recorder::{FakeEventRecorder, RecordedEvent};
