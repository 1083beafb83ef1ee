// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Object metadata shared by records and jobs.
//!
//! Every stored object carries a name, namespace, server-assigned uid, a
//! resource version that changes on every write, and the owner references
//! that tie a child job back to the record that created it.

use crate::namespace::RecordKey;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

crate::define_id! {
    /// Server-assigned unique id of a stored object.
    ///
    /// Unlike the name, a uid is never reused: a record deleted and recreated
    /// under the same name gets a new uid, so its old jobs are not adopted.
    #[derive(Default)]
    pub struct Uid;
}

/// Metadata common to every stored object
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectMeta {
    pub name: String,
    #[serde(default)]
    pub namespace: String,
    #[serde(default)]
    pub uid: Uid,
    /// Optimistic-concurrency token, bumped by the store on every write
    #[serde(default)]
    pub resource_version: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub creation_timestamp: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub labels: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub annotations: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub owner_references: Vec<OwnerReference>,
}

impl ObjectMeta {
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            namespace: namespace.into(),
            ..Self::default()
        }
    }

    pub fn key(&self) -> RecordKey {
        RecordKey::new(&self.namespace, &self.name)
    }

    /// The owner reference marked as controller, if any
    pub fn controller(&self) -> Option<&OwnerReference> {
        self.owner_references.iter().find(|o| o.controller)
    }

    /// True when the controlling owner has the given uid
    pub fn is_controlled_by(&self, uid: &Uid) -> bool {
        self.controller().is_some_and(|o| &o.uid == uid)
    }
}

/// Back-pointer from a child object to its owner
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OwnerReference {
    pub kind: String,
    pub name: String,
    pub uid: Uid,
    /// Exactly one owner reference per object may be the controller
    #[serde(default)]
    pub controller: bool,
}

/// Pointer to a specific object revision, used for the active-jobs list
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectReference {
    pub kind: String,
    #[serde(default)]
    pub namespace: String,
    pub name: String,
    #[serde(default)]
    pub uid: Uid,
    #[serde(default)]
    pub resource_version: u64,
}

impl ObjectReference {
    pub fn key(&self) -> RecordKey {
        RecordKey::new(&self.namespace, &self.name)
    }
}

#[cfg(test)]
#[path = "meta_tests.rs"]
mod tests;
