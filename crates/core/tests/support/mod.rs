//! Shared test helpers for `dailytrack-core` integration tests.
//!
//! Provides a storage mock that records every write so tests can assert on
//! what reached durable storage, plus small record fixtures.

use std::sync::Arc;

use async_trait::async_trait;
use dailytrack_core::session::SessionStorage;
use dailytrack_domain::{ActivityRecord, Identity, Result as DomainResult, Role};
use parking_lot::Mutex;

/// Operation observed by [`RecordingStorage`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageOp {
    Set(String),
    Remove(String),
}

/// In-memory storage that keeps an ordered log of mutations.
#[derive(Default, Clone)]
pub struct RecordingStorage {
    values: Arc<Mutex<std::collections::HashMap<String, String>>>,
    ops: Arc<Mutex<Vec<StorageOp>>>,
}

impl RecordingStorage {
    pub fn ops(&self) -> Vec<StorageOp> {
        self.ops.lock().clone()
    }

    pub fn value(&self, key: &str) -> Option<String> {
        self.values.lock().get(key).cloned()
    }
}

#[async_trait]
impl SessionStorage for RecordingStorage {
    async fn get(&self, key: &str) -> DomainResult<Option<String>> {
        Ok(self.values.lock().get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> DomainResult<()> {
        self.values.lock().insert(key.to_string(), value.to_string());
        self.ops.lock().push(StorageOp::Set(key.to_string()));
        Ok(())
    }

    async fn remove(&self, key: &str) -> DomainResult<()> {
        self.values.lock().remove(key);
        self.ops.lock().push(StorageOp::Remove(key.to_string()));
        Ok(())
    }
}

pub fn identity(email: &str, role: Role) -> Identity {
    Identity { id: email.to_string(), email: email.to_string(), name: None, role }
}

/// Record fixture: email, pod, hours and submission timestamp.
pub fn record(email: &str, pod: &str, hours: f64, submitted_at: &str) -> ActivityRecord {
    ActivityRecord {
        email: Some(email.to_string()),
        pod_name: Some(pod.to_string()),
        dedicated_hours: Some(hours),
        submitted_at: Some(submitted_at.to_string()),
        ..ActivityRecord::default()
    }
}
