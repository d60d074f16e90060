// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Local reference backend.
//!
//! The ledger is an append-only JSONL log of applied mutations. Each entry
//! records the idempotency token and the post-state of every resource it
//! touched, so reopening the file rebuilds the same state and a replayed
//! token returns the original result without applying anything.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use futures_util::future::BoxFuture;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use syncq_core::{is_temp_id, jsonl, BatchAction, Operation, ResourceType, ServerRecord};

use super::api::{ApiError, ApiResult, MutationApi};

/// A resource as the ledger knows it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerResource {
    pub record: ServerRecord,
    #[serde(default)]
    pub deleted: bool,
    #[serde(default)]
    pub completed: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct LedgerEntry {
    token: String,
    operation: Operation,
    resources: Vec<LedgerResource>,
}

#[derive(Default)]
struct LedgerState {
    /// Records returned for each token, in call order.
    applied: HashMap<String, Vec<ServerRecord>>,
    resources: HashMap<String, LedgerResource>,
    entries: usize,
}

impl LedgerState {
    fn apply_entry(&mut self, entry: &LedgerEntry) {
        let records = entry
            .resources
            .iter()
            .map(|r| r.record.clone())
            .collect();
        self.applied.insert(entry.token.clone(), records);
        for resource in &entry.resources {
            self.resources
                .insert(resource.record.id.clone(), resource.clone());
        }
        self.entries += 1;
    }

    fn existing(&self, resource_type: ResourceType, id: &str) -> ApiResult<LedgerResource> {
        if is_temp_id(id) {
            return Err(ApiError::Rejected(format!(
                "{} is a temporary id that was never reconciled",
                id
            )));
        }
        match self.resources.get(id) {
            Some(r) if r.record.resource_type == resource_type => Ok(r.clone()),
            _ => Err(ApiError::NotFound(format!("{} {}", resource_type, id))),
        }
    }
}

/// JSONL-backed [`MutationApi`] with token deduplication.
pub struct Ledger {
    /// `None` for an in-memory ledger.
    path: Option<PathBuf>,
    state: Mutex<LedgerState>,
}

impl Ledger {
    /// Opens or creates a ledger, replaying existing entries.
    pub fn open(path: &Path) -> syncq_core::Result<Self> {
        let mut state = LedgerState::default();
        let entries: Vec<LedgerEntry> = jsonl::read_all(path)?;
        for entry in &entries {
            state.apply_entry(entry);
        }
        tracing::debug!(
            "opened ledger {} ({} entries)",
            path.display(),
            state.entries
        );

        Ok(Ledger {
            path: Some(path.to_path_buf()),
            state: Mutex::new(state),
        })
    }

    /// Creates a ledger that is never written to disk.
    pub fn in_memory() -> Self {
        Ledger {
            path: None,
            state: Mutex::new(LedgerState::default()),
        }
    }

    /// Looks up a resource by server id.
    pub fn resource(&self, id: &str) -> Option<LedgerResource> {
        self.lock().resources.get(id).cloned()
    }

    /// All resources, sorted by id.
    pub fn resources(&self) -> Vec<LedgerResource> {
        let mut resources: Vec<LedgerResource> = self.lock().resources.values().cloned().collect();
        resources.sort_by(|a, b| a.record.id.cmp(&b.record.id));
        resources
    }

    /// Number of mutations applied (replays not counted).
    pub fn applied_count(&self) -> usize {
        self.lock().entries
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, LedgerState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Runs `mutate` once per token.
    ///
    /// A token seen before returns its original records; otherwise the
    /// resulting resources are persisted, then applied in memory.
    fn commit<F>(&self, token: &str, operation: Operation, mutate: F) -> ApiResult<Vec<ServerRecord>>
    where
        F: FnOnce(&LedgerState) -> ApiResult<Vec<LedgerResource>>,
    {
        let mut state = self.lock();
        if let Some(records) = state.applied.get(token) {
            tracing::debug!("ledger replay of token {}", token);
            return Ok(records.clone());
        }

        let entry = LedgerEntry {
            token: token.to_string(),
            operation,
            resources: mutate(&state)?,
        };
        if let Some(path) = &self.path {
            jsonl::append(path, &entry)
                .map_err(|e| ApiError::Server(format!("ledger write failed: {}", e)))?;
        }
        state.apply_entry(&entry);
        Ok(entry.resources.into_iter().map(|r| r.record).collect())
    }

    fn commit_one<F>(&self, token: &str, operation: Operation, mutate: F) -> ApiResult<ServerRecord>
    where
        F: FnOnce(&LedgerState) -> ApiResult<LedgerResource>,
    {
        self.commit(token, operation, |state| mutate(state).map(|r| vec![r]))?
            .into_iter()
            .next()
            .ok_or_else(|| ApiError::Server(format!("token {} has no record", token)))
    }

    fn set_flags(
        &self,
        operation: Operation,
        resource_type: ResourceType,
        resource_id: &str,
        token: &str,
    ) -> ApiResult<ServerRecord> {
        self.commit_one(token, operation, |state| {
            let mut resource = state.existing(resource_type, resource_id)?;
            apply_flag(&mut resource, operation)?;
            Ok(resource)
        })
    }
}

fn apply_flag(resource: &mut LedgerResource, operation: Operation) -> ApiResult<()> {
    match operation {
        Operation::Delete | Operation::BatchDelete => resource.deleted = true,
        Operation::Restore | Operation::BatchRestore => resource.deleted = false,
        Operation::Complete => {
            if resource.deleted {
                return Err(ApiError::Rejected(format!(
                    "{} is deleted",
                    resource.record.id
                )));
            }
            resource.completed = true;
        }
        Operation::Create | Operation::Update => {}
    }
    Ok(())
}

/// Shallow-merges the keys of `updates` into `data`.
fn merge(data: &mut Value, updates: &Value) {
    match (data, updates) {
        (Value::Object(target), Value::Object(source)) => {
            for (key, value) in source {
                target.insert(key.clone(), value.clone());
            }
        }
        (data, updates) => *data = updates.clone(),
    }
}

fn ready<'a, T: Send + 'a>(value: T) -> BoxFuture<'a, T> {
    Box::pin(std::future::ready(value))
}

impl MutationApi for Ledger {
    fn create<'a>(
        &'a self,
        resource_type: ResourceType,
        data: &'a Value,
        token: &'a str,
    ) -> BoxFuture<'a, ApiResult<ServerRecord>> {
        ready(self.commit_one(token, Operation::Create, |_| {
            Ok(LedgerResource {
                record: ServerRecord {
                    id: Uuid::new_v4().to_string(),
                    resource_type,
                    data: data.clone(),
                },
                deleted: false,
                completed: false,
            })
        }))
    }

    fn update<'a>(
        &'a self,
        resource_type: ResourceType,
        resource_id: &'a str,
        updates: &'a Value,
        token: &'a str,
    ) -> BoxFuture<'a, ApiResult<ServerRecord>> {
        ready(self.commit_one(token, Operation::Update, |state| {
            let mut resource = state.existing(resource_type, resource_id)?;
            if resource.deleted {
                return Err(ApiError::Rejected(format!("{} is deleted", resource_id)));
            }
            merge(&mut resource.record.data, updates);
            Ok(resource)
        }))
    }

    fn delete<'a>(
        &'a self,
        resource_type: ResourceType,
        resource_id: &'a str,
        token: &'a str,
    ) -> BoxFuture<'a, ApiResult<ServerRecord>> {
        ready(self.set_flags(Operation::Delete, resource_type, resource_id, token))
    }

    fn restore<'a>(
        &'a self,
        resource_type: ResourceType,
        resource_id: &'a str,
        token: &'a str,
    ) -> BoxFuture<'a, ApiResult<ServerRecord>> {
        ready(self.set_flags(Operation::Restore, resource_type, resource_id, token))
    }

    fn complete<'a>(
        &'a self,
        resource_type: ResourceType,
        resource_id: &'a str,
        token: &'a str,
    ) -> BoxFuture<'a, ApiResult<ServerRecord>> {
        ready(self.set_flags(Operation::Complete, resource_type, resource_id, token))
    }

    fn batch<'a>(
        &'a self,
        resource_type: ResourceType,
        action: BatchAction,
        items: &'a [String],
        token: &'a str,
    ) -> BoxFuture<'a, ApiResult<Vec<ServerRecord>>> {
        let operation = match action {
            BatchAction::Delete => Operation::BatchDelete,
            BatchAction::Restore => Operation::BatchRestore,
        };
        // All items must exist before anything is applied
        ready(self.commit(token, operation, |state| {
            items
                .iter()
                .map(|id| {
                    let mut resource = state.existing(resource_type, id)?;
                    apply_flag(&mut resource, operation)?;
                    Ok(resource)
                })
                .collect()
        }))
    }
}
