// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Mutation API contract consumed by the sync manager.
//!
//! Every call carries an idempotency token (the action id). Implementations
//! must treat a repeated token as a replay of the same mutation and hand back
//! the original result instead of applying it twice.

use futures_util::future::BoxFuture;
use serde_json::Value;

use syncq_core::{ActionPayload, BatchAction, OfflineAction, ResourceType, ServerRecord};

/// Error type for backend mutation calls.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ApiError {
    /// The backend could not be reached.
    #[error("network error: {0}")]
    Network(String),

    /// The backend failed while handling the call.
    #[error("server error: {0}")]
    Server(String),

    /// The backend refused the mutation.
    #[error("rejected: {0}")]
    Rejected(String),

    /// The targeted resource does not exist.
    #[error("resource not found: {0}")]
    NotFound(String),

    /// No answer within the per-call deadline.
    #[error("timed out after {0}ms")]
    Timeout(u64),
}

/// Result type for backend mutation calls.
pub type ApiResult<T> = Result<T, ApiError>;

/// Backend mutations, one method per operation kind.
pub trait MutationApi: Send + Sync {
    /// Create a resource.
    fn create<'a>(
        &'a self,
        resource_type: ResourceType,
        data: &'a Value,
        token: &'a str,
    ) -> BoxFuture<'a, ApiResult<ServerRecord>>;

    /// Apply partial updates to a resource.
    fn update<'a>(
        &'a self,
        resource_type: ResourceType,
        resource_id: &'a str,
        updates: &'a Value,
        token: &'a str,
    ) -> BoxFuture<'a, ApiResult<ServerRecord>>;

    /// Soft-delete a resource.
    fn delete<'a>(
        &'a self,
        resource_type: ResourceType,
        resource_id: &'a str,
        token: &'a str,
    ) -> BoxFuture<'a, ApiResult<ServerRecord>>;

    /// Restore a soft-deleted resource.
    fn restore<'a>(
        &'a self,
        resource_type: ResourceType,
        resource_id: &'a str,
        token: &'a str,
    ) -> BoxFuture<'a, ApiResult<ServerRecord>>;

    /// Mark a resource completed.
    fn complete<'a>(
        &'a self,
        resource_type: ResourceType,
        resource_id: &'a str,
        token: &'a str,
    ) -> BoxFuture<'a, ApiResult<ServerRecord>>;

    /// Delete or restore many resources in one call.
    fn batch<'a>(
        &'a self,
        resource_type: ResourceType,
        action: BatchAction,
        items: &'a [String],
        token: &'a str,
    ) -> BoxFuture<'a, ApiResult<Vec<ServerRecord>>>;
}

/// What the backend returned for one replayed action.
#[derive(Debug, Clone, PartialEq)]
pub enum Applied {
    One(ServerRecord),
    Many(Vec<ServerRecord>),
}

impl Applied {
    /// The single record, for non-batch operations.
    pub fn record(&self) -> Option<&ServerRecord> {
        match self {
            Applied::One(record) => Some(record),
            Applied::Many(_) => None,
        }
    }

    /// Every record touched by the call.
    pub fn records(&self) -> &[ServerRecord] {
        match self {
            Applied::One(record) => std::slice::from_ref(record),
            Applied::Many(records) => records,
        }
    }
}

/// Dispatches `action` to the matching API method.
pub async fn apply(api: &dyn MutationApi, action: &OfflineAction) -> ApiResult<Applied> {
    let token = action.idempotency_token();
    let resource_type = action.resource_type;

    match &action.payload {
        ActionPayload::Create { data } => api
            .create(resource_type, data, token)
            .await
            .map(Applied::One),
        ActionPayload::Update {
            resource_id,
            updates,
        } => api
            .update(resource_type, resource_id, updates, token)
            .await
            .map(Applied::One),
        ActionPayload::Delete { resource_id } => api
            .delete(resource_type, resource_id, token)
            .await
            .map(Applied::One),
        ActionPayload::Restore { resource_id } => api
            .restore(resource_type, resource_id, token)
            .await
            .map(Applied::One),
        ActionPayload::Complete { resource_id } => api
            .complete(resource_type, resource_id, token)
            .await
            .map(Applied::One),
        ActionPayload::Batch { action, items } => api
            .batch(resource_type, *action, items, token)
            .await
            .map(Applied::Many),
    }
}
