// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Queued offline mutations.
//!
//! An [`OfflineAction`] is a user mutation that has not yet been confirmed by
//! the backend. Its lifecycle is a small state machine:
//!
//! ```text
//! pending ──► syncing ──► success            (removed from the queue)
//!    ▲           │
//!    └───────────┤ failure, retry budget left
//!                └──► failed                 (terminal until retried/cancelled)
//!
//! pending | failed ──► cancelled             (removed from the queue)
//! ```

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::error::{Error, Result};

/// Prefix of client-generated placeholder identifiers.
pub const TEMP_ID_PREFIX: &str = "temp_";

/// Default retry budget per action.
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// Returns true if `id` is a client-generated temporary identifier.
pub fn is_temp_id(id: &str) -> bool {
    id.starts_with(TEMP_ID_PREFIX)
}

/// Kind of mutation carried by an action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Operation {
    Create,
    Update,
    Delete,
    Restore,
    Complete,
    BatchDelete,
    BatchRestore,
}

impl Operation {
    /// Returns the string representation used in display and CLI arguments.
    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::Create => "create",
            Operation::Update => "update",
            Operation::Delete => "delete",
            Operation::Restore => "restore",
            Operation::Complete => "complete",
            Operation::BatchDelete => "batch_delete",
            Operation::BatchRestore => "batch_restore",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Operation {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "create" => Ok(Operation::Create),
            "update" => Ok(Operation::Update),
            "delete" => Ok(Operation::Delete),
            "restore" => Ok(Operation::Restore),
            "complete" => Ok(Operation::Complete),
            "batch_delete" => Ok(Operation::BatchDelete),
            "batch_restore" => Ok(Operation::BatchRestore),
            _ => Err(Error::InvalidOperation(s.to_string())),
        }
    }
}

/// Kind of resource a mutation targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceType {
    Assignment,
    Lecture,
    StudySession,
    Course,
}

impl ResourceType {
    /// Returns the string representation used in storage and display.
    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceType::Assignment => "assignment",
            ResourceType::Lecture => "lecture",
            ResourceType::StudySession => "study_session",
            ResourceType::Course => "course",
        }
    }
}

impl fmt::Display for ResourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ResourceType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "assignment" => Ok(ResourceType::Assignment),
            "lecture" => Ok(ResourceType::Lecture),
            "study_session" => Ok(ResourceType::StudySession),
            "course" => Ok(ResourceType::Course),
            _ => Err(Error::InvalidResourceType(s.to_string())),
        }
    }
}

/// The mutation applied to every item of a batch payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BatchAction {
    Delete,
    Restore,
}

impl BatchAction {
    /// Returns the string representation used in display.
    pub fn as_str(&self) -> &'static str {
        match self {
            BatchAction::Delete => "delete",
            BatchAction::Restore => "restore",
        }
    }
}

/// Payload describing the specific mutation being queued.
///
/// One variant per operation kind; dispatch sites match exhaustively.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ActionPayload {
    /// Create a new resource from `data`.
    Create { data: Value },

    /// Apply `updates` to an existing resource.
    Update { resource_id: String, updates: Value },

    /// Soft-delete a resource.
    Delete { resource_id: String },

    /// Restore a soft-deleted resource.
    Restore { resource_id: String },

    /// Mark a resource as completed.
    Complete { resource_id: String },

    /// Apply one action to many resources.
    Batch { action: BatchAction, items: Vec<String> },
}

impl ActionPayload {
    /// Creates a Create payload.
    pub fn create(data: Value) -> Self {
        ActionPayload::Create { data }
    }

    /// Creates an Update payload.
    pub fn update(resource_id: impl Into<String>, updates: Value) -> Self {
        ActionPayload::Update { resource_id: resource_id.into(), updates }
    }

    /// Creates a Delete payload.
    pub fn delete(resource_id: impl Into<String>) -> Self {
        ActionPayload::Delete { resource_id: resource_id.into() }
    }

    /// Creates a Restore payload.
    pub fn restore(resource_id: impl Into<String>) -> Self {
        ActionPayload::Restore { resource_id: resource_id.into() }
    }

    /// Creates a Complete payload.
    pub fn complete(resource_id: impl Into<String>) -> Self {
        ActionPayload::Complete { resource_id: resource_id.into() }
    }

    /// Creates a Batch payload.
    pub fn batch(action: BatchAction, items: Vec<String>) -> Self {
        ActionPayload::Batch { action, items }
    }

    /// Short name of the payload variant, for error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            ActionPayload::Create { .. } => "create",
            ActionPayload::Update { .. } => "update",
            ActionPayload::Delete { .. } => "delete",
            ActionPayload::Restore { .. } => "restore",
            ActionPayload::Complete { .. } => "complete",
            ActionPayload::Batch { action: BatchAction::Delete, .. } => "batch_delete",
            ActionPayload::Batch { action: BatchAction::Restore, .. } => "batch_restore",
        }
    }

    /// Returns true if this payload is the shape `operation` expects.
    pub fn matches(&self, operation: Operation) -> bool {
        matches!(
            (operation, self),
            (Operation::Create, ActionPayload::Create { .. })
                | (Operation::Update, ActionPayload::Update { .. })
                | (Operation::Delete, ActionPayload::Delete { .. })
                | (Operation::Restore, ActionPayload::Restore { .. })
                | (Operation::Complete, ActionPayload::Complete { .. })
                | (Operation::BatchDelete, ActionPayload::Batch { action: BatchAction::Delete, .. })
                | (
                    Operation::BatchRestore,
                    ActionPayload::Batch { action: BatchAction::Restore, .. }
                )
        )
    }

    /// Returns the single resource this payload targets, if any.
    pub fn resource_id(&self) -> Option<&str> {
        match self {
            ActionPayload::Update { resource_id, .. }
            | ActionPayload::Delete { resource_id }
            | ActionPayload::Restore { resource_id }
            | ActionPayload::Complete { resource_id } => Some(resource_id),
            ActionPayload::Create { .. } | ActionPayload::Batch { .. } => None,
        }
    }

    /// Returns true if this payload targets `id`, directly or as a batch item.
    pub fn references(&self, id: &str) -> bool {
        match self {
            ActionPayload::Batch { items, .. } => items.iter().any(|item| item == id),
            other => other.resource_id() == Some(id),
        }
    }

    /// Rewrites every reference to `from` into `to`.
    ///
    /// Returns true if anything changed.
    pub fn replace_reference(&mut self, from: &str, to: &str) -> bool {
        match self {
            ActionPayload::Create { .. } => false,
            ActionPayload::Update { resource_id, .. }
            | ActionPayload::Delete { resource_id }
            | ActionPayload::Restore { resource_id }
            | ActionPayload::Complete { resource_id } => {
                if resource_id == from {
                    *resource_id = to.to_string();
                    true
                } else {
                    false
                }
            }
            ActionPayload::Batch { items, .. } => {
                let mut changed = false;
                for item in items.iter_mut().filter(|item| item.as_str() == from) {
                    *item = to.to_string();
                    changed = true;
                }
                changed
            }
        }
    }
}

/// Sync status of a queued action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionStatus {
    /// Waiting for a replay attempt.
    Pending,
    /// A replay attempt is in flight.
    Syncing,
    /// Confirmed by the backend.
    Success,
    /// Retry budget exhausted.
    Failed,
    /// Dropped by the user.
    Cancelled,
}

impl ActionStatus {
    /// Returns the string representation used in storage and display.
    pub fn as_str(&self) -> &'static str {
        match self {
            ActionStatus::Pending => "pending",
            ActionStatus::Syncing => "syncing",
            ActionStatus::Success => "success",
            ActionStatus::Failed => "failed",
            ActionStatus::Cancelled => "cancelled",
        }
    }

    /// Check if a transition from this status to target is valid.
    pub fn can_transition_to(&self, target: ActionStatus) -> bool {
        use ActionStatus::*;
        matches!(
            (self, target),
            (Pending, Syncing)
                | (Pending, Cancelled)
                | (Syncing, Success)
                | (Syncing, Pending)
                | (Syncing, Failed)
                | (Failed, Pending)
                | (Failed, Cancelled)
        )
    }

    /// Returns true if no automatic transition leaves this status.
    pub fn is_terminal(&self) -> bool {
        matches!(self, ActionStatus::Success | ActionStatus::Failed | ActionStatus::Cancelled)
    }
}

impl fmt::Display for ActionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ActionStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "pending" => Ok(ActionStatus::Pending),
            "syncing" => Ok(ActionStatus::Syncing),
            "success" => Ok(ActionStatus::Success),
            "failed" => Ok(ActionStatus::Failed),
            "cancelled" | "canceled" => Ok(ActionStatus::Cancelled),
            _ => Err(Error::InvalidStatus(s.to_string())),
        }
    }
}

/// One queued mutation awaiting replay against the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OfflineAction {
    /// Client-generated unique identifier, doubles as the idempotency token.
    pub id: String,
    pub operation: Operation,
    pub resource_type: ResourceType,
    pub payload: ActionPayload,
    /// Enqueue time in milliseconds since Unix epoch; orders replay.
    pub timestamp: u64,
    pub status: ActionStatus,
    pub retry_count: u32,
    pub max_retries: u32,
    /// Owner of the mutation.
    pub user_id: String,
    /// Placeholder id handed to the UI for CREATE actions.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temp_id: Option<String>,
    /// Last failure message, only set once the action has failed terminally.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Earliest time the next replay attempt may start.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_attempt_at: Option<u64>,
}

impl OfflineAction {
    /// Creates a new pending action.
    ///
    /// Fails if the payload shape does not match `operation`, if `user_id` is
    /// empty, or if `max_retries` is zero.
    pub fn new(
        operation: Operation,
        resource_type: ResourceType,
        payload: ActionPayload,
        user_id: impl Into<String>,
        timestamp: u64,
        max_retries: u32,
    ) -> Result<Self> {
        if !payload.matches(operation) {
            return Err(Error::PayloadMismatch {
                operation: operation.to_string(),
                payload: payload.kind().to_string(),
            });
        }
        let user_id = user_id.into();
        if user_id.trim().is_empty() {
            return Err(Error::InvalidInput("user id cannot be empty".to_string()));
        }
        if max_retries == 0 {
            return Err(Error::InvalidInput("max retries must be at least 1".to_string()));
        }

        let temp_id = (operation == Operation::Create)
            .then(|| format!("{TEMP_ID_PREFIX}{}", Uuid::new_v4().simple()));

        Ok(OfflineAction {
            id: Uuid::new_v4().to_string(),
            operation,
            resource_type,
            payload,
            timestamp,
            status: ActionStatus::Pending,
            retry_count: 0,
            max_retries,
            user_id,
            temp_id,
            error: None,
            next_attempt_at: None,
        })
    }

    /// Token the backend uses to deduplicate replays of this action.
    pub fn idempotency_token(&self) -> &str {
        &self.id
    }

    /// Returns true if the action may be replayed at `now_ms`.
    pub fn is_due(&self, now_ms: u64) -> bool {
        self.status == ActionStatus::Pending && self.next_attempt_at.map_or(true, |at| at <= now_ms)
    }

    /// Returns true if retries remain after the current attempt count.
    pub fn has_retry_budget(&self) -> bool {
        self.retry_count < self.max_retries
    }

    fn transition(&mut self, target: ActionStatus) -> Result<()> {
        if !self.status.can_transition_to(target) {
            return Err(Error::InvalidTransition {
                from: self.status.to_string(),
                to: target.to_string(),
            });
        }
        self.status = target;
        Ok(())
    }

    /// Claims the action for a replay attempt (pending -> syncing).
    pub fn begin_sync(&mut self) -> Result<()> {
        self.transition(ActionStatus::Syncing)
    }

    /// Records a confirmed replay (syncing -> success).
    pub fn mark_success(&mut self) -> Result<()> {
        self.transition(ActionStatus::Success)?;
        self.error = None;
        self.next_attempt_at = None;
        Ok(())
    }

    /// Records a failed replay attempt.
    ///
    /// Consumes one unit of the retry budget. Returns the resulting status:
    /// `Pending` (retry at `retry_at_ms`) or `Failed` once the budget is spent.
    pub fn record_failure(&mut self, error: impl Into<String>, retry_at_ms: u64) -> Result<ActionStatus> {
        if self.status != ActionStatus::Syncing {
            return Err(Error::InvalidTransition {
                from: self.status.to_string(),
                to: ActionStatus::Failed.to_string(),
            });
        }

        self.retry_count = (self.retry_count + 1).min(self.max_retries);
        if self.has_retry_budget() {
            self.transition(ActionStatus::Pending)?;
            self.next_attempt_at = Some(retry_at_ms);
        } else {
            self.transition(ActionStatus::Failed)?;
            self.error = Some(error.into());
            self.next_attempt_at = None;
        }
        Ok(self.status)
    }

    /// Returns an in-flight action to pending without consuming retry budget.
    ///
    /// Used when the attempt never reached the backend (circuit open).
    pub fn defer(&mut self, until_ms: u64) -> Result<()> {
        if self.status != ActionStatus::Syncing {
            return Err(Error::InvalidTransition {
                from: self.status.to_string(),
                to: ActionStatus::Pending.to_string(),
            });
        }
        self.transition(ActionStatus::Pending)?;
        self.next_attempt_at = Some(until_ms);
        Ok(())
    }

    /// Cancels a pending or failed action.
    pub fn cancel(&mut self) -> Result<()> {
        if self.status == ActionStatus::Syncing {
            return Err(Error::InvalidCancellation {
                id: self.id.clone(),
                status: self.status.to_string(),
            });
        }
        self.transition(ActionStatus::Cancelled)
    }

    /// Re-arms a failed action with a fresh retry budget (failed -> pending).
    pub fn rearm(&mut self) -> Result<()> {
        if self.status != ActionStatus::Failed {
            return Err(Error::InvalidTransition {
                from: self.status.to_string(),
                to: ActionStatus::Pending.to_string(),
            });
        }
        self.transition(ActionStatus::Pending)?;
        self.retry_count = 0;
        self.error = None;
        self.next_attempt_at = None;
        Ok(())
    }

    /// Resets an attempt interrupted by a crash back to pending.
    ///
    /// Returns true if the action was in flight.
    pub fn recover_in_flight(&mut self) -> bool {
        if self.status == ActionStatus::Syncing {
            self.status = ActionStatus::Pending;
            true
        } else {
            false
        }
    }
}

/// A resource as confirmed by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerRecord {
    /// Server-assigned identifier.
    pub id: String,
    pub resource_type: ResourceType,
    #[serde(default)]
    pub data: Value,
}

#[cfg(test)]
#[path = "action_tests.rs"]
mod tests;
