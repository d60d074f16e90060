// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Events broadcast by the sync manager.
//!
//! Mutation callers already received an optimistic answer, so the outcome of
//! a replay only surfaces here (and on the action's status).

use serde::Serialize;
use syncq_core::{Operation, ResourceType, ServerRecord};

/// Something observable happened to the queue.
#[derive(Debug, Clone, PartialEq)]
pub enum SyncEvent {
    /// The backend confirmed an action; it left the queue.
    Synced {
        action_id: String,
        operation: Operation,
        resource_type: ResourceType,
        records: Vec<ServerRecord>,
    },

    /// A CREATE landed: references to `temp_id` must now use `real_id`.
    Reconciled {
        action_id: String,
        resource_type: ResourceType,
        temp_id: String,
        real_id: String,
    },

    /// A replay failed and will be retried at `next_attempt_at`.
    RetryScheduled {
        action_id: String,
        retry_count: u32,
        next_attempt_at: u64,
        error: String,
    },

    /// The breaker was open; the action waits without spending a retry.
    Deferred { action_id: String, until: u64 },

    /// Retry budget exhausted.
    Failed { action_id: String, error: String },

    /// Removed by the user.
    Cancelled { action_id: String },

    /// A failed action was dropped to make room.
    Evicted { action_id: String },

    /// Queue contents changed.
    QueueChanged(QueueStatus),
}

/// Queue summary for status displays.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct QueueStatus {
    pub total: usize,
    pub pending: usize,
    pub syncing: usize,
    pub failed: usize,
    /// Timestamp of the oldest action still waiting for a replay.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub oldest_pending: Option<u64>,
}

impl QueueStatus {
    /// Age of the oldest pending action at `now_ms`.
    pub fn oldest_pending_age_ms(&self, now_ms: u64) -> Option<u64> {
        self.oldest_pending.map(|ts| now_ms.saturating_sub(ts))
    }

    /// True when nothing is waiting to be synced.
    pub fn is_idle(&self) -> bool {
        self.pending == 0 && self.syncing == 0
    }
}

/// Totals for one drain run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DrainReport {
    pub attempted: usize,
    pub synced: usize,
    pub retried: usize,
    pub failed: usize,
    pub deferred: usize,
    /// Another drain was running; this trigger was folded into it.
    pub coalesced: bool,
}
