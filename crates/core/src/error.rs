// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Error types for syncq-core operations.

use thiserror::Error;

/// All possible errors that can occur in syncq-core operations.
#[derive(Debug, Error)]
pub enum Error {
    #[error("circuit '{name}' is open: service unavailable, retry in {retry_in_ms}ms")]
    CircuitOpen { name: String, retry_in_ms: u64 },

    #[error("offline queue is full ({max} actions)\n  hint: sync or cancel queued changes before making new ones")]
    QueueFull { max: usize },

    #[error("cannot cancel action {id}: it is {status}\n  hint: wait for the in-flight sync attempt to finish")]
    InvalidCancellation { id: String, status: String },

    #[error("action not found: {0}")]
    ActionNotFound(String),

    #[error("invalid action status transition: cannot go from {from} to {to}")]
    InvalidTransition { from: String, to: String },

    #[error("payload does not match operation: {operation} cannot carry a {payload} payload")]
    PayloadMismatch { operation: String, payload: String },

    #[error("invalid operation: '{0}'\n  hint: valid operations are: create, update, delete, restore, complete, batch_delete, batch_restore")]
    InvalidOperation(String),

    #[error("invalid resource type: '{0}'\n  hint: valid types are: assignment, lecture, study_session, course")]
    InvalidResourceType(String),

    #[error("invalid action status: '{0}'\n  hint: valid statuses are: pending, syncing, success, failed, cancelled")]
    InvalidStatus(String),

    #[error("{0}")]
    InvalidInput(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

/// A specialized Result type for syncq-core operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
