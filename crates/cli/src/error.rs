// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use thiserror::Error;

/// All possible errors that can occur in the syncq library.
///
/// Errors provide user-friendly messages with hints for common issues.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Core(syncq_core::Error),

    #[error("queue at {path} is locked by another process\n  hint: wait for the other syncq command to finish")]
    QueueLocked { path: String },

    #[error("could not determine a data directory\n  hint: pass --dir or set SYNCQ_DIR")]
    NoDataDir,

    #[error("invalid JSON in --data: {reason}")]
    InvalidData { reason: String },

    #[error("{field} is required for {operation}")]
    RequiredFor {
        field: &'static str,
        operation: String,
    },

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("config error: {0}")]
    Config(String),
}

/// A specialized Result type for syncq operations.
pub type Result<T> = std::result::Result<T, Error>;

impl From<syncq_core::Error> for Error {
    fn from(e: syncq_core::Error) -> Self {
        match e {
            syncq_core::Error::Io(e) => Error::Io(e),
            syncq_core::Error::Json(e) => Error::Json(e),
            other => Error::Core(other),
        }
    }
}

impl Error {
    /// Returns the core error this wraps, if any.
    pub fn as_core(&self) -> Option<&syncq_core::Error> {
        match self {
            Error::Core(e) => Some(e),
            _ => None,
        }
    }
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
