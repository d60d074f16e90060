// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use std::path::Path;

use crate::error::Result;
use crate::sync::SyncManager;

use super::{emit, open_queue};

pub fn cancel(dir: Option<&Path>, ids: &[String]) -> Result<()> {
    let ctx = open_queue(dir)?;
    cancel_impl(&ctx.manager, ids)
}

/// Cancels each id in turn, stopping at the first that cannot be cancelled.
pub(crate) fn cancel_impl(manager: &SyncManager, ids: &[String]) -> Result<()> {
    for id in ids {
        manager.cancel(id)?;
        println!("Cancelled {}", id);
    }
    Ok(())
}

pub fn retry(dir: Option<&Path>, ids: &[String]) -> Result<()> {
    let ctx = open_queue(dir)?;
    retry_impl(&ctx.manager, ids)
}

/// Re-arms each id; only failed actions qualify.
pub(crate) fn retry_impl(manager: &SyncManager, ids: &[String]) -> Result<()> {
    for id in ids {
        let action = manager.retry(id)?;
        println!("Re-armed {} ({} retries left)", id, action.max_retries);
    }
    Ok(())
}

pub fn clear(dir: Option<&Path>, user: &str) -> Result<()> {
    let ctx = open_queue(dir)?;
    emit(&clear_impl(&ctx.manager, user)?);
    Ok(())
}

pub(crate) fn clear_impl(manager: &SyncManager, user: &str) -> Result<String> {
    let removed = manager.clear_user(user)?;
    Ok(match removed {
        1 => format!("Cleared 1 action of {}", user),
        n => format!("Cleared {} actions of {}", n, user),
    })
}

#[cfg(test)]
#[path = "lifecycle_tests.rs"]
mod tests;
