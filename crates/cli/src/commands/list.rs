// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use std::path::Path;

use serde::Serialize;
use syncq_core::{ActionStatus, BreakerStats, ClockSource, OfflineAction, SystemClock};

use crate::cli::OutputFormat;
use crate::display::{format_action_details, format_action_line, format_status};
use crate::error::Result;
use crate::sync::{QueueStatus, SyncManager};

use super::{emit, open_queue};

pub fn run(
    dir: Option<&Path>,
    user: Option<&str>,
    statuses: &[String],
    output: OutputFormat,
) -> Result<()> {
    let ctx = open_queue(dir)?;
    emit(&run_impl(&ctx.manager, user, statuses, output)?);
    Ok(())
}

/// Internal implementation that accepts a manager for testing.
pub(crate) fn run_impl(
    manager: &SyncManager,
    user: Option<&str>,
    statuses: &[String],
    output: OutputFormat,
) -> Result<String> {
    let statuses = statuses
        .iter()
        .map(|s| s.trim().parse::<ActionStatus>())
        .collect::<std::result::Result<Vec<_>, _>>()?;

    let actions: Vec<OfflineAction> = match user {
        Some(user) => manager.actions_for(user),
        None => manager.actions(),
    }
    .into_iter()
    .filter(|a| statuses.is_empty() || statuses.contains(&a.status))
    .collect();

    match output {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(&actions)?),
        OutputFormat::Text => Ok(actions
            .iter()
            .map(format_action_line)
            .collect::<Vec<_>>()
            .join("\n")),
    }
}

pub fn show(dir: Option<&Path>, id: &str, output: OutputFormat) -> Result<()> {
    let ctx = open_queue(dir)?;
    emit(&show_impl(&ctx.manager, id, output, SystemClock.now_ms())?);
    Ok(())
}

pub(crate) fn show_impl(
    manager: &SyncManager,
    id: &str,
    output: OutputFormat,
    now_ms: u64,
) -> Result<String> {
    let action = manager
        .get(id)
        .ok_or_else(|| syncq_core::Error::ActionNotFound(id.to_string()))?;

    match output {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(&action)?),
        OutputFormat::Text => Ok(format_action_details(&action, now_ms)),
    }
}

#[derive(Serialize)]
struct StatusJson {
    #[serde(flatten)]
    queue: QueueStatus,
    breaker: BreakerStats,
}

pub fn status(dir: Option<&Path>, output: OutputFormat) -> Result<()> {
    let ctx = open_queue(dir)?;
    emit(&status_impl(&ctx.manager, output, SystemClock.now_ms())?);
    Ok(())
}

pub(crate) fn status_impl(
    manager: &SyncManager,
    output: OutputFormat,
    now_ms: u64,
) -> Result<String> {
    let queue = manager.status();
    match output {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(&StatusJson {
            queue,
            breaker: manager.breaker_stats(),
        })?),
        OutputFormat::Text => Ok(format_status(&queue, now_ms)),
    }
}

#[cfg(test)]
#[path = "list_tests.rs"]
mod tests;
