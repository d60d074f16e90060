// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use std::path::Path;
use std::sync::Arc;

use serde::Serialize;
use syncq_core::{BreakerRegistry, BreakerStats};

use crate::cli::OutputFormat;
use crate::config::{resolve_data_dir, Config};
use crate::display::format_drain_report;
use crate::error::Result;
use crate::sync::{BreakerMonitor, DrainReport, Ledger, NetworkState, SyncManager};

use super::{emit, open_queue_with};

#[derive(Serialize)]
struct DrainJson {
    #[serde(flatten)]
    report: DrainReport,
    breakers: Vec<BreakerStats>,
}

/// Replays the queue against the local ledger file.
pub fn run(dir: Option<&Path>, ledger: Option<&Path>, output: OutputFormat) -> Result<()> {
    let data_dir = resolve_data_dir(dir)?;
    let ledger_path = match ledger {
        Some(path) => path.to_path_buf(),
        None => Config::load(&data_dir)?.ledger_path(&data_dir),
    };
    let api = Arc::new(Ledger::open(&ledger_path)?);
    let ctx = open_queue_with(Some(&data_dir), api, NetworkState::Online)?;

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    let out = runtime.block_on(run_impl(&ctx.manager, &ctx.registry, output))?;
    emit(&out);
    Ok(())
}

/// Internal implementation that accepts a manager for testing.
pub(crate) async fn run_impl(
    manager: &SyncManager,
    registry: &Arc<BreakerRegistry>,
    output: OutputFormat,
) -> Result<String> {
    let report = manager.drain_queue().await?;
    BreakerMonitor::new(registry.clone()).poll();
    tracing::debug!("drain finished: {:?}", report);

    match output {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(&DrainJson {
            report,
            breakers: registry.all_stats(),
        })?),
        OutputFormat::Text => Ok(format_drain_report(&report)),
    }
}

#[cfg(test)]
#[path = "drain_tests.rs"]
mod tests;
