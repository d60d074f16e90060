// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

pub mod drain;
pub mod enqueue;
pub mod lifecycle;
pub mod list;
#[cfg(test)]
#[path = "mod_tests.rs"]
pub mod testing;

use std::fs;
use std::path::Path;
use std::sync::Arc;

use syncq_core::{BreakerRegistry, SystemClock};

use crate::config::{queue_path, resolve_data_dir, Config};
use crate::error::Result;
use crate::sync::{Connectivity, JsonlQueueStore, Ledger, MutationApi, NetworkState, SyncManager};

/// Everything a command needs to work on the on-disk queue.
pub struct QueueContext {
    pub registry: Arc<BreakerRegistry>,
    pub manager: Arc<SyncManager>,
}

/// Opens the queue for local bookkeeping.
///
/// The manager is offline, so nothing here reaches a backend; `drain` uses
/// [`open_queue_with`] to replay.
pub fn open_queue(dir: Option<&Path>) -> Result<QueueContext> {
    open_queue_with(dir, Arc::new(Ledger::in_memory()), NetworkState::Offline)
}

/// Opens the queue with a specific backend and connectivity.
///
/// Holds the queue lock until the context is dropped.
pub fn open_queue_with(
    dir: Option<&Path>,
    api: Arc<dyn MutationApi>,
    network: NetworkState,
) -> Result<QueueContext> {
    let dir = resolve_data_dir(dir)?;
    fs::create_dir_all(&dir)?;
    let config = Config::load(&dir)?;
    let registry = Arc::new(config.registry(Arc::new(SystemClock)));
    let store = JsonlQueueStore::open(&queue_path(&dir))?;

    let manager = SyncManager::new(
        config.queue.clone(),
        api,
        Box::new(store),
        &registry,
        Connectivity::new(network),
    )?;

    Ok(QueueContext {
        registry,
        manager,
    })
}

/// Prints command output, skipping empty results.
fn emit(output: &str) {
    if !output.is_empty() {
        println!("{}", output);
    }
}
