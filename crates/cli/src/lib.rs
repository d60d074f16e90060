// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! syncq - offline mutation queue with circuit-breaker guarded replay.
//!
//! This crate provides the [`sync`] engine behind the `syncq` CLI: mutations
//! made without connectivity are queued on disk as
//! [`OfflineAction`](syncq_core::OfflineAction)s and replayed in order once
//! the backend is reachable.
//!
//! # Main Components
//!
//! - [`sync::SyncManager`] - queue, direct-call fallback and drain loop
//! - [`sync::MutationApi`] - the backend seam; [`sync::Ledger`] is a local one
//! - [`Config`] - queue and breaker tuning from `config.toml`
//! - [`Error`] - Error types for all operations
//!
//! # Embedding
//!
//! ```rust,ignore
//! use syncq::sync::{Connectivity, JsonlQueueStore, NetworkState, SyncManager};
//!
//! let config = Config::load(&dir)?;
//! let registry = config.registry(Arc::new(SystemClock));
//! let store = JsonlQueueStore::open(&queue_path(&dir))?;
//! let manager = SyncManager::new(
//!     config.queue.clone(),
//!     api,
//!     Box::new(store),
//!     &registry,
//!     Connectivity::new(NetworkState::Online),
//! )?;
//! let worker = manager.spawn_background();
//! ```

mod cli;
pub mod colors;
mod commands;
mod display;
pub mod env;
pub mod help;
pub mod logging;

pub mod config;
pub mod error;
pub mod sync;

pub use cli::{Cli, Command, OutputFormat, TargetArgs};
pub use config::{queue_path, resolve_data_dir, Config};
pub use error::{Error, Result};

use clap::CommandFactory;
use clap_complete::generate;

/// Runs a parsed command line.
pub fn run(cli: Cli) -> Result<()> {
    let dir = cli.dir.as_deref();
    match cli.command {
        Command::Enqueue {
            operation,
            resource_type,
            user,
            target,
            max_retries,
            output,
        } => commands::enqueue::run(
            dir,
            &operation,
            &resource_type,
            &user,
            &target,
            max_retries,
            output,
        ),
        Command::List {
            user,
            status,
            output,
        } => commands::list::run(dir, user.as_deref(), &status, output),
        Command::Show { id, output } => commands::list::show(dir, &id, output),
        Command::Status { output } => commands::list::status(dir, output),
        Command::Cancel { ids } => commands::lifecycle::cancel(dir, &ids),
        Command::Retry { ids } => commands::lifecycle::retry(dir, &ids),
        Command::Clear { user } => commands::lifecycle::clear(dir, &user),
        Command::Drain { ledger, output } => {
            commands::drain::run(dir, ledger.as_deref(), output)
        }
        Command::Completion { shell } => {
            let mut cmd = Cli::command();
            generate(shell, &mut cmd, "syncq", &mut std::io::stdout());
            Ok(())
        }
    }
}

#[cfg(test)]
#[path = "lib_tests.rs"]
mod tests;
