// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Shared argument structs for CLI commands.

use clap::Args;

/// What a queued mutation acts on.
///
/// Which fields are required depends on the operation: `create` needs
/// `--data`, `update` needs `--id` and `--data`, the batch operations need
/// `--items`, everything else needs `--id`.
#[derive(Args, Clone, Debug, Default)]
pub struct TargetArgs {
    /// Resource id (server id or temp id)
    #[arg(long)]
    pub id: Option<String>,

    /// JSON body for create, or the fields to change for update
    #[arg(long, short)]
    pub data: Option<String>,

    /// Resource ids for batch operations (comma-separated or repeated)
    #[arg(long, value_delimiter = ',')]
    pub items: Vec<String>,
}
