// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

mod args;

use std::path::PathBuf;

use crate::colors;
use crate::help;
use clap::{Parser, Subcommand, ValueEnum};
use clap_complete::Shell;

pub use args::TargetArgs;

/// Parse a string that must not be empty or whitespace-only.
fn non_empty_string(s: &str) -> Result<String, String> {
    if s.trim().is_empty() {
        Err("cannot be empty".to_string())
    } else {
        Ok(s.to_string())
    }
}

/// Output format for commands supporting structured output.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Parser)]
#[command(name = "syncq")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(disable_version_flag = true)]
#[command(about = "Offline mutation queue with circuit-breaker guarded replay")]
#[command(
    long_about = "Offline mutation queue with circuit-breaker guarded replay.\n\n\
    Mutations made without connectivity are queued on disk and replayed in order once \
    the backend is reachable."
)]
#[command(help_template = help::template())]
#[command(before_help = help::commands())]
#[command(after_help = help::quickstart())]
#[command(styles = help::styles())]
// Allow the unit type field pattern which is required for clap's ArgAction::Version/Help
#[allow(clippy::manual_non_exhaustive)]
pub struct Cli {
    /// Data directory holding the queue and config.toml
    #[arg(long = "dir", global = true, value_name = "path")]
    pub dir: Option<PathBuf>,

    /// Log debug output to stderr
    #[arg(short = 'v', long, global = true)]
    pub verbose: bool,

    /// Print version
    #[arg(short = 'V', long = "version", action = clap::ArgAction::Version)]
    version: (),

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    // ─────────────────────────────────────────────────────────────────────────
    // Queue
    // ─────────────────────────────────────────────────────────────────────────
    /// Queue a mutation for later replay
    #[command(after_help = colors::examples("\
Examples:
  syncq enqueue create assignment -u ana -d '{\"title\":\"Essay\"}'   Queue a create
  syncq enqueue complete assignment -u ana --id a-17                 Queue a completion
  syncq enqueue update lecture -u ana --id l-3 -d '{\"room\":\"B2\"}'   Queue an update
  syncq enqueue batch_delete course -u ana --items c-1,c-2           Queue a batch delete
  syncq enqueue delete lecture -u ana --id l-3 --max-retries 5       Override retry budget"))]
    Enqueue {
        /// Operation (create, update, delete, restore, complete, batch_delete, batch_restore)
        operation: String,

        /// Resource type (assignment, lecture, study_session, course)
        resource_type: String,

        /// Owner of the mutation
        #[arg(long, short, value_parser = non_empty_string)]
        user: String,

        #[command(flatten)]
        target: TargetArgs,

        /// Retry budget for this action (defaults to queue.max_retries)
        #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
        max_retries: Option<u32>,

        /// Output format (text, json)
        #[arg(long = "output", short = 'o', value_enum, default_value = "text")]
        output: OutputFormat,
    },

    /// List queued actions, oldest first
    #[command(after_help = colors::examples("\
Examples:
  syncq list                      List every queued action
  syncq list -u ana               List actions owned by ana
  syncq list -s failed            List actions that ran out of retries
  syncq list -s pending,failed    List pending or failed actions
  syncq list -o json              Output in JSON format"))]
    List {
        /// Filter by owner
        #[arg(long, short)]
        user: Option<String>,

        /// Filter by status (comma-separated for OR)
        #[arg(long, short, value_delimiter = ',')]
        status: Vec<String>,

        /// Output format (text, json)
        #[arg(long = "output", short = 'o', value_enum, default_value = "text")]
        output: OutputFormat,
    },

    /// Show one queued action
    #[command(arg_required_else_help = true)]
    Show {
        /// Action id
        id: String,

        /// Output format (text, json)
        #[arg(long = "output", short = 'o', value_enum, default_value = "text")]
        output: OutputFormat,
    },

    /// Show queue counts and the age of the oldest pending action
    Status {
        /// Output format (text, json)
        #[arg(long = "output", short = 'o', value_enum, default_value = "text")]
        output: OutputFormat,
    },

    /// Drop pending or failed action(s)
    #[command(arg_required_else_help = true)]
    Cancel {
        /// Action id(s)
        #[arg(required = true)]
        ids: Vec<String>,
    },

    /// Give failed action(s) a fresh retry budget
    #[command(arg_required_else_help = true)]
    Retry {
        /// Action id(s)
        #[arg(required = true)]
        ids: Vec<String>,
    },

    /// Drop every action of a user that is not being synced
    Clear {
        /// Owner whose actions are dropped
        #[arg(long, short, value_parser = non_empty_string)]
        user: String,
    },

    // ─────────────────────────────────────────────────────────────────────────
    // Sync
    // ─────────────────────────────────────────────────────────────────────────
    /// Replay due actions against the local ledger
    #[command(after_help = colors::examples("\
Examples:
  syncq drain                          Replay against <dir>/ledger.jsonl
  syncq drain --ledger /tmp/l.jsonl    Replay against another ledger
  syncq drain -o json                  Print the drain report as JSON"))]
    Drain {
        /// Ledger file (defaults to ledger.path from config.toml)
        #[arg(long, value_name = "path")]
        ledger: Option<PathBuf>,

        /// Output format (text, json)
        #[arg(long = "output", short = 'o', value_enum, default_value = "text")]
        output: OutputFormat,
    },

    /// Generate shell completions
    #[command(arg_required_else_help = true)]
    Completion {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[cfg(test)]
#[path = "../cli_tests/mod.rs"]
mod tests;
