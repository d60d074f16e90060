// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Stderr logging for the CLI.

use tracing_subscriber::EnvFilter;

use crate::env;

/// Filter used when neither `RUST_LOG` nor `--verbose` says otherwise.
const DEFAULT_FILTER: &str = "warn";
const VERBOSE_FILTER: &str = "debug";

/// Picks the filter directive: `--verbose` wins, then `RUST_LOG`.
pub fn filter_directive(verbose: bool, from_env: Option<String>) -> String {
    if verbose {
        return VERBOSE_FILTER.to_string();
    }
    from_env.unwrap_or_else(|| DEFAULT_FILTER.to_string())
}

/// Installs the global subscriber. Later calls are ignored.
pub fn init(verbose: bool) {
    let directive = filter_directive(verbose, env::log_filter());
    let filter = EnvFilter::try_new(&directive).unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

#[cfg(test)]
#[path = "logging_tests.rs"]
mod tests;
