// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Queue and breaker configuration.
//!
//! Configuration is stored in `<data dir>/config.toml`. Every key is optional:
//!
//! ```toml
//! [queue]
//! max_queue_size = 100
//! max_retries = 3
//! retry_delay_ms = 5000
//! backoff = "fixed"
//!
//! [breakers.default]
//! failure_threshold = 5
//! reset_timeout_ms = 60000
//!
//! [breakers.billing]
//! failure_threshold = 2
//!
//! [ledger]
//! path = "ledger.jsonl"
//! ```

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use syncq_core::{BreakerConfig, BreakerRegistry, ClockSource};

use crate::env;
use crate::error::{Error, Result};

const APP_DIR_NAME: &str = "syncq";
const CONFIG_FILE_NAME: &str = "config.toml";
const QUEUE_FILE_NAME: &str = "queue.jsonl";

/// Name of the breaker table whose values apply to every unlisted resource.
pub const DEFAULT_BREAKER_KEY: &str = "default";

/// Top-level configuration stored in `config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub queue: QueueConfig,
    /// Breaker tuning keyed by resource name; `default` applies to the rest.
    #[serde(default)]
    pub breakers: BTreeMap<String, BreakerConfig>,
    #[serde(default)]
    pub ledger: LedgerConfig,
}

/// How the delay before the next replay attempt grows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backoff {
    /// Every retry waits `retry_delay_ms`.
    #[default]
    Fixed,
    /// The delay doubles per retry, capped at `max_retry_delay_ms`.
    Exponential,
}

/// Offline queue tuning.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueConfig {
    /// Queue capacity; enqueue fails with `QueueFull` beyond this unless
    /// `evict_failed_when_full` is set and a failed action can make room.
    #[serde(default = "default_max_queue_size")]
    pub max_queue_size: usize,
    /// Retry budget given to new actions.
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    /// Delay before a failed attempt is retried (milliseconds).
    #[serde(default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,
    #[serde(default)]
    pub backoff: Backoff,
    /// Upper bound for exponential backoff (milliseconds).
    #[serde(default = "default_max_retry_delay_ms")]
    pub max_retry_delay_ms: u64,
    /// Upper bound on replay attempts in flight at once.
    #[serde(default = "default_max_concurrent_syncs")]
    pub max_concurrent_syncs: usize,
    /// Drain automatically when connectivity comes back.
    #[serde(default = "default_true")]
    pub auto_sync_online: bool,
    /// Periodic drain interval in milliseconds. 0 = disabled.
    #[serde(default = "default_sync_interval_ms")]
    pub sync_interval_ms: u64,
    /// Deadline for a single backend call in milliseconds. 0 = disabled.
    #[serde(default = "default_apply_timeout_ms")]
    pub apply_timeout_ms: u64,
    /// Evict the oldest failed action instead of rejecting when full.
    #[serde(default)]
    pub evict_failed_when_full: bool,
    /// Breaker guarding replays and direct calls.
    #[serde(default = "default_breaker_name")]
    pub breaker: String,
}

fn default_max_queue_size() -> usize {
    100
}

fn default_max_retries() -> u32 {
    syncq_core::DEFAULT_MAX_RETRIES
}

fn default_retry_delay_ms() -> u64 {
    5_000
}

fn default_max_retry_delay_ms() -> u64 {
    60_000
}

fn default_max_concurrent_syncs() -> usize {
    3
}

fn default_true() -> bool {
    true
}

fn default_sync_interval_ms() -> u64 {
    30_000
}

fn default_apply_timeout_ms() -> u64 {
    30_000
}

fn default_breaker_name() -> String {
    "backend".to_string()
}

impl Default for QueueConfig {
    fn default() -> Self {
        QueueConfig {
            max_queue_size: default_max_queue_size(),
            max_retries: default_max_retries(),
            retry_delay_ms: default_retry_delay_ms(),
            backoff: Backoff::default(),
            max_retry_delay_ms: default_max_retry_delay_ms(),
            max_concurrent_syncs: default_max_concurrent_syncs(),
            auto_sync_online: true,
            sync_interval_ms: default_sync_interval_ms(),
            apply_timeout_ms: default_apply_timeout_ms(),
            evict_failed_when_full: false,
            breaker: default_breaker_name(),
        }
    }
}

impl QueueConfig {
    /// Checks the values that would make the queue unusable.
    pub fn validate(&self) -> Result<()> {
        if self.max_queue_size == 0 {
            return Err(Error::Config("queue.max_queue_size must be at least 1".into()));
        }
        if self.max_retries == 0 {
            return Err(Error::Config("queue.max_retries must be at least 1".into()));
        }
        if self.max_concurrent_syncs == 0 {
            return Err(Error::Config(
                "queue.max_concurrent_syncs must be at least 1".into(),
            ));
        }
        if self.breaker.trim().is_empty() {
            return Err(Error::Config("queue.breaker cannot be empty".into()));
        }
        Ok(())
    }

    /// Delay before the attempt following `retry_count` failures.
    pub fn retry_delay_ms(&self, retry_count: u32) -> u64 {
        match self.backoff {
            Backoff::Fixed => self.retry_delay_ms,
            Backoff::Exponential => {
                let shift = retry_count.saturating_sub(1).min(32);
                self.retry_delay_ms
                    .saturating_mul(1u64 << shift)
                    .min(self.max_retry_delay_ms.max(self.retry_delay_ms))
            }
        }
    }

    /// Per-call deadline, `None` when disabled.
    pub fn apply_timeout(&self) -> Option<Duration> {
        (self.apply_timeout_ms > 0).then(|| Duration::from_millis(self.apply_timeout_ms))
    }

    /// Periodic drain interval, `None` when disabled.
    pub fn sync_interval(&self) -> Option<Duration> {
        (self.sync_interval_ms > 0).then(|| Duration::from_millis(self.sync_interval_ms))
    }
}

/// Local ledger backend settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerConfig {
    /// Ledger file, relative to the data directory unless absolute.
    #[serde(default = "default_ledger_path")]
    pub path: String,
}

fn default_ledger_path() -> String {
    "ledger.jsonl".to_string()
}

impl Default for LedgerConfig {
    fn default() -> Self {
        LedgerConfig {
            path: default_ledger_path(),
        }
    }
}

impl Config {
    /// Loads configuration from `<dir>/config.toml`.
    ///
    /// A missing file yields the defaults.
    pub fn load(dir: &Path) -> Result<Self> {
        let config_path = dir.join(CONFIG_FILE_NAME);
        if !config_path.exists() {
            return Ok(Config::default());
        }
        let content = fs::read_to_string(&config_path)
            .map_err(|e| Error::Config(format!("failed to read config: {}", e)))?;
        Self::parse(&content)
    }

    /// Parses and validates configuration text.
    pub fn parse(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)
            .map_err(|e| Error::Config(format!("failed to parse config: {}", e)))?;
        config.queue.validate()?;
        Ok(config)
    }

    /// Breaker settings for resources without their own table.
    pub fn default_breaker(&self) -> BreakerConfig {
        self.breakers
            .get(DEFAULT_BREAKER_KEY)
            .copied()
            .unwrap_or_default()
    }

    /// Builds the breaker registry described by `[breakers]`.
    pub fn registry(&self, clock: std::sync::Arc<dyn ClockSource>) -> BreakerRegistry {
        self.breakers
            .iter()
            .filter(|(name, _)| name.as_str() != DEFAULT_BREAKER_KEY)
            .fold(
                BreakerRegistry::with_clock(self.default_breaker(), clock),
                |registry, (name, config)| registry.with_config(name.clone(), *config),
            )
    }

    /// Resolves the ledger file against the data directory.
    pub fn ledger_path(&self, dir: &Path) -> PathBuf {
        let path = Path::new(&self.ledger.path);
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            dir.join(path)
        }
    }
}

/// Resolves the data directory.
///
/// Precedence: explicit `--dir`, `SYNCQ_DIR`, `$XDG_STATE_HOME/syncq`,
/// then the platform local data directory.
pub fn resolve_data_dir(explicit: Option<&Path>) -> Result<PathBuf> {
    if let Some(dir) = explicit {
        return Ok(dir.to_path_buf());
    }
    if let Some(dir) = env::data_dir() {
        return Ok(dir);
    }
    if let Some(dir) = env::xdg_state_home() {
        return Ok(dir.join(APP_DIR_NAME));
    }
    dirs::data_local_dir()
        .map(|d| d.join(APP_DIR_NAME))
        .ok_or(Error::NoDataDir)
}

/// Path of the persisted queue inside the data directory.
pub fn queue_path(dir: &Path) -> PathBuf {
    dir.join(QUEUE_FILE_NAME)
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
