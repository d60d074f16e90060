// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Circuit breaker guarding calls to a named dependency.
//!
//! # States
//!
//! ```text
//! Closed ──(failures >= failure_threshold)──► Open
//! Open ──(reset_timeout since last failure, next call)──► HalfOpen
//! HalfOpen ──(success_threshold consecutive successes)──► Closed
//! HalfOpen ──(any failure)──► Open
//! ```
//!
//! The breaker only adds a fast-fail path: the wrapped operation's own error
//! is always handed back untouched, and retry policy belongs to the caller.

use std::fmt;
use std::future::Future;
use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::clock::{ClockSource, SystemClock};
use crate::error::Error;

/// Breaker tuning for one resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BreakerConfig {
    /// Consecutive failures that trip a closed breaker.
    pub failure_threshold: u32,
    /// Cooldown after the last failure before a probe is allowed (milliseconds).
    pub reset_timeout_ms: u64,
    /// Consecutive half-open successes needed to close again.
    pub success_threshold: u32,
}

impl Default for BreakerConfig {
    fn default() -> Self {
        BreakerConfig { failure_threshold: 5, reset_timeout_ms: 60_000, success_threshold: 2 }
    }
}

/// Observable breaker state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CircuitState {
    /// Calls pass through.
    Closed,
    /// Calls fail fast.
    Open,
    /// Probing whether the dependency recovered.
    HalfOpen,
}

impl CircuitState {
    /// Returns the string representation used in logs and display.
    pub fn as_str(&self) -> &'static str {
        match self {
            CircuitState::Closed => "closed",
            CircuitState::Open => "open",
            CircuitState::HalfOpen => "half-open",
        }
    }
}

impl fmt::Display for CircuitState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Point-in-time snapshot for monitors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BreakerStats {
    pub name: String,
    pub state: CircuitState,
    pub failures: u32,
    pub successes: u32,
    pub last_failure_time: Option<u64>,
}

/// Error returned by [`CircuitBreaker::execute`].
#[derive(Debug, Error)]
pub enum BreakerError<E> {
    /// The breaker is open; the operation was not invoked.
    #[error("circuit '{name}' is open, retry in {retry_in_ms}ms")]
    Open { name: String, retry_in_ms: u64 },

    /// The operation ran and failed.
    #[error(transparent)]
    Inner(E),
}

impl<E> BreakerError<E> {
    /// Returns true if the call was short-circuited.
    pub fn is_open(&self) -> bool {
        matches!(self, BreakerError::Open { .. })
    }

    /// Returns the operation's own error, if it ran.
    pub fn into_inner(self) -> Option<E> {
        match self {
            BreakerError::Inner(e) => Some(e),
            BreakerError::Open { .. } => None,
        }
    }

    /// Converts a short-circuit into the crate-level [`Error::CircuitOpen`].
    pub fn open_error(&self) -> Option<Error> {
        match self {
            BreakerError::Open { name, retry_in_ms } => {
                Some(Error::CircuitOpen { name: name.clone(), retry_in_ms: *retry_in_ms })
            }
            BreakerError::Inner(_) => None,
        }
    }
}

#[derive(Debug)]
struct BreakerInner {
    state: CircuitState,
    failures: u32,
    successes: u32,
    last_failure_time: Option<u64>,
}

/// Failure isolation gate for one named resource.
pub struct CircuitBreaker {
    name: String,
    config: BreakerConfig,
    clock: Arc<dyn ClockSource>,
    inner: Mutex<BreakerInner>,
}

impl CircuitBreaker {
    /// Creates a closed breaker using the system clock.
    pub fn new(name: impl Into<String>, config: BreakerConfig) -> Self {
        Self::with_clock(name, config, Arc::new(SystemClock))
    }

    /// Creates a closed breaker with a custom clock source.
    pub fn with_clock(
        name: impl Into<String>,
        config: BreakerConfig,
        clock: Arc<dyn ClockSource>,
    ) -> Self {
        let config = BreakerConfig {
            failure_threshold: config.failure_threshold.max(1),
            success_threshold: config.success_threshold.max(1),
            ..config
        };
        CircuitBreaker {
            name: name.into(),
            config,
            clock,
            inner: Mutex::new(BreakerInner {
                state: CircuitState::Closed,
                failures: 0,
                successes: 0,
                last_failure_time: None,
            }),
        }
    }

    /// Resource name this breaker guards.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Effective configuration.
    pub fn config(&self) -> BreakerConfig {
        self.config
    }

    /// Current state as last transitioned.
    ///
    /// An open breaker whose cooldown has elapsed still reports `Open` until
    /// the next call moves it to `HalfOpen`.
    pub fn state(&self) -> CircuitState {
        self.lock().state
    }

    /// Snapshot of counters for monitors.
    pub fn stats(&self) -> BreakerStats {
        let inner = self.lock();
        BreakerStats {
            name: self.name.clone(),
            state: inner.state,
            failures: inner.failures,
            successes: inner.successes,
            last_failure_time: inner.last_failure_time,
        }
    }

    /// Milliseconds until an open breaker admits a probe (0 if not open).
    pub fn retry_in_ms(&self) -> u64 {
        let inner = self.lock();
        self.remaining_cooldown(&inner)
    }

    /// Forces the breaker closed and clears its counters.
    pub fn reset(&self) {
        let mut inner = self.lock();
        inner.state = CircuitState::Closed;
        inner.failures = 0;
        inner.successes = 0;
        inner.last_failure_time = None;
        tracing::info!("circuit '{}' reset", self.name);
    }

    /// Runs `operation` unless the breaker is open.
    ///
    /// Returns [`BreakerError::Open`] without invoking `operation` while the
    /// cooldown is running; otherwise records the outcome and hands back the
    /// operation's result, wrapping its error in [`BreakerError::Inner`].
    pub async fn execute<T, E, F, Fut>(&self, operation: F) -> Result<T, BreakerError<E>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        if let Err(retry_in_ms) = self.admit() {
            return Err(BreakerError::Open { name: self.name.clone(), retry_in_ms });
        }
        match operation().await {
            Ok(value) => {
                self.record_success();
                Ok(value)
            }
            Err(e) => {
                self.record_failure();
                Err(BreakerError::Inner(e))
            }
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, BreakerInner> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn remaining_cooldown(&self, inner: &BreakerInner) -> u64 {
        if inner.state != CircuitState::Open {
            return 0;
        }
        let since = inner.last_failure_time.unwrap_or(0);
        let elapsed = self.clock.now_ms().saturating_sub(since);
        self.config.reset_timeout_ms.saturating_sub(elapsed)
    }

    /// Check-and-transition step before a call; runs under one lock.
    ///
    /// Returns the remaining cooldown when the call must be short-circuited.
    fn admit(&self) -> Result<(), u64> {
        let mut inner = self.lock();
        if inner.state != CircuitState::Open {
            return Ok(());
        }

        let retry_in_ms = self.remaining_cooldown(&inner);
        if retry_in_ms > 0 {
            return Err(retry_in_ms);
        }

        inner.state = CircuitState::HalfOpen;
        inner.successes = 0;
        tracing::info!("circuit '{}' half-open, probing", self.name);
        Ok(())
    }

    fn record_success(&self) {
        let mut inner = self.lock();
        match inner.state {
            CircuitState::Closed => inner.failures = 0,
            CircuitState::HalfOpen => {
                inner.successes += 1;
                if inner.successes >= self.config.success_threshold {
                    inner.state = CircuitState::Closed;
                    inner.failures = 0;
                    inner.successes = 0;
                    tracing::info!("circuit '{}' closed", self.name);
                }
            }
            // A call admitted before the breaker tripped; the cooldown stands.
            CircuitState::Open => {}
        }
    }

    fn record_failure(&self) {
        let mut inner = self.lock();
        inner.failures = inner.failures.saturating_add(1);
        inner.last_failure_time = Some(self.clock.now_ms());

        match inner.state {
            CircuitState::Closed if inner.failures >= self.config.failure_threshold => {
                inner.state = CircuitState::Open;
                tracing::warn!(
                    "circuit '{}' opened after {} consecutive failures",
                    self.name,
                    inner.failures
                );
            }
            CircuitState::HalfOpen => {
                inner.state = CircuitState::Open;
                inner.successes = 0;
                tracing::warn!("circuit '{}' re-opened: probe failed", self.name);
            }
            CircuitState::Closed | CircuitState::Open => {}
        }
    }
}

impl fmt::Debug for CircuitBreaker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CircuitBreaker")
            .field("name", &self.name)
            .field("config", &self.config)
            .field("state", &self.state())
            .finish()
    }
}

#[cfg(test)]
#[path = "breaker_tests.rs"]
mod tests;
