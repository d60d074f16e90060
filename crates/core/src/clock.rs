// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Wall clock abstraction.
//!
//! Everything time-dependent in syncq (breaker cooldowns, retry delays,
//! action timestamps) reads time through [`ClockSource`], so tests can drive
//! time explicitly with a [`ManualClock`] instead of sleeping.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{SystemTime, UNIX_EPOCH};

/// Trait for getting the current wall clock time.
///
/// This allows injecting a mock clock for testing.
pub trait ClockSource: Send + Sync {
    /// Returns the current time in milliseconds since Unix epoch.
    fn now_ms(&self) -> u64;
}

/// System clock implementation using `std::time::SystemTime`.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl ClockSource for SystemClock {
    fn now_ms(&self) -> u64 {
        SystemTime::now().duration_since(UNIX_EPOCH).map(|d| d.as_millis() as u64).unwrap_or(0)
    }
}

impl<C: ClockSource + ?Sized> ClockSource for &C {
    fn now_ms(&self) -> u64 {
        (**self).now_ms()
    }
}

impl<C: ClockSource + ?Sized> ClockSource for Arc<C> {
    fn now_ms(&self) -> u64 {
        (**self).now_ms()
    }
}

/// A clock that only moves when told to.
///
/// Used by tests and simulations that need deterministic cooldowns.
#[derive(Debug, Default)]
pub struct ManualClock {
    time_ms: AtomicU64,
}

impl ManualClock {
    /// Creates a manual clock starting at `initial_ms`.
    pub fn new(initial_ms: u64) -> Self {
        ManualClock { time_ms: AtomicU64::new(initial_ms) }
    }

    /// Sets the current time.
    pub fn set(&self, ms: u64) {
        self.time_ms.store(ms, Ordering::SeqCst);
    }

    /// Moves the clock forward by `ms`.
    pub fn advance(&self, ms: u64) {
        self.time_ms.fetch_add(ms, Ordering::SeqCst);
    }
}

impl ClockSource for ManualClock {
    fn now_ms(&self) -> u64 {
        self.time_ms.load(Ordering::SeqCst)
    }
}

/// Issues strictly increasing millisecond timestamps.
///
/// Two actions enqueued within the same millisecond (or after the wall clock
/// stepped backwards) still get distinct, ordered timestamps, which keeps
/// FIFO replay order well-defined.
pub struct MonotonicClock<C: ClockSource = SystemClock> {
    clock: C,
    last_ms: Mutex<u64>,
}

impl MonotonicClock<SystemClock> {
    /// Creates a monotonic clock backed by the system clock.
    pub fn new() -> Self {
        Self::with_clock(SystemClock)
    }
}

impl Default for MonotonicClock<SystemClock> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: ClockSource> MonotonicClock<C> {
    /// Creates a monotonic clock with a custom clock source.
    pub fn with_clock(clock: C) -> Self {
        MonotonicClock { clock, last_ms: Mutex::new(0) }
    }

    /// Raises the floor so later timestamps sort after `ms`.
    ///
    /// Called after loading persisted actions so new ones never sort before them.
    pub fn observe(&self, ms: u64) {
        let mut last = self.last_ms.lock().unwrap_or_else(|e| e.into_inner());
        if ms > *last {
            *last = ms;
        }
    }

    /// Returns the next timestamp, strictly greater than any previously issued.
    pub fn next_ms(&self) -> u64 {
        let physical = self.clock.now_ms();
        let mut last = self.last_ms.lock().unwrap_or_else(|e| e.into_inner());
        let next = if physical > *last { physical } else { *last + 1 };
        *last = next;
        next
    }

    /// Returns the underlying wall time without advancing the sequence.
    pub fn now_ms(&self) -> u64 {
        self.clock.now_ms()
    }
}

#[cfg(test)]
#[path = "clock_tests.rs"]
mod tests;
