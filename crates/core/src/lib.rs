// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! syncq-core: Shared library for the syncq offline sync engine
//!
//! This crate provides the queued-mutation model, the circuit breaker that
//! guards backend calls, and the persistence primitives used by the `syncq`
//! sync manager and CLI.

pub mod action;
pub mod breaker;
pub mod clock;
pub mod error;
pub mod jsonl;
pub mod registry;

pub use action::{
    is_temp_id, ActionPayload, ActionStatus, BatchAction, OfflineAction, Operation, ResourceType,
    ServerRecord, DEFAULT_MAX_RETRIES,
};
pub use breaker::{BreakerConfig, BreakerError, BreakerStats, CircuitBreaker, CircuitState};
pub use clock::{ClockSource, ManualClock, MonotonicClock, SystemClock};
pub use error::{Error, Result};
pub use registry::BreakerRegistry;
