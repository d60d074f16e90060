// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Offline sync: queued mutations replayed against the backend.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │   Caller    │────►│ SyncManager │────►│ MutationApi │
//! │ (mutation)  │◄────│  + breaker  │◄────│   (trait)   │
//! └─────────────┘     └─────────────┘     └─────────────┘
//!                        │        ▲
//!                        ▼        │
//!                 ┌─────────────┐ ┌──────────────┐
//!                 │ QueueStore  │ │ Connectivity │
//!                 │  (JSONL)    │ │   (watch)    │
//!                 └─────────────┘ └──────────────┘
//! ```
//!
//! # Features
//!
//! - Direct call when online, optimistic queueing otherwise
//! - Durable JSONL queue with crash recovery of in-flight attempts
//! - Bounded concurrent replay, FIFO per resource type
//! - Temp id reconciliation after a queued CREATE lands
//! - Drain on reconnect and on a timer
//! - Injectable API, store and clock for testing

mod api;
mod connectivity;
mod events;
mod ledger;
mod manager;
mod monitor;
mod store;

pub use api::{apply, ApiError, ApiResult, Applied, MutationApi};
pub use connectivity::{Connectivity, NetworkState};
pub use events::{DrainReport, QueueStatus, SyncEvent};
pub use ledger::{Ledger, LedgerResource};
pub use manager::{EnqueueOptions, MutationOutcome, SyncManager, SyncWorker};
pub use monitor::{BreakerMonitor, Transition, DEFAULT_MONITOR_INTERVAL};
pub use store::{JsonlQueueStore, MemoryQueueStore, QueueStore};

#[cfg(test)]
mod test_helpers;
