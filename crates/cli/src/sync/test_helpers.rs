// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Shared test helpers for sync module tests.

#![allow(clippy::unwrap_used)]

use std::sync::Arc;

use serde_json::json;
use syncq_core::{ActionPayload, BreakerConfig, BreakerRegistry, ManualClock};
use tokio::sync::broadcast;

use super::api_tests::MockApi;
use super::{Connectivity, MemoryQueueStore, NetworkState, SyncEvent, SyncManager};
use crate::config::QueueConfig;

pub const USER: &str = "user-1";
pub const START_MS: u64 = 1_000_000;

/// Queue settings with the periodic timer off and a short call deadline.
pub fn test_config() -> QueueConfig {
    QueueConfig {
        sync_interval_ms: 0,
        apply_timeout_ms: 1_000,
        ..QueueConfig::default()
    }
}

/// A CREATE payload whose title shows up in the mock's call log.
pub fn create_payload(title: &str) -> ActionPayload {
    ActionPayload::create(json!({ "title": title }))
}

/// A manager wired to mocks, plus handles on every collaborator.
pub struct Harness {
    pub manager: Arc<SyncManager>,
    pub api: Arc<MockApi>,
    pub store: MemoryQueueStore,
    pub clock: Arc<ManualClock>,
    pub registry: Arc<BreakerRegistry>,
    pub connectivity: Connectivity,
    config: QueueConfig,
}

impl Harness {
    pub fn new(config: QueueConfig) -> Self {
        Self::build(
            config,
            MockApi::new(),
            MemoryQueueStore::new(),
            BreakerConfig::default(),
            NetworkState::Online,
        )
    }

    pub fn build(
        config: QueueConfig,
        api: MockApi,
        store: MemoryQueueStore,
        breaker: BreakerConfig,
        network: NetworkState,
    ) -> Self {
        let clock = Arc::new(ManualClock::new(START_MS));
        let registry = Arc::new(BreakerRegistry::with_clock(breaker, clock.clone()));
        let connectivity = Connectivity::new(network);
        let api = Arc::new(api);
        let manager = SyncManager::with_clock(
            config.clone(),
            api.clone(),
            Box::new(store.clone()),
            &registry,
            connectivity.clone(),
            clock.clone(),
        )
        .unwrap();

        Harness {
            manager,
            api,
            store,
            clock,
            registry,
            connectivity,
            config,
        }
    }

    /// Builds a fresh manager over the same store, as after a process restart.
    pub fn restart(&self) -> Arc<SyncManager> {
        SyncManager::with_clock(
            self.config.clone(),
            self.api.clone(),
            Box::new(self.store.clone()),
            &self.registry,
            self.connectivity.clone(),
            self.clock.clone(),
        )
        .unwrap()
    }
}

/// Collects the events already buffered in `rx`.
pub fn take_events(rx: &mut broadcast::Receiver<SyncEvent>) -> Vec<SyncEvent> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}
