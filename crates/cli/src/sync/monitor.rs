// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Periodic breaker state logging.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use syncq_core::{BreakerRegistry, CircuitState};
use tokio::task::JoinHandle;

/// Polling period used when none is configured.
pub const DEFAULT_MONITOR_INTERVAL: Duration = Duration::from_secs(30);

/// A state change seen between two polls.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    pub name: String,
    pub from: CircuitState,
    pub to: CircuitState,
}

/// Polls every breaker in a registry and logs state transitions.
pub struct BreakerMonitor {
    registry: Arc<BreakerRegistry>,
    last_seen: HashMap<String, CircuitState>,
}

impl BreakerMonitor {
    pub fn new(registry: Arc<BreakerRegistry>) -> Self {
        BreakerMonitor {
            registry,
            last_seen: HashMap::new(),
        }
    }

    /// Takes one snapshot and returns the transitions since the last one.
    ///
    /// Breakers start closed, so one first seen open reports closed -> open.
    pub fn poll(&mut self) -> Vec<Transition> {
        let mut transitions = Vec::new();
        for stats in self.registry.all_stats() {
            let from = self
                .last_seen
                .insert(stats.name.clone(), stats.state)
                .unwrap_or(CircuitState::Closed);
            if from == stats.state {
                continue;
            }

            match stats.state {
                CircuitState::Open => tracing::warn!(
                    "circuit '{}' is open ({} failures, last at {:?})",
                    stats.name,
                    stats.failures,
                    stats.last_failure_time
                ),
                CircuitState::HalfOpen => {
                    tracing::info!("circuit '{}' is half-open", stats.name)
                }
                CircuitState::Closed => {
                    tracing::info!("circuit '{}' recovered (was {})", stats.name, from)
                }
            }
            transitions.push(Transition {
                name: stats.name,
                from,
                to: stats.state,
            });
        }
        transitions
    }

    /// Polls every `interval` on the current runtime until aborted.
    pub fn spawn(mut self, interval: Duration) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            loop {
                ticker.tick().await;
                self.poll();
            }
        })
    }
}
