// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Registry of circuit breakers keyed by resource name.
//!
//! The registry is owned by the composition root and handed to whatever needs
//! breaker-guarded calls. Breakers are created lazily on first lookup and live
//! as long as the registry, so every caller sharing a name observes the same
//! breaker state.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::breaker::{BreakerConfig, BreakerStats, CircuitBreaker};
use crate::clock::{ClockSource, SystemClock};

/// One breaker per resource name.
pub struct BreakerRegistry {
    default_config: BreakerConfig,
    overrides: HashMap<String, BreakerConfig>,
    clock: Arc<dyn ClockSource>,
    breakers: Mutex<HashMap<String, Arc<CircuitBreaker>>>,
}

impl BreakerRegistry {
    /// Creates a registry using the system clock.
    pub fn new(default_config: BreakerConfig) -> Self {
        Self::with_clock(default_config, Arc::new(SystemClock))
    }

    /// Creates a registry whose breakers read time from `clock`.
    pub fn with_clock(default_config: BreakerConfig, clock: Arc<dyn ClockSource>) -> Self {
        BreakerRegistry {
            default_config,
            overrides: HashMap::new(),
            clock,
            breakers: Mutex::new(HashMap::new()),
        }
    }

    /// Sets the configuration for one resource name.
    ///
    /// Only affects breakers created after the call; configuration is read
    /// once at breaker creation.
    pub fn with_config(mut self, name: impl Into<String>, config: BreakerConfig) -> Self {
        self.overrides.insert(name.into(), config);
        self
    }

    /// Configuration a breaker named `name` is (or will be) created with.
    pub fn config_for(&self, name: &str) -> BreakerConfig {
        self.overrides.get(name).copied().unwrap_or(self.default_config)
    }

    /// Returns the breaker for `name`, creating it on first use.
    pub fn get(&self, name: &str) -> Arc<CircuitBreaker> {
        let mut breakers = self.breakers.lock().unwrap_or_else(|e| e.into_inner());
        breakers
            .entry(name.to_string())
            .or_insert_with(|| {
                tracing::debug!("creating circuit breaker '{}'", name);
                Arc::new(CircuitBreaker::with_clock(
                    name,
                    self.config_for(name),
                    self.clock.clone(),
                ))
            })
            .clone()
    }

    /// Stats for an existing breaker; `None` if nothing has used `name` yet.
    pub fn stats(&self, name: &str) -> Option<BreakerStats> {
        let breakers = self.breakers.lock().unwrap_or_else(|e| e.into_inner());
        breakers.get(name).map(|b| b.stats())
    }

    /// Stats for every breaker created so far, sorted by name.
    pub fn all_stats(&self) -> Vec<BreakerStats> {
        let breakers: Vec<Arc<CircuitBreaker>> = {
            let guard = self.breakers.lock().unwrap_or_else(|e| e.into_inner());
            guard.values().cloned().collect()
        };
        let mut stats: Vec<BreakerStats> = breakers.iter().map(|b| b.stats()).collect();
        stats.sort_by(|a, b| a.name.cmp(&b.name));
        stats
    }
}

impl Default for BreakerRegistry {
    fn default() -> Self {
        Self::new(BreakerConfig::default())
    }
}

#[cfg(test)]
#[path = "registry_tests.rs"]
mod tests;
