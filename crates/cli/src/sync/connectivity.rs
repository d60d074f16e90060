// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Online/offline signal.
//!
//! Whatever detects the network (a platform hook, a health probe, the CLI)
//! publishes into a [`Connectivity`]; the sync manager subscribes to drain the
//! queue on the offline to online edge.

use std::fmt;
use std::sync::Arc;

use tokio::sync::watch;

/// Network reachability as last reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NetworkState {
    Online,
    Offline,
}

impl fmt::Display for NetworkState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NetworkState::Online => write!(f, "online"),
            NetworkState::Offline => write!(f, "offline"),
        }
    }
}

/// Shared, observable connectivity state.
///
/// Clones publish to and read from the same channel.
#[derive(Debug, Clone)]
pub struct Connectivity {
    tx: Arc<watch::Sender<NetworkState>>,
}

impl Connectivity {
    pub fn new(initial: NetworkState) -> Self {
        let (tx, _rx) = watch::channel(initial);
        Connectivity { tx: Arc::new(tx) }
    }

    /// Publishes a new state. Returns true if it differs from the previous one.
    pub fn set(&self, state: NetworkState) -> bool {
        let changed = self.tx.send_if_modified(|current| {
            if *current == state {
                false
            } else {
                *current = state;
                true
            }
        });
        if changed {
            tracing::info!("network is now {}", state);
        }
        changed
    }

    pub fn state(&self) -> NetworkState {
        *self.tx.borrow()
    }

    pub fn is_online(&self) -> bool {
        self.state() == NetworkState::Online
    }

    /// Receiver notified on every state change.
    pub fn subscribe(&self) -> watch::Receiver<NetworkState> {
        self.tx.subscribe()
    }
}

impl Default for Connectivity {
    fn default() -> Self {
        Self::new(NetworkState::Online)
    }
}
