// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Offline queue and replay.
//!
//! Mutations made while offline (or whose direct call failed) become
//! [`OfflineAction`]s persisted through a [`QueueStore`]. A drain replays them
//! through the breaker-guarded [`MutationApi`]:
//!
//! - oldest first, at most `max_concurrent_syncs` attempts in flight
//! - FIFO per resource type: a type whose head action is waiting (retry
//!   delay, unsynced temp id) holds back the later actions of that type
//! - a failed attempt with retry budget left blocks its type for the rest
//!   of the pass
//! - actions depending on a CREATE that failed for good wait for it to be
//!   retried, holding back only actions that touch the same targets
//! - an open breaker defers the action without spending a retry and ends
//!   the pass
//!
//! Replay outcomes are reported through [`SyncEvent`]s, never to the
//! original caller, who already got an optimistic answer.

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, Weak};

use futures_util::future::join_all;
use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;
use tokio::time::{Instant, Interval, MissedTickBehavior};

use syncq_core::{
    ActionPayload, ActionStatus, BreakerError, BreakerRegistry, BreakerStats, CircuitBreaker,
    ClockSource, MonotonicClock, OfflineAction, Operation, ResourceType, SystemClock,
};

use super::api::{self, ApiError, Applied, MutationApi};
use super::connectivity::{Connectivity, NetworkState};
use super::events::{DrainReport, QueueStatus, SyncEvent};
use super::store::QueueStore;
use crate::config::QueueConfig;
use crate::error::{Error, Result};

const EVENT_CAPACITY: usize = 256;

/// Per-call options for [`SyncManager::add_to_queue`].
#[derive(Debug, Clone, Copy, Default)]
pub struct EnqueueOptions {
    /// Overrides the configured retry budget.
    pub max_retries: Option<u32>,
    /// Start a drain right away when online.
    pub sync_immediately: bool,
}

/// Answer handed to the mutation caller.
#[derive(Debug, Clone, PartialEq)]
pub enum MutationOutcome {
    /// The backend applied the mutation directly.
    Applied(Applied),
    /// The mutation was queued; this is the optimistic result.
    Queued(OfflineAction),
}

impl MutationOutcome {
    /// Identifier the caller should use for the affected resource.
    ///
    /// The server id when applied, the temp id for a queued CREATE.
    pub fn resource_id(&self) -> Option<&str> {
        match self {
            MutationOutcome::Applied(applied) => applied.record().map(|r| r.id.as_str()),
            MutationOutcome::Queued(action) => action
                .temp_id
                .as_deref()
                .or_else(|| action.payload.resource_id()),
        }
    }

    pub fn is_queued(&self) -> bool {
        matches!(self, MutationOutcome::Queued(_))
    }
}

enum AttemptError {
    CircuitOpen { retry_in_ms: u64 },
    Failed(ApiError),
}

struct QueueState {
    /// Sorted by timestamp, oldest first.
    actions: Vec<OfflineAction>,
    store: Box<dyn QueueStore>,
}

impl QueueState {
    fn position(&self, id: &str) -> Option<usize> {
        self.actions.iter().position(|a| a.id == id)
    }

    fn status(&self) -> QueueStatus {
        let mut status = QueueStatus {
            total: self.actions.len(),
            ..QueueStatus::default()
        };
        for action in &self.actions {
            match action.status {
                ActionStatus::Pending => {
                    status.pending += 1;
                    if status.oldest_pending.is_none() {
                        status.oldest_pending = Some(action.timestamp);
                    }
                }
                ActionStatus::Syncing => status.syncing += 1,
                ActionStatus::Failed => status.failed += 1,
                ActionStatus::Success | ActionStatus::Cancelled => {}
            }
        }
        status
    }

    /// Temp ids of CREATE actions that have not reached the backend yet.
    fn unsynced_temp_ids(&self) -> HashSet<String> {
        self.actions
            .iter()
            .filter_map(|a| a.temp_id.clone())
            .collect()
    }

    /// Actions stuck behind a CREATE that failed for good.
    ///
    /// An action is stranded when it references the temp id of a failed
    /// CREATE, or touches a target of an earlier stranded action. Returns
    /// the stranded ids and every target they hold.
    fn stranded(&self) -> Stranded {
        let mut stranded = Stranded {
            ids: HashSet::new(),
            targets: self
                .actions
                .iter()
                .filter(|a| a.status == ActionStatus::Failed)
                .filter_map(|a| a.temp_id.clone())
                .collect(),
        };
        for action in &self.actions {
            if action.status != ActionStatus::Pending {
                continue;
            }
            let action_targets = targets(&action.payload);
            if action_targets.iter().any(|t| stranded.targets.contains(*t)) {
                stranded.ids.insert(action.id.clone());
                stranded
                    .targets
                    .extend(action_targets.iter().map(|t| t.to_string()));
            }
        }
        stranded
    }

    /// Puts an action whose sync did not complete back to `pending`.
    fn release(&mut self, id: &str) {
        if let Some(index) = self.position(id) {
            self.actions[index].recover_in_flight();
        }
    }
}

#[derive(Default)]
struct Stranded {
    ids: HashSet<String>,
    targets: HashSet<String>,
}

/// Targets of a payload, for overlap checks.
fn targets(payload: &ActionPayload) -> Vec<&str> {
    match payload {
        ActionPayload::Batch { items, .. } => items.iter().map(String::as_str).collect(),
        other => other.resource_id().into_iter().collect(),
    }
}

/// Offline mutation queue with breaker-guarded replay.
pub struct SyncManager {
    me: Weak<SyncManager>,
    config: QueueConfig,
    api: Arc<dyn MutationApi>,
    breaker: Arc<CircuitBreaker>,
    connectivity: Connectivity,
    clock: Arc<dyn ClockSource>,
    timestamps: MonotonicClock<Arc<dyn ClockSource>>,
    state: Mutex<QueueState>,
    events: broadcast::Sender<SyncEvent>,
    drain_lock: tokio::sync::Mutex<()>,
    rerun: AtomicBool,
}

impl SyncManager {
    /// Create a manager using the system clock.
    pub fn new(
        config: QueueConfig,
        api: Arc<dyn MutationApi>,
        store: Box<dyn QueueStore>,
        registry: &BreakerRegistry,
        connectivity: Connectivity,
    ) -> Result<Arc<Self>> {
        Self::with_clock(
            config,
            api,
            store,
            registry,
            connectivity,
            Arc::new(SystemClock),
        )
    }

    /// Create a manager with a custom clock source.
    ///
    /// Loads the store; actions left `syncing` by a crash go back to
    /// `pending`.
    pub fn with_clock(
        config: QueueConfig,
        api: Arc<dyn MutationApi>,
        mut store: Box<dyn QueueStore>,
        registry: &BreakerRegistry,
        connectivity: Connectivity,
        clock: Arc<dyn ClockSource>,
    ) -> Result<Arc<Self>> {
        config.validate()?;

        let mut actions = Vec::new();
        for mut action in store.load_all()? {
            match action.status {
                ActionStatus::Success | ActionStatus::Cancelled => {
                    store.remove(&action.id)?;
                }
                _ => {
                    if action.recover_in_flight() {
                        tracing::info!("recovered interrupted sync of action {}", action.id);
                        store.save(&action)?;
                    }
                    actions.push(action);
                }
            }
        }
        actions.sort_by_key(|a| a.timestamp);

        let timestamps = MonotonicClock::with_clock(clock.clone());
        if let Some(last) = actions.last() {
            timestamps.observe(last.timestamp);
        }
        if !actions.is_empty() {
            tracing::debug!("loaded {} queued actions", actions.len());
        }

        let breaker = registry.get(&config.breaker);
        let (events, _) = broadcast::channel(EVENT_CAPACITY);

        Ok(Arc::new_cyclic(|me| SyncManager {
            me: me.clone(),
            config,
            api,
            breaker,
            connectivity,
            clock,
            timestamps,
            state: Mutex::new(QueueState { actions, store }),
            events,
            drain_lock: tokio::sync::Mutex::new(()),
            rerun: AtomicBool::new(false),
        }))
    }

    fn lock(&self) -> MutexGuard<'_, QueueState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn emit(&self, event: SyncEvent) {
        // No subscribers is fine
        let _ = self.events.send(event);
    }

    fn emit_status(&self, state: &QueueState) {
        self.emit(SyncEvent::QueueChanged(state.status()));
    }

    /// Subscribe to queue events.
    pub fn subscribe(&self) -> broadcast::Receiver<SyncEvent> {
        self.events.subscribe()
    }

    pub fn config(&self) -> &QueueConfig {
        &self.config
    }

    pub fn connectivity(&self) -> &Connectivity {
        &self.connectivity
    }

    /// Stats of the breaker guarding replays.
    pub fn breaker_stats(&self) -> BreakerStats {
        self.breaker.stats()
    }

    /// Queues a mutation and returns the stored action.
    ///
    /// Never touches the network; with `sync_immediately` and connectivity a
    /// drain is spawned on the current tokio runtime, if there is one.
    pub fn add_to_queue(
        &self,
        operation: Operation,
        resource_type: ResourceType,
        payload: ActionPayload,
        user_id: &str,
        options: EnqueueOptions,
    ) -> Result<OfflineAction> {
        let action = self.build_action(operation, resource_type, payload, user_id, options)?;
        self.insert(action.clone())?;
        tracing::debug!(
            "queued {} {} as {}",
            action.operation,
            action.resource_type,
            action.id
        );

        if options.sync_immediately && self.connectivity.is_online() {
            self.trigger_drain();
        }
        Ok(action)
    }

    /// Applies a mutation directly when possible, queueing it otherwise.
    ///
    /// The direct call is skipped while offline, while older actions of the
    /// same resource type are still queued, or when the payload references
    /// an unsynced temp id. Any failure of the direct call falls back to the
    /// queue; only enqueue errors (such as a full queue) are returned.
    pub async fn submit(
        &self,
        operation: Operation,
        resource_type: ResourceType,
        payload: ActionPayload,
        user_id: &str,
        options: EnqueueOptions,
    ) -> Result<MutationOutcome> {
        let action = self.build_action(operation, resource_type, payload, user_id, options)?;

        if self.connectivity.is_online() && self.can_go_direct(&action) {
            match self.attempt(&action).await {
                Ok(applied) => {
                    tracing::debug!("applied {} {} directly", operation, resource_type);
                    return Ok(MutationOutcome::Applied(applied));
                }
                Err(AttemptError::CircuitOpen { retry_in_ms }) => {
                    tracing::debug!("circuit open ({}ms left), queueing", retry_in_ms);
                }
                Err(AttemptError::Failed(e)) => {
                    tracing::debug!("direct call failed, queueing: {}", e);
                }
            }
        }

        self.insert(action.clone())?;
        if options.sync_immediately && self.connectivity.is_online() {
            self.trigger_drain();
        }
        Ok(MutationOutcome::Queued(action))
    }

    fn build_action(
        &self,
        operation: Operation,
        resource_type: ResourceType,
        payload: ActionPayload,
        user_id: &str,
        options: EnqueueOptions,
    ) -> Result<OfflineAction> {
        let max_retries = options.max_retries.unwrap_or(self.config.max_retries);
        Ok(OfflineAction::new(
            operation,
            resource_type,
            payload,
            user_id,
            self.timestamps.next_ms(),
            max_retries,
        )?)
    }

    fn can_go_direct(&self, action: &OfflineAction) -> bool {
        let state = self.lock();
        let temp_ids = state.unsynced_temp_ids();
        let stranded = state.stranded();
        let backlog = state.actions.iter().any(|a| {
            a.resource_type == action.resource_type
                && a.status != ActionStatus::Failed
                && !stranded.ids.contains(&a.id)
        });
        !backlog
            && !targets(&action.payload)
                .iter()
                .any(|t| temp_ids.contains(*t) || stranded.targets.contains(*t))
    }

    fn insert(&self, action: OfflineAction) -> Result<()> {
        let mut state = self.lock();

        if state.actions.len() >= self.config.max_queue_size {
            let victim = self
                .config
                .evict_failed_when_full
                .then(|| {
                    state
                        .actions
                        .iter()
                        .position(|a| a.status == ActionStatus::Failed)
                })
                .flatten();
            let Some(index) = victim else {
                return Err(syncq_core::Error::QueueFull {
                    max: self.config.max_queue_size,
                }
                .into());
            };
            let evicted = state.actions.remove(index);
            state.store.remove(&evicted.id)?;
            tracing::warn!(
                "queue full, evicted failed action {} ({} {})",
                evicted.id,
                evicted.operation,
                evicted.resource_type
            );
            self.emit(SyncEvent::Evicted {
                action_id: evicted.id,
            });
        }

        state.store.save(&action)?;
        let index = state
            .actions
            .partition_point(|a| a.timestamp <= action.timestamp);
        state.actions.insert(index, action);
        self.emit_status(&state);
        Ok(())
    }

    /// Spawns a drain on the current runtime, if any.
    fn trigger_drain(&self) {
        let Some(me) = self.me.upgrade() else {
            return;
        };
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                handle.spawn(async move {
                    if let Err(e) = me.drain_queue().await {
                        tracing::error!("drain failed: {}", e);
                    }
                });
            }
            Err(_) => tracing::debug!("no async runtime, leaving drain to the next trigger"),
        }
    }

    /// Removes a pending or failed action.
    ///
    /// Actions in flight cannot be cancelled.
    pub fn cancel(&self, id: &str) -> Result<OfflineAction> {
        let mut state = self.lock();
        let index = state
            .position(id)
            .ok_or_else(|| syncq_core::Error::ActionNotFound(id.to_string()))?;

        let mut action = state.actions[index].clone();
        action.cancel()?;
        state.store.remove(id)?;
        state.actions.remove(index);

        tracing::debug!("cancelled action {}", id);
        self.emit(SyncEvent::Cancelled {
            action_id: id.to_string(),
        });
        self.emit_status(&state);
        Ok(action)
    }

    /// Re-arms a failed action with a fresh retry budget.
    pub fn retry(&self, id: &str) -> Result<OfflineAction> {
        let action = {
            let mut state = self.lock();
            let index = state
                .position(id)
                .ok_or_else(|| syncq_core::Error::ActionNotFound(id.to_string()))?;

            let mut action = state.actions[index].clone();
            action.rearm()?;
            state.store.save(&action)?;
            state.actions[index] = action.clone();
            self.emit_status(&state);
            action
        };

        if self.connectivity.is_online() {
            self.trigger_drain();
        }
        Ok(action)
    }

    /// Drops every action of `user_id` that is not in flight.
    ///
    /// Returns how many were removed.
    pub fn clear_user(&self, user_id: &str) -> Result<usize> {
        let mut state = self.lock();
        let doomed: Vec<String> = state
            .actions
            .iter()
            .filter(|a| a.user_id == user_id && a.status != ActionStatus::Syncing)
            .map(|a| a.id.clone())
            .collect();

        for id in &doomed {
            state.store.remove(id)?;
            state.actions.retain(|a| &a.id != id);
        }
        if !doomed.is_empty() {
            tracing::info!("cleared {} actions of user {}", doomed.len(), user_id);
            self.emit_status(&state);
        }
        Ok(doomed.len())
    }

    /// Every queued action, oldest first.
    pub fn actions(&self) -> Vec<OfflineAction> {
        self.lock().actions.clone()
    }

    /// Queued actions owned by `user_id`, oldest first.
    pub fn actions_for(&self, user_id: &str) -> Vec<OfflineAction> {
        self.lock()
            .actions
            .iter()
            .filter(|a| a.user_id == user_id)
            .cloned()
            .collect()
    }

    pub fn get(&self, id: &str) -> Option<OfflineAction> {
        let state = self.lock();
        state.position(id).map(|i| state.actions[i].clone())
    }

    pub fn len(&self) -> usize {
        self.lock().actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn status(&self) -> QueueStatus {
        self.lock().status()
    }

    /// Replays due actions until nothing more can run.
    ///
    /// A call arriving while a drain is running does not start a second
    /// one; it makes the running drain do one more pass.
    pub async fn drain_queue(&self) -> Result<DrainReport> {
        // Raised before trying the lock so a holder about to unlock sees it
        self.rerun.store(true, Ordering::SeqCst);
        let Ok(mut guard) = self.drain_lock.try_lock() else {
            return Ok(DrainReport {
                coalesced: true,
                ..DrainReport::default()
            });
        };

        let mut report = DrainReport::default();
        loop {
            self.rerun.store(false, Ordering::SeqCst);
            self.drain_pass(&mut report).await?;
            if self.rerun.swap(false, Ordering::SeqCst) {
                continue;
            }

            drop(guard);
            // A trigger may have found the lock held just before the unlock
            if !self.rerun.load(Ordering::SeqCst) {
                break;
            }
            match self.drain_lock.try_lock() {
                Ok(next) => guard = next,
                // The new holder runs the pass
                Err(_) => break,
            }
        }

        if report.attempted > 0 {
            tracing::info!(
                "drain finished: {} synced, {} retrying, {} failed, {} deferred",
                report.synced,
                report.retried,
                report.failed,
                report.deferred
            );
        }
        Ok(report)
    }

    async fn drain_pass(&self, report: &mut DrainReport) -> Result<()> {
        let mut blocked: HashSet<ResourceType> = HashSet::new();
        let mut attempted: HashSet<String> = HashSet::new();

        loop {
            if !self.connectivity.is_online() {
                tracing::debug!("offline, stopping drain");
                break;
            }

            let now = self.clock.now_ms();
            let batch = self.claim_batch(now, &blocked, &attempted)?;
            if batch.is_empty() {
                break;
            }
            report.attempted += batch.len();

            let results = join_all(batch.iter().map(|action| {
                tracing::debug!(
                    "replaying {} {} ({})",
                    action.operation,
                    action.resource_type,
                    action.id
                );
                self.attempt(action)
            }))
            .await;

            let mut circuit_open = false;
            let mut first_error = None;
            for (action, result) in batch.into_iter().zip(results) {
                attempted.insert(action.id.clone());
                let resource_type = action.resource_type;
                let outcome = match result {
                    Ok(applied) => self.finish_success(action, applied).map(|()| {
                        report.synced += 1;
                    }),
                    Err(AttemptError::CircuitOpen { retry_in_ms }) => {
                        circuit_open = true;
                        blocked.insert(resource_type);
                        let until = self.clock.now_ms().saturating_add(retry_in_ms);
                        self.finish_deferred(&action.id, until).map(|()| {
                            report.deferred += 1;
                        })
                    }
                    Err(AttemptError::Failed(e)) => {
                        self.finish_failure(&action.id, e).map(|status| {
                            if status == ActionStatus::Pending {
                                blocked.insert(resource_type);
                                report.retried += 1;
                            } else {
                                report.failed += 1;
                            }
                        })
                    }
                };
                if let Err(e) = outcome {
                    first_error.get_or_insert(e);
                }
            }

            if let Some(e) = first_error {
                return Err(e);
            }
            if circuit_open {
                tracing::debug!("circuit open, ending drain pass");
                break;
            }
        }
        Ok(())
    }

    /// Selects the next batch and marks it `syncing`.
    fn claim_batch(
        &self,
        now: u64,
        blocked: &HashSet<ResourceType>,
        attempted: &HashSet<String>,
    ) -> Result<Vec<OfflineAction>> {
        let mut state = self.lock();
        let temp_ids = state.unsynced_temp_ids();
        let stranded = state.stranded();
        let mut held: HashSet<ResourceType> = blocked.clone();
        let mut busy_targets: HashSet<String> = HashSet::new();
        let mut selected = Vec::new();

        for (index, action) in state.actions.iter().enumerate() {
            if selected.len() >= self.config.max_concurrent_syncs {
                break;
            }
            if action.status != ActionStatus::Pending || held.contains(&action.resource_type) {
                continue;
            }
            if stranded.ids.contains(&action.id) {
                // Waits for its CREATE to be retried; holds only its targets
                continue;
            }
            let action_targets = targets(&action.payload);
            let waiting = attempted.contains(&action.id)
                || !action.is_due(now)
                || action_targets.iter().any(|t| {
                    temp_ids.contains(*t)
                        || busy_targets.contains(*t)
                        || stranded.targets.contains(*t)
                });
            if waiting {
                // Later actions of this type must not overtake it
                held.insert(action.resource_type);
                continue;
            }
            busy_targets.extend(action_targets.iter().map(|t| t.to_string()));
            selected.push(index);
        }

        for &index in &selected {
            state.actions[index].begin_sync()?;
        }
        let claimed: Vec<OfflineAction> = selected
            .iter()
            .map(|&index| state.actions[index].clone())
            .collect();

        let persisted: Result<()> = claimed
            .iter()
            .try_for_each(|action| state.store.save(action));
        if let Err(e) = persisted {
            for action in &claimed {
                state.release(&action.id);
            }
            return Err(e);
        }

        if !claimed.is_empty() {
            self.emit_status(&state);
        }
        Ok(claimed)
    }

    /// Runs one call through the breaker with the per-call deadline.
    async fn attempt(&self, action: &OfflineAction) -> std::result::Result<Applied, AttemptError> {
        let api = self.api.clone();
        let timeout = self.config.apply_timeout();

        let result = self
            .breaker
            .execute(|| async move {
                match timeout {
                    Some(limit) => tokio::time::timeout(limit, api::apply(api.as_ref(), action))
                        .await
                        .unwrap_or_else(|_| Err(ApiError::Timeout(limit.as_millis() as u64))),
                    None => api::apply(api.as_ref(), action).await,
                }
            })
            .await;

        match result {
            Ok(applied) => Ok(applied),
            Err(BreakerError::Open { retry_in_ms, .. }) => {
                Err(AttemptError::CircuitOpen { retry_in_ms })
            }
            Err(BreakerError::Inner(e)) => Err(AttemptError::Failed(e)),
        }
    }

    fn finish_success(&self, mut action: OfflineAction, applied: Applied) -> Result<()> {
        let mut state = self.lock();
        let removed = action
            .mark_success()
            .map_err(Error::from)
            .and_then(|()| state.store.remove(&action.id));
        if let Err(e) = removed {
            // Applied but not persisted: replay with the same token later
            state.release(&action.id);
            return Err(e);
        }
        if let Some(index) = state.position(&action.id) {
            state.actions.remove(index);
        }

        if let (Some(temp_id), Some(record)) = (&action.temp_id, applied.record()) {
            let real_id = record.id.clone();
            let mut rewritten = 0;
            for index in 0..state.actions.len() {
                if state.actions[index]
                    .payload
                    .replace_reference(temp_id, &real_id)
                {
                    let updated = state.actions[index].clone();
                    state.store.save(&updated)?;
                    rewritten += 1;
                }
            }
            tracing::debug!(
                "reconciled {} -> {} ({} queued references)",
                temp_id,
                real_id,
                rewritten
            );
            self.emit(SyncEvent::Reconciled {
                action_id: action.id.clone(),
                resource_type: action.resource_type,
                temp_id: temp_id.clone(),
                real_id,
            });
        }

        self.emit(SyncEvent::Synced {
            action_id: action.id,
            operation: action.operation,
            resource_type: action.resource_type,
            records: applied.records().to_vec(),
        });
        self.emit_status(&state);
        Ok(())
    }

    fn finish_failure(&self, id: &str, error: ApiError) -> Result<ActionStatus> {
        let mut state = self.lock();
        let index = state
            .position(id)
            .ok_or_else(|| syncq_core::Error::ActionNotFound(id.to_string()))?;

        let retry_count = state.actions[index].retry_count.saturating_add(1);
        let retry_at = self
            .clock
            .now_ms()
            .saturating_add(self.config.retry_delay_ms(retry_count));
        let mut action = state.actions[index].clone();
        let status = action.record_failure(error.to_string(), retry_at)?;
        if let Err(e) = state.store.save(&action) {
            state.release(id);
            return Err(e);
        }
        state.actions[index] = action.clone();

        if status == ActionStatus::Failed {
            tracing::warn!(
                "action {} failed after {} attempts: {}",
                action.id,
                action.retry_count,
                error
            );
            self.emit(SyncEvent::Failed {
                action_id: action.id,
                error: error.to_string(),
            });
        } else {
            tracing::debug!(
                "action {} attempt {} failed, retrying at {}: {}",
                action.id,
                action.retry_count,
                retry_at,
                error
            );
            self.emit(SyncEvent::RetryScheduled {
                action_id: action.id,
                retry_count: action.retry_count,
                next_attempt_at: retry_at,
                error: error.to_string(),
            });
        }
        self.emit_status(&state);
        Ok(status)
    }

    fn finish_deferred(&self, id: &str, until: u64) -> Result<()> {
        let mut state = self.lock();
        let index = state
            .position(id)
            .ok_or_else(|| syncq_core::Error::ActionNotFound(id.to_string()))?;

        let mut action = state.actions[index].clone();
        action.defer(until)?;
        if let Err(e) = state.store.save(&action) {
            state.release(id);
            return Err(e);
        }
        state.actions[index] = action.clone();
        self.emit(SyncEvent::Deferred {
            action_id: action.id,
            until,
        });
        self.emit_status(&state);
        Ok(())
    }

    /// Runs reconnect-triggered and periodic drains until stopped.
    ///
    /// Dropping the returned worker stops it as well.
    pub fn spawn_background(self: &Arc<Self>) -> SyncWorker {
        let me = Arc::clone(self);
        let (shutdown, mut shutdown_rx) = watch::channel(false);
        let mut network = self.connectivity.subscribe();
        let mut was_online = *network.borrow_and_update() == NetworkState::Online;

        let handle = tokio::spawn(async move {
            let mut ticker = me.config.sync_interval().map(|period| {
                let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
                ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
                ticker
            });

            loop {
                tokio::select! {
                    _ = shutdown_rx.changed() => break,
                    changed = network.changed() => {
                        if changed.is_err() {
                            break;
                        }
                        let online = *network.borrow_and_update() == NetworkState::Online;
                        if online && !was_online && me.config.auto_sync_online {
                            tracing::info!("back online, draining offline queue");
                            me.run_drain().await;
                        }
                        was_online = online;
                    }
                    _ = tick(&mut ticker) => {
                        if me.connectivity.is_online() {
                            me.run_drain().await;
                        }
                    }
                }
            }
            tracing::debug!("sync worker stopped");
        });

        SyncWorker { shutdown, handle }
    }

    async fn run_drain(&self) {
        if let Err(e) = self.drain_queue().await {
            tracing::error!("drain failed: {}", e);
        }
    }
}

async fn tick(ticker: &mut Option<Interval>) {
    match ticker {
        Some(ticker) => {
            ticker.tick().await;
        }
        None => std::future::pending().await,
    }
}

/// Handle to the background drain task.
pub struct SyncWorker {
    shutdown: watch::Sender<bool>,
    handle: JoinHandle<()>,
}

impl SyncWorker {
    /// Stops the worker, waiting for an in-progress drain to finish.
    pub async fn stop(self) {
        let _ = self.shutdown.send(true);
        let _ = self.handle.await;
    }
}
