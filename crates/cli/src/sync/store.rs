// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Durable storage for queued actions.
//!
//! The store is the durability boundary: an action saved here survives a
//! process restart until it is removed after a confirmed sync or a cancel.

use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use fs2::FileExt;
use syncq_core::{jsonl, OfflineAction};

use crate::error::{Error, Result};

/// Persistence port for the offline queue.
pub trait QueueStore: Send {
    /// Loads every persisted action.
    fn load_all(&self) -> Result<Vec<OfflineAction>>;

    /// Inserts or replaces the action with the same id.
    fn save(&mut self, action: &OfflineAction) -> Result<()>;

    /// Removes an action. Returns false if it was not stored.
    fn remove(&mut self, id: &str) -> Result<bool>;
}

/// Queue store backed by a JSONL file, one action per line.
///
/// Holds an exclusive lock on `<path>.lock` for its whole lifetime so two
/// processes never rewrite the same queue.
pub struct JsonlQueueStore {
    path: PathBuf,
    _lock: File,
}

impl JsonlQueueStore {
    /// Create or open a queue file, taking the queue lock.
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let lock = acquire_lock(path)?;

        // Ensure the file exists (create if not)
        OpenOptions::new().create(true).append(true).open(path)?;

        Ok(JsonlQueueStore {
            path: path.to_path_buf(),
            _lock: lock,
        })
    }

    /// Path of the queue file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

fn lock_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".lock");
    path.with_file_name(name)
}

fn acquire_lock(path: &Path) -> Result<File> {
    let file = OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(lock_path(path))?;
    file.try_lock_exclusive().map_err(|_| Error::QueueLocked {
        path: path.display().to_string(),
    })?;
    Ok(file)
}

impl QueueStore for JsonlQueueStore {
    fn load_all(&self) -> Result<Vec<OfflineAction>> {
        Ok(jsonl::read_all(&self.path)?)
    }

    fn save(&mut self, action: &OfflineAction) -> Result<()> {
        let mut actions: Vec<OfflineAction> = jsonl::read_all(&self.path)?;
        match actions.iter_mut().find(|a| a.id == action.id) {
            Some(existing) => {
                *existing = action.clone();
                jsonl::write_all(&self.path, &actions)?;
            }
            None => jsonl::append(&self.path, action)?,
        }
        Ok(())
    }

    fn remove(&mut self, id: &str) -> Result<bool> {
        let mut actions: Vec<OfflineAction> = jsonl::read_all(&self.path)?;
        let before = actions.len();
        actions.retain(|a| a.id != id);
        if actions.len() == before {
            return Ok(false);
        }
        jsonl::write_all(&self.path, &actions)?;
        Ok(true)
    }
}

/// In-memory queue store.
///
/// Clones share the same contents, so a test can keep a handle, drop the
/// manager and build a new one over the same "disk".
#[derive(Debug, Clone, Default)]
pub struct MemoryQueueStore {
    actions: Arc<Mutex<Vec<OfflineAction>>>,
}

impl MemoryQueueStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store pre-populated with `actions`.
    pub fn with_actions(actions: Vec<OfflineAction>) -> Self {
        MemoryQueueStore {
            actions: Arc::new(Mutex::new(actions)),
        }
    }

    /// Snapshot of the stored actions.
    pub fn snapshot(&self) -> Vec<OfflineAction> {
        self.actions
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }
}

impl QueueStore for MemoryQueueStore {
    fn load_all(&self) -> Result<Vec<OfflineAction>> {
        Ok(self.snapshot())
    }

    fn save(&mut self, action: &OfflineAction) -> Result<()> {
        let mut actions = self.actions.lock().unwrap_or_else(|e| e.into_inner());
        match actions.iter_mut().find(|a| a.id == action.id) {
            Some(existing) => *existing = action.clone(),
            None => actions.push(action.clone()),
        }
        Ok(())
    }

    fn remove(&mut self, id: &str) -> Result<bool> {
        let mut actions = self.actions.lock().unwrap_or_else(|e| e.into_inner());
        let before = actions.len();
        actions.retain(|a| a.id != id);
        Ok(actions.len() != before)
    }
}
