//! Snapshot persistence.
//!
//! A `SnapshotStore` is a string key-value blob store (browser
//! `localStorage`, an in-memory map in tests). `Persistence` sits on top of
//! it and never fails outward: storage and serialization errors are logged
//! and the editor carries on with its in-memory state.

use mc_core::GraphSnapshot;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage is unavailable: {0}")]
    Unavailable(String),

    #[error("failed to read `{key}`: {reason}")]
    Read { key: String, reason: String },

    #[error("failed to write `{key}`: {reason}")]
    Write { key: String, reason: String },

    #[error("stored map is not valid: {0}")]
    Corrupt(#[source] serde_json::Error),

    #[error("failed to serialize map: {0}")]
    Serialize(#[source] serde_json::Error),
}

pub trait SnapshotStore {
    fn read(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn write(&mut self, key: &str, value: &str) -> Result<(), StorageError>;
    fn remove(&mut self, key: &str) -> Result<(), StorageError>;
}

/// In-memory store. Clones share the same map.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: Rc<RefCell<HashMap<String, String>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<String> {
        self.entries.borrow().get(key).cloned()
    }
}

impl SnapshotStore for MemoryStore {
    fn read(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.get(key))
    }

    fn write(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.entries.borrow_mut().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        self.entries.borrow_mut().remove(key);
        Ok(())
    }
}

/// Saves and loads graph snapshots under one fixed key.
pub struct Persistence {
    store: Box<dyn SnapshotStore>,
    key: String,
}

impl Persistence {
    pub fn new(store: Box<dyn SnapshotStore>, key: impl Into<String>) -> Self {
        Self {
            store,
            key: key.into(),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Write the snapshot. Returns whether it reached the store.
    pub fn save(&mut self, snapshot: &GraphSnapshot) -> bool {
        match self.try_save(snapshot) {
            Ok(()) => {
                log::trace!("map saved under `{}`", self.key);
                true
            }
            Err(e) => {
                log::error!("failed to save map: {e}");
                false
            }
        }
    }

    /// Read the stored snapshot. `None` when nothing is stored or it could
    /// not be read.
    pub fn load(&self) -> Option<GraphSnapshot> {
        match self.try_load() {
            Ok(snapshot) => snapshot,
            Err(e) => {
                log::error!("failed to load map: {e}");
                None
            }
        }
    }

    pub fn clear(&mut self) {
        if let Err(e) = self.store.remove(&self.key) {
            log::error!("failed to clear stored map: {e}");
        }
    }

    fn try_save(&mut self, snapshot: &GraphSnapshot) -> Result<(), StorageError> {
        let json = snapshot.to_json().map_err(StorageError::Serialize)?;
        self.store.write(&self.key, &json)
    }

    fn try_load(&self) -> Result<Option<GraphSnapshot>, StorageError> {
        let Some(text) = self.store.read(&self.key)? else {
            return Ok(None);
        };
        GraphSnapshot::parse_stored(&text)
            .map(Some)
            .map_err(StorageError::Corrupt)
    }
}
