//! Per-path resource cache.
//!
//! Each resolved path owns one `OnceCell`. The first caller runs the load;
//! concurrent callers for the same path await that same cell, so a path is
//! fetched and decoded at most once. Failures are stored too: a failed path
//! keeps reporting the same error instead of being retried.

use crate::error::AssetError;
use crate::resource::Resource;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::OnceCell;

pub(crate) type Slot = Arc<OnceCell<Result<Resource, AssetError>>>;

#[derive(Debug, Default)]
pub struct ResourceCache {
    slots: Mutex<HashMap<String, Slot>>,
}

impl ResourceCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// The cell for `key`, created empty on first request.
    pub(crate) fn slot(&self, key: &str) -> Slot {
        let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
        slots.entry(key.to_string()).or_default().clone()
    }

    /// Completed outcome for `key`, if its load has finished.
    pub fn get(&self, key: &str) -> Option<Result<Resource, AssetError>> {
        let slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
        slots.get(key).and_then(|slot| slot.get().cloned())
    }

    /// Paths with a cell, finished or in flight.
    pub fn len(&self) -> usize {
        self.slots.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Paths whose load has finished (successfully or not), sorted.
    pub fn keys(&self) -> Vec<String> {
        let slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
        let mut keys: Vec<String> = slots
            .iter()
            .filter(|(_, slot)| slot.initialized())
            .map(|(key, _)| key.clone())
            .collect();
        keys.sort();
        keys
    }
}
