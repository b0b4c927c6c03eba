use log::{debug, info};
use std::sync::Arc;
use tokio::sync::broadcast;

use crate::cache::CatalogCache;
use crate::errors::CoreError;
use crate::models::pin::{
    AddOutcome, OverflowPrompt, PinEvent, RemoveOutcome, ReplaceOutcome, ToggleOutcome,
};
use crate::models::settings::Settings;
use crate::storage::format::{decode_pin_set, encode_pin_set};
use crate::storage::KeyValueStore;

use super::toggle::PinToggle;

const PIN_EVENT_CHANNEL_CAPACITY: usize = 64;

/// Bounded, persisted set of pinned coin ids.
///
/// The store is the single source of truth: every operation re-reads the
/// persisted set and writes back a full replacement. No lock spans the read
/// and the write, so two surfaces mutating at once resolve as
/// last-writer-wins.
///
/// Every successful mutation is published to subscribers as a `PinEvent`.
pub struct PinSetManager {
    store: Arc<dyn KeyValueStore>,
    key: String,
    capacity: usize,
    events: broadcast::Sender<PinEvent>,
}

impl PinSetManager {
    pub fn new(store: Arc<dyn KeyValueStore>, key: impl Into<String>, capacity: usize) -> Self {
        let (events, _rx) = broadcast::channel(PIN_EVENT_CHANNEL_CAPACITY);
        Self {
            store,
            key: key.into(),
            capacity,
            events,
        }
    }

    pub fn from_settings(store: Arc<dyn KeyValueStore>, settings: &Settings) -> Self {
        Self::new(store, settings.pin_storage_key.clone(), settings.pin_capacity)
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    fn read(&self) -> Result<Vec<String>, CoreError> {
        let raw = self.store.get(&self.key)?;
        decode_pin_set(raw.as_deref())
    }

    fn write(&self, ids: &[String]) -> Result<(), CoreError> {
        self.store.set(&self.key, &encode_pin_set(ids)?)
    }

    fn emit(&self, event: PinEvent) {
        // No subscribers is fine; nothing is rendered yet.
        let _ = self.events.send(event);
    }

    /// Whether `id` is in the persisted set.
    pub fn is_pinned(&self, id: &str) -> Result<bool, CoreError> {
        Ok(self.read()?.iter().any(|p| p == id))
    }

    /// All pinned ids in pin order.
    pub fn list(&self) -> Result<Vec<String>, CoreError> {
        self.read()
    }

    pub fn len(&self) -> Result<usize, CoreError> {
        Ok(self.read()?.len())
    }

    pub fn is_empty(&self) -> Result<bool, CoreError> {
        Ok(self.len()? == 0)
    }

    /// Pin `id`.
    ///
    /// Capacity is checked before the id is applied: a full set is left
    /// untouched and `AlreadyFull` is returned so the caller can prompt.
    pub fn add(&self, id: &str) -> Result<AddOutcome, CoreError> {
        let mut ids = self.read()?;
        if ids.iter().any(|p| p == id) {
            return Ok(AddOutcome::NoOp);
        }
        if ids.len() >= self.capacity {
            debug!("Pin set full ({}); rejected {id}", ids.len());
            return Ok(AddOutcome::AlreadyFull);
        }

        ids.push(id.to_string());
        self.write(&ids)?;
        self.emit(PinEvent::Added(id.to_string()));
        Ok(AddOutcome::Added)
    }

    /// Pin `id` or fail with `CapacityExceeded` if the set is full.
    pub fn try_add(&self, id: &str) -> Result<AddOutcome, CoreError> {
        match self.add(id)? {
            AddOutcome::AlreadyFull => Err(CoreError::CapacityExceeded {
                capacity: self.capacity,
                rejected: id.to_string(),
            }),
            outcome => Ok(outcome),
        }
    }

    /// Unpin the first occurrence of `id`.
    ///
    /// The set is written back even when unchanged, which normalizes the
    /// stored format.
    pub fn remove(&self, id: &str) -> Result<RemoveOutcome, CoreError> {
        let mut ids = self.read()?;
        let outcome = match ids.iter().position(|p| p == id) {
            Some(idx) => {
                ids.remove(idx);
                RemoveOutcome::Removed
            }
            None => RemoveOutcome::NoOp,
        };

        self.write(&ids)?;
        if outcome == RemoveOutcome::Removed {
            self.emit(PinEvent::Removed(id.to_string()));
        }
        Ok(outcome)
    }

    /// Swap pinned `evict` for `candidate` in one write.
    ///
    /// The candidate takes the evicted coin's position.
    pub fn replace(&self, evict: &str, candidate: &str) -> Result<ReplaceOutcome, CoreError> {
        let mut ids = self.read()?;
        if ids.iter().any(|p| p == candidate) {
            return Ok(ReplaceOutcome::NoOp);
        }
        let Some(idx) = ids.iter().position(|p| p == evict) else {
            return Ok(ReplaceOutcome::NotPinned);
        };

        ids[idx] = candidate.to_string();
        self.write(&ids)?;
        self.emit(PinEvent::Removed(evict.to_string()));
        self.emit(PinEvent::Added(candidate.to_string()));
        info!("Unpinned {evict} in favour of {candidate}");
        Ok(ReplaceOutcome::Replaced)
    }

    /// Data for the "limit reached" dialog.
    pub fn overflow_prompt(&self, candidate: &str) -> Result<OverflowPrompt, CoreError> {
        Ok(OverflowPrompt {
            pinned: self.read()?,
            candidate: candidate.to_string(),
        })
    }

    /// Apply a toggle control's new state.
    pub fn set_pinned(&self, id: &str, checked: bool) -> Result<ToggleOutcome, CoreError> {
        if !checked {
            return Ok(match self.remove(id)? {
                RemoveOutcome::Removed => ToggleOutcome::Unpinned,
                RemoveOutcome::NoOp => ToggleOutcome::Unchanged,
            });
        }
        Ok(match self.add(id)? {
            AddOutcome::Added => ToggleOutcome::Pinned,
            AddOutcome::NoOp => ToggleOutcome::Unchanged,
            AddOutcome::AlreadyFull => ToggleOutcome::Overflow(self.overflow_prompt(id)?),
        })
    }

    /// Checked state a control for `id` should show right now.
    pub fn sync_toggle_state(&self, id: &str) -> Result<bool, CoreError> {
        self.is_pinned(id)
    }

    /// Drop pinned ids the catalog no longer lists. Returns the dropped ids.
    pub fn prune_missing(&self, catalog: &CatalogCache) -> Result<Vec<String>, CoreError> {
        let ids = self.read()?;
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let (kept, removed): (Vec<String>, Vec<String>) =
            ids.into_iter().partition(|id| catalog.contains_id(id));
        if removed.is_empty() {
            return Ok(removed);
        }

        self.write(&kept)?;
        info!("Removed {} pinned coins missing from the catalog", removed.len());
        self.emit(PinEvent::Pruned(removed.clone()));
        Ok(removed)
    }

    /// Unpin everything.
    pub fn clear(&self) -> Result<(), CoreError> {
        let ids = self.read()?;
        self.store.remove(&self.key)?;
        if !ids.is_empty() {
            self.emit(PinEvent::Pruned(ids));
        }
        Ok(())
    }

    /// Receive every future change.
    pub fn subscribe(&self) -> broadcast::Receiver<PinEvent> {
        self.events.subscribe()
    }

    /// Observer for one rendered toggle control bound to `id`.
    pub fn toggle(&self, id: &str) -> Result<PinToggle, CoreError> {
        let events = self.subscribe();
        let checked = self.sync_toggle_state(id)?;
        Ok(PinToggle::new(id, checked, events))
    }
}
