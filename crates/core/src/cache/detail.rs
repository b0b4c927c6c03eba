use log::debug;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::time::Instant;

use crate::models::detail::CoinDetail;
use crate::scheduler::{ScheduledTask, Scheduler};

struct CachedDetail {
    detail: CoinDetail,
    inserted_at: Instant,
    generation: u64,
    eviction: ScheduledTask,
}

type Entries = Arc<Mutex<HashMap<String, CachedDetail>>>;

/// Short-lived cache of "more info" records.
///
/// Eviction is time-driven: each `put` schedules the removal of exactly the
/// record it inserted, `ttl` after insertion. Reads never extend a record's
/// life. Replacing or invalidating a record cancels its pending eviction.
pub struct DetailCache {
    entries: Entries,
    ttl: Duration,
    scheduler: Arc<dyn Scheduler>,
    next_generation: AtomicU64,
}

impl DetailCache {
    pub fn new(ttl: Duration, scheduler: Arc<dyn Scheduler>) -> Self {
        Self {
            entries: Arc::new(Mutex::new(HashMap::new())),
            ttl,
            scheduler,
            next_generation: AtomicU64::new(0),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Cached record for `id`, if still alive.
    ///
    /// Expiry is also checked here, so a late timer never exposes a record
    /// past its TTL.
    pub fn get(&self, id: &str) -> Option<CoinDetail> {
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        let expired = entries
            .get(id)
            .is_some_and(|cached| cached.inserted_at.elapsed() >= self.ttl);
        if expired {
            if let Some(stale) = entries.remove(id) {
                stale.eviction.cancel();
            }
            return None;
        }
        entries.get(id).map(|cached| cached.detail.clone())
    }

    /// Insert `detail`, replacing any record with the same id.
    pub fn put(&self, detail: CoinDetail) {
        let id = detail.id.clone();
        let generation = self.next_generation.fetch_add(1, Ordering::SeqCst);

        let weak = Arc::downgrade(&self.entries);
        let evict_id = id.clone();
        let eviction = self.scheduler.schedule(
            self.ttl,
            Box::new(move || {
                let Some(entries) = weak.upgrade() else {
                    return;
                };
                let mut entries = entries.lock().unwrap_or_else(|e| e.into_inner());
                if entries
                    .get(&evict_id)
                    .is_some_and(|cached| cached.generation == generation)
                {
                    entries.remove(&evict_id);
                    debug!("Evicted cached detail for {evict_id}");
                }
            }),
        );

        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        let previous = entries.insert(
            id,
            CachedDetail {
                detail,
                inserted_at: Instant::now(),
                generation,
                eviction,
            },
        );
        if let Some(previous) = previous {
            previous.eviction.cancel();
        }
    }

    /// Drop the record for `id` now. Returns whether one was present.
    pub fn invalidate(&self, id: &str) -> bool {
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        match entries.remove(id) {
            Some(cached) => {
                cached.eviction.cancel();
                true
            }
            None => false,
        }
    }

    /// Drop every record and cancel every pending eviction.
    pub fn clear(&self) {
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        for (_, cached) in entries.drain() {
            cached.eviction.cancel();
        }
    }

    /// Number of records held, including ones whose timer has not fired yet.
    pub fn len(&self) -> usize {
        self.entries.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Drop for DetailCache {
    fn drop(&mut self) {
        self.clear();
    }
}
