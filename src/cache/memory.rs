//! Memory Store Module
//!
//! Fast in-process tier: a cost-accounted table with per-entry expiry and LRU
//! eviction, behind an async mutex so every operation sees a consistent table.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::sync::Mutex;
use tracing::debug;

use crate::cache::{CacheEntry, CacheStats, LruTracker};
use crate::clock::SharedClock;
use crate::config::Config;
use crate::error::{CacheError, Result};

/// Default memory TTL applied when a write does not name one.
pub const DEFAULT_MEMORY_TTL: Duration = Duration::from_secs(5 * 60);

// == Memory Table ==
/// Synchronous table backing the memory tier.
///
/// Bounded by both entry count and total cost, where an entry's cost is its
/// serialized length. Time is passed in explicitly.
#[derive(Debug)]
pub struct MemoryTable {
    entries: HashMap<String, CacheEntry>,
    lru: LruTracker,
    stats: CacheStats,
    total_cost: usize,
    max_entries: usize,
    max_cost: usize,
}

impl MemoryTable {
    /// Creates an empty table. A zero entry limit is raised to one.
    pub fn new(max_entries: usize, max_cost: usize) -> Self {
        Self {
            entries: HashMap::new(),
            lru: LruTracker::new(),
            stats: CacheStats::new(),
            total_cost: 0,
            max_entries: max_entries.max(1),
            max_cost,
        }
    }

    // == Get ==
    /// Returns the decoded value stored under `key` if it is live at `now_ms`.
    ///
    /// Expired entries are removed. Payloads that fail to decode as `T` count
    /// as misses.
    pub fn get<T: DeserializeOwned>(&mut self, key: &str, now_ms: u64) -> Option<T> {
        let expired = match self.entries.get(key) {
            Some(entry) => entry.is_expired(now_ms),
            None => {
                self.stats.record_miss();
                return None;
            }
        };

        if expired {
            self.remove(key);
            self.stats.record_miss();
            return None;
        }

        let decoded = self
            .entries
            .get(key)
            .map(|entry| serde_json::from_slice::<T>(&entry.payload));

        match decoded {
            Some(Ok(value)) => {
                self.lru.touch(key);
                self.stats.record_hit();
                Some(value)
            }
            Some(Err(e)) => {
                debug!(key, error = %CacheError::Deserialize(e), "memory entry did not decode");
                self.stats.record_miss();
                None
            }
            None => None,
        }
    }

    // == Set ==
    /// Serializes and stores `value`, evicting entries as needed.
    ///
    /// Returns the number of live entries evicted to make room.
    pub fn set<T: Serialize + ?Sized>(
        &mut self,
        key: &str,
        value: &T,
        now_ms: u64,
        ttl: Duration,
    ) -> Result<usize> {
        let payload = serde_json::to_vec(value).map_err(CacheError::Serialize)?;
        self.insert(key, payload, now_ms, ttl)
    }

    /// Stores an already encoded payload.
    pub fn insert(
        &mut self,
        key: &str,
        payload: Vec<u8>,
        now_ms: u64,
        ttl: Duration,
    ) -> Result<usize> {
        // Overwrite replaces the old entry and its cost
        self.remove(key);

        let cost = payload.len();
        if cost > self.max_cost {
            return Err(CacheError::TooLarge {
                cost,
                limit: self.max_cost,
            });
        }

        let evicted = self.make_room(cost, now_ms);

        let ttl_ms = u64::try_from(ttl.as_millis()).unwrap_or(u64::MAX);
        self.entries
            .insert(key.to_string(), CacheEntry::new(payload, now_ms, ttl_ms));
        self.total_cost += cost;
        self.lru.touch(key);
        self.sync_occupancy();

        Ok(evicted)
    }

    /// Frees space for an entry of `cost`: expired entries go first, then the
    /// least recently used.
    fn make_room(&mut self, cost: usize, now_ms: u64) -> usize {
        if !self.would_overflow(cost) {
            return 0;
        }

        self.purge_expired(now_ms);

        let mut evicted = 0;
        while self.would_overflow(cost) {
            let Some(oldest) = self.lru.evict_oldest() else {
                break;
            };
            if let Some(entry) = self.entries.remove(&oldest) {
                self.total_cost -= entry.cost();
                self.stats.record_eviction();
                evicted += 1;
            }
        }
        evicted
    }

    fn would_overflow(&self, cost: usize) -> bool {
        self.entries.len() >= self.max_entries
            || self.total_cost.saturating_add(cost) > self.max_cost
    }

    // == Remove ==
    /// Removes an entry. Returns true if it was present.
    pub fn remove(&mut self, key: &str) -> bool {
        match self.entries.remove(key) {
            Some(entry) => {
                self.total_cost -= entry.cost();
                self.lru.remove(key);
                self.sync_occupancy();
                true
            }
            None => false,
        }
    }

    /// Removes every entry.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.lru.clear();
        self.total_cost = 0;
        self.sync_occupancy();
    }

    // == Purge Expired ==
    /// Removes all entries expired at `now_ms`, returning how many went.
    pub fn purge_expired(&mut self, now_ms: u64) -> usize {
        let expired: Vec<String> = self
            .entries
            .iter()
            .filter(|(_, entry)| entry.is_expired(now_ms))
            .map(|(key, _)| key.clone())
            .collect();

        for key in &expired {
            self.remove(key);
        }
        expired.len()
    }

    /// Returns true if a live entry exists for `key`, without touching stats
    /// or recency.
    pub fn contains_live(&self, key: &str, now_ms: u64) -> bool {
        self.entries
            .get(key)
            .is_some_and(|entry| !entry.is_expired(now_ms))
    }

    pub fn stats(&self) -> CacheStats {
        self.stats.clone()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn total_cost(&self) -> usize {
        self.total_cost
    }

    fn sync_occupancy(&mut self) {
        self.stats.set_occupancy(self.entries.len(), self.total_cost);
    }
}

// == Memory Store ==
/// Shared handle to the memory tier.
///
/// Clones share the same table. May drop any entry at any time once near its
/// bounds; never the source of truth.
#[derive(Debug, Clone)]
pub struct MemoryStore {
    table: Arc<Mutex<MemoryTable>>,
    default_ttl: Duration,
    clock: SharedClock,
}

impl MemoryStore {
    /// Creates a memory tier with the given bounds and default TTL.
    pub fn new(
        max_entries: usize,
        max_cost: usize,
        default_ttl: Duration,
        clock: SharedClock,
    ) -> Self {
        Self {
            table: Arc::new(Mutex::new(MemoryTable::new(max_entries, max_cost))),
            default_ttl,
            clock,
        }
    }

    pub fn from_config(config: &Config, clock: SharedClock) -> Self {
        Self::new(
            config.memory_max_entries,
            config.memory_max_cost,
            Duration::from_secs(config.memory_default_ttl),
            clock,
        )
    }

    /// TTL applied by `set` when none is given.
    pub fn default_ttl(&self) -> Duration {
        self.default_ttl
    }

    // == Get ==
    /// Returns the live value for `key`, or `None` on miss, expiry or decode failure.
    pub async fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let now_ms = self.clock.now_ms();
        let value = self.table.lock().await.get(key, now_ms);
        debug!(key, hit = value.is_some(), "memory get");
        value
    }

    // == Set ==
    /// Stores `value` for `ttl`, or the default TTL when `None`.
    pub async fn set<T: Serialize + ?Sized>(&self, key: &str, value: &T, ttl: Option<Duration>) {
        let ttl = ttl.unwrap_or(self.default_ttl);
        let now_ms = self.clock.now_ms();

        match self.table.lock().await.set(key, value, now_ms, ttl) {
            Ok(0) => debug!(key, ?ttl, "memory set"),
            Ok(evicted) => debug!(key, ?ttl, evicted, "memory set with eviction"),
            Err(e) => debug!(key, error = %e, "memory set skipped"),
        }
    }

    pub async fn remove(&self, key: &str) {
        self.table.lock().await.remove(key);
    }

    pub async fn clear(&self) {
        self.table.lock().await.clear();
    }

    /// Drops every entry that has already expired.
    pub async fn purge_expired(&self) -> usize {
        let now_ms = self.clock.now_ms();
        self.table.lock().await.purge_expired(now_ms)
    }

    /// Reports whether `key` currently holds a live entry.
    pub async fn contains(&self, key: &str) -> bool {
        let now_ms = self.clock.now_ms();
        self.table.lock().await.contains_live(key, now_ms)
    }

    pub async fn stats(&self) -> CacheStats {
        self.table.lock().await.stats()
    }
}
