//! Cache Manager Module
//!
//! Single entry point over both tiers: read-through with promotion from disk
//! into memory, write-through to both.

use std::sync::Arc;
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, info};

use crate::cache::{format_byte_count, CacheStats, MemoryStore, PersistentStore};
use crate::clock::{SharedClock, SystemClock};
use crate::config::Config;

// == Cache Manager ==
/// Composes the memory and persistent tiers behind one API.
///
/// No operation returns an error: misses and failures both come back as
/// `None` or complete silently.
#[derive(Debug, Clone)]
pub struct CacheManager {
    memory: MemoryStore,
    persistent: PersistentStore,
}

impl CacheManager {
    // == Constructor ==
    /// Builds a manager over existing store handles.
    pub fn new(memory: MemoryStore, persistent: PersistentStore) -> Self {
        Self { memory, persistent }
    }

    /// Builds both stores from `config` using the system clock.
    pub fn from_config(config: &Config) -> Self {
        Self::from_config_with_clock(config, Arc::new(SystemClock))
    }

    /// Builds both stores from `config` sharing `clock`.
    pub fn from_config_with_clock(config: &Config, clock: SharedClock) -> Self {
        Self::new(
            MemoryStore::from_config(config, clock.clone()),
            PersistentStore::from_config(config, clock),
        )
    }

    // == Get ==
    /// Looks up `key` in memory, then on disk.
    ///
    /// A disk hit is copied into memory with the memory tier's default TTL.
    pub async fn get<T>(&self, key: &str) -> Option<T>
    where
        T: Serialize + DeserializeOwned,
    {
        if let Some(value) = self.memory.get(key).await {
            return Some(value);
        }

        let value: T = self.persistent.get(key).await?;
        self.memory.set(key, &value, None).await;
        debug!(key, "promoted disk entry to memory");
        Some(value)
    }

    // == Set ==
    /// Writes `value` to memory (for `memory_ttl`, or the default) and to disk.
    ///
    /// The tiers are written independently; a failure in one does not undo
    /// the other.
    pub async fn set<T: Serialize + ?Sized>(
        &self,
        key: &str,
        value: &T,
        memory_ttl: Option<Duration>,
    ) {
        self.memory.set(key, value, memory_ttl).await;
        self.persistent.set(key, value).await;
    }

    // == Remove ==
    /// Removes `key` from both tiers.
    pub async fn remove(&self, key: &str) {
        self.memory.remove(key).await;
        self.persistent.remove(key).await;
    }

    // == Clear ==
    /// Empties both tiers.
    pub async fn clear_all(&self) {
        self.memory.clear().await;
        let removed = self.persistent.clear().await;
        info!(removed, "all cache tiers cleared");
    }

    /// Deletes expired files from the persistent tier.
    ///
    /// Memory entries expire lazily on read and are bounded by eviction, so
    /// only the disk is swept.
    pub async fn clear_expired(&self) -> usize {
        self.persistent.clear_expired().await
    }

    // == Size ==
    /// Bytes currently used by the persistent tier.
    pub async fn cache_size(&self) -> u64 {
        self.persistent.cache_size().await
    }

    /// Persistent tier size formatted like `"12.5 MB"`.
    pub async fn formatted_cache_size(&self) -> String {
        format_byte_count(self.cache_size().await)
    }

    /// Memory tier hit/miss/eviction counters.
    pub async fn memory_stats(&self) -> CacheStats {
        self.memory.stats().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::{DEFAULT_DISK_TTL, DEFAULT_MEMORY_TTL};
    use crate::clock::ManualClock;
    use tempfile::TempDir;

    fn manager_in(dir: &TempDir) -> (CacheManager, MemoryStore, PersistentStore) {
        let clock: SharedClock = Arc::new(ManualClock::new());
        let memory = MemoryStore::new(100, 1024 * 1024, DEFAULT_MEMORY_TTL, clock.clone());
        let persistent = PersistentStore::new(dir.path(), DEFAULT_DISK_TTL, clock);
        let manager = CacheManager::new(memory.clone(), persistent.clone());
        (manager, memory, persistent)
    }

    #[tokio::test]
    async fn test_get_before_set_is_none() {
        let dir = TempDir::new().unwrap();
        let (manager, _, _) = manager_in(&dir);

        assert_eq!(manager.get::<String>("never").await, None);
    }

    #[tokio::test]
    async fn test_set_writes_both_tiers() {
        let dir = TempDir::new().unwrap();
        let (manager, memory, persistent) = manager_in(&dir);

        manager.set("key", "value", None).await;

        assert_eq!(memory.get::<String>("key").await, Some("value".to_string()));
        assert_eq!(persistent.get::<String>("key").await, Some("value".to_string()));
    }

    #[tokio::test]
    async fn test_get_promotes_disk_hit() {
        let dir = TempDir::new().unwrap();
        let (manager, memory, persistent) = manager_in(&dir);

        persistent.set("key", &7u32).await;
        assert!(!memory.contains("key").await);

        assert_eq!(manager.get::<u32>("key").await, Some(7));
        assert!(memory.contains("key").await);
    }

    #[tokio::test]
    async fn test_remove_clears_both_tiers_even_if_one_held_it() {
        let dir = TempDir::new().unwrap();
        let (manager, memory, persistent) = manager_in(&dir);

        persistent.set("disk-only", &1u32).await;
        memory.set("memory-only", &2u32, None).await;

        manager.remove("disk-only").await;
        manager.remove("memory-only").await;

        assert_eq!(manager.get::<u32>("disk-only").await, None);
        assert_eq!(manager.get::<u32>("memory-only").await, None);
    }

    #[tokio::test]
    async fn test_formatted_cache_size() {
        let dir = TempDir::new().unwrap();
        let (manager, _, _) = manager_in(&dir);

        assert_eq!(manager.formatted_cache_size().await, "0 bytes");

        manager.set("key", &"x".repeat(1_498), None).await;

        // 1498 characters plus two quotes
        assert_eq!(manager.cache_size().await, 1_500);
        assert_eq!(manager.formatted_cache_size().await, "1.5 KB");
    }

    #[tokio::test]
    async fn test_memory_stats_after_promotion() {
        let dir = TempDir::new().unwrap();
        let (manager, _, persistent) = manager_in(&dir);

        persistent.set("key", &1u32).await;
        manager.get::<u32>("key").await;
        manager.get::<u32>("key").await;

        let stats = manager.memory_stats().await;
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.total_entries, 1);
    }
}
