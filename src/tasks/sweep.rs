//! Expiry Sweep Task
//!
//! Background task that periodically deletes expired persistent entries.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::cache::CacheManager;

/// Spawns a background task that runs `clear_expired` every `interval`.
///
/// The first sweep happens after one full interval. Abort the returned
/// handle to stop it.
///
/// # Example
/// ```ignore
/// let manager = Arc::new(CacheManager::from_config(&config));
/// let sweep_handle = spawn_expiry_sweep(manager.clone(), Duration::from_secs(3600));
/// // Later, during shutdown:
/// sweep_handle.abort();
/// ```
pub fn spawn_expiry_sweep(manager: Arc<CacheManager>, interval: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        info!(?interval, "Starting expiry sweep task");

        loop {
            tokio::time::sleep(interval).await;

            let removed = manager.clear_expired().await;

            if removed > 0 {
                info!("Expiry sweep: removed {} expired entries", removed);
            } else {
                debug!("Expiry sweep: no expired entries found");
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::{MemoryStore, PersistentStore, DEFAULT_DISK_TTL, DEFAULT_MEMORY_TTL};
    use crate::clock::ManualClock;
    use tempfile::TempDir;

    const DAY: Duration = Duration::from_secs(24 * 60 * 60);

    fn setup(dir: &TempDir, clock: &ManualClock) -> (Arc<CacheManager>, PersistentStore) {
        let clock = Arc::new(clock.clone());
        let memory = MemoryStore::new(10, 1024, DEFAULT_MEMORY_TTL, clock.clone());
        let persistent = PersistentStore::new(dir.path(), DEFAULT_DISK_TTL, clock);
        let manager = Arc::new(CacheManager::new(memory, persistent.clone()));
        (manager, persistent)
    }

    #[tokio::test]
    async fn test_sweep_removes_expired_files() {
        let dir = TempDir::new().unwrap();
        let clock = ManualClock::new();
        let (manager, persistent) = setup(&dir, &clock);

        manager.set("expire_soon", "value", None).await;
        clock.advance(31 * DAY);

        let handle = spawn_expiry_sweep(manager.clone(), Duration::from_millis(50));
        tokio::time::sleep(Duration::from_millis(300)).await;

        assert!(!persistent.path_for("expire_soon").exists());
        handle.abort();
    }

    #[tokio::test]
    async fn test_sweep_preserves_live_files() {
        let dir = TempDir::new().unwrap();
        let clock = ManualClock::new();
        let (manager, persistent) = setup(&dir, &clock);

        manager.set("long_lived", "value", None).await;
        clock.advance(DAY);

        let handle = spawn_expiry_sweep(manager.clone(), Duration::from_millis(50));
        tokio::time::sleep(Duration::from_millis(300)).await;

        assert_eq!(
            persistent.get::<String>("long_lived").await,
            Some("value".to_string())
        );
        handle.abort();
    }

    #[tokio::test]
    async fn test_sweep_can_be_aborted() {
        let dir = TempDir::new().unwrap();
        let (manager, _) = setup(&dir, &ManualClock::new());

        let handle = spawn_expiry_sweep(manager, Duration::from_secs(1));
        handle.abort();

        tokio::time::sleep(Duration::from_millis(100)).await;
        assert!(handle.is_finished(), "Task should be finished after abort");
    }
}
