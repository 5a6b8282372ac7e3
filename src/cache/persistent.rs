//! Persistent Store Module
//!
//! Durable tier: one JSON file per key in a dedicated directory, expired by
//! file modification time. Every I/O failure degrades to a miss or a no-op.

use std::fs::Metadata;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, SystemTime};

use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::io::AsyncWriteExt;
use tokio::sync::{Mutex, OnceCell};
use tracing::{debug, info, warn};

use crate::clock::SharedClock;
use crate::config::Config;
use crate::error::{CacheError, Result};

/// Default persistent TTL, measured from the file's last write.
pub const DEFAULT_DISK_TTL: Duration = Duration::from_secs(30 * 24 * 60 * 60);

/// Maps a logical key to its file name.
///
/// Every character outside `[A-Za-z0-9_-]` becomes `_`. The mapping is
/// many-to-one: `a.b` and `a/b` share a file and the last writer wins.
pub fn sanitize_key(key: &str) -> String {
    if key.is_empty() {
        return "_".to_string();
    }
    key.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '_' || c == '-' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

// == Persistent Store ==
/// Shared handle to the persistent tier. Clones share one operation gate.
#[derive(Debug, Clone)]
pub struct PersistentStore {
    inner: Arc<Inner>,
}

#[derive(Debug)]
struct Inner {
    dir: PathBuf,
    ttl: Duration,
    clock: SharedClock,
    /// Serializes operations on the directory
    gate: Mutex<()>,
    /// Set once the directory has been created (or creation failed)
    dir_ready: OnceCell<bool>,
}

impl PersistentStore {
    /// Creates a store rooted at `dir`. The directory is created on first use.
    pub fn new(dir: impl Into<PathBuf>, ttl: Duration, clock: SharedClock) -> Self {
        Self {
            inner: Arc::new(Inner {
                dir: dir.into(),
                ttl,
                clock,
                gate: Mutex::new(()),
                dir_ready: OnceCell::new(),
            }),
        }
    }

    pub fn from_config(config: &Config, clock: SharedClock) -> Self {
        Self::new(
            config.cache_dir.clone(),
            Duration::from_secs(config.disk_ttl),
            clock,
        )
    }

    pub fn dir(&self) -> &Path {
        &self.inner.dir
    }

    pub fn ttl(&self) -> Duration {
        self.inner.ttl
    }

    /// File that holds `key`.
    pub fn path_for(&self, key: &str) -> PathBuf {
        self.inner.dir.join(sanitize_key(key))
    }

    // == Get ==
    /// Returns the value stored for `key` if its file exists, is within TTL
    /// and decodes as `T`.
    ///
    /// Expired files are deleted. Undecodable files are left in place.
    pub async fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let _guard = self.inner.gate.lock().await;
        self.ensure_dir().await;

        let path = self.path_for(key);
        let bytes = match self.read_live(&path).await {
            Ok(Some(bytes)) => bytes,
            Ok(None) => {
                debug!(key, "disk miss");
                return None;
            }
            Err(e) => {
                log_io_failure("disk read", &e);
                return None;
            }
        };

        match serde_json::from_slice(&bytes) {
            Ok(value) => {
                debug!(key, bytes = bytes.len(), "disk hit");
                Some(value)
            }
            Err(e) => {
                debug!(key, error = %CacheError::Deserialize(e), "disk entry did not decode");
                None
            }
        }
    }

    /// Reads `path` unless it is missing or expired; expired files are removed.
    async fn read_live(&self, path: &Path) -> Result<Option<Vec<u8>>> {
        let metadata = match tokio::fs::metadata(path).await {
            Ok(metadata) => metadata,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(CacheError::io(path, e)),
        };

        if self.is_expired(&metadata) {
            debug!(path = %path.display(), "disk entry expired");
            if let Err(e) = tokio::fs::remove_file(path).await {
                log_io_failure("disk remove", &CacheError::io(path, e));
            }
            return Ok(None);
        }

        match tokio::fs::read(path).await {
            Ok(bytes) => Ok(Some(bytes)),
            // Removed between the stat and the read
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(CacheError::io(path, e)),
        }
    }

    // == Set ==
    /// Serializes `value` and replaces the key's file atomically.
    ///
    /// Failures are logged and otherwise ignored.
    pub async fn set<T: Serialize + ?Sized>(&self, key: &str, value: &T) {
        let bytes = match serde_json::to_vec(value) {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!(key, error = %CacheError::Serialize(e), "disk set skipped");
                return;
            }
        };

        let _guard = self.inner.gate.lock().await;
        self.ensure_dir().await;

        let path = self.path_for(key);
        match self.write_atomic(&path, &bytes).await {
            Ok(()) => debug!(key, bytes = bytes.len(), "disk set"),
            Err(e) => log_io_failure("disk write", &e),
        }
    }

    /// Writes to a sibling temp file, stamps its modification time from the
    /// store's clock, then renames it over `path`.
    async fn write_atomic(&self, path: &Path, bytes: &[u8]) -> Result<()> {
        // Sanitized names never contain '.', so the temp name cannot shadow a key
        let temp_path = path.with_extension("tmp");

        let result = self.write_temp(&temp_path, bytes).await;
        let result = match result {
            Ok(()) => tokio::fs::rename(&temp_path, path)
                .await
                .map_err(|e| CacheError::io(path, e)),
            Err(e) => Err(e),
        };

        if result.is_err() {
            let _ = tokio::fs::remove_file(&temp_path).await;
        }
        result
    }

    async fn write_temp(&self, temp_path: &Path, bytes: &[u8]) -> Result<()> {
        let io_err = |e| CacheError::io(temp_path, e);

        let mut file = tokio::fs::File::create(temp_path).await.map_err(io_err)?;
        file.write_all(bytes).await.map_err(io_err)?;
        file.flush().await.map_err(io_err)?;

        let modified = SystemTime::from(self.inner.clock.now());
        let file = file.into_std().await;
        file.set_modified(modified).map_err(io_err)?;
        Ok(())
    }

    // == Remove ==
    /// Deletes the key's file. Missing files and failures are ignored.
    pub async fn remove(&self, key: &str) {
        let _guard = self.inner.gate.lock().await;

        let path = self.path_for(key);
        if let Err(e) = tokio::fs::remove_file(&path).await {
            log_io_failure("disk remove", &CacheError::io(path, e));
        }
    }

    // == Clear ==
    /// Deletes every file in the cache directory, returning how many went.
    pub async fn clear(&self) -> usize {
        let _guard = self.inner.gate.lock().await;

        let mut removed = 0;
        for (path, _) in self.list_files().await {
            match tokio::fs::remove_file(&path).await {
                Ok(()) => removed += 1,
                Err(e) => log_io_failure("disk clear", &CacheError::io(path, e)),
            }
        }
        info!(removed, "disk cache cleared");
        removed
    }

    // == Clear Expired ==
    /// Deletes every file past its TTL, returning how many went.
    pub async fn clear_expired(&self) -> usize {
        let _guard = self.inner.gate.lock().await;

        let mut removed = 0;
        for (path, metadata) in self.list_files().await {
            if !self.is_expired(&metadata) {
                continue;
            }
            match tokio::fs::remove_file(&path).await {
                Ok(()) => removed += 1,
                Err(e) => log_io_failure("disk sweep", &CacheError::io(path, e)),
            }
        }
        removed
    }

    // == Cache Size ==
    /// Sums the byte length of every file in the cache directory.
    pub async fn cache_size(&self) -> u64 {
        let _guard = self.inner.gate.lock().await;

        self.list_files()
            .await
            .iter()
            .map(|(_, metadata)| metadata.len())
            .sum()
    }

    /// Lists regular files in the cache directory. Unreadable entries are skipped.
    async fn list_files(&self) -> Vec<(PathBuf, Metadata)> {
        let dir = &self.inner.dir;
        let mut entries = match tokio::fs::read_dir(dir).await {
            Ok(entries) => entries,
            Err(e) => {
                log_io_failure("disk list", &CacheError::io(dir, e));
                return Vec::new();
            }
        };

        let mut files = Vec::new();
        loop {
            let entry = match entries.next_entry().await {
                Ok(Some(entry)) => entry,
                Ok(None) => break,
                Err(e) => {
                    log_io_failure("disk list", &CacheError::io(dir, e));
                    break;
                }
            };
            match entry.metadata().await {
                Ok(metadata) if metadata.is_file() => files.push((entry.path(), metadata)),
                Ok(_) => {}
                Err(e) => log_io_failure("disk stat", &CacheError::io(entry.path(), e)),
            }
        }
        files
    }

    /// A file is expired once `modified + ttl < now`. Files without a readable
    /// modification time are never expired by age.
    fn is_expired(&self, metadata: &Metadata) -> bool {
        let Ok(modified) = metadata.modified() else {
            return false;
        };
        let now = SystemTime::from(self.inner.clock.now());
        modified
            .checked_add(self.inner.ttl)
            .is_some_and(|expires| expires < now)
    }

    async fn ensure_dir(&self) {
        let dir = &self.inner.dir;
        self.inner
            .dir_ready
            .get_or_init(|| async {
                match tokio::fs::create_dir_all(dir).await {
                    Ok(()) => true,
                    Err(e) => {
                        warn!(dir = %dir.display(), error = %e, "cache directory unavailable");
                        false
                    }
                }
            })
            .await;
    }
}

fn log_io_failure(op: &str, error: &CacheError) {
    if error.is_not_found() {
        debug!(op, error = %error, "nothing to do");
    } else {
        warn!(op, error = %error, "cache I/O failed");
    }
}
