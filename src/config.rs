//! Configuration Module
//!
//! Handles loading cache tier limits and locations from environment variables.

use std::env;
use std::path::PathBuf;
use std::str::FromStr;

/// Name of the cache subdirectory under the platform cache location.
pub const CACHE_DIR_NAME: &str = "tiered-cache";

/// Cache configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// Maximum number of entries held by the memory tier
    pub memory_max_entries: usize,
    /// Maximum total payload bytes held by the memory tier
    pub memory_max_cost: usize,
    /// Default memory TTL in seconds for writes without explicit TTL
    pub memory_default_ttl: u64,
    /// Persistent tier TTL in seconds, measured from file modification time
    pub disk_ttl: u64,
    /// Directory holding one file per persisted key
    pub cache_dir: PathBuf,
    /// Background expiry sweep interval in seconds
    pub sweep_interval: u64,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `CACHE_MEMORY_MAX_ENTRIES` - Memory tier entry limit (default: 100)
    /// - `CACHE_MEMORY_MAX_COST` - Memory tier byte limit (default: 50 MiB)
    /// - `CACHE_MEMORY_TTL` - Default memory TTL in seconds (default: 300)
    /// - `CACHE_DISK_TTL` - Persistent TTL in seconds (default: 30 days)
    /// - `CACHE_DIR` - Persistent cache directory (default: platform cache dir)
    /// - `CACHE_SWEEP_INTERVAL` - Expiry sweep frequency in seconds (default: 3600)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            memory_max_entries: env_or("CACHE_MEMORY_MAX_ENTRIES", defaults.memory_max_entries),
            memory_max_cost: env_or("CACHE_MEMORY_MAX_COST", defaults.memory_max_cost),
            memory_default_ttl: env_or("CACHE_MEMORY_TTL", defaults.memory_default_ttl),
            disk_ttl: env_or("CACHE_DISK_TTL", defaults.disk_ttl),
            cache_dir: env::var_os("CACHE_DIR")
                .filter(|v| !v.is_empty())
                .map(PathBuf::from)
                .unwrap_or(defaults.cache_dir),
            sweep_interval: env_or("CACHE_SWEEP_INTERVAL", defaults.sweep_interval),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            memory_max_entries: 100,
            memory_max_cost: 50 * 1024 * 1024,
            memory_default_ttl: 300,
            disk_ttl: 30 * 24 * 60 * 60,
            cache_dir: default_cache_dir(),
            sweep_interval: 3600,
        }
    }
}

/// Returns the default persistent cache directory.
///
/// Uses the platform-specific cache directory (e.g. `~/.cache/tiered-cache`
/// on Linux, `~/Library/Caches/tiered-cache` on macOS). Falls back to
/// `.cache/tiered-cache` in the current directory when the platform location
/// cannot be determined.
pub fn default_cache_dir() -> PathBuf {
    dirs::cache_dir()
        .unwrap_or_else(|| PathBuf::from(".cache"))
        .join(CACHE_DIR_NAME)
}

fn env_or<T: FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.memory_max_entries, 100);
        assert_eq!(config.memory_max_cost, 52_428_800);
        assert_eq!(config.memory_default_ttl, 300);
        assert_eq!(config.disk_ttl, 2_592_000);
        assert_eq!(config.sweep_interval, 3600);
        assert!(config.cache_dir.ends_with(CACHE_DIR_NAME));
    }

    #[test]
    fn test_config_from_env_defaults() {
        // Clear any existing env vars to test defaults
        env::remove_var("CACHE_MEMORY_MAX_ENTRIES");
        env::remove_var("CACHE_MEMORY_MAX_COST");
        env::remove_var("CACHE_MEMORY_TTL");
        env::remove_var("CACHE_DISK_TTL");
        env::remove_var("CACHE_DIR");
        env::remove_var("CACHE_SWEEP_INTERVAL");

        let config = Config::from_env();
        assert_eq!(config.memory_max_entries, 100);
        assert_eq!(config.memory_default_ttl, 300);
        assert_eq!(config.disk_ttl, 2_592_000);
        assert_eq!(config.cache_dir, default_cache_dir());
    }

    #[test]
    fn test_env_or_ignores_unparseable_values() {
        env::set_var("TIERED_CACHE_TEST_BAD_NUMBER", "twelve");
        assert_eq!(env_or("TIERED_CACHE_TEST_BAD_NUMBER", 12u64), 12);
        env::remove_var("TIERED_CACHE_TEST_BAD_NUMBER");
    }
}
