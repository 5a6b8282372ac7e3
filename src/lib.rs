//! Tiered Cache - a two-tier cache for query results
//!
//! A bounded in-memory tier with TTL expiry and LRU eviction sits in front of
//! a file-per-key persistent tier. [`CacheManager`] reads through both
//! (promoting disk hits into memory) and writes through to both.

pub mod cache;
pub mod clock;
pub mod config;
pub mod error;
pub mod keys;
pub mod tasks;

pub use cache::CacheManager;
pub use clock::{Clock, ManualClock, SharedClock, SystemClock};
pub use config::Config;
pub use tasks::spawn_expiry_sweep;
