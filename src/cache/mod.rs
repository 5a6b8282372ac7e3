//! Cache Module
//!
//! Two-tier caching: a bounded in-memory tier with TTL expiry and LRU
//! eviction, a file-per-key persistent tier, and the manager composing them.

mod entry;
mod lru;
mod manager;
mod memory;
mod persistent;
mod size;
mod stats;


// Re-export public types
pub use entry::CacheEntry;
pub use lru::LruTracker;
pub use manager::CacheManager;
pub use memory::{MemoryStore, MemoryTable, DEFAULT_MEMORY_TTL};
pub use persistent::{sanitize_key, PersistentStore, DEFAULT_DISK_TTL};
pub use size::format_byte_count;
pub use stats::CacheStats;
