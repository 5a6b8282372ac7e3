//! Cache Statistics Module
//!
//! Tracks memory tier metrics including hits, misses, evictions and cost.

use serde::Serialize;

// == Cache Stats ==
/// Memory tier metrics snapshot.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CacheStats {
    /// Number of successful lookups
    pub hits: u64,
    /// Number of failed lookups (absent, expired or undecodable)
    pub misses: u64,
    /// Number of live entries dropped to stay within capacity
    pub evictions: u64,
    /// Current number of entries
    pub total_entries: usize,
    /// Current sum of entry costs in bytes
    pub total_cost: usize,
}

impl CacheStats {
    /// Creates a new CacheStats with all counters at zero.
    pub fn new() -> Self {
        Self::default()
    }

    // == Hit Rate ==
    /// Returns hits / (hits + misses), or 0.0 if no lookups have been made.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }

    pub fn record_hit(&mut self) {
        self.hits += 1;
    }

    pub fn record_miss(&mut self) {
        self.misses += 1;
    }

    pub fn record_eviction(&mut self) {
        self.evictions += 1;
    }

    /// Updates the entry count and cost gauges.
    pub fn set_occupancy(&mut self, entries: usize, cost: usize) {
        self.total_entries = entries;
        self.total_cost = cost;
    }
}
