//! Cache Entry Module
//!
//! Defines the memory tier's stored payload with its absolute expiry.

// == Cache Entry ==
/// Serialized value held by the memory tier.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    /// Encoded value bytes
    pub payload: Vec<u8>,
    /// Creation timestamp (Unix milliseconds)
    pub created_at: u64,
    /// Expiration timestamp (Unix milliseconds)
    pub expires_at: u64,
}

impl CacheEntry {
    // == Constructor ==
    /// Creates an entry written at `now_ms` that lives for `ttl_ms`.
    pub fn new(payload: Vec<u8>, now_ms: u64, ttl_ms: u64) -> Self {
        Self {
            payload,
            created_at: now_ms,
            expires_at: now_ms.saturating_add(ttl_ms),
        }
    }

    // == Is Expired ==
    /// Checks if the entry has expired at `now_ms`.
    ///
    /// Boundary condition: an entry is expired once the current time is
    /// greater than or equal to its expiration time.
    pub fn is_expired(&self, now_ms: u64) -> bool {
        now_ms >= self.expires_at
    }

    // == Cost ==
    /// Capacity cost of this entry, equal to its payload length.
    pub fn cost(&self) -> usize {
        self.payload.len()
    }

    // == Time To Live ==
    /// Returns remaining TTL in milliseconds, zero once expired.
    pub fn ttl_remaining_ms(&self, now_ms: u64) -> u64 {
        self.expires_at.saturating_sub(now_ms)
    }
}
