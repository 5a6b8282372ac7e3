//! Error types for the cache tiers
//!
//! These errors never leave the crate's public API: every store converts
//! them into a miss or a no-op at its own boundary after logging them.

use std::path::PathBuf;

use thiserror::Error;

// == Cache Error Enum ==
/// Failure raised inside a cache tier before it is absorbed.
#[derive(Error, Debug)]
pub enum CacheError {
    /// Filesystem operation failed
    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Value could not be encoded
    #[error("Failed to serialize value: {0}")]
    Serialize(#[source] serde_json::Error),

    /// Stored bytes did not decode to the requested type
    #[error("Failed to deserialize value: {0}")]
    Deserialize(#[source] serde_json::Error),

    /// Entry is larger than the whole memory tier budget
    #[error("Entry of {cost} bytes exceeds cost limit of {limit} bytes")]
    TooLarge { cost: usize, limit: usize },
}

impl CacheError {
    /// Wraps an I/O error with the path it occurred on.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        CacheError::Io {
            path: path.into(),
            source,
        }
    }

    /// Returns true when the underlying failure is a missing file.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            CacheError::Io { source, .. } if source.kind() == std::io::ErrorKind::NotFound
        )
    }
}

// == Result Type Alias ==
/// Convenience Result type for cache internals.
pub type Result<T> = std::result::Result<T, CacheError>;
