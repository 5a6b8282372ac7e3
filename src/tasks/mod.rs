//! Background Tasks Module
//!
//! Contains background tasks that run periodically while the cache is in use.
//!
//! # Tasks
//! - Expiry sweep: deletes persistent entries past their TTL at configured intervals

mod sweep;

pub use sweep::spawn_expiry_sweep;
