//! Tiered Cache - maintenance daemon
//!
//! Keeps the persistent cache directory within its TTL by sweeping expired
//! entries on an interval until shut down.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use tiered_cache::{spawn_expiry_sweep, CacheManager, Config};

/// Main entry point for the cache maintenance daemon.
///
/// # Startup Sequence
/// 1. Initialize tracing subscriber for logging
/// 2. Load configuration from environment variables
/// 3. Build the cache manager over both tiers
/// 4. Run one sweep immediately and report the disk footprint
/// 5. Start the periodic expiry sweep
/// 6. Stop on SIGINT/SIGTERM
#[tokio::main]
async fn main() -> Result<()> {
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "tiered_cache=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting tiered cache maintenance");

    let config = Config::from_env();
    info!(
        "Configuration loaded: memory_max_entries={}, memory_ttl={}s, disk_ttl={}s, dir={}, sweep_interval={}s",
        config.memory_max_entries,
        config.memory_default_ttl,
        config.disk_ttl,
        config.cache_dir.display(),
        config.sweep_interval
    );

    let manager = Arc::new(CacheManager::from_config(&config));

    let removed = manager.clear_expired().await;
    info!(
        "Initial sweep removed {} entries, cache size {}",
        removed,
        manager.formatted_cache_size().await
    );

    let interval = Duration::from_secs(config.sweep_interval.max(1));
    let sweep_handle = spawn_expiry_sweep(manager.clone(), interval);

    shutdown_signal().await?;

    sweep_handle.abort();
    warn!("Expiry sweep aborted");
    info!(
        "Shutdown complete, cache size {}",
        manager.formatted_cache_size().await
    );
    Ok(())
}

/// Waits for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() -> Result<()> {
    #[cfg(unix)]
    {
        let mut terminate = signal::unix::signal(signal::unix::SignalKind::terminate())?;
        tokio::select! {
            result = signal::ctrl_c() => {
                result?;
                info!("Received Ctrl+C, initiating shutdown...");
            }
            _ = terminate.recv() => {
                info!("Received SIGTERM, initiating shutdown...");
            }
        }
    }

    #[cfg(not(unix))]
    {
        signal::ctrl_c().await?;
        info!("Received Ctrl+C, initiating shutdown...");
    }

    Ok(())
}
