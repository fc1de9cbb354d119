//! Periodic sweep of expired leases
//!
//! Scans already drop expired leases they walk over. The sweep additionally
//! empties the table between scans so `GET /leases` and memory use stay
//! small on large ranges.

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use super::allocator::PortAllocator;

/// Run the lease sweep until `cancel` fires.
///
/// # Arguments
///
/// * `allocator` - The allocator owning the lease table
/// * `interval` - Time between sweeps
/// * `cancel` - Cancellation token for graceful shutdown
pub async fn run_lease_sweep(
    allocator: Arc<PortAllocator>,
    interval: Duration,
    cancel: CancellationToken,
) {
    let mut ticker = tokio::time::interval(interval);

    tracing::info!("Starting lease sweep (interval: {:?})", interval);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                // The table lock may be held by a running scan
                let sweeper = Arc::clone(&allocator);
                match tokio::task::spawn_blocking(move || sweeper.sweep_expired()).await {
                    Ok(0) => {}
                    Ok(removed) => tracing::info!("Swept {} expired leases", removed),
                    Err(e) => tracing::error!("Lease sweep task failed: {}", e),
                }
            }
            _ = cancel.cancelled() => {
                tracing::info!("Lease sweep shutting down");
                break;
            }
        }
    }
}
