//! Periodic refresh loop.
//!
//! Passes run one after another on a fixed period. A pass that overruns the
//! period delays the next tick instead of queueing a burst of catch-up passes,
//! so two passes never overlap.

use std::future::Future;
use std::time::Duration;

use tokio::time::MissedTickBehavior;
use tracing::{debug, info};

/// Runs `pass` immediately and then every `period` until `shutdown` resolves.
///
/// Returns the number of completed passes. A pass in progress is finished
/// before shutdown is observed.
pub async fn refresh_loop<S, P, Fut>(period: Duration, shutdown: S, mut pass: P) -> usize
where
    S: Future<Output = ()>,
    P: FnMut() -> Fut,
    Fut: Future<Output = ()>,
{
    let mut ticker = tokio::time::interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    tokio::pin!(shutdown);

    info!(period_secs = period.as_secs(), "Refresh loop started");

    let mut passes = 0;
    loop {
        tokio::select! {
            _ = &mut shutdown => {
                info!(passes, "Refresh loop stopping");
                break;
            }
            _ = ticker.tick() => {
                debug!(pass = passes + 1, "Refreshing agenda");
                pass().await;
                passes += 1;
            }
        }
    }

    passes
}

/// Resolves on Ctrl+C.
///
/// If the signal handler cannot be installed this never resolves.
pub async fn ctrl_c() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Received Ctrl+C"),
        Err(e) => {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    }
}
