//! Periodic refresh of the pod list in cluster mode.
//!
//! Refreshes immediately, then on a fixed interval using
//! `tokio::time::interval`. Failed refreshes are logged and retried on the
//! next tick; the store keeps the last known pods meanwhile. A refresh in
//! flight is dropped when the watcher is cancelled.

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::sync::ClusterSync;

/// Run the refresh loop until `cancel` is triggered.
pub async fn run(sync: Arc<ClusterSync>, every: Duration, cancel: CancellationToken) {
    tracing::info!(
        interval_secs = every.as_secs(),
        anonymized = sync.is_anonymized(),
        "Pod watcher started"
    );

    let mut interval = tokio::time::interval(every);
    interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!("Pod watcher stopping");
                break;
            }
            _ = interval.tick() => {
                let result = tokio::select! {
                    _ = cancel.cancelled() => {
                        tracing::info!("Pod watcher stopping during refresh");
                        break;
                    }
                    result = sync.refresh() => result,
                };
                match result {
                    Ok(summary) if summary.is_unchanged() => {
                        tracing::debug!("Pod watcher: no changes");
                    }
                    Ok(_) => {}
                    Err(e) => {
                        tracing::warn!(error = %e, "Pod watcher: refresh failed");
                    }
                }
            }
        }
    }
}
