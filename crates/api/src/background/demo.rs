//! Demo mode simulation loop.
//!
//! Every `speed * 10` ms picks a random action, plans it against the current
//! pods and applies the resulting status steps one by one, waiting the same
//! delay between steps so each intermediate status is visible.

use std::sync::Arc;
use std::time::Duration;

use kubexy_core::demo::DemoCluster;
use kubexy_core::pod_store::PodStore;
use tokio_util::sync::CancellationToken;

/// Run the simulation until `cancel` is triggered.
pub async fn run(mut cluster: DemoCluster, store: Arc<PodStore>, cancel: CancellationToken) {
    let delay = cluster.settings().step_delay();
    let pods = store.len().await;
    tracing::info!(
        delay_ms = delay.as_millis() as u64,
        pods,
        "Demo simulation started"
    );

    loop {
        if !pause(delay, &cancel).await {
            break;
        }

        let action = cluster.choose_action();
        let snapshot = store.snapshot().await;
        let steps = cluster.plan(action, &snapshot);
        tracing::info!(%action, steps = steps.len(), "Demo action");

        for step in steps {
            tracing::debug!(pod = %step.pod.full_name(), status = ?step.status, "Demo step");
            store.apply_status(step.pod, step.status).await;
            if !pause(delay, &cancel).await {
                tracing::info!("Demo simulation stopping");
                return;
            }
        }
    }

    tracing::info!("Demo simulation stopping");
}

/// Sleep for `delay`. Returns `false` if cancelled first.
async fn pause(delay: Duration, cancel: &CancellationToken) -> bool {
    tokio::select! {
        _ = cancel.cancelled() => false,
        _ = tokio::time::sleep(delay) => true,
    }
}
