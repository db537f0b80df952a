use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use kubexy_core::demo::DemoCluster;
use kubexy_core::naming::RandomNameGenerator;
use kubexy_core::pod_store::PodStore;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use kubexy_api::config::ServerConfig;
use kubexy_api::kube_client;
use kubexy_api::router::build_app_router;
use kubexy_api::state::AppState;
use kubexy_api::sync::ClusterSync;
use kubexy_api::background;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "kubexy_api=debug,kubexy_core=info,tower_http=debug".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // --- Configuration ---
    let config = ServerConfig::parse();
    config.validate().context("Invalid configuration")?;
    tracing::info!(
        host = %config.host,
        port = config.port,
        demo = config.demo,
        anonymize = config.anonymize,
        "Loaded server configuration"
    );

    // --- Pod source ---
    let pods = Arc::new(PodStore::new());
    let cancel = CancellationToken::new();
    let mut tasks = Vec::new();

    let cluster = if config.demo {
        let mut demo = DemoCluster::new(config.demo_settings(), StdRng::from_os_rng());
        pods.reconcile(demo.generate()).await;
        tracing::info!(pods = pods.len().await, "Demo cluster generated");

        tasks.push(tokio::spawn(background::demo::run(
            demo,
            Arc::clone(&pods),
            cancel.clone(),
        )));
        None
    } else {
        let source = kube_client::connect(&config)
            .await
            .context("Kubernetes client")?;
        let mut sync = ClusterSync::new(source, Arc::clone(&pods));
        if config.anonymize {
            sync = sync.with_anonymizer(RandomNameGenerator::new(&mut StdRng::from_os_rng()));
        }
        let sync = Arc::new(sync);

        tasks.push(tokio::spawn(background::kube_watch::run(
            Arc::clone(&sync),
            config.refresh_interval(),
            cancel.clone(),
        )));
        Some(sync)
    };

    // --- App state & router ---
    let config = Arc::new(config);
    let state = AppState::new(Arc::clone(&config), pods, cluster);
    let app = build_app_router(state, &config);

    // --- Start server ---
    let host = config.host.parse().context("Invalid HOST address")?;
    let addr = SocketAddr::new(host, config.port);
    tracing::info!(%addr, static_dir = %config.static_dir.display(), "Starting server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {addr}"))?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    // --- Post-shutdown cleanup ---
    tracing::info!("Server stopped accepting connections, cleaning up");

    cancel.cancel();
    let grace = Duration::from_secs(config.shutdown_timeout_secs);
    for task in tasks {
        if tokio::time::timeout(grace, task).await.is_err() {
            tracing::warn!("Background task did not stop in time");
        }
    }

    tracing::info!("Graceful shutdown complete");
    Ok(())
}

/// Wait for a termination signal to initiate graceful shutdown.
///
/// Handles both SIGINT (Ctrl-C) and SIGTERM (on Unix) so the server
/// shuts down cleanly whether stopped interactively or by a process
/// manager (e.g. systemd, Docker, Kubernetes).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received SIGINT (Ctrl-C), starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
