use std::sync::Arc;

use chrono::{DateTime, Utc};
use kubexy_core::board;
use kubexy_core::pod_store::PodStore;
use kubexy_core::svg::Document;
use tokio::sync::RwLock;

use crate::config::ServerConfig;
use crate::sync::ClusterSync;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Pods currently shown, fed by the demo simulator or the cluster sync.
    pub pods: Arc<PodStore>,
    /// The SVG board document circles are drawn on.
    pub board: Arc<RwLock<Document>>,
    /// Cluster sync, present only when reading a real cluster.
    pub cluster: Option<Arc<ClusterSync>>,
    pub started_at: DateTime<Utc>,
}

impl AppState {
    pub fn new(
        config: Arc<ServerConfig>,
        pods: Arc<PodStore>,
        cluster: Option<Arc<ClusterSync>>,
    ) -> Self {
        let board = board::new_board(config.board_width, config.board_height);
        Self {
            config,
            pods,
            board: Arc::new(RwLock::new(board)),
            cluster,
            started_at: Utc::now(),
        }
    }

    /// `"demo"` or `"cluster"`.
    pub fn mode(&self) -> &'static str {
        if self.cluster.is_some() {
            "cluster"
        } else {
            "demo"
        }
    }
}
