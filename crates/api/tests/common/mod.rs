#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::Arc;

use axum::body::Body;
use axum::http::{Method, Request};
use axum::response::Response;
use axum::Router;
use http_body_util::BodyExt;
use kubexy_core::pod::{PodDetails, PodStatus};
use kubexy_core::pod_store::PodStore;
use tower::ServiceExt;

use kubexy_api::config::ServerConfig;
use kubexy_api::router::build_app_router;
use kubexy_api::state::AppState;
use kubexy_api::sync::ClusterSync;

/// Build a test `ServerConfig` with safe defaults.
///
/// Uses `http://localhost:8080` as CORS origin (matching the dev default)
/// and a 15-second request timeout.
pub fn test_config(static_dir: PathBuf) -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:8080".to_string()],
        request_timeout_secs: 15,
        shutdown_timeout_secs: 1,
        static_dir,
        board_width: 400,
        board_height: 300,
        kube_api_url: None,
        kubeconfig: None,
        kube_token: None,
        kube_timeout_secs: 10,
        refresh_interval_secs: 5,
        anonymize: false,
        demo: true,
        demo_nodes: 6,
        demo_namespaces: 5,
        demo_pods: 15,
        demo_speed: 500,
    }
}

/// Build the full application router over `pods`, with an optional cluster
/// sync, serving static files from a directory that does not exist.
pub fn build_test_app(pods: Arc<PodStore>, cluster: Option<Arc<ClusterSync>>) -> Router {
    build_test_app_with_static(pods, cluster, PathBuf::from("/nonexistent/kubexy-html"))
}

pub fn build_test_app_with_static(
    pods: Arc<PodStore>,
    cluster: Option<Arc<ClusterSync>>,
    static_dir: PathBuf,
) -> Router {
    let config = Arc::new(test_config(static_dir));
    let state = AppState::new(Arc::clone(&config), pods, cluster);
    build_app_router(state, &config)
}

/// Demo-mode app with an empty pod store.
pub fn build_demo_app() -> Router {
    build_test_app(Arc::new(PodStore::new()), None)
}

pub fn sample_pod(namespace: &str, name: &str, status: PodStatus) -> PodDetails {
    PodDetails {
        name: name.to_string(),
        namespace: namespace.to_string(),
        node: "node-1".to_string(),
        owner_kind: "ReplicaSet".to_string(),
        status,
        size: 10,
    }
}

pub async fn send(app: Router, method: Method, uri: &str) -> Response {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn get(app: Router, uri: &str) -> Response {
    send(app, Method::GET, uri).await
}

pub async fn post(app: Router, uri: &str) -> Response {
    send(app, Method::POST, uri).await
}

pub async fn delete(app: Router, uri: &str) -> Response {
    send(app, Method::DELETE, uri).await
}

pub async fn body_text(response: Response) -> String {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

pub async fn body_json(response: Response) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}
