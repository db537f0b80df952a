//! Integration tests for the pod view endpoints.

mod common;

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::http::StatusCode;
use common::{body_json, get, post, sample_pod};
use kubexy_api::kube_client::{KubeClientError, PodSource};
use kubexy_api::sync::ClusterSync;
use kubexy_core::pod::{PodDetails, PodStatus};
use kubexy_core::pod_store::PodStore;

/// Pod source handing out a fixed list, or failing with a status code.
struct FakeSource {
    next: Mutex<Result<Vec<PodDetails>, u16>>,
}

impl FakeSource {
    fn returning(pods: Vec<PodDetails>) -> Arc<Self> {
        Arc::new(Self {
            next: Mutex::new(Ok(pods)),
        })
    }

    fn failing(status: u16) -> Arc<Self> {
        Arc::new(Self {
            next: Mutex::new(Err(status)),
        })
    }
}

#[async_trait]
impl PodSource for FakeSource {
    async fn list_pods(&self) -> Result<Vec<PodDetails>, KubeClientError> {
        self.next
            .lock()
            .unwrap()
            .clone()
            .map_err(|status| KubeClientError::ApiError {
                status,
                body: "forbidden".into(),
            })
    }
}

fn cluster_app(source: Arc<FakeSource>, pods: Arc<PodStore>) -> axum::Router {
    let sync = Arc::new(ClusterSync::new(source, Arc::clone(&pods)));
    common::build_test_app(pods, Some(sync))
}

// ---------------------------------------------------------------------------
// Test: GET /view/pods returns the raw map keyed by namespace/name
// ---------------------------------------------------------------------------

#[tokio::test]
async fn list_pods_returns_plain_map() {
    let pods = Arc::new(PodStore::with_pods([
        sample_pod("shop", "web-1", PodStatus::Running),
        sample_pod("kube-system", "dns-1", PodStatus::Crash),
    ]));
    let app = common::build_test_app(pods, None);

    let response = get(app, "/view/pods").await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    let map = json.as_object().expect("pods are a JSON object");
    assert_eq!(map.len(), 2);

    let web = &json["shop/web-1"];
    assert_eq!(web["Name"], "web-1");
    assert_eq!(web["Namespace"], "shop");
    assert_eq!(web["Node"], "node-1");
    assert_eq!(web["OwnerKind"], "ReplicaSet");
    assert_eq!(web["Status"], 2);
    assert_eq!(web["Size"], 10);
    assert_eq!(json["kube-system/dns-1"]["Status"], 3);
}

#[tokio::test]
async fn list_pods_on_empty_store_is_empty_object() {
    let response = get(common::build_demo_app(), "/view/pods").await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await, serde_json::json!({}));
}

// ---------------------------------------------------------------------------
// Test: POST /view/pods/refresh
// ---------------------------------------------------------------------------

#[tokio::test]
async fn refresh_in_demo_mode_is_conflict() {
    let response = post(common::build_demo_app(), "/view/pods/refresh").await;

    assert_eq!(response.status(), StatusCode::CONFLICT);
    let json = body_json(response).await;
    assert_eq!(json["code"], "CONFLICT");
}

#[tokio::test]
async fn refresh_in_cluster_mode_reconciles_store() {
    let pods = Arc::new(PodStore::with_pods([sample_pod(
        "shop",
        "old-1",
        PodStatus::Running,
    )]));
    let source = FakeSource::returning(vec![
        sample_pod("shop", "web-1", PodStatus::Starting),
        sample_pod("shop", "web-2", PodStatus::Running),
    ]);
    let app = cluster_app(source, Arc::clone(&pods));

    let response = post(app.clone(), "/view/pods/refresh").await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["added"], 2);
    assert_eq!(json["data"]["updated"], 0);
    assert_eq!(json["data"]["removed"], 1);

    let listed = body_json(get(app.clone(), "/view/pods").await).await;
    assert!(listed.get("shop/old-1").is_none());
    assert_eq!(listed["shop/web-1"]["Status"], 1);

    let health = body_json(get(app, "/health").await).await;
    assert_eq!(health["mode"], "cluster");
    assert_eq!(health["pods"], 2);
}

#[tokio::test]
async fn refresh_upstream_failure_is_bad_gateway() {
    let pods = Arc::new(PodStore::with_pods([sample_pod(
        "shop",
        "web-1",
        PodStatus::Running,
    )]));
    let app = cluster_app(FakeSource::failing(403), Arc::clone(&pods));

    let response = post(app, "/view/pods/refresh").await;
    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    let json = body_json(response).await;
    assert_eq!(json["code"], "UPSTREAM_ERROR");

    assert_eq!(pods.len().await, 1);
}
