//! Clients for the Kubernetes pod list.
//!
//! Both read `GET /api/v1/pods` (all namespaces):
//!
//! - [`KubeClient`] talks to an explicit API URL, typically `kubectl proxy`,
//!   with an optional bearer token.
//! - [`KubeconfigClient`] resolves the cluster and credentials the way
//!   `kubectl` does: a given kubeconfig file, else `KUBECONFIG` /
//!   `~/.kube/config`, else the in-cluster service account.
//!
//! [`connect`] picks one from the server configuration.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::http::Request;
use kube::config::{KubeConfigOptions, Kubeconfig};
use kubexy_core::kube::{Pod, PodList};
use kubexy_core::pod::PodDetails;

use crate::config::ServerConfig;

const PODS_PATH: &str = "/api/v1/pods";

/// Errors from the Kubernetes REST layer.
#[derive(Debug, thiserror::Error)]
pub enum KubeClientError {
    /// The HTTP request itself failed (network, DNS, TLS, timeout, etc.).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The API server returned a non-2xx status code.
    #[error("Kubernetes API error ({status}): {body}")]
    ApiError {
        /// HTTP status code.
        status: u16,
        /// Raw response body for debugging.
        body: String,
    },

    /// The kubeconfig file could not be read or used.
    #[error("kubeconfig error: {0}")]
    Kubeconfig(#[from] kube::config::KubeconfigError),

    /// Neither a kubeconfig nor an in-cluster environment was found.
    #[error("no Kubernetes configuration found: {0}")]
    Infer(#[from] kube::config::InferConfigError),

    /// Failure inside the kube client (connection, TLS, decoding).
    #[error("Kubernetes client error: {0}")]
    Kube(kube::Error),

    #[error("invalid request: {0}")]
    Http(#[from] axum::http::Error),
}

impl From<kube::Error> for KubeClientError {
    fn from(err: kube::Error) -> Self {
        match err {
            kube::Error::Api(response) => KubeClientError::ApiError {
                status: response.code,
                body: response.message,
            },
            other => KubeClientError::Kube(other),
        }
    }
}

/// Anything that can list the pods of a cluster.
#[async_trait]
pub trait PodSource: Send + Sync {
    async fn list_pods(&self) -> Result<Vec<PodDetails>, KubeClientError>;
}

/// Build the pod source selected by `config`: `--kube-api-url` first, then
/// `--kubeconfig`, then whatever kubeconfig or in-cluster setup is found.
pub async fn connect(config: &ServerConfig) -> Result<Arc<dyn PodSource>, KubeClientError> {
    let timeout = config.kube_timeout();

    if let Some(url) = &config.kube_api_url {
        tracing::info!(api_url = %url, "Using configured Kubernetes API");
        let client = KubeClient::new(url.clone(), config.kube_token.clone(), timeout)?;
        return Ok(Arc::new(client));
    }

    let client = match &config.kubeconfig {
        Some(path) => KubeconfigClient::from_kubeconfig(path, timeout).await?,
        None => KubeconfigClient::infer(timeout).await?,
    };
    Ok(Arc::new(client))
}

/// HTTP client for one Kubernetes API URL.
pub struct KubeClient {
    client: reqwest::Client,
    api_url: String,
    token: Option<String>,
}

impl KubeClient {
    /// Create a client for `api_url`, e.g. `http://127.0.0.1:8001`. Every
    /// request fails once `timeout` has passed.
    pub fn new(
        api_url: impl Into<String>,
        token: Option<String>,
        timeout: Duration,
    ) -> Result<Self, KubeClientError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            api_url: api_url.into().trim_end_matches('/').to_string(),
            token,
        })
    }

    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    /// Fetch the raw pod list across all namespaces.
    pub async fn pod_list(&self) -> Result<PodList, KubeClientError> {
        let mut request = self.client.get(format!("{}{PODS_PATH}", self.api_url));
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }
        let response = Self::ensure_success(request.send().await?).await?;
        Ok(response.json::<PodList>().await?)
    }

    // ---- private helpers ----

    /// Ensure the response has a success status code. Returns the
    /// response unchanged on success, or a [`KubeClientError::ApiError`]
    /// containing the status and body text on failure.
    async fn ensure_success(
        response: reqwest::Response,
    ) -> Result<reqwest::Response, KubeClientError> {
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(KubeClientError::ApiError {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }
}

#[async_trait]
impl PodSource for KubeClient {
    async fn list_pods(&self) -> Result<Vec<PodDetails>, KubeClientError> {
        let list = self.pod_list().await?;
        Ok(list.items.iter().map(Pod::to_details).collect())
    }
}

/// Client configured from a kubeconfig or the in-cluster environment.
///
/// Credentials (tokens, client certificates, exec plugins) are handled by
/// the `kube` crate.
pub struct KubeconfigClient {
    client: kube::Client,
    cluster_url: String,
}

impl std::fmt::Debug for KubeconfigClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KubeconfigClient")
            .field("cluster_url", &self.cluster_url)
            .finish_non_exhaustive()
    }
}

impl KubeconfigClient {
    /// Use the current context of the kubeconfig at `path`.
    pub async fn from_kubeconfig(path: &Path, timeout: Duration) -> Result<Self, KubeClientError> {
        let kubeconfig = Kubeconfig::read_from(path)?;
        let config =
            kube::Config::from_custom_kubeconfig(kubeconfig, &KubeConfigOptions::default())
                .await?;
        tracing::info!(path = %path.display(), "Loaded kubeconfig");
        Self::with_config(config, timeout)
    }

    /// `KUBECONFIG` or `~/.kube/config` when present, otherwise the
    /// in-cluster service account.
    pub async fn infer(timeout: Duration) -> Result<Self, KubeClientError> {
        let config = kube::Config::infer().await?;
        Self::with_config(config, timeout)
    }

    fn with_config(mut config: kube::Config, timeout: Duration) -> Result<Self, KubeClientError> {
        config.connect_timeout = Some(timeout);
        config.read_timeout = Some(timeout);
        let cluster_url = config.cluster_url.to_string();
        tracing::info!(%cluster_url, "Using Kubernetes API from kubeconfig");

        Ok(Self {
            client: kube::Client::try_from(config)?,
            cluster_url,
        })
    }

    pub fn cluster_url(&self) -> &str {
        &self.cluster_url
    }

    /// Fetch the raw pod list across all namespaces.
    pub async fn pod_list(&self) -> Result<PodList, KubeClientError> {
        let request = Request::get(PODS_PATH).body(Vec::new())?;
        Ok(self.client.request::<PodList>(request).await?)
    }
}

#[async_trait]
impl PodSource for KubeconfigClient {
    async fn list_pods(&self) -> Result<Vec<PodDetails>, KubeClientError> {
        let list = self.pod_list().await?;
        Ok(list.items.iter().map(Pod::to_details).collect())
    }
}
