use std::net::IpAddr;
use std::path::PathBuf;
use std::time::Duration;

use axum::http::HeaderValue;
use clap::Parser;
use kubexy_core::demo::DemoSettings;
use kubexy_core::error::CoreError;

/// Server configuration, parsed from command-line flags with environment
/// variable fallbacks.
///
/// All fields have sensible defaults suitable for local development.
///
/// | Flag                      | Env Var                 | Default                 |
/// |---------------------------|-------------------------|-------------------------|
/// | `--host`                  | `HOST`                  | `0.0.0.0`               |
/// | `--port`                  | `PORT`                  | `8080`                  |
/// | `--cors-origins`          | `CORS_ORIGINS`          | `http://localhost:8080` |
/// | `--request-timeout-secs`  | `REQUEST_TIMEOUT_SECS`  | `15`                    |
/// | `--shutdown-timeout-secs` | `SHUTDOWN_TIMEOUT_SECS` | `5`                     |
/// | `--static-dir`            | `STATIC_DIR`            | `html`                  |
/// | `--kube-api-url`          | `KUBE_API_URL`          | kubeconfig / in-cluster |
/// | `--kubeconfig`            |                         | `KUBECONFIG`, `~/.kube` |
/// | `--kube-timeout-secs`     | `KUBE_TIMEOUT_SECS`     | `10`                    |
/// | `--refresh-interval-secs` | `REFRESH_INTERVAL_SECS` | `5`                     |
/// | `--demo`                  | `DEMO`                  | off                     |
#[derive(Debug, Clone, Parser)]
#[command(name = "kubexy", version, about = "Pods of a Kubernetes cluster on an SVG board")]
pub struct ServerConfig {
    /// Bind address.
    #[arg(long, env = "HOST", default_value = "0.0.0.0")]
    pub host: String,

    #[arg(long, env = "PORT", default_value_t = 8080)]
    pub port: u16,

    /// Allowed CORS origins, comma separated.
    #[arg(
        long,
        env = "CORS_ORIGINS",
        value_delimiter = ',',
        default_value = "http://localhost:8080"
    )]
    pub cors_origins: Vec<String>,

    #[arg(long, env = "REQUEST_TIMEOUT_SECS", default_value_t = 15)]
    pub request_timeout_secs: u64,

    /// How long background tasks get to stop after the server shuts down.
    #[arg(long, env = "SHUTDOWN_TIMEOUT_SECS", default_value_t = 5)]
    pub shutdown_timeout_secs: u64,

    /// Directory with the frontend files served for unknown routes.
    #[arg(long, env = "STATIC_DIR", default_value = "html")]
    pub static_dir: PathBuf,

    #[arg(long, env = "BOARD_WIDTH", default_value_t = 800)]
    pub board_width: u32,

    #[arg(long, env = "BOARD_HEIGHT", default_value_t = 600)]
    pub board_height: u32,

    /// Kubernetes API base URL (e.g. `http://127.0.0.1:8001` from
    /// `kubectl proxy`). Takes precedence over any kubeconfig.
    #[arg(long, env = "KUBE_API_URL")]
    pub kube_api_url: Option<String>,

    /// Kubeconfig file to read. Without it `KUBECONFIG`, `~/.kube/config`
    /// and then the in-cluster service account are tried.
    #[arg(long)]
    pub kubeconfig: Option<PathBuf>,

    /// Bearer token sent to `--kube-api-url`.
    #[arg(long, env = "KUBE_TOKEN", hide_env_values = true)]
    pub kube_token: Option<String>,

    /// Seconds before a Kubernetes API request is abandoned.
    #[arg(long, env = "KUBE_TIMEOUT_SECS", default_value_t = 10)]
    pub kube_timeout_secs: u64,

    /// Seconds between two pod list refreshes in cluster mode.
    #[arg(long, env = "REFRESH_INTERVAL_SECS", default_value_t = 5)]
    pub refresh_interval_secs: u64,

    /// Replace node, namespace and pod names with random ones.
    #[arg(long, env = "ANONYMIZE")]
    pub anonymize: bool,

    /// Simulate a working cluster instead of reading a real one.
    #[arg(long, env = "DEMO")]
    pub demo: bool,

    #[arg(long, env = "DEMO_NODES", default_value_t = 6)]
    pub demo_nodes: usize,

    #[arg(long, env = "DEMO_NAMESPACES", default_value_t = 5)]
    pub demo_namespaces: usize,

    #[arg(long, env = "DEMO_PODS", default_value_t = 15)]
    pub demo_pods: usize,

    /// Simulation pace: every demo step waits `speed * 10` milliseconds.
    #[arg(long, env = "DEMO_SPEED", default_value_t = 500)]
    pub demo_speed: u64,
}

impl ServerConfig {
    pub fn demo_settings(&self) -> DemoSettings {
        DemoSettings {
            nodes: self.demo_nodes,
            namespaces: self.demo_namespaces,
            pods: self.demo_pods,
            speed: self.demo_speed,
        }
    }

    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_interval_secs)
    }

    pub fn kube_timeout(&self) -> Duration {
        Duration::from_secs(self.kube_timeout_secs)
    }

    /// Reject combinations that would only fail later at runtime.
    pub fn validate(&self) -> Result<(), CoreError> {
        self.host
            .parse::<IpAddr>()
            .map_err(|e| CoreError::Validation(format!("invalid host '{}': {e}", self.host)))?;

        if let Some(origin) = self
            .cors_origins
            .iter()
            .find(|o| o.parse::<HeaderValue>().is_err())
        {
            return Err(CoreError::Validation(format!(
                "invalid CORS origin '{origin}'"
            )));
        }
        if self.refresh_interval_secs == 0 {
            return Err(CoreError::Validation(
                "refresh interval must be at least one second".into(),
            ));
        }
        if self.kube_timeout_secs == 0 {
            return Err(CoreError::Validation(
                "Kubernetes request timeout must be at least one second".into(),
            ));
        }
        if self.demo && (self.demo_nodes == 0 || self.demo_namespaces == 0) {
            return Err(CoreError::Validation(
                "demo mode needs at least one node and one namespace".into(),
            ));
        }
        if self.demo && self.demo_speed == 0 {
            return Err(CoreError::Validation("demo speed must be at least 1".into()));
        }
        Ok(())
    }
}
