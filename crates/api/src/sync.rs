//! Keeps the pod store in line with a [`PodSource`].

use std::sync::Arc;

use kubexy_core::naming::RandomNameGenerator;
use kubexy_core::pod_store::{PodStore, ReconcileSummary};
use tokio::sync::Mutex;

use crate::kube_client::{KubeClientError, PodSource};

/// Pulls the pod list from a source and reconciles it into the store,
/// optionally anonymizing names on the way.
pub struct ClusterSync {
    source: Arc<dyn PodSource>,
    store: Arc<PodStore>,
    anonymizer: Option<Mutex<RandomNameGenerator>>,
}

impl ClusterSync {
    pub fn new(source: Arc<dyn PodSource>, store: Arc<PodStore>) -> Self {
        Self {
            source,
            store,
            anonymizer: None,
        }
    }

    /// Replace real names with the generator's before they reach the store.
    /// The generator is kept, so a pod keeps its replacement across
    /// refreshes; names gone from the cluster are forgotten.
    pub fn with_anonymizer(mut self, names: RandomNameGenerator) -> Self {
        self.anonymizer = Some(Mutex::new(names));
        self
    }

    pub fn is_anonymized(&self) -> bool {
        self.anonymizer.is_some()
    }

    /// Fetch the current pod list and reconcile the store with it.
    pub async fn refresh(&self) -> Result<ReconcileSummary, KubeClientError> {
        let mut pods = self.source.list_pods().await?;

        if let Some(anonymizer) = &self.anonymizer {
            let mut names = anonymizer.lock().await;
            names.retain_live(&pods);
            pods = pods.iter().map(|pod| names.anonymize(pod)).collect();
        }

        let summary = self.store.reconcile(pods).await;
        if !summary.is_unchanged() {
            tracing::info!(
                added = summary.added,
                updated = summary.updated,
                removed = summary.removed,
                "Pod list refreshed"
            );
        }
        Ok(summary)
    }
}
