//! Shared map of the pods currently shown on the board.

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;
use tokio::sync::RwLock;

use crate::pod::{PodDetails, PodStatus};

/// Result of [`PodStore::reconcile`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ReconcileSummary {
    pub added: usize,
    pub updated: usize,
    pub removed: usize,
}

impl ReconcileSummary {
    pub fn is_unchanged(&self) -> bool {
        self.added == 0 && self.updated == 0 && self.removed == 0
    }
}

/// Pods keyed by [`PodDetails::full_name`].
///
/// Thread-safe via interior `RwLock`; designed to be wrapped in `Arc` and
/// shared between the HTTP handlers and the background pod source.
#[derive(Debug, Default)]
pub struct PodStore {
    pods: RwLock<BTreeMap<String, PodDetails>>,
}

impl PodStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-filled with `pods`.
    pub fn with_pods(pods: impl IntoIterator<Item = PodDetails>) -> Self {
        let map = pods.into_iter().map(|p| (p.full_name(), p)).collect();
        Self {
            pods: RwLock::new(map),
        }
    }

    /// Copy of the current content, ordered by full name.
    pub async fn snapshot(&self) -> BTreeMap<String, PodDetails> {
        self.pods.read().await.clone()
    }

    pub async fn get(&self, full_name: &str) -> Option<PodDetails> {
        self.pods.read().await.get(full_name).cloned()
    }

    pub async fn len(&self) -> usize {
        self.pods.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.pods.read().await.is_empty()
    }

    pub async fn upsert(&self, pod: PodDetails) {
        self.pods.write().await.insert(pod.full_name(), pod);
    }

    pub async fn remove(&self, full_name: &str) -> Option<PodDetails> {
        self.pods.write().await.remove(full_name)
    }

    /// Move `pod` to `status`. A completed pod leaves the store; any other
    /// status inserts or replaces it.
    pub async fn apply_status(&self, mut pod: PodDetails, status: PodStatus) {
        pod.status = status;
        let key = pod.full_name();
        let mut pods = self.pods.write().await;
        if status == PodStatus::Completed {
            pods.remove(&key);
        } else {
            pods.insert(key.clone(), pod);
        }
        tracing::debug!(pod = %key, status = ?status, "Pod status applied");
    }

    /// Replace the content with `current`.
    ///
    /// Pods absent from `current` are removed, new ones added, and known ones
    /// replaced when any field differs.
    pub async fn reconcile(&self, current: Vec<PodDetails>) -> ReconcileSummary {
        let mut summary = ReconcileSummary::default();
        let mut pods = self.pods.write().await;
        let mut stale: BTreeSet<String> = pods.keys().cloned().collect();

        for pod in current {
            let key = pod.full_name();
            stale.remove(&key);
            match pods.get(&key) {
                Some(existing) if *existing == pod => {}
                Some(existing) => {
                    tracing::debug!(pod = %key, old = ?existing.status, new = ?pod.status, "Update pod");
                    summary.updated += 1;
                    pods.insert(key, pod);
                }
                None => {
                    tracing::debug!(pod = %key, status = ?pod.status, "Add pod");
                    summary.added += 1;
                    pods.insert(key, pod);
                }
            }
        }

        for key in &stale {
            tracing::debug!(pod = %key, "Delete pod");
            pods.remove(key);
            summary.removed += 1;
        }

        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pod(namespace: &str, name: &str, status: PodStatus) -> PodDetails {
        PodDetails {
            name: name.into(),
            namespace: namespace.into(),
            node: "node-a".into(),
            owner_kind: "ReplicaSet".into(),
            status,
            size: 1,
        }
    }

    #[tokio::test]
    async fn apply_status_inserts_and_updates() {
        let store = PodStore::new();
        let p = pod("ns", "web-0", PodStatus::Init);

        store.apply_status(p.clone(), PodStatus::Init).await;
        assert_eq!(store.get("ns/web-0").await.unwrap().status, PodStatus::Init);

        store.apply_status(p, PodStatus::Running).await;
        assert_eq!(store.len().await, 1);
        assert_eq!(
            store.get("ns/web-0").await.unwrap().status,
            PodStatus::Running
        );
    }

    #[tokio::test]
    async fn completed_status_removes_pod() {
        let store = PodStore::with_pods([pod("ns", "web-0", PodStatus::Running)]);

        store
            .apply_status(pod("ns", "web-0", PodStatus::Running), PodStatus::Terminating)
            .await;
        assert_eq!(
            store.get("ns/web-0").await.unwrap().status,
            PodStatus::Terminating
        );

        store
            .apply_status(pod("ns", "web-0", PodStatus::Terminating), PodStatus::Completed)
            .await;
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn snapshot_is_ordered_by_full_name() {
        let store = PodStore::with_pods([
            pod("b", "x", PodStatus::Running),
            pod("a", "z", PodStatus::Running),
            pod("a", "y", PodStatus::Running),
        ]);
        let keys: Vec<String> = store.snapshot().await.into_keys().collect();
        assert_eq!(keys, vec!["a/y", "a/z", "b/x"]);
    }

    #[tokio::test]
    async fn reconcile_adds_updates_and_removes() {
        let store = PodStore::with_pods([
            pod("ns", "keep", PodStatus::Running),
            pod("ns", "change", PodStatus::Starting),
            pod("ns", "gone", PodStatus::Running),
        ]);

        let summary = store
            .reconcile(vec![
                pod("ns", "keep", PodStatus::Running),
                pod("ns", "change", PodStatus::Running),
                pod("ns", "new", PodStatus::Init),
            ])
            .await;

        assert_eq!(
            summary,
            ReconcileSummary {
                added: 1,
                updated: 1,
                removed: 1,
            }
        );
        assert_eq!(store.len().await, 3);
        assert!(store.get("ns/gone").await.is_none());
        assert_eq!(
            store.get("ns/change").await.unwrap().status,
            PodStatus::Running
        );
    }

    #[tokio::test]
    async fn reconcile_with_same_list_is_unchanged() {
        let pods = vec![
            pod("ns", "a", PodStatus::Running),
            pod("ns", "b", PodStatus::Crash),
        ];
        let store = PodStore::with_pods(pods.clone());

        assert!(store.reconcile(pods).await.is_unchanged());
    }
}
