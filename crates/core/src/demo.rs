//! Simulated cluster for demo mode.
//!
//! [`DemoCluster::generate`] invents an initial set of running pods spread
//! over random nodes and namespaces. Afterwards the simulation repeatedly
//! picks a [`DemoAction`] and turns it into a list of [`DemoStep`]s with
//! [`DemoCluster::plan`]; the caller applies the steps one by one with a
//! delay in between so the board shows every intermediate status.
//!
//! Demo pod names have the shape `{animal}-{hex}-{seq}`: the first two parts
//! identify the deployment, the last one the replica.

use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::time::Duration;

use rand::rngs::StdRng;
use rand::Rng;

use crate::naming::RandomNameGenerator;
use crate::pod::{
    PodDetails, PodStatus, STATUS_SEQUENCE_CRASH, STATUS_SEQUENCE_START, STATUS_SEQUENCE_STOP,
};

/// Owner kinds a generated deployment can have.
pub const OWNER_KINDS: [&str; 3] = ["StatefulSet", "ReplicaSet", "DaemonSet"];

/// Size of the simulated cluster and pace of the simulation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DemoSettings {
    pub nodes: usize,
    pub namespaces: usize,
    pub pods: usize,
    /// Pace factor; every step waits `speed * 10` milliseconds.
    pub speed: u64,
}

impl Default for DemoSettings {
    fn default() -> Self {
        Self {
            nodes: 6,
            namespaces: 5,
            pods: 15,
            speed: 500,
        }
    }
}

impl DemoSettings {
    pub fn step_delay(&self) -> Duration {
        Duration::from_millis(self.speed.saturating_mul(10))
    }
}

/// One scenario played against the simulated cluster.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DemoAction {
    /// A random pod crashes and restarts.
    CrashContainer,
    /// A deployment is replaced replica by replica.
    RollingUpdate,
    /// A deployment is torn down completely, then started again.
    Recreate,
}

impl fmt::Display for DemoAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::CrashContainer => "crash random container",
            Self::RollingUpdate => "rolling update",
            Self::Recreate => "recreate",
        };
        f.write_str(name)
    }
}

/// Move `pod` to `status` (see [`crate::pod_store::PodStore::apply_status`]).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DemoStep {
    pub pod: PodDetails,
    pub status: PodStatus,
}

impl DemoStep {
    fn new(pod: &PodDetails, status: PodStatus) -> Self {
        Self {
            pod: pod.clone(),
            status,
        }
    }
}

/// The simulated cluster: settings, name generator and random source.
#[derive(Debug)]
pub struct DemoCluster {
    settings: DemoSettings,
    names: RandomNameGenerator,
    rng: StdRng,
}

impl DemoCluster {
    pub fn new(settings: DemoSettings, mut rng: StdRng) -> Self {
        let names = RandomNameGenerator::new(&mut rng);
        Self {
            settings,
            names,
            rng,
        }
    }

    pub fn settings(&self) -> &DemoSettings {
        &self.settings
    }

    /// Generate the initial pods, all `Running`.
    ///
    /// Deployments get `1..=min(nodes*3/4, remaining)` replicas, so exactly
    /// `settings.pods` pods are returned.
    pub fn generate(&mut self) -> Vec<PodDetails> {
        let mut pods = Vec::with_capacity(self.settings.pods);
        let mut prefixes = HashSet::new();

        while pods.len() < self.settings.pods {
            let remaining = self.settings.pods - pods.len();
            let max_rep = (self.settings.nodes * 3 / 4).min(remaining).max(1);

            let owner_kind = OWNER_KINDS[self.rng.random_range(0..OWNER_KINDS.len())];
            let namespace_key = self.rng.random_range(0..self.settings.namespaces.max(1));
            let namespace = self.names.namespace(&namespace_key.to_string());
            let replicas = 1 + self.rng.random_range(0..max_rep);
            let size = (self.rng.random_range(0..90) / replicas + self.rng.random_range(0..10)) as i64;

            let base = self.names.pod_name(&pods.len().to_string());
            let prefix = loop {
                let candidate = format!("{}-{:x}", base, self.rng.random_range(0..1u32 << 16));
                if prefixes.insert(format!("{namespace}/{candidate}")) {
                    break candidate;
                }
            };

            for seq in 0..replicas {
                let pod = self.create_pod(&prefix, seq, &namespace, owner_kind, size);
                tracing::debug!(pod = %pod.full_name(), node = %pod.node, "Generate pod");
                pods.push(pod);
            }
        }

        pods
    }

    /// Pick the next action uniformly.
    pub fn choose_action(&mut self) -> DemoAction {
        match self.rng.random_range(0..3) {
            0 => DemoAction::CrashContainer,
            1 => DemoAction::RollingUpdate,
            _ => DemoAction::Recreate,
        }
    }

    /// Turn `action` into status steps against the current pods.
    ///
    /// Returns an empty plan when there is nothing to act on.
    pub fn plan(
        &mut self,
        action: DemoAction,
        pods: &BTreeMap<String, PodDetails>,
    ) -> Vec<DemoStep> {
        let Some(pod) = self.random_pod(pods) else {
            return Vec::new();
        };
        tracing::debug!(pod = %pod.full_name(), %action, "Random pod");

        match action {
            DemoAction::CrashContainer => STATUS_SEQUENCE_CRASH
                .iter()
                .map(|status| DemoStep::new(&pod, *status))
                .collect(),
            DemoAction::RollingUpdate => self.plan_rolling_update(&pod, pods),
            DemoAction::Recreate => self.plan_recreate(&pod, pods),
        }
    }

    fn plan_rolling_update(
        &mut self,
        pod: &PodDetails,
        pods: &BTreeMap<String, PodDetails>,
    ) -> Vec<DemoStep> {
        let Some((old_prefix, new_prefix)) = self.next_prefix(pod) else {
            return Vec::new();
        };

        let mut steps = Vec::new();
        for (seq, old_pod) in replicas(pods, &pod.namespace, &old_prefix).into_iter().enumerate() {
            let new_pod = self.recreate_pod(&new_prefix, seq, old_pod);
            steps.extend(
                STATUS_SEQUENCE_START
                    .iter()
                    .map(|status| DemoStep::new(&new_pod, *status)),
            );
            steps.extend(
                STATUS_SEQUENCE_STOP
                    .iter()
                    .map(|status| DemoStep::new(old_pod, *status)),
            );
        }
        steps
    }

    fn plan_recreate(
        &mut self,
        pod: &PodDetails,
        pods: &BTreeMap<String, PodDetails>,
    ) -> Vec<DemoStep> {
        let Some((old_prefix, new_prefix)) = self.next_prefix(pod) else {
            return Vec::new();
        };
        let old_pods = replicas(pods, &pod.namespace, &old_prefix);
        let Some(source) = old_pods.last().copied() else {
            return Vec::new();
        };

        let mut steps = Vec::new();
        for status in STATUS_SEQUENCE_STOP {
            steps.extend(old_pods.iter().map(|old| DemoStep::new(old, status)));
        }

        let new_pods: Vec<PodDetails> = (0..old_pods.len())
            .map(|seq| self.recreate_pod(&new_prefix, seq, source))
            .collect();
        for status in STATUS_SEQUENCE_START {
            steps.extend(new_pods.iter().map(|new| DemoStep::new(new, status)));
        }
        steps
    }

    /// Split the deployment prefix out of a demo pod name and draw a fresh
    /// one for the same animal. `None` for names not shaped like demo pods.
    fn next_prefix(&mut self, pod: &PodDetails) -> Option<(String, String)> {
        let mut parts = pod.name.split('-');
        let animal = parts.next()?;
        let version = parts.next()?;
        let old_prefix = format!("{animal}-{version}");
        loop {
            let new_prefix = format!("{}-{:x}", animal, self.rng.random_range(0..1u32 << 16));
            if new_prefix != old_prefix {
                return Some((old_prefix, new_prefix));
            }
        }
    }

    fn random_pod(&mut self, pods: &BTreeMap<String, PodDetails>) -> Option<PodDetails> {
        if pods.is_empty() {
            return None;
        }
        let index = self.rng.random_range(0..pods.len());
        pods.values().nth(index).cloned()
    }

    fn create_pod(
        &mut self,
        prefix: &str,
        seq: usize,
        namespace: &str,
        owner_kind: &str,
        size: i64,
    ) -> PodDetails {
        PodDetails {
            name: format!("{prefix}-{seq:x}"),
            namespace: namespace.to_string(),
            node: self.random_node(),
            owner_kind: owner_kind.to_string(),
            status: PodStatus::Running,
            size,
        }
    }

    /// New replica of `old` under `prefix`, not yet scheduled.
    fn recreate_pod(&mut self, prefix: &str, seq: usize, old: &PodDetails) -> PodDetails {
        PodDetails {
            name: format!("{prefix}-{seq:x}"),
            namespace: old.namespace.clone(),
            node: self.random_node(),
            owner_kind: old.owner_kind.clone(),
            status: PodStatus::Init,
            size: old.size,
        }
    }

    fn random_node(&mut self) -> String {
        let node = self.rng.random_range(0..self.settings.nodes.max(1));
        self.names.node(&node.to_string())
    }
}

/// Replicas `{prefix}-0`, `{prefix}-1`, ... of a deployment, up to the first
/// missing sequence number.
fn replicas<'a>(
    pods: &'a BTreeMap<String, PodDetails>,
    namespace: &str,
    prefix: &str,
) -> Vec<&'a PodDetails> {
    (0..)
        .map(|seq: usize| pods.get(&format!("{namespace}/{prefix}-{seq:x}")))
        .take_while(Option::is_some)
        .flatten()
        .collect()
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;

    use super::*;
    use crate::pod_store::PodStore;

    fn cluster(settings: DemoSettings) -> DemoCluster {
        DemoCluster::new(settings, StdRng::seed_from_u64(42))
    }

    fn deployment(prefix: &str, count: usize) -> BTreeMap<String, PodDetails> {
        (0..count)
            .map(|seq| PodDetails {
                name: format!("{prefix}-{seq:x}"),
                namespace: "calm_otter".into(),
                node: format!("node-{seq}"),
                owner_kind: "ReplicaSet".into(),
                status: PodStatus::Running,
                size: 7,
            })
            .map(|pod| (pod.full_name(), pod))
            .collect()
    }

    async fn apply(store: &PodStore, steps: Vec<DemoStep>) {
        for step in steps {
            store.apply_status(step.pod, step.status).await;
        }
    }

    #[test]
    fn step_delay_scales_speed() {
        let settings = DemoSettings::default();
        assert_eq!(settings.step_delay(), Duration::from_secs(5));
    }

    #[test]
    fn generate_creates_requested_running_pods() {
        let settings = DemoSettings {
            nodes: 4,
            namespaces: 3,
            pods: 25,
            speed: 1,
        };
        let mut demo = cluster(settings);
        let pods = demo.generate();

        assert_eq!(pods.len(), 25);
        let names: HashSet<String> = pods.iter().map(PodDetails::full_name).collect();
        assert_eq!(names.len(), 25);

        let nodes: HashSet<&str> = pods.iter().map(|p| p.node.as_str()).collect();
        let namespaces: HashSet<&str> = pods.iter().map(|p| p.namespace.as_str()).collect();
        assert!(nodes.len() <= 4);
        assert!(namespaces.len() <= 3);

        for pod in &pods {
            assert_eq!(pod.status, PodStatus::Running);
            assert!(OWNER_KINDS.contains(&pod.owner_kind.as_str()));
            assert!((0..99).contains(&pod.size));
            assert_eq!(pod.name.split('-').count(), 3);
        }
    }

    #[test]
    fn replicas_share_deployment_fields() {
        let mut demo = cluster(DemoSettings::default());
        let pods = demo.generate();

        let mut by_prefix: BTreeMap<String, Vec<&PodDetails>> = BTreeMap::new();
        for pod in &pods {
            let (prefix, _) = pod.name.rsplit_once('-').unwrap();
            by_prefix.entry(prefix.to_string()).or_default().push(pod);
        }
        for replicas in by_prefix.values() {
            // nodes * 3 / 4 with the default six nodes.
            assert!(replicas.len() <= 4);
            assert!(replicas.iter().all(|p| p.namespace == replicas[0].namespace));
            assert!(replicas.iter().all(|p| p.owner_kind == replicas[0].owner_kind));
            assert!(replicas.iter().all(|p| p.size == replicas[0].size));
        }
    }

    #[test]
    fn single_node_cluster_still_generates() {
        let mut demo = cluster(DemoSettings {
            nodes: 1,
            namespaces: 1,
            pods: 3,
            speed: 1,
        });
        assert_eq!(demo.generate().len(), 3);
    }

    #[test]
    fn empty_cluster_plans_nothing() {
        let mut demo = cluster(DemoSettings::default());
        let empty = BTreeMap::new();
        for action in [
            DemoAction::CrashContainer,
            DemoAction::RollingUpdate,
            DemoAction::Recreate,
        ] {
            assert!(demo.plan(action, &empty).is_empty());
        }
    }

    #[test]
    fn crash_restarts_one_pod() {
        let mut demo = cluster(DemoSettings::default());
        let pods = deployment("otter-beef", 3);

        let steps = demo.plan(DemoAction::CrashContainer, &pods);

        let statuses: Vec<PodStatus> = steps.iter().map(|s| s.status).collect();
        assert_eq!(statuses, STATUS_SEQUENCE_CRASH.to_vec());
        assert!(steps.iter().all(|s| s.pod == steps[0].pod));
        assert!(pods.contains_key(&steps[0].pod.full_name()));
    }

    #[tokio::test]
    async fn rolling_update_replaces_replicas_in_order() {
        let mut demo = cluster(DemoSettings::default());
        let pods = deployment("otter-beef", 3);

        let steps = demo.plan(DemoAction::RollingUpdate, &pods);

        assert_eq!(steps.len(), 3 * (3 + 2));
        // First replica: new pod starts fully, then the old one stops.
        let first: Vec<(String, PodStatus)> = steps[..5]
            .iter()
            .map(|s| (s.pod.name.clone(), s.status))
            .collect();
        let new_name = first[0].0.clone();
        assert!(new_name.starts_with("otter-") && new_name.ends_with("-0"));
        assert_ne!(new_name, "otter-beef-0");
        assert_eq!(
            first,
            vec![
                (new_name.clone(), PodStatus::Init),
                (new_name.clone(), PodStatus::Starting),
                (new_name, PodStatus::Running),
                ("otter-beef-0".to_string(), PodStatus::Terminating),
                ("otter-beef-0".to_string(), PodStatus::Completed),
            ]
        );

        let store = PodStore::with_pods(pods.into_values());
        apply(&store, steps).await;
        let after = store.snapshot().await;
        assert_eq!(after.len(), 3);
        assert!(after.values().all(|p| p.status == PodStatus::Running));
        assert!(after.values().all(|p| !p.name.starts_with("otter-beef-")));
        assert!(after.values().all(|p| p.size == 7 && p.owner_kind == "ReplicaSet"));
    }

    #[tokio::test]
    async fn recreate_stops_everything_before_starting() {
        let mut demo = cluster(DemoSettings::default());
        let mut pods = deployment("otter-beef", 2);
        // An unrelated deployment must stay untouched.
        pods.extend(deployment("lynx-cafe", 1));

        // Pick until the plan targets the otter deployment.
        let steps = loop {
            let steps = demo.plan(DemoAction::Recreate, &pods);
            if steps[0].pod.name.starts_with("otter-") {
                break steps;
            }
        };

        let statuses: Vec<PodStatus> = steps.iter().map(|s| s.status).collect();
        assert_eq!(
            statuses,
            vec![
                PodStatus::Terminating,
                PodStatus::Terminating,
                PodStatus::Completed,
                PodStatus::Completed,
                PodStatus::Init,
                PodStatus::Init,
                PodStatus::Starting,
                PodStatus::Starting,
                PodStatus::Running,
                PodStatus::Running,
            ]
        );

        let store = PodStore::with_pods(pods.into_values());
        apply(&store, steps).await;
        let after = store.snapshot().await;
        assert_eq!(after.len(), 3);
        assert!(after.contains_key("calm_otter/lynx-cafe-0"));
        assert!(!after.contains_key("calm_otter/otter-beef-0"));
        assert!(after.values().all(|p| p.status == PodStatus::Running));
    }

    #[test]
    fn foreign_pod_names_plan_nothing_for_deployments() {
        let mut demo = cluster(DemoSettings::default());
        let mut pods = BTreeMap::new();
        let pod = PodDetails {
            name: "standalone".into(),
            namespace: "ns".into(),
            node: "n".into(),
            owner_kind: "undefined".into(),
            status: PodStatus::Running,
            size: 0,
        };
        pods.insert(pod.full_name(), pod);

        assert!(demo.plan(DemoAction::RollingUpdate, &pods).is_empty());
        assert!(demo.plan(DemoAction::Recreate, &pods).is_empty());
        assert_eq!(demo.plan(DemoAction::CrashContainer, &pods).len(), 3);
    }
}
