//! Random, memoized replacement names for cluster objects.
//!
//! Used by the demo simulator to invent a plausible cluster and by the
//! Kubernetes source to anonymize real node, namespace and pod names.
//! Names are built from shuffled word lists:
//!
//! - short name: `{animal}` (e.g. `otter`)
//! - long name: `{descriptor}_{animal}` (e.g. `brave_otter`)
//! - node: `{cluster}-az{zone}-{hex}` (e.g. `cluster-42-az1-10a`)

use std::collections::{HashMap, HashSet};

use rand::seq::SliceRandom;
use rand::Rng;

use crate::pod::PodDetails;

const DESCRIPTORS: &[&str] = &[
    "amber", "ancient", "bold", "brave", "bright", "calm", "clever", "cosmic", "crimson", "curious",
    "daring", "dusty", "eager", "early", "electric", "fancy", "fearless", "fuzzy", "gentle",
    "giddy", "golden", "happy", "hazy", "honest", "hungry", "icy", "jolly", "keen", "kind",
    "lazy", "little", "lucky", "mellow", "misty", "modest", "nimble", "noble", "odd", "olive",
    "plucky", "polite", "proud", "quiet", "quick", "rapid", "rusty", "sandy", "shiny", "silent",
    "silly", "sleepy", "snowy", "solid", "steady", "sunny", "swift", "tidy", "wandering", "witty",
    "zealous",
];

const ANIMALS: &[&str] = &[
    "alpaca", "badger", "beaver", "bison", "camel", "cheetah", "cobra", "condor", "coyote",
    "crane", "dingo", "dolphin", "eagle", "falcon", "ferret", "finch", "gazelle", "gecko",
    "gopher", "heron", "hippo", "ibex", "iguana", "jackal", "jaguar", "koala", "lemur", "lynx",
    "magpie", "marmot", "meerkat", "moose", "narwhal", "newt", "ocelot", "orca", "otter", "owl",
    "panda", "pelican", "puffin", "quail", "rabbit", "raven", "salmon", "seal", "sloth",
    "sparrow", "tapir", "tiger", "toucan", "turtle", "urchin", "vulture", "walrus", "wombat",
    "yak", "zebra",
];

/// Walks shuffled permutations of the descriptor and animal lists.
#[derive(Debug, Clone)]
pub struct RandomMoniker {
    perm_desc: Vec<usize>,
    perm_noun: Vec<usize>,
    curr_desc: usize,
    curr_noun: usize,
}

impl RandomMoniker {
    pub fn new<R: Rng>(rng: &mut R) -> Self {
        let mut perm_desc: Vec<usize> = (0..DESCRIPTORS.len()).collect();
        let mut perm_noun: Vec<usize> = (0..ANIMALS.len()).collect();
        perm_desc.shuffle(rng);
        perm_noun.shuffle(rng);
        Self {
            perm_desc,
            perm_noun,
            curr_desc: 0,
            curr_noun: 0,
        }
    }

    /// Next one-word name. Once every animal has been used the list starts
    /// over with a round number appended (`otter2`, `otter3`, ...), so no
    /// name is handed out twice.
    pub fn name(&mut self) -> String {
        let round = self.curr_noun / ANIMALS.len();
        let animal = ANIMALS[self.perm_noun[self.curr_noun % ANIMALS.len()]];
        self.curr_noun += 1;
        if round == 0 {
            animal.to_string()
        } else {
            format!("{animal}{}", round + 1)
        }
    }

    /// Next two-word name, `descriptor_animal`.
    pub fn long_name(&mut self) -> String {
        let name = self.name();
        let desc = DESCRIPTORS[self.perm_desc[self.curr_desc % DESCRIPTORS.len()]];
        self.curr_desc += 1;
        format!("{desc}_{name}")
    }
}

/// Maps real names to random ones, returning the same replacement for the
/// same input.
#[derive(Debug, Clone)]
pub struct RandomNameGenerator {
    cluster_name: String,
    nodes: HashMap<String, String>,
    nodes_seen: usize,
    namespaces: HashMap<String, String>,
    pods: HashMap<String, String>,
    monikers: RandomMoniker,
}

impl RandomNameGenerator {
    pub fn new<R: Rng>(rng: &mut R) -> Self {
        Self {
            cluster_name: format!("cluster-{}", rng.random_range(10..100)),
            nodes: HashMap::new(),
            nodes_seen: 0,
            namespaces: HashMap::new(),
            pods: HashMap::new(),
            monikers: RandomMoniker::new(rng),
        }
    }

    pub fn cluster_name(&self) -> &str {
        &self.cluster_name
    }

    /// Node names are spread over three zones and numbered in order of
    /// first appearance.
    pub fn node(&mut self, node: &str) -> String {
        if let Some(name) = self.nodes.get(node) {
            return name.clone();
        }
        let number = self.nodes_seen;
        self.nodes_seen += 1;
        let zone = number % 3;
        let name = format!("{}-az{}-{:x}", self.cluster_name, zone, 256 + 10 * number);
        self.nodes.insert(node.to_string(), name.clone());
        name
    }

    pub fn namespace(&mut self, namespace: &str) -> String {
        if let Some(name) = self.namespaces.get(namespace) {
            return name.clone();
        }
        let name = self.monikers.long_name();
        self.namespaces.insert(namespace.to_string(), name.clone());
        name
    }

    /// Replacement for a pod's generate-name (the part before the replica
    /// suffix).
    pub fn pod_name(&mut self, generate_name: &str) -> String {
        if let Some(name) = self.pods.get(generate_name) {
            return name.clone();
        }
        let name = self.monikers.name();
        self.pods.insert(generate_name.to_string(), name.clone());
        name
    }

    /// Forget the replacements of nodes, namespaces and generate-names that
    /// no pod in `live` uses any more. Names still in use keep their
    /// replacement; dropped ones get a fresh name if they come back.
    pub fn retain_live(&mut self, live: &[PodDetails]) {
        let mut nodes = HashSet::new();
        let mut namespaces = HashSet::new();
        let mut prefixes = HashSet::new();
        for pod in live {
            nodes.insert(pod.node.as_str());
            namespaces.insert(pod.namespace.as_str());
            prefixes.insert(generate_name(&pod.name));
        }

        self.nodes.retain(|real, _| nodes.contains(real.as_str()));
        self.namespaces.retain(|real, _| namespaces.contains(real.as_str()));
        self.pods.retain(|real, _| prefixes.contains(real.as_str()));
    }

    /// Copy of `pod` with node, namespace and name replaced.
    ///
    /// The last `-suffix` of the pod name is kept so replicas of the same
    /// owner stay recognizable. Unscheduled pods keep an empty node.
    pub fn anonymize(&mut self, pod: &PodDetails) -> PodDetails {
        let name = match pod.name.rsplit_once('-') {
            Some((prefix, suffix)) => format!("{}-{}", self.pod_name(prefix), suffix),
            None => self.pod_name(&pod.name),
        };
        let node = if pod.node.is_empty() {
            String::new()
        } else {
            self.node(&pod.node)
        };
        PodDetails {
            name,
            namespace: self.namespace(&pod.namespace),
            node,
            owner_kind: pod.owner_kind.clone(),
            status: pod.status,
            size: pod.size,
        }
    }
}

/// Pod name without its last `-suffix`.
fn generate_name(name: &str) -> &str {
    name.rsplit_once('-').map_or(name, |(prefix, _)| prefix)
}
