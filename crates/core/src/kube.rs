//! Mapping of Kubernetes `core/v1` pods to [`PodDetails`].
//!
//! Only the fields the board needs are modelled; everything else in the API
//! response is ignored by serde.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::pod::{PodDetails, PodStatus};

/// Owner kind reported for pods without owner references.
pub const UNDEFINED_OWNER: &str = "undefined";

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PodList {
    #[serde(default)]
    pub items: Vec<Pod>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Pod {
    #[serde(default)]
    pub metadata: ObjectMeta,
    #[serde(default)]
    pub spec: PodSpec,
    #[serde(default)]
    pub status: PodStatusInfo,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectMeta {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub namespace: String,
    #[serde(default)]
    pub owner_references: Vec<OwnerReference>,
    pub deletion_timestamp: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct OwnerReference {
    #[serde(default)]
    pub kind: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PodSpec {
    #[serde(default)]
    pub node_name: String,
    #[serde(default)]
    pub containers: Vec<Container>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Container {
    #[serde(default)]
    pub resources: ResourceRequirements,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ResourceRequirements {
    #[serde(default)]
    pub requests: HashMap<String, String>,
    #[serde(default)]
    pub limits: HashMap<String, String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PodStatusInfo {
    #[serde(default)]
    pub phase: String,
    #[serde(default)]
    pub container_statuses: Vec<ContainerStatus>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ContainerStatus {
    #[serde(default)]
    pub ready: bool,
    #[serde(default)]
    pub state: ContainerState,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ContainerState {
    pub terminated: Option<serde_json::Value>,
}

impl Pod {
    pub fn to_details(&self) -> PodDetails {
        let owner_kind = self
            .metadata
            .owner_references
            .first()
            .map(|o| o.kind.clone())
            .unwrap_or_else(|| UNDEFINED_OWNER.to_string());

        PodDetails {
            name: self.metadata.name.clone(),
            namespace: self.metadata.namespace.clone(),
            node: self.spec.node_name.clone(),
            owner_kind,
            status: pod_status(self),
            size: pod_size(self),
        }
    }
}

/// Relative size of a pod: the sum over containers of CPU millicores times
/// memory bytes (requests, or limits when requests give 0), scaled down by
/// `1000 * 1024 * 1024`.
pub fn pod_size(pod: &Pod) -> i64 {
    let total: i128 = pod
        .spec
        .containers
        .iter()
        .map(|c| {
            let requested = resource_product(&c.resources.requests);
            if requested == 0 {
                resource_product(&c.resources.limits)
            } else {
                requested
            }
        })
        .fold(0i128, i128::saturating_add);
    let scaled = total / 1000 / 1024 / 1024;
    i64::try_from(scaled).unwrap_or(i64::MAX)
}

fn resource_product(resources: &HashMap<String, String>) -> i128 {
    let cpu = resources.get("cpu").map_or(0, |q| cpu_millis(q));
    let memory = resources.get("memory").map_or(0, |q| memory_bytes(q));
    cpu.saturating_mul(memory)
}

/// Board status derived from the pod phase, deletion mark and container
/// states.
pub fn pod_status(pod: &Pod) -> PodStatus {
    match pod.status.phase.as_str() {
        "Failed" | "Unknown" => return PodStatus::Error,
        "Succeeded" => return PodStatus::Completed,
        "Pending" => {
            return if pod.spec.node_name.is_empty() {
                PodStatus::Init
            } else {
                PodStatus::Starting
            };
        }
        "Running" => {}
        _ => return PodStatus::Error,
    }

    if pod.metadata.deletion_timestamp.is_some() {
        return PodStatus::Terminating;
    }

    let mut not_ready = pod.spec.containers.len();
    for container in &pod.status.container_statuses {
        if container.ready {
            not_ready = not_ready.saturating_sub(1);
        } else if container.state.terminated.is_some() {
            return PodStatus::Crash;
        }
    }

    if not_ready > 0 {
        PodStatus::Starting
    } else {
        PodStatus::Running
    }
}

/// CPU quantity in millicores, rounded up. Invalid quantities give 0.
pub fn cpu_millis(quantity: &str) -> i128 {
    Quantity::parse(quantity).map_or(0, |q| q.ceil_scaled(1000))
}

/// Memory quantity in bytes, rounded up. Invalid quantities give 0.
pub fn memory_bytes(quantity: &str) -> i128 {
    Quantity::parse(quantity).map_or(0, |q| q.ceil_scaled(1))
}

/// A non-negative resource quantity kept as an exact fraction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quantity {
    numerator: i128,
    denominator: i128,
}

/// Suffix multipliers as `(numerator, denominator)`. Two-letter binary
/// suffixes come first so `Mi` is not read as `M`.
const SUFFIXES: [(&str, i128, i128); 15] = [
    ("Ki", 1 << 10, 1),
    ("Mi", 1 << 20, 1),
    ("Gi", 1 << 30, 1),
    ("Ti", 1 << 40, 1),
    ("Pi", 1 << 50, 1),
    ("Ei", 1 << 60, 1),
    ("n", 1, 1_000_000_000),
    ("u", 1, 1_000_000),
    ("m", 1, 1_000),
    ("k", 1_000, 1),
    ("M", 1_000_000, 1),
    ("G", 1_000_000_000, 1),
    ("T", 1_000_000_000_000, 1),
    ("P", 1_000_000_000_000_000, 1),
    ("E", 1_000_000_000_000_000_000, 1),
];

const MAX_DIGITS: usize = 24;
const MAX_EXPONENT: u32 = 18;

impl Quantity {
    /// Parse a Kubernetes resource quantity such as `250m`, `1.5`, `128Mi`,
    /// `2G` or `1e3`.
    pub fn parse(quantity: &str) -> Option<Self> {
        let quantity = quantity.trim();
        let (number, mul_num, mul_den) = SUFFIXES
            .iter()
            .find_map(|(suffix, num, den)| {
                quantity.strip_suffix(suffix).map(|rest| (rest, *num, *den))
            })
            .unwrap_or((quantity, 1, 1));

        let (mantissa, exponent) = match number.find(['e', 'E']) {
            Some(pos) => (&number[..pos], number[pos + 1..].parse::<i32>().ok()?),
            None => (number, 0),
        };
        let mantissa = mantissa.strip_prefix('+').unwrap_or(mantissa);
        let (int_part, frac_part) = mantissa.split_once('.').unwrap_or((mantissa, ""));
        if int_part.is_empty() && frac_part.is_empty() {
            return None;
        }
        let digits = format!("{int_part}{frac_part}");
        if digits.len() > MAX_DIGITS || !digits.chars().all(|c| c.is_ascii_digit()) {
            return None;
        }

        let mut numerator: i128 = digits.parse().ok()?;
        let mut denominator: i128 = 10i128.pow(frac_part.len() as u32);
        if exponent.unsigned_abs() > MAX_EXPONENT {
            return None;
        }
        let power = 10i128.pow(exponent.unsigned_abs());
        if exponent >= 0 {
            numerator = numerator.checked_mul(power)?;
        } else {
            denominator = denominator.checked_mul(power)?;
        }

        Some(Self {
            numerator: numerator.checked_mul(mul_num)?,
            denominator: denominator.checked_mul(mul_den)?,
        })
    }

    /// `ceil(self * factor)`, saturating on overflow.
    pub fn ceil_scaled(&self, factor: i128) -> i128 {
        match self.numerator.checked_mul(factor) {
            Some(scaled) => {
                let whole = scaled / self.denominator;
                if scaled % self.denominator == 0 {
                    whole
                } else {
                    whole + 1
                }
            }
            None => i128::MAX,
        }
    }
}
