//! Unified pod representation shared by the demo simulator and the
//! Kubernetes source.

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Lifecycle state of a pod as drawn on the board.
///
/// The integer codes are part of the `/view/pods` wire format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum PodStatus {
    /// Just created, not scheduled yet.
    Init = 0,
    /// Scheduled, containers are starting.
    Starting = 1,
    /// All containers are up and running.
    Running = 2,
    /// One or more containers are down.
    Crash = 3,
    Terminating = 4,
    /// Deleted, completed or evicted.
    Completed = 5,
    Error = 6,
}

/// Statuses a new pod goes through.
pub const STATUS_SEQUENCE_START: [PodStatus; 3] =
    [PodStatus::Init, PodStatus::Starting, PodStatus::Running];

/// Statuses a deleted pod goes through.
pub const STATUS_SEQUENCE_STOP: [PodStatus; 2] = [PodStatus::Terminating, PodStatus::Completed];

/// Statuses a crashed pod goes through while restarting.
pub const STATUS_SEQUENCE_CRASH: [PodStatus; 3] =
    [PodStatus::Crash, PodStatus::Starting, PodStatus::Running];

impl PodStatus {
    pub fn code(self) -> u8 {
        self as u8
    }

    pub fn from_code(code: u8) -> Option<Self> {
        Some(match code {
            0 => Self::Init,
            1 => Self::Starting,
            2 => Self::Running,
            3 => Self::Crash,
            4 => Self::Terminating,
            5 => Self::Completed,
            6 => Self::Error,
            _ => return None,
        })
    }
}

impl Serialize for PodStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(self.code())
    }
}

impl<'de> Deserialize<'de> for PodStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let code = u8::deserialize(deserializer)?;
        Self::from_code(code)
            .ok_or_else(|| serde::de::Error::custom(format!("unknown pod status code {code}")))
    }
}

/// A pod in the format the board frontend consumes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PodDetails {
    pub name: String,
    pub namespace: String,
    pub node: String,
    pub owner_kind: String,
    pub status: PodStatus,
    pub size: i64,
}

impl PodDetails {
    /// Key of the pod in the store: `namespace/name`.
    pub fn full_name(&self) -> String {
        format!("{}/{}", self.namespace, self.name)
    }
}
