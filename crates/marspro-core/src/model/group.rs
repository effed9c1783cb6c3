// ── Product groups ──

use serde::{Deserialize, Serialize};

const LIGHT_GROUP_ID: u32 = 1;
const FAN_GROUP_ID: u32 = 2;

/// Product group a device was listed under.
///
/// Serialized as the wire id so that JSON output matches what the
/// service reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "u32", into = "u32")]
pub enum DeviceGroup {
    /// Grow lights (wire id 1).
    Light,
    /// Inline fans (wire id 2).
    Fan,
    /// Any other product group, polled opportunistically.
    Other(u32),
}

impl DeviceGroup {
    /// The group id sent as `deviceProductGroup`.
    pub fn id(self) -> u32 {
        match self {
            Self::Light => LIGHT_GROUP_ID,
            Self::Fan => FAN_GROUP_ID,
            Self::Other(id) => id,
        }
    }

    /// Whether this group always gets polled.
    pub fn is_primary(self) -> bool {
        matches!(self, Self::Light | Self::Fan)
    }
}

impl From<u32> for DeviceGroup {
    fn from(id: u32) -> Self {
        match id {
            LIGHT_GROUP_ID => Self::Light,
            FAN_GROUP_ID => Self::Fan,
            other => Self::Other(other),
        }
    }
}

impl From<DeviceGroup> for u32 {
    fn from(group: DeviceGroup) -> Self {
        group.id()
    }
}

impl std::fmt::Display for DeviceGroup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Light => f.write_str("light"),
            Self::Fan => f.write_str("fan"),
            Self::Other(id) => write!(f, "group-{id}"),
        }
    }
}
