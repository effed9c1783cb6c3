// ── Device domain types ──

use serde::{Deserialize, Serialize};

use super::group::DeviceGroup;

/// Cloud connection status of a device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectStatus {
    /// Wire value `1`.
    Connected,
    /// Any other wire value, kept for diagnostics.
    Disconnected { raw: Option<i64> },
}

impl ConnectStatus {
    pub fn from_raw(raw: Option<i64>) -> Self {
        match raw {
            Some(1) => Self::Connected,
            other => Self::Disconnected { raw: other },
        }
    }

    pub fn is_connected(self) -> bool {
        matches!(self, Self::Connected)
    }
}

/// A device as listed by the last successful poll of its group.
///
/// Replaced whole on every poll; never patched in place.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Device {
    pub id: String,
    /// Vendor `deviceName`, without the host prefix.
    pub display_name: String,
    pub group: DeviceGroup,
    pub connect_status: ConnectStatus,
    /// Vendor `deviceInfo`: a JSON document packed into a string.
    pub raw_info: Option<String>,
    /// Model code such as `MZL001` or `MH200-M`.
    pub device_type: Option<String>,
    pub product_id: Option<String>,
}

impl Device {
    pub fn is_connected(&self) -> bool {
        self.connect_status.is_connected()
    }
}
