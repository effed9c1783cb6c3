// ── API-to-domain type conversions ──
//
// Bridges raw `marspro_api` records into `marspro_core::model` types. The
// group is not reliable on the wire (`deviceProductGroup` is often
// missing), so the caller supplies the group the device was listed under.

use marspro_api::RawDevice;

use crate::model::{ConnectStatus, Device, DeviceGroup};

impl Device {
    /// Build a device from a list entry fetched for `group`.
    pub fn from_raw(group: DeviceGroup, raw: RawDevice) -> Self {
        let display_name = raw
            .device_name
            .filter(|name| !name.trim().is_empty())
            .unwrap_or_else(|| format!("Device {}", raw.id));

        Self {
            id: raw.id,
            display_name,
            group,
            connect_status: ConnectStatus::from_raw(raw.connect_status),
            raw_info: raw.device_info,
            device_type: raw.device_type,
            product_id: raw.product_id,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    fn raw(value: serde_json::Value) -> RawDevice {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn connected_light() {
        let dev = Device::from_raw(
            DeviceGroup::Light,
            raw(json!({
                "id": 42,
                "deviceName": "Veg Tent",
                "connectStatus": 1,
                "deviceInfo": "{\"lastBright\":75}",
                "deviceType": "MZL001"
            })),
        );
        assert_eq!(dev.id, "42");
        assert_eq!(dev.display_name, "Veg Tent");
        assert!(dev.is_connected());
        assert_eq!(dev.raw_info.as_deref(), Some("{\"lastBright\":75}"));
        assert_eq!(dev.device_type.as_deref(), Some("MZL001"));
    }

    #[test]
    fn any_status_but_one_is_disconnected() {
        let dev = Device::from_raw(
            DeviceGroup::Fan,
            raw(json!({ "id": "f1", "deviceName": "Exhaust", "connectStatus": 0 })),
        );
        assert_eq!(dev.connect_status, ConnectStatus::Disconnected { raw: Some(0) });

        let dev = Device::from_raw(DeviceGroup::Fan, raw(json!({ "id": "f2" })));
        assert_eq!(dev.connect_status, ConnectStatus::Disconnected { raw: None });
    }

    #[test]
    fn missing_name_falls_back_to_id() {
        let dev = Device::from_raw(DeviceGroup::Other(3), raw(json!({ "id": "x9", "deviceName": "" })));
        assert_eq!(dev.display_name, "Device x9");
    }
}
