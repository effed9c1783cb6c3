//! Shared helpers for command handlers.

use std::sync::Arc;

use marspro_core::{Device, DeviceGroup, FanController, Hub, LightController, codec};

use crate::error::CliError;

/// Find the light controller for `device_id` in the current snapshot.
pub fn find_light(hub: &Hub, device_id: &str) -> Result<LightController, CliError> {
    hub.lights()
        .into_iter()
        .find(|l| l.device_id() == device_id)
        .ok_or_else(|| not_found("light", device_id, "light list"))
}

/// Find the fan controller for `device_id` in the current snapshot.
pub fn find_fan(hub: &Hub, device_id: &str) -> Result<FanController, CliError> {
    hub.fans()
        .into_iter()
        .find(|f| f.device_id() == device_id)
        .ok_or_else(|| not_found("fan", device_id, "fan list"))
}

fn not_found(resource_type: &str, identifier: &str, list_command: &str) -> CliError {
    CliError::NotFound {
        resource_type: resource_type.into(),
        identifier: identifier.into(),
        list_command: list_command.into(),
    }
}

/// Human-readable level for a listed device: brightness for lights,
/// speed for fans, `-` for anything else.
pub fn level_summary(device: &Arc<Device>) -> String {
    let raw = device.raw_info.as_deref();
    match device.group {
        DeviceGroup::Light => format!("{}/255", codec::light_brightness(&device.id, raw)),
        DeviceGroup::Fan => format!("{}%", codec::fan_percentage(&device.id, raw)),
        DeviceGroup::Other(_) => "-".into(),
    }
}

#[cfg(test)]
mod tests {
    use marspro_core::ConnectStatus;

    use super::*;

    fn device(group: DeviceGroup, raw_info: &str) -> Arc<Device> {
        Arc::new(Device {
            id: "d-1".into(),
            display_name: "Tent".into(),
            group,
            connect_status: ConnectStatus::Connected,
            raw_info: Some(raw_info.into()),
            device_type: None,
            product_id: None,
        })
    }

    #[test]
    fn level_follows_group() {
        assert_eq!(
            level_summary(&device(DeviceGroup::Light, r#"{"lastBright":80}"#)),
            "204/255"
        );
        assert_eq!(level_summary(&device(DeviceGroup::Fan, r#"{"fanSpeed":420}"#)), "50%");
        assert_eq!(level_summary(&device(DeviceGroup::Other(6), "{}")), "-");
    }
}
