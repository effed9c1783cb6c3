use std::sync::Arc;

use crate::codec;
use crate::command::{Command, CommandResult};
use crate::controller::Hub;
use crate::entity::{LevelControl, PowerState};
use crate::error::CoreError;
use crate::model::Device;

/// An inline fan with percentage speed control.
///
/// The hardware has no off state: "off" sets the 25 % minimum.
#[derive(Clone)]
pub struct FanController {
    hub: Hub,
    device_id: String,
    name: String,
}

impl FanController {
    pub fn new(hub: Hub, device: &Device) -> Self {
        let name = format!("{} {}", hub.config().name_prefix, device.display_name);
        Self {
            hub,
            device_id: device.id.clone(),
            name,
        }
    }

    pub fn device_id(&self) -> &str {
        &self.device_id
    }

    /// The device as of the last snapshot.
    pub fn device(&self) -> Option<Arc<Device>> {
        self.hub.device(&self.device_id)
    }

    /// Current speed percentage; `0` when unknown.
    pub fn percentage(&self) -> u8 {
        self.device()
            .map_or(0, |d| codec::fan_percentage(&d.id, d.raw_info.as_deref()))
    }
}

impl LevelControl for FanController {
    fn unique_id(&self) -> String {
        format!("marspro_fan_{}", self.device_id)
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn is_available(&self) -> bool {
        self.device().is_some_and(|d| d.is_connected())
    }

    fn state(&self) -> PowerState {
        if !self.is_available() {
            return PowerState::Unavailable;
        }
        match self.percentage() {
            0 => PowerState::Off,
            level => PowerState::On(level),
        }
    }

    async fn turn_on(&self, level: Option<u8>) -> Result<CommandResult, CoreError> {
        self.set_level(level.unwrap_or(codec::FAN_MIN_PERCENT)).await
    }

    async fn turn_off(&self) -> Result<CommandResult, CoreError> {
        self.set_level(codec::FAN_MIN_PERCENT).await
    }

    async fn set_level(&self, level: u8) -> Result<CommandResult, CoreError> {
        self.hub
            .execute(Command::SetFanSpeed {
                device_id: self.device_id.clone(),
                percentage: codec::fan_command_percent(level),
            })
            .await
    }
}
