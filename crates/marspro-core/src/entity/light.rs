use std::sync::Arc;

use crate::codec;
use crate::command::{Command, CommandResult};
use crate::controller::Hub;
use crate::entity::{LevelControl, PowerState};
use crate::error::CoreError;
use crate::model::Device;

/// A dimmable grow light.
///
/// Levels are host brightness (0–255); the device speaks 0–100.
#[derive(Clone)]
pub struct LightController {
    hub: Hub,
    device_id: String,
    name: String,
}

impl LightController {
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

    /// Current host brightness; `0` when unknown.
    pub fn brightness(&self) -> u8 {
        self.device()
            .map_or(0, |d| codec::light_brightness(&d.id, d.raw_info.as_deref()))
    }

    async fn send_raw(&self, percentage: u8) -> Result<CommandResult, CoreError> {
        self.hub
            .execute(Command::SetLightBrightness {
                device_id: self.device_id.clone(),
                percentage,
            })
            .await
    }
}

impl LevelControl for LightController {
    fn unique_id(&self) -> String {
        format!("marspro_light_{}", self.device_id)
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
        match self.brightness() {
            0 => PowerState::Off,
            level => PowerState::On(level),
        }
    }

    /// Without a level the light returns to the last brightness it
    /// reported, or 50 % when that is unknown.
    async fn turn_on(&self, level: Option<u8>) -> Result<CommandResult, CoreError> {
        let raw = match level {
            Some(brightness) => codec::brightness_to_raw(brightness),
            None => self
                .device()
                .and_then(|d| codec::light_last_raw(d.raw_info.as_deref()))
                .unwrap_or(codec::DEFAULT_LIGHT_PERCENT),
        };
        self.send_raw(raw).await
    }

    async fn turn_off(&self) -> Result<CommandResult, CoreError> {
        self.send_raw(0).await
    }

    async fn set_level(&self, level: u8) -> Result<CommandResult, CoreError> {
        self.turn_on(Some(level)).await
    }
}
