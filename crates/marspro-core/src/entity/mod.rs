// ── Device controllers ──
//
// Host-facing handles for individual lights and fans. Reads come from the
// hub's current snapshot; writes go through the hub's command channel and
// show up after the next poll.

mod fan;
mod light;

pub use fan::FanController;
pub use light::LightController;

use std::future::Future;

use serde::Serialize;

use crate::command::CommandResult;
use crate::error::CoreError;

/// Observed state of a controllable device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "level", rename_all = "snake_case")]
pub enum PowerState {
    Off,
    /// On at a level in the controller's host scale (brightness 0–255 for
    /// lights, percentage for fans).
    On(u8),
    /// Disconnected from the cloud, or no longer listed.
    Unavailable,
}

impl PowerState {
    pub fn is_on(self) -> bool {
        matches!(self, Self::On(_))
    }

    pub fn level(self) -> Option<u8> {
        match self {
            Self::On(level) => Some(level),
            Self::Off | Self::Unavailable => None,
        }
    }
}

/// A device with one adjustable level.
pub trait LevelControl {
    /// Stable id, unique across the host.
    fn unique_id(&self) -> String;

    /// `"{prefix} {deviceName}"`.
    fn name(&self) -> &str;

    /// `false` when the device is disconnected or missing from the last
    /// snapshot.
    fn is_available(&self) -> bool;

    fn state(&self) -> PowerState;

    /// Turn on at `level`, or at the controller's default when `None`.
    fn turn_on(
        &self,
        level: Option<u8>,
    ) -> impl Future<Output = Result<CommandResult, CoreError>> + Send;

    fn turn_off(&self) -> impl Future<Output = Result<CommandResult, CoreError>> + Send;

    fn set_level(&self, level: u8)
    -> impl Future<Output = Result<CommandResult, CoreError>> + Send;
}
