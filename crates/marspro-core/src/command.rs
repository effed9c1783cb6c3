// ── Command API ──
//
// All device writes flow through a single `Command` enum. The hub
// serializes them through one processor task.

use marspro_api::FanCalculation;

use crate::error::CoreError;

/// A command envelope sent through the command channel.
/// Contains the command and a oneshot response channel.
pub(crate) struct CommandEnvelope {
    pub command: Command,
    pub response_tx: tokio::sync::oneshot::Sender<Result<CommandResult, CoreError>>,
}

/// All write operations against MarsPro devices.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Set a light's raw brightness percentage (0–100).
    SetLightBrightness { device_id: String, percentage: u8 },
    /// Set a fan's speed percentage (25–100).
    SetFanSpeed { device_id: String, percentage: u8 },
}

impl Command {
    pub fn device_id(&self) -> &str {
        match self {
            Self::SetLightBrightness { device_id, .. } | Self::SetFanSpeed { device_id, .. } => {
                device_id
            }
        }
    }
}

/// What a command produced.
#[derive(Debug, Clone)]
pub enum CommandResult {
    /// The raw brightness percentage a light was set to.
    Brightness(u8),
    /// Fan speed changes also report the airflow figures the service
    /// computed for the new speed.
    FanSpeed(FanCalculation),
}
