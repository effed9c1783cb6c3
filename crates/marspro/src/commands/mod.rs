//! Command dispatch: bridges CLI args -> hub operations -> output formatting.

pub mod config_cmd;
pub mod devices;
pub mod fan;
pub mod light;
pub mod login;
pub mod util;
pub mod watch;

use marspro_core::Hub;

use crate::cli::{Command, GlobalOpts};
use crate::error::CliError;

/// Dispatch a connected-hub command to the appropriate handler.
pub async fn dispatch(cmd: Command, hub: &Hub, global: &GlobalOpts) -> Result<(), CliError> {
    match cmd {
        Command::Devices(args) => devices::handle(hub, args, global).await,
        Command::Light(args) => light::handle(hub, args, global).await,
        Command::Fan(args) => fan::handle(hub, args, global).await,
        // Handled before a hub is connected
        Command::Login | Command::Watch(_) | Command::Config(_) | Command::Completions(_) => {
            Err(CliError::Unsupported {
                operation: format!("{cmd:?} after connect"),
            })
        }
    }
}
