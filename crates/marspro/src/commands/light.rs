//! Light command handlers.

use serde::Serialize;
use tabled::Tabled;

use marspro_core::{Hub, LevelControl, LightController, PowerState};

use crate::cli::{GlobalOpts, LightArgs, LightCommand};
use crate::error::CliError;
use crate::output;

use super::util;

/// Serializable view of a light controller.
#[derive(Serialize)]
struct LightView {
    id: String,
    unique_id: String,
    name: String,
    available: bool,
    state: PowerState,
    brightness: u8,
}

impl From<&LightController> for LightView {
    fn from(l: &LightController) -> Self {
        Self {
            id: l.device_id().to_owned(),
            unique_id: l.unique_id(),
            name: l.name().to_owned(),
            available: l.is_available(),
            state: l.state(),
            brightness: l.brightness(),
        }
    }
}

#[derive(Tabled)]
struct LightRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "State")]
    state: String,
    #[tabled(rename = "Brightness")]
    brightness: String,
}

impl LightRow {
    fn new(v: &LightView, color: bool) -> Self {
        Self {
            id: v.id.clone(),
            name: v.name.clone(),
            state: output::state_cell(v.state, color),
            brightness: v.state.level().map_or_else(|| "-".into(), |b| format!("{b}/255")),
        }
    }
}

pub async fn handle(hub: &Hub, args: LightArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        LightCommand::List => {
            let views: Vec<LightView> = hub.lights().iter().map(LightView::from).collect();
            let color = output::should_color(&global.color);
            let out = output::render_list(
                &global.output,
                &views,
                |v| LightRow::new(v, color),
                |v| v.id.clone(),
            );
            output::print_output(&out, global.quiet);
            Ok(())
        }

        LightCommand::On { device, brightness } => {
            let light = util::find_light(hub, &device)?;
            light.turn_on(brightness).await?;
            let level = brightness.map_or_else(|| "last level".into(), |b| format!("{b}/255"));
            output::print_status(&format!("{} turned on ({level})", light.name()), global.quiet);
            Ok(())
        }

        LightCommand::Off { device } => {
            let light = util::find_light(hub, &device)?;
            light.turn_off().await?;
            output::print_status(&format!("{} turned off", light.name()), global.quiet);
            Ok(())
        }

        LightCommand::Set { device, brightness } => {
            let light = util::find_light(hub, &device)?;
            light.set_level(brightness).await?;
            output::print_status(
                &format!("{} set to {brightness}/255", light.name()),
                global.quiet,
            );
            Ok(())
        }
    }
}
