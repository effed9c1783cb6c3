//! Fan command handlers.

use serde::Serialize;
use tabled::Tabled;

use marspro_core::{
    CommandResult, CoreError, FanCalculation, FanController, Hub, LevelControl, PowerState,
};

use crate::cli::{FanArgs, FanCommand, GlobalOpts};
use crate::error::CliError;
use crate::output;

use super::util;

/// Serializable view of a fan controller.
#[derive(Serialize)]
struct FanView {
    id: String,
    unique_id: String,
    name: String,
    available: bool,
    state: PowerState,
    percentage: u8,
}

impl From<&FanController> for FanView {
    fn from(f: &FanController) -> Self {
        Self {
            id: f.device_id().to_owned(),
            unique_id: f.unique_id(),
            name: f.name().to_owned(),
            available: f.is_available(),
            state: f.state(),
            percentage: f.percentage(),
        }
    }
}

#[derive(Tabled)]
struct FanRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "State")]
    state: String,
    #[tabled(rename = "Speed")]
    speed: String,
}

impl FanRow {
    fn new(v: &FanView, color: bool) -> Self {
        Self {
            id: v.id.clone(),
            name: v.name.clone(),
            state: output::state_cell(v.state, color),
            speed: v.state.level().map_or_else(|| "-".into(), |p| format!("{p}%")),
        }
    }
}

/// Calculation results arrive as numbers or numeric strings.
fn value_text(v: &serde_json::Value) -> String {
    match v {
        serde_json::Value::String(s) => s.clone(),
        serde_json::Value::Null => "-".into(),
        other => other.to_string(),
    }
}

fn calc_detail(c: &FanCalculation) -> String {
    [
        format!("Speed:    {}%", c.percentage),
        format!("Airflow:  {} CFM", value_text(&c.cfm)),
        format!("Pressure: {} Pa", value_text(&c.pa)),
    ]
    .join("\n")
}

fn print_calculation(result: &CommandResult, global: &GlobalOpts) {
    if let CommandResult::FanSpeed(calc) = result {
        let out = output::render_single(&global.output, calc, calc_detail, |c| {
            c.percentage.to_string()
        });
        output::print_output(&out, global.quiet);
    }
}

pub async fn handle(hub: &Hub, args: FanArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        FanCommand::List => {
            let views: Vec<FanView> = hub.fans().iter().map(FanView::from).collect();
            let color = output::should_color(&global.color);
            let out = output::render_list(
                &global.output,
                &views,
                |v| FanRow::new(v, color),
                |v| v.id.clone(),
            );
            output::print_output(&out, global.quiet);
            Ok(())
        }

        FanCommand::On { device, percentage } => {
            let fan = util::find_fan(hub, &device)?;
            let result = fan.turn_on(percentage).await?;
            output::print_status(&format!("{} turned on", fan.name()), global.quiet);
            print_calculation(&result, global);
            Ok(())
        }

        FanCommand::Off { device } => {
            let fan = util::find_fan(hub, &device)?;
            let result = fan.turn_off().await?;
            output::print_status(
                &format!("{} dropped to minimum speed", fan.name()),
                global.quiet,
            );
            print_calculation(&result, global);
            Ok(())
        }

        FanCommand::Set { device, percentage } => {
            let fan = util::find_fan(hub, &device)?;
            let result = fan.set_level(percentage).await?;
            output::print_status(&format!("{} speed updated", fan.name()), global.quiet);
            print_calculation(&result, global);
            Ok(())
        }

        FanCommand::Calc { device, percentage } => {
            let fan = util::find_fan(hub, &device)?;
            let calc = hub
                .client()
                .fan_airflow(fan.device_id(), percentage)
                .await
                .map_err(CoreError::from)?;
            let out = output::render_single(&global.output, &calc, calc_detail, |c| {
                format!("{}\t{}", value_text(&c.cfm), value_text(&c.pa))
            });
            output::print_output(&out, global.quiet);
            Ok(())
        }
    }
}
