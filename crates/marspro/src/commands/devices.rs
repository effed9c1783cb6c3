//! Device command handlers.

use std::sync::Arc;

use tabled::Tabled;

use marspro_core::{CoreError, Device, DeviceDetail, DeviceGroup, Hub, codec};

use crate::cli::{DevicesArgs, DevicesCommand, GlobalOpts};
use crate::error::CliError;
use crate::output;

use super::util;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
pub struct DeviceRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Group")]
    group: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Level")]
    level: String,
    #[tabled(rename = "Model")]
    model: String,
}

impl DeviceRow {
    pub fn new(d: &Arc<Device>, color: bool) -> Self {
        Self {
            id: d.id.clone(),
            name: d.display_name.clone(),
            group: d.group.to_string(),
            status: output::status_cell(d.is_connected(), color),
            level: util::level_summary(d),
            model: d.device_type.clone().unwrap_or_else(|| "-".into()),
        }
    }
}

fn detail(d: &DeviceDetail) -> String {
    let mut lines = vec![
        format!("ID:       {}", d.id.as_deref().unwrap_or("-")),
        format!("Name:     {}", d.device_name.as_deref().unwrap_or("-")),
        format!("Model:    {}", d.device_type.as_deref().unwrap_or("-")),
        format!(
            "Status:   {}",
            if d.connect_status == Some(1) {
                "connected".to_string()
            } else {
                format!("offline ({})", d.connect_status.map_or("?".into(), |s| s.to_string()))
            }
        ),
    ];

    match codec::decode_device_info(d.device_info.as_deref()) {
        Ok(info) => {
            if let Some(bright) = info.last_bright {
                lines.push(format!("Bright:   {bright}%"));
            }
            if let Some(speed) = info.fan_speed {
                lines.push(format!(
                    "Speed:    {}% (raw {speed})",
                    codec::fan_raw_to_percent(speed)
                ));
            }
        }
        Err(e) => lines.push(format!("Info:     undecodable ({e})")),
    }

    let mut extra: Vec<_> = d.extra.iter().collect();
    extra.sort_by(|a, b| a.0.cmp(b.0));
    for (key, value) in extra {
        lines.push(format!("{key}: {value}"));
    }

    lines.join("\n")
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(hub: &Hub, args: DevicesArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        DevicesCommand::List { group } => {
            let snap = hub.snapshot();
            let wanted = group.map(DeviceGroup::from);
            let devices: Vec<Arc<Device>> = snap
                .devices()
                .filter(|d| wanted.is_none_or(|g| d.group == g))
                .cloned()
                .collect();

            let color = output::should_color(&global.color);
            let out = output::render_list(
                &global.output,
                &devices,
                |d| DeviceRow::new(d, color),
                |d| d.id.clone(),
            );
            output::print_output(&out, global.quiet);
            Ok(())
        }

        DevicesCommand::Get { device } => {
            let found = hub
                .client()
                .get_device_detail(&device)
                .await
                .map_err(CoreError::from)?;
            let out = output::render_single(&global.output, &found, detail, |d| {
                d.id.clone().unwrap_or_else(|| device.clone())
            });
            output::print_output(&out, global.quiet);
            Ok(())
        }
    }
}
