//! Watch command handler: run the poller and print each snapshot.

use std::sync::Arc;

use tracing::info;

use marspro_core::{Device, Hub, Snapshot};

use crate::cli::{GlobalOpts, OutputFormat};
use crate::error::CliError;
use crate::output;

use super::devices::DeviceRow;

fn render_snapshot(snap: &Snapshot, global: &GlobalOpts, color: bool) -> String {
    let devices: Vec<Arc<Device>> = snap.devices().cloned().collect();
    let body = output::render_list(
        &global.output,
        &devices,
        |d| DeviceRow::new(d, color),
        |d| d.id.clone(),
    );

    match global.output {
        OutputFormat::Table => {
            let stamp = snap.refreshed_at().map_or_else(
                || "never".into(),
                |t| t.with_timezone(&chrono::Local).format("%H:%M:%S").to_string(),
            );
            format!("── {stamp} · {} devices ──\n{body}", devices.len())
        }
        _ => body,
    }
}

pub async fn handle(hub: &Hub, global: &GlobalOpts) -> Result<(), CliError> {
    hub.connect().await?;
    let mut rx = hub.subscribe();
    let color = output::should_color(&global.color);

    info!(
        interval_secs = hub.config().refresh_interval_secs,
        "watching, Ctrl-C to stop"
    );
    output::print_output(&render_snapshot(&rx.borrow_and_update(), global, color), global.quiet);

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            changed = rx.changed() => {
                if changed.is_err() {
                    break;
                }
                let snap = Arc::clone(&rx.borrow_and_update());
                output::print_output(&render_snapshot(&snap, global, color), global.quiet);
            }
        }
    }

    hub.disconnect().await;
    Ok(())
}
