// ── Poll cycle ──
//
// Fetches every configured product group and assembles a fresh snapshot.
// Groups are independent: one failing group is logged and left out, the
// rest still land.

use marspro_api::{MarsProClient, RawDevice};
use tracing::{debug, warn};

use super::Snapshot;
use crate::model::{Device, DeviceGroup};

/// Poll lights, fans and the extra groups, in that order.
///
/// Lights and fans are kept even when empty. Extra groups only make it
/// into the snapshot when the call succeeds and lists at least one device.
pub(crate) async fn fetch_snapshot(client: &MarsProClient, other_groups: &[u32]) -> Snapshot {
    let mut snapshot = Snapshot::new();

    for group in [DeviceGroup::Light, DeviceGroup::Fan] {
        if let Some(list) = fetch_group(client, group).await {
            snapshot.insert_group(group, convert(group, list));
        }
    }

    for &id in other_groups {
        let group = DeviceGroup::from(id);
        if group.is_primary() || snapshot.contains_group(group) {
            debug!(%group, "extra group already polled, skipping");
            continue;
        }
        match fetch_group(client, group).await {
            Some(list) if !list.is_empty() => snapshot.insert_group(group, convert(group, list)),
            Some(_) => debug!(%group, "group is empty, leaving it out"),
            None => {}
        }
    }

    debug!(
        groups = snapshot.groups().len(),
        devices = snapshot.len(),
        "poll complete"
    );
    snapshot
}

/// One list call; `None` when it failed.
async fn fetch_group(client: &MarsProClient, group: DeviceGroup) -> Option<Vec<RawDevice>> {
    match client.list_devices(group.id()).await {
        Ok(list) => Some(list),
        Err(e) => {
            warn!(%group, error = %e, "device list failed, group left out of this poll");
            None
        }
    }
}

fn convert(group: DeviceGroup, list: Vec<RawDevice>) -> Vec<Device> {
    list.into_iter()
        .map(|raw| Device::from_raw(group, raw))
        .collect()
}
