// ── Snapshot storage ──
//
// Readers load the current snapshot without locking and always see either
// the previous or the next poll result, never a mix. Concurrent refreshes
// are resolved by completion order: the last `replace` wins.

use std::sync::Arc;

use arc_swap::ArcSwap;
use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use tokio::sync::watch;
use tracing::warn;

use crate::model::{Device, DeviceGroup};

/// The devices seen by one poll cycle, grouped by product group in the
/// order the groups were fetched.
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    groups: IndexMap<DeviceGroup, Vec<Arc<Device>>>,
    refreshed_at: Option<DateTime<Utc>>,
}

impl Snapshot {
    /// An empty snapshot stamped with the current time.
    pub(crate) fn new() -> Self {
        Self {
            groups: IndexMap::new(),
            refreshed_at: Some(Utc::now()),
        }
    }

    /// Add a fetched group. Devices whose id already appeared in an
    /// earlier group are skipped, so every id maps to exactly one group.
    pub(crate) fn insert_group(&mut self, group: DeviceGroup, devices: Vec<Device>) {
        let mut kept = Vec::with_capacity(devices.len());
        for device in devices {
            if let Some(existing) = self.device(&device.id) {
                warn!(
                    device_id = %device.id,
                    kept_in = %existing.group,
                    dropped_from = %group,
                    "device listed in more than one group"
                );
                continue;
            }
            if kept.iter().any(|d: &Arc<Device>| d.id == device.id) {
                continue;
            }
            kept.push(Arc::new(device));
        }
        self.groups.insert(group, kept);
    }

    /// All groups, in fetch order.
    pub fn groups(&self) -> &IndexMap<DeviceGroup, Vec<Arc<Device>>> {
        &self.groups
    }

    /// Devices of one group; empty if the group is absent.
    pub fn group(&self, group: DeviceGroup) -> &[Arc<Device>] {
        self.groups.get(&group).map_or(&[], Vec::as_slice)
    }

    /// Whether the group made it into this snapshot.
    pub fn contains_group(&self, group: DeviceGroup) -> bool {
        self.groups.contains_key(&group)
    }

    /// Iterate over every device in every group.
    pub fn devices(&self) -> impl Iterator<Item = &Arc<Device>> {
        self.groups.values().flatten()
    }

    /// Look up a device by id across all groups.
    pub fn device(&self, id: &str) -> Option<&Arc<Device>> {
        self.devices().find(|d| d.id == id)
    }

    pub fn len(&self) -> usize {
        self.groups.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// When the poll that produced this snapshot finished. `None` before
    /// the first poll.
    pub fn refreshed_at(&self) -> Option<DateTime<Utc>> {
        self.refreshed_at
    }
}

/// Owner of the current [`Snapshot`].
pub struct Catalog {
    current: ArcSwap<Snapshot>,
    updates: watch::Sender<Arc<Snapshot>>,
}

impl Catalog {
    pub fn new() -> Self {
        let empty = Arc::new(Snapshot::default());
        let (updates, _) = watch::channel(Arc::clone(&empty));
        Self {
            current: ArcSwap::new(empty),
            updates,
        }
    }

    /// The current snapshot.
    pub fn snapshot(&self) -> Arc<Snapshot> {
        self.current.load_full()
    }

    /// Swap in a new snapshot and notify subscribers.
    pub fn replace(&self, snapshot: Snapshot) -> Arc<Snapshot> {
        let snapshot = Arc::new(snapshot);
        self.current.store(Arc::clone(&snapshot));
        self.updates.send_replace(Arc::clone(&snapshot));
        snapshot
    }

    /// Subscribe to snapshot replacements.
    pub fn subscribe(&self) -> watch::Receiver<Arc<Snapshot>> {
        self.updates.subscribe()
    }

    pub fn device(&self, id: &str) -> Option<Arc<Device>> {
        self.current.load().device(id).cloned()
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::new()
    }
}
