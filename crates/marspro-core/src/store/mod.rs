// ── Device catalog ──
//
// Holds the latest poll result as one immutable snapshot, swapped in
// atomically, with push-based change notification.

mod catalog;
mod refresh;

pub use catalog::{Catalog, Snapshot};
pub(crate) use refresh::fetch_snapshot;
