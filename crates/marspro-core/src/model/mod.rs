// ── Domain model ──
//
// Canonical representation of a MarsPro device as the rest of the crate
// sees it. Built from `marspro_api::RawDevice` in `convert`.

pub mod device;
pub mod group;

pub use device::{ConnectStatus, Device};
pub use group::DeviceGroup;
