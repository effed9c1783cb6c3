// marspro-core: Polling data layer and device controllers on top of marspro-api.

pub mod codec;
pub mod command;
pub mod config;
pub mod controller;
pub mod convert;
pub mod entity;
pub mod error;
pub mod model;
pub mod store;

// ── Primary re-exports ──────────────────────────────────────────────
pub use codec::{CodecError, DeviceInfo};
pub use command::{Command, CommandResult};
pub use config::{HubConfig, TlsVerification};
pub use controller::{ConnectionState, Hub};
pub use entity::{FanController, LevelControl, LightController, PowerState};
pub use error::{CoreError, SetupError};
pub use model::{ConnectStatus, Device, DeviceGroup};
pub use store::{Catalog, Snapshot};

pub use marspro_api::{Credentials, DeviceDetail, FanCalculation};
