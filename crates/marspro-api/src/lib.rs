// marspro-api: Async Rust client for the MarsPro cloud API

pub mod auth;
pub mod calculate;
pub mod client;
pub mod devices;
pub mod error;
pub mod models;
pub mod transport;

pub use auth::Credentials;
pub use client::{DEFAULT_BASE_URL, MarsProClient};
pub use error::{Error, ErrorKind};
pub use models::{
    CalculateArg, CalculateRequest, DeviceDetail, DeviceListPage, FanCalculation, RawDevice,
    UserInfo,
};
pub use transport::{TlsMode, TransportConfig};
