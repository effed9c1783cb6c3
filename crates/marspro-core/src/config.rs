// ── Runtime hub configuration ──
//
// Describes *how* to reach the MarsPro service and how often to poll it.
// Carries credential data and tuning, but never touches disk. The CLI
// (or any other host) builds a `HubConfig` and hands it in.

use std::time::Duration;

use marspro_api::{Credentials, DEFAULT_BASE_URL};
use secrecy::SecretString;
use url::Url;

/// Default prefix for controller display names.
pub const DEFAULT_NAME_PREFIX: &str = "MarsPro";

/// Product groups polled opportunistically besides lights and fans.
pub const DEFAULT_OTHER_GROUPS: [u32; 3] = [3, 6, 7];

/// TLS verification strategy.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TlsVerification {
    /// Bundled webpki roots (strict).
    #[default]
    SystemDefaults,
    /// Additionally trust a custom CA certificate file.
    CustomCa(std::path::PathBuf),
}

/// Configuration for one MarsPro account.
///
/// Built by the host, passed to [`Hub`](crate::Hub). Core never reads
/// config files.
#[derive(Debug, Clone)]
pub struct HubConfig {
    /// API base URL.
    pub base_url: Url,
    /// Account credentials.
    pub credentials: Credentials,
    /// Prefix for controller display names (`"{prefix} {deviceName}"`).
    pub name_prefix: String,
    /// TLS verification strategy, used only when the hub builds its own
    /// HTTP client.
    pub tls: TlsVerification,
    /// Request timeout.
    pub timeout: Duration,
    /// How often to poll the device list (seconds). 0 = never.
    pub refresh_interval_secs: u64,
    /// Extra product groups to poll after lights and fans.
    pub other_groups: Vec<u32>,
}

impl HubConfig {
    /// A config with defaults for everything but the credentials.
    pub fn new(credentials: Credentials) -> Self {
        Self {
            base_url: default_base_url(),
            credentials,
            name_prefix: DEFAULT_NAME_PREFIX.into(),
            tls: TlsVerification::default(),
            timeout: Duration::from_secs(30),
            refresh_interval_secs: 60,
            other_groups: DEFAULT_OTHER_GROUPS.to_vec(),
        }
    }
}

impl Default for HubConfig {
    fn default() -> Self {
        Self::new(Credentials::new(String::new(), SecretString::from(String::new())))
    }
}

/// The production base URL, parsed.
pub fn default_base_url() -> Url {
    Url::parse(DEFAULT_BASE_URL).expect("static base URL is valid")
}
