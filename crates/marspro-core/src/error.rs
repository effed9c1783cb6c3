// ── Core error types ──
//
// User-facing errors from marspro-core. Consumers never see envelope codes
// or JSON parse failures directly: the `From<marspro_api::Error>` impl
// translates transport-layer errors into domain variants.

use thiserror::Error;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Connection errors ────────────────────────────────────────────
    #[error("Cannot reach the MarsPro service: {reason}")]
    ConnectionFailed { reason: String },

    #[error("Authentication failed: {message}")]
    AuthenticationFailed { message: String },

    #[error("Hub disconnected")]
    HubDisconnected,

    #[error("Request timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    // ── Data errors ──────────────────────────────────────────────────
    #[error("Device not found: {identifier}")]
    DeviceNotFound { identifier: String },

    // ── Operation errors ─────────────────────────────────────────────
    #[error("Operation not supported: {operation}")]
    Unsupported { operation: String },

    #[error("Request rejected by the service (code {code}): {message}")]
    Rejected { code: String, message: String },

    // ── API errors (wrapped, not exposed raw) ────────────────────────
    #[error("API error: {message}")]
    Api {
        message: String,
        /// HTTP status code (if applicable).
        status: Option<u16>,
    },

    // ── Configuration errors ─────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },

    // ── Internal errors ──────────────────────────────────────────────
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Outcome of the account setup check, kept apart from [`CoreError`] so
/// that a wrong password and an unreachable service reach the operator as
/// two different messages.
#[derive(Debug, Error)]
pub enum SetupError {
    #[error("Invalid credentials")]
    InvalidAuth,

    #[error("Cannot connect: {reason}")]
    CannotConnect { reason: String },
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<marspro_api::Error> for CoreError {
    fn from(err: marspro_api::Error) -> Self {
        match err {
            marspro_api::Error::Authentication { message } => {
                CoreError::AuthenticationFailed { message }
            }
            marspro_api::Error::Transport(ref e) => {
                if e.is_timeout() {
                    CoreError::Timeout { timeout_secs: 0 }
                } else if e.is_connect() {
                    CoreError::ConnectionFailed {
                        reason: e.to_string(),
                    }
                } else {
                    CoreError::Api {
                        message: e.to_string(),
                        status: e.status().map(|s| s.as_u16()),
                    }
                }
            }
            marspro_api::Error::InvalidUrl(e) => CoreError::Config {
                message: format!("Invalid URL: {e}"),
            },
            marspro_api::Error::Timeout { timeout_secs } => CoreError::Timeout { timeout_secs },
            marspro_api::Error::Tls(msg) => CoreError::ConnectionFailed {
                reason: format!("TLS error: {msg}"),
            },
            marspro_api::Error::Rejected { code, message } => CoreError::Rejected { code, message },
            marspro_api::Error::Http { status, message } => CoreError::Api {
                message,
                status: Some(status),
            },
            marspro_api::Error::Deserialization { message, body: _ } => {
                CoreError::Internal(format!("Deserialization error: {message}"))
            }
        }
    }
}

impl From<marspro_api::Error> for SetupError {
    fn from(err: marspro_api::Error) -> Self {
        SetupError::CannotConnect {
            reason: err.to_string(),
        }
    }
}
