//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError`, `SetupError` and `ConfigError` into user-facing errors
//! with actionable help text.

use miette::Diagnostic;
use thiserror::Error;

use marspro_config::ConfigError;
use marspro_core::{CoreError, SetupError};

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const NOT_FOUND: i32 = 4;
    pub const PERMISSION: i32 = 5;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────

    #[error("Could not reach the MarsPro service")]
    #[diagnostic(
        code(marspro::connection_failed),
        help(
            "Check your network connection.\n\
             Reason: {reason}"
        )
    )]
    ConnectionFailed { reason: String },

    // ── Authentication ───────────────────────────────────────────────

    #[error("Authentication failed for profile '{profile}'")]
    #[diagnostic(
        code(marspro::auth_failed),
        help(
            "Verify the username and password used by the MarsPro app.\n\
             Run: marspro config set-password --profile {profile}"
        )
    )]
    AuthFailed { profile: String },

    #[error("No credentials configured for profile '{profile}'")]
    #[diagnostic(
        code(marspro::no_credentials),
        help(
            "Configure credentials with: marspro config init\n\
             Or set MARSPRO_USERNAME and MARSPRO_PASSWORD."
        )
    )]
    NoCredentials { profile: String },

    // ── Resources ────────────────────────────────────────────────────

    #[error("{resource_type} '{identifier}' not found")]
    #[diagnostic(
        code(marspro::not_found),
        help("Run: marspro {list_command} to see available {resource_type}s")
    )]
    NotFound {
        resource_type: String,
        identifier: String,
        list_command: String,
    },

    // ── API ──────────────────────────────────────────────────────────

    #[error("API error ({code}): {message}")]
    #[diagnostic(code(marspro::api_error))]
    ApiError { code: String, message: String },

    #[error("Operation '{operation}' is not supported")]
    #[diagnostic(code(marspro::unsupported))]
    Unsupported { operation: String },

    // ── Validation ───────────────────────────────────────────────────

    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(marspro::validation))]
    Validation { field: String, reason: String },

    // ── Configuration ────────────────────────────────────────────────

    #[error("Profile '{name}' not found in configuration")]
    #[diagnostic(
        code(marspro::profile_not_found),
        help(
            "Available profiles: {available}\n\
             Create one with: marspro config init"
        )
    )]
    ProfileNotFound { name: String, available: String },

    #[error("Configuration file not found")]
    #[diagnostic(
        code(marspro::no_config),
        help(
            "Create one with: marspro config init\n\
             Expected at: {path}"
        )
    )]
    NoConfig { path: String },

    #[error(transparent)]
    #[diagnostic(code(marspro::config))]
    Config(Box<ConfigError>),

    // ── Timeout ──────────────────────────────────────────────────────

    #[error("Request timed out after {seconds}s")]
    #[diagnostic(
        code(marspro::timeout),
        help("Increase timeout with --timeout or try again later.")
    )]
    Timeout { seconds: u64 },

    // ── IO ───────────────────────────────────────────────────────────

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } => exit_code::CONNECTION,
            Self::AuthFailed { .. } | Self::NoCredentials { .. } => exit_code::AUTH,
            Self::NotFound { .. } | Self::ProfileNotFound { .. } => exit_code::NOT_FOUND,
            Self::Timeout { .. } => exit_code::TIMEOUT,
            Self::Validation { .. } => exit_code::USAGE,
            Self::Unsupported { .. } => exit_code::PERMISSION,
            Self::Config(err) => match **err {
                ConfigError::NoCredentials { .. } => exit_code::AUTH,
                ConfigError::Validation { .. } => exit_code::USAGE,
                _ => exit_code::GENERAL,
            },
            _ => exit_code::GENERAL,
        }
    }

    /// Replace the placeholder profile on auth failures with the real one.
    pub fn for_profile(self, profile: &str) -> Self {
        match self {
            Self::AuthFailed { .. } => Self::AuthFailed {
                profile: profile.into(),
            },
            other => other,
        }
    }
}

// ── ConfigError → CliError mapping ───────────────────────────────────

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::NoCredentials { profile } => CliError::NoCredentials { profile },
            ConfigError::Validation { field, reason } => CliError::Validation { field, reason },
            other => CliError::Config(Box::new(other)),
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::ConnectionFailed { reason } => CliError::ConnectionFailed { reason },

            CoreError::AuthenticationFailed { message: _ } => CliError::AuthFailed {
                profile: "default".into(),
            },

            CoreError::HubDisconnected => CliError::ConnectionFailed {
                reason: "hub is not connected".into(),
            },

            CoreError::Timeout { timeout_secs } => CliError::Timeout {
                seconds: timeout_secs,
            },

            CoreError::DeviceNotFound { identifier } => CliError::NotFound {
                resource_type: "device".into(),
                identifier,
                list_command: "devices list".into(),
            },

            CoreError::Unsupported { operation } => CliError::Unsupported { operation },

            CoreError::Rejected { code, message } => CliError::ApiError { code, message },

            CoreError::Api { message, status } => CliError::ApiError {
                code: status.map_or_else(|| "api".into(), |s| s.to_string()),
                message,
            },

            CoreError::Config { message } => CliError::Validation {
                field: "config".into(),
                reason: message,
            },

            CoreError::Internal(message) => CliError::ApiError {
                code: "internal".into(),
                message,
            },
        }
    }
}

// ── SetupError → CliError mapping ────────────────────────────────────

impl From<SetupError> for CliError {
    fn from(err: SetupError) -> Self {
        match err {
            SetupError::InvalidAuth => CliError::AuthFailed {
                profile: "default".into(),
            },
            SetupError::CannotConnect { reason } => CliError::ConnectionFailed { reason },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn setup_outcomes_have_distinct_exit_codes() {
        let auth = CliError::from(SetupError::InvalidAuth);
        let conn = CliError::from(SetupError::CannotConnect {
            reason: "dns".into(),
        });
        assert_eq!(auth.exit_code(), exit_code::AUTH);
        assert_eq!(conn.exit_code(), exit_code::CONNECTION);
    }

    #[test]
    fn core_errors_map_to_categories() {
        let missing = CliError::from(CoreError::DeviceNotFound {
            identifier: "x".into(),
        });
        assert_eq!(missing.exit_code(), exit_code::NOT_FOUND);

        let timeout = CliError::from(CoreError::Timeout { timeout_secs: 30 });
        assert_eq!(timeout.exit_code(), exit_code::TIMEOUT);

        let rejected = CliError::from(CoreError::Rejected {
            code: "102".into(),
            message: "nope".into(),
        });
        assert_eq!(rejected.exit_code(), exit_code::GENERAL);
    }

    #[test]
    fn auth_failure_names_the_profile() {
        let err = CliError::from(SetupError::InvalidAuth).for_profile("tent");
        assert!(matches!(err, CliError::AuthFailed { ref profile } if profile == "tent"));
    }

    #[test]
    fn missing_credentials_is_an_auth_exit() {
        let err = CliError::from(ConfigError::NoCredentials {
            profile: "default".into(),
        });
        assert_eq!(err.exit_code(), exit_code::AUTH);
    }
}
