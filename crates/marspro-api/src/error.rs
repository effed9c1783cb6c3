use thiserror::Error;

/// Coarse classification of an [`Error`].
///
/// The refresh coordinator and the setup flow branch on this instead of
/// matching individual variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Credentials were declined or the session is not authorized.
    AuthFailure,
    /// The service answered with a well-formed envelope carrying a
    /// non-success status code.
    ServerRejected,
    /// Network, TLS, or timeout failure, or an HTTP error status without
    /// an envelope. No usable answer arrived.
    Transport,
    /// The answer could not be decoded into the expected record.
    Decode,
}

/// Top-level error type for the `marspro-api` crate.
///
/// `marspro-core` maps these into user-facing diagnostics.
#[derive(Debug, Error)]
pub enum Error {
    // ── Authentication ──────────────────────────────────────────────
    /// The service declined the session (HTTP 401/403).
    #[error("Authentication failed: {message}")]
    Authentication { message: String },

    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Request timed out.
    #[error("Request timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    /// TLS setup or certificate error.
    #[error("TLS error: {0}")]
    Tls(String),

    // ── Service ─────────────────────────────────────────────────────
    /// The envelope carried a status code other than `"000"`.
    #[error("MarsPro API error (code {code}): {message}")]
    Rejected { code: String, message: String },

    /// Non-success HTTP status without a parsable envelope.
    #[error("HTTP {status}: {message}")]
    Http { status: u16, message: String },

    // ── Data ────────────────────────────────────────────────────────
    /// JSON deserialization failed, with the raw body for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },
}

impl Error {
    /// Classify this error into the coarse [`ErrorKind`] taxonomy.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Authentication { .. } => ErrorKind::AuthFailure,
            Self::Rejected { .. } => ErrorKind::ServerRejected,
            Self::Transport(_)
            | Self::InvalidUrl(_)
            | Self::Timeout { .. }
            | Self::Tls(_)
            | Self::Http { .. } => ErrorKind::Transport,
            Self::Deserialization { .. } => ErrorKind::Decode,
        }
    }

    /// Returns `true` if the service declined the credentials or session.
    pub fn is_auth_failure(&self) -> bool {
        self.kind() == ErrorKind::AuthFailure
    }

    /// Returns `true` if this is a transient error that the next poll
    /// cycle may not hit again.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Transport(e) => e.is_timeout() || e.is_connect(),
            Self::Timeout { .. } => true,
            Self::Http { status, .. } => *status >= 500,
            _ => false,
        }
    }

    /// The service status code, if the error came from an envelope.
    pub fn api_error_code(&self) -> Option<&str> {
        match self {
            Self::Rejected { code, .. } => Some(code),
            _ => None,
        }
    }
}
