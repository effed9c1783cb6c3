// Authentication
//
// The app has no token exchange: a session is considered valid when the
// profile endpoint answers with the success code. Declined credentials are
// an ordinary negative answer, not a fault.

use secrecy::{ExposeSecret, SecretString};
use serde_json::json;
use tracing::{debug, info};

use crate::client::MarsProClient;
use crate::error::{Error, ErrorKind};
use crate::models::UserInfo;

const PROFILE_ENDPOINT: &str = "android/mine/info/v1";

/// Account credentials, held for the lifetime of the process.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub username: String,
    pub password: SecretString,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: SecretString) -> Self {
        Self {
            username: username.into(),
            password,
        }
    }

    /// Returns `true` if either half of the credentials is blank.
    pub fn is_blank(&self) -> bool {
        self.username.trim().is_empty() || self.password.expose_secret().is_empty()
    }
}

impl MarsProClient {
    /// Validate the session by fetching the account profile.
    ///
    /// `POST android/mine/info/v1`
    ///
    /// Returns `Ok(true)` and stores the profile when the service accepts
    /// the session, `Ok(false)` when it declines (non-success envelope code
    /// or HTTP 401/403). Any other HTTP status, transport failure, or decode
    /// failure is returned as `Err` so the caller can tell "wrong password"
    /// from "cannot reach service".
    pub async fn login(&self, credentials: &Credentials) -> Result<bool, Error> {
        debug!(username = %credentials.username, "validating session");

        match self.post::<UserInfo>(PROFILE_ENDPOINT, &json!({})).await {
            Ok(profile) => {
                info!(
                    username = %credentials.username,
                    user_id = profile.user_id.as_deref().unwrap_or("?"),
                    "login accepted"
                );
                self.set_user_info(profile);
                Ok(true)
            }
            Err(e) if matches!(e.kind(), ErrorKind::AuthFailure | ErrorKind::ServerRejected) => {
                debug!(error = %e, "login declined");
                Ok(false)
            }
            Err(e) => Err(e),
        }
    }
}
