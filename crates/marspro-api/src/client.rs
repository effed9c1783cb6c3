// MarsPro HTTP client
//
// Wraps `reqwest::Client` with MarsPro-specific URL construction, the
// `systemdata` request envelope, and `{code, msg, data}` response
// unwrapping. Endpoint groups (auth, devices, calculate) are implemented
// as inherent methods in separate files to keep this module focused on
// transport mechanics.

use std::sync::{PoisonError, RwLock};

use rand::Rng;
use reqwest::header::{CONTENT_TYPE, HeaderValue};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, trace};
use url::Url;

use crate::error::Error;
use crate::models::{Envelope, SUCCESS_CODE, UserInfo};
use crate::transport::TransportConfig;

/// Production endpoint of the MarsPro app API.
pub const DEFAULT_BASE_URL: &str = "https://mars-pro.api.lgledsolutions.com/api/";

/// Header carrying the per-request correlation envelope.
const SYSTEM_DATA_HEADER: &str = "systemdata";

/// Range the correlation id is drawn from. Wide enough that two requests
/// in one session practically never share an id.
const REQ_ID_RANGE: std::ops::Range<u64> = 10_000_000_000..11_000_000_000;

/// Raw HTTP client for the MarsPro cloud API.
///
/// Every call is a single attempt: no retries, no backoff. Callers decide
/// whether to try again, typically by waiting for their next poll cycle.
pub struct MarsProClient {
    http: reqwest::Client,
    base_url: Url,
    /// Transport timeout, reported in `Error::Timeout`.
    timeout_secs: u64,
    /// Profile returned by the last successful login.
    user_info: RwLock<Option<UserInfo>>,
}

impl MarsProClient {
    /// Create a client that builds its own `reqwest::Client`.
    pub fn new(base_url: Url, transport: &TransportConfig) -> Result<Self, Error> {
        let http = transport.build_client()?;
        let mut client = Self::with_client(http, base_url);
        client.timeout_secs = transport.timeout_secs();
        Ok(client)
    }

    /// Create a client on top of an HTTP session owned by the host.
    ///
    /// The session is shared, never reconfigured or closed by this client.
    pub fn with_client(http: reqwest::Client, base_url: Url) -> Self {
        Self {
            http,
            base_url: normalize_base(base_url),
            timeout_secs: TransportConfig::default().timeout_secs(),
            user_info: RwLock::new(None),
        }
    }

    /// The API base URL (always ends in `/`).
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// The underlying HTTP client.
    pub fn http(&self) -> &reqwest::Client {
        &self.http
    }

    /// Profile captured by the last successful [`login`](Self::login).
    pub fn user_info(&self) -> Option<UserInfo> {
        self.user_info
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub(crate) fn set_user_info(&self, info: UserInfo) {
        *self
            .user_info
            .write()
            .unwrap_or_else(PoisonError::into_inner) = Some(info);
    }

    // ── URL builders ─────────────────────────────────────────────────

    /// Build the full URL for an endpoint path such as `android/mine/info/v1`.
    pub(crate) fn endpoint_url(&self, endpoint: &str) -> Result<Url, Error> {
        Ok(self.base_url.join(endpoint.trim_start_matches('/'))?)
    }

    // ── Request helpers ──────────────────────────────────────────────

    /// Issue a raw request and return the unwrapped `data` payload.
    ///
    /// POST sends `payload` as the JSON body, or an empty object when none
    /// is supplied. GET sends no body.
    pub async fn request(
        &self,
        method: reqwest::Method,
        endpoint: &str,
        payload: Option<&serde_json::Value>,
    ) -> Result<serde_json::Value, Error> {
        if method == reqwest::Method::GET {
            return self.send(method, endpoint, None::<&()>).await;
        }
        let empty = serde_json::Value::Object(serde_json::Map::new());
        self.send(method, endpoint, Some(payload.unwrap_or(&empty)))
            .await
    }

    /// Send a POST request with JSON body and unwrap the envelope.
    pub(crate) async fn post<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        body: &(impl Serialize + Sync),
    ) -> Result<T, Error> {
        self.send(reqwest::Method::POST, endpoint, Some(body)).await
    }

    async fn send<T: DeserializeOwned>(
        &self,
        method: reqwest::Method,
        endpoint: &str,
        body: Option<&(impl Serialize + Sync)>,
    ) -> Result<T, Error> {
        let url = self.endpoint_url(endpoint)?;
        let req_id = next_request_id();
        debug!(req_id, "{method} {url}");

        let mut builder = self.with_envelope(self.http.request(method, url), req_id)?;
        if let Some(body) = body {
            builder = builder.json(body);
        }
        let resp = builder.send().await.map_err(|e| self.map_transport(e))?;

        self.parse_envelope(resp).await
    }

    /// Attach the content type and `systemdata: {"reqId": n}` headers.
    fn with_envelope(
        &self,
        builder: reqwest::RequestBuilder,
        req_id: u64,
    ) -> Result<reqwest::RequestBuilder, Error> {
        let system_data = serde_json::json!({ "reqId": req_id }).to_string();
        let value = HeaderValue::from_str(&system_data).map_err(|e| Error::Deserialization {
            message: format!("invalid systemdata header: {e}"),
            body: system_data.clone(),
        })?;
        Ok(builder
            .header(CONTENT_TYPE, HeaderValue::from_static("application/json"))
            .header(SYSTEM_DATA_HEADER, value))
    }

    fn map_transport(&self, err: reqwest::Error) -> Error {
        if err.is_timeout() {
            Error::Timeout {
                timeout_secs: self.timeout_secs,
            }
        } else {
            Error::Transport(err)
        }
    }

    /// Parse the `{ code, msg, data }` envelope, returning `data` decoded
    /// as `T` on success.
    async fn parse_envelope<T: DeserializeOwned>(&self, resp: reqwest::Response) -> Result<T, Error> {
        let status = resp.status();

        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
            return Err(Error::Authentication {
                message: format!("session rejected (HTTP {status})"),
            });
        }

        let body = resp.text().await.map_err(|e| self.map_transport(e))?;

        if !status.is_success() {
            return Err(Error::Http {
                status: status.as_u16(),
                message: preview(&body).to_owned(),
            });
        }

        let envelope: Envelope = serde_json::from_str(&body).map_err(|e| {
            Error::Deserialization {
                message: format!("{e} (body preview: {:?})", preview(&body)),
                body: body.clone(),
            }
        })?;

        match envelope.code.as_deref() {
            Some(SUCCESS_CODE) => {
                trace!("envelope ok");
                serde_json::from_value(envelope.data).map_err(|e| Error::Deserialization {
                    message: e.to_string(),
                    body,
                })
            }
            code => {
                let code = code.unwrap_or("<missing>").to_owned();
                let message = envelope.msg.unwrap_or_else(|| format!("code={code}"));
                debug!(%code, %message, "envelope rejected");
                Err(Error::Rejected { code, message })
            }
        }
    }
}

/// Draw a fresh correlation id for the `systemdata` header.
fn next_request_id() -> u64 {
    rand::thread_rng().gen_range(REQ_ID_RANGE)
}

/// `Url::join` drops the last path segment unless the base ends in `/`.
fn normalize_base(mut url: Url) -> Url {
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url
}

fn preview(body: &str) -> &str {
    let mut end = body.len().min(200);
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    &body[..end]
}
