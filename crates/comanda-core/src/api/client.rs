//! Request execution against a single backend.
//!
//! `ServiceClient` owns one base address and drives each request through the
//! send → refresh → retry-once cycle, normalizing every response or error on
//! the way out. Failures are reported to the notification queue exactly once
//! and still returned to the caller.

use std::sync::Arc;
use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderName, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Client, Method, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::auth::SessionStore;
use crate::notify::Notifications;

use super::{ApiError, Navigator, TokenRefresher};

/// HTTP request timeout in seconds.
/// 30s allows for slow backends while failing fast enough for good UX.
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Fallback message for JSON error bodies without `detail` or `message`.
const GENERIC_FAILURE: &str = "request failed";

/// Build the shared HTTP client all service clients run on.
/// Clone is cheap - reqwest uses an `Arc` internally, so clones share the
/// connection pool.
pub fn default_http_client() -> Result<Client, ApiError> {
    let client = Client::builder()
        .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
        .build()?;
    Ok(client)
}

/// One logical request: target path, verb, and optional trimmings. The
/// backend itself is picked by the client the envelope is handed to.
#[derive(Debug, Clone, Default)]
pub struct Envelope {
    pub method: Method,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub body: Option<Value>,
    pub headers: HeaderMap,
}

impl Envelope {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            ..Self::default()
        }
    }

    pub fn query(mut self, params: &[(&str, &str)]) -> Self {
        self.query = params
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        self
    }

    pub fn json(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    pub fn header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }
}

/// Normalized success body.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    /// Parsed JSON body.
    Json(Value),
    /// Non-JSON body, returned as raw text.
    Text(String),
    /// 204 No Content.
    Empty,
}

impl Payload {
    pub fn as_json(&self) -> Option<&Value> {
        match self {
            Payload::Json(value) => Some(value),
            _ => None,
        }
    }

    /// Deserialize into a concrete type. `Empty` maps to JSON `null` (so an
    /// `Option<T>` target reads it as `None`), `Text` to a JSON string.
    pub fn into_json<T: DeserializeOwned>(self) -> Result<T, ApiError> {
        let value = match self {
            Payload::Json(value) => value,
            Payload::Text(text) => Value::String(text),
            Payload::Empty => Value::Null,
        };
        Ok(serde_json::from_value(value)?)
    }
}

/// Ordered header merge: default content type first, then caller-supplied
/// headers, then the bearer credential. Later entries win on collision, so
/// callers may override the content type but never the credential.
pub fn merge_headers(extra: &HeaderMap, access_token: Option<&str>) -> Result<HeaderMap, ApiError> {
    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    for (name, value) in extra {
        headers.insert(name, value.clone());
    }
    if let Some(token) = access_token {
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {token}"))?,
        );
    }
    Ok(headers)
}

/// Client for one backend base address.
#[derive(Clone)]
pub struct ServiceClient {
    http: Client,
    base_url: String,
    session: Arc<SessionStore>,
    refresher: Arc<TokenRefresher>,
    notify: Notifications,
    navigator: Arc<dyn Navigator>,
}

impl ServiceClient {
    pub fn new(
        http: Client,
        base_url: impl Into<String>,
        session: Arc<SessionStore>,
        refresher: Arc<TokenRefresher>,
        notify: Notifications,
        navigator: Arc<dyn Navigator>,
    ) -> Self {
        Self {
            http,
            base_url: base_url.into(),
            session,
            refresher,
            notify,
            navigator,
        }
    }

    /// Execute one logical request.
    ///
    /// Every error leaving here has been reported to the notification queue
    /// with its message; callers still receive it and decide what to do.
    pub async fn request(&self, envelope: Envelope) -> Result<Payload, ApiError> {
        match self.dispatch(&envelope).await {
            Ok(payload) => Ok(payload),
            Err(err) => {
                self.notify.error(err.to_string());
                Err(err)
            }
        }
    }

    pub async fn get(&self, path: &str, params: &[(&str, &str)]) -> Result<Payload, ApiError> {
        self.request(Envelope::new(Method::GET, path).query(params))
            .await
    }

    pub async fn post<B: Serialize>(&self, path: &str, body: &B) -> Result<Payload, ApiError> {
        self.request(Envelope::new(Method::POST, path).json(serde_json::to_value(body)?))
            .await
    }

    pub async fn put<B: Serialize>(&self, path: &str, body: &B) -> Result<Payload, ApiError> {
        self.request(Envelope::new(Method::PUT, path).json(serde_json::to_value(body)?))
            .await
    }

    pub async fn patch<B: Serialize>(&self, path: &str, body: &B) -> Result<Payload, ApiError> {
        self.request(Envelope::new(Method::PATCH, path).json(serde_json::to_value(body)?))
            .await
    }

    pub async fn delete(&self, path: &str) -> Result<Payload, ApiError> {
        self.request(Envelope::new(Method::DELETE, path)).await
    }

    /// The send → refresh → retry-once cycle. A 401 triggers renewal only
    /// when the session held both tokens at send time; the retry's outcome
    /// is final, with no second renewal.
    async fn dispatch(&self, envelope: &Envelope) -> Result<Payload, ApiError> {
        let session = self.session.current();
        let response = self
            .send_once(envelope, session.access_token.as_deref())
            .await?;

        if response.status() == StatusCode::UNAUTHORIZED && session.is_authenticated() {
            debug!(path = %envelope.path, "access token rejected, renewing");
            if let Err(err) = self.refresher.refresh(session.access_token.as_deref()).await {
                warn!(error = %err, "token renewal failed, clearing session");
                if let Err(err) = self.session.logout() {
                    warn!(error = %err, "failed to clear session storage");
                }
                self.navigator.goto_login();
                return Err(ApiError::SessionExpired);
            }
            let renewed = self.session.current();
            let retry = self
                .send_once(envelope, renewed.access_token.as_deref())
                .await?;
            return normalize(retry).await;
        }

        normalize(response).await
    }

    async fn send_once(
        &self,
        envelope: &Envelope,
        access_token: Option<&str>,
    ) -> Result<Response, ApiError> {
        let url = format!("{}{}", self.base_url, envelope.path);
        let headers = merge_headers(&envelope.headers, access_token)?;

        let mut builder = self
            .http
            .request(envelope.method.clone(), &url)
            .headers(headers);
        if !envelope.query.is_empty() {
            builder = builder.query(&envelope.query);
        }
        if let Some(ref body) = envelope.body {
            builder = builder.json(body);
        }

        Ok(builder.send().await?)
    }
}

fn is_json_response(response: &Response) -> bool {
    response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .map(|value| value.contains("application/json"))
        .unwrap_or(false)
}

/// Inspect one response and produce either a normalized payload or the
/// user-facing error message.
///
/// Statuses outside 2xx/3xx fail: JSON bodies contribute their `detail` or
/// `message` field, anything else a formatted status line. 204 yields an
/// empty payload without touching the body.
async fn normalize(response: Response) -> Result<Payload, ApiError> {
    let status = response.status();
    let is_json = is_json_response(&response);

    if !(status.is_success() || status.is_redirection()) {
        let message = if is_json {
            match response.json::<Value>().await {
                Ok(body) => body
                    .get("detail")
                    .and_then(Value::as_str)
                    .or_else(|| body.get("message").and_then(Value::as_str))
                    .unwrap_or(GENERIC_FAILURE)
                    .to_string(),
                Err(_) => GENERIC_FAILURE.to_string(),
            }
        } else {
            format!(
                "Error {}: {}",
                status.as_u16(),
                status.canonical_reason().unwrap_or_default()
            )
        };
        return Err(ApiError::Status {
            status: status.as_u16(),
            message,
        });
    }

    if status == StatusCode::NO_CONTENT {
        return Ok(Payload::Empty);
    }

    let text = response.text().await?;
    if is_json {
        Ok(Payload::Json(serde_json::from_str(&text)?))
    } else {
        Ok(Payload::Text(text))
    }
}
