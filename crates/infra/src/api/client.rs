//! Authenticated request pipeline
//!
//! Every authenticated call goes through [`ApiClient::request`]: attach the
//! current access token, and on a 401 try one silent refresh and one retry
//! before invalidating the session.

use std::sync::Arc;
use std::time::Duration;

use dailytrack_core::SessionStore;
use dailytrack_domain::constants::DEFAULT_HTTP_TIMEOUT_SECS;
use dailytrack_domain::{ApiConfig, TrackerError};
use reqwest::{Method, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, info, instrument, warn};

use super::base::{join_url, resolve_api_base};
use super::errors::ApiError;
use crate::http::{HttpClient, Outgoing};

pub const REFRESH_PATH: &str = "/api/refresh";

/// Configuration for API client
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiClientConfig {
    /// Resolved base every relative path is joined to, without trailing `/`
    pub base_url: String,
    /// Timeout for API requests
    pub timeout: Duration,
}

impl Default for ApiClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:5000".to_string(),
            timeout: Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS),
        }
    }
}

impl ApiClientConfig {
    pub fn from_api_config(config: &ApiConfig) -> Self {
        Self {
            base_url: resolve_api_base(
                config.base_url.as_deref(),
                &config.origin,
                config.backend_port,
            ),
            timeout: Duration::from_secs(config.timeout_seconds),
        }
    }
}

#[derive(Debug, Deserialize)]
struct RefreshResponse {
    #[serde(default)]
    access_token: Option<String>,
}

/// HTTP client bound to the process-wide [`SessionStore`].
pub struct ApiClient {
    http_client: HttpClient,
    config: ApiClientConfig,
    session: Arc<SessionStore>,
}

impl ApiClient {
    /// Create a new API client
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Config` if the underlying HTTP client cannot be
    /// built
    pub fn new(config: ApiClientConfig, session: Arc<SessionStore>) -> Result<Self, ApiError> {
        let http_client = HttpClient::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| ApiError::Config(format!("Failed to build HttpClient: {}", e)))?;

        info!(base = %config.base_url, "API client ready");
        Ok(Self { http_client, config, session })
    }

    pub fn base_url(&self) -> &str {
        &self.config.base_url
    }

    pub fn session(&self) -> &Arc<SessionStore> {
        &self.session
    }

    /// Absolute URL for `path`; absolute inputs pass through unchanged.
    pub fn url_for(&self, path: &str) -> String {
        join_url(&self.config.base_url, path)
    }

    /// Issue an authenticated request, refreshing the access token once on
    /// a 401.
    ///
    /// # Arguments
    ///
    /// * `method` - HTTP method
    /// * `path` - API path (e.g. "/api/users") or absolute URL
    /// * `body` - Optional JSON body, re-sent verbatim on retry
    ///
    /// # Returns
    ///
    /// The final response whatever its status: the first one when it is not
    /// a 401, the retried one after a successful refresh, or the original
    /// 401 when the refresh failed
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Network` or `ApiError::Timeout` if a request could
    /// not be completed
    #[instrument(skip(self, body), fields(path = %path))]
    pub async fn request(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
    ) -> Result<Response, ApiError> {
        let url = self.url_for(path);
        let token = self.session.access_token();

        let response = self.send(method.clone(), &url, body, token.as_deref()).await?;
        if response.status() != StatusCode::UNAUTHORIZED {
            return Ok(response);
        }

        debug!("Received 401, attempting silent refresh");
        match self.refresh_access_token().await {
            Some(fresh) => {
                if let Err(e) = self.session.apply_refresh(fresh.clone()).await {
                    warn!(error = %e, "Failed to persist refreshed access token");
                }
                self.send(method, &url, body, Some(&fresh)).await
            }
            None => {
                self.session.invalidate("access token rejected and refresh failed").await;
                Ok(response)
            }
        }
    }

    /// Issue a request without credentials and without the refresh path.
    ///
    /// Used for sign-in, password recovery and health probes.
    #[instrument(skip(self, body), fields(path = %path))]
    pub async fn request_public(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
    ) -> Result<Response, ApiError> {
        let url = self.url_for(path);
        self.send(method, &url, body, None).await
    }

    /// Authenticated GET decoded as JSON.
    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let response = self.request(Method::GET, path, None).await?;
        read_json(response).await
    }

    /// Authenticated request with a JSON body, decoded as JSON.
    pub async fn send_json<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: &Value,
    ) -> Result<T, ApiError> {
        let response = self.request(method, path, Some(body)).await?;
        read_json(response).await
    }

    /// Ask the backend for a new access token.
    ///
    /// Returns `None` when there is no refresh token, the call fails, or the
    /// response carries no usable token.
    async fn refresh_access_token(&self) -> Option<String> {
        let Some(refresh_token) = self.session.refresh_token() else {
            debug!("No refresh token available");
            return None;
        };

        let url = self.url_for(REFRESH_PATH);
        let empty = Value::Object(serde_json::Map::new());
        let response = match self.send(Method::POST, &url, Some(&empty), Some(&refresh_token)).await
        {
            Ok(response) => response,
            Err(e) => {
                warn!(error = %e, "Token refresh request failed");
                return None;
            }
        };

        if !response.status().is_success() {
            warn!(status = %response.status(), "Token refresh rejected");
            return None;
        }

        match response.json::<RefreshResponse>().await {
            Ok(RefreshResponse { access_token: Some(token) }) if !token.is_empty() => {
                info!("Access token refreshed");
                Some(token)
            }
            Ok(_) => {
                warn!("Token refresh response carried no access token");
                None
            }
            Err(e) => {
                warn!(error = %e, "Token refresh response was not JSON");
                None
            }
        }
    }

    async fn send(
        &self,
        method: Method,
        url: &str,
        body: Option<&Value>,
        bearer: Option<&str>,
    ) -> Result<Response, ApiError> {
        let call = Outgoing::new(method, url).bearer(bearer).json(body);

        let timeout = self.config.timeout;
        match tokio::time::timeout(timeout, self.http_client.call(call)).await {
            Ok(Ok(response)) => Ok(response),
            Ok(Err(err)) => Err(Self::map_tracker_error(err)),
            Err(_) => Err(ApiError::Timeout(timeout)),
        }
    }

    fn map_tracker_error(err: TrackerError) -> ApiError {
        match err {
            TrackerError::Network(message) => ApiError::Network(message),
            other => ApiError::Config(other.to_string()),
        }
    }
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient").field("config", &self.config).finish_non_exhaustive()
    }
}

/// Decode a response body, turning non-2xx statuses into
/// [`ApiError::Rejected`].
///
/// 204/205 decode from `null`, so `()` and `Option<_>` targets work.
pub async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
    let status = response.status();
    if !status.is_success() {
        return Err(rejection(response).await);
    }

    if status == StatusCode::NO_CONTENT || status == StatusCode::RESET_CONTENT {
        return serde_json::from_value(Value::Null).map_err(|_| {
            ApiError::Decode(format!("empty {} response cannot be decoded", status.as_u16()))
        });
    }

    let text = response.text().await.map_err(|e| ApiError::Network(e.to_string()))?;
    let text = if text.trim().is_empty() { "null" } else { text.as_str() };
    serde_json::from_str(text).map_err(|e| ApiError::Decode(e.to_string()))
}

/// Require a 2xx status and discard the body.
pub async fn expect_success(response: Response) -> Result<(), ApiError> {
    if response.status().is_success() {
        Ok(())
    } else {
        Err(rejection(response).await)
    }
}

/// Build a [`ApiError::Rejected`] from a non-2xx response, preferring the
/// body's `message`, then `error`, then the raw text.
pub async fn rejection(response: Response) -> ApiError {
    let status = response.status();
    let text = response.text().await.unwrap_or_default();
    let message = rejection_message(status, &text);
    debug!(status = status.as_u16(), %message, "Request rejected");
    ApiError::Rejected { status: status.as_u16(), message }
}

fn rejection_message(status: StatusCode, body: &str) -> String {
    if let Ok(Value::Object(map)) = serde_json::from_str::<Value>(body) {
        for key in ["message", "error"] {
            if let Some(message) = map.get(key).and_then(Value::as_str) {
                if !message.trim().is_empty() {
                    return message.to_string();
                }
            }
        }
    }
    let trimmed = body.trim();
    if !trimmed.is_empty() && !trimmed.starts_with('{') {
        return trimmed.to_string();
    }
    status.canonical_reason().unwrap_or("Request failed").to_string()
}

/// Rows of a `{data: [...]}` envelope (or a bare array).
///
/// A missing or non-array `data` yields no rows; rows that fail to decode
/// are skipped with a warning.
pub fn parse_rows<T: DeserializeOwned>(payload: &Value) -> Vec<T> {
    let rows = match payload {
        Value::Array(rows) => rows,
        Value::Object(map) => match map.get("data") {
            Some(Value::Array(rows)) => rows,
            _ => {
                debug!("Response has no data array");
                return Vec::new();
            }
        },
        _ => return Vec::new(),
    };

    rows.iter()
        .enumerate()
        .filter_map(|(index, row)| match serde_json::from_value::<T>(row.clone()) {
            Ok(parsed) => Some(parsed),
            Err(e) => {
                warn!(index, error = %e, "Skipping malformed row");
                None
            }
        })
        .collect()
}
