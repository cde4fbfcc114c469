use std::time::Duration;

use dailytrack_domain::constants::DEFAULT_HTTP_TIMEOUT_SECS;
use dailytrack_domain::TrackerError;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION};
use reqwest::{Client as ReqwestClient, Method, Response};
use serde_json::Value;
use tracing::debug;

use crate::errors::InfraError;

fn tracker_error(err: reqwest::Error) -> TrackerError {
    InfraError::from(err).into()
}

/// One call to the backend: where it goes, who makes it, what it carries.
#[derive(Debug, Clone)]
pub struct Outgoing<'a> {
    pub method: Method,
    pub url: &'a str,
    pub bearer: Option<&'a str>,
    pub body: Option<&'a Value>,
}

impl<'a> Outgoing<'a> {
    pub fn new(method: Method, url: &'a str) -> Self {
        Self { method, url, bearer: None, body: None }
    }

    pub fn bearer(mut self, token: Option<&'a str>) -> Self {
        self.bearer = token;
        self
    }

    pub fn json(mut self, body: Option<&'a Value>) -> Self {
        self.body = body;
        self
    }
}

/// JSON transport for the tracker backend.
///
/// Every call sends `Accept: application/json`, is bounded by the
/// configured timeout and goes out exactly once. Token refresh and
/// retries live in [`crate::api::ApiClient`].
#[derive(Clone, Debug)]
pub struct HttpClient {
    inner: ReqwestClient,
    timeout: Duration,
}

impl HttpClient {
    pub fn builder() -> HttpClientBuilder {
        HttpClientBuilder::default()
    }

    pub fn new() -> Result<Self, TrackerError> {
        Self::builder().build()
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Perform `call` and hand back the response whatever its status.
    ///
    /// # Errors
    ///
    /// Returns `TrackerError::Config` for an unusable URL and
    /// `TrackerError::Network` when the backend could not be reached in time
    pub async fn call(&self, call: Outgoing<'_>) -> Result<Response, TrackerError> {
        let mut request = self.inner.request(call.method.clone(), call.url);
        if let Some(token) = call.bearer {
            request = request.header(AUTHORIZATION, format!("Bearer {token}"));
        }
        if let Some(body) = call.body {
            request = request.json(body);
        }

        let request = request.build().map_err(tracker_error)?;
        let path = request.url().path().to_string();
        debug!(method = %call.method, %path, authed = call.bearer.is_some(), "-> backend");

        let response = self.inner.execute(request).await.map_err(|err| {
            debug!(method = %call.method, %path, error = %err, "backend unreachable");
            tracker_error(err)
        })?;
        debug!(method = %call.method, %path, status = %response.status(), "<- backend");
        Ok(response)
    }
}

/// Builder for [`HttpClient`].
#[derive(Debug)]
pub struct HttpClientBuilder {
    timeout: Duration,
    user_agent: String,
}

impl Default for HttpClientBuilder {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS),
            user_agent: concat!("dailytrack/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl HttpClientBuilder {
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = agent.into();
        self
    }

    pub fn build(self) -> Result<HttpClient, TrackerError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let inner = ReqwestClient::builder()
            .timeout(self.timeout)
            .no_proxy()
            .user_agent(self.user_agent)
            .default_headers(headers)
            .build()
            .map_err(tracker_error)?;

        Ok(HttpClient { inner, timeout: self.timeout })
    }
}
