//! Typed tracker endpoints
//!
//! One method per backend route. Authenticated routes go through
//! [`ApiClient::request`]; sign-in and password recovery use the public
//! path so a bad password never triggers a token refresh.

use std::sync::Arc;

use dailytrack_core::LoginGrant;
use dailytrack_domain::{
    ActivityQuery, ActivityRecord, FilterOptions, LoginRequest, LoginResponse, NewUser,
    PerformanceQuery, ResourcePlan, StatusResponse, SubmissionReceipt, TeamReportRow,
    TrackerSubmission, UserAccount,
};
use reqwest::Method;
use serde::Serialize;
use serde_json::{json, Value};
use tracing::{debug, info, instrument, warn};
use urlencoding::encode;

use super::client::{expect_success, parse_rows, ApiClient};
use super::errors::ApiError;

pub const LOGIN_PATH: &str = "/api/login";
pub const FORGOT_PASSWORD_PATH: &str = "/api/forgot-password";
pub const RESET_PASSWORD_PATH: &str = "/api/reset-password";
pub const PERFORMANCE_PATH: &str = "/api/performance";
pub const DAILY_ACTIVITY_PATH: &str = "/api/daily_activity";
pub const FILTERS_PATH: &str = "/api/daily_activity/filters";
pub const EDIT_RECORD_PATH: &str = "/api/daily_activity/edit";
pub const TRACKER_PATH: &str = "/api/tracker";
pub const RESOURCE_PLANNING_PATH: &str = "/api/resource-planning";
pub const RESOURCE_PATH: &str = "/api/resource";
pub const USERS_PATH: &str = "/api/users";
pub const TEAM_REPORT_PATH: &str = "/api/team-report";
pub const HEALTH_PATH: &str = "/api/health";

/// Append `pairs` to `path` as a percent-encoded query string.
pub fn with_query(path: &str, pairs: &[(&str, String)]) -> String {
    if pairs.is_empty() {
        return path.to_string();
    }
    let query = pairs
        .iter()
        .map(|(key, value)| format!("{}={}", encode(key), encode(value)))
        .collect::<Vec<_>>()
        .join("&");
    format!("{}?{}", path, query)
}

fn to_body<T: Serialize>(value: &T) -> Result<Value, ApiError> {
    serde_json::to_value(value)
        .map_err(|e| ApiError::Config(format!("Failed to serialize body: {}", e)))
}

/// Tracker backend operations
#[derive(Debug, Clone)]
pub struct TrackerApi {
    client: Arc<ApiClient>,
}

impl TrackerApi {
    pub fn new(client: Arc<ApiClient>) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &Arc<ApiClient> {
        &self.client
    }

    // === Authentication ===

    /// Exchange credentials for tokens and the signed-in identity.
    ///
    /// The session is not touched; the caller decides when to start it.
    ///
    /// # Errors
    ///
    /// `ApiError::Auth` with the backend's message (or "Login failed") when
    /// the response is not a 2xx `status: success` carrying a token and user
    #[instrument(skip(self, password), fields(email = %email))]
    pub async fn login(&self, email: &str, password: &str) -> Result<LoginGrant, ApiError> {
        let body =
            to_body(&LoginRequest { email: email.to_string(), password: password.to_string() })?;
        let response = self.client.request_public(Method::POST, LOGIN_PATH, Some(&body)).await?;

        let ok = response.status().is_success();
        let text = response.text().await.map_err(|e| ApiError::Network(e.to_string()))?;
        let parsed: LoginResponse = serde_json::from_str(&text).unwrap_or_default();
        let succeeded = ok && parsed.status.as_deref() == Some("success");

        match (succeeded, parsed.access_token, parsed.user) {
            (true, Some(access_token), Some(user)) if !access_token.is_empty() => {
                info!(role = %user.role, "Login succeeded");
                Ok(LoginGrant {
                    access_token,
                    refresh_token: parsed.refresh_token.filter(|t| !t.is_empty()),
                    user,
                })
            }
            _ => {
                let message = parsed
                    .message
                    .filter(|m| !m.trim().is_empty())
                    .unwrap_or_else(|| "Login failed".to_string());
                warn!(%message, "Login refused");
                Err(ApiError::Auth(message))
            }
        }
    }

    /// Ask the backend to mail a password reset link.
    #[instrument(skip(self), fields(email = %email))]
    pub async fn forgot_password(&self, email: &str) -> Result<(), ApiError> {
        let body = json!({ "email": email });
        let response =
            self.client.request_public(Method::POST, FORGOT_PASSWORD_PATH, Some(&body)).await?;
        expect_success(response).await
    }

    /// Set a new password using the token from a reset link.
    #[instrument(skip(self, token, new_password))]
    pub async fn reset_password(&self, token: &str, new_password: &str) -> Result<(), ApiError> {
        let body = json!({ "token": token, "new_password": new_password });
        let response =
            self.client.request_public(Method::POST, RESET_PASSWORD_PATH, Some(&body)).await?;

        if response.status().is_success() {
            info!("Password reset accepted");
            return Ok(());
        }
        let status = response.status();
        let text = response.text().await.unwrap_or_default();
        let parsed: StatusResponse = serde_json::from_str(&text).unwrap_or_default();
        let message = parsed
            .message
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| "Reset failed".to_string());
        debug!(status = status.as_u16(), "Password reset refused");
        Err(ApiError::Auth(message))
    }

    // === Activity data ===

    /// Rows for the performance view.
    #[instrument(skip(self, query), fields(email = %query.email))]
    pub async fn performance(
        &self,
        query: &PerformanceQuery,
    ) -> Result<Vec<ActivityRecord>, ApiError> {
        let path = with_query(PERFORMANCE_PATH, &query.to_query_pairs());
        let payload: Value = self.client.get_json(&path).await?;
        Ok(parse_rows(&payload))
    }

    /// Rows for the old-data view, filtered server-side.
    #[instrument(skip(self, query))]
    pub async fn daily_activity(
        &self,
        query: &ActivityQuery,
    ) -> Result<Vec<ActivityRecord>, ApiError> {
        let path = with_query(DAILY_ACTIVITY_PATH, &query.to_query_pairs());
        let payload: Value = self.client.get_json(&path).await?;
        Ok(parse_rows(&payload))
    }

    /// Dropdown values for the old-data filters.
    ///
    /// A missing or malformed `data` object yields empty options.
    #[instrument(skip(self))]
    pub async fn filter_options(&self) -> Result<FilterOptions, ApiError> {
        let payload: Value = self.client.get_json(FILTERS_PATH).await?;
        let data = payload.get("data").cloned().unwrap_or(Value::Null);
        match serde_json::from_value::<FilterOptions>(data) {
            Ok(options) => Ok(options),
            Err(e) => {
                warn!(error = %e, "Filter options malformed, using none");
                Ok(FilterOptions::default())
            }
        }
    }

    /// Save an edited row. The row is sent exactly as given.
    #[instrument(skip(self, record))]
    pub async fn edit_record(&self, record: &ActivityRecord) -> Result<(), ApiError> {
        let body = to_body(record)?;
        let response = self.client.request(Method::PUT, EDIT_RECORD_PATH, Some(&body)).await?;
        expect_success(response).await
    }

    /// Submit a day's project entries.
    #[instrument(skip(self, submission), fields(date = %submission.date, projects = submission.projects.len()))]
    pub async fn submit_tracker(
        &self,
        submission: &TrackerSubmission,
    ) -> Result<SubmissionReceipt, ApiError> {
        let body = to_body(submission)?;
        let receipt: Option<SubmissionReceipt> =
            self.client.send_json(Method::POST, TRACKER_PATH, &body).await?;
        let receipt = receipt.unwrap_or_default();
        info!(count = ?receipt.count, "Tracker submission stored");
        Ok(receipt)
    }

    /// Submit a resource plan to `/api/resource-planning`, falling back to
    /// the resource table when that route does not exist.
    #[instrument(skip(self, plan), fields(date = %plan.date))]
    pub async fn submit_resource_plan(&self, plan: &ResourcePlan) -> Result<(), ApiError> {
        let body = to_body(plan)?;
        let response =
            self.client.request(Method::POST, RESOURCE_PLANNING_PATH, Some(&body)).await?;
        match expect_success(response).await {
            Err(e) if e.status() == Some(404) => {
                debug!("Resource planning route missing, using {RESOURCE_PATH}");
                self.create_resource_entry(plan).await.map(drop)
            }
            other => other,
        }
    }

    /// Store a plan in the resource table (`/api/resource`).
    #[instrument(skip(self, plan), fields(date = %plan.date))]
    pub async fn create_resource_entry(
        &self,
        plan: &ResourcePlan,
    ) -> Result<SubmissionReceipt, ApiError> {
        let body = to_body(plan)?;
        let receipt: Option<SubmissionReceipt> =
            self.client.send_json(Method::POST, RESOURCE_PATH, &body).await?;
        Ok(receipt.unwrap_or_default())
    }

    // === Team ===

    #[instrument(skip(self))]
    pub async fn list_users(&self) -> Result<Vec<UserAccount>, ApiError> {
        let payload: Value = self.client.get_json(USERS_PATH).await?;
        Ok(parse_rows(&payload))
    }

    /// Create an account. The pod goes out as both `pod` and `pod_name`.
    #[instrument(skip(self, user), fields(email = %user.email, role = %user.role))]
    pub async fn create_user(&self, user: &NewUser) -> Result<(), ApiError> {
        let mut body = to_body(user)?;
        if let (Some(pod), Value::Object(map)) = (user.pod.as_ref(), &mut body) {
            map.insert("pod_name".to_string(), Value::String(pod.clone()));
        }
        let response = self.client.request(Method::POST, USERS_PATH, Some(&body)).await?;
        expect_success(response).await?;
        info!("User created");
        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn delete_user(&self, id: &str) -> Result<(), ApiError> {
        let path = format!("{}/{}", USERS_PATH, encode(id));
        let response = self.client.request(Method::DELETE, &path, None).await?;
        expect_success(response).await?;
        info!("User deleted");
        Ok(())
    }

    /// Per-person aggregates computed by the backend.
    #[instrument(skip(self, query), fields(email = %query.email))]
    pub async fn team_report(
        &self,
        query: &PerformanceQuery,
    ) -> Result<Vec<TeamReportRow>, ApiError> {
        let path = with_query(TEAM_REPORT_PATH, &query.to_query_pairs());
        let payload: Value = self.client.get_json(&path).await?;
        Ok(parse_rows(&payload))
    }

    // === Health ===

    /// `true` when `/api/health` answers 2xx.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Network` or `ApiError::Timeout` when the backend
    /// cannot be reached
    pub async fn health(&self) -> Result<bool, ApiError> {
        let response = self.client.request_public(Method::GET, HEALTH_PATH, None).await?;
        debug!(status = %response.status(), "Health probe answered");
        Ok(response.status().is_success())
    }
}
