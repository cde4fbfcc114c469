//! API-specific error types
//!
//! Classifies failures of the authenticated pipeline so views can show an
//! inline message without inspecting transport details.

use std::time::Duration;

use dailytrack_domain::TrackerError;
use thiserror::Error;

const NETWORK_MESSAGE: &str = "Could not reach the server. Please try again.";
const SESSION_EXPIRED_MESSAGE: &str = "Your session has expired. Please sign in again.";

/// Categories of API errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiErrorCategory {
    /// 401 / 403
    Authentication,
    /// Other 4xx, usually validation or business rules
    Client,
    /// 5xx
    Server,
    /// Connection failures and timeouts
    Network,
    /// Misconfiguration or unexpected response shape
    Config,
}

/// API operation errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    /// Sign-in or password-reset refused by the backend.
    #[error("Authentication failed: {0}")]
    Auth(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Timeout after {0:?}")]
    Timeout(Duration),

    /// Non-2xx response; `message` comes from the body when it has one.
    #[error("Request rejected ({status}): {message}")]
    Rejected { status: u16, message: String },

    #[error("Failed to decode response: {0}")]
    Decode(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl ApiError {
    /// Get the error category for this error
    pub fn category(&self) -> ApiErrorCategory {
        match self {
            Self::Auth(_) => ApiErrorCategory::Authentication,
            Self::Network(_) | Self::Timeout(_) => ApiErrorCategory::Network,
            Self::Rejected { status: 401 | 403, .. } => ApiErrorCategory::Authentication,
            Self::Rejected { status, .. } if *status >= 500 => ApiErrorCategory::Server,
            Self::Rejected { .. } => ApiErrorCategory::Client,
            Self::Decode(_) | Self::Config(_) => ApiErrorCategory::Config,
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Rejected { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        self.status() == Some(401)
    }

    /// Text suitable for an inline error banner.
    pub fn user_message(&self) -> String {
        match self {
            Self::Network(_) | Self::Timeout(_) => NETWORK_MESSAGE.to_string(),
            Self::Rejected { status: 401, .. } => SESSION_EXPIRED_MESSAGE.to_string(),
            Self::Auth(message) | Self::Rejected { message, .. } => message.clone(),
            Self::Decode(_) => "The server sent an unexpected response.".to_string(),
            Self::Config(message) => message.clone(),
        }
    }
}

impl From<TrackerError> for ApiError {
    fn from(err: TrackerError) -> Self {
        match err {
            TrackerError::Network(message) => Self::Network(message),
            TrackerError::Config(message) => Self::Config(message),
            TrackerError::Auth(message) => Self::Auth(message),
            TrackerError::Forbidden(message) => Self::Rejected { status: 403, message },
            TrackerError::NotFound(message) => Self::Rejected { status: 404, message },
            TrackerError::InvalidInput(message) => Self::Decode(message),
            TrackerError::Storage(message) | TrackerError::Internal(message) => {
                Self::Config(message)
            }
        }
    }
}

impl From<ApiError> for TrackerError {
    fn from(err: ApiError) -> Self {
        match err {
            ApiError::Auth(message) => TrackerError::Auth(message),
            ApiError::Network(message) => TrackerError::Network(message),
            ApiError::Timeout(timeout) => {
                TrackerError::Network(format!("request timed out after {timeout:?}"))
            }
            ApiError::Rejected { status: 401, message } => TrackerError::Auth(message),
            ApiError::Rejected { status: 403, message } => TrackerError::Forbidden(message),
            ApiError::Rejected { status: 404, message } => TrackerError::NotFound(message),
            ApiError::Rejected { status, message } if status < 500 => {
                TrackerError::InvalidInput(message)
            }
            ApiError::Rejected { message, .. } => TrackerError::Network(message),
            ApiError::Decode(message) => TrackerError::InvalidInput(message),
            ApiError::Config(message) => TrackerError::Config(message),
        }
    }
}
