//! Mapping of I/O, JSON and transport failures onto [`TrackerError`].

use std::io::{Error as IoError, ErrorKind};

use dailytrack_domain::TrackerError;
use reqwest::Error as HttpError;
use serde_json::Error as JsonError;

/// Infrastructure-side carrier for a [`TrackerError`].
///
/// Foreign error types convert into this newtype so the domain crate never
/// depends on reqwest or serde_json.
#[derive(Debug)]
pub struct InfraError(pub TrackerError);

impl From<InfraError> for TrackerError {
    fn from(value: InfraError) -> Self {
        value.0
    }
}

impl From<TrackerError> for InfraError {
    fn from(value: TrackerError) -> Self {
        InfraError(value)
    }
}

/* -------------------------------------------------------------------------- */
/* Session file I/O */
/* -------------------------------------------------------------------------- */

impl From<IoError> for InfraError {
    fn from(err: IoError) -> Self {
        InfraError(match err.kind() {
            ErrorKind::NotFound => TrackerError::NotFound(format!("file not found: {err}")),
            ErrorKind::PermissionDenied => {
                TrackerError::Storage(format!("permission denied: {err}"))
            }
            _ => TrackerError::Storage(err.to_string()),
        })
    }
}

/* -------------------------------------------------------------------------- */
/* JSON payloads */
/* -------------------------------------------------------------------------- */

impl From<JsonError> for InfraError {
    fn from(err: JsonError) -> Self {
        InfraError(if err.is_io() {
            TrackerError::Storage(format!("could not read json: {err}"))
        } else {
            TrackerError::InvalidInput(format!("malformed json: {err}"))
        })
    }
}

/* -------------------------------------------------------------------------- */
/* Transport */
/* -------------------------------------------------------------------------- */

fn status_error(status: reqwest::StatusCode) -> TrackerError {
    let message = format!(
        "backend answered {} {}",
        status.as_u16(),
        status.canonical_reason().unwrap_or("unknown status")
    );
    match status.as_u16() {
        401 => TrackerError::Auth(message),
        403 => TrackerError::Forbidden(message),
        404 => TrackerError::NotFound(message),
        400..=499 => TrackerError::InvalidInput(message),
        _ => TrackerError::Network(message),
    }
}

impl From<HttpError> for InfraError {
    fn from(err: HttpError) -> Self {
        let mapped = if err.is_timeout() {
            TrackerError::Network("backend request timed out".into())
        } else if err.is_connect() {
            TrackerError::Network(format!("could not connect to backend: {err}"))
        } else if err.is_builder() {
            TrackerError::Config(format!("invalid backend request: {err}"))
        } else if let Some(status) = err.status() {
            status_error(status)
        } else {
            TrackerError::Network(err.to_string())
        };
        InfraError(mapped)
    }
}
