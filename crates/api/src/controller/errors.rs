//! Errors surfaced by the view controller

use dailytrack_core::View;
use dailytrack_domain::TrackerError;
use dailytrack_infra::ApiError;
use thiserror::Error;

/// Failures of a controller operation.
#[derive(Debug, Error)]
pub enum ControllerError {
    #[error("Not signed in")]
    NotSignedIn,

    /// The signed-in role may not open the view or perform the action.
    #[error("{0} requires an admin role")]
    Forbidden(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Session(#[from] TrackerError),
}

impl ControllerError {
    pub(crate) fn forbidden_view(view: View) -> Self {
        Self::Forbidden(view.to_string())
    }

    /// Text for an inline error banner.
    pub fn user_message(&self) -> String {
        match self {
            Self::NotSignedIn => "Please sign in to continue.".to_string(),
            Self::Forbidden(what) => format!("You do not have access to {what}."),
            Self::InvalidInput(message) => message.clone(),
            Self::Api(err) => err.user_message(),
            Self::Session(err) => err.to_string(),
        }
    }
}
