//! Controller state machine

use dailytrack_core::{LoginScreen, View};
use dailytrack_domain::Identity;

/// Either a login screen or a signed-in user looking at one view.
///
/// A user is present exactly when the state is `Authenticated`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ControllerState {
    Unauthenticated(LoginScreen),
    Authenticated { user: Identity, view: View },
}

impl ControllerState {
    /// State at launch: a restored user lands on `Home`, otherwise the
    /// login screen picked from the launch URL.
    pub fn initial(user: Option<Identity>, launch_url: Option<&str>) -> Self {
        match user {
            Some(user) => ControllerState::Authenticated { user, view: View::Home },
            None => ControllerState::Unauthenticated(LoginScreen::for_launch_url(launch_url)),
        }
    }

    pub fn signed_out() -> Self {
        ControllerState::Unauthenticated(LoginScreen::SignIn)
    }

    pub fn user(&self) -> Option<&Identity> {
        match self {
            ControllerState::Authenticated { user, .. } => Some(user),
            ControllerState::Unauthenticated(_) => None,
        }
    }

    pub fn view(&self) -> Option<View> {
        match self {
            ControllerState::Authenticated { view, .. } => Some(*view),
            ControllerState::Unauthenticated(_) => None,
        }
    }

    pub fn login_screen(&self) -> Option<&LoginScreen> {
        match self {
            ControllerState::Unauthenticated(screen) => Some(screen),
            ControllerState::Authenticated { .. } => None,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self, ControllerState::Authenticated { .. })
    }
}
