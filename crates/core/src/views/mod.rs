//! View catalogue and role gating
//!
//! The client is a fixed set of named views. Every view needs a signed-in
//! user; user management additionally needs an admin role.

use dailytrack_domain::constants::RESET_TOKEN_PARAM;
use dailytrack_domain::{impl_wire_name_conversions, Role};
use serde::{Deserialize, Serialize};
use url::Url;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum View {
    #[default]
    Home,
    Tracker,
    Performance,
    ResourcePlanner,
    OldData,
    TeamReport,
    TeamControl,
}

impl_wire_name_conversions!(View {
    Home => "Home",
    Tracker => "Tracker",
    Performance => "Performance",
    ResourcePlanner => "Resource Planner",
    OldData => "Old Data",
    TeamReport => "Team Report",
    TeamControl => "Team Control",
});

impl View {
    pub const ALL: [View; 7] = [
        View::Home,
        View::Tracker,
        View::Performance,
        View::ResourcePlanner,
        View::OldData,
        View::TeamReport,
        View::TeamControl,
    ];

    pub const fn requires_admin(&self) -> bool {
        matches!(self, View::TeamControl)
    }

    pub const fn is_visible_to(&self, role: Role) -> bool {
        !self.requires_admin() || role.is_admin()
    }

    /// Views offered in the navigation for `role`, in menu order.
    pub fn visible_to(role: Role) -> Vec<View> {
        View::ALL.into_iter().filter(|v| v.is_visible_to(role)).collect()
    }
}

/// Whether `role` may edit rows in the old-data view.
pub const fn can_edit_records(role: Role) -> bool {
    role.is_admin()
}

/// Screens shown while nobody is signed in.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum LoginScreen {
    #[default]
    SignIn,
    ForgotPassword,
    ResetPassword { token: String },
}

impl LoginScreen {
    /// Initial screen for a launch URL: the reset form when the URL carries
    /// a reset token, sign-in otherwise.
    pub fn for_launch_url(launch_url: Option<&str>) -> Self {
        launch_url
            .and_then(reset_token_from_url)
            .map_or(LoginScreen::SignIn, |token| LoginScreen::ResetPassword { token })
    }
}

/// Extract a non-empty `reset_token` query parameter.
pub fn reset_token_from_url(raw: &str) -> Option<String> {
    let url = Url::parse(raw).ok()?;
    url.query_pairs()
        .find(|(k, _)| k == RESET_TOKEN_PARAM)
        .map(|(_, v)| v.into_owned())
        .filter(|v| !v.is_empty())
}
