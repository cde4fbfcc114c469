//! User, role and login types

use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::impl_wire_name_conversions;
use crate::utils::serde::string_or_number;

/// Access role attached to every account.
///
/// Closed set; an unknown role string from the server is read as [`Role::User`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Role {
    #[default]
    User,
    TeamLead,
    Manager,
    Admin,
    InternalAdmin,
}

impl_wire_name_conversions!(Role {
    User => "User",
    TeamLead => "Team Lead",
    Manager => "Manager",
    Admin => "Admin",
    InternalAdmin => "Internal Admin",
});

impl Role {
    pub const ALL: [Role; 5] =
        [Role::User, Role::TeamLead, Role::Manager, Role::Admin, Role::InternalAdmin];

    /// Parse a wire name, falling back to least privilege.
    pub fn from_wire(raw: &str) -> Self {
        Role::from_str(raw).unwrap_or_default()
    }

    /// Admin and Internal Admin share every privilege.
    pub const fn is_admin(&self) -> bool {
        matches!(self, Role::Admin | Role::InternalAdmin)
    }
}

impl Serialize for Role {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Role {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Option::<String>::deserialize(deserializer)?;
        Ok(raw.as_deref().map(Role::from_wire).unwrap_or_default())
    }
}

/// The signed-in user as returned by `/api/login`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    #[serde(default, with = "string_or_number")]
    pub id: String,
    pub email: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub role: Role,
}

impl Identity {
    /// Part of the email before `@`; keys the org chart.
    pub fn local_part(&self) -> &str {
        email_local_part(&self.email)
    }

    pub fn display_name(&self) -> &str {
        self.name.as_deref().filter(|n| !n.trim().is_empty()).unwrap_or(&self.email)
    }
}

/// Local part of an email address (the whole string when there is no `@`).
pub fn email_local_part(email: &str) -> &str {
    email.split('@').next().unwrap_or(email)
}

/// Account row in the user-management list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserAccount {
    #[serde(default, with = "string_or_number")]
    pub id: String,
    pub email: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub role: Role,
    #[serde(default, alias = "pod_name")]
    pub pod: Option<String>,
}

/// Payload for creating an account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password: String,
    pub role: Role,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pod: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Response of `/api/login`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoginResponse {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub access_token: Option<String>,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub user: Option<Identity>,
    #[serde(default)]
    pub message: Option<String>,
}

/// Response of `/api/reset-password` and other status-only endpoints.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StatusResponse {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

impl StatusResponse {
    pub fn is_success(&self) -> bool {
        self.status.as_deref().is_some_and(|s| s.eq_ignore_ascii_case("success"))
    }
}
