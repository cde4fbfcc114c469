//! Application status report
//!
//! Snapshot of the backend connection and session, printed by the
//! `status` command.

use chrono::{DateTime, Utc};
use serde::Serialize;

/// One checked part of the client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ComponentHealth {
    pub name: String,
    pub is_healthy: bool,
    pub message: Option<String>,
}

impl ComponentHealth {
    pub fn healthy(name: impl Into<String>) -> Self {
        Self { name: name.into(), is_healthy: true, message: None }
    }

    pub fn unhealthy(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self { name: name.into(), is_healthy: false, message: Some(message.into()) }
    }
}

/// Overall client status.
#[derive(Debug, Clone, Serialize)]
pub struct StatusReport {
    pub api_base: String,
    pub backend: String,
    /// Email of the signed-in user, if any.
    pub signed_in_as: Option<String>,
    pub role: Option<String>,
    pub components: Vec<ComponentHealth>,
    pub checked_at: DateTime<Utc>,
}

impl StatusReport {
    pub fn new(api_base: impl Into<String>, backend: impl Into<String>) -> Self {
        Self {
            api_base: api_base.into(),
            backend: backend.into(),
            signed_in_as: None,
            role: None,
            components: Vec::new(),
            checked_at: Utc::now(),
        }
    }

    pub fn with_component(mut self, component: ComponentHealth) -> Self {
        self.components.push(component);
        self
    }

    /// Healthy when every component is.
    pub fn is_healthy(&self) -> bool {
        self.components.iter().all(|c| c.is_healthy)
    }

    pub fn unhealthy_components(&self) -> impl Iterator<Item = &ComponentHealth> {
        self.components.iter().filter(|c| !c.is_healthy)
    }
}
