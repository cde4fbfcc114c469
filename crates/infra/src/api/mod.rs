//! Tracker backend API
//!
//! - [`base`]: API base URL resolution from config and origin
//! - [`client`]: authenticated request pipeline with one silent refresh
//! - [`commands`]: typed endpoints
//! - [`health`]: periodic backend health probe
//!
//! Tokens are never logged; request spans carry the path only.

pub mod base;
pub mod client;
pub mod commands;
pub mod errors;
pub mod health;

pub use base::{join_url, resolve_api_base};
pub use client::{parse_rows, read_json, ApiClient, ApiClientConfig};
pub use commands::{with_query, TrackerApi};
pub use errors::{ApiError, ApiErrorCategory};
pub use health::{BackendStatus, HealthMonitor, HealthMonitorConfig};
