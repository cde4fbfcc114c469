//! # DailyTrack Infrastructure
//!
//! Infrastructure implementations of core ports and the remote API.
//!
//! This crate contains:
//! - The HTTP client wrapper
//! - The authenticated request pipeline and typed tracker endpoints
//! - The backend health monitor
//! - File-backed session storage
//! - Configuration loading
//!
//! ## Architecture
//! - Implements traits defined in `dailytrack-core`
//! - Depends on `dailytrack-domain` and `dailytrack-core`
//! - Contains all "impure" code (network and filesystem I/O)

pub mod api;
pub mod config;
pub mod errors;
pub mod http;
pub mod storage;

// Re-export commonly used items
pub use api::{
    ApiClient, ApiClientConfig, ApiError, ApiErrorCategory, BackendStatus, HealthMonitor,
    HealthMonitorConfig, TrackerApi,
};
pub use errors::InfraError;
pub use http::HttpClient;
pub use storage::FileSessionStorage;
