//! Application constants
//!
//! Centralized location for domain-level constants shared by every layer.

// Persisted session keys
pub const ACCESS_TOKEN_KEY: &str = "access_token";
pub const REFRESH_TOKEN_KEY: &str = "refresh_token";
pub const CURRENT_USER_KEY: &str = "current_user";

// Weekly targets
pub const WEEKLY_TARGET_HOURS: f64 = 40.0;

// API base resolution
pub const DEFAULT_BACKEND_PORT: u16 = 5000;
pub const DEFAULT_ORIGIN: &str = "http://localhost:5173";

// Health probe
pub const HEALTH_POLL_INTERVAL_SECS: u64 = 15;
pub const HEALTH_PROBE_TIMEOUT_SECS: u64 = 8;

// HTTP
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;

// Performance view default look-back window
pub const PERFORMANCE_LOOKBACK_DAYS: i64 = 30;

// Launch URL query parameter that opens the password reset flow
pub const RESET_TOKEN_PARAM: &str = "reset_token";

// Grouping key for records without an email
pub const UNKNOWN_EMAIL: &str = "unknown";
