//! Logging setup and the status report

pub mod health;
pub mod logging;

pub use health::{ComponentHealth, StatusReport};
pub use logging::{error_label, init_logging, log_command_execution};
