//! # DailyTrack Domain
//!
//! Business domain types and models for the daily activity tracker client.
//!
//! This crate contains:
//! - Session, identity and role types
//! - Activity records and submission payloads
//! - The compiled-in organisational chart
//! - Configuration structures
//! - Domain error types and Result definitions
//!
//! ## Architecture
//! - No dependencies on other DailyTrack crates
//! - Only external dependencies allowed
//! - Pure domain models and data structures

pub mod config;
pub mod constants;
pub mod errors;
pub mod macros;
pub mod types;
pub mod utils;

// Re-export commonly used items
pub use config::*;
pub use errors::*;
pub use types::*;
