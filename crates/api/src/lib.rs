//! # DailyTrack App
//!
//! Application layer - view controller, wiring and the binary entry point.
//!
//! This crate contains:
//! - Application context (dependency injection)
//! - The view controller and its view models
//! - Logging setup and the status report
//!
//! ## Architecture
//! - Depends on `domain`, `core`, and `infra`
//! - Wires up the hexagonal architecture
//! - Exposes plain view models instead of a UI toolkit

pub mod context;
pub mod controller;
pub mod utils;

pub use context::AppContext;
pub use controller::{
    ControllerError, ControllerState, ReportSource, ViewController, ViewModel, MIN_PASSWORD_LEN,
};
