//! Shared helpers for wire parsing

pub mod serde;
pub mod time;

pub use time::{parse_timestamp_date, week_bounds};
