//! # DailyTrack Core
//!
//! Pure business logic layer - no infrastructure dependencies.
//!
//! This crate contains:
//! - The session store and its storage port
//! - Role-scoped row visibility
//! - Derived weekly and per-person metrics
//! - Old-data filtering and record patching
//! - The view catalogue and its role gates
//!
//! ## Architecture Principles
//! - Only depends on `dailytrack-domain`
//! - No HTTP, filesystem or platform code
//! - All external dependencies via traits
//! - Pure, testable business logic

pub mod metrics;
pub mod records;
pub mod scope;
pub mod session;
pub mod views;

pub use metrics::{
    per_person_aggregate, remaining_hours, weekly_hours, weekly_progress_percent, PersonAggregate,
    WeeklySummary,
};
pub use records::{patch_record, ActivityFilter};
pub use scope::{scope_rule, visible_pods, visible_rows, ScopeRule};
pub use session::{InMemorySessionStorage, LoginGrant, SessionEvent, SessionStorage, SessionStore};
pub use views::{can_edit_records, reset_token_from_url, LoginScreen, View};
