//! Domain types and models

pub mod activity;
pub mod org;
pub mod session;
pub mod submission;
pub mod user;

pub use activity::{
    ActivityQuery, ActivityRecord, FilterOptions, PerformanceQuery, RecordKey, TeamReportRow,
};
pub use org::{ManagerScope, OrgChart, TeamLeadScope};
pub use session::Session;
pub use submission::{Product, ProjectEntry, ResourcePlan, SubmissionReceipt, TrackerSubmission};
pub use user::{
    email_local_part, Identity, LoginRequest, LoginResponse, NewUser, Role, StatusResponse,
    UserAccount,
};
