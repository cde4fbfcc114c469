//! Plain data handed to whatever renders a view

use dailytrack_core::{ActivityFilter, View, WeeklySummary};
use dailytrack_domain::{
    ActivityRecord, FilterOptions, Identity, PerformanceQuery, Product, TeamReportRow,
    UserAccount,
};

/// Where the team report rows came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportSource {
    /// `/api/team-report`
    Backend,
    /// Aggregated locally from the performance rows.
    Local,
}

/// Loaded state of one view.
#[derive(Debug, Clone, PartialEq)]
pub enum ViewModel {
    Home {
        user: Identity,
        menu: Vec<View>,
        scope: String,
    },
    Tracker {
        products: Vec<Product>,
        pods: Vec<String>,
    },
    Performance {
        query: PerformanceQuery,
        summary: WeeklySummary,
        rows: Vec<ActivityRecord>,
        scope: String,
    },
    ResourcePlanner {
        pods: Vec<String>,
    },
    OldData {
        rows: Vec<ActivityRecord>,
        options: FilterOptions,
        filter: ActivityFilter,
        can_edit: bool,
    },
    TeamReport {
        rows: Vec<TeamReportRow>,
        source: ReportSource,
    },
    TeamControl {
        users: Vec<UserAccount>,
    },
}

impl ViewModel {
    pub fn view(&self) -> View {
        match self {
            ViewModel::Home { .. } => View::Home,
            ViewModel::Tracker { .. } => View::Tracker,
            ViewModel::Performance { .. } => View::Performance,
            ViewModel::ResourcePlanner { .. } => View::ResourcePlanner,
            ViewModel::OldData { .. } => View::OldData,
            ViewModel::TeamReport { .. } => View::TeamReport,
            ViewModel::TeamControl { .. } => View::TeamControl,
        }
    }

    /// Number of data rows shown, for logging.
    pub fn row_count(&self) -> usize {
        match self {
            ViewModel::Performance { rows, .. } | ViewModel::OldData { rows, .. } => rows.len(),
            ViewModel::TeamReport { rows, .. } => rows.len(),
            ViewModel::TeamControl { users } => users.len(),
            _ => 0,
        }
    }
}
