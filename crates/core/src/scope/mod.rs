//! Role-scoped visibility of activity rows
//!
//! Visibility is always computed from the signed-in identity and the org
//! chart, never stored on the rows themselves.

use dailytrack_domain::{ActivityRecord, Identity, OrgChart, Role};
use tracing::debug;

/// Which rows an identity may see.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScopeRule {
    /// Every row.
    All,
    /// Rows whose pod is one of these.
    Pods(Vec<String>),
    /// Only rows submitted under this email.
    Own { email: String },
}

impl ScopeRule {
    pub fn allows(&self, record: &ActivityRecord) -> bool {
        match self {
            ScopeRule::All => true,
            ScopeRule::Pods(pods) => {
                record.pod_name.as_deref().is_some_and(|pod| pods.iter().any(|p| p == pod))
            }
            ScopeRule::Own { email } => record.email.as_deref() == Some(email.as_str()),
        }
    }

    /// Short description for view headers.
    pub fn describe(&self) -> String {
        match self {
            ScopeRule::All => "all pods".to_string(),
            ScopeRule::Pods(pods) => pods.join(", "),
            ScopeRule::Own { .. } => "your entries".to_string(),
        }
    }
}

/// Resolve the visibility rule for `identity`.
///
/// Managers and team leads missing from the chart fall back to their own
/// rows.
pub fn scope_rule(identity: &Identity, chart: &OrgChart) -> ScopeRule {
    let own = || ScopeRule::Own { email: identity.email.clone() };
    let key = identity.local_part();

    let rule = match identity.role {
        Role::Admin | Role::InternalAdmin => ScopeRule::All,
        Role::Manager => {
            chart.manager(key).map_or_else(own, |scope| ScopeRule::Pods(scope.pods.clone()))
        }
        Role::TeamLead => {
            chart.team_lead(key).map_or_else(own, |scope| ScopeRule::Pods(vec![scope.pod.clone()]))
        }
        Role::User => own(),
    };
    debug!(role = %identity.role, key, rule = ?rule, "Resolved scope rule");
    rule
}

/// Filter `rows` down to what `identity` may see, preserving order.
pub fn visible_rows(
    rows: Vec<ActivityRecord>,
    identity: &Identity,
    chart: &OrgChart,
) -> Vec<ActivityRecord> {
    let rule = scope_rule(identity, chart);
    rows.into_iter().filter(|row| rule.allows(row)).collect()
}

/// Pods in scope for `identity`; empty when the identity only sees its own
/// rows.
pub fn visible_pods(identity: &Identity, chart: &OrgChart) -> Vec<String> {
    match scope_rule(identity, chart) {
        ScopeRule::All => chart.all_pods(),
        ScopeRule::Pods(pods) => pods,
        ScopeRule::Own { .. } => Vec::new(),
    }
}
