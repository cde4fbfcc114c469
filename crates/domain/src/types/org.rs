//! Static organisation chart
//!
//! Maps manager and team-lead keys (the local part of their email) to the
//! pods they oversee. The chart is compiled in and never mutated at runtime.

use std::collections::BTreeMap;

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

/// Pods overseen by a manager, and the team leads reporting to them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManagerScope {
    pub pods: Vec<String>,
    pub team_leads: Vec<String>,
}

/// The single pod a team lead runs, and their manager.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamLeadScope {
    pub pod: String,
    pub manager: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrgChart {
    managers: BTreeMap<String, ManagerScope>,
    team_leads: BTreeMap<String, TeamLeadScope>,
}

static BUILTIN: Lazy<OrgChart> = Lazy::new(|| {
    let manager = |pods: [&str; 2], leads: [&str; 2]| ManagerScope {
        pods: pods.iter().map(|p| (*p).to_string()).collect(),
        team_leads: leads.iter().map(|l| (*l).to_string()).collect(),
    };
    let lead = |pod: &str, manager: &str| TeamLeadScope {
        pod: pod.to_string(),
        manager: manager.to_string(),
    };

    OrgChart::new(
        [
            (
                "manager1",
                manager(["POD-1 (Aryabhata)", "POD-4 (Gaganyaan)"], ["team_lead_1", "team_lead_2"]),
            ),
            ("manager2", manager(["POD-5 (Swift)", "POD-2 (Crawlers)"], ["team_lead_3", "team_lead_4"])),
            ("manager3", manager(["POD-3 (Marte)", "POD-6 (Imagery)"], ["team_lead_5", "team_lead_6"])),
        ],
        [
            ("team_lead_1", lead("POD-1 (Aryabhata)", "manager1")),
            ("team_lead_2", lead("POD-4 (Gaganyaan)", "manager1")),
            ("team_lead_3", lead("POD-5 (Swift)", "manager2")),
            ("team_lead_4", lead("POD-2 (Crawlers)", "manager2")),
            ("team_lead_5", lead("POD-3 (Marte)", "manager3")),
            ("team_lead_6", lead("POD-6 (Imagery)", "manager3")),
        ],
    )
});

impl OrgChart {
    pub fn new<M, T, K1, K2>(managers: M, team_leads: T) -> Self
    where
        M: IntoIterator<Item = (K1, ManagerScope)>,
        T: IntoIterator<Item = (K2, TeamLeadScope)>,
        K1: Into<String>,
        K2: Into<String>,
    {
        Self {
            managers: managers.into_iter().map(|(k, v)| (k.into(), v)).collect(),
            team_leads: team_leads.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }

    /// The compiled-in chart.
    pub fn builtin() -> &'static OrgChart {
        &BUILTIN
    }

    pub fn manager(&self, key: &str) -> Option<&ManagerScope> {
        self.managers.get(key)
    }

    pub fn team_lead(&self, key: &str) -> Option<&TeamLeadScope> {
        self.team_leads.get(key)
    }

    /// Every pod named anywhere in the chart, sorted and deduplicated.
    pub fn all_pods(&self) -> Vec<String> {
        let mut pods: Vec<String> = self
            .managers
            .values()
            .flat_map(|m| m.pods.iter().cloned())
            .chain(self.team_leads.values().map(|t| t.pod.clone()))
            .collect();
        pods.sort();
        pods.dedup();
        pods
    }
}
