//! Activity records and the queries that fetch them

use std::collections::BTreeSet;

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::constants::{PERFORMANCE_LOOKBACK_DAYS, UNKNOWN_EMAIL};
use crate::types::user::{Identity, Role};
use crate::utils::parse_timestamp_date;
use crate::utils::serde::{lenient_f64, number_from_value};

/// One logged unit of work as returned by the activity endpoints.
///
/// Every column is optional on the wire. Fields the client does not model
/// (product-specific measurements, alternate spellings such as `hours` or
/// `submitted_at`) are kept in [`ActivityRecord::extra`] so an edited
/// record is sent back with nothing dropped.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pod_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mode_of_functioning: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nature_of_work: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task: Option<String>,
    #[serde(default, with = "lenient_f64", skip_serializing_if = "Option::is_none")]
    pub dedicated_hours: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remarks: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub submitted_at: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// How a record is matched when patched after an edit.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RecordKey {
    Id(String),
    EmailSubmitted { email: String, submitted_at: String },
}

impl ActivityRecord {
    /// Hours worked; `hours` is read when `dedicatedHours` is missing, and
    /// anything non-numeric counts as zero.
    pub fn hours(&self) -> f64 {
        self.dedicated_hours
            .or_else(|| self.extra.get("hours").and_then(number_from_value))
            .unwrap_or(0.0)
    }

    /// Raw submission timestamp, from either spelling.
    pub fn submitted_raw(&self) -> Option<&str> {
        self.submitted_at
            .as_deref()
            .or_else(|| self.extra.get("submitted_at").and_then(Value::as_str))
            .filter(|s| !s.trim().is_empty())
    }

    /// Calendar date the record was submitted for.
    pub fn submitted_on(&self) -> Option<NaiveDate> {
        self.submitted_raw().and_then(parse_timestamp_date)
    }

    pub fn email_or_unknown(&self) -> &str {
        self.email.as_deref().filter(|e| !e.is_empty()).unwrap_or(UNKNOWN_EMAIL)
    }

    pub fn key(&self) -> Option<RecordKey> {
        match &self.id {
            Some(Value::String(s)) if !s.is_empty() => return Some(RecordKey::Id(s.clone())),
            Some(Value::Number(n)) => return Some(RecordKey::Id(n.to_string())),
            _ => {}
        }
        let email = self.email.as_deref().filter(|e| !e.is_empty())?;
        let submitted_at = self.submitted_raw()?;
        Some(RecordKey::EmailSubmitted {
            email: email.to_string(),
            submitted_at: submitted_at.to_string(),
        })
    }
}

/// Distinct values offered by the old-data dropdowns.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FilterOptions {
    pub products: Vec<String>,
    pub project_names: Vec<String>,
    pub nature_of_work: Vec<String>,
    pub tasks: Vec<String>,
    pub pod_names: Vec<String>,
}

impl FilterOptions {
    /// Unique, non-empty, sorted values of each filterable column.
    pub fn from_records(records: &[ActivityRecord]) -> Self {
        fn distinct<'a>(values: impl Iterator<Item = Option<&'a String>>) -> Vec<String> {
            let set: BTreeSet<&str> =
                values.flatten().map(|v| v.trim()).filter(|v| !v.is_empty()).collect();
            set.into_iter().map(str::to_string).collect()
        }

        Self {
            products: distinct(records.iter().map(|r| r.product.as_ref())),
            project_names: distinct(records.iter().map(|r| r.project_name.as_ref())),
            nature_of_work: distinct(records.iter().map(|r| r.nature_of_work.as_ref())),
            tasks: distinct(records.iter().map(|r| r.task.as_ref())),
            pod_names: distinct(records.iter().map(|r| r.pod_name.as_ref())),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
            && self.project_names.is_empty()
            && self.nature_of_work.is_empty()
            && self.tasks.is_empty()
            && self.pod_names.is_empty()
    }
}

/// Aggregated row of `/api/team-report`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TeamReportRow {
    pub email: String,
    pub name: Option<String>,
    pub entries: u64,
    #[serde(with = "lenient_f64")]
    pub total_hours: Option<f64>,
    #[serde(with = "lenient_f64")]
    pub avg_daily: Option<f64>,
}

/// Server-side filters for `/api/daily_activity`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActivityQuery {
    pub product: Option<String>,
    pub project_name: Option<String>,
    pub nature_of_work: Option<String>,
    pub task: Option<String>,
    pub pod_name: Option<String>,
    pub email: Option<String>,
}

impl ActivityQuery {
    /// Query scoped to `identity`: everyone but admins asks for their own
    /// rows only, managers and team leads included.
    pub fn for_identity(identity: &Identity) -> Self {
        let email = (!identity.role.is_admin()).then(|| identity.email.clone());
        Self { email, ..Self::default() }
    }

    pub fn to_query_pairs(&self) -> Vec<(&'static str, String)> {
        [
            ("product", &self.product),
            ("project_name", &self.project_name),
            ("nature_of_work", &self.nature_of_work),
            ("task", &self.task),
            ("pod_name", &self.pod_name),
            ("email", &self.email),
        ]
        .into_iter()
        .filter_map(|(key, value)| {
            value.as_deref().filter(|v| !v.trim().is_empty()).map(|v| (key, v.to_string()))
        })
        .collect()
    }
}

/// Date-ranged query shared by `/api/performance` and `/api/team-report`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PerformanceQuery {
    pub email: String,
    pub role: Role,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

impl PerformanceQuery {
    /// Last thirty days ending on `today`.
    pub fn for_identity(identity: &Identity, today: NaiveDate) -> Self {
        Self::last_days(identity, today, PERFORMANCE_LOOKBACK_DAYS)
    }

    pub fn last_days(identity: &Identity, today: NaiveDate, days: i64) -> Self {
        Self {
            email: identity.email.clone(),
            role: identity.role,
            start_date: today - Duration::days(days),
            end_date: today,
        }
    }

    pub fn to_query_pairs(&self) -> Vec<(&'static str, String)> {
        vec![
            ("email", self.email.clone()),
            ("role", self.role.to_string()),
            ("start_date", self.start_date.format("%Y-%m-%d").to_string()),
            ("end_date", self.end_date.format("%Y-%m-%d").to_string()),
        ]
    }
}
