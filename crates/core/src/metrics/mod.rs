//! Derived metrics over activity records
//!
//! Everything here is a pure function of the rows passed in.

use std::collections::HashMap;

use chrono::NaiveDate;
use dailytrack_domain::constants::WEEKLY_TARGET_HOURS;
use dailytrack_domain::utils::week_bounds;
use dailytrack_domain::{ActivityRecord, TeamReportRow};
use serde::Serialize;

/// Hours logged in the Sunday–Saturday week containing `reference`.
///
/// Rows without a parseable submission date are skipped; missing or
/// non-numeric hours count as zero.
pub fn weekly_hours(records: &[ActivityRecord], reference: NaiveDate) -> f64 {
    let (start, end) = week_bounds(reference);
    records
        .iter()
        .filter(|r| r.submitted_on().is_some_and(|d| d >= start && d <= end))
        .map(ActivityRecord::hours)
        .sum()
}

pub fn remaining_hours(weekly: f64) -> f64 {
    (WEEKLY_TARGET_HOURS - weekly).max(0.0)
}

/// Share of the weekly target reached, rounded and clamped to 0..=100.
pub fn weekly_progress_percent(weekly: f64) -> u8 {
    let percent = (weekly / WEEKLY_TARGET_HOURS * 100.0).round();
    if percent.is_nan() {
        return 0;
    }
    // clamped above, so the cast is exact
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let clamped = percent.clamp(0.0, 100.0) as u8;
    clamped
}

/// Weekly figures shown on the performance view.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct WeeklySummary {
    pub week_start: NaiveDate,
    pub week_end: NaiveDate,
    pub hours: f64,
    pub remaining: f64,
    pub percent: u8,
}

impl WeeklySummary {
    pub fn compute(records: &[ActivityRecord], reference: NaiveDate) -> Self {
        let (week_start, week_end) = week_bounds(reference);
        let hours = weekly_hours(records, reference);
        Self {
            week_start,
            week_end,
            hours,
            remaining: remaining_hours(hours),
            percent: weekly_progress_percent(hours),
        }
    }
}

/// Per-email totals.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonAggregate {
    pub email: String,
    pub name: Option<String>,
    pub entries: u64,
    pub total_hours: f64,
    pub avg_daily: f64,
}

impl From<PersonAggregate> for TeamReportRow {
    fn from(aggregate: PersonAggregate) -> Self {
        TeamReportRow {
            email: aggregate.email,
            name: aggregate.name,
            entries: aggregate.entries,
            total_hours: Some(aggregate.total_hours),
            avg_daily: Some(aggregate.avg_daily),
        }
    }
}

/// Group rows by email in first-seen order.
pub fn per_person_aggregate(records: &[ActivityRecord]) -> Vec<PersonAggregate> {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut out: Vec<PersonAggregate> = Vec::new();

    for record in records {
        let email = record.email_or_unknown();
        let slot = *index.entry(email).or_insert_with(|| {
            out.push(PersonAggregate {
                email: email.to_string(),
                name: None,
                entries: 0,
                total_hours: 0.0,
                avg_daily: 0.0,
            });
            out.len() - 1
        });
        let aggregate = &mut out[slot];
        aggregate.entries += 1;
        aggregate.total_hours += record.hours();
        if aggregate.name.is_none() {
            aggregate.name.clone_from(&record.name);
        }
    }

    for aggregate in &mut out {
        // entries is never zero for a pushed aggregate
        #[allow(clippy::cast_precision_loss)]
        let entries = aggregate.entries as f64;
        aggregate.avg_daily = aggregate.total_hours / entries;
    }
    out
}
