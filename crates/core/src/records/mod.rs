//! Old-data filtering and local patching of edited rows

use chrono::NaiveDate;
use dailytrack_domain::{ActivityQuery, ActivityRecord};
use tracing::debug;

/// Dropdown and date-range filters of the old-data view.
///
/// Each populated dropdown must match exactly; the date range is inclusive
/// at both ends and rows without a readable date fall outside any range.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActivityFilter {
    pub product: Option<String>,
    pub project: Option<String>,
    pub nature: Option<String>,
    pub task: Option<String>,
    pub pod: Option<String>,
    pub from_date: Option<NaiveDate>,
    pub to_date: Option<NaiveDate>,
}

fn selected(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

fn column_matches(wanted: &Option<String>, actual: &Option<String>) -> bool {
    match selected(wanted) {
        Some(wanted) => actual.as_deref().map(str::trim) == Some(wanted),
        None => true,
    }
}

impl ActivityFilter {
    pub fn is_empty(&self) -> bool {
        [&self.product, &self.project, &self.nature, &self.task, &self.pod]
            .into_iter()
            .all(|v| selected(v).is_none())
            && self.from_date.is_none()
            && self.to_date.is_none()
    }

    pub fn matches(&self, record: &ActivityRecord) -> bool {
        if !(column_matches(&self.product, &record.product)
            && column_matches(&self.project, &record.project_name)
            && column_matches(&self.nature, &record.nature_of_work)
            && column_matches(&self.task, &record.task)
            && column_matches(&self.pod, &record.pod_name))
        {
            return false;
        }

        if self.from_date.is_none() && self.to_date.is_none() {
            return true;
        }
        let Some(date) = record.submitted_on() else {
            return false;
        };
        self.from_date.map_or(true, |from| date >= from) && self.to_date.map_or(true, |to| date <= to)
    }

    /// Rows that pass the filter, in input order.
    pub fn apply(&self, records: &[ActivityRecord]) -> Vec<ActivityRecord> {
        records.iter().filter(|r| self.matches(r)).cloned().collect()
    }

    /// The subset of this filter the server understands.
    pub fn to_query(&self) -> ActivityQuery {
        let owned = |v: &Option<String>| selected(v).map(str::to_string);
        ActivityQuery {
            product: owned(&self.product),
            project_name: owned(&self.project),
            nature_of_work: owned(&self.nature),
            task: owned(&self.task),
            pod_name: owned(&self.pod),
            email: None,
        }
    }
}

/// Merge `edited` into the row with the same identity.
///
/// Fields present on `edited` overwrite; absent ones are left alone.
/// Returns `false` when no row matches (or `edited` has no identity).
pub fn patch_record(records: &mut [ActivityRecord], edited: &ActivityRecord) -> bool {
    let Some(key) = edited.key() else {
        debug!("Edited record has no identity, nothing patched");
        return false;
    };
    let Some(target) = records.iter_mut().find(|r| r.key().as_ref() == Some(&key)) else {
        debug!(?key, "No row matches edited record");
        return false;
    };

    macro_rules! overwrite {
        ($($field:ident),+) => {
            $(if edited.$field.is_some() {
                target.$field.clone_from(&edited.$field);
            })+
        };
    }
    overwrite!(
        id,
        email,
        name,
        pod_name,
        mode_of_functioning,
        product,
        project_name,
        nature_of_work,
        task,
        dedicated_hours,
        remarks,
        submitted_at
    );
    for (k, v) in &edited.extra {
        target.extra.insert(k.clone(), v.clone());
    }
    true
}
