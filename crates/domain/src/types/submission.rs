//! Tracker submissions and resource plans

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::utils::serde::lenient_f64;

/// Work stream a tracker entry belongs to.
///
/// Each stream collects its own measurements on top of the common columns.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Product {
    Aims,
    Ivms,
    Isms,
    Rsms,
    Imagery,
    Iems,
    Other(String),
}

impl Product {
    pub const KNOWN: [Product; 6] =
        [Product::Aims, Product::Ivms, Product::Isms, Product::Rsms, Product::Imagery, Product::Iems];

    pub fn as_str(&self) -> &str {
        match self {
            Product::Aims => "aims",
            Product::Ivms => "ivms",
            Product::Isms => "ISMS",
            Product::Rsms => "RSMS",
            Product::Imagery => "Imagery",
            Product::Iems => "IEMS",
            Product::Other(name) => name,
        }
    }

    /// Names of the optional fields this stream records.
    pub fn extra_fields(&self) -> &'static [&'static str] {
        match self {
            Product::Aims => &["conductorLines", "numberOfPoints"],
            Product::Ivms => &[
                "benchmarkForTask",
                "lineMiles",
                "lineMilesH1V1",
                "dedicatedHoursH1V1",
                "lineMilesH1V0",
                "dedicatedHoursH1V0",
            ],
            Product::Isms => &[
                "siteName",
                "areaHectares",
                "polygonFeatureCount",
                "polylineFeatureCount",
                "pointFeatureCount",
                "spentHoursOnAboveTask",
                "density",
            ],
            Product::Rsms => &["timeField"],
            Product::Iems => &[
                "trackerUpdating",
                "dataQualityChecking",
                "trainingFeedback",
                "trnRemarks",
                "documentation",
                "docRemark",
                "othersMisc",
            ],
            Product::Imagery | Product::Other(_) => &[],
        }
    }
}

impl From<&str> for Product {
    fn from(raw: &str) -> Self {
        let trimmed = raw.trim();
        Product::KNOWN
            .into_iter()
            .find(|p| p.as_str().eq_ignore_ascii_case(trimmed))
            .unwrap_or_else(|| Product::Other(trimmed.to_string()))
    }
}

impl std::fmt::Display for Product {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Product {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Product {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(Product::from(raw.as_str()))
    }
}

/// One project line of a tracker submission.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectEntry {
    pub project_name: String,
    pub nature_of_work: String,
    pub task: String,
    #[serde(default, with = "lenient_f64")]
    pub dedicated_hours: Option<f64>,
    #[serde(default)]
    pub remarks: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub_task: Option<String>,
    /// Product-specific measurements keyed by their wire name.
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl ProjectEntry {
    /// Keep only the measurements `product` records; the rest are dropped.
    pub fn retain_product_fields(&mut self, product: &Product) {
        let allowed = product.extra_fields();
        self.fields.retain(|key, _| allowed.contains(&key.as_str()));
    }
}

/// Body of `POST /api/tracker`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackerSubmission {
    /// `YYYY-MM-DD`
    pub date: String,
    pub mode_of_functioning: String,
    pub pod_name: String,
    pub product: Product,
    pub projects: Vec<ProjectEntry>,
}

impl TrackerSubmission {
    pub fn total_hours(&self) -> f64 {
        self.projects.iter().filter_map(|p| p.dedicated_hours).sum()
    }
}

/// Server acknowledgement of a submission.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SubmissionReceipt {
    #[serde(default)]
    pub count: Option<u64>,
    #[serde(default)]
    pub id: Option<Value>,
    #[serde(default)]
    pub status: Option<String>,
}

/// Body of `POST /api/resource-planning`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourcePlan {
    pub date: String,
    pub pod_name: String,
    pub mode_of_functioning: String,
    pub product: String,
    pub project_name: String,
    pub nature_of_work: String,
    pub task: String,
}
