use serde::{Deserialize, Serialize};

use crate::models::snapshot::MetricSnapshot;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HotspotFile {
    pub file_path: String,
    pub cyclomatic_complexity: f64,
    pub change_frequency_90d: f64,
    pub hotspot_score: f64,
}

/// Dashboard read model, memoised by the overview cache.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectOverview {
    pub project_id: String,
    pub latest_snapshot: Option<MetricSnapshot>,
    pub trend: Vec<MetricSnapshot>,
    pub pending_decisions: usize,
    pub top_hotspots: Vec<HotspotFile>,
}
