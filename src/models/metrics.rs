use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PsriResult {
    pub score: Option<f64>,
    pub structural: Option<f64>,
    pub change: Option<f64>,
    pub defect: Option<f64>,
}

impl PsriResult {
    pub fn empty() -> Self {
        Self::default()
    }
}

/// Freshly computed scores for one project, returned by a recompute.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricResult {
    pub project_id: String,
    pub ai_success_rate: Option<f64>,
    pub ai_stable_rate: Option<f64>,
    pub psri: PsriResult,
    pub tdi: Option<f64>,
    pub total_prs: usize,
    pub ai_prs: usize,
    pub total_files: usize,
    pub hotspot_files: usize,
    pub computed_at: i64,
}
