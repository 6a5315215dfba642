use serde::{Deserialize, Serialize};

/// Immutable point-in-time aggregate, appended once per recompute.
/// Field names are consumed verbatim by trend charts and CSV/JSON exports.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricSnapshot {
    pub id: i64,
    pub project_id: String,
    pub ai_success_rate: Option<f64>,
    pub ai_stable_rate: Option<f64>,
    pub psri_score: Option<f64>,
    pub psri_structural: Option<f64>,
    pub psri_change: Option<f64>,
    pub psri_defect: Option<f64>,
    pub tdi: Option<f64>,
    pub total_prs: usize,
    pub ai_prs: usize,
    pub total_files: usize,
    pub hotspot_files: usize,
    pub snapshot_date: i64, // unix millis
}
