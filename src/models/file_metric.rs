use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileMetric {
    pub project_id: String,
    pub file_path: String,
    pub cyclomatic_complexity: f64,
    /// Touches in the trailing 90-day window.
    pub change_frequency_90d: f64,
    pub author_count: u32,
    pub ai_code_ratio: Option<f64>, // [0, 1], None when the collector could not attribute
    pub updated_at: i64,
}

impl FileMetric {
    /// Missing attribution counts as fully human-written.
    pub fn ai_ratio_or_zero(&self) -> f64 {
        self.ai_code_ratio.unwrap_or(0.0)
    }
}
