use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttributionSummary {
    pub ai_file_count: usize,
    pub human_file_count: usize,
    pub ai_pr_count: usize,
    pub human_pr_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComplexityComparison {
    pub ai_avg_complexity: f64,
    pub human_avg_complexity: f64,
    pub ai_avg_change_frequency: f64,
    pub human_avg_change_frequency: f64,
    pub verdict: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StabilityComparison {
    pub ai_rollback_rate: f64,
    pub human_rollback_rate: f64,
    pub verdict: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QualityComparison {
    pub ai_major_revision_rate: f64,
    pub human_major_revision_rate: f64,
    pub ai_avg_review_rounds: f64,
    pub human_avg_review_rounds: f64,
}

/// AI-heavy vs human-heavy cohort comparison.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AiAttribution {
    pub summary: AttributionSummary,
    pub complexity: ComplexityComparison,
    pub stability: StabilityComparison,
    pub quality: QualityComparison,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CohortCount {
    pub count: usize,
    pub ai: usize,
    pub human: usize,
}

/// `total_failed` is `major_revisions.count + rollbacks.count`; a pull request
/// that is both is counted twice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FailedPrAttribution {
    pub total_failed: usize,
    pub major_revisions: CohortCount,
    pub rollbacks: CohortCount,
    pub high_review_rounds: CohortCount,
}
