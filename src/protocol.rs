//! JSON-lines request/response contract for driving the engine as a subprocess.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::cache::SharedOverviewCache;
use crate::commands::{attribution, decisions, metrics, settings};
use crate::error::EngineError;
use crate::models::weights::WeightConfig;

/// One request line. Unknown fields are ignored.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum Request {
    ComputeAiSuccessRate { project_id: String },
    ComputeAiStableRate { project_id: String },
    ComputePsri { project_id: String },
    ComputeAndSaveSnapshot { project_id: String },
    GetOverview { project_id: String },
    GetAiAttribution { project_id: String },
    GetFailedPrAttribution { project_id: String },
    GenerateDecisions { project_id: String },
    ListDecisions { project_id: String },
    UpdateDecisionStatus { decision_id: String, status: String },
    GetWeightConfig { project_id: String },
    SaveWeightConfig { project_id: String, weights: WeightConfig },
    GetSettings,
    SaveSettings { settings: Value },
}

#[derive(Debug, Clone, Serialize)]
pub struct OkOutput {
    pub ok: bool,
    pub result: Value,
}

/// Structured error line. `kind` is `validation`, `not_found`, `parse` or `internal`.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorOutput {
    pub error: bool,
    pub kind: String,
    pub message: String,
}

impl ErrorOutput {
    pub fn new(kind: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: true,
            kind: kind.into(),
            message: message.into(),
        }
    }
}

impl From<&EngineError> for ErrorOutput {
    fn from(e: &EngineError) -> Self {
        Self::new(e.kind(), e.to_string())
    }
}

pub async fn handle(request: Request, data_dir: &str, cache: &SharedOverviewCache) -> Result<Value, EngineError> {
    let dir = data_dir.to_string();
    let value = match request {
        Request::ComputeAiSuccessRate { project_id } => {
            serde_json::to_value(metrics::compute_ai_success_rate(dir, project_id).await?)?
        }
        Request::ComputeAiStableRate { project_id } => {
            serde_json::to_value(metrics::compute_ai_stable_rate(dir, project_id).await?)?
        }
        Request::ComputePsri { project_id } => serde_json::to_value(metrics::compute_psri(dir, project_id).await?)?,
        Request::ComputeAndSaveSnapshot { project_id } => serde_json::to_value(
            metrics::compute_and_save_snapshot(dir, project_id, cache.clone()).await?,
        )?,
        Request::GetOverview { project_id } => {
            serde_json::to_value(metrics::get_overview(dir, project_id, cache.clone()).await?)?
        }
        Request::GetAiAttribution { project_id } => {
            serde_json::to_value(attribution::get_ai_attribution(dir, project_id).await?)?
        }
        Request::GetFailedPrAttribution { project_id } => {
            serde_json::to_value(attribution::get_failed_pr_attribution(dir, project_id).await?)?
        }
        Request::GenerateDecisions { project_id } => serde_json::to_value(
            decisions::generate_decisions(dir, project_id, cache.clone()).await?,
        )?,
        Request::ListDecisions { project_id } => {
            serde_json::to_value(decisions::list_decisions(dir, project_id).await?)?
        }
        Request::UpdateDecisionStatus { decision_id, status } => serde_json::to_value(
            decisions::update_decision_status(dir, decision_id, status, cache.clone()).await?,
        )?,
        Request::GetWeightConfig { project_id } => {
            serde_json::to_value(metrics::get_weight_config(dir, project_id).await?)?
        }
        Request::SaveWeightConfig { project_id, weights } => {
            serde_json::to_value(metrics::save_weight_config(dir, project_id, weights).await?)?
        }
        Request::GetSettings => settings::get_settings(dir).await?,
        Request::SaveSettings { settings: incoming } => settings::save_settings(dir, incoming).await?,
    };
    Ok(value)
}

/// Parse and answer one input line. Blank lines yield `None`.
pub async fn handle_line(line: &str, data_dir: &str, cache: &SharedOverviewCache) -> Option<String> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return None;
    }

    let output = match serde_json::from_str::<Request>(trimmed) {
        Ok(request) => match handle(request, data_dir, cache).await {
            Ok(result) => serde_json::to_string(&OkOutput { ok: true, result }),
            Err(e) => {
                log::warn!("request failed: {e}");
                serde_json::to_string(&ErrorOutput::from(&e))
            }
        },
        Err(e) => serde_json::to_string(&ErrorOutput::new("parse", format!("json parse: {e}"))),
    };

    Some(output.unwrap_or_else(|e| fallback_error_line(&e.to_string())))
}

fn fallback_error_line(message: &str) -> String {
    json!({ "error": true, "kind": "internal", "message": message }).to_string()
}
