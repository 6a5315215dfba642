use crate::analysis::rules::{matching_rules, DecisionRule, RuleInputs, DECISION_RULES};
use crate::cache::{self, SharedOverviewCache};
use crate::commands::metrics::compute_metrics;
use crate::commands::settings::{load_effective_settings, EffectiveEngineSettings};
use crate::commands::{db, run_blocking};
use crate::error::EngineError;
use crate::models::decision::{Decision, DecisionStatus};
use crate::models::metrics::MetricResult;
use rusqlite::Connection;

pub async fn generate_decisions(
    data_dir: String,
    project_id: String,
    cache: SharedOverviewCache,
) -> Result<Vec<Decision>, EngineError> {
    run_blocking(move || {
        let settings = load_effective_settings(&data_dir)?;
        let conn = db::get_db_connection(&data_dir)?;
        generate_decisions_internal(&conn, &project_id, &settings, &cache)
    })
    .await
}

pub async fn list_decisions(data_dir: String, project_id: String) -> Result<Vec<Decision>, EngineError> {
    run_blocking(move || {
        let conn = db::get_db_connection(&data_dir)?;
        list_decisions_internal(&conn, &project_id)
    })
    .await
}

pub async fn update_decision_status(
    data_dir: String,
    decision_id: String,
    status: String,
    cache: SharedOverviewCache,
) -> Result<Decision, EngineError> {
    run_blocking(move || {
        let conn = db::get_db_connection(&data_dir)?;
        update_decision_status_internal(&conn, &decision_id, &status, &cache)
    })
    .await
}

pub fn rule_inputs(result: &MetricResult) -> RuleInputs {
    RuleInputs {
        ai_success_rate: result.ai_success_rate,
        psri_score: result.psri.score,
        hotspot_files: result.hotspot_files,
        tdi: result.tdi,
    }
}

/// Recomputes scores independently of any stored snapshot and persists one
/// new decision per matching rule. Repeated calls create duplicate rows.
pub fn generate_decisions_internal(
    conn: &Connection,
    project_id: &str,
    settings: &EffectiveEngineSettings,
    cache: &SharedOverviewCache,
) -> Result<Vec<Decision>, EngineError> {
    let result = compute_metrics(conn, project_id, settings)?;
    let created = persist_matching_rules(conn, project_id, &DECISION_RULES, &rule_inputs(&result))?;

    log::info!("generated {} decisions for {project_id}", created.len());
    if !created.is_empty() {
        cache::invalidate_project(cache, project_id);
    }
    Ok(created)
}

pub fn persist_matching_rules(
    conn: &Connection,
    project_id: &str,
    rules: &[DecisionRule],
    inputs: &RuleInputs,
) -> Result<Vec<Decision>, EngineError> {
    let mut created = Vec::new();
    for rule in matching_rules(rules, inputs) {
        let decision = Decision {
            id: uuid::Uuid::new_v4().to_string(),
            project_id: project_id.to_string(),
            level: rule.level,
            category: rule.category.as_str().to_string(),
            title: rule.title.to_string(),
            description: rule.description.to_string(),
            priority: rule.priority,
            status: DecisionStatus::Pending,
            created_at: db::now_millis(),
        };
        db::insert_decision(conn, &decision)?;
        log::debug!("decision {} ({}) created for {project_id}", decision.id, rule.title);
        created.push(decision);
    }
    Ok(created)
}

pub fn list_decisions_internal(conn: &Connection, project_id: &str) -> Result<Vec<Decision>, EngineError> {
    Ok(db::list_decisions(conn, project_id)?)
}

/// Any transition between the three statuses is allowed. Validation and
/// lookup both happen before the row is touched.
pub fn update_decision_status_internal(
    conn: &Connection,
    decision_id: &str,
    status: &str,
    cache: &SharedOverviewCache,
) -> Result<Decision, EngineError> {
    let status: DecisionStatus = status.parse()?;
    let mut decision = db::load_decision(conn, decision_id)?
        .ok_or_else(|| EngineError::not_found("decision", decision_id))?;

    db::update_decision_status_row(conn, decision_id, status)?;
    log::info!("decision {decision_id} moved {} -> {status}", decision.status);
    decision.status = status;

    cache::invalidate_project(cache, &decision.project_id);
    Ok(decision)
}
