use crate::analysis::{hotspots, psri, rates, tdi};
use crate::cache::{self, OverviewCache, SharedOverviewCache};
use crate::commands::settings::{load_effective_settings, EffectiveEngineSettings};
use crate::commands::{db, run_blocking};
use crate::error::EngineError;
use crate::models::decision::DecisionStatus;
use crate::models::file_metric::FileMetric;
use crate::models::metrics::{MetricResult, PsriResult};
use crate::models::overview::ProjectOverview;
use crate::models::pull_request::PullRequest;
use crate::models::snapshot::MetricSnapshot;
use crate::models::weights::WeightConfig;
use rusqlite::Connection;

const OVERVIEW_HOTSPOT_LIMIT: usize = 10;

pub async fn compute_ai_success_rate(data_dir: String, project_id: String) -> Result<Option<f64>, EngineError> {
    run_blocking(move || {
        let conn = db::get_db_connection(&data_dir)?;
        compute_ai_success_rate_internal(&conn, &project_id)
    })
    .await
}

pub async fn compute_ai_stable_rate(data_dir: String, project_id: String) -> Result<Option<f64>, EngineError> {
    run_blocking(move || {
        let conn = db::get_db_connection(&data_dir)?;
        compute_ai_stable_rate_internal(&conn, &project_id)
    })
    .await
}

pub async fn compute_psri(data_dir: String, project_id: String) -> Result<PsriResult, EngineError> {
    run_blocking(move || {
        let conn = db::get_db_connection(&data_dir)?;
        compute_psri_internal(&conn, &project_id)
    })
    .await
}

pub async fn compute_and_save_snapshot(
    data_dir: String,
    project_id: String,
    cache: SharedOverviewCache,
) -> Result<MetricResult, EngineError> {
    run_blocking(move || {
        let settings = load_effective_settings(&data_dir)?;
        let conn = db::get_db_connection(&data_dir)?;
        compute_and_save_snapshot_internal(&conn, &project_id, &settings, &cache)
    })
    .await
}

pub async fn get_overview(
    data_dir: String,
    project_id: String,
    cache: SharedOverviewCache,
) -> Result<ProjectOverview, EngineError> {
    run_blocking(move || {
        let settings = load_effective_settings(&data_dir)?;
        let conn = db::get_db_connection(&data_dir)?;
        get_overview_internal(&conn, &project_id, &settings, &cache)
    })
    .await
}

pub async fn get_weight_config(data_dir: String, project_id: String) -> Result<WeightConfig, EngineError> {
    run_blocking(move || {
        let conn = db::get_db_connection(&data_dir)?;
        get_weight_config_internal(&conn, &project_id)
    })
    .await
}

pub async fn save_weight_config(
    data_dir: String,
    project_id: String,
    weights: WeightConfig,
) -> Result<WeightConfig, EngineError> {
    run_blocking(move || {
        let conn = db::get_db_connection(&data_dir)?;
        save_weight_config_internal(&conn, &project_id, weights)
    })
    .await
}

pub fn compute_ai_success_rate_internal(conn: &Connection, project_id: &str) -> Result<Option<f64>, EngineError> {
    let prs = db::load_pull_requests(conn, project_id)?;
    Ok(rates::ai_success_rate(&prs))
}

pub fn compute_ai_stable_rate_internal(conn: &Connection, project_id: &str) -> Result<Option<f64>, EngineError> {
    let prs = db::load_pull_requests(conn, project_id)?;
    Ok(rates::ai_stable_rate(&prs))
}

pub fn compute_psri_internal(conn: &Connection, project_id: &str) -> Result<PsriResult, EngineError> {
    let files = db::load_file_metrics(conn, project_id)?;
    let prs = db::load_pull_requests(conn, project_id)?;
    let weights = get_weight_config_internal(conn, project_id)?;
    Ok(psri::compute_psri(&files, &prs, &weights))
}

/// Stored weights, or the documented defaults when the project has none.
pub fn get_weight_config_internal(conn: &Connection, project_id: &str) -> Result<WeightConfig, EngineError> {
    Ok(db::load_weight_config(conn, project_id)?.unwrap_or_default())
}

pub fn save_weight_config_internal(
    conn: &Connection,
    project_id: &str,
    weights: WeightConfig,
) -> Result<WeightConfig, EngineError> {
    weights.validate()?;
    db::upsert_weight_config(conn, project_id, &weights)?;
    log::info!("saved weight config for {project_id}");

    let inert: Vec<&str> = weights
        .weighted_inert_dimensions()
        .into_iter()
        .map(|d| d.as_str())
        .collect();
    if !inert.is_empty() {
        log::info!("weights {} are stored for {project_id} but do not enter PSRI", inert.join(", "));
    }
    Ok(weights)
}

/// Reads the project's records and derives every score. Nothing is written.
pub fn compute_metrics(
    conn: &Connection,
    project_id: &str,
    settings: &EffectiveEngineSettings,
) -> Result<MetricResult, EngineError> {
    let files = db::load_file_metrics(conn, project_id)?;
    let prs = db::load_pull_requests(conn, project_id)?;
    let weights = get_weight_config_internal(conn, project_id)?;
    Ok(build_metric_result(project_id, &files, &prs, &weights, settings))
}

fn build_metric_result(
    project_id: &str,
    files: &[FileMetric],
    prs: &[PullRequest],
    weights: &WeightConfig,
    settings: &EffectiveEngineSettings,
) -> MetricResult {
    MetricResult {
        project_id: project_id.to_string(),
        ai_success_rate: rates::ai_success_rate(prs),
        ai_stable_rate: rates::ai_stable_rate(prs),
        psri: psri::compute_psri(files, prs, weights),
        tdi: tdi::compute_tdi(files),
        total_prs: prs.len(),
        ai_prs: prs.iter().filter(|pr| pr.ai_used).count(),
        total_files: files.len(),
        hotspot_files: hotspots::count_hotspots(files, &settings.hotspots),
        computed_at: db::now_millis(),
    }
}

/// Recompute, append one snapshot, then drop the project's cached overviews.
/// Returns the computed result rather than re-reading the stored row.
pub fn compute_and_save_snapshot_internal(
    conn: &Connection,
    project_id: &str,
    settings: &EffectiveEngineSettings,
    cache: &SharedOverviewCache,
) -> Result<MetricResult, EngineError> {
    let result = compute_metrics(conn, project_id, settings)?;
    let snapshot_id = db::insert_snapshot(conn, &snapshot_from_result(&result))?;
    log::info!(
        "snapshot {snapshot_id} saved for {project_id}: {} prs, {} files, {} hotspots",
        result.total_prs,
        result.total_files,
        result.hotspot_files
    );

    cache::invalidate_project(cache, project_id);
    Ok(result)
}

pub fn snapshot_from_result(result: &MetricResult) -> MetricSnapshot {
    MetricSnapshot {
        id: 0,
        project_id: result.project_id.clone(),
        ai_success_rate: result.ai_success_rate,
        ai_stable_rate: result.ai_stable_rate,
        psri_score: result.psri.score,
        psri_structural: result.psri.structural,
        psri_change: result.psri.change,
        psri_defect: result.psri.defect,
        tdi: result.tdi,
        total_prs: result.total_prs,
        ai_prs: result.ai_prs,
        total_files: result.total_files,
        hotspot_files: result.hotspot_files,
        snapshot_date: result.computed_at,
    }
}

pub fn get_overview_internal(
    conn: &Connection,
    project_id: &str,
    settings: &EffectiveEngineSettings,
    cache: &SharedOverviewCache,
) -> Result<ProjectOverview, EngineError> {
    let key = OverviewCache::key(project_id, settings.trend_limit);
    if let Ok(mut lock) = cache.lock() {
        lock.set_ttl(settings.overview_cache_ttl);
        if let Some(hit) = lock.get(&key) {
            log::debug!("overview cache hit for {project_id}");
            return Ok(hit);
        }
    }

    let trend = db::list_snapshots(conn, project_id, settings.trend_limit)?;
    let files = db::load_file_metrics(conn, project_id)?;
    let overview = ProjectOverview {
        project_id: project_id.to_string(),
        latest_snapshot: trend.last().cloned(),
        trend,
        pending_decisions: db::count_decisions_with_status(conn, project_id, DecisionStatus::Pending)?,
        top_hotspots: hotspots::top_hotspots(&files, &settings.hotspots, OVERVIEW_HOTSPOT_LIMIT),
    };

    if let Ok(mut lock) = cache.lock() {
        lock.put(key, overview.clone());
    }
    Ok(overview)
}
