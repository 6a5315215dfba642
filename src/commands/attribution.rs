use crate::analysis::attribution::{analyze_ai_attribution, analyze_failed_prs};
use crate::commands::{db, run_blocking};
use crate::error::EngineError;
use crate::models::attribution::{AiAttribution, FailedPrAttribution};
use rusqlite::Connection;

pub async fn get_ai_attribution(data_dir: String, project_id: String) -> Result<AiAttribution, EngineError> {
    run_blocking(move || {
        let conn = db::get_db_connection(&data_dir)?;
        get_ai_attribution_internal(&conn, &project_id)
    })
    .await
}

pub async fn get_failed_pr_attribution(
    data_dir: String,
    project_id: String,
) -> Result<FailedPrAttribution, EngineError> {
    run_blocking(move || {
        let conn = db::get_db_connection(&data_dir)?;
        get_failed_pr_attribution_internal(&conn, &project_id)
    })
    .await
}

pub fn get_ai_attribution_internal(conn: &Connection, project_id: &str) -> Result<AiAttribution, EngineError> {
    let files = db::load_file_metrics(conn, project_id)?;
    let prs = db::load_pull_requests(conn, project_id)?;
    Ok(analyze_ai_attribution(&files, &prs))
}

pub fn get_failed_pr_attribution_internal(
    conn: &Connection,
    project_id: &str,
) -> Result<FailedPrAttribution, EngineError> {
    let prs = db::load_pull_requests(conn, project_id)?;
    Ok(analyze_failed_prs(&prs))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::rates::fixtures::{file, pr};
    use crate::commands::db::tests::memory_db;
    use crate::models::file_metric::FileMetric;

    #[test]
    fn attribution_reads_project_rows() {
        let conn = memory_db();
        let files = vec![
            FileMetric { ai_code_ratio: Some(0.8), ..file("a.rs", 10.0, 5.0) },
            FileMetric { ai_code_ratio: Some(0.3), ..file("b.rs", 20.0, 15.0) },
            FileMetric { ai_code_ratio: Some(0.6), ..file("c.rs", 8.0, 3.0) },
        ];
        db::upsert_file_metrics(&conn, &files).unwrap();
        db::upsert_pull_requests(&conn, &[pr(true, false, false), pr(false, true, false)]).unwrap();

        let result = get_ai_attribution_internal(&conn, "proj").unwrap();
        assert_eq!(result.summary.ai_file_count, 2);
        assert_eq!(result.summary.human_file_count, 1);
        assert_eq!(result.summary.ai_pr_count, 1);
        assert_eq!(result.quality.human_major_revision_rate, 1.0);

        let other = get_ai_attribution_internal(&conn, "someone-else").unwrap();
        assert_eq!(other.summary.ai_file_count, 0);
    }

    #[test]
    fn failed_prs_for_empty_project_are_zero() {
        let conn = memory_db();
        let result = get_failed_pr_attribution_internal(&conn, "proj").unwrap();
        assert_eq!(result.total_failed, 0);
        assert_eq!(result.major_revisions.count, 0);
    }
}
