use crate::models::decision::{Decision, DecisionLevel, DecisionStatus};
use crate::models::file_metric::FileMetric;
use crate::models::pull_request::PullRequest;
use crate::models::snapshot::MetricSnapshot;
use crate::models::weights::WeightConfig;
use rusqlite::{params, Connection, OptionalExtension, Result, Row};
use std::path::Path;

const DB_SCHEMA_VERSION: i64 = 1;

pub const DATA_DIR_NAME: &str = ".insightlens";

pub fn initialize_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "PRAGMA foreign_keys = ON;
         PRAGMA journal_mode = WAL;
         PRAGMA synchronous = NORMAL;",
    )?;

    let version: i64 = conn.pragma_query_value(None, "user_version", |row| row.get(0))?;

    if version < 1 {
        apply_migration_1(conn)?;
        conn.pragma_update(None, "user_version", DB_SCHEMA_VERSION)?;
    } else if version > DB_SCHEMA_VERSION {
        log::warn!("metrics.db schema v{version} is newer than v{DB_SCHEMA_VERSION}; reading known columns only");
    }

    Ok(())
}

fn apply_migration_1(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS pull_requests (
            id TEXT PRIMARY KEY,
            project_id TEXT NOT NULL,
            number INTEGER NOT NULL DEFAULT 0,
            title TEXT NOT NULL DEFAULT '',
            author_login TEXT NOT NULL DEFAULT '',
            ai_used INTEGER NOT NULL DEFAULT 0,
            major_revision INTEGER NOT NULL DEFAULT 0,
            rollback_flag INTEGER NOT NULL DEFAULT 0,
            review_rounds INTEGER NOT NULL DEFAULT 0,
            merged_at INTEGER,
            created_at INTEGER NOT NULL DEFAULT 0
        );

        CREATE TABLE IF NOT EXISTS file_metrics (
            project_id TEXT NOT NULL,
            file_path TEXT NOT NULL,
            cyclomatic_complexity REAL NOT NULL DEFAULT 0,
            change_frequency_90d REAL NOT NULL DEFAULT 0,
            author_count INTEGER NOT NULL DEFAULT 0,
            ai_code_ratio REAL CHECK(ai_code_ratio IS NULL OR (ai_code_ratio >= 0 AND ai_code_ratio <= 1)),
            updated_at INTEGER NOT NULL DEFAULT 0,
            PRIMARY KEY (project_id, file_path)
        );

        CREATE TABLE IF NOT EXISTS weight_configs (
            project_id TEXT PRIMARY KEY,
            structural REAL NOT NULL,
            change REAL NOT NULL,
            defect REAL NOT NULL,
            architecture REAL NOT NULL,
            runtime REAL NOT NULL,
            coverage REAL NOT NULL,
            updated_at INTEGER NOT NULL DEFAULT 0
        );

        CREATE TABLE IF NOT EXISTS metric_snapshots (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            project_id TEXT NOT NULL,
            ai_success_rate REAL,
            ai_stable_rate REAL,
            psri_score REAL,
            psri_structural REAL,
            psri_change REAL,
            psri_defect REAL,
            tdi REAL,
            total_prs INTEGER NOT NULL DEFAULT 0,
            ai_prs INTEGER NOT NULL DEFAULT 0,
            total_files INTEGER NOT NULL DEFAULT 0,
            hotspot_files INTEGER NOT NULL DEFAULT 0,
            snapshot_date INTEGER NOT NULL
        );

        CREATE TABLE IF NOT EXISTS decisions (
            id TEXT PRIMARY KEY,
            project_id TEXT NOT NULL,
            level TEXT NOT NULL CHECK(level IN ('INFO', 'WARNING', 'CRITICAL')),
            category TEXT NOT NULL,
            title TEXT NOT NULL,
            description TEXT NOT NULL,
            priority INTEGER NOT NULL DEFAULT 0,
            status TEXT NOT NULL CHECK(status IN ('PENDING', 'ACCEPTED', 'REJECTED')) DEFAULT 'PENDING',
            created_at INTEGER NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_pull_requests_project ON pull_requests(project_id);
        CREATE INDEX IF NOT EXISTS idx_metric_snapshots_project_date ON metric_snapshots(project_id, snapshot_date);
        CREATE INDEX IF NOT EXISTS idx_decisions_project_priority ON decisions(project_id, priority, created_at);
        ",
    )
}

/// Opens `<data_dir>/.insightlens/metrics.db`, creating the directory and schema.
pub fn get_db_connection(data_dir: &str) -> std::result::Result<Connection, crate::error::EngineError> {
    let dir = Path::new(data_dir).join(DATA_DIR_NAME);
    std::fs::create_dir_all(&dir)?;
    let conn = Connection::open(dir.join("metrics.db"))?;
    initialize_schema(&conn)?;
    Ok(conn)
}

pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

// ---------------------------------------------------------------------------
// Collector-side writes
// ---------------------------------------------------------------------------

pub fn upsert_pull_requests(conn: &Connection, prs: &[PullRequest]) -> Result<()> {
    let tx = conn.unchecked_transaction()?;
    for pr in prs {
        tx.execute(
            "
            INSERT INTO pull_requests (
                id, project_id, number, title, author_login, ai_used,
                major_revision, rollback_flag, review_rounds, merged_at, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
            ON CONFLICT(id) DO UPDATE SET
                project_id = excluded.project_id,
                number = excluded.number,
                title = excluded.title,
                author_login = excluded.author_login,
                ai_used = excluded.ai_used,
                major_revision = excluded.major_revision,
                rollback_flag = excluded.rollback_flag,
                review_rounds = excluded.review_rounds,
                merged_at = excluded.merged_at,
                created_at = excluded.created_at
            ",
            params![
                pr.id,
                pr.project_id,
                pr.number,
                pr.title,
                pr.author_login,
                pr.ai_used,
                pr.major_revision,
                pr.rollback_flag,
                pr.review_rounds,
                pr.merged_at,
                pr.created_at,
            ],
        )?;
    }
    tx.commit()
}

pub fn upsert_file_metrics(conn: &Connection, files: &[FileMetric]) -> Result<()> {
    let tx = conn.unchecked_transaction()?;
    for file in files {
        tx.execute(
            "
            INSERT INTO file_metrics (
                project_id, file_path, cyclomatic_complexity, change_frequency_90d,
                author_count, ai_code_ratio, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            ON CONFLICT(project_id, file_path) DO UPDATE SET
                cyclomatic_complexity = excluded.cyclomatic_complexity,
                change_frequency_90d = excluded.change_frequency_90d,
                author_count = excluded.author_count,
                ai_code_ratio = excluded.ai_code_ratio,
                updated_at = excluded.updated_at
            ",
            params![
                file.project_id,
                file.file_path,
                file.cyclomatic_complexity,
                file.change_frequency_90d,
                file.author_count,
                file.ai_code_ratio,
                file.updated_at,
            ],
        )?;
    }
    tx.commit()
}

// ---------------------------------------------------------------------------
// Engine reads
// ---------------------------------------------------------------------------

pub fn load_pull_requests(conn: &Connection, project_id: &str) -> Result<Vec<PullRequest>> {
    let mut stmt = conn.prepare(
        "SELECT id, project_id, number, title, author_login, ai_used, major_revision, rollback_flag, review_rounds, merged_at, created_at
         FROM pull_requests WHERE project_id = ?1 ORDER BY created_at ASC, id ASC",
    )?;

    let rows = stmt.query_map(params![project_id], |row| {
        Ok(PullRequest {
            id: row.get(0)?,
            project_id: row.get(1)?,
            number: row.get(2)?,
            title: row.get(3)?,
            author_login: row.get(4)?,
            ai_used: row.get(5)?,
            major_revision: row.get(6)?,
            rollback_flag: row.get(7)?,
            review_rounds: row.get(8)?,
            merged_at: row.get(9)?,
            created_at: row.get(10)?,
        })
    })?;
    rows.collect()
}

pub fn load_file_metrics(conn: &Connection, project_id: &str) -> Result<Vec<FileMetric>> {
    let mut stmt = conn.prepare(
        "SELECT project_id, file_path, cyclomatic_complexity, change_frequency_90d, author_count, ai_code_ratio, updated_at
         FROM file_metrics WHERE project_id = ?1 ORDER BY file_path ASC",
    )?;

    let rows = stmt.query_map(params![project_id], |row| {
        Ok(FileMetric {
            project_id: row.get(0)?,
            file_path: row.get(1)?,
            cyclomatic_complexity: row.get(2)?,
            change_frequency_90d: row.get(3)?,
            author_count: row.get(4)?,
            ai_code_ratio: row.get(5)?,
            updated_at: row.get(6)?,
        })
    })?;
    rows.collect()
}

pub fn load_weight_config(conn: &Connection, project_id: &str) -> Result<Option<WeightConfig>> {
    conn.query_row(
        "SELECT structural, change, defect, architecture, runtime, coverage FROM weight_configs WHERE project_id = ?1",
        params![project_id],
        |row| {
            Ok(WeightConfig {
                structural: row.get(0)?,
                change: row.get(1)?,
                defect: row.get(2)?,
                architecture: row.get(3)?,
                runtime: row.get(4)?,
                coverage: row.get(5)?,
            })
        },
    )
    .optional()
}

/// Callers validate before writing.
pub fn upsert_weight_config(conn: &Connection, project_id: &str, weights: &WeightConfig) -> Result<()> {
    conn.execute(
        "
        INSERT INTO weight_configs (project_id, structural, change, defect, architecture, runtime, coverage, updated_at)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
        ON CONFLICT(project_id) DO UPDATE SET
            structural = excluded.structural,
            change = excluded.change,
            defect = excluded.defect,
            architecture = excluded.architecture,
            runtime = excluded.runtime,
            coverage = excluded.coverage,
            updated_at = excluded.updated_at
        ",
        params![
            project_id,
            weights.structural,
            weights.change,
            weights.defect,
            weights.architecture,
            weights.runtime,
            weights.coverage,
            now_millis(),
        ],
    )?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Snapshots
// ---------------------------------------------------------------------------

/// Appends a snapshot; `snapshot.id` is ignored and the assigned id returned.
pub fn insert_snapshot(conn: &Connection, snapshot: &MetricSnapshot) -> Result<i64> {
    conn.execute(
        "INSERT INTO metric_snapshots (
            project_id, ai_success_rate, ai_stable_rate, psri_score, psri_structural, psri_change,
            psri_defect, tdi, total_prs, ai_prs, total_files, hotspot_files, snapshot_date
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)",
        params![
            snapshot.project_id,
            snapshot.ai_success_rate,
            snapshot.ai_stable_rate,
            snapshot.psri_score,
            snapshot.psri_structural,
            snapshot.psri_change,
            snapshot.psri_defect,
            snapshot.tdi,
            snapshot.total_prs as i64,
            snapshot.ai_prs as i64,
            snapshot.total_files as i64,
            snapshot.hotspot_files as i64,
            snapshot.snapshot_date,
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

/// The latest `limit` snapshots, oldest first.
pub fn list_snapshots(conn: &Connection, project_id: &str, limit: usize) -> Result<Vec<MetricSnapshot>> {
    let mut stmt = conn.prepare(
        "SELECT * FROM (
            SELECT id, project_id, ai_success_rate, ai_stable_rate, psri_score, psri_structural, psri_change,
                   psri_defect, tdi, total_prs, ai_prs, total_files, hotspot_files, snapshot_date
            FROM metric_snapshots WHERE project_id = ?1
            ORDER BY snapshot_date DESC, id DESC LIMIT ?2
        ) ORDER BY snapshot_date ASC, id ASC",
    )?;

    let rows = stmt.query_map(params![project_id, limit as i64], snapshot_from_row)?;
    rows.collect()
}

fn snapshot_from_row(row: &Row<'_>) -> Result<MetricSnapshot> {
    Ok(MetricSnapshot {
        id: row.get(0)?,
        project_id: row.get(1)?,
        ai_success_rate: row.get(2)?,
        ai_stable_rate: row.get(3)?,
        psri_score: row.get(4)?,
        psri_structural: row.get(5)?,
        psri_change: row.get(6)?,
        psri_defect: row.get(7)?,
        tdi: row.get(8)?,
        total_prs: row.get::<_, i64>(9)? as usize,
        ai_prs: row.get::<_, i64>(10)? as usize,
        total_files: row.get::<_, i64>(11)? as usize,
        hotspot_files: row.get::<_, i64>(12)? as usize,
        snapshot_date: row.get(13)?,
    })
}

// ---------------------------------------------------------------------------
// Decisions
// ---------------------------------------------------------------------------

pub fn insert_decision(conn: &Connection, decision: &Decision) -> Result<()> {
    conn.execute(
        "INSERT INTO decisions (id, project_id, level, category, title, description, priority, status, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        params![
            decision.id,
            decision.project_id,
            decision.level.as_str(),
            decision.category,
            decision.title,
            decision.description,
            decision.priority,
            decision.status.as_str(),
            decision.created_at,
        ],
    )?;
    Ok(())
}

pub fn load_decision(conn: &Connection, id: &str) -> Result<Option<Decision>> {
    conn.query_row(
        "SELECT id, project_id, level, category, title, description, priority, status, created_at
         FROM decisions WHERE id = ?1",
        params![id],
        decision_from_row,
    )
    .optional()
}

/// Priority descending, then newest first; rows inserted later win exact ties.
pub fn list_decisions(conn: &Connection, project_id: &str) -> Result<Vec<Decision>> {
    let mut stmt = conn.prepare(
        "SELECT id, project_id, level, category, title, description, priority, status, created_at
         FROM decisions WHERE project_id = ?1
         ORDER BY priority DESC, created_at DESC, rowid DESC",
    )?;

    let rows = stmt.query_map(params![project_id], decision_from_row)?;
    rows.collect()
}

pub fn count_decisions_with_status(conn: &Connection, project_id: &str, status: DecisionStatus) -> Result<usize> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM decisions WHERE project_id = ?1 AND status = ?2",
        params![project_id, status.as_str()],
        |row| row.get(0),
    )?;
    Ok(count as usize)
}

pub fn update_decision_status_row(conn: &Connection, id: &str, status: DecisionStatus) -> Result<usize> {
    conn.execute(
        "UPDATE decisions SET status = ?2 WHERE id = ?1",
        params![id, status.as_str()],
    )
}

fn decision_from_row(row: &Row<'_>) -> Result<Decision> {
    let level: String = row.get(2)?;
    let status: String = row.get(7)?;
    Ok(Decision {
        id: row.get(0)?,
        project_id: row.get(1)?,
        level: parse_level(&level).ok_or_else(|| invalid_text(2, "level", &level))?,
        category: row.get(3)?,
        title: row.get(4)?,
        description: row.get(5)?,
        priority: row.get(6)?,
        status: status
            .parse::<DecisionStatus>()
            .map_err(|_| invalid_text(7, "status", &status))?,
        created_at: row.get(8)?,
    })
}

fn parse_level(raw: &str) -> Option<DecisionLevel> {
    match raw {
        "INFO" => Some(DecisionLevel::Info),
        "WARNING" => Some(DecisionLevel::Warning),
        "CRITICAL" => Some(DecisionLevel::Critical),
        _ => None,
    }
}

fn invalid_text(column: usize, name: &str, value: &str) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(
        column,
        rusqlite::types::Type::Text,
        format!("unexpected {name} {value:?}").into(),
    )
}
