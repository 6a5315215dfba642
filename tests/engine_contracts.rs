use serde_json::json;
use std::time::Duration;
use tempfile::TempDir;
use insightlens_lib::commands::attribution::{get_ai_attribution, get_failed_pr_attribution};
use insightlens_lib::commands::db::{get_db_connection, insert_decision, load_decision, upsert_file_metrics, upsert_pull_requests};
use insightlens_lib::commands::decisions::{generate_decisions, list_decisions, update_decision_status};
use insightlens_lib::commands::metrics::{
    compute_ai_stable_rate, compute_ai_success_rate, compute_and_save_snapshot, compute_psri, get_overview,
    get_weight_config, save_weight_config,
};
use insightlens_lib::commands::settings::{get_settings, save_settings};
use insightlens_lib::models::decision::{Decision, DecisionLevel, DecisionStatus};
use insightlens_lib::models::file_metric::FileMetric;
use insightlens_lib::models::pull_request::PullRequest;
use insightlens_lib::models::weights::WeightConfig;
use insightlens_lib::{OverviewCache, SharedOverviewCache};

const PROJECT: &str = "acme-api";

fn create_data_dir() -> (TempDir, String) {
    let temp_dir = tempfile::tempdir().expect("create temp dir");
    let data_dir = temp_dir.path().to_string_lossy().to_string();
    (temp_dir, data_dir)
}

fn cache() -> SharedOverviewCache {
    OverviewCache::shared(Duration::from_secs(60))
}

fn pr(n: i64, ai_used: bool, major_revision: bool, rollback_flag: bool) -> PullRequest {
    PullRequest {
        id: format!("{PROJECT}-pr-{n}"),
        project_id: PROJECT.to_string(),
        number: n,
        title: format!("Change #{n}"),
        author_login: "dev".to_string(),
        ai_used,
        major_revision,
        rollback_flag,
        review_rounds: 1,
        merged_at: Some(1_700_000_000_000 + n),
        created_at: 1_700_000_000_000 + n,
    }
}

fn file(path: &str, complexity: f64, change_frequency: f64, ai_code_ratio: Option<f64>) -> FileMetric {
    FileMetric {
        project_id: PROJECT.to_string(),
        file_path: path.to_string(),
        cyclomatic_complexity: complexity,
        change_frequency_90d: change_frequency,
        author_count: 2,
        ai_code_ratio,
        updated_at: 0,
    }
}

fn seed(data_dir: &str, prs: &[PullRequest], files: &[FileMetric]) {
    let conn = get_db_connection(data_dir).expect("open db");
    upsert_pull_requests(&conn, prs).expect("seed prs");
    upsert_file_metrics(&conn, files).expect("seed files");
}

#[tokio::test]
async fn rates_are_null_without_ai_prs() {
    let (_tmp, data_dir) = create_data_dir();
    seed(&data_dir, &[pr(1, false, true, true), pr(2, false, false, false)], &[]);

    let success = compute_ai_success_rate(data_dir.clone(), PROJECT.to_string())
        .await
        .expect("success rate");
    let stable = compute_ai_stable_rate(data_dir.clone(), PROJECT.to_string())
        .await
        .expect("stable rate");
    assert_eq!(success, None);
    assert_eq!(stable, None);
}

#[tokio::test]
async fn rates_follow_ai_pr_outcomes() {
    let (_tmp, data_dir) = create_data_dir();
    seed(
        &data_dir,
        &[
            pr(1, true, false, false),
            pr(2, true, true, false),
            pr(3, true, false, true),
            pr(4, true, true, false),
        ],
        &[],
    );

    let success = compute_ai_success_rate(data_dir.clone(), PROJECT.to_string())
        .await
        .expect("success rate");
    assert_eq!(success, Some(0.5));

    let stable = compute_ai_stable_rate(data_dir.clone(), PROJECT.to_string())
        .await
        .expect("stable rate")
        .expect("has ai prs");
    assert!((stable - 0.75).abs() < 1e-9);
}

#[tokio::test]
async fn psri_contract_for_empty_and_seeded_projects() {
    let (_tmp, data_dir) = create_data_dir();

    let empty = compute_psri(data_dir.clone(), PROJECT.to_string())
        .await
        .expect("psri");
    let empty_json = serde_json::to_value(empty).expect("serialize");
    assert_eq!(
        empty_json,
        json!({"score": null, "structural": null, "change": null, "defect": null})
    );

    seed(
        &data_dir,
        &[
            pr(1, false, false, false),
            pr(2, false, false, false),
            pr(3, false, false, true),
            pr(4, false, false, false),
        ],
        &[file("src/a.rs", 50.0, 25.0, None), file("src/b.rs", 30.0, 15.0, None)],
    );

    let psri = compute_psri(data_dir.clone(), PROJECT.to_string())
        .await
        .expect("psri");
    let weights = WeightConfig::default();
    assert!((psri.structural.unwrap() - 0.4).abs() < 1e-9);
    assert!((psri.change.unwrap() - 0.4).abs() < 1e-9);
    assert!((psri.defect.unwrap() - 0.25).abs() < 1e-9);
    let expected = weights.structural * 0.4 + weights.change * 0.4 + weights.defect * 0.25;
    assert!((psri.score.unwrap() - expected).abs() < 1e-5);
}

#[tokio::test]
async fn psri_clamps_and_honours_saved_weights() {
    let (_tmp, data_dir) = create_data_dir();
    seed(&data_dir, &[], &[file("src/huge.rs", 200.0, 100.0, None)]);

    let saved = save_weight_config(
        data_dir.clone(),
        PROJECT.to_string(),
        WeightConfig {
            structural: 0.5,
            change: 0.5,
            defect: 0.0,
            ..WeightConfig::default()
        },
    )
    .await
    .expect("save weights");
    assert_eq!(get_weight_config(data_dir.clone(), PROJECT.to_string()).await.unwrap(), saved);

    let psri = compute_psri(data_dir.clone(), PROJECT.to_string())
        .await
        .expect("psri");
    assert_eq!(psri.structural, Some(1.0));
    assert_eq!(psri.change, Some(1.0));
    assert!((psri.score.unwrap() - 1.0).abs() < 1e-9);

    let rejected = save_weight_config(
        data_dir.clone(),
        PROJECT.to_string(),
        WeightConfig {
            structural: 2.0,
            ..WeightConfig::default()
        },
    )
    .await
    .unwrap_err();
    assert_eq!(rejected.kind(), "validation");
}

#[tokio::test]
async fn snapshot_is_persisted_and_overview_reflects_it() {
    let (_tmp, data_dir) = create_data_dir();
    seed(
        &data_dir,
        &[pr(1, true, false, false), pr(2, false, false, true)],
        &[file("src/a.rs", 40.0, 20.0, Some(0.9)), file("src/b.rs", 5.0, 1.0, None)],
    );
    let cache = cache();

    let before = get_overview(data_dir.clone(), PROJECT.to_string(), cache.clone())
        .await
        .expect("overview");
    assert!(before.latest_snapshot.is_none());

    let result = compute_and_save_snapshot(data_dir.clone(), PROJECT.to_string(), cache.clone())
        .await
        .expect("snapshot");
    assert_eq!(result.total_prs, 2);
    assert_eq!(result.ai_prs, 1);
    assert_eq!(result.total_files, 2);
    assert_eq!(result.hotspot_files, 1);
    assert_eq!(result.ai_success_rate, Some(1.0));

    let after = get_overview(data_dir.clone(), PROJECT.to_string(), cache.clone())
        .await
        .expect("overview");
    let latest = after.latest_snapshot.expect("snapshot stored");
    assert_eq!(latest.psri_score, result.psri.score);
    assert_eq!(latest.hotspot_files, 1);
    assert_eq!(after.top_hotspots.len(), 1);
    assert_eq!(after.top_hotspots[0].file_path, "src/a.rs");

    let snapshot_json = serde_json::to_value(&latest).expect("serialize");
    for key in [
        "aiSuccessRate",
        "aiStableRate",
        "psriScore",
        "tdi",
        "totalPrs",
        "aiPrs",
        "totalFiles",
        "hotspotFiles",
        "snapshotDate",
    ] {
        assert!(snapshot_json.get(key).is_some(), "missing {key}");
    }
}

#[tokio::test]
async fn attribution_contracts() {
    let (_tmp, data_dir) = create_data_dir();
    seed(
        &data_dir,
        &[
            pr(1, true, true, false),
            pr(2, false, false, true),
            pr(3, true, true, true),
            pr(4, false, false, false),
        ],
        &[
            file("src/a.rs", 10.0, 5.0, Some(0.8)),
            file("src/b.rs", 20.0, 15.0, Some(0.3)),
            file("src/c.rs", 8.0, 3.0, Some(0.6)),
        ],
    );

    let attribution = get_ai_attribution(data_dir.clone(), PROJECT.to_string())
        .await
        .expect("attribution");
    assert_eq!(attribution.summary.ai_file_count, 2);
    assert_eq!(attribution.summary.human_file_count, 1);
    assert_eq!(attribution.complexity.verdict, "AI code is less complex");

    let failed = get_failed_pr_attribution(data_dir.clone(), PROJECT.to_string())
        .await
        .expect("failed prs");
    assert_eq!(failed.major_revisions.count, 2);
    assert_eq!(failed.rollbacks.count, 2);
    assert_eq!(failed.total_failed, 4);

    let json = serde_json::to_value(&failed).expect("serialize");
    assert_eq!(json["totalFailed"], json!(4));
    assert_eq!(json["majorRevisions"]["ai"], json!(2));
}

#[tokio::test]
async fn generated_decisions_are_listed_by_priority_and_not_deduplicated() {
    let (_tmp, data_dir) = create_data_dir();
    let files: Vec<FileMetric> = (0..11)
        .map(|i| file(&format!("src/hot_{i}.rs"), 60.0, 30.0, None))
        .collect();
    seed(&data_dir, &[pr(1, true, true, false), pr(2, true, true, false)], &files);
    let cache = cache();

    let first = generate_decisions(data_dir.clone(), PROJECT.to_string(), cache.clone())
        .await
        .expect("generate");
    let titles: Vec<&str> = first.iter().map(|d| d.title.as_str()).collect();
    assert_eq!(titles, vec!["Review AI tool configuration", "Code review sprint"]);

    let second = generate_decisions(data_dir.clone(), PROJECT.to_string(), cache.clone())
        .await
        .expect("generate again");
    assert_eq!(second.len(), first.len());

    let listed = list_decisions(data_dir.clone(), PROJECT.to_string())
        .await
        .expect("list");
    assert_eq!(listed.len(), 4);
    assert!(listed.windows(2).all(|w| {
        w[0].priority > w[1].priority || (w[0].priority == w[1].priority && w[0].created_at >= w[1].created_at)
    }));
}

#[tokio::test]
async fn list_orders_priority_before_insertion_time() {
    let (_tmp, data_dir) = create_data_dir();
    let conn = get_db_connection(&data_dir).expect("open db");
    let make = |id: &str, priority: i64| Decision {
        id: id.to_string(),
        project_id: PROJECT.to_string(),
        level: DecisionLevel::Warning,
        category: "RISK".to_string(),
        title: id.to_string(),
        description: String::new(),
        priority,
        status: DecisionStatus::Pending,
        created_at: 1_700_000_000_000,
    };
    insert_decision(&conn, &make("low", 1)).expect("insert low");
    insert_decision(&conn, &make("high", 5)).expect("insert high");
    insert_decision(&conn, &make("high-later", 5)).expect("insert high later");
    drop(conn);

    let listed = list_decisions(data_dir.clone(), PROJECT.to_string())
        .await
        .expect("list");
    let ids: Vec<&str> = listed.iter().map(|d| d.id.as_str()).collect();
    assert_eq!(ids, vec!["high-later", "high", "low"]);
}

#[tokio::test]
async fn status_update_validates_before_writing() {
    let (_tmp, data_dir) = create_data_dir();
    let conn = get_db_connection(&data_dir).expect("open db");
    let decision = Decision {
        id: "d-1".to_string(),
        project_id: PROJECT.to_string(),
        level: DecisionLevel::Info,
        category: "AI_USAGE".to_string(),
        title: "Expand AI usage".to_string(),
        description: String::new(),
        priority: 2,
        status: DecisionStatus::Pending,
        created_at: 1,
    };
    insert_decision(&conn, &decision).expect("insert");

    let invalid = update_decision_status(data_dir.clone(), "d-1".to_string(), "INVALID".to_string(), cache())
        .await
        .unwrap_err();
    assert_eq!(invalid.kind(), "validation");
    assert_eq!(
        load_decision(&conn, "d-1").expect("load").expect("exists").status,
        DecisionStatus::Pending
    );

    let missing = update_decision_status(data_dir.clone(), "missing-id".to_string(), "ACCEPTED".to_string(), cache())
        .await
        .unwrap_err();
    assert_eq!(missing.kind(), "not_found");

    let accepted = update_decision_status(data_dir.clone(), "d-1".to_string(), "ACCEPTED".to_string(), cache())
        .await
        .expect("accept");
    assert_eq!(accepted.status, DecisionStatus::Accepted);
    assert_eq!(serde_json::to_value(&accepted).unwrap()["status"], json!("ACCEPTED"));
}

#[tokio::test]
async fn settings_round_trip_and_merge_partial_updates() {
    let (_tmp, data_dir) = create_data_dir();

    let initial = get_settings(data_dir.clone()).await.expect("load settings");
    assert_eq!(initial["trendLimit"], json!(30));

    let saved = save_settings(data_dir.clone(), json!({ "hotspotMinComplexity": 5, "trendLimit": 9999 }))
        .await
        .expect("save settings");
    assert_eq!(saved["hotspotMinComplexity"], json!(5));
    assert_eq!(saved["trendLimit"], json!(365));
    assert_eq!(saved["overviewCacheTtlSecs"], initial["overviewCacheTtlSecs"]);

    let reloaded = get_settings(data_dir.clone()).await.expect("reload settings");
    assert_eq!(reloaded, saved);
}
