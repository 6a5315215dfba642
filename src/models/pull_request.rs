use serde::{Deserialize, Serialize};

/// One pull request as written by the source-control collector.
/// The engine reads these rows and never mutates them.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PullRequest {
    pub id: String,
    pub project_id: String,
    pub number: i64,
    pub title: String,
    pub author_login: String,
    pub ai_used: bool,
    pub major_revision: bool,
    pub rollback_flag: bool,
    pub review_rounds: u32,
    pub merged_at: Option<i64>,
    pub created_at: i64,
}
