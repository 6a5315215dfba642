use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::EngineError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DecisionLevel {
    Info,
    Warning,
    Critical,
}

impl DecisionLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Info => "INFO",
            Self::Warning => "WARNING",
            Self::Critical => "CRITICAL",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DecisionCategory {
    AiUsage,
    Risk,
    CodeQuality,
    TechDebt,
}

impl DecisionCategory {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::AiUsage => "AI_USAGE",
            Self::Risk => "RISK",
            Self::CodeQuality => "CODE_QUALITY",
            Self::TechDebt => "TECH_DEBT",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DecisionStatus {
    Pending,
    Accepted,
    Rejected,
}

impl DecisionStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Accepted => "ACCEPTED",
            Self::Rejected => "REJECTED",
        }
    }
}

impl fmt::Display for DecisionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DecisionStatus {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PENDING" => Ok(Self::Pending),
            "ACCEPTED" => Ok(Self::Accepted),
            "REJECTED" => Ok(Self::Rejected),
            other => Err(EngineError::validation(
                "status",
                &format!("must be one of PENDING, ACCEPTED, REJECTED (got {other:?})"),
            )),
        }
    }
}

/// A persisted recommendation. `category` is kept as the stored string so rows
/// written by older rule tables still load.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Decision {
    pub id: String,
    pub project_id: String,
    pub level: DecisionLevel,
    pub category: String,
    pub title: String,
    pub description: String,
    pub priority: i64,
    pub status: DecisionStatus,
    pub created_at: i64, // unix millis
}
