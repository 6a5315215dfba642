//! Error taxonomy for engine operations.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("validation: {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("not found: {entity} {id}")]
    NotFound { entity: String, id: String },

    #[error("storage: {0}")]
    Storage(#[from] rusqlite::Error),

    #[error("json: {0}")]
    Json(#[from] serde_json::Error),

    #[error("io: {0}")]
    Io(#[from] std::io::Error),

    #[error("task: {0}")]
    Task(String),
}

impl EngineError {
    pub fn validation(field: &str, reason: &str) -> Self {
        Self::Validation {
            field: field.to_string(),
            reason: reason.to_string(),
        }
    }

    pub fn not_found(entity: &str, id: &str) -> Self {
        Self::NotFound {
            entity: entity.to_string(),
            id: id.to_string(),
        }
    }

    /// Coarse class for callers mapping to transport status codes.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Validation { .. } => "validation",
            Self::NotFound { .. } => "not_found",
            _ => "internal",
        }
    }
}
