use thiserror::Error;

/// Error type that captures common planner failures.
#[derive(Debug, Error)]
pub enum PlannerError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("Invalid date format: `{0}` (expected YYYY-MM-DD)")]
    InvalidDateFormat(String),
    #[error("Invalid month key: `{0}` (expected YYYY-MM)")]
    InvalidMonthKey(String),
    #[error("{kind} not found: {id}")]
    NotFound { kind: &'static str, id: String },
    #[error("Validation failed: {0}")]
    Validation(String),
    #[error("Configuration error: {0}")]
    Config(String),
}

impl PlannerError {
    pub fn not_found(kind: &'static str, id: impl ToString) -> Self {
        PlannerError::NotFound {
            kind,
            id: id.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, PlannerError>;
