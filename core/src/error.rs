use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DashError {
    // ── Configuration ─────────────────────────────────────────
    #[error("Unknown report '{name}'")]
    UnknownReport { name: String },

    #[error("Filter '{filter}' value {value} outside allowed range [{min}, {max}]")]
    FilterOutOfRange {
        filter: &'static str,
        value: i64,
        min: i64,
        max: i64,
    },

    #[error("Filter '{filter}' range is inverted: {low} > {high}")]
    InvertedRange {
        filter: &'static str,
        low: i64,
        high: i64,
    },

    #[error("Report '{report}' does not accept filter '{filter}'")]
    UnexpectedFilter {
        report: &'static str,
        filter: &'static str,
    },

    #[error("Filter '{filter}' expects a {expected} value")]
    FilterTypeMismatch {
        filter: &'static str,
        expected: &'static str,
    },

    #[error("Statement rejected by read-only guardrail: {reason}")]
    UnsupportedStatement { reason: String },

    #[error("Invalid configuration: {reason}")]
    InvalidConfig { reason: String },

    // ── Data source ───────────────────────────────────────────
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Result set has no column '{column}'")]
    MissingColumn { column: String },

    // ── Shaping ───────────────────────────────────────────────
    #[error("Dropped {dropped} of {total} titles while exploding genres (limit {max_ratio:.2})")]
    DroppedRowsExceeded {
        dropped: usize,
        total: usize,
        max_ratio: f64,
    },

    #[error("Column '{column}' is malformed: {reason}")]
    Malformed { column: String, reason: String },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Coarse classification surfaced to the user next to a failed render.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Configuration,
    DataSource,
    Shaping,
    Internal,
}

impl DashError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            DashError::UnknownReport { .. }
            | DashError::FilterOutOfRange { .. }
            | DashError::InvertedRange { .. }
            | DashError::UnexpectedFilter { .. }
            | DashError::FilterTypeMismatch { .. }
            | DashError::UnsupportedStatement { .. }
            | DashError::InvalidConfig { .. } => ErrorKind::Configuration,
            DashError::Database(_) | DashError::MissingColumn { .. } => ErrorKind::DataSource,
            DashError::DroppedRowsExceeded { .. } | DashError::Malformed { .. } => {
                ErrorKind::Shaping
            }
            DashError::Serialization(_) | DashError::Other(_) => ErrorKind::Internal,
        }
    }
}

pub type DashResult<T> = Result<T, DashError>;
