//! Error types for the BI agent dashboard

use thiserror::Error;

/// Result type alias for dashboard operations
pub type Result<T> = std::result::Result<T, DashboardError>;

#[derive(Error, Debug)]
pub enum DashboardError {

    // =============================
    // Dashboard Errors
    // =============================

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("KPI data error: {0}")]
    KpiError(String),

    #[error("LLM error: {0}")]
    LlmError(String),

    #[error("Unknown domain: {0}")]
    UnknownDomain(String),

    #[error("Unknown analysis: {0}")]
    UnknownAnalysis(String),

    #[error("Unknown page: {0}")]
    UnknownPage(String),

    // =============================
    // External Library Conversions
    // =============================

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("HTTP client error: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl DashboardError {
    /// Whether the error names something the caller asked for that does not exist
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            DashboardError::UnknownDomain(_)
                | DashboardError::UnknownAnalysis(_)
                | DashboardError::UnknownPage(_)
        )
    }
}
