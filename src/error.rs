use thiserror::Error;

use crate::types::SeriesError;

/// Application error types.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Degenerate input: {0}")]
    DegenerateInput(#[from] SeriesError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("External API error: {0}")]
    ExternalApi(String),

    #[error("Chart error: {0}")]
    Chart(String),

    #[error("Notification error: {0}")]
    Notification(String),

    #[error(transparent)]
    Reqwest(#[from] reqwest::Error),

    #[error(transparent)]
    SerdeJson(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, AppError>;
