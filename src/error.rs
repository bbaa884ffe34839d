//! Error types for streakboard.

use thiserror::Error;

/// Main error type for dashboard operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Bad user input, rejected before any state changes.
    #[error("Invalid input: {0}")]
    Validation(String),

    /// The referenced task does not exist.
    #[error("Task not found: {0}")]
    NotFound(String),

    /// The motivation service could not produce a message.
    #[error("Coach unavailable: {0}")]
    ExternalService(String),

    #[error("Storage error: {0}")]
    Persistence(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        Error::ExternalService(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
