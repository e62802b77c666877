//! Control plane API error types

use thiserror::Error;

/// Control plane API errors
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("API key is not configured. Set STRATUS_API_KEY or pass --api-key")]
    MissingApiKey,

    #[error("Invalid API host: {0}")]
    InvalidHost(String),

    #[error("API error ({status}) {code}: {message}")]
    Status {
        status: u16,
        code: String,
        message: String,
    },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, ApiError>;
