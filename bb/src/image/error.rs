//! Image generation error types

use thiserror::Error;

/// Errors that can occur talking to the image service
#[derive(Debug, Error)]
pub enum ImageError {
    #[error("API error {status}: {message}")]
    ApiError { status: u16, message: String },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Failed to find generation id in response: {0}")]
    MissingJobId(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Missing API key: set the {0} environment variable")]
    MissingApiKey(String),
}
