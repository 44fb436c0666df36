//! Error types for Hue client operations

use thiserror::Error;

/// Result type alias for Hue client operations
pub type Result<T> = std::result::Result<T, HueClientError>;

/// Errors that can occur while talking to the bridge REST API
#[derive(Error, Debug)]
pub enum HueClientError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Invalid URL
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Bridge returned an error response
    #[error("Bridge error {status}: {message}")]
    Bridge { status: u16, message: String },

    /// Failed to parse a bridge response
    #[error("Failed to parse bridge response: {0}")]
    Parse(String),
}

impl HueClientError {
    /// Create a bridge error from status code and message
    pub fn bridge(status: u16, message: impl Into<String>) -> Self {
        Self::Bridge {
            status,
            message: message.into(),
        }
    }
}
